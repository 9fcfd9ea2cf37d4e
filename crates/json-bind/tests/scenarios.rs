//! End-to-end coverage of the codec's numbered concrete scenarios:
//! parse, bind and stringify exercised together rather than unit-by-unit.

use json_bind::{bind, parse, stringify, to_value, Json, JsonValue, Number};

#[test]
fn scenario_1_array_of_ints() {
    let v: Vec<i32> = parse("[1,2,3]").unwrap();
    assert_eq!(v, vec![1, 2, 3]);
}

#[derive(Json, Debug, PartialEq)]
struct Person {
    name: String,
    birth_date: String,
}

#[test]
fn scenario_2_snake_case_json_binds_to_snake_case_field() {
    let p: Person = parse(r#"{"name":"Alice","birth_date":"1993-05-15"}"#).unwrap();
    assert_eq!(p.birth_date, "1993-05-15");
    assert_eq!(p.name, "Alice");
}

#[test]
fn scenario_2b_camel_case_json_binds_to_snake_case_field() {
    let p: Person = parse(r#"{"name":"Alice","birthDate":"1993-05-15"}"#).unwrap();
    assert_eq!(p.birth_date, "1993-05-15");
}

#[derive(Json, Debug, Default)]
struct AOptB {
    a: i32,
    b: Option<i32>,
}

#[test]
fn scenario_3_optional_empty_is_omitted() {
    let v = AOptB { a: 1, b: None };
    assert_eq!(stringify(&v).unwrap(), r#"{"a":1}"#);
}

#[derive(Json, Debug, PartialEq)]
#[allow(non_camel_case_types)]
enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

#[test]
fn scenario_4_enum_from_lowercase_name_and_ordinal() {
    let v: DayOfWeek = parse("\"monday\"").unwrap();
    assert_eq!(v, DayOfWeek::Monday);
    let v: DayOfWeek = parse("0").unwrap();
    assert_eq!(v, DayOfWeek::Monday);
}

#[test]
fn scenario_5_invalid_literal_reports_prefix_end_column() {
    let err = json_bind::Parser::parse("nul").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid literal, expected 'null' at line 1, col 4"
    );
}

#[test]
fn scenario_6_trailing_characters_after_top_level_value() {
    let err = json_bind::Parser::parse("false,").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Trailing characters after top-level value at line 1, col 7 (token COMMA)"
    );
}

#[test]
fn scenario_7_non_string_map_key_stringifies_numerically() {
    let m = json_bind::JsonMap::<f64, String>(vec![(3.14, "pi".to_string())]);
    assert_eq!(stringify(&m).unwrap(), r#"{"3.14":"pi"}"#);
}

#[test]
fn scenario_8_huge_integer_and_lossy_fraction_widen() {
    let big: JsonValue = parse("9999999999999999999999999").unwrap();
    assert_eq!(big.to_compact_string(), "9999999999999999999999999");
    assert!(matches!(big, JsonValue::Number(Number::BigInt(_))));

    let dec: JsonValue = parse("1.0000000000000001").unwrap();
    assert!(matches!(dec, JsonValue::Number(Number::BigDecimal(_))));
}

#[test]
fn scenario_9_null_to_primitive_fails() {
    let err = bind::<i32>(&json_bind::Parser::parse("null").unwrap()).unwrap_err();
    assert_eq!(err.to_string(), "Cannot assign null to primitive");
}

#[test]
fn scenario_10_lazy_sequence_materializes_preserving_order_and_kind() {
    let parsed = json_bind::Parser::parse(r#"[null,1,"str",true,{"name":"Alice"}]"#).unwrap();
    let items: Vec<JsonValue> = json_bind::bind_lazy::<JsonValue>(parsed)
        .collect::<json_bind::Result<_>>()
        .unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0], JsonValue::Null);
    assert_eq!(items[1], JsonValue::Number(Number::Int(1)));
    assert_eq!(items[2], JsonValue::String("str".to_string()));
    assert_eq!(items[3], JsonValue::Boolean(true));
    assert_eq!(to_value(&items[4]).unwrap().to_compact_string(), r#"{"name":"Alice"}"#);
}

#[test]
fn round_trip_i_parse_then_stringify_preserves_value_tree() {
    let text = r#"{"a":1,"b":[true,false,null],"c":"x"}"#;
    let v = json_bind::Parser::parse(text).unwrap();
    let reparsed = json_bind::Parser::parse(&v.to_compact_string()).unwrap();
    assert_eq!(v, reparsed);
}

#[test]
fn duplicate_key_last_wins() {
    let v = json_bind::Parser::parse(r#"{"a":1,"a":2}"#).unwrap();
    let JsonValue::Object(entries) = v else {
        panic!("expected object");
    };
    assert_eq!(entries.get("a"), Some(&JsonValue::Number(Number::Int(2))));
    assert_eq!(entries.len(), 1);
}

#[test]
fn json_path_breadcrumb_points_at_offending_field() {
    #[derive(Json, Debug)]
    struct Inner {
        birth_date: i32,
    }
    #[derive(Json, Debug)]
    struct Outer {
        users: Vec<Inner>,
    }
    let err = json_bind::parse::<Outer>(r#"{"users":[{"birth_date":1},{"birth_date":"x"}]}"#)
        .unwrap_err();
    assert!(
        err.to_string().contains("$.users[1].birth_date"),
        "unexpected message: {err}"
    );
}
