//! Integration coverage for `#[derive(Json)]`'s product/enum binding,
//! in particular the presence-vs-nullity distinction and
//! name resolution, which only show up end-to-end once the
//! derive macro and the core crate are linked together.

use json_bind::{bind, stringify, Json, Parser};

#[derive(Json, Debug, PartialEq, Default)]
struct Profile {
    name: String,
    nickname: Option<String>,
    #[json(rename = "avatarUrl")]
    avatar_url: Option<Option<String>>,
}

#[test]
fn absent_field_on_single_option_is_none() {
    let v = Parser::parse(r#"{"name":"Alice"}"#).unwrap();
    let p: Profile = bind(&v).unwrap();
    assert_eq!(p.nickname, None);
}

#[test]
fn present_with_null_on_single_option_is_also_none() {
    let v = Parser::parse(r#"{"name":"Alice","nickname":null}"#).unwrap();
    let p: Profile = bind(&v).unwrap();
    assert_eq!(p.nickname, None);
}

#[test]
fn present_with_value_on_single_option_is_some() {
    let v = Parser::parse(r#"{"name":"Alice","nickname":"Al"}"#).unwrap();
    let p: Profile = bind(&v).unwrap();
    assert_eq!(p.nickname, Some("Al".to_string()));
}

#[test]
fn double_option_distinguishes_absent_from_present_null() {
    let absent: Profile = bind(&Parser::parse(r#"{"name":"Alice"}"#).unwrap()).unwrap();
    assert_eq!(absent.avatar_url, None);

    let present_null: Profile =
        bind(&Parser::parse(r#"{"name":"Alice","avatarUrl":null}"#).unwrap()).unwrap();
    assert_eq!(present_null.avatar_url, Some(None));

    let present_value: Profile = bind(
        &Parser::parse(r#"{"name":"Alice","avatarUrl":"http://x"}"#).unwrap(),
    )
    .unwrap();
    assert_eq!(present_value.avatar_url, Some(Some("http://x".to_string())));
}

#[test]
fn rename_attribute_controls_the_json_key() {
    let p = Profile {
        name: "Alice".to_string(),
        nickname: None,
        avatar_url: Some(Some("http://x".to_string())),
    };
    assert_eq!(
        stringify(&p).unwrap(),
        r#"{"name":"Alice","avatarUrl":"http://x"}"#
    );
}

#[test]
fn unknown_keys_are_silently_dropped() {
    let v = Parser::parse(r#"{"name":"Alice","extra":123}"#).unwrap();
    let p: Profile = bind(&v).unwrap();
    assert_eq!(p.name, "Alice");
}

#[test]
fn missing_non_optional_field_uses_default() {
    let v = Parser::parse("{}").unwrap();
    let p: Profile = bind(&v).unwrap();
    assert_eq!(p.name, "");
}

#[derive(Json, Debug, PartialEq)]
enum Status {
    Active,
    Inactive,
    Unrecognized,
}

#[test]
fn enum_matches_exact_name_then_case_insensitive_then_ordinal() {
    let a: Status = bind(&Parser::parse("\"Active\"").unwrap()).unwrap();
    assert_eq!(a, Status::Active);
    let b: Status = bind(&Parser::parse("\"INACTIVE\"").unwrap()).unwrap();
    assert_eq!(b, Status::Inactive);
    let c: Status = bind(&Parser::parse("1").unwrap()).unwrap();
    assert_eq!(c, Status::Inactive);
}

#[test]
fn enum_unrecognized_string_maps_to_unrecognized_variant() {
    let v: Status = bind(&Parser::parse("\"UNRECOGNIZED\"").unwrap()).unwrap();
    assert_eq!(v, Status::Unrecognized);
}

#[test]
fn enum_writes_canonical_name() {
    assert_eq!(stringify(&Status::Active).unwrap(), "\"Active\"");
}

#[derive(Json, Debug, PartialEq)]
struct Order {
    items: Vec<String>,
}

#[test]
fn product_field_single_value_promotes_to_one_element_sequence() {
    let v = Parser::parse(r#"{"items":"widget"}"#).unwrap();
    let order: Order = bind(&v).unwrap();
    assert_eq!(order.items, vec!["widget".to_string()]);
}
