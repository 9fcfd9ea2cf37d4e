//! Snapshot coverage for the reflective writer's canonical JSON text,
//! using `insta` inline snapshots.

use indexmap::IndexMap;
use json_bind::{stringify, Bytes, Json};

#[derive(Json, Debug)]
struct Address {
    city: String,
    zip: Option<String>,
}

#[derive(Json, Debug)]
struct Customer {
    name: String,
    age: u32,
    tags: Vec<String>,
    address: Address,
    notes: Option<String>,
}

#[test]
fn canonical_rendering_of_a_representative_product_tree() {
    let customer = Customer {
        name: "Alice".to_string(),
        age: 34,
        tags: vec!["vip".to_string(), "beta".to_string()],
        address: Address {
            city: "Springfield".to_string(),
            zip: None,
        },
        notes: None,
    };
    insta::assert_snapshot!(
        stringify(&customer).unwrap(),
        @r#"{"name":"Alice","age":34,"tags":["vip","beta"],"address":{"city":"Springfield"}}"#
    );
}

#[test]
fn canonical_rendering_of_mixed_scalar_kinds() {
    let precise = json_bind::Parser::parse("1.0000000000000001").unwrap();
    let mut map = IndexMap::new();
    map.insert("flag".to_string(), json_bind::JsonValue::Boolean(true));
    map.insert("precise".to_string(), precise);
    map.insert(
        "bytes".to_string(),
        json_bind::to_value(&Bytes(vec![0xde, 0xad, 0xbe, 0xef])).unwrap(),
    );
    let v = json_bind::JsonValue::Object(map);
    insta::assert_snapshot!(
        v.to_compact_string(),
        @r#"{"flag":true,"precise":1.0000000000000001,"bytes":"3q2+7w=="}"#
    );
}
