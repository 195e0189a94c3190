mod common;

use query_engine_metadata::metadata::ScalarType;
use query_engine_sql::sql::execution_plan::MutationPlan;
use query_engine_sql::sql::string::Param;
use query_engine_translation::translation::error::Error;
use query_engine_translation::translation::mutation::{
    translate_delete, translate_insert, translate_update, Payload,
};
use serde_json::json;
use similar_asserts::assert_eq;

fn payload(value: serde_json::Value) -> Payload {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[test]
fn insert_with_every_property() {
    let model = common::product_catalog_model();
    let plan = translate_insert(
        &model,
        "Categories",
        &payload(json!({"ID": 3, "Name": "Audio"})),
    )
    .unwrap();
    assert_eq!(
        common::mutation_statements(&plan),
        vec![(
            r#"INSERT INTO "public"."category" AS "T" ("ID", "Name") VALUES ($1, $2) RETURNING "T"."ID" AS "ID", "T"."Name" AS "Name""#
                .to_string(),
            vec![Param::Int8(3), Param::String("Audio".to_string())]
        )]
    );
}

#[test]
fn insert_uses_defaults_for_missing_properties() {
    let model = common::product_catalog_model();
    let plan = translate_insert(
        &model,
        "Products",
        &payload(json!({"Name": "Keyboard", "Price": 49.5, "@odata.type": "#Product"})),
    )
    .unwrap();
    let statements = common::mutation_statements(&plan);
    insta::assert_snapshot!(statements[0].0, @r#"INSERT INTO "public"."product" AS "T" ("ID", "Name", "Description", "Price", "CategoryID") VALUES (DEFAULT, $1, DEFAULT, cast($2 as "numeric"), DEFAULT) RETURNING "T"."ID" AS "ID", "T"."Name" AS "Name", "T"."Description" AS "Description", cast("T"."Price" as "text") AS "Price", "T"."CategoryID" AS "CategoryID""#);
    assert_eq!(
        statements[0].1,
        vec![
            Param::String("Keyboard".to_string()),
            Param::String("49.5".to_string())
        ]
    );

    let MutationPlan::Insert { shape, .. } = plan else {
        panic!("expected an insert plan");
    };
    assert_eq!(shape.entity_set, "Products");
    assert_eq!(shape.key_properties, vec!["ID".to_string()]);
}

#[test]
fn insert_payload_names_are_case_insensitive() {
    let model = common::product_catalog_model();
    let exact = translate_insert(&model, "Categories", &payload(json!({"Name": "Audio"}))).unwrap();
    let lower = translate_insert(&model, "Categories", &payload(json!({"name": "Audio"}))).unwrap();
    assert_eq!(exact, lower);
}

#[test]
fn insert_rejects_mistyped_values() {
    let model = common::product_catalog_model();
    assert_eq!(
        translate_insert(&model, "Products", &payload(json!({"Price": true}))),
        Err(Error::TypeMismatch {
            property: "Price".to_string(),
            value: json!(true),
            scalar_type: ScalarType::Numeric,
        })
    );
}

#[test]
fn insert_into_unknown_entity_set() {
    let model = common::product_catalog_model();
    assert_eq!(
        translate_insert(&model, "Suppliers", &payload(json!({}))),
        Err(Error::UnknownEntitySet("Suppliers".to_string()))
    );
}

#[test]
fn update_assigns_only_supplied_properties() {
    let model = common::product_catalog_model();
    let plan = translate_update(
        &model,
        "Products",
        "1",
        &payload(json!({"Price": 999.99, "Colour": "red"})),
    )
    .unwrap();
    assert_eq!(
        common::mutation_statements(&plan),
        vec![
            (
                r#"SELECT "T"."ID" AS "ID" FROM "public"."product" AS "T" WHERE ("T"."ID" = $1) FOR UPDATE"#
                    .to_string(),
                vec![Param::Int8(1)]
            ),
            (
                r#"UPDATE "public"."product" AS "T" SET "Price" = cast($1 as "numeric") WHERE ("T"."ID" = $2)"#
                    .to_string(),
                vec![Param::String("999.99".to_string()), Param::Int8(1)]
            ),
        ]
    );
}

#[test]
fn decimal_payload_values_keep_every_digit() {
    let model = common::product_catalog_model();
    let body: serde_json::Value =
        serde_json::from_str(r#"{"Price": 12345678901234567.89}"#).unwrap();
    let plan = translate_update(&model, "Products", "1", &payload(body)).unwrap();
    assert_eq!(
        common::mutation_statements(&plan)[1].1,
        vec![
            Param::String("12345678901234567.89".to_string()),
            Param::Int8(1)
        ]
    );
}

#[test]
fn update_can_set_null() {
    let model = common::product_catalog_model();
    let plan = translate_update(
        &model,
        "Products",
        "ID=2",
        &payload(json!({"Description": null, "Name": "Screen"})),
    )
    .unwrap();
    let statements = common::mutation_statements(&plan);
    assert_eq!(
        statements[1],
        (
            r#"UPDATE "public"."product" AS "T" SET "Name" = $1, "Description" = NULL WHERE ("T"."ID" = $2)"#
                .to_string(),
            vec![Param::String("Screen".to_string()), Param::Int8(2)]
        )
    );
}

#[test]
fn update_without_known_properties_only_locks_the_row() {
    let model = common::product_catalog_model();
    let plan = translate_update(&model, "Products", "1", &payload(json!({"Colour": "red"}))).unwrap();
    let MutationPlan::Update { update, .. } = plan else {
        panic!("expected an update plan");
    };
    assert_eq!(update, None);
}

#[test]
fn update_requires_a_single_key() {
    let model = common::product_catalog_model();
    assert_eq!(
        translate_update(&model, "OrderLines", "OrderID=1,LineNo=1", &payload(json!({"Quantity": 4}))),
        Err(Error::UnsupportedCompositeKey {
            entity_set: "OrderLines".to_string(),
            key_count: 2
        })
    );
    assert_eq!(
        translate_update(&model, "Products", "Name='x'", &payload(json!({}))),
        Err(Error::InvalidKeyPredicate("Name='x'".to_string()))
    );
}

#[test]
fn delete_by_key() {
    let model = common::product_catalog_model();
    let plan = translate_delete(&model, "Products", "2").unwrap();
    assert_eq!(plan.kind(), "delete");
    assert_eq!(
        common::mutation_statements(&plan),
        vec![(
            r#"DELETE FROM "public"."product" AS "T" WHERE ("T"."ID" = $1)"#.to_string(),
            vec![Param::Int8(2)]
        )]
    );
}

#[test]
fn delete_with_invalid_key() {
    let model = common::product_catalog_model();
    assert_eq!(
        translate_delete(&model, "Products", "'unterminated"),
        Err(Error::InvalidKeyPredicate("'unterminated".to_string()))
    );
}
