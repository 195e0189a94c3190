//! JSON bodies of successful responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

use query_engine_execution::record::{EntityRecord, QueryResult};
use query_engine_metadata::metadata::EntityModel;

use crate::error::ServerError;

/// The service document: one entry per entity set.
pub fn service_document(model: &EntityModel) -> Value {
    let entity_sets = model
        .entity_sets()
        .map(|set| {
            serde_json::json!({
                "name": set.name,
                "kind": "EntitySet",
                "url": set.name,
            })
        })
        .collect::<Vec<_>>();

    serde_json::json!({
        "@odata.context": "$metadata",
        "value": entity_sets,
    })
}

/// `{"@odata.context": "$metadata#Set", "@odata.count": n, "value": [...]}`
pub fn collection(entity_set: &str, result: &QueryResult) -> Value {
    let mut body = Map::new();
    body.insert(
        "@odata.context".to_string(),
        Value::String(format!("$metadata#{entity_set}")),
    );
    if let Some(count) = result.count {
        body.insert("@odata.count".to_string(), Value::from(count));
    }
    body.insert(
        "value".to_string(),
        Value::Array(result.records.iter().map(|r| Value::Object(entity(r))).collect()),
    );
    Value::Object(body)
}

/// A single entity, with the context of its entity set.
pub fn single_entity(entity_set: &str, record: &EntityRecord) -> Value {
    let mut body = Map::new();
    body.insert(
        "@odata.context".to_string(),
        Value::String(format!("$metadata#{entity_set}/$entity")),
    );
    body.extend(entity(record));
    Value::Object(body)
}

/// The properties of a record, preceded by its id and followed by its expanded navigation properties.
pub fn entity(record: &EntityRecord) -> Map<String, Value> {
    let mut object = Map::new();
    if let Some(id) = &record.id {
        object.insert("@odata.id".to_string(), Value::String(id.clone()));
    }
    for (name, value) in &record.properties {
        object.insert(name.clone(), value.clone());
    }
    for (name, nested) in &record.navigation_values {
        object.insert(name.clone(), Value::Object(entity(nested)));
    }
    object
}

/// Serialize a body with the JSON content type.
pub fn json(status: StatusCode, body: &Value) -> Result<Response, ServerError> {
    let bytes = serde_json::to_vec(body)?;
    Ok((
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    fn notebook() -> EntityRecord {
        EntityRecord {
            id: Some("Products(1)".to_string()),
            properties: IndexMap::from([
                ("ID".to_string(), serde_json::json!(1)),
                ("Name".to_string(), serde_json::json!("Notebook")),
                ("Price".to_string(), serde_json::json!(1200.5)),
            ]),
            navigation_values: IndexMap::from([(
                "Category".to_string(),
                EntityRecord {
                    id: Some("Categories(1)".to_string()),
                    properties: IndexMap::from([
                        ("ID".to_string(), serde_json::json!(1)),
                        ("Name".to_string(), serde_json::json!("Computers")),
                    ]),
                    navigation_values: IndexMap::new(),
                },
            )]),
        }
    }

    #[test]
    fn collections_carry_context_count_and_ids() {
        let body = collection(
            "Products",
            &QueryResult {
                records: vec![notebook()],
                count: Some(1),
            },
        );

        insta::assert_json_snapshot!(body, @r###"
        {
          "@odata.context": "$metadata#Products",
          "@odata.count": 1,
          "value": [
            {
              "@odata.id": "Products(1)",
              "ID": 1,
              "Name": "Notebook",
              "Price": 1200.5,
              "Category": {
                "@odata.id": "Categories(1)",
                "ID": 1,
                "Name": "Computers"
              }
            }
          ]
        }
        "###);
    }

    #[test]
    fn records_without_a_key_have_no_id() {
        let record = EntityRecord {
            id: None,
            properties: IndexMap::from([("Title".to_string(), Value::Null)]),
            navigation_values: IndexMap::new(),
        };
        assert_eq!(
            Value::Object(entity(&record)),
            serde_json::json!({ "Title": null })
        );
    }

    #[test]
    fn service_document_lists_entity_sets() {
        let body = service_document(&tests_common::fixtures::product_catalog_model());
        let names = body["value"]
            .as_array()
            .unwrap()
            .iter()
            .map(|set| set["name"].as_str().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(names.len(), 4);
        assert!(names.contains(&"Products"));
        assert_eq!(body["@odata.context"], "$metadata");
    }
}
