//! Reading the resource path and the system query options of a request.

use query_engine_translation::translation::mutation::Payload;
use query_engine_translation::translation::query::QueryRequest;

/// A malformed request, rejected before translation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid resource path '{0}'. Expected 'EntitySet' or 'EntitySet(key)'.")]
    InvalidResourcePath(String),
    #[error("Invalid value '{value}' for {option}.")]
    InvalidQueryOption { option: String, value: String },
    #[error("This operation needs an entity key, as in '{0}(key)'.")]
    MissingKey(String),
    #[error("This operation applies to the entity set '{0}', not to a single entity.")]
    UnexpectedKey(String),
    #[error("The request body must be a JSON object: {0}")]
    InvalidBody(String),
}

/// The last path segment: an entity set, optionally followed by a key predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    pub entity_set: String,
    /// The text between the parentheses.
    pub key: Option<String>,
}

impl ResourcePath {
    pub fn parse(resource: &str) -> Result<Self, RequestError> {
        let invalid = || RequestError::InvalidResourcePath(resource.to_string());

        let (entity_set, key) = match resource.find('(') {
            None => (resource, None),
            Some(open) => {
                let key = resource[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(invalid)?;
                if key.trim().is_empty() {
                    return Err(invalid());
                }
                (&resource[..open], Some(key.to_string()))
            }
        };

        if entity_set.is_empty() || entity_set.contains([')', '\'', ' ']) {
            return Err(invalid());
        }
        Ok(ResourcePath {
            entity_set: entity_set.to_string(),
            key,
        })
    }

    pub fn require_key(&self) -> Result<&str, RequestError> {
        self.key
            .as_deref()
            .ok_or_else(|| RequestError::MissingKey(self.entity_set.clone()))
    }

    pub fn forbid_key(&self) -> Result<(), RequestError> {
        match self.key {
            Some(_) => Err(RequestError::UnexpectedKey(self.entity_set.clone())),
            None => Ok(()),
        }
    }
}

/// Build a query request from the resource path and the query string parameters.
/// Parameters that are not system query options are ignored.
pub fn query_request(
    path: ResourcePath,
    parameters: &[(String, String)],
) -> Result<QueryRequest, RequestError> {
    let mut request = QueryRequest {
        entity_set: path.entity_set,
        key: path.key,
        ..QueryRequest::default()
    };

    for (name, value) in parameters {
        match name.as_str() {
            "$filter" => request.filter = Some(value.clone()),
            "$orderby" => request.order_by = Some(value.clone()),
            "$expand" => request.expand = Some(value.clone()),
            "$top" => request.top = Some(parse_count_option(name, value)?),
            "$skip" => request.skip = Some(parse_count_option(name, value)?),
            "$count" => request.count = parse_bool_option(name, value)?,
            _ => tracing::debug!(option = %name, "Ignoring query option"),
        }
    }
    Ok(request)
}

fn parse_count_option(option: &str, value: &str) -> Result<u32, RequestError> {
    value
        .trim()
        .parse()
        .map_err(|_| RequestError::InvalidQueryOption {
            option: option.to_string(),
            value: value.to_string(),
        })
}

fn parse_bool_option(option: &str, value: &str) -> Result<bool, RequestError> {
    match value.trim() {
        v if v.eq_ignore_ascii_case("true") => Ok(true),
        v if v.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(RequestError::InvalidQueryOption {
            option: option.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parse a create or update body.
pub fn parse_payload(body: &[u8]) -> Result<Payload, RequestError> {
    match serde_json::from_slice(body) {
        Ok(serde_json::Value::Object(payload)) => Ok(payload),
        Ok(other) => Err(RequestError::InvalidBody(format!(
            "found {}",
            json_kind(&other)
        ))),
        Err(error) => Err(RequestError::InvalidBody(error.to_string())),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameters(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn resource_paths() {
        assert_eq!(
            ResourcePath::parse("Products").unwrap(),
            ResourcePath {
                entity_set: "Products".to_string(),
                key: None
            }
        );
        assert_eq!(
            ResourcePath::parse("Products('a(b)')").unwrap().key.as_deref(),
            Some("'a(b)'")
        );
        assert_eq!(
            ResourcePath::parse("Products(ID=1)").unwrap().key.as_deref(),
            Some("ID=1")
        );
        for invalid in ["", "Products(", "Products()", "(1)", "Products(1)x"] {
            assert!(
                ResourcePath::parse(invalid).is_err(),
                "{invalid} should be rejected"
            );
        }
    }

    #[test]
    fn system_query_options() {
        let path = ResourcePath::parse("Products").unwrap();
        let request = query_request(
            path,
            &parameters(&[
                ("$filter", "Price gt 500"),
                ("$orderby", "Price desc"),
                ("$expand", "Category"),
                ("$top", "10"),
                ("$skip", "5"),
                ("$count", "TRUE"),
                ("$select", "Name"),
                ("debug", "1"),
            ]),
        )
        .unwrap();

        assert_eq!(
            request,
            QueryRequest {
                entity_set: "Products".to_string(),
                key: None,
                filter: Some("Price gt 500".to_string()),
                order_by: Some("Price desc".to_string()),
                expand: Some("Category".to_string()),
                top: Some(10),
                skip: Some(5),
                count: true,
            }
        );
    }

    #[test]
    fn malformed_numeric_options_are_rejected() {
        for (option, value) in [("$top", "-1"), ("$skip", "ten"), ("$count", "yes")] {
            let error = query_request(
                ResourcePath::parse("Products").unwrap(),
                &parameters(&[(option, value)]),
            )
            .unwrap_err();
            assert_eq!(
                error,
                RequestError::InvalidQueryOption {
                    option: option.to_string(),
                    value: value.to_string()
                }
            );
        }
    }

    #[test]
    fn payloads_must_be_objects() {
        assert_eq!(
            parse_payload(br#"{"Name": "Tablet"}"#).unwrap()["Name"],
            serde_json::json!("Tablet")
        );
        assert_eq!(
            parse_payload(b"[1]").unwrap_err(),
            RequestError::InvalidBody("found an array".to_string())
        );
        assert!(parse_payload(b"{").is_err());
    }
}
