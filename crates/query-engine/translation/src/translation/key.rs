//! Key predicates: the `(1)`, `('abc')` or `(ID=1)` part of an entity path.

use query_engine_metadata::metadata::Property;
use query_engine_sql::sql;

use super::error::Error;
use super::helpers::EntitySetInfo;
use super::values;

/// One `name=value` (or bare `value`) segment of a key predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct KeySegment {
    pub name: Option<String>,
    pub value: serde_json::Value,
}

/// Parse the text between the parentheses of a key predicate.
pub fn parse_key_predicate(text: &str) -> Result<Vec<KeySegment>, Error> {
    let invalid = || Error::InvalidKeyPredicate(text.to_string());
    split_outside_quotes(text, ',')
        .into_iter()
        .map(|segment| {
            let parts = split_outside_quotes(segment, '=');
            let (name, literal) = match parts.as_slice() {
                [literal] => (None, *literal),
                [name, literal] => {
                    let name = name.trim();
                    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_')
                    {
                        return Err(invalid());
                    }
                    (Some(name.to_string()), *literal)
                }
                _ => return Err(invalid()),
            };
            let value = values::parse_literal(literal).ok_or_else(invalid)?;
            Ok(KeySegment { name, value })
        })
        .collect()
}

fn split_outside_quotes(text: &str, separator: char) -> Vec<&str> {
    let mut parts = vec![];
    let mut in_quotes = false;
    let mut start = 0;
    for (index, c) in text.char_indices() {
        if c == '\'' {
            in_quotes = !in_quotes;
        } else if c == separator && !in_quotes {
            parts.push(&text[start..index]);
            start = index + c.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

/// The single key property of an entity set. Composite keys are not supported.
pub fn key_property<'a>(info: &EntitySetInfo<'a>) -> Result<&'a Property, Error> {
    let keys = info.entity_type.key_properties().collect::<Vec<_>>();
    match keys.as_slice() {
        [] => Err(Error::MissingPrimaryKey(info.entity_set.name.clone())),
        [key] => Ok(*key),
        _ => Err(Error::UnsupportedCompositeKey {
            entity_set: info.entity_set.name.clone(),
            key_count: keys.len(),
        }),
    }
}

/// Resolve a key predicate to the key property and the value it is compared with.
pub fn resolve_key<'a>(
    info: &EntitySetInfo<'a>,
    key_predicate: &str,
) -> Result<(&'a Property, serde_json::Value), Error> {
    let property = key_property(info)?;
    let mut segments = parse_key_predicate(key_predicate)?;
    if segments.len() > 1 {
        return Err(Error::UnsupportedCompositeKey {
            entity_set: info.entity_set.name.clone(),
            key_count: segments.len(),
        });
    }
    let segment = segments
        .pop()
        .ok_or_else(|| Error::InvalidKeyPredicate(key_predicate.to_string()))?;
    if let Some(name) = &segment.name {
        if !name.eq_ignore_ascii_case(&property.name) {
            return Err(Error::InvalidKeyPredicate(key_predicate.to_string()));
        }
    }
    if segment.value.is_null() {
        return Err(Error::InvalidKeyPredicate(key_predicate.to_string()));
    }
    Ok((property, segment.value))
}

/// `<table>.<key column> = <key value>`
pub fn key_condition(
    info: &EntitySetInfo<'_>,
    table: &sql::ast::TableReference,
    key_predicate: &str,
) -> Result<sql::ast::Expression, Error> {
    let (property, value) = resolve_key(info, key_predicate)?;
    Ok(sql::helpers::equals(
        sql::helpers::column_reference(table.clone(), &property.column.name),
        values::translate_json_value(&property.name, &value, &property.column)?,
    ))
}
