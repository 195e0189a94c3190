//! Naming transforms between database tables and the names exposed over the wire.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::database::ForeignKeyInfo;

/// Configurable parts of the naming transforms.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NamingConventions {
    /// Entity set names to use instead of the pluralized entity type name,
    /// keyed by table name (matched case-insensitively).
    #[serde(default)]
    pub entity_set_overrides: BTreeMap<String, String>,
    /// How foreign keys become navigation properties.
    #[serde(default)]
    pub navigation_properties: NavigationNaming,
}

impl NamingConventions {
    /// The entity set name of a table, honouring any configured override.
    pub fn entity_set_name(&self, table_name: &str) -> String {
        self.entity_set_overrides
            .iter()
            .find(|(table, _)| table.eq_ignore_ascii_case(table_name))
            .map_or_else(|| entity_set_name(table_name), |(_, name)| name.clone())
    }
}

/// The strategy used to name the navigation property of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "strategy", rename_all = "camelCase")]
pub enum NavigationNaming {
    /// Name the navigation property after the entity type of the referenced table.
    #[default]
    ReferencedTable,
    /// Strip one of the suffixes from the foreign key column (`CategoryID` -> `Category`).
    /// The remainder must name a known entity type, which must also be the referenced one.
    #[serde(rename_all = "camelCase")]
    ForeignKeyColumn {
        #[serde(default = "default_foreign_key_suffixes")]
        suffixes: Vec<String>,
    },
}

fn default_foreign_key_suffixes() -> Vec<String> {
    vec!["_ID".to_string(), "ID".to_string()]
}

impl NavigationNaming {
    /// The candidate navigation property name for a foreign key, before it is checked
    /// against the known entity types. `None` means the foreign key is not navigable
    /// under this strategy.
    pub fn candidate_name(&self, foreign_key: &ForeignKeyInfo) -> Option<String> {
        match self {
            NavigationNaming::ReferencedTable => Some(entity_type_name(&foreign_key.target_table)),
            NavigationNaming::ForeignKeyColumn { suffixes } => {
                let column = foreign_key.source_column.as_str();
                suffixes
                    .iter()
                    .filter(|suffix| !suffix.is_empty() && column.len() > suffix.len())
                    .find_map(|suffix| {
                        let split = column.len() - suffix.len();
                        let (stem, tail) = (column.get(..split)?, column.get(split..)?);
                        tail.eq_ignore_ascii_case(suffix)
                            .then(|| entity_type_name(stem.trim_end_matches('_')))
                    })
                    .filter(|name| !name.is_empty())
            }
        }
    }
}

/// `PRODUCT_ITEM` -> `ProductItem`, `PRODUCT` -> `Product`.
pub fn entity_type_name(table_name: &str) -> String {
    table_name
        .to_lowercase()
        .split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `PRODUCT` -> `Products`, `CATEGORY` -> `Categories`, `STATUS` -> `Statuses`.
pub fn entity_set_name(table_name: &str) -> String {
    pluralize(&entity_type_name(table_name))
}

fn pluralize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix('y') {
        format!("{stem}ies")
    } else if name.ends_with('s') {
        format!("{name}es")
    } else {
        format!("{name}s")
    }
}

/// The inverse of [`entity_set_name`]: strip a plural suffix and uppercase.
/// The result still has to be looked up; it is not guaranteed to name a table.
pub fn table_name_for_entity_set(entity_set_name: &str) -> String {
    let lower = entity_set_name.to_lowercase();
    let singular = if let Some(stem) = lower.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = lower.strip_suffix("es") {
        stem.to_string()
    } else if let Some(stem) = lower.strip_suffix('s') {
        stem.to_string()
    } else {
        lower
    };
    singular.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foreign_key(source_column: &str, target_table: &str) -> ForeignKeyInfo {
        ForeignKeyInfo {
            constraint_name: format!("{source_column}_fkey"),
            source_column: source_column.to_string(),
            target_table: target_table.to_string(),
            target_column: "ID".to_string(),
        }
    }

    #[test]
    fn entity_type_names_are_pascal_case() {
        assert_eq!(entity_type_name("PRODUCT_ITEM"), "ProductItem");
        assert_eq!(entity_type_name("PRODUCT"), "Product");
        assert_eq!(entity_type_name("order_line_item"), "OrderLineItem");
        assert_eq!(entity_type_name("_legacy__table_"), "LegacyTable");
    }

    #[test]
    fn entity_set_names_are_pluralized() {
        assert_eq!(entity_set_name("PRODUCT"), "Products");
        assert_eq!(entity_set_name("CATEGORY"), "Categories");
        assert_eq!(entity_set_name("STATUS"), "Statuses");
        assert_eq!(entity_set_name("product_item"), "ProductItems");
    }

    #[test]
    fn entity_set_names_map_back_to_tables() {
        assert_eq!(table_name_for_entity_set("Products"), "PRODUCT");
        assert_eq!(table_name_for_entity_set("Categories"), "CATEGORY");
        assert_eq!(table_name_for_entity_set("Statuses"), "STATUS");
        assert_eq!(table_name_for_entity_set("Product"), "PRODUCT");
    }

    #[test]
    fn overrides_replace_the_pluralized_name() {
        let naming = NamingConventions {
            entity_set_overrides: BTreeMap::from([("person".to_string(), "People".to_string())]),
            ..NamingConventions::default()
        };
        assert_eq!(naming.entity_set_name("PERSON"), "People");
        assert_eq!(naming.entity_set_name("PRODUCT"), "Products");
    }

    #[test]
    fn referenced_table_strategy_names_after_the_target() {
        let naming = NavigationNaming::ReferencedTable;
        assert_eq!(
            naming.candidate_name(&foreign_key("PARENT_ID", "PRODUCT_CATEGORY")),
            Some("ProductCategory".to_string())
        );
    }

    #[test]
    fn foreign_key_column_strategy_strips_suffixes() {
        let naming = NavigationNaming::ForeignKeyColumn {
            suffixes: default_foreign_key_suffixes(),
        };
        assert_eq!(
            naming.candidate_name(&foreign_key("CategoryID", "CATEGORY")),
            Some("Category".to_string())
        );
        assert_eq!(
            naming.candidate_name(&foreign_key("PRODUCT_CATEGORY_ID", "PRODUCT_CATEGORY")),
            Some("ProductCategory".to_string())
        );
        assert_eq!(
            naming.candidate_name(&foreign_key("category_id", "CATEGORY")),
            Some("Category".to_string())
        );
        assert_eq!(naming.candidate_name(&foreign_key("ID", "CATEGORY")), None);
        assert_eq!(naming.candidate_name(&foreign_key("OWNER", "PERSON")), None);
    }

    #[test]
    fn navigation_naming_is_read_from_configuration() {
        let naming: NavigationNaming =
            serde_json::from_str(r#"{"strategy": "foreignKeyColumn"}"#).unwrap();
        assert_eq!(
            naming,
            NavigationNaming::ForeignKeyColumn {
                suffixes: default_foreign_key_suffixes()
            }
        );
        let naming: NavigationNaming =
            serde_json::from_str(r#"{"strategy": "referencedTable"}"#).unwrap();
        assert_eq!(naming, NavigationNaming::ReferencedTable);
    }
}
