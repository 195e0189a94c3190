//! The entity model derived from the introspected tables.

use std::collections::BTreeMap;

use serde::Serialize;

use super::database::{ColumnInfo, EdmType, Nullable, TableInfo, TablesInfo};
use super::naming::{self, NamingConventions};
use super::SchemaModel;

/// A structural property of an entity type, backed by one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    pub r#type: EdmType,
    pub nullable: bool,
    #[serde(skip)]
    pub column: ColumnInfo,
}

/// A navigation property, backed by a single-column foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationProperty {
    pub name: String,
    pub target_type: String,
    /// Column on the owning table.
    #[serde(skip)]
    pub source_column: String,
    /// Column on the target table.
    #[serde(skip)]
    pub target_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityType {
    pub name: String,
    /// The key under which the backing table is stored in [`TablesInfo`].
    #[serde(skip)]
    pub table: String,
    pub properties: Vec<Property>,
    pub key_properties: Vec<String>,
    pub navigation_properties: Vec<NavigationProperty>,
}

impl EntityType {
    /// Property lookup. An exact match wins, otherwise the first case-insensitive match.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|property| property.name == name)
            .or_else(|| {
                self.properties
                    .iter()
                    .find(|property| property.name.eq_ignore_ascii_case(name))
            })
    }

    /// Navigation property lookup, with the same matching rules as [`EntityType::property`].
    pub fn navigation_property(&self, name: &str) -> Option<&NavigationProperty> {
        self.navigation_properties
            .iter()
            .find(|navigation| navigation.name == name)
            .or_else(|| {
                self.navigation_properties
                    .iter()
                    .find(|navigation| navigation.name.eq_ignore_ascii_case(name))
            })
    }

    pub fn key_properties(&self) -> impl Iterator<Item = &Property> {
        self.key_properties
            .iter()
            .filter_map(|name| self.properties.iter().find(|p| &p.name == name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySet {
    pub name: String,
    pub entity_type: String,
    /// Navigation property name -> target entity set name.
    pub navigation_bindings: BTreeMap<String, String>,
}

/// The entity types and sets of a schema, built once and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityModel {
    #[serde(skip)]
    schema: SchemaModel,
    entity_types: BTreeMap<String, EntityType>,
    entity_sets: BTreeMap<String, EntitySet>,
    /// Lowercased entity set name -> entity set name.
    #[serde(skip)]
    entity_set_index: BTreeMap<String, String>,
}

impl EntityModel {
    pub fn new(schema: SchemaModel, naming: &NamingConventions) -> Self {
        let mut entity_types: BTreeMap<String, EntityType> = BTreeMap::new();
        let mut entity_set_names: BTreeMap<String, String> = BTreeMap::new();

        for (key, table) in &schema.tables.0 {
            let name = naming::entity_type_name(&table.table_name);
            if let Some(existing) = entity_types.get(&name).map(|t| &t.table) {
                tracing::warn!(
                    table = %table.table_name,
                    entity_type = %name,
                    existing_table = %existing,
                    "Skipping table whose entity type name is already taken"
                );
                continue;
            }
            entity_set_names.insert(key.clone(), naming.entity_set_name(&table.table_name));
            entity_types.insert(name.clone(), structural_type(name, key, table));
        }

        // Navigation properties need every entity type to be known first.
        let type_by_table = entity_types
            .values()
            .map(|entity_type| (entity_type.table.clone(), entity_type.name.clone()))
            .collect::<BTreeMap<_, _>>();
        for entity_type in entity_types.values_mut() {
            if let Some(table) = schema.tables.0.get(&entity_type.table) {
                entity_type.navigation_properties =
                    navigation_properties(table, &type_by_table, naming);
            }
        }

        let mut entity_sets = BTreeMap::new();
        let mut entity_set_index: BTreeMap<String, String> = BTreeMap::new();
        for entity_type in entity_types.values() {
            let Some(set_name) = entity_set_names.get(&entity_type.table) else {
                continue;
            };
            if let Some(existing) = entity_set_index.get(&set_name.to_lowercase()) {
                tracing::warn!(
                    entity_set = %set_name,
                    existing_entity_set = %existing,
                    entity_type = %entity_type.name,
                    "Skipping entity set whose name is already taken"
                );
                continue;
            }
            let navigation_bindings = entity_type
                .navigation_properties
                .iter()
                .filter_map(|navigation| {
                    let target = entity_types.get(&navigation.target_type)?;
                    let target_set = entity_set_names.get(&target.table)?;
                    Some((navigation.name.clone(), target_set.clone()))
                })
                .collect();
            entity_set_index.insert(set_name.to_lowercase(), set_name.clone());
            entity_sets.insert(
                set_name.clone(),
                EntitySet {
                    name: set_name.clone(),
                    entity_type: entity_type.name.clone(),
                    navigation_bindings,
                },
            );
        }

        EntityModel {
            schema,
            entity_types,
            entity_sets,
            entity_set_index,
        }
    }

    pub fn schema(&self) -> &SchemaModel {
        &self.schema
    }

    pub fn entity_sets(&self) -> impl Iterator<Item = &EntitySet> {
        self.entity_sets.values()
    }

    pub fn entity_type(&self, name: &str) -> Option<&EntityType> {
        self.entity_types.get(name)
    }

    /// Resolve a wire entity set name (case-insensitively) to the set, its type and table.
    ///
    /// The plural suffix is stripped first, which finds the table directly for names
    /// built by the default transform; overridden and irregular names are found
    /// through the index of derived names.
    pub fn lookup_entity_set(
        &self,
        entity_set_name: &str,
    ) -> Option<(&EntitySet, &EntityType, &TableInfo)> {
        let by_table_name = self
            .schema
            .tables
            .get(&naming::table_name_for_entity_set(entity_set_name))
            .and_then(|table| {
                self.entity_types
                    .values()
                    .find(|entity_type| entity_type.table == TablesInfo::key(&table.table_name))
            })
            .and_then(|entity_type| {
                self.entity_sets
                    .values()
                    .find(|set| set.entity_type == entity_type.name)
            })
            .filter(|set| set.name.eq_ignore_ascii_case(entity_set_name));

        let entity_set = match by_table_name {
            Some(set) => set,
            None => {
                let name = self.entity_set_index.get(&entity_set_name.to_lowercase())?;
                self.entity_sets.get(name)?
            }
        };
        let entity_type = self.entity_types.get(&entity_set.entity_type)?;
        let table = self.schema.tables.0.get(&entity_type.table)?;
        Some((entity_set, entity_type, table))
    }

    /// The entity set exposing the given entity type.
    pub fn entity_set_for_type(&self, entity_type: &str) -> Option<&EntitySet> {
        self.entity_sets
            .values()
            .find(|set| set.entity_type == entity_type)
    }

    /// The table backing the given entity type.
    pub fn table_for_type(&self, entity_type: &str) -> Option<&TableInfo> {
        let entity_type = self.entity_types.get(entity_type)?;
        self.schema.tables.0.get(&entity_type.table)
    }
}

fn structural_type(name: String, key: &str, table: &TableInfo) -> EntityType {
    let properties = table
        .columns
        .iter()
        .map(|column| Property {
            name: column.name.clone(),
            r#type: column.r#type.edm_type(),
            nullable: column.nullable == Nullable::Nullable,
            column: column.clone(),
        })
        .collect();
    EntityType {
        name,
        table: key.to_string(),
        properties,
        key_properties: table.primary_key_columns.clone(),
        navigation_properties: vec![],
    }
}

fn navigation_properties(
    table: &TableInfo,
    type_by_table: &BTreeMap<String, String>,
    naming: &NamingConventions,
) -> Vec<NavigationProperty> {
    let mut columns_per_constraint: BTreeMap<&str, usize> = BTreeMap::new();
    for foreign_key in &table.foreign_keys {
        if !foreign_key.constraint_name.is_empty() {
            *columns_per_constraint
                .entry(foreign_key.constraint_name.as_str())
                .or_default() += 1;
        }
    }

    let mut navigation_properties: Vec<NavigationProperty> = vec![];
    for foreign_key in &table.foreign_keys {
        let constraint = foreign_key.constraint_name.as_str();
        if columns_per_constraint.get(constraint).is_some_and(|count| *count > 1) {
            tracing::warn!(
                table = %table.table_name,
                column = %foreign_key.source_column,
                constraint = %constraint,
                "Skipping foreign key over several columns"
            );
            continue;
        }
        let Some(target_type) = type_by_table.get(&TablesInfo::key(&foreign_key.target_table))
        else {
            tracing::warn!(
                table = %table.table_name,
                column = %foreign_key.source_column,
                target_table = %foreign_key.target_table,
                "Skipping foreign key to a table that is not exposed"
            );
            continue;
        };
        let candidate = naming.navigation_properties.candidate_name(foreign_key);
        let Some(name) = candidate.filter(|name| name == target_type) else {
            tracing::warn!(
                table = %table.table_name,
                column = %foreign_key.source_column,
                target_table = %foreign_key.target_table,
                "Skipping foreign key that does not name a navigation property"
            );
            continue;
        };
        if navigation_properties.iter().any(|existing| existing.name == name) {
            tracing::warn!(
                table = %table.table_name,
                column = %foreign_key.source_column,
                navigation_property = %name,
                "Skipping ambiguous foreign key, the navigation property is already defined"
            );
            continue;
        }
        if table.column(&name).is_some() {
            tracing::warn!(
                table = %table.table_name,
                navigation_property = %name,
                "Skipping navigation property that clashes with a column"
            );
            continue;
        }
        navigation_properties.push(NavigationProperty {
            name,
            target_type: target_type.clone(),
            source_column: foreign_key.source_column.clone(),
            target_column: foreign_key.target_column.clone(),
        });
    }
    navigation_properties
}
