//! An in-memory catalog of a small product database.

use query_engine_metadata::metadata::{
    ColumnInfo, EntityModel, ForeignKeyInfo, NamingConventions, Nullable, ScalarType,
    SchemaModel, TableInfo, TablesInfo,
};

fn column(name: &str, r#type: ScalarType, type_name: &str, nullable: Nullable) -> ColumnInfo {
    ColumnInfo {
        name: name.to_string(),
        r#type,
        type_name: type_name.to_string(),
        nullable,
    }
}

/// Tables `category`, `product`, `order_line` and `event` of schema `public`.
///
/// `product.CategoryID` references `category.ID`. `order_line` has a composite key.
pub fn product_catalog() -> SchemaModel {
    product_catalog_in("public")
}

/// [`product_catalog`] in another schema, as created by
/// [`crate::database::TestDatabase`].
pub fn product_catalog_in(schema_name: &str) -> SchemaModel {
    SchemaModel {
        schema_name: schema_name.to_string(),
        tables: TablesInfo::from_iter([
            TableInfo {
                table_name: "category".to_string(),
                columns: vec![
                    column("ID", ScalarType::Integer, "int4", Nullable::NonNullable),
                    column(
                        "Name",
                        ScalarType::CharacterVarying,
                        "varchar",
                        Nullable::Nullable,
                    ),
                ],
                primary_key_columns: vec!["ID".to_string()],
                foreign_keys: vec![],
            },
            TableInfo {
                table_name: "product".to_string(),
                columns: vec![
                    column("ID", ScalarType::Integer, "int4", Nullable::NonNullable),
                    column(
                        "Name",
                        ScalarType::CharacterVarying,
                        "varchar",
                        Nullable::Nullable,
                    ),
                    column("Description", ScalarType::Text, "text", Nullable::Nullable),
                    column("Price", ScalarType::Numeric, "numeric", Nullable::Nullable),
                    column("CategoryID", ScalarType::Integer, "int4", Nullable::Nullable),
                ],
                primary_key_columns: vec!["ID".to_string()],
                foreign_keys: vec![ForeignKeyInfo {
                    constraint_name: "product_CategoryID_fkey".to_string(),
                    source_column: "CategoryID".to_string(),
                    target_table: "category".to_string(),
                    target_column: "ID".to_string(),
                }],
            },
            TableInfo {
                table_name: "order_line".to_string(),
                columns: vec![
                    column("OrderID", ScalarType::Integer, "int4", Nullable::NonNullable),
                    column("LineNo", ScalarType::Integer, "int4", Nullable::NonNullable),
                    column("Quantity", ScalarType::Integer, "int4", Nullable::Nullable),
                ],
                primary_key_columns: vec!["OrderID".to_string(), "LineNo".to_string()],
                foreign_keys: vec![],
            },
            TableInfo {
                table_name: "event".to_string(),
                columns: vec![
                    column("ID", ScalarType::Uuid, "uuid", Nullable::NonNullable),
                    column("Title", ScalarType::Text, "text", Nullable::Nullable),
                    column(
                        "StartsAt",
                        ScalarType::TimestampWithTimeZone,
                        "timestamptz",
                        Nullable::Nullable,
                    ),
                    column("Day", ScalarType::Date, "date", Nullable::Nullable),
                    column("Active", ScalarType::Boolean, "bool", Nullable::Nullable),
                ],
                primary_key_columns: vec!["ID".to_string()],
                foreign_keys: vec![],
            },
        ]),
    }
}

/// The entity model of [`product_catalog`] with the default naming conventions.
///
/// Entity sets: `Categories`, `Products`, `OrderLines` and `Events`.
pub fn product_catalog_model() -> EntityModel {
    EntityModel::new(product_catalog(), &NamingConventions::default())
}
