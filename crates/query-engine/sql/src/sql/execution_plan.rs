//! Describe the statements to run and how to read their rows back.

use query_engine_metadata::metadata::ScalarType;

use super::ast;
use super::string::SQL;

/// A query to run against one entity set.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    pub select: ast::Select,
    pub shape: RowShape,
    /// Report the number of returned records.
    pub want_count: bool,
}

impl ExecutionPlan {
    pub fn query(&self) -> SQL {
        let mut sql = SQL::new();
        self.select.to_sql(&mut sql);
        sql
    }
}

/// A mutation to run against one entity set.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationPlan {
    /// Insert a row and read it back through its RETURNING clause.
    Insert {
        statement: ast::Insert,
        shape: RowShape,
    },
    /// Lock the row, then assign the supplied columns. `update` is `None`
    /// when the payload names no known property.
    Update {
        lookup: ast::Select,
        update: Option<ast::Update>,
    },
    Delete {
        statement: ast::Delete,
    },
}

impl MutationPlan {
    pub fn kind(&self) -> &'static str {
        match self {
            MutationPlan::Insert { .. } => "insert",
            MutationPlan::Update { .. } => "update",
            MutationPlan::Delete { .. } => "delete",
        }
    }
}

impl ast::Insert {
    pub fn query(&self) -> SQL {
        let mut sql = SQL::new();
        self.to_sql(&mut sql);
        sql
    }
}

impl ast::Update {
    pub fn query(&self) -> SQL {
        let mut sql = SQL::new();
        self.to_sql(&mut sql);
        sql
    }
}

impl ast::Delete {
    pub fn query(&self) -> SQL {
        let mut sql = SQL::new();
        self.to_sql(&mut sql);
        sql
    }
}

impl ast::Select {
    pub fn query(&self) -> SQL {
        let mut sql = SQL::new();
        self.to_sql(&mut sql);
        sql
    }
}

/// How the columns of a result row map onto the properties of an entity record.
#[derive(Debug, Clone, PartialEq)]
pub struct RowShape {
    /// The entity set the records belong to, used to build their ids.
    pub entity_set: String,
    pub columns: Vec<ColumnShape>,
    /// The key property names, in key order.
    pub key_properties: Vec<String>,
    pub expand: Option<ExpandShape>,
}

/// One selected column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnShape {
    pub property: String,
    pub alias: ast::ColumnAlias,
    pub scalar_type: ScalarType,
}

/// The joined columns that make up a nested record.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandShape {
    pub navigation_property: String,
    pub shape: Box<RowShape>,
}
