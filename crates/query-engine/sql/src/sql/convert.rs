//! Convert a SQL AST to a low-level SQL string.

use super::ast::*;
use super::helpers;
use super::string::*;

// Convert to SQL strings

impl SelectList {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            SelectList::SelectList(select_list) => {
                for (index, (col, expr)) in select_list.iter().enumerate() {
                    expr.to_sql(sql);
                    sql.append_syntax(" AS ");
                    col.to_sql(sql);
                    if index < (select_list.len() - 1) {
                        sql.append_syntax(", ");
                    }
                }
            }
            SelectList::Select1 => {
                sql.append_syntax("1");
            }
        }
    }
}

impl Select {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("SELECT ");

        self.select_list.to_sql(sql);

        if let Some(from) = &self.from {
            sql.append_syntax(" ");
            from.to_sql(sql);
        }

        for join in &self.joins {
            join.to_sql(sql);
        }

        self.where_.to_sql(sql);

        self.order_by.to_sql(sql);

        self.limit.to_sql(sql);

        if self.for_update {
            sql.append_syntax(" FOR UPDATE");
        }
    }
}

impl Insert {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("INSERT INTO ");
        self.schema.to_sql(sql);
        sql.append_syntax(".");
        self.table.to_sql(sql);
        sql.append_syntax(" AS ");
        self.alias.to_sql(sql);

        if self.columns.is_empty() {
            sql.append_syntax(" DEFAULT VALUES");
        } else {
            sql.append_syntax(" (");
            for (index, column) in self.columns.iter().enumerate() {
                column.to_sql(sql);
                if index < (self.columns.len() - 1) {
                    sql.append_syntax(", ");
                }
            }
            sql.append_syntax(") VALUES (");
            for (index, value) in self.values.iter().enumerate() {
                value.to_sql(sql);
                if index < (self.values.len() - 1) {
                    sql.append_syntax(", ");
                }
            }
            sql.append_syntax(")");
        }

        self.returning.to_sql(sql);
    }
}

impl MutationValueExpression {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            MutationValueExpression::Default => sql.append_syntax("DEFAULT"),
            MutationValueExpression::Expression(expression) => expression.to_sql(sql),
        }
    }
}

impl Update {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("UPDATE ");
        self.schema.to_sql(sql);
        sql.append_syntax(".");
        self.table.to_sql(sql);
        sql.append_syntax(" AS ");
        self.alias.to_sql(sql);

        sql.append_syntax(" SET ");
        for (index, (column, value)) in self.set.iter().enumerate() {
            column.to_sql(sql);
            sql.append_syntax(" = ");
            value.to_sql(sql);
            if index < (self.set.len() - 1) {
                sql.append_syntax(", ");
            }
        }

        self.where_.to_sql(sql);
    }
}

impl Delete {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("DELETE FROM ");
        self.schema.to_sql(sql);
        sql.append_syntax(".");
        self.table.to_sql(sql);
        sql.append_syntax(" AS ");
        self.alias.to_sql(sql);

        self.where_.to_sql(sql);
    }
}

impl Returning {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax(" RETURNING ");
        self.0.to_sql(sql);
    }
}

impl From {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("FROM ");
        match &self {
            From::Table { reference, alias } => {
                reference.to_sql(sql);
                sql.append_syntax(" AS ");
                alias.to_sql(sql);
            }
        }
    }
}

impl Join {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            Join::LeftOuterJoin(join) => {
                sql.append_syntax(" LEFT OUTER JOIN ");
                join.reference.to_sql(sql);
                sql.append_syntax(" AS ");
                join.alias.to_sql(sql);
                sql.append_syntax(" ON ");
                join.on.to_sql(sql);
            }
        }
    }
}

impl Where {
    pub fn to_sql(&self, sql: &mut SQL) {
        let Where(expression) = self;
        if *expression != helpers::true_expr() {
            sql.append_syntax(" WHERE ");
            expression.to_sql(sql);
        }
    }
}

// scalars
impl Expression {
    pub fn to_sql(&self, sql: &mut SQL) {
        match &self {
            Expression::ColumnReference(column_reference) => column_reference.to_sql(sql),
            Expression::Value(value) => value.to_sql(sql),
            Expression::And { left, right } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                sql.append_syntax(" AND ");
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::Not(expr) => {
                sql.append_syntax("NOT ");
                expr.to_sql(sql);
            }
            Expression::BinaryOperation {
                left,
                operator,
                right,
            } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                operator.to_sql(sql);
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::UnaryOperation {
                expression,
                operator,
            } => {
                sql.append_syntax("(");
                expression.to_sql(sql);
                operator.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::Cast {
                expression,
                r#type,
            } => {
                sql.append_syntax("cast(");
                expression.to_sql(sql);
                sql.append_syntax(" as ");
                r#type.to_sql(sql);
                sql.append_syntax(")");
            }
        }
    }
}

impl UnaryOperator {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            UnaryOperator::IsNull => sql.append_syntax(" IS NULL"),
        }
    }
}

impl BinaryOperator {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax(" ");
        sql.append_syntax(&self.0);
        sql.append_syntax(" ");
    }
}

impl Value {
    pub fn to_sql(&self, sql: &mut SQL) {
        match &self {
            Value::Int8(i) => sql.append_param(Param::Int8(*i)),
            Value::Float8(f) => sql.append_param(Param::Float8(*f)),
            Value::Bool(b) => sql.append_param(Param::Bool(*b)),
            Value::String(s) => sql.append_param(Param::String(s.clone())),
            Value::Null => sql.append_syntax("NULL"),
        }
    }
}

impl ScalarTypeName {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.0);
    }
}

impl OrderBy {
    pub fn to_sql(&self, sql: &mut SQL) {
        if !self.elements.is_empty() {
            sql.append_syntax(" ORDER BY ");
            for (index, order_by_item) in self.elements.iter().enumerate() {
                order_by_item.to_sql(sql);
                if index < (self.elements.len() - 1) {
                    sql.append_syntax(", ");
                }
            }
        }
    }
}

impl OrderByElement {
    pub fn to_sql(&self, sql: &mut SQL) {
        self.target.to_sql(sql);
        self.direction.to_sql(sql);
    }
}

impl OrderByDirection {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            OrderByDirection::Asc => sql.append_syntax(" ASC"),
            OrderByDirection::Desc => sql.append_syntax(" DESC"),
        }
    }
}

impl Limit {
    pub fn to_sql(&self, sql: &mut SQL) {
        if let Some(limit) = self.limit {
            sql.append_syntax(" LIMIT ");
            sql.append_syntax(format!("{limit}").as_str());
        }
        if let Some(offset) = self.offset {
            sql.append_syntax(" OFFSET ");
            sql.append_syntax(format!("{offset}").as_str());
        }
    }
}

// names
impl SchemaName {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.0);
    }
}

impl TableName {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.0);
    }
}

impl TableReference {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            TableReference::DBTable { schema, table } => {
                schema.to_sql(sql);
                sql.append_syntax(".");
                table.to_sql(sql);
            }
            TableReference::AliasedTable(alias) => alias.to_sql(sql),
        };
    }
}

impl TableAlias {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.name);
    }
}

impl ColumnName {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.0);
    }
}

impl ColumnReference {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            ColumnReference::TableColumn { table, name } => {
                table.to_sql(sql);
                sql.append_syntax(".");
                name.to_sql(sql);
            }
        };
    }
}

impl ColumnAlias {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn product_table() -> TableReference {
        TableReference::DBTable {
            schema: SchemaName("public".to_string()),
            table: TableName("product".to_string()),
        }
    }

    #[test]
    fn select_with_join_filter_order_and_limit() {
        let main = helpers::make_table_alias("T".to_string());
        let joined = helpers::make_table_alias("J".to_string());
        let main_ref = TableReference::AliasedTable(main.clone());
        let joined_ref = TableReference::AliasedTable(joined.clone());

        let mut select = helpers::simple_select(vec![
            helpers::make_column(
                main_ref.clone(),
                ColumnName("ID".to_string()),
                helpers::make_column_alias("ID".to_string()),
            ),
            helpers::make_column(
                joined_ref.clone(),
                ColumnName("Name".to_string()),
                helpers::make_column_alias("Category_Name".to_string()),
            ),
        ]);
        select.from = Some(From::Table {
            reference: product_table(),
            alias: main,
        });
        select.joins = vec![Join::LeftOuterJoin(LeftOuterJoin {
            reference: TableReference::DBTable {
                schema: SchemaName("public".to_string()),
                table: TableName("category".to_string()),
            },
            alias: joined,
            on: helpers::equals(
                helpers::column_reference(main_ref.clone(), "CategoryID"),
                helpers::column_reference(joined_ref, "ID"),
            ),
        })];
        select.where_ = Where(helpers::and(
            helpers::equals(
                helpers::column_reference(main_ref.clone(), "ID"),
                Expression::Value(Value::Int8(1)),
            ),
            Expression::BinaryOperation {
                left: Box::new(helpers::column_reference(main_ref.clone(), "Price")),
                operator: BinaryOperator(">".to_string()),
                right: Box::new(Expression::Value(Value::Float8(500.0))),
            },
        ));
        select.order_by = OrderBy {
            elements: vec![OrderByElement {
                target: helpers::column_reference(main_ref, "Price"),
                direction: OrderByDirection::Desc,
            }],
        };
        select.limit = Limit {
            limit: Some(10),
            offset: Some(20),
        };

        let mut sql = SQL::new();
        select.to_sql(&mut sql);
        assert_eq!(
            sql.sql,
            r#"SELECT "T"."ID" AS "ID", "J"."Name" AS "Category_Name" FROM "public"."product" AS "T" LEFT OUTER JOIN "public"."category" AS "J" ON ("T"."CategoryID" = "J"."ID") WHERE (("T"."ID" = $1) AND ("T"."Price" > $2)) ORDER BY "T"."Price" DESC LIMIT 10 OFFSET 20"#
        );
        assert_eq!(sql.params, vec![Param::Int8(1), Param::Float8(500.0)]);
    }

    #[test]
    fn insert_uses_default_for_missing_values() {
        let insert = Insert {
            schema: SchemaName("public".to_string()),
            table: TableName("product".to_string()),
            alias: helpers::make_table_alias("T".to_string()),
            columns: vec![
                ColumnName("ID".to_string()),
                ColumnName("Price".to_string()),
            ],
            values: vec![
                MutationValueExpression::Default,
                MutationValueExpression::Expression(Expression::Cast {
                    expression: Box::new(Expression::Value(Value::String("9.99".to_string()))),
                    r#type: ScalarTypeName("numeric".to_string()),
                }),
            ],
            returning: Returning(SelectList::SelectList(vec![helpers::make_column(
                TableReference::AliasedTable(helpers::make_table_alias("T".to_string())),
                ColumnName("ID".to_string()),
                helpers::make_column_alias("ID".to_string()),
            )])),
        };
        let mut sql = SQL::new();
        insert.to_sql(&mut sql);
        assert_eq!(
            sql.sql,
            r#"INSERT INTO "public"."product" AS "T" ("ID", "Price") VALUES (DEFAULT, cast($1 as "numeric")) RETURNING "T"."ID" AS "ID""#
        );
        assert_eq!(sql.params, vec![Param::String("9.99".to_string())]);
    }

    #[test]
    fn null_is_rendered_inline() {
        let mut sql = SQL::new();
        Expression::UnaryOperation {
            expression: Box::new(Expression::Value(Value::Null)),
            operator: UnaryOperator::IsNull,
        }
        .to_sql(&mut sql);
        assert_eq!(sql.sql, "(NULL IS NULL)");
        assert!(sql.params.is_empty());
    }
}
