//! Type definitions of a low-level SQL string representation.

/// A SQL statement with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SQL {
    pub sql: String,
    pub params: Vec<Param>,
    /// for internal use and tests only
    pub param_index: u64,
}

impl Default for SQL {
    fn default() -> Self {
        Self::new()
    }
}

/// A parameter for a parameterized query.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    String(String),
    Int8(i64),
    Float8(f64),
    Bool(bool),
}

impl SQL {
    pub fn new() -> SQL {
        SQL {
            sql: String::new(),
            params: vec![],
            param_index: 0,
        }
    }
    pub fn append_syntax(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }
    /// Append a quoted identifier. Embedded double quotes are doubled.
    pub fn append_identifier(&mut self, identifier: &str) {
        self.sql.push('"');
        self.sql.push_str(&identifier.replace('"', "\"\""));
        self.sql.push('"');
    }
    pub fn append_param(&mut self, param: Param) {
        self.param_index += 1;
        self.sql.push_str(format!("${}", self.param_index).as_str());
        self.params.push(param);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_cannot_escape_their_quotes() {
        let mut sql = SQL::new();
        sql.append_identifier("Name\"; DROP TABLE x; --");
        assert_eq!(sql.sql, "\"Name\"\"; DROP TABLE x; --\"");
    }

    #[test]
    fn params_are_numbered_in_order() {
        let mut sql = SQL::new();
        sql.append_param(Param::Int8(1));
        sql.append_syntax(" ");
        sql.append_param(Param::String("x".to_string()));
        assert_eq!(sql.sql, "$1 $2");
        assert_eq!(
            sql.params,
            vec![Param::Int8(1), Param::String("x".to_string())]
        );
    }
}
