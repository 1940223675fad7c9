//! Single-table SELECT driven by a condition tree.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    error::Result,
    expr::condition::Condition,
    options::{CompileOptions, Pagination},
    statement::Statement,
    validate::validate_table_name,
};

/// A condition tree plus the ordering and pagination of a plain
/// `SELECT * FROM <table>`.
///
/// `group_by` and `order_by` are raw SQL inserted verbatim.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SimpleSelect {
    #[serde(
        default,
        rename = "where",
        alias = "filter",
        skip_serializing_if = "Option::is_none"
    )]
    pub filter: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl SimpleSelect {
    pub fn new(filter: Condition) -> Self {
        Self {
            filter: Some(filter),
            ..Default::default()
        }
    }

    pub fn group_by(mut self, group_by: impl Into<String>) -> Self {
        self.group_by = Some(group_by.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Compiles `SELECT * FROM <table> [WHERE] [GROUP BY] [ORDER BY] [LIMIT] [OFFSET]`.
///
/// # Example
///
/// ```
/// use strata_query::{to_select_string, CompileOptions, Condition, SimpleSelect, Value};
///
/// let query = SimpleSelect::new(Condition::leaf("age", ">", 18));
/// let stmt = to_select_string("users", &query, &CompileOptions::default()).unwrap();
///
/// assert_eq!(stmt.sql, "SELECT * FROM users WHERE age > ?");
/// assert_eq!(stmt.args, vec![Value::from(18)]);
/// ```
pub fn to_select_string(
    table: &str,
    query: &SimpleSelect,
    options: &CompileOptions,
) -> Result<Statement> {
    validate_table_name(table)?;
    trace!(table, "compiling simple select");

    let mut params = Vec::new();
    let mut sql = format!("SELECT * FROM {}", table);

    if let Some(filter) = &query.filter {
        let fragment = filter.compile_into(&mut params)?;
        if !fragment.is_empty() {
            sql.push_str(&format!(" WHERE {}", fragment));
        }
    }

    if let Some(group_by) = raw_clause(&query.group_by) {
        sql.push_str(&format!(" GROUP BY {}", group_by));
    }

    if let Some(order_by) = raw_clause(&query.order_by) {
        sql.push_str(&format!(" ORDER BY {}", order_by));
    }

    sql.push_str(&Pagination::new(query.limit, query.offset).to_sql(options.default_page_size));

    Ok(Statement::new(sql, params))
}

fn raw_clause(clause: &Option<String>) -> Option<&str> {
    clause.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::QueryError, value::Value};

    #[test]
    fn test_single_leaf() {
        let query = SimpleSelect::new(Condition::leaf("age", ">", 18));
        let stmt = to_select_string("users", &query, &CompileOptions::default()).unwrap();

        assert_eq!(stmt.sql, "SELECT * FROM users WHERE age > ?");
        assert_eq!(stmt.args, vec![Value::Integer(18)]);
    }

    #[test]
    fn test_or_branch() {
        let query = SimpleSelect::new(Condition::any(vec![
            Condition::leaf("role", "=", "admin"),
            Condition::leaf("role", "=", "mod"),
        ]));
        let stmt = to_select_string("users", &query, &CompileOptions::default()).unwrap();

        assert_eq!(stmt.sql, "SELECT * FROM users WHERE (role = ? OR role = ?)");
        assert_eq!(stmt.args, vec![Value::from("admin"), Value::from("mod")]);
    }

    #[test]
    fn test_grouping_ordering_pagination() {
        let query = SimpleSelect::new(Condition::leaf("age", ">=", 21))
            .group_by("country")
            .order_by("country ASC")
            .limit(10)
            .offset(30);
        let stmt = to_select_string("users", &query, &CompileOptions::default()).unwrap();

        assert_eq!(
            stmt.sql,
            "SELECT * FROM users WHERE age >= ? GROUP BY country ORDER BY country ASC LIMIT 10 OFFSET 30"
        );
    }

    #[test]
    fn test_offset_only_gets_default_limit() {
        let query = SimpleSelect::default().offset(5);
        let options = CompileOptions::default().with_default_page_size(50);
        let stmt = to_select_string("users", &query, &options).unwrap();

        assert_eq!(stmt.sql, "SELECT * FROM users LIMIT 50 OFFSET 5");
    }

    #[test]
    fn test_invalid_table_produces_no_sql() {
        let query = SimpleSelect::new(Condition::leaf("age", ">", 18));
        let result = to_select_string("users; DROP TABLE x", &query, &CompileOptions::default());

        assert_eq!(
            result,
            Err(QueryError::InvalidTableName("users; DROP TABLE x".into()))
        );
    }

    #[test]
    fn test_no_filter() {
        let stmt = to_select_string("users", &SimpleSelect::default(), &CompileOptions::default())
            .unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM users");
        assert!(stmt.args.is_empty());
    }
}
