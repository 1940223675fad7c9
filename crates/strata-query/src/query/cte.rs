//! WITH-clause compilation.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    error::{QueryError, Result},
    options::CompileOptions,
    query::select::ComplexQuery,
    validate::validate_identifier,
    value::Value,
};

/// Body of a common table expression.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CteBody {
    /// Compiled recursively, arguments included.
    Query(Box<ComplexQuery>),
    /// Trusted SQL inserted verbatim, never validated. Do not build it from
    /// untrusted input.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CommonTableExpression {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    pub body: CteBody,
    #[serde(default)]
    pub recursive: bool,
}

impl CommonTableExpression {
    pub fn query(name: impl Into<String>, query: ComplexQuery) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            body: CteBody::Query(Box::new(query)),
            recursive: false,
        }
    }

    pub fn raw(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            body: CteBody::Raw(sql.into()),
            recursive: false,
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Renders `name[ (c1, c2)] AS (<body>)`, appending body arguments.
    fn compile_into(&self, options: &CompileOptions, params: &mut Vec<Value>) -> Result<String> {
        validate_identifier(&self.name)?;
        for column in &self.columns {
            validate_identifier(column)?;
        }

        let body = match &self.body {
            CteBody::Query(query) => {
                let stmt = query.compile(options)?;
                params.extend(stmt.args);
                stmt.sql
            }
            CteBody::Raw(sql) if sql.trim().is_empty() => {
                return Err(QueryError::EmptyInput(format!(
                    "common table expression {:?} has no body",
                    self.name
                )));
            }
            CteBody::Raw(sql) => sql.trim().to_string(),
        };

        let mut sql = self.name.clone();
        if !self.columns.is_empty() {
            sql.push_str(&format!(" ({})", self.columns.join(", ")));
        }
        sql.push_str(&format!(" AS ({})", body));
        Ok(sql)
    }
}

/// RECURSIVE qualifies the whole WITH clause, so a single recursive entry
/// makes the entire clause recursive.
pub fn is_recursive_clause(ctes: &[CommonTableExpression]) -> bool {
    ctes.iter().any(|cte| cte.recursive)
}

/// Compiles `WITH [RECURSIVE] a AS (...), b AS (...)`.
///
/// Returns an empty string and no arguments for an empty list. Arguments
/// follow declaration order.
pub fn compile_with_clause(
    ctes: &[CommonTableExpression],
    options: &CompileOptions,
) -> Result<(String, Vec<Value>)> {
    if ctes.is_empty() {
        return Ok((String::new(), Vec::new()));
    }

    trace!(count = ctes.len(), "compiling WITH clause");

    let mut params = Vec::new();
    let entries = ctes
        .iter()
        .map(|cte| cte.compile_into(options, &mut params))
        .collect::<Result<Vec<_>>>()?;

    let keyword = if is_recursive_clause(ctes) {
        "WITH RECURSIVE"
    } else {
        "WITH"
    };

    Ok((format!("{} {}", keyword, entries.join(", ")), params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Condition;

    #[test]
    fn test_single_query_cte() {
        let body = ComplexQuery::from("users")
            .select(["id", "name"])
            .filter(Condition::leaf("status", "=", "active"));
        let ctes = [CommonTableExpression::query("active", body)];

        let (sql, args) = compile_with_clause(&ctes, &CompileOptions::default()).unwrap();
        assert_eq!(
            sql,
            "WITH active AS (SELECT id, name FROM users WHERE status = ?)"
        );
        assert_eq!(args, vec![Value::from("active")]);
    }

    #[test]
    fn test_recursive_is_clause_level() {
        let ctes = [
            CommonTableExpression::raw("a", "SELECT 1"),
            CommonTableExpression::raw("tree", "SELECT id FROM nodes UNION ALL SELECT 2")
                .columns(["id"])
                .recursive(true),
        ];
        assert!(is_recursive_clause(&ctes));

        let (sql, args) = compile_with_clause(&ctes, &CompileOptions::default()).unwrap();
        assert_eq!(
            sql,
            "WITH RECURSIVE a AS (SELECT 1), tree (id) AS (SELECT id FROM nodes UNION ALL SELECT 2)"
        );
        assert!(args.is_empty());
    }

    #[test]
    fn test_args_follow_declaration_order() {
        let first = ComplexQuery::from("a").filter(Condition::leaf("x", "=", 1));
        let second = ComplexQuery::from("b").filter(Condition::leaf("y", "=", 2));
        let ctes = [
            CommonTableExpression::query("first", first),
            CommonTableExpression::raw("middle", "SELECT 0"),
            CommonTableExpression::query("second", second),
        ];

        let (_, args) = compile_with_clause(&ctes, &CompileOptions::default()).unwrap();
        assert_eq!(args, vec![Value::from(1), Value::from(2)]);
    }

    #[test]
    fn test_invalid_name_rejected() {
        let ctes = [CommonTableExpression::raw("bad name", "SELECT 1")];
        let err = compile_with_clause(&ctes, &CompileOptions::default()).unwrap_err();
        assert_eq!(err, QueryError::InvalidIdentifier("bad name".into()));
    }

    #[test]
    fn test_empty_raw_body_rejected() {
        let ctes = [CommonTableExpression::raw("empty", "   ")];
        let err = compile_with_clause(&ctes, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, QueryError::EmptyInput(_)));
    }

    #[test]
    fn test_empty_list() {
        let (sql, args) = compile_with_clause(&[], &CompileOptions::default()).unwrap();
        assert!(sql.is_empty());
        assert!(args.is_empty());
    }
}
