//! Guards for the parts of a statement that cannot be bound as parameters.
//!
//! Values always travel as positional arguments, but table names, column
//! names and comparison operators are spliced into the SQL text. Everything
//! spliced in passes through one of these checks first.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    error::{QueryError, Result},
    expr::ops::Operator,
};

static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("unable to compile identifier regex")
});

fn is_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

/// Checks that `name` is a plain SQL identifier.
///
/// # Examples
///
/// ```
/// use strata_query::validate::validate_identifier;
///
/// assert!(validate_identifier("users").is_ok());
/// assert!(validate_identifier("a-b").is_err());
/// ```
pub fn validate_identifier(name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(QueryError::InvalidIdentifier(name.to_string()))
    }
}

/// Checks a table name against the identifier grammar.
pub fn validate_table_name(name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(QueryError::InvalidTableName(name.to_string()))
    }
}

/// Checks a column reference: either `column` or `qualifier.column`, each
/// part an identifier.
pub fn validate_column_name(name: &str) -> Result<()> {
    let mut parts = name.splitn(2, '.');
    let valid = parts.all(is_identifier);
    if valid {
        Ok(())
    } else {
        Err(QueryError::InvalidIdentifier(name.to_string()))
    }
}

/// Checks `op` against the operator whitelist, case-insensitively.
///
/// Runs of whitespace inside multi-word operators are normalized, so
/// `"not   like"` resolves to [`Operator::NotLike`].
pub fn validate_operator(op: &str) -> Result<Operator> {
    let normalized = op.split_whitespace().collect::<Vec<_>>().join(" ");
    Operator::from_keyword(&normalized.to_ascii_uppercase())
        .ok_or_else(|| QueryError::InvalidOperator(op.to_string()))
}
