//! Error types for strata-query.

use miette::Diagnostic;
use thiserror::Error;

/// Compilation error type for strata-query operations.
///
/// Every compile entry point returns either a complete statement or one of
/// these; no partial SQL text ever accompanies an error.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid identifier: {0:?}")]
    #[diagnostic(
        code(strata_query::invalid_identifier),
        help("Identifiers must match ^[A-Za-z_][A-Za-z0-9_]*$")
    )]
    InvalidIdentifier(String),

    #[error("Invalid table name: {0:?}")]
    #[diagnostic(
        code(strata_query::invalid_table_name),
        help("Table names must match ^[A-Za-z_][A-Za-z0-9_]*$")
    )]
    InvalidTableName(String),

    #[error("Invalid operator: {0:?}")]
    #[diagnostic(
        code(strata_query::invalid_operator),
        help("Use one of =, !=, <>, >, <, >=, <=, LIKE, NOT LIKE, ILIKE, IN, NOT IN, BETWEEN, IS, IS NOT, IS NULL, IS NOT NULL")
    )]
    InvalidOperator(String),

    #[error("Malformed condition: {0}")]
    #[diagnostic(
        code(strata_query::malformed_condition),
        help("A comparison needs both a field and an operator")
    )]
    MalformedCondition(String),

    #[error("Empty input: {0}")]
    #[diagnostic(code(strata_query::empty_input))]
    EmptyInput(String),

    #[error("Row {row} does not match the batch schema: expected {expected}, found {found}")]
    #[diagnostic(
        code(strata_query::schema_mismatch),
        help("Every row in a batch must target the first row's table with the same set of columns")
    )]
    SchemaMismatch {
        row: usize,
        expected: String,
        found: String,
    },

    #[error("Row {row} lists column {column:?} more than once")]
    #[diagnostic(
        code(strata_query::duplicate_column),
        help("Each column may appear only once per row")
    )]
    DuplicateColumn { row: usize, column: String },

    #[error("{kind} JOIN on {table:?} has no ON condition")]
    #[diagnostic(
        code(strata_query::missing_join_condition),
        help("Only CROSS joins may omit the ON condition")
    )]
    MissingJoinCondition { kind: &'static str, table: String },
}

/// Result type alias for strata-query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
