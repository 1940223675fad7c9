use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{QueryError, Result},
    validate::{validate_identifier, validate_table_name},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinKind {
    #[default]
    #[serde(alias = "inner")]
    Inner,
    #[serde(alias = "left")]
    Left,
    #[serde(alias = "right")]
    Right,
    #[serde(alias = "full")]
    Full,
    #[serde(alias = "cross")]
    Cross,
}

impl JoinKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL",
            JoinKind::Cross => "CROSS",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One JOIN of a [`super::ComplexQuery`].
///
/// `on` is raw SQL and is inserted verbatim: it must never carry untrusted
/// input. Values that vary belong in the WHERE condition, which is bound.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Join {
    #[serde(default)]
    pub kind: JoinKind,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<String>,
}

impl Join {
    pub fn new(kind: JoinKind, table: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            alias: None,
            on: None,
        }
    }

    pub fn inner(table: impl Into<String>, on: impl Into<String>) -> Self {
        Self::new(JoinKind::Inner, table).on(on)
    }

    pub fn left(table: impl Into<String>, on: impl Into<String>) -> Self {
        Self::new(JoinKind::Left, table).on(on)
    }

    pub fn right(table: impl Into<String>, on: impl Into<String>) -> Self {
        Self::new(JoinKind::Right, table).on(on)
    }

    pub fn full(table: impl Into<String>, on: impl Into<String>) -> Self {
        Self::new(JoinKind::Full, table).on(on)
    }

    pub fn cross(table: impl Into<String>) -> Self {
        Self::new(JoinKind::Cross, table)
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn on(mut self, on: impl Into<String>) -> Self {
        self.on = Some(on.into());
        self
    }

    /// Renders `<KIND> JOIN <table>[ AS alias][ ON <condition>]`.
    ///
    /// CROSS joins never render ON, even when one is set. Every other kind
    /// requires a non-blank ON condition.
    pub fn to_sql(&self) -> Result<String> {
        validate_table_name(&self.table)?;
        if let Some(alias) = &self.alias {
            validate_identifier(alias)?;
        }

        let mut sql = format!("{} JOIN {}", self.kind, self.table);
        if let Some(alias) = &self.alias {
            sql.push_str(&format!(" AS {}", alias));
        }

        if self.kind == JoinKind::Cross {
            return Ok(sql);
        }

        match self.on.as_deref().map(str::trim) {
            Some(on) if !on.is_empty() => {
                sql.push_str(&format!(" ON {}", on));
                Ok(sql)
            }
            _ => Err(QueryError::MissingJoinCondition {
                kind: self.kind.as_str(),
                table: self.table.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_join_with_alias() {
        let join = Join::inner("profiles", "p.user_id = u.id").alias("p");
        assert_eq!(
            join.to_sql().unwrap(),
            "INNER JOIN profiles AS p ON p.user_id = u.id"
        );
    }

    #[test]
    fn test_cross_join_omits_on() {
        let join = Join::cross("regions").on("ignored = 1");
        assert_eq!(join.to_sql().unwrap(), "CROSS JOIN regions");
    }

    #[test]
    fn test_missing_on_rejected() {
        let err = Join::new(JoinKind::Left, "orders").to_sql().unwrap_err();
        assert_eq!(
            err,
            QueryError::MissingJoinCondition {
                kind: "LEFT",
                table: "orders".into()
            }
        );

        let err = Join::full("orders", "  ").to_sql().unwrap_err();
        assert!(matches!(err, QueryError::MissingJoinCondition { .. }));
    }

    #[test]
    fn test_join_table_validated() {
        let err = Join::inner("orders o; --", "1 = 1").to_sql().unwrap_err();
        assert_eq!(err, QueryError::InvalidTableName("orders o; --".into()));

        let err = Join::inner("orders", "1 = 1").alias("o o").to_sql().unwrap_err();
        assert_eq!(err, QueryError::InvalidIdentifier("o o".into()));
    }
}
