use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    error::{QueryError, Result},
    expr::condition::Condition,
    query::insert::ordered_fields,
    statement::Statement,
    validate::{validate_identifier, validate_table_name},
    value::Value,
};

/// `UPDATE <table> SET a = ?, b = ? [WHERE ...]`.
///
/// Assignment arguments precede WHERE arguments. Without a filter every row
/// of the table is updated.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UpdateQuery {
    pub table: String,
    #[serde(with = "ordered_fields")]
    pub set: Vec<(String, Value)>,
    #[serde(
        default,
        rename = "where",
        alias = "filter",
        skip_serializing_if = "Option::is_none"
    )]
    pub filter: Option<Condition>,
}

impl UpdateQuery {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            set: Vec::new(),
            filter: None,
        }
    }

    pub fn set<V: Into<Value>>(mut self, column: impl Into<String>, value: V) -> Self {
        self.set.push((column.into(), value.into()));
        self
    }

    /// Adds a condition, AND-ed with any previous one.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn compile(&self) -> Result<Statement> {
        validate_table_name(&self.table)?;
        if self.set.is_empty() {
            return Err(QueryError::EmptyInput(format!(
                "update of {:?} has no assignments",
                self.table
            )));
        }

        let mut params = Vec::with_capacity(self.set.len());
        let sets = self
            .set
            .iter()
            .map(|(col, val)| {
                validate_identifier(col)?;
                params.push(val.clone());
                Ok(format!("{} = ?", col))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut sql = format!("UPDATE {} SET {}", self.table, sets.join(", "));

        if let Some(filter) = &self.filter {
            let fragment = filter.compile_into(&mut params)?;
            if !fragment.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&fragment);
            }
        }

        trace!(table = %self.table, args = params.len(), "compiled update");
        Ok(Statement::new(sql, params))
    }
}
