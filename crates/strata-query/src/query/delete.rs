use serde::{Deserialize, Serialize};

use crate::{
    error::Result, expr::condition::Condition, statement::Statement,
    validate::validate_table_name,
};

/// `DELETE FROM <table> [WHERE ...]`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DeleteQuery {
    pub table: String,
    #[serde(
        default,
        rename = "where",
        alias = "filter",
        skip_serializing_if = "Option::is_none"
    )]
    pub filter: Option<Condition>,
}

impl DeleteQuery {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: None,
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn compile(&self) -> Result<Statement> {
        validate_table_name(&self.table)?;

        let mut params = Vec::new();
        let mut sql = format!("DELETE FROM {}", self.table);

        if let Some(filter) = &self.filter {
            let fragment = filter.compile_into(&mut params)?;
            if !fragment.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&fragment);
            }
        }

        Ok(Statement::new(sql, params))
    }
}
