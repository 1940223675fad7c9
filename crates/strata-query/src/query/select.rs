//! Full SELECT statement assembly.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    error::Result,
    expr::condition::Condition,
    options::{CompileOptions, Pagination},
    query::{
        cte::{compile_with_clause, CommonTableExpression},
        join::Join,
    },
    statement::Statement,
    validate::{validate_identifier, validate_table_name},
    value::Value,
};

/// A SELECT statement with joins, CTEs, grouping and pagination.
///
/// Clauses are emitted in a fixed order regardless of how the query was
/// built:
///
/// ```text
/// [WITH ...] SELECT [DISTINCT] <fields> FROM <table>[ AS alias] [<joins>]
/// [WHERE ...] [GROUP BY ...] [HAVING ...] [ORDER BY ...] [LIMIT n [OFFSET m]]
/// ```
///
/// Only the WHERE condition and CTE query bodies are parameterized. The
/// select list, GROUP BY, HAVING, ORDER BY, join ON conditions and raw CTE
/// bodies are inserted verbatim and must never carry untrusted input.
///
/// # Example
///
/// ```
/// use strata_query::{CommonTableExpression, ComplexQuery, CompileOptions, Condition, Value};
///
/// let active = ComplexQuery::from("users")
///     .select(["id", "name"])
///     .filter(Condition::leaf("status", "=", "active"));
///
/// let stmt = ComplexQuery::from("active")
///     .with(CommonTableExpression::query("active", active))
///     .limit(5)
///     .compile(&CompileOptions::default())
///     .unwrap();
///
/// assert_eq!(
///     stmt.sql,
///     "WITH active AS (SELECT id, name FROM users WHERE status = ?) SELECT * FROM active LIMIT 5"
/// );
/// assert_eq!(stmt.args, vec![Value::from("active")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ComplexQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub select: Vec<String>,
    #[serde(default)]
    pub distinct: bool,
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<Join>,
    #[serde(
        default,
        rename = "where",
        alias = "filter",
        skip_serializing_if = "Option::is_none"
    )]
    pub filter: Option<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub having: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ctes: Vec<CommonTableExpression>,
    /// Verbatim WITH preamble, used only when `ctes` is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_with: Option<String>,
}

impl ComplexQuery {
    /// Starts a new query on the given table.
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            from: table.into(),
            ..Default::default()
        }
    }

    /// Adds fields to the select list. An empty list selects `*`.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Applies a WHERE condition; repeated calls are combined with AND.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn group_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn having(mut self, having: impl Into<String>) -> Self {
        self.having = Some(having.into());
        self
    }

    /// Adds an ORDER BY term such as `"created_at DESC"`.
    pub fn order_by(mut self, term: impl Into<String>) -> Self {
        self.order_by.push(term.into());
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

    /// Set pagination params; pages start at 1.
    pub fn page(mut self, page: u64, per_page: u64) -> Self {
        self.limit = Some(per_page);
        self.offset = Some(page.saturating_sub(1).saturating_mul(per_page));
        self
    }

    pub fn with(mut self, cte: CommonTableExpression) -> Self {
        self.ctes.push(cte);
        self
    }

    pub fn raw_with(mut self, preamble: impl Into<String>) -> Self {
        self.raw_with = Some(preamble.into());
        self
    }

    /// Compiles the query into a statement.
    ///
    /// CTE arguments come first, in declaration order, followed by WHERE
    /// arguments, matching their position in the text.
    pub fn compile(&self, options: &CompileOptions) -> Result<Statement> {
        trace!(
            table = %self.from,
            joins = self.joins.len(),
            ctes = self.ctes.len(),
            "compiling select"
        );

        let mut params = Vec::new();
        let mut sql = self.compile_preamble(options, &mut params)?;
        sql.push_str(&self.compile_select(&mut params, true)?);
        sql.push_str(&Pagination::new(self.limit, self.offset).to_sql(options.default_page_size));

        Ok(Statement::new(sql, params))
    }

    /// Compiles `SELECT COUNT(*)` over the rows this query would return,
    /// ignoring ORDER BY and pagination.
    pub fn compile_count(&self, options: &CompileOptions) -> Result<Statement> {
        let mut params = Vec::new();
        let mut sql = self.compile_preamble(options, &mut params)?;

        if self.distinct || !self.group_by.is_empty() {
            let inner = self.compile_select(&mut params, false)?;
            sql.push_str(&format!("SELECT COUNT(*) FROM ({}) AS counted", inner));
        } else {
            sql.push_str("SELECT COUNT(*)");
            sql.push_str(&self.compile_source(&mut params)?);
        }

        Ok(Statement::new(sql, params))
    }

    fn compile_preamble(&self, options: &CompileOptions, params: &mut Vec<Value>) -> Result<String> {
        if !self.ctes.is_empty() {
            let (with, args) = compile_with_clause(&self.ctes, options)?;
            params.extend(args);
            return Ok(format!("{} ", with));
        }

        match self.raw_with.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                let is_prefixed = raw
                    .get(..5)
                    .is_some_and(|head| head.eq_ignore_ascii_case("WITH "));
                if is_prefixed {
                    Ok(format!("{} ", raw))
                } else {
                    Ok(format!("WITH {} ", raw))
                }
            }
            _ => Ok(String::new()),
        }
    }

    /// `SELECT ... FROM ... [WHERE] [GROUP BY] [HAVING] [ORDER BY]`.
    fn compile_select(&self, params: &mut Vec<Value>, ordered: bool) -> Result<String> {
        let fields = if self.select.is_empty() {
            "*".to_string()
        } else {
            self.select.join(", ")
        };

        let mut sql = if self.distinct {
            format!("SELECT DISTINCT {}", fields)
        } else {
            format!("SELECT {}", fields)
        };

        sql.push_str(&self.compile_source(params)?);

        if !self.group_by.is_empty() {
            sql.push_str(&format!(" GROUP BY {}", self.group_by.join(", ")));
        }

        if let Some(having) = self.having.as_deref().map(str::trim) {
            if !having.is_empty() {
                sql.push_str(&format!(" HAVING {}", having));
            }
        }

        if ordered && !self.order_by.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.order_by.join(", ")));
        }

        Ok(sql)
    }

    /// ` FROM <table>[ AS alias][ <joins>][ WHERE ...]`.
    fn compile_source(&self, params: &mut Vec<Value>) -> Result<String> {
        validate_table_name(&self.from)?;

        let mut sql = format!(" FROM {}", self.from);
        if let Some(alias) = &self.alias {
            validate_identifier(alias)?;
            sql.push_str(&format!(" AS {}", alias));
        }

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_sql()?);
        }

        if let Some(filter) = &self.filter {
            let fragment = filter.compile_into(params)?;
            if !fragment.is_empty() {
                sql.push_str(&format!(" WHERE {}", fragment));
            }
        }

        Ok(sql)
    }
}
