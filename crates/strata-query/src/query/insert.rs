//! Multi-row INSERT compilation.
//!
//! Rows are split into batches of at most `max_rows` rows, each compiled to
//! one `INSERT INTO t (a, b) VALUES (?, ?), (?, ?)` statement whose
//! arguments are flattened row by row, column by column.
//!
//! The first row defines the batch schema. Later rows must target the same
//! table with the same column set; their values are bound in the first
//! row's column order. Anything else is a [`QueryError::SchemaMismatch`]
//! rather than a silently misaligned statement.
//!
//! Statements are independent: executing them atomically (or not) is up to
//! the caller.

use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use tracing::debug;

use crate::{
    error::{QueryError, Result},
    options::CompileOptions,
    statement::Statement,
    validate::{validate_identifier, validate_table_name},
    value::Value,
};

/// One row to insert: a table and its column values in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Row {
    pub table: String,
    #[serde(with = "ordered_fields")]
    pub fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
        }
    }

    pub fn set<V: Into<Value>>(mut self, column: impl Into<String>, value: V) -> Self {
        self.fields.push((column.into(), value.into()));
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(column, _)| column.as_str())
    }

    /// First column name that occurs more than once, if any.
    fn repeated_column(&self) -> Option<&str> {
        self.fields
            .iter()
            .enumerate()
            .find(|(i, (name, _))| self.fields[..*i].iter().any(|(seen, _)| seen == name))
            .map(|(_, (name, _))| name.as_str())
    }

    fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

/// Serializes fields as a map while keeping their order on the way in.
pub(crate) mod ordered_fields {
    use super::*;

    pub fn serialize<S: Serializer>(
        fields: &[(String, Value)],
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (column, value) in fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Vec<(String, Value)>, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Vec<(String, Value)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column names to values")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((column, value)) = access.next_entry::<String, Value>()? {
                    fields.push((column, value));
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

/// What to do when an inserted row collides with an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnConflict {
    /// `ON CONFLICT DO NOTHING`
    DoNothing,
    /// `ON CONFLICT(target...) DO UPDATE SET col = excluded.col, ...`
    Update {
        target: Vec<String>,
        update: Vec<String>,
    },
}

impl OnConflict {
    pub fn update<T, U>(target: &[T], update: &[U]) -> Self
    where
        T: AsRef<str>,
        U: AsRef<str>,
    {
        OnConflict::Update {
            target: target.iter().map(|c| c.as_ref().to_string()).collect(),
            update: update.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }

    fn to_sql(&self) -> Result<String> {
        match self {
            OnConflict::DoNothing => Ok("ON CONFLICT DO NOTHING".to_string()),
            OnConflict::Update {
                target,
                update,
            } => {
                if target.is_empty() || update.is_empty() {
                    return Err(QueryError::EmptyInput(
                        "ON CONFLICT DO UPDATE needs target and update columns".to_string(),
                    ));
                }
                for column in target.iter().chain(update) {
                    validate_identifier(column)?;
                }
                let updates: Vec<String> = update
                    .iter()
                    .map(|col| format!("{} = excluded.{}", col, col))
                    .collect();
                Ok(format!(
                    "ON CONFLICT({}) DO UPDATE SET {}",
                    target.join(", "),
                    updates.join(", ")
                ))
            }
        }
    }
}

/// Batch INSERT builder.
///
/// # Example
///
/// ```
/// use strata_query::{BatchInsert, Row, Value};
///
/// let rows = vec![
///     Row::new("users").set("name", "ann").set("age", 31),
///     Row::new("users").set("name", "bob").set("age", 42),
///     Row::new("users").set("name", "cid").set("age", 27),
/// ];
/// let statements = BatchInsert::new(&rows).max_rows(2).compile().unwrap();
///
/// assert_eq!(statements.len(), 2);
/// assert_eq!(statements[0].sql, "INSERT INTO users (name, age) VALUES (?, ?), (?, ?)");
/// assert_eq!(statements[1].args, vec![Value::from("cid"), Value::from(27)]);
/// ```
#[derive(Debug, Clone)]
pub struct BatchInsert<'a> {
    rows: &'a [Row],
    max_rows: Option<usize>,
    on_conflict: Option<OnConflict>,
}

/// Rows of one batch after schema alignment.
struct AlignedRows<'a> {
    table: &'a str,
    columns: Vec<&'a str>,
    values: Vec<Vec<&'a Value>>,
}

impl<'a> BatchInsert<'a> {
    pub fn new(rows: &'a [Row]) -> Self {
        Self {
            rows,
            max_rows: None,
            on_conflict: None,
        }
    }

    /// Caps rows per statement. Without it, the configured batch size is
    /// read once when compiling.
    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn options(self, options: &CompileOptions) -> Self {
        self.max_rows(options.max_batch_rows)
    }

    pub fn on_conflict(mut self, on_conflict: OnConflict) -> Self {
        self.on_conflict = Some(on_conflict);
        self
    }

    pub fn on_conflict_do_nothing(self) -> Self {
        self.on_conflict(OnConflict::DoNothing)
    }

    fn batch_size(&self) -> usize {
        self.max_rows
            .unwrap_or_else(|| CompileOptions::snapshot().max_batch_rows)
            .max(1)
    }

    fn align(&self) -> Result<AlignedRows<'a>> {
        let Some(first) = self.rows.first() else {
            return Err(QueryError::EmptyInput("no rows to insert".to_string()));
        };

        validate_table_name(&first.table)?;
        if first.fields.is_empty() {
            return Err(QueryError::EmptyInput(format!(
                "first row for {:?} has no columns",
                first.table
            )));
        }

        let columns: Vec<&str> = first.columns().collect();
        for column in &columns {
            validate_identifier(column)?;
        }

        let mut values = Vec::with_capacity(self.rows.len());
        for (index, row) in self.rows.iter().enumerate() {
            if let Some(column) = row.repeated_column() {
                return Err(QueryError::DuplicateColumn {
                    row: index,
                    column: column.to_string(),
                });
            }

            let mismatch = || QueryError::SchemaMismatch {
                row: index,
                expected: describe(&first.table, first.columns()),
                found: describe(&row.table, row.columns()),
            };

            if row.table != first.table || row.fields.len() != columns.len() {
                return Err(mismatch());
            }

            let aligned = columns
                .iter()
                .map(|column| row.get(column))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(mismatch)?;
            values.push(aligned);
        }

        Ok(AlignedRows {
            table: &first.table,
            columns,
            values,
        })
    }

    fn conflict_clause(&self) -> Result<String> {
        match &self.on_conflict {
            Some(on_conflict) => Ok(format!(" {}", on_conflict.to_sql()?)),
            None => Ok(String::new()),
        }
    }

    /// Compiles one parameterized statement per batch, `ceil(rows / max_rows)`
    /// in total.
    pub fn compile(&self) -> Result<Vec<Statement>> {
        let aligned = self.align()?;
        let conflict = self.conflict_clause()?;
        let batch_size = self.batch_size();

        let row_placeholders = format!("({})", vec!["?"; aligned.columns.len()].join(", "));
        let head = format!(
            "INSERT INTO {} ({}) VALUES ",
            aligned.table,
            aligned.columns.join(", ")
        );

        let statements: Vec<Statement> = aligned
            .values
            .chunks(batch_size)
            .map(|batch| {
                let groups = vec![row_placeholders.as_str(); batch.len()].join(", ");
                let args = batch
                    .iter()
                    .flat_map(|row| row.iter().map(|value| (*value).clone()))
                    .collect();
                Statement::new(format!("{}{}{}", head, groups, conflict), args)
            })
            .collect();

        debug!(
            table = aligned.table,
            rows = aligned.values.len(),
            batches = statements.len(),
            "compiled batch insert"
        );

        Ok(statements)
    }

    /// Renders the same batches with values inlined as literals.
    ///
    /// For debugging and logging only. The output is NOT injection-safe and
    /// must never be executed with values from untrusted sources.
    pub fn compile_raw(&self) -> Result<Vec<String>> {
        let aligned = self.align()?;
        let conflict = self.conflict_clause()?;
        let batch_size = self.batch_size();

        let head = format!(
            "INSERT INTO {} ({}) VALUES ",
            aligned.table,
            aligned.columns.join(", ")
        );

        Ok(aligned
            .values
            .chunks(batch_size)
            .map(|batch| {
                let groups = batch
                    .iter()
                    .map(|row| {
                        let literals = row
                            .iter()
                            .map(|value| value.to_sql_literal())
                            .collect::<Vec<_>>();
                        format!("({})", literals.join(", "))
                    })
                    .collect::<Vec<_>>();
                format!("{}{}{}", head, groups.join(", "), conflict)
            })
            .collect())
    }
}

fn describe<'c>(table: &str, columns: impl Iterator<Item = &'c str>) -> String {
    format!("{}({})", table, columns.collect::<Vec<_>>().join(", "))
}

/// Compiles `rows` into parameterized INSERT statements of at most
/// `max_rows` rows each.
pub fn compile_batch_insert(rows: &[Row], max_rows: usize) -> Result<Vec<Statement>> {
    BatchInsert::new(rows).max_rows(max_rows).compile()
}

/// Literal-valued rendering of [`compile_batch_insert`]. Debug output only;
/// see [`BatchInsert::compile_raw`].
pub fn render_raw_inserts(rows: &[Row], max_rows: usize) -> Result<Vec<String>> {
    BatchInsert::new(rows).max_rows(max_rows).compile_raw()
}
