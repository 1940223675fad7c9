use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use nu_ansi_term::Color::{Cyan, Green, Yellow};
use serde::Deserialize;
use strata_query::{
    to_select_string, BatchInsert, CompileOptions, ComplexQuery, DeleteQuery, OnConflict, Row,
    SimpleSelect, Statement, UpdateQuery, Value,
};
use tabled::{
    builder::Builder,
    settings::{Panel, Style},
};
use tracing::{debug, info};

use crate::{
    error::{CliError, CliResult, ErrorContext},
    utils::Colored,
};

#[derive(Debug, Deserialize)]
pub struct SelectDocument {
    pub table: String,
    #[serde(flatten)]
    pub query: SimpleSelect,
}

#[derive(Debug, Deserialize)]
pub struct InsertDocument {
    pub rows: Vec<Row>,
    #[serde(default)]
    pub on_conflict: Option<OnConflict>,
}

/// A query document: exactly one top-level key naming the statement kind.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Document {
    Select(SelectDocument),
    Query(ComplexQuery),
    Insert(InsertDocument),
    Update(UpdateQuery),
    Delete(DeleteQuery),
}

impl Document {
    pub fn kind(&self) -> &'static str {
        match self {
            Document::Select(_) => "select",
            Document::Query(_) => "query",
            Document::Insert(_) => "insert",
            Document::Update(_) => "update",
            Document::Delete(_) => "delete",
        }
    }

    /// Parses TOML for `.toml` files and JSON for everything else.
    pub fn parse(content: &str, path: Option<&Path>) -> CliResult<Self> {
        let is_toml = path
            .and_then(|p| p.extension())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Ok(toml::from_str(content)?)
        } else {
            Ok(serde_json::from_str(content)?)
        }
    }

    pub fn compile(&self, options: &CompileOptions) -> CliResult<Vec<Statement>> {
        let statements = match self {
            Document::Select(doc) => vec![to_select_string(&doc.table, &doc.query, options)?],
            Document::Query(query) => vec![query.compile(options)?],
            Document::Insert(doc) => doc.batch(options).compile()?,
            Document::Update(query) => vec![query.compile()?],
            Document::Delete(query) => vec![query.compile()?],
        };
        Ok(statements)
    }
}

impl InsertDocument {
    fn batch(&self, options: &CompileOptions) -> BatchInsert<'_> {
        let batch = BatchInsert::new(&self.rows).options(options);
        match &self.on_conflict {
            Some(on_conflict) => batch.on_conflict(on_conflict.clone()),
            None => batch,
        }
    }
}

fn read_document(file: &str) -> CliResult<Document> {
    if file == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .with_context(|| "reading query document from stdin".into())?;
        return Document::parse(&buffer, None);
    }

    let path = Path::new(file);
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Document::parse(&content, Some(path))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Integer(_) => "integer",
        Value::Real(_) => "real",
        Value::Text(_) => "text",
        Value::List(_) => "list",
    }
}

fn print_statement(index: usize, total: usize, stmt: &Statement) {
    if total > 1 {
        println!(
            "{}",
            Colored(Cyan, format!("-- statement {} of {}", index + 1, total))
        );
    }
    println!("{};", Colored(Green, &stmt.sql));

    if stmt.args.is_empty() {
        return;
    }

    let mut builder = Builder::new();
    builder.push_record(["#".to_string(), "type".to_string(), "value".to_string()]);
    for (position, arg) in stmt.args.iter().enumerate() {
        builder.push_record([
            (position + 1).to_string(),
            value_kind(arg).to_string(),
            arg.to_sql_literal(),
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header(format!("{} arguments", stmt.args.len())))
        .with(Style::rounded())
        .to_string();
    println!("{table}");
}

pub fn compile_document(
    file: &str,
    raw: bool,
    batch_size: Option<usize>,
    json: bool,
) -> CliResult<()> {
    let mut options = CompileOptions::snapshot();
    if let Some(rows) = batch_size {
        options = options.with_max_batch_rows(rows);
    }

    let document = read_document(file)?;
    debug!(
        kind = document.kind(),
        max_batch_rows = options.max_batch_rows,
        "compiling document"
    );

    if raw {
        let Document::Insert(doc) = &document else {
            return Err(CliError::RawUnsupported(document.kind()));
        };
        let rendered = doc.batch(&options).compile_raw()?;
        if json {
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        } else {
            info!(
                "{}",
                Colored(Yellow, "-- literal rendering, do not execute untrusted values")
            );
            for sql in rendered {
                println!("{sql};");
            }
        }
        return Ok(());
    }

    let statements = document.compile(&options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&statements)?);
    } else {
        for (index, stmt) in statements.iter().enumerate() {
            print_statement(index, statements.len(), stmt);
        }
    }

    Ok(())
}
