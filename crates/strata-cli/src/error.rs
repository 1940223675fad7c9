//! Error types for the strata binary.

use miette::Diagnostic;
use strata_config::error::ConfigError;
use strata_query::QueryError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error("Error while {action}")]
    #[diagnostic(code(strata::io), help("Check the file path and its permissions"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON document: {0}")]
    #[diagnostic(
        code(strata::json),
        help("A document holds exactly one of: select, query, insert, update, delete")
    )]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML document: {0}")]
    #[diagnostic(
        code(strata::toml),
        help("A document holds exactly one of: select, query, insert, update, delete")
    )]
    Toml(#[from] toml::de::Error),

    #[error("--raw only applies to insert documents, got a {0} document")]
    #[diagnostic(code(strata::raw_unsupported), help("Drop --raw for this document"))]
    RawUnsupported(&'static str),

    #[error("Configuration file already exists at {0}")]
    #[diagnostic(code(strata::config_exists), help("Pass --force to overwrite it"))]
    ConfigExists(String),
}

pub type CliResult<T> = std::result::Result<T, CliError>;

pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> CliResult<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> CliResult<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            CliError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
