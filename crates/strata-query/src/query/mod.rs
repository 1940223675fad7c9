//! The statement compilers.
//!
//! Each statement kind has its own builder that compiles to a
//! [`Statement`](crate::statement::Statement): SQL text with `?`
//! placeholders plus the values to bind to them, in placeholder order.
//!
//! # Overview
//!
//! - [`SimpleSelect`] with [`to_select_string`] compiles a plain
//!   `SELECT * FROM <table>` driven by a condition tree.
//! - [`ComplexQuery`] compiles `SELECT` statements with projections,
//!   joins, grouping, ordering, pagination and common table expressions.
//! - [`BatchInsert`] splits rows into multi-row `INSERT INTO` statements.
//! - [`UpdateQuery`] and [`DeleteQuery`] compile `UPDATE` and `DELETE FROM`.
//!
//! Table names, column names, aliases and operators are validated before
//! any SQL is produced. Values only ever travel as bound arguments.
//!
//! # Example
//!
//! ```
//! use strata_query::{ComplexQuery, CompileOptions, Condition, Join};
//!
//! let stmt = ComplexQuery::from("users")
//!     .alias("u")
//!     .select(["u.id", "p.bio"])
//!     .join(Join::left("profiles", "p.user_id = u.id").alias("p"))
//!     .filter(Condition::leaf("u.active", "=", true))
//!     .order_by("u.id DESC")
//!     .limit(10)
//!     .compile(&CompileOptions::default())
//!     .unwrap();
//!
//! assert_eq!(
//!     stmt.sql,
//!     "SELECT u.id, p.bio FROM users AS u LEFT JOIN profiles AS p ON p.user_id = u.id \
//!      WHERE u.active = ? ORDER BY u.id DESC LIMIT 10"
//! );
//! ```
//!
//! # Submodules
//!
//! - [`simple`] — Implementation of [`to_select_string`].
//! - [`select`] — Implementation of [`ComplexQuery`].
//! - [`join`] — JOIN rendering.
//! - [`cte`] — WITH-clause compilation.
//! - [`insert`] — Implementation of [`BatchInsert`].
//! - [`update`] — Implementation of [`UpdateQuery`].
//! - [`delete`] — Implementation of [`DeleteQuery`].

pub mod cte;
pub mod delete;
pub mod insert;
pub mod join;
pub mod select;
pub mod simple;
pub mod update;

pub use cte::{compile_with_clause, is_recursive_clause, CommonTableExpression, CteBody};
pub use delete::DeleteQuery;
pub use insert::{compile_batch_insert, render_raw_inserts, BatchInsert, OnConflict, Row};
pub use join::{Join, JoinKind};
pub use select::ComplexQuery;
pub use simple::{to_select_string, SimpleSelect};
pub use update::UpdateQuery;
