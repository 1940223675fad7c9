//! Expression types for building WHERE clauses.
//!
//! This module contains the building blocks of query filters.

pub mod column;
pub mod condition;
pub mod ops;

pub use column::Col;
pub use condition::{Branch, Comparison, Condition};
pub use ops::{Logic, Operator};
