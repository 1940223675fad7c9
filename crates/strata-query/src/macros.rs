//! Macros for defining table schemas.
//!
//! The [`define_table!`] macro generates column constants for a table,
//! tying database column names to Rust types.

/// Defines a module with typed column constants for a database table.
///
/// # Syntax
///
/// ```ignore
/// define_table!(
///     users {
///         table: "users",
///         columns: {
///             ID: i64 => "id",
///             NAME: String => "name"
///         }
///     }
/// );
/// ```
///
/// This expands to:
///
/// ```ignore
/// pub mod users {
///     pub const TABLE: &str = "users";
///     pub const ID: strata_query::expr::Col<i64> = strata_query::expr::Col::new("id");
///     pub const NAME: strata_query::expr::Col<String> = strata_query::expr::Col::new("name");
/// }
/// ```
///
/// # Usage
///
/// ```
/// use strata_query::{define_table, ComplexQuery, CompileOptions};
///
/// define_table!(
///     users {
///         table: "users",
///         columns: {
///             ID: i64 => "id",
///             NAME: String => "name"
///         }
///     }
/// );
///
/// let stmt = ComplexQuery::from(users::TABLE)
///     .select([users::ID.name, users::NAME.name])
///     .filter(users::NAME.eq("alice"))
///     .compile(&CompileOptions::default())
///     .unwrap();
/// assert_eq!(stmt.sql, "SELECT id, name FROM users WHERE name = ?");
/// ```
#[macro_export]
macro_rules! define_table {
    (
        $table_mod:ident {
            table: $table:literal,
            columns: {
                $($col_name:ident: $col_type:ty => $db_col:literal),* $(,)?
            }
        }
    ) => {
        pub mod $table_mod {
            #[allow(unused_imports)]
            use $crate::expr::column::Col;

            pub const TABLE: &str = $table;

            /// Every column name, in declaration order.
            pub const COLUMNS: &[&str] = &[$($db_col),*];

            $(
                pub const $col_name: Col<$col_type> = Col::new($db_col);
            )*
        }
    };
}
