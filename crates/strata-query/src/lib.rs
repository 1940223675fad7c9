//! Injection-safe SQL statement compilation.
//!
//! Condition trees, joins, common table expressions and row batches are
//! compiled into [`Statement`]s: SQL text with `?` placeholders and the
//! ordered values to bind. Every identifier and operator is validated before
//! any text is produced, and user values never appear in the SQL itself.

pub mod error;
pub mod expr;
pub mod macros;
pub mod options;
pub mod query;
pub mod statement;
pub mod validate;
pub mod value;

pub use error::{QueryError, Result};
pub use expr::{Branch, Col, Comparison, Condition, Logic, Operator};
pub use options::{CompileOptions, Pagination};
pub use query::*;
pub use statement::Statement;
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;

    define_table!(
        users {
            table: "users",
            columns: {
                ID: i64 => "id",
                NAME: String => "name",
                AGE: i64 => "age",
                ROLE: String => "role",
                STATUS: String => "status"
            }
        }
    );

    fn opts() -> CompileOptions {
        CompileOptions::default()
    }

    #[test]
    fn test_simple_filter() {
        let query = SimpleSelect::new(users::AGE.gt(18));
        let stmt = to_select_string(users::TABLE, &query, &opts()).unwrap();

        assert_eq!(stmt.sql, "SELECT * FROM users WHERE age > ?");
        assert_eq!(stmt.args, vec![Value::Integer(18)]);
    }

    #[test]
    fn test_or_group() {
        let query = SimpleSelect::new(users::ROLE.eq("admin").or(users::ROLE.eq("mod")));
        let stmt = to_select_string(users::TABLE, &query, &opts()).unwrap();

        assert_eq!(stmt.sql, "SELECT * FROM users WHERE (role = ? OR role = ?)");
        assert_eq!(stmt.args, vec![Value::from("admin"), Value::from("mod")]);
    }

    #[test]
    fn test_batch_insert() {
        let rows: Vec<Row> = [("ann", 31), ("bob", 42), ("cid", 27)]
            .into_iter()
            .map(|(name, age)| {
                Row::new(users::TABLE)
                    .set(users::NAME.name, name)
                    .set(users::AGE.name, age)
            })
            .collect();

        let statements = compile_batch_insert(&rows, 2).unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[0].args,
            vec![
                Value::from("ann"),
                Value::from(31),
                Value::from("bob"),
                Value::from(42)
            ]
        );
        assert_eq!(statements[1].args, vec![Value::from("cid"), Value::from(27)]);
    }

    #[test]
    fn test_injection_attempts_rejected() {
        let query = SimpleSelect::new(users::AGE.gt(18));
        assert_eq!(
            to_select_string("users; DROP TABLE x", &query, &opts()),
            Err(QueryError::InvalidTableName("users; DROP TABLE x".into()))
        );

        let query = SimpleSelect::new(Condition::leaf("age; --", ">", 18));
        assert!(matches!(
            to_select_string(users::TABLE, &query, &opts()),
            Err(QueryError::InvalidIdentifier(_))
        ));

        let query = SimpleSelect::new(Condition::leaf("age", "> 0 OR", 18));
        assert!(matches!(
            to_select_string(users::TABLE, &query, &opts()),
            Err(QueryError::InvalidOperator(_))
        ));
    }

    #[test]
    fn test_values_never_in_sql() {
        let payload = "x' OR '1'='1";
        let stmt = ComplexQuery::from(users::TABLE)
            .filter(users::NAME.eq(payload))
            .compile(&opts())
            .unwrap();

        assert!(!stmt.sql.contains(payload));
        assert_eq!(stmt.args, vec![Value::from(payload)]);
    }

    #[test]
    fn test_cte_feeds_outer_query() {
        let active = ComplexQuery::from(users::TABLE)
            .select([users::ID.name, users::NAME.name])
            .filter(users::STATUS.eq("active"));

        let stmt = ComplexQuery::from("active")
            .with(CommonTableExpression::query("active", active))
            .filter(Condition::leaf("name", "LIKE", "a%"))
            .limit(5)
            .compile(&opts())
            .unwrap();

        assert_eq!(
            stmt.sql,
            "WITH active AS (SELECT id, name FROM users WHERE status = ?) \
             SELECT * FROM active WHERE name LIKE ? LIMIT 5"
        );
        assert_eq!(stmt.args, vec![Value::from("active"), Value::from("a%")]);
    }

    #[test]
    fn test_update_and_delete() {
        let stmt = UpdateQuery::table(users::TABLE)
            .set(users::STATUS.name, "banned")
            .filter(users::ID.in_(vec![1, 2, 3]))
            .compile()
            .unwrap();
        assert_eq!(stmt.sql, "UPDATE users SET status = ? WHERE id IN (?, ?, ?)");
        assert_eq!(stmt.args.len(), 4);

        let stmt = DeleteQuery::from(users::TABLE)
            .filter(users::STATUS.eq("banned"))
            .compile()
            .unwrap();
        assert_eq!(stmt.sql, "DELETE FROM users WHERE status = ?");
    }
}
