//! Represents a typed database column.
//!
//! `Col<T>` ties a column name to a Rust type `T` and offers comparison
//! methods that produce [`Condition`] leaves, so filters can be written
//! without spelling operators as strings.

use std::marker::PhantomData;

use crate::{
    expr::{condition::Condition, ops::Operator},
    value::Value,
};

/// A typed reference to a database column.
///
/// The type parameter `T` documents the column's Rust type; it is not
/// enforced when binding values.
///
/// # Example
///
/// ```rust
/// use strata_query::expr::Col;
///
/// const AGE: Col<i64> = Col::new("age");
/// let (sql, _) = AGE.gt(18).compile().unwrap();
/// assert_eq!(sql, "age > ?");
/// ```
#[derive(Debug)]
pub struct Col<T> {
    pub name: &'static str,
    _type: PhantomData<T>,
}

impl<T> Clone for Col<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Col<T> {}

impl<T> Col<T> {
    /// Creates a new column reference.
    ///
    /// # Parameters
    ///
    /// - `name`: the actual column name in the database (e.g., `"user_name"`)
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }

    fn compare<V: Into<Value>>(self, op: Operator, value: V) -> Condition {
        Condition::leaf(self.name, op.as_str(), value)
    }

    /// Creates a SQL `=` condition.
    pub fn eq<V: Into<Value>>(self, value: V) -> Condition {
        self.compare(Operator::Equal, value)
    }

    /// Creates a SQL `!=` condition.
    pub fn ne<V: Into<Value>>(self, value: V) -> Condition {
        self.compare(Operator::NotEqual, value)
    }

    /// Creates a SQL `>` condition.
    pub fn gt<V: Into<Value>>(self, value: V) -> Condition {
        self.compare(Operator::Greater, value)
    }

    /// Creates a SQL `<` condition.
    pub fn lt<V: Into<Value>>(self, value: V) -> Condition {
        self.compare(Operator::Less, value)
    }

    /// Creates a SQL `>=` condition.
    pub fn gte<V: Into<Value>>(self, value: V) -> Condition {
        self.compare(Operator::GreaterOrEqual, value)
    }

    /// Creates a SQL `<=` condition.
    pub fn lte<V: Into<Value>>(self, value: V) -> Condition {
        self.compare(Operator::LessOrEqual, value)
    }

    /// Creates a SQL `LIKE` condition with the pattern bound as given.
    pub fn like(self, pattern: impl Into<String>) -> Condition {
        self.compare(Operator::Like, pattern.into())
    }

    /// Creates a SQL `ILIKE` condition with the pattern bound as given.
    pub fn ilike(self, pattern: impl Into<String>) -> Condition {
        self.compare(Operator::ILike, pattern.into())
    }

    /// Creates a `LIKE '%needle%'` substring match.
    pub fn contains(self, needle: impl AsRef<str>) -> Condition {
        self.compare(Operator::Like, format!("%{}%", needle.as_ref()))
    }

    /// Creates a SQL `IN` condition.
    pub fn in_<V, I>(self, values: I) -> Condition
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.compare(Operator::In, Value::List(values))
    }

    /// Creates a SQL `NOT IN` condition.
    pub fn not_in<V, I>(self, values: I) -> Condition
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.compare(Operator::NotIn, Value::List(values))
    }

    /// Creates a SQL `BETWEEN low AND high` condition.
    pub fn between<V: Into<Value>>(self, low: V, high: V) -> Condition {
        self.compare(Operator::Between, Value::List(vec![low.into(), high.into()]))
    }

    /// Creates a SQL `IS NULL` condition.
    pub fn null(self) -> Condition {
        self.compare(Operator::IsNull, Value::Null)
    }

    /// Creates a SQL `IS NOT NULL` condition.
    pub fn not_null(self) -> Condition {
        self.compare(Operator::IsNotNull, Value::Null)
    }

    /// `name ASC`, for ORDER BY lists.
    pub fn asc(self) -> String {
        format!("{} ASC", self.name)
    }

    /// `name DESC`, for ORDER BY lists.
    pub fn desc(self) -> String {
        format!("{} DESC", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: Col<String> = Col::new("name");
    const AGE: Col<i64> = Col::new("age");

    #[test]
    fn test_column_comparisons() {
        let cond = NAME.eq("ann").and(AGE.gte(18)).and(AGE.lt(65));
        let (sql, args) = cond.compile().unwrap();

        assert_eq!(sql, "(name = ? AND age >= ? AND age < ?)");
        assert_eq!(
            args,
            vec![Value::from("ann"), Value::from(18), Value::from(65)]
        );
    }

    #[test]
    fn test_contains_wraps_pattern() {
        let (sql, args) = NAME.contains("rust").compile().unwrap();
        assert_eq!(sql, "name LIKE ?");
        assert_eq!(args, vec![Value::from("%rust%")]);
    }

    #[test]
    fn test_in_and_null() {
        let (sql, args) = AGE.in_([1, 2]).or(NAME.null()).compile().unwrap();
        assert_eq!(sql, "(age IN (?, ?) OR name IS NULL)");
        assert_eq!(args.len(), 2);

        let (sql, _) = AGE.between(1, 9).compile().unwrap();
        assert_eq!(sql, "age BETWEEN ? AND ?");
    }

    #[test]
    fn test_ordering_helpers() {
        assert_eq!(AGE.desc(), "age DESC");
        assert_eq!(NAME.asc(), "name ASC");
    }
}
