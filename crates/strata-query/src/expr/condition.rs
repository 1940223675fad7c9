//! Predicate trees and their compilation into WHERE fragments.
//!
//! A [`Condition`] is either a single comparison or a logical group of child
//! conditions. Compiling a tree walks it depth-first, left to right, pushing
//! one argument per emitted placeholder, so the argument order always
//! matches the placeholder order of the text.

use serde::{Deserialize, Serialize};

use crate::{
    error::{QueryError, Result},
    expr::ops::{Logic, Operator},
    validate::{validate_column_name, validate_operator},
    value::Value,
};

/// A node of a predicate tree.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Condition {
    Leaf(Comparison),
    Branch(Branch),
}

/// `field operator value`.
///
/// `field` and `operator` are plain strings so trees can be built from
/// less-trusted input; both are validated when the tree is compiled.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Comparison {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: Value,
}

/// Children joined by `logic` (AND when unset).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Branch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic: Option<Logic>,
    #[serde(default)]
    pub nested: Vec<Condition>,
}

impl Condition {
    pub fn leaf(field: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Leaf(Comparison {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        })
    }

    pub fn group(logic: Logic, nested: Vec<Condition>) -> Self {
        Condition::Branch(Branch {
            logic: Some(logic),
            nested,
        })
    }

    /// All of `nested` must hold.
    pub fn all(nested: Vec<Condition>) -> Self {
        Self::group(Logic::And, nested)
    }

    /// Any of `nested` must hold.
    pub fn any(nested: Vec<Condition>) -> Self {
        Self::group(Logic::Or, nested)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Condition::Leaf(_))
    }

    /// Combines with `other` using `AND`, extending an existing AND group
    /// instead of nesting a new one.
    pub fn and(self, other: Condition) -> Self {
        self.combine(Logic::And, other)
    }

    /// Combines with `other` using `OR`, extending an existing OR group
    /// instead of nesting a new one.
    pub fn or(self, other: Condition) -> Self {
        self.combine(Logic::Or, other)
    }

    fn combine(self, logic: Logic, other: Condition) -> Self {
        match self {
            Condition::Branch(mut branch) if branch.logic.unwrap_or_default() == logic => {
                branch.nested.push(other);
                Condition::Branch(branch)
            }
            this => Self::group(logic, vec![this, other]),
        }
    }

    /// Compiles the tree into a WHERE fragment and its arguments.
    ///
    /// An empty fragment means the tree holds no comparisons at all.
    ///
    /// # Example
    ///
    /// ```
    /// use strata_query::{Condition, Value};
    ///
    /// let cond = Condition::any(vec![
    ///     Condition::leaf("role", "=", "admin"),
    ///     Condition::leaf("role", "=", "mod"),
    /// ]);
    /// let (sql, args) = cond.compile().unwrap();
    /// assert_eq!(sql, "(role = ? OR role = ?)");
    /// assert_eq!(args, vec![Value::from("admin"), Value::from("mod")]);
    /// ```
    pub fn compile(&self) -> Result<(String, Vec<Value>)> {
        let mut params = Vec::new();
        let sql = self.compile_into(&mut params)?;
        Ok((sql, params))
    }

    /// Compiles the tree, appending its arguments to `params`.
    ///
    /// On error `params` may hold arguments of already compiled siblings;
    /// callers discard it together with the error.
    pub fn compile_into(&self, params: &mut Vec<Value>) -> Result<String> {
        match self {
            Condition::Leaf(cmp) => cmp.compile_into(params),
            Condition::Branch(branch) => branch.compile_into(params),
        }
    }
}

impl Comparison {
    fn compile_into(&self, params: &mut Vec<Value>) -> Result<String> {
        if self.field.is_empty() {
            return Err(QueryError::MalformedCondition(format!(
                "operator {:?} has no field",
                self.operator
            )));
        }
        if self.operator.trim().is_empty() {
            return Err(QueryError::MalformedCondition(format!(
                "field {:?} has no operator",
                self.field
            )));
        }

        validate_column_name(&self.field)?;
        let op = validate_operator(&self.operator)?;

        match (op, &self.value) {
            (op, Value::Null) if op.is_unary() => Ok(format!("{} {}", self.field, op)),
            (op, _) if op.is_unary() => Err(QueryError::MalformedCondition(format!(
                "{} on {:?} takes no value",
                op, self.field
            ))),
            (op, Value::List(items)) if op.is_membership() => {
                if items.is_empty() {
                    return Err(QueryError::MalformedCondition(format!(
                        "{} on {:?} needs at least one value",
                        op, self.field
                    )));
                }
                let placeholders = vec!["?"; items.len()].join(", ");
                params.extend(items.iter().cloned());
                Ok(format!("{} {} ({})", self.field, op, placeholders))
            }
            (op, value) if op.is_membership() => {
                params.push(value.clone());
                Ok(format!("{} {} (?)", self.field, op))
            }
            (Operator::Between, Value::List(items)) if items.len() == 2 => {
                params.extend(items.iter().cloned());
                Ok(format!("{} BETWEEN ? AND ?", self.field))
            }
            (Operator::Between, _) => Err(QueryError::MalformedCondition(format!(
                "BETWEEN on {:?} needs exactly two values",
                self.field
            ))),
            (op, value) => {
                params.push(value.clone());
                Ok(format!("{} {} ?", self.field, op))
            }
        }
    }
}

impl Branch {
    fn compile_into(&self, params: &mut Vec<Value>) -> Result<String> {
        let mut parts = Vec::with_capacity(self.nested.len());
        for child in &self.nested {
            let fragment = child.compile_into(params)?;
            if !fragment.is_empty() {
                parts.push(fragment);
            }
        }

        if parts.is_empty() {
            return Ok(String::new());
        }

        let separator = format!(" {} ", self.logic.unwrap_or_default());
        Ok(format!("({})", parts.join(&separator)))
    }
}

impl From<Comparison> for Condition {
    fn from(cmp: Comparison) -> Self {
        Condition::Leaf(cmp)
    }
}

impl From<Branch> for Condition {
    fn from(branch: Branch) -> Self {
        Condition::Branch(branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholders(sql: &str) -> usize {
        sql.matches('?').count()
    }

    #[test]
    fn test_leaf_binds_value_unmodified() {
        let (sql, args) = Condition::leaf("age", ">", 18).compile().unwrap();
        assert_eq!(sql, "age > ?");
        assert_eq!(args, vec![Value::Integer(18)]);
    }

    #[test]
    fn test_leaf_operator_upper_cased() {
        let (sql, args) = Condition::leaf("name", "like", "al%").compile().unwrap();
        assert_eq!(sql, "name LIKE ?");
        assert_eq!(args, vec![Value::from("al%")]);

        let (sql, _) = Condition::leaf("name", "not  like", "x").compile().unwrap();
        assert_eq!(sql, "name NOT LIKE ?");
    }

    #[test]
    fn test_or_branch() {
        let cond = Condition::any(vec![
            Condition::leaf("role", "=", "admin"),
            Condition::leaf("role", "=", "mod"),
        ]);
        let (sql, args) = cond.compile().unwrap();
        assert_eq!(sql, "(role = ? OR role = ?)");
        assert_eq!(args, vec![Value::from("admin"), Value::from("mod")]);
    }

    #[test]
    fn test_logic_defaults_to_and() {
        let cond = Condition::Branch(Branch {
            logic: None,
            nested: vec![Condition::leaf("a", "=", 1), Condition::leaf("b", "=", 2)],
        });
        let (sql, _) = cond.compile().unwrap();
        assert_eq!(sql, "(a = ? AND b = ?)");
    }

    #[test]
    fn test_nested_branch_args_depth_first() {
        let cond = Condition::all(vec![
            Condition::leaf("a", "=", 1),
            Condition::any(vec![
                Condition::leaf("b", "=", 2),
                Condition::all(vec![Condition::leaf("c", "=", 3), Condition::leaf("d", "=", 4)]),
            ]),
            Condition::leaf("e", "=", 5),
        ]);
        let (sql, args) = cond.compile().unwrap();

        assert_eq!(sql, "(a = ? AND (b = ? OR (c = ? AND d = ?)) AND e = ?)");
        assert_eq!(placeholders(&sql), args.len());
        assert_eq!(
            args,
            (1..=5).map(Value::from).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_branch_placeholders_sum_children() {
        let children = vec![
            Condition::leaf("a", "IN", vec![1, 2, 3]),
            Condition::leaf("b", "BETWEEN", vec![10, 20]),
            Condition::leaf("c", "IS NULL", Value::Null),
            Condition::leaf("d", "!=", "x"),
        ];
        let expected: usize = children
            .iter()
            .map(|c| placeholders(&c.compile().unwrap().0))
            .sum();

        let (sql, args) = Condition::all(children).compile().unwrap();
        assert_eq!(placeholders(&sql), expected);
        assert_eq!(args.len(), expected);
    }

    #[test]
    fn test_empty_children_skipped() {
        let cond = Condition::all(vec![
            Condition::any(vec![]),
            Condition::leaf("a", "=", 1),
            Condition::all(vec![Condition::any(vec![])]),
        ]);
        let (sql, args) = cond.compile().unwrap();
        assert_eq!(sql, "(a = ?)");
        assert_eq!(args.len(), 1);

        let (sql, args) = Condition::all(vec![]).compile().unwrap();
        assert!(sql.is_empty());
        assert!(args.is_empty());
    }

    #[test]
    fn test_membership_expansion() {
        let (sql, args) = Condition::leaf("id", "not in", vec![1, 2]).compile().unwrap();
        assert_eq!(sql, "id NOT IN (?, ?)");
        assert_eq!(args, vec![Value::Integer(1), Value::Integer(2)]);

        let (sql, args) = Condition::leaf("id", "IN", 7).compile().unwrap();
        assert_eq!(sql, "id IN (?)");
        assert_eq!(args, vec![Value::Integer(7)]);

        let err = Condition::leaf("id", "IN", Vec::<i32>::new()).compile().unwrap_err();
        assert!(matches!(err, QueryError::MalformedCondition(_)));
    }

    #[test]
    fn test_between() {
        let (sql, args) = Condition::leaf("age", "between", vec![18, 65]).compile().unwrap();
        assert_eq!(sql, "age BETWEEN ? AND ?");
        assert_eq!(args.len(), 2);

        let err = Condition::leaf("age", "BETWEEN", 18).compile().unwrap_err();
        assert!(matches!(err, QueryError::MalformedCondition(_)));
    }

    #[test]
    fn test_null_checks_bind_nothing() {
        let (sql, args) = Condition::leaf("deleted_at", "is null", Value::Null).compile().unwrap();
        assert_eq!(sql, "deleted_at IS NULL");
        assert!(args.is_empty());

        let (sql, args) = Condition::leaf("deleted_at", "IS", Value::Null).compile().unwrap();
        assert_eq!(sql, "deleted_at IS ?");
        assert_eq!(args, vec![Value::Null]);
    }

    #[test]
    fn test_null_checks_reject_payload() {
        let err = Condition::leaf("deleted_at", "IS NOT NULL", 5).compile().unwrap_err();
        assert!(matches!(err, QueryError::MalformedCondition(_)));

        let json = r#"{"field": "deleted_at", "operator": "IS NULL", "value": "x"}"#;
        let cond: Condition = serde_json::from_str(json).unwrap();
        assert!(matches!(cond.compile(), Err(QueryError::MalformedCondition(_))));
    }

    #[test]
    fn test_malformed_leaf() {
        let err = Condition::leaf("", "=", 1).compile().unwrap_err();
        assert!(matches!(err, QueryError::MalformedCondition(_)));

        let err = Condition::leaf("a", "", 1).compile().unwrap_err();
        assert!(matches!(err, QueryError::MalformedCondition(_)));
    }

    #[test]
    fn test_validation_errors_short_circuit() {
        let cond = Condition::all(vec![
            Condition::leaf("ok", "=", 1),
            Condition::leaf("bad field", "=", 2),
        ]);
        assert_eq!(
            cond.compile(),
            Err(QueryError::InvalidIdentifier("bad field".into()))
        );

        let cond = Condition::any(vec![Condition::leaf("a", "=1=1", 1)]);
        assert_eq!(
            cond.compile(),
            Err(QueryError::InvalidOperator("=1=1".into()))
        );
    }

    #[test]
    fn test_combinators_flatten_same_logic() {
        let cond = Condition::leaf("a", "=", 1)
            .and(Condition::leaf("b", "=", 2))
            .and(Condition::leaf("c", "=", 3));
        assert_eq!(cond.compile().unwrap().0, "(a = ? AND b = ? AND c = ?)");

        let cond = Condition::leaf("a", "=", 1)
            .and(Condition::leaf("b", "=", 2))
            .or(Condition::leaf("c", "=", 3));
        assert_eq!(cond.compile().unwrap().0, "((a = ? AND b = ?) OR c = ?)");
    }

    #[test]
    fn test_deserialize_rejects_half_leaf() {
        let result = serde_json::from_str::<Condition>(r#"{"field": "age", "value": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_tree() {
        let json = r#"{
            "logic": "OR",
            "nested": [
                {"field": "role", "operator": "=", "value": "admin"},
                {"logic": "and", "nested": [
                    {"field": "age", "operator": ">=", "value": 18},
                    {"field": "banned", "operator": "IS NULL"}
                ]}
            ]
        }"#;
        let cond: Condition = serde_json::from_str(json).unwrap();
        let (sql, args) = cond.compile().unwrap();

        assert_eq!(sql, "(role = ? OR (age >= ? AND banned IS NULL))");
        assert_eq!(args, vec![Value::from("admin"), Value::from(18)]);
    }
}
