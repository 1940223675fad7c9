use std::fmt;

use serde::Serialize;

use crate::value::Value;

/// SQL text with `?` placeholders plus the arguments bound to them, in
/// placeholder order.
///
/// The placeholder style is dialect-neutral; an execution layer rewrites
/// `?` positionally (for example to `$1, $2, ...`) without reordering
/// `args`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// Counts `?` placeholders outside single-quoted literals.
    pub fn placeholder_count(&self) -> usize {
        let mut in_literal = false;
        self.sql
            .chars()
            .filter(|c| {
                if *c == '\'' {
                    in_literal = !in_literal;
                }
                *c == '?' && !in_literal
            })
            .count()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_count_skips_literals() {
        let stmt = Statement::new("SELECT * FROM t WHERE a = ? AND b = '?' AND c IN (?, ?)", vec![]);
        assert_eq!(stmt.placeholder_count(), 3);
    }
}
