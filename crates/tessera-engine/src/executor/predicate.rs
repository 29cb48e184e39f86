//! Predicate trees for WHERE clauses.
//!
//! A predicate is a three-node tree: comparison leaves holding a column
//! name, an operator, and a pre-evaluated literal; logical `And`/`Or`;
//! and `Not`. Evaluation is pure over a record and its table.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::storage::Table;

use super::error::{EvalError, EvalResult};
use super::record::Record;
use super::value::Value;

/// Comparison operator of a predicate leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// `=` / `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
}

impl CompareOp {
    /// Applies the operator to an ordering between two values.
    fn test(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::NotEq => ordering != Ordering::Equal,
            CompareOp::Less => ordering == Ordering::Less,
            CompareOp::LessEq => ordering != Ordering::Greater,
            CompareOp::Greater => ordering == Ordering::Greater,
            CompareOp::GreaterEq => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Less => "<",
            CompareOp::LessEq => "<=",
            CompareOp::Greater => ">",
            CompareOp::GreaterEq => ">=",
        };
        f.write_str(s)
    }
}

/// A predicate tree filtering records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Comparison leaf: column value against a literal.
    Compare {
        /// Column name.
        column: String,
        /// Comparison operator.
        op: CompareOp,
        /// Pre-evaluated right-hand side.
        value: Value,
    },
    /// Both sides must match; right side is skipped when the left fails.
    And(Box<Predicate>, Box<Predicate>),
    /// Either side matches; right side is skipped when the left matches.
    Or(Box<Predicate>, Box<Predicate>),
    /// Inverts the inner predicate.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Builds a comparison leaf.
    pub fn compare(column: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Predicate::Compare {
            column: column.into(),
            op,
            value,
        }
    }

    /// Evaluates the predicate against a record of `table`.
    ///
    /// Comparison uses variant-aware ordering; mismatched variants are a
    /// type error. Evaluation does not mutate the record or the table.
    pub fn matches(&self, record: &Record, table: &Table) -> EvalResult<bool> {
        match self {
            Predicate::Compare { column, op, value } => {
                let position = table
                    .position_of(column)
                    .ok_or_else(|| EvalError::UnknownColumn(column.clone()))?;
                let cell = record
                    .value(position)
                    .ok_or_else(|| EvalError::UnknownColumn(column.clone()))?;
                Ok(op.test(cell.try_cmp(value)?))
            }
            Predicate::And(left, right) => {
                Ok(left.matches(record, table)? && right.matches(record, table)?)
            }
            Predicate::Or(left, right) => {
                Ok(left.matches(record, table)? || right.matches(record, table)?)
            }
            Predicate::Not(inner) => Ok(!inner.matches(record, table)?),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { column, op, value } => {
                write!(f, "{} {} {}", column, op, value)
            }
            Predicate::And(l, r) => write!(f, "({} && {})", l, r),
            Predicate::Or(l, r) => write!(f, "({} || {})", l, r),
            Predicate::Not(inner) => write!(f, "!({})", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Column, ColumnFlags};
    use std::collections::HashMap;

    fn users_table() -> Table {
        let columns = vec![
            Column::string("login", 32, None, ColumnFlags::unique()).unwrap(),
            Column::integer("age", None, ColumnFlags::default()).unwrap(),
        ];
        let mut table = Table::new("users", columns).unwrap();
        let mut values = HashMap::new();
        values.insert("login".to_string(), Value::string("alice"));
        values.insert("age".to_string(), Value::int(30));
        table.insert(values).unwrap();
        table
    }

    fn first_record(table: &Table) -> Record {
        table.records().next().unwrap().clone()
    }

    #[test]
    fn test_compare_eq() {
        let table = users_table();
        let record = first_record(&table);

        let p = Predicate::compare("age", CompareOp::Eq, Value::int(30));
        assert!(p.matches(&record, &table).unwrap());

        let p = Predicate::compare("age", CompareOp::Eq, Value::int(31));
        assert!(!p.matches(&record, &table).unwrap());
    }

    #[test]
    fn test_compare_orderings() {
        let table = users_table();
        let record = first_record(&table);

        for (op, rhs, expected) in [
            (CompareOp::Less, 40, true),
            (CompareOp::LessEq, 30, true),
            (CompareOp::Greater, 30, false),
            (CompareOp::GreaterEq, 30, true),
            (CompareOp::NotEq, 31, true),
        ] {
            let p = Predicate::compare("age", op, Value::int(rhs));
            assert_eq!(p.matches(&record, &table).unwrap(), expected, "{:?}", op);
        }
    }

    #[test]
    fn test_logical_nodes() {
        let table = users_table();
        let record = first_record(&table);

        let adult = Predicate::compare("age", CompareOp::GreaterEq, Value::int(18));
        let named = Predicate::compare("login", CompareOp::Eq, Value::string("alice"));

        let both = Predicate::And(Box::new(adult.clone()), Box::new(named.clone()));
        assert!(both.matches(&record, &table).unwrap());

        let neither = Predicate::compare("age", CompareOp::Less, Value::int(0));
        let either = Predicate::Or(Box::new(neither.clone()), Box::new(named));
        assert!(either.matches(&record, &table).unwrap());

        let negated = Predicate::Not(Box::new(neither));
        assert!(negated.matches(&record, &table).unwrap());
    }

    #[test]
    fn test_short_circuit_skips_bad_right_side() {
        let table = users_table();
        let record = first_record(&table);

        // Right side would fail with a type mismatch, but the left side
        // already decides the outcome.
        let bad = Predicate::compare("age", CompareOp::Eq, Value::string("x"));
        let fails = Predicate::compare("age", CompareOp::Less, Value::int(0));
        let and = Predicate::And(Box::new(fails), Box::new(bad.clone()));
        assert!(!and.matches(&record, &table).unwrap());

        let holds = Predicate::compare("age", CompareOp::Eq, Value::int(30));
        let or = Predicate::Or(Box::new(holds), Box::new(bad));
        assert!(or.matches(&record, &table).unwrap());
    }

    #[test]
    fn test_type_mismatch_fails() {
        let table = users_table();
        let record = first_record(&table);

        let p = Predicate::compare("age", CompareOp::Eq, Value::string("30"));
        assert!(matches!(
            p.matches(&record, &table),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_column_fails() {
        let table = users_table();
        let record = first_record(&table);

        let p = Predicate::compare("missing", CompareOp::Eq, Value::int(1));
        assert!(matches!(
            p.matches(&record, &table),
            Err(EvalError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_display() {
        let p = Predicate::And(
            Box::new(Predicate::compare("a", CompareOp::Eq, Value::int(1))),
            Box::new(Predicate::Not(Box::new(Predicate::compare(
                "b",
                CompareOp::Less,
                Value::int(2),
            )))),
        );
        assert_eq!(p.to_string(), "(a = 1 && !(b < 2))");
    }
}
