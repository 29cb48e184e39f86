//! Expression AST and constant folding.
//!
//! Expressions appear on the right-hand side of WHERE comparisons and in
//! (reserved) JOIN conditions. Comparison right-hand sides are folded at
//! parse time with an empty context: arithmetic over literals collapses
//! to one value, a bare identifier evaluates to its own name, and
//! `|ident|` to the name's length.

use serde::{Deserialize, Serialize};

use crate::executor::{EvalError, EvalResult, Value};

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical negation `!`.
    Not,
    /// Arithmetic negation `-`.
    Neg,
}

/// Binary operators, in the expression grammar's precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `||`
    Or,
    /// `&&`
    And,
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
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl BinaryOp {
    fn lexeme(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

/// An expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal value.
    Literal(Value),
    /// A (possibly qualified) identifier.
    Identifier(String),
    /// `|ident|` string-length notation.
    StringLength(String),
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
}

impl Expr {
    /// Evaluates the expression with an empty context.
    ///
    /// Identifiers evaluate to their own name and `|ident|` to the
    /// name's length; arithmetic is defined over integers, logic over
    /// booleans, equality and ordering over same-variant values.
    pub fn evaluate(&self) -> EvalResult<Value> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Identifier(name) => Ok(Value::Str(name.clone())),
            Expr::StringLength(name) => Ok(Value::Int(name.len() as i32)),
            Expr::Unary { op, operand } => {
                let value = operand.evaluate()?;
                match (op, value) {
                    (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (UnaryOp::Not, other) => Err(EvalError::UnsupportedOperator {
                        operator: "!".to_string(),
                        operand: other.kind(),
                    }),
                    (UnaryOp::Neg, Value::Int(v)) => Ok(Value::Int(-v)),
                    (UnaryOp::Neg, other) => Err(EvalError::UnsupportedOperator {
                        operator: "-".to_string(),
                        operand: other.kind(),
                    }),
                }
            }
            Expr::Binary { op, left, right } => {
                let left = left.evaluate()?;
                let right = right.evaluate()?;
                evaluate_binary(*op, left, right)
            }
        }
    }
}

fn integer_operands(op: BinaryOp, left: Value, right: Value) -> EvalResult<(i32, i32)> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok((a, b)),
        (Value::Int(_), other) | (other, _) => Err(EvalError::UnsupportedOperator {
            operator: op.lexeme().to_string(),
            operand: other.kind(),
        }),
    }
}

fn boolean_operands(op: BinaryOp, left: Value, right: Value) -> EvalResult<(bool, bool)> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok((a, b)),
        (Value::Bool(_), other) | (other, _) => Err(EvalError::UnsupportedOperator {
            operator: op.lexeme().to_string(),
            operand: other.kind(),
        }),
    }
}

fn evaluate_binary(op: BinaryOp, left: Value, right: Value) -> EvalResult<Value> {
    match op {
        BinaryOp::Add => {
            let (a, b) = integer_operands(op, left, right)?;
            Ok(Value::Int(a.wrapping_add(b)))
        }
        BinaryOp::Sub => {
            let (a, b) = integer_operands(op, left, right)?;
            Ok(Value::Int(a.wrapping_sub(b)))
        }
        BinaryOp::Mul => {
            let (a, b) = integer_operands(op, left, right)?;
            Ok(Value::Int(a.wrapping_mul(b)))
        }
        BinaryOp::Div => {
            let (a, b) = integer_operands(op, left, right)?;
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Int(a.wrapping_div(b)))
        }
        BinaryOp::Mod => {
            let (a, b) = integer_operands(op, left, right)?;
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Int(a.wrapping_rem(b)))
        }
        BinaryOp::Eq => Ok(Value::Bool(
            left.try_cmp(&right)? == std::cmp::Ordering::Equal,
        )),
        BinaryOp::NotEq => Ok(Value::Bool(
            left.try_cmp(&right)? != std::cmp::Ordering::Equal,
        )),
        BinaryOp::Less => Ok(Value::Bool(
            left.try_cmp(&right)? == std::cmp::Ordering::Less,
        )),
        BinaryOp::LessEq => Ok(Value::Bool(
            left.try_cmp(&right)? != std::cmp::Ordering::Greater,
        )),
        BinaryOp::Greater => Ok(Value::Bool(
            left.try_cmp(&right)? == std::cmp::Ordering::Greater,
        )),
        BinaryOp::GreaterEq => Ok(Value::Bool(
            left.try_cmp(&right)? != std::cmp::Ordering::Less,
        )),
        BinaryOp::And => {
            let (a, b) = boolean_operands(op, left, right)?;
            Ok(Value::Bool(a && b))
        }
        BinaryOp::Or => {
            let (a, b) = boolean_operands(op, left, right)?;
            Ok(Value::Bool(a || b))
        }
    }
}

/// Decodes a hex literal lexeme (`0x…`) into bytes, one byte per digit
/// pair. An odd leading digit contributes the high nibble zero.
pub fn decode_hex_literal(lexeme: &str) -> Vec<u8> {
    let digits = &lexeme[2..];
    let mut bytes = Vec::with_capacity((digits.len() + 1) / 2);
    let mut chars = digits.chars();
    if digits.len() % 2 == 1 {
        let first = chars.next().expect("odd-length digits have a first digit");
        bytes.push(first.to_digit(16).expect("lexer admits hex digits only") as u8);
    }
    let rest: Vec<char> = chars.collect();
    for pair in rest.chunks(2) {
        let high = pair[0].to_digit(16).expect("lexer admits hex digits only");
        let low = pair[1].to_digit(16).expect("lexer admits hex digits only");
        bytes.push(((high << 4) | low) as u8);
    }
    bytes
}
