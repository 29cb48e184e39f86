//! Parser for the Tessera statement language.
//!
//! A recursive-descent parser over the lexer's token stream. One call
//! parses one statement; the grammar dispatches on the leading keyword.
//!
//! # Supported statements
//!
//! ```text
//! create table users ({key, autoincrement} id: int32, {unique} login: string[32])
//! insert (login = "a", is_admin = true) to users
//! select * from users where id = 1 + 1
//! update users set is_admin = true where login = "a"
//! delete users where login = "a"
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::executor::{CompareOp, EvalError, Predicate, Value, ValueKind};
use crate::storage::{Column, ColumnFlags, StorageError};

mod expr;
mod lexer;
mod statement;

pub use expr::{decode_hex_literal, BinaryOp, Expr, UnaryOp};
pub use lexer::{LexError, LexResult, Lexer, Token, TokenKind};
pub use statement::{CreateTable, Delete, Insert, Select, Statement, Update};

/// Errors that can occur while parsing a statement.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The lexer failed underneath the parser.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The current token does not fit the grammar.
    #[error("expected {expected}, but got '{found}' at line {line}, column {column}")]
    UnexpectedToken {
        /// What the grammar required.
        expected: String,
        /// The offending lexeme.
        found: String,
        /// Source line.
        line: u32,
        /// Source column.
        column: u32,
    },

    /// The statement does not start with a known command keyword.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A token with no interpretation inside an expression.
    #[error("unexpected token '{found}' in expression at line {line}")]
    UnexpectedExpressionToken {
        /// The offending lexeme.
        found: String,
        /// Source line.
        line: u32,
    },

    /// An attribute list named something other than
    /// `unique`/`key`/`autoincrement`.
    #[error("unknown column attribute '{0}'")]
    UnknownAttribute(String),

    /// A column declaration named no known type.
    #[error("unknown column type '{0}'")]
    UnknownType(String),

    /// A literal does not fit the declared column type.
    #[error("expected {expected} literal, but got '{found}'")]
    LiteralMismatch {
        /// The literal form the declared type requires.
        expected: &'static str,
        /// The offending lexeme.
        found: String,
    },

    /// An integer literal outside the 32-bit range.
    #[error("integer literal out of range: {0}")]
    InvalidNumber(String),

    /// Column construction rejected the declaration.
    #[error(transparent)]
    Schema(#[from] StorageError),

    /// Folding a constant expression failed.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

impl From<ParseError> for tessera_common::TesseraError {
    fn from(e: ParseError) -> Self {
        use tessera_common::TesseraError;
        match e {
            ParseError::Lex(inner) => TesseraError::Lex(inner.to_string()),
            ParseError::Schema(inner) => inner.into(),
            ParseError::Eval(inner) => inner.into(),
            other => TesseraError::Parse(other.to_string()),
        }
    }
}

/// Column attributes collected from a braced list.
#[derive(Debug, Default, Clone, Copy)]
struct Attributes {
    unique: bool,
    key: bool,
    auto_increment: bool,
}

/// Recursive-descent parser over one statement.
#[derive(Debug)]
pub struct Parser {
    lexer: Lexer,
    current: Token,
    previous: Token,
}

impl Parser {
    /// Creates a parser and primes it with the first token.
    pub fn new(source: &str) -> ParseResult<Self> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            previous: Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                line: 0,
                column: 0,
            },
        })
    }

    /// Parses one statement from `source`, requiring it to consume the
    /// whole input.
    pub fn parse(source: &str) -> ParseResult<Statement> {
        let mut parser = Self::new(source)?;
        let statement = parser.parse_statement()?;
        parser.expect(TokenKind::Eof)?;
        Ok(statement)
    }

    /// Parses the statement at the current position.
    pub fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current.kind {
            TokenKind::Create => self.parse_create_table().map(Statement::CreateTable),
            TokenKind::Insert => self.parse_insert().map(Statement::Insert),
            TokenKind::Select => self.parse_select().map(Statement::Select),
            TokenKind::Update => self.parse_update().map(Statement::Update),
            TokenKind::Delete => self.parse_delete().map(Statement::Delete),
            _ => Err(ParseError::UnknownCommand(self.current.lexeme.clone())),
        }
    }

    // =========================================================================
    // Token plumbing
    // =========================================================================

    fn advance(&mut self) -> ParseResult<()> {
        let next = self.lexer.next_token()?;
        self.previous = std::mem::replace(&mut self.current, next);
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.current.kind == kind {
            self.advance()
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn match_kind(&mut self, kind: TokenKind) -> ParseResult<bool> {
        if self.current.kind == kind {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: if self.current.kind == TokenKind::Eof {
                "<eof>".to_string()
            } else {
                self.current.lexeme.clone()
            },
            line: self.current.line,
            column: self.current.column,
        }
    }

    fn int_literal(lexeme: &str) -> ParseResult<i32> {
        lexeme
            .parse::<i32>()
            .map_err(|_| ParseError::InvalidNumber(lexeme.to_string()))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_create_table(&mut self) -> ParseResult<CreateTable> {
        self.expect(TokenKind::Create)?;
        self.expect(TokenKind::Table)?;

        self.expect(TokenKind::Identifier)?;
        let name = self.previous.lexeme.clone();

        self.expect(TokenKind::LeftParen)?;
        let columns = self.parse_column_definitions()?;
        self.expect(TokenKind::RightParen)?;

        Ok(CreateTable { name, columns })
    }

    fn parse_column_definitions(&mut self) -> ParseResult<Vec<Column>> {
        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_definition()?);
            if !self.match_kind(TokenKind::Comma)? {
                break;
            }
        }
        Ok(columns)
    }

    fn parse_column_definition(&mut self) -> ParseResult<Column> {
        let attributes = self.parse_attributes()?;

        self.expect(TokenKind::Identifier)?;
        let name = self.previous.lexeme.clone();

        self.expect(TokenKind::Colon)?;
        let declared = match self.current.kind {
            TokenKind::Int32 | TokenKind::String | TokenKind::Bytes | TokenKind::Bool => {
                self.current.kind
            }
            _ => return Err(ParseError::UnknownType(self.current.lexeme.clone())),
        };
        self.advance()?;

        let mut max_len = 0;
        if self.match_kind(TokenKind::LeftBracket)? {
            self.expect(TokenKind::IntLiteral)?;
            max_len = Self::int_literal(&self.previous.lexeme)? as usize;
            self.expect(TokenKind::RightBracket)?;
        }

        let default = if self.match_kind(TokenKind::Equal)? {
            Some(self.parse_literal_for(declared)?)
        } else {
            None
        };

        let flags = ColumnFlags {
            unique: attributes.unique,
            key: attributes.key,
            index: false,
            auto_increment: attributes.auto_increment,
        };
        let kind = match declared {
            TokenKind::Int32 => ValueKind::Integer,
            TokenKind::String => ValueKind::String,
            TokenKind::Bytes => ValueKind::Bytes,
            _ => ValueKind::Bool,
        };
        Ok(Column::new(kind, name, max_len, default, flags)?)
    }

    fn parse_attributes(&mut self) -> ParseResult<Attributes> {
        let mut attributes = Attributes::default();
        if !self.match_kind(TokenKind::LeftBrace)? {
            return Ok(attributes);
        }
        loop {
            self.expect(TokenKind::Identifier)?;
            match self.previous.lexeme.to_lowercase().as_str() {
                "unique" => attributes.unique = true,
                "key" => attributes.key = true,
                "autoincrement" => attributes.auto_increment = true,
                other => return Err(ParseError::UnknownAttribute(other.to_string())),
            }
            if !self.match_kind(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::RightBrace)?;
        Ok(attributes)
    }

    /// Materializes a literal under a declared column type.
    fn parse_literal_for(&mut self, declared: TokenKind) -> ParseResult<Value> {
        let value = match (declared, self.current.kind) {
            (TokenKind::Int32, TokenKind::IntLiteral) => {
                Value::Int(Self::int_literal(&self.current.lexeme)?)
            }
            (TokenKind::String, TokenKind::StringLiteral) => {
                Value::Str(self.current.lexeme.clone())
            }
            (TokenKind::Bytes, TokenKind::HexLiteral) => {
                Value::Bytes(decode_hex_literal(&self.current.lexeme))
            }
            (TokenKind::Bool, TokenKind::True) => Value::Bool(true),
            (TokenKind::Bool, TokenKind::False) => Value::Bool(false),
            (declared, _) => {
                let expected = match declared {
                    TokenKind::Int32 => "integer",
                    TokenKind::String => "string",
                    TokenKind::Bytes => "hex",
                    _ => "boolean",
                };
                return Err(ParseError::LiteralMismatch {
                    expected,
                    found: self.current.lexeme.clone(),
                });
            }
        };
        self.advance()?;
        Ok(value)
    }

    /// Materializes a literal from its own token kind.
    fn parse_literal(&mut self) -> ParseResult<Value> {
        let value = match self.current.kind {
            TokenKind::IntLiteral => Value::Int(Self::int_literal(&self.current.lexeme)?),
            TokenKind::StringLiteral => Value::Str(self.current.lexeme.clone()),
            TokenKind::HexLiteral => Value::Bytes(decode_hex_literal(&self.current.lexeme)),
            TokenKind::True => Value::Bool(true),
            TokenKind::False => Value::Bool(false),
            _ => return Err(self.unexpected("literal")),
        };
        self.advance()?;
        Ok(value)
    }

    fn parse_insert(&mut self) -> ParseResult<Insert> {
        self.expect(TokenKind::Insert)?;
        self.expect(TokenKind::LeftParen)?;
        let values = self.parse_assignments()?;
        self.expect(TokenKind::RightParen)?;
        self.expect(TokenKind::To)?;

        self.expect(TokenKind::Identifier)?;
        let table = self.previous.lexeme.clone();

        Ok(Insert { table, values })
    }

    fn parse_assignments(&mut self) -> ParseResult<HashMap<String, Value>> {
        let mut values = HashMap::new();
        loop {
            self.expect(TokenKind::Identifier)?;
            let name = self.previous.lexeme.clone();
            self.expect(TokenKind::Equal)?;
            let value = self.parse_literal()?;
            values.insert(name, value);
            if !self.match_kind(TokenKind::Comma)? {
                break;
            }
        }
        Ok(values)
    }

    fn parse_select(&mut self) -> ParseResult<Select> {
        self.expect(TokenKind::Select)?;

        let mut projection = Vec::new();
        if !self.match_kind(TokenKind::Star)? {
            loop {
                projection.push(self.parse_column_name()?);
                if !self.match_kind(TokenKind::Comma)? {
                    break;
                }
            }
        }

        self.expect(TokenKind::From)?;
        self.expect(TokenKind::Identifier)?;
        let table = self.previous.lexeme.clone();

        // Joins are reserved grammar; the clause parses and is dropped.
        while self.check(TokenKind::Join) {
            self.parse_join_clause()?;
        }

        let predicate = if self.match_kind(TokenKind::Where)? {
            Some(self.parse_where()?)
        } else {
            None
        };

        Ok(Select {
            table,
            projection,
            predicate,
        })
    }

    /// Parses a possibly qualified column name; the qualifier is dropped
    /// because execution is single-table.
    fn parse_column_name(&mut self) -> ParseResult<String> {
        self.expect(TokenKind::Identifier)?;
        let mut name = self.previous.lexeme.clone();
        if self.match_kind(TokenKind::Dot)? {
            self.expect(TokenKind::Identifier)?;
            name = self.previous.lexeme.clone();
        }
        Ok(name)
    }

    fn parse_join_clause(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::Join)?;
        self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::On)?;
        self.parse_expression()?;
        Ok(())
    }

    fn parse_update(&mut self) -> ParseResult<Update> {
        self.expect(TokenKind::Update)?;

        self.expect(TokenKind::Identifier)?;
        let table = self.previous.lexeme.clone();

        self.expect(TokenKind::Set)?;
        let assignments = self.parse_assignments()?;

        let predicate = if self.match_kind(TokenKind::Where)? {
            Some(self.parse_where()?)
        } else {
            None
        };

        Ok(Update {
            table,
            assignments,
            predicate,
        })
    }

    fn parse_delete(&mut self) -> ParseResult<Delete> {
        self.expect(TokenKind::Delete)?;

        self.expect(TokenKind::Identifier)?;
        let table = self.previous.lexeme.clone();

        let predicate = if self.match_kind(TokenKind::Where)? {
            Some(self.parse_where()?)
        } else {
            None
        };

        Ok(Delete { table, predicate })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_and()?;
        while self.match_kind(TokenKind::Or)? {
            let right = self.parse_and()?;
            left = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.match_kind(TokenKind::And)? {
            let right = self.parse_equality()?;
            left = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = if self.match_kind(TokenKind::Equal)? {
                BinaryOp::Eq
            } else if self.match_kind(TokenKind::NotEqual)? {
                BinaryOp::NotEq
            } else {
                break;
            };
            let right = self.parse_relational()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = if self.match_kind(TokenKind::Less)? {
                BinaryOp::Less
            } else if self.match_kind(TokenKind::LessEqual)? {
                BinaryOp::LessEq
            } else if self.match_kind(TokenKind::Greater)? {
                BinaryOp::Greater
            } else if self.match_kind(TokenKind::GreaterEqual)? {
                BinaryOp::GreaterEq
            } else {
                break;
            };
            let right = self.parse_additive()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.match_kind(TokenKind::Plus)? {
                BinaryOp::Add
            } else if self.match_kind(TokenKind::Minus)? {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.match_kind(TokenKind::Star)? {
                BinaryOp::Mul
            } else if self.match_kind(TokenKind::Slash)? {
                BinaryOp::Div
            } else if self.match_kind(TokenKind::Percent)? {
                BinaryOp::Mod
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = if self.match_kind(TokenKind::Not)? {
            Some(UnaryOp::Not)
        } else if self.match_kind(TokenKind::Minus)? {
            Some(UnaryOp::Neg)
        } else {
            None
        };
        match op {
            Some(op) => Ok(Expr::Unary {
                op,
                operand: Box::new(self.parse_unary()?),
            }),
            None => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        if self.match_kind(TokenKind::LeftParen)? {
            let expr = self.parse_expression()?;
            self.expect(TokenKind::RightParen)?;
            return Ok(expr);
        }
        if self.match_kind(TokenKind::Pipe)? {
            self.expect(TokenKind::Identifier)?;
            let name = self.previous.lexeme.clone();
            self.expect(TokenKind::Pipe)?;
            return Ok(Expr::StringLength(name));
        }
        if self.match_kind(TokenKind::Identifier)? {
            let mut name = self.previous.lexeme.clone();
            if self.match_kind(TokenKind::Dot)? {
                self.expect(TokenKind::Identifier)?;
                name = format!("{}.{}", name, self.previous.lexeme);
            }
            return Ok(Expr::Identifier(name));
        }
        if self.match_kind(TokenKind::IntLiteral)? {
            return Ok(Expr::Literal(Value::Int(Self::int_literal(
                &self.previous.lexeme,
            )?)));
        }
        if self.match_kind(TokenKind::StringLiteral)? {
            return Ok(Expr::Literal(Value::Str(self.previous.lexeme.clone())));
        }
        if self.match_kind(TokenKind::HexLiteral)? {
            return Ok(Expr::Literal(Value::Bytes(decode_hex_literal(
                &self.previous.lexeme,
            ))));
        }
        if self.match_kind(TokenKind::True)? {
            return Ok(Expr::Literal(Value::Bool(true)));
        }
        if self.match_kind(TokenKind::False)? {
            return Ok(Expr::Literal(Value::Bool(false)));
        }
        Err(ParseError::UnexpectedExpressionToken {
            found: self.current.lexeme.clone(),
            line: self.current.line,
        })
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    fn parse_where(&mut self) -> ParseResult<Predicate> {
        self.parse_or_filter()
    }

    fn parse_or_filter(&mut self) -> ParseResult<Predicate> {
        let mut left = self.parse_and_filter()?;
        while self.match_kind(TokenKind::Or)? {
            let right = self.parse_and_filter()?;
            left = Predicate::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and_filter(&mut self) -> ParseResult<Predicate> {
        let mut left = self.parse_not_filter()?;
        while self.match_kind(TokenKind::And)? {
            let right = self.parse_not_filter()?;
            left = Predicate::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not_filter(&mut self) -> ParseResult<Predicate> {
        if self.match_kind(TokenKind::Not)? {
            let inner = self.parse_not_filter()?;
            Ok(Predicate::Not(Box::new(inner)))
        } else {
            self.parse_comparison_filter()
        }
    }

    fn parse_comparison_filter(&mut self) -> ParseResult<Predicate> {
        self.expect(TokenKind::Identifier)?;
        let column = self.previous.lexeme.clone();

        let op = if self.match_kind(TokenKind::Equal)? {
            CompareOp::Eq
        } else if self.match_kind(TokenKind::NotEqual)? {
            CompareOp::NotEq
        } else if self.match_kind(TokenKind::Less)? {
            CompareOp::Less
        } else if self.match_kind(TokenKind::LessEqual)? {
            CompareOp::LessEq
        } else if self.match_kind(TokenKind::Greater)? {
            CompareOp::Greater
        } else if self.match_kind(TokenKind::GreaterEqual)? {
            CompareOp::GreaterEq
        } else {
            return Err(self.unexpected("comparison operator"));
        };

        // The right-hand side runs through the arithmetic grammar and is
        // folded immediately, so `id = 1 + 1` stores the literal 2. Only
        // the arithmetic levels participate; logical operators stay at
        // the filter level.
        let rhs = self.parse_additive()?;
        let value = rhs.evaluate()?;

        Ok(Predicate::compare(column, op, value))
    }
}
