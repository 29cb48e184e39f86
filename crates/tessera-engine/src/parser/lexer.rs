//! Lexer for the Tessera statement language.
//!
//! Produces a stream of tokens until `Eof`. Keywords are matched
//! case-insensitively; identifiers stay case-sensitive. The lexer is a
//! pure producer over one source string; restarting requires a fresh
//! instance.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lexical errors, carrying the source position.
#[derive(Debug, Error)]
pub enum LexError {
    /// A string literal reached end of input before its closing quote.
    #[error("unterminated string literal at line {line}, column {column}")]
    UnterminatedString {
        /// Line of the opening quote.
        line: u32,
        /// Column of the opening quote.
        column: u32,
    },

    /// A character with no token interpretation.
    #[error("unexpected character '{ch}' at line {line}, column {column}")]
    UnexpectedCharacter {
        /// The offending character.
        ch: char,
        /// Line of the character.
        line: u32,
        /// Column of the character.
        column: u32,
    },

    /// `0x` with no hex digits behind it.
    #[error("hex literal without digits at line {line}, column {column}")]
    EmptyHexLiteral {
        /// Line of the literal.
        line: u32,
        /// Column of the literal.
        column: u32,
    },
}

/// Result type for lexing operations.
pub type LexResult<T> = Result<T, LexError>;

/// Token kinds of the statement language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    // Keywords
    /// `CREATE`
    Create,
    /// `TABLE`
    Table,
    /// `INSERT`
    Insert,
    /// `SELECT`
    Select,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
    /// `JOIN` (reserved; single-table execution)
    Join,
    /// `ON`
    On,
    /// `SET`
    Set,
    /// `FROM`
    From,
    /// `TO`
    To,
    /// `WHERE`
    Where,
    /// `TRUE`
    True,
    /// `FALSE`
    False,
    /// `BY` (reserved)
    By,
    /// `ORDERED` (reserved)
    Ordered,
    /// `INDEX` (reserved)
    Index,
    /// `INT32` type
    Int32,
    /// `STRING` type
    String,
    /// `BYTES` type
    Bytes,
    /// `BOOL` type
    Bool,

    // Identifiers and literals
    /// `[A-Za-z_][A-Za-z0-9_]*`
    Identifier,
    /// `[0-9]+`
    IntLiteral,
    /// `0x[0-9A-Fa-f]+`
    HexLiteral,
    /// `"…"`
    StringLiteral,

    // Operators
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*` (multiplication or projection wildcard)
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `=` or `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `^^`
    Xor,
    /// `!`
    Not,
    /// `|`
    Pipe,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `.`
    Dot,

    /// End of input.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One lexed token with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Raw lexeme (string literals exclude their quotes).
    pub lexeme: String,
    /// 1-based source line of the token start.
    pub line: u32,
    /// 1-based source column of the token start.
    pub column: u32,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }
}

/// A lexer over one source string.
#[derive(Debug)]
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    /// Creates a lexer for `source`.
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }

    /// Produces the next token.
    pub fn next_token(&mut self) -> LexResult<Token> {
        self.skip_whitespace();

        let (line, column) = (self.line, self.column);
        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", line, column));
        };

        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.identifier_or_keyword(line, column));
        }
        if c.is_ascii_digit() {
            return self.number(line, column);
        }
        if c == '"' {
            return self.string_literal(line, column);
        }
        self.operator(line, column)
    }

    fn identifier_or_keyword(&mut self, line: u32, column: u32) -> Token {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        let lexeme: String = self.chars[start..self.pos].iter().collect();
        let kind = match lexeme.to_uppercase().as_str() {
            "CREATE" => TokenKind::Create,
            "TABLE" => TokenKind::Table,
            "INSERT" => TokenKind::Insert,
            "SELECT" => TokenKind::Select,
            "UPDATE" => TokenKind::Update,
            "DELETE" => TokenKind::Delete,
            "JOIN" => TokenKind::Join,
            "ON" => TokenKind::On,
            "SET" => TokenKind::Set,
            "FROM" => TokenKind::From,
            "TO" => TokenKind::To,
            "WHERE" => TokenKind::Where,
            "TRUE" => TokenKind::True,
            "FALSE" => TokenKind::False,
            "BY" => TokenKind::By,
            "ORDERED" => TokenKind::Ordered,
            "INDEX" => TokenKind::Index,
            "INT32" => TokenKind::Int32,
            "STRING" => TokenKind::String,
            "BYTES" => TokenKind::Bytes,
            "BOOL" => TokenKind::Bool,
            _ => TokenKind::Identifier,
        };
        Token::new(kind, lexeme, line, column)
    }

    fn number(&mut self, line: u32, column: u32) -> LexResult<Token> {
        if self.peek() == Some('0') && matches!(self.peek_next(), Some('x') | Some('X')) {
            return self.hex_number(line, column);
        }
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        let lexeme: String = self.chars[start..self.pos].iter().collect();
        Ok(Token::new(TokenKind::IntLiteral, lexeme, line, column))
    }

    fn hex_number(&mut self, line: u32, column: u32) -> LexResult<Token> {
        let start = self.pos;
        self.advance(); // 0
        self.advance(); // x
        let digits_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.advance();
        }
        if self.pos == digits_start {
            return Err(LexError::EmptyHexLiteral { line, column });
        }
        let lexeme: String = self.chars[start..self.pos].iter().collect();
        Ok(Token::new(TokenKind::HexLiteral, lexeme, line, column))
    }

    fn string_literal(&mut self, line: u32, column: u32) -> LexResult<Token> {
        self.advance(); // opening quote
        let start = self.pos;
        while self.peek().is_some_and(|c| c != '"') {
            self.advance();
        }
        if self.peek().is_none() {
            return Err(LexError::UnterminatedString { line, column });
        }
        let lexeme: String = self.chars[start..self.pos].iter().collect();
        self.advance(); // closing quote
        Ok(Token::new(TokenKind::StringLiteral, lexeme, line, column))
    }

    fn operator(&mut self, line: u32, column: u32) -> LexResult<Token> {
        let c = self.advance().expect("operator called at end of input");
        let token = |kind: TokenKind, lexeme: &str| Ok(Token::new(kind, lexeme, line, column));

        match c {
            '+' => token(TokenKind::Plus, "+"),
            '-' => token(TokenKind::Minus, "-"),
            '*' => token(TokenKind::Star, "*"),
            '/' => token(TokenKind::Slash, "/"),
            '%' => token(TokenKind::Percent, "%"),
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    token(TokenKind::LessEqual, "<=")
                } else {
                    token(TokenKind::Less, "<")
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    token(TokenKind::GreaterEqual, ">=")
                } else {
                    token(TokenKind::Greater, ">")
                }
            }
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    token(TokenKind::Equal, "==")
                } else {
                    token(TokenKind::Equal, "=")
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    token(TokenKind::NotEqual, "!=")
                } else {
                    token(TokenKind::Not, "!")
                }
            }
            '&' => {
                if self.peek() == Some('&') {
                    self.advance();
                    token(TokenKind::And, "&&")
                } else {
                    Err(LexError::UnexpectedCharacter { ch: c, line, column })
                }
            }
            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    token(TokenKind::Or, "||")
                } else {
                    token(TokenKind::Pipe, "|")
                }
            }
            '^' => {
                if self.peek() == Some('^') {
                    self.advance();
                    token(TokenKind::Xor, "^^")
                } else {
                    Err(LexError::UnexpectedCharacter { ch: c, line, column })
                }
            }
            '(' => token(TokenKind::LeftParen, "("),
            ')' => token(TokenKind::RightParen, ")"),
            '[' => token(TokenKind::LeftBracket, "["),
            ']' => token(TokenKind::RightBracket, "]"),
            '{' => token(TokenKind::LeftBrace, "{"),
            '}' => token(TokenKind::RightBrace, "}"),
            ',' => token(TokenKind::Comma, ","),
            ':' => token(TokenKind::Colon, ":"),
            '.' => token(TokenKind::Dot, "."),
            other => Err(LexError::UnexpectedCharacter {
                ch: other,
                line,
                column,
            }),
        }
    }
}
