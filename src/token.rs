//! Token definitions shared by the lexer and the parser.

use std::fmt;

/// 1-based source position of the first character of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // keywords
    If,
    Else,
    While,
    For,
    Break,
    Continue,
    Print,
    True,
    False,

    // type keywords
    KwInt,
    KwDouble,
    KwString,
    KwBool,
    KwFunction,

    // literals
    IntLit,
    DoubleLit,
    StrLit,
    BoolLit,
    Identifier,

    // arithmetic and math operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Sin,
    Cos,
    Tan,
    Exp,
    Log,
    Sqrt,
    Deriv,
    Integral,

    // assignment, comparison, logic
    Assign,
    Eq,
    Neq,
    Lt,
    Gt,
    Leq,
    Geq,
    And,
    Or,
    Not,

    // delimiters
    Comma,
    Semicolon,
    Colon,
    Dot,
    LParen,
    RParen,
    LBrace,
    RBrace,

    // named constants
    Pi,
    Euler,

    Eof,
    Unknown,
}

impl TokenKind {
    /// Reserved words and operators, keyed by their exact spelling.
    pub fn reserved(text: &str) -> Option<TokenKind> {
        use TokenKind::*;
        let kind = match text {
            "if" => If,
            "else" => Else,
            "while" => While,
            "for" => For,
            "break" => Break,
            "continue" => Continue,
            "print" => Print,
            "true" => True,
            "false" => False,
            "int" => KwInt,
            "double" => KwDouble,
            "string" => KwString,
            "bool" => KwBool,
            "function" => KwFunction,
            "+" => Plus,
            "-" => Minus,
            "*" => Star,
            "/" => Slash,
            "%" => Percent,
            "sin" => Sin,
            "cos" => Cos,
            "tan" => Tan,
            "exp" => Exp,
            "log" => Log,
            "sqrt" => Sqrt,
            "deriv" => Deriv,
            "integral" => Integral,
            "=" => Assign,
            "==" => Eq,
            "!=" => Neq,
            "<" => Lt,
            ">" => Gt,
            "<=" => Leq,
            ">=" => Geq,
            "&&" => And,
            "||" => Or,
            "!" => Not,
            "," => Comma,
            ";" => Semicolon,
            ":" => Colon,
            "." => Dot,
            "(" => LParen,
            ")" => RParen,
            "{" => LBrace,
            "}" => RBrace,
            "pi" => Pi,
            "e" => Euler,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_type_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::KwInt
                | TokenKind::KwDouble
                | TokenKind::KwString
                | TokenKind::KwBool
                | TokenKind::KwFunction
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, pos: Pos) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            pos,
        }
    }

    /// Human-friendly text used in diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("`{}`", self.lexeme),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4}:{:<3} {:?} {}", self.pos.line, self.pos.column, self.kind, self.lexeme)
    }
}
