//! Error types for every stage of the pipeline.
//!
//! Each stage has its own enum so callers can match on exactly what went
//! wrong; `CompileError` unifies them for the driver.

use inkwell::builder::BuilderError;
use thiserror::Error;

use crate::token::Pos;

#[derive(Debug, Error, PartialEq)]
pub enum LexError {
    #[error("{pos}: unterminated string literal")]
    UnterminatedString { pos: Pos },
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("{pos}: expected {expected}, found {found}")]
    Expected {
        expected: String,
        found: String,
        pos: Pos,
    },
    #[error("{pos}: expected expression, found {found}")]
    ExpectedExpression { found: String, pos: Pos },
    #[error("{pos}: invalid assignment target")]
    InvalidAssignmentTarget { pos: Pos },
    #[error("{pos}: invalid literal {lexeme}: {reason}")]
    InvalidLiteral {
        lexeme: String,
        reason: String,
        pos: Pos,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum SemanticError {
    #[error("{pos}: variable `{name}` is already declared in this scope")]
    DuplicateDeclaration { name: String, pos: Pos },
    #[error("{pos}: use of undeclared identifier `{name}`")]
    UndeclaredIdentifier { name: String, pos: Pos },
    #[error("{pos}: type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        pos: Pos,
    },
    #[error("{pos}: unsupported initializer for `{name}`: {reason}")]
    UnsupportedInitializer {
        name: String,
        reason: String,
        pos: Pos,
    },
}

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("{pos}: unsupported {what}")]
    Unsupported { what: String, pos: Pos },
    #[error("llvm builder error: {0}")]
    Builder(#[from] BuilderError),
    #[error("module verification failed: {0}")]
    Verify(String),
    #[error("target error: {0}")]
    Target(String),
}

/// Any failure while compiling one unit.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl From<BuilderError> for CompileError {
    fn from(err: BuilderError) -> Self {
        CompileError::Codegen(CodegenError::Builder(err))
    }
}

impl CompileError {
    /// Short classification string used in diagnostics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Lex(_) => "lex",
            CompileError::Parse(ParseError::InvalidAssignmentTarget { .. }) => {
                "invalid-assignment-target"
            }
            CompileError::Parse(ParseError::ExpectedExpression { .. }) => "expected-expression",
            CompileError::Parse(_) => "parse",
            CompileError::Semantic(SemanticError::DuplicateDeclaration { .. }) => {
                "duplicate-declaration"
            }
            CompileError::Semantic(SemanticError::UndeclaredIdentifier { .. }) => {
                "undeclared-identifier"
            }
            CompileError::Semantic(SemanticError::TypeMismatch { .. }) => "type-mismatch",
            CompileError::Semantic(SemanticError::UnsupportedInitializer { .. }) => {
                "unsupported-initializer"
            }
            CompileError::Codegen(_) => "codegen",
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
