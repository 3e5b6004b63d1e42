//! Semantic value types and their promotion rules.

use std::fmt;

use crate::ast::DeclType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Double,
    Bool,
    Str,
}

impl ValueType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Int | ValueType::Double)
    }

    /// Common type of two numeric operands: double wins, otherwise int.
    /// `None` when either side is not numeric.
    pub fn promote(self, other: ValueType) -> Option<ValueType> {
        match (self, other) {
            (ValueType::Int, ValueType::Int) => Some(ValueType::Int),
            (a, b) if a.is_numeric() && b.is_numeric() => Some(ValueType::Double),
            _ => None,
        }
    }

    /// Storage type for a declaration; `function` has none yet.
    pub fn from_decl(ty: DeclType) -> Option<ValueType> {
        match ty {
            DeclType::Int => Some(ValueType::Int),
            DeclType::Double => Some(ValueType::Double),
            DeclType::String => Some(ValueType::Str),
            DeclType::Bool => Some(ValueType::Bool),
            DeclType::Function => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::Int => "int",
            ValueType::Double => "double",
            ValueType::Bool => "bool",
            ValueType::Str => "string",
        })
    }
}
