//! Abstract syntax tree nodes for crunch programs.
//!
//! Every node owns its children outright; the parser is the only producer and
//! the code generator the main consumer. `Display` on expressions gives a
//! compact s-expression, `Program::tree` an indented dump.

use std::fmt::{self, Write as _};

use crate::token::Pos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Comma,
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Comma => ",",
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    Sin,
    Cos,
    Tan,
    Log,
    Exp,
    Sqrt,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Log => "log",
            UnaryOp::Exp => "exp",
            UnaryOp::Sqrt => "sqrt",
        }
    }
}

/// Type named in a variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclType {
    Int,
    Double,
    String,
    Bool,
    /// Reserved; accepted by the grammar, rejected by codegen.
    Function,
}

impl fmt::Display for DeclType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeclType::Int => "int",
            DeclType::Double => "double",
            DeclType::String => "string",
            DeclType::Bool => "bool",
            DeclType::Function => "function",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        pos: Pos,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        pos: Pos,
    },
    Int {
        value: i32,
        pos: Pos,
    },
    Double {
        value: f64,
        pos: Pos,
    },
    Bool {
        value: bool,
        pos: Pos,
    },
    // unescaped contents, without the quotes
    Str {
        value: String,
        pos: Pos,
    },
    Identifier {
        name: String,
        pos: Pos,
    },
    Assignment {
        target: String,
        value: Box<Expr>,
        pos: Pos,
    },
    // reserved for function calls; the grammar does not produce it yet
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        pos: Pos,
    },
}

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr, pos: Pos) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            pos,
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr, pos: Pos) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
            pos,
        }
    }

    pub fn assignment(target: impl Into<String>, value: Expr, pos: Pos) -> Self {
        Expr::Assignment {
            target: target.into(),
            value: Box::new(value),
            pos,
        }
    }

    /// Position of the token that started this expression.
    pub fn pos(&self) -> Pos {
        match self {
            Expr::Binary { pos, .. }
            | Expr::Unary { pos, .. }
            | Expr::Int { pos, .. }
            | Expr::Double { pos, .. }
            | Expr::Bool { pos, .. }
            | Expr::Str { pos, .. }
            | Expr::Identifier { pos, .. }
            | Expr::Assignment { pos, .. }
            | Expr::Call { pos, .. } => *pos,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary { op, left, right, .. } => {
                write!(f, "({} {} {})", op.symbol(), left, right)
            }
            Expr::Unary { op, operand, .. } => write!(f, "({} {})", op.symbol(), operand),
            Expr::Int { value, .. } => write!(f, "{value}"),
            Expr::Double { value, .. } => write!(f, "{value:?}"),
            Expr::Bool { value, .. } => write!(f, "{value}"),
            Expr::Str { value, .. } => write!(f, "{value:?}"),
            Expr::Identifier { name, .. } => f.write_str(name),
            Expr::Assignment { target, value, .. } => write!(f, "(= {target} {value})"),
            Expr::Call { callee, args, .. } => {
                write!(f, "(call {callee}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression {
        expr: Expr,
        pos: Pos,
    },
    VarDecl {
        ty: DeclType,
        name: String,
        init: Option<Expr>,
        pos: Pos,
    },
    Block {
        statements: Vec<Stmt>,
        pos: Pos,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        pos: Pos,
    },
    Print {
        value: Expr,
        pos: Pos,
    },
}

/// Root of the tree; one per compilation unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    /// Indented, one node per line dump of the whole program.
    pub fn tree(&self) -> String {
        let mut out = String::from("Program\n");
        for stmt in &self.statements {
            write_stmt(&mut out, stmt, 1);
        }
        out
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    indent(out, depth);
    match stmt {
        Stmt::Expression { expr, .. } => {
            out.push_str("ExprStmt\n");
            write_expr(out, expr, depth + 1);
        }
        Stmt::VarDecl { ty, name, init, .. } => {
            let _ = writeln!(out, "VarDecl {ty} {name}");
            if let Some(init) = init {
                write_expr(out, init, depth + 1);
            }
        }
        Stmt::Block { statements, .. } => {
            out.push_str("Block\n");
            for stmt in statements {
                write_stmt(out, stmt, depth + 1);
            }
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            out.push_str("If\n");
            indent(out, depth + 1);
            out.push_str("Condition\n");
            write_expr(out, condition, depth + 2);
            indent(out, depth + 1);
            out.push_str("Then\n");
            write_stmt(out, then_branch, depth + 2);
            if let Some(else_branch) = else_branch {
                indent(out, depth + 1);
                out.push_str("Else\n");
                write_stmt(out, else_branch, depth + 2);
            }
        }
        Stmt::Print { value, .. } => {
            out.push_str("Print\n");
            write_expr(out, value, depth + 1);
        }
    }
}

fn write_expr(out: &mut String, expr: &Expr, depth: usize) {
    indent(out, depth);
    match expr {
        Expr::Binary { op, left, right, .. } => {
            let _ = writeln!(out, "Binary '{}'", op.symbol());
            write_expr(out, left, depth + 1);
            write_expr(out, right, depth + 1);
        }
        Expr::Unary { op, operand, .. } => {
            let _ = writeln!(out, "Unary '{}'", op.symbol());
            write_expr(out, operand, depth + 1);
        }
        Expr::Assignment { target, value, .. } => {
            let _ = writeln!(out, "Assign {target}");
            write_expr(out, value, depth + 1);
        }
        Expr::Call { callee, args, .. } => {
            out.push_str("Call\n");
            write_expr(out, callee, depth + 1);
            for arg in args {
                write_expr(out, arg, depth + 1);
            }
        }
        Expr::Int { value, .. } => {
            let _ = writeln!(out, "Int {value}");
        }
        Expr::Double { value, .. } => {
            let _ = writeln!(out, "Double {value:?}");
        }
        Expr::Bool { value, .. } => {
            let _ = writeln!(out, "Bool {value}");
        }
        Expr::Str { value, .. } => {
            let _ = writeln!(out, "Str {value:?}");
        }
        Expr::Identifier { name, .. } => {
            let _ = writeln!(out, "Identifier {name}");
        }
    }
}
