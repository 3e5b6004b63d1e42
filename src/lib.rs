//! Crate root: wires together the crunch compilation pipeline.
//!
//! - `lexer` cuts source text into classified tokens.
//! - `parser` builds the `ast` with a precedence-climbing expression grammar.
//! - `codegen` resolves names through `scope`, applies the `ty` promotion
//!   rules and emits LLVM IR.
//! - `link` turns an object file into an executable.
//! - `error` holds one error enum per stage plus the unifying `CompileError`.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod link;
pub mod parser;
pub mod scope;
pub mod token;
pub mod ty;

use inkwell::context::Context as LlvmContext;
use inkwell::targets::TargetTriple;

use crate::ast::Program;
use crate::codegen::Codegen;

pub use error::{CompileError, CompileResult};

/// Required extension of crunch source files.
pub const SOURCE_EXTENSION: &str = "crunch";

/// Tokenize and parse a source string.
pub fn parse_source(source: &str) -> CompileResult<Program> {
    let tokens = lexer::tokenize(source)?;
    Ok(parser::parse(tokens)?)
}

/// Run the full front end: tokenize, parse, and emit a verified LLVM module
/// named `name` into `ctx`.
pub fn compile<'ctx>(
    ctx: &'ctx LlvmContext,
    name: &str,
    source: &str,
    triple: &TargetTriple,
) -> CompileResult<Codegen<'ctx>> {
    let program = parse_source(source)?;
    let mut codegen = Codegen::new(ctx, name, triple);
    codegen.emit_program(&program)?;
    Ok(codegen)
}
