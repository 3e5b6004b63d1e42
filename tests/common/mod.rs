#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use crunch::{codegen::host_triple, compile, CompileError};
use inkwell::context::Context as LlvmContext;

/// Compile `source` and return the textual IR of the verified module.
pub fn emit_ir(source: &str) -> Result<String, CompileError> {
    let ctx = LlvmContext::create();
    let codegen = compile(&ctx, "test", source, &host_triple())?;
    Ok(codegen.ir())
}

/// Compile `source`, expecting it to fail.
pub fn compile_error(source: &str) -> CompileError {
    match emit_ir(source) {
        Ok(ir) => panic!("expected a compile error, got module:\n{ir}"),
        Err(err) => err,
    }
}

/// Write `source` into a fresh scratch file under the target directory.
pub fn scratch_source(name: &str, source: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("crunch_cli");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(name);
    std::fs::write(&path, source)?;
    Ok(path)
}
