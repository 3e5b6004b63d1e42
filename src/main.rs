mod config;

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use inkwell::context::Context as LlvmContext;
use tracing::{error, info};

use crunch::{
    codegen::host_triple,
    compile, lexer,
    link::{link_exe, object_path},
    parse_source, CompileError,
};

use crate::config::{Config, Emit};

fn main() -> ExitCode {
    let config = Config::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(config.log_filter())
        .init();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<()> {
    config.validate_input()?;
    let source = fs::read_to_string(&config.input)
        .with_context(|| format!("could not open source file {:?}", config.input))?;
    info!(input = %config.input.display(), emit = ?config.emit, "compiling");

    match config.emit {
        Emit::Tokens => {
            let tokens = lexer::tokenize(&source).map_err(CompileError::from)?;
            let listing: String = tokens.iter().map(|t| format!("{t}\n")).collect();
            write_text(config, &listing)
        }
        Emit::Ast => {
            let program = parse_source(&source)?;
            write_text(config, &program.tree())
        }
        Emit::LlvmIr | Emit::Obj | Emit::Exe => {
            let ctx = LlvmContext::create();
            let triple = host_triple();
            let codegen = compile(&ctx, &config.module_name(), &source, &triple)?;
            let Some(out) = config.output_path() else {
                return Ok(());
            };
            match config.emit {
                Emit::LlvmIr => codegen.write_ir(&out)?,
                Emit::Obj => codegen.write_object(&triple, &out)?,
                _ => {
                    let obj = object_path(&out);
                    codegen.write_object(&triple, &obj)?;
                    let linked = link_exe(&obj, &out);
                    // the scratch object is not an artifact
                    let _ = fs::remove_file(&obj);
                    linked?;
                }
            }
            println!("Built {}", out.display());
            Ok(())
        }
    }
}

fn write_text(config: &Config, text: &str) -> Result<()> {
    match config.output_path() {
        Some(path) => fs::write(&path, text).with_context(|| format!("writing {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

/// One diagnostic line on stderr, tagged with the error kind when the failure
/// came from the compiler itself.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<CompileError>() {
        Some(compile_err) => {
            let kind = compile_err.kind();
            error!(kind, "compilation failed");
            eprintln!("error[{kind}]: {compile_err}");
        }
        None => {
            error!("driver failed");
            eprintln!("error: {err:#}");
        }
    }
}
