//! Command-line configuration for the `crunch` binary.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crunch::SOURCE_EXTENSION;

/// What the driver should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Emit {
    /// Print the token stream
    Tokens,
    /// Print the syntax tree
    Ast,
    /// Write textual LLVM IR
    LlvmIr,
    /// Write an object file for the host
    Obj,
    /// Write and link a native executable
    Exe,
}

/// The crunch compiler.
#[derive(Parser, Debug)]
#[command(name = "crunch", version)]
pub struct Config {
    /// Source file, must end in `.crunch`
    pub input: PathBuf,

    /// Output location
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Artifact to produce
    #[arg(long, value_enum, default_value_t = Emit::Exe)]
    pub emit: Emit,

    /// Use verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Fails when the input does not carry the `.crunch` extension.
    pub fn validate_input(&self) -> Result<()> {
        if self.input.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
            bail!(
                "invalid file type: {:?} is not of file type \".{SOURCE_EXTENSION}\"",
                self.input
            );
        }
        Ok(())
    }

    /// Where the artifact goes; `None` means stdout.
    pub fn output_path(&self) -> Option<PathBuf> {
        if let Some(output) = &self.output {
            return Some(output.clone());
        }
        let input: &Path = &self.input;
        match self.emit {
            Emit::Tokens | Emit::Ast => None,
            Emit::LlvmIr => Some(input.with_extension("ll")),
            Emit::Obj => Some(input.with_extension("o")),
            Emit::Exe => Some(input.with_extension("")),
        }
    }

    /// Module name used inside the emitted IR.
    pub fn module_name(&self) -> String {
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "crunch".to_string())
    }

    /// `RUST_LOG` wins; otherwise `-v` selects debug output.
    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if self.verbose { "debug" } else { "warn" })
        })
    }
}
