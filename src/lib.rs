//! LightPath project packager
//!
//! Reads a `build.path` descriptor, runs its build commands and, when the
//! build block asks for it, packages a source tree and the `main` command
//! sequence into one self-extracting executable.
//!
//! # Descriptor
//!
//! ```text
//! build {
//!     build_version = "1"
//!     command "make -C source"
//!     build
//! }
//!
//! main {
//!     command "./server"
//!     path_mode = "current"
//!     command "ls"
//! }
//!
//! clean {
//!     command "make -C source clean"
//! }
//! ```
//!
//! # Basic Usage
//!
//! ```no_run
//! use lightpath::{build_project, load_project, BuildOptions, Result};
//!
//! fn main() -> Result<()> {
//!     let options = BuildOptions::default();
//!     let project = load_project(&options.descriptor_path())?;
//!     build_project(&project, &options)?;
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! 1. **Lexer** - scan the descriptor into tokens
//! 2. **Parser** - build the [`Project`], stamping each command with its context
//! 3. **Builder** - run the `build` block
//! 4. **Packager** - archive, generate the runtime stub, embed, compile, clean up

pub mod ast;
pub mod builder;
pub mod cli;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod packager;
pub mod parser;
pub mod runner;
pub mod shell;
pub mod types;

use std::fs;
use std::path::Path;

pub use ast::{Command, CustomFunction, FunctionBlock, PathMode, Project};
pub use builder::{build_project, BuildOutcome};
pub use cli::LightPathCli;
pub use codegen::RuntimeGenerator;
pub use error::{LightPathError, Result};
pub use lexer::{Lexer, Token, TokenType};
pub use packager::Packager;
pub use parser::Parser;
pub use runner::run_custom_function;
pub use shell::{RunSummary, Shell};
pub use types::{BuildOptions, PackageLayout, TOOL_VERSION};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Parse descriptor text. `filename` is only used in diagnostics.
pub fn parse_descriptor(source: &str, filename: &str) -> Result<Project> {
    Parser::from_source(source, filename).parse()
}

/// Read and parse a descriptor file.
pub fn load_project(path: &Path) -> Result<Project> {
    if !path.is_file() {
        return Err(LightPathError::MissingDescriptorFile {
            path: path.display().to_string(),
        });
    }

    log::info!("Reading {}", path.display());
    let bytes = fs::read(path)?;
    let source = String::from_utf8_lossy(&bytes);
    parse_descriptor(&source, &path.display().to_string())
}
