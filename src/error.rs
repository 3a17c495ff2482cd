//! Error types for LightPath

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LightPathError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("The file {path} is not in the directory")]
    MissingDescriptorFile { path: String },

    #[error("The source directory {path} was not found")]
    MissingSourceDirectory { path: String },

    #[error("Parse error in {file} at line {line}, column {column}: {message}")]
    Parse {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("The build file is made for LightPath version {required}, but this is version {current}")]
    VersionIncompatibility { required: u32, current: u32 },

    #[error("Archive error: {message}")]
    Archive { message: String },

    #[error("Code generation error: {message}")]
    CodeGen { message: String },

    #[error("Binary compilation failed: {message}")]
    Compile { message: String },

    #[error("\"{name}\" function is not defined in the build file")]
    FunctionNotFound { name: String },

    #[error("\"{name}\" is a built-in function and cannot be invoked by name")]
    ReservedFunctionName { name: String },

    #[error("Maximum limit exceeded: {limit_type} (limit: {limit})")]
    LimitExceeded { limit_type: String, limit: usize },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

pub type Result<T> = std::result::Result<T, LightPathError>;

impl LightPathError {
    pub fn parse(
        file: impl Into<String>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }

    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }

    pub fn codegen(message: impl Into<String>) -> Self {
        Self::CodeGen {
            message: message.into(),
        }
    }

    pub fn compile(message: impl Into<String>) -> Self {
        Self::Compile {
            message: message.into(),
        }
    }

    pub fn limit_exceeded(limit_type: impl Into<String>, limit: usize) -> Self {
        Self::LimitExceeded {
            limit_type: limit_type.into(),
            limit,
        }
    }
}
