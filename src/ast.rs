//! Project model produced by the descriptor parser

use crate::error::{LightPathError, Result};
use crate::types::*;
use std::fmt;

/// Directory a command runs in once packaged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PathMode {
    /// Inside the extracted application directory
    #[default]
    Application,
    /// Any other value, conventionally `current` (the invoking directory)
    Other(String),
}

impl PathMode {
    pub fn from_value(value: &str) -> Self {
        if value == PATH_MODE_APPLICATION {
            Self::Application
        } else {
            Self::Other(value.to_string())
        }
    }

    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Application => PATH_MODE_APPLICATION,
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for PathMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shell command stamped with the block context in effect when it was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: String,
    build_version: u32,
    path_mode: PathMode,
}

impl Command {
    pub fn new(text: impl Into<String>, build_version: u32, path_mode: PathMode) -> Self {
        Self {
            text: text.into(),
            build_version,
            path_mode,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn build_version(&self) -> u32 {
        self.build_version
    }

    pub fn path_mode(&self) -> &PathMode {
        &self.path_mode
    }
}

/// A named group of commands plus the block-level metadata seen while parsing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionBlock {
    commands: Vec<Command>,
    pub final_build_version: u32,
    pub final_path_mode: PathMode,
    pub has_build_marker: bool,
    pub required_tool_version: u32,
}

impl FunctionBlock {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            final_build_version: 1,
            final_path_mode: PathMode::Application,
            has_build_marker: false,
            required_tool_version: 1,
        }
    }

    /// Append a command, refusing to grow past `MAX_COMMANDS`.
    pub fn push_command(&mut self, command: Command) -> Result<()> {
        if self.commands.len() >= MAX_COMMANDS {
            return Err(LightPathError::limit_exceeded("commands per block", MAX_COMMANDS));
        }
        self.commands.push(command);
        Ok(())
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for FunctionBlock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFunction {
    pub name: String,
    pub block: FunctionBlock,
}

/// Everything a descriptor declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    pub build: FunctionBlock,
    pub main: FunctionBlock,
    custom: Vec<CustomFunction>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom block, refusing to grow past `MAX_CUSTOM_FUNCTIONS`.
    pub fn add_custom(&mut self, name: impl Into<String>, block: FunctionBlock) -> Result<()> {
        if self.custom.len() >= MAX_CUSTOM_FUNCTIONS {
            return Err(LightPathError::limit_exceeded(
                "custom functions",
                MAX_CUSTOM_FUNCTIONS,
            ));
        }
        self.custom.push(CustomFunction {
            name: name.into(),
            block,
        });
        Ok(())
    }

    pub fn custom_functions(&self) -> &[CustomFunction] {
        &self.custom
    }

    pub fn is_custom_full(&self) -> bool {
        self.custom.len() >= MAX_CUSTOM_FUNCTIONS
    }

    /// First custom block declared under `name`. Later duplicates are never resolved.
    pub fn find_custom(&self, name: &str) -> Option<&FunctionBlock> {
        self.custom
            .iter()
            .find(|function| function.name == name)
            .map(|function| &function.block)
    }
}
