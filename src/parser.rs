//! Recursive descent parser for build descriptors
//!
//! ```text
//! Program   := { Identifier '{' { Statement } '}' } EOF
//! Statement := 'command' String
//!            | ('build_version' | 'path_mode') '=' String
//!            | 'build'
//! ```
//!
//! Statements that fit none of these shapes are skipped. The token after
//! `command`, `build_version`, `path_mode` and their `=` is always consumed
//! as the operand, even when it is a keyword or a `}`. A block name that is
//! not followed by `{` aborts the whole parse.

use crate::ast::{Command, FunctionBlock, PathMode, Project};
use crate::error::{LightPathError, Result};
use crate::lexer::{Lexer, Token, TokenType};
use crate::types::*;

pub struct Parser {
    lexer: Lexer,
    tool_version: u32,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        Self {
            lexer,
            tool_version: TOOL_VERSION,
        }
    }

    pub fn from_source(source: &str, filename: impl Into<String>) -> Self {
        Self::new(Lexer::new(source, filename))
    }

    /// Check `build_version` against something other than the running tool.
    pub fn with_tool_version(mut self, tool_version: u32) -> Self {
        self.tool_version = tool_version;
        self
    }

    pub fn parse(mut self) -> Result<Project> {
        let mut project = Project::new();

        loop {
            let token = self.advance();
            match &token.token_type {
                TokenType::Eof => break,
                TokenType::Identifier(name) => {
                    self.parse_function(&mut project, name, &token)?;
                }
                other => {
                    log::debug!(
                        "{}:{}:{}: skipping {} outside of a function block",
                        token.filename,
                        token.line,
                        token.column,
                        other
                    );
                }
            }
        }

        log::debug!(
            "Parsed {}: {} build command(s), {} main command(s), {} custom function(s)",
            self.lexer.filename(),
            project.build.len(),
            project.main.len(),
            project.custom_functions().len()
        );

        Ok(project)
    }

    fn parse_function(&mut self, project: &mut Project, name: &str, name_token: &Token) -> Result<()> {
        let brace = self.advance();
        if brace.token_type != TokenType::LeftBrace {
            return Err(LightPathError::parse(
                &brace.filename,
                brace.line,
                brace.column,
                format!("Expected '{{' after {}, found {}", name, brace.token_type),
            ));
        }

        match name {
            BUILD_FUNCTION => self.parse_block_body(&mut project.build, true),
            MAIN_FUNCTION => self.parse_block_body(&mut project.main, false),
            _ => {
                let mut block = FunctionBlock::new();
                self.parse_block_body(&mut block, false)?;

                if project.is_custom_full() {
                    log::warn!(
                        "{}:{}: function '{}' ignored, only {} custom functions are supported",
                        name_token.filename,
                        name_token.line,
                        name,
                        MAX_CUSTOM_FUNCTIONS
                    );
                    return Ok(());
                }
                if project.find_custom(name).is_some() {
                    log::warn!(
                        "{}:{}: function '{}' is already defined, this definition is unreachable",
                        name_token.filename,
                        name_token.line,
                        name
                    );
                }
                project.add_custom(name, block)
            }
        }
    }

    fn parse_block_body(&mut self, block: &mut FunctionBlock, is_build_block: bool) -> Result<()> {
        // Context stamped onto each command as it is declared
        let mut current_version: u32 = 1;
        let mut current_path_mode = PathMode::Application;

        loop {
            let token = self.advance();
            let keyword = match &token.token_type {
                TokenType::RightBrace | TokenType::Eof => return Ok(()),
                TokenType::Identifier(keyword) => keyword.as_str(),
                _ => {
                    self.skip_statement(&token, "unexpected token");
                    continue;
                }
            };

            match keyword {
                KEYWORD_COMMAND => match self.take_string() {
                    Some(text) => {
                        let command = Command::new(text, current_version, current_path_mode.clone());
                        if let Err(e) = block.push_command(command) {
                            log::warn!("{}:{}: command dropped: {}", token.filename, token.line, e);
                        }
                    }
                    None => self.skip_statement(&token, "command without a string"),
                },
                KEYWORD_BUILD_VERSION => match self.take_assignment() {
                    Some(value) => {
                        let version = parse_version(&value)?;
                        current_version = version;
                        block.final_build_version = version;

                        if is_build_block {
                            block.required_tool_version = version;
                            if self.tool_version < version {
                                return Err(LightPathError::VersionIncompatibility {
                                    required: version,
                                    current: self.tool_version,
                                });
                            }
                        }
                    }
                    None => self.skip_statement(&token, "build_version without '= \"...\"'"),
                },
                KEYWORD_PATH_MODE => match self.take_assignment() {
                    Some(value) => {
                        let mode = PathMode::from_value(value.string().unwrap_or_default());
                        current_path_mode = mode.clone();
                        block.final_path_mode = mode;
                    }
                    None => self.skip_statement(&token, "path_mode without '= \"...\"'"),
                },
                KEYWORD_BUILD_MARKER => block.has_build_marker = true,
                _ => self.skip_statement(&token, "unknown statement"),
            }
        }
    }

    /// Consume the operand token, keeping it only if it is a string.
    fn take_string(&mut self) -> Option<String> {
        self.advance().string().map(str::to_string)
    }

    /// Consume `= <operand>`, returning the operand if it is a string.
    fn take_assignment(&mut self) -> Option<Token> {
        if self.advance().token_type != TokenType::Equals {
            return None;
        }

        let value = self.advance();
        if matches!(value.token_type, TokenType::String(_)) {
            Some(value)
        } else {
            None
        }
    }

    fn skip_statement(&self, token: &Token, reason: &str) {
        log::debug!(
            "{}:{}:{}: skipping {} ({})",
            token.filename,
            token.line,
            token.column,
            token.token_type,
            reason
        );
    }

    fn advance(&mut self) -> Token {
        self.lexer.next_token()
    }
}

fn parse_version(token: &Token) -> Result<u32> {
    let raw = token.string().unwrap_or_default();
    raw.trim().parse::<u32>().map_err(|_| {
        LightPathError::parse(
            &token.filename,
            token.line,
            token.column,
            format!("Invalid build_version \"{}\": expected a non-negative integer", raw),
        )
    })
}
