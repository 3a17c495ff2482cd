//! Lexical analysis for build descriptors

use crate::types::MAX_TOKEN_LENGTH;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    Identifier(String),
    String(String),

    LeftBrace,  // {
    RightBrace, // }
    Equals,     // =

    // Any character the grammar has no use for
    Unknown(char),
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub line: usize,
    pub column: usize,
    pub filename: String,
    /// Raw source text this token consumed, quotes included
    pub lexeme: String,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        self.token_type == TokenType::Eof
    }

    pub fn identifier(&self) -> Option<&str> {
        match &self.token_type {
            TokenType::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn string(&self) -> Option<&str> {
        match &self.token_type {
            TokenType::String(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Identifier(id) => write!(f, "identifier({})", id),
            TokenType::String(s) => write!(f, "string(\"{}\")", s),
            TokenType::LeftBrace => write!(f, "{{"),
            TokenType::RightBrace => write!(f, "}}"),
            TokenType::Equals => write!(f, "="),
            TokenType::Unknown(c) => write!(f, "unknown('{}')", c),
            TokenType::Eof => write!(f, "EOF"),
        }
    }
}

/// Scanner over one descriptor.
///
/// Each lexer owns its cursor, so any number of them can run side by side.
/// The lexer never fails: characters outside the grammar come back as
/// [`TokenType::Unknown`] and the stream always ends with [`TokenType::Eof`].
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    filename: String,
    finished: bool,
}

impl Lexer {
    pub fn new(input: &str, filename: impl Into<String>) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            filename: filename.into(),
            finished: false,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Scan the whole input. The last token is always `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    /// Produce the next token. Once the input is exhausted this keeps returning `Eof`.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let start_line = self.line;
        let start_column = self.column;
        let start = self.position;

        let token_type = match self.peek() {
            None => TokenType::Eof,
            Some('{') => {
                self.advance();
                TokenType::LeftBrace
            }
            Some('}') => {
                self.advance();
                TokenType::RightBrace
            }
            Some('=') => {
                self.advance();
                TokenType::Equals
            }
            Some('"') => {
                self.advance(); // opening quote
                let value = self.read_string();
                TokenType::String(value)
            }
            Some(ch) if is_identifier_start(ch) => TokenType::Identifier(self.read_identifier()),
            Some(ch) => {
                self.advance();
                TokenType::Unknown(ch)
            }
        };

        Token {
            token_type,
            line: start_line,
            column: start_column,
            filename: self.filename.clone(),
            lexeme: self.input[start..self.position].iter().collect(),
        }
    }

    /// Skip whitespace and `//` comments, in any order and any number.
    fn skip_trivia(&mut self) {
        loop {
            while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\n')) {
                self.advance();
            }

            if self.peek() == Some('/') && self.peek_next() == Some('/') {
                while let Some(ch) = self.peek() {
                    if ch == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                return;
            }
        }
    }

    fn read_string(&mut self) -> String {
        let mut value = String::new();
        let mut length = 0;

        while let Some(ch) = self.peek() {
            if ch == '"' {
                self.advance(); // closing quote
                break;
            }
            if length >= MAX_TOKEN_LENGTH - 1 {
                break;
            }
            value.push(ch);
            length += 1;
            self.advance();
        }

        value
    }

    fn read_identifier(&mut self) -> String {
        let mut identifier = String::new();
        let mut length = 0;

        while let Some(ch) = self.peek() {
            if !is_identifier_continue(ch) || length >= MAX_TOKEN_LENGTH - 1 {
                break;
            }
            identifier.push(ch);
            length += 1;
            self.advance();
        }

        identifier
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }
}

impl Iterator for Lexer {
    type Item = Token;

    /// Yields tokens up to and including the first `Eof`, then stops.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.is_eof() {
            self.finished = true;
        }
        Some(token)
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(source: &str) -> Vec<TokenType> {
        Lexer::new(source, "build.path")
            .tokenize()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            types("{ } ="),
            vec![
                TokenType::LeftBrace,
                TokenType::RightBrace,
                TokenType::Equals,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers_and_strings() {
        assert_eq!(
            types(r#"build_version = "2" command "echo hi""#),
            vec![
                TokenType::Identifier("build_version".to_string()),
                TokenType::Equals,
                TokenType::String("2".to_string()),
                TokenType::Identifier("command".to_string()),
                TokenType::String("echo hi".to_string()),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_no_escape_processing() {
        let tokens = types(r#""a\nb\" c""#);
        assert_eq!(tokens[0], TokenType::String("a\\nb\\".to_string()));
        assert_eq!(tokens[1], TokenType::Identifier("c".to_string()));
        assert_eq!(tokens[2], TokenType::String(String::new()));
    }

    #[test]
    fn test_unterminated_string_is_accepted() {
        assert_eq!(
            types("\"make all"),
            vec![TokenType::String("make all".to_string()), TokenType::Eof]
        );
    }

    #[test]
    fn test_overlong_string_is_truncated() {
        let long = "x".repeat(400);
        let tokens = types(&format!("\"{}\"", long));

        match &tokens[0] {
            TokenType::String(s) => assert_eq!(s.len(), MAX_TOKEN_LENGTH - 1),
            other => panic!("Expected string token, got {}", other),
        }
        assert_eq!(tokens.last(), Some(&TokenType::Eof));
    }

    #[test]
    fn test_comments_are_discarded() {
        let source = "// first\n// second\n   // third\nmain // trailing\n{";
        assert_eq!(
            types(source),
            vec![
                TokenType::Identifier("main".to_string()),
                TokenType::LeftBrace,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_unknown_characters() {
        assert_eq!(
            types("a / ; 9"),
            vec![
                TokenType::Identifier("a".to_string()),
                TokenType::Unknown('/'),
                TokenType::Unknown(';'),
                TokenType::Unknown('9'),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::new("build {\n  command \"x\"\n}", "build.path").tokenize();

        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 7));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
        assert_eq!((tokens[3].line, tokens[3].column), (2, 11));
        assert_eq!((tokens[4].line, tokens[4].column), (3, 1));
        assert_eq!(tokens[4].token_type, TokenType::RightBrace);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("x", "build.path");
        assert!(!lexer.next_token().is_eof());
        assert!(lexer.next_token().is_eof());
        assert!(lexer.next_token().is_eof());
    }

    #[test]
    fn test_iterator_stops_after_eof() {
        let tokens: Vec<Token> = Lexer::new("main { }", "build.path").collect();
        assert_eq!(tokens.len(), 4);
        assert!(tokens[3].is_eof());
    }

    #[test]
    fn test_lexemes_reconstruct_meaningful_source() {
        let source = r#"
// project file
build {
    build_version = "1"   // pinned
    command "make -C src"
    build
}
main { path_mode = "current" command "./run" } ; "open
"#;
        let rebuilt: String = Lexer::new(source, "build.path")
            .map(|t| t.lexeme)
            .collect();

        let expected: String = source
            .lines()
            .map(|line| match line.find("//") {
                Some(idx) => &line[..idx],
                None => line,
            })
            .collect::<Vec<_>>()
            .join("\n")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let rebuilt_compact: String = rebuilt.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(rebuilt_compact, expected);
    }

    #[test]
    fn test_independent_lexers() {
        let mut a = Lexer::new("alpha beta", "a.path");
        let mut b = Lexer::new("gamma", "b.path");

        assert_eq!(a.next_token().identifier(), Some("alpha"));
        assert_eq!(b.next_token().identifier(), Some("gamma"));
        assert_eq!(a.next_token().identifier(), Some("beta"));
        assert!(b.next_token().is_eof());
        assert_eq!(a.filename(), "a.path");
    }
}
