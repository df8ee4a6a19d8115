//! Literal tokenization for the CrossFile lexer
//!
//! Numeric literals (decimal and hex), quoted literals, and doc comments.

use crate::lexer::{Lexer, TokenType};
use xfile_common::CompilerError;

impl Lexer {
    /// Tokenize a decimal or `0x` hexadecimal integer
    pub(crate) fn tokenize_integer(&mut self) -> Result<TokenType, CompilerError> {
        let location = self.current_location();

        if self.current_char() == Some('0') && self.peek_char(1) == Some('x') {
            self.advance();
            self.advance();

            let mut digits = String::new();
            while let Some(ch) = self.current_char() {
                if ch.is_ascii_hexdigit() {
                    digits.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }

            if digits.is_empty() {
                return Err(CompilerError::lex_error(
                    "Expected hex digits after 0x".to_string(),
                    location,
                ));
            }

            // Wider-than-i64 hex literals wrap two's-complement
            let value = u64::from_str_radix(&digits, 16).map_err(|_| {
                CompilerError::lex_error(format!("Hex literal too large: 0x{}", digits), location)
            })?;

            return Ok(TokenType::IntLiteral(value as i64));
        }

        let mut digits = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let value: i64 = digits.parse().map_err(|_| {
            CompilerError::lex_error(format!("Numeric literal too large: {}", digits), location)
        })?;

        Ok(TokenType::IntLiteral(value))
    }

    /// Tokenize a quoted literal; no escape processing, the quote character
    /// simply terminates the literal. A single-quoted single ASCII character
    /// is a char literal, anything else a string.
    pub(crate) fn tokenize_quoted_literal(&mut self, quote: char) -> Result<TokenType, CompilerError> {
        let location = self.current_location();
        self.advance(); // consume opening quote

        let mut contents = String::new();
        loop {
            match self.current_char() {
                Some(ch) if ch == quote => {
                    self.advance();
                    break;
                }
                Some(ch) => {
                    contents.push(ch);
                    self.advance();
                }
                None => {
                    return Err(CompilerError::lex_error(
                        "Unterminated string literal".to_string(),
                        location,
                    ));
                }
            }
        }

        if quote == '\'' && contents.len() == 1 && contents.is_ascii() {
            Ok(TokenType::CharLiteral(contents.as_bytes()[0]))
        } else {
            Ok(TokenType::StrLiteral(contents))
        }
    }

    /// Tokenize a `/* ... */` doc comment, keeping the inner text
    pub(crate) fn tokenize_doc_comment(&mut self) -> Result<TokenType, CompilerError> {
        let location = self.current_location();
        self.advance(); // consume '/'
        self.advance(); // consume '*'

        let mut contents = String::new();
        loop {
            match self.current_char() {
                Some('*') if self.peek_char(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    break;
                }
                Some(ch) => {
                    contents.push(ch);
                    self.advance();
                }
                None => {
                    return Err(CompilerError::lex_error(
                        "Unterminated doc comment".to_string(),
                        location,
                    ));
                }
            }
        }

        Ok(TokenType::DocComment(contents))
    }
}
