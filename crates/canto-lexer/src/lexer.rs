//! Lexer for the Canto language.

use crate::token::{is_keyword, Token, TokenKind};
use thiserror::Error;

/// Errors that can occur during lexing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    #[error("unterminated string literal starting at line {line}")]
    UnterminatedString { line: usize },
}

/// Lexer tokenizes Canto source code, one character at a time.
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: usize,
}

impl Lexer {
    /// Create a new lexer for the given input.
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
            line: 1,
        }
    }

    fn current(&self) -> char {
        if self.position >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.position]
        }
    }

    fn peek(&self) -> char {
        if self.position + 1 >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.position + 1]
        }
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    /// Skip spaces, tabs, newlines (tracking the line counter), and `#`
    /// comments running to end of line.
    fn skip_trivia(&mut self) {
        loop {
            match self.current() {
                ' ' | '\t' | '\r' => self.advance(),
                '\n' => {
                    self.line += 1;
                    self.advance();
                }
                '#' => {
                    while self.current() != '\n' && !self.at_end() {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Get the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        self.skip_trivia();

        if self.at_end() {
            return Ok(None);
        }

        let ch = self.current();

        if ch.is_ascii_digit() {
            return Ok(Some(self.read_number()));
        }
        if is_letter(ch) {
            return Ok(Some(self.read_identifier()));
        }
        if ch == '"' {
            return Ok(Some(self.read_string()?));
        }
        if is_symbol(ch) {
            self.advance();
            return Ok(Some(Token::new(TokenKind::Symbol, ch, self.line)));
        }

        self.read_operator()
    }

    /// Read an identifier or keyword.
    fn read_identifier(&mut self) -> Token {
        let start = self.position;
        while is_letter(self.current()) || self.current().is_ascii_digit() {
            self.advance();
        }
        let lexeme: String = self.chars[start..self.position].iter().collect();
        let kind = if is_keyword(&lexeme) {
            TokenKind::Keyword
        } else {
            TokenKind::Ident
        };
        Token::new(kind, lexeme, self.line)
    }

    /// Read a number literal, with at most one decimal point.
    fn read_number(&mut self) -> Token {
        let start = self.position;
        while self.current().is_ascii_digit() {
            self.advance();
        }
        if self.current() == '.' && self.peek().is_ascii_digit() {
            self.advance(); // consume '.'
            while self.current().is_ascii_digit() {
                self.advance();
            }
        }
        let lexeme: String = self.chars[start..self.position].iter().collect();
        Token::new(TokenKind::Number, lexeme, self.line)
    }

    /// Read a double-quote delimited string literal. The token lexeme is
    /// the unquoted contents.
    fn read_string(&mut self) -> Result<Token, LexerError> {
        let start_line = self.line;
        self.advance(); // consume opening quote

        let mut contents = String::new();
        while self.current() != '"' && !self.at_end() {
            if self.current() == '\n' {
                self.line += 1;
            }
            contents.push(self.current());
            self.advance();
        }

        if self.at_end() {
            return Err(LexerError::UnterminatedString { line: start_line });
        }

        self.advance(); // consume closing quote
        Ok(Token::new(TokenKind::Str, contents, start_line))
    }

    /// Read an operator, longest match first. Pure assignment forms
    /// classify as `AssignOp`, everything else as `Operator`.
    fn read_operator(&mut self) -> Result<Option<Token>, LexerError> {
        let ch = self.current();
        let next = self.peek();

        let two_char = match (ch, next) {
            ('=', '=') => Some((TokenKind::Operator, "==")),
            ('!', '=') => Some((TokenKind::Operator, "!=")),
            ('<', '=') => Some((TokenKind::Operator, "<=")),
            ('>', '=') => Some((TokenKind::Operator, ">=")),
            ('+', '=') => Some((TokenKind::AssignOp, "+=")),
            ('-', '=') => Some((TokenKind::AssignOp, "-=")),
            ('*', '=') => Some((TokenKind::AssignOp, "*=")),
            ('/', '=') => Some((TokenKind::AssignOp, "/=")),
            _ => None,
        };

        if let Some((kind, lexeme)) = two_char {
            self.advance();
            self.advance();
            return Ok(Some(Token::new(kind, lexeme, self.line)));
        }

        let single_char = match ch {
            '=' => Some(TokenKind::AssignOp),
            '+' | '-' | '*' | '/' | '%' | '<' | '>' | '!' => Some(TokenKind::Operator),
            _ => None,
        };

        if let Some(kind) = single_char {
            self.advance();
            return Ok(Some(Token::new(kind, ch, self.line)));
        }

        // Unknown character: skip it rather than aborting the run.
        self.advance();
        self.next_token()
    }
}

fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_symbol(ch: char) -> bool {
    matches!(ch, '(' | ')' | '{' | '}' | '[' | ']' | ';' | ',')
}

/// Tokenize an input string into a vector of tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexerError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(tok) = lexer.next_token()? {
        tokens.push(tok);
    }
    Ok(tokens)
}
