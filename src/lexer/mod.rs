//! Hand-rolled lexer. SysY's lexical grammar is small enough that a
//! table-free char-by-char scanner reads more clearly than a generated one.

mod token;

pub use token::{Token, TokenKind};

use crate::error::CompileError;

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src: src.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, CompileError> {
        let mut out = Vec::new();
        loop {
            self.skip_trivia()?;
            let line = self.line;
            let Some(c) = self.peek() else {
                out.push(Token {
                    kind: TokenKind::Eof,
                    line,
                });
                break;
            };
            let kind = if c.is_ascii_digit() {
                self.lex_number()?
            } else if c == b'_' || c.is_ascii_alphabetic() {
                self.lex_ident_or_keyword()
            } else {
                self.lex_operator()?
            };
            out.push(Token { kind, line });
        }
        Ok(out)
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, off: usize) -> Option<u8> {
        self.src.get(self.pos + off).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) -> Result<(), CompileError> {
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.bump();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start_line = self.line;
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            None => {
                                return Err(CompileError::Syntax {
                                    line: start_line,
                                    message: "unterminated block comment".into(),
                                })
                            }
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            _ => {
                                self.bump();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn lex_number(&mut self) -> Result<TokenKind, CompileError> {
        let start = self.pos;
        let line = self.line;
        if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x') | Some(b'X')) {
            self.bump();
            self.bump();
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.bump();
            }
            let text = std::str::from_utf8(&self.src[start + 2..self.pos]).unwrap();
            let v = i64::from_str_radix(text, 16).map_err(|_| CompileError::Syntax {
                line,
                message: "malformed hex literal".into(),
            })?;
            return Ok(TokenKind::IntLit(v as i32));
        }
        if self.peek() == Some(b'0') {
            // could be plain 0 or octal
            let mut end = self.pos + 1;
            while matches!(self.src.get(end), Some(c) if c.is_ascii_digit()) {
                end += 1;
            }
            let text = std::str::from_utf8(&self.src[start..end]).unwrap();
            self.pos = end;
            if text.len() == 1 {
                return Ok(TokenKind::IntLit(0));
            }
            let v = i64::from_str_radix(&text[1..], 8).map_err(|_| CompileError::Syntax {
                line,
                message: "malformed octal literal".into(),
            })?;
            return Ok(TokenKind::IntLit(v as i32));
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        let v: i64 = text.parse().map_err(|_| CompileError::Syntax {
            line,
            message: format!("malformed integer literal '{text}'"),
        })?;
        Ok(TokenKind::IntLit(v as i32))
    }

    fn lex_ident_or_keyword(&mut self) -> TokenKind {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c == b'_' || c.is_ascii_alphanumeric()) {
            self.bump();
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        match text {
            "int" => TokenKind::KwInt,
            "void" => TokenKind::KwVoid,
            "const" => TokenKind::KwConst,
            "if" => TokenKind::KwIf,
            "else" => TokenKind::KwElse,
            "while" => TokenKind::KwWhile,
            "break" => TokenKind::KwBreak,
            "continue" => TokenKind::KwContinue,
            "return" => TokenKind::KwReturn,
            _ => TokenKind::Ident(text.into()),
        }
    }

    fn lex_operator(&mut self) -> Result<TokenKind, CompileError> {
        let line = self.line;
        let c = self.bump().unwrap();
        let two = |lexer: &mut Self, expect: u8| {
            if lexer.peek() == Some(expect) {
                lexer.bump();
                true
            } else {
                false
            }
        };
        let kind = match c {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semi,
            b'!' => {
                if two(self, b'=') {
                    TokenKind::Ne
                } else {
                    TokenKind::Not
                }
            }
            b'=' => {
                if two(self, b'=') {
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            b'<' => {
                if two(self, b'=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if two(self, b'=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            b'&' if self.peek() == Some(b'&') => {
                self.bump();
                TokenKind::AndAnd
            }
            b'|' if self.peek() == Some(b'|') => {
                self.bump();
                TokenKind::OrOr
            }
            other => {
                return Err(CompileError::Syntax {
                    line,
                    message: format!("unexpected character '{}'", other as char),
                })
            }
        };
        Ok(kind)
    }
}
