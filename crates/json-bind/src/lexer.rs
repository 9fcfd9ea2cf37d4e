//! Single-pass, one-code-point-lookahead tokenizer. An `Iterator`-style
//! cursor pairing a token kind with its source span, over strict
//! RFC 8259 grammar (no comments, no string blocks) with the exact
//! diagnostic text this codec specifies.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    String,
    Number,
    True,
    False,
    Null,
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LBrace => "LBRACE",
            Self::RBrace => "RBRACE",
            Self::LBracket => "LBRACKET",
            Self::RBracket => "RBRACKET",
            Self::Comma => "COMMA",
            Self::Colon => "COLON",
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Null => "NULL",
            Self::Eof => "EOF",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based line of the token's first byte.
    pub line: u32,
    /// 1-based column of the token's first byte.
    pub col: u32,
    /// Unescaped logical text for `STRING`, literal digit text for `NUMBER`.
    pub text: Option<String>,
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Consumes and returns the current character, advancing line/col:
    /// LF increments line and resets col; CR is whitespace
    /// and does not itself advance the line (a CRLF pair still produces a
    /// single line increment, via the LF that follows).
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.bump();
        }
    }

    /// Tokenizes the whole input, stopping after the EOF token.
    pub fn tokenize(input: &str) -> Result<Vec<Token>> {
        let mut lexer = Self::new(input);
        let mut tokens = Vec::new();
        loop {
            let eof = {
                let tok = lexer.next_token()?;
                let is_eof = tok.kind == TokenKind::Eof;
                tokens.push(tok);
                is_eof
            };
            if eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        let line = self.line;
        let col = self.col;
        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                line,
                col,
                text: None,
            });
        };
        match c {
            '{' => {
                self.bump();
                Ok(Token { kind: TokenKind::LBrace, line, col, text: None })
            }
            '}' => {
                self.bump();
                Ok(Token { kind: TokenKind::RBrace, line, col, text: None })
            }
            '[' => {
                self.bump();
                Ok(Token { kind: TokenKind::LBracket, line, col, text: None })
            }
            ']' => {
                self.bump();
                Ok(Token { kind: TokenKind::RBracket, line, col, text: None })
            }
            ',' => {
                self.bump();
                Ok(Token { kind: TokenKind::Comma, line, col, text: None })
            }
            ':' => {
                self.bump();
                Ok(Token { kind: TokenKind::Colon, line, col, text: None })
            }
            '"' => self.lex_string(line, col),
            '-' | '0'..='9' => self.lex_number(line, col),
            't' => self.lex_literal("true", TokenKind::True, line, col),
            'f' => self.lex_literal("false", TokenKind::False, line, col),
            'n' => self.lex_literal("null", TokenKind::Null, line, col),
            other => Err(Error::UnexpectedCharacter { ch: other, line, col }),
        }
    }

    fn lex_literal(
        &mut self,
        literal: &'static str,
        kind: TokenKind,
        line: u32,
        col: u32,
    ) -> Result<Token> {
        for expected in literal.chars() {
            match self.peek() {
                Some(c) if c == expected => {
                    self.bump();
                }
                _ => {
                    return Err(Error::InvalidLiteral {
                        literal,
                        line,
                        col: self.col,
                    });
                }
            }
        }
        Ok(Token { kind, line, col, text: None })
    }

    fn lex_number(&mut self, line: u32, col: u32) -> Result<Token> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.bump();
        }
        match self.peek() {
            Some('0') => {
                text.push('0');
                self.bump();
            }
            Some(d) if d.is_ascii_digit() => {
                while matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                    text.push(self.bump().unwrap());
                }
            }
            Some(other) => return Err(Error::UnexpectedCharacter { ch: other, line: self.line, col: self.col }),
            None => return Err(Error::UnexpectedCharacter { ch: '\0', line: self.line, col: self.col }),
        }
        if self.peek() == Some('.') {
            text.push('.');
            self.bump();
            let mut any = false;
            while matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                text.push(self.bump().unwrap());
                any = true;
            }
            if !any {
                return Err(Error::UnexpectedCharacter {
                    ch: self.peek().unwrap_or('\0'),
                    line: self.line,
                    col: self.col,
                });
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            text.push(self.bump().unwrap());
            if matches!(self.peek(), Some('+' | '-')) {
                text.push(self.bump().unwrap());
            }
            let mut any = false;
            while matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                text.push(self.bump().unwrap());
                any = true;
            }
            if !any {
                return Err(Error::UnexpectedCharacter {
                    ch: self.peek().unwrap_or('\0'),
                    line: self.line,
                    col: self.col,
                });
            }
        }
        Ok(Token { kind: TokenKind::Number, line, col, text: Some(text) })
    }

    fn lex_string(&mut self, line: u32, col: u32) -> Result<Token> {
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(Error::UnterminatedString { line, col }),
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    self.lex_escape(line, col, &mut out)?;
                }
                Some(c) if (c as u32) < 0x20 => {
                    return Err(Error::UnexpectedCharacter { ch: c, line: self.line, col: self.col });
                }
                Some(c) => {
                    out.push(c);
                    self.bump();
                }
            }
        }
        Ok(Token { kind: TokenKind::String, line, col, text: Some(out) })
    }

    fn lex_escape(&mut self, str_line: u32, str_col: u32, out: &mut String) -> Result<()> {
        match self.peek() {
            Some('"') => {
                out.push('"');
                self.bump();
            }
            Some('\\') => {
                out.push('\\');
                self.bump();
            }
            Some('/') => {
                out.push('/');
                self.bump();
            }
            Some('b') => {
                out.push('\u{8}');
                self.bump();
            }
            Some('f') => {
                out.push('\u{c}');
                self.bump();
            }
            Some('n') => {
                out.push('\n');
                self.bump();
            }
            Some('r') => {
                out.push('\r');
                self.bump();
            }
            Some('t') => {
                out.push('\t');
                self.bump();
            }
            Some('u') => {
                self.bump();
                let high = self.read_hex4(str_line, str_col)?;
                if (0xD800..=0xDBFF).contains(&high) {
                    // high surrogate: require a following \uXXXX low surrogate
                    if self.peek() == Some('\\') {
                        self.bump();
                        if self.peek() != Some('u') {
                            return Err(Error::UnterminatedString { line: str_line, col: str_col });
                        }
                        self.bump();
                        let low = self.read_hex4(str_line, str_col)?;
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return Err(Error::UnterminatedString { line: str_line, col: str_col });
                        }
                        let combined = 0x10000
                            + ((high - 0xD800) << 10)
                            + (low - 0xDC00);
                        out.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                    } else {
                        out.push('\u{FFFD}');
                    }
                } else {
                    out.push(char::from_u32(high).unwrap_or('\u{FFFD}'));
                }
            }
            Some(other) => {
                return Err(Error::UnexpectedCharacter { ch: other, line: self.line, col: self.col });
            }
            None => return Err(Error::UnterminatedString { line: str_line, col: str_col }),
        }
        Ok(())
    }

    fn read_hex4(&mut self, str_line: u32, str_col: u32) -> Result<u32> {
        let mut value: u32 = 0;
        for _ in 0..4 {
            let Some(c) = self.peek() else {
                return Err(Error::UnterminatedString { line: str_line, col: str_col });
            };
            let Some(digit) = c.to_digit(16) else {
                return Err(Error::UnexpectedCharacter { ch: c, line: self.line, col: self.col });
            };
            value = (value << 4) | digit;
            self.bump();
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_structural_tokens() {
        assert_eq!(
            kinds("{}[],:"),
            vec![
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Comma,
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_string_escapes() {
        let tokens = Lexer::tokenize(r#""a\n\tbA""#).unwrap();
        assert_eq!(tokens[0].text.as_deref(), Some("a\n\tbA"));
    }

    #[test]
    fn unterminated_string_points_at_opening_quote() {
        let err = Lexer::tokenize("\"abc").unwrap_err();
        assert_eq!(err, Error::UnterminatedString { line: 1, col: 1 });
    }

    #[test]
    fn invalid_literal_reports_prefix_end_column() {
        let err = Lexer::tokenize("nul").unwrap_err();
        assert_eq!(
            err,
            Error::InvalidLiteral { literal: "null", line: 1, col: 4 }
        );
    }

    #[test]
    fn cr_alone_does_not_advance_line() {
        let tokens = Lexer::tokenize("1\r2").unwrap();
        // '1' NUMBER, then '2' NUMBER on the same logical line (col advances past the CR).
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 1);
        assert_eq!(tokens[1].col, 3);
    }

    #[test]
    fn crlf_advances_line_once() {
        let tokens = Lexer::tokenize("1\r\n2").unwrap();
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[1].col, 1);
    }
}
