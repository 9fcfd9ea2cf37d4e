//! Recursive-descent parser over the lexer's token stream, producing a
//! [`JsonValue`] tree.
//!
//! For strict RFC 8259 JSON with exact diagnostic text at every error
//! site, a hand-written descent over the token stream gives direct
//! control a grammar-generator approach wouldn't: pick the parsing
//! strategy the grammar actually needs.

use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::value::{JsonValue, Number};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Parses `input` as a single top-level JSON value: after the value,
    /// the next token must be `EOF`.
    pub fn parse(input: &str) -> Result<JsonValue> {
        let tokens = Lexer::tokenize(input)?;
        let mut parser = Self { tokens, pos: 0 };
        let value = parser.parse_value()?;
        let trailing = parser.peek().clone();
        if trailing.kind != TokenKind::Eof {
            // Reported position is just past the trailing token (matching
            // the "false," concrete scenario: the comma sits at col 6, but
            // the diagnostic names col 7 — the position of whatever comes
            // right after it), while the token KIND named is still the
            // trailing token itself.
            parser.bump();
            let after = parser.peek();
            return Err(Error::TrailingCharacters {
                line: after.line,
                col: after.col,
                token: trailing.kind,
            });
        }
        Ok(value)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn parse_value(&mut self) -> Result<JsonValue> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::LBrace => self.parse_object(),
            TokenKind::LBracket => self.parse_array(),
            TokenKind::String => {
                self.bump();
                Ok(JsonValue::String(tok.text.unwrap_or_default()))
            }
            TokenKind::Number => {
                self.bump();
                Ok(JsonValue::Number(Number::from_lexeme(
                    tok.text.as_deref().unwrap_or("0"),
                )))
            }
            TokenKind::True => {
                self.bump();
                Ok(JsonValue::Boolean(true))
            }
            TokenKind::False => {
                self.bump();
                Ok(JsonValue::Boolean(false))
            }
            TokenKind::Null => {
                self.bump();
                Ok(JsonValue::Null)
            }
            // Any other token where a value is expected is reported the
            // same way the lexer reports an unrecognized byte: there is
            // no JSON value starting here.
            other => Err(Error::UnexpectedCharacter {
                ch: token_sentinel(other),
                line: tok.line,
                col: tok.col,
            }),
        }
    }

    // IN_OBJECT_EXPECT_KEY -> IN_OBJECT_EXPECT_COLON -> IN_OBJECT_EXPECT_VALUE
    // -> IN_OBJECT_EXPECT_COMMA_OR_END.
    fn parse_object(&mut self) -> Result<JsonValue> {
        self.bump(); // '{'
        let mut entries = indexmap::IndexMap::new();
        if self.peek().kind == TokenKind::RBrace {
            self.bump();
            return Ok(JsonValue::Object(entries));
        }
        loop {
            let key_tok = self.peek().clone();
            if key_tok.kind != TokenKind::String {
                return Err(Error::ExpectedStringKey {
                    line: key_tok.line,
                    col: key_tok.col,
                    token: key_tok.kind,
                });
            }
            self.bump();
            let key = key_tok.text.unwrap_or_default();

            let colon = self.peek().clone();
            if colon.kind != TokenKind::Colon {
                // A missing colon has no distinct diagnostic of its own;
                // report it with the same shape as the comma/brace error.
                return Err(Error::ExpectedCommaOrEndOfObject {
                    line: colon.line,
                    col: colon.col,
                    token: colon.kind,
                });
            }
            self.bump();

            let value = self.parse_value()?;
            // Duplicate keys: last wins, insertion order of the first
            // occurrence is kept — `IndexMap::insert`
            // already has exactly this behavior for an existing key.
            entries.insert(key, value);

            let after = self.peek().clone();
            match after.kind {
                TokenKind::Comma => {
                    self.bump();
                }
                TokenKind::RBrace => {
                    self.bump();
                    break;
                }
                _ => {
                    return Err(Error::ExpectedCommaOrEndOfObject {
                        line: after.line,
                        col: after.col,
                        token: after.kind,
                    });
                }
            }
        }
        Ok(JsonValue::Object(entries))
    }

    // IN_ARRAY -> ARRAY_EXPECT_COMMA_OR_END.
    fn parse_array(&mut self) -> Result<JsonValue> {
        self.bump(); // '['
        let mut items = Vec::new();
        if self.peek().kind == TokenKind::RBracket {
            self.bump();
            return Ok(JsonValue::Array(items));
        }
        loop {
            items.push(self.parse_value()?);
            let after = self.peek().clone();
            match after.kind {
                TokenKind::Comma => {
                    self.bump();
                }
                TokenKind::RBracket => {
                    self.bump();
                    break;
                }
                _ => {
                    return Err(Error::ExpectedCommaOrEndOfArray {
                        line: after.line,
                        col: after.col,
                        token: after.kind,
                    });
                }
            }
        }
        Ok(JsonValue::Array(items))
    }
}

/// A best-effort single character standing in for a structural token in
/// `Unexpected character` diagnostics raised by the parser (as opposed to
/// the lexer, which always has a real source character in hand).
fn token_sentinel(kind: TokenKind) -> char {
    match kind {
        TokenKind::RBrace => '}',
        TokenKind::RBracket => ']',
        TokenKind::Comma => ',',
        TokenKind::Colon => ':',
        _ => '\0',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_of_numbers() {
        let v = Parser::parse("[1,2,3]").unwrap();
        assert_eq!(v.to_compact_string(), "[1,2,3]");
    }

    #[test]
    fn empty_array_and_object_are_permitted() {
        assert_eq!(Parser::parse("[]").unwrap().to_compact_string(), "[]");
        assert_eq!(Parser::parse("{}").unwrap().to_compact_string(), "{}");
    }

    #[test]
    fn duplicate_keys_last_wins_first_position_kept() {
        let v = Parser::parse(r#"{"a":1,"a":2}"#).unwrap();
        assert_eq!(v.to_compact_string(), r#"{"a":2}"#);
    }

    #[test]
    fn trailing_characters_are_rejected() {
        let err = Parser::parse("false,").unwrap_err();
        assert_eq!(
            err,
            Error::TrailingCharacters { line: 1, col: 7, token: TokenKind::Comma }
        );
    }

    #[test]
    fn non_string_object_key_is_rejected() {
        let err = Parser::parse("{1:2}").unwrap_err();
        assert!(matches!(err, Error::ExpectedStringKey { .. }));
    }

    #[test]
    fn missing_separator_in_array_is_rejected() {
        let err = Parser::parse("[1 2]").unwrap_err();
        assert!(matches!(err, Error::ExpectedCommaOrEndOfArray { .. }));
    }

    #[test]
    fn no_trailing_commas() {
        assert!(Parser::parse("[1,]").is_err());
        assert!(Parser::parse(r#"{"a":1,}"#).is_err());
    }
}
