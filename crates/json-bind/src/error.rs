//! Single error type shared by the lexer, parser, writer and binder.
//! An enum of message templates (`#[derive(Error, Debug, Clone)]` over
//! `thiserror`), one variant per failure surface this crate actually has.

use thiserror::Error;

use crate::{lexer::TokenKind, path::JsonPath};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unterminated string at line {line}, col {col}")]
    UnterminatedString { line: u32, col: u32 },

    #[error("Invalid literal, expected '{literal}' at line {line}, col {col}")]
    InvalidLiteral {
        literal: &'static str,
        line: u32,
        col: u32,
    },

    #[error("Unexpected character: '{ch}' at line {line}, col {col}")]
    UnexpectedCharacter { ch: char, line: u32, col: u32 },

    #[error("Expected string as object key at line {line}, col {col} (token {token})")]
    ExpectedStringKey {
        line: u32,
        col: u32,
        token: TokenKind,
    },

    #[error("Expected ',' or '}}' in object at line {line}, col {col} (token {token})")]
    ExpectedCommaOrEndOfObject {
        line: u32,
        col: u32,
        token: TokenKind,
    },

    #[error("Expected ',' or ']' in array at line {line}, col {col} (token {token})")]
    ExpectedCommaOrEndOfArray {
        line: u32,
        col: u32,
        token: TokenKind,
    },

    #[error("Trailing characters after top-level value at line {line}, col {col} (token {token})")]
    TrailingCharacters {
        line: u32,
        col: u32,
        token: TokenKind,
    },

    #[error("Cannot assign null to primitive{path}")]
    NullToPrimitive { path: JsonPath },

    #[error("Cannot bind {value_kind} to {target}{path}")]
    CannotBind {
        value_kind: &'static str,
        target: &'static str,
        path: JsonPath,
    },

    #[error("Numeric overflow: {message}{path}")]
    NumericOverflow { message: String, path: JsonPath },

    #[error("Invalid date: {message}{path}")]
    InvalidDate { message: String, path: JsonPath },

    #[error("missing property {field} from {target}{path}")]
    MissingProperty {
        field: Box<str>,
        target: &'static str,
        path: JsonPath,
    },

    #[error("cycle detected{path}")]
    CycleDetected { path: JsonPath },

    #[error("{message}{path}")]
    Adapter { message: String, path: JsonPath },
}

impl Error {
    /// The JSON path breadcrumb this error was raised with, if any.
    pub fn path(&self) -> Option<&JsonPath> {
        match self {
            Self::UnterminatedString { .. }
            | Self::InvalidLiteral { .. }
            | Self::UnexpectedCharacter { .. }
            | Self::ExpectedStringKey { .. }
            | Self::ExpectedCommaOrEndOfObject { .. }
            | Self::ExpectedCommaOrEndOfArray { .. }
            | Self::TrailingCharacters { .. } => None,
            Self::NullToPrimitive { path }
            | Self::CannotBind { path, .. }
            | Self::NumericOverflow { path, .. }
            | Self::InvalidDate { path, .. }
            | Self::MissingProperty { path, .. }
            | Self::CycleDetected { path }
            | Self::Adapter { path, .. } => Some(path),
        }
    }
}
