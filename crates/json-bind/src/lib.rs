//! A general-purpose JSON codec: a strict RFC 8259 lexer/parser that
//! builds a tagged value tree, a type-directed binder that projects that
//! tree into native Rust values under a loose coercion lattice, and a
//! reflective writer that serializes native values back to canonical
//! JSON text.
//!
//! `extern crate self as json_bind` lets `#[derive(Json)]`-generated
//! code reference `::json_bind::...` paths uniformly, whether the derive
//! is used from this crate's own tests or from a downstream crate.
extern crate self as json_bind;

pub mod adapters;
mod bind;
pub mod error;
mod lexer;
pub mod names;
mod parser;
pub mod path;
mod value;
mod write;

pub use bind::{bind, bind_lazy, parse, Bytes, FromJson, JsonMap, LazySeq, MapKey};
pub use error::{Error, Result};
pub use lexer::{Token, TokenKind};
pub use parser::Parser;
pub use value::{JsonValue, Number};
pub use write::{stringify, to_value, ToJson, Writer};

/// Derives [`FromJson`] and [`ToJson`] for a product type (struct with
/// named fields, rule 13) or an enumerated type (fieldless
/// enum, rule 4). See `json-bind-derive` for the supported `#[json(...)]`
/// field/variant attributes.
pub use json_bind_derive::Json;

/// Re-exported so `#[derive(Json)]`-generated code can reference
/// `::json_bind::indexmap::IndexMap` without requiring downstream crates
/// to depend on `indexmap` directly, the same way `serde` re-exports
/// helper crates consumed only by its own derive output.
pub use indexmap;
