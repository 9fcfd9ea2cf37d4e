//! The sealed six-variant JSON value tree, the sole interchange between
//! the parser and the binder/writer. An exhaustive match over a closed
//! sum rather than dynamic dispatch.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use num_bigint::BigInt;

/// A JSON number, widened purely from its lexeme:
/// an `i64` if the literal fits and has no fraction/exponent, else a
/// `BigInt`; for fractional lexemes, an `f64` if it round-trips
/// losslessly, else a `BigDecimal`.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(i64),
    BigInt(BigInt),
    Float(f64),
    BigDecimal(BigDecimal),
}

impl Number {
    /// Widens a validated JSON number lexeme (as produced by the lexer)
    /// into the narrowest of the four representations that can hold it
    /// exactly. Selection never looks at a target type (that's the
    /// binder's job, on bind).
    pub fn from_lexeme(text: &str) -> Self {
        let fractional = text.contains('.') || text.contains('e') || text.contains('E');
        if !fractional {
            if let Ok(i) = text.parse::<i64>() {
                return Self::Int(i);
            }
            if let Ok(b) = BigInt::from_str(text) {
                return Self::BigInt(b);
            }
        }
        if let Ok(f) = text.parse::<f64>() {
            if Self::round_trips_losslessly(text, f) {
                return Self::Float(f);
            }
        }
        if let Ok(d) = BigDecimal::from_str(text) {
            return Self::BigDecimal(d);
        }
        // Grammar-valid lexemes always hit one of the arms above; this is
        // only reached for literals so extreme neither BigDecimal parsing
        // nor f64 parsing accepts them, which doesn't happen for the
        // lexer's own number grammar.
        Self::Float(text.parse().unwrap_or(0.0))
    }

    fn round_trips_losslessly(text: &str, parsed: f64) -> bool {
        let Ok(exact) = BigDecimal::from_str(text) else {
            return false;
        };
        // `parsed.to_string()` is `f64`'s shortest round-trip decimal
        // representation, not its exact binary expansion — comparing
        // against that (rather than `BigDecimal::try_from(parsed)`,
        // which reifies the f64's full binary value and is almost never
        // equal to a non-dyadic decimal literal like `3.14`) is the
        // actual lossless-round-trip check.
        let Ok(shortest) = BigDecimal::from_str(&parsed.to_string()) else {
            return false;
        };
        shortest == exact
    }

    /// `true` if this number is zero, used by the binder's
    /// number-to-boolean coercion.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Int(i) => *i == 0,
            Self::BigInt(b) => b == &BigInt::from(0),
            Self::Float(f) => *f == 0.0,
            Self::BigDecimal(d) => d.is_zero(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::BigInt(b) => write!(f, "{b}"),
            Self::Float(v) => {
                if v.is_finite() {
                    write!(f, "{v}")
                } else {
                    // Non-finite floats are a writer-time failure; a
                    // `Number` built from a valid lexeme is never
                    // non-finite, so this arm only guards against adapters
                    // constructing one directly.
                    write!(f, "null")
                }
            }
            Self::BigDecimal(d) => write!(f, "{d}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Boolean(bool),
    Number(Number),
    String(String),
    Array(Vec<JsonValue>),
    Object(IndexMap<String, JsonValue>),
}

impl JsonValue {
    /// The lowercase kind name used in `Cannot bind <value kind> to
    /// <target>` diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Compact canonical rendering, bypassing the reflective writer
    /// — used for debugging and by the parser's own tests.
    pub fn to_compact_string(&self) -> String {
        let mut out = String::new();
        self.write_compact(&mut out);
        out
    }

    fn write_compact(&self, out: &mut String) {
        match self {
            Self::Null => out.push_str("null"),
            Self::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Number(n) => out.push_str(&n.to_string()),
            Self::String(s) => escape_json_string(s, out),
            Self::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        out.push(',');
                    }
                    item.write_compact(out);
                }
                out.push(']');
            }
            Self::Object(entries) => {
                out.push('{');
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i != 0 {
                        out.push(',');
                    }
                    escape_json_string(key, out);
                    out.push(':');
                    value.write_compact(out);
                }
                out.push('}');
            }
        }
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_compact_string())
    }
}

/// Escapes `s` as a JSON string literal (including the surrounding
/// quotes) into `out`: `" \ / \b \f \n \r \t` and any code point < 0x20
/// become `\uXXXX`. Shared by the value tree's own
/// rendering and the reflective writer.
pub(crate) fn escape_json_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_fits_in_i64() {
        assert_eq!(Number::from_lexeme("42"), Number::Int(42));
        assert_eq!(Number::from_lexeme("-7"), Number::Int(-7));
    }

    #[test]
    fn huge_integer_widens_to_bigint() {
        let n = Number::from_lexeme("9999999999999999999999999");
        assert!(matches!(n, Number::BigInt(_)));
        assert_eq!(n.to_string(), "9999999999999999999999999");
    }

    #[test]
    fn lossy_fraction_widens_to_bigdecimal() {
        let n = Number::from_lexeme("1.0000000000000001");
        assert!(matches!(n, Number::BigDecimal(_)));
    }

    #[test]
    fn lossless_fraction_stays_float() {
        let n = Number::from_lexeme("3.14");
        assert_eq!(n, Number::Float(3.14));
    }

    #[test]
    fn object_rendering_preserves_insertion_order_and_last_wins() {
        let mut obj = IndexMap::new();
        obj.insert("a".to_string(), JsonValue::Number(Number::Int(1)));
        obj.insert("b".to_string(), JsonValue::Number(Number::Int(2)));
        // Simulate duplicate-key-last-wins on re-insert: key stays in place,
        // value is overwritten (matches `IndexMap::insert`'s behavior and
        // the parser's documented policy).
        obj.insert("a".to_string(), JsonValue::Number(Number::Int(3)));
        assert_eq!(
            JsonValue::Object(obj).to_compact_string(),
            r#"{"a":3,"b":2}"#
        );
    }

    #[test]
    fn string_escaping_covers_control_characters() {
        let v = JsonValue::String("a\nb\u{1}c".to_string());
        assert_eq!(v.to_compact_string(), r#""a\nb\u0001c""#);
    }
}
