//! Adapter registry: binds/writes types this codec
//! doesn't own simply by virtue of a `FromJson`/`ToJson` impl existing
//! for them — in Rust, ordinary trait resolution already *is* the
//! dispatch-by-type mechanism a binder needs for external types, since each
//! concrete type has exactly one impl chosen at compile time. What
//! genuinely needs a runtime registry is the *dynamic* path: binding
//! against a `TypeId` known only at runtime (the CLI's `--adapter`
//! listing, and the protobuf generic-message fallback of rule 14, where
//! the concrete message type isn't known until the caller supplies it).
//! A fixed table, built once at startup and looked up by name
//! thereafter.

#[cfg(feature = "protobuf")]
pub mod protobuf;
pub mod temporal;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::Result;
use crate::path::JsonPath;
use crate::value::JsonValue;

type DecodeFn = Box<dyn Fn(&JsonValue, &mut JsonPath) -> Result<Box<dyn Any + Send + Sync>> + Send + Sync>;
type EncodeFn = Box<dyn Fn(&(dyn Any + Send + Sync)) -> Result<JsonValue> + Send + Sync>;

struct AdapterEntry {
    name: &'static str,
    decode: DecodeFn,
    encode: EncodeFn,
}

/// A process-wide table of adapters, built once and read thereafter.
/// Reads are lock-free after initialization; writes happen only during
/// application startup.
#[derive(Default)]
pub struct AdapterRegistry {
    entries: HashMap<TypeId, AdapterEntry>,
}

impl AdapterRegistry {
    fn register<T: 'static + Send + Sync>(
        &mut self,
        name: &'static str,
        decode: impl Fn(&JsonValue, &mut JsonPath) -> Result<T> + Send + Sync + 'static,
        encode: impl Fn(&T) -> Result<JsonValue> + Send + Sync + 'static,
    ) {
        self.entries.insert(
            TypeId::of::<T>(),
            AdapterEntry {
                name,
                decode: Box::new(move |v, path| decode(v, path).map(|t| Box::new(t) as Box<dyn Any + Send + Sync>)),
                encode: Box::new(move |any| {
                    let t = any
                        .downcast_ref::<T>()
                        .expect("TypeId lookup guarantees the concrete type matches");
                    encode(t)
                }),
            },
        );
    }

    /// The registered adapter name for `T`, if one is registered. Used
    /// by the CLI's `adapters` subcommand to list what's available.
    pub fn name_of<T: 'static>(&self) -> Option<&'static str> {
        self.entries.get(&TypeId::of::<T>()).map(|e| e.name)
    }

    /// Every registered adapter's display name, for the CLI's `adapters`
    /// subcommand listing. Order is unspecified (backed by a `HashMap`).
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.values().map(|e| e.name).collect()
    }

    pub fn decode<T: 'static>(&self, value: &JsonValue, path: &mut JsonPath) -> Option<Result<T>> {
        let entry = self.entries.get(&TypeId::of::<T>())?;
        Some((entry.decode)(value, path).map(|boxed| {
            *boxed
                .downcast::<T>()
                .expect("TypeId lookup guarantees the concrete type matches")
        }))
    }

    pub fn encode<T: 'static + Send + Sync>(&self, value: &T) -> Option<Result<JsonValue>> {
        let entry = self.entries.get(&TypeId::of::<T>())?;
        Some((entry.encode)(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_registry_lists_temporal_and_protobuf_adapters() {
        let names = global().names();
        assert!(names.contains(&"LocalDate"));
        #[cfg(feature = "protobuf")]
        assert!(names.contains(&"google.protobuf.Timestamp"));
    }

    #[test]
    fn decode_and_encode_round_trip_through_the_registry() {
        let reg = global();
        let mut path = JsonPath::new();
        let date: time::Date = reg
            .decode(&JsonValue::String("2024-03-10".to_string()), &mut path)
            .unwrap()
            .unwrap();
        let back = reg.encode(&date).unwrap().unwrap();
        assert_eq!(back, JsonValue::String("2024-03-10".to_string()));
    }
}

static REGISTRY: OnceLock<AdapterRegistry> = OnceLock::new();

/// The process-wide default registry, populated once with every
/// built-in temporal and protobuf well-known-type adapter.
pub fn global() -> &'static AdapterRegistry {
    REGISTRY.get_or_init(|| {
        let mut reg = AdapterRegistry::default();
        temporal::register_all(&mut reg);
        #[cfg(feature = "protobuf")]
        protobuf::register_all(&mut reg);
        reg
    })
}
