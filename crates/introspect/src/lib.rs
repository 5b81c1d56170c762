//! Runtime introspection of ROS-style binary messages.
//!
//! Decodes a message whose layout is only known at runtime, from its textual
//! definition, into a flat list of `(path, value)` leaves.
//!
//! Features:
//!
//! - Definition parsing: multi-block schema text with `MSG:` markers, constants and comments
//! - Type resolution: unqualified field types are matched to their package once, up front
//! - Flattening: every scalar leaf is named by a compact handle into a shared path tree
//! - Array cutoff: long arrays are walked but not emitted, so offsets always stay correct
//! - Sub-extraction: pull every instance of one type out of a larger message
//!
//! # Example
//!
//! ```
//! use introspect_flat::{FlatDecoder, FlatMessage, TypeRegistry};
//! use introspect_flat::Variant;
//!
//! let registry = TypeRegistry::from_definition("pkg/Pair", "int16 a\nstring label").unwrap();
//! let mut buffer = 7i16.to_le_bytes().to_vec();
//! buffer.extend_from_slice(&2u32.to_le_bytes());
//! buffer.extend_from_slice(b"ok");
//!
//! let mut flat = FlatMessage::default();
//! FlatDecoder::new(&registry)
//!     .decode("pkg/Pair", "pair", &buffer, &mut flat)
//!     .unwrap();
//!
//! assert_eq!(flat.find_value("pair/a"), Some(&Variant::Int16(7)));
//! assert_eq!(flat.find_name("pair/label"), Some("ok"));
//! ```

/// Field and message definition parser
pub mod parser;

/// Registry of parsed definitions with package resolution
pub mod registry;

pub mod decoder;
pub mod error;
pub mod extract;
pub mod flat;
pub mod path_tree;
pub mod warnings;
pub mod wire;

pub use decoder::{build_flat_message, FlatDecoder, DEFAULT_MAX_ARRAY_SIZE};
pub use error::{Error, Result};
pub use extract::{extract_flat, extract_messages, WireMessage};
pub use flat::FlatMessage;
pub use parser::DefinitionParser;
pub use path_tree::{LeafHandle, NodeId, PathTree, MAX_ARRAY_DEPTH, WILDCARD};
pub use registry::TypeRegistry;
pub use warnings::{CollectingSink, NoopSink, TracingSink, WarningSink};
pub use wire::WireReader;

// Shared types, so callers need only this crate
pub use introspect_types::{
    Arity, Duration, Field, FieldType, MessageDefinition, ScalarTag, Time, Variant,
};
