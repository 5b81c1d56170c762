//! Shared type definitions for runtime message introspection.
//!
//! This crate holds the data model that the parser and the flattening decoder
//! (in the `introspect-flat` crate) agree on:
//!
//! - [`builtin`] - the closed set of primitive wire types and their widths
//! - [`schema`] - field types, fields and message definitions
//! - [`variant`] - the value cell produced for every decoded scalar leaf
//! - [`error`] - error types for type-name parsing and value access
//!
//! # Example
//!
//! ```
//! use introspect_types::{FieldType, ScalarTag, Time, Variant};
//!
//! let ty: FieldType = "geometry_msgs/Point[]".parse().unwrap();
//! assert_eq!(ty.qualified_name(), "geometry_msgs/Point");
//! assert_eq!(ty.tag(), ScalarTag::Composite);
//!
//! let stamp = Variant::from(Time::new(2, 500_000_000));
//! assert_eq!(stamp.convert::<f64>().unwrap(), 2.5);
//! ```

pub mod builtin;
pub mod error;
pub mod schema;
pub mod variant;

pub use builtin::ScalarTag;
pub use error::{Result, TypesError};
pub use schema::{Arity, Field, FieldType, MessageDefinition};
pub use variant::{ConvertValue, Duration, ExtractValue, Time, Variant};
