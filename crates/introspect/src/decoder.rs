//! Schema-driven flattening decoder.
//!
//! Walks a message definition against an encoded buffer and appends one leaf
//! per decoded scalar to a [`FlatMessage`]. Arrays longer than the
//! configured limit are still walked so the offset stays correct, but none of
//! their elements are emitted.

use crate::error::{Error, Result};
use crate::flat::FlatMessage;
use crate::path_tree::LeafHandle;
use crate::registry::TypeRegistry;
use crate::warnings::{default_sink, WarningSink};
use crate::wire::WireReader;
use introspect_types::{Arity, Field, FieldType, MessageDefinition, ScalarTag};
use std::sync::Arc;
use tracing::trace;

/// Default cutoff above which array elements are not emitted.
pub const DEFAULT_MAX_ARRAY_SIZE: u32 = 100;

/// Decoder over a shared, read-only registry.
///
/// Holds no per-decode state; one instance can serve any number of decodes.
pub struct FlatDecoder<'r> {
    registry: &'r TypeRegistry,
    sink: Arc<dyn WarningSink>,
    max_array_size: u32,
}

impl<'r> FlatDecoder<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            sink: default_sink(),
            max_array_size: DEFAULT_MAX_ARRAY_SIZE,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn WarningSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_max_array_size(mut self, max_array_size: u32) -> Self {
        self.max_array_size = max_array_size;
        self
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    pub fn max_array_size(&self) -> u32 {
        self.max_array_size
    }

    /// Decode one complete instance of `root_type` into `out`.
    ///
    /// `out` is reset to `prefix` first. Fails with [`Error::TrailingBytes`]
    /// if the buffer holds more than one instance. On any error `out` is
    /// restored to its state before the call, prefix and leaves included.
    pub fn decode(
        &self,
        root_type: &str,
        prefix: &str,
        buffer: &[u8],
        out: &mut FlatMessage,
    ) -> Result<usize> {
        let snapshot = out.reset_with_snapshot(prefix);
        let result = self
            .decode_at(root_type, buffer, 0, out)
            .and_then(|consumed| {
                if consumed == buffer.len() {
                    Ok(consumed)
                } else {
                    Err(Error::TrailingBytes {
                        consumed,
                        total: buffer.len(),
                    })
                }
            });
        if result.is_err() {
            out.restore(snapshot);
        }
        result
    }

    /// Decode one instance of `root_type` starting at `offset` and return the
    /// offset just past it.
    ///
    /// Leaves are appended to `out` under its current prefix; bytes after the
    /// instance are left alone. On error `out` is restored to its state
    /// before the call.
    pub fn decode_at(
        &self,
        root_type: &str,
        buffer: &[u8],
        offset: usize,
        out: &mut FlatMessage,
    ) -> Result<usize> {
        let checkpoint = out.checkpoint();
        let mut reader = WireReader::at(buffer, offset);
        let root = LeafHandle::new(out.tree.root());

        let result = self
            .registry
            .resolve(root_type)
            .and_then(|definition| self.decode_message(definition, &mut reader, out, Some(root)));

        match result {
            Ok(()) => {
                trace!(
                    "Decoded {root_type}: {} bytes, {} leaves",
                    reader.offset() - offset,
                    out.leaf_count()
                );
                Ok(reader.offset())
            }
            Err(e) => {
                out.rollback(checkpoint);
                Err(e)
            }
        }
    }

    /// Decode every wire field of `definition`. `parent` is `None` while
    /// walking a suppressed subtree.
    pub(crate) fn decode_message(
        &self,
        definition: &MessageDefinition,
        reader: &mut WireReader<'_>,
        out: &mut FlatMessage,
        parent: Option<LeafHandle>,
    ) -> Result<()> {
        for field in definition.wire_fields() {
            let target = parent.map(|p| p.with_node(out.tree.insert_child(p.node(), field.name())));
            self.decode_field(field, reader, out, target)?;
        }
        Ok(())
    }

    fn decode_field(
        &self,
        field: &Field,
        reader: &mut WireReader<'_>,
        out: &mut FlatMessage,
        target: Option<LeafHandle>,
    ) -> Result<()> {
        let ty = field.field_type();
        let count = match ty.arity() {
            Arity::Scalar => return self.decode_value(ty, reader, out, target),
            Arity::Fixed(n) => n,
            Arity::Variable => reader.read_len()?,
        };

        let Some(array) = target else {
            return self.skip_elements(ty, reader, out, count);
        };

        if count > self.max_array_size as usize {
            self.sink.warn(&format!(
                "Skipping array {} with {count} elements (limit {})",
                out.tree.leaf_path(&array),
                self.max_array_size
            ));
            return self.skip_elements(ty, reader, out, count);
        }

        let wildcard = array.with_node(out.tree.insert_wildcard(array.node()));
        for index in 0..count {
            let mut element = wildcard;
            element.push_index(index as u32)?;
            self.decode_value(ty, reader, out, Some(element))?;
        }
        Ok(())
    }

    /// Consume `count` elements of `ty` without emitting anything.
    fn skip_elements(
        &self,
        ty: &FieldType,
        reader: &mut WireReader<'_>,
        out: &mut FlatMessage,
        count: usize,
    ) -> Result<()> {
        if ty.is_builtin() {
            return reader.skip_scalars(ty.tag(), count);
        }
        let definition = self.registry.resolve(ty.qualified_name())?;
        for _ in 0..count {
            let start = reader.offset();
            self.decode_message(definition, reader, out, None)?;
            // An element that reads nothing has no wire fields at all.
            if reader.offset() == start {
                break;
            }
        }
        Ok(())
    }

    /// Decode one element of `ty`, emitting it at `target` if given.
    fn decode_value(
        &self,
        ty: &FieldType,
        reader: &mut WireReader<'_>,
        out: &mut FlatMessage,
        target: Option<LeafHandle>,
    ) -> Result<()> {
        match (ty.tag(), target) {
            (ScalarTag::Composite, _) => {
                let definition = self.registry.resolve(ty.qualified_name())?;
                self.decode_message(definition, reader, out, target)
            }
            (tag, None) => reader.skip_scalars(tag, 1),
            (ScalarTag::String, Some(leaf)) => {
                let bytes = reader.read_string()?;
                out.names
                    .push((leaf, String::from_utf8_lossy(bytes).into_owned()));
                Ok(())
            }
            (tag, Some(leaf)) => {
                let value = reader.read_scalar(tag)?;
                out.values.push((leaf, value));
                Ok(())
            }
        }
    }
}

/// Decode `buffer` as one `root_type` into `output` with paths under `prefix`.
///
/// Shorthand for [`FlatDecoder::decode`] with the default warning sink.
pub fn build_flat_message(
    registry: &TypeRegistry,
    root_type: &str,
    prefix: &str,
    buffer: &[u8],
    output: &mut FlatMessage,
    max_array_size: u32,
) -> Result<usize> {
    FlatDecoder::new(registry)
        .with_max_array_size(max_array_size)
        .decode(root_type, prefix, buffer, output)
}
