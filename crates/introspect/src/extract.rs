//! Typed sub-extraction.
//!
//! Pulls every instance of one composite type out of a larger message, e.g.
//! all `geometry_msgs/Pose` values inside a `PoseArray`, without flattening
//! the rest. Everything else in the buffer is skipped but still consumed, and
//! the buffer must be exhausted at the end.

use crate::decoder::FlatDecoder;
use crate::error::{Error, Result};
use crate::flat::FlatMessage;
use crate::registry::TypeRegistry;
use crate::wire::WireReader;
use introspect_types::{Arity, FieldType, MessageDefinition, ScalarTag};

/// A caller type that can read itself from the wire.
pub trait WireMessage: Sized {
    /// Qualified name of the message this type decodes, e.g. `geometry_msgs/Point`.
    const TYPE_NAME: &'static str;

    fn read(reader: &mut WireReader<'_>) -> Result<Self>;
}

/// Every `M` inside `buffer`, paired with its path.
///
/// Paths start with `prefix` and carry array indices, e.g.
/// `poses/2/position`. An array whose elements occupy no bytes yields only its
/// first element.
pub fn extract_messages<M: WireMessage>(
    registry: &TypeRegistry,
    root_type: &str,
    prefix: &str,
    buffer: &[u8],
) -> Result<Vec<(String, M)>> {
    let mut found = Vec::new();
    walk_buffer(registry, root_type, M::TYPE_NAME, prefix, buffer, |path, reader| {
        found.push((path.to_string(), M::read(reader)?));
        Ok(())
    })?;
    Ok(found)
}

/// Flatten every `target_type` sub-structure inside `buffer` into its own
/// [`FlatMessage`], whose prefix is the path of that sub-structure.
///
/// Array limits and warnings follow `decoder`'s settings.
pub fn extract_flat(
    decoder: &FlatDecoder<'_>,
    root_type: &str,
    target_type: &str,
    prefix: &str,
    buffer: &[u8],
) -> Result<Vec<FlatMessage>> {
    let mut found = Vec::new();
    walk_buffer(
        decoder.registry(),
        root_type,
        target_type,
        prefix,
        buffer,
        |path, reader| {
            let mut flat = FlatMessage::new(path);
            let start = reader.offset();
            let end = decoder.decode_at(target_type, buffer, start, &mut flat)?;
            reader.skip(end - start)?;
            found.push(flat);
            Ok(())
        },
    )?;
    Ok(found)
}

type OnMatch<'f, 'b> = dyn FnMut(&str, &mut WireReader<'b>) -> Result<()> + 'f;

fn walk_buffer<'b, F>(
    registry: &TypeRegistry,
    root_type: &str,
    target_type: &str,
    prefix: &str,
    buffer: &'b [u8],
    mut on_match: F,
) -> Result<()>
where
    F: FnMut(&str, &mut WireReader<'b>) -> Result<()>,
{
    if !registry.contains(target_type) {
        return Err(Error::TypeNotFound {
            name: target_type.to_string(),
            available: registry.list_types().into_iter().map(String::from).collect(),
        });
    }

    let mut walker = Walker {
        registry,
        target_type,
        on_match: &mut on_match,
    };
    let mut reader = WireReader::new(buffer);
    let mut path = prefix.to_string();
    let root = FieldType::scalar(root_type)?;
    walker.walk_value(&root, &mut reader, &mut path)?;

    if !reader.is_exhausted() {
        return Err(Error::TrailingBytes {
            consumed: reader.offset(),
            total: buffer.len(),
        });
    }
    Ok(())
}

struct Walker<'a, 'f, 'b> {
    registry: &'a TypeRegistry,
    target_type: &'a str,
    on_match: &'a mut OnMatch<'f, 'b>,
}

fn push_segment(path: &mut String, segment: &str) {
    if !path.is_empty() {
        path.push('/');
    }
    path.push_str(segment);
}

impl<'b> Walker<'_, '_, 'b> {
    fn walk_message(
        &mut self,
        definition: &MessageDefinition,
        reader: &mut WireReader<'b>,
        path: &mut String,
    ) -> Result<()> {
        for field in definition.wire_fields() {
            let mark = path.len();
            push_segment(path, field.name());
            let ty = field.field_type();

            let count = match ty.arity() {
                Arity::Scalar => None,
                Arity::Fixed(n) => Some(n),
                Arity::Variable => Some(reader.read_len()?),
            };
            match count {
                None => {
                    self.walk_value(ty, reader, path)?;
                }
                Some(count) if ty.tag() != ScalarTag::Composite => {
                    reader.skip_scalars(ty.tag(), count)?;
                }
                Some(count) => {
                    let element_mark = path.len();
                    for index in 0..count {
                        push_segment(path, &index.to_string());
                        let start = reader.offset();
                        self.walk_value(ty, reader, path)?;
                        path.truncate(element_mark);
                        // Zero-width elements are all identical; stop after the first.
                        if reader.offset() == start {
                            break;
                        }
                    }
                }
            }

            path.truncate(mark);
        }
        Ok(())
    }

    /// Hand a `target_type` value to the callback, otherwise skip or descend.
    fn walk_value(
        &mut self,
        ty: &FieldType,
        reader: &mut WireReader<'b>,
        path: &mut String,
    ) -> Result<()> {
        if ty.is_builtin() {
            return reader.skip_scalars(ty.tag(), 1);
        }
        if ty.qualified_name() == self.target_type {
            return (self.on_match)(path, reader);
        }
        let definition = self.registry.resolve(ty.qualified_name())?;
        self.walk_message(definition, reader, path)
    }
}
