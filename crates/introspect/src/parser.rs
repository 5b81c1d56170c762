//! Message definition parser.
//!
//! Schema text is a concatenation of message blocks separated by lines of
//! exactly 80 `=` characters. The first block describes the root type, whose
//! name the caller supplies; every later block names its type with a
//! `MSG: package/Name` line. Inside a block each non-blank, non-comment line
//! declares one field:
//!
//! ```text
//! # comment
//! Header header
//! float64[] position        # trailing comment
//! uint8 OK=0
//! string GREETING = hello # kept verbatim
//! ```

use crate::error::{Error, Result};
use crate::warnings::{default_sink, WarningSink};
use introspect_types::{Field, FieldType, MessageDefinition, ScalarTag};
use std::sync::Arc;
use tracing::debug;

const SEPARATOR_LEN: usize = 80;
const MSG_MARKER: &str = "MSG: ";

/// True for a line made of exactly 80 `=` characters.
pub fn is_separator(line: &str) -> bool {
    let line = line.strip_suffix('\r').unwrap_or(line);
    line.len() == SEPARATOR_LEN && line.bytes().all(|b| b == b'=')
}

/// Split multi-message text on separator lines. Separators are dropped.
pub fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if is_separator(line) {
            blocks.push(std::mem::take(&mut current));
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    blocks.push(current);
    blocks
}

fn is_ignored(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Length of the `[a-zA-Z][a-zA-Z0-9_]*` prefix of `s`, if any.
fn scan_identifier(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if !bytes.first()?.is_ascii_alphabetic() {
        return None;
    }
    let len = bytes
        .iter()
        .position(|b| !(b.is_ascii_alphanumeric() || *b == b'_'))
        .unwrap_or(bytes.len());
    Some(len)
}

/// Length of the `name(/name)?(\[[0-9]*\])?` prefix of `s`, if any.
fn scan_type_token(s: &str) -> Option<usize> {
    let mut end = scan_identifier(s)?;
    let bytes = s.as_bytes();

    if bytes.get(end) == Some(&b'/') {
        if let Some(len) = scan_identifier(&s[end + 1..]) {
            end += 1 + len;
        }
    }

    if bytes.get(end) == Some(&b'[') {
        let digits = bytes[end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if bytes.get(end + 1 + digits) == Some(&b']') {
            end += digits + 2;
        }
    }

    Some(end)
}

fn grammar(line: &str, reason: impl Into<String>) -> Error {
    Error::Grammar {
        line: line.to_string(),
        reason: reason.into(),
    }
}

/// Parser for message definition text.
pub struct DefinitionParser {
    sink: Arc<dyn WarningSink>,
}

impl Default for DefinitionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionParser {
    /// Parser reporting warnings through `tracing`.
    pub fn new() -> Self {
        Self::with_sink(default_sink())
    }

    pub fn with_sink(sink: Arc<dyn WarningSink>) -> Self {
        Self { sink }
    }

    /// Parse one field declaration line.
    pub fn parse_field(&self, line: &str) -> Result<Field> {
        let rest = line.trim_start();

        let type_len = scan_type_token(rest).ok_or_else(|| grammar(line, "bad type"))?;
        let type_token = &rest[..type_len];
        let rest = &rest[type_len..];

        let after_type = rest.trim_start();
        if after_type.len() == rest.len() {
            return Err(grammar(line, "bad field name"));
        }
        let name_len = scan_identifier(after_type).ok_or_else(|| grammar(line, "bad field name"))?;
        let name = &after_type[..name_len];
        let rest = after_type[name_len..].trim_start();

        let field_type: FieldType = type_token
            .parse()
            .map_err(|e: introspect_types::TypesError| grammar(line, e.to_string()))?;

        match rest.chars().next() {
            None | Some('#') => Ok(Field::new(name, field_type)),
            Some('=') => {
                let raw = &rest[1..];
                let value = if field_type.tag() == ScalarTag::String {
                    raw.trim()
                } else {
                    raw.split('#').next().unwrap_or_default().trim()
                };
                self.check_constant(name, &field_type, value);
                Ok(Field::constant(name, field_type, value))
            }
            Some(_) => Err(grammar(
                line,
                "unexpected character after type and field name",
            )),
        }
    }

    fn check_constant(&self, name: &str, field_type: &FieldType, value: &str) {
        let tag = field_type.tag();
        if !tag.is_builtin() || field_type.is_array() {
            self.sink.warn(&format!(
                "constant '{name}' has non-scalar type {field_type}"
            ));
            return;
        }
        let numeric_ok = match tag {
            ScalarTag::Float32 | ScalarTag::Float64 => value.parse::<f64>().is_ok(),
            ScalarTag::Bool => {
                matches!(value.to_ascii_lowercase().as_str(), "true" | "false")
                    || value.parse::<i128>().is_ok()
            }
            _ if tag.is_numeric() => value.parse::<i128>().is_ok(),
            _ => true,
        };
        if !numeric_ok {
            self.sink.warn(&format!(
                "constant '{name}' of type {field_type} has non-numeric value '{value}'"
            ));
        }
    }

    /// Parse a single message block.
    ///
    /// `type_name` names the block when it has no `MSG:` line; a `MSG:` line
    /// takes precedence.
    pub fn parse_message(&self, type_name: Option<&str>, text: &str) -> Result<MessageDefinition> {
        let mut own_type = None;
        let mut fields = Vec::new();

        for line in text.lines() {
            if is_ignored(line) {
                continue;
            }
            if let Some(name) = line.strip_prefix(MSG_MARKER) {
                let ty = FieldType::scalar(name.trim()).map_err(|e| grammar(line, e.to_string()))?;
                own_type = Some(ty);
                continue;
            }
            fields.push(self.parse_field(line)?);
        }

        let own_type = match (own_type, type_name) {
            (Some(ty), _) => ty,
            (None, Some(name)) => FieldType::scalar(name)?,
            (None, None) => return Err(Error::MissingTypeName),
        };

        debug!(
            "Parsed definition {} with {} fields",
            own_type.qualified_name(),
            fields.len()
        );
        Ok(MessageDefinition::new(own_type, fields))
    }

    /// Parse full schema text whose first block describes `root_type`.
    ///
    /// Blocks holding only blank or comment lines are skipped.
    pub fn parse_schema(&self, root_type: &str, text: &str) -> Result<Vec<MessageDefinition>> {
        let mut definitions = Vec::new();
        for (index, block) in split_blocks(text).iter().enumerate() {
            if block.lines().all(is_ignored) {
                continue;
            }
            let name = (index == 0).then_some(root_type);
            definitions.push(self.parse_message(name, block)?);
        }
        Ok(definitions)
    }
}
