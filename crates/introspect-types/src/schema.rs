//! Schema descriptors.
//!
//! A [`MessageDefinition`] is an ordered list of [`Field`]s; the order is the
//! decode order. Each field carries a [`FieldType`], which knows its package,
//! message name, array arity and resolved [`ScalarTag`].

use crate::builtin::ScalarTag;
use crate::error::{Result, TypesError};
use std::str::FromStr;

/// Array classification of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// A single value, no brackets in the schema.
    Scalar,
    /// `T[N]`: exactly N elements, no length prefix on the wire.
    Fixed(usize),
    /// `T[]`: element count is a u32 little-endian prefix on the wire.
    Variable,
}

impl Arity {
    /// Legacy integer encoding: `1` for scalars, `N` for fixed arrays, `-1` for variable arrays.
    pub fn array_size(&self) -> i64 {
        match self {
            Arity::Scalar => 1,
            Arity::Fixed(n) => *n as i64,
            Arity::Variable => -1,
        }
    }

    pub fn is_array(&self) -> bool {
        !matches!(self, Arity::Scalar)
    }
}

/// Type of a field as written in a message definition.
///
/// Parsed from tokens such as `float64`, `Header`, `geometry_msgs/Point[]`
/// or `uint8[16]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldType {
    package: String,
    message: String,
    qualified: String,
    arity: Arity,
    tag: ScalarTag,
}

impl FieldType {
    /// Build a type from its parts. The tag is resolved from the message name
    /// when no package is given; packaged types are always composite.
    pub fn new(package: impl Into<String>, message: impl Into<String>, arity: Arity) -> Self {
        let package = package.into();
        let message = message.into();
        let (qualified, tag) = if package.is_empty() {
            (message.clone(), ScalarTag::from_name(&message))
        } else {
            (format!("{package}/{message}"), ScalarTag::Composite)
        };
        Self {
            package,
            message,
            qualified,
            arity,
            tag,
        }
    }

    /// Non-array type for a qualified name such as `std_msgs/Header`.
    pub fn scalar(qualified: &str) -> Result<Self> {
        let ty: FieldType = qualified.parse()?;
        Ok(ty.with_arity(Arity::Scalar))
    }

    /// Same type with a different arity.
    pub fn with_arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn message_name(&self) -> &str {
        &self.message
    }

    /// `package/Message`, or just `Message` when the package is unknown.
    pub fn qualified_name(&self) -> &str {
        &self.qualified
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn tag(&self) -> ScalarTag {
        self.tag
    }

    pub fn is_array(&self) -> bool {
        self.arity.is_array()
    }

    pub fn is_builtin(&self) -> bool {
        self.tag.is_builtin()
    }

    /// Fixed width of one element, if it has one.
    pub fn wire_size(&self) -> Option<usize> {
        self.tag.wire_size()
    }

    /// Attach a package to a type written without one.
    ///
    /// Has no effect on types that already carry a package.
    pub fn qualify(&mut self, package: &str) {
        if !self.package.is_empty() || package.is_empty() {
            return;
        }
        self.package = package.to_string();
        self.qualified = format!("{package}/{}", self.message);
        self.tag = ScalarTag::Composite;
    }
}

impl FromStr for FieldType {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TypesError::InvalidTypeName(s.to_string());

        let (name, arity) = match s.find('[') {
            Some(open) => {
                let size = s[open + 1..].strip_suffix(']').ok_or_else(invalid)?;
                let arity = if size.is_empty() {
                    Arity::Variable
                } else if size.bytes().all(|b| b.is_ascii_digit()) {
                    Arity::Fixed(size.parse().map_err(|_| invalid())?)
                } else {
                    return Err(invalid());
                };
                (&s[..open], arity)
            }
            None => (s, Arity::Scalar),
        };

        let (package, message) = match name.split_once('/') {
            Some((package, message)) => (package, message),
            None => ("", name),
        };
        if name.contains('/') && !is_identifier(package) {
            return Err(invalid());
        }
        if !is_identifier(message) {
            return Err(invalid());
        }

        Ok(FieldType::new(package, message, arity))
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.arity {
            Arity::Scalar => write!(f, "{}", self.qualified),
            Arity::Fixed(n) => write!(f, "{}[{n}]", self.qualified),
            Arity::Variable => write!(f, "{}[]", self.qualified),
        }
    }
}

/// `[a-zA-Z][a-zA-Z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }
        _ => false,
    }
}

/// A single declaration inside a message definition.
///
/// Constant fields keep their literal text for reflection but occupy no
/// bytes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    field_type: FieldType,
    constant: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            constant: None,
        }
    }

    pub fn constant(
        name: impl Into<String>,
        field_type: FieldType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type,
            constant: Some(value.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn is_constant(&self) -> bool {
        self.constant.is_some()
    }

    /// Literal text of a constant, already trimmed.
    pub fn constant_value(&self) -> Option<&str> {
        self.constant.as_deref()
    }

    /// See [`FieldType::qualify`].
    pub fn qualify_type(&mut self, package: &str) {
        self.field_type.qualify(package);
    }
}

/// Describes one message type: its own type and its ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDefinition {
    field_type: FieldType,
    fields: Vec<Field>,
}

impl MessageDefinition {
    pub fn new(field_type: FieldType, fields: Vec<Field>) -> Self {
        Self {
            field_type: field_type.with_arity(Arity::Scalar),
            fields,
        }
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Qualified name, e.g. `sensor_msgs/JointState`.
    pub fn name(&self) -> &str {
        self.field_type.qualified_name()
    }

    pub fn package(&self) -> &str {
        self.field_type.package()
    }

    pub fn message_name(&self) -> &str {
        self.field_type.message_name()
    }

    /// All fields in declaration order, constants included.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }

    /// Fields that occupy bytes on the wire, in decode order.
    pub fn wire_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_constant())
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order.
    pub fn list_fields(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}
