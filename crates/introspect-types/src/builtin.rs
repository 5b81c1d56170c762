//! Primitive wire types.
//!
//! Every field in a message definition resolves to exactly one [`ScalarTag`].
//! Names that are not one of the builtin type names resolve to
//! [`ScalarTag::Composite`] and must be looked up in a type registry.

/// Closed enumeration of the primitive wire types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarTag {
    Bool,
    /// Deprecated alias, one unsigned byte on the wire.
    Byte,
    /// Deprecated alias, one signed byte on the wire.
    Char,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
    Time,
    Duration,
    String,
    Composite,
}

impl ScalarTag {
    /// Resolve a bare type name (no package, no array suffix).
    pub fn from_name(name: &str) -> Self {
        match name {
            "bool" => ScalarTag::Bool,
            "byte" => ScalarTag::Byte,
            "char" => ScalarTag::Char,
            "int8" => ScalarTag::Int8,
            "uint8" => ScalarTag::Uint8,
            "int16" => ScalarTag::Int16,
            "uint16" => ScalarTag::Uint16,
            "int32" => ScalarTag::Int32,
            "uint32" => ScalarTag::Uint32,
            "int64" => ScalarTag::Int64,
            "uint64" => ScalarTag::Uint64,
            "float32" => ScalarTag::Float32,
            "float64" => ScalarTag::Float64,
            "time" => ScalarTag::Time,
            "duration" => ScalarTag::Duration,
            "string" => ScalarTag::String,
            _ => ScalarTag::Composite,
        }
    }

    /// Human-readable type name, identical to the schema spelling.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarTag::Bool => "bool",
            ScalarTag::Byte => "byte",
            ScalarTag::Char => "char",
            ScalarTag::Int8 => "int8",
            ScalarTag::Uint8 => "uint8",
            ScalarTag::Int16 => "int16",
            ScalarTag::Uint16 => "uint16",
            ScalarTag::Int32 => "int32",
            ScalarTag::Uint32 => "uint32",
            ScalarTag::Int64 => "int64",
            ScalarTag::Uint64 => "uint64",
            ScalarTag::Float32 => "float32",
            ScalarTag::Float64 => "float64",
            ScalarTag::Time => "time",
            ScalarTag::Duration => "duration",
            ScalarTag::String => "string",
            ScalarTag::Composite => "composite",
        }
    }

    /// Fixed byte width on the wire.
    ///
    /// `None` for strings (length-prefixed) and composites (sum of their fields).
    pub fn wire_size(&self) -> Option<usize> {
        match self {
            ScalarTag::Bool
            | ScalarTag::Byte
            | ScalarTag::Char
            | ScalarTag::Int8
            | ScalarTag::Uint8 => Some(1),
            ScalarTag::Int16 | ScalarTag::Uint16 => Some(2),
            ScalarTag::Int32 | ScalarTag::Uint32 | ScalarTag::Float32 => Some(4),
            ScalarTag::Int64
            | ScalarTag::Uint64
            | ScalarTag::Float64
            | ScalarTag::Time
            | ScalarTag::Duration => Some(8),
            ScalarTag::String | ScalarTag::Composite => None,
        }
    }

    /// True for every tag except [`ScalarTag::Composite`].
    pub fn is_builtin(&self) -> bool {
        !matches!(self, ScalarTag::Composite)
    }

    /// True for integer and floating point tags, including `byte` and `char`.
    pub fn is_numeric(&self) -> bool {
        !matches!(
            self,
            ScalarTag::Bool
                | ScalarTag::Time
                | ScalarTag::Duration
                | ScalarTag::String
                | ScalarTag::Composite
        )
    }
}

impl std::fmt::Display for ScalarTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ScalarTag; 16] = [
        ScalarTag::Bool,
        ScalarTag::Byte,
        ScalarTag::Char,
        ScalarTag::Int8,
        ScalarTag::Uint8,
        ScalarTag::Int16,
        ScalarTag::Uint16,
        ScalarTag::Int32,
        ScalarTag::Uint32,
        ScalarTag::Int64,
        ScalarTag::Uint64,
        ScalarTag::Float32,
        ScalarTag::Float64,
        ScalarTag::Time,
        ScalarTag::Duration,
        ScalarTag::String,
    ];

    #[test]
    fn test_builtin_names_resolve_to_themselves() {
        for tag in ALL {
            assert_eq!(ScalarTag::from_name(tag.name()), tag);
            assert!(tag.is_builtin());
        }
    }

    #[test]
    fn test_unknown_name_is_composite() {
        assert_eq!(ScalarTag::from_name("Header"), ScalarTag::Composite);
        assert_eq!(ScalarTag::from_name("float"), ScalarTag::Composite);
        assert!(!ScalarTag::Composite.is_builtin());
    }

    #[test]
    fn test_wire_sizes() {
        assert_eq!(ScalarTag::Bool.wire_size(), Some(1));
        assert_eq!(ScalarTag::Uint16.wire_size(), Some(2));
        assert_eq!(ScalarTag::Float32.wire_size(), Some(4));
        assert_eq!(ScalarTag::Time.wire_size(), Some(8));
        assert_eq!(ScalarTag::Duration.wire_size(), Some(8));
        assert_eq!(ScalarTag::String.wire_size(), None);
        assert_eq!(ScalarTag::Composite.wire_size(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ScalarTag::Float64.to_string(), "float64");
        assert_eq!(ScalarTag::Composite.to_string(), "composite");
    }
}
