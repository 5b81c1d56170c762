use introspect_types::TypesError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Bad definition line '{line}': {reason}")]
    Grammar { line: String, reason: String },

    #[error("Message block has no type name (expected a 'MSG: package/Name' line)")]
    MissingTypeName,

    #[error("Cannot decode type {name}. Available types are: {}", available.join(", "))]
    TypeNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("Type '{name}' used by {owner}.{field} is ambiguous; candidates: {}", candidates.join(", "))]
    AmbiguousType {
        name: String,
        owner: String,
        field: String,
        candidates: Vec<String>,
    },

    #[error("Buffer exhausted at offset {offset}: needed {needed} bytes, {available} available")]
    BufferExhausted {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Decoded {consumed} bytes but the buffer holds {total}")]
    TrailingBytes { consumed: usize, total: usize },

    #[error("{0} is not a builtin type")]
    NotBuiltin(String),

    #[error("Path nests more than {max} arrays")]
    PathTooDeep { max: usize },

    #[error(transparent)]
    Types(#[from] TypesError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Every variant is produced by some decode or parse path.
    fn origin(err: &Error) -> &'static str {
        match err {
            Error::Grammar { .. } | Error::MissingTypeName => "parser",
            Error::TypeNotFound { .. } | Error::AmbiguousType { .. } => "registry",
            Error::BufferExhausted { .. } | Error::NotBuiltin(_) => "wire",
            Error::TrailingBytes { .. } => "decoder",
            Error::PathTooDeep { .. } => "path_tree",
            Error::Types(_) => "types",
        }
    }

    #[test]
    fn test_error_messages() {
        let err = Error::TypeNotFound {
            name: "pkg/B".to_string(),
            available: vec!["pkg/A".to_string(), "pkg/C".to_string()],
        };
        assert_eq!(origin(&err), "registry");
        assert_eq!(
            err.to_string(),
            "Cannot decode type pkg/B. Available types are: pkg/A, pkg/C"
        );

        let err = Error::from(TypesError::InvalidTypeName("9x".to_string()));
        assert_eq!(origin(&err), "types");
        assert_eq!(err.to_string(), TypesError::InvalidTypeName("9x".to_string()).to_string());
    }
}
