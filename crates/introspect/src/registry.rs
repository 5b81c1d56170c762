//! Registry of every message definition reachable from a root type.
//!
//! Built once from schema text, then read-only. Field types written without
//! a package (`Header` instead of `std_msgs/Header`) are qualified here so
//! the decoder can look every composite up by its full name.

use crate::error::{Error, Result};
use crate::parser::DefinitionParser;
use crate::warnings::{default_sink, WarningSink};
use introspect_types::{MessageDefinition, ScalarTag};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Message definitions keyed by qualified name, in schema order.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    definitions: Vec<MessageDefinition>,
    index: HashMap<String, usize>,
}

impl TypeRegistry {
    /// Parse schema text whose first block describes `root_type`.
    ///
    /// Warnings go to `tracing`.
    pub fn from_definition(root_type: &str, text: &str) -> Result<Self> {
        Self::parse(root_type, text, default_sink())
    }

    /// Parse schema text, reporting warnings to `sink`.
    pub fn parse(root_type: &str, text: &str, sink: Arc<dyn WarningSink>) -> Result<Self> {
        let parser = DefinitionParser::with_sink(sink.clone());
        let definitions = parser.parse_schema(root_type, text)?;
        Self::from_definitions(definitions, sink)
    }

    /// Build from already parsed definitions. The first one is the root.
    pub fn from_definitions(
        definitions: Vec<MessageDefinition>,
        sink: Arc<dyn WarningSink>,
    ) -> Result<Self> {
        let mut kept = Vec::with_capacity(definitions.len());
        let mut index = HashMap::with_capacity(definitions.len());
        for definition in definitions {
            let name = definition.name().to_string();
            if index.contains_key(&name) {
                sink.warn(&format!(
                    "Definition of {name} appears more than once; keeping the first"
                ));
                continue;
            }
            index.insert(name, kept.len());
            kept.push(definition);
        }

        let mut registry = Self {
            definitions: kept,
            index,
        };
        registry.qualify_fields(sink.as_ref())?;

        debug!(
            "Built type registry with {} definitions",
            registry.definitions.len()
        );
        Ok(registry)
    }

    /// Attach packages to unqualified composite field types.
    fn qualify_fields(&mut self, sink: &dyn WarningSink) -> Result<()> {
        let mut updates = Vec::new();

        for (owner_idx, owner) in self.definitions.iter().enumerate() {
            for (field_idx, field) in owner.fields().iter().enumerate() {
                let ty = field.field_type();
                if !ty.package().is_empty() || ty.tag() != ScalarTag::Composite {
                    continue;
                }

                let packages: BTreeSet<&str> = self
                    .definitions
                    .iter()
                    .filter(|d| d.message_name() == ty.message_name())
                    .map(|d| d.package())
                    .collect();

                let package = if packages.contains(owner.package()) {
                    owner.package()
                } else if packages.len() == 1 {
                    packages.iter().next().copied().unwrap_or_default()
                } else if packages.is_empty() {
                    sink.warn(&format!(
                        "Type {} used by {}.{} matches no known definition",
                        ty.message_name(),
                        owner.name(),
                        field.name()
                    ));
                    continue;
                } else {
                    return Err(Error::AmbiguousType {
                        name: ty.message_name().to_string(),
                        owner: owner.name().to_string(),
                        field: field.name().to_string(),
                        candidates: packages
                            .iter()
                            .map(|p| format!("{p}/{}", ty.message_name()))
                            .collect(),
                    });
                };

                updates.push((owner_idx, field_idx, package.to_string()));
            }
        }

        for (owner_idx, field_idx, package) in updates {
            self.definitions[owner_idx].fields_mut()[field_idx].qualify_type(&package);
        }
        Ok(())
    }

    /// Definition for `name`, or an error listing every known name.
    pub fn resolve(&self, name: &str) -> Result<&MessageDefinition> {
        self.get(name).ok_or_else(|| Error::TypeNotFound {
            name: name.to_string(),
            available: self.list_types().into_iter().map(String::from).collect(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&MessageDefinition> {
        self.index.get(name).map(|&i| &self.definitions[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The definition parsed from the first block.
    pub fn root(&self) -> Option<&MessageDefinition> {
        self.definitions.first()
    }

    /// Qualified names in schema order.
    pub fn list_types(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warnings::{CollectingSink, NoopSink};

    const SEP: &str =
        "================================================================================";

    fn schema(blocks: &[&str]) -> String {
        blocks.join(&format!("\n{SEP}\n"))
    }

    #[test]
    fn test_qualifies_from_unique_match() {
        let text = schema(&[
            "Header header\nfloat64 x",
            "MSG: std_msgs/Header\nuint32 seq\ntime stamp\nstring frame_id",
        ]);
        let registry = TypeRegistry::from_definition("geometry_msgs/PointStamped", &text)
            .expect("valid schema");

        assert_eq!(
            registry.list_types(),
            vec!["geometry_msgs/PointStamped", "std_msgs/Header"]
        );
        let root = registry.root().expect("root");
        let header = root.get_field("header").expect("header field");
        assert_eq!(header.field_type().qualified_name(), "std_msgs/Header");
        assert!(registry.resolve("std_msgs/Header").is_ok());
    }

    #[test]
    fn test_prefers_enclosing_package() {
        let text = schema(&[
            "Status status",
            "MSG: other_msgs/Status\nuint8 code",
            "MSG: my_msgs/Status\nstring text",
        ]);
        let registry =
            TypeRegistry::from_definition("my_msgs/Report", &text).expect("valid schema");
        let root = registry.resolve("my_msgs/Report").expect("root");
        assert_eq!(
            root.fields()[0].field_type().qualified_name(),
            "my_msgs/Status"
        );
    }

    #[test]
    fn test_ambiguous_type_is_rejected() {
        let text = schema(&[
            "Status status",
            "MSG: a_msgs/Status\nuint8 code",
            "MSG: b_msgs/Status\nuint8 code",
        ]);
        let err = TypeRegistry::from_definition("my_msgs/Report", &text)
            .expect_err("two candidates");
        match err {
            Error::AmbiguousType {
                name, candidates, ..
            } => {
                assert_eq!(name, "Status");
                assert_eq!(candidates, vec!["a_msgs/Status", "b_msgs/Status"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_type_warns_and_stays_unqualified() {
        let sink = Arc::new(CollectingSink::new());
        let registry = TypeRegistry::parse("pkg/Outer", "Missing inner", sink.clone())
            .expect("builds with warning");
        let field = &registry.root().expect("root").fields()[0];
        assert_eq!(field.field_type().qualified_name(), "Missing");
        let warnings = sink.messages();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Missing"));
    }

    #[test]
    fn test_resolve_lists_available_types() {
        let registry = TypeRegistry::parse("pkg/Only", "int32 a", Arc::new(NoopSink))
            .expect("valid schema");
        let err = registry.resolve("pkg/Nope").expect_err("absent");
        let message = err.to_string();
        assert!(message.contains("pkg/Nope"));
        assert!(message.contains("pkg/Only"));
    }

    #[test]
    fn test_duplicate_definition_keeps_first() {
        let sink = Arc::new(CollectingSink::new());
        let text = schema(&[
            "pkg/Inner a",
            "MSG: pkg/Inner\nint32 first",
            "MSG: pkg/Inner\nint64 second",
        ]);
        let registry = TypeRegistry::parse("pkg/Outer", &text, sink.clone()).expect("valid");
        assert_eq!(registry.len(), 2);
        let inner = registry.resolve("pkg/Inner").expect("inner");
        assert_eq!(inner.list_fields(), vec!["first"]);
        assert_eq!(sink.messages().len(), 1);
    }

    #[test]
    fn test_builtin_fields_untouched() {
        let registry = TypeRegistry::parse("pkg/Plain", "uint8 a\nstring b", Arc::new(NoopSink))
            .expect("valid");
        let root = registry.root().expect("root");
        assert_eq!(root.fields()[0].field_type().qualified_name(), "uint8");
        assert_eq!(root.fields()[1].field_type().qualified_name(), "string");
    }
}
