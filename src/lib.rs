//! ros-introspect
//!
//! Command-line front end for the `introspect-flat` decoder: load a message
//! definition, decode an encoded message file and print its leaves as
//! `path: value` lines.
//!
//! # CLI Usage
//!
//! ```bash
//! # Flatten one message
//! ros-introspect decode --schema joint_state.msg --type sensor_msgs/JointState --input msg.bin
//!
//! # List the definitions a schema file contains
//! ros-introspect types --schema joint_state.msg --type sensor_msgs/JointState
//!
//! # Only the headers inside a larger message
//! ros-introspect extract --schema joint_state.msg --type sensor_msgs/JointState \
//!   --input msg.bin --target std_msgs/Header
//! ```

use anyhow::Context;
use clap::Parser;
use introspect_flat::{extract_flat, FlatDecoder, FlatMessage, TypeRegistry};
use std::path::PathBuf;

pub mod config;

pub use config::{Config, DecodeConfig, LoggingConfig};

#[derive(Parser, Clone, Debug)]
pub struct SchemaOpts {
    /// Message definition file
    #[arg(long, value_name = "PATH")]
    pub schema: PathBuf,

    /// Qualified name of the type the first block describes (e.g. sensor_msgs/JointState)
    #[arg(long = "type", value_name = "TYPE")]
    pub root_type: String,
}

impl SchemaOpts {
    /// Read the schema file and build its registry.
    pub fn load_registry(&self) -> anyhow::Result<TypeRegistry> {
        let text = std::fs::read_to_string(&self.schema)
            .with_context(|| format!("Failed to read schema file {:?}", self.schema))?;
        TypeRegistry::from_definition(&self.root_type, &text)
            .with_context(|| format!("Failed to parse definition of {}", self.root_type))
    }
}

#[derive(Parser, Clone, Debug, Default)]
pub struct DecodeOpts {
    /// Arrays longer than this are skipped in the output
    #[arg(long, env = "ROS_INTROSPECT_MAX_ARRAY_SIZE")]
    pub max_array_size: Option<u32>,

    /// Root segment of every printed path
    #[arg(long, env = "ROS_INTROSPECT_PREFIX")]
    pub prefix: Option<String>,
}

impl DecodeOpts {
    /// Apply these flags on top of the file settings.
    pub fn resolve(&self, file: &DecodeConfig) -> DecodeConfig {
        DecodeConfig {
            max_array_size: self.max_array_size.unwrap_or(file.max_array_size),
            prefix: self.prefix.clone().unwrap_or_else(|| file.prefix.clone()),
            require_exhausted: file.require_exhausted,
        }
    }
}

/// Flags of the `decode` command only; extraction always needs the whole buffer.
#[derive(Parser, Clone, Debug, Default)]
pub struct WholeDecodeOpts {
    #[command(flatten)]
    pub decode: DecodeOpts,

    /// Accept bytes left over after the root message
    #[arg(long)]
    pub allow_trailing: bool,
}

impl WholeDecodeOpts {
    pub fn resolve(&self, file: &DecodeConfig) -> DecodeConfig {
        let mut settings = self.decode.resolve(file);
        settings.require_exhausted &= !self.allow_trailing;
        settings
    }
}

/// One `path: value` line per leaf, values first, then strings.
pub fn render_flat(flat: &FlatMessage) -> Vec<String> {
    let values = flat
        .value_paths()
        .map(|(path, value)| format!("{path}: {value}"));
    let names = flat
        .name_paths()
        .map(|(path, name)| format!("{path}: {name}"));
    values.chain(names).collect()
}

/// Decode `buffer` as one `root_type` and render its leaves.
pub fn decode_lines(
    registry: &TypeRegistry,
    root_type: &str,
    buffer: &[u8],
    settings: &DecodeConfig,
) -> anyhow::Result<Vec<String>> {
    let decoder = FlatDecoder::new(registry).with_max_array_size(settings.max_array_size);
    let mut flat = FlatMessage::new(&settings.prefix);

    let result = if settings.require_exhausted {
        decoder.decode(root_type, &settings.prefix, buffer, &mut flat)
    } else {
        decoder.decode_at(root_type, buffer, 0, &mut flat)
    };
    let consumed = result.with_context(|| format!("Failed to decode {root_type}"))?;

    tracing::debug!(
        "Decoded {consumed} of {} bytes into {} leaves",
        buffer.len(),
        flat.leaf_count()
    );
    Ok(render_flat(&flat))
}

/// Every definition in the registry followed by its fields.
pub fn type_lines(registry: &TypeRegistry) -> Vec<String> {
    let mut lines = Vec::new();
    for definition in registry.iter() {
        lines.push(definition.name().to_string());
        for field in definition.fields() {
            match field.constant_value() {
                Some(value) => lines.push(format!(
                    "  {} {} = {value}",
                    field.field_type(),
                    field.name()
                )),
                None => lines.push(format!("  {} {}", field.field_type(), field.name())),
            }
        }
    }
    lines
}

/// Render every `target` sub-structure inside `buffer`.
///
/// The buffer must hold exactly one `root_type`; `settings.require_exhausted`
/// is not consulted.
pub fn extract_lines(
    registry: &TypeRegistry,
    root_type: &str,
    target: &str,
    buffer: &[u8],
    settings: &DecodeConfig,
) -> anyhow::Result<Vec<String>> {
    let decoder = FlatDecoder::new(registry).with_max_array_size(settings.max_array_size);
    let found = extract_flat(&decoder, root_type, target, &settings.prefix, buffer)
        .with_context(|| format!("Failed to extract {target} from {root_type}"))?;
    Ok(found.iter().flat_map(render_flat).collect())
}
