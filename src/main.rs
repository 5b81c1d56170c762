//! Command-line interface for ros-introspect
//!
//! # Usage Examples
//!
//! ```bash
//! # Print every leaf of a recorded JointState
//! ros-introspect decode \
//!   --schema joint_state.msg --type sensor_msgs/JointState \
//!   --input joint_state.bin --prefix JointState
//!
//! # Same, emitting arrays of up to 5000 elements, settings from a file
//! ROS_INTROSPECT_MAX_ARRAY_SIZE=5000 ros-introspect --config introspect.toml decode \
//!   --schema scan.msg --type sensor_msgs/LaserScan --input scan.bin
//!
//! # Show the parsed definitions
//! ros-introspect types --schema joint_state.msg --type sensor_msgs/JointState
//!
//! # Print only the headers
//! ros-introspect extract \
//!   --schema joint_state.msg --type sensor_msgs/JointState \
//!   --input joint_state.bin --target std_msgs/Header
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use ros_introspect::{
    decode_lines, extract_lines, type_lines, Config, DecodeOpts, LoggingConfig, SchemaOpts,
    WholeDecodeOpts,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ros-introspect")]
#[command(about = "Decode ROS messages at runtime from their text definitions")]
#[command(long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten one encoded message into `path: value` lines
    Decode {
        #[command(flatten)]
        schema: SchemaOpts,

        /// File holding one encoded message
        #[arg(long, value_name = "PATH")]
        input: PathBuf,

        #[command(flatten)]
        decode: WholeDecodeOpts,
    },

    /// List the definitions parsed from a schema file
    Types {
        #[command(flatten)]
        schema: SchemaOpts,
    },

    /// Print every sub-structure of one type found inside a message
    Extract {
        #[command(flatten)]
        schema: SchemaOpts,

        /// File holding one encoded message
        #[arg(long, value_name = "PATH")]
        input: PathBuf,

        /// Qualified name of the type to pull out (e.g. std_msgs/Header)
        #[arg(long, value_name = "TYPE")]
        target: String,

        #[command(flatten)]
        decode: DecodeOpts,
    },
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match &logging.filter {
        Some(directives) => tracing_subscriber::EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid log filter '{directives}'"))?,
        None => tracing_subscriber::EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read input file {path:?}"))
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    let lines = match cli.command {
        Commands::Decode {
            schema,
            input,
            decode,
        } => {
            let registry = schema.load_registry()?;
            let buffer = read_input(&input)?;
            let settings = decode.resolve(&config.decode);
            decode_lines(&registry, &schema.root_type, &buffer, &settings)?
        }
        Commands::Types { schema } => type_lines(&schema.load_registry()?),
        Commands::Extract {
            schema,
            input,
            target,
            decode,
        } => {
            let registry = schema.load_registry()?;
            let buffer = read_input(&input)?;
            let settings = decode.resolve(&config.decode);
            extract_lines(&registry, &schema.root_type, &target, &buffer, &settings)?
        }
    };

    for line in lines {
        println!("{line}");
    }
    Ok(())
}
