//! # Canvas CLI Module
//!
//! This module implements the CLI interface for the canvas engine.
//!
//! Every editing command loads a canvas file, applies one builder edit,
//! resolves references and writes the result back (or to `--output`).
//!
//! ## Available Commands
//!
//! - `new` - Create a canvas from a type, operator or order template
//! - `show` - Print a canvas as an indented tree
//! - `convert` - Convert the node at a path to another type
//! - `replace` - Replace the node at a path with another canvas
//! - `reset` - Reset the node at a path to its type's default
//! - `visible` - Show or hide the node at a path
//! - `read-only` - Lock or unlock the node at a path
//! - `meta` - Set or delete meta-data on the node at a path
//! - `resolve` - Bring reference types in line with their referents
//! - `encode` - Pack canvases into clipboard bytes
//! - `decode` - Unpack clipboard bytes into a canvas
//! - `path` - Relative path between two nodes

mod commands;

use crate::config::{Config, DEFAULT_CONFIG_FILE};
use canvas_core::{CanvasError, CanvasPath};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Canvas - expression-tree editor
///
/// Builds, edits and inspects canvas files from the command line.
#[derive(Parser, Debug)]
#[command(name = "canvas")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Path to the configuration file
    #[arg(short = 'C', long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Location of the node an edit applies to.
#[derive(clap::Args, Debug, Clone)]
pub struct Target {
    /// Canvas file to edit
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path of the node to edit, from the root (empty for the root itself)
    #[arg(short, long, default_value = "")]
    pub path: CanvasPath,

    /// Where to write the result (defaults to the input file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new canvas
    New {
        /// Type name, operator name or order template
        what: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show a canvas
    Show {
        /// Canvas file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Convert a node to another type
    Convert {
        #[command(flatten)]
        target: Target,

        /// Type name to convert to
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// Fall back to the type's default node when no conversion exists
        #[arg(short, long)]
        force: bool,
    },

    /// Replace a node with the root of another canvas
    Replace {
        #[command(flatten)]
        target: Target,

        /// Canvas file holding the replacement
        #[arg(short, long)]
        source: PathBuf,
    },

    /// Reset a node to its type's default
    Reset {
        #[command(flatten)]
        target: Target,
    },

    /// Show or hide a node
    Visible {
        #[command(flatten)]
        target: Target,

        /// New visibility
        #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
        value: bool,
    },

    /// Lock or unlock a node
    ReadOnly {
        #[command(flatten)]
        target: Target,

        /// New read-only flag
        #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
        value: bool,
    },

    /// Set or delete a meta-data entry
    Meta {
        #[command(flatten)]
        target: Target,

        /// Meta-data key
        #[arg(short, long)]
        key: String,

        /// Text to store under the key
        #[arg(long, conflicts_with = "delete", required_unless_present = "delete")]
        value: Option<String>,

        /// Delete the entry instead
        #[arg(short, long)]
        delete: bool,
    },

    /// Resolve references
    Resolve {
        /// Canvas file
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the result (defaults to the input file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Pack canvases into clipboard bytes
    Encode {
        /// Canvas files, in clipboard order
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Unpack one node of clipboard bytes into a canvas
    Decode {
        /// Clipboard bytes file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Which node of the clipboard to unpack
        #[arg(long, default_value = "0")]
        index: usize,
    },

    /// Print the relative path from one node to another
    Path {
        /// Canvas file
        #[arg(short, long)]
        input: PathBuf,

        /// Path of the source node, from the root
        #[arg(long)]
        from: CanvasPath,

        /// Path of the destination node, from the root
        #[arg(long)]
        to: CanvasPath,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), CanvasError> {
    let config = Config::load(&cli.config)?;
    if cli.verbose {
        tracing::info!("Using config {:?}: {:?}", cli.config, config);
    }
    let output = Output {
        json_mode: cli.json_mode,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::New { what, output: path } => cmd_new(&config, output, &what, &path),
        Commands::Show { input } => cmd_show(&config, output, &input),
        Commands::Convert {
            target,
            type_name,
            force,
        } => cmd_convert(&config, output, &target, &type_name, force),
        Commands::Replace { target, source } => cmd_replace(&config, output, &target, &source),
        Commands::Reset { target } => cmd_reset(&config, output, &target),
        Commands::Visible { target, value } => cmd_visible(&config, output, &target, value),
        Commands::ReadOnly { target, value } => cmd_read_only(&config, output, &target, value),
        Commands::Meta {
            target,
            key,
            value,
            delete,
        } => cmd_meta(&config, output, &target, &key, value.as_deref(), delete),
        Commands::Resolve { input, output: path } => {
            cmd_resolve(&config, output, &input, path.as_deref())
        }
        Commands::Encode { input, output: path } => cmd_encode(&config, output, &input, &path),
        Commands::Decode {
            input,
            output: path,
            index,
        } => cmd_decode(&config, output, &input, &path, index),
        Commands::Path { input, from, to } => cmd_path(&config, output, &input, &from, &to),
    }
}
