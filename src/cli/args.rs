//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::{ClassifierRule, Layout};

/// Convert hierarchical club/branch code sheets between indented CSV and nested JSON
#[derive(Parser, Debug)]
#[command(name = "clubcodes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: ./.clubcodes.toml if present)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Column layout: v1, v2 (composite branch codes) or v3 (label before code)
    #[arg(long, global = true)]
    pub layout: Option<Layout>,

    /// Classification rule: a (blank first cell) or b (blank first cell or empty code cell)
    #[arg(long, global = true)]
    pub rule: Option<ClassifierRule>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert files: .csv -> "[date] name.json", .json -> name.csv
    Convert {
        /// Input files, processed one after another
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
        /// Output directory (default: next to each input)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        out_dir: Option<PathBuf>,
    },

    /// Fetch the published sheet configured in [remote] and convert it
    Fetch {
        /// Project a wide multi-language sheet
        #[arg(long, conflicts_with = "flat")]
        lang: bool,
        /// Write unindented CSV with composite codes
        #[arg(long)]
        flat: bool,
        /// Output directory (default: cwd)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        out_dir: Option<PathBuf>,
        /// Print the converted result to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Print the URL that fetch would request
    Link,

    /// Project a wide multi-language CSV to JSON on stdout
    Lang {
        /// CSV file with a `{lang}-{field}` header row
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print indented CSV as unindented CSV with composite codes
    Flatten {
        /// Indented CSV file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show a CSV or JSON file as a tree
    Show {
        /// CSV or JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config instead of ./.clubcodes.toml
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
