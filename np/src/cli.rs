//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// NeoPrompt - random tag directives for image generation prompts
#[derive(Parser, Debug)]
#[command(
    name = "np",
    author,
    version,
    about = "Expand @tag:path@ directives in prompts using YAML tag files",
    after_help = "Directive syntax: @path@ (one tag), @N$$path@ (N tags), @MIN-MAX$$path@ (random count)"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Fixed random seed
    #[arg(short, long, global = true)]
    pub seed: Option<u64>,

    /// Tag directory, repeatable; replaces the configured paths
    #[arg(short, long = "tags", value_name = "DIR", global = true)]
    pub tags: Vec<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Expand prompts given as arguments, or one per stdin line
    Expand {
        /// Prompts to expand
        prompts: Vec<String>,

        /// Also print the unexpanded prompt
        #[arg(long)]
        show_original: bool,
    },

    /// Expand a YAML batch of prompt channels
    Batch {
        /// Batch file with primary/negative/hires-primary/hires-negative lists
        #[arg(required = true)]
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "yaml")]
        format: OutputFormat,
    },

    /// List tag paths that can be used as directives
    Paths {
        /// Only list paths starting with this prefix
        prefix: Option<String>,
    },

    /// List loaded tag files
    Files,

    /// Print the tag tree at a path
    Show {
        /// Tag path, e.g. char:hair
        #[arg(required = true)]
        path: String,
    },

    /// Interactive expansion; /reload re-reads tag files
    Repl,
}

/// Output format for batch results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: yaml or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
        }
    }
}
