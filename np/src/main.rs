//! NeoPrompt - CLI entry point
//!
//! Loads tag files and expands prompt directives from arguments, stdin,
//! batch files or an interactive session.

use std::fs;
use std::io;
use std::path::Path;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use neoprompt::cli::{Cli, Command, OutputFormat};
use neoprompt::config::Config;
use neoprompt::{BatchReport, Expander, PromptBatch, RandomPicker, ReplSession, TagLibrary, directive};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Determine log level with priority: CLI --log-level > config file > default (WARN)
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", s);
                tracing::Level::WARN
            }
        },
        None => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

/// Batch file contents after expansion, plus what changed
#[derive(Serialize)]
struct BatchOutput {
    prompts: PromptBatch,
    report: BatchReport,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate()?;
    if cli.seed.is_some() {
        config.expansion.seed = cli.seed;
    }

    let dirs = if cli.tags.is_empty() {
        config.tags.expanded_paths()
    } else {
        cli.tags.clone()
    };
    let (library, report) =
        TagLibrary::open(dirs, config.tags.load_options()).context("Failed to load tag files")?;
    info!(
        files = report.loaded.len(),
        failures = report.failures.len(),
        "neoprompt starting"
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Expand {
            prompts,
            show_original,
        } => cmd_expand(&library, &config, prompts, show_original),
        Command::Batch { file, format } => cmd_batch(&library, &config, &file, format),
        Command::Paths { prefix } => cmd_paths(&library, prefix.as_deref()),
        Command::Files => cmd_files(&library),
        Command::Show { path } => cmd_show(&library, &path),
        Command::Repl => {
            let expander = new_expander(&library, &config);
            ReplSession::new(library, expander).run()
        }
    }
}

fn new_expander(library: &TagLibrary, config: &Config) -> Expander {
    let picker = match config.expansion.seed {
        Some(seed) => RandomPicker::seeded(seed),
        None => RandomPicker::from_os(),
    };
    Expander::new(library.snapshot(), picker, config.expansion.options())
}

fn cmd_expand(library: &TagLibrary, config: &Config, prompts: Vec<String>, show_original: bool) -> Result<()> {
    let prompts = if prompts.is_empty() {
        io::stdin()
            .lines()
            .collect::<io::Result<Vec<String>>>()
            .context("Failed to read prompts from stdin")?
    } else {
        prompts
    };

    let mut expander = new_expander(library, config);
    for prompt in prompts {
        let expansion = expander.expand_one(&prompt);
        if show_original && expansion.changed {
            println!("{} {}", "#".dimmed(), prompt.dimmed());
        }
        println!("{}", expansion.text);
    }
    Ok(())
}

fn cmd_batch(library: &TagLibrary, config: &Config, file: &Path, format: OutputFormat) -> Result<()> {
    let content = fs::read_to_string(file).context(format!("Failed to read batch file: {}", file.display()))?;
    let mut prompts: PromptBatch =
        serde_yaml::from_str(&content).context(format!("Failed to parse batch file: {}", file.display()))?;

    let report = new_expander(library, config).expand_batch(&mut prompts);
    let output = BatchOutput { prompts, report };

    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&output)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
    }
    Ok(())
}

fn cmd_paths(library: &TagLibrary, prefix: Option<&str>) -> Result<()> {
    let store = library.snapshot();
    let paths = store.group_paths();
    if paths.is_empty() {
        println!("No tag groups found");
        return Ok(());
    }
    for path in paths {
        if prefix.is_none_or(|p| path.starts_with(p)) {
            println!("{}", directive::render(&path, None));
        }
    }
    Ok(())
}

fn cmd_files(library: &TagLibrary) -> Result<()> {
    let store = library.snapshot();
    let files = store.files();
    if files.is_empty() {
        let searched: Vec<String> = library.dirs().iter().map(|d| d.display().to_string()).collect();
        println!("No tag files found in: {}", searched.join(", "));
        return Ok(());
    }
    for file in files {
        println!("{}", file.display());
    }
    Ok(())
}

fn cmd_show(library: &TagLibrary, path: &str) -> Result<()> {
    let store = library.snapshot();
    let node = store.lookup(path)?;
    print!("{}", serde_yaml::to_string(node)?);
    Ok(())
}
