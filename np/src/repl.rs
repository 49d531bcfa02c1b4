//! Interactive expansion session

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tagstore::{Picker, TagLibrary};
use tracing::debug;

use crate::expander::Expander;

/// What the main loop should do after a slash command
#[derive(Debug, PartialEq, Eq)]
enum SlashResult {
    Continue,
    Quit,
}

/// Interactive REPL over a tag library
pub struct ReplSession<P: Picker> {
    library: TagLibrary,
    expander: Expander<P>,
}

impl<P: Picker> ReplSession<P> {
    pub fn new(library: TagLibrary, expander: Expander<P>) -> Self {
        Self { library, expander }
    }

    /// Run the REPL main loop
    pub fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            match rl.readline(&format!("{} ", ">".bright_green())) {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input) {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        println!("{}", self.expand_line(input));
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!(
            "{} {} namespaces loaded. Type a prompt, or /help.",
            "neoprompt".bright_cyan().bold(),
            self.expander.store().len()
        );
    }

    fn expand_line(&mut self, input: &str) -> String {
        let expansion = self.expander.expand_one(input);
        if expansion.bound_reached {
            format!("{} {}", expansion.text, "(round limit reached)".yellow())
        } else {
            expansion.text
        }
    }

    fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        debug!(%input, "ReplSession::handle_slash_command: called");
        let mut parts = input.splitn(2, ' ');
        let command = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim);

        match command {
            "/quit" | "/exit" => SlashResult::Quit,
            "/reload" => {
                self.reload();
                SlashResult::Continue
            }
            "/paths" => {
                for path in self.expander.store().group_paths() {
                    if arg.is_none_or(|prefix| path.starts_with(prefix)) {
                        println!("{}", path);
                    }
                }
                SlashResult::Continue
            }
            "/help" => {
                println!("  /reload          re-read tag files");
                println!("  /paths [PREFIX]  list pickable tag paths");
                println!("  /quit            leave");
                SlashResult::Continue
            }
            _ => {
                println!("{} unknown command {}", "✗".red(), command);
                SlashResult::Continue
            }
        }
    }

    fn reload(&mut self) {
        match self.library.reload() {
            Ok(report) => {
                self.expander.set_store(self.library.snapshot());
                println!(
                    "{} Reloaded {} tag files ({} failed)",
                    "✓".green(),
                    report.loaded.len(),
                    report.failures.len()
                );
                for failure in &report.failures {
                    println!("  {} {}", "✗".red(), failure);
                }
            }
            Err(e) => println!("{} Reload failed: {}", "✗".red(), e),
        }
    }
}
