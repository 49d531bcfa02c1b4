//! NeoPrompt - random tag directives for image generation prompts
//!
//! Prompts may embed directives such as `@2$$char:hair@`, which pick two
//! random tags from the `hair` pool of the `char` namespace. Tags come from
//! YAML files managed by the [`tagstore`] crate. Picked tags may contain
//! directives themselves; expansion repeats for a bounded number of rounds.
//!
//! # Modules
//!
//! - [`directive`] - Directive syntax and scanning
//! - [`expander`] - Round-based expansion of prompts and channel batches
//! - [`channel`] - The four prompt channels of a generation request
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//! - [`repl`] - Interactive session

pub mod channel;
pub mod cli;
pub mod config;
pub mod directive;
pub mod expander;
pub mod repl;

// Re-export commonly used types
pub use channel::{BatchReport, ChannelKind, PromptBatch, PromptChannel};
pub use config::{Config, ExpansionConfig, TagsConfig};
pub use directive::{CountError, CountSpec, Directive};
pub use expander::{DEFAULT_MAX_ROUNDS, Expander, ExpanderOptions, Expansion, TAG_SEPARATOR};
pub use repl::ReplSession;
pub use tagstore::{
    LoadError, LoadOptions, LoadReport, Picker, RandomPicker, ResolveError, ScriptedPicker, TagLibrary, TagNode,
    TagStore,
};
