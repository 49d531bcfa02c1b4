//! TagStore - namespaced tag trees for randomized prompt building
//!
//! Loads YAML tag files from one or more directories. Each file becomes a
//! namespace named after its file stem, and any node in it can be addressed
//! with a colon separated tag path.
//!
//! # Layout
//!
//! ```text
//! tags/
//! ├── color.yml          # namespace "color"
//! └── people/
//!     └── char.yml       # namespace "char", e.g. path "char:hair:long"
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tagstore::{LoadOptions, RandomPicker, TagLibrary};
//!
//! let (library, _report) = TagLibrary::open(vec!["tags".into()], LoadOptions::default())?;
//! let store = library.snapshot();
//! let mut picker = RandomPicker::seeded(42);
//! let tags = store.resolve("char:hair", 2, &mut picker)?;
//! ```

mod error;
mod library;
mod node;
mod pick;
mod store;

pub use error::{LoadError, ResolveError};
pub use library::TagLibrary;
pub use node::TagNode;
pub use pick::{Picker, RandomPicker, ScriptedPicker};
pub use store::{LoadOptions, LoadReport, PATH_SEPARATOR, TagStore};

/// Tag file extensions scanned when none are configured
pub const DEFAULT_EXTENSIONS: &[&str] = &["yml"];
