//! Directive scanning
//!
//! A directive asks for random tags from a tag path:
//!
//! ```text
//! @char:hair@           one pick
//! @3$$char:hair@        three picks
//! @1-3$$char:hair@      between one and three picks
//! ```
//!
//! The tag path may not contain `>`. The count part ends at the first `$$`
//! and may not contain `@`, `$` or `>`.

use std::fmt;
use std::num::IntErrorKind;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Character that opens and closes a directive
pub const MARKER: char = '@';

static DIRECTIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(?:(?P<count>[^@$>]*?)\$\$)?(?P<path>[^>]+?)@").expect("Invalid directive regex")
});

/// Errors parsing the count part of a directive
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountError {
    #[error("Empty pick count")]
    Empty,

    #[error("Malformed pick count '{0}': expected N or MIN-MAX")]
    Malformed(String),
}

/// Inclusive range of how many tags to pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSpec {
    pub min: usize,
    pub max: usize,
}

impl CountSpec {
    /// A single pick, used when the count is omitted or malformed
    pub const ONE: CountSpec = CountSpec { min: 1, max: 1 };

    pub fn exactly(n: usize) -> Self {
        Self { min: n, max: n }
    }

    /// Parse `N` or `MIN-MAX`; reversed bounds are swapped
    pub fn parse(s: &str) -> Result<Self, CountError> {
        if s.is_empty() {
            return Err(CountError::Empty);
        }
        let malformed = || CountError::Malformed(s.to_string());
        let number = |part: &str| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            match part.parse::<usize>() {
                Ok(n) => Ok(n),
                Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(usize::MAX),
                Err(_) => Err(malformed()),
            }
        };

        match s.split_once('-') {
            Some((a, b)) => {
                let (a, b) = (number(a)?, number(b)?);
                Ok(Self {
                    min: a.min(b),
                    max: a.max(b),
                })
            }
            None => number(s).map(Self::exactly),
        }
    }
}

impl fmt::Display for CountSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// One directive found in a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// The exact matched text, markers included
    pub raw: String,
    /// Parsed count, `None` when the count part was omitted
    pub count: Option<Result<CountSpec, CountError>>,
    /// Colon separated tag path
    pub path: String,
}

impl Directive {
    /// The pick range to use, falling back to a single pick
    pub fn count_spec(&self) -> CountSpec {
        match &self.count {
            Some(Ok(spec)) => *spec,
            Some(Err(e)) => {
                debug!(raw = %self.raw, error = %e, "Directive::count_spec: falling back to one pick");
                CountSpec::ONE
            }
            None => CountSpec::ONE,
        }
    }
}

/// Whether `text` could contain a directive at all
pub fn has_marker(text: &str) -> bool {
    text.contains(MARKER)
}

/// All non-overlapping directives in `text`, left to right
pub fn scan(text: &str) -> Vec<Directive> {
    DIRECTIVE_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let raw = caps.get(0)?.as_str().to_string();
            let path = caps.name("path")?.as_str().to_string();
            let count = caps.name("count").map(|m| CountSpec::parse(m.as_str()));
            Some(Directive { raw, count, path })
        })
        .collect()
}

/// Format a directive for the given path and count
pub fn render(path: &str, count: Option<CountSpec>) -> String {
    match count {
        Some(spec) => format!("{MARKER}{spec}$${path}{MARKER}"),
        None => format!("{MARKER}{path}{MARKER}"),
    }
}
