//! Prompt Expander
//!
//! Rewrites directives into picked tags. A resolved tag may itself contain
//! directives, so expansion runs in rounds: each round substitutes every
//! directive found in the text as it stood when the round began. The round
//! bound is the only guard against tags that refer back to themselves.

use std::sync::Arc;

use tagstore::{Picker, RandomPicker, TagStore};
use tracing::{debug, warn};

use crate::channel::{BatchReport, ChannelKind, PromptBatch};
use crate::directive::{self, Directive};

/// Rounds allowed before giving up on nested directives
pub const DEFAULT_MAX_ROUNDS: usize = 10;

/// Separator placed between picked tags
pub const TAG_SEPARATOR: &str = ", ";

/// Options controlling expansion
#[derive(Debug, Clone)]
pub struct ExpanderOptions {
    /// Maximum number of rounds per prompt
    pub max_rounds: usize,
    /// Keep the unexpanded text of rewritten channels in the batch report
    pub record_originals: bool,
}

impl Default for ExpanderOptions {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            record_originals: false,
        }
    }
}

/// Result of expanding one prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub text: String,
    /// At least one directive was substituted
    pub changed: bool,
    /// Rounds that substituted something
    pub rounds: usize,
    /// The round bound ran out while directives remained
    pub bound_reached: bool,
}

impl Expansion {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            changed: false,
            rounds: 0,
            bound_reached: false,
        }
    }
}

/// Expands directives against a snapshot of the tag store
pub struct Expander<P: Picker = RandomPicker> {
    store: Arc<TagStore>,
    picker: P,
    options: ExpanderOptions,
}

impl<P: Picker> Expander<P> {
    pub fn new(store: Arc<TagStore>, picker: P, options: ExpanderOptions) -> Self {
        debug!(namespaces = store.len(), ?options, "Expander::new: called");
        Self { store, picker, options }
    }

    /// Switch to a newer store snapshot, e.g. after a reload
    pub fn set_store(&mut self, store: Arc<TagStore>) {
        debug!(namespaces = store.len(), "Expander::set_store: called");
        self.store = store;
    }

    pub fn store(&self) -> &TagStore {
        &self.store
    }

    pub fn options(&self) -> &ExpanderOptions {
        &self.options
    }

    /// Expand every directive in `prompt`
    ///
    /// Never fails: unresolvable directives collapse to empty text, and text
    /// left over when the round bound runs out is returned as is.
    pub fn expand_one(&mut self, prompt: &str) -> Expansion {
        if !directive::has_marker(prompt) {
            return Expansion::unchanged(prompt);
        }
        debug!(prompt_len = prompt.len(), "Expander::expand_one: called");

        let mut text = prompt.to_string();
        let mut rounds = 0;
        while rounds < self.options.max_rounds {
            if !directive::has_marker(&text) {
                break;
            }
            let found = directive::scan(&text);
            if found.is_empty() {
                break;
            }

            rounds += 1;
            debug!(round = rounds, directives = found.len(), "Expander::expand_one: round");
            for d in &found {
                let replacement = self.resolve(d);
                text = text.replacen(&d.raw, &replacement, 1);
            }
        }

        let bound_reached = rounds >= self.options.max_rounds && !directive::scan(&text).is_empty();
        if bound_reached {
            warn!(
                max_rounds = self.options.max_rounds,
                "Directive expansion hit the round limit, leaving the rest unexpanded"
            );
        }

        Expansion {
            text,
            changed: rounds > 0,
            rounds,
            bound_reached,
        }
    }

    /// Replacement text for one directive
    fn resolve(&mut self, d: &Directive) -> String {
        let spec = d.count_spec();
        let count = self.picker.pick_count(spec.min, spec.max);
        match self.store.resolve(&d.path, count, &mut self.picker) {
            Ok(tags) => {
                debug!(raw = %d.raw, %count, ?tags, "Expander::resolve: picked tags");
                tags.join(TAG_SEPARATOR)
            }
            Err(e) => {
                warn!(raw = %d.raw, error = %e, "Dropping unresolvable directive");
                String::new()
            }
        }
    }

    /// Expand every channel of a batch in place
    ///
    /// A channel is only touched when at least one of its prompts changed;
    /// then all its prompts are replaced and `current` follows the first one.
    pub fn expand_batch(&mut self, batch: &mut PromptBatch) -> BatchReport {
        debug!("Expander::expand_batch: called");
        let mut report = BatchReport::default();

        for kind in ChannelKind::ALL {
            let Some(channel) = batch.get_mut(kind) else {
                continue;
            };

            let mut changed = false;
            let expanded: Vec<String> = channel
                .prompts
                .iter()
                .map(|prompt| {
                    let expansion = self.expand_one(prompt);
                    changed |= expansion.changed;
                    expansion.text
                })
                .collect();

            if changed {
                debug!(%kind, "Expander::expand_batch: channel rewritten");
                if self.options.record_originals {
                    report
                        .originals
                        .insert(kind.param_name().to_string(), channel.joined_text());
                }
                channel.current = expanded.first().cloned().unwrap_or_default();
                channel.prompts = expanded;
            }
            report.changed.insert(kind, changed);
        }

        report
    }
}
