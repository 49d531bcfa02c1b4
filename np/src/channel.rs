//! Prompt channels handed over by the host for one generation request

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four prompt roles of a generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelKind {
    Primary,
    Negative,
    HiresPrimary,
    HiresNegative,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 4] = [
        ChannelKind::Primary,
        ChannelKind::Negative,
        ChannelKind::HiresPrimary,
        ChannelKind::HiresNegative,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Negative => "negative",
            Self::HiresPrimary => "hires-primary",
            Self::HiresNegative => "hires-negative",
        }
    }

    /// Generation parameter name under which the unexpanded text is recorded
    pub fn param_name(&self) -> &'static str {
        match self {
            Self::Primary => "Original Prompt",
            Self::Negative => "Original Negative Prompt",
            Self::HiresPrimary => "Original Prompt (Hires)",
            Self::HiresNegative => "Original Negative Prompt (Hires)",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_lowercase();
        ChannelKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| {
                format!(
                    "Unknown channel: {}. Use: primary, negative, hires-primary, or hires-negative",
                    s
                )
            })
    }
}

/// Prompts of one channel, one per generation slot
///
/// `current` mirrors the first slot and is only rewritten together with
/// `prompts`. In files a channel is just a list of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct PromptChannel {
    pub prompts: Vec<String>,
    pub current: String,
}

impl PromptChannel {
    pub fn new(prompts: Vec<String>) -> Self {
        let current = prompts.first().cloned().unwrap_or_default();
        Self { prompts, current }
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// The prompts as one line, as recorded in generation parameters
    pub fn joined_text(&self) -> String {
        self.prompts.join(" ").replace('\n', " ")
    }
}

impl From<Vec<String>> for PromptChannel {
    fn from(prompts: Vec<String>) -> Self {
        Self::new(prompts)
    }
}

impl From<PromptChannel> for Vec<String> {
    fn from(channel: PromptChannel) -> Self {
        channel.prompts
    }
}

/// Up to four channels of one generation request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PromptBatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<PromptChannel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative: Option<PromptChannel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hires_primary: Option<PromptChannel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hires_negative: Option<PromptChannel>,
}

impl PromptBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style setter
    pub fn with(mut self, kind: ChannelKind, prompts: Vec<String>) -> Self {
        *self.slot_mut(kind) = Some(PromptChannel::new(prompts));
        self
    }

    pub fn get(&self, kind: ChannelKind) -> Option<&PromptChannel> {
        match kind {
            ChannelKind::Primary => self.primary.as_ref(),
            ChannelKind::Negative => self.negative.as_ref(),
            ChannelKind::HiresPrimary => self.hires_primary.as_ref(),
            ChannelKind::HiresNegative => self.hires_negative.as_ref(),
        }
    }

    pub fn get_mut(&mut self, kind: ChannelKind) -> Option<&mut PromptChannel> {
        self.slot_mut(kind).as_mut()
    }

    fn slot_mut(&mut self, kind: ChannelKind) -> &mut Option<PromptChannel> {
        match kind {
            ChannelKind::Primary => &mut self.primary,
            ChannelKind::Negative => &mut self.negative,
            ChannelKind::HiresPrimary => &mut self.hires_primary,
            ChannelKind::HiresNegative => &mut self.hires_negative,
        }
    }
}

/// Outcome of expanding a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BatchReport {
    /// Whether each supplied channel was rewritten
    pub changed: BTreeMap<ChannelKind, bool>,
    /// Unexpanded text of rewritten channels, keyed by generation parameter name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub originals: BTreeMap<String, String>,
}

impl BatchReport {
    pub fn is_changed(&self, kind: ChannelKind) -> bool {
        self.changed.get(&kind).copied().unwrap_or(false)
    }

    pub fn any_changed(&self) -> bool {
        self.changed.values().any(|&c| c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_kind_names_round_trip() {
        for kind in ChannelKind::ALL {
            assert_eq!(kind.name().parse::<ChannelKind>(), Ok(kind));
        }
        assert_eq!("HIRES-Negative".parse::<ChannelKind>(), Ok(ChannelKind::HiresNegative));
        assert!("hires".parse::<ChannelKind>().is_err());
    }

    #[test]
    fn test_param_names() {
        assert_eq!(ChannelKind::Primary.param_name(), "Original Prompt");
        assert_eq!(
            ChannelKind::HiresNegative.param_name(),
            "Original Negative Prompt (Hires)"
        );
    }

    #[test]
    fn test_channel_current_mirrors_first_slot() {
        let channel = PromptChannel::new(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(channel.current, "first");
        assert_eq!(PromptChannel::new(Vec::new()).current, "");
    }

    #[test]
    fn test_joined_text_flattens_newlines() {
        let channel = PromptChannel::new(vec!["a\nb".to_string(), "c".to_string()]);
        assert_eq!(channel.joined_text(), "a b c");
    }

    #[test]
    fn test_batch_from_yaml() {
        let yaml = r#"
primary:
  - "a @color@ car"
  - "a red car"
hires-negative:
  - blurry
"#;
        let batch: PromptBatch = serde_yaml::from_str(yaml).unwrap();

        let primary = batch.get(ChannelKind::Primary).unwrap();
        assert_eq!(primary.prompts.len(), 2);
        assert_eq!(primary.current, "a @color@ car");
        assert!(batch.get(ChannelKind::Negative).is_none());
        assert_eq!(batch.get(ChannelKind::HiresNegative).unwrap().current, "blurry");
    }

    #[test]
    fn test_batch_rejects_unknown_channel() {
        let result = serde_yaml::from_str::<PromptBatch>("positive: [x]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_batch_serializes_lists_only() {
        let batch = PromptBatch::new().with(ChannelKind::Negative, vec!["lowres".to_string()]);
        let yaml = serde_yaml::to_string(&batch).unwrap();
        assert_eq!(yaml, "negative:\n- lowres\n");
    }

    #[test]
    fn test_report_flags() {
        let mut report = BatchReport::default();
        report.changed.insert(ChannelKind::Primary, false);
        assert!(!report.any_changed());
        report.changed.insert(ChannelKind::Negative, true);
        assert!(report.any_changed());
        assert!(report.is_changed(ChannelKind::Negative));
        assert!(!report.is_changed(ChannelKind::HiresPrimary));
    }
}
