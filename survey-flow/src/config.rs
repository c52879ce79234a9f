//! Flow configuration.
//!
//! ```toml
//! section-framing = true
//! skippable-kinds = ["free-text"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use survey_flow_types::{AnswerableQuestion, QuestionKindTag};

/// Error type for loading a `FlowConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read flow configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid flow configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Tunables of the flow state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FlowConfig {
    /// Show a section screen before the first question of every section.
    pub section_framing: bool,

    /// Question kinds that offer a skip action even when required.
    pub skippable_kinds: Vec<QuestionKindTag>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            section_framing: true,
            skippable_kinds: Vec::new(),
        }
    }
}

impl FlowConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable section screens.
    pub fn with_section_framing(mut self, enabled: bool) -> Self {
        self.section_framing = enabled;
        self
    }

    /// Offer skip for every question of this kind.
    pub fn with_skippable_kind(mut self, kind: QuestionKindTag) -> Self {
        if !self.skippable_kinds.contains(&kind) {
            self.skippable_kinds.push(kind);
        }
        self
    }

    /// Whether the respondent may skip this question.
    pub fn allows_skip(&self, question: &AnswerableQuestion) -> bool {
        !question.is_required() || self.skippable_kinds.contains(&question.kind().tag())
    }

    /// Parse a configuration from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML configuration file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_flow_types::QuestionKind;

    #[test]
    fn defaults() {
        let config = FlowConfig::default();
        assert!(config.section_framing);
        assert!(config.skippable_kinds.is_empty());
    }

    #[test]
    fn parses_toml() {
        let config = FlowConfig::from_toml_str(
            "section-framing = false\nskippable-kinds = [\"free-text\", \"multi-choice\"]\n",
        )
        .unwrap();

        assert!(!config.section_framing);
        assert_eq!(
            config.skippable_kinds,
            vec![QuestionKindTag::FreeText, QuestionKindTag::MultiChoice]
        );
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(FlowConfig::from_toml_str("").unwrap(), FlowConfig::default());
    }

    #[test]
    fn rejects_unknown_kind() {
        let result = FlowConfig::from_toml_str("skippable-kinds = [\"hologram\"]");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn skip_rules() {
        let required = AnswerableQuestion::new("q1", "Why?", QuestionKind::FreeText, "S");
        let optional = required.clone().with_required(false);

        assert!(!FlowConfig::default().allows_skip(&required));
        assert!(FlowConfig::default().allows_skip(&optional));
        assert!(
            FlowConfig::default()
                .with_skippable_kind(QuestionKindTag::FreeText)
                .allows_skip(&required)
        );
    }
}
