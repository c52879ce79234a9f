use serde::{Deserialize, Serialize};
use std::fmt;

use crate::QuestionId;

/// Default number of points on a scale question whose body omits it.
pub const DEFAULT_SCALE: u8 = 5;

/// A question ready to be shown to a respondent, tagged with its section.
///
/// Created once when the question set is resolved and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerableQuestion {
    id: QuestionId,
    text: String,
    kind: QuestionKind,
    section_name: String,
    required: bool,
}

impl AnswerableQuestion {
    /// Create a new required question.
    pub fn new(
        id: impl Into<QuestionId>,
        text: impl Into<String>,
        kind: QuestionKind,
        section_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind,
            section_name: section_name.into(),
            required: true,
        }
    }

    /// Mark the question as optional or required.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Re-tag the question with another section name.
    pub fn with_section(mut self, section_name: impl Into<String>) -> Self {
        self.section_name = section_name.into();
        self
    }

    /// Get the question id.
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    /// Get the prompt text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the question kind.
    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    /// Get the display name of the owning section.
    pub fn section_name(&self) -> &str {
        &self.section_name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// The kind of question, determining how it is answered.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    /// Likert-style scale from 1 to `scale`.
    Scale(ScaleQuestion),

    /// Choose exactly one option.
    SingleChoice(ChoiceQuestion),

    /// Choose any number of options.
    MultiChoice(ChoiceQuestion),

    /// Free-text answer.
    FreeText,
}

impl QuestionKind {
    /// The fieldless tag of this kind.
    pub fn tag(&self) -> QuestionKindTag {
        match self {
            Self::Scale(_) => QuestionKindTag::Scale,
            Self::SingleChoice(_) => QuestionKindTag::SingleChoice,
            Self::MultiChoice(_) => QuestionKindTag::MultiChoice,
            Self::FreeText => QuestionKindTag::FreeText,
        }
    }

    /// The options of a choice question.
    pub fn options(&self) -> &[String] {
        match self {
            Self::SingleChoice(choice) | Self::MultiChoice(choice) => &choice.options,
            _ => &[],
        }
    }
}

/// Fieldless discriminant of `QuestionKind`, used in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKindTag {
    Scale,
    SingleChoice,
    MultiChoice,
    FreeText,
}

impl QuestionKindTag {
    /// Parse a question type string as found in stored question bodies.
    ///
    /// Returns `None` for unrecognized strings.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "likert" | "scale" | "rating" | "likert-scale" => Some(Self::Scale),
            "single-choice" | "single" | "radio" | "single-select" | "choice" => {
                Some(Self::SingleChoice)
            }
            "multiple-choice" | "multi-choice" | "multi-select" | "multiselect" | "checkbox" => {
                Some(Self::MultiChoice)
            }
            "free-text" | "text" | "open" | "open-ended" | "textarea" => Some(Self::FreeText),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scale => "scale",
            Self::SingleChoice => "single-choice",
            Self::MultiChoice => "multiple-choice",
            Self::FreeText => "free-text",
        };
        f.write_str(name)
    }
}

/// Configuration for a scale question.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleQuestion {
    /// Number of points, answers range from 1 to `scale`.
    pub scale: u8,

    /// Optional labels, one per point or just the two ends.
    pub labels: Vec<String>,
}

impl ScaleQuestion {
    /// Create a scale with the given number of points and no labels.
    pub fn new(scale: u8) -> Self {
        Self {
            scale: scale.max(2),
            labels: Vec::new(),
        }
    }

    /// Set the labels.
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// The label for a 1-based point, if one is defined.
    ///
    /// With exactly two labels they describe the lowest and highest points.
    pub fn label_for(&self, point: u8) -> Option<&str> {
        if self.labels.len() == 2 && self.scale > 2 {
            return match point {
                1 => self.labels.first().map(String::as_str),
                p if p == self.scale => self.labels.last().map(String::as_str),
                _ => None,
            };
        }
        let index = usize::from(point.checked_sub(1)?);
        self.labels.get(index).map(String::as_str)
    }
}

impl Default for ScaleQuestion {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE)
    }
}

/// Configuration for a single- or multi-choice question.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceQuestion {
    /// The options to choose from, in display order.
    pub options: Vec<String>,
}

impl ChoiceQuestion {
    /// Create a choice question with the given options.
    pub fn new(options: Vec<String>) -> Self {
        Self { options }
    }
}

/// A question record as returned by the question lookup.
///
/// Stored data is not trusted: every field except `id` may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBody {
    pub id: QuestionId,

    #[serde(default, alias = "question")]
    pub text: Option<String>,

    #[serde(default, rename = "type", alias = "questionType")]
    pub question_type: Option<String>,

    #[serde(default)]
    pub options: Option<Vec<String>>,

    #[serde(default)]
    pub scale: Option<u8>,

    #[serde(default)]
    pub labels: Option<Vec<String>>,

    #[serde(default)]
    pub required: Option<bool>,
}

impl QuestionBody {
    /// Create a body with an id and text and nothing else.
    pub fn new(id: impl Into<QuestionId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Set the stored type string.
    pub fn with_type(mut self, question_type: impl Into<String>) -> Self {
        self.question_type = Some(question_type.into());
        self
    }

    /// Set the options.
    pub fn with_options<S: Into<String>>(mut self, options: impl IntoIterator<Item = S>) -> Self {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Set the required flag.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// The parsed kind tag, or `None` if the stored type is missing or unknown.
    pub fn kind_tag(&self) -> Option<QuestionKindTag> {
        self.question_type.as_deref().and_then(QuestionKindTag::parse)
    }

    /// Whether this body can become an answerable question.
    pub fn is_usable(&self) -> bool {
        !self.id.is_blank() && self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Whether a choice body has anything to choose from.
    pub fn has_options(&self) -> bool {
        self.options
            .as_ref()
            .is_some_and(|options| options.iter().any(|o| !o.trim().is_empty()))
    }

    /// The kind this body will be built as.
    ///
    /// Missing or unknown types, and choice types without options, become
    /// free text.
    pub fn effective_kind_tag(&self) -> QuestionKindTag {
        match self.kind_tag() {
            Some(QuestionKindTag::SingleChoice | QuestionKindTag::MultiChoice)
                if !self.has_options() =>
            {
                QuestionKindTag::FreeText
            }
            Some(tag) => tag,
            None => QuestionKindTag::FreeText,
        }
    }

    /// Build the answerable question, or `None` if the body is unusable.
    ///
    /// The kind follows [`effective_kind_tag`](Self::effective_kind_tag);
    /// `required` defaults to true.
    pub fn into_question(self, section_name: impl Into<String>) -> Option<AnswerableQuestion> {
        if !self.is_usable() {
            return None;
        }
        let kind = match self.effective_kind_tag() {
            QuestionKindTag::Scale => QuestionKind::Scale(
                ScaleQuestion::new(self.scale.unwrap_or(DEFAULT_SCALE))
                    .with_labels(self.labels.unwrap_or_default()),
            ),
            QuestionKindTag::SingleChoice => {
                QuestionKind::SingleChoice(ChoiceQuestion::new(non_blank(self.options)))
            }
            QuestionKindTag::MultiChoice => {
                QuestionKind::MultiChoice(ChoiceQuestion::new(non_blank(self.options)))
            }
            QuestionKindTag::FreeText => QuestionKind::FreeText,
        };
        let text = self.text.unwrap_or_default();
        Some(
            AnswerableQuestion::new(self.id, text.trim(), kind, section_name)
                .with_required(self.required != Some(false)),
        )
    }
}

fn non_blank(options: Option<Vec<String>>) -> Vec<String> {
    options
        .unwrap_or_default()
        .into_iter()
        .filter(|option| !option.trim().is_empty())
        .collect()
}
