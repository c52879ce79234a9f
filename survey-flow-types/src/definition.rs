use serde::{Deserialize, Serialize};

use crate::QuestionId;

/// The survey a respondent is taking, with presentation metadata and
/// references into the question bank.
///
/// Loaded once per session and never mutated while the session lasts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDefinition {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub logo: Option<String>,

    #[serde(default)]
    pub featured_image: Option<String>,

    #[serde(default)]
    pub accent_color: Option<String>,

    /// Optional message shown on the welcome screen.
    #[serde(default)]
    pub welcome_message: Option<String>,

    /// Optional message shown once the survey is complete.
    #[serde(default)]
    pub thank_you_message: Option<String>,

    #[serde(default)]
    pub question_references: QuestionReferences,

    /// Section records referenced by the sectioned reference shape.
    #[serde(default)]
    pub sections: Vec<SectionRecord>,

    /// Extra references always placed in the site-specific section.
    #[serde(default)]
    pub site_specific_question_references: Vec<QuestionRef>,
}

impl SurveyDefinition {
    /// Create a definition with no questions.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the welcome message.
    pub fn with_welcome_message(mut self, message: impl Into<String>) -> Self {
        self.welcome_message = Some(message.into());
        self
    }

    /// Set the thank-you message.
    pub fn with_thank_you_message(mut self, message: impl Into<String>) -> Self {
        self.thank_you_message = Some(message.into());
        self
    }

    /// Use the legacy section-index shape, replacing any existing references.
    pub fn with_legacy_section<I, Q>(mut self, section_index: usize, ids: I) -> Self
    where
        I: IntoIterator<Item = Q>,
        Q: Into<QuestionId>,
    {
        let refs = ids.into_iter().map(|id| QuestionRef::Id(id.into())).collect();
        match &mut self.question_references {
            QuestionReferences::Legacy(map) => {
                map.push((section_index.to_string(), refs));
            }
            QuestionReferences::Sectioned(_) => {
                self.question_references =
                    QuestionReferences::Legacy(vec![(section_index.to_string(), refs)]);
            }
        }
        self
    }

    /// Add a section record for the sectioned shape.
    pub fn with_section(mut self, section: SectionRecord) -> Self {
        self.sections.push(section);
        self
    }

    /// Add a sectioned reference, switching to the sectioned shape if needed.
    pub fn with_sectioned_reference(
        mut self,
        question_id: impl Into<QuestionId>,
        section_id: impl Into<String>,
    ) -> Self {
        let reference = SectionedReference {
            question_id: question_id.into(),
            section_id: Some(section_id.into()),
        };
        match &mut self.question_references {
            QuestionReferences::Sectioned(refs) => refs.push(reference),
            QuestionReferences::Legacy(_) => {
                self.question_references = QuestionReferences::Sectioned(vec![reference]);
            }
        }
        self
    }

    /// Add a site-specific question reference.
    pub fn with_site_specific(mut self, question_id: impl Into<QuestionId>) -> Self {
        self.site_specific_question_references
            .push(QuestionRef::Id(question_id.into()));
        self
    }

    /// Look up a section record by id.
    pub fn section(&self, section_id: &str) -> Option<&SectionRecord> {
        self.sections.iter().find(|s| s.section_id == section_id)
    }

    /// Check if the definition references no questions at all.
    pub fn has_no_references(&self) -> bool {
        self.question_references.is_empty() && self.site_specific_question_references.is_empty()
    }
}

/// The two stored shapes of question references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionReferences {
    /// Ordered `{questionId, sectionId}` pairs resolved against `sections`.
    Sectioned(Vec<SectionedReference>),

    /// Section index (as stored, a string key) mapped to question references.
    ///
    /// Kept as ordered key/value pairs so malformed keys survive parsing and
    /// can be reported instead of failing the whole definition.
    #[serde(with = "legacy_map")]
    Legacy(Vec<(String, Vec<QuestionRef>)>),
}

impl QuestionReferences {
    /// Check if there are no references in either shape.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Sectioned(refs) => refs.is_empty(),
            Self::Legacy(map) => map.iter().all(|(_, refs)| refs.is_empty()),
        }
    }

    /// The legacy entries with valid numeric keys, sorted by section index.
    ///
    /// Entries whose key is not a valid index are returned separately, in stored order.
    pub fn legacy_sections(&self) -> (Vec<(usize, &[QuestionRef])>, Vec<(&str, &[QuestionRef])>) {
        let Self::Legacy(map) = self else {
            return (Vec::new(), Vec::new());
        };
        let mut valid = Vec::new();
        let mut invalid = Vec::new();
        for (key, refs) in map {
            match key.trim().parse::<usize>() {
                Ok(index) => valid.push((index, refs.as_slice())),
                Err(_) => invalid.push((key.as_str(), refs.as_slice())),
            }
        }
        valid.sort_by_key(|(index, _)| *index);
        (valid, invalid)
    }
}

impl Default for QuestionReferences {
    fn default() -> Self {
        Self::Sectioned(Vec::new())
    }
}

mod legacy_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::QuestionRef;

    pub fn serialize<S: Serializer>(
        entries: &[(String, Vec<QuestionRef>)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let map: BTreeMap<&str, &Vec<QuestionRef>> =
            entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
        map.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, Vec<QuestionRef>)>, D::Error> {
        let map = BTreeMap::<String, Vec<QuestionRef>>::deserialize(deserializer)?;
        Ok(map.into_iter().collect())
    }
}

/// A reference in the sectioned shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionedReference {
    pub question_id: QuestionId,

    #[serde(default)]
    pub section_id: Option<String>,
}

/// A section record of the sectioned shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRecord {
    pub section_id: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub order: Option<u32>,
}

impl SectionRecord {
    /// Create a titled section record.
    pub fn new(section_id: impl Into<String>, title: impl Into<String>, order: u32) -> Self {
        Self {
            section_id: section_id.into(),
            title: Some(title.into()),
            order: Some(order),
        }
    }

    /// Create an untitled section record.
    pub fn untitled(section_id: impl Into<String>, order: u32) -> Self {
        Self {
            section_id: section_id.into(),
            title: None,
            order: Some(order),
        }
    }

    /// The title, if present and not blank.
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// A reference to a question in the question bank.
///
/// Stored either as a bare id or as an object carrying `questionId` (or `id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionRef {
    Id(QuestionId),
    Object {
        #[serde(rename = "questionId", alias = "id")]
        question_id: QuestionId,
    },
}

impl QuestionRef {
    /// The referenced question id.
    pub fn id(&self) -> &QuestionId {
        match self {
            Self::Id(id) | Self::Object { question_id: id } => id,
        }
    }
}
