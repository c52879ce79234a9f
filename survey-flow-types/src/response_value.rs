use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single raw answer collected for a question.
///
/// Serialized untagged: `null`, a string, a list of strings, or an object
/// carrying a `response` sub-value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    /// The respondent skipped the question.
    Skipped,

    /// A single value (scale point, chosen option, or free text).
    Text(String),

    /// The chosen options of a multi-choice question.
    Selections(Vec<String>),

    /// A structured answer exposing its value under `response`.
    Structured {
        response: Box<ResponseValue>,
        #[serde(flatten)]
        details: BTreeMap<String, serde_json::Value>,
    },
}

impl ResponseValue {
    /// Wrap a value with extra details into a structured answer.
    pub fn structured(
        response: impl Into<ResponseValue>,
        details: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        Self::Structured {
            response: Box::new(response.into()),
            details,
        }
    }

    /// Build selections from a legacy comma-joined string.
    ///
    /// Empty segments are dropped, so `""` yields no selections.
    pub fn from_joined(joined: &str) -> Self {
        Self::Selections(
            joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    /// The submission-ready value: structured answers yield their `response`.
    pub fn normalized(&self) -> ResponseValue {
        match self {
            Self::Structured { response, .. } => response.normalized(),
            other => other.clone(),
        }
    }

    /// Check if this is the skipped marker.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// Try to get this value as a string reference.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as selections.
    pub fn as_selections(&self) -> Option<&[String]> {
        match self {
            Self::Selections(items) => Some(items),
            _ => None,
        }
    }

    /// Get the type name of this value for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Skipped => "Skipped",
            Self::Text(_) => "Text",
            Self::Selections(_) => "Selections",
            Self::Structured { .. } => "Structured",
        }
    }
}

impl From<String> for ResponseValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ResponseValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<String>> for ResponseValue {
    fn from(items: Vec<String>) -> Self {
        Self::Selections(items)
    }
}

impl From<Vec<&str>> for ResponseValue {
    fn from(items: Vec<&str>) -> Self {
        Self::Selections(items.into_iter().map(String::from).collect())
    }
}

impl<T: Into<ResponseValue>> From<Option<T>> for ResponseValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Skipped, Into::into)
    }
}
