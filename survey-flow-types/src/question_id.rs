use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a question, unique within one resolved question list.
///
/// Used as the key in `Responses` and in a `ResponseBundle`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Create a new id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the id is empty (or only whitespace).
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for QuestionId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&String> for QuestionId {
    fn from(s: &String) -> Self {
        Self::new(s.clone())
    }
}

impl AsRef<str> for QuestionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let id = QuestionId::new("q-17");
        assert_eq!(format!("{}", id), "q-17");
    }

    #[test]
    fn blank() {
        assert!(QuestionId::new("  ").is_blank());
        assert!(!QuestionId::new("q1").is_blank());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id: QuestionId = "abc".into();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
