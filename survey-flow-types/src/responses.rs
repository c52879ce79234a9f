use std::collections::HashMap;

use crate::{QuestionId, ResponseValue};

/// Error type for response access operations.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("Missing response for question: {0}")]
    MissingQuestion(QuestionId),

    #[error("Type mismatch for question '{id}': expected {expected}, got {actual}")]
    TypeMismatch {
        id: QuestionId,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Collected answers of one respondent, keyed by question id.
///
/// Inserting for an id that already has an answer replaces it; no history is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Responses {
    values: HashMap<QuestionId, ResponseValue>,
}

impl Responses {
    /// Create a new empty responses collection.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Insert an answer, returning the value it replaced.
    pub fn insert(
        &mut self,
        id: impl Into<QuestionId>,
        value: impl Into<ResponseValue>,
    ) -> Option<ResponseValue> {
        self.values.insert(id.into(), value.into())
    }

    /// Get the answer for a question.
    pub fn get(&self, id: &QuestionId) -> Option<&ResponseValue> {
        self.values.get(id)
    }

    /// Check if a question has an answer (skipped counts as answered).
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.values.contains_key(id)
    }

    /// Remove the answer for a question.
    pub fn remove(&mut self, id: &QuestionId) -> Option<ResponseValue> {
        self.values.remove(id)
    }

    /// Drop every answer.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Get an iterator over all id-value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &ResponseValue)> {
        self.values.iter()
    }

    /// Get the number of answers.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no answers.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a single text answer.
    pub fn get_text(&self, id: &QuestionId) -> Result<&str, ResponseError> {
        match self.get(id) {
            Some(ResponseValue::Text(s)) => Ok(s),
            Some(other) => Err(ResponseError::TypeMismatch {
                id: id.clone(),
                expected: "Text",
                actual: other.type_name(),
            }),
            None => Err(ResponseError::MissingQuestion(id.clone())),
        }
    }

    /// Get the selections of a multi-choice answer.
    pub fn get_selections(&self, id: &QuestionId) -> Result<&[String], ResponseError> {
        match self.get(id) {
            Some(ResponseValue::Selections(items)) => Ok(items),
            Some(other) => Err(ResponseError::TypeMismatch {
                id: id.clone(),
                expected: "Selections",
                actual: other.type_name(),
            }),
            None => Err(ResponseError::MissingQuestion(id.clone())),
        }
    }

    /// Check if a question has an answer that is not a skip.
    pub fn has_value(&self, id: &QuestionId) -> bool {
        match self.get(id) {
            Some(ResponseValue::Skipped) | None => false,
            Some(ResponseValue::Text(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}

impl IntoIterator for Responses {
    type Item = (QuestionId, ResponseValue);
    type IntoIter = std::collections::hash_map::IntoIter<QuestionId, ResponseValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Responses {
    type Item = (&'a QuestionId, &'a ResponseValue);
    type IntoIter = std::collections::hash_map::Iter<'a, QuestionId, ResponseValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut responses = Responses::new();
        responses.insert("q1", "4");
        responses.insert("q2", vec!["Email", "Slack"]);

        assert_eq!(responses.get_text(&"q1".into()).unwrap(), "4");
        assert_eq!(
            responses.get_selections(&"q2".into()).unwrap(),
            ["Email".to_string(), "Slack".to_string()]
        );
    }

    #[test]
    fn last_write_wins() {
        let mut responses = Responses::new();
        responses.insert("q1", "2");
        let previous = responses.insert("q1", "5");

        assert_eq!(previous, Some(ResponseValue::Text("2".into())));
        assert_eq!(responses.len(), 1);
        assert_eq!(responses.get_text(&"q1".into()).unwrap(), "5");
    }

    #[test]
    fn skipped_is_answered_but_has_no_value() {
        let mut responses = Responses::new();
        responses.insert("q1", ResponseValue::Skipped);

        assert!(responses.contains(&"q1".into()));
        assert!(!responses.has_value(&"q1".into()));
    }

    #[test]
    fn type_mismatch_error() {
        let mut responses = Responses::new();
        responses.insert("q1", vec!["a"]);

        let result = responses.get_text(&"q1".into());
        assert!(matches!(result, Err(ResponseError::TypeMismatch { .. })));
        assert!(matches!(
            responses.get_text(&"missing".into()),
            Err(ResponseError::MissingQuestion(_))
        ));
    }
}
