//! Section grouping over a resolved question list.

use survey_flow_types::{AnswerableQuestion, section};

/// Distinct section names in the order they first appear.
///
/// Questions are already in canonical section order when they reach the flow,
/// so this is also the canonical order. It is never used to reorder questions.
pub fn group_sections(questions: &[AnswerableQuestion]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for question in questions {
        if !names.iter().any(|n| n == question.section_name()) {
            names.push(question.section_name().to_string());
        }
    }
    names
}

/// Ordered section names of one session, for "section N of M" progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionIndex {
    names: Vec<String>,
}

impl SectionIndex {
    pub fn from_questions(questions: &[AnswerableQuestion]) -> Self {
        Self {
            names: group_sections(questions),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn total(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The 1-based ordinal of a section name.
    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name).map(|i| i + 1)
    }

    /// The description for the section screen, if the section is canonical.
    pub fn description_of(&self, name: &str) -> Option<&'static str> {
        section::section_description(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_flow_types::QuestionKind;

    fn question(id: &str, section: &str) -> AnswerableQuestion {
        AnswerableQuestion::new(id, "text", QuestionKind::FreeText, section)
    }

    #[test]
    fn first_seen_order() {
        let questions = vec![
            question("1", "B"),
            question("2", "B"),
            question("3", "A"),
            question("4", "C"),
            question("5", "A"),
        ];
        assert_eq!(group_sections(&questions), vec!["B", "A", "C"]);
    }

    #[test]
    fn empty_list_has_no_sections() {
        assert!(group_sections(&[]).is_empty());
        assert!(SectionIndex::from_questions(&[]).is_empty());
    }

    #[test]
    fn ordinals_are_one_based() {
        let index = SectionIndex::from_questions(&[question("1", "X"), question("2", "Y")]);
        assert_eq!(index.total(), 2);
        assert_eq!(index.ordinal_of("X"), Some(1));
        assert_eq!(index.ordinal_of("Y"), Some(2));
        assert_eq!(index.ordinal_of("Z"), None);
    }
}
