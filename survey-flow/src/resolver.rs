//! Question set resolution.
//!
//! Turns a survey definition into the ordered list of answerable questions a
//! respondent walks through:
//!
//! 1. collect references from whichever shape the definition uses, naming each
//!    one's section, then append the site-specific references
//! 2. drop duplicate ids, keeping the first occurrence
//! 3. fetch the bodies in one batch lookup
//! 4. sort into canonical section order
//!
//! Preview sessions that end up with nothing get placeholder questions instead.

use std::collections::{HashMap, HashSet};

use survey_flow_types::{
    AnswerableQuestion, CANONICAL_SECTIONS, ChoiceQuestion, LookupError, QuestionBody, QuestionId,
    QuestionKind, QuestionKindTag, QuestionLookup, QuestionRef, QuestionReferences,
    SITE_SPECIFIC_SECTION, ScaleQuestion, SurveyDefinition, UNKNOWN_SECTION, section,
};

use crate::SessionMode;

/// Placeholder questions generated per canonical section in preview sessions.
pub const PREVIEW_QUESTIONS_PER_SECTION: usize = 2;

/// The batch question lookup failed.
#[derive(Debug, thiserror::Error)]
#[error("Failed to load questions: {0}")]
pub struct QuestionLoadError(#[from] pub LookupError);

impl QuestionLoadError {
    /// The message shown to the respondent.
    pub fn user_message(&self) -> &'static str {
        "We couldn't load the questions for this survey. Please try again later."
    }
}

/// A question id together with the display name of its section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionedId {
    pub id: QuestionId,
    pub section_name: String,
}

/// Outcome of resolving a definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedQuestionSet {
    pub questions: Vec<AnswerableQuestion>,

    /// The questions are preview placeholders, not real ones.
    pub used_synthetic: bool,
}

impl ResolvedQuestionSet {
    fn real(questions: Vec<AnswerableQuestion>) -> Self {
        Self {
            questions,
            used_synthetic: false,
        }
    }

    fn empty_for(mode: SessionMode) -> Self {
        if mode.is_preview() {
            tracing::warn!("no real questions resolved, synthesizing preview questions");
            Self {
                questions: synthesize_preview(),
                used_synthetic: true,
            }
        } else {
            Self::default()
        }
    }
}

/// Resolve the questions of a definition.
///
/// A live session with nothing to ask resolves to an empty set. A lookup
/// failure is an error in live sessions and falls back to placeholders in
/// preview sessions.
pub async fn resolve(
    definition: &SurveyDefinition,
    lookup: &dyn QuestionLookup,
    mode: SessionMode,
) -> Result<ResolvedQuestionSet, QuestionLoadError> {
    let references = collect_references(definition);
    if references.is_empty() {
        tracing::debug!(survey_id = %definition.id, "definition references no questions");
        return Ok(ResolvedQuestionSet::empty_for(mode));
    }

    let ids: Vec<QuestionId> = references.iter().map(|r| r.id.clone()).collect();
    let bodies = match lookup.load_questions_by_ids(&ids).await {
        Ok(bodies) => bodies,
        Err(err) if mode.is_preview() => {
            tracing::warn!(
                survey_id = %definition.id,
                error = %err,
                "question lookup failed in preview"
            );
            return Ok(ResolvedQuestionSet::empty_for(mode));
        }
        Err(err) => return Err(QuestionLoadError(err)),
    };

    let questions = order_canonically(assemble(&references, bodies));
    tracing::debug!(
        survey_id = %definition.id,
        requested = ids.len(),
        resolved = questions.len(),
        "resolved question set"
    );
    if questions.is_empty() {
        return Ok(ResolvedQuestionSet::empty_for(mode));
    }
    Ok(ResolvedQuestionSet::real(questions))
}

/// Collect every referenced id with its section name, first occurrence wins.
pub fn collect_references(definition: &SurveyDefinition) -> Vec<SectionedId> {
    let mut collected = Vec::new();

    match &definition.question_references {
        QuestionReferences::Sectioned(references) => {
            for reference in references {
                let section_name = match reference.section_id.as_deref() {
                    Some(section_id) => sectioned_name(definition, section_id),
                    None => {
                        tracing::warn!(
                            question_id = %reference.question_id,
                            "reference has no section id"
                        );
                        UNKNOWN_SECTION.to_string()
                    }
                };
                collected.push(SectionedId {
                    id: reference.question_id.clone(),
                    section_name,
                });
            }
        }
        QuestionReferences::Legacy(_) => {
            let (sections, invalid) = definition.question_references.legacy_sections();
            for (index, refs) in sections {
                push_refs(&mut collected, refs, &section::legacy_section_name(index));
            }
            for (key, refs) in invalid {
                tracing::warn!(key, "legacy section key is not an index");
                push_refs(&mut collected, refs, UNKNOWN_SECTION);
            }
        }
    }

    push_refs(
        &mut collected,
        &definition.site_specific_question_references,
        SITE_SPECIFIC_SECTION,
    );

    dedupe(collected)
}

fn sectioned_name(definition: &SurveyDefinition, section_id: &str) -> String {
    let Some(record) = definition.section(section_id) else {
        tracing::warn!(section_id, "reference points at an unknown section");
        return UNKNOWN_SECTION.to_string();
    };
    if let Some(title) = record.display_title() {
        return title.to_string();
    }
    match record.order {
        Some(order) => format!("Section {}", order + 1),
        None => {
            tracing::warn!(section_id, "section has neither title nor order");
            UNKNOWN_SECTION.to_string()
        }
    }
}

fn push_refs(collected: &mut Vec<SectionedId>, refs: &[QuestionRef], section_name: &str) {
    collected.extend(refs.iter().map(|r| SectionedId {
        id: r.id().clone(),
        section_name: section_name.to_string(),
    }));
}

fn dedupe(references: Vec<SectionedId>) -> Vec<SectionedId> {
    let mut seen = HashSet::new();
    references
        .into_iter()
        .filter(|r| {
            if r.id.is_blank() {
                tracing::warn!("dropping reference with blank question id");
                return false;
            }
            seen.insert(r.id.clone())
        })
        .collect()
}

/// Join looked-up bodies to references, in reference order.
///
/// References without a usable body are dropped.
pub fn assemble(references: &[SectionedId], bodies: Vec<QuestionBody>) -> Vec<AnswerableQuestion> {
    let mut by_id: HashMap<QuestionId, QuestionBody> = HashMap::with_capacity(bodies.len());
    for body in bodies {
        by_id.entry(body.id.clone()).or_insert(body);
    }

    let mut questions = Vec::with_capacity(references.len());
    for reference in references {
        let Some(body) = by_id.remove(&reference.id) else {
            tracing::debug!(question_id = %reference.id, "question not found by lookup");
            continue;
        };
        if body.question_type.is_some() && body.kind_tag().is_none() {
            tracing::warn!(
                question_id = %reference.id,
                question_type = body.question_type.as_deref().unwrap_or_default(),
                "unknown question type, treating as free text"
            );
        } else if body.kind_tag().is_some_and(|tag| tag != body.effective_kind_tag()) {
            tracing::warn!(
                question_id = %reference.id,
                "choice question has no options, treating as free text"
            );
        }
        match body.into_question(reference.section_name.clone()) {
            Some(question) => questions.push(question),
            None => tracing::warn!(question_id = %reference.id, "dropping question without text"),
        }
    }
    questions
}

/// Stable sort into canonical section order.
///
/// Sections outside the canonical table follow, in the order they first appear.
pub fn order_canonically(mut questions: Vec<AnswerableQuestion>) -> Vec<AnswerableQuestion> {
    let mut extra: Vec<String> = Vec::new();
    for question in &questions {
        let name = question.section_name();
        if section::canonical_rank(name).is_none() && !extra.iter().any(|n| n == name) {
            extra.push(name.to_string());
        }
    }

    let rank = |name: &str| {
        section::canonical_rank(name).unwrap_or_else(|| {
            CANONICAL_SECTIONS.len() + extra.iter().position(|n| n == name).unwrap_or(extra.len())
        })
    };
    questions.sort_by_cached_key(|q| rank(q.section_name()));
    questions
}

const PREVIEW_KIND_CYCLE: [QuestionKindTag; 4] = [
    QuestionKindTag::Scale,
    QuestionKindTag::FreeText,
    QuestionKindTag::MultiChoice,
    QuestionKindTag::SingleChoice,
];

/// Placeholder questions for a preview with no real content.
///
/// Each canonical section gets the same number of questions; kinds cycle
/// through scale, free text, multi choice and single choice.
pub fn synthesize_preview() -> Vec<AnswerableQuestion> {
    let mut questions =
        Vec::with_capacity(CANONICAL_SECTIONS.len() * PREVIEW_QUESTIONS_PER_SECTION);
    for (section_index, canonical) in CANONICAL_SECTIONS.iter().enumerate() {
        for n in 0..PREVIEW_QUESTIONS_PER_SECTION {
            let position = section_index * PREVIEW_QUESTIONS_PER_SECTION + n;
            let id = format!("preview-{}-{}", section_index + 1, n + 1);
            let (kind, text) = match PREVIEW_KIND_CYCLE[position % PREVIEW_KIND_CYCLE.len()] {
                QuestionKindTag::Scale => (
                    QuestionKind::Scale(
                        ScaleQuestion::new(5)
                            .with_labels(vec!["Strongly disagree".into(), "Strongly agree".into()]),
                    ),
                    format!("How would you rate {}?", canonical.name.to_lowercase()),
                ),
                QuestionKindTag::MultiChoice => (
                    QuestionKind::MultiChoice(ChoiceQuestion::new(sample_options())),
                    "Which of these apply to you? Select all that fit.".to_string(),
                ),
                QuestionKindTag::SingleChoice => (
                    QuestionKind::SingleChoice(ChoiceQuestion::new(sample_options())),
                    "Which of these best describes your experience?".to_string(),
                ),
                QuestionKindTag::FreeText => (
                    QuestionKind::FreeText,
                    format!("Tell us more about {}.", canonical.name.to_lowercase()),
                ),
            };
            let required = !matches!(kind, QuestionKind::FreeText);
            questions.push(
                AnswerableQuestion::new(id, text, kind, canonical.name).with_required(required),
            );
        }
    }
    questions
}

fn sample_options() -> Vec<String> {
    ["Always", "Often", "Sometimes", "Rarely"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_flow_types::SectionRecord;

    #[test]
    fn sectioned_names_fall_back() {
        let definition = SurveyDefinition::new("s", "t")
            .with_section(SectionRecord::new("a", "Culture", 0))
            .with_section(SectionRecord::untitled("b", 3))
            .with_section(SectionRecord {
                section_id: "c".into(),
                title: None,
                order: None,
            })
            .with_sectioned_reference("q1", "a")
            .with_sectioned_reference("q2", "b")
            .with_sectioned_reference("q3", "c")
            .with_sectioned_reference("q4", "missing");

        let refs = collect_references(&definition);
        let sections: Vec<&str> = refs.iter().map(|r| r.section_name.as_str()).collect();
        assert_eq!(
            sections,
            vec!["Culture", "Section 4", UNKNOWN_SECTION, UNKNOWN_SECTION]
        );
    }

    #[test]
    fn legacy_refs_use_canonical_table() {
        let definition = SurveyDefinition::new("s", "t")
            .with_legacy_section(2, ["q3"])
            .with_legacy_section(0, ["q1"])
            .with_legacy_section(9, ["q9"])
            .with_site_specific("q5");

        let refs = collect_references(&definition);
        let pairs: Vec<(&str, &str)> = refs
            .iter()
            .map(|r| (r.id.as_str(), r.section_name.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("q1", "Engagement/Manager Relationships"),
                ("q3", "Feedback & Communication Quality"),
                ("q9", "Section 10"),
                ("q5", SITE_SPECIFIC_SECTION),
            ]
        );
    }

    #[test]
    fn duplicates_keep_first_section() {
        let definition = SurveyDefinition::new("s", "t")
            .with_legacy_section(1, ["q1", "q2", "q1"])
            .with_site_specific("q2")
            .with_site_specific("");

        let refs = collect_references(&definition);
        assert_eq!(refs.len(), 2);
        assert!(refs.iter().all(|r| r.section_name == "Peer/Team Dynamics"));
    }

    #[test]
    fn assemble_drops_unknown_and_unusable() {
        let refs = vec![
            SectionedId {
                id: "q1".into(),
                section_name: "A".into(),
            },
            SectionedId {
                id: "q2".into(),
                section_name: "A".into(),
            },
            SectionedId {
                id: "q3".into(),
                section_name: "B".into(),
            },
        ];
        let bodies = vec![
            QuestionBody::new("q3", "Third").with_type("likert"),
            QuestionBody {
                id: "q2".into(),
                ..QuestionBody::default()
            },
            QuestionBody::new("q1", "First"),
            QuestionBody::new("zzz", "Not requested"),
        ];

        let questions = assemble(&refs, bodies);
        let ids: Vec<&str> = questions.iter().map(|q| q.id().as_str()).collect();
        assert_eq!(ids, vec!["q1", "q3"]);
        assert_eq!(questions[1].kind().tag(), QuestionKindTag::Scale);
    }

    #[test]
    fn canonical_order_is_stable_and_appends_others() {
        let q = |id: &str, section: &str| {
            AnswerableQuestion::new(id, "t", QuestionKind::FreeText, section)
        };
        let ordered = order_canonically(vec![
            q("1", "Custom"),
            q("2", SITE_SPECIFIC_SECTION),
            q("3", "Peer/Team Dynamics"),
            q("4", UNKNOWN_SECTION),
            q("5", "Engagement/Manager Relationships"),
            q("6", "Peer/Team Dynamics"),
            q("7", "Custom"),
        ]);

        let ids: Vec<&str> = ordered.iter().map(|q| q.id().as_str()).collect();
        assert_eq!(ids, vec!["5", "3", "6", "2", "1", "7", "4"]);
    }

    #[test]
    fn preview_synthesis_covers_every_section_twice() {
        let questions = synthesize_preview();
        assert_eq!(questions.len(), CANONICAL_SECTIONS.len() * 2);

        for (i, canonical) in CANONICAL_SECTIONS.iter().enumerate() {
            assert_eq!(questions[i * 2].section_name(), canonical.name);
            assert_eq!(questions[i * 2 + 1].section_name(), canonical.name);
        }

        let tags: Vec<QuestionKindTag> = questions.iter().take(4).map(|q| q.kind().tag()).collect();
        assert_eq!(
            tags,
            vec![
                QuestionKindTag::Scale,
                QuestionKindTag::FreeText,
                QuestionKindTag::MultiChoice,
                QuestionKindTag::SingleChoice
            ]
        );

        let unique: HashSet<&QuestionId> = questions.iter().map(|q| q.id()).collect();
        assert_eq!(unique.len(), questions.len());
    }
}
