//! What a renderer needs to draw one screen.

use std::fmt;

use survey_flow_types::{AnswerableQuestion, ResponseValue};

use crate::flow::{Screen, SessionMode, SubmissionStatus};
use crate::progress::SectionProgress;

/// Borrowed snapshot of the flow for rendering.
///
/// Renderers draw from this and report user intent back through the flow
/// transitions; they never change flow state directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenView<'a> {
    pub screen: &'a Screen,

    /// `"i of n"`, on question screens only.
    pub progress_label: Option<String>,

    /// The section being introduced, on section screens only.
    pub section: Option<SectionView<'a>>,

    pub current_question: Option<&'a AnswerableQuestion>,

    /// The answer already recorded for the current question, if any.
    pub current_answer: Option<&'a ResponseValue>,

    pub enabled_actions: EnabledActions,
    pub notice: Option<Notice>,
    pub submission_status: &'a SubmissionStatus,
    pub mode: SessionMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionView<'a> {
    pub name: &'a str,
    pub description: Option<&'static str>,
    pub progress: SectionProgress,
}

/// Actions the current screen accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnabledActions {
    pub back: bool,
    pub skip: bool,
    pub next: bool,
    pub retry: bool,
}

/// A message to show alongside the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The questions could not be loaded.
    LoadFailed(String),

    /// The survey has no questions to answer.
    NoQuestions,

    /// The answers are being submitted.
    Submitting,

    /// Submitting failed; a retry is possible.
    SubmissionFailed(String),

    /// The answers were submitted.
    Submitted,

    /// A preview finished; nothing was submitted.
    PreviewComplete,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::LoadFailed(_) | Self::SubmissionFailed(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadFailed(message) => f.write_str(message),
            Self::NoQuestions => f.write_str("This survey has no questions yet."),
            Self::Submitting => f.write_str("Submitting your responses..."),
            Self::SubmissionFailed(reason) => {
                write!(f, "We couldn't submit your responses ({reason}). Please try again.")
            }
            Self::Submitted => f.write_str("Your responses have been submitted. Thank you!"),
            Self::PreviewComplete => {
                f.write_str("Preview complete. Responses are not submitted in preview mode.")
            }
        }
    }
}
