//! The respondent flow state machine.
//!
//! A [`FlowMachine`] owns everything that changes while one respondent takes a
//! survey: the current screen, the answers given so far and the submission
//! status. Every transition runs synchronously and never fails; an action that
//! does not apply to the current state returns [`Transition::Blocked`] and
//! leaves the state untouched.
//!
//! The machine performs no I/O. When the last question of a live session is
//! answered it moves to [`Screen::Done`] and hands back a [`SubmitRequest`];
//! the caller dispatches it and reports the result with
//! [`FlowMachine::record_submission`].

use std::fmt;

use survey_flow_types::{AnswerableQuestion, QuestionId, ResponseValue, Responses};

use crate::FlowConfig;
use crate::progress::{SectionProgress, question_progress_label};
use crate::sections::SectionIndex;
use crate::view::{EnabledActions, Notice, ScreenView, SectionView};

/// Whether a session submits its answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// A published survey; completion submits the answers.
    #[default]
    Live,

    /// A cached draft; completion never submits.
    Preview,
}

impl SessionMode {
    pub fn from_preview_flag(preview: bool) -> Self {
        if preview { Self::Preview } else { Self::Live }
    }

    pub fn is_preview(self) -> bool {
        self == Self::Preview
    }
}

/// The screen the respondent is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Welcome,

    /// Introduction of `section`, followed by the question at `entry_index`.
    SectionTransition { section: String, entry_index: usize },

    Question { index: usize },

    Done,
}

impl Screen {
    pub fn is_welcome(&self) -> bool {
        matches!(self, Self::Welcome)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The question index, if this is a question screen.
    pub fn question_index(&self) -> Option<usize> {
        match self {
            Self::Question { index } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welcome => f.write_str("welcome"),
            Self::SectionTransition {
                section,
                entry_index,
            } => write!(f, "section '{section}' (entry {entry_index})"),
            Self::Question { index } => write!(f, "question {index}"),
            Self::Done => f.write_str("done"),
        }
    }
}

/// Progress of submitting the answers of a live session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    NotStarted,
    InFlight,
    Succeeded,
    Failed(String),
}

impl SubmissionStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// The answers to submit, handed out when a live session completes.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub survey_id: String,
    pub token: String,
    pub responses: Responses,
}

/// Why an action left the state unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blocked {
    /// There are no questions to start.
    NoQuestions,

    /// The questions could not be loaded.
    LoadFailed,

    /// The action is not available on the current screen.
    WrongScreen,

    /// The answer is for a question other than the one on screen.
    QuestionMismatch {
        expected: QuestionId,
        actual: QuestionId,
    },

    /// The question on screen cannot be skipped.
    SkipNotAllowed,

    /// The answers were already submitted.
    AlreadySubmitted,

    /// There is no failed submission to retry.
    NothingToRetry,
}

/// Result of a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The machine moved to this screen.
    Moved(Screen),

    /// The machine moved to `Done` and the request must be dispatched.
    Submit(SubmitRequest),

    /// Nothing changed.
    Blocked(Blocked),
}

impl Transition {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}

/// State machine driving one respondent through a survey.
#[derive(Debug, Clone)]
pub struct FlowMachine {
    survey_id: String,
    token: String,
    mode: SessionMode,
    config: FlowConfig,
    questions: Vec<AnswerableQuestion>,
    sections: SectionIndex,
    screen: Screen,
    responses: Responses,
    submission: SubmissionStatus,
    load_error: Option<String>,
}

impl FlowMachine {
    /// Create a machine on the welcome screen.
    ///
    /// `questions` must already be in canonical section order.
    pub fn new(
        survey_id: impl Into<String>,
        token: impl Into<String>,
        questions: Vec<AnswerableQuestion>,
        mode: SessionMode,
    ) -> Self {
        let sections = SectionIndex::from_questions(&questions);
        Self {
            survey_id: survey_id.into(),
            token: token.into(),
            mode,
            config: FlowConfig::default(),
            questions,
            sections,
            screen: Screen::Welcome,
            responses: Responses::new(),
            submission: SubmissionStatus::NotStarted,
            load_error: None,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    /// Record that the questions failed to load; the respondent cannot start.
    pub fn with_load_error(mut self, message: impl Into<String>) -> Self {
        self.load_error = Some(message.into());
        self
    }

    pub fn survey_id(&self) -> &str {
        &self.survey_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn questions(&self) -> &[AnswerableQuestion] {
        &self.questions
    }

    pub fn sections(&self) -> &SectionIndex {
        &self.sections
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn responses(&self) -> &Responses {
        &self.responses
    }

    pub fn submission_status(&self) -> &SubmissionStatus {
        &self.submission
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// The section being introduced, on a section screen.
    pub fn active_section_name(&self) -> Option<&str> {
        match &self.screen {
            Screen::SectionTransition { section, .. } => Some(section),
            _ => None,
        }
    }

    /// The question a section screen leads to.
    pub fn pending_section_entry_index(&self) -> Option<usize> {
        match &self.screen {
            Screen::SectionTransition { entry_index, .. } => Some(*entry_index),
            _ => None,
        }
    }

    /// The question on screen.
    pub fn current_question(&self) -> Option<&AnswerableQuestion> {
        self.screen
            .question_index()
            .and_then(|index| self.questions.get(index))
    }

    fn framing(&self) -> bool {
        self.config.section_framing && !self.sections.is_empty()
    }

    fn can_start(&self) -> Result<(), Blocked> {
        if self.submission == SubmissionStatus::Succeeded {
            Err(Blocked::AlreadySubmitted)
        } else if self.load_error.is_some() {
            Err(Blocked::LoadFailed)
        } else if self.questions.is_empty() {
            Err(Blocked::NoQuestions)
        } else {
            Ok(())
        }
    }

    fn move_to(&mut self, screen: Screen) -> Transition {
        tracing::debug!(from = %self.screen, to = %screen, "flow transition");
        self.screen = screen.clone();
        Transition::Moved(screen)
    }

    fn blocked(&self, reason: Blocked) -> Transition {
        tracing::debug!(screen = %self.screen, ?reason, "flow action blocked");
        Transition::Blocked(reason)
    }

    fn section_screen(&self, entry_index: usize) -> Screen {
        Screen::SectionTransition {
            section: self.questions[entry_index].section_name().to_string(),
            entry_index,
        }
    }

    /// Leave the welcome screen.
    ///
    /// With section framing the first section is introduced, otherwise the
    /// first question is shown. Without questions nothing happens.
    pub fn start(&mut self) -> Transition {
        if !self.screen.is_welcome() {
            return self.blocked(Blocked::WrongScreen);
        }
        if let Err(reason) = self.can_start() {
            return self.blocked(reason);
        }
        let next = if self.framing() {
            self.section_screen(0)
        } else {
            Screen::Question { index: 0 }
        };
        self.move_to(next)
    }

    /// Leave a section screen for the question it introduces.
    pub fn continue_from_section(&mut self) -> Transition {
        let Screen::SectionTransition { entry_index, .. } = self.screen else {
            return self.blocked(Blocked::WrongScreen);
        };
        if entry_index < self.questions.len() {
            self.move_to(Screen::Question { index: entry_index })
        } else {
            tracing::warn!(
                entry_index,
                questions = self.questions.len(),
                "section entry out of bounds, finishing"
            );
            self.move_to(Screen::Done)
        }
    }

    fn check_current(&self, question_id: &QuestionId) -> Result<usize, Blocked> {
        let Screen::Question { index } = self.screen else {
            return Err(Blocked::WrongScreen);
        };
        if self.submission == SubmissionStatus::Succeeded {
            return Err(Blocked::AlreadySubmitted);
        }
        let Some(question) = self.questions.get(index) else {
            return Err(Blocked::WrongScreen);
        };
        if question.id() != question_id {
            return Err(Blocked::QuestionMismatch {
                expected: question.id().clone(),
                actual: question_id.clone(),
            });
        }
        Ok(index)
    }

    /// Answer the question on screen and move forward.
    ///
    /// Answering again after going back replaces the earlier answer.
    pub fn answer(
        &mut self,
        question_id: impl Into<QuestionId>,
        value: impl Into<ResponseValue>,
    ) -> Transition {
        let question_id = question_id.into();
        match self.check_current(&question_id) {
            Ok(index) => self.record_and_advance(index, question_id, value.into()),
            Err(reason) => self.blocked(reason),
        }
    }

    /// Skip the question on screen; recorded as a skipped answer.
    pub fn skip(&mut self, question_id: impl Into<QuestionId>) -> Transition {
        let question_id = question_id.into();
        let index = match self.check_current(&question_id) {
            Ok(index) => index,
            Err(reason) => return self.blocked(reason),
        };
        if !self.config.allows_skip(&self.questions[index]) {
            return self.blocked(Blocked::SkipNotAllowed);
        }
        self.record_and_advance(index, question_id, ResponseValue::Skipped)
    }

    fn record_and_advance(
        &mut self,
        index: usize,
        question_id: QuestionId,
        value: ResponseValue,
    ) -> Transition {
        self.responses.insert(question_id, value);

        if index + 1 >= self.questions.len() {
            return self.finish();
        }

        let crosses =
            self.questions[index + 1].section_name() != self.questions[index].section_name();
        let next = if crosses && self.framing() {
            self.section_screen(index + 1)
        } else {
            Screen::Question { index: index + 1 }
        };
        self.move_to(next)
    }

    fn finish(&mut self) -> Transition {
        self.move_to(Screen::Done);
        if self.mode.is_preview() {
            return Transition::Moved(Screen::Done);
        }
        if self.submission == SubmissionStatus::InFlight {
            tracing::warn!(
                survey_id = %self.survey_id,
                "submission already in flight, not resubmitting"
            );
            return Transition::Moved(Screen::Done);
        }
        Transition::Submit(self.begin_submission())
    }

    fn begin_submission(&mut self) -> SubmitRequest {
        self.submission = SubmissionStatus::InFlight;
        SubmitRequest {
            survey_id: self.survey_id.clone(),
            token: self.token.clone(),
            responses: self.responses.clone(),
        }
    }

    /// Go back one step.
    ///
    /// Going back across a section boundary shows that section's screen again.
    /// From the first question, the first section screen or the done screen
    /// this returns to the welcome screen.
    pub fn back(&mut self) -> Transition {
        let previous = match &self.screen {
            Screen::Welcome => return self.blocked(Blocked::WrongScreen),
            Screen::Done => Screen::Welcome,
            Screen::SectionTransition { entry_index, .. } => match entry_index.checked_sub(1) {
                Some(index) if index < self.questions.len() => Screen::Question { index },
                _ => Screen::Welcome,
            },
            Screen::Question { index: 0 } => Screen::Welcome,
            Screen::Question { index } => {
                let index = *index;
                let previous_section = self.questions[index - 1].section_name();
                let crosses = previous_section != self.questions[index].section_name();
                if crosses && self.framing() {
                    self.section_screen(index - 1)
                } else {
                    Screen::Question { index: index - 1 }
                }
            }
        };
        self.move_to(previous)
    }

    /// Report the outcome of the dispatched submission.
    ///
    /// Success clears the in-memory answers; failure keeps them for a retry.
    pub fn record_submission(&mut self, outcome: Result<(), String>) {
        if self.submission != SubmissionStatus::InFlight {
            tracing::debug!(status = ?self.submission, "ignoring submission outcome");
            return;
        }
        match outcome {
            Ok(()) => {
                tracing::info!(
                    survey_id = %self.survey_id,
                    answers = self.responses.len(),
                    "responses submitted"
                );
                self.submission = SubmissionStatus::Succeeded;
                self.responses.clear();
            }
            Err(reason) => {
                tracing::warn!(survey_id = %self.survey_id, %reason, "submission failed");
                self.submission = SubmissionStatus::Failed(reason);
            }
        }
    }

    /// Retry a failed submission from the done screen.
    pub fn retry_submission(&mut self) -> Transition {
        if !self.screen.is_done() {
            return self.blocked(Blocked::WrongScreen);
        }
        if !self.submission.is_failed() {
            return self.blocked(Blocked::NothingToRetry);
        }
        Transition::Submit(self.begin_submission())
    }

    /// Everything a renderer needs to draw the current screen.
    pub fn view(&self) -> ScreenView<'_> {
        let (progress_label, section, current_question, enabled_actions) = match &self.screen {
            Screen::Welcome => (
                None,
                None,
                None,
                EnabledActions {
                    next: self.can_start().is_ok(),
                    ..EnabledActions::default()
                },
            ),
            Screen::SectionTransition { section, .. } => {
                let progress = SectionProgress {
                    current: self.sections.ordinal_of(section).unwrap_or(0),
                    total: self.sections.total(),
                };
                (
                    None,
                    Some(SectionView {
                        name: section.as_str(),
                        description: self.sections.description_of(section),
                        progress,
                    }),
                    None,
                    EnabledActions {
                        back: true,
                        next: true,
                        ..EnabledActions::default()
                    },
                )
            }
            Screen::Question { index } => {
                let question = self.questions.get(*index);
                (
                    Some(question_progress_label(*index, self.questions.len())),
                    None,
                    question,
                    EnabledActions {
                        back: true,
                        skip: question.is_some_and(|q| self.config.allows_skip(q)),
                        next: true,
                        retry: false,
                    },
                )
            }
            Screen::Done => (
                None,
                None,
                None,
                EnabledActions {
                    back: true,
                    retry: self.submission.is_failed(),
                    ..EnabledActions::default()
                },
            ),
        };

        ScreenView {
            screen: &self.screen,
            progress_label,
            section,
            current_question,
            current_answer: current_question.and_then(|q| self.responses.get(q.id())),
            enabled_actions,
            notice: self.notice(),
            submission_status: &self.submission,
            mode: self.mode,
        }
    }

    fn notice(&self) -> Option<Notice> {
        match &self.screen {
            Screen::Welcome => {
                if let Some(message) = &self.load_error {
                    Some(Notice::LoadFailed(message.clone()))
                } else if self.questions.is_empty() {
                    Some(Notice::NoQuestions)
                } else if self.submission == SubmissionStatus::Succeeded {
                    Some(Notice::Submitted)
                } else {
                    None
                }
            }
            Screen::Done => match &self.submission {
                SubmissionStatus::InFlight => Some(Notice::Submitting),
                SubmissionStatus::Failed(reason) => Some(Notice::SubmissionFailed(reason.clone())),
                SubmissionStatus::Succeeded => Some(Notice::Submitted),
                SubmissionStatus::NotStarted if self.mode.is_preview() => {
                    Some(Notice::PreviewComplete)
                }
                SubmissionStatus::NotStarted => None,
            },
            _ => None,
        }
    }
}
