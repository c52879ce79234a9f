//! Async driver tying the flow to its collaborators.
//!
//! A [`Session`] loads the definition and questions once, then forwards every
//! respondent action to its [`FlowMachine`]. When a transition asks for a
//! submission the session builds the bundle, delivers it and records the
//! outcome. The `record_*` methods stop after building the bundle, so a
//! renderer can draw the in-flight state before awaiting [`Session::deliver`].

use survey_flow_types::{
    LookupError, QuestionId, QuestionLookup, ResponseBundle, ResponseValue, SurveyDefinition,
    SurveyLookup,
};

use crate::flow::{FlowMachine, SessionMode, Transition};
use crate::resolver;
use crate::submission::SubmissionAdapter;
use crate::view::ScreenView;
use crate::FlowConfig;

/// Error type for opening a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No survey is published (or cached, for previews) under the token.
    #[error("No survey found for token '{token}'")]
    SurveyNotFound { token: String },

    /// The survey lookup failed.
    #[error("Failed to load survey: {0}")]
    Lookup(#[from] LookupError),
}

/// Configures and opens a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    token: String,
    mode: SessionMode,
    config: FlowConfig,
}

impl SessionBuilder {
    fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            mode: SessionMode::Live,
            config: FlowConfig::default(),
        }
    }

    /// Open the cached preview snapshot instead of the published survey.
    pub fn preview(mut self, preview: bool) -> Self {
        self.mode = SessionMode::from_preview_flag(preview);
        self
    }

    pub fn config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the survey and its questions and open the session on the welcome screen.
    ///
    /// A question lookup failure does not fail the session: it opens with the
    /// failure shown on the welcome screen and nothing to start.
    pub async fn open(
        self,
        surveys: &dyn SurveyLookup,
        questions: &dyn QuestionLookup,
        adapter: SubmissionAdapter,
    ) -> Result<Session, SessionError> {
        let preview = self.mode.is_preview();
        let definition = surveys
            .load_survey(&self.token, preview)
            .await?
            .ok_or_else(|| SessionError::SurveyNotFound {
                token: self.token.clone(),
            })?;

        let machine = match resolver::resolve(&definition, questions, self.mode).await {
            Ok(resolved) => {
                tracing::info!(
                    survey_id = %definition.id,
                    preview,
                    questions = resolved.questions.len(),
                    synthetic = resolved.used_synthetic,
                    "opened survey session"
                );
                FlowMachine::new(definition.id.clone(), self.token, resolved.questions, self.mode)
            }
            Err(err) => {
                tracing::warn!(
                    survey_id = %definition.id,
                    error = %err,
                    "opened survey session without questions"
                );
                FlowMachine::new(definition.id.clone(), self.token, Vec::new(), self.mode)
                    .with_load_error(err.user_message())
            }
        }
        .with_config(self.config);

        Ok(Session {
            definition,
            machine,
            adapter,
            pending: None,
            outgoing: false,
        })
    }
}

/// One respondent taking one survey.
#[derive(Debug)]
pub struct Session {
    definition: SurveyDefinition,
    machine: FlowMachine,
    adapter: SubmissionAdapter,

    /// The bundle of the last submission that has not succeeded yet.
    pending: Option<ResponseBundle>,

    /// Set while `pending` is staged but not yet sent.
    outgoing: bool,
}

impl Session {
    pub fn builder(token: impl Into<String>) -> SessionBuilder {
        SessionBuilder::new(token)
    }

    pub fn definition(&self) -> &SurveyDefinition {
        &self.definition
    }

    pub fn machine(&self) -> &FlowMachine {
        &self.machine
    }

    pub fn view(&self) -> ScreenView<'_> {
        self.machine.view()
    }

    /// The bundle a retry would resend.
    pub fn pending_bundle(&self) -> Option<&ResponseBundle> {
        self.pending.as_ref()
    }

    pub fn start(&mut self) -> Transition {
        self.machine.start()
    }

    pub fn continue_from_section(&mut self) -> Transition {
        self.machine.continue_from_section()
    }

    pub fn back(&mut self) -> Transition {
        self.machine.back()
    }

    /// Answer the current question; answering the last one submits.
    pub async fn answer(
        &mut self,
        question_id: impl Into<QuestionId>,
        value: impl Into<ResponseValue>,
    ) -> Transition {
        let transition = self.record_answer(question_id, value);
        self.deliver().await;
        transition
    }

    /// Skip the current question; skipping the last one submits.
    pub async fn skip(&mut self, question_id: impl Into<QuestionId>) -> Transition {
        let transition = self.record_skip(question_id);
        self.deliver().await;
        transition
    }

    /// Resend the bundle of a failed submission.
    pub async fn retry_submission(&mut self) -> Transition {
        let transition = self.request_retry();
        self.deliver().await;
        transition
    }

    /// Answer the current question without delivering.
    ///
    /// A `Submit` transition leaves the submission in flight until
    /// [`deliver`](Self::deliver) is awaited.
    pub fn record_answer(
        &mut self,
        question_id: impl Into<QuestionId>,
        value: impl Into<ResponseValue>,
    ) -> Transition {
        let transition = self.machine.answer(question_id, value);
        self.stage(transition, false)
    }

    /// Skip the current question without delivering.
    pub fn record_skip(&mut self, question_id: impl Into<QuestionId>) -> Transition {
        let transition = self.machine.skip(question_id);
        self.stage(transition, false)
    }

    /// Ask for a retry without delivering.
    pub fn request_retry(&mut self) -> Transition {
        let transition = self.machine.retry_submission();
        self.stage(transition, true)
    }

    /// Whether a staged bundle is waiting for [`deliver`](Self::deliver).
    pub fn has_outgoing(&self) -> bool {
        self.outgoing
    }

    /// Send the staged bundle and record the outcome.
    ///
    /// Returns `false` when nothing was staged.
    pub async fn deliver(&mut self) -> bool {
        if !std::mem::take(&mut self.outgoing) {
            return false;
        }
        let Some(bundle) = self.pending.clone() else {
            return false;
        };

        match self.adapter.send(bundle).await {
            Ok(()) => {
                self.pending = None;
                self.machine.record_submission(Ok(()));
            }
            Err(err) => self.machine.record_submission(Err(err.reason())),
        }
        true
    }

    fn stage(&mut self, transition: Transition, retry: bool) -> Transition {
        if let Transition::Submit(request) = &transition {
            let bundle = match self.pending.take() {
                Some(bundle) if retry => bundle,
                _ => self.adapter.prepare(request),
            };
            self.pending = Some(bundle);
            self.outgoing = true;
        }
        transition
    }
}
