//! In-memory collaborators for tests, demos and previews.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use survey_flow_types::{
    LookupError, QuestionBody, QuestionId, QuestionLookup, ResponseBundle, ResponseSink,
    SurveyDefinition, SurveyLookup, preview_key,
};

/// Survey definitions held in memory.
///
/// Live surveys are found by token; previews by their `preview-{token}` key.
#[derive(Debug, Default)]
pub struct InMemorySurveyStore {
    live: HashMap<String, SurveyDefinition>,
    previews: HashMap<String, SurveyDefinition>,
}

impl InMemorySurveyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a survey under a token.
    pub fn with_survey(mut self, token: impl Into<String>, definition: SurveyDefinition) -> Self {
        self.live.insert(token.into(), definition);
        self
    }

    /// Cache a preview snapshot for a token.
    pub fn with_preview(mut self, token: &str, definition: SurveyDefinition) -> Self {
        self.previews.insert(preview_key(token), definition);
        self
    }
}

#[async_trait]
impl SurveyLookup for InMemorySurveyStore {
    async fn load_survey(
        &self,
        token: &str,
        preview: bool,
    ) -> Result<Option<SurveyDefinition>, LookupError> {
        let found = if preview {
            self.previews.get(&preview_key(token))
        } else {
            self.live.get(token)
        };
        Ok(found.cloned())
    }
}

/// Question bodies held in memory.
#[derive(Debug, Default)]
pub struct InMemoryQuestionBank {
    bodies: HashMap<QuestionId, QuestionBody>,
    failing: bool,
    lookups: AtomicUsize,
}

impl InMemoryQuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bank whose every lookup fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_question(mut self, body: QuestionBody) -> Self {
        self.bodies.insert(body.id.clone(), body);
        self
    }

    pub fn with_questions(mut self, bodies: impl IntoIterator<Item = QuestionBody>) -> Self {
        for body in bodies {
            self.bodies.insert(body.id.clone(), body);
        }
        self
    }

    /// Number of batch lookups served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuestionLookup for InMemoryQuestionBank {
    async fn load_questions_by_ids(
        &self,
        ids: &[QuestionId],
    ) -> Result<Vec<QuestionBody>, LookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(LookupError::backend(anyhow::anyhow!("question bank unavailable")));
        }
        Ok(ids.iter().filter_map(|id| self.bodies.get(id).cloned()).collect())
    }
}

/// A sink that records every bundle it accepts.
///
/// It can be scripted to fail a number of times before accepting.
#[derive(Debug, Default)]
pub struct RecordingSink {
    bundles: Mutex<Vec<ResponseBundle>>,
    failures_left: AtomicUsize,
    attempts: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` submissions.
    pub fn failing_times(self, times: usize) -> Self {
        self.failures_left.store(times, Ordering::SeqCst);
        self
    }

    /// Bundles accepted so far, in order.
    pub fn bundles(&self) -> Vec<ResponseBundle> {
        self.bundles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Submissions attempted so far, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResponseSink for RecordingSink {
    async fn submit_responses(&self, bundle: &ResponseBundle) -> Result<(), LookupError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(LookupError::backend(anyhow::anyhow!("response store unavailable")));
        }
        self.bundles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(bundle.clone());
        Ok(())
    }
}
