use async_trait::async_trait;

use crate::{DeviceType, LookupError, QuestionBody, QuestionId, ResponseBundle, SurveyDefinition};

/// Source of survey definitions.
///
/// Preview sessions read a locally cached snapshot keyed `preview-{token}`;
/// live sessions resolve the token against stored surveys.
#[async_trait]
pub trait SurveyLookup: Send + Sync {
    /// Load the definition for a token, or `None` if there is none.
    async fn load_survey(
        &self,
        token: &str,
        preview: bool,
    ) -> Result<Option<SurveyDefinition>, LookupError>;
}

/// Batch lookup of question bodies by id.
#[async_trait]
pub trait QuestionLookup: Send + Sync {
    /// Load the bodies for the given ids.
    ///
    /// Unknown ids must be omitted from the result rather than reported as errors.
    /// The result order is not significant.
    async fn load_questions_by_ids(
        &self,
        ids: &[QuestionId],
    ) -> Result<Vec<QuestionBody>, LookupError>;
}

/// Destination of completed response bundles.
///
/// A bundle may be delivered more than once when the respondent retries;
/// de-duplication is the implementor's concern.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn submit_responses(&self, bundle: &ResponseBundle) -> Result<(), LookupError>;
}

/// Classifies the respondent's device.
pub trait DeviceClassifier: Send + Sync {
    fn classify_device(&self) -> DeviceType;
}

/// Key under which a preview snapshot of a survey is cached.
pub fn preview_key(token: &str) -> String {
    format!("preview-{token}")
}
