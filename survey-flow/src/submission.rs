//! Turning a finished session into a delivered response bundle.

use std::sync::Arc;

use survey_flow_types::{DeviceClassifier, LookupError, ResponseBundle, ResponseSink};

use crate::flow::SubmitRequest;

/// Error type for delivering a response bundle.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The sink refused or failed to store the bundle.
    #[error("Submission rejected: {0}")]
    Rejected(#[source] LookupError),

    /// The delivery task stopped before reporting back.
    #[error("Submission aborted: {0}")]
    Aborted(String),
}

impl SubmissionError {
    /// Short reason recorded on the flow and shown to the respondent.
    pub fn reason(&self) -> String {
        match self {
            Self::Rejected(err) => err.to_string(),
            Self::Aborted(reason) => reason.clone(),
        }
    }
}

/// Builds response bundles and hands them to the sink.
#[derive(Clone)]
pub struct SubmissionAdapter {
    sink: Arc<dyn ResponseSink>,
    classifier: Arc<dyn DeviceClassifier>,
}

impl std::fmt::Debug for SubmissionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionAdapter").finish_non_exhaustive()
    }
}

impl SubmissionAdapter {
    pub fn new(sink: Arc<dyn ResponseSink>, classifier: Arc<dyn DeviceClassifier>) -> Self {
        Self { sink, classifier }
    }

    /// Build the bundle for a request.
    ///
    /// Answers are normalized and the device is classified once, here.
    pub fn prepare(&self, request: &SubmitRequest) -> ResponseBundle {
        let device_type = self.classifier.classify_device();
        ResponseBundle::new(
            request.survey_id.clone(),
            request.token.clone(),
            device_type,
            &request.responses,
        )
    }

    /// Deliver a bundle.
    ///
    /// Delivery runs on its own task, so it completes even if the caller stops
    /// waiting for it.
    pub async fn send(&self, bundle: ResponseBundle) -> Result<(), SubmissionError> {
        let sink = Arc::clone(&self.sink);
        let handle = tokio::spawn(async move {
            tracing::debug!(
                survey_id = %bundle.survey_id,
                device = %bundle.device_type,
                answers = bundle.responses.len(),
                "submitting response bundle"
            );
            sink.submit_responses(&bundle).await
        });

        match handle.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(SubmissionError::Rejected(err)),
            Err(join) => Err(SubmissionError::Aborted(join.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::device::FixedDevice;
    use crate::memory::RecordingSink;
    use survey_flow_types::{DeviceType, QuestionId, ResponseValue, Responses};

    fn request() -> SubmitRequest {
        let mut responses = Responses::new();
        let details = BTreeMap::from([("comment".to_string(), serde_json::json!("ok"))]);
        responses.insert("q1", ResponseValue::structured("4", details));
        responses.insert("q2", vec!["a", "b"]);
        SubmitRequest {
            survey_id: "survey".into(),
            token: "token".into(),
            responses,
        }
    }

    #[test]
    fn prepare_normalizes_and_classifies() {
        let sink = Arc::new(RecordingSink::new());
        let adapter = SubmissionAdapter::new(sink, Arc::new(FixedDevice(DeviceType::Tablet)));

        let bundle = adapter.prepare(&request());
        assert_eq!(bundle.device_type, DeviceType::Tablet);
        assert_eq!(bundle.responses[&QuestionId::from("q1")], ResponseValue::Text("4".into()));
        assert_eq!(
            bundle.responses[&QuestionId::from("q2")],
            ResponseValue::Selections(vec!["a".into(), "b".into()])
        );
    }

    #[tokio::test]
    async fn send_delivers_to_sink() {
        let sink = Arc::new(RecordingSink::new());
        let adapter =
            SubmissionAdapter::new(sink.clone(), Arc::new(FixedDevice(DeviceType::Desktop)));

        let bundle = adapter.prepare(&request());
        adapter.send(bundle.clone()).await.unwrap();
        assert_eq!(sink.bundles(), vec![bundle]);
    }

    #[tokio::test]
    async fn send_reports_rejection() {
        let sink = Arc::new(RecordingSink::new().failing_times(1));
        let adapter =
            SubmissionAdapter::new(sink.clone(), Arc::new(FixedDevice(DeviceType::Desktop)));

        let err = adapter.send(adapter.prepare(&request())).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Rejected(_)));
        assert!(sink.bundles().is_empty());
    }
}
