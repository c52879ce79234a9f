use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{QuestionId, ResponseValue, Responses};

/// Device class of the respondent, attached to every submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Desktop,
    Tablet,
    Mobile,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Desktop => "desktop",
            Self::Tablet => "tablet",
            Self::Mobile => "mobile",
        })
    }
}

/// The submission-ready payload of one respondent's answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBundle {
    pub survey_id: String,
    pub token: String,
    pub device_type: DeviceType,
    pub responses: BTreeMap<QuestionId, ResponseValue>,
}

impl ResponseBundle {
    /// Build a bundle, normalizing every answer.
    pub fn new(
        survey_id: impl Into<String>,
        token: impl Into<String>,
        device_type: DeviceType,
        responses: &Responses,
    ) -> Self {
        Self {
            survey_id: survey_id.into(),
            token: token.into(),
            device_type,
            responses: responses
                .iter()
                .map(|(id, value)| (id.clone(), value.normalized()))
                .collect(),
        }
    }
}
