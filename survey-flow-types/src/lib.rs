//! Core types for the survey-flow crate.
//!
//! This crate provides the foundational types for taking surveys:
//! - `SurveyDefinition` - The stored survey with its question references
//! - `AnswerableQuestion` and `QuestionKind` - Resolved questions and their types
//! - `Responses`, `ResponseValue` and `ResponseBundle` - Collected and submitted answers
//! - The canonical section table
//! - `SurveyLookup`, `QuestionLookup`, `ResponseSink` and `DeviceClassifier` traits -
//!   The collaborators a survey session talks to

mod question_id;
pub use question_id::QuestionId;

mod response_value;
pub use response_value::ResponseValue;

mod responses;
pub use responses::{ResponseError, Responses};

mod question;
pub use question::{
    AnswerableQuestion, ChoiceQuestion, DEFAULT_SCALE, QuestionBody, QuestionKind,
    QuestionKindTag, ScaleQuestion,
};

mod definition;
pub use definition::{
    QuestionRef, QuestionReferences, SectionRecord, SectionedReference, SurveyDefinition,
};

pub mod section;
pub use section::{
    CANONICAL_SECTIONS, CanonicalSection, SITE_SPECIFIC_SECTION, UNKNOWN_SECTION,
};

mod bundle;
pub use bundle::{DeviceType, ResponseBundle};

mod error;
pub use error::LookupError;

mod traits;
pub use traits::{DeviceClassifier, QuestionLookup, ResponseSink, SurveyLookup, preview_key};
