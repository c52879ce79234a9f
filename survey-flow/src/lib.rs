//! # survey-flow
//!
//! Respondent-side survey engine. Presentation-agnostic.
//!
//! This crate turns a stored survey definition into an ordered, section-framed
//! sequence of questions, walks a respondent through them and submits the
//! collected answers exactly once.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use survey_flow::{Session, SubmissionAdapter, Transition};
//! use survey_flow::device::FixedDevice;
//!
//! let adapter = SubmissionAdapter::new(sink, Arc::new(FixedDevice(DeviceType::Desktop)));
//! let mut session = Session::builder("token-123")
//!     .open(&surveys, &question_bank, adapter)
//!     .await?;
//!
//! session.start();
//! session.continue_from_section();
//! session.answer("q1", "4").await;
//! ```
//!
//! ## Pieces
//!
//! - [`resolver`] - Resolve a definition into canonically ordered questions
//! - [`sections`] - Section grouping and "section N of M" progress
//! - [`FlowMachine`] - The synchronous screen state machine
//! - [`SubmissionAdapter`] - Bundle building and delivery
//! - [`Session`] - Async driver over the collaborator traits
//! - [`memory`], [`snapshot`], [`device`] - Ready-made collaborators
//!
//! ## Renderers
//!
//! Renderers draw a [`ScreenView`] and report user intent back to the session:
//! - `survey-flow-ratatui` - Terminal renderer

// Re-export all types from survey-flow-types
pub use survey_flow_types::*;

mod config;
pub use config::{ConfigError, FlowConfig};

pub mod device;
pub mod memory;
pub mod progress;
pub mod resolver;
pub mod sections;
pub mod snapshot;

mod flow;
pub use flow::{
    Blocked, FlowMachine, Screen, SessionMode, SubmissionStatus, SubmitRequest, Transition,
};

mod view;
pub use view::{EnabledActions, Notice, ScreenView, SectionView};

mod submission;
pub use submission::{SubmissionAdapter, SubmissionError};

mod session;
pub use session::{Session, SessionBuilder, SessionError};
