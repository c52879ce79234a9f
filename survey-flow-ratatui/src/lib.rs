//! # survey-flow-ratatui
//!
//! Terminal renderer for `survey-flow` sessions.
//!
//! ```rust,ignore
//! use survey_flow_ratatui::RatatuiBackend;
//!
//! let mut session = Session::builder(token).open(&surveys, &questions, adapter).await?;
//! RatatuiBackend::new().run(&mut session).await?;
//! ```
//!
//! ## Keys
//! - `Enter` - Begin, continue, confirm an answer
//! - `↑`/`↓` - Move through scale points and options
//! - `Space` - Toggle an option of a multi-choice question
//! - `Tab` - Skip the question, where allowed
//! - `Backspace` on empty input, `←` - Go back
//! - `r` - Retry a failed submission
//! - `Esc` - Leave the survey

mod backend;
pub use backend::{RatatuiBackend, RatatuiError, Theme};

mod input;
