//! A short engagement pulse check in the terminal.
//!
//! Run with: cargo run -p survey-flow-ratatui --example pulse_check
//!
//! Pass `--preview` to walk through placeholder questions instead.
//! Logs go to stderr; set `RUST_LOG=survey_flow=debug` to see every transition.

use std::sync::Arc;

use survey_flow::device::UserAgentClassifier;
use survey_flow::memory::{InMemoryQuestionBank, InMemorySurveyStore, RecordingSink};
use survey_flow::{
    FlowConfig, QuestionBody, QuestionKindTag, Session, SubmissionAdapter, SurveyDefinition,
};
use survey_flow_ratatui::RatatuiBackend;
use tracing_subscriber::EnvFilter;

fn pulse_check() -> SurveyDefinition {
    SurveyDefinition::new("pulse-2026-q4", "Quarterly Pulse Check")
        .with_welcome_message(
            "Thanks for sharing how things are going. This takes about two minutes.",
        )
        .with_thank_you_message("Thank you! Your answers help us improve.")
        .with_legacy_section(0, ["manager-listens", "manager-growth"])
        .with_legacy_section(2, ["feedback-channel"])
        .with_legacy_section(3, ["recognition-recent"])
        .with_site_specific("site-parking")
}

fn question_bank() -> InMemoryQuestionBank {
    InMemoryQuestionBank::new().with_questions([
        QuestionBody::new("manager-listens", "My manager listens to my ideas.").with_type("scale"),
        QuestionBody::new("manager-growth", "My manager supports my growth.").with_type("likert"),
        QuestionBody::new("feedback-channel", "How do you prefer to receive feedback?")
            .with_type("multiple-choice")
            .with_options(["One-on-one", "In writing", "In team meetings"]),
        QuestionBody::new("recognition-recent", "When were you last recognized for good work?")
            .with_type("single-choice")
            .with_options(["This week", "This month", "This quarter", "Longer ago"]),
        QuestionBody::new("site-parking", "Anything about the site we should know?")
            .with_type("text")
            .with_required(false),
    ])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let preview = std::env::args().any(|arg| arg == "--preview");
    let store = InMemorySurveyStore::new()
        .with_survey("demo", pulse_check())
        .with_preview("demo", SurveyDefinition::new("draft", "Pulse Check (draft)"));

    let sink = Arc::new(RecordingSink::new());
    let classifier = UserAgentClassifier::new(std::env::var("USER_AGENT").unwrap_or_default());
    let adapter = SubmissionAdapter::new(sink.clone(), Arc::new(classifier));

    let config = FlowConfig::default().with_skippable_kind(QuestionKindTag::FreeText);
    let mut session = Session::builder("demo")
        .preview(preview)
        .config(config)
        .open(&store, &question_bank(), adapter)
        .await?;

    RatatuiBackend::new().run(&mut session).await?;

    for bundle in sink.bundles() {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    }
    Ok(())
}
