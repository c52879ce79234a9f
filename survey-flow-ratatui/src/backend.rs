//! Ratatui renderer for survey sessions.
//!
//! Draws the welcome, section, question and completion screens of a
//! [`Session`] in a styled terminal UI and turns key presses into session
//! transitions.

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    prelude::CrosstermBackend,
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use survey_flow::progress::parse_progress_label;
use survey_flow::{
    AnswerableQuestion, Notice, QuestionKind, Screen, ScreenView, Session, SurveyDefinition,
    Transition,
};
use thiserror::Error;

use crate::input::{InputState, Intent};

/// Error type for the Ratatui renderer.
#[derive(Debug, Error)]
pub enum RatatuiError {
    /// User left the survey before finishing (e.g., pressed Esc).
    #[error("Survey cancelled by user")]
    Cancelled,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Color theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub background: Color,
    pub text: Color,
    pub highlight: Color,
    pub error: Color,
    pub success: Color,
    pub border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Cyan,
            secondary: Color::Blue,
            background: Color::Reset,
            text: Color::White,
            highlight: Color::Yellow,
            error: Color::Red,
            success: Color::Green,
            border: Color::Gray,
        }
    }
}

/// Ratatui-based respondent UI.
///
/// Questions are shown one at a time with progress tracking and keyboard
/// navigation. All state changes go through the session.
#[derive(Debug, Clone)]
pub struct RatatuiBackend {
    /// Title shown at the top; the survey title when unset.
    title: Option<String>,
    /// Color theme for the UI.
    theme: Theme,
}

impl Default for RatatuiBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RatatuiBackend {
    /// Create a new Ratatui backend with default settings.
    pub fn new() -> Self {
        Self {
            title: None,
            theme: Theme::default(),
        }
    }

    /// Override the title shown at the top of every screen.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set a custom color theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    fn setup_terminal(&self) -> Result<Terminal<CrosstermBackend<Stdout>>, RatatuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    fn restore_terminal(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> Result<(), RatatuiError> {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        Ok(())
    }

    /// Run the session in the terminal until the respondent quits.
    ///
    /// Quitting from the done screen is a normal exit; quitting anywhere else
    /// returns [`RatatuiError::Cancelled`]. Key reads block the calling thread.
    pub async fn run(&self, session: &mut Session) -> Result<(), RatatuiError> {
        let mut terminal = self.setup_terminal()?;
        let result = self.event_loop(&mut terminal, session).await;
        self.restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        session: &mut Session,
    ) -> Result<(), RatatuiError> {
        let mut input = InputState::default();
        loop {
            input.sync(&session.view());
            terminal.draw(|frame| {
                self.draw(frame, session.definition(), &session.view(), &input);
            })?;

            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            let intent = input.handle_key(&session.view(), key.code);
            let transition = match intent {
                Intent::None => continue,
                Intent::Quit if session.machine().screen().is_done() => return Ok(()),
                Intent::Quit => return Err(RatatuiError::Cancelled),
                Intent::Start => session.start(),
                Intent::Continue => session.continue_from_section(),
                Intent::Back => session.back(),
                Intent::Skip(id) => session.record_skip(id),
                Intent::Answer(id, value) => session.record_answer(id, value),
                Intent::Retry => session.request_retry(),
            };
            if let Transition::Blocked(reason) = transition {
                tracing::debug!(?reason, "key press had no effect");
            }

            if session.has_outgoing() {
                // Show the in-flight notice while the bundle is sent.
                input.sync(&session.view());
                terminal.draw(|frame| {
                    self.draw(frame, session.definition(), &session.view(), &input);
                })?;
                session.deliver().await;
            }
        }
    }

    fn title<'a>(&'a self, definition: &'a SurveyDefinition) -> &'a str {
        self.title.as_deref().unwrap_or(&definition.title)
    }

    /// Draw the current screen.
    pub(crate) fn draw(
        &self,
        frame: &mut Frame,
        definition: &SurveyDefinition,
        view: &ScreenView<'_>,
        input: &InputState,
    ) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(2), // Progress bar
                Constraint::Min(10),   // Content
                Constraint::Length(3), // Help
            ])
            .split(area);

        let header = Paragraph::new(self.title(definition).to_string())
            .style(Style::default().fg(self.theme.primary).bold())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(self.theme.border)),
            );
        frame.render_widget(header, chunks[0]);

        let progress = view.progress_label.as_deref().and_then(parse_progress_label);
        if let Some((current, total)) = progress {
            self.draw_progress(frame, chunks[1], current, total);
        } else if let Some(section) = &view.section {
            let text = Paragraph::new(section.progress.to_string())
                .style(Style::default().fg(self.theme.secondary))
                .alignment(Alignment::Center);
            frame.render_widget(text, chunks[1]);
        }

        match view.screen {
            Screen::Welcome => self.draw_welcome(frame, chunks[2], definition, view),
            Screen::SectionTransition { .. } => self.draw_section(frame, chunks[2], view),
            Screen::Question { .. } => {
                if let Some(question) = view.current_question {
                    self.draw_question(frame, chunks[2], question, input);
                }
            }
            Screen::Done => self.draw_done(frame, chunks[2], definition, view),
        }

        let help = Paragraph::new(help_text(view))
            .style(Style::default().fg(self.theme.border))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(self.theme.border)),
            );
        frame.render_widget(help, chunks[3]);
    }

    fn draw_progress(&self, frame: &mut Frame, area: Rect, current: usize, total: usize) {
        let progress_text = format!(" {current} of {total} ");
        let bar_width = area.width.saturating_sub(2);
        let text_width = u16::try_from(progress_text.chars().count()).unwrap_or(bar_width);

        let ratio = current as f32 / total.max(1) as f32;
        let filled_width = ((ratio * f32::from(bar_width)) as u16).min(bar_width);

        let bar_x = area.x + 1;
        let track = "─".repeat(usize::from(bar_width));
        let track_widget = Paragraph::new(track).style(Style::default().fg(self.theme.border));
        frame.render_widget(track_widget, Rect::new(bar_x, area.y, bar_width, 1));

        if filled_width > 0 {
            let filled = "━".repeat(usize::from(filled_width));
            let filled_widget =
                Paragraph::new(filled).style(Style::default().fg(self.theme.primary));
            frame.render_widget(filled_widget, Rect::new(bar_x, area.y, filled_width, 1));
        }

        if area.height > 1 {
            let text_x = bar_x + bar_width.saturating_sub(text_width) / 2;
            let text_widget =
                Paragraph::new(progress_text).style(Style::default().fg(self.theme.secondary));
            frame.render_widget(
                text_widget,
                Rect::new(text_x, area.y + 1, text_width.min(bar_width), 1),
            );
        }
    }

    fn draw_notice(&self, frame: &mut Frame, area: Rect, notice: &Notice) {
        let color = if notice.is_error() {
            self.theme.error
        } else {
            self.theme.success
        };
        let widget = Paragraph::new(notice.to_string())
            .style(Style::default().fg(color).bold())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(widget, area);
    }

    fn draw_welcome(
        &self,
        frame: &mut Frame,
        area: Rect,
        definition: &SurveyDefinition,
        view: &ScreenView<'_>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(area);

        let mut text = definition.welcome_message.clone().unwrap_or_default();
        if let Some(description) = &definition.description {
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str(description);
        }
        if view.enabled_actions.next {
            text.push_str("\n\nPress Enter to begin.");
        }

        let body = Paragraph::new(text.trim_start().to_string())
            .style(Style::default().fg(self.theme.text))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.primary))
                    .title(" Welcome ")
                    .title_style(Style::default().fg(self.theme.highlight)),
            );
        frame.render_widget(body, chunks[0]);

        if let Some(notice) = &view.notice {
            self.draw_notice(frame, chunks[1], notice);
        }
    }

    fn draw_section(&self, frame: &mut Frame, area: Rect, view: &ScreenView<'_>) {
        let Some(section) = &view.section else {
            return;
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.primary))
            .title(format!(" {} ", section.progress))
            .title_style(Style::default().fg(self.theme.highlight));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let centered = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Length(2),
                Constraint::Min(3),
            ])
            .split(inner);

        let name = Paragraph::new(section.name.to_string())
            .style(Style::default().fg(self.theme.primary).bold())
            .alignment(Alignment::Center);
        frame.render_widget(name, centered[1]);

        if let Some(description) = section.description {
            let description = Paragraph::new(description)
                .style(Style::default().fg(self.theme.text))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(description, centered[2]);
        }
    }

    fn draw_question(
        &self,
        frame: &mut Frame,
        area: Rect,
        question: &AnswerableQuestion,
        input: &InputState,
    ) {
        let content_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Question prompt
                Constraint::Min(5),    // Input area
                Constraint::Length(2), // Error message
            ])
            .split(area);

        let title = if question.is_required() {
            format!(" {} ", question.section_name())
        } else {
            format!(" {} (optional) ", question.section_name())
        };
        let prompt = Paragraph::new(question.text().to_string())
            .style(Style::default().fg(self.theme.text))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.primary))
                    .title(title)
                    .title_style(Style::default().fg(self.theme.highlight)),
            );
        frame.render_widget(prompt, content_chunks[0]);

        let input_area = content_chunks[1];
        match question.kind() {
            QuestionKind::FreeText => {
                let input_block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.border))
                    .title(" Your answer ")
                    .title_style(Style::default().fg(self.theme.secondary));
                let input_widget = Paragraph::new(input.input.clone())
                    .style(Style::default().fg(self.theme.text))
                    .block(input_block);
                frame.render_widget(input_widget, input_area);

                let cursor_x = input_area.x + 1 + u16::try_from(input.cursor_pos).unwrap_or(0);
                frame.set_cursor_position((cursor_x, input_area.y + 1));
            }
            QuestionKind::Scale(scale) => {
                let items = (1..=scale.scale)
                    .map(|point| {
                        let label = scale
                            .label_for(point)
                            .map(|l| format!("  {point}  {l}"))
                            .unwrap_or_else(|| format!("  {point}"));
                        self.option_item(label, usize::from(point - 1) == input.selected_option)
                    })
                    .collect();
                let selected = input.selected_option;
                self.draw_list(frame, input_area, items, " Select a rating ", selected);
            }
            QuestionKind::SingleChoice(choice) => {
                let items = choice
                    .options
                    .iter()
                    .enumerate()
                    .map(|(i, option)| {
                        self.option_item(format!("  {option}"), i == input.selected_option)
                    })
                    .collect();
                self.draw_list(frame, input_area, items, " Select one ", input.selected_option);
            }
            QuestionKind::MultiChoice(choice) => {
                let items = choice
                    .options
                    .iter()
                    .enumerate()
                    .map(|(i, option)| {
                        let is_selected = input.multi_selected.get(i).copied().unwrap_or(false);
                        let checkbox = if is_selected { "[✓]" } else { "[ ]" };
                        let style = if i == input.selected_option {
                            Style::default().fg(self.theme.highlight).bold()
                        } else if is_selected {
                            Style::default().fg(self.theme.secondary)
                        } else {
                            Style::default().fg(self.theme.text)
                        };
                        ListItem::new(format!("  {checkbox} {option}")).style(style)
                    })
                    .collect();
                let selected_count = input.multi_selected.iter().filter(|&&x| x).count();
                let title = format!(" Select all that apply ({selected_count} selected) ");
                self.draw_list(frame, input_area, items, &title, input.selected_option);
            }
        }

        if let Some(error) = &input.error_message {
            let error_widget = Paragraph::new(error.clone())
                .style(Style::default().fg(self.theme.error).bold())
                .alignment(Alignment::Center);
            frame.render_widget(error_widget, content_chunks[2]);
        }
    }

    fn option_item(&self, text: String, highlighted: bool) -> ListItem<'static> {
        let style = if highlighted {
            Style::default().fg(self.theme.highlight).bold()
        } else {
            Style::default().fg(self.theme.text)
        };
        ListItem::new(text).style(style)
    }

    fn draw_list(
        &self,
        frame: &mut Frame,
        area: Rect,
        items: Vec<ListItem<'static>>,
        title: &str,
        selected: usize,
    ) {
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.border))
                    .title(title.to_string())
                    .title_style(Style::default().fg(self.theme.secondary)),
            )
            .highlight_symbol("► ");

        let mut list_state = ListState::default();
        list_state.select(Some(selected));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_done(
        &self,
        frame: &mut Frame,
        area: Rect,
        definition: &SurveyDefinition,
        view: &ScreenView<'_>,
    ) {
        let failed = view.submission_status.is_failed();
        let border = if failed { self.theme.error } else { self.theme.success };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Complete ")
            .title_style(Style::default().fg(border).bold());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let centered = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(inner);

        let text = match &definition.thank_you_message {
            Some(message) if !failed => message.clone(),
            _ => "All questions answered!".to_string(),
        };
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(self.theme.text))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, centered[1]);

        if let Some(notice) = &view.notice {
            self.draw_notice(frame, centered[2], notice);
        }
    }
}

fn help_text(view: &ScreenView<'_>) -> String {
    let actions = view.enabled_actions;
    let mut keys: Vec<&str> = Vec::new();
    match view.screen {
        Screen::Welcome => {
            if actions.next {
                keys.push("Enter: Begin");
            }
        }
        Screen::SectionTransition { .. } => keys.extend(["Enter: Continue", "←: Back"]),
        Screen::Question { .. } => {
            match view.current_question.map(|q| q.kind()) {
                Some(QuestionKind::MultiChoice(_)) => {
                    keys.extend(["↑/↓: Navigate", "Space: Toggle", "Enter: Confirm"]);
                }
                Some(QuestionKind::FreeText) => keys.push("Enter: Submit"),
                _ => keys.extend(["↑/↓: Select", "Enter: Confirm"]),
            }
            if actions.skip {
                keys.push("Tab: Skip");
            }
            keys.push("Backspace: Back");
        }
        Screen::Done => {
            if actions.retry {
                keys.push("r: Retry");
            }
            keys.extend(["←: Back", "Enter: Finish"]);
        }
    }
    if !view.screen.is_done() {
        keys.push("Esc: Cancel");
    }
    keys.join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use survey_flow::{
        ChoiceQuestion, FlowMachine, QuestionKind, ScaleQuestion, SessionMode,
    };

    fn render(flow: &FlowMachine, definition: &SurveyDefinition) -> String {
        let backend = RatatuiBackend::new();
        let mut input = InputState::default();
        let view = flow.view();
        input.sync(&view);

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| backend.draw(frame, definition, &view, &input))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn questions() -> Vec<AnswerableQuestion> {
        vec![
            AnswerableQuestion::new(
                "q1",
                "My manager listens to me",
                QuestionKind::Scale(
                    ScaleQuestion::new(5).with_labels(vec!["Disagree".into(), "Agree".into()]),
                ),
                "Engagement/Manager Relationships",
            ),
            AnswerableQuestion::new(
                "q2",
                "Pick a channel",
                QuestionKind::SingleChoice(ChoiceQuestion::new(vec![
                    "Email".into(),
                    "Chat".into(),
                ])),
                "Peer/Team Dynamics",
            ),
        ]
    }

    #[test]
    fn backend_creation() {
        let _backend = RatatuiBackend::new();
        let _with_title = RatatuiBackend::new().with_title("Test");
        let _with_theme = RatatuiBackend::new().with_theme(Theme::default());
    }

    #[test]
    fn error_types() {
        let err = RatatuiError::Cancelled;
        assert_eq!(err.to_string(), "Survey cancelled by user");

        let err = RatatuiError::from(io::Error::other("tty gone"));
        assert_eq!(err.to_string(), "I/O error: tty gone");
    }

    #[test]
    fn theme_default() {
        let theme = Theme::default();
        assert_eq!(theme.primary, Color::Cyan);
        assert_eq!(theme.error, Color::Red);
        assert_eq!(theme.success, Color::Green);
    }

    #[test]
    fn title_falls_back_to_survey_title() {
        let definition = SurveyDefinition::new("s", "Pulse");
        assert_eq!(RatatuiBackend::new().title(&definition), "Pulse");
        assert_eq!(RatatuiBackend::new().with_title("Custom").title(&definition), "Custom");
    }

    #[test]
    fn welcome_shows_message() {
        let definition = SurveyDefinition::new("s", "Pulse").with_welcome_message("Hello team");
        let flow = FlowMachine::new("s", "t", questions(), SessionMode::Live);
        let screen = render(&flow, &definition);
        assert!(screen.contains("Pulse"));
        assert!(screen.contains("Hello team"));
        assert!(screen.contains("Enter: Begin"));
    }

    #[test]
    fn empty_survey_shows_notice() {
        let definition = SurveyDefinition::new("s", "Pulse");
        let flow = FlowMachine::new("s", "t", Vec::new(), SessionMode::Live);
        let screen = render(&flow, &definition);
        assert!(screen.contains("no questions"));
        assert!(!screen.contains("Enter: Begin"));
    }

    #[test]
    fn section_screen_shows_progress_and_description() {
        let definition = SurveyDefinition::new("s", "Pulse");
        let mut flow = FlowMachine::new("s", "t", questions(), SessionMode::Live);
        flow.start();
        let screen = render(&flow, &definition);
        assert!(screen.contains("Section 1 of 2"));
        assert!(screen.contains("Engagement/Manager Relationships"));
    }

    #[test]
    fn question_screen_shows_scale_labels() {
        let definition = SurveyDefinition::new("s", "Pulse");
        let mut flow = FlowMachine::new("s", "t", questions(), SessionMode::Live);
        flow.start();
        flow.continue_from_section();
        let screen = render(&flow, &definition);
        assert!(screen.contains("1 of 2"));
        assert!(screen.contains("My manager listens to me"));
        assert!(screen.contains("Disagree"));
        assert!(screen.contains("Agree"));
    }

    #[test]
    fn done_screen_shows_submission_in_flight() {
        let definition = SurveyDefinition::new("s", "Pulse");
        let mut flow = FlowMachine::new("s", "t", questions(), SessionMode::Live);
        flow.start();
        flow.continue_from_section();
        flow.answer("q1", "4");
        flow.continue_from_section();
        flow.answer("q2", "Chat");

        let screen = render(&flow, &definition);
        assert!(screen.contains("Submitting your responses..."));
        assert!(!screen.contains("r: Retry"));
    }

    #[test]
    fn done_screen_offers_retry_after_failure() {
        let definition = SurveyDefinition::new("s", "Pulse").with_thank_you_message("Thanks!");
        let mut flow = FlowMachine::new("s", "t", questions(), SessionMode::Live);
        flow.start();
        flow.continue_from_section();
        flow.answer("q1", "4");
        flow.continue_from_section();
        flow.answer("q2", "Chat");
        flow.record_submission(Err("offline".into()));

        let screen = render(&flow, &definition);
        assert!(screen.contains("r: Retry"));
        assert!(screen.contains("offline"));
        assert!(!screen.contains("Thanks!"));

        flow.retry_submission();
        flow.record_submission(Ok(()));
        let screen = render(&flow, &definition);
        assert!(screen.contains("Thanks!"));
        assert!(!screen.contains("r: Retry"));
    }
}
