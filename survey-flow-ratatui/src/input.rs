//! Key handling for the respondent screens.

use crossterm::event::KeyCode;
use survey_flow::{QuestionId, QuestionKind, ResponseValue, Screen, ScreenView};

/// What the respondent asked for with a key press.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Intent {
    /// The key only changed local input state, or did nothing.
    None,
    Quit,
    Start,
    Continue,
    Back,
    Skip(QuestionId),
    Answer(QuestionId, ResponseValue),
    Retry,
}

/// Input being edited on the current question screen.
#[derive(Debug, Default)]
pub(crate) struct InputState {
    /// The question this input belongs to.
    question: Option<QuestionId>,
    /// Text typed so far.
    pub(crate) input: String,
    /// Cursor position, in characters.
    pub(crate) cursor_pos: usize,
    /// For scale and choice questions: highlighted option.
    pub(crate) selected_option: usize,
    /// For multi-choice questions: which options are ticked.
    pub(crate) multi_selected: Vec<bool>,
    /// Input problem shown under the question.
    pub(crate) error_message: Option<String>,
}

/// Number of selectable rows for a question kind.
pub(crate) fn option_count(kind: &QuestionKind) -> usize {
    match kind {
        QuestionKind::Scale(scale) => usize::from(scale.scale),
        QuestionKind::SingleChoice(choice) | QuestionKind::MultiChoice(choice) => {
            choice.options.len()
        }
        QuestionKind::FreeText => 0,
    }
}

impl InputState {
    /// Reset the input when the screen shows a different question, prefilled
    /// with the answer recorded for it.
    pub(crate) fn sync(&mut self, view: &ScreenView<'_>) {
        let current = view.current_question.map(|q| q.id());
        if current == self.question.as_ref() {
            return;
        }
        *self = Self {
            question: current.cloned(),
            ..Self::default()
        };
        let Some(question) = view.current_question else {
            return;
        };

        let answer = view.current_answer;
        match question.kind() {
            QuestionKind::Scale(scale) => {
                let point = answer
                    .and_then(ResponseValue::as_text)
                    .and_then(|text| text.parse::<u8>().ok())
                    .filter(|point| (1..=scale.scale).contains(point));
                self.selected_option =
                    point.map_or(usize::from(scale.scale / 2), |p| usize::from(p - 1));
            }
            QuestionKind::SingleChoice(choice) => {
                let text = answer.and_then(ResponseValue::as_text);
                self.selected_option = choice
                    .options
                    .iter()
                    .position(|option| Some(option.as_str()) == text)
                    .unwrap_or(0);
            }
            QuestionKind::MultiChoice(choice) => {
                let chosen = answer.and_then(ResponseValue::as_selections).unwrap_or(&[]);
                self.multi_selected = choice.options.iter().map(|o| chosen.contains(o)).collect();
            }
            QuestionKind::FreeText => {
                if let Some(text) = answer.and_then(ResponseValue::as_text) {
                    self.input = text.to_string();
                    self.cursor_pos = self.input.chars().count();
                }
            }
        }
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_pos)
            .map_or(self.input.len(), |(i, _)| i)
    }

    fn handle_input(&mut self, key: KeyCode) {
        let len = self.input.chars().count();
        match key {
            KeyCode::Char(c) => {
                let at = self.byte_index();
                self.input.insert(at, c);
                self.cursor_pos += 1;
                self.error_message = None;
            }
            KeyCode::Backspace => {
                if self.cursor_pos > 0 {
                    self.cursor_pos -= 1;
                    let at = self.byte_index();
                    self.input.remove(at);
                    self.error_message = None;
                }
            }
            KeyCode::Delete => {
                if self.cursor_pos < len {
                    let at = self.byte_index();
                    self.input.remove(at);
                    self.error_message = None;
                }
            }
            KeyCode::Left => {
                self.cursor_pos = self.cursor_pos.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.cursor_pos < len {
                    self.cursor_pos += 1;
                }
            }
            KeyCode::Home => {
                self.cursor_pos = 0;
            }
            KeyCode::End => {
                self.cursor_pos = len;
            }
            _ => {}
        }
    }

    /// Map a key press on the current screen to an intent.
    pub(crate) fn handle_key(&mut self, view: &ScreenView<'_>, key: KeyCode) -> Intent {
        let actions = view.enabled_actions;
        match view.screen {
            Screen::Welcome => match key {
                KeyCode::Esc => Intent::Quit,
                KeyCode::Enter if actions.next => Intent::Start,
                _ => Intent::None,
            },
            Screen::SectionTransition { .. } => match key {
                KeyCode::Esc => Intent::Quit,
                KeyCode::Enter => Intent::Continue,
                KeyCode::Left | KeyCode::Backspace => Intent::Back,
                _ => Intent::None,
            },
            Screen::Done => match key {
                KeyCode::Esc | KeyCode::Enter => Intent::Quit,
                KeyCode::Char('r') if actions.retry => Intent::Retry,
                KeyCode::Left | KeyCode::Backspace if actions.back => Intent::Back,
                _ => Intent::None,
            },
            Screen::Question { .. } => match view.current_question {
                Some(question) => self.handle_question_key(question, actions.skip, key),
                None => Intent::None,
            },
        }
    }

    fn handle_question_key(
        &mut self,
        question: &survey_flow::AnswerableQuestion,
        skippable: bool,
        key: KeyCode,
    ) -> Intent {
        let kind = question.kind();
        let rows = option_count(kind);
        let id = question.id().clone();

        match key {
            KeyCode::Esc => Intent::Quit,
            KeyCode::Tab if skippable => Intent::Skip(id),
            KeyCode::Tab => {
                self.error_message = Some("This question can't be skipped".to_string());
                Intent::None
            }
            KeyCode::Enter => match self.value_for(kind) {
                Some(value) => Intent::Answer(id, value),
                None if skippable => Intent::Skip(id),
                None => {
                    self.error_message = Some("Please answer this question".to_string());
                    Intent::None
                }
            },
            KeyCode::Backspace if self.input.is_empty() => Intent::Back,
            KeyCode::Left if rows > 0 => Intent::Back,
            KeyCode::Up if rows > 0 => {
                self.selected_option = self.selected_option.saturating_sub(1);
                Intent::None
            }
            KeyCode::Down if rows > 0 => {
                if self.selected_option + 1 < rows {
                    self.selected_option += 1;
                }
                Intent::None
            }
            KeyCode::Char(' ') if matches!(kind, QuestionKind::MultiChoice(_)) => {
                if self.multi_selected.len() != rows {
                    self.multi_selected = vec![false; rows];
                }
                if let Some(ticked) = self.multi_selected.get_mut(self.selected_option) {
                    *ticked = !*ticked;
                }
                self.error_message = None;
                Intent::None
            }
            _ if rows == 0 => {
                self.handle_input(key);
                Intent::None
            }
            _ => Intent::None,
        }
    }

    /// The answer the current input represents, if any.
    fn value_for(&self, kind: &QuestionKind) -> Option<ResponseValue> {
        match kind {
            QuestionKind::Scale(scale) => {
                let point = u8::try_from(self.selected_option + 1).ok()?;
                (point <= scale.scale).then(|| ResponseValue::Text(point.to_string()))
            }
            QuestionKind::SingleChoice(choice) => choice
                .options
                .get(self.selected_option)
                .map(|option| ResponseValue::Text(option.clone())),
            QuestionKind::MultiChoice(choice) => {
                let chosen: Vec<String> = choice
                    .options
                    .iter()
                    .zip(&self.multi_selected)
                    .filter(|(_, ticked)| **ticked)
                    .map(|(option, _)| option.clone())
                    .collect();
                (!chosen.is_empty()).then_some(ResponseValue::Selections(chosen))
            }
            QuestionKind::FreeText => {
                let text = self.input.trim();
                (!text.is_empty()).then(|| ResponseValue::Text(text.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_flow::{
        AnswerableQuestion, ChoiceQuestion, FlowConfig, FlowMachine, QuestionKindTag,
        ScaleQuestion, SessionMode,
    };

    fn flow() -> FlowMachine {
        let questions = vec![
            AnswerableQuestion::new(
                "scale",
                "How are you?",
                QuestionKind::Scale(ScaleQuestion::new(5)),
                "A",
            ),
            AnswerableQuestion::new(
                "multi",
                "Which apply?",
                QuestionKind::MultiChoice(ChoiceQuestion::new(vec![
                    "x".into(),
                    "y".into(),
                    "z".into(),
                ])),
                "A",
            ),
            AnswerableQuestion::new("text", "Anything else?", QuestionKind::FreeText, "A"),
        ];
        let config = FlowConfig::default()
            .with_section_framing(false)
            .with_skippable_kind(QuestionKindTag::FreeText);
        let mut flow =
            FlowMachine::new("s", "t", questions, SessionMode::Preview).with_config(config);
        flow.start();
        flow
    }

    fn press(flow: &FlowMachine, input: &mut InputState, key: KeyCode) -> Intent {
        let view = flow.view();
        input.sync(&view);
        input.handle_key(&view, key)
    }

    #[test]
    fn scale_starts_in_the_middle() {
        let flow = flow();
        let mut input = InputState::default();
        assert_eq!(
            press(&flow, &mut input, KeyCode::Enter),
            Intent::Answer("scale".into(), ResponseValue::Text("3".into()))
        );

        press(&flow, &mut input, KeyCode::Down);
        press(&flow, &mut input, KeyCode::Down);
        press(&flow, &mut input, KeyCode::Down);
        assert_eq!(
            press(&flow, &mut input, KeyCode::Enter),
            Intent::Answer("scale".into(), ResponseValue::Text("5".into()))
        );
    }

    #[test]
    fn required_multi_choice_needs_a_tick() {
        let mut flow = flow();
        flow.answer("scale", "3");
        let mut input = InputState::default();

        assert_eq!(press(&flow, &mut input, KeyCode::Enter), Intent::None);
        assert!(input.error_message.is_some());
        assert_eq!(press(&flow, &mut input, KeyCode::Tab), Intent::None);

        press(&flow, &mut input, KeyCode::Char(' '));
        press(&flow, &mut input, KeyCode::Down);
        press(&flow, &mut input, KeyCode::Down);
        press(&flow, &mut input, KeyCode::Char(' '));
        assert_eq!(
            press(&flow, &mut input, KeyCode::Enter),
            Intent::Answer("multi".into(), ResponseValue::Selections(vec!["x".into(), "z".into()]))
        );
    }

    #[test]
    fn free_text_editing_and_skip() {
        let mut flow = flow();
        flow.answer("scale", "3");
        flow.answer("multi", vec!["y"]);
        let mut input = InputState::default();

        assert_eq!(press(&flow, &mut input, KeyCode::Enter), Intent::Skip("text".into()));
        for c in "héllo".chars() {
            press(&flow, &mut input, KeyCode::Char(c));
        }
        press(&flow, &mut input, KeyCode::Left);
        press(&flow, &mut input, KeyCode::Backspace);
        assert_eq!(input.input, "hélo");
        assert_eq!(
            press(&flow, &mut input, KeyCode::Enter),
            Intent::Answer("text".into(), ResponseValue::Text("hélo".into()))
        );
    }

    #[test]
    fn backspace_on_empty_input_goes_back() {
        let mut flow = flow();
        flow.answer("scale", "3");
        flow.answer("multi", vec!["y"]);
        let mut input = InputState::default();
        assert_eq!(press(&flow, &mut input, KeyCode::Backspace), Intent::Back);
    }

    #[test]
    fn going_back_prefills_previous_answer() {
        let mut flow = flow();
        flow.answer("scale", "4");
        flow.answer("multi", vec!["y", "z"]);
        flow.back();
        let mut input = InputState::default();
        input.sync(&flow.view());
        assert_eq!(input.multi_selected, [false, true, true]);

        flow.back();
        input.sync(&flow.view());
        assert_eq!(input.selected_option, 3);
    }

    #[test]
    fn stored_choice_without_options_takes_typed_text() {
        let question = survey_flow::QuestionBody::new("q1", "Pick one")
            .with_type("single-choice")
            .into_question("A")
            .unwrap();
        let mut flow = FlowMachine::new("s", "t", vec![question], SessionMode::Live)
            .with_config(FlowConfig::default().with_section_framing(false));
        flow.start();
        let mut input = InputState::default();

        assert_eq!(press(&flow, &mut input, KeyCode::Enter), Intent::None);
        press(&flow, &mut input, KeyCode::Char('a'));
        assert_eq!(
            press(&flow, &mut input, KeyCode::Enter),
            Intent::Answer("q1".into(), ResponseValue::Text("a".into()))
        );
    }

    #[test]
    fn welcome_and_done_keys() {
        let mut flow = FlowMachine::new("s", "t", Vec::new(), SessionMode::Live);
        let mut input = InputState::default();
        assert_eq!(press(&flow, &mut input, KeyCode::Enter), Intent::None);
        assert_eq!(press(&flow, &mut input, KeyCode::Esc), Intent::Quit);

        flow = self::flow();
        flow.answer("scale", "1");
        flow.answer("multi", vec!["x"]);
        flow.skip("text");
        assert!(flow.screen().is_done());
        assert_eq!(press(&flow, &mut input, KeyCode::Char('r')), Intent::None);
        assert_eq!(press(&flow, &mut input, KeyCode::Left), Intent::Back);
        assert_eq!(press(&flow, &mut input, KeyCode::Enter), Intent::Quit);
    }
}
