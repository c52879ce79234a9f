//! Property tests for grouping, progress labels and navigation.

use proptest::prelude::*;
use survey_flow::progress::{parse_progress_label, question_progress_label};
use survey_flow::resolver::synthesize_preview;
use survey_flow::sections::group_sections;
use survey_flow::section::canonical_rank;
use survey_flow::{
    AnswerableQuestion, CANONICAL_SECTIONS, FlowMachine, QuestionKind, Screen, SessionMode,
    Transition,
};

/// Questions laid out as consecutive runs, one run per section.
fn sectioned_questions(run_lengths: &[usize]) -> Vec<AnswerableQuestion> {
    run_lengths
        .iter()
        .enumerate()
        .flat_map(|(section, &len)| {
            (0..len).map(move |n| {
                AnswerableQuestion::new(
                    format!("s{section}-q{n}"),
                    format!("Question {n}"),
                    QuestionKind::FreeText,
                    format!("Section {section}"),
                )
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Start,
    Continue,
    Answer,
    Back,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        1 => Just(Action::Start),
        1 => Just(Action::Continue),
        3 => Just(Action::Answer),
        1 => Just(Action::Back),
    ]
}

fn apply(flow: &mut FlowMachine, action: Action) -> Transition {
    match action {
        Action::Start => flow.start(),
        Action::Continue => flow.continue_from_section(),
        Action::Back => flow.back(),
        Action::Answer => {
            let id = flow.current_question().map(|q| q.id().clone());
            match id {
                Some(id) => flow.answer(id, "answer"),
                None => flow.answer("none", "answer"),
            }
        }
    }
}

proptest! {
    #[test]
    fn grouping_ignores_order_within_sections(
        runs in prop::collection::vec(1usize..5, 1..6),
        seed in any::<u64>(),
    ) {
        let questions = sectioned_questions(&runs);
        let expected: Vec<String> = (0..runs.len()).map(|s| format!("Section {s}")).collect();
        prop_assert_eq!(group_sections(&questions), expected.clone());

        // Shuffle inside every section run; the section sequence must not change.
        let mut shuffled = Vec::new();
        let mut start = 0;
        for (section, &len) in runs.iter().enumerate() {
            let mut run = questions[start..start + len].to_vec();
            let rotate = (seed as usize).wrapping_add(section) % len;
            run.rotate_left(rotate);
            if seed % 2 == 0 {
                run.reverse();
            }
            shuffled.extend(run);
            start += len;
        }
        prop_assert_eq!(group_sections(&shuffled), expected);
    }

    #[test]
    fn progress_label_round_trips(
        (index, total) in (1usize..10_000).prop_flat_map(|n| (0..n, Just(n))),
    ) {
        let label = question_progress_label(index, total);
        prop_assert_eq!(parse_progress_label(&label), Some((index + 1, total)));
    }

    #[test]
    fn traces_keep_one_answer_per_question(
        runs in prop::collection::vec(1usize..4, 1..4),
        framing in any::<bool>(),
        actions in prop::collection::vec(action(), 0..60),
    ) {
        let questions = sectioned_questions(&runs);
        let config = survey_flow::FlowConfig::default().with_section_framing(framing);
        let mut flow = FlowMachine::new("s", "t", questions.clone(), SessionMode::Preview)
            .with_config(config);

        for action in actions {
            let before = flow.screen().clone();
            let transition = apply(&mut flow, action);
            if transition.is_blocked() {
                prop_assert_eq!(flow.screen(), &before);
            }
            prop_assert!(flow.responses().len() <= questions.len());
            for (id, _) in flow.responses() {
                prop_assert!(questions.iter().any(|q| q.id() == id));
            }
            if !framing {
                let on_section_screen = matches!(flow.screen(), Screen::SectionTransition { .. });
                prop_assert!(!on_section_screen);
            }
        }
    }

    #[test]
    fn boundary_crossing_is_symmetric(runs in prop::collection::vec(1usize..4, 2..5)) {
        let questions = sectioned_questions(&runs);
        let mut flow = FlowMachine::new("s", "t", questions.clone(), SessionMode::Preview);
        flow.start();
        flow.continue_from_section();

        let mut index = 0;
        while index + 1 < questions.len() {
            let crosses = questions[index].section_name() != questions[index + 1].section_name();
            let id = questions[index].id().clone();
            let forward = flow.answer(id.clone(), "x");

            if crosses {
                prop_assert_eq!(flow.pending_section_entry_index(), Some(index + 1));
                let entered =
                    matches!(forward, Transition::Moved(Screen::SectionTransition { .. }));
                prop_assert!(entered);
                flow.continue_from_section();
                prop_assert_eq!(flow.screen(), &Screen::Question { index: index + 1 });

                flow.back();
                prop_assert_eq!(flow.pending_section_entry_index(), Some(index));
                flow.continue_from_section();
                prop_assert_eq!(flow.screen(), &Screen::Question { index });

                flow.answer(id, "x");
                flow.continue_from_section();
            }
            prop_assert_eq!(flow.screen(), &Screen::Question { index: index + 1 });
            index += 1;
        }
    }
}

#[test]
fn preview_synthesis_covers_every_canonical_section() {
    let questions = synthesize_preview();
    assert_eq!(questions.len(), 2 * CANONICAL_SECTIONS.len());
    assert!(questions.iter().all(|q| canonical_rank(q.section_name()).is_some()));
    assert_eq!(group_sections(&questions).len(), CANONICAL_SECTIONS.len());
}
