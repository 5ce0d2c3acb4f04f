//! Builds the student questionnaire: baseline steps plus a class's approved
//! questions, with the notes step always last.

use crate::models::domain::{
    step::NOTES_KEY, ActiveQuestion, AnswerValue, Answers, QuestionKind, Step, StepInput,
    StepOption,
};

fn question_to_step(question: &ActiveQuestion) -> Step {
    let options = || {
        question
            .kind
            .options()
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(StepOption::same)
            .collect::<Vec<_>>()
    };
    let input = match &question.kind {
        QuestionKind::Text => StepInput::Text,
        QuestionKind::Select { .. } => StepInput::Select { options: options() },
        QuestionKind::Multi { .. } => StepInput::Multi { options: options() },
    };

    Step {
        key: question.answer_key(),
        title: question.text.clone(),
        input,
        optional: false,
        placeholder: None,
    }
}

pub fn compose_steps(static_steps: &[Step], active_questions: &[ActiveQuestion]) -> Vec<Step> {
    let notes = static_steps.iter().find(|s| s.key == NOTES_KEY);

    let mut steps: Vec<Step> = static_steps
        .iter()
        .filter(|s| s.key != NOTES_KEY)
        .cloned()
        .collect();
    steps.extend(
        active_questions
            .iter()
            .filter(|q| q.is_visible)
            .map(question_to_step),
    );
    steps.extend(notes.cloned());
    steps
}

/// Whether `answer` satisfies `step`. Multi steps need a non-empty selection,
/// everything else a non-blank value.
pub fn is_step_answered(step: &Step, answer: Option<&AnswerValue>) -> bool {
    match (&step.input, answer) {
        (_, None) => false,
        (StepInput::Multi { .. }, Some(AnswerValue::Choices(choices))) => !choices.is_empty(),
        (StepInput::Multi { .. }, Some(_)) => false,
        (_, Some(value)) => !value.is_blank(),
    }
}

/// Keys of required steps that `answers` leaves unanswered, in step order.
pub fn missing_required<'a>(steps: &'a [Step], answers: &Answers) -> Vec<&'a str> {
    steps
        .iter()
        .filter(|s| !s.optional && !is_step_answered(s, answers.get(&s.key)))
        .map(|s| s.key.as_str())
        .collect()
}
