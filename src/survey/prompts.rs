//! User-facing survey text.

use super::catalog::QuestionDefinition;

/// Sent on every turn after the survey has been completed.
pub const ALREADY_COMPLETED: &str = "You have completed all questions, see you around.";

/// Sent once when the last question is answered.
pub const THANK_YOU: &str = "Thank you for taking the time to carry out the survey";

/// Sent after [`THANK_YOU`] with the number of answered questions.
pub fn answered_count(count: usize) -> String {
    format!("You answered {count} questions")
}

/// Render a question with its numbered choices.
pub fn render_question(question: &QuestionDefinition) -> String {
    with_choices(&question.text, question)
}

/// Render the retry prompt followed by the same numbered choices.
pub fn render_retry(question: &QuestionDefinition, retry_prompt: &str) -> String {
    with_choices(retry_prompt, question)
}

fn with_choices(lead: &str, question: &QuestionDefinition) -> String {
    let mut out = lead.to_string();
    for (i, choice) in question.choices.iter().enumerate() {
        out.push_str(&format!("\n   {}. {}", i + 1, choice));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_lists_numbered_choices() {
        let q = QuestionDefinition::new("Pick one", "answer", &["Yes", "No"]);
        assert_eq!(render_question(&q), "Pick one\n   1. Yes\n   2. No");
    }

    #[test]
    fn retry_keeps_choices() {
        let q = QuestionDefinition::new("Pick one", "answer", &["Yes"]);
        let text = render_retry(&q, "Sorry, please choose a answer from the list.");
        assert!(text.starts_with("Sorry, please choose a answer"));
        assert!(text.ends_with("1. Yes"));
    }
}
