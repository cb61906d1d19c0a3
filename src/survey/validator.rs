//! Choice recognition for multiple-choice answers.

use super::catalog::QuestionDefinition;

/// A response that could not be recognized as one of the question's choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Explains how to answer ("enter the number assigned to your choice").
    pub hint: String,
    /// Re-prompt text, parameterized by the question title.
    pub retry_prompt: String,
}

/// Recognize `response` as one of `question`'s choices.
///
/// Accepts a one-based index ("2") or a label match that ignores surrounding
/// whitespace and case ("no"). Returns the canonical choice label.
pub fn recognize<'q>(
    response: &str,
    question: &'q QuestionDefinition,
) -> Result<&'q str, ValidationFailure> {
    let trimmed = response.trim();

    if let Ok(index) = trimmed.parse::<usize>() {
        if let Some(choice) = index.checked_sub(1).and_then(|i| question.choices.get(i)) {
            return Ok(choice);
        }
    }

    question
        .choices
        .iter()
        .find(|choice| same_label(choice, trimmed))
        .map(String::as_str)
        .ok_or_else(|| ValidationFailure {
            hint: unrecognized_hint(question.choices.len()),
            retry_prompt: retry_prompt(&question.title),
        })
}

/// Unicode-aware, case-insensitive label comparison.
fn same_label(choice: &str, response: &str) -> bool {
    choice.trim().to_lowercase() == response.to_lowercase()
}

/// `Sorry, please choose a {title} from the list.`
pub fn retry_prompt(title: &str) -> String {
    format!("Sorry, please choose a {title} from the list.")
}

fn unrecognized_hint(choice_count: usize) -> String {
    format!(
        "I'm sorry, I do not understand. Please enter the number assigned to your choice '{}'.",
        number_list(choice_count)
    )
}

/// "1", "1 or 2", "1, 2 or 3", ...
fn number_list(count: usize) -> String {
    let numbers: Vec<String> = (1..=count).map(|n| n.to_string()).collect();
    match numbers.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> QuestionDefinition {
        QuestionDefinition::new("Did you enjoy it?", "answer", &["Yes", "No", "Maybe"])
    }

    #[test]
    fn one_based_index_recognized() {
        let q = question();
        assert_eq!(recognize("1", &q), Ok("Yes"));
        assert_eq!(recognize("2", &q), Ok("No"));
        assert_eq!(recognize(" 3 ", &q), Ok("Maybe"));
    }

    #[test]
    fn out_of_range_index_rejected() {
        let q = question();
        assert!(recognize("0", &q).is_err());
        assert!(recognize("4", &q).is_err());
        assert!(recognize("-1", &q).is_err());
    }

    #[test]
    fn label_match_ignores_case_and_whitespace() {
        let q = question();
        assert_eq!(recognize("no", &q), Ok("No"));
        assert_eq!(recognize("  MAYBE\n", &q), Ok("Maybe"));
    }

    #[test]
    fn non_ascii_label_ignores_case() {
        let q = QuestionDefinition::new("How was it?", "rating", &["Très bien", "Élevé"]);
        assert_eq!(recognize("TRÈS BIEN", &q), Ok("Très bien"));
        assert_eq!(recognize("élevé", &q), Ok("Élevé"));
    }

    #[test]
    fn partial_label_not_recognized() {
        let q = question();
        assert!(recognize("Ye", &q).is_err());
        assert!(recognize("Yes please", &q).is_err());
        assert!(recognize("", &q).is_err());
    }

    #[test]
    fn failure_carries_retry_text() {
        let failure = recognize("banana", &question()).unwrap_err();
        assert_eq!(failure.retry_prompt, "Sorry, please choose a answer from the list.");
        assert!(failure.hint.contains("'1, 2 or 3'"), "{}", failure.hint);
    }

    #[test]
    fn number_list_formats() {
        assert_eq!(number_list(1), "1");
        assert_eq!(number_list(2), "1 or 2");
        assert_eq!(number_list(4), "1, 2, 3 or 4");
    }
}
