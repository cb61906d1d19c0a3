//! Per-conversation survey state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a conversation is in the survey.
///
/// Progresses linearly: NotStarted → AwaitingAnswer(0) → … →
/// AwaitingAnswer(n-1) → Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "step", rename_all = "snake_case")]
pub enum SurveyPhase {
    NotStarted,
    AwaitingAnswer(usize),
    Completed,
}

impl SurveyPhase {
    /// Whether this phase is terminal (survey is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for SurveyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::AwaitingAnswer(step) => write!(f, "awaiting_answer({step})"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// An in-progress survey.
///
/// Stored in the `dialog_state` slot while the survey is running.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Index of the question currently awaiting an answer.
    pub step: usize,
    /// Recognized choice labels, one per answered question.
    pub answers: Vec<String>,
}

impl Session {
    /// Record a recognized answer and move to the next step.
    pub fn record_answer(&mut self, answer: &str) {
        self.answers.push(answer.to_string());
        self.step += 1;
    }
}

/// Marker and payload of a finished survey.
///
/// Stored in the `survey_record` slot. Its presence stops the survey from restarting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub answers: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Everything persisted for one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    pub session: Option<Session>,
    pub record: Option<CompletionRecord>,
}

impl ConversationState {
    /// Derive the phase. A completion record wins over any leftover session.
    pub fn phase(&self) -> SurveyPhase {
        match (&self.record, &self.session) {
            (Some(_), _) => SurveyPhase::Completed,
            (None, Some(session)) => SurveyPhase::AwaitingAnswer(session.step),
            (None, None) => SurveyPhase::NotStarted,
        }
    }

    /// Answers collected so far, from the record if complete.
    pub fn answers(&self) -> &[String] {
        match (&self.record, &self.session) {
            (Some(record), _) => &record.answers,
            (None, Some(session)) => &session.answers,
            (None, None) => &[],
        }
    }
}

/// Transient summary handed to the completion reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub summary: String,
    pub question_count: usize,
}

impl CompletionReport {
    pub fn from_record(record: &CompletionRecord) -> Self {
        let question_count = record.answers.len();
        Self {
            summary: format!("Answers were given for {question_count} questions"),
            question_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_derivation() {
        let mut state = ConversationState::default();
        assert_eq!(state.phase(), SurveyPhase::NotStarted);
        assert!(state.answers().is_empty());

        state.session = Some(Session {
            step: 1,
            answers: vec!["Yes".into()],
        });
        assert_eq!(state.phase(), SurveyPhase::AwaitingAnswer(1));
        assert_eq!(state.answers(), ["Yes"]);

        state.record = Some(CompletionRecord {
            answers: vec!["Yes".into(), "No".into()],
            completed_at: Utc::now(),
        });
        assert_eq!(state.phase(), SurveyPhase::Completed);
        assert!(state.phase().is_terminal());
        assert_eq!(state.answers(), ["Yes", "No"]);
    }

    #[test]
    fn record_answer_advances_step() {
        let mut session = Session::default();
        session.record_answer("No");
        session.record_answer("Maybe");
        assert_eq!(session.step, 2);
        assert_eq!(session.answers, vec!["No", "Maybe"]);
    }

    #[test]
    fn report_summary_counts_answers() {
        let record = CompletionRecord {
            answers: vec!["No".into()],
            completed_at: Utc::now(),
        };
        let report = CompletionReport::from_record(&record);
        assert_eq!(report.question_count, 1);
        assert_eq!(report.summary, "Answers were given for 1 questions");
    }

    #[test]
    fn phase_serializes_with_step() {
        let json = serde_json::to_value(SurveyPhase::AwaitingAnswer(2)).unwrap();
        assert_eq!(json, serde_json::json!({"phase": "awaiting_answer", "step": 2}));
        let json = serde_json::to_value(SurveyPhase::Completed).unwrap();
        assert_eq!(json, serde_json::json!({"phase": "completed"}));
    }

    #[test]
    fn display_phase() {
        assert_eq!(SurveyPhase::NotStarted.to_string(), "not_started");
        assert_eq!(SurveyPhase::AwaitingAnswer(0).to_string(), "awaiting_answer(0)");
    }
}
