//! Waterfall survey state machine.
//!
//! A pure transition function: given the persisted state of one conversation
//! and the text of one inbound turn, it returns the next state and the
//! effects the host must carry out (replies to send, reports to dispatch).
//! No I/O happens here.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::catalog::QuestionCatalog;
use super::prompts::{self, ALREADY_COMPLETED, THANK_YOU};
use super::state::{CompletionRecord, CompletionReport, ConversationState, Session};
use super::validator;

/// An outbound action produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send this text to the user.
    Reply(String),
    /// Hand this report to the completion reporter.
    Report(CompletionReport),
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ConversationState,
    pub effects: Vec<Effect>,
}

impl Transition {
    /// Texts of all `Reply` effects, in order.
    pub fn replies(&self) -> Vec<&str> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Reply(text) => Some(text.as_str()),
                Effect::Report(_) => None,
            })
            .collect()
    }

    /// All `Report` effects, in order.
    pub fn reports(&self) -> Vec<&CompletionReport> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Report(report) => Some(report),
                Effect::Reply(_) => None,
            })
            .collect()
    }
}

/// Sequences the catalog questions one turn at a time.
#[derive(Debug, Clone)]
pub struct SurveyMachine {
    catalog: Arc<QuestionCatalog>,
}

impl SurveyMachine {
    pub fn new(catalog: Arc<QuestionCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    /// Apply one inbound turn.
    ///
    /// `now` stamps the completion record when the last answer arrives.
    pub fn transition(
        &self,
        mut state: ConversationState,
        response: &str,
        now: DateTime<Utc>,
    ) -> Transition {
        if state.record.is_some() {
            return Transition {
                state,
                effects: vec![Effect::Reply(ALREADY_COMPLETED.to_string())],
            };
        }

        let Some(mut session) = state.session.take().filter(|s| self.is_resumable(s)) else {
            return self.begin(state);
        };
        let Some(question) = self.catalog.get(session.step) else {
            return self.begin(state);
        };

        let choice = match validator::recognize(response, question) {
            Ok(choice) => choice,
            Err(failure) => {
                let retry = prompts::render_retry(question, &failure.retry_prompt);
                state.session = Some(session);
                return Transition {
                    state,
                    effects: vec![Effect::Reply(failure.hint), Effect::Reply(retry)],
                };
            }
        };
        session.record_answer(choice);

        if let Some(next) = self.catalog.get(session.step) {
            let prompt = prompts::render_question(next);
            state.session = Some(session);
            return Transition {
                state,
                effects: vec![Effect::Reply(prompt)],
            };
        }

        let record = CompletionRecord {
            answers: session.answers,
            completed_at: now,
        };
        let report = CompletionReport::from_record(&record);
        let effects = vec![
            Effect::Reply(THANK_YOU.to_string()),
            Effect::Reply(prompts::answered_count(record.answers.len())),
            Effect::Report(report),
        ];
        state.record = Some(record);
        Transition { state, effects }
    }

    /// Start a fresh session and present the first question.
    fn begin(&self, mut state: ConversationState) -> Transition {
        state.session = Some(Session::default());
        Transition {
            state,
            effects: vec![Effect::Reply(prompts::render_question(self.catalog.first()))],
        }
    }

    /// A stored session is only resumed if it still fits the loaded catalog.
    fn is_resumable(&self, session: &Session) -> bool {
        session.step < self.catalog.len() && session.answers.len() == session.step
    }
}
