//! SurveyBot: drives the survey state machine for one inbound turn at a
//! time: load state, transition, persist, dispatch reports.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::channels::IncomingMessage;
use crate::error::Result;
use crate::reporter::CompletionReporter;
use crate::store::{Database, load_state, save_state};
use crate::survey::{Effect, QuestionCatalog, SurveyMachine, SurveyPhase};

/// Snapshot of one conversation's progress, served by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyStatus {
    pub conversation_id: String,
    #[serde(flatten)]
    pub phase: SurveyPhase,
    pub answered: usize,
    pub total: usize,
    pub answers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Host adapter around [`SurveyMachine`].
///
/// Turns for the same conversation are serialized; different conversations
/// proceed independently.
pub struct SurveyBot {
    machine: SurveyMachine,
    db: Arc<dyn Database>,
    reporter: Arc<dyn CompletionReporter>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SurveyBot {
    pub fn new(
        catalog: Arc<QuestionCatalog>,
        db: Arc<dyn Database>,
        reporter: Arc<dyn CompletionReporter>,
    ) -> Self {
        Self {
            machine: SurveyMachine::new(catalog),
            db,
            reporter,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        self.machine.catalog()
    }

    /// Process one inbound turn and return the replies to send, in order.
    ///
    /// State is saved once at the end of every turn, whether or not it
    /// changed. Completion reports are dispatched after the save and never
    /// awaited.
    pub async fn handle_turn(&self, msg: &IncomingMessage) -> Result<Vec<String>> {
        let conversation_id = msg.conversation_id.as_str();
        let lock = self.conversation_lock(conversation_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.run_turn(conversation_id, &msg.content).await
        };
        drop(lock);
        self.release_idle_locks().await;
        result
    }

    async fn run_turn(&self, conversation_id: &str, content: &str) -> Result<Vec<String>> {
        let state = load_state(self.db.as_ref(), conversation_id).await?;
        let from = state.phase();

        let transition = self.machine.transition(state, content, Utc::now());
        let to = transition.state.phase();

        save_state(self.db.as_ref(), conversation_id, &transition.state).await?;

        let mut replies = Vec::new();
        for effect in transition.effects {
            match effect {
                Effect::Reply(text) => replies.push(text),
                Effect::Report(report) => {
                    info!(
                        conversation_id,
                        questions = report.question_count,
                        "Survey completed"
                    );
                    self.reporter.report(report);
                }
            }
        }

        debug!(conversation_id, %from, %to, "Turn processed");
        Ok(replies)
    }

    /// Current progress for a conversation.
    pub async fn status(&self, conversation_id: &str) -> Result<SurveyStatus> {
        let state = load_state(self.db.as_ref(), conversation_id).await?;
        let answers = state.answers().to_vec();
        Ok(SurveyStatus {
            conversation_id: conversation_id.to_string(),
            phase: state.phase(),
            answered: answers.len(),
            total: self.catalog().len(),
            answers,
            completed_at: state.record.as_ref().map(|r| r.completed_at),
        })
    }

    async fn conversation_lock(&self, conversation_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(
            locks
                .entry(conversation_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Drop lock entries no turn is holding or waiting on.
    async fn release_idle_locks(&self) {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}
