//! `Database` trait: async interface for per-conversation persistence.

use async_trait::async_trait;

use crate::error::DatabaseError;

/// Named per-conversation storage slots.
pub mod slots {
    /// In-progress session (step + partial answers).
    pub const DIALOG_STATE: &str = "dialog_state";
    /// Completion record, written once the survey is finished.
    pub const SURVEY_RECORD: &str = "survey_record";
}

/// Backend-agnostic storage of JSON values keyed by `(conversation_id, slot)`.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    /// Read a slot. `None` if it was never written or has been deleted.
    async fn get_slot(
        &self,
        conversation_id: &str,
        slot: &str,
    ) -> Result<Option<serde_json::Value>, DatabaseError>;

    /// Insert or replace a slot.
    async fn set_slot(
        &self,
        conversation_id: &str,
        slot: &str,
        value: &serde_json::Value,
    ) -> Result<(), DatabaseError>;

    /// Delete a slot. Returns whether anything was removed.
    async fn delete_slot(&self, conversation_id: &str, slot: &str) -> Result<bool, DatabaseError>;
}
