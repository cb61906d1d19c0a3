//! Test doubles for the slot store.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{Database, LibSqlBackend};
use crate::error::DatabaseError;

/// In-memory store whose writes to one slot can be made to fail on demand.
pub(crate) struct FlakyDatabase {
    inner: LibSqlBackend,
    failing_slot: Mutex<Option<&'static str>>,
}

impl FlakyDatabase {
    pub(crate) async fn new() -> Self {
        Self {
            inner: LibSqlBackend::new_memory().await.unwrap(),
            failing_slot: Mutex::new(None),
        }
    }

    /// Make every later `set_slot` on `slot` fail. `None` heals the store.
    pub(crate) fn fail_writes_to(&self, slot: Option<&'static str>) {
        *self.failing_slot.lock().unwrap() = slot;
    }
}

#[async_trait]
impl Database for FlakyDatabase {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.inner.run_migrations().await
    }

    async fn get_slot(
        &self,
        conversation_id: &str,
        slot: &str,
    ) -> Result<Option<serde_json::Value>, DatabaseError> {
        self.inner.get_slot(conversation_id, slot).await
    }

    async fn set_slot(
        &self,
        conversation_id: &str,
        slot: &str,
        value: &serde_json::Value,
    ) -> Result<(), DatabaseError> {
        let failing = *self.failing_slot.lock().unwrap();
        if failing == Some(slot) {
            return Err(DatabaseError::Query(format!("write to {slot} refused")));
        }
        self.inner.set_slot(conversation_id, slot, value).await
    }

    async fn delete_slot(&self, conversation_id: &str, slot: &str) -> Result<bool, DatabaseError> {
        self.inner.delete_slot(conversation_id, slot).await
    }
}
