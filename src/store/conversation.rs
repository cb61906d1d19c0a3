//! Typed load/save of a conversation's survey state over the slot store.

use crate::error::DatabaseError;
use crate::survey::{CompletionRecord, ConversationState, Session};

use super::traits::{Database, slots};

/// Read both slots for `conversation_id`.
pub async fn load_state(
    db: &dyn Database,
    conversation_id: &str,
) -> Result<ConversationState, DatabaseError> {
    let session = match db.get_slot(conversation_id, slots::DIALOG_STATE).await? {
        Some(value) => Some(from_value::<Session>(value)?),
        None => None,
    };
    let record = match db.get_slot(conversation_id, slots::SURVEY_RECORD).await? {
        Some(value) => Some(from_value::<CompletionRecord>(value)?),
        None => None,
    };
    Ok(ConversationState { session, record })
}

/// Write both slots for `conversation_id`.
///
/// The record is written before the dialog slot is touched, so a failure
/// partway through leaves either the previous state or a completed one. The
/// dialog slot is deleted when no session is active.
pub async fn save_state(
    db: &dyn Database,
    conversation_id: &str,
    state: &ConversationState,
) -> Result<(), DatabaseError> {
    if let Some(record) = &state.record {
        db.set_slot(conversation_id, slots::SURVEY_RECORD, &to_value(record)?)
            .await?;
    }
    match &state.session {
        Some(session) => {
            db.set_slot(conversation_id, slots::DIALOG_STATE, &to_value(session)?)
                .await?
        }
        None => {
            db.delete_slot(conversation_id, slots::DIALOG_STATE).await?;
        }
    }
    Ok(())
}

fn from_value<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, DatabaseError> {
    serde_json::from_value(value).map_err(|e| DatabaseError::Serialization(e.to_string()))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, DatabaseError> {
    serde_json::to_value(value).map_err(|e| DatabaseError::Serialization(e.to_string()))
}
