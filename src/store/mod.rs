//! Persistence layer: libSQL-backed per-conversation state slots.

pub mod conversation;
pub mod libsql_backend;
pub mod migrations;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use conversation::{load_state, save_state};
pub use libsql_backend::LibSqlBackend;
pub use traits::{Database, slots};
