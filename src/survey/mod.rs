//! Survey core: question catalog, choice recognition, and the waterfall
//! state machine.
//!
//! Everything in this module is synchronous and free of I/O. The host
//! (`crate::bot`) loads state, runs one transition per inbound turn, and
//! carries out the resulting effects.

pub mod catalog;
pub mod machine;
pub mod prompts;
pub mod state;
pub mod validator;

pub use catalog::{QuestionCatalog, QuestionDefinition};
pub use machine::{Effect, SurveyMachine, Transition};
pub use state::{CompletionRecord, CompletionReport, ConversationState, Session, SurveyPhase};
pub use validator::{ValidationFailure, recognize};
