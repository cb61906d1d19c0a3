//! Survey host: binds the pure survey machine to storage, reporting, and
//! channels.

pub mod routes;
pub mod runner;
pub mod survey_bot;

pub use routes::survey_routes;
pub use runner::BotRunner;
pub use survey_bot::{SurveyBot, SurveyStatus};
