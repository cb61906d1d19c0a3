//! Survey bot: a waterfall multiple-choice survey over chat channels.

pub mod bot;
pub mod channels;
pub mod config;
pub mod error;
pub mod reporter;
pub mod store;
pub mod survey;
