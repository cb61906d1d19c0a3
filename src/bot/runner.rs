//! Main message loop: pulls turns from every channel and answers them.

use std::sync::Arc;

use futures::StreamExt;

use crate::bot::SurveyBot;
use crate::channels::{ChannelManager, IncomingMessage, OutgoingResponse};
use crate::error::Result;

/// Reply sent when a turn fails (for example, the state store is unavailable).
pub const TURN_FAILED: &str = "Sorry, something went wrong on our side. Please try again.";

pub struct BotRunner {
    bot: Arc<SurveyBot>,
    channels: Arc<ChannelManager>,
}

impl BotRunner {
    pub fn new(bot: Arc<SurveyBot>, channels: ChannelManager) -> Self {
        Self {
            bot,
            channels: Arc::new(channels),
        }
    }

    /// Run until Ctrl+C or until every channel stream has ended.
    pub async fn run(self) -> Result<()> {
        let mut message_stream = self.channels.start_all().await?;

        tracing::info!(
            channels = ?self.channels.names(),
            questions = self.bot.catalog().len(),
            "Survey bot ready and listening"
        );

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                msg = message_stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("All channel streams ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            self.handle_message(&message).await;
        }

        self.channels.shutdown_all().await?;
        Ok(())
    }

    async fn handle_message(&self, message: &IncomingMessage) {
        let replies = match self.bot.handle_turn(message).await {
            Ok(replies) => replies,
            Err(e) => {
                tracing::error!(
                    conversation_id = %message.conversation_id,
                    user_id = %message.user_id,
                    error = %e,
                    "Error handling turn"
                );
                vec![TURN_FAILED.to_string()]
            }
        };

        for reply in replies {
            if let Err(e) = self
                .channels
                .respond(message, OutgoingResponse::text(reply))
                .await
            {
                tracing::warn!(channel = %message.channel, error = %e, "Failed to send reply");
            }
        }
    }
}
