use std::sync::Arc;

use anyhow::Context;

use survey_bot::bot::{BotRunner, SurveyBot, survey_routes};
use survey_bot::channels::{ChannelManager, CliChannel, WebChatChannel};
use survey_bot::config::BotConfig;
use survey_bot::reporter::{CompletionReporter, DisabledReporter, HttpReporter};
use survey_bot::store::{Database, LibSqlBackend};
use survey_bot::survey::QuestionCatalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env().context("invalid configuration")?;

    // ── Questions ────────────────────────────────────────────────────────
    let catalog = Arc::new(
        QuestionCatalog::from_path(&config.questions_path)
            .context("failed to load question catalog")?,
    );

    eprintln!("📋 Survey Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Questions: {} ({})",
        catalog.len(),
        config.questions_path.display()
    );

    // ── Database ─────────────────────────────────────────────────────────
    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| format!("failed to open database at {}", config.db_path.display()))?,
    );
    eprintln!("   Database: {}", config.db_path.display());

    // ── Reporting ────────────────────────────────────────────────────────
    let reporter: Arc<dyn CompletionReporter> = match &config.report_url {
        Some(url) => {
            eprintln!("   Reports: {}", url);
            Arc::new(HttpReporter::new(url.clone(), config.report_timeout)?)
        }
        None => {
            eprintln!("   Reports: disabled (set SURVEY_BIN_URL to enable)");
            Arc::new(DisabledReporter)
        }
    };

    let bot = Arc::new(SurveyBot::new(catalog, db, reporter));

    // ── Channels ─────────────────────────────────────────────────────────
    let mut channels = ChannelManager::new();

    let web_channel = WebChatChannel::new();
    let app = web_channel.router().merge(survey_routes(Arc::clone(&bot)));
    channels.add(Box::new(web_channel));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.ws_port))
        .await
        .with_context(|| format!("failed to bind port {}", config.ws_port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "HTTP server stopped");
        }
    });
    eprintln!("   Chat WS: ws://0.0.0.0:{}/ws/chat", config.ws_port);
    eprintln!(
        "   Status API: http://0.0.0.0:{}/api/survey/{{conversation_id}}",
        config.ws_port
    );

    if config.cli_enabled {
        channels.add(Box::new(CliChannel::new()));
    }
    eprintln!("   Channels: {}\n", channels.names().join(", "));

    BotRunner::new(bot, channels).run().await?;

    Ok(())
}
