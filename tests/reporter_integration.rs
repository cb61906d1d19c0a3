//! HTTP completion reporter against a local endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

use survey_bot::bot::SurveyBot;
use survey_bot::channels::IncomingMessage;
use survey_bot::error::ReportError;
use survey_bot::reporter::{CompletionReporter, HttpReporter};
use survey_bot::store::LibSqlBackend;
use survey_bot::survey::{CompletionRecord, CompletionReport, QuestionCatalog, QuestionDefinition};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

async fn start_bin(status: StatusCode) -> (String, mpsc::UnboundedReceiver<Value>) {
    let (tx, rx) = mpsc::unbounded_channel();

    async fn capture(
        State((tx, status)): State<(mpsc::UnboundedSender<Value>, StatusCode)>,
        Json(body): Json<Value>,
    ) -> StatusCode {
        let _ = tx.send(body);
        status
    }

    let app = Router::new()
        .route("/bin", post(capture))
        .with_state((tx, status));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://127.0.0.1:{port}/bin"), rx)
}

fn report_for(answers: &[&str]) -> CompletionReport {
    let record = CompletionRecord {
        answers: answers.iter().map(|a| a.to_string()).collect(),
        completed_at: chrono::Utc::now(),
    };
    CompletionReport::from_record(&record)
}

#[tokio::test]
async fn send_posts_message_and_details() {
    let (url, mut rx) = start_bin(StatusCode::OK).await;
    let reporter = HttpReporter::new(url, TEST_TIMEOUT).unwrap();

    reporter.send(&report_for(&["Yes", "No", "Maybe"])).await.unwrap();

    let body = rx.recv().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "message": "Details for the question",
            "details": "Answers were given for 3 questions",
        })
    );
}

#[tokio::test]
async fn send_surfaces_error_status() {
    let (url, _rx) = start_bin(StatusCode::SERVICE_UNAVAILABLE).await;
    let reporter = HttpReporter::new(url, TEST_TIMEOUT).unwrap();

    let err = reporter.send(&report_for(&["Yes"])).await.unwrap_err();
    assert!(matches!(err, ReportError::BadStatus { status: 503, .. }));
}

#[tokio::test]
async fn report_is_fire_and_forget() {
    let (url, mut rx) = start_bin(StatusCode::OK).await;
    let reporter = HttpReporter::new(url, TEST_TIMEOUT).unwrap();

    // Returns immediately; delivery happens on a spawned task.
    reporter.report(report_for(&["No"]));

    let body = timeout(TEST_TIMEOUT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(body["details"], "Answers were given for 1 questions");
}

#[tokio::test]
async fn completed_survey_is_reported_once() {
    let (url, mut rx) = start_bin(StatusCode::OK).await;
    let catalog = Arc::new(
        QuestionCatalog::new(vec![
            QuestionDefinition::new("Did you enjoy the event?", "answer", &["Yes", "No"]),
            QuestionDefinition::new("Pick a colour", "colour", &["Red", "Blue"]),
        ])
        .unwrap(),
    );
    let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let reporter = Arc::new(HttpReporter::new(url, TEST_TIMEOUT).unwrap());
    let bot = SurveyBot::new(catalog, db, reporter);

    for text in ["hi", "yes", "blue", "anything else", "again"] {
        bot.handle_turn(&IncomingMessage::new("test", "u1", text))
            .await
            .unwrap();
    }

    let body = timeout(TEST_TIMEOUT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(body["details"], "Answers were given for 2 questions");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err(), "completion reported more than once");
}
