mod common;

use std::time::Duration;

use deckpull_core::{ResultSummary, ServerEvent, TaskHandle};
use deckpull_engine::{MonitorEvent, ProgressMonitor, Subscription};
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{config_for, init_logging, sse_body};

async fn mount_stream(server: &MockServer, task_id: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/progress/{task_id}")))
        .and(header("accept", "text/event-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(server)
        .await;
}

async fn collect(mut subscription: Subscription) -> Vec<MonitorEvent> {
    let mut events = Vec::new();
    while let Some(event) = tokio::time::timeout(Duration::from_secs(5), subscription.next())
        .await
        .expect("stream stalled")
    {
        events.push(event);
    }
    events
}

fn progress(percent: u32, message: &str) -> MonitorEvent {
    MonitorEvent::Server(ServerEvent::Progress {
        percent,
        message: message.to_string(),
    })
}

#[tokio::test]
async fn delivers_progress_then_completion_and_ends() {
    init_logging();
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "abc123",
        sse_body(&[
            r#"{"status":"progress","percent":50,"message":"Parsing slide 5 of 10"}"#,
            r#"{"status":"heartbeat"}"#,
            r#"{"status":"completed","total_slides":10,"file_size":"1.2 MB","download_url":"/download/abc123"}"#,
            r#"{"status":"progress","percent":99,"message":"after terminal"}"#,
        ]),
    )
    .await;

    let monitor = ProgressMonitor::new(config_for(&server)).unwrap();
    let events = collect(monitor.monitor(&TaskHandle::new("abc123"))).await;

    assert_eq!(
        events,
        vec![
            progress(50, "Parsing slide 5 of 10"),
            MonitorEvent::Server(ServerEvent::Completed(ResultSummary {
                total_slides: 10,
                text_blocks: None,
                file_size: "1.2 MB".to_string(),
                download_url: "/download/abc123".to_string(),
            })),
        ]
    );
}

#[tokio::test]
async fn passes_jumpy_percent_through_in_order() {
    init_logging();
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "t1",
        sse_body(&[
            r#"{"status":"progress","percent":10,"message":"a"}"#,
            r#"{"status":"progress","percent":5,"message":"b"}"#,
            r#"{"status":"mystery"}"#,
            r#"{"status":"progress","percent":100,"message":"c"}"#,
            r#"{"status":"error","message":"boom"}"#,
        ]),
    )
    .await;

    let monitor = ProgressMonitor::new(config_for(&server)).unwrap();
    let events = collect(monitor.monitor(&TaskHandle::new("t1"))).await;

    assert_eq!(
        events,
        vec![
            progress(10, "a"),
            progress(5, "b"),
            progress(100, "c"),
            MonitorEvent::Server(ServerEvent::Error {
                message: "boom".to_string()
            }),
        ]
    );
}

#[tokio::test]
async fn stream_ending_early_synthesizes_one_disconnect() {
    init_logging();
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "t2",
        sse_body(&[r#"{"status":"progress","percent":30,"message":"x"}"#]),
    )
    .await;

    let monitor = ProgressMonitor::new(config_for(&server)).unwrap();
    let events = collect(monitor.monitor(&TaskHandle::new("t2"))).await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], progress(30, "x"));
    match &events[1] {
        MonitorEvent::Disconnected { reason } => assert!(reason.contains("ended")),
        other => panic!("expected disconnect, got {other:?}"),
    }
}

#[tokio::test]
async fn http_error_on_stream_is_a_disconnect() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/progress/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let monitor = ProgressMonitor::new(config_for(&server)).unwrap();
    let events = collect(monitor.monitor(&TaskHandle::new("missing"))).await;

    assert_eq!(
        events,
        vec![MonitorEvent::Disconnected {
            reason: "progress stream returned http status 404".to_string()
        }]
    );
}

#[tokio::test]
async fn silent_server_times_out_as_disconnect() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/progress/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_raw(sse_body(&[]), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.stream_idle_timeout = Duration::from_millis(100);
    let monitor = ProgressMonitor::new(config).unwrap();
    let events = collect(monitor.monitor(&TaskHandle::new("slow"))).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        MonitorEvent::Disconnected { reason } if reason.starts_with("no data from server")
    ));
}

#[tokio::test]
async fn closed_subscription_delivers_nothing_more() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/progress/t3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_raw(
                    sse_body(&[r#"{"status":"progress","percent":1,"message":"late"}"#]),
                    "text/event-stream",
                ),
        )
        .mount(&server)
        .await;

    let monitor = ProgressMonitor::new(config_for(&server)).unwrap();
    let mut subscription = monitor.monitor(&TaskHandle::new("t3"));
    assert!(!subscription.is_closed());

    subscription.close();
    subscription.close();
    assert!(subscription.is_closed());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(subscription.next().await, None);
}

#[tokio::test]
async fn close_drops_already_buffered_events() {
    init_logging();
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "t4",
        sse_body(&[r#"{"status":"progress","percent":1,"message":"queued"}"#]),
    )
    .await;

    let monitor = ProgressMonitor::new(config_for(&server)).unwrap();
    let mut subscription = monitor.monitor(&TaskHandle::new("t4"));
    tokio::time::sleep(Duration::from_millis(200)).await;

    subscription.close();
    assert_eq!(subscription.next().await, None);
}
