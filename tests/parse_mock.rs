//! HTTP-level tests for the job protocol against a local mock server.
//!
//! Every test points `ParseConfig::base_url` at a fresh `wiremock` server,
//! so nothing here touches the real service. Poll intervals are shortened to
//! a few milliseconds except where the timing itself is under test.
//!
//! Run with:
//!   cargo test --test parse_mock -- --nocapture

use llamaparse::{
    parse, parse_file, parse_job, parse_to_file, resume_job, JobProgressCallback, JobStatus,
    ParseConfig, ParseConfigBuilder, ParseError, ParseMode, Stage,
};
use serde_json::json;
use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wiremock::matchers::{any, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

const JOB_ID: &str = "job-123";
const UNSET_ENV: &str = "LLAMAPARSE_TEST_SURELY_UNSET_VAR";

fn config_for(server: &MockServer) -> ParseConfigBuilder {
    ParseConfig::builder()
        .api_key("test-key")
        .base_url(server.uri())
        .check_interval(Duration::from_millis(10))
        .timeout(Duration::from_secs(10))
}

async fn mount_upload(server: &MockServer, id: &str) {
    Mock::given(method("POST"))
        .and(path("/api/parsing/upload"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": id })))
        .named("upload")
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, status: &str, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(format!("/api/parsing/job/{JOB_ID}")))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": status })));
    let mock = match times {
        Some(n) => mock.up_to_n_times(n).expect(n),
        None => mock,
    };
    mock.named(format!("status {status}")).mount(server).await;
}

async fn mount_result(server: &MockServer, mode: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/parsing/job/{JOB_ID}/result/{mode}")))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .named("result")
        .mount(server)
        .await;
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|r| r.len())
        .unwrap_or(0)
}

// ── Preconditions (no network) ───────────────────────────────────────────────

#[tokio::test]
async fn empty_input_sends_no_requests() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server).build().unwrap();
    let err = parse(&[], &config).await.unwrap_err();

    assert!(matches!(err, ParseError::EmptyInput), "got: {err:?}");
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn missing_credential_sends_no_requests() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = ParseConfig::builder()
        .base_url(server.uri())
        .api_key_env(UNSET_ENV)
        .build()
        .unwrap();
    let err = parse(b"%PDF-1.7", &config).await.unwrap_err();

    match err {
        ParseError::MissingCredential { env_var } => assert_eq!(env_var, UNSET_ENV),
        other => panic!("expected MissingCredential, got {other:?}"),
    }
    assert_eq!(request_count(&server).await, 0);
}

// ── Upload stage ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_failure_never_polls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/parsing/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server).build().unwrap();
    let err = parse(b"content", &config).await.unwrap_err();

    match err {
        ParseError::ParsingFailed { stage, detail } => {
            assert_eq!(stage, Stage::Upload);
            assert!(detail.contains("500"), "got: {detail}");
        }
        other => panic!("expected ParsingFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_without_id_is_parsing_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/parsing/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "job": "nope" })))
        .mount(&server)
        .await;

    let config = config_for(&server).build().unwrap();
    let err = parse(b"content", &config).await.unwrap_err();
    assert!(
        matches!(err, ParseError::ParsingFailed { stage: Stage::Upload, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn upload_non_json_success_is_parsing_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/parsing/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server).build().unwrap();
    let err = parse(b"content", &config).await.unwrap_err();
    match err {
        ParseError::ParsingFailed { stage, detail } => {
            assert_eq!(stage, Stage::Upload);
            assert!(detail.contains("<html>"), "got: {detail}");
        }
        other => panic!("expected ParsingFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_sends_file_and_language_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/parsing/upload"))
        .and(body_string_contains("name=\"file\"; filename=\"uploadfile\""))
        .and(body_string_contains("name=\"language\""))
        .and(body_string_contains("hello world"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": JOB_ID })))
        .expect(1)
        .mount(&server)
        .await;
    mount_status(&server, "SUCCESS", None).await;
    mount_result(&server, "text", json!({ "text": "hello world" })).await;

    let config = config_for(&server)
        .mode(ParseMode::Text)
        .language("fr")
        .build()
        .unwrap();
    let text = parse(b"hello world", &config).await.unwrap();
    assert_eq!(text, "hello world");
}

// ── Poll loop ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn success_on_third_poll_returns_payload() {
    let server = MockServer::start().await;
    mount_upload(&server, JOB_ID).await;
    mount_status(&server, "PENDING", Some(2)).await;
    mount_status(&server, "SUCCESS", Some(1)).await;
    mount_result(&server, "markdown", json!({ "markdown": "hello" })).await;

    let config = config_for(&server).mode(ParseMode::Markdown).build().unwrap();
    let output = parse_job(b"%PDF-1.7", &config).await.unwrap();

    assert_eq!(output.content, "hello");
    assert_eq!(output.job_id, JOB_ID);
    assert_eq!(output.stats.poll_attempts, 3);
}

#[tokio::test]
async fn ambiguous_status_responses_are_retried() {
    let server = MockServer::start().await;
    mount_upload(&server, JOB_ID).await;
    let status_path = format!("/api/parsing/job/{JOB_ID}");

    Mock::given(method("GET"))
        .and(path(status_path.as_str()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(status_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(status_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 42 })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(status_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_status(&server, "SUCCESS", Some(1)).await;
    mount_result(&server, "markdown", json!({ "markdown": "# ok" })).await;

    let config = config_for(&server).build().unwrap();
    let output = parse_job(b"content", &config).await.unwrap();

    assert_eq!(output.content, "# ok");
    assert_eq!(output.stats.poll_attempts, 5);
}

#[tokio::test]
async fn never_successful_job_times_out() {
    let server = MockServer::start().await;
    mount_upload(&server, JOB_ID).await;
    mount_status(&server, "PENDING", None).await;

    let config = config_for(&server)
        .timeout(Duration::from_secs(2))
        .check_interval(Duration::from_secs(1))
        .build()
        .unwrap();

    let start = Instant::now();
    let err = parse(b"content", &config).await.unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, ParseError::TimeoutReached { .. }), "got: {err:?}");
    assert!(elapsed >= Duration::from_millis(1900), "too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(3500), "too late: {elapsed:?}");
}

#[tokio::test]
async fn upstream_error_status_keeps_polling_by_default() {
    let server = MockServer::start().await;
    mount_upload(&server, JOB_ID).await;
    mount_status(&server, "ERROR", None).await;

    let config = config_for(&server)
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();
    let err = parse(b"content", &config).await.unwrap_err();
    assert!(matches!(err, ParseError::TimeoutReached { .. }), "got: {err:?}");
}

#[tokio::test]
async fn upstream_error_status_fails_fast_when_enabled() {
    let server = MockServer::start().await;
    mount_upload(&server, JOB_ID).await;
    mount_status(&server, "ERROR", Some(1)).await;

    let config = config_for(&server)
        .fail_on_error_status(true)
        .build()
        .unwrap();
    let err = parse(b"content", &config).await.unwrap_err();

    match err {
        ParseError::ParsingFailed { stage, detail } => {
            assert_eq!(stage, Stage::Status);
            assert!(detail.contains("ERROR"), "got: {detail}");
        }
        other => panic!("expected ParsingFailed, got {other:?}"),
    }
}

/// Read one HTTP/1.1 request (headers plus a `Content-Length` or chunked body).
async fn read_request(stream: &mut TcpStream) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
        let body = &buf[head_end + 4..];
        if head.contains("transfer-encoding: chunked") {
            if body.ends_with(b"0\r\n\r\n") {
                return Ok(());
            }
            continue;
        }
        let len = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if body.len() >= len {
            return Ok(());
        }
    }
}

#[tokio::test]
async fn status_transport_failure_aborts_polling() {
    // Accepts the upload, then hangs up on every later connection.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicU32::new(0));
    let seen = connections.clone();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            if seen.fetch_add(1, Ordering::SeqCst) > 0 {
                drop(stream);
                continue;
            }
            let _ = read_request(&mut stream).await;
            let body = format!(r#"{{"id":"{JOB_ID}"}}"#);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    let config = ParseConfig::builder()
        .api_key("test-key")
        .base_url(format!("http://{addr}"))
        .check_interval(Duration::from_millis(10))
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    let start = Instant::now();
    let err = parse(b"content", &config).await.unwrap_err();

    assert!(matches!(err, ParseError::Http(_)), "got: {err:?}");
    assert!(start.elapsed() < Duration::from_secs(5), "took {:?}", start.elapsed());
    assert!(connections.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn slow_status_request_is_bounded_by_deadline() {
    let server = MockServer::start().await;
    mount_upload(&server, JOB_ID).await;
    Mock::given(method("GET"))
        .and(path(format!("/api/parsing/job/{JOB_ID}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "SUCCESS" }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let config = config_for(&server)
        .timeout(Duration::from_secs(1))
        .build()
        .unwrap();

    let start = Instant::now();
    let err = parse(b"content", &config).await.unwrap_err();

    assert!(matches!(err, ParseError::TimeoutReached { .. }), "got: {err:?}");
    assert!(start.elapsed() < Duration::from_secs(5), "took {:?}", start.elapsed());
}

// ── Result stage ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn result_non_json_success_is_parsing_failed() {
    let server = MockServer::start().await;
    mount_upload(&server, JOB_ID).await;
    mount_status(&server, "SUCCESS", Some(1)).await;
    Mock::given(method("GET"))
        .and(path(format!("/api/parsing/job/{JOB_ID}/result/markdown")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server).build().unwrap();
    let err = parse(b"content", &config).await.unwrap_err();
    match err {
        ParseError::ParsingFailed { stage, detail } => {
            assert_eq!(stage, Stage::Result);
            assert!(detail.contains("not JSON"), "got: {detail}");
        }
        other => panic!("expected ParsingFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn result_without_mode_field_is_parsing_failed() {
    let server = MockServer::start().await;
    mount_upload(&server, JOB_ID).await;
    mount_status(&server, "SUCCESS", Some(1)).await;
    mount_result(&server, "markdown", json!({ "text": "wrong key" })).await;

    let config = config_for(&server).build().unwrap();
    let err = parse(b"content", &config).await.unwrap_err();
    assert!(
        matches!(err, ParseError::ParsingFailed { stage: Stage::Result, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn result_http_error_is_parsing_failed() {
    let server = MockServer::start().await;
    mount_upload(&server, JOB_ID).await;
    mount_status(&server, "SUCCESS", Some(1)).await;
    Mock::given(method("GET"))
        .and(path(format!("/api/parsing/job/{JOB_ID}/result/markdown")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server).build().unwrap();
    let err = parse(b"content", &config).await.unwrap_err();
    assert!(
        matches!(err, ParseError::ParsingFailed { stage: Stage::Result, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn json_mode_reads_json_key() {
    let server = MockServer::start().await;
    mount_upload(&server, JOB_ID).await;
    mount_status(&server, "SUCCESS", Some(1)).await;
    mount_result(&server, "json", json!({ "json": "[{\"page\":1}]" })).await;

    let config = config_for(&server).mode(ParseMode::Json).build().unwrap();
    let out = parse(b"content", &config).await.unwrap();
    assert_eq!(out, "[{\"page\":1}]");
}

// ── Whole-call properties ────────────────────────────────────────────────────

#[tokio::test]
async fn repeated_calls_are_independent() {
    let server = MockServer::start().await;
    mount_upload(&server, JOB_ID).await;
    mount_status(&server, "SUCCESS", None).await;
    mount_result(&server, "markdown", json!({ "markdown": "same every time" })).await;

    let config = config_for(&server).build().unwrap();
    let first = parse(b"content", &config).await.unwrap();
    let second = parse(b"content", &config).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, "same every time");
}

#[derive(Default)]
struct RecordingCallback {
    events: Mutex<Vec<String>>,
    polls: AtomicU32,
}

impl JobProgressCallback for RecordingCallback {
    fn on_upload_start(&self, file_len: usize) {
        self.events.lock().unwrap().push(format!("upload {file_len}"));
    }

    fn on_job_created(&self, job_id: &str) {
        self.events.lock().unwrap().push(format!("job {job_id}"));
    }

    fn on_poll(&self, attempt: u32, status: &JobStatus) {
        self.polls.store(attempt, Ordering::SeqCst);
        self.events.lock().unwrap().push(format!("poll {attempt} {status}"));
    }

    fn on_result(&self, job_id: &str, content_len: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("result {job_id} {content_len}"));
    }
}

#[tokio::test]
async fn progress_callback_sees_every_stage() {
    let server = MockServer::start().await;
    mount_upload(&server, JOB_ID).await;
    mount_status(&server, "PENDING", Some(1)).await;
    mount_status(&server, "SUCCESS", Some(1)).await;
    mount_result(&server, "markdown", json!({ "markdown": "abc" })).await;

    let recorder = Arc::new(RecordingCallback::default());
    let config = config_for(&server)
        .progress_callback(recorder.clone())
        .build()
        .unwrap();
    parse(b"12345", &config).await.unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "upload 5".to_string(),
            format!("job {JOB_ID}"),
            "poll 1 PENDING".to_string(),
            "poll 2 SUCCESS".to_string(),
            format!("result {JOB_ID} 3"),
        ]
    );
    assert_eq!(recorder.polls.load(Ordering::SeqCst), 2);
}

// ── File entry points ────────────────────────────────────────────────────────

#[tokio::test]
async fn parse_file_uploads_under_local_file_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/parsing/upload"))
        .and(body_string_contains("filename=\"notes.txt\""))
        .and(body_string_contains("text/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": JOB_ID })))
        .expect(1)
        .mount(&server)
        .await;
    mount_status(&server, "SUCCESS", Some(1)).await;
    mount_result(&server, "markdown", json!({ "markdown": "notes" })).await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::File::create(&input)
        .unwrap()
        .write_all(b"some notes")
        .unwrap();

    let config = config_for(&server).build().unwrap();
    let output = parse_file(input.to_str().unwrap(), &config).await.unwrap();
    assert_eq!(output.content, "notes");
}

#[tokio::test]
async fn parse_to_file_writes_payload() {
    let server = MockServer::start().await;
    mount_upload(&server, JOB_ID).await;
    mount_status(&server, "SUCCESS", Some(1)).await;
    mount_result(&server, "markdown", json!({ "markdown": "# Title\n\nBody\n" })).await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.pdf");
    std::fs::write(&input, b"%PDF-1.7 fake").unwrap();
    let out_path = dir.path().join("out/doc.md");

    let config = config_for(&server).build().unwrap();
    let stats = parse_to_file(input.to_str().unwrap(), &out_path, &config)
        .await
        .unwrap();

    assert_eq!(stats.poll_attempts, 1);
    assert_eq!(
        std::fs::read_to_string(&out_path).unwrap(),
        "# Title\n\nBody\n"
    );
}

#[tokio::test]
async fn resume_job_skips_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_status(&server, "SUCCESS", Some(1)).await;
    mount_result(&server, "text", json!({ "text": "resumed" })).await;

    let config = config_for(&server).mode(ParseMode::Text).build().unwrap();
    let output = resume_job(JOB_ID, &config).await.unwrap();

    assert_eq!(output.content, "resumed");
    assert_eq!(output.mode, ParseMode::Text);
    assert_eq!(output.stats.poll_attempts, 1);
}
