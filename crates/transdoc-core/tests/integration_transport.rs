//! Integration tests: `TransportClient` against a local scripted HTTP server.

mod common;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use common::translation_server::{self, Reply, Script};
use tempfile::tempdir;
use transdoc_core::error::ValidationError;
use transdoc_core::model::{
    DocumentRef, Endpoint, Engine, Job, ServerConfig, TranslationOptions, Variant,
};
use transdoc_core::transport::{RemoteStatus, SubmitResult, TranslationServer, TransportClient};
use transdoc_core::TranslateError;

fn config(base_url: &str) -> ServerConfig {
    ServerConfig {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(20),
        poll_interval: Duration::from_millis(50),
        engine: Engine::Pdf2zhNext,
        service: "bing".into(),
        next_service: "siliconflowfree".into(),
        options: TranslationOptions::default(),
    }
}

fn job_for(path: PathBuf, base_url: &str, endpoint: Endpoint) -> Job {
    Job {
        file_name: path.file_name().unwrap().to_string_lossy().into_owned(),
        document: DocumentRef::new("doc-1"),
        file_path: path,
        config: config(base_url),
        endpoint,
    }
}

#[tokio::test]
async fn submit_sends_data_url_and_reads_immediate_result() {
    let server = translation_server::start(Script {
        submit: Reply::ok(
            r#"{"status":"success","fileList":["paper-mono.pdf","paper-dual-cut.pdf"]}"#,
        ),
        ..Script::default()
    });
    let dir = tempdir().unwrap();
    let pdf = dir.path().join("paper.pdf");
    std::fs::write(&pdf, b"%PDF-1.7").unwrap();

    let client = TransportClient::new(&server.base_url).unwrap();
    let job = job_for(pdf, &server.base_url, Endpoint::Compare);
    let result = client.submit(&job, None).await.unwrap();

    let outcome = match result {
        SubmitResult::Immediate(o) => o,
        other => panic!("expected Immediate, got {:?}", other),
    };
    assert_eq!(outcome.files.len(), 2);
    assert_eq!(outcome.files[1].variant, Variant::DualCut);

    let requests = server.requests();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/compare");
    let body = server.submitted_json();
    assert_eq!(body["fileName"], "paper.pdf");
    assert_eq!(
        body["fileContent"],
        "data:application/pdf;base64,JVBERi0xLjc="
    );
    assert_eq!(body["engine"], "pdf2zh_next");
    assert_eq!(body["timeout"], 20_000);
}

#[tokio::test]
async fn submit_gives_up_when_server_never_answers() {
    let base_url = translation_server::silent_url();
    let dir = tempdir().unwrap();
    let pdf = dir.path().join("slow.pdf");
    std::fs::write(&pdf, b"%PDF").unwrap();

    let client = TransportClient::new(&base_url).unwrap();
    let mut job = job_for(pdf, &base_url, Endpoint::Translate);
    job.config.timeout = Duration::from_secs(1);

    let started = Instant::now();
    let err = client.submit(&job, None).await.unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err, TranslateError::Timeout(Duration::from_secs(1)));
    assert!(elapsed >= Duration::from_millis(900), "{:?}", elapsed);
    assert!(elapsed < Duration::from_secs(5), "{:?}", elapsed);
}

#[tokio::test]
async fn submit_error_body_is_server_error() {
    let server = translation_server::start(Script {
        submit: Reply::status(500, r#"{"status":"error","message":"unsupported language pair"}"#),
        ..Script::default()
    });
    let dir = tempdir().unwrap();
    let pdf = dir.path().join("a.pdf");
    std::fs::write(&pdf, b"%PDF").unwrap();

    let client = TransportClient::new(&server.base_url).unwrap();
    let err = client
        .submit(&job_for(pdf, &server.base_url, Endpoint::Translate), None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TranslateError::Server("unsupported language pair".into())
    );
}

#[tokio::test]
async fn submit_accepted_returns_task_handle() {
    let server = translation_server::start(Script {
        submit: Reply::status(202, r#"{"status":"processing","taskId":"t-42"}"#),
        ..Script::default()
    });
    let dir = tempdir().unwrap();
    let pdf = dir.path().join("a.pdf");
    std::fs::write(&pdf, b"%PDF").unwrap();

    let client = TransportClient::new(&server.base_url).unwrap();
    match client
        .submit(&job_for(pdf, &server.base_url, Endpoint::Translate), None)
        .await
        .unwrap()
    {
        SubmitResult::Accepted(h) => assert_eq!(h.task_id, "t-42"),
        other => panic!("expected Accepted, got {:?}", other),
    }
}

#[tokio::test]
async fn submit_missing_file_is_validation_error() {
    let client = TransportClient::new("http://127.0.0.1:9").unwrap();
    let job = job_for(
        PathBuf::from("/nonexistent/x.pdf"),
        "http://127.0.0.1:9",
        Endpoint::Translate,
    );
    let err = client.submit(&job, None).await.unwrap_err();
    assert_eq!(
        err,
        TranslateError::Validation(ValidationError::NotFound(PathBuf::from("/nonexistent/x.pdf")))
    );
}

#[tokio::test]
async fn submit_to_closed_port_is_transport_error() {
    let base = translation_server::closed_port_url();
    let dir = tempdir().unwrap();
    let pdf = dir.path().join("a.pdf");
    std::fs::write(&pdf, b"%PDF").unwrap();

    let client = TransportClient::new(&base).unwrap();
    let err = client
        .submit(&job_for(pdf, &base, Endpoint::Translate), None)
        .await
        .unwrap_err();
    assert!(matches!(err, TranslateError::Transport(_)), "{:?}", err);
}

#[tokio::test]
async fn progress_parses_and_degrades_to_unknown() {
    let server = translation_server::start(Script {
        progress: vec![
            Reply::ok(
                r#"{"status":"processing","progress":64,"message":"page 8/12","eta_minutes":1.5,"total_pages":12}"#,
            ),
            Reply::status(500, "oops"),
        ],
        ..Script::default()
    });
    let client = TransportClient::new(&server.base_url).unwrap();

    let first = client.query_progress("t1").await;
    assert_eq!(first.status, RemoteStatus::Processing);
    assert_eq!(first.progress, 64);
    assert_eq!(first.total_pages, Some(12));

    let second = client.query_progress("t1").await;
    assert_eq!(second.status, RemoteStatus::Unknown);
    assert_eq!(second.progress, -1);

    let unreachable = TransportClient::new(&translation_server::closed_port_url()).unwrap();
    assert_eq!(
        unreachable.query_progress("t1").await.status,
        RemoteStatus::Unknown
    );
}

#[tokio::test]
async fn result_not_found_is_unavailable() {
    let server = translation_server::start(Script::default());
    let client = TransportClient::new(&server.base_url).unwrap();
    let err = client.fetch_result("t1").await.unwrap_err();
    assert!(
        matches!(err, TranslateError::ResultUnavailable(_)),
        "{:?}",
        err
    );
}

#[tokio::test]
async fn health_counts_any_http_answer_as_alive() {
    let server = translation_server::start(Script::default());
    let client = TransportClient::new(&server.base_url).unwrap();
    assert!(
        client.check_health().await,
        "404 on / still means the server is up"
    );

    let down = TransportClient::new(&translation_server::closed_port_url()).unwrap();
    assert!(!down.check_health().await);
}

#[tokio::test]
async fn server_info_reads_health_endpoint() {
    let server = translation_server::start(Script::default());
    let client = TransportClient::new(&server.base_url).unwrap();
    let info = client.server_info().await.unwrap();
    assert_eq!(info.version.as_deref(), Some("2.0.1"));
    assert_eq!(info.engine_ready, Some(true));
}

#[tokio::test]
async fn translated_files_can_be_probed_and_downloaded() {
    let mut files = HashMap::new();
    files.insert("my paper-mono.pdf".to_string(), b"%PDF-translated".to_vec());
    let server = translation_server::start(Script {
        files,
        ..Script::default()
    });
    let client = TransportClient::new(&server.base_url).unwrap();

    assert!(client.head_exists("my paper-mono.pdf").await);
    assert!(!client.head_exists("other.pdf").await);
    let bytes = client.download("my paper-mono.pdf").await.unwrap();
    assert_eq!(bytes, b"%PDF-translated");
    assert!(client.download("other.pdf").await.is_err());

    let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
    assert!(paths.contains(
        &"/translatedFile/my%20paper-mono.pdf".to_string()
    ));
}
