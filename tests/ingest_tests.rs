//! End-to-end pipeline tests against a local mock server

use linkread::confirm::LOGIN_GATE_WARNING;
use linkread::fetch::{ACCESS_WARNING, TRANSPORT_WARNING};
use linkread::ingest::{ingest_url, IngestConfig, NO_URL_WARNING};
use linkread::output::{MAX_TEXT_CHARS, TRUNCATION_SUFFIX};
use std::io::{Cursor, Write};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOCX_CT: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

fn config_for(server: &MockServer) -> IngestConfig {
    IngestConfig {
        confirm_base: server.uri(),
        ..IngestConfig::default()
    }
}

#[tokio::test]
async fn empty_url_short_circuits_without_network() {
    let result = ingest_url("   ", &IngestConfig::default()).await;
    assert_eq!(result.text, "");
    assert_eq!(result.warning.as_deref(), Some(NO_URL_WARNING));
}

#[tokio::test]
async fn plain_text_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("hello world", "text/plain"))
        .mount(&server)
        .await;

    let result = ingest_url(&format!("{}/doc.txt", server.uri()), &config_for(&server)).await;
    assert_eq!(result.text, "hello world");
    assert!(result.warning.is_none());
    assert_eq!(result.chars, 11);
    assert_eq!(result.content_type.as_deref(), Some("text/plain"));
}

#[tokio::test]
async fn multibyte_text_reports_char_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/utf8.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("héllo 日本", "text/plain; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let result = ingest_url(&format!("{}/utf8.txt", server.uri()), &config_for(&server)).await;
    assert!(result.warning.is_none());
    // 8 characters, not the 13 bytes of the UTF-8 encoding.
    assert_eq!(result.chars, 8);
}

#[tokio::test]
async fn json_body_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"k":1}"#, "application/json"))
        .mount(&server)
        .await;

    let result = ingest_url(&format!("{}/data", server.uri()), &config_for(&server)).await;
    assert_eq!(result.text, r#"{"k":1}"#);
    assert!(result.warning.is_none());
}

#[tokio::test]
async fn http_404_yields_access_warning_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = ingest_url(&format!("{}/gone", server.uri()), &config_for(&server)).await;
    assert_eq!(result.text, "");
    assert_eq!(result.warning.as_deref(), Some(ACCESS_WARNING));

    // The non-success status is terminal: exactly one request was made.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn unreachable_host_yields_transport_warning() {
    // Reserved TEST-NET-1 address; connection refused or unroutable.
    let config = IngestConfig {
        timeout_ms: 2_000,
        ..IngestConfig::default()
    };
    let result = ingest_url("http://192.0.2.1:9/doc.txt", &config).await;
    assert_eq!(result.warning.as_deref(), Some(TRANSPORT_WARNING));
}

#[tokio::test]
async fn slow_response_times_out_within_bound() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("late", "text/plain")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let config = IngestConfig {
        timeout_ms: 300,
        ..config_for(&server)
    };

    let started = Instant::now();
    let result = ingest_url(&format!("{}/slow", server.uri()), &config).await;
    assert_eq!(result.warning.as_deref(), Some(TRANSPORT_WARNING));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn oversized_text_is_truncated_with_marker() {
    let body = "a".repeat(60_000);
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "text/plain"))
        .mount(&server)
        .await;

    let result = ingest_url(&format!("{}/big.txt", server.uri()), &config_for(&server)).await;
    assert!(result.warning.is_none());
    assert_eq!(result.text.len(), MAX_TEXT_CHARS + TRUNCATION_SUFFIX.len());
    assert!(result.text.ends_with(TRUNCATION_SUFFIX));
    assert_eq!(&result.text[..MAX_TEXT_CHARS], &body[..MAX_TEXT_CHARS]);
}

#[tokio::test]
async fn unknown_binary_type_becomes_marker_not_warning() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blob"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0u8, 1, 2], "application/octet-stream"),
        )
        .mount(&server)
        .await;

    let result = ingest_url(&format!("{}/blob", server.uri()), &config_for(&server)).await;
    assert!(result.warning.is_none());
    assert_eq!(result.text, "[Binary file: application/octet-stream]");
}

#[tokio::test]
async fn corrupt_pdf_maps_to_transport_warning() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not a pdf", "application/pdf"))
        .mount(&server)
        .await;

    let result = ingest_url(
        &format!("{}/broken.pdf", server.uri()),
        &config_for(&server),
    )
    .await;
    assert_eq!(result.text, "");
    assert_eq!(result.warning.as_deref(), Some(TRANSPORT_WARNING));
}

#[tokio::test]
async fn docx_body_is_extracted() {
    let mut buf = Cursor::new(Vec::new());
    let mut writer = zip::ZipWriter::new(&mut buf);
    writer
        .start_file(
            "word/document.xml",
            zip::write::SimpleFileOptions::default(),
        )
        .unwrap();
    writer
        .write_all(
            b"<w:document><w:body><w:p><w:r><w:t>Quarterly report</w:t></w:r></w:p></w:body></w:document>",
        )
        .unwrap();
    writer.finish().unwrap();
    let docx = buf.into_inner();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/report.docx"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(docx, DOCX_CT))
        .mount(&server)
        .await;

    let result = ingest_url(
        &format!("{}/report.docx", server.uri()),
        &config_for(&server),
    )
    .await;
    assert!(result.warning.is_none());
    assert_eq!(result.text, "Quarterly report");
}

#[tokio::test]
async fn redirect_is_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", format!("{}/new", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("moved here", "text/plain"))
        .mount(&server)
        .await;

    let result = ingest_url(&format!("{}/old", server.uri()), &config_for(&server)).await;
    assert_eq!(result.text, "moved here");
    assert!(result.warning.is_none());
}

#[tokio::test]
async fn confirmation_interstitial_triggers_second_fetch() {
    let server = MockServer::start().await;

    let interstitial = concat!(
        "<html><body>Google Drive can't scan this file for viruses.",
        "<a href=\"/uc?export=download&confirm=TOKEN123&id=FILE456\">Download anyway</a>",
        "</body></html>",
    );
    Mock::given(method("GET"))
        .and(path("/share"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(interstitial, "text/html"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/uc"))
        .and(query_param("confirm", "TOKEN123"))
        .and(query_param("id", "FILE456"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("large file bytes", "text/plain"))
        .expect(1)
        .mount(&server)
        .await;

    // Original URL carries the file id the resolver scrapes.
    let result = ingest_url(
        &format!("{}/share?id=FILE456", server.uri()),
        &config_for(&server),
    )
    .await;
    assert_eq!(result.text, "large file bytes");
    assert!(result.warning.is_none());
}

#[tokio::test]
async fn failed_confirmation_falls_back_to_original_html() {
    let server = MockServer::start().await;

    // Interstitial with a token, but the confirm endpoint rejects the
    // retry; the pipeline must fall back to the original HTML body.
    let filler = "x".repeat(600);
    let interstitial = format!(
        "<html><body>download_warning confirm=TOKEN123&{}</body></html>",
        filler
    );
    Mock::given(method("GET"))
        .and(path("/share"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(interstitial.clone(), "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uc"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = ingest_url(
        &format!("{}/share?id=FILE456", server.uri()),
        &config_for(&server),
    )
    .await;
    // Original HTML is large enough to pass the gate check, so it comes
    // back as raw text.
    assert!(result.warning.is_none());
    assert_eq!(result.text, interstitial);
}

#[tokio::test]
async fn short_html_after_all_attempts_is_a_login_gate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gated"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>Sign in</html>", "text/html"),
        )
        .mount(&server)
        .await;

    let result = ingest_url(&format!("{}/gated", server.uri()), &config_for(&server)).await;
    assert_eq!(result.text, "");
    assert_eq!(result.warning.as_deref(), Some(LOGIN_GATE_WARNING));
}

#[tokio::test]
async fn large_html_page_passes_through_as_text() {
    let body = format!("<html><body>{}</body></html>", "content ".repeat(100));
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "text/html"))
        .mount(&server)
        .await;

    let result = ingest_url(&format!("{}/page", server.uri()), &config_for(&server)).await;
    assert!(result.warning.is_none());
    assert_eq!(result.text, body);
}

#[tokio::test]
async fn concurrent_requests_do_not_interfere() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("fast body", "text/plain"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stuck"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("never", "text/plain")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let config = IngestConfig {
        timeout_ms: 500,
        ..config_for(&server)
    };

    // A timing-out fetch must not cancel or corrupt a parallel one.
    let fast_url = format!("{}/fast", server.uri());
    let stuck_url = format!("{}/stuck", server.uri());
    let (fast, stuck) = tokio::join!(
        ingest_url(&fast_url, &config),
        ingest_url(&stuck_url, &config),
    );
    assert_eq!(fast.text, "fast body");
    assert!(fast.warning.is_none());
    assert_eq!(stuck.warning.as_deref(), Some(TRANSPORT_WARNING));
}
