use crate::common::*;
use serde_json::{json, Value};
use sumi_extract::config::ExecutorConfig;
use sumi_extract::crawler::{CrawlError, CrawlExecutor, LlmCrawlExecutor};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_extracts_candidates_from_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/leaderboard", LEADERBOARD_HTML).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", format!("Bearer {}", API_KEY).as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion(&leaderboard_reply(), 420, 180)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let executor = LlmCrawlExecutor::new(&executor_config()).expect("executor");
    let output = executor
        .execute(&leaderboard_job(&server, "/leaderboard"))
        .await
        .expect("execution failed");

    assert_eq!(output.candidates.len(), 3);
    assert_eq!(output.usage.requests, 1);
    assert_eq!(output.usage.prompt_tokens, 420);
    assert_eq!(output.usage.completion_tokens, 180);
    assert_eq!(output.usage.total_tokens, 600);

    // Inspect what was sent to the provider
    let requests = server.received_requests().await.expect("recording enabled");
    let completion_request = requests
        .iter()
        .find(|r| r.url.path() == "/chat/completions")
        .expect("completion request");
    let body: Value = serde_json::from_slice(&completion_request.body).expect("json body");

    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["temperature"], 0.0);
    assert_eq!(body["max_tokens"], 800);
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(body["messages"][0]["content"]
        .as_str()
        .unwrap()
        .contains("\"95% CI\""));

    let user = body["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("Extract every row of the main table"));
    let first_row = user
        .lines()
        .find(|line| line.contains("Claude 3.5 Sonnet (20241022)"))
        .expect("table row in prompt");
    assert!(first_row.contains("1252.4"));
    assert!(first_row.contains("23109"));
    assert!(first_row.contains("Anthropic"));
    assert!(!user.contains("Accept cookies"));
    assert!(!user.contains("window.tracking"));
}

#[tokio::test]
async fn test_large_page_is_sent_in_chunks() {
    let server = MockServer::start().await;

    let rows: String = (1..=60)
        .map(|i| {
            format!(
                "<tr><td>{i}</td><td>Model number {i} with a long descriptive name</td><td>{}</td></tr>",
                1000 + i
            )
        })
        .collect();
    let html = format!("<html><body><table>{}</table></body></html>", rows);
    mount_page(&server, "/big", &html).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(r#"[{"name": "row"}]"#, 100, 10)),
        )
        .mount(&server)
        .await;

    let config = ExecutorConfig {
        chunk_token_threshold: 100,
        ..executor_config()
    };
    let executor = LlmCrawlExecutor::new(&config).expect("executor");
    let output = executor
        .execute(&leaderboard_job(&server, "/big"))
        .await
        .expect("execution failed");

    let requests = server.received_requests().await.expect("recording enabled");
    let completions = requests
        .iter()
        .filter(|r| r.url.path() == "/chat/completions")
        .count();

    assert!(completions > 1, "expected several chunks, got {}", completions);
    assert_eq!(output.usage.requests as usize, completions);
    assert_eq!(output.candidates.len(), completions);
    assert_eq!(output.usage.total_tokens, 110 * completions as u64);
}

#[tokio::test]
async fn test_missing_page_is_crawl_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let executor = LlmCrawlExecutor::new(&executor_config()).expect("executor");
    let err = executor
        .execute(&leaderboard_job(&server, "/gone"))
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_non_html_page_is_content_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
        .mount(&server)
        .await;

    let executor = LlmCrawlExecutor::new(&executor_config()).expect("executor");
    let err = executor
        .execute(&leaderboard_job(&server, "/data.json"))
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::ContentMismatch { .. }));
}

#[tokio::test]
async fn test_page_without_text_is_empty_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/blank", "<html><body><script>app()</script></body></html>").await;

    let executor = LlmCrawlExecutor::new(&executor_config()).expect("executor");
    let err = executor
        .execute(&leaderboard_job(&server, "/blank"))
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::EmptyPage { .. }));
    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.iter().all(|r| r.url.path() != "/chat/completions"));
}

#[tokio::test]
async fn test_provider_rate_limit() {
    let server = MockServer::start().await;
    mount_page(&server, "/leaderboard", LEADERBOARD_HTML).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached", "type": "requests"}
        })))
        .mount(&server)
        .await;

    let executor = LlmCrawlExecutor::new(&executor_config()).expect("executor");
    let err = executor
        .execute(&leaderboard_job(&server, "/leaderboard"))
        .await
        .unwrap_err();

    match err {
        CrawlError::RateLimited { message } => assert_eq!(message, "Rate limit reached"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_provider_auth_error() {
    let server = MockServer::start().await;
    mount_page(&server, "/leaderboard", LEADERBOARD_HTML).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let executor = LlmCrawlExecutor::new(&executor_config()).expect("executor");
    let err = executor
        .execute(&leaderboard_job(&server, "/leaderboard"))
        .await
        .unwrap_err();

    match err {
        CrawlError::Provider { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unparsable_reply_is_malformed_response() {
    let server = MockServer::start().await;
    mount_page(&server, "/leaderboard", LEADERBOARD_HTML).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("Sorry, I cannot read that table.", 300, 12)),
        )
        .mount(&server)
        .await;

    let executor = LlmCrawlExecutor::new(&executor_config()).expect("executor");
    let err = executor
        .execute(&leaderboard_job(&server, "/leaderboard"))
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::MalformedResponse(_)));
}
