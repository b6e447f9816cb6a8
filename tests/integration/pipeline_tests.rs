use crate::common::*;
use serde_json::json;
use std::time::Duration;
use sumi_extract::config::{parse_config, Config};
use sumi_extract::crawler::{FixedExecutor, LlmCrawlExecutor, TokenUsage, UsageMetrics};
use sumi_extract::job::ExtractionJob;
use sumi_extract::output::ResultSet;
use sumi_extract::pipeline::{self, RetryPolicy};
use sumi_extract::schema::{FieldSpec, FieldType, Schema};
use sumi_extract::ExtractError;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        timeout: Duration::from_secs(10),
        max_retries: 1,
        backoff: Duration::from_millis(5),
    }
}

fn product_job() -> ExtractionJob {
    let schema = Schema::new(
        "Product",
        vec![
            FieldSpec::new("name", FieldType::Text),
            FieldSpec::new("price", FieldType::Number),
        ],
    );
    let provider = sumi_extract::ProviderConfig::build_with("DeepSeek", |var| {
        (var == "DEEPSEEK_API_KEY").then(|| "sk-ds".to_string())
    })
    .expect("provider");

    ExtractionJob::build(
        "https://shop.example.com/catalog",
        schema,
        "Extract every product",
        provider,
    )
    .expect("job")
}

#[tokio::test]
async fn test_full_extraction_against_mock_servers() {
    let server = MockServer::start().await;
    mount_page(&server, "/leaderboard", LEADERBOARD_HTML).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion(&leaderboard_reply(), 500, 200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().expect("tempdir");
    let output_path = dir.path().join("leaderboard_data.json");

    let executor = LlmCrawlExecutor::new(&executor_config()).expect("executor");
    let result = pipeline::run(
        &leaderboard_job(&server, "/leaderboard"),
        &executor,
        &fast_policy(),
        &output_path,
        5,
    )
    .await
    .expect("pipeline failed");

    // Third candidate has no vote count
    assert_eq!(result.len(), 2);
    assert_eq!(result.rejected_count(), 1);
    assert_eq!(result.rejections()[0].index, 2);
    assert_eq!(result.rejections()[0].error.fields(), vec!["votes"]);

    let written = ResultSet::load(&output_path).expect("output file");
    assert_eq!(written, result.records());

    let second = &written[1];
    assert_eq!(second.get("rank"), Some(&json!(2)));
    assert_eq!(second.get("model"), Some(&json!("GPT-4o")));
    assert_eq!(second.get("arena score"), Some(&json!(1200.1)));
    assert_eq!(second.get("95% CI"), Some(&json!("+3/-3")));
    assert_eq!(second.get("votes"), Some(&json!(18555)));
    assert_eq!(second.get("license"), Some(&json!("Proprietary")));

    let raw = std::fs::read_to_string(&output_path).expect("read output");
    let keys: Vec<String> = serde_json::from_str::<serde_json::Value>(&raw).unwrap()[0]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(
        keys,
        vec!["rank", "model", "arena score", "95% CI", "votes", "organization", "license"]
    );
}

#[tokio::test]
async fn test_partial_candidates_keep_valid_subset() {
    let dir = tempdir().expect("tempdir");
    let output_path = dir.path().join("products.json");

    let mut usage = UsageMetrics::new();
    usage.record(TokenUsage::new(250, 40));
    let executor = FixedExecutor::new(
        vec![json!({"name": "A", "price": "10"}), json!({"name": "B"})],
        usage,
    );

    let result = pipeline::run(&product_job(), &executor, &fast_policy(), &output_path, 5)
        .await
        .expect("pipeline failed");

    assert_eq!(result.len(), 1);
    assert_eq!(result.rejected_count(), 1);
    assert_eq!(result.records()[0].get("name"), Some(&json!("A")));
    assert_eq!(result.records()[0].get("price"), Some(&json!(10)));

    let written = ResultSet::load(&output_path).expect("output file");
    assert_eq!(written.len(), 1);
}

#[tokio::test]
async fn test_all_invalid_candidates_fail_without_output() {
    let dir = tempdir().expect("tempdir");
    let output_path = dir.path().join("products.json");

    let executor = FixedExecutor::new(
        vec![json!({"name": "B"}), json!({"price": "cheap"}), json!(null)],
        UsageMetrics::new(),
    );

    let err = pipeline::run(&product_job(), &executor, &fast_policy(), &output_path, 5)
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::NoValidData { rejected: 3 }));
    assert!(!output_path.exists());
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let dir = tempdir().expect("tempdir");
    let output_path = dir.path().join("products.json");

    let executor = FixedExecutor::new(vec![json!({"name": "A", "price": 1.5})], UsageMetrics::new())
        .fail_times(1);

    let result = pipeline::run(&product_job(), &executor, &fast_policy(), &output_path, 5)
        .await
        .expect("pipeline failed");

    assert_eq!(result.len(), 1);
    assert_eq!(executor.calls(), 2);
}

#[tokio::test]
async fn test_slow_executor_times_out_as_crawl_failure() {
    let dir = tempdir().expect("tempdir");
    let output_path = dir.path().join("products.json");

    let executor = FixedExecutor::new(vec![json!({"name": "A", "price": 1})], UsageMetrics::new())
        .with_delay(Duration::from_secs(2));
    let policy = RetryPolicy {
        timeout: Duration::from_millis(50),
        max_retries: 0,
        backoff: Duration::from_millis(1),
    };

    let err = pipeline::run(&product_job(), &executor, &policy, &output_path, 5)
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::CrawlFailure(_)));
    assert!(err.to_string().contains("Timed out"));
    assert!(!output_path.exists());
}

#[tokio::test]
async fn test_missing_credential_fails_before_network() {
    let server = MockServer::start().await;

    let config = parse_config(&format!(
        r#"
[job]
url = "{}/leaderboard"

[provider]
name = "DeepSeek"
"#,
        server.uri()
    ))
    .expect("config");

    let err = pipeline::build_job(&config, |var| {
        (var == "OPENAI_API_KEY").then(|| "sk-openai".to_string())
    })
    .unwrap_err();

    match &err {
        ExtractError::MissingCredential { variable } => assert_eq!(variable, "DEEPSEEK_API_KEY"),
        other => panic!("unexpected error: {:?}", other),
    }

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty());
}

#[test]
fn test_invalid_url_rejected_at_build_time() {
    let mut config = Config::default();
    config.job.url = "not-a-url".to_string();

    let err = pipeline::build_job(&config, |_| Some("sk".to_string())).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidUrl { .. }));
}

#[test]
fn test_unsupported_provider_rejected_at_build_time() {
    let mut config = Config::default();
    config.provider.name = "gemini".to_string();

    let err = pipeline::build_job(&config, |_| Some("sk".to_string())).unwrap_err();
    assert!(matches!(err, ExtractError::UnsupportedProvider(_)));
}

#[tokio::test]
async fn test_missing_page_is_not_refetched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().expect("tempdir");
    let output_path = dir.path().join("leaderboard_data.json");
    let policy = RetryPolicy {
        max_retries: 3,
        ..fast_policy()
    };

    let executor = LlmCrawlExecutor::new(&executor_config()).expect("executor");
    let err = pipeline::run(
        &leaderboard_job(&server, "/gone"),
        &executor,
        &policy,
        &output_path,
        5,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ExtractError::CrawlFailure(_)));
    assert!(!output_path.exists());
}
