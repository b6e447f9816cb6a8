use serde_json::{json, Value};
use sumi_extract::config::{ExecutorConfig, ProviderConfig};
use sumi_extract::job::ExtractionJob;
use sumi_extract::schema::Schema;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "sk-test-key";

/// A leaderboard page with three ranked models
pub const LEADERBOARD_HTML: &str = r#"<html>
<head><title>Leaderboard</title><script>window.tracking = true;</script></head>
<body>
  <div class="cookie-consent">Accept cookies?</div>
  <h1>WebDev Arena Leaderboard</h1>
  <table>
    <thead>
      <tr><th>Rank</th><th>Model</th><th>Arena Score</th><th>95% CI</th><th>Votes</th><th>Organization</th><th>License</th></tr>
    </thead>
    <tbody>
      <tr><td>1</td><td>Claude 3.5 Sonnet (20241022)</td><td>1252.4</td><td>+5/-4</td><td>23109</td><td>Anthropic</td><td>Proprietary</td></tr>
      <tr><td>2</td><td>GPT-4o</td><td>1200.1</td><td>+3/-3</td><td>18555</td><td>OpenAI</td><td>Proprietary</td></tr>
      <tr><td>3</td><td>Qwen2.5-Coder</td><td>1100</td><td>+6/-7</td><td>5012</td><td>Alibaba</td><td>Apache 2.0</td></tr>
    </tbody>
  </table>
</body>
</html>"#;

pub fn provider_for(server: &MockServer) -> ProviderConfig {
    ProviderConfig::build_with("chatgpt", |_| Some(API_KEY.to_string()))
        .expect("provider")
        .with_base_url(server.uri())
}

pub fn leaderboard_job(server: &MockServer, page_path: &str) -> ExtractionJob {
    ExtractionJob::build(
        &format!("{}{}", server.uri(), page_path),
        Schema::leaderboard(),
        "Extract every row of the main table",
        provider_for(server),
    )
    .expect("job")
}

pub fn executor_config() -> ExecutorConfig {
    ExecutorConfig {
        request_timeout_secs: 5,
        user_agent: "SumiExtractTest/1.0".to_string(),
        ..ExecutorConfig::default()
    }
}

/// Mounts an HTML page at `page_path`
pub async fn mount_page(server: &MockServer, page_path: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html"))
        .mount(server)
        .await;
}

/// Builds an OpenAI-style completion body
pub fn completion(content: &str, prompt_tokens: u64, completion_tokens: u64) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    })
}

/// Candidates a model would return for [`LEADERBOARD_HTML`], the last one
/// missing its vote count
pub fn leaderboard_reply() -> String {
    let rows = json!([
        {"rank": 1, "model": "Claude 3.5 Sonnet (20241022)", "arena score": 1252.4,
         "95% CI": "+5/-4", "votes": 23109, "organization": "Anthropic", "license": "Proprietary"},
        {"rank": "2", "Model": "GPT-4o", "arena_score": "1200.1",
         "ci_95": "+3/-3", "votes": "18555", "organization": "OpenAI", "License": "Proprietary"},
        {"rank": 3, "model": "Qwen2.5-Coder", "arena score": 1100,
         "95% CI": "+6/-7", "organization": "Alibaba", "license": "Apache 2.0"}
    ]);
    format!("```json\n{}\n```", serde_json::to_string_pretty(&rows).unwrap())
}
