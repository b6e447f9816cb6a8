//! OpenAI-compatible chat-completions client
//!
//! Both supported providers expose the same `/chat/completions` API, so one
//! request shape serves DeepSeek and ChatGPT alike.

use crate::config::ProviderConfig;
use crate::crawler::fetcher::classify_transport_error;
use crate::crawler::{CrawlError, TokenUsage};
use crate::schema::Schema;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Builds the system prompt describing the expected output
pub fn system_prompt(schema: &Schema) -> String {
    format!(
        "You extract structured data from web page content.\n\
         Return ONLY a JSON array of objects. Each object must conform to this JSON schema:\n\
         {}\n\
         Use the property names exactly as written in the schema. \
         If the content holds no matching data, return [].",
        schema.json_schema()
    )
}

/// Builds the user message for one chunk of page content
pub fn user_prompt(instruction: &str, source_url: &str, chunk: &str) -> String {
    format!(
        "Instruction: {}\n\nSource URL: {}\n\nContent:\n{}",
        instruction, source_url, chunk
    )
}

/// Sends one extraction request and returns the candidates it produced
///
/// # Errors
///
/// * `RateLimited` - the provider answered HTTP 429
/// * `Provider` - any other non-success status
/// * `MalformedResponse` - the reply holds no parsable JSON records
/// * `Timeout` / `Http` - transport failures
pub async fn request_extraction(
    client: &Client,
    provider: &ProviderConfig,
    options: CompletionOptions,
    system: &str,
    user: String,
) -> Result<(Vec<Value>, TokenUsage), CrawlError> {
    let endpoint = provider.chat_completions_url();
    let request = ChatRequest {
        model: provider.model(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: system.to_string(),
            },
            ChatMessage {
                role: "user",
                content: user,
            },
        ],
        temperature: options.temperature,
        max_tokens: options.max_tokens,
    };

    let response = client
        .post(&endpoint)
        .bearer_auth(provider.api_key())
        .json(&request)
        .send()
        .await
        .map_err(|e| classify_transport_error(&endpoint, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = provider_error_message(&body);
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CrawlError::RateLimited { message });
        }
        return Err(CrawlError::Provider {
            status: status.as_u16(),
            message,
        });
    }

    let reply: ChatResponse = response
        .json()
        .await
        .map_err(|e| CrawlError::MalformedResponse(format!("invalid completion body: {}", e)))?;

    let choice = reply
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CrawlError::MalformedResponse("completion has no choices".to_string()))?;

    if choice.finish_reason.as_deref() == Some("length") {
        tracing::warn!(
            "Reply from {} hit the max-tokens limit ({}); keeping complete records only",
            provider.model(),
            options.max_tokens
        );
    }

    let content = choice
        .message
        .content
        .ok_or_else(|| CrawlError::MalformedResponse("completion has no content".to_string()))?;

    let usage = reply.usage.unwrap_or_default();
    let candidates = parse_candidates(&content)?;

    Ok((candidates, usage))
}

/// Extracts candidate records from a model reply
///
/// Accepts a bare JSON array, an array wrapped in a markdown code fence or
/// surrounded by prose, a single object (one candidate), or an object whose
/// only value is an array of records. A reply cut off inside an array
/// yields every record that was completed before the cut.
pub fn parse_candidates(content: &str) -> Result<Vec<Value>, CrawlError> {
    let value = match parse_json_fragment(content) {
        Some(value) => value,
        None => {
            let recovered = recover_truncated_array(content);
            if recovered.is_empty() {
                let preview: String = content.chars().take(80).collect();
                return Err(CrawlError::MalformedResponse(format!(
                    "no JSON found in reply: {}",
                    preview
                )));
            }
            tracing::warn!(
                "Reply is not complete JSON; recovered {} record(s) before the cut",
                recovered.len()
            );
            return Ok(recovered);
        }
    };

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(object) => {
            if object.len() == 1 {
                if let Some(Value::Array(items)) = object.values().next() {
                    return Ok(items.clone());
                }
            }
            Ok(vec![Value::Object(object)])
        }
        other => Err(CrawlError::MalformedResponse(format!(
            "expected JSON array or object, got {}",
            other
        ))),
    }
}

fn parse_json_fragment(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    let array_start = trimmed.find('[');
    let object_start = trimmed.find('{');

    if let (Some(start), Some(end)) = (array_start, trimmed.rfind(']')) {
        if start < end {
            if let Ok(value) = serde_json::from_str(&trimmed[start..=end]) {
                return Some(value);
            }
        }
    }

    // An object inside an unparsable array is a fragment of a cut-off reply
    if let (Some(start), Some(array)) = (object_start, array_start) {
        if array < start {
            return None;
        }
    }

    if let (Some(start), Some(end)) = (object_start, trimmed.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str(&trimmed[start..=end]) {
                return Some(value);
            }
        }
    }

    None
}

/// Collects the complete top-level objects of an array that was cut off
fn recover_truncated_array(content: &str) -> Vec<Value> {
    let mut records = Vec::new();
    let mut rest = match content.find('[') {
        Some(start) => &content[start + 1..],
        None => return records,
    };

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if !rest.starts_with('{') {
            break;
        }

        let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) => {
                let consumed = stream.byte_offset();
                records.push(value);
                rest = &rest[consumed..];
            }
            _ => break,
        }
    }

    records
}

/// Pulls `error.message` out of an OpenAI-style error body
fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}
