//! 生成式文本服务请求
//!
//! 请求体为单轮 `{contents:[{role:"user",parts:[{text}]}]}`，
//! 成功响应取第一个候选的全部文本片段。

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::errors::RequestError;
use crate::config::LlmConfig;
use crate::errors::{HWSystemError, Result};

#[async_trait]
pub trait ReviewRequester: Send + Sync {
    async fn request_review(&self, prompt: &str) -> std::result::Result<String, RequestError>;
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// 从 2xx 响应体中取出生成文本
pub(crate) fn extract_feedback(body: &str) -> std::result::Result<String, RequestError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| RequestError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let parts = response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .ok_or_else(|| RequestError::MalformedResponse("missing candidates".to_string()))?;

    let texts: Vec<String> = parts.into_iter().filter_map(|p| p.text).collect();
    if texts.is_empty() {
        return Err(RequestError::MalformedResponse(
            "candidate has no text parts".to_string(),
        ));
    }

    Ok(texts.concat())
}

/// Gemini `generateContent` 接口
pub struct GeminiRequester {
    client: reqwest::Client,
    endpoint: String,
}

impl GeminiRequester {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            warn!("LLM API key is not configured, review requests will be rejected upstream");
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| HWSystemError::validation(format!("LLM API key 格式无效: {e}")))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.api_base.trim_end_matches('/'),
                config.model
            ),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReviewRequester for GeminiRequester {
    async fn request_review(&self, prompt: &str) -> std::result::Result<String, RequestError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!("POST {} ({} chars)", self.endpoint, prompt.chars().count());
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RequestError::TransportFailure(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RequestError::TransportFailure(e.to_string()))?;

        if !status.is_success() {
            let snippet: String = text.chars().take(500).collect();
            return Err(RequestError::TransportFailure(format!(
                "{status}: {snippet}"
            )));
        }

        extract_feedback(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_feedback_verbatim() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"  Looks good.\n"}],"role":"model"}}]}"#;
        assert_eq!(extract_feedback(body).unwrap(), "  Looks good.\n");
    }

    #[test]
    fn test_extract_feedback_joins_parts_of_first_candidate() {
        let body = r#"{"candidates":[
            {"content":{"parts":[{"text":"Part one. "},{"text":"Part two."}]}},
            {"content":{"parts":[{"text":"ignored"}]}}
        ]}"#;
        assert_eq!(extract_feedback(body).unwrap(), "Part one. Part two.");
    }

    #[test]
    fn test_extract_feedback_missing_candidates() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert!(matches!(
            extract_feedback(body),
            Err(RequestError::MalformedResponse(_))
        ));
        assert!(matches!(
            extract_feedback(r#"{"candidates":[]}"#),
            Err(RequestError::MalformedResponse(_))
        ));
        assert!(matches!(
            extract_feedback(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#),
            Err(RequestError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_extract_feedback_non_json() {
        assert!(matches!(
            extract_feedback("<html>oops</html>"),
            Err(RequestError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_endpoint() {
        let requester = GeminiRequester::new(&LlmConfig {
            api_base: "https://llm.example.com/v1beta/".to_string(),
            model: "gemini-test".to_string(),
            ..LlmConfig::default()
        })
        .unwrap();
        assert_eq!(
            requester.endpoint(),
            "https://llm.example.com/v1beta/models/gemini-test:generateContent"
        );
    }
}
