//! Style analyzer client.
//!
//! The analyzer is an external vision model reached over an OpenAI-compatible
//! chat-completions endpoint. It receives the original and edited image as
//! base64 data URLs and returns a JSON-shaped parameter estimate. Everything
//! it returns is untrusted until validated.
//!
//! Transport failures (unreachable, timeout, quota) surface as errors — the
//! caller must never substitute defaults for an analyzer outage.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::config;

use super::prompt::{ANALYZER_SYSTEM_PROMPT, ANALYZER_USER_PROMPT};
use super::raw::RawAdjustments;
use super::AnalysisError;

/// Analysis is deterministic-leaning; low temperature keeps estimates stable.
const ANALYZER_TEMPERATURE: f32 = 0.1;
const ANALYZER_MAX_TOKENS: u32 = 1500;

/// External style analyzer: compares an original/edited pair and returns a
/// raw, unvalidated parameter estimate.
pub trait StyleAnalyzer: Send + Sync {
    fn analyze_pair(
        &self,
        original: &[u8],
        edited: &[u8],
    ) -> Result<RawAdjustments, AnalysisError>;
}

/// Production analyzer backed by an OpenAI-compatible vision endpoint.
pub struct OpenAiStyleAnalyzer {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenAiStyleAnalyzer {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        timeout_secs: u64,
    ) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Analyzer configured from environment (endpoint, key, model, timeout).
    pub fn from_env() -> Self {
        Self::new(
            &config::analyzer_base_url(),
            config::analyzer_api_key(),
            &config::analyzer_model(),
            config::analyzer_timeout_secs(),
        )
    }
}

// ──────────────────────────────────────────────
// Wire types (chat completions)
// ──────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    response_format: ResponseFormat<'a>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn data_url(image: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(image);
    format!("data:image/jpeg;base64,{encoded}")
}

impl StyleAnalyzer for OpenAiStyleAnalyzer {
    fn analyze_pair(
        &self,
        original: &[u8],
        edited: &[u8],
    ) -> Result<RawAdjustments, AnalysisError> {
        let _span = tracing::info_span!(
            "style_analysis",
            model = %self.model,
            original_size = original.len(),
            edited_size = edited.len(),
        )
        .entered();
        let start = std::time::Instant::now();

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: MessageContent::Text(ANALYZER_SYSTEM_PROMPT),
                },
                Message {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::Text {
                            text: ANALYZER_USER_PROMPT.to_string(),
                        },
                        ContentPart::Text {
                            text: "ORIGINAL IMAGE (before editing):".to_string(),
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: data_url(original),
                            },
                        },
                        ContentPart::Text {
                            text: "EDITED IMAGE (after editing):".to_string(),
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: data_url(edited),
                            },
                        },
                    ]),
                },
            ],
            response_format: ResponseFormat { kind: "json_object" },
            temperature: ANALYZER_TEMPERATURE,
            max_tokens: ANALYZER_MAX_TOKENS,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| {
            if e.is_connect() {
                AnalysisError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                AnalysisError::Timeout(self.timeout_secs)
            } else {
                AnalysisError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AnalysisError::QuotaExceeded);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AnalysisError::EmptyResponse)?;

        let raw = RawAdjustments::from_response_text(&content)?;

        tracing::info!(
            model = %self.model,
            elapsed_ms = %start.elapsed().as_millis(),
            "Style analysis complete"
        );

        Ok(raw)
    }
}

// ──────────────────────────────────────────────
// MockStyleAnalyzer (testing)
// ──────────────────────────────────────────────

/// Configurable behavior for the mock analyzer.
enum MockBehavior {
    Succeed(RawAdjustments),
    FailQuota,
    FailEmpty,
}

/// Mock analyzer for tests — returns a fixed estimate or a fixed failure.
pub struct MockStyleAnalyzer {
    behavior: MockBehavior,
}

impl MockStyleAnalyzer {
    pub fn returning(raw: RawAdjustments) -> Self {
        Self {
            behavior: MockBehavior::Succeed(raw),
        }
    }

    pub fn failing_with_quota() -> Self {
        Self {
            behavior: MockBehavior::FailQuota,
        }
    }

    pub fn failing_with_empty_response() -> Self {
        Self {
            behavior: MockBehavior::FailEmpty,
        }
    }
}

impl StyleAnalyzer for MockStyleAnalyzer {
    fn analyze_pair(
        &self,
        _original: &[u8],
        _edited: &[u8],
    ) -> Result<RawAdjustments, AnalysisError> {
        match &self.behavior {
            MockBehavior::Succeed(raw) => Ok(raw.clone()),
            MockBehavior::FailQuota => Err(AnalysisError::QuotaExceeded),
            MockBehavior::FailEmpty => Err(AnalysisError::EmptyResponse),
        }
    }
}
