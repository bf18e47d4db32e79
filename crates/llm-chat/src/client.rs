use std::time::Duration;

use crate::types::{ChatRequest, ChatResponse, ResponseFormat};
use crate::{ChatError, ChatMessage, Completion, Result};

const MAX_ERROR_BODY: usize = 500;

// ─── ChatConfig ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL up to and including the version segment, e.g.
    /// `https://api.openai.com/v1`.
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    /// Ask the provider for a JSON object response.
    pub json_mode: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key: None,
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            timeout: Duration::from_secs(60),
            json_mode: false,
        }
    }
}

// ─── ChatClient ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Send one chat-completion request and return the first choice's text.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ChatError::MissingApiKey)?;

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            response_format: self
                .config
                .json_mode
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        tracing::debug!(model = %self.config.model, messages = messages.len(), "chat completion request");
        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|source| ChatError::Parse {
                body: truncate(&body),
                source,
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ChatError::EmptyResponse)?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(total_tokens = usage.total_tokens, "chat completion done");
        }

        Ok(Completion {
            content,
            model: parsed.model.unwrap_or_else(|| self.config.model.clone()),
            usage: parsed.usage,
        })
    }
}

/// Cap `body` at [`MAX_ERROR_BODY`] bytes, ellipsis included, on a char boundary.
fn truncate(body: &str) -> String {
    const ELLIPSIS: char = '…';
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY - ELLIPSIS.len_utf8();
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(end + ELLIPSIS.len_utf8());
    out.push_str(&body[..end]);
    out.push(ELLIPSIS);
    out
}
