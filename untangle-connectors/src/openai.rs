/// OpenAI chat completions client
///
/// One call shape: `POST {base}/v1/chat/completions` with
/// `{model, messages, max_tokens, temperature}` and a Bearer key. The
/// reply text is `choices[0].message.content`. Works against any
/// OpenAI-compatible endpoint via `OPENAI_BASE_URL`.

use crate::provider::{body_snippet, upstream_error, ConnectorError, ConnectorResult};
use serde::{Deserialize, Serialize};

/// Default API base
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default model when `OPENAI_MODEL` is unset
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// One message in a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions client
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        OpenAiClient {
            client,
            base_url: base_url.into(),
            api_key,
            model: model.into(),
        }
    }

    /// The configured model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one chat completion request and returns the reply text
    ///
    /// # Errors
    ///
    /// - `NotConfigured` when no API key is set
    /// - `UpstreamStatus` on a non-2xx answer, with a body snippet
    /// - `UnexpectedResponse` when the body carries no message content
    pub async fn complete(&self, messages: &[ChatMessage]) -> ConnectorResult<String> {
        if self.api_key.is_empty() {
            return Err(ConnectorError::NotConfigured(
                "OPENAI_API_KEY is not set".to_string(),
            ));
        }

        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        };

        tracing::debug!(
            model = %self.model,
            message_count = messages.len(),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body = response.text().await?;
        reply_from_body(&body)
    }
}

/// Pulls the reply text out of a completion response body
fn reply_from_body(body: &str) -> ConnectorResult<String> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| {
        ConnectorError::UnexpectedResponse(format!("{} (body: {})", e, body_snippet(body)))
    })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .ok_or_else(|| {
            ConnectorError::UnexpectedResponse("no message content in completion".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETION_FIXTURE: &str = r#"{
        "id": "chatcmpl-9xYzA",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Your last three dinners averaged a 7.2 score."
                },
                "finish_reason": "stop"
            }
        ],
        "usage": {"prompt_tokens": 180, "completion_tokens": 14, "total_tokens": 194}
    }"#;

    #[test]
    fn test_reply_extraction() {
        let reply = reply_from_body(COMPLETION_FIXTURE).unwrap();
        assert_eq!(reply, "Your last three dinners averaged a 7.2 score.");
    }

    #[test]
    fn test_empty_choices_is_unexpected() {
        let result = reply_from_body(r#"{"choices": []}"#);
        assert!(matches!(result, Err(ConnectorError::UnexpectedResponse(_))));
    }

    #[test]
    fn test_null_content_is_unexpected() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let result = reply_from_body(body);
        assert!(matches!(result, Err(ConnectorError::UnexpectedResponse(_))));
    }

    #[test]
    fn test_garbage_body_is_unexpected() {
        let result = reply_from_body("<html>bad gateway</html>");
        assert!(matches!(result, Err(ConnectorError::UnexpectedResponse(_))));
    }

    #[test]
    fn test_message_constructors() {
        assert_eq!(ChatMessage::system("a").role, "system");
        assert_eq!(ChatMessage::user("b").role, "user");
        assert_eq!(ChatMessage::assistant("c").role, "assistant");
    }

    #[test]
    fn test_request_wire_shape() {
        let messages = vec![ChatMessage::user("hi")];
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            max_tokens: 256,
            temperature: 0.5,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 256);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }
}
