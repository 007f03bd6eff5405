//! OpenAI-compatible chat completions client (Together AI by default)
//!
//! POST {base_url}/chat/completions
//!   {"model": ..., "messages": [{"role": "user", "content": ...}]}
//! Reply text is `choices[0].message.content`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{CompletionEndpoint, CompletionError};
use crate::config::Credentials;

/// Error bodies are cut to this many characters
const MAX_ERROR_BODY_CHARS: usize = 500;

pub struct TogetherClient {
    base_url: String,
    api_key: String,
    agent: ureq::Agent,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl TogetherClient {
    pub fn new(base_url: &str, credentials: &Credentials, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            agent,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn map_error(&self, err: ureq::Error) -> CompletionError {
        match err {
            ureq::Error::Status(status @ (401 | 403), _) => CompletionError::Unauthorized { status },
            ureq::Error::Status(429, _) => CompletionError::RateLimited,
            ureq::Error::Status(status, resp) => {
                let body = resp
                    .into_string()
                    .unwrap_or_default()
                    .chars()
                    .take(MAX_ERROR_BODY_CHARS)
                    .collect();
                CompletionError::Status { status, body }
            }
            ureq::Error::Transport(t) => CompletionError::Unreachable {
                url: self.endpoint(),
                message: t.to_string(),
            },
        }
    }
}

/// First choice's content, or an error if the response carries none
fn reply_text(resp: ChatResponse) -> Result<String, CompletionError> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| CompletionError::InvalidResponse {
            message: "response contained no choices".to_string(),
        })
}

impl CompletionEndpoint for TogetherClient {
    fn name(&self) -> &str {
        "together"
    }

    fn complete(&self, model: &str, prompt: &str) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let resp = self
            .agent
            .post(&self.endpoint())
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Content-Type", "application/json")
            .send_json(&request)
            .map_err(|e| self.map_error(e))?;

        let parsed: ChatResponse = resp.into_json().map_err(|e| CompletionError::InvalidResponse {
            message: e.to_string(),
        })?;

        reply_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "m",
            messages: [ChatMessage {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "m", "messages": [{"role": "user", "content": "hello"}]})
        );
    }

    #[test]
    fn test_reply_text_takes_first_choice() {
        let resp: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"7"}},
                {"index":1,"message":{"role":"assistant","content":"3"}}]}"#,
        )
        .unwrap();
        assert_eq!(reply_text(resp).unwrap(), "7");
    }

    #[test]
    fn test_reply_text_without_choices() {
        let resp: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            reply_text(resp),
            Err(CompletionError::InvalidResponse { .. })
        ));
    }

    fn client() -> TogetherClient {
        let creds = Credentials {
            api_key: "k".to_string(),
        };
        TogetherClient::new("https://api.example.com/v1/", &creds, Duration::from_secs(1))
    }

    fn status_error(status: u16, body: &str) -> ureq::Error {
        let resp = ureq::Response::new(status, "status", body).unwrap();
        ureq::Error::Status(status, resp)
    }

    #[test]
    fn test_base_url_trailing_slash() {
        assert_eq!(client().endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn test_status_mapping() {
        let client = client();
        for status in [401, 403] {
            assert!(matches!(
                client.map_error(status_error(status, "denied")),
                CompletionError::Unauthorized { status: s } if s == status
            ));
        }
        assert!(matches!(
            client.map_error(status_error(429, "slow down")),
            CompletionError::RateLimited
        ));
        match client.map_error(status_error(500, "model overloaded")) {
            CompletionError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "model overloaded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_long_error_body_cut_on_char_boundary() {
        let body = format!("{}{}", "a".repeat(499), "€€€");
        match client().map_error(status_error(502, &body)) {
            CompletionError::Status { body, .. } => {
                assert_eq!(body.chars().count(), MAX_ERROR_BODY_CHARS);
                assert!(body.ends_with('€'));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
