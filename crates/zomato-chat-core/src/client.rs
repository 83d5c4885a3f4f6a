use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session identifier sent with every chat request. Session lifecycle is
/// owned by the backend; the client only ever talks to this one.
pub const SESSION_ID: &str = "default";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to backend failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned status {0}")]
    Status(StatusCode),
    #[error("could not decode backend response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: SESSION_ID.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: serde_json::Value,
}

impl ToolInfo {
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_string),
            input_schema: serde_json::Value::Null,
        }
    }
}

#[derive(Deserialize)]
struct ToolsResponse {
    tools: Vec<ToolInfo>,
}

/// HTTP client for the chat backend
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// `base_url` is everything before the endpoint name, e.g.
    /// `http://localhost:8000/api`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let url = self.url("chat");
        tracing::debug!(%url, chars = request.message.chars().count(), "sending chat message");

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let body = response.bytes().await?;
        let chat_response: ChatResponse =
            serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(chat_response.response)
    }

    /// Only a transport failure is an error. Any HTTP reply, including a
    /// non-2xx status, counts as a completed reset.
    pub async fn reset(&self) -> Result<()> {
        let url = self.url("reset");
        tracing::debug!(%url, "resetting conversation");

        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "backend rejected reset");
        }
        Ok(())
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.url("");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn list_tools(&self) -> Result<Vec<ToolInfo>> {
        let url = self.url("tools");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let body = response.bytes().await?;
        let tools_response: ToolsResponse =
            serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(tools_response.tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_uses_default_session() {
        let json = serde_json::to_value(ChatRequest::new("find pizza")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "find pizza", "session_id": "default" })
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = BackendClient::new("http://localhost:8000/api/");
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("chat"), "http://localhost:8000/api/chat");
        assert_eq!(client.url(""), "http://localhost:8000/api/");
    }
}
