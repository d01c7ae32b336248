use crate::{
    constants::CHAT_PATH,
    errors::{ChatError, ChatResult},
    logging::{log_api_call, summarize_request},
    models::ApiCallLog,
};
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Instant;

/// Body of `POST /chat`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Reply from `POST /chat`. Any other fields are ignored.
#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Something that can answer one chat message.
///
/// Every call resolves to exactly one outcome; implementations do not retry.
pub trait ChatBackend: Send + Sync + 'static {
    fn send(&self, message: String) -> impl Future<Output = ChatResult<String>> + Send;
}

/// Talks to the chat endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    client: Client,
    endpoint: String,
}

impl HttpChatBackend {
    /// `server_url` is the base URL of the chat service; `/chat` is appended.
    pub fn new(server_url: &str) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(client: Client, server_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", server_url.trim_end_matches('/'), CHAT_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts `message` and returns the reply's `response` field verbatim.
    pub async fn chat(&self, message: &str) -> ChatResult<String> {
        let started = Instant::now();
        let mut status = None;
        let result = self.exchange(message, &mut status).await;

        log_api_call(&ApiCallLog {
            timestamp: Utc::now(),
            endpoint: self.endpoint.clone(),
            request_summary: summarize_request(message),
            response_status: status.map(|s: StatusCode| s.as_u16()),
            response_time_ms: started.elapsed().as_millis(),
        });

        result
    }

    async fn exchange(&self, message: &str, status: &mut Option<StatusCode>) -> ChatResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let code = response.status();
        *status = Some(code);
        if !code.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::debug!("Chat endpoint error body: {}", error_text);
            return Err(ChatError::status_error(code));
        }

        let body = response.text().await?;
        let reply: ChatReply = serde_json::from_str(&body)?;
        Ok(reply.response)
    }
}

impl ChatBackend for HttpChatBackend {
    fn send(&self, message: String) -> impl Future<Output = ChatResult<String>> + Send {
        let backend = self.clone();
        async move { backend.chat(&message).await }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[test]
    fn test_endpoint_joins_chat_path() {
        assert_eq!(
            HttpChatBackend::new("http://localhost:5000").endpoint(),
            "http://localhost:5000/chat"
        );
        assert_eq!(
            HttpChatBackend::new("http://localhost:5000/").endpoint(),
            "http://localhost:5000/chat"
        );
    }

    #[tokio::test]
    async fn test_chat_posts_message_and_returns_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "message": "What are the visiting hours?" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "Hello!"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let backend = HttpChatBackend::new(&mock_server.uri());
        let reply = backend.chat("What are the visiting hours?").await;

        assert_eq!(reply.unwrap(), "Hello!");
    }

    #[tokio::test]
    async fn test_chat_ignores_extra_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "<b>not markup</b>",
                "model": "whatever"
            })))
            .mount(&mock_server)
            .await;

        let backend = HttpChatBackend::new(&mock_server.uri());
        assert_eq!(backend.chat("hi").await.unwrap(), "<b>not markup</b>");
    }

    #[tokio::test]
    async fn test_chat_rejects_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "An internal error occurred"
            })))
            .mount(&mock_server)
            .await;

        let backend = HttpChatBackend::new(&mock_server.uri());
        let err = backend.chat("hi").await.unwrap_err();

        assert!(matches!(err, ChatError::Status { status } if status == StatusCode::INTERNAL_SERVER_ERROR));
        assert!(err.is_response_unavailable());
    }

    #[tokio::test]
    async fn test_chat_rejects_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
            .mount(&mock_server)
            .await;

        let backend = HttpChatBackend::new(&mock_server.uri());
        let err = backend.chat("hi").await.unwrap_err();

        assert!(matches!(err, ChatError::Decode(_)));
    }

    #[tokio::test]
    async fn test_chat_rejects_body_without_response_field() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "hi" })))
            .mount(&mock_server)
            .await;

        let backend = HttpChatBackend::new(&mock_server.uri());
        assert!(matches!(backend.chat("hi").await, Err(ChatError::Decode(_))));
    }

    #[tokio::test]
    async fn test_chat_reports_transport_failure() {
        // Reserve a port, then release it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpChatBackend::new(&format!("http://{}", addr));
        let err = backend.chat("hi").await.unwrap_err();

        assert!(matches!(err, ChatError::Transport(_)));
        assert!(err.is_response_unavailable());
    }
}
