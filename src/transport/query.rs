use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;

use crate::core::types::{QueryRequest, QueryResponse};
use crate::transport::error::TransportError;
use crate::transport::http::{HttpClient, HttpConfig, Utf8ChunkDecoder};
use crate::transport::types::BaseUrl;
use crate::transport::{ChunkStream, QueryTransport};

/// Talks to the course bot query service over HTTP.
#[derive(Clone)]
pub struct HttpTransport {
    http: HttpClient,
    base_url: BaseUrl,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(base_url: impl Into<BaseUrl>) -> Result<Self, TransportError> {
        Ok(Self {
            http: HttpClient::new()?,
            base_url: base_url.into(),
        })
    }

    pub fn with_http_config(
        base_url: impl Into<BaseUrl>,
        http_config: HttpConfig,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            http: HttpClient::with_config(http_config)?,
            base_url: base_url.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        self.base_url.query_endpoint()
    }

    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    async fn post(&self, request: &QueryRequest) -> Result<reqwest::Response, TransportError> {
        let url = self.endpoint();
        tracing::debug!(%url, messages = request.messages.len(), "Posting transcript");

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.http.map_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Query endpoint rejected request");
            return Err(TransportError::from_status(status.as_u16(), &error_body));
        }

        Ok(response)
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn complete(&self, request: QueryRequest) -> Result<QueryResponse, TransportError> {
        let response = self.post(&request).await?;

        let body = response
            .text()
            .await
            .map_err(|e| self.http.map_error(&e))?;

        serde_json::from_str(&body).map_err(|e| TransportError::Parse(e.to_string()))
    }

    async fn stream(&self, request: QueryRequest) -> Result<ChunkStream, TransportError> {
        let response = self.post(&request).await?;

        if response.status() == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Err(TransportError::StreamUnavailable);
        }

        let byte_stream = response.bytes_stream();
        Ok(Box::pin(Utf8ChunkDecoder::decode_stream(byte_stream)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Role, WireMessage};
    use futures::StreamExt;
    use mockito::Matcher;
    use serde_json::json;

    fn hi_request() -> QueryRequest {
        QueryRequest::new(vec![WireMessage::new(Role::User, "Hi")])
    }

    #[test]
    fn test_endpoint() {
        let transport = HttpTransport::new("http://localhost:5000/").expect("transport");
        assert_eq!(transport.endpoint(), "http://localhost:5000/api/query");
        assert_eq!(transport.name(), "http");
    }

    #[test]
    fn test_debug_shows_base_url() {
        let transport = HttpTransport::new("http://example.test").expect("transport");
        let debug = format!("{transport:?}");
        assert!(debug.contains("HttpTransport"));
        assert!(debug.contains("example.test"));
    }

    #[tokio::test]
    async fn test_complete_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/query")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "messages": [{"role": "user", "content": "Hi"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response": {"id": "2", "role": "assistant", "content": "Hello!"}}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(server.url()).expect("transport");
        let response = transport.complete(hi_request()).await.unwrap();

        assert_eq!(response.response, WireMessage::new(Role::Assistant, "Hello!"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_stream_yields_body_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/query")
            .with_status(200)
            .with_header("content-type", "text/plain; charset=utf-8")
            .with_body("Try Ma 1a, it covers calculus.")
            .create_async()
            .await;

        let transport = HttpTransport::new(server.url()).expect("transport");
        let chunks: Vec<_> = transport
            .stream(hi_request())
            .await
            .unwrap()
            .collect()
            .await;

        let text: String = chunks.into_iter().map(Result::unwrap).collect();
        assert_eq!(text, "Try Ma 1a, it covers calculus.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_maps_to_network() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/query")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let transport = HttpTransport::new(server.url()).expect("transport");

        let Err(err) = transport.stream(hi_request()).await else {
            panic!("expected an error");
        };
        assert_eq!(err.status(), Some(500));

        let err = transport.complete(hi_request()).await.unwrap_err();
        assert!(matches!(err, TransportError::Network { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_bad_request_message_is_extracted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/query")
            .with_status(400)
            .with_body(r#"{"error": "Invalid input, expected JSON with 'message' field"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(server.url()).expect("transport");
        let err = transport.complete(hi_request()).await.unwrap_err();

        match err {
            TransportError::Network { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("Invalid input"));
            }
            other => panic!("Expected Network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_content_is_stream_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/query")
            .with_status(204)
            .create_async()
            .await;

        let transport = HttpTransport::new(server.url()).expect("transport");
        let Err(err) = transport.stream(hi_request()).await else {
            panic!("expected an error");
        };
        assert!(matches!(err, TransportError::StreamUnavailable));
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/query")
            .with_status(200)
            .with_body(r#"{"answer": "wrong shape"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(server.url()).expect("transport");
        let err = transport.complete(hi_request()).await.unwrap_err();
        assert!(matches!(err, TransportError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_error() {
        let transport = HttpTransport::new("http://127.0.0.1:1").expect("transport");
        let err = transport.complete(hi_request()).await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
    }
}
