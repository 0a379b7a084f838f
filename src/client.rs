//! Client for OpenAI-compatible chat-completion endpoints.

use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::config::OpenAiConfig;
use crate::endpoint::{self, Endpoint};
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, STREAM_ABORTS, STREAM_FRAGMENTS,
};
use crate::sse::process_sse;
use crate::types::ChatRequest;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for an OpenAI-compatible chat-completion endpoint.
///
/// One request is in flight per [`ask`](OpenAi::ask) or
/// [`ask_stream`](OpenAi::ask_stream) call. An instance may be reused for
/// sequential calls; concurrent use relies only on what reqwest natively
/// guarantees.
#[derive(Debug, Clone)]
pub struct OpenAi {
    config: OpenAiConfig,
    client: ReqwestClient,
    connect_timeout: Duration,
    cancel: CancellationToken,
}

impl OpenAi {
    /// Create a new client from a validated configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let connect_timeout = DEFAULT_CONNECT_TIMEOUT;
        let client = ReqwestClient::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            config,
            client,
            connect_timeout,
            cancel: CancellationToken::new(),
        })
    }

    /// Install a caller-supplied cancellation token.
    ///
    /// Cancelling the token aborts an in-progress request between reads; the
    /// call returns [`Error::Abort`]. Fragments already delivered are not
    /// retracted.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Create and return the headers for one request.
    fn request_headers(&self, endpoint: &Endpoint) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );
        let auth_value = HeaderValue::from_str(&endpoint.auth_value).map_err(|_| {
            Error::validation(
                "API key contains characters not permitted in a header",
                Some("api_key".to_string()),
            )
        })?;
        headers.insert(endpoint.auth_header, auth_value);
        Ok(headers)
    }

    /// Read a non-2xx response in full and convert it to an error.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        // OpenAI-compatible servers wrap failures as {"error": {"message": ...}};
        // fall back to the raw body when they don't.
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {e}"),
                    Some(Box::new(e)),
                );
            }
        };

        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error)
            .and_then(|e| e.message)
            .unwrap_or_else(|| body.clone());

        Error::api(status_code, message)
    }

    /// Map a reqwest send failure to the transport error taxonomy.
    fn process_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {e}"),
                Some(self.connect_timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
        }
    }

    /// Send a question and invoke `on_chunk` for every streamed fragment.
    ///
    /// Fragments are delivered synchronously, in order, before the next read.
    /// An error returned by `on_chunk` stops decoding immediately and
    /// propagates verbatim. A non-2xx status surfaces as [`Error::Api`] with
    /// the response body, before any fragment is delivered. The response body
    /// is closed on every exit path.
    pub async fn ask_stream<F>(&self, question: &str, mut on_chunk: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<()> + Send,
    {
        select! {
            _ = self.cancel.cancelled() => {
                STREAM_ABORTS.click();
                Err(Error::abort("request cancelled"))
            }
            result = self.stream_question(question, &mut on_chunk) => result,
        }
    }

    /// Issue the request and drive the decode loop.
    ///
    /// Cancellation is handled by the caller dropping this future; dropping
    /// closes the response body.
    async fn stream_question(
        &self,
        question: &str,
        on_chunk: &mut (dyn FnMut(&str) -> Result<()> + Send),
    ) -> Result<()> {
        let endpoint = endpoint::resolve(&self.config)?;
        let request = ChatRequest::for_question(question, &self.config.model_name);
        let body = serde_json::to_vec(&request).map_err(|e| {
            Error::serialization(format!("Failed to encode request: {e}"), Some(Box::new(e)))
        })?;

        CLIENT_REQUESTS.click();
        let response = self
            .client
            .post(&endpoint.url)
            .headers(self.request_headers(&endpoint)?)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                self.process_send_error(e)
            })?;

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        // Dropping the stream on any early return closes the response body.
        let mut stream = Box::pin(process_sse(response.bytes_stream()));
        while let Some(next) = stream.next().await {
            match next {
                Ok(fragment) => {
                    STREAM_FRAGMENTS.click();
                    on_chunk(&fragment)?;
                }
                Err(e) => {
                    CLIENT_REQUEST_ERRORS.click();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Send a question and return the whole answer at once.
    ///
    /// Implemented by collecting the fragments [`ask_stream`](OpenAi::ask_stream)
    /// delivers, in order, with no separators; the wire format is identical.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let mut answer = String::new();
        self.ask_stream(question, |fragment| {
            answer.push_str(fragment);
            Ok(())
        })
        .await?;
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> OpenAiConfig {
        OpenAiConfig {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: "test-key".to_string(),
            model_name: String::new(),
            azure_deployment_name: String::new(),
        }
    }

    #[test]
    fn client_creation() {
        let client = OpenAi::new(test_config()).unwrap();
        assert_eq!(client.config.api_key, "test-key");
        assert_eq!(client.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    }

    #[test]
    fn bearer_header_for_standard_endpoint() {
        let client = OpenAi::new(test_config()).unwrap();
        let endpoint = endpoint::resolve(&client.config).unwrap();
        let headers = client.request_headers(&endpoint).unwrap();
        assert_eq!(headers["Authorization"], "Bearer test-key");
        assert_eq!(headers["Content-Type"], "application/json");
        assert_eq!(headers["Accept"], "text/event-stream");
    }

    #[test]
    fn api_key_header_for_azure_endpoint() {
        let mut config = test_config();
        config.base_url = "https://x.openai.azure.com/".to_string();
        config.azure_deployment_name = "dep1".to_string();
        let client = OpenAi::new(config).unwrap();
        let endpoint = endpoint::resolve(&client.config).unwrap();
        let headers = client.request_headers(&endpoint).unwrap();
        assert_eq!(headers["api-key"], "test-key");
        assert!(headers.get("Authorization").is_none());
    }

    #[test]
    fn control_characters_in_key_rejected() {
        let mut config = test_config();
        config.api_key = "bad\nkey".to_string();
        let client = OpenAi::new(config).unwrap();
        let endpoint = endpoint::resolve(&client.config).unwrap();
        let err = client.request_headers(&endpoint).unwrap_err();
        assert!(err.is_validation());
    }
}
