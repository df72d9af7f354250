//! GatewayClient -- reqwest implementation of [`AssistantApi`].
//!
//! One client instance is shared across calls; it holds no per-call state,
//! so concurrent use is safe and cloning is cheap. The execute path never
//! returns an error to the caller: transport faults, non-success statuses,
//! undecodable envelopes, and cancellation all fold into the returned
//! [`ExecuteOutcome`]. Knowledge-base and conversation calls return the
//! fault as a value instead.

use std::future::Future;

use reqwest::{Method, RequestBuilder, Response, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use colloquy_core::api::AssistantApi;
use colloquy_core::normalize::{fault_error_text, missing_reader_text, outcome_from_envelope};
use colloquy_core::outcome::ExecuteOutcome;
use colloquy_types::action::{ExecuteEnvelope, ExecuteRequest, ExecuteRequestBody};
use colloquy_types::conversation::{FindConversationsPage, FindConversationsParams};
use colloquy_types::fault::Fault;
use colloquy_types::knowledge_base::{KnowledgeBaseAck, KnowledgeBaseStatus};

use crate::config::GatewayConfig;
use crate::paths;
use crate::streaming::response_byte_stream;

/// Header carrying the internal API version tag.
const API_VERSION_HEADER: &str = "X-Internal-Api-Version";

/// HTTP client for the assistant gateway.
#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl GatewayClient {
    /// The internal API version this client speaks.
    pub const API_VERSION: &'static str = "1";

    pub fn new(config: GatewayConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .expect("failed to create reqwest client");

        Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Build the full URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request with the version tag and credentials applied.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(API_VERSION_HEADER, Self::API_VERSION);

        match &self.api_key {
            Some(key) => builder.header(
                header::AUTHORIZATION,
                format!("ApiKey {}", key.expose_secret()),
            ),
            None => builder,
        }
    }

    /// Invoke a connector. Never returns an error -- see the module docs.
    pub async fn execute(
        &self,
        request: ExecuteRequest,
        cancel: Option<CancellationToken>,
    ) -> ExecuteOutcome {
        let body = ExecuteRequestBody::from_request(&request);
        let url = self.url(&paths::connector_execute_path(
            &request.api_config.connector_id,
        ));
        tracing::debug!(
            conversation_id = %request.conversation_id,
            streaming = request.streaming,
            "dispatching connector execute"
        );

        let send = self.request(Method::POST, &url).json(&body).send();
        let response = match send_with_cancel(send, cancel).await {
            Ok(response) => response,
            Err(fault) => {
                tracing::warn!(fault = %fault, "connector execute failed before a response arrived");
                return ExecuteOutcome::buffered_error(fault_error_text(&fault));
            }
        };

        let status = response.status();
        if request.streaming {
            if !status.is_success() {
                // The failed exchange still carries a body; hand it back as
                // an errored stream rather than discarding the bytes.
                tracing::warn!(status = %status, "connector execute failed, recovering body as errored stream");
                return ExecuteOutcome::streamed_error(response_byte_stream(response));
            }
            if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
                return ExecuteOutcome::buffered_error(missing_reader_text());
            }
            return ExecuteOutcome::streamed(response_byte_stream(response));
        }

        if !status.is_success() {
            let fault = status_fault(response).await;
            return ExecuteOutcome::buffered_error(fault_error_text(&fault));
        }

        match response.json::<ExecuteEnvelope>().await {
            Ok(envelope) => outcome_from_envelope(envelope),
            Err(err) => {
                ExecuteOutcome::buffered_error(fault_error_text(&Fault::Decode(err.to_string())))
            }
        }
    }

    pub async fn knowledge_base_status(
        &self,
        resource: Option<&str>,
        cancel: Option<CancellationToken>,
    ) -> Result<KnowledgeBaseStatus, Fault> {
        let url = self.url(&paths::knowledge_base_path(resource));
        dispatch(self.request(Method::GET, &url), cancel).await
    }

    pub async fn create_knowledge_base(
        &self,
        resource: Option<&str>,
        cancel: Option<CancellationToken>,
    ) -> Result<KnowledgeBaseAck, Fault> {
        let url = self.url(&paths::knowledge_base_path(resource));
        dispatch(self.request(Method::POST, &url), cancel).await
    }

    pub async fn delete_knowledge_base(
        &self,
        resource: Option<&str>,
        cancel: Option<CancellationToken>,
    ) -> Result<KnowledgeBaseAck, Fault> {
        let url = self.url(&paths::knowledge_base_path(resource));
        dispatch(self.request(Method::DELETE, &url), cancel).await
    }

    pub async fn find_conversations(
        &self,
        params: FindConversationsParams,
        cancel: Option<CancellationToken>,
    ) -> Result<FindConversationsPage, Fault> {
        let url = self.url(paths::CONVERSATIONS_FIND_PATH);
        dispatch(self.request(Method::GET, &url).query(&params), cancel).await
    }
}

impl AssistantApi for GatewayClient {
    async fn execute(
        &self,
        request: ExecuteRequest,
        cancel: Option<CancellationToken>,
    ) -> ExecuteOutcome {
        GatewayClient::execute(self, request, cancel).await
    }

    async fn knowledge_base_status(
        &self,
        resource: Option<&str>,
        cancel: Option<CancellationToken>,
    ) -> Result<KnowledgeBaseStatus, Fault> {
        GatewayClient::knowledge_base_status(self, resource, cancel).await
    }

    async fn create_knowledge_base(
        &self,
        resource: Option<&str>,
        cancel: Option<CancellationToken>,
    ) -> Result<KnowledgeBaseAck, Fault> {
        GatewayClient::create_knowledge_base(self, resource, cancel).await
    }

    async fn delete_knowledge_base(
        &self,
        resource: Option<&str>,
        cancel: Option<CancellationToken>,
    ) -> Result<KnowledgeBaseAck, Fault> {
        GatewayClient::delete_knowledge_base(self, resource, cancel).await
    }

    async fn find_conversations(
        &self,
        params: FindConversationsParams,
        cancel: Option<CancellationToken>,
    ) -> Result<FindConversationsPage, Fault> {
        GatewayClient::find_conversations(self, params, cancel).await
    }
}

/// Send a request, racing it against the caller's cancellation token.
///
/// Biased toward cancellation so a pre-cancelled token deterministically
/// takes the fault path.
async fn send_with_cancel(
    send: impl Future<Output = Result<Response, reqwest::Error>>,
    cancel: Option<CancellationToken>,
) -> Result<Response, Fault> {
    match cancel {
        None => send.await.map_err(transport_fault),
        Some(token) => {
            tokio::select! {
                biased;
                () = token.cancelled() => Err(Fault::Cancelled),
                result = send => result.map_err(transport_fault),
            }
        }
    }
}

fn transport_fault(err: reqwest::Error) -> Fault {
    Fault::Transport(err.to_string())
}

/// JSON shape of the gateway's error bodies.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a non-success response into a [`Fault::Status`], preserving the
/// body's `message` field when the body decodes, else the raw body text.
async fn status_fault(response: Response) -> Fault {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => Some(parsed.message),
        Err(_) if body.is_empty() => None,
        Err(_) => Some(body),
    };
    Fault::Status { status, message }
}

/// Shared request/response cycle for the fault-as-value operations.
async fn dispatch<T: DeserializeOwned>(
    builder: RequestBuilder,
    cancel: Option<CancellationToken>,
) -> Result<T, Fault> {
    let response = send_with_cancel(builder.send(), cancel).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(status_fault(response).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|err| Fault::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client() -> GatewayClient {
        GatewayClient::new(GatewayConfig::default())
    }

    #[test]
    fn test_url_join() {
        let client = make_client().with_base_url("http://localhost:8080".to_string());
        assert_eq!(
            client.url("/internal/assistant/conversations/_find"),
            "http://localhost:8080/internal/assistant/conversations/_find"
        );
    }

    #[test]
    fn test_api_version() {
        assert_eq!(GatewayClient::API_VERSION, "1");
    }
}
