//! Connector execution request/response types.
//!
//! These are the wire shapes for the gateway's
//! `/actions/connector/{connector_id}/_execute` endpoint. The request body
//! uses camelCase field names with one historical exception
//! (`isEnabledRAGAlerts`); the response envelope uses snake_case.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Mapping of de-identified placeholders to their original values (or the
/// reverse), substituted into assistant text by the backend.
///
/// Ordered so serialized bodies are deterministic.
pub type Replacements = BTreeMap<String, String>;

/// Execution mode selector carried in the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubAction {
    /// Buffered execution: the gateway returns a JSON envelope.
    #[serde(rename = "invokeAI")]
    InvokeAi,
    /// Streamed execution: the gateway returns raw bytes as they arrive.
    #[serde(rename = "invokeStream")]
    InvokeStream,
}

impl fmt::Display for SubAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubAction::InvokeAi => write!(f, "invokeAI"),
            SubAction::InvokeStream => write!(f, "invokeStream"),
        }
    }
}

impl FromStr for SubAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invokeAI" => Ok(SubAction::InvokeAi),
            "invokeStream" => Ok(SubAction::InvokeStream),
            other => Err(format!("invalid sub-action: '{other}'")),
        }
    }
}

/// Connector addressing and model selection for an execute call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Opaque id of the configured integration endpoint.
    pub connector_id: String,
    /// Action type registered for the connector (required by the gateway).
    pub action_type_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Optional tracing fields for an execute call.
///
/// Empty strings are treated as absent when the wire body is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceOptions {
    pub project: String,
    pub api_key: String,
}

/// Caller-facing parameters for a connector execute call.
///
/// `conversation_id` and `api_config.action_type_id` are required;
/// `replacements` is required but may be empty. Streaming is selected by
/// the caller via [`ExecuteRequest::streaming`], not negotiated with the
/// gateway.
#[derive(Debug, Clone)]
pub struct ExecuteRequest {
    pub conversation_id: String,
    pub api_config: ApiConfig,
    pub message: Option<String>,
    /// Select streamed (`invokeStream`) over buffered (`invokeAI`) delivery.
    pub streaming: bool,
    pub replacements: Replacements,
    pub is_enabled_knowledge_base: bool,
    pub is_enabled_rag_alerts: bool,
    /// Index pattern for alert retrieval. Sent only when RAG alerts are on.
    pub alerts_index_pattern: Option<String>,
    /// Upper bound on retrieved alert results. Sent only when RAG alerts are on.
    pub size: Option<u32>,
    pub trace_options: Option<TraceOptions>,
}

impl ExecuteRequest {
    /// Minimal request for a conversation/connector pair; everything else
    /// starts disabled or absent.
    pub fn new(conversation_id: impl Into<String>, api_config: ApiConfig) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            api_config,
            message: None,
            streaming: false,
            replacements: Replacements::new(),
            is_enabled_knowledge_base: false,
            is_enabled_rag_alerts: false,
            alerts_index_pattern: None,
            size: None,
            trace_options: None,
        }
    }
}

/// JSON body POSTed to the connector execute endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub sub_action: SubAction,
    pub conversation_id: String,
    pub action_type_id: String,
    pub replacements: Replacements,
    pub is_enabled_knowledge_base: bool,
    #[serde(rename = "isEnabledRAGAlerts")]
    pub is_enabled_rag_alerts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alerts_index_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_api_key: Option<String>,
}

/// Treat empty strings as absent.
fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl ExecuteRequestBody {
    /// Build the wire body from caller parameters.
    ///
    /// The alerts index pattern and result-size bound are included only
    /// when RAG alerts are enabled; empty-string trace fields are stripped.
    pub fn from_request(request: &ExecuteRequest) -> Self {
        let (alerts_index_pattern, size) = if request.is_enabled_rag_alerts {
            (request.alerts_index_pattern.clone(), request.size)
        } else {
            (None, None)
        };

        let (trace_project, trace_api_key) = match &request.trace_options {
            Some(trace) => (non_empty(&trace.project), non_empty(&trace.api_key)),
            None => (None, None),
        };

        Self {
            model: request.api_config.model.clone(),
            message: request.message.clone(),
            sub_action: if request.streaming {
                SubAction::InvokeStream
            } else {
                SubAction::InvokeAi
            },
            conversation_id: request.conversation_id.clone(),
            action_type_id: request.api_config.action_type_id.clone(),
            replacements: request.replacements.clone(),
            is_enabled_knowledge_base: request.is_enabled_knowledge_base,
            is_enabled_rag_alerts: request.is_enabled_rag_alerts,
            alerts_index_pattern,
            size,
            trace_project,
            trace_api_key,
        }
    }
}

/// Trace identifiers on the wire. Each id is individually optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeTraceData {
    pub transaction_id: Option<String>,
    pub trace_id: Option<String>,
}

/// Trace identifiers surfaced to the caller -- only when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceData {
    pub trace_id: String,
    pub transaction_id: String,
}

/// Buffered JSON envelope returned by the execute endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteEnvelope {
    #[serde(default)]
    pub connector_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub replacements: Option<Replacements>,
    #[serde(default)]
    pub service_message: Option<String>,
    #[serde(default)]
    pub trace_data: Option<EnvelopeTraceData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ExecuteRequest {
        ExecuteRequest::new(
            "conv-1",
            ApiConfig {
                connector_id: "connector-9".to_string(),
                action_type_id: ".inference".to_string(),
                model: Some("sonnet".to_string()),
                provider: None,
            },
        )
    }

    #[test]
    fn test_sub_action_roundtrip() {
        for action in [SubAction::InvokeAi, SubAction::InvokeStream] {
            let s = action.to_string();
            let parsed: SubAction = s.parse().unwrap();
            assert_eq!(action, parsed);
        }
    }

    #[test]
    fn test_sub_action_wire_names() {
        assert_eq!(
            serde_json::to_string(&SubAction::InvokeAi).unwrap(),
            "\"invokeAI\""
        );
        assert_eq!(
            serde_json::to_string(&SubAction::InvokeStream).unwrap(),
            "\"invokeStream\""
        );
    }

    #[test]
    fn test_body_field_names() {
        let mut req = request();
        req.message = Some("hello".to_string());
        let json = serde_json::to_value(ExecuteRequestBody::from_request(&req)).unwrap();

        assert_eq!(json["subAction"], "invokeAI");
        assert_eq!(json["conversationId"], "conv-1");
        assert_eq!(json["actionTypeId"], ".inference");
        assert_eq!(json["isEnabledKnowledgeBase"], false);
        assert_eq!(json["isEnabledRAGAlerts"], false);
        assert_eq!(json["model"], "sonnet");
        // Absent optionals stay off the wire entirely.
        assert!(json.get("alertsIndexPattern").is_none());
        assert!(json.get("size").is_none());
        assert!(json.get("traceProject").is_none());
    }

    #[test]
    fn test_streaming_selects_invoke_stream() {
        let mut req = request();
        req.streaming = true;
        let body = ExecuteRequestBody::from_request(&req);
        assert_eq!(body.sub_action, SubAction::InvokeStream);
    }

    #[test]
    fn test_alert_params_gated_on_rag_flag() {
        let mut req = request();
        req.alerts_index_pattern = Some(".alerts-*".to_string());
        req.size = Some(20);

        let body = ExecuteRequestBody::from_request(&req);
        assert!(body.alerts_index_pattern.is_none());
        assert!(body.size.is_none());

        req.is_enabled_rag_alerts = true;
        let body = ExecuteRequestBody::from_request(&req);
        assert_eq!(body.alerts_index_pattern.as_deref(), Some(".alerts-*"));
        assert_eq!(body.size, Some(20));
    }

    #[test]
    fn test_empty_trace_fields_stripped() {
        let mut req = request();
        req.trace_options = Some(TraceOptions {
            project: "".to_string(),
            api_key: "key-1".to_string(),
        });
        let body = ExecuteRequestBody::from_request(&req);
        assert!(body.trace_project.is_none());
        assert_eq!(body.trace_api_key.as_deref(), Some("key-1"));
    }

    #[test]
    fn test_envelope_deserializes_with_optional_fields() {
        let json = r#"{
            "connector_id": "connector-9",
            "status": "ok",
            "data": "Hello from the model",
            "trace_data": {"transaction_id": "tx-1", "trace_id": "tr-1"}
        }"#;
        let envelope: ExecuteEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status, "ok");
        assert_eq!(envelope.data.as_deref(), Some("Hello from the model"));
        assert!(envelope.service_message.is_none());
        let trace = envelope.trace_data.unwrap();
        assert_eq!(trace.trace_id.as_deref(), Some("tr-1"));
    }

    #[test]
    fn test_envelope_minimal() {
        let envelope: ExecuteEnvelope = serde_json::from_str(r#"{"status": "error"}"#).unwrap();
        assert_eq!(envelope.status, "error");
        assert!(envelope.data.is_none());
        assert!(envelope.trace_data.is_none());
    }
}
