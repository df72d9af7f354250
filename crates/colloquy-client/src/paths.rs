//! Gateway URL templates and substitution.
//!
//! Knowledge-base calls address either the whole knowledge base or one
//! named resource by substituting into a single template; the empty
//! substitution addresses the base scope, so both shapes share one route.

/// Connector execution, POST.
pub const EXECUTE_PATH_TEMPLATE: &str = "/internal/assistant/actions/connector/{connector_id}/_execute";

/// Knowledge-base lifecycle, GET/POST/DELETE.
pub const KNOWLEDGE_BASE_PATH_TEMPLATE: &str = "/internal/assistant/knowledge_base/{resource}";

/// Conversation listing, GET.
pub const CONVERSATIONS_FIND_PATH: &str = "/internal/assistant/conversations/_find";

/// Execution path for one connector.
pub fn connector_execute_path(connector_id: &str) -> String {
    EXECUTE_PATH_TEMPLATE.replace("{connector_id}", connector_id)
}

/// Knowledge-base path for the given scope: a named resource, or the whole
/// knowledge base when `resource` is absent (empty segment).
pub fn knowledge_base_path(resource: Option<&str>) -> String {
    KNOWLEDGE_BASE_PATH_TEMPLATE.replace("{resource}", resource.unwrap_or(""))
}
