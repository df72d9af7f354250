//! Knowledge-base lifecycle response types.
//!
//! The knowledge base is a retrieval index with independently provisionable
//! named resources. Lifecycle calls address either the whole knowledge base
//! or one resource; the shapes below are shared by both scopes.

use serde::{Deserialize, Serialize};

/// Provisioning status of the knowledge base (or one of its resources).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseStatus {
    /// The backing index exists.
    pub index_exists: bool,
    /// The ingest pipeline exists.
    pub pipeline_exists: bool,
    /// The embedding model is deployed.
    pub model_exists: bool,
    /// Whether the named resource has been loaded. Absent for whole-KB reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_exists: Option<bool>,
}

impl KnowledgeBaseStatus {
    /// True when every provisioning step for the addressed scope is done.
    pub fn is_ready(&self) -> bool {
        self.index_exists
            && self.pipeline_exists
            && self.model_exists
            && self.resource_exists.unwrap_or(true)
    }
}

/// Acknowledgement returned by knowledge-base create and delete calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseAck {
    pub success: bool,
}
