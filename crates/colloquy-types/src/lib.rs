//! Shared wire and domain types for the Colloquy assistant gateway client.
//!
//! This crate contains the request/response shapes exchanged with the
//! gateway -- connector execution, knowledge-base lifecycle, conversation
//! listing -- plus the shared [`fault::Fault`] error value.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod action;
pub mod conversation;
pub mod fault;
pub mod knowledge_base;
