//! Transport-agnostic seam for the Colloquy assistant gateway client.
//!
//! This crate defines the [`api::AssistantApi`] trait that transport
//! implementations provide, the [`outcome::ExecuteOutcome`] tagged union
//! for the dual buffered/streamed result shape, and the pure
//! envelope-normalization rules in [`normalize`]. It depends only on
//! `colloquy-types` -- never on an HTTP crate.

pub mod api;
pub mod normalize;
pub mod outcome;
