//! HTTP implementation of the Colloquy assistant gateway client.
//!
//! [`client::GatewayClient`] implements the `AssistantApi` trait from
//! `colloquy-core` over reqwest: connector execution (buffered or
//! streamed), knowledge-base lifecycle, and conversation listing.
//! Configuration loading lives in [`config`], URL templating in [`paths`].

pub mod client;
pub mod config;
pub mod paths;
mod streaming;

pub use client::GatewayClient;
pub use config::{GatewayConfig, load_config};
