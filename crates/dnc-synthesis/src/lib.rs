//! LLM client for the DNC service.
//!
//! The endpoint is a chat-style proxy: it receives a prompt plus JSON
//! attachments and answers with markdown. The answer must carry exactly one
//! fenced ```` ```json ```` block, which [`contract`] extracts and parses.

mod client;
pub mod contract;
pub mod error;
pub mod prompt;

pub use client::{LlmClient, LlmConfig};
pub use error::{Error, Result};
