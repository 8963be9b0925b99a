//! The external LLM collaborator.
//!
//! Wraps the OpenRouter chat-completions API behind an explicit
//! [`LlmConfig`], builds the scenario and explanation prompts, and reports
//! every upstream failure as an [`LlmError`].

pub mod client;
pub mod config;
pub mod error;
pub mod prompts;

pub use client::{ChatMessage, CompletionRequest, OpenRouterClient, ResponseFormat, Role};
pub use config::LlmConfig;
pub use error::{LlmError, Result};
pub use prompts::{DEFAULT_PROMPT, ExplainInput, SPECULATIVE_SYSTEM_PROMPT};
