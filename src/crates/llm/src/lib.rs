//! Hosted LLM client for the SQLancer dashboard.
//!
//! This crate provides the `ChatModel` trait together with a concrete
//! OpenAI chat-completions client. The dashboard's issue classifier talks
//! to the model exclusively through the trait, so tests can substitute a
//! canned implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::remote::OpenAiClient;
//! use llm::{ChatModel, ChatRequest, Message, RemoteLlmConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RemoteLlmConfig::from_env(
//!         "OPENAI_API_KEY",
//!         "https://api.openai.com/v1",
//!         "gpt-4o-mini",
//!     )?;
//!     let client = OpenAiClient::new(config);
//!
//!     let request = ChatRequest::new(vec![
//!         Message::system("You are a triage assistant."),
//!         Message::human("Classify this issue."),
//!     ])
//!     .with_temperature(0.2);
//!
//!     let response = client.chat(request).await?;
//!     println!("{}", response.message.content);
//!     Ok(())
//! }
//! ```
//!
//! Structured output is requested by attaching a `response_format` JSON
//! value to the request; the client forwards it verbatim to the API, which
//! then constrains the assistant message to the given schema.

pub mod chat;
pub mod config;
pub mod error;
pub mod remote;

pub use chat::{
    ChatConfig, ChatModel, ChatRequest, ChatResponse, Message, MessageRole, UsageMetadata,
};
pub use config::RemoteLlmConfig;
pub use error::{LlmError, Result};
