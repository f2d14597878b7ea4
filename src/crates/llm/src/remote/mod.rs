//! Remote (cloud-hosted) LLM providers.

mod openai;

pub use openai::OpenAiClient;
