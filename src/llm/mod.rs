//! Language-model client. One implementation: an OpenAI-compatible chat
//! completions endpoint.

pub mod openai;

pub use openai::OpenAiChatClient;
