//! Hedera Agent CLI Chatbot
//!
//! A command-line chatbot that binds an OpenAI-compatible language model
//! to a toolkit of Hedera network operations and chats with the operator
//! over a read-eval-print loop.

pub mod types;
pub mod config;
pub mod llm;
pub mod hub;
pub mod hedera;
pub mod toolkit;
pub mod agent;
pub mod repl;
