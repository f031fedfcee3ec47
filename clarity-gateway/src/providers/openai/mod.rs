//! OpenAI Chat Completions integration.

pub mod client;

pub use client::OpenAiClient;
