//! AI integration module
//!
//! Contains the Ollama client used for embedding generation.

pub mod client;

pub use client::{EmbedRequest, ModelInfo, OllamaClient};
