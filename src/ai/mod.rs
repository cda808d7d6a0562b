//! Hosted generative model access
//!
//! The prediction generator only sees the `TextModel` trait; `AiBackend`
//! decides at startup whether a real client exists.

pub mod gemini;
pub mod model;

pub use gemini::{GeminiClient, GeminiConfig};
pub use model::{AiBackend, TextModel};

#[cfg(test)]
pub use model::MockTextModel;
