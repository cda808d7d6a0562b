use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::gemini::{GeminiClient, GeminiConfig};
use crate::config::AiConfig;
use crate::error::Result;

/// A hosted text-generation model: one prompt in, raw text out
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String>;
}

/// The model handed to the generator at startup
#[derive(Clone)]
pub enum AiBackend {
    Available(Arc<dyn TextModel>),
    /// Generation is disabled; every call degrades to the fallback
    Unavailable { reason: String },
}

impl AiBackend {
    pub fn available(model: Arc<dyn TextModel>) -> Self {
        AiBackend::Available(model)
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        AiBackend::Unavailable {
            reason: reason.into(),
        }
    }

    /// Build the Gemini backend, or an unavailable one when the key is
    /// missing or the client cannot be constructed.
    pub fn from_config(config: &AiConfig) -> Self {
        let Some(gemini) = GeminiConfig::from_ai_config(config) else {
            warn!("No AI API key configured; predictions will use the fallback only");
            return Self::unavailable("AI API key not configured");
        };

        match GeminiClient::new(gemini) {
            Ok(client) => {
                info!(model = %client.model(), "AI prediction backend ready");
                Self::available(Arc::new(client))
            }
            Err(e) => {
                warn!(error = %e, "Failed to initialise AI client; predictions will use the fallback only");
                Self::unavailable(e.to_string())
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, AiBackend::Available(_))
    }
}

impl std::fmt::Debug for AiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiBackend::Available(_) => write!(f, "AiBackend::Available"),
            AiBackend::Unavailable { reason } => write!(f, "AiBackend::Unavailable({})", reason),
        }
    }
}
