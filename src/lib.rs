pub mod adapters;
pub mod ai;
pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod logging;
pub mod predictions;

pub use adapters::{InMemoryMatchStore, MatchStore, PostgresStore};
pub use ai::{AiBackend, GeminiClient, TextModel};
pub use config::AppConfig;
pub use domain::{AiPrediction, Confidence, MatchRecord, Phase, PredictionSource, Score};
pub use error::{PollaError, Result};
pub use events::{EventBus, MatchEvent, TeamsAssignedListener};
pub use predictions::{ControllerOutcome, PredictionService, PredictionView, RetryPolicy};
