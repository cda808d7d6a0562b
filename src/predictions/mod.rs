//! AI match predictions: cache reads and writes, generation, retry with
//! fallback, and bulk resolution.

pub mod bulk;
pub mod cache;
pub mod fallback;
pub mod generator;
pub mod prompt;
pub mod retry;
pub mod service;

pub use bulk::{parse_match_ids, BulkResolver};
pub use cache::{PredictionAnalysis, PredictionCache, PredictionView};
pub use fallback::{fallback_prediction, fallback_score, settle_score};
pub use generator::{GenerationFailure, GenerationOutcome, PredictionGenerator};
pub use retry::{ControllerOutcome, RetryController, RetryPolicy, SkipReason};
pub use service::PredictionService;
