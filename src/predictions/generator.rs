use tracing::{debug, warn};

use super::prompt::build_prediction_prompt;
use crate::ai::AiBackend;
use crate::domain::{AiPrediction, MatchRecord};

/// Why a generation attempt produced no prediction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    /// No model configured; retrying cannot help
    Unavailable(String),
    /// Transport or API error from the model
    Request(String),
    /// The model answered with something that is not a prediction
    Malformed { raw: String, reason: String },
}

impl GenerationFailure {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GenerationFailure::Unavailable(_))
    }
}

impl std::fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationFailure::Unavailable(reason) => write!(f, "AI unavailable: {}", reason),
            GenerationFailure::Request(reason) => write!(f, "AI request failed: {}", reason),
            GenerationFailure::Malformed { reason, .. } => {
                write!(f, "malformed AI response: {}", reason)
            }
        }
    }
}

/// Result of one generation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated(AiPrediction),
    Failed(GenerationFailure),
}

/// Remove markdown code fences the model tends to wrap JSON in
pub fn strip_markdown_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Decode a model response into a prediction. Any failure is fatal for the
/// attempt; there is no partial success.
pub fn parse_prediction_response(raw: &str) -> Result<AiPrediction, GenerationFailure> {
    let cleaned = strip_markdown_fences(raw);
    serde_json::from_str::<AiPrediction>(&cleaned).map_err(|e| GenerationFailure::Malformed {
        raw: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Builds prompts and asks the configured model for a prediction
#[derive(Debug, Clone)]
pub struct PredictionGenerator {
    backend: AiBackend,
}

impl PredictionGenerator {
    pub fn new(backend: AiBackend) -> Self {
        Self { backend }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    pub async fn generate(&self, record: &MatchRecord) -> GenerationOutcome {
        let model = match &self.backend {
            AiBackend::Available(model) => model,
            AiBackend::Unavailable { reason } => {
                return GenerationOutcome::Failed(GenerationFailure::Unavailable(reason.clone()));
            }
        };

        let prompt = build_prediction_prompt(record);
        debug!(match_id = %record.id, home = %record.home_team, away = %record.away_team, "requesting AI prediction");

        let raw = match model.generate_text(&prompt).await {
            Ok(raw) => raw,
            Err(e) => return GenerationOutcome::Failed(GenerationFailure::Request(e.to_string())),
        };

        match parse_prediction_response(&raw) {
            Ok(prediction) => {
                if record.phase.is_elimination() && prediction.predicted_score.is_draw() {
                    warn!(
                        match_id = %record.id,
                        score = %prediction.predicted_score,
                        "model predicted a draw for an elimination match"
                    );
                }
                GenerationOutcome::Generated(prediction)
            }
            Err(failure) => {
                warn!(match_id = %record.id, raw = %raw, error = %failure, "could not parse AI prediction");
                GenerationOutcome::Failed(failure)
            }
        }
    }
}
