use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PollaError;

/// Substring carried by every fallback reasoning text.
///
/// Rows written before `ai_prediction_source` existed can only be told apart
/// by this marker.
pub const FALLBACK_MARKER: &str = "predicción automática";

/// Final score as home-away goals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    pub fn is_draw(&self) -> bool {
        self.home == self.away
    }

    pub fn as_pair(&self) -> [u32; 2] {
        [self.home, self.away]
    }
}

impl FromStr for Score {
    type Err = PollaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (home, away) = s
            .split_once('-')
            .ok_or_else(|| PollaError::InvalidScore(s.to_string()))?;
        let home = home
            .trim()
            .parse::<u32>()
            .map_err(|_| PollaError::InvalidScore(s.to_string()))?;
        let away = away
            .trim()
            .parse::<u32>()
            .map_err(|_| PollaError::InvalidScore(s.to_string()))?;
        Ok(Self { home, away })
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

impl Serialize for Score {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Model confidence in a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    /// Placeholder shown while no prediction exists; never accepted from a model
    Pending,
}

/// Accepts the English and Spanish levels in any case. `pending` is rejected.
impl FromStr for Confidence {
    type Err = PollaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "alta" => Ok(Confidence::High),
            "medium" | "media" => Ok(Confidence::Medium),
            "low" | "baja" => Ok(Confidence::Low),
            _ => Err(PollaError::InvalidConfidence(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
            Confidence::Pending => write!(f, "pending"),
        }
    }
}

/// A generated (or fallback) match prediction, as stored in `ai_prediction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPrediction {
    pub predicted_score: Score,
    pub confidence: Confidence,
    pub reasoning: String,
}

/// Where a cached prediction came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PredictionSource {
    Ai,
    Fallback,
}

impl PredictionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionSource::Ai => "AI",
            PredictionSource::Fallback => "FALLBACK",
        }
    }
}

impl TryFrom<&str> for PredictionSource {
    type Error = PollaError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "AI" => Ok(PredictionSource::Ai),
            "FALLBACK" => Ok(PredictionSource::Fallback),
            other => Err(PollaError::Internal(format!(
                "unknown prediction source: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PredictionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a stored prediction is a fallback and may be regenerated
pub fn is_fallback(source: Option<PredictionSource>, raw_prediction: Option<&str>) -> bool {
    match source {
        Some(source) => source == PredictionSource::Fallback,
        None => raw_prediction
            .map(|raw| raw.to_lowercase().contains(FALLBACK_MARKER))
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_parse() {
        assert_eq!("2-1".parse::<Score>().unwrap(), Score::new(2, 1));
        assert_eq!(" 0 - 3 ".parse::<Score>().unwrap(), Score::new(0, 3));
        assert!("?-?".parse::<Score>().is_err());
        assert!("21".parse::<Score>().is_err());
        assert!("-1-2".parse::<Score>().is_err());
    }

    #[test]
    fn test_prediction_json_shape() {
        let prediction = AiPrediction {
            predicted_score: Score::new(2, 1),
            confidence: Confidence::High,
            reasoning: "Local fuerte".to_string(),
        };
        let json = serde_json::to_value(&prediction).unwrap();
        assert_eq!(json["predictedScore"], "2-1");
        assert_eq!(json["confidence"], "high");
    }

    #[test]
    fn test_confidence_accepts_spanish_and_rejects_pending() {
        let c: Confidence = serde_json::from_str("\"alta\"").unwrap();
        assert_eq!(c, Confidence::High);
        assert!(serde_json::from_str::<Confidence>("\"pending\"").is_err());
        assert!(serde_json::from_str::<Confidence>("\"PENDING\"").is_err());
        assert!(serde_json::from_str::<Confidence>("\"certain\"").is_err());
    }

    #[test]
    fn test_confidence_ignores_case() {
        assert_eq!("Alta".parse::<Confidence>().unwrap(), Confidence::High);
        assert_eq!(" MEDIA ".parse::<Confidence>().unwrap(), Confidence::Medium);
        assert_eq!("Baja".parse::<Confidence>().unwrap(), Confidence::Low);
        assert_eq!("High".parse::<Confidence>().unwrap(), Confidence::High);

        let prediction: AiPrediction = serde_json::from_str(
            r#"{"predictedScore":"1-0","confidence":"Media","reasoning":"Partido cerrado"}"#,
        )
        .unwrap();
        assert_eq!(prediction.confidence, Confidence::Medium);
        assert_eq!(serde_json::to_value(prediction.confidence).unwrap(), "medium");
    }

    #[test]
    fn test_is_fallback_prefers_explicit_source() {
        let marked = format!("{{\"reasoning\":\"Esta es una {}\"}}", FALLBACK_MARKER);
        assert!(is_fallback(Some(PredictionSource::Fallback), None));
        assert!(!is_fallback(Some(PredictionSource::Ai), Some(&marked)));
        assert!(is_fallback(None, Some(&marked)));
        assert!(!is_fallback(None, Some("{\"reasoning\":\"Análisis\"}")));
        assert!(!is_fallback(None, None));
    }
}
