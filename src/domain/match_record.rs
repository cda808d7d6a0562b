use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::prediction::PredictionSource;

/// Team names that stand in for an unresolved bracket slot
const PLACEHOLDER_TEAMS: &[&str] = &["tbd", "por definir", "a definir"];

/// Tournament stage of a match
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Phase {
    Group,
    RoundOf32,
    RoundOf16,
    Quarter,
    Semi,
    ThirdPlace,
    Final,
    /// A stage name this service does not know
    Unknown(String),
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Group => "GROUP",
            Phase::RoundOf32 => "ROUND_32",
            Phase::RoundOf16 => "ROUND_16",
            Phase::Quarter => "QUARTER",
            Phase::Semi => "SEMI",
            Phase::ThirdPlace => "3RD_PLACE",
            Phase::Final => "FINAL",
            Phase::Unknown(raw) => raw,
        }
    }

    /// Knockout stage: a predicted tie is not allowed.
    ///
    /// Everything other than `GROUP` counts, unknown stages included.
    pub fn is_elimination(&self) -> bool {
        !matches!(self, Phase::Group)
    }

    /// Spanish display name used in prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Group => "Fase de Grupos",
            Phase::RoundOf32 => "Dieciseisavos de Final",
            Phase::RoundOf16 => "Octavos de Final",
            Phase::Quarter => "Cuartos de Final",
            Phase::Semi => "Semifinal",
            Phase::ThirdPlace => "Partido por el Tercer Puesto",
            Phase::Final => "Gran Final",
            Phase::Unknown(_) => "Fase de Grupos",
        }
    }
}

impl From<&str> for Phase {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GROUP" => Phase::Group,
            "ROUND_32" => Phase::RoundOf32,
            "ROUND_16" => Phase::RoundOf16,
            "QUARTER" => Phase::Quarter,
            "SEMI" => Phase::Semi,
            "3RD_PLACE" => Phase::ThirdPlace,
            "FINAL" => Phase::Final,
            _ => Phase::Unknown(raw.to_string()),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Phase {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Phase::from(raw.as_str()))
    }
}

/// The prediction-relevant subset of a match row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: Uuid,
    pub home_team: String,
    pub away_team: String,
    pub phase: Phase,
    pub tournament_id: String,
    pub stadium: Option<String>,
    /// Serialized `AiPrediction` JSON
    pub ai_prediction: Option<String>,
    pub ai_prediction_score: Option<String>,
    pub ai_prediction_generated_at: Option<DateTime<Utc>>,
    pub ai_prediction_source: Option<PredictionSource>,
}

impl MatchRecord {
    pub fn new(
        id: Uuid,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        phase: Phase,
        tournament_id: impl Into<String>,
    ) -> Self {
        Self {
            id,
            home_team: home_team.into(),
            away_team: away_team.into(),
            phase,
            tournament_id: tournament_id.into(),
            stadium: None,
            ai_prediction: None,
            ai_prediction_score: None,
            ai_prediction_generated_at: None,
            ai_prediction_source: None,
        }
    }

    pub fn with_stadium(mut self, stadium: impl Into<String>) -> Self {
        self.stadium = Some(stadium.into());
        self
    }

    /// Both bracket slots are filled with real team names
    pub fn teams_known(&self) -> bool {
        is_known_team(&self.home_team) && is_known_team(&self.away_team)
    }

    pub fn has_cached_prediction(&self) -> bool {
        self.ai_prediction_score.is_some()
    }

    /// Drop every cached prediction field
    pub fn clear_prediction(&mut self) {
        self.ai_prediction = None;
        self.ai_prediction_score = None;
        self.ai_prediction_generated_at = None;
        self.ai_prediction_source = None;
    }
}

pub fn is_known_team(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty()
        && !PLACEHOLDER_TEAMS
            .iter()
            .any(|p| trimmed.eq_ignore_ascii_case(p))
}
