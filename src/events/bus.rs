use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Event name raised when a bracket slot pair gets its teams
pub const TEAMS_ASSIGNED: &str = "match.teams.assigned";

/// In-process match events
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum MatchEvent {
    #[serde(rename = "match.teams.assigned", rename_all = "camelCase")]
    TeamsAssigned {
        match_id: Uuid,
        home_team: String,
        away_team: String,
    },
}

impl MatchEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MatchEvent::TeamsAssigned { .. } => TEAMS_ASSIGNED,
        }
    }

    pub fn match_id(&self) -> Uuid {
        match self {
            MatchEvent::TeamsAssigned { match_id, .. } => *match_id,
        }
    }
}

/// Fan-out channel between event producers and listeners
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MatchEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.tx.subscribe()
    }

    /// Publish without waiting on listeners. Returns how many receivers got it.
    pub fn publish(&self, event: MatchEvent) -> usize {
        let name = event.name();
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!(event = name, "no listeners subscribed, event dropped");
                0
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
