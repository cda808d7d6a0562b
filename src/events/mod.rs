pub mod bus;
pub mod listener;

pub use bus::{EventBus, MatchEvent, TEAMS_ASSIGNED};
pub use listener::{JitterRange, ListenerStats, ListenerStatsSnapshot, TeamsAssignedListener};
