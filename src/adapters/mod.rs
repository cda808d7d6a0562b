pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::InMemoryMatchStore;
pub use postgres::PostgresStore;
pub use store::{MatchStore, PredictionWrite};
