pub mod match_record;
pub mod prediction;

pub use match_record::*;
pub use prediction::*;
