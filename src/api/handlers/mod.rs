pub mod predictions;
pub mod system;

pub use predictions::*;
pub use system::*;
