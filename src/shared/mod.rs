/// Shared utilities used across layers
pub mod cancel;
pub mod counter;
pub mod error;
mod result;

pub use cancel::until_cancelled;
pub use counter::ProgressCounter;
pub use error::{ExitCode, ScanError};
pub use result::Result;
