pub mod context;
pub mod error;

pub use context::{AppContext, LiveCycle};
pub use error::{PostwatchError, Result};
