pub mod logger;

pub use logger::{PostSource, RunLog, RunLogger};
