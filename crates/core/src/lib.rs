pub mod config;
pub mod error;
pub mod series;

pub use config::Config;
pub use error::{EvalError, Result};
pub use series::{segments, Segment, SegmentKind, ToleranceWindow};
