pub mod algorithm;
pub mod common;
pub mod config;
pub mod error;
pub mod map;
pub mod scenario;
pub mod stat;

pub use algorithm::{PathSearch, SearchRun, Step, Stepwise, WalkabilityOracle};
pub use common::{Cell, CornerCutting, Metric, PathResult, SearchConfig, SearchSnapshot};
pub use error::{Endpoint, SearchError};
