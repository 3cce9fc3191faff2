pub mod betting;
pub mod box_score;
pub mod config;
pub mod error;
pub mod export;
pub mod gamelog;
pub mod logging;
pub mod profit;
pub mod ratings;
pub mod season;
pub mod simulate;
pub mod srs;
pub mod stat_name;
pub mod store;
pub mod synthetic;
pub mod windowed;

pub use error::{ConfigError, DataShapeError, Error, Result};
