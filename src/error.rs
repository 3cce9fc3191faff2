use thiserror::Error;

use crate::stat_name::StatName;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown stat name: {0}")]
    UnknownStat(String),

    #[error("stat {0} is not available on the input rows")]
    StatNotInInput(StatName),

    #[error("window size must be positive, got {0}")]
    InvalidWindow(i64),

    #[error("SRS iteration count must be positive, got {0}")]
    InvalidIterations(i64),

    #[error("invalid value for {key}: {value:?}")]
    InvalidSetting { key: String, value: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum DataShapeError {
    #[error("missing column {column} in {table}")]
    MissingColumn { table: &'static str, column: String },

    #[error("team {team_id} has schedule entries but no point differential in season {season}")]
    MissingPointDifferential { season: i32, team_id: u32 },

    #[error("no complete training rows before season {season}")]
    EmptyTrainingSet { season: i32 },

    #[error("invalid value in {table}.{column}: {value}")]
    InvalidValue {
        table: &'static str,
        column: &'static str,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("data shape error: {0}")]
    DataShape(#[from] DataShapeError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, Error>;
