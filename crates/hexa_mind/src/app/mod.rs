pub(crate) mod bootstrap;
pub(crate) mod level;
pub(crate) mod loop_runner;
pub(crate) mod occupancy_map;
pub(crate) mod script;

use mind_engine::{ConfigError, GridError};
use thiserror::Error;

use self::level::LevelError;
use self::script::ScriptError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("grid config rejected: {0}")]
    Config(#[from] ConfigError),
    #[error("grid operation failed: {0}")]
    Grid(#[from] GridError),
}
