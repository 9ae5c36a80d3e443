//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup and the run so
//! that `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: recharge_core::config::ConfigError,
    },

    /// World construction failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: recharge_world::WorldError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: recharge_core::runner::RunnerError,
    },

    /// The logging filter could not be built.
    #[error("invalid log filter {directive:?}: {message}")]
    LogFilter {
        /// The rejected directive.
        directive: String,
        /// Why it was rejected.
        message: String,
    },
}
