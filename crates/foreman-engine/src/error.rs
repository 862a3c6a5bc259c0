//! Error types for the engine binary.
//!
//! [`EngineError`] covers what can go wrong while handling a console
//! line. Startup failures go through `anyhow` in `main`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A fleet operation was rejected.
    #[error("fleet error: {source}")]
    Fleet {
        /// The underlying fleet error.
        #[from]
        source: foreman_core::FleetError,
    },

    /// No live agent has the given name.
    #[error("no agent named {name}")]
    UnknownAgent {
        /// The name that was looked up.
        name: String,
    },

    /// The command needs a fleet but none is spawned.
    #[error("no fleet is spawned (try /join)")]
    NoFleet,
}
