//! Fleet orchestration for the Foreman agent engine.
//!
//! # Modules
//!
//! - [`config`] -- `foreman-config.yaml` loading ([`FleetConfig`])
//! - [`fleet`] -- the set of live agents ([`FleetManager`])
//! - [`session`] -- once-per-session spawning ([`Session`])
//! - [`dispatch`] -- command planning and queuing ([`Commander`])
//! - [`error`] -- [`FleetError`]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod fleet;
pub mod session;

pub use config::{ConfigError, FleetConfig, FleetSection, LogFormat, LoggingConfig, TimingConfig};
pub use dispatch::{CommandReport, Commander};
pub use error::FleetError;
pub use fleet::{FleetManager, SpawnSpec};
pub use session::{Anchor, Facing, Session, formation};
