//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Agents, structure reservations, and commands each carry a distinct ID
//! type so a reservation ID can never be handed to an API expecting an
//! agent. All IDs use UUID v7 (time-ordered), which keeps registry
//! snapshots and log lines sortable by creation time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for one live agent runtime.
    ///
    /// A fleet reset always mints fresh IDs, even when the display names
    /// are reused.
    AgentId
}

define_id! {
    /// Unique identifier for a structure volume reservation.
    ReservationId
}

define_id! {
    /// Unique identifier for a player command.
    CommandId
}
