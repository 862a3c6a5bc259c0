//! Process-wide spatial reservation table.
//!
//! Before an agent starts building, it claims the structure's bounding
//! volume here. [`StructureRegistry::reserve`] is the single point that
//! keeps two agents from building overlapping structures: the overlap
//! check and the insert happen inside one critical section, so concurrent
//! callers are serialized and at most one of two overlapping claims can
//! win.
//!
//! Reservations are readable by everyone. They are removed by their
//! owner ([`release`](StructureRegistry::release),
//! [`release_agent`](StructureRegistry::release_agent)) or wholesale by
//! [`clear_all`](StructureRegistry::clear_all) on a fleet reset.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use foreman_types::{AgentId, ReservationId, StructureKind, Volume};
use serde::Serialize;
use tracing::{debug, info};

/// An exclusive claim on a world volume by one agent's build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureReservation {
    /// Unique reservation identifier.
    pub id: ReservationId,
    /// The agent whose build holds the claim.
    pub agent: AgentId,
    /// The structure being built.
    pub structure: StructureKind,
    /// The claimed bounding volume.
    pub volume: Volume,
    /// When the claim was granted.
    pub created_at: DateTime<Utc>,
}

/// A reservation request overlapped a live reservation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("volume {requested} overlaps {structure} {existing} held by agent {holder}")]
pub struct ReservationConflict {
    /// The volume that was requested.
    pub requested: Volume,
    /// The reservation that blocked it.
    pub existing: ReservationId,
    /// Owner of the blocking reservation.
    pub holder: AgentId,
    /// Structure of the blocking reservation.
    pub structure: StructureKind,
}

/// The shared reservation table.
///
/// Share it between agents with an `Arc`. The lock is never held across
/// an `.await`, and no method calls out while holding it.
#[derive(Debug, Default)]
pub struct StructureRegistry {
    reservations: Mutex<BTreeMap<ReservationId, StructureReservation>>,
}

impl StructureRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            reservations: Mutex::new(BTreeMap::new()),
        }
    }

    /// Lock the table.
    ///
    /// A panic while holding the lock cannot leave the map half-updated
    /// (every mutation is a single insert or remove), so a poisoned lock
    /// is recovered rather than propagated.
    fn table(&self) -> MutexGuard<'_, BTreeMap<ReservationId, StructureReservation>> {
        self.reservations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically claim `volume` for `agent`'s build of `structure`.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationConflict`] describing the first live
    /// reservation whose volume intersects `volume`. Nothing is inserted
    /// in that case.
    pub fn reserve(
        &self,
        agent: AgentId,
        structure: StructureKind,
        volume: Volume,
    ) -> Result<StructureReservation, ReservationConflict> {
        let mut table = self.table();

        if let Some(existing) = table.values().find(|r| r.volume.intersects(&volume)) {
            debug!(
                agent_id = %agent,
                structure = %structure,
                requested = %volume,
                holder = %existing.agent,
                existing = %existing.id,
                "reservation conflict"
            );
            return Err(ReservationConflict {
                requested: volume,
                existing: existing.id,
                holder: existing.agent,
                structure: existing.structure,
            });
        }

        let reservation = StructureReservation {
            id: ReservationId::new(),
            agent,
            structure,
            volume,
            created_at: Utc::now(),
        };
        table.insert(reservation.id, reservation.clone());
        drop(table);

        info!(
            agent_id = %agent,
            reservation_id = %reservation.id,
            structure = %structure,
            volume = %volume,
            "structure volume reserved"
        );
        Ok(reservation)
    }

    /// Remove a reservation.
    ///
    /// Idempotent: releasing an absent reservation is a no-op that
    /// returns `false`.
    pub fn release(&self, reservation: &StructureReservation) -> bool {
        self.release_id(reservation.id)
    }

    /// Remove a reservation by ID. Returns `true` if it was present.
    pub fn release_id(&self, id: ReservationId) -> bool {
        let removed = self.table().remove(&id);
        if let Some(ref r) = removed {
            debug!(
                agent_id = %r.agent,
                reservation_id = %id,
                structure = %r.structure,
                "structure reservation released"
            );
        }
        removed.is_some()
    }

    /// Remove every reservation held by `agent`. Returns how many were removed.
    pub fn release_agent(&self, agent: AgentId) -> usize {
        let mut table = self.table();
        let before = table.len();
        table.retain(|_, r| r.agent != agent);
        let removed = before.saturating_sub(table.len());
        drop(table);
        if removed > 0 {
            debug!(agent_id = %agent, removed, "released all reservations for agent");
        }
        removed
    }

    /// Remove every reservation. Returns how many were removed.
    ///
    /// Used on fleet-wide reset only. Clearing an empty registry is a no-op.
    pub fn clear_all(&self) -> usize {
        let mut table = self.table();
        let removed = table.len();
        table.clear();
        drop(table);
        if removed > 0 {
            info!(removed, "structure registry cleared");
        }
        removed
    }

    /// The first live reservation intersecting `volume`, if any.
    ///
    /// Read-only check; a `None` here does not guarantee a later
    /// [`reserve`](Self::reserve) succeeds.
    pub fn conflicts_with(&self, volume: &Volume) -> Option<StructureReservation> {
        self.table()
            .values()
            .find(|r| r.volume.intersects(volume))
            .cloned()
    }

    /// Snapshot of all live reservations, ordered by creation.
    pub fn reservations(&self) -> Vec<StructureReservation> {
        self.table().values().cloned().collect()
    }

    /// Snapshot of the reservations held by one agent.
    pub fn held_by(&self, agent: AgentId) -> Vec<StructureReservation> {
        self.table()
            .values()
            .filter(|r| r.agent == agent)
            .cloned()
            .collect()
    }

    /// Number of live reservations.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    /// Whether no reservations are live.
    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }
}
