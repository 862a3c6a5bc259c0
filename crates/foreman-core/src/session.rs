//! Player-session gating of fleet spawns.
//!
//! The fleet is spawned once per session: the first time a player joins,
//! the configured agents appear in a line in front of them. Re-joins
//! within the same session leave the fleet alone. When the player leaves,
//! the fleet is torn down and the gate re-arms for the next session.

use foreman_types::{AgentId, BlockPos};
use foreman_world::WorldEffects;
use tracing::{debug, info};

use crate::config::FleetSection;
use crate::error::FleetError;
use crate::fleet::{FleetManager, SpawnSpec};

/// Horizontal direction a player is looking.
///
/// Uses block-world axes: north is `-z`, east is `+x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    /// Towards `-z`.
    North,
    /// Towards `+z`.
    #[default]
    South,
    /// Towards `+x`.
    East,
    /// Towards `-x`.
    West,
}

impl Facing {
    /// Unit step `(dx, dz)` straight ahead.
    pub const fn forward(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }

    /// Unit step `(dx, dz)` to the player's right.
    pub const fn right(self) -> (i32, i32) {
        match self {
            Self::North => (1, 0),
            Self::South => (-1, 0),
            Self::East => (0, 1),
            Self::West => (0, -1),
        }
    }
}

/// Where a player stands and which way they look.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anchor {
    /// Player block position.
    pub position: BlockPos,
    /// Player look direction.
    pub facing: Facing,
}

/// Lay `names` out in a line across the player's view.
///
/// The line sits `distance` blocks ahead of the anchor, with `spacing`
/// blocks between agents, centered on the player's line of sight.
///
/// # Errors
///
/// Returns [`FleetError::FormationOutOfBounds`] if a position does not
/// fit in block coordinates.
pub fn formation(
    anchor: Anchor,
    names: &[String],
    distance: i32,
    spacing: i32,
) -> Result<Vec<SpawnSpec>, FleetError> {
    let out_of_bounds = || FleetError::FormationOutOfBounds {
        anchor: anchor.position,
    };
    let (fx, fz) = anchor.facing.forward();
    let (rx, rz) = anchor.facing.right();

    let count = i32::try_from(names.len()).map_err(|_too_many| out_of_bounds())?;
    let span = count
        .saturating_sub(1)
        .checked_mul(spacing)
        .ok_or_else(out_of_bounds)?;
    let half_span = span.checked_div(2).ok_or_else(out_of_bounds)?;

    names
        .iter()
        .zip(0_i32..)
        .map(|(name, i)| {
            let lateral = i
                .checked_mul(spacing)
                .and_then(|l| l.checked_sub(half_span))
                .ok_or_else(out_of_bounds)?;
            let dx = fx
                .checked_mul(distance)
                .zip(rx.checked_mul(lateral))
                .and_then(|(a, b)| a.checked_add(b))
                .ok_or_else(out_of_bounds)?;
            let dz = fz
                .checked_mul(distance)
                .zip(rz.checked_mul(lateral))
                .and_then(|(a, b)| a.checked_add(b))
                .ok_or_else(out_of_bounds)?;
            let position = anchor.position.offset(dx, 0, dz).ok_or_else(out_of_bounds)?;
            Ok(SpawnSpec::new(name.clone(), position))
        })
        .collect()
}

/// One player connection.
#[derive(Debug, Clone, Default)]
pub struct Session {
    fleet: FleetSection,
    fleet_spawned: bool,
}

impl Session {
    /// Start a session that spawns the fleet described by `fleet`.
    pub const fn new(fleet: FleetSection) -> Self {
        Self {
            fleet,
            fleet_spawned: false,
        }
    }

    /// Whether this session has already spawned its fleet.
    pub const fn fleet_spawned(&self) -> bool {
        self.fleet_spawned
    }

    /// React to a player joining.
    ///
    /// The first join of a session resets the fleet in formation around
    /// `anchor` and returns the new agent IDs. Later joins return `None`.
    /// A failed reset leaves the gate open so the next join retries.
    ///
    /// # Errors
    ///
    /// Propagates [`FleetError`] from the formation or the reset.
    pub fn on_player_joined<E: WorldEffects>(
        &mut self,
        fleet: &mut FleetManager<E>,
        anchor: Anchor,
    ) -> Result<Option<Vec<AgentId>>, FleetError> {
        if self.fleet_spawned {
            debug!(position = %anchor.position, "player rejoined, fleet already spawned");
            return Ok(None);
        }
        let specs = formation(
            anchor,
            &self.fleet.names,
            self.fleet.spawn_distance,
            self.fleet.spacing,
        )?;
        let ids = fleet.reset_fleet(&specs)?;
        self.fleet_spawned = true;
        info!(position = %anchor.position, agents = ids.len(), "fleet spawned for session");
        Ok(Some(ids))
    }

    /// React to the player leaving: tear the fleet down and re-arm.
    ///
    /// Returns how many agents were removed.
    pub fn on_player_left<E: WorldEffects>(&mut self, fleet: &mut FleetManager<E>) -> usize {
        let removed = fleet.teardown();
        self.fleet_spawned = false;
        info!(removed, "session ended, fleet torn down");
        removed
    }
}
