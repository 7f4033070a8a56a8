//! Monster decision making.
//!
//! [`ChasePolicy`] is the per-tick chase-and-attack loop. Whether an adjacent
//! monster actually swings is delegated to a [`Temperament`], so new monster
//! personalities plug in without touching the tick algorithm.

pub mod policy;
pub mod temperament;

use bracket_geometry::prelude::Point;

pub use policy::{ChasePolicy, Decision};
pub use temperament::{Temperament, TemperamentKind};

/// Something that occupies a cell and can trade blows.
pub trait Agent {
    fn point(&self) -> Point;

    fn set_point(&mut self, point: Point);

    /// Remaining health as a fraction of maximum, in `0.0..=1.0`.
    fn vitality(&self) -> f32;

    /// Returns `true` if the blow connected.
    fn try_attack(&mut self, target: &mut dyn Agent) -> bool;

    /// Applies an incoming hit of raw `power` and returns the damage taken.
    fn receive_damage(&mut self, power: i32) -> i32;
}

/// Move validation and commit, owned by whoever holds the level.
pub trait Grid {
    /// Moves whatever stands on `from` to `to` if `to` is free. Returns
    /// `false` and leaves the grid untouched otherwise.
    fn try_move(&mut self, from: Point, to: Point) -> bool;
}
