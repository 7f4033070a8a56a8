use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use chrono::TimeDelta;
use tracing::trace;

use crate::{ai::Grid, map::MapLayer};

/// Time elapsed since the previous tick.
#[derive(Clone, Copy, Debug)]
pub struct DeltaTime(pub TimeDelta);

impl Default for DeltaTime {
    fn default() -> Self {
        Self(TimeDelta::zero())
    }
}

/// Per-tick view of the level: what is walkable and who stands where.
#[derive(Clone, Debug)]
pub struct MovementContext {
    pub width: i32,
    pub height: i32,
    walkable: Vec<bool>,
    occupied: HashSet<Point>,
}

impl MovementContext {
    pub fn from_layer<I>(layer: &MapLayer, occupants: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        let walkable = layer
            .tiles
            .iter()
            .map(|tile| !tile.blocks_move)
            .collect::<Vec<bool>>();

        Self {
            width: layer.width,
            height: layer.height,
            walkable,
            occupied: occupants.into_iter().collect(),
        }
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        if !self.in_bounds(point) {
            return false;
        }
        let idx = (point.y * self.width + point.x) as usize;
        self.walkable.get(idx).copied().unwrap_or(false)
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn is_occupied(&self, point: Point) -> bool {
        self.occupied.contains(&point)
    }

    /// Drops a cell from the occupancy set, e.g. when its occupant dies.
    pub fn vacate(&mut self, point: Point) {
        self.occupied.remove(&point);
    }
}

impl Grid for MovementContext {
    fn try_move(&mut self, from: Point, to: Point) -> bool {
        if !self.is_walkable(to) || self.is_occupied(to) {
            trace!(?from, ?to, "move refused");
            return false;
        }
        self.occupied.remove(&from);
        self.occupied.insert(to);
        true
    }
}

#[derive(Default)]
pub struct CombatLog {
    pub entries: Vec<String>,
}

impl CombatLog {
    pub fn push<S: Into<String>>(&mut self, entry: S) {
        self.entries.push(entry.into());
    }
}
