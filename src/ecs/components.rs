use bracket_geometry::prelude::Point;
use serde::{Deserialize, Serialize};
use specs::prelude::{Component, NullStorage, VecStorage};

use crate::ai::{Agent, ChasePolicy};

#[derive(Clone, Debug)]
pub struct Position {
    pub point: Point,
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct IntentStep {
    pub delta: Point,
}

impl Default for IntentStep {
    fn default() -> Self {
        Self {
            delta: Point::new(0, 0),
        }
    }
}

impl Component for IntentStep {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Default)]
pub struct MonsterTag;

impl Component for MonsterTag {
    type Storage = NullStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Monster {
    pub name: String,
}

impl Component for Monster {
    type Storage = VecStorage<Self>;
}

/// A monster's chase policy plus how far it can spot the player.
#[derive(Debug)]
pub struct ChaseBrain {
    pub policy: ChasePolicy,
    pub sight_radius: f32,
}

impl Component for ChaseBrain {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub max_hp: i32,
    pub hp: i32,
    pub power: i32,
    pub defense: i32,
}

impl CombatStats {
    pub const fn new(hp: i32, power: i32, defense: i32) -> Self {
        Self {
            max_hp: hp,
            hp,
            power,
            defense,
        }
    }

    pub fn is_down(&self) -> bool {
        self.hp <= 0
    }
}

impl Component for CombatStats {
    type Storage = VecStorage<Self>;
}

/// Working copy of an entity's position and stats, handed to the policy and
/// written back once the tick is done.
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub point: Point,
    pub stats: CombatStats,
}

impl Body {
    pub const fn new(point: Point, stats: CombatStats) -> Self {
        Self { point, stats }
    }
}

impl Agent for Body {
    fn point(&self) -> Point {
        self.point
    }

    fn set_point(&mut self, point: Point) {
        self.point = point;
    }

    fn vitality(&self) -> f32 {
        if self.stats.max_hp <= 0 {
            return 0.0;
        }
        self.stats.hp as f32 / self.stats.max_hp as f32
    }

    fn try_attack(&mut self, target: &mut dyn Agent) -> bool {
        target.receive_damage(self.stats.power) > 0
    }

    fn receive_damage(&mut self, power: i32) -> i32 {
        if self.stats.is_down() {
            return 0;
        }
        let damage = (power - self.stats.defense).max(1);
        self.stats.hp = (self.stats.hp - damage).max(0);
        damage
    }
}
