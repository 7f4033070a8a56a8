use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use super::Agent;

/// Decision hooks consulted by the chase loop. Both must be free of side
/// effects.
pub trait Temperament: Debug + Send + Sync {
    fn should_attack(&self, _actor: &dyn Agent, _target: &dyn Agent) -> bool {
        true
    }

    /// Reserved for variants that run. The chase loop never asks.
    fn should_flee(&self, _actor: &dyn Agent, _target: &dyn Agent) -> bool {
        false
    }
}

/// Always swings when it can.
#[derive(Clone, Copy, Debug, Default)]
pub struct Aggressive;

impl Temperament for Aggressive {}

/// Loses its nerve once its health drops to `flee_below` or less.
#[derive(Clone, Copy, Debug)]
pub struct Skittish {
    pub flee_below: f32,
}

impl Temperament for Skittish {
    fn should_attack(&self, actor: &dyn Agent, target: &dyn Agent) -> bool {
        !self.should_flee(actor, target)
    }

    fn should_flee(&self, actor: &dyn Agent, _target: &dyn Agent) -> bool {
        actor.vitality() <= self.flee_below
    }
}

/// Serializable selector for the built-in temperaments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemperamentKind {
    #[default]
    Aggressive,
    Skittish {
        flee_below: f32,
    },
}

impl TemperamentKind {
    pub fn build(self) -> Box<dyn Temperament> {
        match self {
            TemperamentKind::Aggressive => Box::new(Aggressive),
            TemperamentKind::Skittish { flee_below } => Box::new(Skittish { flee_below }),
        }
    }
}
