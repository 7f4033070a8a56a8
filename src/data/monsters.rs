use chrono::TimeDelta;

use crate::ai::TemperamentKind;

#[derive(Clone, Debug)]
pub struct MonsterTemplate {
    pub name: &'static str,
    pub hp: i32,
    pub power: i32,
    pub defense: i32,
    /// Time between actions.
    pub cooldown: TimeDelta,
    pub sight_radius: f32,
    pub temperament: TemperamentKind,
}

impl MonsterTemplate {
    pub fn roster() -> Vec<Self> {
        vec![
            Self::new(
                "Cave Rat",
                5,
                2,
                0,
                200,
                6.0,
                TemperamentKind::Skittish { flee_below: 0.4 },
            ),
            Self::new("Goblin", 8, 3, 0, 300, 8.0, TemperamentKind::Aggressive),
            Self::new("Skeleton", 12, 4, 1, 450, 8.0, TemperamentKind::Aggressive),
            Self::new("Ogre", 20, 6, 2, 800, 5.0, TemperamentKind::Aggressive),
        ]
    }

    fn new(
        name: &'static str,
        hp: i32,
        power: i32,
        defense: i32,
        cooldown_ms: i64,
        sight_radius: f32,
        temperament: TemperamentKind,
    ) -> Self {
        Self {
            name,
            hp,
            power,
            defense,
            cooldown: TimeDelta::milliseconds(cooldown_ms),
            sight_radius,
            temperament,
        }
    }
}
