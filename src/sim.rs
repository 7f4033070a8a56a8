//! Fixed-rate driver for the ECS world.

use bracket_random::prelude::RandomNumberGenerator;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::SimConfig,
    data::monsters::MonsterTemplate,
    ecs::EcsWorld,
    map::MapLayer,
    scripted_input::{PlayerCommand, ScriptedInput},
};

/// Summary of a finished run.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub ticks: u64,
    pub simulated_seconds: f64,
    pub player_hp: i32,
    pub player_fallen: bool,
    pub monsters_left: usize,
    pub combat_events: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct Scheduler {
    config: SimConfig,
    layer: MapLayer,
    ecs: EcsWorld,
    script: Option<ScriptedInput>,
    combat_events: usize,
}

impl Scheduler {
    pub fn new(config: SimConfig, script: Option<ScriptedInput>) -> Self {
        let layer = MapLayer::generate(config.map_width, config.map_height, config.seed);
        Self::with_layer(config, layer, script)
    }

    pub fn with_layer(config: SimConfig, layer: MapLayer, script: Option<ScriptedInput>) -> Self {
        let ecs = EcsWorld::new(layer.spawn, config.player);
        let mut scheduler = Self {
            config,
            layer,
            ecs,
            script,
            combat_events: 0,
        };
        scheduler.seed_monsters();
        scheduler
    }

    /// Places monsters outside the player's starting room when the level has
    /// more than one, so every chase begins out of reach.
    fn seed_monsters(&mut self) {
        let mut rng = RandomNumberGenerator::seeded(self.config.seed.wrapping_add(1));
        let templates = MonsterTemplate::roster();
        let spawn = self.layer.spawn;
        let home = self.layer.home_room().filter(|_| self.layer.rooms.len() > 1);
        let mut walkable = self
            .layer
            .walkable_points()
            .into_iter()
            .filter(|point| *point != spawn)
            .filter(|point| home.is_none_or(|room| !room.point_in_rect(*point)))
            .collect::<Vec<_>>();

        for _ in 0..self.config.monster_count {
            if walkable.is_empty() {
                break;
            }
            let idx = rng.range(0, walkable.len() as i32) as usize;
            let point = walkable.swap_remove(idx);
            let template_idx = rng.range(0, templates.len() as i32) as usize;
            self.ecs.spawn_monster(&templates[template_idx], point);
        }
        info!(
            monsters = self.ecs.monster_count(),
            seed = self.config.seed,
            "level populated"
        );
    }

    #[cfg(test)]
    pub fn ecs(&self) -> &EcsWorld {
        &self.ecs
    }

    #[cfg(test)]
    pub fn ecs_mut(&mut self) -> &mut EcsWorld {
        &mut self.ecs
    }

    #[cfg(test)]
    pub fn layer(&self) -> &MapLayer {
        &self.layer
    }

    /// Advances exactly one tick and returns the combat lines it produced.
    pub fn step(&mut self) -> Vec<String> {
        match self.script.as_mut().and_then(ScriptedInput::next_command) {
            Some(PlayerCommand::Step(delta)) => self.ecs.queue_player_step(delta),
            Some(PlayerCommand::Wait) | None => self.ecs.clear_player_intent(),
        }

        self.ecs.advance(&self.layer, self.config.tick_duration());
        let lines = self.ecs.drain_combat_log();
        for line in &lines {
            info!(turn = self.ecs.turn, "{line}");
        }
        self.combat_events += lines.len();
        lines
    }

    /// Ticks until `max_ticks` is reached or the player falls.
    pub fn run(&mut self) -> RunReport {
        let started_at = Utc::now();
        info!(
            max_ticks = self.config.max_ticks,
            tick_rate = self.config.ticks_per_second,
            "simulation started"
        );

        let mut ticks = 0;
        while ticks < self.config.max_ticks {
            self.step();
            ticks += 1;
            if self.ecs.player_fallen() {
                info!(turn = self.ecs.turn, "player has fallen; halting");
                break;
            }
        }
        let last_seen = self.ecs.player_point();
        debug!(ticks, x = last_seen.x, y = last_seen.y, "simulation loop finished");

        let player = self.ecs.player_stats();
        RunReport {
            seed: self.config.seed,
            ticks,
            simulated_seconds: ticks as f64 / f64::from(self.config.ticks_per_second),
            player_hp: player.map_or(0, |stats| stats.hp),
            player_fallen: self.ecs.player_fallen(),
            monsters_left: self.ecs.monster_count(),
            combat_events: self.combat_events,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
