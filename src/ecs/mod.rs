pub mod components;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use chrono::TimeDelta;
use specs::prelude::{
    Builder, Dispatcher, DispatcherBuilder, Entity, Join, World as SpecsWorld, WorldExt,
};
use tracing::debug;

use crate::{ai::ChasePolicy, data::monsters::MonsterTemplate, map::MapLayer};

use self::{
    components::{ChaseBrain, CombatStats, IntentStep, Monster, MonsterTag, PlayerTag, Position},
    resources::{CombatLog, DeltaTime, MovementContext},
    systems::{ChaseSystem, PlayerStepSystem, VitalsSystem},
};

pub struct EcsWorld {
    specs_world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    player: Entity,
    pub turn: u64,
}

impl EcsWorld {
    pub fn new(spawn: Point, player_stats: CombatStats) -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(DeltaTime::default());
        specs_world.insert(CombatLog::default());
        let player = Self::spawn_player(&mut specs_world, spawn, player_stats);
        let dispatcher = DispatcherBuilder::new()
            .with(PlayerStepSystem, "player_step", &[])
            .with(ChaseSystem, "chase", &["player_step"])
            .with(VitalsSystem, "vitals", &["chase"])
            .build();

        Self {
            specs_world,
            dispatcher,
            player,
            turn: 0,
        }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<IntentStep>();
        world.register::<PlayerTag>();
        world.register::<Monster>();
        world.register::<MonsterTag>();
        world.register::<ChaseBrain>();
        world.register::<CombatStats>();
    }

    fn spawn_player(world: &mut SpecsWorld, spawn: Point, stats: CombatStats) -> Entity {
        world
            .create_entity()
            .with(Position { point: spawn })
            .with(stats)
            .with(PlayerTag)
            .build()
    }

    /// Runs one tick of `delta` against `layer`.
    pub fn advance(&mut self, layer: &MapLayer, delta: TimeDelta) {
        let occupants = self.occupied_points();
        let movement = MovementContext::from_layer(layer, occupants);
        self.specs_world.insert(movement);
        self.specs_world.insert(DeltaTime(delta));
        self.dispatcher.dispatch(&self.specs_world);
        self.specs_world.maintain();
        self.turn = self.turn.wrapping_add(1);
    }

    fn occupied_points(&self) -> Vec<Point> {
        let positions = self.specs_world.read_component::<Position>();
        (&positions).join().map(|pos| pos.point).collect()
    }

    pub fn queue_player_step(&mut self, delta: Point) {
        let mut intents = self.specs_world.write_component::<IntentStep>();
        let _ = intents.insert(self.player, IntentStep { delta });
    }

    pub fn clear_player_intent(&mut self) {
        let mut intents = self.specs_world.write_component::<IntentStep>();
        let _ = intents.remove(self.player);
    }

    pub fn spawn_monster(&mut self, template: &MonsterTemplate, point: Point) -> Entity {
        debug!(name = template.name, x = point.x, y = point.y, "spawning monster");
        self.spawn_chaser(
            template.name,
            point,
            CombatStats::new(template.hp, template.power, template.defense),
            ChasePolicy::from_kind(template.cooldown, template.temperament),
            template.sight_radius,
        )
    }

    pub fn spawn_chaser(
        &mut self,
        name: &str,
        point: Point,
        stats: CombatStats,
        policy: ChasePolicy,
        sight_radius: f32,
    ) -> Entity {
        self.specs_world
            .create_entity()
            .with(Position { point })
            .with(Monster {
                name: name.to_string(),
            })
            .with(ChaseBrain {
                policy,
                sight_radius,
            })
            .with(stats)
            .with(MonsterTag)
            .build()
    }

    #[cfg(test)]
    pub fn entity_at(&self, point: Point) -> Option<Entity> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        (&entities, &positions)
            .join()
            .find(|(_, pos)| pos.point == point)
            .map(|(entity, _)| entity)
    }

    pub fn position_of(&self, entity: Entity) -> Option<Point> {
        let positions = self.specs_world.read_component::<Position>();
        positions.get(entity).map(|pos| pos.point)
    }

    pub fn stats_of(&self, entity: Entity) -> Option<CombatStats> {
        let stats = self.specs_world.read_component::<CombatStats>();
        stats.get(entity).copied()
    }

    #[cfg(test)]
    pub fn cooldown_of(&self, entity: Entity) -> Option<TimeDelta> {
        let brains = self.specs_world.read_component::<ChaseBrain>();
        brains
            .get(entity)
            .map(|brain| brain.policy.cooldown.remaining())
    }

    pub fn monster_count(&self) -> usize {
        let monsters = self.specs_world.read_component::<MonsterTag>();
        (&monsters).join().count()
    }

    #[cfg(test)]
    pub fn player_entity(&self) -> Entity {
        self.player
    }

    pub fn player_point(&self) -> Point {
        self.position_of(self.player).unwrap_or(Point::new(0, 0))
    }

    pub fn player_stats(&self) -> Option<CombatStats> {
        self.stats_of(self.player)
    }

    pub fn player_fallen(&self) -> bool {
        self.player_stats().is_some_and(|stats| stats.is_down())
    }

    pub fn drain_combat_log(&mut self) -> Vec<String> {
        let mut log = self.specs_world.write_resource::<CombatLog>();
        std::mem::take(&mut log.entries)
    }
}
