use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::DistanceAlg;
use smallvec::SmallVec;
use specs::prelude::*;
use tracing::{debug, trace};

use super::{
    components::{Body, ChaseBrain, CombatStats, IntentStep, Monster, PlayerTag, Position},
    resources::{CombatLog, DeltaTime, MovementContext},
};
use crate::ai::{Agent, Decision, Grid};

/// Applies the player's queued step: bump-attacks a monster standing in the
/// way, otherwise moves through the grid.
#[derive(Default)]
pub struct PlayerStepSystem;

impl<'a> System<'a> for PlayerStepSystem {
    type SystemData = (
        Entities<'a>,
        WriteStorage<'a, Position>,
        WriteStorage<'a, IntentStep>,
        WriteStorage<'a, CombatStats>,
        ReadStorage<'a, PlayerTag>,
        ReadStorage<'a, Monster>,
        WriteExpect<'a, MovementContext>,
        WriteExpect<'a, CombatLog>,
    );

    fn run(
        &mut self,
        (
            entities,
            mut positions,
            mut intents,
            mut stats,
            players,
            monsters,
            mut movement,
            mut combat_log,
        ): Self::SystemData,
    ) {
        let steps = (&entities, &positions, &intents, &players)
            .join()
            .map(|(entity, pos, intent, _)| {
                let target = Point::new(pos.point.x + intent.delta.x, pos.point.y + intent.delta.y);
                (entity, pos.point, target)
            })
            .collect::<Vec<_>>();

        for (entity, from, target) in steps {
            intents.remove(entity);
            if from == target || stats.get(entity).is_some_and(CombatStats::is_down) {
                continue;
            }

            let foe = (&entities, &positions, &monsters)
                .join()
                .find(|(_, pos, _)| pos.point == target)
                .map(|(foe, _, monster)| (foe, monster.name.clone()));

            if let Some((foe, name)) = foe {
                let (Some(attacker), Some(defender)) =
                    (stats.get(entity).copied(), stats.get(foe).copied())
                else {
                    continue;
                };
                let mut striker = Body::new(from, attacker);
                let mut victim = Body::new(target, defender);
                if striker.try_attack(&mut victim) {
                    let damage = defender.hp - victim.stats.hp;
                    combat_log.push(format!("You strike {name} for {damage}"));
                }
                if let Some(foe_stats) = stats.get_mut(foe) {
                    *foe_stats = victim.stats;
                }
                continue;
            }

            if movement.try_move(from, target) {
                if let Some(pos) = positions.get_mut(entity) {
                    pos.point = target;
                }
            } else {
                debug!(?target, "player step blocked");
            }
        }
    }
}

/// Runs every monster's chase policy against the player.
#[derive(Default)]
pub struct ChaseSystem;

impl<'a> System<'a> for ChaseSystem {
    type SystemData = (
        Entities<'a>,
        WriteStorage<'a, Position>,
        WriteStorage<'a, ChaseBrain>,
        WriteStorage<'a, CombatStats>,
        ReadStorage<'a, Monster>,
        ReadStorage<'a, PlayerTag>,
        ReadExpect<'a, DeltaTime>,
        WriteExpect<'a, MovementContext>,
        WriteExpect<'a, CombatLog>,
    );

    fn run(
        &mut self,
        (
            entities,
            mut positions,
            mut brains,
            mut stats,
            monsters,
            players,
            delta,
            mut movement,
            mut combat_log,
        ): Self::SystemData,
    ) {
        let mut player = {
            let positions_ref: &WriteStorage<Position> = &positions;
            (&entities, positions_ref, &players)
                .join()
                .next()
                .and_then(|(entity, pos, _)| {
                    stats
                        .get(entity)
                        .map(|stat| (entity, Body::new(pos.point, *stat)))
                })
        };

        let mut hits: SmallVec<[(String, i32); 8]> = SmallVec::new();

        for (entity, pos, brain, monster) in
            (&entities, &mut positions, &mut brains, &monsters).join()
        {
            let Some(stat) = stats.get(entity).copied() else {
                continue;
            };
            if stat.is_down() {
                continue;
            }

            let mut body = Body::new(pos.point, stat);
            let in_sight = player.as_ref().is_some_and(|(_, target)| {
                !target.stats.is_down()
                    && DistanceAlg::Pythagoras.distance2d(pos.point, target.point)
                        <= brain.sight_radius
            });
            let hp_before = player.as_ref().map(|(_, target)| target.stats.hp);
            let phase = brain.policy.phase(
                pos.point,
                player
                    .as_ref()
                    .filter(|_| in_sight)
                    .map(|(_, target)| target.point),
            );

            let actor: &mut dyn Agent = &mut body;
            let target: Option<&mut dyn Agent> = if in_sight {
                player.as_mut().map(|(_, target)| target as &mut dyn Agent)
            } else {
                None
            };
            let grid: &mut dyn Grid = &mut *movement;
            let decision = brain.policy.act(Some(actor), target, Some(grid), delta.0);

            let cooldown = brain.policy.cooldown;
            trace!(
                monster = %monster.name,
                ?phase,
                ?decision,
                remaining_ms = cooldown.remaining().num_milliseconds(),
                duration_ms = cooldown.duration().num_milliseconds(),
            );
            match decision {
                Decision::Moved { to } => {
                    debug!(monster = %monster.name, x = to.x, y = to.y, "closing in");
                    pos.point = body.point;
                }
                Decision::Attacked { .. } => {
                    let hp_after = player.as_ref().map(|(_, target)| target.stats.hp);
                    if let (Some(before), Some(after)) = (hp_before, hp_after) {
                        hits.push((monster.name.clone(), before - after));
                    }
                }
                Decision::Blocked { to } => {
                    debug!(monster = %monster.name, x = to.x, y = to.y, "path blocked");
                }
                Decision::Idle | Decision::Waiting => {}
            }

            if let Some(own) = stats.get_mut(entity) {
                *own = body.stats;
            }
        }

        if let Some((player_entity, body)) = player {
            for (name, damage) in &hits {
                combat_log.push(format!("{name} claws you for {damage}"));
            }
            if let Some(player_stats) = stats.get_mut(player_entity) {
                let was_standing = !player_stats.is_down();
                *player_stats = body.stats;
                if was_standing && player_stats.is_down() {
                    combat_log.push("You fall.");
                }
            }
        }
    }
}

/// Removes monsters that have been cut down.
#[derive(Default)]
pub struct VitalsSystem;

impl<'a> System<'a> for VitalsSystem {
    type SystemData = (
        Entities<'a>,
        ReadStorage<'a, CombatStats>,
        ReadStorage<'a, Position>,
        ReadStorage<'a, Monster>,
        WriteExpect<'a, MovementContext>,
        WriteExpect<'a, CombatLog>,
    );

    fn run(
        &mut self,
        (entities, stats, positions, monsters, mut movement, mut combat_log): Self::SystemData,
    ) {
        for (entity, stat, pos, monster) in (&entities, &stats, &positions, &monsters).join() {
            if !stat.is_down() {
                continue;
            }
            combat_log.push(format!("{} collapses.", monster.name));
            movement.vacate(pos.point);
            if let Err(err) = entities.delete(entity) {
                debug!(%err, "monster already gone");
            }
        }
    }
}
