use bracket_geometry::prelude::Point;
use chrono::TimeDelta;

use super::{Agent, Grid, Temperament, TemperamentKind};

/// Time gate between actions.
///
/// `remaining` only ever goes down between resets and may go negative; only
/// its sign matters. Kept in whole nanoseconds so that ticks summing to the
/// duration land exactly on zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cooldown {
    remaining: TimeDelta,
    duration: TimeDelta,
}

impl Cooldown {
    /// Starts ready to act.
    pub const fn new(duration: TimeDelta) -> Self {
        Self {
            remaining: TimeDelta::zero(),
            duration,
        }
    }

    #[cfg(test)]
    pub const fn with_remaining(duration: TimeDelta, remaining: TimeDelta) -> Self {
        Self {
            remaining,
            duration,
        }
    }

    pub fn tick(&mut self, delta: TimeDelta) {
        self.remaining = self.remaining - delta;
    }

    pub fn is_ready(&self) -> bool {
        self.remaining <= TimeDelta::zero()
    }

    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }

    pub fn remaining(&self) -> TimeDelta {
        self.remaining
    }

    pub fn duration(&self) -> TimeDelta {
        self.duration
    }
}

/// What a single call to [`ChasePolicy::act`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Missing actor, target or grid. Nothing was touched.
    Idle,
    /// Cooling down, or adjacent but unwilling to attack.
    Waiting,
    Attacked { landed: bool },
    Moved { to: Point },
    /// The grid refused the step; it will be tried again next ready tick.
    Blocked { to: Point },
}

/// Behavioural phase, derived on demand rather than stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Approaching,
    Attacking,
}

/// Eight-way neighbourhood, excluding the cell itself.
pub fn is_adjacent(offset: Point) -> bool {
    offset.x.abs() <= 1 && offset.y.abs() <= 1 && offset != Point::new(0, 0)
}

/// One grid step toward `offset`, preferring the horizontal axis only when it
/// is strictly longer. A zero offset yields a zero step.
pub fn step_direction(offset: Point) -> Point {
    if offset.x.abs() > offset.y.abs() {
        Point::new(offset.x.signum(), 0)
    } else if offset.y != 0 {
        Point::new(0, offset.y.signum())
    } else {
        Point::new(0, 0)
    }
}

fn offset_between(from: Point, to: Point) -> Point {
    Point::new(to.x - from.x, to.y - from.y)
}

/// Close in on the target one cell at a time and hit it once adjacent.
///
/// The only state carried between ticks is the cooldown; each actor owns its
/// own policy.
#[derive(Debug)]
pub struct ChasePolicy {
    pub cooldown: Cooldown,
    temperament: Box<dyn Temperament>,
}

impl ChasePolicy {
    pub fn new(cooldown: Cooldown, temperament: Box<dyn Temperament>) -> Self {
        Self {
            cooldown,
            temperament,
        }
    }

    pub fn from_kind(duration: TimeDelta, kind: TemperamentKind) -> Self {
        Self::new(Cooldown::new(duration), kind.build())
    }

    pub fn phase(&self, actor: Point, target: Option<Point>) -> Phase {
        match target {
            None => Phase::Idle,
            Some(target) if is_adjacent(offset_between(actor, target)) => Phase::Attacking,
            Some(_) => Phase::Approaching,
        }
    }

    /// Runs one tick. Any missing collaborator turns the tick into a no-op
    /// that leaves the cooldown untouched.
    pub fn act(
        &mut self,
        actor: Option<&mut dyn Agent>,
        target: Option<&mut dyn Agent>,
        grid: Option<&mut dyn Grid>,
        delta: TimeDelta,
    ) -> Decision {
        let (Some(actor), Some(target), Some(grid)) = (actor, target, grid) else {
            return Decision::Idle;
        };

        self.cooldown.tick(delta);

        let from = actor.point();
        let offset = offset_between(from, target.point());

        if is_adjacent(offset) {
            if self.cooldown.is_ready() && self.temperament.should_attack(&*actor, &*target) {
                let landed = actor.try_attack(target);
                self.cooldown.reset();
                return Decision::Attacked { landed };
            }
            return Decision::Waiting;
        }

        if !self.cooldown.is_ready() {
            return Decision::Waiting;
        }

        let step = step_direction(offset);
        if step == Point::new(0, 0) {
            return Decision::Waiting;
        }

        let to = Point::new(from.x + step.x, from.y + step.y);
        if grid.try_move(from, to) {
            actor.set_point(to);
            self.cooldown.reset();
            Decision::Moved { to }
        } else {
            Decision::Blocked { to }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::ai::temperament::{Aggressive, Skittish};

    #[derive(Debug)]
    struct Dummy {
        point: Point,
        hp: i32,
        max_hp: i32,
        swings: u32,
    }

    impl Dummy {
        fn at(x: i32, y: i32) -> Self {
            Self {
                point: Point::new(x, y),
                hp: 10,
                max_hp: 10,
                swings: 0,
            }
        }
    }

    impl Agent for Dummy {
        fn point(&self) -> Point {
            self.point
        }

        fn set_point(&mut self, point: Point) {
            self.point = point;
        }

        fn vitality(&self) -> f32 {
            self.hp as f32 / self.max_hp as f32
        }

        fn try_attack(&mut self, target: &mut dyn Agent) -> bool {
            self.swings += 1;
            target.receive_damage(1) > 0
        }

        fn receive_damage(&mut self, power: i32) -> i32 {
            self.hp = (self.hp - power).max(0);
            power
        }
    }

    #[derive(Default)]
    struct OpenGrid {
        blocked: HashSet<Point>,
        attempts: Vec<(Point, Point)>,
    }

    impl Grid for OpenGrid {
        fn try_move(&mut self, from: Point, to: Point) -> bool {
            self.attempts.push((from, to));
            !self.blocked.contains(&to)
        }
    }

    fn ms(millis: i64) -> TimeDelta {
        TimeDelta::milliseconds(millis)
    }

    fn aggressive(duration: TimeDelta) -> ChasePolicy {
        ChasePolicy::new(Cooldown::new(duration), Box::new(Aggressive))
    }

    fn primed(duration: TimeDelta, remaining: TimeDelta) -> ChasePolicy {
        ChasePolicy::new(Cooldown::with_remaining(duration, remaining), Box::new(Aggressive))
    }

    #[test]
    fn adjacency_covers_the_eight_neighbours_only() {
        for dx in -1..=1 {
            for dy in -1..=1 {
                let expected = (dx, dy) != (0, 0);
                assert_eq!(is_adjacent(Point::new(dx, dy)), expected, "({dx},{dy})");
            }
        }
        for offset in [
            Point::new(2, 0),
            Point::new(-2, 1),
            Point::new(0, -2),
            Point::new(1, 2),
            Point::new(5, 5),
        ] {
            assert!(!is_adjacent(offset), "{offset:?}");
        }
    }

    #[test]
    fn step_prefers_strictly_longer_axis() {
        assert_eq!(step_direction(Point::new(3, 1)), Point::new(1, 0));
        assert_eq!(step_direction(Point::new(1, 3)), Point::new(0, 1));
        assert_eq!(step_direction(Point::new(-4, 2)), Point::new(-1, 0));
        // ties go vertical
        assert_eq!(step_direction(Point::new(2, -2)), Point::new(0, -1));
        assert_eq!(step_direction(Point::new(0, 0)), Point::new(0, 0));
    }

    #[test]
    fn thirds_of_a_duration_land_exactly_on_zero() {
        let mut cooldown = Cooldown::with_remaining(ms(300), ms(300));
        let tick = TimeDelta::nanoseconds(1_000_000_000 / 10);
        for _ in 0..3 {
            cooldown.tick(tick);
        }
        assert_eq!(cooldown.remaining(), TimeDelta::zero());
        assert!(cooldown.is_ready());
    }

    #[test]
    fn cooling_down_blocks_all_action_but_still_ticks() {
        let mut policy = primed(ms(500), ms(400));
        let mut actor = Dummy::at(0, 0);
        let mut target = Dummy::at(1, 0);
        let mut grid = OpenGrid::default();

        let decision = policy.act(Some(&mut actor), Some(&mut target), Some(&mut grid), ms(100));
        assert_eq!(decision, Decision::Waiting);
        assert_eq!(actor.swings, 0);
        assert_eq!(policy.cooldown.remaining(), ms(300));

        let mut far = Dummy::at(6, 0);
        let decision = policy.act(Some(&mut actor), Some(&mut far), Some(&mut grid), ms(100));
        assert_eq!(decision, Decision::Waiting);
        assert!(grid.attempts.is_empty());
        assert_eq!(actor.point, Point::new(0, 0));
        assert_eq!(policy.cooldown.remaining(), ms(200));
    }

    #[test]
    fn attack_resets_cooldown_and_stays_put() {
        let mut policy = aggressive(ms(300));
        let mut actor = Dummy::at(2, 2);
        let mut target = Dummy::at(3, 3);
        let mut grid = OpenGrid::default();

        let decision = policy.act(Some(&mut actor), Some(&mut target), Some(&mut grid), ms(16));
        assert_eq!(decision, Decision::Attacked { landed: true });
        assert_eq!(policy.cooldown.remaining(), ms(300));
        assert_eq!(actor.point, Point::new(2, 2));
        assert_eq!(target.hp, 9);
        assert!(grid.attempts.is_empty());
    }

    #[test]
    fn unwilling_attacker_waits_while_adjacent() {
        let mut policy = ChasePolicy::new(
            Cooldown::new(ms(300)),
            Box::new(Skittish { flee_below: 0.5 }),
        );
        let mut actor = Dummy::at(0, 0);
        actor.hp = 2;
        let mut target = Dummy::at(0, 1);
        let mut grid = OpenGrid::default();

        let decision = policy.act(Some(&mut actor), Some(&mut target), Some(&mut grid), ms(100));
        assert_eq!(decision, Decision::Waiting);
        assert_eq!(target.hp, 10);
        assert_eq!(policy.cooldown.remaining(), ms(-100));
    }

    #[test]
    fn moves_along_priority_axis() {
        let mut policy = aggressive(ms(300));
        let mut actor = Dummy::at(0, 0);
        let mut target = Dummy::at(3, 1);
        let mut grid = OpenGrid::default();

        let decision = policy.act(Some(&mut actor), Some(&mut target), Some(&mut grid), ms(0));
        assert_eq!(decision, Decision::Moved { to: Point::new(1, 0) });
        assert_eq!(actor.point, Point::new(1, 0));
        assert_eq!(policy.cooldown.remaining(), ms(300));

        let mut policy = aggressive(ms(300));
        let mut actor = Dummy::at(0, 0);
        let mut target = Dummy::at(1, 3);
        let decision = policy.act(Some(&mut actor), Some(&mut target), Some(&mut grid), ms(0));
        assert_eq!(decision, Decision::Moved { to: Point::new(0, 1) });
    }

    #[test]
    fn blocked_move_keeps_cooldown_and_retries() {
        let mut policy = primed(ms(300), ms(-200));
        let mut actor = Dummy::at(0, 0);
        let mut target = Dummy::at(4, 0);
        let mut grid = OpenGrid::default();
        grid.blocked.insert(Point::new(1, 0));

        let first = policy.act(Some(&mut actor), Some(&mut target), Some(&mut grid), ms(0));
        assert_eq!(first, Decision::Blocked { to: Point::new(1, 0) });
        assert_eq!(policy.cooldown.remaining(), ms(-200));
        assert_eq!(actor.point, Point::new(0, 0));

        let second = policy.act(Some(&mut actor), Some(&mut target), Some(&mut grid), ms(0));
        assert_eq!(second, first);
        assert_eq!(
            grid.attempts,
            vec![
                (Point::new(0, 0), Point::new(1, 0)),
                (Point::new(0, 0), Point::new(1, 0))
            ]
        );
    }

    #[test]
    fn missing_collaborator_is_a_silent_no_op() {
        let mut policy = primed(ms(300), ms(100));
        let mut actor = Dummy::at(0, 0);
        let mut target = Dummy::at(1, 0);
        let mut grid = OpenGrid::default();
        let second = ms(1000);

        assert_eq!(policy.act(None, Some(&mut target), Some(&mut grid), second), Decision::Idle);
        assert_eq!(policy.act(Some(&mut actor), None, Some(&mut grid), second), Decision::Idle);
        assert_eq!(policy.act(Some(&mut actor), Some(&mut target), None, second), Decision::Idle);

        assert_eq!(policy.cooldown.remaining(), ms(100));
        assert_eq!(actor.point, Point::new(0, 0));
        assert_eq!(actor.swings, 0);
        assert_eq!(target.hp, 10);
        assert!(grid.attempts.is_empty());
    }

    #[test]
    fn chases_down_the_corridor_then_attacks() {
        let mut policy = aggressive(ms(300));
        let mut actor = Dummy::at(0, 0);
        let mut target = Dummy::at(5, 0);
        let mut grid = OpenGrid::default();

        let decision = policy.act(Some(&mut actor), Some(&mut target), Some(&mut grid), ms(0));
        assert_eq!(decision, Decision::Moved { to: Point::new(1, 0) });
        assert_eq!(policy.cooldown.remaining(), ms(300));

        for x in 2..=4 {
            let decision =
                policy.act(Some(&mut actor), Some(&mut target), Some(&mut grid), ms(300));
            assert_eq!(decision, Decision::Moved { to: Point::new(x, 0) });
            assert_eq!(policy.cooldown.remaining(), ms(300));
        }

        assert_eq!(policy.phase(actor.point, Some(target.point)), Phase::Attacking);
        let decision = policy.act(Some(&mut actor), Some(&mut target), Some(&mut grid), ms(300));
        assert_eq!(decision, Decision::Attacked { landed: true });
        assert_eq!(actor.point, Point::new(4, 0));
        assert_eq!(target.hp, 9);
    }

    #[test]
    fn phase_follows_target_distance() {
        let policy = aggressive(ms(300));
        let here = Point::new(3, 3);
        assert_eq!(policy.phase(here, None), Phase::Idle);
        assert_eq!(policy.phase(here, Some(Point::new(4, 2))), Phase::Attacking);
        assert_eq!(policy.phase(here, Some(Point::new(3, 3))), Phase::Approaching);
        assert_eq!(policy.phase(here, Some(Point::new(9, 3))), Phase::Approaching);
    }
}
