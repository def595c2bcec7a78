#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic enemy AI that chases the player and proposes attacks.
//!
//! Every enemy walks along a single axis per tick, the one with the larger
//! distance to the player. The world validates each proposed step, strike and
//! shot, so the AI only needs the read-only views.

use dungeon_crawler_core::{
    Command, Direction, EnemyKind, EnemySnapshot, EnemyView, Event, PlayerSnapshot, Rect,
};
use glam::Vec2;

/// Configuration parameters required to construct the enemy AI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    boss_gap: f32,
}

impl Config {
    /// Creates a configuration with the distance bosses keep from the player.
    #[must_use]
    pub const fn new(boss_gap: f32) -> Self {
        Self { boss_gap }
    }
}

/// Pure system that reacts to elapsed time and emits enemy commands.
#[derive(Debug)]
pub struct EnemyAi {
    boss_gap: f32,
}

impl EnemyAi {
    /// Creates the AI using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            boss_gap: config.boss_gap.max(0.0),
        }
    }

    /// Consumes world events and immutable views to emit enemy commands.
    ///
    /// Enemies only act on ticks that advanced time, and never while the
    /// player is absent or dead.
    pub fn handle(
        &self,
        events: &[Event],
        player: Option<&PlayerSnapshot>,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }
        let Some(player) = player.filter(|player| !player.is_dead) else {
            return;
        };

        let target = player.rect();
        for enemy in enemies.iter() {
            let body = enemy.rect();
            let step = self.plan_step(enemy, &target);
            let predicted = step.map_or(body, |step| body.translated(step.offset()));

            if let Some(step) = step {
                out.push(Command::StepEnemy {
                    enemy: enemy.id,
                    direction: step.direction,
                    distance: step.distance,
                });
            }
            if enemy.strike_ready
                && (enemy.reach.reaches(&body, &target) || enemy.reach.reaches(&predicted, &target))
            {
                out.push(Command::EnemyStrike { enemy: enemy.id });
            }
            if enemy.shot_ready {
                out.push(Command::EnemyShoot { enemy: enemy.id });
            }
        }
    }

    fn plan_step(&self, enemy: &EnemySnapshot, target: &Rect) -> Option<Step> {
        let (primary, secondary) = headings(target.origin() - enemy.position);
        let primary = primary?;

        if enemy.kind != EnemyKind::Boss {
            return Some(Step::new(primary.direction, enemy.speed));
        }

        // Bosses stop short on the chase axis, then line up on the other one.
        let allowance = edge_gap(&enemy.rect(), target, primary.direction) - self.boss_gap;
        if allowance > 0.0 {
            return Some(Step::new(primary.direction, enemy.speed.min(allowance)));
        }
        secondary.map(|heading| Step::new(heading.direction, enemy.speed.min(heading.magnitude)))
    }
}

impl Default for EnemyAi {
    fn default() -> Self {
        Self::new(Config::new(0.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Step {
    direction: Direction,
    distance: f32,
}

impl Step {
    const fn new(direction: Direction, distance: f32) -> Self {
        Self {
            direction,
            distance,
        }
    }

    fn offset(self) -> Vec2 {
        self.direction.unit() * self.distance
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Heading {
    direction: Direction,
    magnitude: f32,
}

/// Splits `delta` into the chase axis and the remaining axis.
///
/// Ties favour the horizontal axis. Axes without distance yield `None`.
fn headings(delta: Vec2) -> (Option<Heading>, Option<Heading>) {
    let horizontal = axis_heading(delta.x, Direction::East, Direction::West);
    let vertical = axis_heading(delta.y, Direction::South, Direction::North);
    if delta.x.abs() >= delta.y.abs() {
        (horizontal, vertical)
    } else {
        (vertical, horizontal)
    }
}

fn axis_heading(component: f32, positive: Direction, negative: Direction) -> Option<Heading> {
    let direction = if component > 0.0 {
        positive
    } else if component < 0.0 {
        negative
    } else {
        return None;
    };
    Some(Heading {
        direction,
        magnitude: component.abs(),
    })
}

/// Free space between the facing edges of `body` and `target` along
/// `direction`. Negative when the projections overlap.
fn edge_gap(body: &Rect, target: &Rect, direction: Direction) -> f32 {
    match direction {
        Direction::East => target.origin().x - body.max().x,
        Direction::West => body.origin().x - target.max().x,
        Direction::South => target.origin().y - body.max().y,
        Direction::North => body.origin().y - target.max().y,
    }
}
