#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the dungeon crawler.
//!
//! The world owns the dungeon, the player, every enemy and every projectile.
//! It only changes through [`apply`], which validates each [`Command`] and
//! reports the outcome as [`Event`] values. Player actions that fail
//! validation leave state untouched and surface as
//! [`Event::ActionRejected`].

mod clock;
mod combat;
mod enemies;
mod movement;
mod player;
mod projectiles;

use std::time::Duration;

use dungeon_crawler_core::{
    would_collide, ActionError, ActionKind, Clock, Command, ControlMode, DenialReason, Dungeon,
    EnemyKind, Event, Rect, Reticle, Side, Tuning, WELCOME_BANNER,
};
use glam::Vec2;

use crate::{
    clock::GameClock, enemies::EnemyRegistry, player::Player, projectiles::ProjectileRegistry,
};

/// Represents the authoritative dungeon crawler world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    tuning: Tuning,
    clock: GameClock,
    dungeon: Dungeon,
    walls: Vec<Rect>,
    player: Option<Player>,
    enemies: EnemyRegistry,
    projectiles: ProjectileRegistry,
    control_mode: ControlMode,
    reticle: Option<Reticle>,
    round: u32,
}

impl World {
    /// Creates an empty world governed by the provided tuning.
    ///
    /// The world starts without a dungeon or player; submit
    /// [`Command::LoadDungeon`] and [`Command::SpawnPlayer`] before play.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        let tile_length = tuning.map.tile_length;
        Self {
            banner: WELCOME_BANNER,
            tuning,
            clock: GameClock::default(),
            dungeon: Dungeon::open(0, 0, tile_length),
            walls: Vec::new(),
            player: None,
            enemies: EnemyRegistry::new(),
            projectiles: ProjectileRegistry::new(),
            control_mode: ControlMode::Normal,
            reticle: None,
            round: 0,
        }
    }

    fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Ensures a living player exists and the control mode matches `required`.
    fn check_control(&self, required: ControlMode) -> Result<(), ActionError> {
        if !self.player.as_ref().is_some_and(|player| !player.is_dead()) {
            return Err(DenialReason::PlayerDead.into());
        }
        if self.control_mode != required {
            return Err(DenialReason::WrongMode.into());
        }
        Ok(())
    }

    fn load_dungeon(&mut self, dungeon: Dungeon, out_events: &mut Vec<Event>) {
        self.walls = dungeon.wall_rects();
        out_events.push(Event::DungeonLoaded {
            columns: dungeon.columns(),
            rows: dungeon.rows(),
        });
        self.dungeon = dungeon;
        self.player = None;
        self.enemies.clear();
        self.projectiles.clear();
        self.control_mode = ControlMode::Normal;
        self.reticle = None;
        self.round = 0;
    }

    fn spawn_player(&mut self, position: Vec2, out_events: &mut Vec<Event>) {
        self.player = Some(Player::new(
            position,
            &self.tuning.player,
            &self.tuning.progression,
        ));
        self.control_mode = ControlMode::Normal;
        self.reticle = None;
        out_events.push(Event::PlayerSpawned { position });
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, position: Vec2, out_events: &mut Vec<Event>) {
        let size = self.tuning.enemies.stats(kind).size;
        let future = Rect::square(position, size);
        let player = self.player.as_ref().map(Player::rect);
        let blocked = !self.dungeon.bounds().contains_rect(&future)
            || would_collide(
                &future,
                &self.walls,
                self.enemies.rects_except(None).into_iter().chain(player),
            );

        if blocked {
            tracing::debug!(?kind, x = position.x, y = position.y, "enemy spawn rejected");
            out_events.push(Event::EnemySpawnRejected { kind, position });
            return;
        }

        let enemy = self.enemies.insert(kind, position, &self.tuning.enemies);
        out_events.push(Event::EnemySpawned {
            enemy,
            kind,
            position,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock.advance(dt);
            let now = world.now();
            world.enemies.clear_expired_flashes(now);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::LoadDungeon { dungeon } => world.load_dungeon(dungeon, out_events),
        Command::SpawnPlayer { position } => world.spawn_player(position, out_events),
        Command::MovePlayer { intent } => {
            let result = world.move_player(intent, out_events);
            report(ActionKind::Move, result, out_events);
        }
        Command::MeleeAttack => {
            let result = world.melee_attack(out_events);
            report(ActionKind::Melee, result, out_events);
        }
        Command::FireBolt => {
            let result = world.fire_bolt(out_events);
            report(ActionKind::Bolt, result, out_events);
        }
        Command::CastFireball => {
            let result = world.cast_fireball(out_events);
            report(ActionKind::Fireball, result, out_events);
        }
        Command::Teleport { strike } => {
            let result = world.teleport(strike, out_events);
            let action = if strike {
                ActionKind::TeleportAttack
            } else {
                ActionKind::Teleport
            };
            report(action, result, out_events);
        }
        Command::BeginLightning => {
            let result = world.begin_lightning(out_events);
            report(ActionKind::BeginLightning, result, out_events);
        }
        Command::MoveReticle { direction } => {
            let result = world.move_reticle(direction, out_events);
            report(ActionKind::MoveReticle, result, out_events);
        }
        Command::ConfirmLightning => {
            let result = world.confirm_lightning(out_events);
            report(ActionKind::ConfirmLightning, result, out_events);
        }
        Command::Purchase { purchase } => {
            let result = world.purchase(purchase, out_events);
            report(ActionKind::Purchase(purchase), result, out_events);
        }
        Command::BeginRound { round } => {
            world.round = round;
            out_events.push(Event::RoundStarted { round });
        }
        Command::SpawnEnemy { kind, position } => world.spawn_enemy(kind, position, out_events),
        Command::StepEnemy {
            enemy,
            direction,
            distance,
        } => world.step_enemy(enemy, direction, distance, out_events),
        Command::EnemyStrike { enemy } => world.enemy_strike(enemy, out_events),
        Command::EnemyShoot { enemy } => world.enemy_shoot(enemy),
        Command::AdvanceProjectiles { owner } => match owner {
            Side::Player => world.advance_player_projectiles(out_events),
            Side::Enemy => world.advance_enemy_projectiles(out_events),
        },
    }
}

/// Borrows the player when present and alive.
fn living(player: &mut Option<Player>) -> Result<&mut Player, ActionError> {
    player
        .as_mut()
        .filter(|player| !player.is_dead())
        .ok_or(ActionError::AbilityDenied(DenialReason::PlayerDead))
}

fn report(action: ActionKind, result: Result<(), ActionError>, out_events: &mut Vec<Event>) {
    if let Err(error) = result {
        tracing::debug!(?action, %error, "action rejected");
        out_events.push(Event::ActionRejected { action, error });
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use dungeon_crawler_core::{
        ControlMode, Dungeon, EnemyView, PlayerSnapshot, ProjectileView, Rect, Reticle,
        Tuning,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the active dungeon.
    #[must_use]
    pub fn dungeon(world: &World) -> &Dungeon {
        &world.dungeon
    }

    /// One rectangle per wall tile of the active dungeon.
    #[must_use]
    pub fn wall_rects(world: &World) -> &[Rect] {
        &world.walls
    }

    /// Tuning that governs the world.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Captures the player's state, if a player has spawned.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerSnapshot> {
        world.player.as_ref().map(|player| player.snapshot())
    }

    /// Captures a read-only view of every live enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.snapshots(world.now()))
    }

    /// Number of live enemies.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Captures a read-only view of every projectile in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(world.projectiles.snapshots())
    }

    /// Exclusive control mode of the player.
    #[must_use]
    pub fn control_mode(world: &World) -> ControlMode {
        world.control_mode
    }

    /// Lightning reticle while aiming.
    #[must_use]
    pub fn reticle(world: &World) -> Option<Reticle> {
        world.reticle
    }

    /// Most recently started round, or zero before the first round.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Simulated time elapsed since the world was created.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now()
    }
}
