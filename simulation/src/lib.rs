#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick orchestrator for the dungeon crawler.
//!
//! [`Simulation::update`] advances one frame in a fixed order: discrete
//! actions, movement, player projectiles, enemy AI, enemy projectiles and
//! finally the round and death transitions. Every change goes through
//! [`world::apply`] so the returned events describe the whole frame.

mod clock;
mod input;

use std::time::Duration;

use dungeon_crawler_core::{
    BorderMode, Clock, Command, ControlMode, Event, GenerationError, Side, Tuning,
};
use dungeon_crawler_system_dungeon_generation::{generate, Config as GenerationConfig};
use dungeon_crawler_system_enemy_ai::{Config as EnemyAiConfig, EnemyAi};
use dungeon_crawler_system_rounds::{Config as RoundsConfig, RoundPhase, Rounds};
use dungeon_crawler_world::{self as world, query, World};
use glam::Vec2;

pub use clock::{clamp_frame_delta, FixedStepClock, MonotonicClock, MAX_FRAME_DELTA};
pub use input::{InputAction, InputIntents, MovementKeys};

/// Multiplier that spreads restart seeds apart.
const RESTART_SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;
/// Mixed into the dungeon seed so waves do not mirror the layout rolls.
const WAVE_SEED_SALT: u64 = 0x5741_5645_5345_4544;

/// Parameters for a run of the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Dungeon width in tiles.
    pub columns: u32,
    /// Dungeon height in tiles.
    pub rows: u32,
    /// Whether the dungeon's outer ring is walled.
    pub border: BorderMode,
    /// Seed of the first dungeon; restarts derive new seeds from it.
    pub seed: u64,
    /// Gameplay numbers shared by every system.
    pub tuning: Tuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            columns: 32,
            rows: 24,
            border: BorderMode::Open,
            seed: 0,
            tuning: Tuning::default(),
        }
    }
}

/// Owns the world and the pure systems that drive it.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    enemy_ai: EnemyAi,
    rounds: Rounds,
    generation: u64,
    inventory_open: bool,
    last_frame: Option<Duration>,
}

impl Simulation {
    /// Generates the first dungeon and spawns the player in it.
    pub fn new(config: SimulationConfig) -> Result<Self, GenerationError> {
        let seed = dungeon_seed(config.seed, 0);
        let mut simulation = Self {
            world: World::new(config.tuning.clone()),
            enemy_ai: EnemyAi::new(EnemyAiConfig::new(config.tuning.enemies.boss.gap)),
            rounds: Rounds::new(RoundsConfig::new(
                seed ^ WAVE_SEED_SALT,
                config.tuning.enemies.clone(),
            )),
            generation: 0,
            inventory_open: false,
            last_frame: None,
            config,
        };
        let _ = simulation.enter_dungeon(seed)?;
        Ok(simulation)
    }

    /// Regenerates the dungeon with the next derived seed, spawns a fresh
    /// player and schedules round one.
    pub fn restart(&mut self) -> Result<Vec<Event>, GenerationError> {
        let generation = self.generation.wrapping_add(1);
        let seed = dungeon_seed(self.config.seed, generation);
        let events = self.enter_dungeon(seed)?;

        self.generation = generation;
        self.rounds.restart();
        self.inventory_open = false;
        Ok(events)
    }

    fn enter_dungeon(&mut self, seed: u64) -> Result<Vec<Event>, GenerationError> {
        let generation_config = GenerationConfig::new(
            self.config.columns,
            self.config.rows,
            self.config.tuning.map.tile_length,
            seed,
        )
        .with_border(self.config.border);
        let generated = generate(&generation_config)?;

        let player_size = self.config.tuning.player.size;
        let position = generated.dungeon.tile_rect(generated.spawn).center()
            - Vec2::splat(player_size / 2.0);
        tracing::info!(
            seed,
            columns = self.config.columns,
            rows = self.config.rows,
            "dungeon ready"
        );

        let mut events = Vec::new();
        self.submit(
            Command::LoadDungeon {
                dungeon: generated.dungeon,
            },
            &mut events,
        );
        self.submit(Command::SpawnPlayer { position }, &mut events);
        Ok(events)
    }

    /// Advances the simulation by one frame of `dt`.
    ///
    /// While the inventory is open only inventory actions run and time stands
    /// still. After game over nothing runs until [`restart`](Self::restart).
    pub fn update(&mut self, dt: Duration, input: &InputIntents) -> Vec<Event> {
        let mut events = Vec::new();
        self.handle_inventory(input, &mut events);
        if self.inventory_open || matches!(self.phase(), RoundPhase::GameOver { .. }) {
            return events;
        }

        self.submit(
            Command::Tick {
                dt: clamp_frame_delta(dt),
            },
            &mut events,
        );
        for action in &input.actions {
            if let Some(command) = action_command(*action, query::control_mode(&self.world)) {
                self.submit(command, &mut events);
            }
        }
        let intent = input.movement.intent();
        if query::control_mode(&self.world) == ControlMode::Normal && intent != Vec2::ZERO {
            self.submit(Command::MovePlayer { intent }, &mut events);
        }

        self.submit(Command::AdvanceProjectiles { owner: Side::Player }, &mut events);

        let mut commands = Vec::new();
        self.enemy_ai.handle(
            &events,
            query::player(&self.world).as_ref(),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        self.submit_all(commands, &mut events);

        self.submit(Command::AdvanceProjectiles { owner: Side::Enemy }, &mut events);

        let mut commands = Vec::new();
        self.rounds.handle(
            query::player(&self.world).as_ref(),
            &query::enemy_view(&self.world),
            query::dungeon(&self.world),
            &mut commands,
        );
        self.submit_all(commands, &mut events);
        events
    }

    /// Advances by the time `clock` moved since the previous call.
    ///
    /// The first call only records the clock's reading and runs a zero-length
    /// frame.
    pub fn advance<C>(&mut self, clock: &C, input: &InputIntents) -> Vec<Event>
    where
        C: Clock + ?Sized,
    {
        let now = clock.now();
        let dt = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_sub(last));
        self.last_frame = Some(now);
        self.update(dt, input)
    }

    /// Applies a command directly, bypassing input routing.
    ///
    /// Scripted scenarios and debugging tools use this to stage situations.
    pub fn submit_command(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        self.submit(command, &mut events);
        events
    }

    fn handle_inventory(&mut self, input: &InputIntents, events: &mut Vec<Event>) {
        for action in &input.actions {
            match action {
                InputAction::InventoryToggle => {
                    self.inventory_open = !self.inventory_open;
                    tracing::debug!(open = self.inventory_open, "inventory toggled");
                }
                InputAction::Purchase(purchase) if self.inventory_open => {
                    self.submit(
                        Command::Purchase {
                            purchase: *purchase,
                        },
                        events,
                    );
                }
                _ => {}
            }
        }
    }

    fn submit(&mut self, command: Command, events: &mut Vec<Event>) {
        world::apply(&mut self.world, command, events);
    }

    fn submit_all(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        for command in commands {
            self.submit(command, events);
        }
    }

    /// Current phase of the round controller.
    #[must_use]
    pub const fn phase(&self) -> RoundPhase {
        self.rounds.phase()
    }

    /// Whether the inventory screen is open.
    #[must_use]
    pub const fn inventory_open(&self) -> bool {
        self.inventory_open
    }

    /// Read-only access to the world for queries and presenters.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Seed of the dungeon currently in play.
    #[must_use]
    pub fn dungeon_seed(&self) -> u64 {
        dungeon_seed(self.config.seed, self.generation)
    }
}

/// Seed of the dungeon generated after `generation` restarts.
fn dungeon_seed(base: u64, generation: u64) -> u64 {
    base.wrapping_add(generation.wrapping_mul(RESTART_SEED_STRIDE))
}

/// Maps a frame action to a world command for the current control mode.
///
/// Inventory and window actions never reach the world through this path.
fn action_command(action: InputAction, mode: ControlMode) -> Option<Command> {
    match (mode, action) {
        (ControlMode::Normal, InputAction::Melee) => Some(Command::MeleeAttack),
        (ControlMode::Normal, InputAction::Ranged) => Some(Command::FireBolt),
        (ControlMode::Normal, InputAction::Fireball) => Some(Command::CastFireball),
        (ControlMode::Normal, InputAction::Teleport) => Some(Command::Teleport { strike: false }),
        (ControlMode::Normal, InputAction::TeleportAttack) => {
            Some(Command::Teleport { strike: true })
        }
        (ControlMode::Normal, InputAction::LightningStart) => Some(Command::BeginLightning),
        (ControlMode::LightningAim, InputAction::LightningMove(direction)) => {
            Some(Command::MoveReticle { direction })
        }
        (ControlMode::LightningAim, InputAction::Confirm) => Some(Command::ConfirmLightning),
        _ => None,
    }
}
