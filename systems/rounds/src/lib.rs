#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round controller that spawns enemy waves and tracks progression.
//!
//! A round moves through `Spawning`, `Active` and `Cleared` before the next
//! round spawns. Player death ends the run in `GameOver` until
//! [`Rounds::restart`] is called.

use dungeon_crawler_core::{
    would_collide, Command, Dungeon, EnemyKind, EnemyTuning, EnemyView, PlayerSnapshot, Rect,
};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of tiles sampled for each enemy before it is skipped.
const PLACEMENT_ATTEMPTS: usize = 64;

/// Lifecycle of a single round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    /// The wave for `round` is emitted on the next update.
    Spawning {
        /// Round about to start.
        round: u32,
    },
    /// Enemies of `round` are alive.
    Active {
        /// Round in progress.
        round: u32,
    },
    /// Every enemy of `round` has died.
    Cleared {
        /// Round that was just cleared.
        round: u32,
    },
    /// The player died during `round`.
    GameOver {
        /// Round in which the player died.
        round: u32,
    },
}

impl RoundPhase {
    /// Round number the phase refers to.
    #[must_use]
    pub const fn round(self) -> u32 {
        match self {
            Self::Spawning { round }
            | Self::Active { round }
            | Self::Cleared { round }
            | Self::GameOver { round } => round,
        }
    }
}

/// Enemy counts for one wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveComposition {
    /// Melee chasers.
    pub melee: u32,
    /// Ranged shooters.
    pub ranged: u32,
    /// Bosses.
    pub boss: u32,
}

impl WaveComposition {
    /// Rolls the wave for `round`.
    ///
    /// Melee counts fall in `2..=round + 2`, ranged counts in
    /// `1..=round / 2 + 1`, and every third round adds a boss.
    pub fn roll<R>(round: u32, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            melee: rng.gen_range(2..=round.saturating_add(2)),
            ranged: rng.gen_range(1..=round / 2 + 1),
            boss: 1 + round / 3,
        }
    }

    /// Total number of enemies in the wave.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.melee + self.ranged + self.boss
    }

    /// Enemy kinds in spawn order, largest bodies first.
    fn kinds(&self) -> impl Iterator<Item = EnemyKind> {
        let repeat = |kind, count| std::iter::repeat(kind).take(count as usize);
        repeat(EnemyKind::Boss, self.boss)
            .chain(repeat(EnemyKind::Melee, self.melee))
            .chain(repeat(EnemyKind::Ranged, self.ranged))
    }
}

/// Configuration parameters required to construct the round controller.
#[derive(Clone, Debug)]
pub struct Config {
    rng_seed: u64,
    enemies: EnemyTuning,
}

impl Config {
    /// Creates a configuration from a wave seed and the enemy tuning that
    /// determines body sizes.
    #[must_use]
    pub const fn new(rng_seed: u64, enemies: EnemyTuning) -> Self {
        Self { rng_seed, enemies }
    }
}

/// Pure system that emits round and spawn commands.
#[derive(Debug)]
pub struct Rounds {
    phase: RoundPhase,
    enemies: EnemyTuning,
    rng: ChaCha8Rng,
}

impl Rounds {
    /// Creates a controller about to spawn the first round.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            phase: RoundPhase::Spawning { round: 1 },
            enemies: config.enemies,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Current phase of the controller.
    #[must_use]
    pub const fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Leaves `GameOver` and schedules round one again.
    pub fn restart(&mut self) {
        tracing::info!("rounds restarted");
        self.phase = RoundPhase::Spawning { round: 1 };
    }

    /// Advances the round state machine using immutable views of the world.
    ///
    /// An active round with no enemies left is cleared first. A dead or
    /// missing player then ends the run, so no wave spawns for them. A
    /// cleared round holds for one update before the next wave spawns.
    pub fn handle(
        &mut self,
        player: Option<&PlayerSnapshot>,
        enemies: &EnemyView,
        dungeon: &Dungeon,
        out: &mut Vec<Command>,
    ) {
        let entering = self.phase;
        if let RoundPhase::Active { round } = entering {
            if enemies.is_empty() {
                tracing::info!(round, "round cleared");
                self.phase = RoundPhase::Cleared { round };
            }
        }

        let Some(player) = player.filter(|player| !player.is_dead) else {
            if !matches!(self.phase, RoundPhase::GameOver { .. }) {
                let round = self.phase.round();
                tracing::info!(round, "game over");
                self.phase = RoundPhase::GameOver { round };
            }
            return;
        };

        match entering {
            RoundPhase::Spawning { round } => {
                self.spawn_wave(round, player, enemies, dungeon, out);
            }
            RoundPhase::Cleared { round } => {
                self.spawn_wave(round.saturating_add(1), player, enemies, dungeon, out);
            }
            RoundPhase::Active { .. } | RoundPhase::GameOver { .. } => {}
        }
    }

    fn spawn_wave(
        &mut self,
        round: u32,
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        dungeon: &Dungeon,
        out: &mut Vec<Command>,
    ) {
        let wave = WaveComposition::roll(round, &mut self.rng);
        tracing::info!(
            round,
            melee = wave.melee,
            ranged = wave.ranged,
            boss = wave.boss,
            "round started"
        );
        out.push(Command::BeginRound { round });

        let walls = dungeon.wall_rects();
        let margin = dungeon.tile_length();
        let mut occupied: Vec<Rect> = enemies.iter().map(|enemy| enemy.rect()).collect();
        occupied.push(player.rect().inflated(margin, margin));

        for kind in wave.kinds() {
            let size = self.enemies.stats(kind).size;
            match self.pick_position(dungeon, size, &walls, &occupied) {
                Some(position) => {
                    occupied.push(Rect::square(position, size));
                    out.push(Command::SpawnEnemy { kind, position });
                }
                None => {
                    tracing::warn!(round, ?kind, "no free position for enemy");
                }
            }
        }
        self.phase = RoundPhase::Active { round };
    }

    /// Centres an enemy of `size` on a random open tile that stays clear of
    /// walls and `occupied`.
    fn pick_position(
        &mut self,
        dungeon: &Dungeon,
        size: f32,
        walls: &[Rect],
        occupied: &[Rect],
    ) -> Option<Vec2> {
        let bounds = dungeon.bounds();
        for _ in 0..PLACEMENT_ATTEMPTS {
            let tile = dungeon.random_open_tile(&mut self.rng)?;
            let position = dungeon.tile_rect(tile).center() - Vec2::splat(size / 2.0);
            let body = Rect::square(position, size);
            if bounds.contains_rect(&body)
                && !would_collide(&body, walls, occupied.iter().copied())
            {
                return Some(position);
            }
        }
        None
    }
}
