#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the dungeon crawler engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The orchestrator and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what happened. Systems read immutable snapshots and respond
//! exclusively with new command batches.
//!
//! Geometry, the [`Dungeon`] tile grid and the [`Tuning`] surface live here as
//! well so that every crate agrees on units and collision rules.

mod dungeon;
mod geometry;
mod tuning;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use dungeon::{BorderMode, Dungeon, TileCoord, TileKind};
pub use geometry::{rects_overlap, would_collide, Rect};
pub use tuning::{
    AbilityTuning, BoltTuning, BossTuning, EnemyStats, EnemyTuning, FireballTuning,
    LightningTuning, MapTuning, MeleeTuning, PlayerTuning, ProgressionTuning, ProjectileTuning,
    TeleportAttackTuning, TeleportTuning, Tuning, UnlockCosts,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the dungeon.";

/// Smallest column or row count the dungeon generator accepts.
pub const MIN_DUNGEON_DIMENSION: u32 = 10;

/// Source of monotonic time used for every cooldown comparison.
pub trait Clock {
    /// Time elapsed since the clock's epoch.
    fn now(&self) -> Duration;
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Replaces the active dungeon, clearing every enemy and projectile.
    LoadDungeon {
        /// Freshly generated tile grid.
        dungeon: Dungeon,
    },
    /// Creates a fresh player with its top-left corner at `position`.
    SpawnPlayer {
        /// Top-left corner of the player's body in world units.
        position: Vec2,
    },
    /// Requests a single movement step along the summed input vector.
    MovePlayer {
        /// Raw movement intent; normalized by the world before use.
        intent: Vec2,
    },
    /// Swings the player's melee attack along the current aim.
    MeleeAttack,
    /// Launches a basic bolt along the current aim.
    FireBolt,
    /// Launches a piercing fireball along the current aim.
    CastFireball,
    /// Jumps a fixed distance along the current aim.
    Teleport {
        /// Whether the arrival damages and knocks back nearby enemies.
        strike: bool,
    },
    /// Enters lightning aiming mode and spawns the reticle.
    BeginLightning,
    /// Steps the lightning reticle by one tile.
    MoveReticle {
        /// Direction of the step.
        direction: Direction,
    },
    /// Releases the lightning strike at the reticle and restores normal control.
    ConfirmLightning,
    /// Spends ability points on an unlock or a stat upgrade.
    Purchase {
        /// Item being bought.
        purchase: Purchase,
    },
    /// Records the start of a new round.
    BeginRound {
        /// One-based round number.
        round: u32,
    },
    /// Requests that an enemy be created at the provided location.
    SpawnEnemy {
        /// Variant of the enemy to create.
        kind: EnemyKind,
        /// Top-left corner of the enemy's body in world units.
        position: Vec2,
    },
    /// Requests that an enemy move along a single axis.
    StepEnemy {
        /// Identifier of the enemy attempting to move.
        enemy: EnemyId,
        /// Axis-aligned direction of travel.
        direction: Direction,
        /// Distance covered by the step in world units.
        distance: f32,
    },
    /// Requests that an enemy perform its melee strike against the player.
    EnemyStrike {
        /// Identifier of the striking enemy.
        enemy: EnemyId,
    },
    /// Requests that a ranged enemy queue a bolt aimed at the player.
    EnemyShoot {
        /// Identifier of the shooting enemy.
        enemy: EnemyId,
    },
    /// Advances every projectile owned by `owner` by one step.
    AdvanceProjectiles {
        /// Side whose projectiles should move.
        owner: Side,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a new dungeon became active.
    DungeonLoaded {
        /// Number of tile columns in the dungeon.
        columns: u32,
        /// Number of tile rows in the dungeon.
        rows: u32,
    },
    /// Confirms that a fresh player entered the dungeon.
    PlayerSpawned {
        /// Top-left corner of the player's body.
        position: Vec2,
    },
    /// Confirms that the player moved.
    PlayerMoved {
        /// Position before the move.
        from: Vec2,
        /// Position after the move.
        to: Vec2,
    },
    /// Reports that a player action was refused without changing state.
    ActionRejected {
        /// Action that was attempted.
        action: ActionKind,
        /// Reason the action was refused.
        error: ActionError,
    },
    /// Confirms that the player swung the melee attack.
    MeleeSwung {
        /// Hitbox tested against every enemy.
        hitbox: Rect,
    },
    /// Confirms that a projectile was launched.
    ProjectileLaunched {
        /// Identifier allocated to the projectile.
        projectile: ProjectileId,
        /// Kind of projectile launched.
        kind: ProjectileKind,
        /// Top-left corner of the projectile's hitbox.
        position: Vec2,
        /// Unit direction of travel.
        direction: Vec2,
    },
    /// Reports that a projectile left play.
    ProjectileExpired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Reason the projectile was removed.
        cause: ExpireCause,
    },
    /// Reports that a fireball exploded against a wall.
    FireballExploded {
        /// Identifier of the fireball.
        projectile: ProjectileId,
        /// Centre of the explosion.
        center: Vec2,
    },
    /// Confirms that an enemy was created.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Variant of the enemy.
        kind: EnemyKind,
        /// Top-left corner of the enemy's body.
        position: Vec2,
    },
    /// Reports that an enemy could not be placed at the requested position.
    EnemySpawnRejected {
        /// Variant that was requested.
        kind: EnemyKind,
        /// Requested top-left corner.
        position: Vec2,
    },
    /// Confirms that an enemy moved.
    EnemyMoved {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Position before the move.
        from: Vec2,
        /// Position after the move.
        to: Vec2,
    },
    /// Reports that an enemy lost health.
    EnemyDamaged {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Damage applied.
        amount: f32,
        /// Health left after the hit.
        remaining: f32,
    },
    /// Reports that an enemy was pushed by a teleport attack or separation.
    EnemyKnockedBack {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Position before the push.
        from: Vec2,
        /// Position after the push.
        to: Vec2,
    },
    /// Reports that an enemy died and was removed from play.
    EnemyDied {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Variant of the enemy.
        kind: EnemyKind,
    },
    /// Reports that an enemy landed a melee strike.
    EnemyStruck {
        /// Identifier of the striking enemy.
        enemy: EnemyId,
    },
    /// Reports that the player lost health.
    PlayerDamaged {
        /// Damage applied.
        amount: f32,
        /// Health left after the hit.
        remaining: f32,
    },
    /// Reports that the player's health reached zero.
    PlayerDied,
    /// Reports that the player earned experience.
    XpGained {
        /// Experience awarded.
        amount: f32,
    },
    /// Reports that the player reached a new level.
    LeveledUp {
        /// Level reached.
        level: u32,
    },
    /// Confirms that the player teleported.
    Teleported {
        /// Position before the jump.
        from: Vec2,
        /// Position after the jump.
        to: Vec2,
        /// Whether the arrival struck nearby enemies.
        strike: bool,
    },
    /// Announces that the player's control mode changed.
    ControlModeChanged {
        /// Mode that became active.
        mode: ControlMode,
    },
    /// Confirms that the lightning reticle moved.
    ReticleMoved {
        /// New reticle centre.
        center: Vec2,
    },
    /// Reports that a lightning strike landed.
    LightningStruck {
        /// Centre of the strike.
        center: Vec2,
        /// Radius of the strike.
        radius: f32,
    },
    /// Confirms a successful ability-point purchase.
    Purchased {
        /// Item bought.
        purchase: Purchase,
        /// Ability points left afterwards.
        remaining_points: u32,
    },
    /// Announces the start of a round.
    RoundStarted {
        /// One-based round number.
        round: u32,
    },
}

/// Cardinal directions used for axis-aligned steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing `y`.
    North,
    /// Movement toward increasing `x`.
    East,
    /// Movement toward increasing `y`.
    South,
    /// Movement toward decreasing `x`.
    West,
}

impl Direction {
    /// Unit vector pointing along the direction in world space.
    #[must_use]
    pub const fn unit(self) -> Vec2 {
        match self {
            Self::North => Vec2::new(0.0, -1.0),
            Self::East => Vec2::new(1.0, 0.0),
            Self::South => Vec2::new(0.0, 1.0),
            Self::West => Vec2::new(-1.0, 0.0),
        }
    }
}

/// Exclusive control mode of the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ControlMode {
    /// Movement and abilities respond to input.
    #[default]
    Normal,
    /// Only reticle movement and confirmation respond to input.
    LightningAim,
}

/// Side owning a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Projectiles that damage enemies.
    Player,
    /// Projectiles that damage the player.
    Enemy,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Enemy variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Chases the player and strikes within a radius.
    Melee,
    /// Chases the player, shoots bolts and strikes when adjacent.
    Ranged,
    /// Large melee enemy that keeps a gap and swipes a wide area.
    Boss,
}

/// Projectile variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    /// Player bolt removed on the first enemy hit.
    Bolt,
    /// Player fireball that pierces enemies and explodes on walls.
    Fireball,
    /// Enemy bolt aimed at the player's centre at launch.
    EnemyBolt,
}

impl ProjectileKind {
    /// Side that owns projectiles of this kind.
    #[must_use]
    pub const fn owner(self) -> Side {
        match self {
            Self::Bolt | Self::Fireball => Side::Player,
            Self::EnemyBolt => Side::Enemy,
        }
    }
}

/// Reason a projectile left play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpireCause {
    /// The projectile touched a wall.
    Wall,
    /// The projectile left the map bounds.
    LeftBounds,
    /// The projectile was consumed by hitting its target.
    HitTarget,
}

/// Items purchasable with ability points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purchase {
    /// Unlocks the fireball.
    Fireball,
    /// Unlocks the lightning strike.
    LightningStrike,
    /// Unlocks the teleport attack.
    TeleportAttack,
    /// Raises maximum health and refills it.
    MaxHealth,
    /// Raises maximum mana and refills it.
    MaxMana,
}

/// Abilities the player has unlocked with ability points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Unlocks {
    /// Whether the fireball can be cast.
    pub fireball: bool,
    /// Whether the lightning strike can be started.
    pub lightning_strike: bool,
    /// Whether the teleport attack can be used.
    pub teleport_attack: bool,
}

impl Unlocks {
    /// Reports whether `purchase` is a one-time unlock that is already owned.
    ///
    /// Stat upgrades can be bought repeatedly and always report `false`.
    #[must_use]
    pub const fn owns(&self, purchase: Purchase) -> bool {
        match purchase {
            Purchase::Fireball => self.fireball,
            Purchase::LightningStrike => self.lightning_strike,
            Purchase::TeleportAttack => self.teleport_attack,
            Purchase::MaxHealth | Purchase::MaxMana => false,
        }
    }
}

/// Player action named in a rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Movement step.
    Move,
    /// Melee swing.
    Melee,
    /// Basic bolt.
    Bolt,
    /// Fireball.
    Fireball,
    /// Plain teleport.
    Teleport,
    /// Teleport attack.
    TeleportAttack,
    /// Start of lightning aiming.
    BeginLightning,
    /// Reticle step.
    MoveReticle,
    /// Lightning confirmation.
    ConfirmLightning,
    /// Ability-point purchase.
    Purchase(Purchase),
}

/// Recoverable reasons a player action is refused.
///
/// A rejected action never changes world state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ActionError {
    /// The ability cannot be used right now.
    #[error("ability denied: {0}")]
    AbilityDenied(#[from] DenialReason),
    /// The destination lies outside the map bounds.
    #[error("destination lies outside the map")]
    OutOfBoundsMove,
    /// The destination intersects a wall or another actor.
    #[error("destination is blocked")]
    CollisionBlocked,
}

/// Reasons an ability or purchase is denied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum DenialReason {
    /// The ability's cooldown has not elapsed.
    #[error("cooldown has not elapsed")]
    Cooldown,
    /// The player does not have enough mana.
    #[error("not enough mana")]
    InsufficientMana,
    /// The ability has not been unlocked.
    #[error("ability is locked")]
    Locked,
    /// The player does not have enough ability points.
    #[error("not enough ability points")]
    InsufficientPoints,
    /// The unlock is already owned.
    #[error("already unlocked")]
    AlreadyUnlocked,
    /// The player is dead or has not spawned.
    #[error("player is dead")]
    PlayerDead,
    /// The action is not available in the current control mode.
    #[error("not available in the current control mode")]
    WrongMode,
}

/// Fatal errors raised while building a dungeon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum GenerationError {
    /// The requested grid is too small to leave room for shape margins.
    #[error("dungeon of {columns}x{rows} tiles is below the {minimum}x{minimum} minimum")]
    InvalidGenerationBounds {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
        /// Smallest accepted column and row count.
        minimum: u32,
    },
}

/// Area an enemy's melee strike covers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyReach {
    /// Centre-to-centre distance within which the strike connects.
    Radius(f32),
    /// Rectangle grown from the enemy's body by the provided margins.
    Swipe {
        /// Extension on the left and right edges.
        horizontal: f32,
        /// Extension on the top and bottom edges.
        vertical: f32,
    },
}

impl EnemyReach {
    /// Reports whether an enemy occupying `body` can strike `target`.
    #[must_use]
    pub fn reaches(&self, body: &Rect, target: &Rect) -> bool {
        match *self {
            Self::Radius(range) => body.center().distance(target.center()) <= range,
            Self::Swipe {
                horizontal,
                vertical,
            } => body.inflated(horizontal, vertical).overlaps(target),
        }
    }
}

/// Lightning targeting cursor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reticle {
    /// Centre of the strike area.
    pub center: Vec2,
    /// Radius of the strike area.
    pub radius: f32,
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Top-left corner of the player's body.
    pub position: Vec2,
    /// Side length of the player's square body.
    pub size: f32,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Current mana.
    pub mana: f32,
    /// Maximum mana.
    pub max_mana: f32,
    /// Experience accumulated toward the next level.
    pub xp: f32,
    /// Experience required for the next level.
    pub xp_to_next: f32,
    /// Current level, starting at one.
    pub level: u32,
    /// Unspent ability points.
    pub ability_points: u32,
    /// Unlocked abilities.
    pub unlocks: Unlocks,
    /// Unit aim direction.
    pub aim: Vec2,
    /// Whether the player's health reached zero.
    pub is_dead: bool,
}

impl PlayerSnapshot {
    /// Rectangle occupied by the player's body.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::square(self.position, self.size)
    }

    /// Centre of the player's body.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated by the world.
    pub id: EnemyId,
    /// Variant of the enemy.
    pub kind: EnemyKind,
    /// Top-left corner of the enemy's body.
    pub position: Vec2,
    /// Side length of the enemy's square body.
    pub size: f32,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Distance covered per chase step.
    pub speed: f32,
    /// Area the melee strike covers.
    pub reach: EnemyReach,
    /// Whether the melee cooldown has elapsed.
    pub strike_ready: bool,
    /// Whether the enemy can shoot right now. Always `false` for non-shooters.
    pub shot_ready: bool,
    /// Whether the damage flash is visible.
    pub flashing: bool,
}

impl EnemySnapshot {
    /// Rectangle occupied by the enemy's body.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::square(self.position, self.size)
    }

    /// Centre of the enemy's body.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }
}

/// Read-only view of every live enemy.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new view from the provided snapshots, sorted by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated by the world.
    pub id: ProjectileId,
    /// Kind of projectile.
    pub kind: ProjectileKind,
    /// Top-left corner of the projectile's hitbox.
    pub position: Vec2,
    /// Side length of the square hitbox.
    pub size: f32,
    /// Unit direction of travel.
    pub direction: Vec2,
}

impl ProjectileSnapshot {
    /// Rectangle covered by the projectile.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::square(self.position, self.size)
    }
}

/// Read-only view of every projectile in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new view from the provided snapshots, sorted by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no projectiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
