#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for dungeon crawler adapters.
//!
//! The simulation never draws. Adapters capture a [`Scene`] from read-only
//! world snapshots each frame and hand it to a [`Presenter`].

use anyhow::Result as AnyResult;
use dungeon_crawler_core::{
    ControlMode, Dungeon, EnemyKind, EnemyView, PlayerSnapshot, ProjectileKind, ProjectileView,
    Purchase, Rect, Reticle, TileCoord, TileKind, UnlockCosts,
};
use glam::Vec2;
use thiserror::Error;

/// Every item the inventory offers, in display order.
pub const INVENTORY_ITEMS: [Purchase; 5] = [
    Purchase::Fireball,
    Purchase::LightningStrike,
    Purchase::TeleportAttack,
    Purchase::MaxHealth,
    Purchase::MaxMana,
];

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Fill colors for everything a scene contains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Open floor.
    pub floor: Color,
    /// Wall tiles.
    pub wall: Color,
    /// Player body.
    pub player: Color,
    /// Melee enemy body.
    pub melee: Color,
    /// Ranged enemy body.
    pub ranged: Color,
    /// Boss body.
    pub boss: Color,
    /// Player bolts.
    pub bolt: Color,
    /// Fireballs.
    pub fireball: Color,
    /// Enemy bolts.
    pub enemy_bolt: Color,
    /// Lightning reticle outline.
    pub reticle: Color,
}

impl Palette {
    /// Body color of an enemy, washed out while its damage flash shows.
    #[must_use]
    pub fn enemy(&self, kind: EnemyKind, flashing: bool) -> Color {
        let base = match kind {
            EnemyKind::Melee => self.melee,
            EnemyKind::Ranged => self.ranged,
            EnemyKind::Boss => self.boss,
        };
        if flashing {
            base.lighten(0.8)
        } else {
            base
        }
    }

    /// Fill color of a projectile.
    #[must_use]
    pub const fn projectile(&self, kind: ProjectileKind) -> Color {
        match kind {
            ProjectileKind::Bolt => self.bolt,
            ProjectileKind::Fireball => self.fireball,
            ProjectileKind::EnemyBolt => self.enemy_bolt,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            floor: Color::from_rgb_u8(0x2b, 0x2b, 0x2b),
            wall: Color::from_rgb_u8(0x6d, 0x5d, 0x4b),
            player: Color::from_rgb_u8(0x3c, 0x8d, 0xd9),
            melee: Color::from_rgb_u8(0xc8, 0x2a, 0x36),
            ranged: Color::from_rgb_u8(0xff, 0xc1, 0x07),
            boss: Color::from_rgb_u8(0x58, 0x47, 0xff),
            bolt: Color::from_rgb_u8(0xe0, 0xe0, 0xff),
            fireball: Color::from_rgb_u8(0xff, 0x6f, 0x00),
            enemy_bolt: Color::from_rgb_u8(0x9c, 0xff, 0x57),
            reticle: Color::from_rgb_u8(0xff, 0xff, 0x8d),
        }
    }
}

/// Viewport offset that keeps the player centred without showing space
/// outside the map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    offset: Vec2,
    viewport: Vec2,
}

impl Camera {
    /// Centres a `viewport`-sized window on `focus`, clamped to a map of
    /// `map_size`. Maps smaller than the viewport are pinned to the origin.
    pub fn follow(focus: Vec2, viewport: Vec2, map_size: Vec2) -> Result<Self, RenderingError> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return Err(RenderingError::InvalidViewport {
                width: viewport.x,
                height: viewport.y,
            });
        }

        let limit = (map_size - viewport).max(Vec2::ZERO);
        let offset = (focus - viewport * 0.5).clamp(Vec2::ZERO, limit);
        Ok(Self { offset, viewport })
    }

    /// World-space corner shown at the top-left of the viewport.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Size of the visible window in world units.
    #[must_use]
    pub const fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Translates a world-space point into viewport space.
    #[must_use]
    pub fn to_screen(&self, point: Vec2) -> Vec2 {
        point - self.offset
    }

    /// Whether any part of `rect` falls inside the viewport.
    #[must_use]
    pub fn shows(&self, rect: &Rect) -> bool {
        Rect::new(self.offset, self.viewport).overlaps(rect)
    }
}

/// Player resources shown on the heads-up display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Current mana.
    pub mana: f32,
    /// Maximum mana.
    pub max_mana: f32,
    /// Experience toward the next level.
    pub xp: f32,
    /// Experience required for the next level.
    pub xp_to_next: f32,
    /// Current level.
    pub level: u32,
    /// Unspent ability points.
    pub ability_points: u32,
    /// Round in progress.
    pub round: u32,
}

impl Hud {
    /// Builds the display from a player snapshot.
    #[must_use]
    pub fn from_player(player: &PlayerSnapshot, round: u32) -> Self {
        Self {
            health: player.health,
            max_health: player.max_health,
            mana: player.mana,
            max_mana: player.max_mana,
            xp: player.xp,
            xp_to_next: player.xp_to_next,
            level: player.level,
            ability_points: player.ability_points,
            round,
        }
    }
}

/// One line of the inventory screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InventoryOffer {
    /// Item on offer.
    pub purchase: Purchase,
    /// Ability points it costs.
    pub cost: u32,
    /// Whether the one-time unlock is already owned.
    pub owned: bool,
    /// Whether the player can buy it right now.
    pub affordable: bool,
}

/// Inventory screen listing available points and what they buy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryPanel {
    /// Unspent ability points.
    pub ability_points: u32,
    /// Every item with its price and availability.
    pub offers: Vec<InventoryOffer>,
}

impl InventoryPanel {
    /// Lists every item for the provided player.
    #[must_use]
    pub fn for_player(player: &PlayerSnapshot, costs: &UnlockCosts) -> Self {
        let offers = INVENTORY_ITEMS
            .iter()
            .map(|purchase| {
                let cost = costs.cost(*purchase);
                let owned = player.unlocks.owns(*purchase);
                InventoryOffer {
                    purchase: *purchase,
                    cost,
                    owned,
                    affordable: !owned && player.ability_points >= cost,
                }
            })
            .collect();
        Self {
            ability_points: player.ability_points,
            offers,
        }
    }
}

/// Square body drawn in viewport space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    /// Area covered, relative to the camera.
    pub rect: Rect,
    /// Fill color.
    pub color: Color,
}

/// Enemy drawn with its health bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySprite {
    /// Variant of the enemy.
    pub kind: EnemyKind,
    /// Body and color.
    pub sprite: Sprite,
    /// Remaining health as a fraction of maximum.
    pub health_fraction: f32,
}

/// Everything a world exposes to a render sink for one frame.
#[derive(Clone, Copy, Debug)]
pub struct WorldFrame<'a> {
    /// Dungeon grid.
    pub dungeon: &'a Dungeon,
    /// Player, if spawned.
    pub player: Option<&'a PlayerSnapshot>,
    /// Live enemies.
    pub enemies: &'a EnemyView,
    /// Projectiles in flight.
    pub projectiles: &'a ProjectileView,
    /// Lightning reticle while aiming.
    pub reticle: Option<Reticle>,
    /// Exclusive control mode.
    pub control_mode: ControlMode,
    /// Round in progress.
    pub round: u32,
    /// Whether the inventory screen is open.
    pub inventory_open: bool,
    /// Price list shown by the inventory.
    pub costs: &'a UnlockCosts,
}

/// Scene description in viewport space, ready for a presenter.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Camera the scene was captured with.
    pub camera: Camera,
    /// Side length of a tile.
    pub tile_length: f32,
    /// Visible wall tiles.
    pub walls: Vec<Rect>,
    /// Player body, if spawned.
    pub player: Option<Sprite>,
    /// Player aim direction.
    pub aim: Option<Vec2>,
    /// Visible enemies, ordered by identifier.
    pub enemies: Vec<EnemySprite>,
    /// Visible projectiles.
    pub projectiles: Vec<Sprite>,
    /// Lightning reticle relative to the camera.
    pub reticle: Option<Reticle>,
    /// Exclusive control mode.
    pub control_mode: ControlMode,
    /// Heads-up display values.
    pub hud: Option<Hud>,
    /// Inventory screen, when open.
    pub inventory: Option<InventoryPanel>,
    /// Whether the player has died.
    pub game_over: bool,
}

impl Scene {
    /// Captures the parts of `frame` visible through a camera that follows
    /// the player.
    pub fn capture(
        frame: &WorldFrame<'_>,
        viewport: Vec2,
        palette: &Palette,
    ) -> Result<Self, RenderingError> {
        let map = frame.dungeon.bounds();
        let focus = frame
            .player
            .map_or_else(|| map.center(), PlayerSnapshot::center);
        let camera = Camera::follow(focus, viewport, map.size())?;
        let to_view = |rect: Rect| rect.translated(-camera.offset());

        let walls = frame
            .dungeon
            .coords()
            .filter(|coord| frame.dungeon.tile(*coord) == Some(TileKind::Wall))
            .map(|coord: TileCoord| frame.dungeon.tile_rect(coord))
            .filter(|rect| camera.shows(rect))
            .map(to_view)
            .collect();

        let enemies = frame
            .enemies
            .iter()
            .filter(|enemy| camera.shows(&enemy.rect()))
            .map(|enemy| EnemySprite {
                kind: enemy.kind,
                sprite: Sprite {
                    rect: to_view(enemy.rect()),
                    color: palette.enemy(enemy.kind, enemy.flashing),
                },
                health_fraction: if enemy.max_health > 0.0 {
                    (enemy.health / enemy.max_health).clamp(0.0, 1.0)
                } else {
                    0.0
                },
            })
            .collect();

        let projectiles = frame
            .projectiles
            .iter()
            .filter(|projectile| camera.shows(&projectile.rect()))
            .map(|projectile| Sprite {
                rect: to_view(projectile.rect()),
                color: palette.projectile(projectile.kind),
            })
            .collect();

        Ok(Self {
            camera,
            tile_length: frame.dungeon.tile_length(),
            walls,
            player: frame.player.map(|player| Sprite {
                rect: to_view(player.rect()),
                color: palette.player,
            }),
            aim: frame.player.map(|player| player.aim),
            enemies,
            projectiles,
            reticle: frame.reticle.map(|reticle| Reticle {
                center: camera.to_screen(reticle.center),
                radius: reticle.radius,
            }),
            control_mode: frame.control_mode,
            hud: frame
                .player
                .map(|player| Hud::from_player(player, frame.round)),
            inventory: frame
                .player
                .filter(|_| frame.inventory_open)
                .map(|player| InventoryPanel::for_player(player, frame.costs)),
            game_over: frame.player.is_some_and(|player| player.is_dead),
        })
    }
}

/// Sink that displays captured scenes.
pub trait Presenter {
    /// Shows one scene.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum RenderingError {
    /// The viewport must have a positive area.
    #[error("viewport must be positive (received {width}x{height})")]
    InvalidViewport {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
}
