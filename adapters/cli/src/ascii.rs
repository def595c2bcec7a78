//! Text presenter that prints captured scenes as a character grid.

use std::io::Write;

use anyhow::{Context, Result};
use dungeon_crawler_core::{ControlMode, EnemyKind};
use dungeon_crawler_rendering::{Presenter, Scene};
use glam::Vec2;

const FLOOR: char = '.';
const WALL: char = '#';
const PLAYER: char = '@';
const PROJECTILE: char = '*';
const RETICLE: char = '+';

/// Writes one tile-sized cell per character to `out`.
#[derive(Debug)]
pub(crate) struct AsciiPresenter<W> {
    out: W,
}

impl<W: Write> AsciiPresenter<W> {
    pub(crate) const fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for AsciiPresenter<W> {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        self.out
            .write_all(draw(scene).as_bytes())
            .context("failed to write frame")?;
        self.out.flush().context("failed to flush frame")
    }
}

fn draw(scene: &Scene) -> String {
    let tile = scene.tile_length.max(1.0);
    let viewport = scene.camera.viewport();
    let columns = (viewport.x / tile).ceil() as usize;
    let rows = (viewport.y / tile).ceil() as usize;
    let mut grid = vec![vec![FLOOR; columns]; rows];

    for wall in &scene.walls {
        plot(&mut grid, tile, viewport, wall.center(), WALL);
    }
    for projectile in &scene.projectiles {
        plot(&mut grid, tile, viewport, projectile.rect.center(), PROJECTILE);
    }
    for enemy in &scene.enemies {
        let glyph = match enemy.kind {
            EnemyKind::Melee => 'm',
            EnemyKind::Ranged => 'r',
            EnemyKind::Boss => 'B',
        };
        plot(&mut grid, tile, viewport, enemy.sprite.rect.center(), glyph);
    }
    if let Some(player) = &scene.player {
        plot(&mut grid, tile, viewport, player.rect.center(), PLAYER);
    }
    if let Some(reticle) = &scene.reticle {
        plot(&mut grid, tile, viewport, reticle.center, RETICLE);
    }

    let mut text = String::new();
    for row in grid {
        text.extend(row);
        text.push('\n');
    }
    if let Some(hud) = &scene.hud {
        text.push_str(&format!(
            "round {} | hp {:.0}/{:.0} | mp {:.0}/{:.0} | level {} xp {:.0}/{:.0} | points {}\n",
            hud.round,
            hud.health,
            hud.max_health,
            hud.mana,
            hud.max_mana,
            hud.level,
            hud.xp,
            hud.xp_to_next,
            hud.ability_points,
        ));
    }
    if scene.control_mode == ControlMode::LightningAim {
        text.push_str("aiming lightning\n");
    }
    if let Some(inventory) = &scene.inventory {
        text.push_str(&format!("inventory ({} points)\n", inventory.ability_points));
        for offer in &inventory.offers {
            let status = if offer.owned {
                "owned"
            } else if offer.affordable {
                "buy"
            } else {
                "locked"
            };
            text.push_str(&format!(
                "  {:?} cost {} [{status}]\n",
                offer.purchase, offer.cost
            ));
        }
    }
    if scene.game_over {
        text.push_str("GAME OVER\n");
    }
    text.push('\n');
    text
}

/// Marks the cell under `point`, pulling partially visible shapes inside.
fn plot(grid: &mut [Vec<char>], tile: f32, viewport: Vec2, point: Vec2, glyph: char) {
    let inside = point.clamp(Vec2::ZERO, (viewport - Vec2::ONE).max(Vec2::ZERO));
    let column = (inside.x / tile) as usize;
    let row = (inside.y / tile) as usize;
    if let Some(cell) = grid.get_mut(row).and_then(|cells| cells.get_mut(column)) {
        *cell = glyph;
    }
}
