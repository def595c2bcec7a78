//! Position changes for every actor: walking, teleporting, chasing and
//! being pushed.

use dungeon_crawler_core::{
    would_collide, ActionError, ControlMode, DenialReason, Direction, EnemyId, Event, Rect,
};
use glam::Vec2;

use crate::{clock::cooldown_elapsed, living, player::Player, World};

/// Extra distance added when separating enemies so the result does not touch
/// within floating-point error.
const SEPARATION_SLACK: f32 = 0.01;

impl World {
    /// Moves the player one step along `intent`, all or nothing.
    ///
    /// The aim follows any non-zero intent even when the step is blocked.
    pub(crate) fn move_player(
        &mut self,
        intent: Vec2,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        self.check_control(ControlMode::Normal)?;
        let direction = intent.normalize_or_zero();
        if direction == Vec2::ZERO {
            return Ok(());
        }

        let map_max = self.dungeon.bounds().max();
        let player = living(&mut self.player)?;
        player.aim = direction;

        let limit = (map_max - Vec2::splat(player.size)).max(Vec2::ZERO);
        let target = (player.position + direction * player.speed).clamp(Vec2::ZERO, limit);
        if target == player.position {
            return Ok(());
        }

        let future = Rect::square(target, player.size);
        if would_collide(&future, &self.walls, self.enemies.rects_except(None)) {
            return Err(ActionError::CollisionBlocked);
        }

        let from = player.position;
        player.position = target;
        out_events.push(Event::PlayerMoved { from, to: target });
        Ok(())
    }

    /// Jumps the player a fixed distance along the aim.
    ///
    /// Every check runs before any state changes, so a refused teleport
    /// spends no mana and starts no cooldown.
    pub(crate) fn teleport(
        &mut self,
        strike: bool,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        self.check_control(ControlMode::Normal)?;
        let now = self.now();
        let abilities = &self.tuning.abilities;
        let distance = abilities.teleport.distance_tiles * self.dungeon.tile_length();
        let (cooldown, mana_cost) = if strike {
            (
                abilities.teleport_attack.cooldown(),
                abilities.teleport_attack.mana_cost,
            )
        } else {
            (abilities.teleport.cooldown(), abilities.teleport.mana_cost)
        };
        let bounds = self.dungeon.bounds();

        let player = living(&mut self.player)?;
        if strike && !player.unlocks.teleport_attack {
            return Err(DenialReason::Locked.into());
        }
        let last_use = if strike {
            player.timers.teleport_attack
        } else {
            player.timers.teleport
        };
        if !cooldown_elapsed(last_use, cooldown, now) {
            return Err(DenialReason::Cooldown.into());
        }
        if player.mana() < mana_cost {
            return Err(DenialReason::InsufficientMana.into());
        }

        let target = player.position + player.aim * distance;
        let future = Rect::square(target, player.size);
        if !bounds.contains_rect(&future) {
            return Err(ActionError::OutOfBoundsMove);
        }
        if would_collide(&future, &self.walls, self.enemies.rects_except(None)) {
            return Err(ActionError::CollisionBlocked);
        }

        player.spend_mana(mana_cost)?;
        if strike {
            player.timers.teleport_attack = Some(now);
        } else {
            player.timers.teleport = Some(now);
        }
        let from = player.position;
        player.position = target;
        out_events.push(Event::Teleported {
            from,
            to: target,
            strike,
        });

        if strike {
            self.teleport_strike(out_events);
        }
        Ok(())
    }

    /// Damages every enemy near the player and pushes the survivors away.
    fn teleport_strike(&mut self, out_events: &mut Vec<Event>) {
        let Some(player) = self.player.as_ref() else {
            return;
        };
        let origin = player.center();
        let aim = player.aim;
        let radius = self.tuning.abilities.teleport_attack.radius;
        let damage = self.tuning.abilities.teleport_attack.damage;
        let knockback = self.tuning.abilities.teleport_attack.knockback;

        let targets: Vec<EnemyId> = self
            .enemies
            .iter()
            .filter(|enemy| enemy.center().distance(origin) <= radius)
            .map(|enemy| enemy.id)
            .collect();

        for enemy in targets {
            if self.damage_enemy(enemy, damage, out_events) {
                continue;
            }
            self.knock_back(enemy, origin, aim, knockback, out_events);
        }
        self.separate_enemies(out_events);
    }

    fn knock_back(
        &mut self,
        enemy: EnemyId,
        origin: Vec2,
        fallback: Vec2,
        distance: f32,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.enemies.get(enemy) else {
            return;
        };
        let mut direction = (state.center() - origin).normalize_or_zero();
        if direction == Vec2::ZERO {
            direction = fallback;
        }
        let target = state.position + direction * distance;
        let _ = self.push_enemy(enemy, target, out_events);
    }

    /// Pushes apart every pair of overlapping enemies along the line between
    /// their centres. The higher identifier moves unless it is blocked.
    fn separate_enemies(&mut self, out_events: &mut Vec<Event>) {
        let ids = self.enemies.ids();
        for (index, first) in ids.iter().enumerate() {
            for second in &ids[index + 1..] {
                let (Some(a), Some(b)) = (self.enemies.get(*first), self.enemies.get(*second))
                else {
                    continue;
                };
                let (a_rect, b_rect) = (a.rect(), b.rect());
                if !a_rect.overlaps(&b_rect) {
                    continue;
                }

                let offset = separation(&a_rect, &b_rect);
                let (a_target, b_target) = (a.position - offset, b.position + offset);
                if !self.push_enemy(*second, b_target, out_events) {
                    let _ = self.push_enemy(*first, a_target, out_events);
                }
            }
        }
    }

    /// Moves an enemy to `target` when it stays on the map and clear of walls
    /// and the player. Returns whether the enemy moved.
    fn push_enemy(&mut self, enemy: EnemyId, target: Vec2, out_events: &mut Vec<Event>) -> bool {
        let player = self.player.as_ref().map(Player::rect);
        let bounds = self.dungeon.bounds();
        let Some(state) = self.enemies.get_mut(enemy) else {
            return false;
        };

        let future = Rect::square(target, state.stats.size);
        if !bounds.contains_rect(&future) || would_collide(&future, &self.walls, player) {
            return false;
        }

        let from = state.position;
        state.position = target;
        out_events.push(Event::EnemyKnockedBack {
            enemy,
            from,
            to: target,
        });
        true
    }

    /// Moves an enemy along one axis unless the step leaves the map or hits a
    /// wall, another enemy or the player.
    pub(crate) fn step_enemy(
        &mut self,
        enemy: EnemyId,
        direction: Direction,
        distance: f32,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.enemies.get(enemy) else {
            return;
        };
        let target = state.position + direction.unit() * distance.max(0.0);
        let future = Rect::square(target, state.stats.size);
        let player = self.player.as_ref().map(Player::rect);
        let others = self.enemies.rects_except(Some(enemy));

        if !self.dungeon.bounds().contains_rect(&future)
            || would_collide(&future, &self.walls, others.into_iter().chain(player))
        {
            return;
        }

        if let Some(state) = self.enemies.get_mut(enemy) {
            let from = state.position;
            state.position = target;
            out_events.push(Event::EnemyMoved {
                enemy,
                from,
                to: target,
            });
        }
    }
}

/// Offset that moves `b` off `a` along the vector between their centres.
fn separation(a: &Rect, b: &Rect) -> Vec2 {
    let delta = b.center() - a.center();
    let direction = if delta.length_squared() <= f32::EPSILON {
        Vec2::X
    } else {
        delta.normalize()
    };

    let overlap = (a.size() + b.size()) * 0.5 - delta.abs();
    let along = |overlap: f32, component: f32| {
        if component.abs() > f32::EPSILON {
            overlap / component.abs()
        } else {
            f32::INFINITY
        }
    };
    let distance = along(overlap.x, direction.x).min(along(overlap.y, direction.y));
    direction * (distance + SEPARATION_SLACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separation_clears_horizontal_overlap() {
        let a = Rect::square(Vec2::new(0.0, 0.0), 30.0);
        let b = Rect::square(Vec2::new(20.0, 0.0), 30.0);

        let offset = separation(&a, &b);

        assert!(offset.x > 0.0);
        assert!(offset.y.abs() < f32::EPSILON);
        assert!(!a.overlaps(&b.translated(offset)));
    }

    #[test]
    fn separation_handles_coincident_centres() {
        let a = Rect::square(Vec2::new(50.0, 50.0), 30.0);

        let offset = separation(&a, &a);

        assert!(!a.overlaps(&a.translated(offset)));
    }

    #[test]
    fn separation_follows_diagonal_vector() {
        let a = Rect::square(Vec2::new(0.0, 0.0), 30.0);
        let b = Rect::square(Vec2::new(10.0, 20.0), 30.0);

        let offset = separation(&a, &b);

        assert!(offset.x > 0.0 && offset.y > 0.0);
        assert!(!a.overlaps(&b.translated(offset)));
    }
}
