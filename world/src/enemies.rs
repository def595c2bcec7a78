//! Enemy state and the registry that owns every live enemy.

use std::{collections::BTreeMap, time::Duration};

use dungeon_crawler_core::{
    EnemyId, EnemyKind, EnemyReach, EnemySnapshot, EnemyStats, EnemyTuning, Rect,
};
use glam::Vec2;

use crate::clock::cooldown_elapsed;

/// Bolt queued by a ranged enemy and launched when enemy projectiles advance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PendingShot {
    pub(crate) origin: Vec2,
    pub(crate) direction: Vec2,
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    pub(crate) stats: EnemyStats,
    health: f32,
    dead: bool,
    reach: EnemyReach,
    shoot_cooldown: Option<Duration>,
    last_strike: Option<Duration>,
    last_shot: Option<Duration>,
    flash_until: Option<Duration>,
    outbox: Vec<PendingShot>,
}

impl Enemy {
    fn new(id: EnemyId, kind: EnemyKind, position: Vec2, tuning: &EnemyTuning) -> Self {
        let stats = tuning.stats(kind);
        let reach = match kind {
            EnemyKind::Boss => EnemyReach::Swipe {
                horizontal: tuning.boss.reach_horizontal,
                vertical: tuning.boss.reach_vertical,
            },
            EnemyKind::Melee | EnemyKind::Ranged => EnemyReach::Radius(stats.melee_range),
        };
        let shoot_cooldown = (kind == EnemyKind::Ranged).then(|| tuning.shoot_cooldown());

        Self {
            id,
            kind,
            position,
            health: stats.health,
            dead: false,
            stats,
            reach,
            shoot_cooldown,
            last_strike: None,
            last_shot: None,
            flash_until: None,
            outbox: Vec::new(),
        }
    }

    pub(crate) fn rect(&self) -> Rect {
        Rect::square(self.position, self.stats.size)
    }

    pub(crate) fn center(&self) -> Vec2 {
        self.rect().center()
    }

    pub(crate) const fn health(&self) -> f32 {
        self.health
    }

    pub(crate) const fn reach(&self) -> EnemyReach {
        self.reach
    }

    /// Applies damage, clamping health at zero, and starts the damage flash.
    ///
    /// Returns `true` exactly once: on the hit that brings health to zero.
    pub(crate) fn take_damage(&mut self, amount: f32, now: Duration, flash: Duration) -> bool {
        if self.dead {
            return false;
        }

        self.health = (self.health - amount.max(0.0)).max(0.0);
        self.flash_until = Some(now.saturating_add(flash));
        self.dead = self.health <= 0.0;
        self.dead
    }

    pub(crate) fn strike_ready(&self, now: Duration) -> bool {
        cooldown_elapsed(self.last_strike, self.stats.attack_cooldown(), now)
    }

    pub(crate) fn shot_ready(&self, now: Duration) -> bool {
        self.shoot_cooldown
            .map_or(false, |cooldown| cooldown_elapsed(self.last_shot, cooldown, now))
    }

    pub(crate) fn record_strike(&mut self, now: Duration) {
        self.last_strike = Some(now);
    }

    /// Queues a bolt and restarts the shot cooldown.
    pub(crate) fn queue_shot(&mut self, shot: PendingShot, now: Duration) {
        self.outbox.push(shot);
        self.last_shot = Some(now);
    }

    fn clear_expired_flash(&mut self, now: Duration) {
        if self.flash_until.is_some_and(|until| now >= until) {
            self.flash_until = None;
        }
    }

    fn snapshot(&self, now: Duration) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            size: self.stats.size,
            health: self.health,
            max_health: self.stats.health,
            speed: self.stats.speed,
            reach: self.reach,
            strike_ready: self.strike_ready(now),
            shot_ready: self.shot_ready(now),
            flashing: self.flash_until.is_some(),
        }
    }
}

/// Registry that stores enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
}

impl EnemyRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    pub(crate) fn insert(
        &mut self,
        kind: EnemyKind,
        position: Vec2,
        tuning: &EnemyTuning,
    ) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, Enemy::new(id, kind, position, tuning));
        id
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        self.entries.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Identifiers of every live enemy in ascending order.
    ///
    /// Callers that may remove enemies iterate this copy rather than the map.
    pub(crate) fn ids(&self) -> Vec<EnemyId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.values()
    }

    /// Rectangles of every enemy except `excluded`.
    pub(crate) fn rects_except(&self, excluded: Option<EnemyId>) -> Vec<Rect> {
        self.entries
            .values()
            .filter(|enemy| Some(enemy.id) != excluded)
            .map(Enemy::rect)
            .collect()
    }

    pub(crate) fn clear_expired_flashes(&mut self, now: Duration) {
        for enemy in self.entries.values_mut() {
            enemy.clear_expired_flash(now);
        }
    }

    /// Removes every queued bolt, ordered by enemy identifier.
    pub(crate) fn drain_outboxes(&mut self) -> Vec<PendingShot> {
        self.entries
            .values_mut()
            .flat_map(|enemy| enemy.outbox.drain(..))
            .collect()
    }

    pub(crate) fn snapshots(&self, now: Duration) -> Vec<EnemySnapshot> {
        self.entries
            .values()
            .map(|enemy| enemy.snapshot(now))
            .collect()
    }
}
