//! Player avatar state: resources, progression and ability timers.

use std::time::Duration;

use dungeon_crawler_core::{
    DenialReason, PlayerSnapshot, PlayerTuning, ProgressionTuning, Purchase, Rect, Unlocks,
};
use glam::Vec2;

/// Timestamp of the last use of every player ability. `None` means unused.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct AbilityTimers {
    pub(crate) melee: Option<Duration>,
    /// Shared by bolt and fireball.
    pub(crate) ranged: Option<Duration>,
    pub(crate) teleport: Option<Duration>,
    pub(crate) teleport_attack: Option<Duration>,
    pub(crate) lightning: Option<Duration>,
}

#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) position: Vec2,
    pub(crate) size: f32,
    pub(crate) speed: f32,
    health: f32,
    max_health: f32,
    mana: f32,
    max_mana: f32,
    xp: f32,
    xp_to_next: f32,
    level: u32,
    ability_points: u32,
    pub(crate) unlocks: Unlocks,
    pub(crate) aim: Vec2,
    dead: bool,
    pub(crate) timers: AbilityTimers,
}

impl Player {
    pub(crate) fn new(
        position: Vec2,
        tuning: &PlayerTuning,
        progression: &ProgressionTuning,
    ) -> Self {
        Self {
            position,
            size: tuning.size,
            speed: tuning.speed,
            health: tuning.max_health,
            max_health: tuning.max_health,
            mana: tuning.max_mana,
            max_mana: tuning.max_mana,
            xp: 0.0,
            xp_to_next: progression.base_xp_to_next,
            level: 1,
            ability_points: 0,
            unlocks: Unlocks::default(),
            aim: Vec2::X,
            dead: false,
            timers: AbilityTimers::default(),
        }
    }

    pub(crate) fn rect(&self) -> Rect {
        Rect::square(self.position, self.size)
    }

    pub(crate) fn center(&self) -> Vec2 {
        self.rect().center()
    }

    pub(crate) const fn is_dead(&self) -> bool {
        self.dead
    }

    pub(crate) const fn health(&self) -> f32 {
        self.health
    }

    pub(crate) const fn mana(&self) -> f32 {
        self.mana
    }

    /// Applies damage, clamping health at zero.
    ///
    /// Returns `true` exactly once: on the hit that brings health to zero.
    pub(crate) fn take_damage(&mut self, amount: f32) -> bool {
        if self.dead {
            return false;
        }

        self.health = (self.health - amount.max(0.0)).max(0.0);
        if self.health <= 0.0 {
            self.dead = true;
            return true;
        }
        false
    }

    /// Deducts `cost` mana, leaving the pool untouched when it is too small.
    pub(crate) fn spend_mana(&mut self, cost: f32) -> Result<(), DenialReason> {
        if self.mana < cost {
            return Err(DenialReason::InsufficientMana);
        }
        self.mana -= cost;
        Ok(())
    }

    pub(crate) fn restore_health(&mut self, amount: f32) {
        self.health = (self.health + amount.max(0.0)).min(self.max_health);
    }

    pub(crate) fn restore_mana(&mut self, amount: f32) {
        self.mana = (self.mana + amount.max(0.0)).min(self.max_mana);
    }

    /// Adds experience and levels up as many times as the total allows.
    ///
    /// Returns every level reached, in order.
    pub(crate) fn gain_xp(&mut self, amount: f32, progression: &ProgressionTuning) -> Vec<u32> {
        self.xp += amount.max(0.0);

        let mut reached = Vec::new();
        while self.xp_to_next > 0.0 && self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.xp_to_next *= progression.xp_growth;
            self.level += 1;
            self.ability_points += progression.points_per_level;
            self.restore_health(self.max_health);
            self.restore_mana(self.max_mana);
            reached.push(self.level);
        }
        reached
    }

    /// Spends ability points on `purchase`.
    ///
    /// Returns the points left afterwards. A refused purchase changes nothing.
    pub(crate) fn purchase(
        &mut self,
        purchase: Purchase,
        progression: &ProgressionTuning,
    ) -> Result<u32, DenialReason> {
        if self.unlocks.owns(purchase) {
            return Err(DenialReason::AlreadyUnlocked);
        }

        let cost = progression.costs.cost(purchase);
        if self.ability_points < cost {
            return Err(DenialReason::InsufficientPoints);
        }
        self.ability_points -= cost;

        match purchase {
            Purchase::Fireball => self.unlocks.fireball = true,
            Purchase::LightningStrike => self.unlocks.lightning_strike = true,
            Purchase::TeleportAttack => self.unlocks.teleport_attack = true,
            Purchase::MaxHealth => {
                self.max_health += progression.health_per_upgrade;
                self.restore_health(self.max_health);
            }
            Purchase::MaxMana => {
                self.max_mana += progression.mana_per_upgrade;
                self.restore_mana(self.max_mana);
            }
        }
        Ok(self.ability_points)
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            size: self.size,
            health: self.health,
            max_health: self.max_health,
            mana: self.mana,
            max_mana: self.max_mana,
            xp: self.xp,
            xp_to_next: self.xp_to_next,
            level: self.level,
            ability_points: self.ability_points,
            unlocks: self.unlocks,
            aim: self.aim,
            is_dead: self.dead,
        }
    }

    #[cfg(test)]
    pub(crate) fn grant_points(&mut self, points: u32) {
        self.ability_points += points;
    }
}
