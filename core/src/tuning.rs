//! Tuning surface controlling every adjustable gameplay number.
//!
//! All structs deserialize with `#[serde(default)]`, so a configuration file
//! only needs to name the values it overrides.

use std::time::Duration;

use serde::Deserialize;

use crate::{EnemyKind, Purchase};

/// Aggregated tuning knobs for the simulation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Map scale parameters.
    pub map: MapTuning,
    /// Player body and resource pools.
    pub player: PlayerTuning,
    /// Player ability costs, cooldowns and effects.
    pub abilities: AbilityTuning,
    /// Enemy statistics per variant.
    pub enemies: EnemyTuning,
    /// Experience curve and ability-point economy.
    pub progression: ProgressionTuning,
}

/// Map scale parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapTuning {
    /// Side length of a square tile in world units.
    pub tile_length: f32,
}

impl Default for MapTuning {
    fn default() -> Self {
        Self { tile_length: 40.0 }
    }
}

/// Player body and resource pools.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Side length of the player's square body.
    pub size: f32,
    /// Distance covered per tick while a movement key is held.
    pub speed: f32,
    /// Starting maximum health.
    pub max_health: f32,
    /// Starting maximum mana.
    pub max_mana: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            size: 30.0,
            speed: 5.0,
            max_health: 100.0,
            max_mana: 50.0,
        }
    }
}

/// Player ability parameters.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AbilityTuning {
    /// Melee swing.
    pub melee: MeleeTuning,
    /// Basic ranged bolt.
    pub bolt: BoltTuning,
    /// Piercing fireball with splash on wall impact.
    pub fireball: FireballTuning,
    /// Plain teleport.
    pub teleport: TeleportTuning,
    /// Teleport that damages and knocks back nearby enemies on arrival.
    pub teleport_attack: TeleportAttackTuning,
    /// Two-phase lightning strike.
    pub lightning: LightningTuning,
}

/// Melee swing parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeleeTuning {
    /// Minimum time between swings in milliseconds.
    pub cooldown_ms: u64,
    /// Damage dealt to every enemy inside the hitbox.
    pub damage: f32,
}

impl Default for MeleeTuning {
    fn default() -> Self {
        Self {
            cooldown_ms: 500,
            damage: 25.0,
        }
    }
}

impl MeleeTuning {
    /// Swing cooldown as a duration.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Flight parameters shared by every projectile kind.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Distance travelled per tick.
    pub speed: f32,
    /// Side length of the projectile's square hitbox.
    pub size: f32,
    /// Damage applied on contact.
    pub damage: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 5.0,
            size: 15.0,
            damage: 20.0,
        }
    }
}

/// Basic bolt parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoltTuning {
    /// Cooldown measured from the last ranged cast, in milliseconds.
    pub cooldown_ms: u64,
    /// Mana consumed per cast.
    pub mana_cost: f32,
    /// Flight parameters.
    pub projectile: ProjectileTuning,
}

impl Default for BoltTuning {
    fn default() -> Self {
        Self {
            cooldown_ms: 1_000,
            mana_cost: 10.0,
            projectile: ProjectileTuning::default(),
        }
    }
}

impl BoltTuning {
    /// Cast cooldown as a duration.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Fireball parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FireballTuning {
    /// Cooldown measured from the last ranged cast, in milliseconds.
    pub cooldown_ms: u64,
    /// Mana consumed per cast.
    pub mana_cost: f32,
    /// Flight parameters; `damage` applies once per enemy pierced.
    pub projectile: ProjectileTuning,
    /// Damage dealt by the explosion when the fireball reaches a wall.
    pub splash_damage: f32,
    /// Radius of the explosion measured from the impact point.
    pub splash_radius: f32,
}

impl Default for FireballTuning {
    fn default() -> Self {
        Self {
            cooldown_ms: 1_500,
            mana_cost: 20.0,
            projectile: ProjectileTuning {
                speed: 4.0,
                size: 20.0,
                damage: 40.0,
            },
            splash_damage: 20.0,
            splash_radius: 60.0,
        }
    }
}

impl FireballTuning {
    /// Cast cooldown as a duration.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Plain teleport parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TeleportTuning {
    /// Cooldown in milliseconds.
    pub cooldown_ms: u64,
    /// Mana consumed per successful teleport.
    pub mana_cost: f32,
    /// Jump length measured in tiles along the aim direction.
    pub distance_tiles: f32,
}

impl Default for TeleportTuning {
    fn default() -> Self {
        Self {
            cooldown_ms: 3_000,
            mana_cost: 15.0,
            distance_tiles: 3.0,
        }
    }
}

impl TeleportTuning {
    /// Teleport cooldown as a duration.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Teleport attack parameters. The jump length is shared with [`TeleportTuning`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TeleportAttackTuning {
    /// Cooldown in milliseconds.
    pub cooldown_ms: u64,
    /// Mana consumed per successful teleport attack.
    pub mana_cost: f32,
    /// Damage dealt to each enemy within `radius` of the arrival point.
    pub damage: f32,
    /// Radius around the player's centre after arrival.
    pub radius: f32,
    /// Distance surviving enemies are pushed away from the player.
    pub knockback: f32,
}

impl Default for TeleportAttackTuning {
    fn default() -> Self {
        Self {
            cooldown_ms: 3_000,
            mana_cost: 25.0,
            damage: 30.0,
            radius: 80.0,
            knockback: 40.0,
        }
    }
}

impl TeleportAttackTuning {
    /// Teleport attack cooldown as a duration.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Lightning strike parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightningTuning {
    /// Cooldown measured from the moment aiming starts, in milliseconds.
    pub cooldown_ms: u64,
    /// Mana consumed up front when aiming starts.
    pub mana_cost: f32,
    /// Damage dealt to each enemy inside the reticle on confirm.
    pub damage: f32,
    /// Reticle radius.
    pub radius: f32,
}

impl Default for LightningTuning {
    fn default() -> Self {
        Self {
            cooldown_ms: 4_000,
            mana_cost: 30.0,
            damage: 75.0,
            radius: 60.0,
        }
    }
}

impl LightningTuning {
    /// Lightning cooldown as a duration.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Statistics describing a single enemy variant.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnemyStats {
    /// Side length of the square body.
    pub size: f32,
    /// Starting and maximum health.
    pub health: f32,
    /// Distance covered per chase step.
    pub speed: f32,
    /// Centre-to-centre distance at which melee strikes connect.
    pub melee_range: f32,
    /// Damage dealt per melee strike.
    pub melee_damage: f32,
    /// Minimum time between melee strikes in milliseconds.
    pub attack_cooldown_ms: u64,
    /// Experience granted to the player on death.
    pub xp_reward: f32,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            size: 30.0,
            health: 50.0,
            speed: 2.0,
            melee_range: 40.0,
            melee_damage: 10.0,
            attack_cooldown_ms: 1_000,
            xp_reward: 50.0,
        }
    }
}

impl EnemyStats {
    /// Melee cooldown as a duration.
    #[must_use]
    pub fn attack_cooldown(&self) -> Duration {
        Duration::from_millis(self.attack_cooldown_ms)
    }
}

/// Multipliers applied to the melee variant to derive the boss.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    /// Body size multiplier.
    pub size_multiplier: f32,
    /// Health multiplier.
    pub health_multiplier: f32,
    /// Melee damage multiplier.
    pub damage_multiplier: f32,
    /// Speed multiplier.
    pub speed_multiplier: f32,
    /// Experience reward multiplier.
    pub xp_multiplier: f32,
    /// Attack cooldown in milliseconds.
    pub attack_cooldown_ms: u64,
    /// Edge-to-edge distance the boss keeps from the player while chasing.
    pub gap: f32,
    /// How far the swipe extends beyond the body on the left and right.
    pub reach_horizontal: f32,
    /// How far the swipe extends beyond the body on the top and bottom.
    pub reach_vertical: f32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            size_multiplier: 1.5,
            health_multiplier: 4.0,
            damage_multiplier: 2.0,
            speed_multiplier: 0.75,
            xp_multiplier: 3.0,
            attack_cooldown_ms: 1_200,
            gap: 10.0,
            reach_horizontal: 30.0,
            reach_vertical: 10.0,
        }
    }
}

/// Enemy parameters for every variant.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Melee chaser.
    pub melee: EnemyStats,
    /// Ranged shooter; also strikes in melee when adjacent.
    pub ranged: EnemyStats,
    /// Boss multipliers relative to `melee`.
    pub boss: BossTuning,
    /// Minimum time between ranged shots in milliseconds.
    pub shoot_cooldown_ms: u64,
    /// Enemy bolt flight parameters.
    pub bolt: ProjectileTuning,
    /// How long the damage flash stays visible, in milliseconds.
    pub flash_ms: u64,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            melee: EnemyStats::default(),
            ranged: EnemyStats {
                health: 40.0,
                speed: 1.5,
                melee_damage: 5.0,
                xp_reward: 60.0,
                ..EnemyStats::default()
            },
            boss: BossTuning::default(),
            shoot_cooldown_ms: 2_000,
            bolt: ProjectileTuning {
                speed: 4.0,
                size: 10.0,
                damage: 10.0,
            },
            flash_ms: 150,
        }
    }
}

impl EnemyTuning {
    /// Resolves the statistics for the provided variant.
    #[must_use]
    pub fn stats(&self, kind: EnemyKind) -> EnemyStats {
        match kind {
            EnemyKind::Melee => self.melee.clone(),
            EnemyKind::Ranged => self.ranged.clone(),
            EnemyKind::Boss => EnemyStats {
                size: self.melee.size * self.boss.size_multiplier,
                health: self.melee.health * self.boss.health_multiplier,
                speed: self.melee.speed * self.boss.speed_multiplier,
                melee_range: self.melee.melee_range,
                melee_damage: self.melee.melee_damage * self.boss.damage_multiplier,
                attack_cooldown_ms: self.boss.attack_cooldown_ms,
                xp_reward: self.melee.xp_reward * self.boss.xp_multiplier,
            },
        }
    }

    /// Ranged shot cooldown as a duration.
    #[must_use]
    pub fn shoot_cooldown(&self) -> Duration {
        Duration::from_millis(self.shoot_cooldown_ms)
    }

    /// Damage flash duration.
    #[must_use]
    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }
}

/// Ability-point prices for each purchase.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct UnlockCosts {
    /// Unlocks the fireball.
    pub fireball: u32,
    /// Unlocks the lightning strike.
    pub lightning_strike: u32,
    /// Unlocks the teleport attack.
    pub teleport_attack: u32,
    /// Raises maximum health once.
    pub max_health: u32,
    /// Raises maximum mana once.
    pub max_mana: u32,
}

impl Default for UnlockCosts {
    fn default() -> Self {
        Self {
            fireball: 3,
            lightning_strike: 5,
            teleport_attack: 4,
            max_health: 1,
            max_mana: 1,
        }
    }
}

impl UnlockCosts {
    /// Price of the provided purchase in ability points.
    #[must_use]
    pub const fn cost(&self, purchase: Purchase) -> u32 {
        match purchase {
            Purchase::Fireball => self.fireball,
            Purchase::LightningStrike => self.lightning_strike,
            Purchase::TeleportAttack => self.teleport_attack,
            Purchase::MaxHealth => self.max_health,
            Purchase::MaxMana => self.max_mana,
        }
    }
}

/// Experience curve and ability-point economy.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProgressionTuning {
    /// Experience required to reach level 2.
    pub base_xp_to_next: f32,
    /// Factor applied to the threshold after every level up.
    pub xp_growth: f32,
    /// Ability points granted per level gained.
    pub points_per_level: u32,
    /// Maximum health added by one health purchase.
    pub health_per_upgrade: f32,
    /// Maximum mana added by one mana purchase.
    pub mana_per_upgrade: f32,
    /// Purchase prices.
    pub costs: UnlockCosts,
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self {
            base_xp_to_next: 100.0,
            xp_growth: 1.5,
            points_per_level: 3,
            health_per_upgrade: 20.0,
            mana_per_upgrade: 10.0,
            costs: UnlockCosts::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boss_stats_scale_from_melee_variant() {
        let tuning = EnemyTuning::default();
        let boss = tuning.stats(EnemyKind::Boss);

        assert!((boss.size - 45.0).abs() < f32::EPSILON);
        assert!((boss.health - 200.0).abs() < f32::EPSILON);
        assert!((boss.melee_damage - 20.0).abs() < f32::EPSILON);
        assert!((boss.xp_reward - 150.0).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_toml_overrides_only_named_values() {
        let tuning: Tuning = toml::from_str(
            r#"
            [player]
            speed = 7.5

            [abilities.lightning]
            damage = 90.0
            "#,
        )
        .expect("partial tuning parses");

        assert!((tuning.player.speed - 7.5).abs() < f32::EPSILON);
        assert!((tuning.player.max_health - 100.0).abs() < f32::EPSILON);
        assert!((tuning.abilities.lightning.damage - 90.0).abs() < f32::EPSILON);
        assert_eq!(tuning.abilities.lightning.cooldown_ms, 4_000);
        assert_eq!(tuning.enemies, EnemyTuning::default());
    }

    #[test]
    fn unlock_costs_follow_the_table() {
        let costs = UnlockCosts::default();

        assert_eq!(costs.cost(Purchase::Fireball), 3);
        assert_eq!(costs.cost(Purchase::LightningStrike), 5);
        assert_eq!(costs.cost(Purchase::TeleportAttack), 4);
        assert_eq!(costs.cost(Purchase::MaxHealth), 1);
    }
}
