//! Damage resolution: player abilities, enemy attacks, projectiles and the
//! experience they award.

use dungeon_crawler_core::{
    ActionError, ControlMode, DenialReason, Direction, EnemyId, Event, ExpireCause, ProjectileId,
    ProjectileKind, Purchase, Rect, Reticle, Side,
};
use glam::Vec2;

use crate::{
    clock::cooldown_elapsed,
    enemies::PendingShot,
    living,
    player::Player,
    projectiles::{Projectile, ProjectileRegistry},
    World,
};

impl World {
    /// Swings the melee hitbox, one player-size square in front of the player.
    pub(crate) fn melee_attack(&mut self, out_events: &mut Vec<Event>) -> Result<(), ActionError> {
        self.check_control(ControlMode::Normal)?;
        let now = self.now();
        let melee = &self.tuning.abilities.melee;
        let (cooldown, damage) = (melee.cooldown(), melee.damage);

        let player = living(&mut self.player)?;
        if !cooldown_elapsed(player.timers.melee, cooldown, now) {
            return Err(DenialReason::Cooldown.into());
        }
        player.timers.melee = Some(now);

        let hitbox = Rect::from_center(
            player.center() + player.aim * player.size,
            Vec2::splat(player.size),
        );
        out_events.push(Event::MeleeSwung { hitbox });

        let targets: Vec<EnemyId> = self
            .enemies
            .iter()
            .filter(|enemy| enemy.rect().overlaps(&hitbox))
            .map(|enemy| enemy.id)
            .collect();
        for enemy in targets {
            let _ = self.damage_enemy(enemy, damage, out_events);
        }
        Ok(())
    }

    /// Launches a bolt from the player's centre.
    pub(crate) fn fire_bolt(&mut self, out_events: &mut Vec<Event>) -> Result<(), ActionError> {
        self.check_control(ControlMode::Normal)?;
        let now = self.now();
        let bolt = &self.tuning.abilities.bolt;

        let player = living(&mut self.player)?;
        if !cooldown_elapsed(player.timers.ranged, bolt.cooldown(), now) {
            return Err(DenialReason::Cooldown.into());
        }
        player.spend_mana(bolt.mana_cost)?;
        player.timers.ranged = Some(now);

        let projectile = self.projectiles.launch(
            ProjectileKind::Bolt,
            player.center(),
            player.aim,
            &bolt.projectile,
        );
        out_events.push(launched(projectile));
        Ok(())
    }

    /// Launches a fireball one player size ahead of the player's centre.
    pub(crate) fn cast_fireball(&mut self, out_events: &mut Vec<Event>) -> Result<(), ActionError> {
        self.check_control(ControlMode::Normal)?;
        let now = self.now();
        let fireball = &self.tuning.abilities.fireball;

        let player = living(&mut self.player)?;
        if !player.unlocks.fireball {
            return Err(DenialReason::Locked.into());
        }
        if !cooldown_elapsed(player.timers.ranged, fireball.cooldown(), now) {
            return Err(DenialReason::Cooldown.into());
        }
        player.spend_mana(fireball.mana_cost)?;
        player.timers.ranged = Some(now);

        let projectile = self.projectiles.launch(
            ProjectileKind::Fireball,
            player.center() + player.aim * player.size,
            player.aim,
            &fireball.projectile,
        );
        out_events.push(launched(projectile));
        Ok(())
    }

    /// Spends the lightning mana and freezes control while the reticle is aimed.
    pub(crate) fn begin_lightning(
        &mut self,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        self.check_control(ControlMode::Normal)?;
        let now = self.now();
        let lightning = &self.tuning.abilities.lightning;
        let bounds = self.dungeon.bounds();

        let player = living(&mut self.player)?;
        if !player.unlocks.lightning_strike {
            return Err(DenialReason::Locked.into());
        }
        if !cooldown_elapsed(player.timers.lightning, lightning.cooldown(), now) {
            return Err(DenialReason::Cooldown.into());
        }
        player.spend_mana(lightning.mana_cost)?;
        player.timers.lightning = Some(now);

        let center = clamp_reticle(player.center(), lightning.radius, &bounds);
        self.reticle = Some(Reticle {
            center,
            radius: lightning.radius,
        });
        self.control_mode = ControlMode::LightningAim;
        out_events.push(Event::ControlModeChanged {
            mode: ControlMode::LightningAim,
        });
        out_events.push(Event::ReticleMoved { center });
        Ok(())
    }

    /// Steps the reticle one tile, keeping the whole strike area on the map.
    pub(crate) fn move_reticle(
        &mut self,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        self.check_control(ControlMode::LightningAim)?;
        let step = self.dungeon.tile_length();
        let bounds = self.dungeon.bounds();
        let Some(reticle) = self.reticle.as_mut() else {
            return Err(DenialReason::WrongMode.into());
        };

        reticle.center = clamp_reticle(
            reticle.center + direction.unit() * step,
            reticle.radius,
            &bounds,
        );
        out_events.push(Event::ReticleMoved {
            center: reticle.center,
        });
        Ok(())
    }

    /// Strikes every enemy whose centre lies inside the reticle and restores
    /// normal control.
    pub(crate) fn confirm_lightning(
        &mut self,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        self.check_control(ControlMode::LightningAim)?;
        let Some(reticle) = self.reticle.take() else {
            return Err(DenialReason::WrongMode.into());
        };
        let damage = self.tuning.abilities.lightning.damage;

        let targets: Vec<EnemyId> = self
            .enemies
            .iter()
            .filter(|enemy| enemy.center().distance(reticle.center) <= reticle.radius)
            .map(|enemy| enemy.id)
            .collect();
        out_events.push(Event::LightningStruck {
            center: reticle.center,
            radius: reticle.radius,
        });
        for enemy in targets {
            let _ = self.damage_enemy(enemy, damage, out_events);
        }

        self.control_mode = ControlMode::Normal;
        out_events.push(Event::ControlModeChanged {
            mode: ControlMode::Normal,
        });
        Ok(())
    }

    /// Spends ability points. Allowed in every control mode.
    pub(crate) fn purchase(
        &mut self,
        purchase: Purchase,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let player = living(&mut self.player)?;
        let remaining_points = player.purchase(purchase, &self.tuning.progression)?;
        tracing::info!(?purchase, remaining_points, "ability points spent");
        out_events.push(Event::Purchased {
            purchase,
            remaining_points,
        });
        Ok(())
    }

    /// Lands an enemy's melee strike when its cooldown has elapsed and the
    /// player is within reach. Anything else is ignored.
    pub(crate) fn enemy_strike(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        let now = self.now();
        let Some(player) = self.player.as_ref().filter(|player| !player.is_dead()) else {
            return;
        };
        let target = player.rect();
        let Some(state) = self.enemies.get_mut(enemy) else {
            return;
        };
        if !state.strike_ready(now) || !state.reach().reaches(&state.rect(), &target) {
            return;
        }

        state.record_strike(now);
        let damage = state.stats.melee_damage;
        out_events.push(Event::EnemyStruck { enemy });
        self.damage_player(damage, out_events);
    }

    /// Queues a bolt aimed at the player's current centre.
    pub(crate) fn enemy_shoot(&mut self, enemy: EnemyId) {
        let now = self.now();
        let Some(target) = self
            .player
            .as_ref()
            .filter(|player| !player.is_dead())
            .map(Player::center)
        else {
            return;
        };
        let Some(state) = self.enemies.get_mut(enemy) else {
            return;
        };
        if !state.shot_ready(now) {
            return;
        }

        let origin = state.center();
        let direction = (target - origin).normalize_or_zero();
        if direction == Vec2::ZERO {
            return;
        }
        state.queue_shot(PendingShot { origin, direction }, now);
    }

    /// Moves every player projectile one step and resolves its collisions.
    ///
    /// Enemy hits resolve before wall contact so an enemy pressed against a
    /// wall is still struck.
    pub(crate) fn advance_player_projectiles(&mut self, out_events: &mut Vec<Event>) {
        let bounds = self.dungeon.bounds();
        for id in self.projectiles.ids_owned_by(Side::Player) {
            let Some(projectile) = self.projectiles.get_mut(id) else {
                continue;
            };
            projectile.advance();
            let rect = projectile.rect();
            let kind = projectile.kind;
            let damage = projectile.damage;

            let struck: Vec<EnemyId> = self
                .enemies
                .iter()
                .filter(|enemy| !projectile.hits.contains(&enemy.id))
                .filter(|enemy| enemy.rect().overlaps(&rect))
                .map(|enemy| enemy.id)
                .collect();

            if kind == ProjectileKind::Fireball {
                projectile.hits.extend(struck.iter().copied());
                for enemy in struck {
                    let _ = self.damage_enemy(enemy, damage, out_events);
                }
            } else if let Some(enemy) = struck.first().copied() {
                let _ = expire(&mut self.projectiles, id, ExpireCause::HitTarget, out_events);
                let _ = self.damage_enemy(enemy, damage, out_events);
                continue;
            }

            if self.walls.iter().any(|wall| wall.overlaps(&rect)) {
                let expired = expire(&mut self.projectiles, id, ExpireCause::Wall, out_events);
                if let Some(fireball) = expired.filter(|p| p.kind == ProjectileKind::Fireball) {
                    self.explode(&fireball, out_events);
                }
            } else if !bounds.contains_rect(&rect) {
                let _ = expire(&mut self.projectiles, id, ExpireCause::LeftBounds, out_events);
            }
        }
    }

    /// Launches queued enemy bolts, then moves every enemy projectile one step
    /// and resolves hits against the player.
    pub(crate) fn advance_enemy_projectiles(&mut self, out_events: &mut Vec<Event>) {
        let bolt = &self.tuning.enemies.bolt;
        for shot in self.enemies.drain_outboxes() {
            let projectile =
                self.projectiles
                    .launch(ProjectileKind::EnemyBolt, shot.origin, shot.direction, bolt);
            out_events.push(launched(projectile));
        }

        let bounds = self.dungeon.bounds();
        let target = self
            .player
            .as_ref()
            .filter(|player| !player.is_dead())
            .map(Player::rect);
        for id in self.projectiles.ids_owned_by(Side::Enemy) {
            let Some(projectile) = self.projectiles.get_mut(id) else {
                continue;
            };
            projectile.advance();
            let rect = projectile.rect();
            let damage = projectile.damage;

            if target.is_some_and(|player| player.overlaps(&rect)) {
                let _ = expire(&mut self.projectiles, id, ExpireCause::HitTarget, out_events);
                self.damage_player(damage, out_events);
            } else if self.walls.iter().any(|wall| wall.overlaps(&rect)) {
                let _ = expire(&mut self.projectiles, id, ExpireCause::Wall, out_events);
            } else if !bounds.contains_rect(&rect) {
                let _ = expire(&mut self.projectiles, id, ExpireCause::LeftBounds, out_events);
            }
        }
    }

    /// Splash damage for a fireball that reached a wall. Enemies the fireball
    /// already pierced are spared.
    fn explode(&mut self, fireball: &Projectile, out_events: &mut Vec<Event>) {
        let center = fireball.rect().center();
        let splash = &self.tuning.abilities.fireball;
        let (radius, damage) = (splash.splash_radius, splash.splash_damage);

        let targets: Vec<EnemyId> = self
            .enemies
            .iter()
            .filter(|enemy| !fireball.hits.contains(&enemy.id))
            .filter(|enemy| enemy.center().distance(center) <= radius)
            .map(|enemy| enemy.id)
            .collect();
        out_events.push(Event::FireballExploded {
            projectile: fireball.id,
            center,
        });
        for enemy in targets {
            let _ = self.damage_enemy(enemy, damage, out_events);
        }
    }

    /// Damages an enemy; a killing blow removes it and awards experience.
    ///
    /// Returns whether the enemy died.
    pub(crate) fn damage_enemy(
        &mut self,
        enemy: EnemyId,
        amount: f32,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let now = self.now();
        let flash = self.tuning.enemies.flash_duration();
        let Some(state) = self.enemies.get_mut(enemy) else {
            return false;
        };

        let died = state.take_damage(amount, now, flash);
        out_events.push(Event::EnemyDamaged {
            enemy,
            amount,
            remaining: state.health(),
        });
        if !died {
            return false;
        }

        let Some(dead) = self.enemies.remove(enemy) else {
            return false;
        };
        out_events.push(Event::EnemyDied {
            enemy,
            kind: dead.kind,
        });
        self.award_xp(dead.stats.xp_reward, out_events);
        true
    }

    /// Grants kill experience. Dead players earn nothing until respawned.
    fn award_xp(&mut self, amount: f32, out_events: &mut Vec<Event>) {
        let Some(player) = self.player.as_mut().filter(|player| !player.is_dead()) else {
            return;
        };
        let levels = player.gain_xp(amount, &self.tuning.progression);
        out_events.push(Event::XpGained { amount });
        for level in levels {
            tracing::info!(level, "player levelled up");
            out_events.push(Event::LeveledUp { level });
        }
    }

    fn damage_player(&mut self, amount: f32, out_events: &mut Vec<Event>) {
        let Some(player) = self.player.as_mut().filter(|player| !player.is_dead()) else {
            return;
        };
        let died = player.take_damage(amount);
        out_events.push(Event::PlayerDamaged {
            amount,
            remaining: player.health(),
        });
        if died {
            tracing::info!("player died");
            out_events.push(Event::PlayerDied);
        }
    }
}

fn launched(projectile: &Projectile) -> Event {
    Event::ProjectileLaunched {
        projectile: projectile.id,
        kind: projectile.kind,
        position: projectile.position,
        direction: projectile.direction,
    }
}

fn expire(
    projectiles: &mut ProjectileRegistry,
    id: ProjectileId,
    cause: ExpireCause,
    out_events: &mut Vec<Event>,
) -> Option<Projectile> {
    let removed = projectiles.remove(id)?;
    out_events.push(Event::ProjectileExpired {
        projectile: id,
        cause,
    });
    Some(removed)
}

/// Clamps a reticle centre so the strike circle stays inside `bounds`.
fn clamp_reticle(center: Vec2, radius: f32, bounds: &Rect) -> Vec2 {
    let lower = bounds.origin() + Vec2::splat(radius);
    let upper = (bounds.max() - Vec2::splat(radius)).max(lower);
    center.clamp(lower, upper)
}
