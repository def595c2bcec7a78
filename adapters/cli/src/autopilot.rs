//! Deterministic input source that plays without a keyboard.
//!
//! The autopilot chases the nearest enemy, swings when adjacent, fires along
//! its aim when roughly facing the target and spends ability points as soon
//! as the next item on its shopping list is affordable.

use dungeon_crawler_core::{
    ControlMode, Direction, EnemyView, PlayerSnapshot, Purchase, Reticle, UnlockCosts,
};
use dungeon_crawler_simulation::{InputAction, InputIntents, MovementKeys};
use glam::Vec2;

const UNLOCK_ORDER: [Purchase; 3] = [
    Purchase::Fireball,
    Purchase::TeleportAttack,
    Purchase::LightningStrike,
];
const MELEE_RANGE: f32 = 60.0;
const STANDOFF: f32 = 40.0;
const SHOOTING_RANGE: f32 = 320.0;
const LUNGE_RANGE: f32 = 140.0;
const FACING: f32 = 0.9;
const DEADZONE: f32 = 4.0;
const CROWD_RADIUS: f32 = 160.0;
const CROWD_SIZE: usize = 3;
const MAX_AIM_FRAMES: u32 = 24;

/// Everything the autopilot looks at before choosing a frame's input.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Observation<'a> {
    pub(crate) player: Option<&'a PlayerSnapshot>,
    pub(crate) enemies: &'a EnemyView,
    pub(crate) control_mode: ControlMode,
    pub(crate) reticle: Option<Reticle>,
    pub(crate) inventory_open: bool,
    pub(crate) costs: &'a UnlockCosts,
    pub(crate) tile_length: f32,
}

#[derive(Debug, Default)]
pub(crate) struct Autopilot {
    aiming_frames: u32,
}

impl Autopilot {
    pub(crate) fn decide(&mut self, seen: &Observation<'_>) -> InputIntents {
        if seen.inventory_open {
            return InputIntents::default().with_action(InputAction::InventoryToggle);
        }
        let Some(player) = seen.player.filter(|player| !player.is_dead) else {
            return InputIntents::default();
        };
        if let Some(purchase) = next_purchase(player, seen.costs) {
            return InputIntents::default()
                .with_action(InputAction::InventoryToggle)
                .with_action(InputAction::Purchase(purchase));
        }

        let center = player.center();
        let Some(target) = nearest_enemy(seen.enemies, center) else {
            self.aiming_frames = 0;
            return InputIntents::default();
        };

        if seen.control_mode == ControlMode::LightningAim {
            self.aiming_frames += 1;
            return self.steer_reticle(seen.reticle, target, seen.tile_length);
        }
        self.aiming_frames = 0;

        let offset = target - center;
        let distance = offset.length();
        let facing = player.aim.dot(offset.normalize_or_zero()) >= FACING;
        let mut input = InputIntents::moving(approach(offset));

        if distance <= MELEE_RANGE {
            input = input.with_action(InputAction::Melee);
        }
        if facing && distance <= SHOOTING_RANGE {
            input = input.with_action(InputAction::Ranged);
            if player.unlocks.fireball {
                input = input.with_action(InputAction::Fireball);
            }
        }
        if facing && player.unlocks.teleport_attack && distance <= LUNGE_RANGE {
            input = input.with_action(InputAction::TeleportAttack);
        }
        if player.unlocks.lightning_strike && crowd(seen.enemies, center) >= CROWD_SIZE {
            input = input.with_action(InputAction::LightningStart);
        }
        input
    }

    fn steer_reticle(
        &self,
        reticle: Option<Reticle>,
        target: Vec2,
        tile_length: f32,
    ) -> InputIntents {
        let confirm = InputIntents::default().with_action(InputAction::Confirm);
        let Some(reticle) = reticle else {
            return confirm;
        };
        let delta = target - reticle.center;
        let settled = delta.abs().max_element() <= tile_length / 2.0;
        if settled || self.aiming_frames >= MAX_AIM_FRAMES {
            return confirm;
        }

        let direction = if delta.x.abs() >= delta.y.abs() {
            if delta.x > 0.0 {
                Direction::East
            } else {
                Direction::West
            }
        } else if delta.y > 0.0 {
            Direction::South
        } else {
            Direction::North
        };
        InputIntents::default().with_action(InputAction::LightningMove(direction))
    }
}

/// Next item worth buying, if the player can afford it right now.
///
/// Unlocks are bought in a fixed order; once all are owned the smaller of
/// the two stat pools is raised.
fn next_purchase(player: &PlayerSnapshot, costs: &UnlockCosts) -> Option<Purchase> {
    let wanted = UNLOCK_ORDER
        .into_iter()
        .find(|purchase| !player.unlocks.owns(*purchase))
        .unwrap_or(if player.max_health <= player.max_mana {
            Purchase::MaxHealth
        } else {
            Purchase::MaxMana
        });
    (costs.cost(wanted) <= player.ability_points && player.ability_points > 0).then_some(wanted)
}

fn nearest_enemy(enemies: &EnemyView, from: Vec2) -> Option<Vec2> {
    enemies
        .iter()
        .map(|enemy| enemy.center())
        .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
}

fn crowd(enemies: &EnemyView, around: Vec2) -> usize {
    enemies
        .iter()
        .filter(|enemy| enemy.center().distance(around) <= CROWD_RADIUS)
        .count()
}

fn approach(offset: Vec2) -> MovementKeys {
    if offset.length() <= STANDOFF {
        return MovementKeys::default();
    }
    MovementKeys {
        up: offset.y < -DEADZONE,
        down: offset.y > DEADZONE,
        left: offset.x < -DEADZONE,
        right: offset.x > DEADZONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_crawler_core::{EnemyId, EnemyKind, EnemyReach, EnemySnapshot, Unlocks};

    fn player(points: u32, unlocks: Unlocks) -> PlayerSnapshot {
        PlayerSnapshot {
            position: Vec2::new(100.0, 100.0),
            size: 30.0,
            health: 100.0,
            max_health: 100.0,
            mana: 50.0,
            max_mana: 50.0,
            xp: 0.0,
            xp_to_next: 100.0,
            level: 1,
            ability_points: points,
            unlocks,
            aim: Vec2::X,
            is_dead: false,
        }
    }

    fn enemy(id: u32, position: Vec2) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Melee,
            position,
            size: 30.0,
            health: 50.0,
            max_health: 50.0,
            speed: 2.0,
            reach: EnemyReach::Radius(40.0),
            strike_ready: true,
            shot_ready: false,
            flashing: false,
        }
    }

    fn observe<'a>(
        player: &'a PlayerSnapshot,
        enemies: &'a EnemyView,
        costs: &'a UnlockCosts,
    ) -> Observation<'a> {
        Observation {
            player: Some(player),
            enemies,
            control_mode: ControlMode::Normal,
            reticle: None,
            inventory_open: false,
            costs,
            tile_length: 40.0,
        }
    }

    #[test]
    fn saves_points_for_the_next_unlock() {
        let costs = UnlockCosts::default();

        assert_eq!(next_purchase(&player(1, Unlocks::default()), &costs), None);
        assert_eq!(
            next_purchase(&player(3, Unlocks::default()), &costs),
            Some(Purchase::Fireball)
        );
    }

    #[test]
    fn raises_stats_once_everything_is_unlocked() {
        let everything = Unlocks {
            fireball: true,
            lightning_strike: true,
            teleport_attack: true,
        };
        let mut snapshot = player(1, everything);
        snapshot.max_mana = 80.0;

        assert_eq!(
            next_purchase(&snapshot, &UnlockCosts::default()),
            Some(Purchase::MaxMana)
        );
    }

    #[test]
    fn shopping_opens_the_inventory_and_the_next_frame_closes_it() {
        let costs = UnlockCosts::default();
        let enemies = EnemyView::default();
        let snapshot = player(3, Unlocks::default());
        let mut autopilot = Autopilot::default();

        let shopping = autopilot.decide(&observe(&snapshot, &enemies, &costs));
        assert_eq!(
            shopping.actions,
            vec![
                InputAction::InventoryToggle,
                InputAction::Purchase(Purchase::Fireball)
            ]
        );

        let mut open = observe(&snapshot, &enemies, &costs);
        open.inventory_open = true;
        assert_eq!(
            autopilot.decide(&open).actions,
            vec![InputAction::InventoryToggle]
        );
    }

    #[test]
    fn chases_and_swings_at_the_nearest_enemy() {
        let costs = UnlockCosts::default();
        let snapshot = player(0, Unlocks::default());
        let enemies = EnemyView::from_snapshots(vec![
            enemy(0, Vec2::new(400.0, 400.0)),
            enemy(1, Vec2::new(150.0, 100.0)),
        ]);

        let input = Autopilot::default().decide(&observe(&snapshot, &enemies, &costs));

        assert!(input.movement.right);
        assert!(!input.movement.left && !input.movement.up && !input.movement.down);
        assert!(input.actions.contains(&InputAction::Melee));
        assert!(input.actions.contains(&InputAction::Ranged));
    }

    #[test]
    fn holds_fire_when_facing_away() {
        let costs = UnlockCosts::default();
        let snapshot = player(0, Unlocks::default());
        let enemies = EnemyView::from_snapshots(vec![enemy(0, Vec2::new(-100.0, 100.0))]);

        let input = Autopilot::default().decide(&observe(&snapshot, &enemies, &costs));

        assert!(input.movement.left);
        assert!(!input.actions.contains(&InputAction::Ranged));
    }

    #[test]
    fn steers_the_reticle_then_confirms() {
        let costs = UnlockCosts::default();
        let snapshot = player(0, Unlocks::default());
        let enemies = EnemyView::from_snapshots(vec![enemy(0, Vec2::new(285.0, 85.0))]);
        let mut seen = observe(&snapshot, &enemies, &costs);
        seen.control_mode = ControlMode::LightningAim;
        seen.reticle = Some(Reticle {
            center: Vec2::new(200.0, 100.0),
            radius: 80.0,
        });
        let mut autopilot = Autopilot::default();

        assert_eq!(
            autopilot.decide(&seen).actions,
            vec![InputAction::LightningMove(Direction::East)]
        );

        seen.reticle = Some(Reticle {
            center: Vec2::new(290.0, 100.0),
            radius: 80.0,
        });
        assert_eq!(autopilot.decide(&seen).actions, vec![InputAction::Confirm]);
    }

    #[test]
    fn stalled_aiming_eventually_confirms() {
        let costs = UnlockCosts::default();
        let snapshot = player(0, Unlocks::default());
        let enemies = EnemyView::from_snapshots(vec![enemy(0, Vec2::new(900.0, 100.0))]);
        let mut seen = observe(&snapshot, &enemies, &costs);
        seen.control_mode = ControlMode::LightningAim;
        seen.reticle = Some(Reticle {
            center: Vec2::new(200.0, 100.0),
            radius: 80.0,
        });
        let mut autopilot = Autopilot::default();

        let last = (0..MAX_AIM_FRAMES)
            .map(|_| autopilot.decide(&seen))
            .last()
            .expect("at least one frame");

        assert_eq!(last.actions, vec![InputAction::Confirm]);
    }

    #[test]
    fn dead_players_send_nothing() {
        let costs = UnlockCosts::default();
        let mut snapshot = player(5, Unlocks::default());
        snapshot.is_dead = true;
        let enemies = EnemyView::from_snapshots(vec![enemy(0, Vec2::new(150.0, 100.0))]);

        let input = Autopilot::default().decide(&observe(&snapshot, &enemies, &costs));

        assert_eq!(input, InputIntents::default());
    }
}
