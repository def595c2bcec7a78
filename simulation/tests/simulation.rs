use std::time::Duration;

use dungeon_crawler_core::{
    Clock, Command, ControlMode, Direction, EnemyKind, Event, GenerationError, Purchase, Tuning,
};
use dungeon_crawler_simulation::{
    FixedStepClock, InputAction, InputIntents, MovementKeys, Simulation, SimulationConfig,
};
use dungeon_crawler_system_rounds::RoundPhase;
use dungeon_crawler_world::query;
use glam::Vec2;

const FRAME: Duration = Duration::from_millis(16);

fn config(tuning: Tuning) -> SimulationConfig {
    SimulationConfig {
        seed: 0xd00d,
        tuning,
        ..SimulationConfig::default()
    }
}

fn player_position(simulation: &Simulation) -> Vec2 {
    query::player(simulation.world())
        .expect("player spawned")
        .position
}

fn press(action: InputAction) -> InputIntents {
    InputIntents::default().with_action(action)
}

#[test]
fn undersized_maps_are_rejected() {
    let error = Simulation::new(SimulationConfig {
        columns: 9,
        ..SimulationConfig::default()
    })
    .expect_err("too narrow");

    assert_eq!(
        error,
        GenerationError::InvalidGenerationBounds {
            columns: 9,
            rows: 24,
            minimum: 10,
        }
    );
}

#[test]
fn first_frame_starts_round_one() {
    let mut simulation = Simulation::new(config(Tuning::default())).expect("valid config");

    let events = simulation.update(FRAME, &InputIntents::default());

    assert_eq!(events[0], Event::TimeAdvanced { dt: FRAME });
    assert!(events.contains(&Event::RoundStarted { round: 1 }));
    assert!((4..=5).contains(&query::enemy_count(simulation.world())));
    assert_eq!(simulation.phase(), RoundPhase::Active { round: 1 });
}

#[test]
fn player_spawns_centred_in_the_spawn_tile() {
    let simulation = Simulation::new(config(Tuning::default())).expect("valid config");
    let dungeon = query::dungeon(simulation.world());

    let position = player_position(&simulation);
    let tile = dungeon.tile_at(position).expect("inside the map");

    assert!(dungeon.is_open(tile));
    assert_eq!(position, dungeon.tile_origin(tile) + Vec2::splat(5.0));
}

#[test]
fn long_frames_are_clamped() {
    let mut simulation = Simulation::new(config(Tuning::default())).expect("valid config");

    let _ = simulation.update(Duration::from_secs(3), &InputIntents::default());

    assert_eq!(query::now(simulation.world()), Duration::from_millis(250));
}

#[test]
fn advance_uses_the_clock_delta() {
    let mut simulation = Simulation::new(config(Tuning::default())).expect("valid config");
    let mut clock = FixedStepClock::new(FRAME);

    let _ = simulation.advance(&clock, &InputIntents::default());
    clock.tick();
    clock.tick();
    let _ = simulation.advance(&clock, &InputIntents::default());

    assert_eq!(clock.now(), Duration::from_millis(32));
    assert_eq!(query::now(simulation.world()), Duration::from_millis(32));
}

#[test]
fn open_inventory_pauses_play_but_allows_purchases() {
    let mut tuning = Tuning::default();
    tuning.progression.costs.fireball = 0;
    let mut simulation = Simulation::new(config(tuning)).expect("valid config");

    let events = simulation.update(
        FRAME,
        &press(InputAction::InventoryToggle).with_action(InputAction::Purchase(Purchase::Fireball)),
    );

    assert!(simulation.inventory_open());
    assert_eq!(
        events,
        vec![Event::Purchased {
            purchase: Purchase::Fireball,
            remaining_points: 0,
        }]
    );
    assert_eq!(query::now(simulation.world()), Duration::ZERO);

    let paused = simulation.update(FRAME, &press(InputAction::Melee));
    assert!(paused.is_empty());

    let resumed = simulation.update(FRAME, &press(InputAction::InventoryToggle));
    assert!(!simulation.inventory_open());
    assert!(resumed.contains(&Event::TimeAdvanced { dt: FRAME }));
}

#[test]
fn purchases_outside_the_inventory_are_ignored() {
    let mut tuning = Tuning::default();
    tuning.progression.costs.fireball = 0;
    let mut simulation = Simulation::new(config(tuning)).expect("valid config");

    let _ = simulation.update(FRAME, &press(InputAction::Purchase(Purchase::Fireball)));

    assert!(!query::player(simulation.world())
        .expect("player")
        .unlocks
        .fireball);
}

#[test]
fn fullscreen_toggle_is_inert() {
    let mut simulation = Simulation::new(config(Tuning::default())).expect("valid config");

    let events = simulation.update(FRAME, &press(InputAction::FullscreenToggle));

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ActionRejected { .. })));
    assert!(!simulation.inventory_open());
}

#[test]
fn lightning_aim_freezes_movement() {
    let mut tuning = Tuning::default();
    tuning.progression.costs.lightning_strike = 0;
    let mut simulation = Simulation::new(config(tuning)).expect("valid config");
    let _ = simulation.update(
        FRAME,
        &press(InputAction::InventoryToggle)
            .with_action(InputAction::Purchase(Purchase::LightningStrike)),
    );
    let _ = simulation.update(FRAME, &press(InputAction::InventoryToggle));

    let started = simulation.update(FRAME, &press(InputAction::LightningStart));
    assert!(started.contains(&Event::ControlModeChanged {
        mode: ControlMode::LightningAim,
    }));
    let start = player_position(&simulation);
    let reticle = query::reticle(simulation.world()).expect("aiming");

    let held = MovementKeys {
        right: true,
        ..MovementKeys::default()
    };
    let _ = simulation.update(
        FRAME,
        &InputIntents::moving(held)
            .with_action(InputAction::Melee)
            .with_action(InputAction::LightningMove(Direction::East)),
    );

    assert_eq!(player_position(&simulation), start);
    let moved = query::reticle(simulation.world()).expect("still aiming");
    assert_eq!(moved.center, reticle.center + Vec2::new(40.0, 0.0));

    let confirmed = simulation.update(FRAME, &press(InputAction::Confirm));
    assert!(confirmed.iter().any(|event| matches!(event, Event::LightningStruck { .. })));
    assert_eq!(query::control_mode(simulation.world()), ControlMode::Normal);
}

#[test]
fn movement_keys_move_the_player() {
    let mut simulation = Simulation::new(config(Tuning::default())).expect("valid config");
    let start = player_position(&simulation);
    let held = MovementKeys {
        left: true,
        ..MovementKeys::default()
    };

    let events = simulation.update(FRAME, &InputIntents::moving(held));

    let moved = events.iter().any(|event| matches!(event, Event::PlayerMoved { .. }));
    let blocked = events.iter().any(|event| matches!(event, Event::ActionRejected { .. }));
    assert!(moved || blocked);
    if moved {
        assert_eq!(player_position(&simulation), start - Vec2::new(5.0, 0.0));
    } else {
        assert_eq!(player_position(&simulation), start);
    }
    assert_eq!(query::player(simulation.world()).expect("player").aim, -Vec2::X);
}

#[test]
fn player_death_ends_the_run_until_restart() {
    let mut tuning = Tuning::default();
    tuning.enemies.melee.melee_damage = 1_000.0;
    let mut simulation = Simulation::new(config(tuning)).expect("valid config");
    let first_seed = simulation.dungeon_seed();
    let start = player_position(&simulation);

    let staged = simulation.submit_command(Command::SpawnEnemy {
        kind: EnemyKind::Melee,
        position: start + Vec2::new(35.0, 0.0),
    });
    assert!(matches!(staged.as_slice(), [Event::EnemySpawned { .. }]));

    let fatal = simulation.update(FRAME, &InputIntents::default());
    assert!(fatal.contains(&Event::PlayerDied));
    assert_eq!(simulation.phase(), RoundPhase::GameOver { round: 1 });

    let frozen = simulation.update(FRAME, &press(InputAction::Melee));
    assert!(frozen.is_empty());

    let restarted = simulation.restart().expect("valid config");
    assert!(restarted
        .iter()
        .any(|event| matches!(event, Event::DungeonLoaded { .. })));
    assert!(restarted
        .iter()
        .any(|event| matches!(event, Event::PlayerSpawned { .. })));
    assert_ne!(simulation.dungeon_seed(), first_seed);
    assert_eq!(simulation.phase(), RoundPhase::Spawning { round: 1 });
    assert!(!query::player(simulation.world()).expect("player").is_dead);

    let events = simulation.update(FRAME, &InputIntents::default());
    assert!(events.contains(&Event::RoundStarted { round: 1 }));
}
