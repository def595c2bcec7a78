use std::time::Duration;

use dungeon_crawler_core::{Command, Direction, Dungeon, EnemyId, EnemyKind, Event, Tuning};
use dungeon_crawler_system_enemy_ai::{Config, EnemyAi};
use dungeon_crawler_world::{self as world, query, World};
use glam::Vec2;

const TICK: Duration = Duration::from_millis(16);

fn arena(enemies: &[(EnemyKind, Vec2)]) -> (World, Vec<EnemyId>) {
    let mut world = World::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LoadDungeon {
            dungeon: Dungeon::open(20, 15, 40.0),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnPlayer {
            position: Vec2::new(100.0, 100.0),
        },
        &mut events,
    );

    let mut ids = Vec::new();
    for (kind, position) in enemies {
        events.clear();
        world::apply(
            &mut world,
            Command::SpawnEnemy {
                kind: *kind,
                position: *position,
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::EnemySpawned { enemy, .. }] => ids.push(*enemy),
            other => panic!("unexpected spawn outcome: {other:?}"),
        }
    }
    (world, ids)
}

fn boss_ai() -> EnemyAi {
    EnemyAi::new(Config::new(Tuning::default().enemies.boss.gap))
}

fn plan(world: &World, ai: &EnemyAi, events: &[Event]) -> Vec<Command> {
    let mut commands = Vec::new();
    ai.handle(
        events,
        query::player(world).as_ref(),
        &query::enemy_view(world),
        &mut commands,
    );
    commands
}

fn tick_events() -> Vec<Event> {
    vec![Event::TimeAdvanced { dt: TICK }]
}

#[test]
fn enemies_idle_without_elapsed_time() {
    let (world, _) = arena(&[(EnemyKind::Melee, Vec2::new(300.0, 100.0))]);

    assert!(plan(&world, &boss_ai(), &[]).is_empty());
}

#[test]
fn melee_enemy_chases_along_the_longer_axis() {
    let (world, ids) = arena(&[
        (EnemyKind::Melee, Vec2::new(300.0, 110.0)),
        (EnemyKind::Melee, Vec2::new(110.0, 400.0)),
    ]);

    let commands = plan(&world, &boss_ai(), &tick_events());

    assert_eq!(
        commands,
        vec![
            Command::StepEnemy {
                enemy: ids[0],
                direction: Direction::West,
                distance: 2.0,
            },
            Command::StepEnemy {
                enemy: ids[1],
                direction: Direction::North,
                distance: 2.0,
            },
        ]
    );
}

#[test]
fn melee_enemy_strikes_within_range() {
    let (world, ids) = arena(&[(EnemyKind::Melee, Vec2::new(140.0, 100.0))]);

    let commands = plan(&world, &boss_ai(), &tick_events());

    assert_eq!(
        commands,
        vec![
            Command::StepEnemy {
                enemy: ids[0],
                direction: Direction::West,
                distance: 2.0,
            },
            Command::EnemyStrike { enemy: ids[0] },
        ]
    );
}

#[test]
fn ranged_enemy_shoots_when_ready() {
    let (mut world, ids) = arena(&[(EnemyKind::Ranged, Vec2::new(400.0, 100.0))]);

    let commands = plan(&world, &boss_ai(), &tick_events());
    assert!(commands.contains(&Command::EnemyShoot { enemy: ids[0] }));

    let mut events = Vec::new();
    world::apply(&mut world, Command::EnemyShoot { enemy: ids[0] }, &mut events);
    let commands = plan(&world, &boss_ai(), &tick_events());
    assert!(!commands.contains(&Command::EnemyShoot { enemy: ids[0] }));
}

#[test]
fn boss_stops_short_of_the_player() {
    let (world, ids) = arena(&[(EnemyKind::Boss, Vec2::new(141.0, 100.0))]);

    let commands = plan(&world, &boss_ai(), &tick_events());

    assert_eq!(
        commands[0],
        Command::StepEnemy {
            enemy: ids[0],
            direction: Direction::West,
            distance: 1.0,
        }
    );
    assert!(commands.contains(&Command::EnemyStrike { enemy: ids[0] }));
}

#[test]
fn boss_lines_up_once_the_gap_is_reached() {
    let (world, ids) = arena(&[(EnemyKind::Boss, Vec2::new(140.0, 110.0))]);

    let commands = plan(&world, &boss_ai(), &tick_events());

    assert_eq!(
        commands[0],
        Command::StepEnemy {
            enemy: ids[0],
            direction: Direction::North,
            distance: 1.5,
        }
    );
}

#[test]
fn dead_player_freezes_enemies() {
    let mut tuning = Tuning::default();
    tuning.enemies.melee.melee_damage = 500.0;
    let mut world = World::new(tuning);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LoadDungeon {
            dungeon: Dungeon::open(20, 15, 40.0),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnPlayer {
            position: Vec2::new(100.0, 100.0),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Melee,
            position: Vec2::new(140.0, 100.0),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::EnemyStrike {
            enemy: EnemyId::new(0),
        },
        &mut events,
    );
    assert!(events.contains(&Event::PlayerDied));

    assert!(plan(&world, &boss_ai(), &tick_events()).is_empty());
}

#[test]
fn chasing_enemy_eventually_hurts_the_player() {
    let (mut world, _) = arena(&[(EnemyKind::Melee, Vec2::new(400.0, 100.0))]);
    let ai = boss_ai();

    let mut damaged = false;
    for _ in 0..200 {
        let mut events = Vec::new();
        world::apply(&mut world, Command::Tick { dt: TICK }, &mut events);
        for command in plan(&world, &ai, &events) {
            world::apply(&mut world, command, &mut events);
        }
        if events
            .iter()
            .any(|event| matches!(event, Event::PlayerDamaged { .. }))
        {
            damaged = true;
            break;
        }
    }

    assert!(damaged);
    let enemy = query::enemy_view(&world).into_vec().remove(0);
    assert!(!enemy.rect().overlaps(&query::player(&world).expect("player").rect()));
}
