use dungeon_crawler_core::{
    BorderMode, Command, Dungeon, EnemyKind, EnemyTuning, EnemyView, Event, Rect, Tuning,
};
use dungeon_crawler_system_dungeon_generation::{generate, Config as GenerationConfig};
use dungeon_crawler_system_rounds::{Config, RoundPhase, Rounds, WaveComposition};
use dungeon_crawler_world::{self as world, query, World};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn world_with_player(dungeon: Dungeon, position: Vec2) -> World {
    let mut world = World::new(Tuning::default());
    let mut events = Vec::new();
    world::apply(&mut world, Command::LoadDungeon { dungeon }, &mut events);
    world::apply(&mut world, Command::SpawnPlayer { position }, &mut events);
    world
}

fn step(rounds: &mut Rounds, world: &mut World) -> Vec<Event> {
    let mut commands = Vec::new();
    rounds.handle(
        query::player(world).as_ref(),
        &query::enemy_view(world),
        query::dungeon(world),
        &mut commands,
    );

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn first_round_composition_stays_in_range() {
    for seed in 0..64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let wave = WaveComposition::roll(1, &mut rng);

        assert!((2..=3).contains(&wave.melee), "melee {}", wave.melee);
        assert_eq!(wave.ranged, 1);
        assert_eq!(wave.boss, 1);
    }
}

#[test]
fn fourth_round_brings_two_bosses() {
    for seed in 0..64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let wave = WaveComposition::roll(4, &mut rng);

        assert_eq!(wave.boss, 2);
        assert!((2..=6).contains(&wave.melee));
        assert!((1..=3).contains(&wave.ranged));
    }
}

#[test]
fn spawning_emits_round_and_a_clear_wave() {
    let generated = generate(
        &GenerationConfig::new(32, 24, 40.0, 11).with_border(BorderMode::Walled),
    )
    .expect("valid bounds");
    let spawn = generated.dungeon.tile_origin(generated.spawn) + Vec2::splat(5.0);
    let mut world = world_with_player(generated.dungeon, spawn);
    let mut rounds = Rounds::new(Config::new(5, EnemyTuning::default()));

    let events = step(&mut rounds, &mut world);

    assert_eq!(events[0], Event::RoundStarted { round: 1 });
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EnemySpawnRejected { .. })));
    assert!((4..=5).contains(&query::enemy_count(&world)));
    assert_eq!(rounds.phase(), RoundPhase::Active { round: 1 });

    let player = query::player(&world).expect("player").rect();
    let tile = query::dungeon(&world).tile_length();
    let keep_out = player.inflated(tile, tile);
    for enemy in query::enemy_view(&world).iter() {
        assert!(!enemy.rect().overlaps(&keep_out), "{enemy:?} spawned too close");
    }
    let bosses = query::enemy_view(&world)
        .iter()
        .filter(|enemy| enemy.kind == EnemyKind::Boss)
        .count();
    assert_eq!(bosses, 1);
}

#[test]
fn cleared_round_schedules_the_next_one() {
    let mut world = world_with_player(Dungeon::open(20, 20, 40.0), Vec2::new(20.0, 20.0));
    let mut rounds = Rounds::new(Config::new(9, EnemyTuning::default()));
    let _ = step(&mut rounds, &mut world);
    let player = query::player(&world);
    let dungeon = query::dungeon(&world).clone();

    let mut commands = Vec::new();
    rounds.handle(player.as_ref(), &EnemyView::default(), &dungeon, &mut commands);
    assert!(commands.is_empty());
    assert_eq!(rounds.phase(), RoundPhase::Cleared { round: 1 });

    rounds.handle(player.as_ref(), &EnemyView::default(), &dungeon, &mut commands);
    assert_eq!(commands[0], Command::BeginRound { round: 2 });
    assert_eq!(rounds.phase(), RoundPhase::Active { round: 2 });
}

#[test]
fn live_enemies_keep_the_round_active() {
    let mut world = world_with_player(Dungeon::open(20, 20, 40.0), Vec2::new(20.0, 20.0));
    let mut rounds = Rounds::new(Config::new(9, EnemyTuning::default()));
    let _ = step(&mut rounds, &mut world);

    let events = step(&mut rounds, &mut world);

    assert!(events.is_empty());
    assert_eq!(rounds.phase(), RoundPhase::Active { round: 1 });
}

#[test]
fn player_death_ends_the_run_until_restart() {
    let mut rounds = Rounds::new(Config::new(1, EnemyTuning::default()));
    let dungeon = Dungeon::open(12, 12, 40.0);
    let mut commands = Vec::new();

    rounds.handle(None, &EnemyView::default(), &dungeon, &mut commands);
    assert_eq!(rounds.phase(), RoundPhase::GameOver { round: 1 });

    let world = world_with_player(dungeon.clone(), Vec2::new(200.0, 200.0));
    let player = query::player(&world);
    rounds.handle(player.as_ref(), &EnemyView::default(), &dungeon, &mut commands);
    assert!(commands.is_empty());
    assert_eq!(rounds.phase(), RoundPhase::GameOver { round: 1 });

    rounds.restart();
    assert_eq!(rounds.phase(), RoundPhase::Spawning { round: 1 });
    rounds.handle(player.as_ref(), &EnemyView::default(), &dungeon, &mut commands);
    assert_eq!(commands[0], Command::BeginRound { round: 1 });
}

#[test]
fn clearing_the_last_enemy_as_the_player_dies_still_ends_the_run() {
    let mut world = world_with_player(Dungeon::open(20, 20, 40.0), Vec2::new(20.0, 20.0));
    let mut rounds = Rounds::new(Config::new(9, EnemyTuning::default()));
    let _ = step(&mut rounds, &mut world);
    assert_eq!(rounds.phase(), RoundPhase::Active { round: 1 });

    let mut fallen = query::player(&world).expect("player");
    fallen.is_dead = true;
    let dungeon = query::dungeon(&world).clone();
    let mut commands = Vec::new();

    rounds.handle(Some(&fallen), &EnemyView::default(), &dungeon, &mut commands);
    assert!(commands.is_empty());
    assert_eq!(rounds.phase(), RoundPhase::GameOver { round: 1 });

    rounds.handle(Some(&fallen), &EnemyView::default(), &dungeon, &mut commands);
    assert!(commands.is_empty());
    assert_eq!(rounds.phase(), RoundPhase::GameOver { round: 1 });
}

#[test]
fn a_player_dying_between_rounds_gets_no_new_wave() {
    let mut world = world_with_player(Dungeon::open(20, 20, 40.0), Vec2::new(20.0, 20.0));
    let mut rounds = Rounds::new(Config::new(9, EnemyTuning::default()));
    let _ = step(&mut rounds, &mut world);
    let player = query::player(&world).expect("player");
    let dungeon = query::dungeon(&world).clone();
    let mut commands = Vec::new();

    rounds.handle(Some(&player), &EnemyView::default(), &dungeon, &mut commands);
    assert_eq!(rounds.phase(), RoundPhase::Cleared { round: 1 });

    let mut fallen = player;
    fallen.is_dead = true;
    rounds.handle(Some(&fallen), &EnemyView::default(), &dungeon, &mut commands);
    assert!(commands.is_empty());
    assert_eq!(rounds.phase(), RoundPhase::GameOver { round: 1 });
}

#[test]
fn identical_seeds_place_identical_waves() {
    let dungeon = generate(&GenerationConfig::new(24, 18, 40.0, 3))
        .expect("valid bounds")
        .dungeon;
    let world = world_with_player(dungeon.clone(), Vec2::new(5.0, 5.0));
    let player = query::player(&world);

    let plan = || {
        let mut rounds = Rounds::new(Config::new(77, EnemyTuning::default()));
        let mut commands = Vec::new();
        rounds.handle(player.as_ref(), &EnemyView::default(), &dungeon, &mut commands);
        commands
    };

    let first = plan();
    assert_eq!(first, plan());
    let placed: Vec<Rect> = first
        .iter()
        .filter_map(|command| match command {
            Command::SpawnEnemy { kind, position } => Some(Rect::square(
                *position,
                EnemyTuning::default().stats(*kind).size,
            )),
            _ => None,
        })
        .collect();
    for (index, rect) in placed.iter().enumerate() {
        for other in &placed[index + 1..] {
            assert!(!rect.overlaps(other));
        }
    }
}
