use dungeon_crawler_core::{BorderMode, GenerationError, TileCoord, TileKind};
use dungeon_crawler_system_dungeon_generation::{generate, Config};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn rejects_dimensions_below_minimum() {
    let error = generate(&Config::new(9, 20, 40.0, 1)).expect_err("too narrow");

    assert_eq!(
        error,
        GenerationError::InvalidGenerationBounds {
            columns: 9,
            rows: 20,
            minimum: 10,
        }
    );
}

#[test]
fn identical_seeds_produce_identical_dungeons() {
    let config = Config::new(32, 24, 40.0, 0x5eed);

    let first = generate(&config).expect("valid bounds");
    let second = generate(&config).expect("valid bounds");

    assert_eq!(first, second);
}

#[test]
fn different_seeds_diverge() {
    let first = generate(&Config::new(32, 24, 40.0, 1)).expect("valid bounds");
    let second = generate(&Config::new(32, 24, 40.0, 2)).expect("valid bounds");

    assert_ne!(first.dungeon, second.dungeon);
}

#[test]
fn open_border_mode_places_walls_inside_the_map() {
    let generated = generate(&Config::new(32, 24, 40.0, 7)).expect("valid bounds");

    assert!(generated.exits.is_empty());
    assert!(!generated.dungeon.wall_rects().is_empty());
}

#[test]
fn spawn_area_is_cleared() {
    let spawn = TileCoord::new(4, 6);
    let generated =
        generate(&Config::new(20, 20, 40.0, 99).with_spawn(spawn)).expect("valid bounds");

    assert_eq!(generated.spawn, spawn);
    for (column, row) in [(4, 6), (5, 6), (4, 7), (5, 7)] {
        assert!(generated.dungeon.is_open(TileCoord::new(column, row)));
    }
}

#[test]
fn walled_mode_cuts_two_exits_on_distinct_sides() {
    let generated = generate(&Config::new(24, 16, 40.0, 42).with_border(BorderMode::Walled))
        .expect("valid bounds");
    let dungeon = &generated.dungeon;

    assert_eq!(generated.exits.len(), 2);
    let sides: Vec<&str> = generated
        .exits
        .iter()
        .map(|exit| match (exit.column(), exit.row()) {
            (_, 0) => "north",
            (0, _) => "west",
            (column, _) if column == dungeon.columns() - 1 => "east",
            _ => "south",
        })
        .collect();
    assert_ne!(sides[0], sides[1]);

    for exit in &generated.exits {
        assert!(dungeon.is_open(*exit), "exit {exit:?} left walled");
    }

    assert_eq!(dungeon.tile(TileCoord::new(0, 0)), Some(TileKind::Wall));
    assert_eq!(
        dungeon.tile(TileCoord::new(dungeon.columns() - 1, dungeon.rows() - 1)),
        Some(TileKind::Wall)
    );
}

proptest! {
    #[test]
    fn random_open_position_lands_on_open_tile(
        columns in 10u32..48,
        rows in 10u32..48,
        seed in any::<u64>(),
        walled in any::<bool>(),
    ) {
        let border = if walled { BorderMode::Walled } else { BorderMode::Open };
        let generated = generate(&Config::new(columns, rows, 40.0, seed).with_border(border))
            .expect("valid bounds");
        let dungeon = &generated.dungeon;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        prop_assert!(dungeon.is_open(generated.spawn));
        let position = dungeon.random_open_position(&mut rng).expect("open tile exists");
        let coord = dungeon.tile_at(position).expect("position on map");
        prop_assert_eq!(dungeon.tile(coord), Some(TileKind::Open));
    }
}
