#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural dungeon generator.
//!
//! Generation stamps a handful of fixed wall shapes at random anchors and then
//! grows irregular wall clusters with depth-limited randomized depth-first
//! walks. The spawn tile, and in walled mode every exit, is guaranteed to sit
//! inside a cleared 2×2 open block.

use dungeon_crawler_core::{
    BorderMode, Dungeon, GenerationError, TileCoord, TileKind, MIN_DUNGEON_DIMENSION,
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SHAPE_COUNT_MIN: u32 = 15;
const SHAPE_COUNT_MAX: u32 = 20;
const SHAPE_PLACEMENT_ATTEMPTS: u32 = 64;
const WALK_COUNT_MIN: u32 = 8;
const WALK_COUNT_MAX: u32 = 12;
const WALK_DEPTH: u32 = 10;
const EXIT_COUNT: usize = 2;

/// Fixed wall pattern stamped during generation.
struct Shape {
    width: u32,
    height: u32,
    cells: &'static [(u32, u32)],
}

const SHAPES: [Shape; 5] = [
    // line
    Shape {
        width: 4,
        height: 1,
        cells: &[(0, 0), (1, 0), (2, 0), (3, 0)],
    },
    // column
    Shape {
        width: 1,
        height: 4,
        cells: &[(0, 0), (0, 1), (0, 2), (0, 3)],
    },
    // L
    Shape {
        width: 3,
        height: 3,
        cells: &[(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)],
    },
    // U
    Shape {
        width: 3,
        height: 3,
        cells: &[(0, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    // helix
    Shape {
        width: 3,
        height: 3,
        cells: &[(0, 0), (1, 0), (1, 1), (1, 2), (2, 2)],
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    North,
    East,
    South,
    West,
}

/// Parameters of a single generation run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    columns: u32,
    rows: u32,
    tile_length: f32,
    seed: u64,
    border: BorderMode,
    spawn: Option<TileCoord>,
}

impl Config {
    /// Creates a configuration with an open border and a centred spawn tile.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, tile_length: f32, seed: u64) -> Self {
        Self {
            columns,
            rows,
            tile_length,
            seed,
            border: BorderMode::Open,
            spawn: None,
        }
    }

    /// Selects whether the outer ring of tiles is walled.
    #[must_use]
    pub const fn with_border(mut self, border: BorderMode) -> Self {
        self.border = border;
        self
    }

    /// Overrides the spawn tile. Coordinates outside the grid are clamped.
    #[must_use]
    pub const fn with_spawn(mut self, spawn: TileCoord) -> Self {
        self.spawn = Some(spawn);
        self
    }

    /// Seed driving every random decision of the run.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

/// Result of a successful generation run.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedDungeon {
    /// Generated tile grid.
    pub dungeon: Dungeon,
    /// Tile the player should spawn on; always open.
    pub spawn: TileCoord,
    /// Border tiles anchoring the cut exits. Empty for open borders.
    pub exits: Vec<TileCoord>,
}

/// Generates a dungeon from the provided configuration.
///
/// # Errors
///
/// Returns [`GenerationError::InvalidGenerationBounds`] when either dimension
/// is smaller than [`MIN_DUNGEON_DIMENSION`].
pub fn generate(config: &Config) -> Result<GeneratedDungeon, GenerationError> {
    if config.columns < MIN_DUNGEON_DIMENSION || config.rows < MIN_DUNGEON_DIMENSION {
        return Err(GenerationError::InvalidGenerationBounds {
            columns: config.columns,
            rows: config.rows,
            minimum: MIN_DUNGEON_DIMENSION,
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut dungeon = Dungeon::open(config.columns, config.rows, config.tile_length);

    if config.border == BorderMode::Walled {
        wall_border(&mut dungeon);
    }

    let shape_target = rng.gen_range(SHAPE_COUNT_MIN..=SHAPE_COUNT_MAX);
    let mut shapes_placed = 0;
    for _ in 0..shape_target {
        let shape = &SHAPES[rng.gen_range(0..SHAPES.len())];
        if stamp_shape(&mut dungeon, shape, &mut rng) {
            shapes_placed += 1;
        }
    }

    let walks = rng.gen_range(WALK_COUNT_MIN..=WALK_COUNT_MAX);
    for _ in 0..walks {
        carve_walk(&mut dungeon, &mut rng);
    }

    let exits = if config.border == BorderMode::Walled {
        cut_exits(&mut dungeon, &mut rng)
    } else {
        Vec::new()
    };

    let spawn = clamp_spawn(
        config
            .spawn
            .unwrap_or_else(|| TileCoord::new(config.columns / 2, config.rows / 2)),
        config.columns,
        config.rows,
    );
    dungeon.clear_spawn_area(spawn);

    tracing::debug!(
        seed = config.seed,
        columns = config.columns,
        rows = config.rows,
        shapes = shapes_placed,
        walks,
        exits = exits.len(),
        open_tiles = dungeon.open_tile_count(),
        "generated dungeon"
    );

    Ok(GeneratedDungeon {
        dungeon,
        spawn,
        exits,
    })
}

fn wall_border(dungeon: &mut Dungeon) {
    let last_column = dungeon.columns() - 1;
    let last_row = dungeon.rows() - 1;
    for coord in dungeon.coords().collect::<Vec<_>>() {
        if coord.column() == 0
            || coord.row() == 0
            || coord.column() == last_column
            || coord.row() == last_row
        {
            dungeon.set_tile(coord, TileKind::Wall);
        }
    }
}

/// Stamps `shape` at a random anchor whose footprint is entirely open.
///
/// Returns `false` when no such anchor was found after `SHAPE_PLACEMENT_ATTEMPTS` tries.
fn stamp_shape(dungeon: &mut Dungeon, shape: &Shape, rng: &mut ChaCha8Rng) -> bool {
    let max_column = dungeon.columns().saturating_sub(shape.width + 1);
    let max_row = dungeon.rows().saturating_sub(shape.height + 1);
    if max_column < 1 || max_row < 1 {
        return false;
    }

    for _ in 0..SHAPE_PLACEMENT_ATTEMPTS {
        let anchor_column = rng.gen_range(1..=max_column);
        let anchor_row = rng.gen_range(1..=max_row);
        let cells: Vec<TileCoord> = shape
            .cells
            .iter()
            .map(|(column, row)| TileCoord::new(anchor_column + column, anchor_row + row))
            .collect();

        if cells.iter().all(|cell| dungeon.is_open(*cell)) {
            for cell in cells {
                dungeon.set_tile(cell, TileKind::Wall);
            }
            return true;
        }
    }

    false
}

/// Walls up to [`WALK_DEPTH`] interior tiles with a randomized depth-first
/// walk that backtracks whenever the current tile has no open neighbour.
fn carve_walk(dungeon: &mut Dungeon, rng: &mut ChaCha8Rng) {
    let start = TileCoord::new(
        rng.gen_range(1..dungeon.columns() - 1),
        rng.gen_range(1..dungeon.rows() - 1),
    );
    dungeon.set_tile(start, TileKind::Wall);

    let mut stack = vec![start];
    let mut walled = 1;
    let mut offsets: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

    while walled < WALK_DEPTH {
        let Some(current) = stack.last().copied() else {
            break;
        };

        offsets.shuffle(rng);
        let next = offsets
            .iter()
            .filter_map(|offset| interior_neighbor(dungeon, current, *offset))
            .find(|neighbor| dungeon.is_open(*neighbor));

        match next {
            Some(neighbor) => {
                dungeon.set_tile(neighbor, TileKind::Wall);
                stack.push(neighbor);
                walled += 1;
            }
            None => {
                let _ = stack.pop();
            }
        }
    }
}

fn interior_neighbor(dungeon: &Dungeon, from: TileCoord, offset: (i64, i64)) -> Option<TileCoord> {
    let column = i64::from(from.column()) + offset.0;
    let row = i64::from(from.row()) + offset.1;
    let interior_columns = 1..i64::from(dungeon.columns()) - 1;
    let interior_rows = 1..i64::from(dungeon.rows()) - 1;
    if interior_columns.contains(&column) && interior_rows.contains(&row) {
        Some(TileCoord::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    } else {
        None
    }
}

/// Cuts two-tile exits into distinct random sides of a walled border.
fn cut_exits(dungeon: &mut Dungeon, rng: &mut ChaCha8Rng) -> Vec<TileCoord> {
    let mut sides = [Side::North, Side::East, Side::South, Side::West];
    sides.shuffle(rng);

    let last_column = dungeon.columns() - 1;
    let last_row = dungeon.rows() - 1;
    sides
        .iter()
        .take(EXIT_COUNT)
        .map(|side| {
            let exit = match side {
                Side::North => TileCoord::new(rng.gen_range(1..last_column - 1), 0),
                Side::South => TileCoord::new(rng.gen_range(1..last_column - 1), last_row),
                Side::West => TileCoord::new(0, rng.gen_range(1..last_row - 1)),
                Side::East => TileCoord::new(last_column, rng.gen_range(1..last_row - 1)),
            };
            dungeon.clear_spawn_area(exit);
            exit
        })
        .collect()
}

fn clamp_spawn(spawn: TileCoord, columns: u32, rows: u32) -> TileCoord {
    TileCoord::new(
        spawn.column().min(columns.saturating_sub(1)),
        spawn.row().min(rows.saturating_sub(1)),
    )
}
