#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the dungeon crawler headless.
//!
//! An autopilot supplies the input, and every few frames the scene is printed
//! as text.

mod ascii;
mod autopilot;
mod config;

use std::{io, path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use dungeon_crawler_core::{BorderMode, Clock, Event};
use dungeon_crawler_rendering::{Palette, Presenter, Scene, WorldFrame};
use dungeon_crawler_simulation::{FixedStepClock, MonotonicClock, Simulation, SimulationConfig};
use dungeon_crawler_system_rounds::RoundPhase;
use dungeon_crawler_world::query;
use glam::Vec2;
use tracing_subscriber::EnvFilter;

use crate::{
    ascii::AsciiPresenter,
    autopilot::{Autopilot, Observation},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless dungeon crawler", long_about = None)]
struct Args {
    /// Seed of the first dungeon
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Frames to simulate before exiting
    #[arg(short, long, default_value_t = 3_600)]
    frames: u64,

    /// TOML file overriding gameplay tuning
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dungeon width in tiles
    #[arg(long, default_value_t = 32)]
    columns: u32,

    /// Dungeon height in tiles
    #[arg(long, default_value_t = 24)]
    rows: u32,

    /// Wall off the outer ring of the dungeon
    #[arg(long, default_value_t = false)]
    bordered: bool,

    /// Length of one frame in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Print the scene every this many frames (0 disables drawing)
    #[arg(long, default_value_t = 60)]
    render_every: u64,

    /// Viewport width and height in tiles
    #[arg(long, default_value_t = 20)]
    view_tiles: u32,

    /// Pace frames with the wall clock instead of a fixed step
    #[arg(long, default_value_t = false)]
    realtime: bool,

    /// Start a fresh dungeon this many times after the player dies
    #[arg(long, default_value_t = 0)]
    restarts: u32,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_filter: String,
}

/// Totals reported when the run ends.
#[derive(Debug, Default)]
struct Summary {
    frames: u64,
    kills: u32,
    deaths: u32,
    highest_round: u32,
    highest_level: u32,
}

impl Summary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemyDied { .. } => self.kills += 1,
                Event::PlayerDied => self.deaths += 1,
                Event::RoundStarted { round } => {
                    self.highest_round = self.highest_round.max(*round);
                }
                Event::LeveledUp { level } => {
                    self.highest_level = self.highest_level.max(*level);
                }
                _ => {}
            }
        }
    }
}

/// Entry point for the dungeon crawler command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let tuning = config::load_tuning(args.config.as_deref())?;
    let tile_length = tuning.map.tile_length;
    let mut simulation = Simulation::new(SimulationConfig {
        columns: args.columns,
        rows: args.rows,
        border: if args.bordered {
            BorderMode::Walled
        } else {
            BorderMode::Open
        },
        seed: args.seed,
        tuning,
    })
    .context("failed to generate the first dungeon")?;
    println!("{}", query::welcome_banner(simulation.world()));

    let step = Duration::from_millis(args.frame_ms.max(1));
    let viewport = Vec2::splat(args.view_tiles.max(1) as f32 * tile_length);
    let mut pacing = Pacing::new(step, args.realtime);
    let mut presenter = AsciiPresenter::new(io::stdout().lock());
    let summary = run(&args, &mut simulation, &mut pacing, &mut presenter, viewport)?;

    tracing::info!(
        frames = summary.frames,
        kills = summary.kills,
        deaths = summary.deaths,
        round = summary.highest_round,
        level = summary.highest_level,
        "run finished"
    );
    Ok(())
}

/// How frames are spaced in time.
#[derive(Debug)]
enum Pacing {
    Fixed(FixedStepClock),
    Realtime {
        clock: MonotonicClock,
        step: Duration,
    },
}

impl Pacing {
    fn new(step: Duration, realtime: bool) -> Self {
        if realtime {
            Self::Realtime {
                clock: MonotonicClock::start(),
                step,
            }
        } else {
            Self::Fixed(FixedStepClock::new(step))
        }
    }

    /// Lets one frame of time pass before `frame`; the first frame starts at zero.
    fn wait(&mut self, frame: u64) {
        if frame == 0 {
            return;
        }
        match self {
            Self::Fixed(clock) => clock.tick(),
            Self::Realtime { step, .. } => thread::sleep(*step),
        }
    }

    fn clock(&self) -> &dyn Clock {
        match self {
            Self::Fixed(clock) => clock,
            Self::Realtime { clock, .. } => clock,
        }
    }
}

fn run(
    args: &Args,
    simulation: &mut Simulation,
    pacing: &mut Pacing,
    presenter: &mut dyn Presenter,
    viewport: Vec2,
) -> Result<Summary> {
    let mut autopilot = Autopilot::default();
    let mut summary = Summary::default();
    let mut restarts_left = args.restarts;
    let palette = Palette::default();

    for frame in 0..args.frames {
        if matches!(simulation.phase(), RoundPhase::GameOver { .. }) {
            if restarts_left == 0 {
                tracing::info!(frame, "player died, stopping");
                break;
            }
            restarts_left -= 1;
            summary.record(&simulation.restart().context("failed to restart")?);
            autopilot = Autopilot::default();
        }

        let world = simulation.world();
        let player = query::player(world);
        let enemies = query::enemy_view(world);
        let input = autopilot.decide(&Observation {
            player: player.as_ref(),
            enemies: &enemies,
            control_mode: query::control_mode(world),
            reticle: query::reticle(world),
            inventory_open: simulation.inventory_open(),
            costs: &query::tuning(world).progression.costs,
            tile_length: query::dungeon(world).tile_length(),
        });

        pacing.wait(frame);
        let events = simulation.advance(pacing.clock(), &input);
        summary.record(&events);
        summary.frames += 1;

        if args.render_every > 0 && frame % args.render_every == 0 {
            present(simulation, presenter, viewport, &palette)?;
        }
    }
    Ok(summary)
}

fn present(
    simulation: &Simulation,
    presenter: &mut dyn Presenter,
    viewport: Vec2,
    palette: &Palette,
) -> Result<()> {
    let world = simulation.world();
    let player = query::player(world);
    let enemies = query::enemy_view(world);
    let projectiles = query::projectile_view(world);
    let frame = WorldFrame {
        dungeon: query::dungeon(world),
        player: player.as_ref(),
        enemies: &enemies,
        projectiles: &projectiles,
        reticle: query::reticle(world),
        control_mode: query::control_mode(world),
        round: query::round(world),
        inventory_open: simulation.inventory_open(),
        costs: &query::tuning(world).progression.costs,
    };
    let scene = Scene::capture(&frame, viewport, palette)?;
    presenter.present(&scene)
}
