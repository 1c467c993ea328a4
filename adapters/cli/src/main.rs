#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless shell that drives the roomba simulation from the terminal.
//!
//! Run with `RUST_LOG=debug` to see wall mutations and planning statistics.

mod layout_transfer;
mod terminal;

use std::{io, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use glam::Vec2;
use log::info;
use roomba_core::VisionMode;
use roomba_rendering::{Presentation, RenderingBackend, SceneDepths, TileLayout};
use roomba_simulation::{
    input::{dispatch, InputAction, MouseButton},
    Simulation, SimulationConfig,
};
use roomba_world::query;

use layout_transfer::LayoutSnapshot;
use terminal::TerminalBackend;

/// Headless roomba navigation simulator.
#[derive(Debug, Parser)]
#[command(name = "roomba", author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of tile columns.
    #[arg(long)]
    width: Option<u32>,

    /// Number of tile rows.
    #[arg(long)]
    height: Option<u32>,

    /// Seed for every random stream.
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to simulate.
    #[arg(long, default_value = "400")]
    ticks: u64,

    /// Sensing policy of the agent.
    #[arg(long, value_enum)]
    vision: Option<VisionArg>,

    /// Let moves re-deposit debris on the vacated tile.
    #[arg(long)]
    failure: bool,

    /// Randomize walls before the run.
    #[arg(long)]
    randomize_walls: bool,

    /// Use bucket-weighted wall randomization.
    #[arg(long, requires = "randomize_walls")]
    weighted: bool,

    /// Layout string previously exported by this tool.
    #[arg(long)]
    layout: Option<String>,

    /// Print a frame every N ticks (0 prints only the first and last frame).
    #[arg(long, default_value = "0")]
    print_every: u64,

    /// Click at screen coordinates before the run, as `X,Y,BUTTON` with
    /// BUTTON one of left, middle, right.
    #[arg(long = "click", value_parser = parse_click)]
    clicks: Vec<ScreenClick>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum VisionArg {
    Bump,
    Limited,
    Omniscient,
}

impl From<VisionArg> for VisionMode {
    fn from(value: VisionArg) -> Self {
        match value {
            VisionArg::Bump => Self::BumpSensor,
            VisionArg::Limited => Self::LimitedVision,
            VisionArg::Omniscient => Self::Omniscient,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ScreenClick {
    point: Vec2,
    button: MouseButton,
}

fn parse_click(value: &str) -> Result<ScreenClick, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [x, y, button] = parts.as_slice() else {
        return Err(format!("expected X,Y,BUTTON, got '{value}'"));
    };
    let coordinate = |raw: &str| {
        raw.parse::<f32>()
            .map_err(|error| format!("invalid coordinate '{raw}': {error}"))
    };
    let button = match button.to_ascii_lowercase().as_str() {
        "left" => MouseButton::Left,
        "middle" => MouseButton::Middle,
        "right" => MouseButton::Right,
        other => return Err(format!("unknown mouse button '{other}'")),
    };

    Ok(ScreenClick {
        point: Vec2::new(coordinate(*x)?, coordinate(*y)?),
        button,
    })
}

/// Entry point for the roomba command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = build_config(&args)?;
    let mut simulation = Simulation::new(config).context("failed to build simulation")?;

    match &args.layout {
        Some(layout) => {
            let snapshot = LayoutSnapshot::decode(layout).context("failed to decode layout")?;
            simulation
                .apply_edits(snapshot.commands())
                .context("failed to import layout")?;
            info!("imported {}x{} layout", snapshot.columns, snapshot.rows);
        }
        None => simulation
            .randomize_debris()
            .context("failed to scatter debris")?,
    }
    if args.randomize_walls {
        dispatch(
            &mut simulation,
            InputAction::RandomizeWalls {
                weighted: args.weighted,
            },
        )
        .context("failed to randomize walls")?;
    }

    let (columns, rows) = query::dimensions(simulation.world());
    let layout = TileLayout::new(columns, rows, Vec2::ZERO, TileLayout::DEFAULT_TILE_LENGTH)
        .context("invalid tile layout")?;
    for click in &args.clicks {
        let Some(tile) = layout.tile_at(click.point) else {
            bail!(
                "click at ({}, {}) lies outside the grid",
                click.point.x,
                click.point.y
            );
        };
        dispatch(
            &mut simulation,
            InputAction::TileClick {
                x: tile.x(),
                y: tile.y(),
                kind: click.button.click_kind(),
            },
        )
        .with_context(|| format!("click on ({}, {}) failed", tile.x(), tile.y()))?;
    }

    if args.failure && !simulation.snapshot().settings.failure_mode {
        dispatch(&mut simulation, InputAction::ToggleFailureMode)?;
    }
    if !simulation.snapshot().settings.active {
        dispatch(&mut simulation, InputAction::ToggleAgent)?;
    }

    let presentation = Presentation::new(
        "roomba",
        layout,
        SceneDepths::from_world(simulation.world()),
    );
    let ticks = args.ticks;
    TerminalBackend::new(io::stdout().lock(), args.print_every).run(
        presentation,
        |frame, depths| {
            let events = simulation
                .tick()
                .with_context(|| format!("tick {frame} failed"))?;
            depths.apply(&events, simulation.world());
            Ok(frame < ticks)
        },
    )?;

    let snapshot = simulation.snapshot();
    println!(
        "ticks: {}, debris left: {}, moves since plan: {}, planned cost: {}",
        snapshot.tick,
        snapshot.debris.len(),
        snapshot.moves_since_plan,
        snapshot
            .planned_cost
            .map_or_else(|| "-".to_owned(), |cost| cost.to_string())
    );
    let exported = LayoutSnapshot::capture(simulation.world())
        .encode()
        .context("failed to export layout")?;
    println!("layout: {exported}");
    Ok(())
}

fn build_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(vision) = args.vision {
        config.initial_vision = vision.into();
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_arguments_parse_point_and_button() {
        let click = parse_click("75, 20.5,Middle").expect("click");
        assert_eq!(click.point, Vec2::new(75.0, 20.5));
        assert_eq!(click.button, MouseButton::Middle);
        assert!(parse_click("1,2").is_err());
        assert!(parse_click("1,2,wheel").is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "roomba",
            "--width",
            "4",
            "--height",
            "3",
            "--vision",
            "limited",
        ]);
        let config = build_config(&args).expect("config");
        assert_eq!((config.width, config.height), (4, 3));
        assert_eq!(config.initial_vision, VisionMode::LimitedVision);
        assert_eq!(config.seed, SimulationConfig::default().seed);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let args = Args::parse_from(["roomba", "--width", "1"]);
        assert!(build_config(&args).is_err());
    }
}
