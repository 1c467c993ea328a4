#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation driver that owns the world and every planning system.
//!
//! The driver is the only place where state flows between components: it
//! applies commands to the world, inspects the resulting events, and decides
//! whether the distance cache and tour need a full or an agent-only
//! recompute before the controller makes its next decision.

mod config;
pub mod input;

use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roomba_core::{AgentSnapshot, ClickKind, Command, Direction, Event, TileCoord, VisionMode};
use roomba_system_controller::{Controller, ControllerError};
use roomba_system_pathfinding::{DistanceCache, PathError};
use roomba_system_tour::{TourError, TourPlanner, TourSettings};
use roomba_world::{self as world, query, World, WorldError};
use thiserror::Error;

pub use config::{ConfigError, SimulationConfig};

/// RNG stream reserved for failure-mode rolls.
const FAILURE_STREAM: u64 = 3;

/// Errors surfaced by simulation entry points.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A world command was rejected.
    #[error(transparent)]
    World(#[from] WorldError),
    /// A path between two tiles could not be found.
    #[error(transparent)]
    Path(#[from] PathError),
    /// The tour could not be costed.
    #[error(transparent)]
    Tour(#[from] TourError),
    /// The controller could not choose a move.
    #[error(transparent)]
    Controller(#[from] ControllerError),
}

/// Runtime switches toggled from the shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Settings {
    /// Whether the controller moves the agent on its own.
    pub active: bool,
    /// Whether moves may re-deposit debris on the vacated tile.
    pub failure_mode: bool,
    /// Sensing policy used by the controller.
    pub vision: VisionMode,
}

#[derive(Clone, Copy, Debug, Default)]
struct MoveStats {
    moves_since_plan: u32,
    planned_cost: Option<u32>,
}

/// Read-only summary of the simulation for shells and tests.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Snapshot {
    /// Ticks processed so far.
    pub tick: u64,
    /// Agent position and heading.
    pub agent: AgentSnapshot,
    /// Debris tiles in registry order.
    pub debris: Vec<TileCoord>,
    /// Current tour, agent tile first.
    pub tour: Vec<TileCoord>,
    /// Cost of the current tour.
    pub tour_cost: Option<u32>,
    /// Moves taken since the last full re-plan.
    pub moves_since_plan: u32,
    /// Tour cost computed at the last full re-plan.
    pub planned_cost: Option<u32>,
    /// Runtime switches.
    pub settings: Settings,
}

/// Owns the world, the planning systems, and the runtime settings.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    cache: DistanceCache,
    planner: TourPlanner,
    controller: Controller,
    settings: Settings,
    failure_rng: ChaCha8Rng,
    stats: MoveStats,
    pending_intent: Option<Direction>,
    tick: u64,
}

impl Simulation {
    /// Builds the world described by `config` and computes the first plan.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let world = World::new(config.width, config.height, config.agent_start, config.seed)?;
        let mut failure_rng = ChaCha8Rng::seed_from_u64(config.seed);
        failure_rng.set_stream(FAILURE_STREAM);

        let mut simulation = Self {
            planner: TourPlanner::new(
                TourSettings {
                    iterations_per_stop: config.tour_iterations_per_stop,
                    swap_retries: config.swap_retries,
                },
                config.seed,
            ),
            controller: Controller::new(config.ticks_per_move, config.vision_radius, config.seed),
            settings: Settings {
                active: config.start_active,
                failure_mode: false,
                vision: config.initial_vision,
            },
            cache: DistanceCache::new(),
            stats: MoveStats::default(),
            pending_intent: None,
            tick: 0,
            failure_rng,
            world,
            config,
        };

        if simulation.config.randomize_walls_on_start {
            let _ = simulation.submit(Command::RandomizeWalls { weighted: false })?;
        }
        simulation.replan()?;
        Ok(simulation)
    }

    /// Read-only access to the world for queries and rendering.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Configuration the simulation was built from.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Starts or stops the autonomous agent, returning the new state.
    pub fn toggle_agent_active(&mut self) -> bool {
        self.settings.active = !self.settings.active;
        info!(
            "agent {}",
            if self.settings.active { "started" } else { "stopped" }
        );
        self.settings.active
    }

    /// Enables or disables failure mode, returning the new state.
    pub fn toggle_failure_mode(&mut self) -> bool {
        self.settings.failure_mode = !self.settings.failure_mode;
        info!(
            "failure mode {}",
            if self.settings.failure_mode { "on" } else { "off" }
        );
        self.settings.failure_mode
    }

    /// Selects the sensing policy used from the next tick on.
    pub fn set_vision(&mut self, mode: VisionMode) {
        if self.settings.vision != mode {
            info!("vision switched to {mode:?}");
        }
        self.settings.vision = mode;
    }

    /// Re-rolls every wall, repairs reachability, and re-plans.
    pub fn randomize_walls(&mut self, weighted: bool) -> Result<(), SimulationError> {
        let _ = self.submit(Command::RandomizeWalls { weighted })?;
        self.replan()
    }

    /// Re-rolls debris on every tile and re-plans.
    pub fn randomize_debris(&mut self) -> Result<(), SimulationError> {
        let _ = self.submit(Command::RandomizeDebris {
            probability: self.config.debris_probability,
        })?;
        self.replan()
    }

    /// Applies a tile click and re-plans when the click changed anything.
    pub fn on_tile_click(
        &mut self,
        x: u32,
        y: u32,
        kind: ClickKind,
    ) -> Result<(), SimulationError> {
        let tile = TileCoord::new(x, y);
        let command = match kind {
            ClickKind::IncrementWalls => Command::IncrementWallState { tile },
            ClickKind::ToggleDebris => Command::ToggleDebris { tile },
            ClickKind::DecrementWalls => Command::DecrementWallState { tile },
        };

        let events = match self.submit(command) {
            Ok(events) => events,
            Err(error) => {
                warn!("click on ({x}, {y}) rejected: {error}");
                return Err(error);
            }
        };
        if events.iter().any(Event::changes_topology) {
            self.replan()?;
        }
        Ok(())
    }

    /// Records a manual move consumed on the next tick, bypassing the tick gate.
    pub fn on_directional_input(&mut self, direction: Direction) {
        self.pending_intent = Some(direction);
    }

    /// Applies a batch of edits, such as an imported layout, then re-plans.
    pub fn apply_edits<I>(&mut self, commands: I) -> Result<(), SimulationError>
    where
        I: IntoIterator<Item = Command>,
    {
        for command in commands {
            let _ = self.submit(command)?;
        }
        self.replan()
    }

    /// Advances the simulation by one tick and returns the world events it
    /// produced.
    pub fn tick(&mut self) -> Result<Vec<Event>, SimulationError> {
        self.tick += 1;

        let mut commands = Vec::new();
        if let Some(direction) = self.pending_intent.take() {
            commands.push(Command::StepAgent { direction });
        } else if self.settings.active {
            let world = &self.world;
            self.controller.handle(
                self.settings.vision,
                query::agent(world),
                &query::connectivity_view(world),
                self.planner.tour(),
                &self.cache,
                |tile| query::debris(world).contains(tile),
                &mut commands,
            )?;
        }

        let mut events = Vec::new();
        for command in commands {
            let produced = self.submit(command)?;
            let vacated = produced.iter().find_map(|event| match event {
                Event::AgentMoved { from, .. } => Some(*from),
                _ => None,
            });
            events.extend(produced);
            if let Some(vacated) = vacated {
                self.after_move(vacated, &mut events)?;
            }
        }
        Ok(events)
    }

    /// Read-only summary of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let tour = self.planner.tour();
        Snapshot {
            tick: self.tick,
            agent: query::agent(&self.world),
            debris: query::debris(&self.world).iter().collect(),
            tour: tour.map(|tour| tour.stops().to_vec()).unwrap_or_default(),
            tour_cost: tour.map(|tour| tour.total_cost()),
            moves_since_plan: self.stats.moves_since_plan,
            planned_cost: self.stats.planned_cost,
            settings: self.settings,
        }
    }

    fn submit(&mut self, command: Command) -> Result<Vec<Event>, SimulationError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events)?;
        Ok(events)
    }

    /// Counts the move, rolls for a failure re-deposit on `vacated`, and
    /// refreshes the plan.
    fn after_move(
        &mut self,
        vacated: TileCoord,
        events: &mut Vec<Event>,
    ) -> Result<(), SimulationError> {
        self.stats.moves_since_plan += 1;

        let failed = self.settings.failure_mode
            && self.failure_rng.gen_bool(self.config.failure_probability);
        if failed {
            info!("failure re-deposited debris at ({}, {})", vacated.x(), vacated.y());
            events.extend(self.submit(Command::PlaceDebris { tile: vacated })?);
            return self.replan();
        }

        let agent = query::agent(&self.world).tile;
        let debris: Vec<TileCoord> = query::debris(&self.world).iter().collect();
        self.cache
            .recompute_agent(&query::connectivity_view(&self.world), agent, &debris)?;
        let _ = self.planner.recompute(&self.cache, agent, &debris)?;
        Ok(())
    }

    /// Full recompute: every cached path and a fresh tour.
    ///
    /// The stored tour and statistics are dropped first, so a failed
    /// recompute leaves no plan rather than one the cache cannot serve.
    fn replan(&mut self) -> Result<(), SimulationError> {
        self.planner.invalidate();
        self.stats = MoveStats::default();

        let agent = query::agent(&self.world).tile;
        let debris: Vec<TileCoord> = query::debris(&self.world).iter().collect();
        self.cache
            .recompute_all(&query::connectivity_view(&self.world), agent, &debris)?;
        let cost = self.planner.recompute(&self.cache, agent, &debris)?.total_cost();

        self.stats = MoveStats {
            moves_since_plan: 0,
            planned_cost: Some(cost),
        };
        info!("re-planned {} debris tiles, optimal cost {cost}", debris.len());
        Ok(())
    }
}
