#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the roomba simulator.
//!
//! The world owns the tile grid, the adjacency graph derived from its walls,
//! the debris registry, and the agent's position. Every mutation arrives as a
//! [`Command`] through [`apply`], which reports the resulting [`Event`]s.

mod debris;
mod graph;
mod grid;
mod reachability;
mod walls;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roomba_core::{Command, Direction, Event, TileCoord, WallState, WallStateError};
use thiserror::Error;

pub use debris::DebrisRegistry;

use graph::AdjacencyGraph;
use grid::TileGrid;

/// Smallest width or height a grid may have.
pub const MIN_DIMENSION: u32 = 2;

/// RNG stream reserved for wall and debris randomization.
const WORLD_STREAM: u64 = 0;

/// Reasons a single wall mutation is rejected. The world is left untouched.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum WallError {
    /// The resulting configuration is not one of the fifteen legal states.
    #[error(transparent)]
    State(#[from] WallStateError),
    /// The wall faces the grid edge and is mandatory.
    #[error("wall {direction:?} of tile ({}, {}) lies on the grid boundary", tile.x(), tile.y())]
    BoundaryWall {
        /// Tile owning the wall.
        tile: TileCoord,
        /// Side of the tile facing the boundary.
        direction: Direction,
    },
    /// The change would wall a tile in on all four sides.
    #[error("tile ({}, {}) would be walled on every side", tile.x(), tile.y())]
    WouldEnclose {
        /// Tile that would be isolated.
        tile: TileCoord,
    },
    /// The state drops a mandatory boundary wall of the tile.
    #[error("wall state {} is not allowed on tile ({}, {})", state.get(), tile.x(), tile.y())]
    Disallowed {
        /// Tile that rejected the state.
        tile: TileCoord,
        /// Rejected state.
        state: WallState,
    },
    /// The tile lies outside the grid.
    #[error("tile ({}, {}) lies outside the grid", .0.x(), .0.y())]
    OutOfBounds(TileCoord),
}

/// Errors reported by [`apply`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum WorldError {
    /// The requested grid cannot hold the mandatory boundary walls.
    #[error("grid must be at least {min}x{min}, got {width}x{height}", min = MIN_DIMENSION)]
    GridTooSmall {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// The command referenced a tile outside the grid.
    #[error("tile ({}, {}) lies outside the grid", .0.x(), .0.y())]
    OutOfBounds(TileCoord),
    /// A wall mutation was rejected.
    #[error(transparent)]
    Wall(#[from] WallError),
    /// Weighted randomization exhausted every wall-count bucket.
    #[error("no valid wall state exists for tile ({}, {})", .0.x(), .0.y())]
    NoValidWallState(TileCoord),
    /// A debris probability outside `0.0..=1.0`.
    #[error("debris probability must lie in 0.0..=1.0, got {0}")]
    InvalidProbability(f64),
}

#[derive(Clone, Copy, Debug)]
struct Agent {
    tile: TileCoord,
    heading: Direction,
}

/// Represents the authoritative simulator world.
#[derive(Clone, Debug)]
pub struct World {
    grid: TileGrid,
    graph: AdjacencyGraph,
    debris: DebrisRegistry,
    agent: Agent,
    rng: ChaCha8Rng,
}

impl World {
    /// Builds an open `width` by `height` world with only boundary walls, the
    /// agent on `agent`, and randomization seeded from `seed`.
    pub fn new(width: u32, height: u32, agent: TileCoord, seed: u64) -> Result<Self, WorldError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(WORLD_STREAM);
        let (grid, graph) = build_layout(width, height, agent)?;

        Ok(Self {
            grid,
            graph,
            debris: DebrisRegistry::default(),
            agent: Agent {
                tile: agent,
                heading: Direction::East,
            },
            rng,
        })
    }

    fn place_debris(
        &mut self,
        tile: TileCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<bool, WorldError> {
        let entry = self.grid.tile_mut(tile).ok_or(WorldError::OutOfBounds(tile))?;
        // The agent cleans the tile it stands on.
        if tile == self.agent.tile || !self.debris.place(tile) {
            return Ok(false);
        }

        entry.set_debris(true);
        out_events.push(Event::DebrisPlaced { tile });
        debug!("debris placed at ({}, {})", tile.x(), tile.y());
        Ok(true)
    }

    fn clean_debris(
        &mut self,
        tile: TileCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<bool, WorldError> {
        let entry = self.grid.tile_mut(tile).ok_or(WorldError::OutOfBounds(tile))?;
        if !self.debris.clean(tile) {
            return Ok(false);
        }

        entry.set_debris(false);
        out_events.push(Event::DebrisCleaned { tile });
        debug!("debris cleaned at ({}, {})", tile.x(), tile.y());
        Ok(true)
    }

    fn repair_reachability(&mut self, out_events: &mut Vec<Event>) -> Result<(), WorldError> {
        let opened =
            reachability::repair(&mut self.grid, &mut self.graph, self.agent.tile, out_events)?;
        if opened > 0 {
            out_events.push(Event::ReachabilityRepaired { opened });
        }
        Ok(())
    }

    fn step_agent(
        &mut self,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        let from = self.agent.tile;
        let destination = self
            .grid
            .neighbor(from, direction)
            .filter(|_| self.graph.is_open(from, direction) == Some(true));

        let Some(to) = destination else {
            out_events.push(Event::AgentBlocked {
                tile: from,
                direction,
            });
            return Ok(());
        };

        self.agent = Agent {
            tile: to,
            heading: direction,
        };
        out_events.push(Event::AgentMoved {
            from,
            to,
            direction,
        });
        let _ = self.clean_debris(to, out_events)?;
        Ok(())
    }
}

fn build_layout(
    width: u32,
    height: u32,
    agent: TileCoord,
) -> Result<(TileGrid, AdjacencyGraph), WorldError> {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(WorldError::GridTooSmall { width, height });
    }
    let grid = TileGrid::build(width, height).map_err(WallError::from)?;
    if !grid.contains(agent) {
        return Err(WorldError::OutOfBounds(agent));
    }

    Ok((grid, AdjacencyGraph::build(width, height)))
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// A rejected command leaves the world unchanged and reports no events.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    match command {
        Command::ConfigureGrid {
            width,
            height,
            agent,
        } => {
            let (grid, graph) = build_layout(width, height, agent)?;
            world.grid = grid;
            world.graph = graph;
            world.debris.clear();
            world.agent = Agent {
                tile: agent,
                heading: Direction::East,
            };
            out_events.push(Event::GridConfigured { width, height });
        }
        Command::SetWallState { tile, state } => {
            walls::set_wall_state(&mut world.grid, &mut world.graph, tile, state, out_events)?;
            world.repair_reachability(out_events)?;
        }
        Command::IncrementWallState { tile } => {
            let _ =
                walls::step_wall_state(&mut world.grid, &mut world.graph, tile, true, out_events)?;
            world.repair_reachability(out_events)?;
        }
        Command::DecrementWallState { tile } => {
            let _ =
                walls::step_wall_state(&mut world.grid, &mut world.graph, tile, false, out_events)?;
            world.repair_reachability(out_events)?;
        }
        Command::SetWall {
            tile,
            direction,
            active,
        } => {
            let _ = walls::set_wall(
                &mut world.grid,
                &mut world.graph,
                tile,
                direction,
                active,
                out_events,
            )?;
            world.repair_reachability(out_events)?;
        }
        Command::RandomizeWalls { weighted } => {
            walls::randomize_walls(
                &mut world.grid,
                &mut world.graph,
                &mut world.rng,
                weighted,
                out_events,
            )?;
            world.repair_reachability(out_events)?;
        }
        Command::RepairReachability => world.repair_reachability(out_events)?,
        Command::PlaceDebris { tile } => {
            let _ = world.place_debris(tile, out_events)?;
        }
        Command::CleanDebris { tile } => {
            let _ = world.clean_debris(tile, out_events)?;
        }
        Command::ToggleDebris { tile } => {
            if world.debris.contains(tile) {
                let _ = world.clean_debris(tile, out_events)?;
            } else {
                let _ = world.place_debris(tile, out_events)?;
            }
        }
        Command::RandomizeDebris { probability } => {
            if !(0.0..=1.0).contains(&probability) {
                return Err(WorldError::InvalidProbability(probability));
            }
            let coords: Vec<TileCoord> = world.grid.coords().collect();
            for tile in coords {
                if world.rng.gen_bool(probability) {
                    let _ = world.place_debris(tile, out_events)?;
                } else {
                    let _ = world.clean_debris(tile, out_events)?;
                }
            }
        }
        Command::StepAgent { direction } => world.step_agent(direction, out_events)?,
    }

    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use roomba_core::{AgentSnapshot, ConnectivityView, TileCoord, WallSides, WallState};

    use super::{reachability::ReachabilityField, DebrisRegistry, World};

    /// Number of columns and rows in the grid.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.grid.width(), world.grid.height())
    }

    /// Current wall configuration of a tile.
    #[must_use]
    pub fn wall_state(world: &World, tile: TileCoord) -> Option<WallState> {
        world.grid.tile(tile).map(|entry| entry.state())
    }

    /// Walled sides of a tile.
    #[must_use]
    pub fn wall_sides(world: &World, tile: TileCoord) -> Option<WallSides> {
        world.grid.tile(tile).map(|entry| entry.sides())
    }

    /// Sides of a tile that face the grid edge and must stay walled.
    #[must_use]
    pub fn boundary_sides(world: &World, tile: TileCoord) -> Option<WallSides> {
        world.grid.tile(tile).map(|entry| entry.boundary())
    }

    /// Reports whether `candidate` is a legal wall state for the tile.
    ///
    /// True iff the value lies in `0..=14` and keeps every boundary wall.
    #[must_use]
    pub fn validate_wall_state(world: &World, tile: TileCoord, candidate: u8) -> bool {
        world
            .grid
            .tile(tile)
            .is_some_and(|entry| entry.validates(candidate))
    }

    /// Borrowed view of the adjacency graph's open edges.
    #[must_use]
    pub fn connectivity_view(world: &World) -> ConnectivityView<'_> {
        world.graph.view()
    }

    /// Registry of tiles holding debris.
    #[must_use]
    pub fn debris(world: &World) -> &DebrisRegistry {
        &world.debris
    }

    /// Reports the debris flag stored on the tile itself.
    #[must_use]
    pub fn has_debris(world: &World, tile: TileCoord) -> bool {
        world.grid.tile(tile).is_some_and(|entry| entry.has_debris())
    }

    /// Position and heading of the agent.
    #[must_use]
    pub fn agent(world: &World) -> AgentSnapshot {
        AgentSnapshot {
            tile: world.agent.tile,
            heading: world.agent.heading,
        }
    }

    /// Tiles that cannot be reached from the agent, in row-major order.
    #[must_use]
    pub fn unreachable_tiles(world: &World) -> Vec<TileCoord> {
        ReachabilityField::flood(&world.grid, &world.graph, world.agent.tile).red_tiles()
    }
}
