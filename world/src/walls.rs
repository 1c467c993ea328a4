//! Wall state machine.
//!
//! Every mutation follows the same two-step protocol: validate the change
//! against both tiles sharing the wall, then mutate the local side and apply
//! the mirrored update to the neighbour exactly once. The adjacency graph is
//! updated in the same step so `open` always equals "no wall between".

use log::debug;
use rand::{seq::SliceRandom, Rng};
use roomba_core::{Direction, Event, TileCoord, WallState};

use crate::{graph::AdjacencyGraph, grid::TileGrid, WallError, WorldError};

/// Number of wall-count buckets used by weighted randomization.
const WALL_BUCKETS: [u8; 4] = [0, 1, 2, 3];

/// Activates or deactivates one wall and mirrors it onto the neighbour.
///
/// Returns `Ok(false)` when the wall already had the requested state.
pub(crate) fn set_wall(
    grid: &mut TileGrid,
    graph: &mut AdjacencyGraph,
    tile: TileCoord,
    direction: Direction,
    active: bool,
    out_events: &mut Vec<Event>,
) -> Result<bool, WallError> {
    let entry = grid.tile(tile).ok_or(WallError::OutOfBounds(tile))?;
    let current = entry.sides();
    if current.has(direction) == active {
        return Ok(false);
    }
    if entry.is_boundary(direction) {
        return Err(WallError::BoundaryWall { tile, direction });
    }
    let neighbor = grid
        .neighbor(tile, direction)
        .ok_or(WallError::BoundaryWall { tile, direction })?;

    let local = current.with(direction, active);
    if local.is_enclosed() {
        return Err(WallError::WouldEnclose { tile });
    }
    let neighbor_before = grid
        .tile(neighbor)
        .ok_or(WallError::OutOfBounds(neighbor))?
        .sides();
    let mirrored = neighbor_before.with(direction.opposite(), active);
    if mirrored.is_enclosed() {
        return Err(WallError::WouldEnclose { tile: neighbor });
    }

    if let Some(entry) = grid.tile_mut(tile) {
        entry.set_sides(local)?;
    }
    out_events.push(Event::WallChanged {
        tile,
        direction,
        active,
    });
    let _ = graph.set_open(tile, direction, !active);

    if neighbor_before != mirrored {
        if let Some(entry) = grid.tile_mut(neighbor) {
            entry.set_sides(mirrored)?;
        }
        out_events.push(Event::WallChanged {
            tile: neighbor,
            direction: direction.opposite(),
            active,
        });
    }

    debug!(
        "wall {:?} of ({}, {}) {}",
        direction,
        tile.x(),
        tile.y(),
        if active { "raised" } else { "lowered" }
    );
    Ok(true)
}

/// Replaces a tile's wall configuration, propagating each changed side.
pub(crate) fn set_wall_state(
    grid: &mut TileGrid,
    graph: &mut AdjacencyGraph,
    tile: TileCoord,
    state: WallState,
    out_events: &mut Vec<Event>,
) -> Result<(), WallError> {
    let entry = grid.tile(tile).ok_or(WallError::OutOfBounds(tile))?;
    if !entry.allows(state) {
        return Err(WallError::Disallowed { tile, state });
    }
    if let Some(neighbor) = enclosed_neighbor(grid, tile, state) {
        return Err(WallError::WouldEnclose { tile: neighbor });
    }

    let current = entry.sides();
    let target = state.sides();

    // Lower walls before raising any, so the tile never passes through the
    // enclosed configuration on its way to `state`.
    for active in [false, true] {
        for direction in Direction::ALL {
            if current.has(direction) != target.has(direction) && target.has(direction) == active {
                let _ = set_wall(grid, graph, tile, direction, active, out_events)?;
            }
        }
    }

    Ok(())
}

/// Steps the tile to the next (`forward`) or previous legal state, skipping
/// states that drop a boundary wall or would enclose a neighbour.
///
/// Returns the resulting state, which equals the current one when no other
/// state is acceptable.
pub(crate) fn step_wall_state(
    grid: &mut TileGrid,
    graph: &mut AdjacencyGraph,
    tile: TileCoord,
    forward: bool,
    out_events: &mut Vec<Event>,
) -> Result<WallState, WallError> {
    let current = grid
        .tile(tile)
        .ok_or(WallError::OutOfBounds(tile))?
        .state();

    let mut candidate = current;
    for _ in 0..WallState::COUNT {
        candidate = if forward {
            candidate.next()
        } else {
            candidate.previous()
        };
        if candidate == current {
            return Ok(current);
        }
        if is_acceptable(grid, tile, candidate) {
            set_wall_state(grid, graph, tile, candidate, out_events)?;
            return Ok(candidate);
        }
    }

    Ok(current)
}

/// Assigns every tile a random legal configuration in row-major order.
pub(crate) fn randomize_walls<R: Rng>(
    grid: &mut TileGrid,
    graph: &mut AdjacencyGraph,
    rng: &mut R,
    weighted: bool,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    let coords: Vec<TileCoord> = grid.coords().collect();
    for tile in coords {
        let state = if weighted {
            weighted_state(grid, tile, rng)?
        } else {
            uniform_state(grid, tile, rng)?
        };
        set_wall_state(grid, graph, tile, state, out_events)?;
    }

    debug!(
        "randomized walls of {}x{} grid ({})",
        grid.width(),
        grid.height(),
        if weighted { "weighted" } else { "uniform" }
    );
    Ok(())
}

fn uniform_state<R: Rng>(
    grid: &TileGrid,
    tile: TileCoord,
    rng: &mut R,
) -> Result<WallState, WorldError> {
    let mut candidate = WallState::new(rng.gen_range(0..=WallState::MAX))
        .map_err(WallError::from)?;
    for _ in 0..WallState::COUNT {
        if is_acceptable(grid, tile, candidate) {
            return Ok(candidate);
        }
        candidate = candidate.next();
    }

    Err(WorldError::NoValidWallState(tile))
}

fn weighted_state<R: Rng>(
    grid: &TileGrid,
    tile: TileCoord,
    rng: &mut R,
) -> Result<WallState, WorldError> {
    let mut remaining = WALL_BUCKETS.to_vec();
    while !remaining.is_empty() {
        let bucket_index = rng.gen_range(0..remaining.len());
        let bucket = remaining.swap_remove(bucket_index);

        let candidates: Vec<WallState> = WallState::all()
            .filter(|state| state.wall_count() == bucket)
            .filter(|state| is_acceptable(grid, tile, *state))
            .collect();
        if let Some(state) = candidates.choose(rng) {
            return Ok(*state);
        }
    }

    Err(WorldError::NoValidWallState(tile))
}

fn is_acceptable(grid: &TileGrid, tile: TileCoord, state: WallState) -> bool {
    grid.tile(tile).is_some_and(|entry| entry.allows(state))
        && enclosed_neighbor(grid, tile, state).is_none()
}

/// First neighbour that would end up walled on all four sides if `tile`
/// switched to `state`.
fn enclosed_neighbor(grid: &TileGrid, tile: TileCoord, state: WallState) -> Option<TileCoord> {
    let current = grid.tile(tile)?.sides();
    let target = state.sides();

    Direction::ALL.into_iter().find_map(|direction| {
        if !target.has(direction) || current.has(direction) {
            return None;
        }
        let neighbor = grid.neighbor(tile, direction)?;
        let sides = grid.tile(neighbor)?.sides();
        if sides.with(direction.opposite(), true).is_enclosed() {
            Some(neighbor)
        } else {
            None
        }
    })
}
