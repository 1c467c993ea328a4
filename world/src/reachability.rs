//! Two-colour reachability repair seeded from the agent's tile.

use std::collections::VecDeque;

use log::debug;
use roomba_core::{Direction, Event, TileCoord};

use crate::{graph::AdjacencyGraph, grid::TileGrid, walls, WallError};

/// Dense reachability colouring of the grid, green meaning "connected to the
/// seed through open edges".
#[derive(Clone, Debug, Default)]
pub(crate) struct ReachabilityField {
    width: u32,
    green: Vec<bool>,
}

impl ReachabilityField {
    /// Colours every tile reachable from `seed` green using a breadth-first
    /// flood over open edges.
    pub(crate) fn flood(grid: &TileGrid, graph: &AdjacencyGraph, seed: TileCoord) -> Self {
        let mut field = Self {
            width: grid.width(),
            green: vec![false; grid.len()],
        };
        field.extend(grid, graph, seed);
        field
    }

    /// Adds the region reachable from `seed` to the green set.
    fn extend(&mut self, grid: &TileGrid, graph: &AdjacencyGraph, seed: TileCoord) {
        let Some(index) = grid.index(seed) else {
            return;
        };
        if self.green[index] {
            return;
        }

        self.green[index] = true;
        let mut queue = VecDeque::from([seed]);
        let view = graph.view();
        while let Some(tile) = queue.pop_front() {
            for (_, neighbor) in view.open_neighbors(tile) {
                let Some(neighbor_index) = grid.index(neighbor) else {
                    continue;
                };
                if self.green[neighbor_index] {
                    continue;
                }

                self.green[neighbor_index] = true;
                queue.push_back(neighbor);
            }
        }
    }

    fn is_green(&self, grid: &TileGrid, tile: TileCoord) -> bool {
        grid.index(tile)
            .and_then(|index| self.green.get(index).copied())
            .unwrap_or(false)
    }

    /// Tiles not connected to the seed, in row-major order.
    pub(crate) fn red_tiles(&self) -> Vec<TileCoord> {
        let width = self.width.max(1);
        self.green
            .iter()
            .enumerate()
            .filter(|(_, green)| !**green)
            .filter_map(|(index, _)| {
                let index = u32::try_from(index).ok()?;
                Some(TileCoord::new(index % width, index / width))
            })
            .collect()
    }
}

/// Opens walls until every tile is reachable from `seed`.
///
/// Red tiles are visited in queue order; a red tile bordering the green region
/// has the shared wall lowered and its whole newly connected region joins the
/// green set. Tiles that do not yet touch green are requeued. Returns the
/// number of walls opened.
pub(crate) fn repair(
    grid: &mut TileGrid,
    graph: &mut AdjacencyGraph,
    seed: TileCoord,
    out_events: &mut Vec<Event>,
) -> Result<u32, WallError> {
    let mut field = ReachabilityField::flood(grid, graph, seed);
    let mut queue: VecDeque<TileCoord> = field.red_tiles().into();
    let mut opened = 0_u32;
    let mut stalled = 0_usize;

    while let Some(tile) = queue.pop_front() {
        if field.is_green(grid, tile) {
            stalled = 0;
            continue;
        }

        let bridge = Direction::ALL.into_iter().find(|direction| {
            grid.neighbor(tile, *direction)
                .is_some_and(|neighbor| field.is_green(grid, neighbor))
        });

        match bridge {
            Some(direction) => {
                if walls::set_wall(grid, graph, tile, direction, false, out_events)? {
                    opened += 1;
                }
                field.extend(grid, graph, tile);
                stalled = 0;
            }
            None => {
                // A full pass without progress means the grid is disconnected.
                stalled += 1;
                if stalled > queue.len() {
                    break;
                }
                queue.push_back(tile);
            }
        }
    }

    if opened > 0 {
        debug!("reachability repair opened {opened} walls");
    }
    Ok(opened)
}
