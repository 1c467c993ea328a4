//! Best-first shortest-path search over open grid edges.

use std::collections::{HashMap, HashSet, VecDeque};

use log::trace;
use roomba_core::{ConnectivityView, TileCoord};

use crate::PathError;

#[derive(Clone, Copy, Debug)]
struct FrontierEntry {
    tile: TileCoord,
    parent: Option<TileCoord>,
    steps: u32,
    cost: u32,
}

/// Reusable search workspace holding the sorted frontier and handled set.
///
/// The frontier is kept sorted by `manhattan(tile, goal) + steps + 1`. New
/// entries are inserted after every entry of equal cost, so ties resolve in
/// insertion order. Buffers are cleared, not dropped, between searches.
#[derive(Clone, Debug, Default)]
pub struct SearchState {
    frontier: VecDeque<FrontierEntry>,
    handled: HashSet<TileCoord>,
    came_from: HashMap<TileCoord, TileCoord>,
    expanded: usize,
}

impl SearchState {
    /// Creates an empty search workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tiles expanded by the most recent search.
    #[must_use]
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// Computes the shortest open path from `from` to `to`, both included.
    ///
    /// Returns [`PathError::Unreachable`] when walls separate the tiles; a
    /// partial path is never produced.
    pub fn find_path(
        &mut self,
        view: &ConnectivityView<'_>,
        from: TileCoord,
        to: TileCoord,
    ) -> Result<Vec<TileCoord>, PathError> {
        for tile in [from, to] {
            if !view.contains(tile) {
                return Err(PathError::OutOfBounds(tile));
            }
        }

        self.frontier.clear();
        self.handled.clear();
        self.came_from.clear();
        self.expanded = 0;

        self.insert(FrontierEntry {
            tile: from,
            parent: None,
            steps: 0,
            cost: from.manhattan_distance(to) + 1,
        });

        while let Some(entry) = self.frontier.pop_front() {
            if !self.handled.insert(entry.tile) {
                continue;
            }
            if let Some(parent) = entry.parent {
                let _ = self.came_from.insert(entry.tile, parent);
            }
            if entry.tile == to {
                return Ok(self.reconstruct(from, to));
            }

            self.expanded += 1;
            trace!(
                "expanding ({}, {}) at cost {}",
                entry.tile.x(),
                entry.tile.y(),
                entry.cost
            );

            let steps = entry.steps + 1;
            for (_, neighbor) in view.open_neighbors(entry.tile) {
                if self.handled.contains(&neighbor) {
                    continue;
                }
                self.insert(FrontierEntry {
                    tile: neighbor,
                    parent: Some(entry.tile),
                    steps,
                    cost: neighbor.manhattan_distance(to) + steps + 1,
                });
            }
        }

        Err(PathError::Unreachable { from, to })
    }

    fn insert(&mut self, entry: FrontierEntry) {
        let position = self
            .frontier
            .partition_point(|queued| queued.cost <= entry.cost);
        self.frontier.insert(position, entry);
    }

    fn reconstruct(&self, from: TileCoord, to: TileCoord) -> Vec<TileCoord> {
        let mut path = vec![to];
        let mut current = to;
        while current != from {
            match self.came_from.get(&current) {
                Some(parent) => {
                    current = *parent;
                    path.push(current);
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomba_core::{Direction, EdgeSlot};

    fn assert_valid_path(view: &ConnectivityView<'_>, path: &[TileCoord]) {
        for pair in path.windows(2) {
            let direction = Direction::between(pair[0], pair[1])
                .unwrap_or_else(|| panic!("{:?} and {:?} are not adjacent", pair[0], pair[1]));
            assert!(
                view.is_open(pair[0], direction),
                "path crosses a wall between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn open_grid_paths_follow_manhattan_distance() {
        let view = ConnectivityView::open_grid(5, 4);
        let mut search = SearchState::new();
        let from = TileCoord::new(0, 3);
        let to = TileCoord::new(4, 0);

        let path = search.find_path(&view, from, to).expect("path");

        assert_eq!(path.first(), Some(&from));
        assert_eq!(path.last(), Some(&to));
        assert_eq!(path.len() - 1, from.manhattan_distance(to) as usize);
        assert_valid_path(&view, &path);
    }

    #[test]
    fn search_to_self_returns_single_tile() {
        let view = ConnectivityView::open_grid(3, 3);
        let mut search = SearchState::new();
        let tile = TileCoord::new(1, 1);
        assert_eq!(search.find_path(&view, tile, tile), Ok(vec![tile]));
    }

    #[test]
    fn detours_around_walls() {
        // Wall between (0, 0)-(1, 0) and (0, 1)-(1, 1) leaves the south row open.
        let (horizontal, vertical) = EdgeSlot::counts(2, 3);
        let mut horizontal = vec![true; horizontal];
        horizontal[0] = false;
        horizontal[1] = false;
        let view = ConnectivityView::from_owned(2, 3, horizontal, vec![true; vertical]);
        let mut search = SearchState::new();

        let path = search
            .find_path(&view, TileCoord::new(0, 0), TileCoord::new(1, 0))
            .expect("path");

        assert_eq!(
            path,
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(0, 1),
                TileCoord::new(0, 2),
                TileCoord::new(1, 2),
                TileCoord::new(1, 1),
                TileCoord::new(1, 0),
            ]
        );
        assert_valid_path(&view, &path);
    }

    #[test]
    fn walled_off_goal_is_unreachable() {
        let (horizontal, vertical) = EdgeSlot::counts(2, 2);
        let view =
            ConnectivityView::from_owned(2, 2, vec![false; horizontal], vec![false; vertical]);
        let mut search = SearchState::new();
        let from = TileCoord::new(0, 0);
        let to = TileCoord::new(1, 1);
        assert_eq!(
            search.find_path(&view, from, to),
            Err(PathError::Unreachable { from, to })
        );
    }

    #[test]
    fn out_of_bounds_goal_is_rejected() {
        let view = ConnectivityView::open_grid(3, 3);
        let mut search = SearchState::new();
        let goal = TileCoord::new(3, 1);
        assert_eq!(
            search.find_path(&view, TileCoord::new(0, 0), goal),
            Err(PathError::OutOfBounds(goal))
        );
    }

    #[test]
    fn state_is_reusable_between_searches() {
        let view = ConnectivityView::open_grid(4, 4);
        let mut search = SearchState::new();
        let first = search
            .find_path(&view, TileCoord::new(0, 0), TileCoord::new(3, 3))
            .expect("first");
        let second = search
            .find_path(&view, TileCoord::new(3, 3), TileCoord::new(0, 0))
            .expect("second");
        assert_eq!(first.len(), second.len());
        assert!(search.expanded() > 0);
    }
}
