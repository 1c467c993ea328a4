//! Adjacency graph tracking which neighbouring tiles are traversable.

use roomba_core::{ConnectivityView, Direction, EdgeSlot, TileCoord};

/// Undirected grid graph with an `open` flag per edge.
///
/// Nodes are implicit (every tile), and the edge set is fixed at
/// construction: one edge per horizontally or vertically adjacent pair. Only
/// the flags change afterwards.
#[derive(Clone, Debug)]
pub(crate) struct AdjacencyGraph {
    width: u32,
    height: u32,
    horizontal: Vec<bool>,
    vertical: Vec<bool>,
}

impl AdjacencyGraph {
    /// Connects every tile to its west and north neighbour with an open edge.
    pub(crate) fn build(width: u32, height: u32) -> Self {
        let (horizontal, vertical) = EdgeSlot::counts(width, height);
        Self {
            width,
            height,
            horizontal: vec![true; horizontal],
            vertical: vec![true; vertical],
        }
    }

    /// Marks the edge leaving `tile` toward `direction`.
    ///
    /// Returns `false` when no such edge exists (grid boundary).
    pub(crate) fn set_open(&mut self, tile: TileCoord, direction: Direction, open: bool) -> bool {
        let slot = match EdgeSlot::locate(self.width, self.height, tile, direction) {
            Some(EdgeSlot::Horizontal(index)) => self.horizontal.get_mut(index),
            Some(EdgeSlot::Vertical(index)) => self.vertical.get_mut(index),
            None => None,
        };

        match slot {
            Some(flag) => {
                *flag = open;
                true
            }
            None => false,
        }
    }

    /// Open flag of the edge leaving `tile` toward `direction`, if it exists.
    pub(crate) fn is_open(&self, tile: TileCoord, direction: Direction) -> Option<bool> {
        match EdgeSlot::locate(self.width, self.height, tile, direction)? {
            EdgeSlot::Horizontal(index) => self.horizontal.get(index).copied(),
            EdgeSlot::Vertical(index) => self.vertical.get(index).copied(),
        }
    }

    pub(crate) fn view(&self) -> ConnectivityView<'_> {
        ConnectivityView::new(self.width, self.height, &self.horizontal, &self.vertical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_opens_every_interior_edge() {
        let graph = AdjacencyGraph::build(3, 2);
        assert_eq!(graph.horizontal.len(), 4);
        assert_eq!(graph.vertical.len(), 3);
        assert!(graph.horizontal.iter().chain(&graph.vertical).all(|open| *open));
        assert_eq!(graph.is_open(TileCoord::new(0, 0), Direction::North), None);
    }

    #[test]
    fn set_open_is_visible_from_both_endpoints() {
        let mut graph = AdjacencyGraph::build(3, 3);
        assert!(graph.set_open(TileCoord::new(1, 1), Direction::South, false));
        assert_eq!(graph.is_open(TileCoord::new(1, 2), Direction::North), Some(false));
        assert!(!graph.view().is_open(TileCoord::new(1, 1), Direction::South));
        assert!(!graph.set_open(TileCoord::new(2, 2), Direction::East, false));
    }
}
