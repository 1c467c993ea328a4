//! Dense tile storage for the world.

use roomba_core::{Direction, TileCoord, WallSides, WallState, WallStateError};

/// Single grid cell with its wall configuration and debris flag.
#[derive(Clone, Debug)]
pub(crate) struct Tile {
    state: WallState,
    boundary: WallSides,
    disallowed: u16,
    has_debris: bool,
}

impl Tile {
    fn new(coord: TileCoord, width: u32, height: u32) -> Result<Self, WallStateError> {
        let boundary = WallSides::new(
            coord.y() == 0,
            coord.x() + 1 == width,
            coord.y() + 1 == height,
            coord.x() == 0,
        );
        let state = WallState::from_sides(boundary)?;

        let mut disallowed = 0_u16;
        for candidate in WallState::all() {
            if !candidate.sides().contains(boundary) {
                disallowed |= 1 << candidate.get();
            }
        }

        Ok(Self {
            state,
            boundary,
            disallowed,
            has_debris: false,
        })
    }

    pub(crate) const fn state(&self) -> WallState {
        self.state
    }

    pub(crate) const fn sides(&self) -> WallSides {
        self.state.sides()
    }

    pub(crate) const fn boundary(&self) -> WallSides {
        self.boundary
    }

    pub(crate) const fn has_debris(&self) -> bool {
        self.has_debris
    }

    pub(crate) fn set_debris(&mut self, present: bool) {
        self.has_debris = present;
    }

    /// Reports whether the side facing `direction` is a permanent grid edge.
    pub(crate) const fn is_boundary(&self, direction: Direction) -> bool {
        self.boundary.has(direction)
    }

    /// True iff `candidate` lies in `0..=14` and keeps every boundary wall.
    pub(crate) fn validates(&self, candidate: u8) -> bool {
        candidate <= WallState::MAX && self.disallowed & (1 << candidate) == 0
    }

    pub(crate) fn allows(&self, state: WallState) -> bool {
        self.validates(state.get())
    }

    pub(crate) fn set_sides(&mut self, sides: WallSides) -> Result<(), WallStateError> {
        self.state = WallState::from_sides(sides)?;
        Ok(())
    }
}

/// Fixed `width` by `height` array of tiles stored row-major.
#[derive(Clone, Debug)]
pub(crate) struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Builds every tile, seeding mandatory walls along the grid edges.
    pub(crate) fn build(width: u32, height: u32) -> Result<Self, WallStateError> {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        let mut tiles = Vec::with_capacity(capacity);
        for y in 0..height {
            for x in 0..width {
                tiles.push(Tile::new(TileCoord::new(x, y), width, height)?);
            }
        }

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub(crate) const fn width(&self) -> u32 {
        self.width
    }

    pub(crate) const fn height(&self) -> u32 {
        self.height
    }

    pub(crate) const fn contains(&self, tile: TileCoord) -> bool {
        tile.x() < self.width && tile.y() < self.height
    }

    pub(crate) fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.index(coord).and_then(|index| self.tiles.get(index))
    }

    pub(crate) fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        self.index(coord).and_then(move |index| self.tiles.get_mut(index))
    }

    /// Iterates every coordinate in row-major order.
    pub(crate) fn coords(&self) -> impl Iterator<Item = TileCoord> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| TileCoord::new(x, y)))
    }

    pub(crate) fn len(&self) -> usize {
        self.tiles.len()
    }

    pub(crate) fn neighbor(&self, coord: TileCoord, direction: Direction) -> Option<TileCoord> {
        coord.step(direction, self.width, self.height)
    }

    pub(crate) fn index(&self, coord: TileCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let x = usize::try_from(coord.x()).ok()?;
        let y = usize::try_from(coord.y()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        y.checked_mul(width)?.checked_add(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_receive_two_boundary_walls() {
        let grid = TileGrid::build(4, 3).expect("grid");
        let north_west = grid.tile(TileCoord::new(0, 0)).expect("tile");
        assert_eq!(north_west.state().get(), 7);
        let south_east = grid.tile(TileCoord::new(3, 2)).expect("tile");
        assert_eq!(south_east.state().get(), 8);
        let interior = grid.tile(TileCoord::new(1, 1)).expect("tile");
        assert_eq!(interior.state(), WallState::OPEN);
    }

    #[test]
    fn north_edge_disallows_states_without_north_wall() {
        let grid = TileGrid::build(4, 3).expect("grid");
        let tile = grid.tile(TileCoord::new(1, 0)).expect("tile");
        let rejected: Vec<u8> = (0..=WallState::MAX)
            .filter(|candidate| !tile.validates(*candidate))
            .collect();
        assert_eq!(rejected, vec![0, 2, 3, 4, 8, 9, 10, 11]);
        assert!(!tile.validates(15));
    }

    #[test]
    fn single_tile_grid_cannot_be_built() {
        assert_eq!(
            TileGrid::build(1, 1).map(|grid| grid.len()).err(),
            Some(WallStateError::Enclosed)
        );
    }

    #[test]
    fn coords_iterate_row_major() {
        let grid = TileGrid::build(2, 2).expect("grid");
        let coords: Vec<_> = grid.coords().collect();
        assert_eq!(
            coords,
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1),
            ]
        );
    }
}
