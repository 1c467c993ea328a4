//! Registry of tiles currently holding debris.

use std::collections::BTreeSet;

use roomba_core::TileCoord;

/// Ordered set of debris locations.
///
/// Iteration follows coordinate order (`x`, then `y`), which fixes the order
/// in which a fresh tour visits the debris.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebrisRegistry {
    tiles: BTreeSet<TileCoord>,
}

impl DebrisRegistry {
    /// Records debris on `tile`, returning `false` when it was already present.
    pub(crate) fn place(&mut self, tile: TileCoord) -> bool {
        self.tiles.insert(tile)
    }

    /// Removes debris from `tile`, returning `false` when there was none.
    pub(crate) fn clean(&mut self, tile: TileCoord) -> bool {
        self.tiles.remove(&tile)
    }

    /// Reports whether `tile` holds debris.
    #[must_use]
    pub fn contains(&self, tile: TileCoord) -> bool {
        self.tiles.contains(&tile)
    }

    /// Iterates debris locations in registry order.
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.tiles.iter().copied()
    }

    /// Number of tiles holding debris.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.tiles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_twice_succeeds_then_fails() {
        let mut registry = DebrisRegistry::default();
        assert!(registry.place(TileCoord::new(2, 1)));
        assert!(!registry.place(TileCoord::new(2, 1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clean_on_empty_tile_fails() {
        let mut registry = DebrisRegistry::default();
        assert!(!registry.clean(TileCoord::new(0, 0)));
        assert!(registry.place(TileCoord::new(0, 0)));
        assert!(registry.clean(TileCoord::new(0, 0)));
        assert!(registry.is_empty());
    }

    #[test]
    fn iteration_follows_coordinate_order() {
        let mut registry = DebrisRegistry::default();
        for tile in [TileCoord::new(2, 0), TileCoord::new(0, 3), TileCoord::new(0, 1)] {
            let _ = registry.place(tile);
        }
        let order: Vec<_> = registry.iter().collect();
        assert_eq!(
            order,
            vec![TileCoord::new(0, 1), TileCoord::new(0, 3), TileCoord::new(2, 0)]
        );
    }
}
