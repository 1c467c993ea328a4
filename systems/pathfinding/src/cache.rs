//! Memoized shortest paths between debris tiles and from the agent.

use std::collections::HashMap;

use log::debug;
use roomba_core::{ConnectivityView, TileCoord};

use crate::{search::SearchState, PathError};

/// Origin of a cached path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathOrigin {
    /// The agent's current tile. Agent entries are refreshed after every move.
    Agent,
    /// A debris tile.
    Tile(TileCoord),
}

/// Shortest open paths for every ordered pair of debris tiles plus the agent.
///
/// Paths include both endpoints, so a path's cost is its length minus one.
#[derive(Clone, Debug, Default)]
pub struct DistanceCache {
    paths: HashMap<PathOrigin, HashMap<TileCoord, Vec<TileCoord>>>,
    search: SearchState,
    searches: usize,
}

impl DistanceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds every entry after a wall or debris change.
    ///
    /// `A -> B` reuses the reverse of `B -> A` when that pair was already
    /// computed, so each unordered debris pair costs one search.
    pub fn recompute_all(
        &mut self,
        view: &ConnectivityView<'_>,
        agent: TileCoord,
        debris: &[TileCoord],
    ) -> Result<(), PathError> {
        self.paths.clear();
        self.searches = 0;

        for &from in debris {
            for &to in debris {
                if from == to {
                    continue;
                }

                let reversed = self
                    .path(PathOrigin::Tile(to), from)
                    .map(|path| path.iter().rev().copied().collect::<Vec<_>>());
                let path = match reversed {
                    Some(path) => path,
                    None => self.search(view, from, to)?,
                };
                let _ = self
                    .paths
                    .entry(PathOrigin::Tile(from))
                    .or_default()
                    .insert(to, path);
            }
        }

        self.recompute_agent_entries(view, agent, debris)?;
        debug!(
            "distance cache rebuilt for {} debris tiles with {} searches",
            debris.len(),
            self.searches
        );
        Ok(())
    }

    /// Refreshes only the agent's paths after a move that left walls intact.
    ///
    /// Entries for debris no longer listed are pruned; the remaining
    /// debris-to-debris paths stay valid because topology did not change.
    pub fn recompute_agent(
        &mut self,
        view: &ConnectivityView<'_>,
        agent: TileCoord,
        debris: &[TileCoord],
    ) -> Result<(), PathError> {
        self.searches = 0;
        self.paths.retain(|origin, targets| {
            let keep = match origin {
                PathOrigin::Agent => false,
                PathOrigin::Tile(tile) => debris.contains(tile),
            };
            targets.retain(|tile, _| debris.contains(tile));
            keep
        });

        self.recompute_agent_entries(view, agent, debris)
    }

    fn recompute_agent_entries(
        &mut self,
        view: &ConnectivityView<'_>,
        agent: TileCoord,
        debris: &[TileCoord],
    ) -> Result<(), PathError> {
        let mut entries = HashMap::with_capacity(debris.len());
        for &to in debris {
            let path = self.search(view, agent, to)?;
            let _ = entries.insert(to, path);
        }
        let _ = self.paths.insert(PathOrigin::Agent, entries);
        Ok(())
    }

    fn search(
        &mut self,
        view: &ConnectivityView<'_>,
        from: TileCoord,
        to: TileCoord,
    ) -> Result<Vec<TileCoord>, PathError> {
        self.searches += 1;
        self.search.find_path(view, from, to)
    }

    /// Cached path from `origin` to `to`, both endpoints included.
    #[must_use]
    pub fn path(&self, origin: PathOrigin, to: TileCoord) -> Option<&[TileCoord]> {
        self.paths
            .get(&origin)
            .and_then(|targets| targets.get(&to))
            .map(Vec::as_slice)
    }

    /// Number of steps along the cached path from `origin` to `to`.
    #[must_use]
    pub fn cost(&self, origin: PathOrigin, to: TileCoord) -> Option<u32> {
        self.path(origin, to)
            .and_then(|path| u32::try_from(path.len().saturating_sub(1)).ok())
    }

    /// Searches run by the most recent recompute.
    #[must_use]
    pub fn searches(&self) -> usize {
        self.searches
    }

    /// Number of cached paths across all origins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.values().map(HashMap::len).sum()
    }

    /// Reports whether no path is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairwise_entries_reuse_reversed_paths() {
        let view = ConnectivityView::open_grid(4, 4);
        let mut cache = DistanceCache::new();
        let debris = [TileCoord::new(0, 0), TileCoord::new(3, 1), TileCoord::new(1, 3)];

        cache
            .recompute_all(&view, TileCoord::new(2, 2), &debris)
            .expect("recompute");

        // Three unordered pairs plus three agent paths.
        assert_eq!(cache.searches(), 6);
        assert_eq!(cache.len(), 9);
        for &a in &debris {
            for &b in &debris {
                if a == b {
                    continue;
                }
                let forward = cache.path(PathOrigin::Tile(a), b).expect("forward");
                let mut backward = cache
                    .path(PathOrigin::Tile(b), a)
                    .expect("backward")
                    .to_vec();
                backward.reverse();
                assert_eq!(forward, backward.as_slice());
            }
        }
    }

    #[test]
    fn agent_recompute_prunes_cleaned_debris() {
        let view = ConnectivityView::open_grid(3, 3);
        let mut cache = DistanceCache::new();
        let debris = [TileCoord::new(0, 0), TileCoord::new(2, 2), TileCoord::new(2, 0)];
        cache
            .recompute_all(&view, TileCoord::new(1, 1), &debris)
            .expect("recompute");

        let remaining = [TileCoord::new(0, 0), TileCoord::new(2, 2)];
        cache
            .recompute_agent(&view, TileCoord::new(2, 0), &remaining)
            .expect("agent recompute");

        assert_eq!(cache.searches(), 2, "only agent paths are searched");
        assert_eq!(cache.len(), 4);
        assert!(cache.path(PathOrigin::Tile(TileCoord::new(2, 0)), TileCoord::new(0, 0)).is_none());
        assert!(cache.path(PathOrigin::Tile(TileCoord::new(0, 0)), TileCoord::new(2, 0)).is_none());
        assert_eq!(cache.cost(PathOrigin::Agent, TileCoord::new(2, 2)), Some(2));
    }

    #[test]
    fn empty_registry_keeps_empty_agent_entry() {
        let view = ConnectivityView::open_grid(2, 2);
        let mut cache = DistanceCache::new();
        cache
            .recompute_all(&view, TileCoord::new(0, 0), &[])
            .expect("recompute");
        assert!(cache.is_empty());
        assert_eq!(cache.searches(), 0);
    }
}
