#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Approximate debris tour planner using randomized 2-opt segment reversal.

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roomba_core::TileCoord;
use roomba_system_pathfinding::{DistanceCache, PathOrigin};
use thiserror::Error;

/// RNG stream reserved for tour swaps.
const TOUR_STREAM: u64 = 1;

/// Tuning knobs for the local search.
#[derive(Clone, Debug)]
pub struct TourSettings {
    /// Improvement iterations per debris tile; the loop runs this times the debris count.
    pub iterations_per_stop: u32,
    /// Attempts to draw a non-degenerate pair of edges before skipping an iteration.
    pub swap_retries: u32,
}

impl Default for TourSettings {
    fn default() -> Self {
        Self {
            iterations_per_stop: 10,
            swap_retries: 10,
        }
    }
}

/// Failures raised while costing a tour.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TourError {
    /// The distance cache has no path for a hop of the tour.
    #[error("no cached path from {from:?} to ({}, {})", to.x(), to.y())]
    MissingPath {
        /// Origin of the hop.
        from: PathOrigin,
        /// Destination of the hop.
        to: TileCoord,
    },
}

/// Ordered visit plan starting on the agent's tile.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tour {
    stops: Vec<TileCoord>,
    total_cost: u32,
}

impl Tour {
    /// Agent tile followed by every debris tile in visiting order.
    #[must_use]
    pub fn stops(&self) -> &[TileCoord] {
        &self.stops
    }

    /// Sum of the cached path lengths between consecutive stops.
    #[must_use]
    pub const fn total_cost(&self) -> u32 {
        self.total_cost
    }

    /// First debris tile the agent should head for.
    #[must_use]
    pub fn next_stop(&self) -> Option<TileCoord> {
        self.stops.get(1).copied()
    }

    fn start(&self) -> Option<TileCoord> {
        self.stops.first().copied()
    }

    fn covers_same_debris(&self, other: &Tour) -> bool {
        let mut own: Vec<TileCoord> = self.stops.iter().skip(1).copied().collect();
        let mut theirs: Vec<TileCoord> = other.stops.iter().skip(1).copied().collect();
        own.sort_unstable();
        theirs.sort_unstable();
        own == theirs
    }

    fn is_comparable(&self, other: &Tour) -> bool {
        self.start() == other.start() && self.covers_same_debris(other)
    }
}

/// Builds and locally improves debris tours, keeping the best one found.
#[derive(Clone, Debug)]
pub struct TourPlanner {
    settings: TourSettings,
    rng: ChaCha8Rng,
    best: Option<Tour>,
}

impl TourPlanner {
    /// Creates a planner whose swaps replay deterministically from `seed`.
    #[must_use]
    pub fn new(settings: TourSettings, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(TOUR_STREAM);
        Self {
            settings,
            rng,
            best: None,
        }
    }

    /// Best tour currently known.
    #[must_use]
    pub fn tour(&self) -> Option<&Tour> {
        self.best.as_ref()
    }

    /// Drops the stored tour so the next recompute replaces it unconditionally.
    pub fn invalidate(&mut self) {
        self.best = None;
    }

    /// Builds a tour from `agent` through `debris` in registry order, improves
    /// it with randomized 2-opt reversals, and keeps it if it beats the stored
    /// tour (or no comparable tour is stored).
    pub fn recompute(
        &mut self,
        cache: &DistanceCache,
        agent: TileCoord,
        debris: &[TileCoord],
    ) -> Result<&Tour, TourError> {
        let mut stops = Vec::with_capacity(debris.len() + 1);
        stops.push(agent);
        stops.extend_from_slice(debris);
        let mut cost = tour_cost(cache, &stops)?;
        let initial_cost = cost;

        let iterations = self
            .settings
            .iterations_per_stop
            .saturating_mul(u32::try_from(debris.len()).unwrap_or(u32::MAX));
        let mut improvements = 0_u32;
        for _ in 0..iterations {
            let Some((first, last)) = self.pick_segment(stops.len()) else {
                continue;
            };

            stops[first..=last].reverse();
            let candidate = tour_cost(cache, &stops)?;
            if candidate < cost {
                cost = candidate;
                improvements += 1;
            } else {
                stops[first..=last].reverse();
            }
        }

        debug!(
            "tour over {} debris: cost {initial_cost} -> {cost} after {improvements} improvements",
            debris.len()
        );

        let candidate = Tour {
            stops,
            total_cost: cost,
        };
        let best = match self.best.take() {
            Some(stored)
                if stored.is_comparable(&candidate) && stored.total_cost <= candidate.total_cost =>
            {
                stored
            }
            _ => candidate,
        };
        Ok(self.best.insert(best))
    }

    /// Draws two edges `(i, i + 1)` and `(j, j + 1)` and returns the stop
    /// range `i + 1..=j` between them. `j + 1` may fall past the last stop,
    /// which reverses the tail of the open path. The agent stop never moves.
    fn pick_segment(&mut self, len: usize) -> Option<(usize, usize)> {
        if len < 3 {
            return None;
        }

        for _ in 0..self.settings.swap_retries {
            let i = self.rng.gen_range(0..len - 1);
            let j = self.rng.gen_range(0..len);
            if j >= i + 2 {
                return Some((i + 1, j));
            }
        }
        None
    }
}

/// Sums cached hop lengths along `stops`, using the agent origin for the first hop.
fn tour_cost(cache: &DistanceCache, stops: &[TileCoord]) -> Result<u32, TourError> {
    let mut total = 0_u32;
    for (index, pair) in stops.windows(2).enumerate() {
        let from = if index == 0 {
            PathOrigin::Agent
        } else {
            PathOrigin::Tile(pair[0])
        };
        let hop = cache
            .cost(from, pair[1])
            .ok_or(TourError::MissingPath { from, to: pair[1] })?;
        total = total.saturating_add(hop);
    }
    Ok(total)
}
