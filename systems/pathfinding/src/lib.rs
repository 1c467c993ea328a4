#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shortest-path search and the pairwise distance cache built on top of it.
//!
//! Both operate on a borrowed [`roomba_core::ConnectivityView`] and never
//! touch the world directly.

mod cache;
mod search;

use roomba_core::TileCoord;
use thiserror::Error;

pub use cache::{DistanceCache, PathOrigin};
pub use search::SearchState;

/// Failures reported by the shortest-path engine.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The frontier emptied before reaching the goal.
    #[error("no open path from ({}, {}) to ({}, {})", from.x(), from.y(), to.x(), to.y())]
    Unreachable {
        /// Start of the search.
        from: TileCoord,
        /// Goal of the search.
        to: TileCoord,
    },
    /// The start or goal lies outside the grid.
    #[error("tile ({}, {}) lies outside the grid", .0.x(), .0.y())]
    OutOfBounds(TileCoord),
}
