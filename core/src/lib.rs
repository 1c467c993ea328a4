#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the roomba simulator.
//!
//! This crate defines the message surface that connects the shell, the
//! authoritative world, and the planning systems. The shell submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! describing what changed. Systems read borrowed views such as
//! [`ConnectivityView`] and respond exclusively with new commands.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single tile expressed as `x` (east) and `y` (south) indices.
///
/// Row zero is the northern edge of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: u32,
    y: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns the neighbouring tile in `direction`, if it lies inside a
    /// `width` by `height` grid.
    #[must_use]
    pub fn step(self, direction: Direction, width: u32, height: u32) -> Option<TileCoord> {
        let next = match direction {
            Direction::North => TileCoord::new(self.x, self.y.checked_sub(1)?),
            Direction::East => TileCoord::new(self.x.checked_add(1)?, self.y),
            Direction::South => TileCoord::new(self.x, self.y.checked_add(1)?),
            Direction::West => TileCoord::new(self.x.checked_sub(1)?, self.y),
        };

        if next.x < width && next.y < height {
            Some(next)
        } else {
            None
        }
    }
}

/// Cardinal movement directions, also used to name the sides of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing `y`.
    North,
    /// Toward increasing `x`.
    East,
    /// Toward increasing `y`.
    South,
    /// Toward decreasing `x`.
    West,
}

impl Direction {
    /// Every direction in north, east, south, west order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// The two directions at right angles to this one.
    #[must_use]
    pub const fn perpendicular(self) -> [Direction; 2] {
        match self {
            Self::North | Self::South => [Self::East, Self::West],
            Self::East | Self::West => [Self::North, Self::South],
        }
    }

    /// Direction of a single step between two grid-adjacent tiles.
    ///
    /// Returns `None` when the tiles are not direct neighbours.
    #[must_use]
    pub fn between(from: TileCoord, to: TileCoord) -> Option<Direction> {
        let x_diff = from.x().abs_diff(to.x());
        let y_diff = from.y().abs_diff(to.y());
        if x_diff + y_diff != 1 {
            return None;
        }

        if x_diff == 1 {
            if to.x() > from.x() {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if to.y() > from.y() {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }
}

/// Four booleans describing which sides of a tile carry a wall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallSides {
    north: bool,
    east: bool,
    south: bool,
    west: bool,
}

impl WallSides {
    /// A tile without any walls.
    pub const NONE: WallSides = WallSides::new(false, false, false, false);

    /// Creates a new side mask.
    #[must_use]
    pub const fn new(north: bool, east: bool, south: bool, west: bool) -> Self {
        Self {
            north,
            east,
            south,
            west,
        }
    }

    /// Reports whether the side facing `direction` is walled.
    #[must_use]
    pub const fn has(&self, direction: Direction) -> bool {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    /// Returns a copy with the side facing `direction` set to `active`.
    #[must_use]
    pub const fn with(self, direction: Direction, active: bool) -> Self {
        let mut sides = self;
        match direction {
            Direction::North => sides.north = active,
            Direction::East => sides.east = active,
            Direction::South => sides.south = active,
            Direction::West => sides.west = active,
        }
        sides
    }

    /// Number of walled sides.
    #[must_use]
    pub const fn count(&self) -> u8 {
        self.north as u8 + self.east as u8 + self.south as u8 + self.west as u8
    }

    /// Reports whether any side is walled.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.count() > 0
    }

    /// Reports whether every side is walled, which isolates the tile.
    #[must_use]
    pub const fn is_enclosed(&self) -> bool {
        self.count() == 4
    }

    /// Reports whether every wall in `other` is also present here.
    #[must_use]
    pub const fn contains(&self, other: WallSides) -> bool {
        (self.north || !other.north)
            && (self.east || !other.east)
            && (self.south || !other.south)
            && (self.west || !other.west)
    }
}

const WALL_TABLE: [WallSides; WallState::COUNT] = [
    WallSides::new(false, false, false, false),
    WallSides::new(true, false, false, false),
    WallSides::new(false, true, false, false),
    WallSides::new(false, false, true, false),
    WallSides::new(false, false, false, true),
    WallSides::new(true, true, false, false),
    WallSides::new(true, false, true, false),
    WallSides::new(true, false, false, true),
    WallSides::new(false, true, true, false),
    WallSides::new(false, true, false, true),
    WallSides::new(false, false, true, true),
    WallSides::new(false, true, true, true),
    WallSides::new(true, false, true, true),
    WallSides::new(true, true, false, true),
    WallSides::new(true, true, true, false),
];

/// One of the fifteen legal wall configurations of a tile.
///
/// Values enumerate: none; N; E; S; W; N+E; N+S; N+W; E+S; E+W; S+W; E+S+W;
/// N+S+W; N+E+W; N+E+S. The sixteenth combination, all four walls, has no
/// encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WallState(u8);

impl WallState {
    /// Highest valid state value.
    pub const MAX: u8 = 14;
    /// Number of legal states.
    pub const COUNT: usize = 15;
    /// State without any walls.
    pub const OPEN: WallState = WallState(0);

    /// Validates and wraps a raw state value.
    pub fn new(value: u8) -> Result<Self, WallStateError> {
        if value > Self::MAX {
            return Err(WallStateError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Encodes a side mask, rejecting the fully enclosed configuration.
    pub fn from_sides(sides: WallSides) -> Result<Self, WallStateError> {
        WALL_TABLE
            .iter()
            .position(|candidate| *candidate == sides)
            .map(|index| Self(index as u8))
            .ok_or(WallStateError::Enclosed)
    }

    /// Raw numeric value of the state.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Side mask described by the state.
    #[must_use]
    pub const fn sides(&self) -> WallSides {
        WALL_TABLE[self.0 as usize]
    }

    /// Number of walls active in the state.
    #[must_use]
    pub const fn wall_count(&self) -> u8 {
        self.sides().count()
    }

    /// Next state in numeric order, wrapping from 14 to 0.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.0 >= Self::MAX {
            Self(0)
        } else {
            Self(self.0 + 1)
        }
    }

    /// Previous state in numeric order, wrapping from 0 to 14.
    #[must_use]
    pub const fn previous(self) -> Self {
        if self.0 == 0 {
            Self(Self::MAX)
        } else {
            Self(self.0 - 1)
        }
    }

    /// Iterates every legal state in numeric order.
    pub fn all() -> impl Iterator<Item = WallState> {
        (0..=Self::MAX).map(Self)
    }
}

impl TryFrom<u8> for WallState {
    type Error = WallStateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WallState> for u8 {
    fn from(state: WallState) -> Self {
        state.0
    }
}

/// Reasons a wall configuration is rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum WallStateError {
    /// The raw state lies outside `0..=14`.
    #[error("wall state must be between 0 and {max}, was {0}", max = WallState::MAX)]
    OutOfRange(u8),
    /// The side mask walls every side of the tile.
    #[error("a tile cannot be walled on all four sides")]
    Enclosed,
}

/// Sensing policy driving the autonomous agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisionMode {
    /// Blind movement that only learns about walls by bumping into them.
    #[default]
    BumpSensor,
    /// Senses debris within a bounded number of steps.
    LimitedVision,
    /// Plans over the full debris tour.
    Omniscient,
}

impl VisionMode {
    /// Maps the shell's numeric selector (0, 1, 2) onto a mode.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::BumpSensor),
            1 => Some(Self::LimitedVision),
            2 => Some(Self::Omniscient),
            _ => None,
        }
    }
}

/// Kind of tile click issued by the shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClickKind {
    /// Steps the tile to its next wall state.
    IncrementWalls,
    /// Places or removes debris on the tile.
    ToggleDebris,
    /// Steps the tile to its previous wall state.
    DecrementWalls,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the grid with the provided dimensions and agent position.
    ConfigureGrid {
        /// Number of tile columns.
        width: u32,
        /// Number of tile rows.
        height: u32,
        /// Tile the agent starts on.
        agent: TileCoord,
    },
    /// Replaces the wall configuration of a tile, then repairs reachability.
    SetWallState {
        /// Tile receiving the new configuration.
        tile: TileCoord,
        /// Requested configuration.
        state: WallState,
    },
    /// Steps a tile to its next legal wall state, then repairs reachability.
    IncrementWallState {
        /// Tile to update.
        tile: TileCoord,
    },
    /// Steps a tile to its previous legal wall state, then repairs reachability.
    DecrementWallState {
        /// Tile to update.
        tile: TileCoord,
    },
    /// Activates or deactivates a single wall, mirroring it onto the neighbour,
    /// then repairs reachability.
    SetWall {
        /// Tile owning the wall.
        tile: TileCoord,
        /// Side of the tile the wall sits on.
        direction: Direction,
        /// Whether the wall should be present.
        active: bool,
    },
    /// Randomizes every tile's walls, then repairs reachability.
    RandomizeWalls {
        /// Picks a wall-count bucket first when `true`.
        weighted: bool,
    },
    /// Opens walls until every tile is reachable from the agent.
    RepairReachability,
    /// Places debris on a tile.
    PlaceDebris {
        /// Tile receiving debris.
        tile: TileCoord,
    },
    /// Removes debris from a tile.
    CleanDebris {
        /// Tile being cleaned.
        tile: TileCoord,
    },
    /// Places debris when absent and removes it when present.
    ToggleDebris {
        /// Tile to toggle.
        tile: TileCoord,
    },
    /// Re-rolls debris on every tile with the provided probability.
    RandomizeDebris {
        /// Chance in `0.0..=1.0` that a tile holds debris afterwards.
        probability: f64,
    },
    /// Requests that the agent advance a single tile.
    StepAgent {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces a freshly built grid.
    GridConfigured {
        /// Number of tile columns.
        width: u32,
        /// Number of tile rows.
        height: u32,
    },
    /// Reports that a single wall changed. Emitted for both tiles sharing it.
    WallChanged {
        /// Tile owning the wall.
        tile: TileCoord,
        /// Side of the tile that changed.
        direction: Direction,
        /// Whether the wall is now present.
        active: bool,
    },
    /// Reports that the reachability repair pass opened walls.
    ReachabilityRepaired {
        /// Number of walls that were opened.
        opened: u32,
    },
    /// Confirms that debris was placed.
    DebrisPlaced {
        /// Tile now holding debris.
        tile: TileCoord,
    },
    /// Confirms that debris was removed.
    DebrisCleaned {
        /// Tile that was cleaned.
        tile: TileCoord,
    },
    /// Confirms that the agent moved one tile.
    AgentMoved {
        /// Tile the agent left.
        from: TileCoord,
        /// Tile the agent now occupies.
        to: TileCoord,
        /// Direction of the move.
        direction: Direction,
    },
    /// Reports that a step request hit a wall or the grid edge.
    AgentBlocked {
        /// Tile the agent remains on.
        tile: TileCoord,
        /// Direction that was blocked.
        direction: Direction,
    },
}

impl Event {
    /// Reports whether the event changes wall or debris topology, which
    /// invalidates every cached path.
    #[must_use]
    pub const fn changes_topology(&self) -> bool {
        matches!(
            self,
            Self::GridConfigured { .. }
                | Self::WallChanged { .. }
                | Self::ReachabilityRepaired { .. }
                | Self::DebrisPlaced { .. }
                | Self::DebrisCleaned { .. }
        )
    }
}

/// Immutable representation of the agent's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AgentSnapshot {
    /// Tile currently occupied by the agent.
    pub tile: TileCoord,
    /// Direction of the last successful move.
    pub heading: Direction,
}

/// Slot of an adjacency edge inside the dense edge arrays.
///
/// Horizontal edges join `(x, y)` with `(x + 1, y)` and are stored row-major
/// with `width - 1` entries per row. Vertical edges join `(x, y)` with
/// `(x, y + 1)` and are stored row-major with `width` entries per row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeSlot {
    /// Index into the horizontal edge array.
    Horizontal(usize),
    /// Index into the vertical edge array.
    Vertical(usize),
}

impl EdgeSlot {
    /// Locates the edge leaving `tile` toward `direction`, if both ends lie
    /// inside the grid.
    #[must_use]
    pub fn locate(width: u32, height: u32, tile: TileCoord, direction: Direction) -> Option<Self> {
        let neighbor = tile.step(direction, width, height)?;
        let (west_or_north, is_horizontal) = match direction {
            Direction::East => (tile, true),
            Direction::West => (neighbor, true),
            Direction::South => (tile, false),
            Direction::North => (neighbor, false),
        };

        let x = usize::try_from(west_or_north.x()).ok()?;
        let y = usize::try_from(west_or_north.y()).ok()?;
        let width = usize::try_from(width).ok()?;
        if is_horizontal {
            let stride = width.checked_sub(1)?;
            Some(Self::Horizontal(y.checked_mul(stride)?.checked_add(x)?))
        } else {
            Some(Self::Vertical(y.checked_mul(width)?.checked_add(x)?))
        }
    }

    /// Number of horizontal and vertical edges in a grid.
    #[must_use]
    pub fn counts(width: u32, height: u32) -> (usize, usize) {
        let width = usize::try_from(width).unwrap_or(0);
        let height = usize::try_from(height).unwrap_or(0);
        (
            width.saturating_sub(1) * height,
            width * height.saturating_sub(1),
        )
    }
}

/// Read-only view of which adjacency edges are currently open.
#[derive(Clone, Debug)]
pub struct ConnectivityView<'a> {
    width: u32,
    height: u32,
    horizontal: Cow<'a, [bool]>,
    vertical: Cow<'a, [bool]>,
}

impl<'a> ConnectivityView<'a> {
    /// Captures a view backed by the world's edge arrays.
    #[must_use]
    pub fn new(width: u32, height: u32, horizontal: &'a [bool], vertical: &'a [bool]) -> Self {
        Self {
            width,
            height,
            horizontal: Cow::Borrowed(horizontal),
            vertical: Cow::Borrowed(vertical),
        }
    }

    /// Creates an owned view from explicit edge arrays.
    #[must_use]
    pub fn from_owned(
        width: u32,
        height: u32,
        horizontal: Vec<bool>,
        vertical: Vec<bool>,
    ) -> ConnectivityView<'static> {
        ConnectivityView {
            width,
            height,
            horizontal: Cow::Owned(horizontal),
            vertical: Cow::Owned(vertical),
        }
    }

    /// Creates an owned view in which every interior edge is open.
    #[must_use]
    pub fn open_grid(width: u32, height: u32) -> ConnectivityView<'static> {
        let (horizontal, vertical) = EdgeSlot::counts(width, height);
        Self::from_owned(width, height, vec![true; horizontal], vec![true; vertical])
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reports whether the tile lies inside the grid.
    #[must_use]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.x() < self.width && tile.y() < self.height
    }

    /// Reports whether the agent may step from `tile` toward `direction`.
    ///
    /// Steps off the grid are never open.
    #[must_use]
    pub fn is_open(&self, tile: TileCoord, direction: Direction) -> bool {
        if !self.contains(tile) {
            return false;
        }

        match EdgeSlot::locate(self.width, self.height, tile, direction) {
            Some(EdgeSlot::Horizontal(index)) => {
                self.horizontal.get(index).copied().unwrap_or(false)
            }
            Some(EdgeSlot::Vertical(index)) => self.vertical.get(index).copied().unwrap_or(false),
            None => false,
        }
    }

    /// Iterates the neighbours reachable from `tile` through open edges, in
    /// north, east, south, west order.
    pub fn open_neighbors(
        &self,
        tile: TileCoord,
    ) -> impl Iterator<Item = (Direction, TileCoord)> + '_ {
        Direction::ALL.into_iter().filter_map(move |direction| {
            if self.is_open(tile, direction) {
                tile.step(direction, self.width, self.height)
                    .map(|neighbor| (direction, neighbor))
            } else {
                None
            }
        })
    }
}
