#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for roomba shells.
//!
//! Shells never read the world directly while drawing. They keep a
//! [`SceneDepths`] table in sync with the events the simulation returns and
//! draw whatever it marks visible, using [`TileLayout`] to convert between
//! tiles and screen space.

use anyhow::Result as AnyResult;
use glam::Vec2;
use roomba_core::{AgentSnapshot, Direction, Event, TileCoord};
use roomba_world::{query, World};
use std::{collections::HashMap, error::Error, fmt, fmt::Write as _};

/// Screen-space placement of the tile grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileLayout {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Top-left corner of tile `(0, 0)`.
    pub origin: Vec2,
    /// Side length of a tile in screen units.
    pub tile_length: f32,
}

impl TileLayout {
    /// Tile side length used by the shells.
    pub const DEFAULT_TILE_LENGTH: f32 = 50.0;

    /// Creates a layout descriptor.
    ///
    /// Returns an error when `tile_length` is not positive.
    pub fn new(
        columns: u32,
        rows: u32,
        origin: Vec2,
        tile_length: f32,
    ) -> std::result::Result<Self, RenderingError> {
        if tile_length.is_nan() || tile_length <= f32::EPSILON {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            columns,
            rows,
            origin,
            tile_length,
        })
    }

    /// Total width of the grid.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Total height of the grid.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// Screen rectangle covered by `tile`, or `None` outside the grid.
    #[must_use]
    pub fn tile_rect(&self, tile: TileCoord) -> Option<TileRect> {
        if tile.x() >= self.columns || tile.y() >= self.rows {
            return None;
        }

        let min = self.origin
            + Vec2::new(
                tile.x() as f32 * self.tile_length,
                tile.y() as f32 * self.tile_length,
            );
        Some(TileRect {
            min,
            size: Vec2::splat(self.tile_length),
        })
    }

    /// Tile under `point`, used to resolve clicks.
    #[must_use]
    pub fn tile_at(&self, point: Vec2) -> Option<TileCoord> {
        let local = (point - self.origin) / self.tile_length;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }

        let (column, row) = (local.x.floor() as u32, local.y.floor() as u32);
        (column < self.columns && row < self.rows).then(|| TileCoord::new(column, row))
    }
}

/// Axis-aligned screen rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileRect {
    /// Top-left corner.
    pub min: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl TileRect {
    /// Centre of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }
}

/// Drawing order of a sprite. Higher layers draw on top.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DepthLayer {
    /// Not drawn.
    #[default]
    Hidden,
    /// Tile floor.
    Floor,
    /// Wall segment.
    Wall,
    /// Debris and the agent.
    Foreground,
}

impl DepthLayer {
    /// Numeric z value handed to sprite backends.
    #[must_use]
    pub const fn z(self) -> u8 {
        match self {
            Self::Hidden => 0,
            Self::Floor => 1,
            Self::Wall => 2,
            Self::Foreground => 3,
        }
    }
}

/// Every drawable element of the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sprite {
    /// Floor of a tile.
    Floor(TileCoord),
    /// One side of a tile.
    Wall {
        /// Tile owning the side.
        tile: TileCoord,
        /// Which side.
        direction: Direction,
    },
    /// Debris marker on a tile.
    Debris(TileCoord),
    /// The agent.
    Agent,
}

/// Z-order table kept in sync with world events.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDepths {
    columns: u32,
    rows: u32,
    layers: HashMap<Sprite, DepthLayer>,
    agent: AgentSnapshot,
}

impl SceneDepths {
    /// Builds the table from the current world state.
    #[must_use]
    pub fn from_world(world: &World) -> Self {
        let (columns, rows) = query::dimensions(world);
        let mut layers = HashMap::new();

        for y in 0..rows {
            for x in 0..columns {
                let tile = TileCoord::new(x, y);
                let _ = layers.insert(Sprite::Floor(tile), DepthLayer::Floor);
                let sides = query::wall_sides(world, tile).unwrap_or_default();
                for direction in Direction::ALL {
                    if sides.has(direction) {
                        let _ = layers.insert(Sprite::Wall { tile, direction }, DepthLayer::Wall);
                    }
                }
            }
        }
        for tile in query::debris(world).iter() {
            let _ = layers.insert(Sprite::Debris(tile), DepthLayer::Foreground);
        }
        let _ = layers.insert(Sprite::Agent, DepthLayer::Foreground);

        Self {
            columns,
            rows,
            layers,
            agent: query::agent(world),
        }
    }

    /// Folds `events` into the table. A rebuilt grid resynchronises from
    /// `world`.
    pub fn apply(&mut self, events: &[Event], world: &World) {
        for event in events {
            match *event {
                Event::GridConfigured { .. } => *self = Self::from_world(world),
                Event::WallChanged {
                    tile,
                    direction,
                    active,
                } => {
                    let layer = if active {
                        DepthLayer::Wall
                    } else {
                        DepthLayer::Hidden
                    };
                    self.set(Sprite::Wall { tile, direction }, layer);
                }
                Event::DebrisPlaced { tile } => {
                    self.set(Sprite::Debris(tile), DepthLayer::Foreground)
                }
                Event::DebrisCleaned { tile } => self.set(Sprite::Debris(tile), DepthLayer::Hidden),
                Event::AgentMoved { to, direction, .. } => {
                    self.agent = AgentSnapshot {
                        tile: to,
                        heading: direction,
                    };
                }
                Event::ReachabilityRepaired { .. } | Event::AgentBlocked { .. } => {}
            }
        }
    }

    /// Layer the sprite currently draws on.
    #[must_use]
    pub fn layer(&self, sprite: Sprite) -> DepthLayer {
        self.layers.get(&sprite).copied().unwrap_or_default()
    }

    /// Whether the sprite is drawn at all.
    #[must_use]
    pub fn is_visible(&self, sprite: Sprite) -> bool {
        self.layer(sprite) != DepthLayer::Hidden
    }

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Last known agent position and heading.
    #[must_use]
    pub const fn agent(&self) -> AgentSnapshot {
        self.agent
    }

    fn set(&mut self, sprite: Sprite, layer: DepthLayer) {
        if layer == DepthLayer::Hidden {
            let _ = self.layers.remove(&sprite);
        } else {
            let _ = self.layers.insert(sprite, layer);
        }
    }
}

/// Draws the visible sprites as a text frame.
///
/// Each tile is three characters wide. Walls draw as `---` and `|`, debris as
/// `*`, and the agent as an arrow pointing along its heading.
#[must_use]
pub fn render_ascii(depths: &SceneDepths) -> String {
    let (columns, rows) = depths.dimensions();
    let agent = depths.agent();
    let mut frame = String::new();

    for y in 0..rows {
        horizontal_edge(&mut frame, depths, y, Direction::North);
        for x in 0..columns {
            let tile = TileCoord::new(x, y);
            let west = depths.is_visible(Sprite::Wall {
                tile,
                direction: Direction::West,
            });
            let content = if agent.tile == tile {
                agent_glyph(agent.heading)
            } else if depths.is_visible(Sprite::Debris(tile)) {
                '*'
            } else {
                ' '
            };
            let _ = write!(frame, "{} {content} ", if west { '|' } else { ' ' });
        }
        let east = columns
            .checked_sub(1)
            .map(|last| {
                depths.is_visible(Sprite::Wall {
                    tile: TileCoord::new(last, y),
                    direction: Direction::East,
                })
            })
            .unwrap_or(false);
        frame.push(if east { '|' } else { ' ' });
        frame.push('\n');
    }
    if let Some(last) = rows.checked_sub(1) {
        horizontal_edge(&mut frame, depths, last, Direction::South);
    }

    frame
}

fn horizontal_edge(frame: &mut String, depths: &SceneDepths, row: u32, direction: Direction) {
    let (columns, _) = depths.dimensions();
    for x in 0..columns {
        let tile = TileCoord::new(x, row);
        let wall = depths.is_visible(Sprite::Wall { tile, direction });
        frame.push('+');
        frame.push_str(if wall { "---" } else { "   " });
    }
    frame.push_str("+\n");
}

const fn agent_glyph(heading: Direction) -> char {
    match heading {
        Direction::North => '^',
        Direction::East => '>',
        Direction::South => 'v',
        Direction::West => '<',
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown above the first frame.
    pub title: String,
    /// Screen placement of the grid.
    pub layout: TileLayout,
    /// Initial z-order table.
    pub depths: SceneDepths,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, layout: TileLayout, depths: SceneDepths) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            layout,
            depths,
        }
    }
}

/// Rendering backend capable of presenting roomba scenes.
pub trait RenderingBackend {
    /// Runs the backend until `update_scene` asks it to stop.
    ///
    /// `update_scene` receives the frame index and may mutate the depth
    /// table before the frame is drawn. Returning `Ok(false)` ends the run
    /// after the current frame.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(u64, &mut SceneDepths) -> AnyResult<bool>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tiles must have a positive side length.
    InvalidTileLength {
        /// Provided length that failed validation.
        tile_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(f, "tile_length must be positive (received {tile_length})")
            }
        }
    }
}

impl Error for RenderingError {}
