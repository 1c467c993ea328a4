#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use roomba_core::{Command, TileCoord, WallState};
use roomba_world::{query, World};
use serde::{Deserialize, Serialize};

const SNAPSHOT_DOMAIN: &str = "roomba";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "roomba:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Walls, debris and agent position captured from a world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutSnapshot {
    /// Number of tile columns contained in the grid.
    pub columns: u32,
    /// Number of tile rows contained in the grid.
    pub rows: u32,
    /// Tile the agent occupies.
    pub agent: TileCoord,
    /// Wall state of every tile in row-major order.
    pub walls: Vec<WallState>,
    /// Debris tiles in registry order.
    pub debris: Vec<TileCoord>,
}

impl LayoutSnapshot {
    /// Captures the layout of `world`.
    #[must_use]
    pub(crate) fn capture(world: &World) -> Self {
        let (columns, rows) = query::dimensions(world);
        let walls = (0..rows)
            .flat_map(|y| (0..columns).map(move |x| TileCoord::new(x, y)))
            .filter_map(|tile| query::wall_state(world, tile))
            .collect();

        Self {
            columns,
            rows,
            agent: query::agent(world).tile,
            walls,
            debris: query::debris(world).iter().collect(),
        }
    }

    /// Commands that rebuild the captured layout on any world.
    ///
    /// Walls are applied in row-major order, so every tile only ever gains
    /// walls its final state also carries.
    #[must_use]
    pub(crate) fn commands(&self) -> Vec<Command> {
        let mut commands = vec![Command::ConfigureGrid {
            width: self.columns,
            height: self.rows,
            agent: self.agent,
        }];
        let columns = self.columns.max(1);
        commands.extend(self.walls.iter().zip(0_u32..).map(|(state, index)| {
            Command::SetWallState {
                tile: TileCoord::new(index % columns, index / columns),
                state: *state,
            }
        }));
        commands.extend(
            self.debris
                .iter()
                .map(|tile| Command::PlaceDebris { tile: *tile }),
        );
        commands
    }

    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let payload = SerializableSnapshot {
            agent: self.agent,
            walls: self.walls.clone(),
            debris: self.debris.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
            self.columns, self.rows
        ))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        let expected = u64::from(columns) * u64::from(rows);
        if decoded.walls.len() as u64 != expected {
            return Err(LayoutTransferError::WallCountMismatch {
                expected,
                found: decoded.walls.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            agent: decoded.agent,
            walls: decoded.walls,
            debris: decoded.debris,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableSnapshot {
    agent: TileCoord,
    walls: Vec<WallState>,
    debris: Vec<TileCoord>,
}

/// Errors that can occur while encoding or decoding layout transfer strings.
#[derive(Debug)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    InvalidDimensions(String),
    /// The payload does not describe one wall state per tile.
    WallCountMismatch {
        /// Tiles implied by the header dimensions.
        expected: u64,
        /// Wall states found in the payload.
        found: usize,
    },
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for LayoutTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "layout string was empty"),
            Self::MissingPrefix => write!(f, "layout string is missing the prefix"),
            Self::MissingVersion => write!(f, "layout string is missing the version"),
            Self::MissingDimensions => write!(f, "layout string is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "layout string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "layout prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "layout version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::WallCountMismatch { expected, found } => {
                write!(f, "layout lists {found} wall states for {expected} tiles")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode layout payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not process layout payload: {error}")
            }
        }
    }
}

impl Error for LayoutTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || rows == 0 {
        return Err(invalid());
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomba_core::Direction;
    use roomba_world::apply;

    fn replay(commands: Vec<Command>) -> World {
        let mut world = World::new(2, 2, TileCoord::new(0, 0), 0).expect("world");
        let mut events = Vec::new();
        for command in commands {
            apply(&mut world, command, &mut events).expect("command");
        }
        world
    }

    #[test]
    fn exported_layout_restores_walls_debris_and_agent() {
        let mut world = World::new(6, 5, TileCoord::new(3, 2), 11).expect("world");
        let mut events = Vec::new();
        for command in [
            Command::RandomizeWalls { weighted: true },
            Command::RandomizeDebris { probability: 0.3 },
            Command::StepAgent {
                direction: Direction::North,
            },
        ] {
            apply(&mut world, command, &mut events).expect("command");
        }

        let snapshot = LayoutSnapshot::capture(&world);
        let encoded = snapshot.encode().expect("encode");
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:6x5:")));

        let decoded = LayoutSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);

        let restored = replay(decoded.commands());
        assert_eq!(
            LayoutSnapshot::capture(&restored),
            snapshot,
            "replayed commands rebuild the same layout"
        );
    }

    #[test]
    fn decode_rejects_foreign_prefix_and_version() {
        assert!(matches!(
            LayoutSnapshot::decode("maze:v1:2x2:e30"),
            Err(LayoutTransferError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            LayoutSnapshot::decode("roomba:v9:2x2:e30"),
            Err(LayoutTransferError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            LayoutSnapshot::decode("   "),
            Err(LayoutTransferError::EmptyPayload)
        ));
        assert!(matches!(
            LayoutSnapshot::decode("roomba:v1:0x2:e30"),
            Err(LayoutTransferError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn decode_rejects_wall_count_mismatch() {
        let world = World::new(3, 2, TileCoord::new(0, 0), 0).expect("world");
        let mut snapshot = LayoutSnapshot::capture(&world);
        let _ = snapshot.walls.pop();
        let encoded = snapshot.encode().expect("encode");

        assert!(matches!(
            LayoutSnapshot::decode(&encoded),
            Err(LayoutTransferError::WallCountMismatch {
                expected: 6,
                found: 5
            })
        ));
    }

    #[test]
    fn decode_rejects_out_of_range_wall_state() {
        let payload =
            STANDARD_NO_PAD.encode(br#"{"agent":{"x":0,"y":0},"walls":[15],"debris":[]}"#);
        let encoded = format!("{SNAPSHOT_HEADER}:1x1:{payload}");
        assert!(matches!(
            LayoutSnapshot::decode(&encoded),
            Err(LayoutTransferError::InvalidPayload(_))
        ));
    }
}
