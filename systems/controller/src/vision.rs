//! Bounded-radius debris sensing.

use std::collections::{HashMap, VecDeque};

use roomba_core::{ConnectivityView, Direction, TileCoord};

/// First step toward the nearest debris within `radius` steps of `origin`.
///
/// Sensing follows open edges only, so debris behind a wall is invisible even
/// when it is geometrically close. Ties between equally distant debris resolve
/// in north, east, south, west expansion order. The origin tile itself is not
/// sensed.
pub(crate) fn nearest_debris_step<F>(
    view: &ConnectivityView<'_>,
    origin: TileCoord,
    radius: u32,
    has_debris: F,
) -> Option<Direction>
where
    F: Fn(TileCoord) -> bool,
{
    let mut parents: HashMap<TileCoord, TileCoord> = HashMap::new();
    let mut queue = VecDeque::from([(origin, 0_u32)]);

    while let Some((tile, depth)) = queue.pop_front() {
        if tile != origin && has_debris(tile) {
            return first_step(&parents, origin, tile);
        }
        if depth >= radius {
            continue;
        }

        for (_, neighbor) in view.open_neighbors(tile) {
            if neighbor == origin || parents.contains_key(&neighbor) {
                continue;
            }
            let _ = parents.insert(neighbor, tile);
            queue.push_back((neighbor, depth + 1));
        }
    }

    None
}

fn first_step(
    parents: &HashMap<TileCoord, TileCoord>,
    origin: TileCoord,
    target: TileCoord,
) -> Option<Direction> {
    let mut current = target;
    while let Some(parent) = parents.get(&current) {
        if *parent == origin {
            return Direction::between(origin, current);
        }
        current = *parent;
    }
    None
}
