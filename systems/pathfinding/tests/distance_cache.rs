use roomba_core::{Command, Direction, TileCoord};
use roomba_system_pathfinding::{DistanceCache, PathOrigin, SearchState};
use roomba_world::{self as world, query, World};

fn world_with_debris(width: u32, height: u32, agent: TileCoord, debris: &[TileCoord]) -> World {
    let mut world = World::new(width, height, agent, 3).expect("world");
    let mut events = Vec::new();
    for &tile in debris {
        world::apply(&mut world, Command::PlaceDebris { tile }, &mut events).expect("place");
    }
    world
}

fn debris_list(world: &World) -> Vec<TileCoord> {
    query::debris(world).iter().collect()
}

#[test]
fn open_three_by_three_has_two_hop_agent_paths() {
    let agent = TileCoord::new(1, 1);
    let corners = [TileCoord::new(0, 0), TileCoord::new(2, 2)];
    let world = world_with_debris(3, 3, agent, &corners);
    let mut cache = DistanceCache::new();

    cache
        .recompute_all(&query::connectivity_view(&world), agent, &debris_list(&world))
        .expect("recompute");

    for corner in corners {
        assert_eq!(
            cache.cost(PathOrigin::Agent, corner),
            Some(2),
            "agent to {corner:?} should take two hops"
        );
    }
    assert_eq!(
        cache.cost(PathOrigin::Tile(corners[0]), corners[1]),
        Some(4),
        "corner to corner crosses the whole grid"
    );
}

#[test]
fn cached_paths_respect_walls_added_in_world() {
    let agent = TileCoord::new(0, 0);
    let target = TileCoord::new(2, 0);
    let mut world = world_with_debris(3, 2, agent, &[target]);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetWall {
            tile: TileCoord::new(0, 0),
            direction: Direction::East,
            active: true,
        },
        &mut events,
    )
    .expect("wall");

    let mut cache = DistanceCache::new();
    let view = query::connectivity_view(&world);
    cache
        .recompute_all(&view, agent, &debris_list(&world))
        .expect("recompute");

    let path = cache.path(PathOrigin::Agent, target).expect("path");
    assert_eq!(path.len() - 1, 4, "wall forces a detour through the south row");
    for pair in path.windows(2) {
        let direction = Direction::between(pair[0], pair[1]).expect("adjacent tiles");
        assert!(view.is_open(pair[0], direction), "path must only use open edges");
    }
}

#[test]
fn search_over_randomized_world_reaches_every_tile() {
    let agent = TileCoord::new(3, 3);
    let mut world = World::new(7, 8, agent, 19).expect("world");
    let mut events = Vec::new();
    world::apply(&mut world, Command::RandomizeWalls { weighted: true }, &mut events)
        .expect("randomize");

    let view = query::connectivity_view(&world);
    let mut search = SearchState::new();
    for y in 0..8 {
        for x in 0..7 {
            let goal = TileCoord::new(x, y);
            let path = search.find_path(&view, agent, goal).expect("repaired world is connected");
            assert!(
                path.len() > goal.manhattan_distance(agent) as usize,
                "path to {goal:?} cannot beat the Manhattan bound"
            );
        }
    }
}
