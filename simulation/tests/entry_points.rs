use roomba_core::{ClickKind, Direction, Event, TileCoord, VisionMode, WallSides};
use roomba_simulation::{Simulation, SimulationConfig, SimulationError};
use roomba_world::query;

fn simulation(width: u32, height: u32, agent: TileCoord) -> Simulation {
    Simulation::new(SimulationConfig {
        width,
        height,
        agent_start: agent,
        ticks_per_move: 1,
        ..SimulationConfig::default()
    })
    .expect("simulation")
}

#[test]
fn new_rejects_invalid_config() {
    let result = Simulation::new(SimulationConfig {
        width: 1,
        ..SimulationConfig::default()
    });
    assert!(matches!(result, Err(SimulationError::Config(_))));
}

#[test]
fn debris_click_replans_tour() {
    let mut sim = simulation(3, 3, TileCoord::new(1, 1));
    sim.on_tile_click(0, 0, ClickKind::ToggleDebris).expect("place");
    sim.on_tile_click(2, 2, ClickKind::ToggleDebris).expect("place");

    let snapshot = sim.snapshot();
    assert_eq!(snapshot.debris, vec![TileCoord::new(0, 0), TileCoord::new(2, 2)]);
    assert_eq!(snapshot.tour.len(), 3, "tour starts at the agent and visits both tiles");
    assert_eq!(snapshot.tour_cost, Some(6));
    assert_eq!(snapshot.planned_cost, Some(6));
    assert_eq!(snapshot.moves_since_plan, 0);
}

#[test]
fn wall_clicks_step_through_states() {
    let mut sim = simulation(3, 3, TileCoord::new(0, 0));
    let tile = TileCoord::new(1, 1);
    sim.on_tile_click(1, 1, ClickKind::IncrementWalls).expect("increment");
    assert_eq!(
        query::wall_sides(sim.world(), tile),
        Some(WallSides::new(true, false, false, false))
    );
    sim.on_tile_click(1, 1, ClickKind::DecrementWalls).expect("decrement");
    assert_eq!(query::wall_sides(sim.world(), tile), Some(WallSides::NONE));
}

#[test]
fn click_outside_grid_is_rejected_without_mutation() {
    let mut sim = simulation(3, 3, TileCoord::new(0, 0));
    let before = sim.snapshot();
    assert!(sim.on_tile_click(5, 5, ClickKind::ToggleDebris).is_err());
    assert_eq!(sim.snapshot(), before);
}

#[test]
fn directional_input_bypasses_gate_and_inactive_agent() {
    let mut sim = Simulation::new(SimulationConfig {
        width: 3,
        height: 3,
        ticks_per_move: 50,
        ..SimulationConfig::default()
    })
    .expect("simulation");

    sim.on_directional_input(Direction::South);
    let events = sim.tick().expect("tick");
    assert_eq!(
        events.first(),
        Some(&Event::AgentMoved {
            from: TileCoord::new(0, 0),
            to: TileCoord::new(0, 1),
            direction: Direction::South,
        })
    );

    sim.on_directional_input(Direction::West);
    let events = sim.tick().expect("tick");
    assert_eq!(
        events,
        vec![Event::AgentBlocked {
            tile: TileCoord::new(0, 1),
            direction: Direction::West,
        }],
        "blocked intent is a reported no-op"
    );

    assert!(sim.tick().expect("tick").is_empty(), "intent is consumed once");
}

#[test]
fn moves_count_until_next_full_replan() {
    let mut sim = simulation(4, 2, TileCoord::new(0, 0));
    sim.on_tile_click(3, 1, ClickKind::ToggleDebris).expect("place");
    sim.set_vision(VisionMode::Omniscient);
    assert!(sim.toggle_agent_active());

    let _ = sim.tick().expect("tick");
    let _ = sim.tick().expect("tick");
    let snapshot = sim.snapshot();
    assert_eq!(snapshot.moves_since_plan, 2);
    assert_eq!(snapshot.planned_cost, Some(4));
    assert_eq!(snapshot.tour_cost, Some(2), "agent-only recompute shortens the tour");

    sim.on_tile_click(0, 0, ClickKind::ToggleDebris).expect("place");
    assert_eq!(sim.snapshot().moves_since_plan, 0, "edits trigger a full re-plan");
}

#[test]
fn agent_cleans_all_debris_in_omniscient_mode() {
    let mut sim = simulation(5, 5, TileCoord::new(2, 2));
    for (x, y) in [(0, 0), (4, 0), (4, 4), (0, 4)] {
        sim.on_tile_click(x, y, ClickKind::ToggleDebris).expect("place");
    }
    sim.set_vision(VisionMode::Omniscient);
    let _ = sim.toggle_agent_active();

    for _ in 0..40 {
        let _ = sim.tick().expect("tick");
    }

    let snapshot = sim.snapshot();
    assert!(snapshot.debris.is_empty(), "remaining debris: {:?}", snapshot.debris);
    assert_eq!(snapshot.tour, vec![snapshot.agent.tile]);
}

#[test]
fn failure_mode_redeposits_on_vacated_tile() {
    let mut sim = Simulation::new(SimulationConfig {
        width: 3,
        height: 3,
        ticks_per_move: 1,
        failure_probability: 1.0,
        ..SimulationConfig::default()
    })
    .expect("simulation");
    assert!(sim.toggle_failure_mode());

    sim.on_directional_input(Direction::East);
    let events = sim.tick().expect("tick");

    assert!(events.contains(&Event::DebrisPlaced {
        tile: TileCoord::new(0, 0)
    }));
    let snapshot = sim.snapshot();
    assert_eq!(snapshot.debris, vec![TileCoord::new(0, 0)]);
    assert_eq!(snapshot.moves_since_plan, 0, "re-deposit forces a full re-plan");
    assert_eq!(snapshot.planned_cost, Some(1));
}

#[test]
fn randomized_walls_keep_grid_connected() {
    let mut sim = simulation(7, 8, TileCoord::new(0, 0));
    for weighted in [false, true] {
        sim.randomize_walls(weighted).expect("randomize");
        assert!(query::unreachable_tiles(sim.world()).is_empty());
    }
}

#[test]
fn wall_clicks_keep_debris_reachable_for_the_planner() {
    let mut sim = simulation(3, 3, TileCoord::new(0, 0));
    let debris = TileCoord::new(2, 1);
    sim.on_tile_click(2, 1, ClickKind::ToggleDebris).expect("place");

    // These clicks would wall off the last column if left unrepaired.
    for (x, y) in [(1, 0), (1, 1), (1, 1), (1, 2), (1, 2)] {
        sim.on_tile_click(x, y, ClickKind::IncrementWalls)
            .unwrap_or_else(|error| panic!("click on ({x}, {y}) failed: {error}"));
    }

    assert!(query::unreachable_tiles(sim.world()).is_empty());
    let snapshot = sim.snapshot();
    assert_eq!(snapshot.tour, vec![TileCoord::new(0, 0), debris]);
    assert!(snapshot.planned_cost.is_some());

    sim.set_vision(VisionMode::Omniscient);
    let _ = sim.toggle_agent_active();
    for _ in 0..20 {
        let _ = sim.tick().expect("tick");
        if sim.snapshot().debris.is_empty() {
            return;
        }
    }
    panic!("agent never reached the debris behind the clicked walls");
}
