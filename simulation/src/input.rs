//! Shell input mapped onto simulation entry points.

use roomba_core::{ClickKind, Direction, VisionMode};

use crate::{Simulation, SimulationError};

/// Mouse button reported by a windowing shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
}

impl MouseButton {
    /// Tile action bound to the button.
    #[must_use]
    pub const fn click_kind(self) -> ClickKind {
        match self {
            Self::Left => ClickKind::IncrementWalls,
            Self::Middle => ClickKind::ToggleDebris,
            Self::Right => ClickKind::DecrementWalls,
        }
    }
}

/// One discrete user action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputAction {
    /// Manual one-tile move consumed on the next tick.
    Directional(Direction),
    /// Click on a tile.
    TileClick {
        /// Column of the clicked tile.
        x: u32,
        /// Row of the clicked tile.
        y: u32,
        /// Action bound to the click.
        kind: ClickKind,
    },
    /// Starts or stops the autonomous agent.
    ToggleAgent,
    /// Enables or disables random debris re-deposits.
    ToggleFailureMode,
    /// Selects a sensing policy.
    SetVision(VisionMode),
    /// Re-rolls every wall.
    RandomizeWalls {
        /// Picks a wall-count bucket first when `true`.
        weighted: bool,
    },
    /// Re-rolls every debris flag.
    RandomizeDebris,
}

/// Routes `action` to exactly one simulation entry point.
pub fn dispatch(simulation: &mut Simulation, action: InputAction) -> Result<(), SimulationError> {
    match action {
        InputAction::Directional(direction) => simulation.on_directional_input(direction),
        InputAction::TileClick { x, y, kind } => simulation.on_tile_click(x, y, kind)?,
        InputAction::ToggleAgent => {
            let _ = simulation.toggle_agent_active();
        }
        InputAction::ToggleFailureMode => {
            let _ = simulation.toggle_failure_mode();
        }
        InputAction::SetVision(mode) => simulation.set_vision(mode),
        InputAction::RandomizeWalls { weighted } => simulation.randomize_walls(weighted)?,
        InputAction::RandomizeDebris => simulation.randomize_debris()?,
    }
    Ok(())
}
