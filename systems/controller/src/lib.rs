#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Agent controller that turns the sensing policy into step commands.
//!
//! The controller never mutates the world. Each gated tick it inspects the
//! borrowed connectivity view, the planned tour, and the distance cache, then
//! emits at most one [`Command::StepAgent`].

mod vision;

use log::{debug, trace};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roomba_core::{AgentSnapshot, Command, ConnectivityView, Direction, TileCoord, VisionMode};
use roomba_system_pathfinding::{DistanceCache, PathOrigin};
use roomba_system_tour::Tour;
use thiserror::Error;

/// RNG stream reserved for bump-sensor turns.
const CONTROLLER_STREAM: u64 = 2;

/// Failures that stop the agent.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    /// The bump sensor found every side of the tile walled.
    #[error("agent is boxed in at ({}, {})", tile.x(), tile.y())]
    DeadEnd {
        /// Tile the agent is stuck on.
        tile: TileCoord,
    },
    /// The tour names a stop the distance cache has no agent path for.
    #[error("no cached agent path to ({}, {})", to.x(), to.y())]
    MissingPath {
        /// Stop the agent was heading for.
        to: TileCoord,
    },
}

/// Counts ticks and opens once every `ticks_per_move`.
#[derive(Clone, Debug)]
pub struct TickGate {
    ticks_per_move: u32,
    elapsed: u32,
}

impl TickGate {
    /// Creates a gate that opens on every `ticks_per_move`th tick. Zero is
    /// treated as one.
    #[must_use]
    pub fn new(ticks_per_move: u32) -> Self {
        Self {
            ticks_per_move: ticks_per_move.max(1),
            elapsed: 0,
        }
    }

    /// Registers a tick and reports whether the agent may move on it.
    pub fn advance(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.ticks_per_move {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }
}

/// Pure system that picks the agent's next step.
#[derive(Clone, Debug)]
pub struct Controller {
    gate: TickGate,
    vision_radius: u32,
    rng: ChaCha8Rng,
}

impl Controller {
    /// Creates a controller moving once per `ticks_per_move` ticks.
    #[must_use]
    pub fn new(ticks_per_move: u32, vision_radius: u32, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(CONTROLLER_STREAM);
        Self {
            gate: TickGate::new(ticks_per_move),
            vision_radius,
            rng,
        }
    }

    /// Advances the tick gate and, when it opens, emits the step chosen by
    /// the handler for `mode`.
    #[allow(clippy::too_many_arguments)]
    pub fn handle<F>(
        &mut self,
        mode: VisionMode,
        agent: AgentSnapshot,
        view: &ConnectivityView<'_>,
        tour: Option<&Tour>,
        cache: &DistanceCache,
        has_debris: F,
        out: &mut Vec<Command>,
    ) -> Result<(), ControllerError>
    where
        F: Fn(TileCoord) -> bool,
    {
        if !self.gate.advance() {
            return Ok(());
        }

        let direction = match mode {
            VisionMode::BumpSensor => Some(self.bump(agent, view)?),
            VisionMode::Omniscient => omniscient(agent, tour, cache)?,
            VisionMode::LimitedVision => {
                let sensed =
                    vision::nearest_debris_step(view, agent.tile, self.vision_radius, has_debris);
                match sensed {
                    Some(direction) => Some(direction),
                    None => Some(self.bump(agent, view)?),
                }
            }
        };

        if let Some(direction) = direction {
            trace!("{mode:?} controller steps {direction:?}");
            out.push(Command::StepAgent { direction });
        }
        Ok(())
    }

    /// Keeps the previous heading, then tries both perpendicular directions in
    /// random order, then reverses.
    fn bump(
        &mut self,
        agent: AgentSnapshot,
        view: &ConnectivityView<'_>,
    ) -> Result<Direction, ControllerError> {
        let heading = agent.heading;
        if view.is_open(agent.tile, heading) {
            return Ok(heading);
        }

        let mut turns = heading.perpendicular();
        turns.shuffle(&mut self.rng);
        let fallback = turns
            .into_iter()
            .chain([heading.opposite()])
            .find(|direction| view.is_open(agent.tile, *direction));

        match fallback {
            Some(direction) => {
                debug!("bumped {heading:?}, turning {direction:?}");
                Ok(direction)
            }
            None => Err(ControllerError::DeadEnd { tile: agent.tile }),
        }
    }
}

/// Steps along the cached agent path toward the tour's next stop.
fn omniscient(
    agent: AgentSnapshot,
    tour: Option<&Tour>,
    cache: &DistanceCache,
) -> Result<Option<Direction>, ControllerError> {
    let Some(next_stop) = tour.and_then(Tour::next_stop) else {
        return Ok(None);
    };
    let path = cache
        .path(PathOrigin::Agent, next_stop)
        .ok_or(ControllerError::MissingPath { to: next_stop })?;

    Ok(path
        .get(1)
        .and_then(|next| Direction::between(agent.tile, *next)))
}
