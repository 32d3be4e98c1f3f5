//! Built-in grid navigation behavior.
//!
//! Follows the injected `goal_position` by planning an axis-only path over
//! the discovered map and emitting turn/forward actions along it. Replans
//! whenever the goal changes or the agent has drifted off the path.

use super::{Action, Capability, Facing, Observation};
use crate::error::{GrihaError, Result};
use crate::house::Cell;
use crate::planning::shortest_path;
use tracing::{debug, trace};

/// How close to the goal counts as arrived (Chebyshev cells).
const ARRIVAL_TOLERANCE: i32 = 1;

/// Goal-seeking navigation over the discovered map.
#[derive(Debug)]
pub struct GridNavigator {
    path: Vec<Cell>,
    goal: Option<Cell>,
    complete: bool,
    max_expansions: usize,
}

impl GridNavigator {
    pub fn new(max_expansions: usize) -> Self {
        Self {
            path: Vec::new(),
            goal: None,
            complete: false,
            max_expansions,
        }
    }

    fn replan(&mut self, obs: &Observation, goal: Cell) -> Result<()> {
        match shortest_path(
            obs.grid,
            obs.registry,
            obs.position,
            goal,
            self.max_expansions.max(1),
        ) {
            Some(path) => {
                debug!(
                    "Navigator planned {} cells from {} to {}",
                    path.len(),
                    obs.position,
                    goal
                );
                self.path = path;
                self.goal = Some(goal);
                Ok(())
            }
            None => Err(GrihaError::Agent(format!(
                "no path from {} to goal {}",
                obs.position, goal
            ))),
        }
    }

    /// The next path cell to move onto, given the agent's position.
    fn next_cell(&self, position: Cell) -> Option<Cell> {
        let (idx, nearest) = self
            .path
            .iter()
            .enumerate()
            .min_by_key(|(_, cell)| cell.manhattan(&position))?;
        if nearest.manhattan(&position) > 1 {
            // Drifted off the path
            return None;
        }
        if *nearest == position {
            self.path.get(idx + 1).copied()
        } else {
            Some(*nearest)
        }
    }
}

impl Capability for GridNavigator {
    fn reset(&mut self) {
        self.path.clear();
        self.goal = None;
        self.complete = false;
    }

    fn get_action(&mut self, obs: &Observation) -> Result<Action> {
        let Some(goal) = obs.goal_position else {
            trace!("Navigator has no goal this tick");
            return Ok(Action::Stay);
        };

        if obs.position.chebyshev(&goal) <= ARRIVAL_TOLERANCE {
            self.complete = true;
            return Ok(Action::Stay);
        }

        if self.goal != Some(goal) || self.next_cell(obs.position).is_none() {
            self.replan(obs, goal)?;
        }

        let Some(next) = self.next_cell(obs.position) else {
            // Replanned onto a trivial path; arrival check above will fire
            // next tick
            return Ok(Action::Stay);
        };

        let desired = Facing::toward(obs.position, next);
        match obs.facing.turn_toward(desired) {
            Some(turn) => Ok(turn),
            None => Ok(Action::Forward),
        }
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}
