//! Built-in wall-following behavior.
//!
//! Left-hand rule over the discovered map: hug the wall on the agent's
//! left, turning into openings as they appear. Used as the exploration
//! fallback when no mission is loaded, and for explicit wall steps. It
//! never completes on its own.

use super::{Action, Capability, Observation};
use crate::error::Result;

/// Left-hand wall follower.
#[derive(Debug, Default)]
pub struct WallFollower {
    /// Set after turning left, so the follower commits to stepping into
    /// the opening instead of spinning in place
    just_turned: bool,
}

impl WallFollower {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Capability for WallFollower {
    fn reset(&mut self) {
        self.just_turned = false;
    }

    fn get_action(&mut self, obs: &Observation) -> Result<Action> {
        let left = obs.facing.turned_left();
        let left_open = obs.grid.is_walkable(left.step_from(obs.position));
        let front_open = obs.grid.is_walkable(obs.facing.step_from(obs.position));

        if left_open && !self.just_turned {
            self.just_turned = true;
            return Ok(Action::TurnLeft);
        }
        self.just_turned = false;

        if front_open {
            Ok(Action::Forward)
        } else {
            Ok(Action::TurnRight)
        }
    }

    fn is_complete(&self) -> bool {
        // Persistent behavior; the executor decides when to stop it
        false
    }
}
