//! Built-in room scanning behavior.
//!
//! A bounded, side-effect-free coverage pattern: move forward three ticks,
//! turn once on the fourth, until a fixed tick budget runs out.

use super::{Action, Capability, Observation};
use crate::config::ScanConfig;
use crate::error::Result;

/// Scanning coverage pattern with a fixed tick budget.
#[derive(Debug)]
pub struct RoomScanner {
    ticks: u32,
    tick_budget: u32,
    turn_period: u32,
}

impl RoomScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            ticks: 0,
            tick_budget: config.tick_budget,
            turn_period: config.turn_period.max(2),
        }
    }
}

impl Default for RoomScanner {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl Capability for RoomScanner {
    fn reset(&mut self) {
        self.ticks = 0;
    }

    fn get_action(&mut self, _obs: &Observation) -> Result<Action> {
        self.ticks += 1;

        if self.ticks >= self.tick_budget {
            return Ok(Action::Stay);
        }

        if self.ticks % self.turn_period == 0 {
            Ok(Action::TurnRight)
        } else {
            Ok(Action::Forward)
        }
    }

    fn is_complete(&self) -> bool {
        self.ticks >= self.tick_budget
    }
}
