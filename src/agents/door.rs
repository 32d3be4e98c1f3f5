//! Built-in doorway traversal behavior.
//!
//! Walks the agent onto the connector cell injected as `goal_position`,
//! then two cells straight through so the agent ends up inside the room
//! rather than parked in the doorway.

use super::{Action, Capability, Facing, Observation};
use crate::error::Result;

/// Phase of doorway traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DoorPhase {
    /// Walking up to the connector cell
    Approach,
    /// Stepping through the doorway
    Cross,
    /// Traversal finished
    Done,
}

/// Forward steps taken past the connector before declaring done.
const CROSS_STEPS: u32 = 2;

/// Doorway traversal provider.
#[derive(Debug)]
pub struct DoorTraversal {
    phase: DoorPhase,
    steps_past: u32,
    /// A sidestep turn was just issued; commit to one forward step before
    /// re-aiming at the connector
    sidestep: bool,
}

impl DoorTraversal {
    pub fn new() -> Self {
        Self {
            phase: DoorPhase::Approach,
            steps_past: 0,
            sidestep: false,
        }
    }
}

impl Default for DoorTraversal {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for DoorTraversal {
    fn reset(&mut self) {
        self.phase = DoorPhase::Approach;
        self.steps_past = 0;
        self.sidestep = false;
    }

    fn get_action(&mut self, obs: &Observation) -> Result<Action> {
        let Some(connector) = obs.goal_position else {
            // No connector to traverse: nothing to do
            self.phase = DoorPhase::Done;
            return Ok(Action::Stay);
        };

        match self.phase {
            DoorPhase::Approach => {
                if obs.position == connector {
                    self.phase = DoorPhase::Cross;
                    return self.get_action(obs);
                }
                if self.sidestep {
                    self.sidestep = false;
                    if obs.grid.is_walkable(obs.facing.step_from(obs.position)) {
                        return Ok(Action::Forward);
                    }
                }
                let desired = Facing::toward(obs.position, connector);
                match obs.facing.turn_toward(desired) {
                    Some(turn) => Ok(turn),
                    None if obs.grid.is_walkable(obs.facing.step_from(obs.position)) => {
                        Ok(Action::Forward)
                    }
                    // Aligned but blocked by the frame: sidestep along the
                    // other axis and commit to it for one step
                    None => {
                        let dx = connector.x - obs.position.x;
                        let dy = connector.y - obs.position.y;
                        let secondary = match desired {
                            Facing::East | Facing::West => {
                                if dy >= 0 {
                                    Facing::South
                                } else {
                                    Facing::North
                                }
                            }
                            Facing::North | Facing::South => {
                                if dx >= 0 {
                                    Facing::East
                                } else {
                                    Facing::West
                                }
                            }
                        };
                        self.sidestep = true;
                        match obs.facing.turn_toward(secondary) {
                            Some(turn) => Ok(turn),
                            None => Ok(Action::Forward),
                        }
                    }
                }
            }
            DoorPhase::Cross => {
                self.steps_past += 1;
                if self.steps_past >= CROSS_STEPS {
                    self.phase = DoorPhase::Done;
                }
                Ok(Action::Forward)
            }
            DoorPhase::Done => Ok(Action::Stay),
        }
    }

    fn is_complete(&self) -> bool {
        self.phase == DoorPhase::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::house::tiles::{DOOR, FREE};
    use crate::house::{Cell, RoomRegistry, SemanticGrid};

    fn obs<'a>(
        grid: &'a SemanticGrid,
        registry: &'a RoomRegistry,
        position: Cell,
        facing: Facing,
        goal: Option<Cell>,
    ) -> Observation<'a> {
        Observation {
            position,
            facing,
            goal_position: goal,
            grid,
            registry,
        }
    }

    #[test]
    fn test_approach_turns_toward_connector() {
        let grid = SemanticGrid::filled(6, 6, FREE);
        let registry = RoomRegistry::default();
        let mut door = DoorTraversal::new();

        // Connector east of agent, agent facing north
        let o = obs(
            &grid,
            &registry,
            Cell::new(1, 3),
            Facing::North,
            Some(Cell::new(3, 3)),
        );
        assert_eq!(door.get_action(&o).unwrap(), Action::TurnRight);
        assert!(!door.is_complete());
    }

    #[test]
    fn test_crossing_takes_two_forward_steps() {
        let mut grid = SemanticGrid::filled(6, 6, FREE);
        grid.set_code(Cell::new(3, 3), DOOR);
        let registry = RoomRegistry::default();
        let mut door = DoorTraversal::new();

        // Standing on the connector, already facing through it
        let o = obs(
            &grid,
            &registry,
            Cell::new(3, 3),
            Facing::East,
            Some(Cell::new(3, 3)),
        );
        assert_eq!(door.get_action(&o).unwrap(), Action::Forward);
        assert!(!door.is_complete());
        let o = obs(
            &grid,
            &registry,
            Cell::new(4, 3),
            Facing::East,
            Some(Cell::new(3, 3)),
        );
        assert_eq!(door.get_action(&o).unwrap(), Action::Forward);
        assert!(door.is_complete());
    }

    #[test]
    fn test_no_connector_completes_immediately() {
        let grid = SemanticGrid::filled(4, 4, FREE);
        let registry = RoomRegistry::default();
        let mut door = DoorTraversal::new();

        let o = obs(&grid, &registry, Cell::new(1, 1), Facing::North, None);
        assert_eq!(door.get_action(&o).unwrap(), Action::Stay);
        assert!(door.is_complete());
    }
}
