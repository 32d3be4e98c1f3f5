//! Sub-agent capability contract and built-in behavior providers.
//!
//! The executor delegates each mission step to a provider implementing
//! [`Capability`]. Providers are selected through the exhaustive
//! [`AgentType`] tag, so a missing dispatch arm is a compile error rather
//! than a runtime type check.

mod door;
mod navigate;
mod scan;
mod wall;

pub use door::DoorTraversal;
pub use navigate::GridNavigator;
pub use scan::RoomScanner;
pub use wall::WallFollower;

use crate::error::Result;
use crate::house::{Cell, RoomRegistry, SemanticGrid};
use serde::{Deserialize, Serialize};

/// One discrete action per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Forward,
    TurnLeft,
    TurnRight,
    Stay,
}

/// Cardinal facing on the grid. Y grows downward, so north is -y.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    North,
    East,
    South,
    West,
}

impl Facing {
    /// Unit cell delta of a forward step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::North => (0, -1),
            Facing::East => (1, 0),
            Facing::South => (0, 1),
            Facing::West => (-1, 0),
        }
    }

    pub fn turned_left(self) -> Facing {
        match self {
            Facing::North => Facing::West,
            Facing::West => Facing::South,
            Facing::South => Facing::East,
            Facing::East => Facing::North,
        }
    }

    pub fn turned_right(self) -> Facing {
        match self {
            Facing::North => Facing::East,
            Facing::East => Facing::South,
            Facing::South => Facing::West,
            Facing::West => Facing::North,
        }
    }

    /// The facing that steps from `from` toward `to`, along the axis with
    /// the larger remaining distance.
    pub fn toward(from: Cell, to: Cell) -> Facing {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx.abs() >= dy.abs() {
            if dx >= 0 {
                Facing::East
            } else {
                Facing::West
            }
        } else if dy >= 0 {
            Facing::South
        } else {
            Facing::North
        }
    }

    fn index(self) -> i32 {
        match self {
            Facing::North => 0,
            Facing::East => 1,
            Facing::South => 2,
            Facing::West => 3,
        }
    }

    /// Single turn action that rotates this facing toward `target`
    /// (shortest direction; `None` when already aligned).
    pub fn turn_toward(self, target: Facing) -> Option<Action> {
        match (target.index() - self.index()).rem_euclid(4) {
            0 => None,
            3 => Some(Action::TurnLeft),
            _ => Some(Action::TurnRight),
        }
    }

    /// The cell a forward step from `pos` lands on.
    pub fn step_from(self, pos: Cell) -> Cell {
        let (dx, dy) = self.delta();
        Cell::new(pos.x + dx, pos.y + dy)
    }
}

/// Per-tick observation handed to the active provider.
///
/// Built fresh each tick from the current snapshots; the executor is the
/// only writer of `goal_position`, the active provider the only reader.
#[derive(Debug)]
pub struct Observation<'a> {
    /// Agent position on the grid
    pub position: Cell,
    /// Agent facing
    pub facing: Facing,
    /// Goal injected by the executor for the active step, if any
    pub goal_position: Option<Cell>,
    /// Discovered-map snapshot
    pub grid: &'a SemanticGrid,
    /// Room registry snapshot
    pub registry: &'a RoomRegistry,
}

/// The sub-agent capability contract.
///
/// Providers are single-threaded and tick-driven: `get_action` must return
/// within the tick. Completion is owned by the provider and polled by the
/// executor after every delegated tick.
pub trait Capability {
    /// Clear internal state for a fresh activation.
    fn reset(&mut self);

    /// Compute this tick's action.
    fn get_action(&mut self, obs: &Observation) -> Result<Action>;

    /// Has the delegated task finished?
    fn is_complete(&self) -> bool;
}

/// Tag identifying which provider a mission step needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentType {
    Navigation,
    Door,
    Scan,
    Wall,
}

impl AgentType {
    /// Canonical agent name used in mission documents and text renderings.
    pub fn name(self) -> &'static str {
        match self {
            AgentType::Navigation => "NavigationAgent",
            AgentType::Door => "DoorAgent",
            AgentType::Scan => "ScanAgent",
            AgentType::Wall => "WallAgent",
        }
    }

    /// Recognize an agent name in free text (tolerant, case-insensitive).
    pub fn from_name(name: &str) -> Option<AgentType> {
        let lower = name.to_lowercase();
        if lower.contains("navigation") {
            Some(AgentType::Navigation)
        } else if lower.contains("door") {
            Some(AgentType::Door)
        } else if lower.contains("scan") {
            Some(AgentType::Scan)
        } else if lower.contains("wall") {
            Some(AgentType::Wall)
        } else {
            None
        }
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
