//! Mission steps and the route-to-mission compiler.
//!
//! A mission is an ordered, immutable list of steps, each delegating one
//! unit of work to a sub-agent. Missions are compiled whole from a route
//! and supersede each other entirely; a newly compiled mission carries a
//! higher revision and replaces any in-flight one.

use super::route::{Route, TransitionTag};
use crate::agents::AgentType;
use crate::error::Result;
use crate::house::{Cell, RoomRegistry};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

pub(super) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Where a navigation leg starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavEndpoint {
    pub room: Option<String>,
    pub point: Cell,
}

/// Where a navigation leg ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavDestination {
    pub room: Option<String>,
    pub point: Cell,
    /// Whether the destination point is a connector entrance of the room
    pub entrance: bool,
}

/// The work one step delegates, tagged by agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "agent")]
pub enum StepAction {
    #[serde(rename = "NavigationAgent")]
    Navigation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<NavEndpoint>,
        to: NavDestination,
    },
    #[serde(rename = "DoorAgent")]
    Door { room: String },
    #[serde(rename = "WallAgent")]
    Wall { room: Option<String> },
    #[serde(rename = "ScanAgent")]
    Scan {
        room: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        objective: Option<String>,
    },
}

impl StepAction {
    pub fn agent_type(&self) -> AgentType {
        match self {
            StepAction::Navigation { .. } => AgentType::Navigation,
            StepAction::Door { .. } => AgentType::Door,
            StepAction::Wall { .. } => AgentType::Wall,
            StepAction::Scan { .. } => AgentType::Scan,
        }
    }
}

/// One unit of delegated work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissionStep {
    /// Ordinal, 1-based
    pub n: usize,
    #[serde(flatten)]
    pub action: StepAction,
    /// Execution-time flag, not part of the document
    #[serde(skip)]
    pub completed: bool,
}

/// An ordered step list plus the target it was compiled for.
///
/// Immutable after creation except for per-step `completed` flags owned by
/// the executor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    /// Monotonic compile counter; a higher revision supersedes a lower one
    pub revision: u64,
    /// Creation time as UNIX seconds (document metadata; supersession is
    /// decided by revision, not wall clock)
    #[serde(default)]
    pub created_unix: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub steps: Vec<MissionStep>,
}

impl Mission {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Compiles routes into missions, stamping each with a fresh revision.
#[derive(Debug)]
pub struct MissionCompiler {
    revision: u64,
    include_wall_step: bool,
}

impl MissionCompiler {
    pub fn new(include_wall_step: bool) -> Self {
        Self {
            revision: 0,
            include_wall_step,
        }
    }

    /// Compile a route into an ordered mission.
    ///
    /// One Navigation step per room transition, a Door step right after it
    /// when the destination room declares any connector, and a terminal
    /// Scan step (preceded by a Wall step when configured). A trivial
    /// route compiles to the terminal steps alone.
    pub fn compile(
        &mut self,
        route: &Route,
        registry: &RoomRegistry,
        target: Option<&str>,
    ) -> Mission {
        self.revision += 1;
        let mut steps = Vec::new();
        let mut n = 1;

        let mut push = |steps: &mut Vec<MissionStep>, action: StepAction| {
            steps.push(MissionStep {
                n,
                action,
                completed: false,
            });
            n += 1;
        };

        if route.waypoints.len() < 2 {
            // Already in the destination room
            let cur_room = route.waypoints.first().and_then(|w| w.room.clone());
            if self.include_wall_step {
                push(
                    &mut steps,
                    StepAction::Wall {
                        room: cur_room.clone(),
                    },
                );
            }
            push(
                &mut steps,
                StepAction::Scan {
                    room: cur_room,
                    objective: target.map(String::from),
                },
            );
        } else {
            let mut cur_room = route.waypoints[0].room.clone();
            let mut seg_start = route.waypoints[0].point;

            for wp in &route.waypoints[1..] {
                if wp.room == cur_room {
                    continue;
                }
                let entrance = matches!(
                    wp.tag,
                    TransitionTag::EnterHallway | TransitionTag::EnterRoom
                );
                push(
                    &mut steps,
                    StepAction::Navigation {
                        from: Some(NavEndpoint {
                            room: cur_room.clone(),
                            point: seg_start,
                        }),
                        to: NavDestination {
                            room: wp.room.clone(),
                            point: wp.point,
                            entrance,
                        },
                    },
                );
                if let Some(ref room) = wp.room {
                    if declares_connectors(registry, room) {
                        push(
                            &mut steps,
                            StepAction::Door { room: room.clone() },
                        );
                    }
                }
                cur_room = wp.room.clone();
                seg_start = wp.point;
            }

            let final_room = route.waypoints.last().and_then(|w| w.room.clone());
            if self.include_wall_step {
                push(
                    &mut steps,
                    StepAction::Wall {
                        room: final_room.clone(),
                    },
                );
            }
            push(
                &mut steps,
                StepAction::Scan {
                    room: final_room,
                    objective: target.map(String::from),
                },
            );
        }

        info!(
            "Compiled mission rev {} with {} steps (target: {:?})",
            self.revision,
            steps.len(),
            target
        );

        Mission {
            revision: self.revision,
            created_unix: unix_now(),
            target: target.map(String::from),
            steps,
        }
    }
}

/// Does the room's registry entry list at least one door/entry coordinate?
/// This is the declared list, not grid-validated: the door step is emitted
/// on the registry's word and the executor sorts out disagreement.
fn declares_connectors(registry: &RoomRegistry, room: &str) -> bool {
    registry
        .resolve_room(room)
        .map(|(_, r)| !r.connectors().is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::route::compile_route;

    fn registry() -> RoomRegistry {
        RoomRegistry::from_json(
            r#"{
                "resolution": 0.15,
                "rooms": {
                    "Open Space": {"bbox": [0, 0, 5, 10], "objects": []},
                    "Office": {"bbox": [6, 0, 10, 10], "doors": [5, 9], "objects": []},
                    "Den": {"bbox": [0, 10, 5, 15], "objects": []}
                }
            }"#,
        )
        .unwrap()
    }

    fn crossing_path() -> Vec<Cell> {
        vec![
            Cell::new(3, 9),
            Cell::new(4, 9),
            Cell::new(5, 9),
            Cell::new(6, 9),
            Cell::new(7, 9),
        ]
    }

    #[test]
    fn test_compile_nav_door_scan() {
        let registry = registry();
        let route = compile_route(&crossing_path(), &registry);
        let mut compiler = MissionCompiler::new(false);
        let mission = compiler.compile(&route, &registry, Some("mug"));

        let agents: Vec<AgentType> =
            mission.steps.iter().map(|s| s.action.agent_type()).collect();
        assert_eq!(
            agents,
            vec![AgentType::Navigation, AgentType::Door, AgentType::Scan]
        );

        match &mission.steps[0].action {
            StepAction::Navigation { from, to } => {
                assert_eq!(from.as_ref().unwrap().room.as_deref(), Some("Open Space"));
                assert_eq!(to.room.as_deref(), Some("Office"));
                assert!(to.entrance);
            }
            other => panic!("expected navigation step, got {:?}", other),
        }
        match &mission.steps[2].action {
            StepAction::Scan { room, objective } => {
                assert_eq!(room.as_deref(), Some("Office"));
                assert_eq!(objective.as_deref(), Some("mug"));
            }
            other => panic!("expected scan step, got {:?}", other),
        }
    }

    #[test]
    fn test_no_declared_doors_no_door_step() {
        let registry = registry();
        // Den declares no doors; route into it must not compile a door step
        let path = vec![Cell::new(3, 9), Cell::new(3, 10), Cell::new(3, 11)];
        let route = compile_route(&path, &registry);
        let mut compiler = MissionCompiler::new(false);
        let mission = compiler.compile(&route, &registry, None);

        assert!(mission
            .steps
            .iter()
            .all(|s| s.action.agent_type() != AgentType::Door));
    }

    #[test]
    fn test_trivial_route_scan_only() {
        let registry = registry();
        let route = compile_route(&[Cell::new(7, 5)], &registry);
        let mut compiler = MissionCompiler::new(false);
        let mission = compiler.compile(&route, &registry, Some("mug"));

        assert_eq!(mission.steps.len(), 1);
        assert_eq!(mission.steps[0].action.agent_type(), AgentType::Scan);
    }

    #[test]
    fn test_trivial_route_with_wall_step() {
        let registry = registry();
        let route = compile_route(&[Cell::new(7, 5)], &registry);
        let mut compiler = MissionCompiler::new(true);
        let mission = compiler.compile(&route, &registry, None);

        let agents: Vec<AgentType> =
            mission.steps.iter().map(|s| s.action.agent_type()).collect();
        assert_eq!(agents, vec![AgentType::Wall, AgentType::Scan]);
    }

    #[test]
    fn test_wall_step_precedes_terminal_scan() {
        let registry = registry();
        let route = compile_route(&crossing_path(), &registry);
        let mut compiler = MissionCompiler::new(true);
        let mission = compiler.compile(&route, &registry, None);

        let agents: Vec<AgentType> =
            mission.steps.iter().map(|s| s.action.agent_type()).collect();
        assert_eq!(
            agents,
            vec![
                AgentType::Navigation,
                AgentType::Door,
                AgentType::Wall,
                AgentType::Scan
            ]
        );
    }

    #[test]
    fn test_revisions_increase() {
        let registry = registry();
        let route = compile_route(&crossing_path(), &registry);
        let mut compiler = MissionCompiler::new(false);
        let first = compiler.compile(&route, &registry, None);
        let second = compiler.compile(&route, &registry, None);
        assert!(second.revision > first.revision);
        // Steps themselves are identical across recompiles
        assert_eq!(first.steps, second.steps);
    }

    #[test]
    fn test_ordinals_are_sequential() {
        let registry = registry();
        let route = compile_route(&crossing_path(), &registry);
        let mut compiler = MissionCompiler::new(true);
        let mission = compiler.compile(&route, &registry, None);
        let ordinals: Vec<usize> = mission.steps.iter().map(|s| s.n).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_mission_json_round_trip() {
        let registry = registry();
        let route = compile_route(&crossing_path(), &registry);
        let mut compiler = MissionCompiler::new(false);
        let mission = compiler.compile(&route, &registry, Some("mug"));

        let json = mission.to_json().unwrap();
        let parsed = Mission::from_json(&json).unwrap();
        assert_eq!(parsed, mission);
    }
}
