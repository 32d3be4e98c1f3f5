//! The mission executor.
//!
//! A tick-driven dispatcher that walks a mission's step list, activates
//! the provider matching each step, injects the step's goal into the
//! observation, and advances only when the active provider reports
//! completion. Door steps are gated on proximity: when the agent is too
//! far from the room's connector, a navigation leg is synthesized first
//! without advancing the cursor.

use super::steps::{Mission, StepAction};
use crate::agents::{Action, AgentType, Capability, Observation};
use crate::config::ExecutorConfig;
use crate::house::Cell;
use tracing::{debug, info, warn};

/// The four providers the executor dispatches to, selected by step tag.
pub struct ProviderSet {
    pub navigation: Box<dyn Capability>,
    pub door: Box<dyn Capability>,
    pub scan: Box<dyn Capability>,
    pub wall: Box<dyn Capability>,
}

impl ProviderSet {
    fn get_mut(&mut self, agent: AgentType) -> &mut dyn Capability {
        match agent {
            AgentType::Navigation => self.navigation.as_mut(),
            AgentType::Door => self.door.as_mut(),
            AgentType::Scan => self.scan.as_mut(),
            AgentType::Wall => self.wall.as_mut(),
        }
    }

    fn get(&self, agent: AgentType) -> &dyn Capability {
        match agent {
            AgentType::Navigation => self.navigation.as_ref(),
            AgentType::Door => self.door.as_ref(),
            AgentType::Scan => self.scan.as_ref(),
            AgentType::Wall => self.wall.as_ref(),
        }
    }
}

/// Tick-driven mission dispatcher.
pub struct MissionExecutor {
    config: ExecutorConfig,
    providers: ProviderSet,
    mission: Option<Mission>,
    /// Mission submitted since the last tick, adopted at tick start
    pending: Option<Mission>,
    cursor: usize,
    /// Which provider is currently delegated to, if any
    active: Option<AgentType>,
    /// The active navigation is a synthesized approach to a door, not the
    /// step itself; completion swaps to the door provider without
    /// advancing the cursor
    deferred_door_nav: bool,
    /// Goal injected into the observation while a provider is active
    final_goal: Option<Cell>,
    complete: bool,
    last_error: Option<String>,
}

impl MissionExecutor {
    pub fn new(config: ExecutorConfig, providers: ProviderSet) -> Self {
        Self {
            config,
            providers,
            mission: None,
            pending: None,
            cursor: 0,
            active: None,
            deferred_door_nav: false,
            final_goal: None,
            complete: false,
            last_error: None,
        }
    }

    /// Submit a freshly compiled mission. It is adopted wholesale at the
    /// start of the next tick if its revision supersedes the current one;
    /// in-flight step progress is discarded.
    pub fn submit(&mut self, mission: Mission) {
        self.pending = Some(mission);
    }

    /// Is every step of the current mission complete?
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// (completed steps, total steps) of the current mission.
    pub fn progress(&self) -> (usize, usize) {
        match &self.mission {
            Some(m) => (
                m.steps.iter().filter(|s| s.completed).count(),
                m.steps.len(),
            ),
            None => (0, 0),
        }
    }

    /// Last sub-agent error, if any tick degraded to a no-op.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn adopt_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let supersedes = match &self.mission {
            Some(current) => pending.revision > current.revision,
            None => true,
        };
        if !supersedes {
            debug!(
                "Ignoring stale mission rev {} (current rev {})",
                pending.revision,
                self.mission.as_ref().map(|m| m.revision).unwrap_or(0)
            );
            return;
        }
        info!(
            "Mission rev {} loaded with {} steps",
            pending.revision,
            pending.steps.len()
        );
        self.mission = Some(pending);
        self.cursor = 0;
        self.active = None;
        self.deferred_door_nav = false;
        self.final_goal = None;
        self.complete = false;
        self.last_error = None;
    }

    /// Activate a provider for the current step, injecting its goal.
    fn activate(&mut self, agent: AgentType, goal: Option<Cell>) {
        debug!("Activating {} (goal: {:?})", agent, goal);
        self.providers.get_mut(agent).reset();
        self.active = Some(agent);
        self.final_goal = goal;
    }

    /// Run one tick. Returns the action for the environment to apply.
    ///
    /// Never panics and never blocks: provider errors degrade to a no-op
    /// action for this tick, and the cursor only advances on an explicit
    /// completion signal.
    pub fn tick(&mut self, obs: &mut Observation) -> Action {
        // 1. Mission supersession, then exploration fallback
        self.adopt_pending();
        if self.mission.is_none() {
            return match self.providers.wall.get_action(obs) {
                Ok(action) => action,
                Err(e) => {
                    warn!("Exploration fallback error: {}", e);
                    self.last_error = Some(e.to_string());
                    Action::Stay
                }
            };
        }

        // 2. All steps done
        let step_count = self.mission.as_ref().map(|m| m.steps.len()).unwrap_or(0);
        if self.cursor >= step_count {
            if !self.complete {
                self.complete = true;
                info!("Mission complete!");
            }
            return Action::Stay;
        }

        // 3. Current step
        let step_action = self.mission.as_ref().unwrap().steps[self.cursor].action.clone();
        let step_type = step_action.agent_type();

        // 4./5. Provider activation
        if self.active.is_none() {
            match &step_action {
                StepAction::Door { room } => self.gate_door_step(room, obs),
                StepAction::Navigation { to, .. } => {
                    // Rooms with a usable door are approached at the door;
                    // doorless rooms at their nearest walkable cell. The
                    // compiled point is the last resort.
                    let goal = to
                        .room
                        .as_deref()
                        .and_then(|r| {
                            obs.registry
                                .nearest_validated_connector(r, obs.grid, obs.position)
                                .or_else(|| {
                                    obs.registry
                                        .nearest_walkable_cell(r, obs.grid, obs.position)
                                })
                        })
                        .unwrap_or(to.point);
                    self.activate(AgentType::Navigation, Some(goal));
                }
                StepAction::Scan { .. } => self.activate(AgentType::Scan, None),
                StepAction::Wall { .. } => self.activate(AgentType::Wall, None),
            }
        }

        // 6. Delegate the tick to the active provider
        obs.goal_position = self.final_goal;
        let Some(active) = self.active else {
            return Action::Stay;
        };
        let action = match self.providers.get_mut(active).get_action(obs) {
            Ok(action) => action,
            Err(e) => {
                warn!("Sub-agent {} error: {}", active, e);
                self.last_error = Some(e.to_string());
                return Action::Stay;
            }
        };

        // 7. Completion check
        if self.providers.get(active).is_complete() {
            if self.deferred_door_nav && step_type == AgentType::Door {
                // The synthesized approach finished; hand over to the door
                // provider without advancing the cursor. Proximity is not
                // re-measured here: navigation's own termination is trusted
                // to have brought us within range, a known approximation.
                info!("Reached door position, activating DoorAgent");
                self.deferred_door_nav = false;
                self.activate(AgentType::Door, self.final_goal);
            } else {
                let mission = self.mission.as_mut().unwrap();
                mission.steps[self.cursor].completed = true;
                info!(
                    "Step {}/{} complete ({})",
                    self.cursor + 1,
                    mission.steps.len(),
                    step_type
                );
                self.cursor += 1;
                self.active = None;
                self.deferred_door_nav = false;
                self.final_goal = None;
            }
        }

        action
    }

    /// Door-step gating: activate the door provider only within proximity
    /// of the room's nearest validated connector, otherwise synthesize a
    /// navigation approach first (deferred activation, cursor untouched).
    fn gate_door_step(&mut self, room: &str, obs: &Observation) {
        match obs
            .registry
            .nearest_validated_connector(room, obs.grid, obs.position)
        {
            Some(connector) => {
                let distance = obs.position.manhattan(&connector);
                if distance > self.config.door_proximity_tiles {
                    info!(
                        "Not near door of '{}' yet ({} > {} tiles), navigating to {} first",
                        room, distance, self.config.door_proximity_tiles, connector
                    );
                    self.deferred_door_nav = true;
                    self.activate(AgentType::Navigation, Some(connector));
                } else {
                    self.activate(AgentType::Door, Some(connector));
                }
            }
            None => {
                // Registry and grid disagree about every declared door:
                // treat the connectors as absent and let the door provider
                // finish trivially
                warn!("No validated connector for '{}', door step degrades", room);
                self.activate(AgentType::Door, None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{DoorTraversal, Facing, GridNavigator, RoomScanner, WallFollower};
    use crate::config::{GrihaConfig, ScanConfig};
    use crate::house::tiles::{DOOR, FREE, WALL};
    use crate::house::{RoomRegistry, SemanticGrid};
    use crate::mission::route::compile_route;
    use crate::mission::steps::MissionCompiler;

    fn providers(config: &GrihaConfig) -> ProviderSet {
        ProviderSet {
            navigation: Box::new(GridNavigator::new(config.planner.max_expansions)),
            door: Box::new(DoorTraversal::new()),
            scan: Box::new(RoomScanner::new(&config.scan)),
            wall: Box::new(WallFollower::new()),
        }
    }

    /// Two rooms split by a wall at x=5 with one door at (5, 9).
    fn walled_world() -> (SemanticGrid, RoomRegistry) {
        let mut grid = SemanticGrid::filled(10, 10, FREE);
        for y in 0..9 {
            grid.set_code(Cell::new(5, y), WALL);
        }
        grid.set_code(Cell::new(5, 9), DOOR);
        let registry = RoomRegistry::from_json(
            r#"{
                "resolution": 0.15,
                "rooms": {
                    "Open Space": {"bbox": [0, 0, 5, 10], "objects": []},
                    "Office": {"bbox": [6, 0, 10, 10], "doors": [5, 9], "objects": []}
                }
            }"#,
        )
        .unwrap();
        (grid, registry)
    }

    /// A mission that opens with the door step, so gating is exercised
    /// directly.
    fn door_mission() -> Mission {
        Mission {
            revision: 1,
            created_unix: 0,
            target: None,
            steps: vec![
                crate::mission::steps::MissionStep {
                    n: 1,
                    action: StepAction::Door {
                        room: "Office".to_string(),
                    },
                    completed: false,
                },
                crate::mission::steps::MissionStep {
                    n: 2,
                    action: StepAction::Scan {
                        room: Some("Office".to_string()),
                        objective: None,
                    },
                    completed: false,
                },
            ],
        }
    }

    #[test]
    fn test_no_mission_falls_back_to_wall_following() {
        let (grid, registry) = walled_world();
        let config = GrihaConfig::default();
        let mut executor = MissionExecutor::new(config.executor.clone(), providers(&config));

        let mut obs = Observation {
            position: Cell::new(2, 2),
            facing: Facing::North,
            goal_position: None,
            grid: &grid,
            registry: &registry,
        };
        let action = executor.tick(&mut obs);
        // Wall follower acts; it never emits Stay on an open grid
        assert_ne!(action, Action::Stay);
        assert!(!executor.is_complete());
    }

    #[test]
    fn test_door_gating_synthesizes_navigation() {
        let (grid, registry) = walled_world();
        let config = GrihaConfig::default();
        let mut executor = MissionExecutor::new(config.executor.clone(), providers(&config));
        executor.submit(door_mission());

        // Agent 5+ tiles from the door at (5, 9): first ticks must be
        // navigation toward the door, with the cursor still on step 1
        let mut position = Cell::new(0, 9);
        let mut facing = Facing::East;
        for _ in 0..3 {
            let mut obs = Observation {
                position,
                facing,
                goal_position: None,
                grid: &grid,
                registry: &registry,
            };
            let action = executor.tick(&mut obs);
            assert_eq!(executor.progress().0, 0, "cursor advanced during approach");
            match action {
                Action::Forward => {
                    position = facing.step_from(position);
                }
                Action::TurnLeft => facing = facing.turned_left(),
                Action::TurnRight => facing = facing.turned_right(),
                Action::Stay => {}
            }
        }
        assert!(executor.progress().0 == 0);
    }

    #[test]
    fn test_door_activates_directly_when_near() {
        let (grid, registry) = walled_world();
        let config = GrihaConfig::default();
        let mut executor = MissionExecutor::new(config.executor.clone(), providers(&config));
        executor.submit(door_mission());

        // Two tiles from the door: within the default threshold of 3
        let mut obs = Observation {
            position: Cell::new(3, 9),
            facing: Facing::East,
            goal_position: None,
            grid: &grid,
            registry: &registry,
        };
        let action = executor.tick(&mut obs);
        // The door provider approaches the connector: facing east toward
        // it, the first action is a forward step
        assert_eq!(action, Action::Forward);
    }

    #[test]
    fn test_full_mission_runs_to_completion() {
        let (grid, registry) = walled_world();
        let mut config = GrihaConfig::default();
        config.scan = ScanConfig {
            tick_budget: 6,
            turn_period: 4,
        };

        let path = vec![
            Cell::new(3, 9),
            Cell::new(4, 9),
            Cell::new(5, 9),
            Cell::new(6, 9),
            Cell::new(7, 9),
        ];
        let route = compile_route(&path, &registry);
        let mission = MissionCompiler::new(false).compile(&route, &registry, None);

        let mut executor = MissionExecutor::new(config.executor.clone(), providers(&config));
        executor.submit(mission);

        // Simulate the environment: apply actions to position/facing
        let mut position = Cell::new(3, 9);
        let mut facing = Facing::East;
        for _ in 0..200 {
            let mut obs = Observation {
                position,
                facing,
                goal_position: None,
                grid: &grid,
                registry: &registry,
            };
            let action = executor.tick(&mut obs);
            if executor.is_complete() {
                break;
            }
            match action {
                Action::Forward => {
                    let next = facing.step_from(position);
                    if grid.is_walkable(next) {
                        position = next;
                    }
                }
                Action::TurnLeft => facing = facing.turned_left(),
                Action::TurnRight => facing = facing.turned_right(),
                Action::Stay => {}
            }
        }

        assert!(executor.is_complete(), "mission did not finish");
        let (done, total) = executor.progress();
        assert_eq!(done, total);
    }

    #[test]
    fn test_supersession_resets_cursor() {
        let (grid, registry) = walled_world();
        let config = GrihaConfig::default();
        let mut executor = MissionExecutor::new(config.executor.clone(), providers(&config));

        let first = door_mission();
        executor.submit(first);
        let mut obs = Observation {
            position: Cell::new(3, 9),
            facing: Facing::East,
            goal_position: None,
            grid: &grid,
            registry: &registry,
        };
        executor.tick(&mut obs);

        // A newer mission supersedes wholesale
        let mut second = door_mission();
        second.revision = 2;
        executor.submit(second);
        let mut obs = Observation {
            position: Cell::new(3, 9),
            facing: Facing::East,
            goal_position: None,
            grid: &grid,
            registry: &registry,
        };
        executor.tick(&mut obs);
        assert_eq!(executor.progress(), (0, 2));

        // A stale revision is ignored
        let mut stale = door_mission();
        stale.revision = 1;
        executor.submit(stale);
        let mut obs = Observation {
            position: Cell::new(3, 9),
            facing: Facing::East,
            goal_position: None,
            grid: &grid,
            registry: &registry,
        };
        executor.tick(&mut obs);
        assert_eq!(executor.progress().1, 2);
    }

    #[test]
    fn test_provider_error_degrades_to_stay() {
        struct FailingProvider;
        impl Capability for FailingProvider {
            fn reset(&mut self) {}
            fn get_action(&mut self, _obs: &Observation) -> crate::error::Result<Action> {
                Err(crate::error::GrihaError::Agent("boom".to_string()))
            }
            fn is_complete(&self) -> bool {
                false
            }
        }

        let (grid, registry) = walled_world();
        let config = GrihaConfig::default();
        let mut set = providers(&config);
        set.scan = Box::new(FailingProvider);
        let mut executor = MissionExecutor::new(config.executor.clone(), set);

        executor.submit(Mission {
            revision: 1,
            created_unix: 0,
            target: None,
            steps: vec![crate::mission::steps::MissionStep {
                n: 1,
                action: StepAction::Scan {
                    room: None,
                    objective: None,
                },
                completed: false,
            }],
        });

        let mut obs = Observation {
            position: Cell::new(2, 2),
            facing: Facing::North,
            goal_position: None,
            grid: &grid,
            registry: &registry,
        };
        let action = executor.tick(&mut obs);
        assert_eq!(action, Action::Stay);
        assert!(executor.last_error().is_some());
        // Cursor must not advance past a failing step
        assert_eq!(executor.progress().0, 0);
        assert!(!executor.is_complete());
    }

    #[test]
    fn test_mission_complete_emits_stay() {
        let (grid, registry) = walled_world();
        let config = GrihaConfig::default();
        let mut executor = MissionExecutor::new(config.executor.clone(), providers(&config));

        executor.submit(Mission {
            revision: 1,
            created_unix: 0,
            target: None,
            steps: Vec::new(),
        });
        let mut obs = Observation {
            position: Cell::new(2, 2),
            facing: Facing::North,
            goal_position: None,
            grid: &grid,
            registry: &registry,
        };
        assert_eq!(executor.tick(&mut obs), Action::Stay);
        assert!(executor.is_complete());
    }
}
