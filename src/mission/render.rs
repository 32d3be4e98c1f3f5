//! Mission text rendering, tolerant parsing, and route narration.
//!
//! The structured mission document is authoritative; the numbered text
//! form is a rendering of it, kept in lockstep by deriving one from the
//! other. Parsing accepts the same numbered lines back, skipping anything
//! malformed.

use super::route::{Route, TransitionTag};
use super::steps::{unix_now, Mission, MissionStep, NavDestination, StepAction};
use crate::agents::AgentType;
use crate::house::{Cell, RoomRegistry};
use tracing::warn;

fn room_label(room: Option<&str>) -> &str {
    room.unwrap_or("open area")
}

/// Render a mission as numbered "N. Activate ..." lines.
pub fn render_mission_text(mission: &Mission) -> String {
    let mut lines = Vec::new();
    for (i, step) in mission.steps.iter().enumerate() {
        let n = i + 1;
        let line = match &step.action {
            StepAction::Navigation { from, to } => {
                let dest = if to.entrance {
                    format!("entrance of {}", room_label(to.room.as_deref()))
                } else {
                    room_label(to.room.as_deref()).to_string()
                };
                match from {
                    Some(f) => format!(
                        "{}. Activate NavigationAgent from {} in {} to {} at {}",
                        n,
                        f.point,
                        room_label(f.room.as_deref()),
                        dest,
                        to.point
                    ),
                    None => format!(
                        "{}. Activate NavigationAgent to {} at {}",
                        n, dest, to.point
                    ),
                }
            }
            StepAction::Door { room } => {
                format!("{}. Activate DoorAgent to open and enter {}", n, room)
            }
            StepAction::Wall { room } => format!(
                "{}. Activate WallAgent to follow walls inside {}",
                n,
                room_label(room.as_deref())
            ),
            StepAction::Scan { room, objective } => {
                let tail = objective
                    .as_deref()
                    .map(|o| format!(" to find the {}", o))
                    .unwrap_or_default();
                format!(
                    "{}. Activate ScanAgent to scan {}{}",
                    n,
                    room_label(room.as_deref()),
                    tail
                )
            }
        };
        lines.push(line);
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// One successfully parsed mission line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedLine {
    pub n: usize,
    pub agent: AgentType,
    /// Remainder of the line after the agent name
    pub action: String,
}

/// Parse numbered "N. Activate <Agent> to <action>" lines.
///
/// Lines that do not match are skipped with a warning, never fatal; an
/// unrecognized agent name also skips the line.
pub fn parse_mission_text(text: &str) -> Vec<ParsedLine> {
    let mut parsed = Vec::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_line(line) {
            Some(entry) => parsed.push(entry),
            None => warn!("Skipping malformed mission line: {:?}", line),
        }
    }
    parsed
}

fn parse_line(line: &str) -> Option<ParsedLine> {
    let (number, rest) = line.split_once('.')?;
    let n: usize = number.trim().parse().ok()?;
    let rest = rest.trim();
    let rest = rest.strip_prefix("Activate")?.trim_start();
    let (agent_name, action) = rest.split_once(char::is_whitespace)?;
    let agent = AgentType::from_name(agent_name)?;
    // Navigation lines carry "from ... to ..."; everything else starts
    // with "to"
    let action = action.trim();
    if action.is_empty() {
        return None;
    }
    Some(ParsedLine {
        n,
        agent,
        action: action.to_string(),
    })
}

/// Resolve a room name mentioned in an action phrase against the registry.
fn find_room_in_action<'a>(action: &str, registry: &'a RoomRegistry) -> Option<&'a str> {
    let lower = action.to_lowercase();
    registry
        .rooms
        .keys()
        .filter(|name| lower.contains(&name.to_lowercase()))
        .max_by_key(|name| name.len())
        .map(|name| name.as_str())
}

/// The destination phrase of a navigation action: everything after "to",
/// so a "from X in RoomA to RoomB" line resolves RoomB, not RoomA.
fn nav_dest_phrase(action: &str) -> &str {
    if let Some(rest) = action.strip_prefix("to ") {
        return rest;
    }
    action
        .split_once(" to ")
        .map(|(_, rest)| rest)
        .unwrap_or(action)
}

/// Build a structured mission from numbered text lines, resolving rooms
/// and points through the registry. Best effort: navigation destinations
/// use the room's first declared connector, falling back to its center;
/// lines naming no known room keep `None` rooms.
pub fn mission_from_text(text: &str, registry: &RoomRegistry, revision: u64) -> Mission {
    let mut steps: Vec<MissionStep> = Vec::new();
    for line in parse_mission_text(text) {
        let room = find_room_in_action(&line.action, registry).map(String::from);
        let action = match line.agent {
            AgentType::Navigation => {
                let dest_room =
                    find_room_in_action(nav_dest_phrase(&line.action), registry).map(String::from);
                let point = dest_room
                    .as_deref()
                    .and_then(|r| registry.resolve_room(r))
                    .map(|(_, entry)| {
                        entry
                            .connectors()
                            .first()
                            .copied()
                            .unwrap_or_else(|| entry.center())
                    })
                    .unwrap_or(Cell::new(0, 0));
                StepAction::Navigation {
                    from: None,
                    to: NavDestination {
                        room: dest_room,
                        point,
                        entrance: line.action.contains("entrance"),
                    },
                }
            }
            AgentType::Door => match room {
                Some(room) => StepAction::Door { room },
                None => {
                    warn!("Door line names no known room, skipping: {:?}", line.action);
                    continue;
                }
            },
            AgentType::Wall => StepAction::Wall { room },
            AgentType::Scan => {
                let objective = line
                    .action
                    .split_once(" to find the ")
                    .map(|(_, obj)| obj.trim().to_string());
                StepAction::Scan { room, objective }
            }
        };
        steps.push(MissionStep {
            n: steps.len() + 1,
            action,
            completed: false,
        });
    }
    Mission {
        revision,
        created_unix: unix_now(),
        target: None,
        steps,
    }
}

fn heading(from: Cell, to: Cell) -> char {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() >= dy.abs() {
        if dx > 0 {
            'E'
        } else {
            'W'
        }
    } else if dy > 0 {
        'S'
    } else {
        'N'
    }
}

fn relative_turn(prev: char, cur: char) -> &'static str {
    const ORDER: [char; 4] = ['N', 'E', 'S', 'W'];
    let i1 = ORDER.iter().position(|&c| c == prev).unwrap_or(0) as i32;
    let i2 = ORDER.iter().position(|&c| c == cur).unwrap_or(0) as i32;
    match (i2 - i1).rem_euclid(4) {
        0 => "forward",
        1 => "right",
        3 => "left",
        _ => "back",
    }
}

fn phrase_distance(d_m: f32) -> String {
    // Spoken distances round to half meters
    let d = (d_m / 0.5).round() * 0.5;
    if d < 0.5 {
        "a few steps".to_string()
    } else if d < 1.0 {
        "about one meter".to_string()
    } else {
        format!("about {:.1} meters", d)
    }
}

fn waypoint_label(room: Option<&str>, tag: TransitionTag) -> String {
    match tag {
        TransitionTag::Start => match room {
            Some(r) => format!("your current position in {}", r),
            None => "your current position".to_string(),
        },
        TransitionTag::EnterHallway => "the hallway".to_string(),
        TransitionTag::EnterRoom => match room {
            Some(r) => format!("the {}", r),
            None => "the room".to_string(),
        },
        TransitionTag::ExitRoom => match room {
            Some(r) => format!("the edge of {}", r),
            None => "the doorway".to_string(),
        },
        TransitionTag::Goal => match room {
            Some(r) => format!("your destination in {}", r),
            None => "your destination".to_string(),
        },
    }
}

/// Human-readable leg-by-leg narration of a route, for operator output.
pub fn narrate_route(route: &Route) -> Vec<String> {
    let mut lines = Vec::new();
    let mut prev_heading = None;
    for (i, pair) in route.waypoints.windows(2).enumerate() {
        let (from, to) = (&pair[0], &pair[1]);
        if from.point == to.point {
            continue;
        }
        let h = heading(from.point, to.point);
        let turn = match prev_heading {
            Some(prev) => relative_turn(prev, h),
            None => "forward",
        };
        prev_heading = Some(h);

        let distance = phrase_distance(route.segments[i].distance_m);
        let label = waypoint_label(to.room.as_deref(), to.tag);
        let line = match turn {
            "forward" => format!("Continue forward {} to {}", distance, label),
            t => format!("Turn {} and continue {} to {}", t, distance, label),
        };
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::route::compile_route;
    use crate::mission::steps::MissionCompiler;

    fn registry() -> RoomRegistry {
        RoomRegistry::from_json(
            r#"{
                "resolution": 0.15,
                "rooms": {
                    "Open Space": {"bbox": [0, 0, 5, 10], "objects": []},
                    "Office": {"bbox": [6, 0, 10, 10], "doors": [5, 9], "objects": []}
                }
            }"#,
        )
        .unwrap()
    }

    fn crossing_mission() -> Mission {
        let registry = registry();
        let path = vec![
            Cell::new(3, 9),
            Cell::new(4, 9),
            Cell::new(5, 9),
            Cell::new(6, 9),
            Cell::new(7, 9),
        ];
        let route = compile_route(&path, &registry);
        MissionCompiler::new(false).compile(&route, &registry, Some("mug"))
    }

    #[test]
    fn test_render_numbered_lines() {
        let mission = crossing_mission();
        let text = render_mission_text(&mission);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("1. Activate NavigationAgent from (3, 9) in Open Space"));
        assert!(lines[0].contains("entrance of Office"));
        assert_eq!(lines[1], "2. Activate DoorAgent to open and enter Office");
        assert_eq!(lines[2], "3. Activate ScanAgent to scan Office to find the mug");
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let text = "\
1. Activate NavigationAgent to entrance of Office at (5, 9)
this line is garbage
2: also garbage
3. Activate TeleportAgent to warp
4. Activate DoorAgent to open and enter Office
";
        let parsed = parse_mission_text(text);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].agent, AgentType::Navigation);
        assert_eq!(parsed[1].agent, AgentType::Door);
    }

    #[test]
    fn test_render_parse_round_trip() {
        let mission = crossing_mission();
        let text = render_mission_text(&mission);
        let parsed = parse_mission_text(&text);
        let agents: Vec<AgentType> = parsed.iter().map(|p| p.agent).collect();
        let original: Vec<AgentType> = mission
            .steps
            .iter()
            .map(|s| s.action.agent_type())
            .collect();
        assert_eq!(agents, original);
    }

    #[test]
    fn test_mission_from_text_resolves_rooms() {
        let registry = registry();
        let text = "\
1. Activate NavigationAgent to entrance of Office at (5, 9)
2. Activate DoorAgent to open and enter Office
3. Activate ScanAgent to scan Office to find the mug
";
        let mission = mission_from_text(text, &registry, 7);
        assert_eq!(mission.revision, 7);
        assert_eq!(mission.steps.len(), 3);
        match &mission.steps[0].action {
            StepAction::Navigation { to, .. } => {
                assert_eq!(to.room.as_deref(), Some("Office"));
                assert_eq!(to.point, Cell::new(5, 9));
                assert!(to.entrance);
            }
            other => panic!("expected navigation, got {:?}", other),
        }
        match &mission.steps[2].action {
            StepAction::Scan { room, objective } => {
                assert_eq!(room.as_deref(), Some("Office"));
                assert_eq!(objective.as_deref(), Some("mug"));
            }
            other => panic!("expected scan, got {:?}", other),
        }
    }

    #[test]
    fn test_narration_mentions_rooms_and_distances() {
        let registry = registry();
        let path = vec![
            Cell::new(3, 9),
            Cell::new(4, 9),
            Cell::new(5, 9),
            Cell::new(6, 9),
            Cell::new(7, 9),
        ];
        let route = compile_route(&path, &registry);
        let lines = narrate_route(&route);
        assert!(!lines.is_empty());
        assert!(lines.last().unwrap().contains("Office"));
    }
}
