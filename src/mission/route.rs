//! Waypoint extraction and distances along a planned path.
//!
//! A raw cell path is segmented into room-transition waypoints, each
//! tagged with what happened at that cell. Segment distances are reported
//! for narration and telemetry; step compilation does not depend on them.

use crate::house::{rooms, Cell, RoomRegistry};
use serde::{Deserialize, Serialize};

/// What a waypoint marks along the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTag {
    Start,
    ExitRoom,
    EnterHallway,
    EnterRoom,
    Goal,
}

/// A path cell annotated with room membership and a transition tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub point: Cell,
    pub room: Option<String>,
    #[serde(rename = "type")]
    pub tag: TransitionTag,
}

/// One leg between consecutive waypoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Option<String>,
    pub to: Option<String>,
    pub distance_m: f32,
}

/// The planned route document: waypoints plus leg distances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub waypoints: Vec<Waypoint>,
    pub segments: Vec<Segment>,
    pub total_distance_m: f32,
}

/// Scan the path once and emit waypoints at every room-membership change.
///
/// The departure cell of a named room is tagged `ExitRoom`; the arrival
/// cell is tagged `EnterHallway` or `EnterRoom` by the naming convention.
/// The first waypoint is always `Start` and the last always `Goal`.
pub fn extract_waypoints(path: &[Cell], registry: &RoomRegistry) -> Vec<Waypoint> {
    let Some(&first) = path.first() else {
        return Vec::new();
    };

    let mut waypoints = Vec::new();
    let mut last_room = registry.owner_of(first).map(String::from);
    waypoints.push(Waypoint {
        point: first,
        room: last_room.clone(),
        tag: TransitionTag::Start,
    });

    for i in 1..path.len() {
        let room = registry.owner_of(path[i]).map(String::from);
        if room != last_room {
            if let Some(ref leaving) = last_room {
                waypoints.push(Waypoint {
                    point: path[i - 1],
                    room: Some(leaving.clone()),
                    tag: TransitionTag::ExitRoom,
                });
            }
            if let Some(ref entering) = room {
                let tag = if rooms::is_hallway_name(entering) {
                    TransitionTag::EnterHallway
                } else {
                    TransitionTag::EnterRoom
                };
                waypoints.push(Waypoint {
                    point: path[i],
                    room: Some(entering.clone()),
                    tag,
                });
            }
            last_room = room;
        }
    }

    let &last = path.last().unwrap();
    waypoints.push(Waypoint {
        point: last,
        room: registry.owner_of(last).map(String::from),
        tag: TransitionTag::Goal,
    });
    waypoints
}

/// Per-leg Manhattan distances in meters, consistent with the planner's
/// step costs, plus the running total. Rounded to centimeters.
pub fn segment_distances(waypoints: &[Waypoint], resolution: f32) -> (Vec<Segment>, f32) {
    let mut segments = Vec::new();
    let mut total = 0.0;
    for pair in waypoints.windows(2) {
        let d = pair[0].point.manhattan(&pair[1].point) as f32 * resolution;
        let d = (d * 100.0).round() / 100.0;
        segments.push(Segment {
            from: pair[0].room.clone(),
            to: pair[1].room.clone(),
            distance_m: d,
        });
        total += d;
    }
    (segments, (total * 100.0).round() / 100.0)
}

/// Compile a raw cell path into the route document.
pub fn compile_route(path: &[Cell], registry: &RoomRegistry) -> Route {
    let waypoints = extract_waypoints(path, registry);
    let (segments, total_distance_m) = segment_distances(&waypoints, registry.resolution);
    Route {
        waypoints,
        segments,
        total_distance_m,
    }
}
