//! Inbound snapshot and target notifications.
//!
//! The planning/execution core never watches files or polls timestamps;
//! it consumes typed events from a channel. Producers decide how staleness
//! is detected (mtime polling, inotify, a network feed) and push whole new
//! snapshots when their source changes.

use crate::house::{RoomRegistry, SemanticGrid};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Deserialize;

/// A request naming what the agent should go find.
///
/// `room` wins when both fields are present; otherwise the object is
/// resolved to a room through the registry's object index. Field aliases
/// match the upstream request documents.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TargetRequest {
    #[serde(default, alias = "task")]
    pub object: Option<String>,
    #[serde(default, alias = "found_room")]
    pub room: Option<String>,
}

impl TargetRequest {
    /// Resolve to (goal room, optional objective) against a registry.
    pub fn resolve(&self, registry: &RoomRegistry) -> Option<(String, Option<String>)> {
        if let Some(ref room) = self.room {
            if room != "none" {
                let (canonical, _) = registry.resolve_room(room)?;
                return Some((canonical.to_string(), self.object.clone()));
            }
        }
        let object = self.object.as_deref()?;
        let (room, kind) = registry.room_with_object(object)?;
        Some((room.to_string(), Some(kind.to_string())))
    }
}

/// A snapshot or request pushed into the core.
#[derive(Clone, Debug)]
pub enum SnapshotEvent {
    /// A whole new grid snapshot
    Grid(SemanticGrid),
    /// A whole new room registry snapshot
    Registry(RoomRegistry),
    /// A new target request
    Target(TargetRequest),
}

/// Create the event channel connecting producers to the core loop.
pub fn event_channel() -> (Sender<SnapshotEvent>, Receiver<SnapshotEvent>) {
    unbounded()
}
