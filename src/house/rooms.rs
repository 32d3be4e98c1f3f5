//! Room registry: named rooms with bounding boxes, connectors and objects.
//!
//! The registry is a JSON document produced by the upstream mapping
//! pipeline. It is loaded wholesale and treated as a read-only snapshot;
//! a changed document is reloaded as a whole new registry.

use super::tiles::TileRegistry;
use super::{Cell, SemanticGrid};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Door/entry coordinates as they appear in the document: either a single
/// `[x, y]` pair or a list of pairs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordSpec {
    One([i32; 2]),
    Many(Vec<[i32; 2]>),
}

impl Default for CoordSpec {
    fn default() -> Self {
        CoordSpec::Many(Vec::new())
    }
}

impl CoordSpec {
    fn cells(&self) -> Vec<Cell> {
        match self {
            CoordSpec::One([x, y]) => vec![Cell::new(*x, *y)],
            CoordSpec::Many(pairs) => pairs.iter().map(|[x, y]| Cell::new(*x, *y)).collect(),
        }
    }
}

/// An object observed inside a room.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub bbox: [i32; 4],
}

/// A named room.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Room {
    /// Half-open bounding box (x1, y1, x2, y2)
    pub bbox: [i32; 4],
    #[serde(default)]
    pub doors: CoordSpec,
    #[serde(default)]
    pub entries: CoordSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_position: Option<[i32; 2]>,
    #[serde(default)]
    pub objects: Vec<RoomObject>,
}

impl Room {
    /// Does the half-open bbox contain the cell?
    pub fn contains(&self, cell: Cell) -> bool {
        let [x1, y1, x2, y2] = self.bbox;
        x1 <= cell.x && cell.x < x2 && y1 <= cell.y && cell.y < y2
    }

    /// Bbox center cell.
    pub fn center(&self) -> Cell {
        let [x1, y1, x2, y2] = self.bbox;
        Cell::new((x1 + x2) / 2, (y1 + y2) / 2)
    }

    /// All declared door and entry coordinates, in document order.
    pub fn connectors(&self) -> Vec<Cell> {
        let mut cells = self.doors.cells();
        cells.extend(self.entries.cells());
        cells
    }

    /// Camera mount cell, when the document records one.
    pub fn camera(&self) -> Option<Cell> {
        self.camera_position.map(|[x, y]| Cell::new(x, y))
    }
}

/// The set of named rooms plus the grid resolution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomRegistry {
    /// Meters per grid cell
    #[serde(default = "default_resolution")]
    pub resolution: f32,
    #[serde(default)]
    pub rooms: BTreeMap<String, Room>,
    /// Tile name table shipped with the document, for rendering codes
    #[serde(skip)]
    pub tiles: TileRegistry,
}

fn default_resolution() -> f32 {
    0.15
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            rooms: BTreeMap::new(),
            tiles: TileRegistry::default(),
        }
    }
}

/// Hallway/corridor naming convention.
pub fn is_hallway_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("hall") || lower.contains("corridor")
}

impl RoomRegistry {
    /// Parse from the JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: RegistryDoc = serde_json::from_str(json)?;
        Ok(Self {
            resolution: doc.resolution,
            rooms: doc.rooms,
            tiles: TileRegistry::from_table(&doc.tile_registry),
        })
    }

    /// Load from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Name of the room whose bbox contains the cell, if any.
    pub fn room_at(&self, cell: Cell) -> Option<&str> {
        self.rooms
            .iter()
            .find(|(_, room)| room.contains(cell))
            .map(|(name, _)| name.as_str())
    }

    /// Room a cell belongs to for route purposes: bbox containment first,
    /// then connector declaration. Door cells sit in the wall between
    /// bboxes, so the room that declares one owns it.
    pub fn owner_of(&self, cell: Cell) -> Option<&str> {
        if let Some(name) = self.room_at(cell) {
            return Some(name);
        }
        self.rooms
            .iter()
            .find(|(_, room)| room.connectors().contains(&cell))
            .map(|(name, _)| name.as_str())
    }

    /// Resolve a (possibly partial, case-insensitive) room name to its
    /// registry entry. Exact match wins over substring match.
    pub fn resolve_room(&self, name: &str) -> Option<(&str, &Room)> {
        let needle = name.trim().to_lowercase();
        if let Some((n, r)) = self
            .rooms
            .iter()
            .find(|(n, _)| n.to_lowercase() == needle)
        {
            return Some((n.as_str(), r));
        }
        self.rooms
            .iter()
            .find(|(n, _)| {
                let hay = n.to_lowercase();
                hay.contains(&needle) || needle.contains(&hay)
            })
            .map(|(n, r)| (n.as_str(), r))
    }

    /// Declared connectors of a room that the grid confirms as door/entry
    /// tiles. A connector the grid disagrees with is unusable.
    pub fn validated_connectors(&self, name: &str, grid: &SemanticGrid) -> Vec<Cell> {
        match self.resolve_room(name) {
            Some((_, room)) => room
                .connectors()
                .into_iter()
                .filter(|cell| grid.is_connector(*cell))
                .collect(),
            None => Vec::new(),
        }
    }

    /// The validated connector of a room nearest to `from` (Manhattan).
    pub fn nearest_validated_connector(
        &self,
        name: &str,
        grid: &SemanticGrid,
        from: Cell,
    ) -> Option<Cell> {
        self.validated_connectors(name, grid)
            .into_iter()
            .min_by_key(|cell| cell.manhattan(&from))
    }

    /// Every walkable cell inside the room's bbox.
    pub fn walkable_cells_in(&self, name: &str, grid: &SemanticGrid) -> Vec<Cell> {
        let Some((_, room)) = self.resolve_room(name) else {
            return Vec::new();
        };
        let [x1, y1, x2, y2] = room.bbox;
        let mut cells = Vec::new();
        for y in y1..y2 {
            for x in x1..x2 {
                let cell = Cell::new(x, y);
                if grid.is_walkable(cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// The walkable in-bbox cell nearest to `from` (Manhattan).
    pub fn nearest_walkable_cell(
        &self,
        name: &str,
        grid: &SemanticGrid,
        from: Cell,
    ) -> Option<Cell> {
        self.walkable_cells_in(name, grid)
            .into_iter()
            .min_by_key(|cell| cell.manhattan(&from))
    }

    /// Find which room contains an object of the named type. Exact type
    /// match wins; substring match is the fallback.
    pub fn room_with_object(&self, object: &str) -> Option<(&str, &str)> {
        let needle = object.trim().to_lowercase();
        for (name, room) in &self.rooms {
            for obj in &room.objects {
                if obj.kind.to_lowercase() == needle {
                    return Some((name.as_str(), obj.kind.as_str()));
                }
            }
        }
        for (name, room) in &self.rooms {
            for obj in &room.objects {
                let hay = obj.kind.to_lowercase();
                if hay.contains(&needle) || needle.contains(&hay) {
                    return Some((name.as_str(), obj.kind.as_str()));
                }
            }
        }
        None
    }
}

/// On-disk document shape. Tolerates extra fields (provenance stamps and
/// the like) the mapping pipeline writes alongside the rooms.
#[derive(Deserialize)]
struct RegistryDoc {
    #[serde(default = "default_resolution")]
    resolution: f32,
    #[serde(default)]
    rooms: BTreeMap<String, Room>,
    #[serde(default)]
    tile_registry: BTreeMap<String, i32>,
}
