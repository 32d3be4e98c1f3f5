//! Tile codes and the dynamic tile registry.
//!
//! The grid stores integer tile codes. A handful of codes are reserved;
//! everything else is assigned on first sight as object/material types are
//! observed, including composite codes for cells where two objects' drawn
//! footprints overlap.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unobserved cell sentinel.
pub const UNKNOWN: i32 = -1;
/// Free, traversable floor.
pub const FREE: i32 = 0;
/// Solid wall.
pub const WALL: i32 = 1;
/// Camera mount position.
pub const CAMERA: i32 = 2;
/// Open door connector.
pub const DOOR: i32 = 3;
/// Entry-point connector.
pub const ENTRY: i32 = 8;

/// First code available for dynamically registered types.
const FIRST_DYNAMIC: i32 = 4;

/// Can an agent stand on a cell with this code?
pub fn is_walkable(code: i32) -> bool {
    matches!(code, FREE | DOOR | ENTRY)
}

/// Is this code a door/entry connector?
pub fn is_connector(code: i32) -> bool {
    matches!(code, DOOR | ENTRY)
}

fn is_reserved(code: i32) -> bool {
    matches!(code, FREE | WALL | CAMERA | DOOR | ENTRY)
}

/// A dynamically registered tile type.
///
/// Overlapping footprints of two distinct objects get a `Pair` code; the
/// overlap rule is defined for exactly two types and is not extended
/// further, so there is no triple variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Single(String),
    Pair(String, String),
}

impl TileKind {
    /// Display name, resolved at render time. Pair names list the two
    /// types sorted, so registration order does not leak into output.
    pub fn display_name(&self) -> String {
        match self {
            TileKind::Single(name) => name.clone(),
            TileKind::Pair(a, b) => format!("{} and {}", a, b),
        }
    }
}

/// Append-only bidirectional table between tile names and codes.
///
/// Reserved codes are seeded at construction; dynamic codes start at 4 and
/// skip over reserved values. Codes are never reassigned or removed.
#[derive(Clone, Debug)]
pub struct TileRegistry {
    by_name: BTreeMap<String, i32>,
    by_code: BTreeMap<i32, TileKind>,
    next_code: i32,
}

impl Default for TileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TileRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            by_name: BTreeMap::new(),
            by_code: BTreeMap::new(),
            next_code: FIRST_DYNAMIC,
        };
        for (name, code) in [
            ("free_space", FREE),
            ("wall", WALL),
            ("camera", CAMERA),
            ("door", DOOR),
            ("entry", ENTRY),
        ] {
            registry.by_name.insert(name.to_string(), code);
            registry
                .by_code
                .insert(code, TileKind::Single(name.to_string()));
        }
        registry
    }

    /// Get or register the code for an object type name.
    pub fn code_for(&mut self, name: &str) -> i32 {
        let key = name.trim().to_lowercase();
        if let Some(&code) = self.by_name.get(&key) {
            return code;
        }
        self.insert_kind(TileKind::Single(key))
    }

    /// Resolve the tile code for a cell where `name`'s footprint lands on a
    /// cell already coded `existing`.
    ///
    /// Rules (defined for exactly two colliding types):
    /// - onto a reserved code: the new object wins, registered alone
    /// - onto the same name: the existing code stands
    /// - onto an existing pair: the pair stands
    /// - onto a different single: a pair code, names sorted
    pub fn overlap_code(&mut self, existing: i32, name: &str) -> i32 {
        if is_reserved(existing) {
            return self.code_for(name);
        }
        let new_name = name.trim().to_lowercase();
        match self.by_code.get(&existing) {
            Some(TileKind::Single(existing_name)) if *existing_name == new_name => existing,
            Some(TileKind::Pair(_, _)) => existing,
            Some(TileKind::Single(existing_name)) => {
                let (a, b) = if *existing_name <= new_name {
                    (existing_name.clone(), new_name)
                } else {
                    (new_name, existing_name.clone())
                };
                let key = format!("{} and {}", a, b);
                if let Some(&code) = self.by_name.get(&key) {
                    return code;
                }
                self.insert_kind(TileKind::Pair(a, b))
            }
            None => self.code_for(name),
        }
    }

    fn insert_kind(&mut self, kind: TileKind) -> i32 {
        while is_reserved(self.next_code) {
            self.next_code += 1;
        }
        let code = self.next_code;
        self.next_code += 1;
        self.by_name.insert(kind.display_name(), code);
        self.by_code.insert(code, kind);
        code
    }

    /// Look up the kind registered for a code.
    pub fn kind(&self, code: i32) -> Option<&TileKind> {
        self.by_code.get(&code)
    }

    /// Display name for a code; unregistered codes render as "unknown".
    pub fn display_name(&self, code: i32) -> String {
        self.by_code
            .get(&code)
            .map(|k| k.display_name())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Number of registered codes, reserved included.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Snapshot of the name → code table, for persistence alongside the
    /// room registry document.
    pub fn to_table(&self) -> BTreeMap<String, i32> {
        self.by_name.clone()
    }

    /// Rebuild from a persisted name → code table. Reserved codes are
    /// always seeded; pair names ("a and b") are restored as pairs, and
    /// dynamic numbering continues after the highest loaded code.
    pub fn from_table(table: &BTreeMap<String, i32>) -> Self {
        let mut registry = Self::new();
        for (name, &code) in table {
            if registry.by_code.contains_key(&code) {
                continue;
            }
            let kind = match name.split_once(" and ") {
                Some((a, b)) => TileKind::Pair(a.to_string(), b.to_string()),
                None => TileKind::Single(name.clone()),
            };
            registry.by_name.insert(name.clone(), code);
            registry.by_code.insert(code, kind);
            if code >= registry.next_code {
                registry.next_code = code + 1;
            }
        }
        registry
    }
}
