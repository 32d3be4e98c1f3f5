//! The semantic occupancy grid.
//!
//! A rectangular, row-major array of integer tile codes, loaded from a text
//! encoding with one whitespace-separated row per line. The grid is a
//! read-only snapshot once loaded; map updates arrive as whole new grids.

use super::tiles;
use super::Cell;
use crate::error::{GrihaError, Result};
use std::path::Path;

/// Rectangular grid of tile codes.
#[derive(Clone, Debug)]
pub struct SemanticGrid {
    width: usize,
    height: usize,
    cells: Vec<i32>,
}

impl SemanticGrid {
    /// Create a grid filled with a single code.
    pub fn filled(width: usize, height: usize, code: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![code; width * height],
        }
    }

    /// Parse from the text encoding: one row per line, integer codes
    /// separated by whitespace. Every row must have the same length.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut rows: Vec<Vec<i32>> = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row: std::result::Result<Vec<i32>, _> =
                line.split_whitespace().map(|tok| tok.parse::<i32>()).collect();
            let row = row.map_err(|e| {
                GrihaError::Grid(format!("line {}: invalid tile code: {}", line_no + 1, e))
            })?;
            if let Some(first) = rows.first() {
                if row.len() != first.len() {
                    return Err(GrihaError::Grid(format!(
                        "line {}: ragged row ({} codes, expected {})",
                        line_no + 1,
                        row.len(),
                        first.len()
                    )));
                }
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(GrihaError::Grid("empty grid".to_string()));
        }

        let height = rows.len();
        let width = rows[0].len();
        let cells = rows.into_iter().flatten().collect();
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Load from a file in the text encoding.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_text(&text)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    /// Tile code at a cell; out-of-bounds reads as unknown.
    pub fn code_at(&self, cell: Cell) -> i32 {
        if !self.in_bounds(cell) {
            return tiles::UNKNOWN;
        }
        self.cells[cell.y as usize * self.width + cell.x as usize]
    }

    /// Set a cell's code. Used by test fixtures and map builders; the
    /// planner and executor only read.
    pub fn set_code(&mut self, cell: Cell, code: i32) {
        if self.in_bounds(cell) {
            self.cells[cell.y as usize * self.width + cell.x as usize] = code;
        }
    }

    /// Is the cell standable: in bounds and coded free/door/entry?
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && tiles::is_walkable(self.code_at(cell))
    }

    /// Is the cell a door/entry connector?
    pub fn is_connector(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && tiles::is_connector(self.code_at(cell))
    }

    /// Render back to the text encoding.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for y in 0..self.height {
            let row: Vec<String> = (0..self.width)
                .map(|x| self.cells[y * self.width + x].to_string())
                .collect();
            out.push_str(&row.join(" "));
            out.push('\n');
        }
        out
    }
}
