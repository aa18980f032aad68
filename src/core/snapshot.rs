//! Deterministic snapshot generation
//!
//! Snapshots capture a screen buffer at the moment it is presented, in a
//! serializable format for testing and debugging. Replaying the same calls
//! against a fresh buffer must produce an identical snapshot.

use serde::{Deserialize, Serialize};

use super::buffer::ScreenBuffer;
use super::cell::{attr, Attr, Cell};
use super::cursor::CursorState;

/// A complete snapshot of a screen buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Screen dimensions
    pub width: usize,
    pub height: usize,
    /// Visible grid content (row-major)
    pub grid: Vec<Vec<CellSnapshot>>,
    /// Cursor state
    pub cursor: CursorState,
    /// Attribute register at snapshot time
    #[serde(default)]
    pub attr: Attr,
}

/// Snapshot of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Character content
    pub c: char,
    /// Attribute bits
    #[serde(default, skip_serializing_if = "AttrSnapshot::is_empty")]
    pub attr: AttrSnapshot,
}

/// Attribute bits spelled out by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttrSnapshot {
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub reverse: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bright: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dim: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl AttrSnapshot {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Pack back into attribute bits
    pub fn bits(&self) -> Attr {
        [
            (self.italic, attr::ITALIC),
            (self.underline, attr::UNDERLINE),
            (self.reverse, attr::REVERSE),
            (self.bold, attr::BOLD),
            (self.bright, attr::BRIGHT),
            (self.dim, attr::DIM),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .fold(0, |acc, (_, bit)| acc | bit)
    }
}

impl From<Attr> for AttrSnapshot {
    fn from(bits: Attr) -> Self {
        AttrSnapshot {
            italic: bits & attr::ITALIC != 0,
            underline: bits & attr::UNDERLINE != 0,
            reverse: bits & attr::REVERSE != 0,
            bold: bits & attr::BOLD != 0,
            bright: bits & attr::BRIGHT != 0,
            dim: bits & attr::DIM != 0,
        }
    }
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            c: cell.c,
            attr: AttrSnapshot::from(cell.attr),
        }
    }
}

impl Snapshot {
    /// Create a snapshot from the current buffer state
    pub fn from_buffer(buffer: &ScreenBuffer) -> Self {
        let grid = buffer
            .rows()
            .take(buffer.height())
            .map(|row| row.iter().map(CellSnapshot::from).collect())
            .collect();

        Snapshot {
            width: buffer.width(),
            height: buffer.height(),
            grid,
            cursor: *buffer.cursor(),
            attr: buffer.attr(),
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get the cell at (x, y)
    pub fn cell(&self, x: usize, y: usize) -> Option<&CellSnapshot> {
        self.grid.get(y).and_then(|row| row.get(x))
    }

    /// Plain text of one row, trailing spaces trimmed
    pub fn row_text(&self, y: usize) -> String {
        self.grid
            .get(y)
            .map(|row| {
                let line: String = row.iter().map(|cell| cell.c).collect();
                line.trim_end_matches(' ').to_string()
            })
            .unwrap_or_default()
    }

    /// Get a simple text representation of the screen (for debugging)
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        for y in 0..self.grid.len() {
            result.push_str(&self.row_text(y));
            result.push('\n');
        }

        // Remove trailing empty lines
        while result.ends_with("\n\n") {
            result.pop();
        }

        result
    }

    /// Compare two snapshots for equality, ignoring cursor and register
    pub fn content_equals(&self, other: &Snapshot) -> bool {
        self.width == other.width && self.height == other.height && self.grid == other.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_str(buf: &mut ScreenBuffer, x: i32, y: i32, s: &str) {
        for (i, c) in s.chars().enumerate() {
            buf.write_char(x + i as i32, y, c);
        }
    }

    #[test]
    fn test_snapshot_from_buffer() {
        let mut buf = ScreenBuffer::new(10, 3);
        write_str(&mut buf, 0, 0, "Hi");
        buf.set_cursor(2, 0, true);

        let snapshot = Snapshot::from_buffer(&buf);

        assert_eq!(snapshot.width, 10);
        assert_eq!(snapshot.height, 3);
        assert_eq!(snapshot.grid.len(), 3);
        assert_eq!(snapshot.grid[0].len(), 10);
        assert_eq!(snapshot.grid[0][0].c, 'H');
        assert_eq!(snapshot.grid[0][1].c, 'i');
        assert_eq!(snapshot.cursor.x, 2);
        assert!(snapshot.cursor.visible);
    }

    #[test]
    fn test_snapshot_to_text() {
        let mut buf = ScreenBuffer::new(10, 4);
        write_str(&mut buf, 0, 0, "AB");
        write_str(&mut buf, 3, 1, "C");

        let text = Snapshot::from_buffer(&buf).to_text();
        assert_eq!(text, "AB\n   C\n");
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut buf = ScreenBuffer::new(5, 2);
        write_str(&mut buf, 0, 0, "X");
        buf.set_attr(0xff, attr::BOLD | attr::REVERSE);
        write_str(&mut buf, 1, 0, "Y");

        let snapshot = Snapshot::from_buffer(&buf);
        let json = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();

        assert!(snapshot.content_equals(&restored));
        assert_eq!(restored.attr, attr::BOLD | attr::REVERSE);
        assert!(restored.cell(1, 0).unwrap().attr.bold);
    }

    #[test]
    fn test_plain_cells_omit_attr() {
        let buf = ScreenBuffer::new(1, 1);
        let json = Snapshot::from_buffer(&buf).to_json().unwrap();
        assert!(!json.contains("bold"));
        assert!(!json.contains("italic"));
    }

    #[test]
    fn test_attr_snapshot() {
        let bits = attr::BOLD | attr::UNDERLINE;
        let snapshot = AttrSnapshot::from(bits);
        assert!(snapshot.bold);
        assert!(snapshot.underline);
        assert!(!snapshot.italic);
        assert_eq!(snapshot.bits(), bits);
    }
}
