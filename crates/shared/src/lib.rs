use serde::{Deserialize, Serialize};

/// Integer grid position of one unit cube (0-based, internal coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Cell on the other side of `face`
    pub fn neighbor(self, face: Face) -> Cell {
        let [dx, dy, dz] = face.offset();
        Cell::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The six face-adjacent cells, in `Face::ALL` order
    pub fn neighbors(self) -> [Cell; 6] {
        Face::ALL.map(|face| self.neighbor(face))
    }

    /// 1-based user-facing coordinates. `None` for cells with negative components.
    pub fn to_user(self) -> Option<UserPos> {
        Some(UserPos {
            x: u32::try_from(self.x).ok()? + 1,
            y: u32::try_from(self.y).ok()? + 1,
            z: u32::try_from(self.z).ok()? + 1,
        })
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One of the six faces of a cube.
///
/// Declaration order is the hit-test priority used by the ray caster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    Bottom,
    Top,
    Left,
    Right,
    Front,
    Back,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Bottom,
        Face::Top,
        Face::Left,
        Face::Right,
        Face::Front,
        Face::Back,
    ];

    /// Offset to the adjacent cell across this face
    pub const fn offset(self) -> [i32; 3] {
        match self {
            Face::Bottom => [0, 0, -1],
            Face::Top => [0, 0, 1],
            Face::Left => [-1, 0, 0],
            Face::Right => [1, 0, 0],
            Face::Front => [0, -1, 0],
            Face::Back => [0, 1, 0],
        }
    }

    /// Outward unit normal
    pub fn normal(self) -> [f32; 3] {
        self.offset().map(|c| c as f32)
    }

    pub fn name(self) -> &'static str {
        match self {
            Face::Bottom => "bottom",
            Face::Top => "top",
            Face::Left => "left",
            Face::Right => "right",
            Face::Front => "front",
            Face::Back => "back",
        }
    }
}

/// Grid dimensions per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridExtent {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl GridExtent {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub const fn cube(size: u32) -> Self {
        Self::new(size, size, size)
    }

    /// True if the cell lies in `[0, extent)` on every axis
    pub fn contains(&self, cell: Cell) -> bool {
        let inside = |v: i32, max: u32| v >= 0 && (v as u32) < max;
        inside(cell.x, self.x) && inside(cell.y, self.y) && inside(cell.z, self.z)
    }

    /// True if the ground column `(x, y)` is inside the grid footprint
    pub fn contains_column(&self, x: i32, y: i32) -> bool {
        self.contains(Cell::new(x, y, 0))
    }
}

impl Default for GridExtent {
    fn default() -> Self {
        Self::cube(16)
    }
}

/// 1-based coordinates as shown to the user and written to the project log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserPos {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl UserPos {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Internal 0-based cell (components may become -1 for a zero coordinate)
    pub fn to_cell(self) -> Cell {
        let internal = |v: u32| i32::try_from(v).map_or(i32::MAX, |v| v - 1);
        Cell::new(internal(self.x), internal(self.y), internal(self.z))
    }
}

/// Project log entry. Coordinates are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LogEvent {
    Place { x: u32, y: u32, z: u32 },
    Erase { x: u32, y: u32, z: u32 },
}

impl LogEvent {
    pub fn place(pos: UserPos) -> Self {
        LogEvent::Place { x: pos.x, y: pos.y, z: pos.z }
    }

    pub fn erase(pos: UserPos) -> Self {
        LogEvent::Erase { x: pos.x, y: pos.y, z: pos.z }
    }

    pub fn pos(&self) -> UserPos {
        match *self {
            LogEvent::Place { x, y, z } | LogEvent::Erase { x, y, z } => UserPos::new(x, y, z),
        }
    }

    /// Single-letter tag used in the text format
    pub fn tag(&self) -> char {
        match self {
            LogEvent::Place { .. } => 'P',
            LogEvent::Erase { .. } => 'E',
        }
    }

    /// Format as a numbered log line, e.g. `3:P(1,2,1)`
    pub fn to_line(&self, seq: usize) -> String {
        let p = self.pos();
        format!("{seq}:{}({},{},{})", self.tag(), p.x, p.y, p.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor_offsets_are_opposite_pairs() {
        let c = Cell::new(3, 3, 3);
        assert_eq!(c.neighbor(Face::Top), Cell::new(3, 3, 4));
        assert_eq!(c.neighbor(Face::Bottom), Cell::new(3, 3, 2));
        assert_eq!(c.neighbor(Face::Left), Cell::new(2, 3, 3));
        assert_eq!(c.neighbor(Face::Right), Cell::new(4, 3, 3));
        assert_eq!(c.neighbor(Face::Front), Cell::new(3, 2, 3));
        assert_eq!(c.neighbor(Face::Back), Cell::new(3, 4, 3));
    }

    #[test]
    fn test_extent_contains() {
        let e = GridExtent::cube(16);
        assert!(e.contains(Cell::new(0, 0, 0)));
        assert!(e.contains(Cell::new(15, 15, 15)));
        assert!(!e.contains(Cell::new(16, 0, 0)));
        assert!(!e.contains(Cell::new(0, -1, 0)));
    }

    #[test]
    fn test_user_pos_round_trip() {
        let cell = Cell::new(0, 4, 15);
        let user = cell.to_user().unwrap();
        assert_eq!(user, UserPos::new(1, 5, 16));
        assert_eq!(user.to_cell(), cell);
        assert!(Cell::new(-1, 0, 0).to_user().is_none());
    }

    #[test]
    fn test_log_event_line() {
        let ev = LogEvent::place(UserPos::new(1, 2, 3));
        assert_eq!(ev.to_line(7), "7:P(1,2,3)");
        let ev = LogEvent::erase(UserPos::new(4, 5, 6));
        assert_eq!(ev.to_line(1), "1:E(4,5,6)");
    }

    #[test]
    fn test_log_event_serde_tagged() {
        let ev = LogEvent::place(UserPos::new(1, 1, 1));
        let json = serde_json::to_string(&ev).unwrap();
        assert_eq!(json, r#"{"op":"place","x":1,"y":1,"z":1}"#);
        let back: LogEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }
}
