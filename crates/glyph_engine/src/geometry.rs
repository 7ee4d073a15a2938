use std::ops::{Add, AddAssign, Sub, SubAssign};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Clamp both components into `[0, width)` / `[0, height)`.
    pub fn clamped(self, size: Size) -> Position {
        Position {
            x: self.x.clamp(0, size.width - 1),
            y: self.y.clamp(0, size.height - 1),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(x: {}, y: {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from(value: (i32, i32)) -> Self {
        Position { x: value.0, y: value.1 }
    }
}

impl Add<Position> for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign<Position> for Position {
    fn add_assign(&mut self, rhs: Position) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub<Position> for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl SubAssign<Position> for Position {
    fn sub_assign(&mut self, rhs: Position) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Size { width, height }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(width: {}, height: {})", self.width, self.height)
    }
}

impl From<(i32, i32)> for Size {
    fn from(value: (i32, i32)) -> Self {
        Size {
            width: value.0,
            height: value.1,
        }
    }
}

/// Axis-aligned rectangle, `start` inclusive, extent `size`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rectangle {
    pub start: Position,
    pub size: Size,
}

impl Rectangle {
    pub fn new(start: impl Into<Position>, size: impl Into<Size>) -> Self {
        Rectangle {
            start: start.into(),
            size: size.into(),
        }
    }

    pub fn from(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rectangle {
            start: Position::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn left(&self) -> i32 {
        self.start.x
    }

    pub fn top(&self) -> i32 {
        self.start.y
    }

    pub fn right(&self) -> i32 {
        self.start.x + self.size.width
    }

    pub fn bottom(&self) -> i32 {
        self.start.y + self.size.height
    }

    /// True when `pos` lies inside the half-open extent.
    pub fn is_inside(&self, pos: impl Into<Position>) -> bool {
        let pos = pos.into();
        self.start.x <= pos.x && pos.x < self.right() && self.start.y <= pos.y && pos.y < self.bottom()
    }

    pub fn is_empty(&self) -> bool {
        self.size.width <= 0 || self.size.height <= 0
    }
}

impl std::fmt::Display for Rectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(x:{}, y:{}, width: {}, height: {})",
            self.start.x, self.start.y, self.size.width, self.size.height
        )
    }
}
