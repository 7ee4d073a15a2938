use crate::{PixelState, Position, Rectangle, Size};

/// Rectangular, row-major grid of [`PixelState`] cells.
///
/// The recorded width/height always match the storage: any resize
/// reallocates the whole grid and zero-fills it. This is the data
/// interchange format between the font, the offscreen compositor and
/// the interactive canvas.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bitmap {
    width: i32,
    height: i32,
    data: Vec<Vec<PixelState>>,
}

impl Bitmap {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Bitmap {
            width,
            height,
            data: vec![vec![PixelState::Empty; width as usize]; height as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Drop the current contents and reallocate at the new dimensions.
    pub fn resize(&mut self, width: i32, height: i32) {
        *self = Bitmap::new(width, height);
    }

    pub fn is_inside(&self, pos: impl Into<Position>) -> bool {
        let pos = pos.into();
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Cell at `pos`, `Empty` when out of bounds.
    pub fn get(&self, pos: impl Into<Position>) -> PixelState {
        let pos = pos.into();
        if !self.is_inside(pos) {
            return PixelState::Empty;
        }
        self.data[pos.y as usize][pos.x as usize]
    }

    /// Set the cell at `pos`; out-of-bounds writes are dropped.
    pub fn set(&mut self, pos: impl Into<Position>, state: PixelState) {
        let pos = pos.into();
        if self.is_inside(pos) {
            self.data[pos.y as usize][pos.x as usize] = state;
        }
    }

    /// Nearest-neighbor block replication by an integer factor.
    /// Scale factors below 2 return the grid unchanged.
    pub fn upscaled(&self, scale: i32) -> Bitmap {
        if scale <= 1 || self.is_empty() {
            return self.clone();
        }

        let mut result = Bitmap::new(self.width * scale, self.height * scale);
        for y in 0..self.height {
            for x in 0..self.width {
                let state = self.data[y as usize][x as usize];
                for sy in 0..scale {
                    for sx in 0..scale {
                        result.data[(y * scale + sy) as usize][(x * scale + sx) as usize] = state;
                    }
                }
            }
        }
        result
    }

    /// Copy of the sub-grid covered by `rect`, clipped to bounds.
    pub fn snapshot(&self, rect: Rectangle) -> Bitmap {
        let mut result = Bitmap::new(rect.size.width, rect.size.height);
        for y in 0..rect.size.height {
            for x in 0..rect.size.width {
                let src = Position::new(rect.start.x + x, rect.start.y + y);
                if self.is_inside(src) {
                    result.data[y as usize][x as usize] = self.get(src);
                }
            }
        }
        result
    }

    /// Write `src` at `origin`, skipping destination cells that are
    /// grid lines or placeholders. Out-of-bounds pixels are dropped.
    pub fn blit(&mut self, origin: Position, src: &Bitmap) {
        for y in 0..src.height {
            for x in 0..src.width {
                let dest = Position::new(origin.x + x, origin.y + y);
                if !self.is_inside(dest) || self.get(dest).is_locked() {
                    continue;
                }
                self.set(dest, src.data[y as usize][x as usize]);
            }
        }
    }

    /// Row-major iteration over all cells with their positions.
    pub fn cells(&self) -> impl Iterator<Item = (Position, PixelState)> + '_ {
        self.data
            .iter()
            .enumerate()
            .flat_map(|(y, row)| row.iter().enumerate().map(move |(x, &state)| (Position::new(x as i32, y as i32), state)))
    }
}

impl std::fmt::Display for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::new();
        for (y, row) in self.data.iter().enumerate() {
            s.push_str(&format!("{y:2}"));
            for &state in row {
                s.push(match state {
                    PixelState::Empty => '-',
                    PixelState::Ink => '#',
                    PixelState::GridLine => '|',
                    PixelState::Placeholder => '.',
                    _ => '+',
                });
            }
            s.push('\n');
        }
        write!(f, "{s}---")
    }
}
