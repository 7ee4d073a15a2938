/// State of a single cell in a [`Bitmap`](crate::Bitmap).
///
/// The first six states are part of the stored document; the two
/// helper states only ever appear in composited frames handed to the
/// renderer, never in a saved font table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum PixelState {
    #[default]
    Empty = 0,
    Ink = 1,
    CursorOnEmpty = 2,
    GridLine = 3,
    CursorOnInk = 4,
    Placeholder = 5,
    HelperOnEmpty = 6,
    HelperOnInk = 7,
}

impl PixelState {
    /// Grid lines and placeholder cells never take user drawing.
    pub fn is_locked(self) -> bool {
        matches!(self, PixelState::GridLine | PixelState::Placeholder)
    }

    pub fn is_ink(self) -> bool {
        matches!(self, PixelState::Ink)
    }

    pub fn from_bit(bit: u8) -> Self {
        if bit == 0 { PixelState::Empty } else { PixelState::Ink }
    }
}

impl From<PixelState> for u8 {
    fn from(value: PixelState) -> Self {
        value as u8
    }
}

impl From<u8> for PixelState {
    fn from(value: u8) -> Self {
        match value {
            1 => PixelState::Ink,
            2 => PixelState::CursorOnEmpty,
            3 => PixelState::GridLine,
            4 => PixelState::CursorOnInk,
            5 => PixelState::Placeholder,
            6 => PixelState::HelperOnEmpty,
            7 => PixelState::HelperOnInk,
            _ => PixelState::Empty,
        }
    }
}
