use crate::{Bitmap, Font, PixelState};

/// Bounding box returned by the drawing primitives, also used as a
/// menu hit region.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Dims {
    pub a_x: i32,
    pub a_y: i32,
    pub b_x: i32,
    pub b_y: i32,
}

impl Dims {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.a_x <= x && x <= self.b_x && self.a_y <= y && y <= self.b_y
    }
}

/// Offscreen bitmap with rectangle and text drawing on top.
///
/// Used for the always-on menu band and for rendering font test
/// samples; everything stays in [`PixelState`] space until the render
/// tick maps states to colors.
pub struct VirtualCanvas {
    width: i32,
    height: i32,
    canvas: Bitmap,
}

impl VirtualCanvas {
    pub fn new(width: i32, height: i32) -> Self {
        VirtualCanvas {
            width,
            height,
            canvas: Bitmap::new(width, height),
        }
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.canvas
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn clear(&mut self) {
        self.canvas = Bitmap::new(self.width, self.height);
    }

    pub fn reinit(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.canvas = Bitmap::new(width, height);
    }

    /// Fill the half-open rectangle `[a_x, b_x) x [a_y, b_y)` and
    /// return its bounds.
    pub fn draw_rect(&mut self, a_x: i32, a_y: i32, b_x: i32, b_y: i32, brush: PixelState) -> Dims {
        for y in a_y..b_y {
            for x in a_x..b_x {
                self.canvas.set((x, y), brush);
            }
        }
        Dims { a_x, a_y, b_x, b_y }
    }

    /// Lay out `text` glyph by glyph starting at `(off_x, off_y)`.
    ///
    /// `\n` starts a new line back at `off_x`, one pixel below the
    /// previous glyph row; `\r` is ignored. Monospace mode advances by
    /// the font cell width, proportional mode trims blank leading and
    /// trailing glyph columns first (a fully blank glyph keeps the
    /// full cell width so spaces survive). Inverted mode paints the
    /// background bits instead of the ink bits. Pixels are clipped at
    /// the canvas edge by abandoning the rest of the row.
    ///
    /// Returns the measured bounds; `b_x` is the right edge of the
    /// widest line.
    pub fn draw_text(&mut self, font: &Font, text: &str, off_x: i32, off_y: i32, brush: PixelState, invert: bool, monospace: bool) -> Dims {
        let fw = font.width();
        let fh = font.height();
        let mut x = off_x;
        let mut y = off_y;
        let mut max_right = off_x;

        for ch in text.chars() {
            match ch {
                '\n' => {
                    y += fh + 1;
                    x = off_x;
                    continue;
                }
                '\r' => continue,
                _ => {}
            }

            let Some(glyph) = font.glyph_image(ch as u32) else {
                log::warn!("no glyph for U+{:04X}, skipped", ch as u32);
                continue;
            };

            let (first_col, glyph_width) = if monospace {
                (0, fw)
            } else {
                match inked_extent(&glyph) {
                    Some((first, last)) => (first, last - first + 1),
                    None => (0, fw),
                }
            };

            for gy in 0..fh {
                for gx in 0..glyph_width {
                    let pos_x = x + gx;
                    let pos_y = y + gy;
                    if pos_x < 0 || pos_x >= self.width || pos_y < 0 || pos_y >= self.height {
                        break;
                    }

                    let ink = glyph.get((first_col + gx, gy)).is_ink();
                    if ink != invert {
                        self.canvas.set((pos_x, pos_y), brush);
                    }
                }
            }

            x += glyph_width;
            max_right = max_right.max(x);
            x += font.interval();
        }

        Dims {
            a_x: off_x,
            a_y: off_y,
            b_x: max_right,
            b_y: y + fh,
        }
    }
}

/// First and last glyph column containing ink, `None` for a blank glyph.
fn inked_extent(glyph: &Bitmap) -> Option<(i32, i32)> {
    let mut first = None;
    let mut last = None;
    for x in 0..glyph.width() {
        let has_ink = (0..glyph.height()).any(|y| glyph.get((x, y)).is_ink());
        if has_ink {
            if first.is_none() {
                first = Some(x);
            }
            last = Some(x);
        }
    }
    Some((first?, last?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Font;

    // 2x3 cells: 'A' = left column inked, 'B' = all inked, '?' = right column
    fn tiny_font() -> Font {
        #[rustfmt::skip]
        let dict = vec![
            1, 0, 1, 0, 1, 0, // 'A'
            1, 1, 1, 1, 1, 1, // 'B'
            0, 1, 0, 1, 0, 1, // '?'
        ];
        Font::from_dictionary(dict, 3, 2, vec![0x41, 0x42, 0x3F]).unwrap()
    }

    #[test]
    fn rect_returns_bounds_and_fills_half_open() {
        let mut vc = VirtualCanvas::new(8, 8);
        let dims = vc.draw_rect(1, 1, 4, 3, PixelState::Ink);
        assert_eq!(dims, Dims { a_x: 1, a_y: 1, b_x: 4, b_y: 3 });
        assert!(vc.bitmap().get((1, 1)).is_ink());
        assert!(vc.bitmap().get((3, 2)).is_ink());
        assert!(!vc.bitmap().get((4, 1)).is_ink());
        assert!(!vc.bitmap().get((1, 3)).is_ink());
    }

    #[test]
    fn monospace_advance_is_cell_plus_interval() {
        let mut vc = VirtualCanvas::new(32, 8);
        let dims = vc.draw_text(&tiny_font(), "AB", 0, 0, PixelState::Ink, false, true);
        // two cells of 2 plus one interval between, right edge excludes
        // the trailing interval
        assert_eq!(dims.b_x, 5);
        assert_eq!(dims.b_y, 3);
        // 'A' left column at x=0, 'B' fills x=3..=4
        assert!(vc.bitmap().get((0, 0)).is_ink());
        assert!(!vc.bitmap().get((1, 0)).is_ink());
        assert!(vc.bitmap().get((3, 0)).is_ink());
        assert!(vc.bitmap().get((4, 2)).is_ink());
    }

    #[test]
    fn proportional_trims_blank_columns() {
        let mut vc = VirtualCanvas::new(32, 8);
        let dims = vc.draw_text(&tiny_font(), "AA", 0, 0, PixelState::Ink, false, false);
        // each 'A' shrinks to one column
        assert_eq!(dims.b_x, 3);
        assert!(vc.bitmap().get((0, 0)).is_ink());
        assert!(vc.bitmap().get((2, 0)).is_ink());
    }

    #[test]
    fn newline_resets_x_and_measures_widest_line() {
        let mut vc = VirtualCanvas::new(32, 16);
        let dims = vc.draw_text(&tiny_font(), "B\r\nBB", 1, 0, PixelState::Ink, false, true);
        assert_eq!(dims.a_x, 1);
        assert_eq!(dims.b_x, 1 + 5);
        assert_eq!(dims.b_y, 4 + 3);
        // second line starts below the first plus one blank row
        assert!(vc.bitmap().get((1, 4)).is_ink());
    }

    #[test]
    fn inverted_text_paints_background_bits() {
        let mut vc = VirtualCanvas::new(8, 8);
        vc.draw_text(&tiny_font(), "A", 0, 0, PixelState::Ink, true, true);
        assert!(!vc.bitmap().get((0, 0)).is_ink());
        assert!(vc.bitmap().get((1, 0)).is_ink());
    }

    #[test]
    fn clipping_abandons_row_at_the_edge() {
        let mut vc = VirtualCanvas::new(4, 3);
        // 'B' at x=3 has one visible column
        vc.draw_text(&tiny_font(), "B", 3, 0, PixelState::Ink, false, true);
        assert!(vc.bitmap().get((3, 0)).is_ink());
        // nothing wrapped around
        assert!(!vc.bitmap().get((0, 0)).is_ink());
    }

    #[test]
    fn missing_glyph_without_fallback_is_skipped() {
        let font = Font::from_dictionary(vec![1, 1, 1, 1, 1, 1], 3, 2, vec![0x41]).unwrap();
        let mut vc = VirtualCanvas::new(16, 4);
        let dims = vc.draw_text(&font, "z", 0, 0, PixelState::Ink, false, true);
        assert_eq!(dims.b_x, 0);
    }
}
