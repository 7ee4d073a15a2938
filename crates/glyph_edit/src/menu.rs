use glyph_engine::{parse_font, Bitmap, Dims, Font, PixelState, VirtualCanvas};
use lazy_static::lazy_static;

use crate::MenuAction;

/// Height of the reserved menu band at the top of every canvas, in
/// unscaled pixels.
pub const MENU_BAR_HEIGHT: i32 = 16;

lazy_static! {
    /// Built-in 5x7 font covering exactly the glyphs the menu labels
    /// need (plus `?` as the fallback).
    static ref MENU_FONT: Font = parse_font(include_str!("../data/menu_font.fnt")).expect("built-in menu font is valid");
}

pub fn menu_font() -> &'static Font {
    &MENU_FONT
}

/// The always-on menu band: label buttons, the marker toggle square
/// and their hit regions.
///
/// Hit regions are instance state and are rebuilt on every redraw;
/// button offsets derive from the measured width of the preceding
/// labels, so positions shift with the font and are never static.
pub struct MenuBar {
    frame: VirtualCanvas,
    regions: Vec<(MenuAction, Dims)>,
}

impl MenuBar {
    pub fn new(width: i32) -> Self {
        MenuBar {
            frame: VirtualCanvas::new(width, MENU_BAR_HEIGHT),
            regions: Vec::new(),
        }
    }

    pub fn reinit(&mut self, width: i32) {
        self.frame.reinit(width, MENU_BAR_HEIGHT);
        self.regions.clear();
    }

    pub fn bitmap(&self) -> &Bitmap {
        self.frame.bitmap()
    }

    /// Repaint the band and rebuild all hit regions. A latched button
    /// renders inverted; the marker square renders its on/off state.
    pub fn redraw(&mut self, latched: Option<MenuAction>, marker_on: bool) {
        let font = menu_font();
        self.frame.clear();
        self.regions.clear();

        let text_y = (MENU_BAR_HEIGHT - font.height()) / 2;
        let new_dims = self
            .frame
            .draw_text(font, "New", 2, text_y, PixelState::Ink, latched == Some(MenuAction::New), true);
        let open_dims = self
            .frame
            .draw_text(font, "Open", 5 + new_dims.b_x, text_y, PixelState::Ink, latched == Some(MenuAction::Open), true);
        let save_dims = self
            .frame
            .draw_text(font, "Save", 5 + open_dims.b_x, text_y, PixelState::Ink, latched == Some(MenuAction::Save), true);
        let marker_dims = self.frame.draw_rect(
            4 + save_dims.b_x,
            4,
            4 + save_dims.b_x + 8,
            4 + 8,
            if marker_on { PixelState::GridLine } else { PixelState::CursorOnInk },
        );
        let test_dims = self.frame.draw_text(
            font,
            "Test",
            8 + marker_dims.b_x,
            text_y,
            PixelState::Ink,
            latched == Some(MenuAction::TestFont),
            true,
        );

        self.regions.push((MenuAction::New, new_dims));
        self.regions.push((MenuAction::Open, open_dims));
        self.regions.push((MenuAction::Save, save_dims));
        self.regions.push((MenuAction::MarkerToggle, marker_dims));
        self.regions.push((MenuAction::TestFont, test_dims));
    }

    /// Action whose region contains the (unscaled) point, if any.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<MenuAction> {
        self.regions.iter().find(|(_, dims)| dims.contains(x, y)).map(|(action, _)| *action)
    }

    #[cfg(test)]
    pub(crate) fn regions(&self) -> &[(MenuAction, Dims)] {
        &self.regions
    }
}
