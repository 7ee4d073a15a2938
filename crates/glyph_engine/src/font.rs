use lazy_static::lazy_static;
use regex::Regex;

use crate::{Bitmap, EngineError, EngineResult, PixelState, Position};

/// Code point used when a glyph lookup misses.
pub const FALLBACK_CHAR: u32 = 0x3F; // '?'

lazy_static! {
    static ref SEQUENCE_GRAMMAR: Regex = Regex::new(r"^[0-9a-fA-Fx ,\-]+$").unwrap();
    static ref RANGE_TOKEN: Regex = Regex::new(r"^([0-9a-fA-Fx]+)\-([0-9a-fA-Fx]+)$").unwrap();
    static ref NUMBER_TOKEN: Regex = Regex::new(r"^[0-9a-fA-Fx]+$").unwrap();
}

/// A fixed-cell bitmap font: a flat bit dictionary plus the character
/// sequence that maps code points to dictionary slots.
///
/// An empty sequence is shorthand for the canonical 0..255 identity
/// mapping. Fonts are immutable after construction; the editor edits
/// the rendered font table and builds a fresh `Font` on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    dict: Vec<u8>,
    width: i32,
    height: i32,
    seq: Vec<u32>,
    extended: bool,
    interval: i32,
}

impl Font {
    /// Build a font from raw dictionary bits (one byte per pixel, 0 or
    /// 1) and a sequence specification string (see [`parse_sequence`]).
    pub fn from_bits(dict: Vec<u8>, height: i32, width: i32, sequence_spec: &str) -> EngineResult<Self> {
        let count = Self::validated_count(&dict, width, height)?;
        if sequence_spec.is_empty() && count != 256 {
            return Err(EngineError::CharCountMismatch {
                dictionary: count,
                sequence: 256,
            });
        }

        let (seq, extended) = parse_sequence(sequence_spec, count)?;
        Ok(Font {
            dict,
            width,
            height,
            seq,
            extended,
            interval: 1,
        })
    }

    /// Build a font from dictionary bits and an explicit, already
    /// parsed sequence. An empty sequence requires exactly 256 glyphs.
    pub fn from_dictionary(dict: Vec<u8>, height: i32, width: i32, seq: Vec<u32>) -> EngineResult<Self> {
        let count = Self::validated_count(&dict, width, height)?;
        if seq.is_empty() {
            if count != 256 {
                return Err(EngineError::CharCountMismatch {
                    dictionary: count,
                    sequence: 256,
                });
            }
        } else if seq.len() != count {
            return Err(EngineError::CharCountMismatch {
                dictionary: count,
                sequence: seq.len(),
            });
        }

        let extended = seq.iter().any(|&ch| ch > 255);
        Ok(Font {
            dict,
            width,
            height,
            seq,
            extended,
            interval: 1,
        })
    }

    /// All-ink-free font with an identity sequence.
    pub fn empty(height: i32, width: i32, count: usize) -> EngineResult<Self> {
        let dict = vec![0; (height * width) as usize * count];
        let seq = (0..count as u32).collect();
        Font::from_dictionary(dict, height, width, seq)
    }

    fn validated_count(dict: &[u8], width: i32, height: i32) -> EngineResult<usize> {
        let cell = (width * height) as usize;
        if cell == 0 || dict.len() % cell != 0 {
            return Err(EngineError::CorruptDictionary {
                bits: dict.len(),
                width,
                height,
            });
        }
        let count = dict.len() / cell;
        if count == 0 {
            return Err(EngineError::EmptyDictionary);
        }
        Ok(count)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Inter-glyph spacing used by text layout, persisted by the newer
    /// file format.
    pub fn interval(&self) -> i32 {
        self.interval
    }

    pub fn set_interval(&mut self, interval: i32) {
        self.interval = interval.max(0);
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }

    pub fn char_count(&self) -> usize {
        if self.seq.is_empty() { 256 } else { self.seq.len() }
    }

    pub fn sequence(&self) -> &[u32] {
        &self.seq
    }

    /// The ordered code points this font covers, with the identity
    /// shorthand expanded.
    pub fn all_chars(&self) -> Vec<u32> {
        if self.seq.is_empty() { (0..256).collect() } else { self.seq.clone() }
    }

    pub fn dictionary_bits(&self) -> &[u8] {
        &self.dict
    }

    /// Dictionary slot for a code point, without fallback.
    ///
    /// Extended fonts scan the whole sequence so the *last* duplicate
    /// wins; this mirrors long-standing behavior the file format
    /// round-trip relies on. Narrow custom sequences take the first
    /// match, identity fonts index directly.
    fn slot_of(&self, ch: u32) -> Option<usize> {
        if self.seq.is_empty() {
            return (ch < 256).then_some(ch as usize);
        }

        if self.extended {
            let mut found = None;
            for (slot, &uc) in self.seq.iter().enumerate() {
                if uc == ch {
                    found = Some(slot);
                }
            }
            found
        } else {
            self.seq.iter().position(|&uc| uc == ch)
        }
    }

    /// Glyph bitmap for a code point, retrying once with `'?'` before
    /// giving up. `None` means "no glyph", it is never an error.
    pub fn glyph_image(&self, ch: u32) -> Option<Bitmap> {
        let slot = self.slot_of(ch).or_else(|| self.slot_of(FALLBACK_CHAR))?;
        Some(self.glyph_at(slot))
    }

    fn glyph_at(&self, slot: usize) -> Bitmap {
        let cell = (self.width * self.height) as usize;
        let mut glyph = Bitmap::new(self.width, self.height);
        let mut q = slot * cell;
        for y in 0..self.height {
            for x in 0..self.width {
                glyph.set((x, y), PixelState::from_bit(self.dict[q]));
                q += 1;
            }
        }
        glyph
    }

    /// Compose the editable font table: all glyphs in a row-major grid
    /// of at most `max_column` columns, cells separated by shared
    /// 1-pixel grid lines, slots past the glyph count filled with
    /// placeholders.
    ///
    /// Output dimensions are exactly `rows*h + rows - 1` by
    /// `max_column*w + max_column - 1` with `rows = ceil(count / max_column)`,
    /// minimum 1.
    pub fn font_table(&self, max_column: i32) -> Bitmap {
        let count = self.char_count() as i32;
        let mut rows = count / max_column;
        if count > max_column && count % max_column != 0 {
            rows += 1;
        }
        rows = rows.max(1);

        let mut table = Bitmap::new(max_column * self.width + max_column - 1, rows * self.height + rows - 1);

        for r in 0..rows {
            for c in 0..max_column {
                let index = r * max_column + c;
                let origin = Position::new(c * (self.width + 1), r * (self.height + 1));
                if index < count {
                    let glyph = self.glyph_at(index as usize);
                    for y in 0..self.height {
                        for x in 0..self.width {
                            table.set(origin + Position::new(x, y), glyph.get((x, y)));
                        }
                    }
                } else {
                    for y in 0..self.height {
                        for x in 0..self.width {
                            table.set(origin + Position::new(x, y), PixelState::Placeholder);
                        }
                    }
                }
            }
        }

        // Shared separator lines: one column after each glyph column
        // except the last, one row after each glyph row except the last.
        for c in 0..max_column - 1 {
            let x = c * (self.width + 1) + self.width;
            for y in 0..table.height() {
                table.set((x, y), PixelState::GridLine);
            }
        }
        for r in 0..rows - 1 {
            let y = r * (self.height + 1) + self.height;
            for x in 0..table.width() {
                table.set((x, y), PixelState::GridLine);
            }
        }

        table
    }
}

/// Parse a sequence specification into ordered code points.
///
/// An empty spec expands to the identity sequence `0..count`. Otherwise
/// the spec is a comma-separated list of tokens, each a bare decimal
/// number, a hex number (`0x` prefix or any token containing hex
/// letters), or a `lo-hi` range (order-insensitive, emitted ascending).
/// The second tuple element reports extended (wide code point) mode:
/// any code point above 255 sets it.
pub fn parse_sequence(spec: &str, count: usize) -> EngineResult<(Vec<u32>, bool)> {
    if spec.is_empty() {
        return Ok(((0..count as u32).collect(), false));
    }

    if !SEQUENCE_GRAMMAR.is_match(spec) {
        return Err(EngineError::InvalidSequence {
            message: format!("unexpected character in '{spec}'"),
        });
    }

    let compact: String = spec.chars().filter(|ch| !ch.is_whitespace()).collect();
    let mut seq = Vec::new();
    let mut extended = false;
    for token in compact.split(',') {
        if token.is_empty() {
            continue;
        }

        if let Some(caps) = RANGE_TOKEN.captures(token) {
            let mut lower = parse_code_point(&caps[1])?;
            let mut higher = parse_code_point(&caps[2])?;
            if lower > higher {
                std::mem::swap(&mut lower, &mut higher);
            }
            if higher > 255 {
                extended = true;
            }
            seq.extend(lower..=higher);
        } else if NUMBER_TOKEN.is_match(token) {
            let ch = parse_code_point(token)?;
            if ch > 255 {
                extended = true;
            }
            seq.push(ch);
        } else {
            return Err(EngineError::InvalidSequence {
                message: format!("malformed token '{token}'"),
            });
        }
    }

    if seq.len() != count {
        return Err(EngineError::CharCountMismatch {
            dictionary: count,
            sequence: seq.len(),
        });
    }

    Ok((seq, extended))
}

/// Collapse an ordered sequence into the bracketed interval list the
/// file format stores: maximal runs of consecutive code points become
/// `lo-hi` (decimal), isolated points become `0x%X`. Round-trips
/// losslessly through [`parse_sequence`].
pub fn compress_sequence(seq: &[u32]) -> String {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < seq.len() {
        let mut j = i;
        while j + 1 < seq.len() && seq[j + 1] == seq[j].wrapping_add(1) {
            j += 1;
        }
        if j > i {
            tokens.push(format!("{}-{}", seq[i], seq[j]));
        } else {
            tokens.push(format!("0x{:X}", seq[i]));
        }
        i = j + 1;
    }
    tokens.join(", ")
}

fn parse_code_point(token: &str) -> EngineResult<u32> {
    let parsed = if token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse::<u32>().ok()
    } else {
        let hex = token.strip_prefix("0x").unwrap_or(token);
        u32::from_str_radix(hex, 16).ok()
    };

    parsed.ok_or_else(|| EngineError::InvalidSequence {
        message: format!("invalid code point '{token}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_for(count: usize, width: i32, height: i32) -> Vec<u8> {
        vec![0; (width * height) as usize * count]
    }

    #[test]
    fn empty_spec_is_identity() {
        let (seq, extended) = parse_sequence("", 4).unwrap();
        assert_eq!(seq, vec![0, 1, 2, 3]);
        assert!(!extended);
    }

    #[test]
    fn ranges_and_hex_tokens() {
        let (seq, extended) = parse_sequence("0x41-0x5A, 0x3F", 27).unwrap();
        assert_eq!(seq.len(), 27);
        assert_eq!(seq[0], 0x41);
        assert_eq!(seq[25], 0x5A);
        assert_eq!(seq[26], 0x3F);
        assert!(!extended);
    }

    #[test]
    fn reversed_range_is_emitted_ascending() {
        let (seq, _) = parse_sequence("9-5", 5).unwrap();
        assert_eq!(seq, vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn wide_code_points_mark_extended() {
        let (seq, extended) = parse_sequence("0x410-0x413", 4).unwrap();
        assert_eq!(seq, vec![0x410, 0x411, 0x412, 0x413]);
        assert!(extended);
    }

    #[test]
    fn rejects_foreign_characters() {
        assert!(matches!(parse_sequence("1;2", 2), Err(EngineError::InvalidSequence { .. })));
        assert!(matches!(parse_sequence("1-2-3", 1), Err(EngineError::InvalidSequence { .. })));
    }

    #[test]
    fn rejects_count_mismatch() {
        assert!(matches!(parse_sequence("1-4", 3), Err(EngineError::CharCountMismatch { .. })));
    }

    #[test]
    fn compression_round_trips() {
        let seq = vec![5, 6, 7, 8, 9, 0x10, 0x41, 0x42, 0x43, 0x700];
        let compressed = compress_sequence(&seq);
        assert_eq!(compressed, "5-9, 0x10, 65-67, 0x700");
        let (parsed, extended) = parse_sequence(&compressed, seq.len()).unwrap();
        assert_eq!(parsed, seq);
        assert!(extended);
    }

    #[test]
    fn single_element_runs_are_hex() {
        assert_eq!(compress_sequence(&[7]), "0x7");
        assert_eq!(compress_sequence(&[7, 9]), "0x7, 0x9");
    }

    #[test]
    fn identity_font_matches_explicit_full_range() {
        let identity = Font::from_dictionary(bits_for(256, 8, 14), 14, 8, Vec::new()).unwrap();
        let explicit = Font::from_bits(bits_for(256, 8, 14), 14, 8, "0-255").unwrap();
        assert_eq!(identity.char_count(), explicit.char_count());
        for ch in 0..256 {
            assert_eq!(identity.glyph_image(ch), explicit.glyph_image(ch));
        }
    }

    #[test]
    fn lookup_falls_back_to_question_mark() {
        let mut dict = bits_for(2, 2, 2);
        // slot 1 = '?', fully inked
        for bit in dict.iter_mut().skip(4) {
            *bit = 1;
        }
        let font = Font::from_dictionary(dict, 2, 2, vec![0x41, FALLBACK_CHAR]).unwrap();

        let missing = font.glyph_image(0x7A).unwrap();
        assert_eq!(missing, font.glyph_image(FALLBACK_CHAR).unwrap());
        assert!(missing.get((0, 0)).is_ink());
    }

    #[test]
    fn lookup_without_fallback_glyph_returns_none() {
        let font = Font::from_dictionary(bits_for(2, 2, 2), 2, 2, vec![0x41, 0x42]).unwrap();
        assert!(font.glyph_image(0x7A).is_none());
    }

    #[test]
    fn extended_duplicate_takes_last_slot() {
        let mut dict = bits_for(3, 2, 2);
        for bit in dict.iter_mut().skip(8) {
            *bit = 1; // slot 2 inked
        }
        let font = Font::from_dictionary(dict, 2, 2, vec![0x400, 0x401, 0x400]).unwrap();
        let glyph = font.glyph_image(0x400).unwrap();
        assert!(glyph.get((0, 0)).is_ink());
    }

    #[test]
    fn table_dimensions_follow_layout_invariant() {
        for (count, max_column) in [(256usize, 32), (10, 32), (33, 32), (1, 24)] {
            let font = Font::empty(14, 8, count).unwrap();
            let table = font.font_table(max_column);
            let rows = ((count as i32) + max_column - 1) / max_column;
            let rows = rows.max(1);
            assert_eq!(table.height(), rows * 14 + rows - 1, "count {count}");
            assert_eq!(table.width(), max_column * 8 + max_column - 1, "count {count}");
        }
    }

    #[test]
    fn table_places_grid_lines_and_placeholders() {
        use crate::PixelState;

        let font = Font::empty(4, 4, 3).unwrap();
        let table = font.font_table(2);
        // two rows of two columns, slot 3 is a placeholder
        assert_eq!(table.get((4, 0)), PixelState::GridLine);
        assert_eq!(table.get((0, 4)), PixelState::GridLine);
        assert_eq!(table.get((4, 4)), PixelState::GridLine);
        assert_eq!(table.get((5, 5)), PixelState::Placeholder);
        assert_eq!(table.get((0, 0)), PixelState::Empty);
    }

    #[test]
    fn empty_table_scenario() {
        // 8x14 cells, 256 glyphs, 32 columns
        let font = Font::empty(14, 8, 256).unwrap();
        let table = font.font_table(32);
        assert_eq!(table.height(), 8 * 14 + 8 - 1);
        assert_eq!(table.width(), 32 * 8 + 32 - 1);
    }
}
