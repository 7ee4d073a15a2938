//! The text-based font file format.
//!
//! ```text
//! <width>x<height>\n
//! [<interval-list>]\n
//! i<interval>\n          (optional, newer files only)
//! <bitstring>
//! ```
//!
//! The interval list is the compressed character sequence (`lo-hi`
//! decimal ranges and `0x..` single code points); empty brackets mean
//! the identity 0-based sequence. The bitstring stores every glyph's
//! pixels row-major, `'0'`/`'1'` per pixel, glyphs in sequence order.

use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{compress_sequence, EngineError, EngineResult, Font};

lazy_static! {
    static ref HEADER: Regex = Regex::new(r"^([0-9]+)x([0-9]+)\r?\n\[(.*)\]\r?\n").unwrap();
    static ref INTERVAL_LINE: Regex = Regex::new(r"^i([0-9]+)\r?\n").unwrap();
}

/// Parse a font from file content. Fails without partial state: either
/// a complete `Font` comes back or nothing does.
pub fn parse_font(content: &str) -> EngineResult<Font> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let header = HEADER.captures(content).ok_or_else(|| EngineError::InvalidFontFile {
        message: "missing <width>x<height> and [sequence] header lines".to_string(),
    })?;

    // Header digits are pre-validated by the regex; range sanity is the
    // workspace's job.
    let width: i32 = header[1].parse().map_err(|_| EngineError::InvalidFontFile {
        message: format!("width '{}' out of range", &header[1]),
    })?;
    let height: i32 = header[2].parse().map_err(|_| EngineError::InvalidFontFile {
        message: format!("height '{}' out of range", &header[2]),
    })?;
    let sequence_spec = header[3].to_string();

    let mut rest = &content[header.get(0).unwrap().end()..];
    let mut interval = None;
    if let Some(caps) = INTERVAL_LINE.captures(rest) {
        interval = Some(caps[1].parse::<i32>().map_err(|_| EngineError::InvalidFontFile {
            message: format!("interval '{}' out of range", &caps[1]),
        })?);
        rest = &rest[caps.get(0).unwrap().end()..];
    }

    let mut dict = Vec::with_capacity(rest.len());
    for ch in rest.trim_end().chars() {
        match ch {
            '0' => dict.push(0u8),
            '1' => dict.push(1u8),
            _ => {
                return Err(EngineError::InvalidFontFile {
                    message: format!("unexpected character '{ch}' in bit data"),
                });
            }
        }
    }

    let mut font = Font::from_bits(dict, height, width, &sequence_spec)?;
    if let Some(interval) = interval {
        font.set_interval(interval);
    }
    Ok(font)
}

/// Serialize a font to file content (always the newer format with the
/// interval line). `parse_font` reproduces the dictionary bits and the
/// sequence order exactly.
pub fn store_font(font: &Font) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}x{}\n", font.width(), font.height()));
    out.push_str(&format!("[{}]\n", compress_sequence(font.sequence())));
    out.push_str(&format!("i{}\n", font.interval()));
    out.reserve(font.dictionary_bits().len());
    for &bit in font.dictionary_bits() {
        out.push(if bit == 0 { '0' } else { '1' });
    }
    out
}

pub fn load_font(path: &Path) -> EngineResult<Font> {
    let content = fs::read_to_string(path)?;
    parse_font(&content)
}

pub fn save_font(path: &Path, font: &Font) -> EngineResult<()> {
    fs::write(path, store_font(font))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_content() -> String {
        let mut s = String::from("2x2\n[0x41, 67-68]\ni2\n");
        s.push_str("1010"); // 'A'
        s.push_str("0101"); // 'C'
        s.push_str("1111"); // 'D'
        s
    }

    #[test]
    fn parses_header_sequence_and_interval() {
        let font = parse_font(&sample_content()).unwrap();
        assert_eq!(font.width(), 2);
        assert_eq!(font.height(), 2);
        assert_eq!(font.interval(), 2);
        assert_eq!(font.sequence(), &[0x41, 67, 68]);
        assert_eq!(font.dictionary_bits(), &[1, 0, 1, 0, 0, 1, 0, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn interval_line_is_optional() {
        let font = parse_font("2x1\n[0x41]\n10").unwrap();
        assert_eq!(font.interval(), 1);
    }

    #[test]
    fn strips_byte_order_mark_and_crlf() {
        let content = format!("\u{feff}2x2\r\n[0x41]\r\n1001");
        let font = parse_font(&content).unwrap();
        assert_eq!(font.sequence(), &[0x41]);
    }

    #[test]
    fn rejects_missing_header() {
        assert!(matches!(
            parse_font("not a font"),
            Err(EngineError::InvalidFontFile { .. })
        ));
        assert!(matches!(
            parse_font("8x14\nno brackets\n01"),
            Err(EngineError::InvalidFontFile { .. })
        ));
    }

    #[test]
    fn rejects_foreign_bit_characters() {
        assert!(matches!(
            parse_font("2x1\n[0x41]\n1x"),
            Err(EngineError::InvalidFontFile { .. })
        ));
    }

    #[test]
    fn rejects_uneven_bit_length() {
        assert!(matches!(
            parse_font("2x2\n[0x41]\n101"),
            Err(EngineError::CorruptDictionary { .. })
        ));
    }

    #[test]
    fn rejects_sequence_count_mismatch() {
        assert!(matches!(
            parse_font("2x1\n[0x41-0x43]\n10"),
            Err(EngineError::CharCountMismatch { .. })
        ));
    }

    #[test]
    fn store_then_parse_round_trips() {
        let mut dict = vec![0u8; 10 * 6];
        dict[7] = 1;
        dict[42] = 1;
        let mut font = Font::from_bits(dict, 3, 2, "5, 7-9, 0x10, 0x44F-0x453").unwrap();
        font.set_interval(2);

        let reloaded = parse_font(&store_font(&font)).unwrap();
        assert_eq!(reloaded, font);
    }
}
