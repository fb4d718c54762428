// SPDX-License-Identifier: MIT
//
// Text overlays: strings drawn over the composited pixels.
//
// Overlays live for one frame. The canvas queues them during painting and
// writes them after the pixel pass, each glyph replacing the cell under it
// outright.

use hb_term::backend::Backend;
use hb_term::cell::CONTINUATION;
use hb_term::color::ColorValue;
use unicode_width::UnicodeWidthChar;

/// A queued string at a cell position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOverlay {
    /// Column of the first glyph. May be negative; off-screen glyphs clip.
    pub col: i32,
    /// Cell row.
    pub row: i32,
    pub text: String,
    pub fg: ColorValue,
    pub bg: ColorValue,
}

impl TextOverlay {
    #[must_use]
    pub fn new(col: i32, row: i32, text: impl Into<String>, fg: ColorValue, bg: ColorValue) -> Self {
        Self {
            col,
            row,
            text: text.into(),
            fg,
            bg,
        }
    }

    /// Display width in columns. Zero-width characters count 0, wide ones 2.
    #[must_use]
    pub fn width(&self) -> usize {
        self.text.chars().filter_map(UnicodeWidthChar::width).sum()
    }

    /// Write the glyphs left to right.
    ///
    /// A wide glyph is followed by a continuation cell; one that would be
    /// cut by the right edge is drawn as a space instead.
    pub fn draw(&self, backend: &mut impl Backend) {
        let Ok(row) = u16::try_from(self.row) else {
            return;
        };
        let right = i32::from(backend.width());
        let mut col = self.col;

        for ch in self.text.chars() {
            let width: i32 = match ch.width() {
                Some(1) => 1,
                Some(2) => 2,
                _ => continue,
            };
            if col >= right {
                break;
            }
            if let Ok(x) = u16::try_from(col) {
                if width == 2 && col + 1 >= right {
                    backend.set_cell(x, row, ' ', self.fg, self.bg);
                } else {
                    backend.set_cell(x, row, ch, self.fg, self.bg);
                    if width == 2 {
                        backend.set_cell(x + 1, row, CONTINUATION, self.fg, self.bg);
                    }
                }
            }
            col += width;
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use hb_term::buffer::FrameBuffer;
    use pretty_assertions::assert_eq;

    const FG: ColorValue = ColorValue::BRIGHT_WHITE;
    const BG: ColorValue = ColorValue::BLUE;

    #[test]
    fn draws_left_to_right() {
        let mut buf = FrameBuffer::new(6, 2);
        TextOverlay::new(1, 1, "hey", FG, BG).draw(&mut buf);
        assert_eq!(buf.row_text(1), " hey  ");
        assert_eq!(buf.get(2, 1).unwrap().bg, BG);
        assert!(buf.get(0, 1).unwrap().is_empty());
    }

    #[test]
    fn clips_at_edges() {
        let mut buf = FrameBuffer::new(4, 1);
        TextOverlay::new(-2, 0, "abcdef", FG, BG).draw(&mut buf);
        assert_eq!(buf.row_text(0), "cdef");

        let mut buf = FrameBuffer::new(4, 1);
        TextOverlay::new(0, 3, "x", FG, BG).draw(&mut buf);
        TextOverlay::new(0, -1, "x", FG, BG).draw(&mut buf);
        assert!(buf.cells().iter().all(|c| c.is_empty()));
    }

    #[test]
    fn wide_glyphs_take_two_columns() {
        let mut buf = FrameBuffer::new(5, 1);
        TextOverlay::new(0, 0, "中a", FG, BG).draw(&mut buf);
        assert_eq!(buf.get(0, 0).unwrap().ch, '中');
        assert!(buf.get(1, 0).unwrap().is_continuation());
        assert_eq!(buf.get(2, 0).unwrap().ch, 'a');
    }

    #[test]
    fn wide_glyph_cut_by_edge_becomes_space() {
        let mut buf = FrameBuffer::new(3, 1);
        TextOverlay::new(2, 0, "中", FG, BG).draw(&mut buf);
        assert_eq!(buf.get(2, 0).unwrap().ch, ' ');
        assert_eq!(buf.get(2, 0).unwrap().bg, BG);
    }

    #[test]
    fn zero_width_chars_are_skipped() {
        let mut buf = FrameBuffer::new(4, 1);
        TextOverlay::new(0, 0, "a\u{200B}b", FG, BG).draw(&mut buf);
        assert_eq!(buf.row_text(0), "ab  ");
    }

    #[test]
    fn width_counts_columns() {
        assert_eq!(TextOverlay::new(0, 0, "fps 60", FG, BG).width(), 6);
        assert_eq!(TextOverlay::new(0, 0, "中文", FG, BG).width(), 4);
    }
}
