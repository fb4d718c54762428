// SPDX-License-Identifier: MIT
//
// Output buffering and stateful cell rendering.
//
//   OutputBuffer accumulates a frame's ANSI bytes in memory so the whole
//   frame is written with a single write() call.
//
//   CellWriter tracks what the terminal currently has set (cursor position,
//   foreground, background, attributes) and skips escapes that would not
//   change anything. A run of half-block cells in the same colors becomes
//   one SGR pair followed by the glyphs.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::Cell;
use crate::color::{Attr, ColorValue};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()`.
///
/// Default capacity: 16 KB.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Write a glyph as UTF-8. The continuation marker and control
    /// characters become `?` so they never reach the terminal raw.
    pub fn write_char(&mut self, ch: char) {
        if ch.is_control() {
            self.buf.push(b'?');
            return;
        }
        let mut enc = [0u8; 4];
        self.buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to stdout and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.flush_to(&mut stdout)
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // No-op. Real flushing goes through flush_stdout() / flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Stateful cell renderer that tracks terminal state to skip redundant escapes.
///
/// - **Cursor**: skipped when the next cell is at `(last_x + 1, last_y)`.
/// - **Attributes**: on change, reset (SGR 0) and re-emit. The reset
///   invalidates color tracking. Going from no attributes to some skips the
///   reset.
/// - **Colors**: compared with attributes stripped, skipped if unchanged.
/// - **Wide chars**: a continuation cell right after its wide glyph emits
///   nothing.
#[allow(clippy::struct_field_names)]
pub struct CellWriter {
    last_x: i32,
    last_y: i32,
    last_fg: Option<ColorValue>,
    last_bg: Option<ColorValue>,
    last_attrs: Attr,
}

impl CellWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_x: -1,
            last_y: -1,
            last_fg: None,
            last_bg: None,
            last_attrs: Attr::empty(),
        }
    }

    /// Reset all tracked state. Call after a terminal reset or screen clear.
    pub fn reset_state(&mut self) {
        *self = Self::new();
    }

    /// Render a single cell, emitting only the escape sequences needed.
    pub fn render_cell(&mut self, out: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        let xi = i32::from(x);
        let yi = i32::from(y);

        if yi != self.last_y || xi != self.last_x + 1 {
            ansi::cursor_to(out, x, y).ok();
        }

        if cell.is_continuation() {
            if xi > 0 && self.last_x == xi - 1 && self.last_y == yi {
                self.last_x = xi;
                return;
            }
            self.apply_style(out, cell);
            out.buf.push(b' ');
            self.last_x = xi;
            self.last_y = yi;
            return;
        }

        self.apply_style(out, cell);
        out.write_char(cell.ch);

        self.last_x = xi;
        self.last_y = yi;
    }

    fn apply_style(&mut self, out: &mut OutputBuffer, cell: &Cell) {
        let attrs = cell.attrs();
        if attrs != self.last_attrs {
            if !self.last_attrs.is_empty() {
                ansi::reset(out).ok();
                self.last_fg = None;
                self.last_bg = None;
            }
            self.last_attrs = attrs;
            ansi::attrs(out, attrs).ok();
        }

        let fg = cell.fg.plain();
        if self.last_fg != Some(fg) {
            ansi::fg(out, fg).ok();
            self.last_fg = Some(fg);
        }

        let bg = cell.bg.plain();
        if self.last_bg != Some(bg) {
            ansi::bg(out, bg).ok();
            self.last_bg = Some(bg);
        }
    }
}

impl Default for CellWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(cells: &[(u16, u16, Cell)]) -> String {
        let mut out = OutputBuffer::new();
        let mut writer = CellWriter::new();
        for (x, y, cell) in cells {
            writer.render_cell(&mut out, *x, *y, cell);
        }
        String::from_utf8(out.as_bytes().to_vec()).unwrap()
    }

    // ── OutputBuffer ────────────────────────────────────────────────────

    #[test]
    fn output_buffer_new_is_empty() {
        let buf = OutputBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn output_buffer_write_trait() {
        let mut buf = OutputBuffer::new();
        write!(buf, "hello {}", 42).unwrap();
        assert_eq!(buf.as_bytes(), b"hello 42");
    }

    #[test]
    fn write_char_encodes_utf8() {
        let mut buf = OutputBuffer::new();
        buf.write_char('▄');
        buf.write_char('A');
        assert_eq!(buf.as_bytes(), "▄A".as_bytes());
    }

    #[test]
    fn write_char_masks_control_characters() {
        let mut buf = OutputBuffer::new();
        buf.write_char('\0');
        buf.write_char('\x1b');
        assert_eq!(buf.as_bytes(), b"??");
    }

    #[test]
    fn flush_to_writes_and_clears() {
        let mut buf = OutputBuffer::new();
        buf.write_char('x');
        let mut sink = Vec::new();
        buf.flush_to(&mut sink).unwrap();
        assert_eq!(sink, b"x");
        assert!(buf.is_empty());
    }

    // ── CellWriter ──────────────────────────────────────────────────────

    #[test]
    fn first_cell_positions_and_styles() {
        let s = render(&[(0, 0, Cell::styled('▄', ColorValue::RED, ColorValue::gray(0)))]);
        assert_eq!(s, "\x1b[1;1H\x1b[31m\x1b[48;5;232m▄");
    }

    #[test]
    fn sequential_same_style_emits_only_glyphs() {
        let cell = Cell::styled('▄', ColorValue::RED, ColorValue::BLUE);
        let s = render(&[(0, 0, cell), (1, 0, cell), (2, 0, cell)]);
        assert_eq!(s, "\x1b[1;1H\x1b[31m\x1b[44m▄▄▄");
    }

    #[test]
    fn gap_repositions_cursor() {
        let cell = Cell::new('a');
        let s = render(&[(0, 0, cell), (5, 0, cell)]);
        assert_eq!(s, "\x1b[1;1H\x1b[39m\x1b[49ma\x1b[1;6Ha");
    }

    #[test]
    fn new_row_repositions_cursor() {
        let cell = Cell::new('a');
        let s = render(&[(3, 0, cell), (4, 1, cell)]);
        assert!(s.ends_with("a\x1b[2;5Ha"));
    }

    #[test]
    fn reversed_fg_emits_reverse_attribute() {
        let cell = Cell::styled('▄', ColorValue::rgb(5, 0, 0).reversed(), ColorValue::DEFAULT);
        let s = render(&[(0, 0, cell)]);
        assert_eq!(s, "\x1b[1;1H\x1b[7m\x1b[38;5;196m\x1b[49m▄");
    }

    #[test]
    fn dropping_attributes_resets_and_reemits_colors() {
        let reversed = Cell::styled('▄', ColorValue::RED.reversed(), ColorValue::DEFAULT);
        let plain = Cell::styled('▄', ColorValue::RED, ColorValue::DEFAULT);
        let s = render(&[(0, 0, reversed), (1, 0, plain)]);
        assert_eq!(
            s,
            "\x1b[1;1H\x1b[7m\x1b[31m\x1b[49m▄\x1b[0m\x1b[31m\x1b[49m▄"
        );
    }

    #[test]
    fn continuation_after_wide_char_is_skipped() {
        let wide = Cell::styled('中', ColorValue::GREEN, ColorValue::DEFAULT);
        let cont = Cell::continuation(ColorValue::GREEN, ColorValue::DEFAULT);
        let s = render(&[(0, 0, wide), (1, 0, cont)]);
        assert_eq!(s, "\x1b[1;1H\x1b[32m\x1b[49m中");
    }

    #[test]
    fn orphan_continuation_renders_space() {
        let cont = Cell::continuation(ColorValue::DEFAULT, ColorValue::RED);
        let s = render(&[(4, 2, cont)]);
        assert_eq!(s, "\x1b[3;5H\x1b[39m\x1b[41m ");
    }

    #[test]
    fn reset_state_forces_full_reemit() {
        let cell = Cell::styled('x', ColorValue::RED, ColorValue::BLUE);
        let mut out = OutputBuffer::new();
        let mut writer = CellWriter::new();
        writer.render_cell(&mut out, 0, 0, &cell);
        out.clear();
        writer.reset_state();
        writer.render_cell(&mut out, 1, 0, &cell);
        assert_eq!(out.as_bytes(), b"\x1b[1;2H\x1b[31m\x1b[44mx");
    }
}
