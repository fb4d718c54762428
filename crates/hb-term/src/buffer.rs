// SPDX-License-Identifier: MIT
//
// FrameBuffer: the 2D cell grid a frame is composed into.
//
// The canvas compositor writes cells here through the `Backend` trait, and
// the diff renderer compares this frame against the previous one to emit
// minimal ANSI output.
//
// Flat `Vec<Cell>` with row-major indexing: a row's cells are contiguous,
// so the renderer's left-to-right scan is linear and whole rows compare
// with one slice equality.

use unicode_width::UnicodeWidthChar;

use crate::backend::Backend;
use crate::cell::{Cell, CONTINUATION};
use crate::color::ColorValue;

// ─── FrameBuffer ────────────────────────────────────────────────────────────────

/// A 2D buffer of terminal cells.
///
/// # Examples
///
/// ```
/// use hb_term::backend::Backend;
/// use hb_term::buffer::FrameBuffer;
/// use hb_term::color::ColorValue;
///
/// let mut buf = FrameBuffer::new(80, 24);
/// buf.set_cell(5, 3, 'X', ColorValue::RED, ColorValue::DEFAULT);
/// assert_eq!(buf.get(5, 3).unwrap().ch, 'X');
///
/// // Out-of-bounds writes are ignored.
/// buf.set_cell(80, 0, 'X', ColorValue::RED, ColorValue::DEFAULT);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a buffer filled with empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_bg(width, height, ColorValue::DEFAULT)
    }

    /// Create a buffer of spaces on a background color.
    #[must_use]
    pub fn with_bg(width: u16, height: u16, bg: ColorValue) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY.with_bg(bg); size],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Total number of cells (`width × height`).
    #[inline]
    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a cell, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// The raw cell slice.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// A single row as a slice. Returns `None` if `y` is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// The glyphs of a row as a string, continuation cells skipped.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|row| row.iter().filter_map(|c| c.character()).collect())
            .unwrap_or_default()
    }

    // ─── Clear & Resize ──────────────────────────────────────────────────

    /// Clear to empty cells.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize the buffer, clearing all content.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = usize::from(width) * usize::from(height);
        self.cells.clear();
        self.cells.resize(size, Cell::EMPTY);
    }

    /// Copy another buffer's content into this one, reusing the allocation.
    ///
    /// Dimensions are taken from `other`.
    pub fn copy_from(&mut self, other: &Self) {
        self.width = other.width;
        self.height = other.height;
        self.cells.clone_from(&other.cells);
    }

    // ─── Direct Cell Access ──────────────────────────────────────────────

    /// Write a cell. Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Write a glyph, breaking any wide character it overlaps and placing a
    /// continuation cell after a wide glyph.
    ///
    /// Returns the number of columns the glyph occupies (0 when clipped or
    /// zero-width). A wide glyph that would hang off the right edge is
    /// replaced by a space.
    pub fn put_glyph(&mut self, x: u16, y: u16, glyph: char, fg: ColorValue, bg: ColorValue) -> u16 {
        if !self.in_bounds(x, y) {
            return 0;
        }
        let width = char_width(glyph);
        if width == 0 {
            return 0;
        }

        self.break_wide_char_at(x, y);

        if width == 2 {
            if x + 1 >= self.width {
                self.set(x, y, Cell::styled(' ', fg, bg));
                return 1;
            }
            self.break_wide_char_at(x + 1, y);
            self.set(x, y, Cell::styled(glyph, fg, bg));
            self.set(x + 1, y, Cell::continuation(fg, bg));
            return 2;
        }

        self.set(x, y, Cell::styled(glyph, fg, bg));
        1
    }

    /// Break any wide character that touches `(x, y)`.
    fn break_wide_char_at(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);

        if self.cells[idx].is_continuation() && x > 0 {
            let prev = self.index(x - 1, y);
            self.cells[prev].ch = ' ';
        }

        if x + 1 < self.width {
            let next = self.index(x + 1, y);
            if self.cells[next].is_continuation() {
                self.cells[next] = Cell::EMPTY;
            }
        }
    }
}

impl Backend for FrameBuffer {
    /// A [`CONTINUATION`] glyph is stored as-is so a caller can complete the
    /// wide character it just wrote; any other glyph breaks the wide
    /// character it overlaps.
    fn set_cell(&mut self, col: u16, row: u16, glyph: char, fg: ColorValue, bg: ColorValue) {
        if !self.in_bounds(col, row) {
            return;
        }
        if glyph != CONTINUATION {
            self.break_wide_char_at(col, row);
        }
        self.set(col, row, Cell::styled(glyph, fg, bg));
    }

    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Text Width Utilities ───────────────────────────────────────────────────────

/// Display width of a character in terminal columns.
///
/// 0 for control characters, 1 for most characters, 2 for wide characters
/// (CJK, some emoji), per Unicode Standard Annex #11.
///
/// ```
/// use hb_term::buffer::char_width;
///
/// assert_eq!(char_width('a'), 1);
/// assert_eq!(char_width('中'), 2);
/// assert_eq!(char_width('\n'), 0);
/// ```
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Display width of a string in terminal columns.
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

// ─── Tests ──────────────────────────────────────────────────────────────────────
