// SPDX-License-Identifier: MIT
//
// Cell: the atomic unit of terminal rendering.
//
// Every character position on screen is a Cell: a glyph plus a foreground
// and a background palette color. Attributes (bold, underline, reverse)
// travel inside the colors, the same way a classic cell-based terminal
// library ORs attribute bits into a color word.
//
// Wide characters (CJK, some emoji) occupy two columns. The first cell
// holds the glyph; the second is a continuation cell (ch = '\0'). The
// renderer skips continuation cells when outputting characters but still
// applies their colors.

use crate::color::{Attr, ColorValue};

/// Continuation marker: a cell whose glyph is `'\0'` belongs to the
/// preceding wide character and produces no character output.
pub const CONTINUATION: char = '\0';

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Glyph to display. [`CONTINUATION`] for the second column of a wide char.
    pub ch: char,
    /// Foreground (glyph) color.
    pub fg: ColorValue,
    /// Background color.
    pub bg: ColorValue,
}

impl Cell {
    /// An empty cell: space, default colors.
    pub const EMPTY: Self = Self {
        ch: ' ',
        fg: ColorValue::DEFAULT,
        bg: ColorValue::DEFAULT,
    };

    /// Create a cell with a glyph and default colors.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch,
            fg: ColorValue::DEFAULT,
            bg: ColorValue::DEFAULT,
        }
    }

    /// Create a cell with explicit colors.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, fg: ColorValue, bg: ColorValue) -> Self {
        Self { ch, fg, bg }
    }

    /// Create a continuation cell for the second column of a wide char.
    #[inline]
    #[must_use]
    pub const fn continuation(fg: ColorValue, bg: ColorValue) -> Self {
        Self {
            ch: CONTINUATION,
            fg,
            bg,
        }
    }

    // ─── Queries ──────────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// Whether this cell is visually empty (space, default colors, no attributes).
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    /// The union of the attributes carried by both colors.
    ///
    /// The terminal applies attributes to the whole cell, so a reversed
    /// foreground reverses the cell.
    #[inline]
    #[must_use]
    pub const fn attrs(self) -> Attr {
        self.fg.attrs().union(self.bg.attrs())
    }

    /// The glyph, or `None` for continuation cells.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.is_continuation() {
            None
        } else {
            Some(self.ch)
        }
    }

    // ─── Mutations ────────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn with_fg(self, fg: ColorValue) -> Self {
        Self { fg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: ColorValue) -> Self {
        Self { bg, ..self }
    }

    /// Reset this cell to empty.
    #[inline]
    pub const fn reset(&mut self) {
        *self = Self::EMPTY;
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
