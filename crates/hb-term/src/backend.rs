// SPDX-License-Identifier: MIT
//
// The terminal-backend contract.
//
// Anything that can accept cell writes and report its size in cells can be
// drawn into: the in-memory FrameBuffer (what the diff renderer consumes),
// a recording backend in tests, or a future direct-to-TTY writer.

use crate::color::ColorValue;

/// A grid of terminal cells that accepts writes.
pub trait Backend {
    /// Write one cell. Writes outside `width() × height()` are ignored.
    fn set_cell(&mut self, col: u16, row: u16, glyph: char, fg: ColorValue, bg: ColorValue);

    /// Width in cells.
    fn width(&self) -> u16;

    /// Height in cells.
    fn height(&self) -> u16;
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn set_cell(&mut self, col: u16, row: u16, glyph: char, fg: ColorValue, bg: ColorValue) {
        (**self).set_cell(col, row, glyph, fg, bg);
    }

    fn width(&self) -> u16 {
        (**self).width()
    }

    fn height(&self) -> u16 {
        (**self).height()
    }
}
