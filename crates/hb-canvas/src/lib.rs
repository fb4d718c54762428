// SPDX-License-Identifier: MIT
//
// hb-canvas: pixel canvas at twice the terminal's vertical resolution.
//
// Every terminal cell shows two stacked pixels: the cell background is the
// upper pixel and a lower-half-block glyph in the foreground color is the
// lower one. Drawables paint pixels (points, sub-pixel splats, anti-aliased
// ellipses, rectangles) and queue text overlays; `Canvas::composite` turns
// the pixel grid into cell writes on any `hb_term::backend::Backend`.

pub mod canvas;
pub mod overlay;
pub mod shapes;

pub use canvas::Canvas;
pub use overlay::TextOverlay;

/// U+2584 LOWER HALF BLOCK. Its foreground fills the lower pixel of a cell.
pub const LOWER_HALF_BLOCK: char = '▄';
