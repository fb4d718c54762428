// SPDX-License-Identifier: MIT
//
// Canvas: a pixel grid at double vertical resolution and its compositor.
//
// The canvas is `width` pixels wide and `2 × height` pixels tall, where
// `height` is the terminal height in cells. Pixel (x, 2r) and (x, 2r + 1)
// share terminal cell (x, r).
//
// A terminal cell holds one foreground and one background color. With the
// lower half block the foreground paints the lower pixel and the background
// the upper one. The default background is the one color that cannot be
// named as a foreground, so a cell whose lower pixel is Default and whose
// upper pixel is colored swaps roles: the glyph is drawn reversed in the
// upper pixel's color, and the reversed background (the cell's Default)
// shows through the lower half.
//
// Layout is a flat row-major `Vec<ColorValue>` of pixels. Overlays are
// queued per frame and drained by `composite`.

use hb_term::backend::Backend;
use hb_term::color::ColorValue;

use crate::overlay::TextOverlay;
use crate::LOWER_HALF_BLOCK;

/// A half-block pixel canvas.
///
/// ```
/// use hb_canvas::Canvas;
/// use hb_term::buffer::FrameBuffer;
/// use hb_term::color::ColorValue;
///
/// let mut canvas = Canvas::new(10, 5);
/// assert_eq!(canvas.pixel_height(), 10);
///
/// canvas.put_pixel(3, 4, ColorValue::rgb(5, 0, 0));
/// assert_eq!(canvas.get_pixel(3, 4), ColorValue::rgb(5, 0, 0));
///
/// let mut frame = FrameBuffer::new(10, 5);
/// canvas.composite(&mut frame);
/// assert_eq!(frame.get(3, 2).unwrap().ch, '▄');
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u16,
    height: u16,
    background: ColorValue,
    pixels: Vec<ColorValue>,
    overlays: Vec<TextOverlay>,
}

impl Canvas {
    // ─── Construction ────────────────────────────────────────────────────

    /// A canvas `width` pixels wide and `height_cells` terminal rows tall,
    /// on the default background.
    #[must_use]
    pub fn new(width: u16, height_cells: u16) -> Self {
        Self::with_background(width, height_cells, ColorValue::DEFAULT)
    }

    /// A canvas whose cleared state is `background`.
    #[must_use]
    pub fn with_background(width: u16, height_cells: u16, background: ColorValue) -> Self {
        let mut canvas = Self {
            width: 0,
            height: 0,
            background,
            pixels: Vec::new(),
            overlays: Vec::new(),
        };
        canvas.resize(width, height_cells);
        canvas
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in terminal cells.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Height in pixels, always twice the cell height.
    #[inline]
    #[must_use]
    pub const fn pixel_height(&self) -> u32 {
        self.height as u32 * 2
    }

    #[inline]
    #[must_use]
    pub const fn background(&self) -> ColorValue {
        self.background
    }

    /// Change the cleared color. Takes effect at the next `clear` or `resize`.
    pub const fn set_background(&mut self, background: ColorValue) {
        self.background = background;
    }

    /// The raw pixel slice, row-major.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[ColorValue] {
        &self.pixels
    }

    /// Overlays queued for the next composite.
    #[inline]
    #[must_use]
    pub fn overlays(&self) -> &[TextOverlay] {
        &self.overlays
    }

    // ─── Resize ──────────────────────────────────────────────────────────

    /// Reallocate for a new size, filled with the background. Pending
    /// overlays are kept.
    pub fn resize(&mut self, width: u16, height_cells: u16) {
        self.width = width;
        self.height = height_cells;
        let len = usize::from(width) * usize::from(height_cells) * 2;
        self.pixels.clear();
        self.pixels.resize(len, self.background);
    }

    /// Match the backend's size. Returns `true` if a resize happened.
    pub fn fit(&mut self, backend: &impl Backend) -> bool {
        let (width, height) = (backend.width(), backend.height());
        if width == self.width && height == self.height {
            return false;
        }
        log::debug!(
            "canvas resize {}x{} -> {}x{} cells",
            self.width,
            self.height,
            width,
            height
        );
        self.resize(width, height);
        true
    }

    // ─── Pixels ──────────────────────────────────────────────────────────

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        let width = usize::from(self.width);
        (x < width && y < usize::from(self.height) * 2).then(|| y * width + x)
    }

    /// Write a pixel. Out-of-bounds coordinates are ignored.
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, color: ColorValue) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = color;
        }
    }

    /// Read a pixel. Default for out-of-bounds coordinates.
    #[inline]
    #[must_use]
    pub fn get_pixel(&self, x: i32, y: i32) -> ColorValue {
        self.index(x, y)
            .map_or(ColorValue::DEFAULT, |idx| self.pixels[idx])
    }

    /// Every pixel back to the background; pending overlays dropped.
    pub fn clear(&mut self) {
        self.pixels.fill(self.background);
        self.overlays.clear();
    }

    // ─── Text ────────────────────────────────────────────────────────────

    /// Queue `text` at cell `(col, row)` for the next composite.
    pub fn draw_text(
        &mut self,
        col: i32,
        row: i32,
        text: impl Into<String>,
        fg: ColorValue,
        bg: ColorValue,
    ) {
        self.overlays.push(TextOverlay::new(col, row, text, fg, bg));
    }

    // ─── Compositing ─────────────────────────────────────────────────────

    /// The glyph and colors for one cell given its upper and lower pixel.
    ///
    /// Cube and ramp black count as Default here, so a color scaled to zero
    /// leaves its half of the cell transparent.
    #[must_use]
    pub fn cell_for(top: ColorValue, bot: ColorValue) -> (char, ColorValue, ColorValue) {
        let (top, bot) = (top.transparent_if_black(), bot.transparent_if_black());
        if bot.is_default() && bot == top {
            (' ', bot, bot)
        } else if bot.is_default() {
            (LOWER_HALF_BLOCK, top.reversed(), bot)
        } else {
            (LOWER_HALF_BLOCK, bot, top)
        }
    }

    /// Write every cell to `backend`, then the queued overlays, then drop
    /// the overlays.
    ///
    /// Cells outside the backend's reported size are skipped.
    pub fn composite(&mut self, backend: &mut impl Backend) {
        let width = usize::from(self.width.min(backend.width()));
        let rows = self.height.min(backend.height());
        let stride = usize::from(self.width);

        if width > 0 {
            for (row, pair) in (0..rows).zip(self.pixels.chunks_exact(stride * 2)) {
                let (upper, lower) = pair.split_at(stride);
                for (col, (&top, &bot)) in (0u16..).zip(upper.iter().zip(lower).take(width)) {
                    let (glyph, fg, bg) = Self::cell_for(top, bot);
                    backend.set_cell(col, row, glyph, fg, bg);
                }
            }
        }

        for overlay in self.overlays.drain(..) {
            overlay.draw(backend);
        }
    }
}

impl Default for Canvas {
    /// An empty 0×0 canvas.
    fn default() -> Self {
        Self::new(0, 0)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
