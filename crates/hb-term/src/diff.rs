// SPDX-License-Identifier: MIT
//
// Differential frame renderer.
//
// Each frame the compositor repaints the whole FrameBuffer, but most cells
// come out the same as last frame: the backdrop does not move and only the
// animated shapes do. DiffRenderer keeps the previous frame and emits ANSI
// only for cells that differ.
//
//   1. The app composites its canvas into a FrameBuffer.
//   2. render() compares it row by row against the stored frame. Equal rows
//      are skipped with one slice comparison.
//   3. Changed cells go through CellWriter, which drops redundant escapes.
//   4. flush() writes the accumulated bytes in one call.
//
// Frames are wrapped in synchronized output (DEC 2026). The stored frame is
// reused via copy_from() so the steady state does not allocate.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::output::{CellWriter, OutputBuffer};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub cells_rendered: usize,
    pub cells_skipped: usize,
    pub bytes_written: usize,
}

impl RenderStats {
    /// Rendered plus skipped.
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Renderer that emits ANSI only for cells that changed since the last frame.
///
/// ```no_run
/// use hb_term::buffer::FrameBuffer;
/// use hb_term::diff::DiffRenderer;
///
/// let mut renderer = DiffRenderer::new();
/// let frame = FrameBuffer::new(80, 24);
/// let stats = renderer.render(&frame);
/// renderer.flush().unwrap();
/// assert_eq!(stats.cells_rendered, 80 * 24);
/// ```
pub struct DiffRenderer {
    output: OutputBuffer,
    writer: CellWriter,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    /// A renderer with no previous frame; the first render draws everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            previous: None,
        }
    }

    /// Diff `current` against the stored frame and generate ANSI output.
    ///
    /// Call [`flush`](Self::flush) or [`flush_to`](Self::flush_to) afterwards
    /// to write it out.
    pub fn render(&mut self, current: &FrameBuffer) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let mut stats = RenderStats::default();
        if current.width() == 0 || current.height() == 0 {
            self.store_frame(current);
            return stats;
        }

        ansi::begin_sync(&mut self.output).ok();

        // A missing or differently-sized previous frame means a full redraw.
        let previous = self
            .previous
            .as_ref()
            .filter(|prev| prev.width() == current.width() && prev.height() == current.height());

        if previous.is_none() {
            ansi::clear_screen(&mut self.output).ok();
            ansi::cursor_to(&mut self.output, 0, 0).ok();
        }

        for y in 0..current.height() {
            let Some(row) = current.row(y) else { break };
            let prev_row = previous.and_then(|prev| prev.row(y));

            if prev_row == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }

            for (x, cell) in (0u16..).zip(row) {
                let unchanged = prev_row.and_then(|p| p.get(usize::from(x))) == Some(cell);
                if unchanged {
                    stats.cells_skipped += 1;
                } else {
                    self.writer.render_cell(&mut self.output, x, y, cell);
                    stats.cells_rendered += 1;
                }
            }
        }

        // Leave the terminal with default SGR state between frames.
        ansi::reset(&mut self.output).ok();
        ansi::end_sync(&mut self.output).ok();

        stats.bytes_written = self.output.len();
        self.store_frame(current);
        stats
    }

    /// The raw ANSI bytes from the last render.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Write accumulated output to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush_stdout()
    }

    /// Write accumulated output to `w`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Discard the stored frame so the next render draws everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    fn store_frame(&mut self, current: &FrameBuffer) {
        match &mut self.previous {
            Some(prev) => prev.copy_from(current),
            None => self.previous = Some(current.clone()),
        }
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
