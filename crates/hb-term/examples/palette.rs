// SPDX-License-Identifier: MIT
//
// Palette viewer: the 16 base colors, the 6×6×6 cube and the gray ramp,
// painted straight into the FrameBuffer. Arrow keys move a highlight that
// shows the color's name. `q` or Ctrl-C quits.
//
// Usage:
//   cargo run -p hb-term --example palette

use hb_term::backend::Backend;
use hb_term::buffer::FrameBuffer;
use hb_term::color::ColorValue;
use hb_term::event_loop::{Action, App, EventLoop, LoopConfig};
use hb_term::input::{Event, KeyCode};

/// Swatches per row: base colors, then 6 rows of 36 cube colors, then grays.
fn swatch_rows() -> Vec<Vec<ColorValue>> {
    let mut rows = vec![(0..16).map(ColorValue::base).collect::<Vec<_>>()];
    for r in 0..6 {
        rows.push(
            (0..36)
                .map(|i| ColorValue::rgb(r, i / 6, i % 6))
                .collect(),
        );
    }
    rows.push((0..24).map(ColorValue::gray).collect());
    rows
}

struct Palette {
    rows: Vec<Vec<ColorValue>>,
    row: usize,
    col: usize,
}

impl Palette {
    fn selected(&self) -> ColorValue {
        self.rows[self.row][self.col]
    }

    fn clamp_col(&mut self) {
        self.col = self.col.min(self.rows[self.row].len() - 1);
    }
}

impl App for Palette {
    fn on_event(&mut self, event: &Event) -> Action {
        let Event::Key(key) = event else {
            return Action::Continue;
        };
        if key.is_ctrl('c') || key.code == KeyCode::Char('q') {
            return Action::Quit;
        }
        match key.code {
            KeyCode::Up => self.row = self.row.saturating_sub(1),
            KeyCode::Down => self.row = (self.row + 1).min(self.rows.len() - 1),
            KeyCode::Left => self.col = self.col.saturating_sub(1),
            KeyCode::Right => self.col += 1,
            _ => {}
        }
        self.clamp_col();
        Action::Continue
    }

    fn paint(&mut self, buf: &mut FrameBuffer) {
        for (y, row) in (1u16..).zip(&self.rows) {
            for (x, &color) in (0u16..).zip(row) {
                let selected = color == self.selected();
                let glyph = if selected { '◆' } else { ' ' };
                buf.set_cell(x * 2 + 1, y, glyph, ColorValue::BRIGHT_WHITE, color);
                buf.set_cell(x * 2 + 2, y, ' ', ColorValue::DEFAULT, color);
            }
        }

        let label = format!(" {} ", self.selected());
        let status = u16::try_from(self.rows.len()).unwrap_or(u16::MAX) + 2;
        for (x, ch) in (1u16..).zip(label.chars()) {
            buf.put_glyph(x, status, ch, ColorValue::BLACK, ColorValue::WHITE);
        }
    }
}

fn main() -> std::io::Result<()> {
    let mut app = Palette {
        rows: swatch_rows(),
        row: 0,
        col: 0,
    };
    EventLoop::new(LoopConfig {
        frame_rate: 30,
        mouse: false,
    })
    .run(&mut app)
}
