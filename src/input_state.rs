// SPDX-License-Identifier: MIT
//
// Per-frame input snapshot.
//
// The event loop delivers events one at a time between frames. `InputTracker`
// collects them, and at the start of each frame `snapshot` hands the scene an
// immutable `InputState` holding everything that happened since the last
// frame. Drawables receive it as a parameter; nothing reads input globally.

use std::time::Duration;

use hb_term::input::{Event, KeyCode, KeyEvent, Modifiers, MouseEventKind};

/// What drawables can see of the input during one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    /// Keys pressed since the previous frame, oldest first.
    pub keys: Vec<KeyEvent>,
    /// Last known mouse position in canvas pixels.
    pub mouse: Option<(i32, i32)>,
    /// Whether a mouse button is held.
    pub mouse_down: bool,
    /// Modifiers of the most recent key or mouse event.
    pub modifiers: Modifiers,
    /// Frames since start, including this one.
    pub frame: u64,
    /// Seconds since start.
    pub elapsed: f32,
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Canvas size in pixels.
    pub bounds: (i32, i32),
}

impl InputState {
    /// How many times `code` was pressed this frame.
    #[must_use]
    pub fn presses(&self, code: KeyCode) -> usize {
        self.keys.iter().filter(|k| k.code == code).count()
    }
}

/// Accumulates events between frames.
#[derive(Debug, Default)]
pub struct InputTracker {
    keys: Vec<KeyEvent>,
    mouse: Option<(i32, i32)>,
    mouse_down: bool,
    modifiers: Modifiers,
    frame: u64,
    elapsed: Duration,
}

impl InputTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) => {
                self.modifiers = key.modifiers;
                self.keys.push(*key);
            }
            Event::Mouse(mouse) => {
                self.modifiers = mouse.modifiers;
                // A cell row covers pixel rows 2r and 2r + 1; use the upper.
                self.mouse = Some((i32::from(mouse.x), i32::from(mouse.y) * 2));
                match mouse.kind {
                    MouseEventKind::Press(_) | MouseEventKind::Drag(_) => self.mouse_down = true,
                    MouseEventKind::Release(_) => self.mouse_down = false,
                    MouseEventKind::Move | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {}
                }
            }
        }
    }

    /// Close the current frame: advance the clock by `dt` and return the
    /// accumulated input. Keys are consumed; mouse and modifier state carry
    /// over.
    pub fn snapshot(&mut self, dt: Duration, bounds: (i32, i32)) -> InputState {
        self.frame += 1;
        self.elapsed += dt;
        InputState {
            keys: std::mem::take(&mut self.keys),
            mouse: self.mouse,
            mouse_down: self.mouse_down,
            modifiers: self.modifiers,
            frame: self.frame,
            elapsed: self.elapsed.as_secs_f32(),
            dt: dt.as_secs_f32(),
            bounds,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
