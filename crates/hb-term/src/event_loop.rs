// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop: stdin bytes in, frames out.
//
// Stdin bytes arrive from the background reader, get parsed into events and
// handed to the application. At every frame deadline the application paints
// a fresh FrameBuffer and the diff renderer writes whatever changed.
//
// # Fixed-rate frames
//
// Animation does not wait for input, so the loop renders unconditionally
// once per frame interval (1 / frame_rate). Between deadlines it blocks on
// the stdin channel with `recv_timeout(time_left)`, so input is handled as
// soon as it arrives and an idle loop sleeps in the kernel. If the app is
// slow and misses a deadline, the schedule restarts from now instead of
// rendering a burst of catch-up frames.
//
// # SIGWINCH
//
// The signal handler only sets an `AtomicBool`. The loop checks it once per
// frame, resizes the buffer and forces a full redraw.
//
// # ESC timeout
//
// A lone ESC stays pending in the parser. When a frame deadline passes with
// bytes still pending, they are flushed as literal keys, so Escape lags by
// at most one frame.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::buffer::FrameBuffer;
use crate::diff::DiffRenderer;
use crate::input::{Event, Parser};
use crate::reader::StdinReader;
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Storing to an atomic is async-signal-safe.
#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the loop after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Application interface for the event loop.
///
/// Per frame the loop calls [`on_event`](App::on_event) for each input
/// event, [`on_resize`](App::on_resize) if the terminal changed size,
/// [`on_tick`](App::on_tick) once, then [`paint`](App::paint). Only
/// `paint` is required.
pub trait App {
    /// Return [`Action::Quit`] to leave the loop.
    fn on_event(&mut self, _event: &Event) -> Action {
        Action::Continue
    }

    /// The frame buffer has already been resized when this is called.
    fn on_resize(&mut self, _size: Size) {}

    /// Called once per frame with the time since the previous frame.
    fn on_tick(&mut self, _dt: Duration) {}

    /// Paint the frame. The buffer is cleared beforehand.
    fn paint(&mut self, buf: &mut FrameBuffer);
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Frame pacing and terminal modes for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Target frames per second. 0 is treated as 1.
    pub frame_rate: u32,
    /// Enable SGR mouse reporting.
    pub mouse: bool,
}

impl LoopConfig {
    /// The time budget of one frame.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            mouse: true,
        }
    }
}

// ─── FrameClock ──────────────────────────────────────────────────────────────

/// Deadline bookkeeping for fixed-rate frames.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    interval: Duration,
    next: Instant,
    last: Instant,
}

impl FrameClock {
    /// A clock whose first deadline is `now` (the first frame renders
    /// immediately).
    #[must_use]
    pub const fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now,
            last: now,
        }
    }

    /// How long to wait for input before the next frame is due.
    #[must_use]
    pub fn time_left(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Whether the next frame is due.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    /// Start a frame at `now`: schedule the next deadline and return the time
    /// since the previous frame.
    pub fn tick(&mut self, now: Instant) -> Duration {
        let dt = now.saturating_duration_since(self.last);
        self.last = now;
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
        dt
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// ```no_run
/// use hb_term::buffer::FrameBuffer;
/// use hb_term::event_loop::{Action, App, EventLoop, LoopConfig};
/// use hb_term::input::{Event, KeyCode};
///
/// struct MyApp;
///
/// impl App for MyApp {
///     fn on_event(&mut self, event: &Event) -> Action {
///         match event {
///             Event::Key(k) if k.code == KeyCode::Char('q') => Action::Quit,
///             _ => Action::Continue,
///         }
///     }
///
///     fn paint(&mut self, buf: &mut FrameBuffer) {}
/// }
///
/// EventLoop::new(LoopConfig::default()).run(&mut MyApp)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: DiffRenderer,
    config: LoopConfig,
}

impl EventLoop {
    #[must_use]
    pub fn new(config: LoopConfig) -> Self {
        Self {
            terminal: Terminal::new().with_mouse(config.mouse),
            parser: Parser::new(),
            renderer: DiffRenderer::new(),
            config,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> LoopConfig {
        self.config
    }

    /// Run until the application returns [`Action::Quit`] or stdin closes.
    ///
    /// The terminal is restored on exit, also when the loop errors.
    ///
    /// # Errors
    ///
    /// Returns an error if entering or leaving the terminal, spawning the
    /// reader, or writing a frame fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let result = match StdinReader::spawn() {
            Ok((mut reader, rx)) => {
                let result = self.run_inner(app, &rx);
                reader.stop();
                result
            }
            Err(e) => Err(e),
        };

        self.terminal.leave()?;
        result
    }

    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let size = self.terminal.size();
        let mut frame = FrameBuffer::new(size.cols, size.rows);
        let mut clock = FrameClock::new(self.config.frame_interval(), Instant::now());
        log::debug!(
            "event loop running at {} fps, {}x{}",
            self.config.frame_rate,
            size.cols,
            size.rows
        );

        loop {
            // ── Input until the frame is due ─────────────────────
            while !clock.is_due(Instant::now()) {
                match rx.recv_timeout(clock.time_left(Instant::now())) {
                    Ok(bytes) => {
                        if dispatch(app, &self.parser.advance(&bytes)) == Action::Quit {
                            return Ok(());
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => {
                        log::debug!("stdin reader disconnected");
                        return Ok(());
                    }
                }
            }

            if self.parser.has_pending() && dispatch(app, &self.parser.flush()) == Action::Quit {
                return Ok(());
            }

            // ── Resize ───────────────────────────────────────────
            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let new_size = self.terminal.refresh_size();
                log::debug!("resize to {}x{}", new_size.cols, new_size.rows);
                frame.resize(new_size.cols, new_size.rows);
                self.renderer.force_redraw();
                app.on_resize(new_size);
            }

            // ── Frame ────────────────────────────────────────────
            app.on_tick(clock.tick(Instant::now()));
            frame.clear();
            app.paint(&mut frame);
            let stats = self.renderer.render(&frame);
            self.renderer.flush()?;
            log::trace!(
                "frame: {} rendered, {} skipped, {} bytes",
                stats.cells_rendered,
                stats.cells_skipped,
                stats.bytes_written
            );
        }
    }
}

/// Hand events to the app, stopping at the first `Quit`.
fn dispatch(app: &mut impl App, events: &[Event]) -> Action {
    for event in events {
        if app.on_event(event) == Action::Quit {
            return Action::Quit;
        }
    }
    Action::Continue
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, KeyEvent, Modifiers};

    // ── LoopConfig ──────────────────────────────────────────────

    #[test]
    fn default_config_is_60fps_with_mouse() {
        let config = LoopConfig::default();
        assert_eq!(config.frame_rate, 60);
        assert!(config.mouse);
        assert_eq!(config.frame_interval(), Duration::from_nanos(16_666_666));
    }

    #[test]
    fn zero_frame_rate_is_one_per_second() {
        let config = LoopConfig {
            frame_rate: 0,
            mouse: false,
        };
        assert_eq!(config.frame_interval(), Duration::from_secs(1));
    }

    #[test]
    fn event_loop_keeps_config() {
        let config = LoopConfig {
            frame_rate: 30,
            mouse: false,
        };
        let event_loop = EventLoop::new(config);
        assert_eq!(event_loop.config(), config);
        assert!(event_loop.size().cols > 0);
    }

    // ── FrameClock ──────────────────────────────────────────────

    #[test]
    fn first_frame_is_due_immediately() {
        let now = Instant::now();
        let clock = FrameClock::new(Duration::from_millis(10), now);
        assert!(clock.is_due(now));
        assert_eq!(clock.time_left(now), Duration::ZERO);
    }

    #[test]
    fn tick_schedules_next_deadline() {
        let start = Instant::now();
        let mut clock = FrameClock::new(Duration::from_millis(10), start);
        clock.tick(start);

        assert!(!clock.is_due(start + Duration::from_millis(5)));
        assert_eq!(
            clock.time_left(start + Duration::from_millis(4)),
            Duration::from_millis(6)
        );
        assert!(clock.is_due(start + Duration::from_millis(10)));

        let dt = clock.tick(start + Duration::from_millis(10));
        assert_eq!(dt, Duration::from_millis(10));
    }

    #[test]
    fn missed_deadlines_do_not_burst() {
        let start = Instant::now();
        let mut clock = FrameClock::new(Duration::from_millis(10), start);
        clock.tick(start);

        let late = start + Duration::from_millis(55);
        assert_eq!(clock.tick(late), Duration::from_millis(55));
        assert!(!clock.is_due(late));
        assert_eq!(clock.time_left(late), Duration::from_millis(10));
    }

    // ── SIGWINCH flag ───────────────────────────────────────────

    #[test]
    fn sigwinch_flag_swap() {
        SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
        assert!(SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed));
        assert!(!SIGWINCH_RECEIVED.load(Ordering::Relaxed));
    }

    // ── App dispatch ────────────────────────────────────────────

    #[derive(Default)]
    struct Recorder {
        seen: Vec<Event>,
        ticks: u32,
    }

    impl App for Recorder {
        fn on_event(&mut self, event: &Event) -> Action {
            self.seen.push(*event);
            match event {
                Event::Key(k) if k.code == KeyCode::Char('q') => Action::Quit,
                _ => Action::Continue,
            }
        }

        fn on_tick(&mut self, _dt: Duration) {
            self.ticks += 1;
        }

        fn paint(&mut self, _buf: &mut FrameBuffer) {}
    }

    fn key(ch: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(ch), Modifiers::empty()))
    }

    #[test]
    fn dispatch_stops_at_quit() {
        let mut app = Recorder::default();
        let action = dispatch(&mut app, &[key('a'), key('q'), key('b')]);
        assert_eq!(action, Action::Quit);
        assert_eq!(app.seen, vec![key('a'), key('q')]);
        assert_eq!(app.ticks, 0);
    }

    #[test]
    fn dispatch_continues_without_quit() {
        let mut app = Recorder::default();
        assert_eq!(dispatch(&mut app, &[key('x')]), Action::Continue);
        assert_eq!(dispatch(&mut app, &[]), Action::Continue);
        assert_eq!(app.seen.len(), 1);
    }

    #[test]
    fn default_app_hooks_are_noops() {
        struct Minimal;
        impl App for Minimal {
            fn paint(&mut self, _buf: &mut FrameBuffer) {}
        }
        let mut app = Minimal;
        assert_eq!(app.on_event(&key('z')), Action::Continue);
        app.on_resize(Size { cols: 100, rows: 50 });
        app.on_tick(Duration::from_millis(16));
    }
}
