// SPDX-License-Identifier: MIT
//
// Terminal modes for a full-screen animation: raw input, the alternate
// screen, a hidden cursor and optional mouse reporting.
//
// Safety: termios, TIOCGWINSZ, isatty and the raw fd write in the panic hook
// are POSIX calls with no std wrapper. The unsafe blocks stay small.
#![allow(unsafe_code)]
//
// `RawMode` is a guard: it saves the termios it replaced and puts it back on
// drop. A copy of the saved termios also sits in a static so the panic hook
// can restore the tty without access to the guard. The hook writes its
// restore bytes straight to fd 1 because a panic inside a frame may happen
// while the stdout lock is held.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when the OS cannot tell us (pipes, CI).
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };

    /// Number of cells.
    #[must_use]
    pub const fn area(self) -> u32 {
        self.cols as u32 * self.rows as u32
    }

    /// Canvas pixels at two per cell vertically.
    #[must_use]
    pub const fn pixel_height(self) -> u32 {
        self.rows as u32 * 2
    }
}

/// Ask the kernel for the window size of stdout.
///
/// `None` when stdout is not a terminal or reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    if unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) } != 0 {
        return None;
    }
    match (ws.ws_col, ws.ws_row) {
        (0, _) | (_, 0) => None,
        (cols, rows) => Some(Size { cols, rows }),
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) == 1 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Mode sequences ─────────────────────────────────────────────────────────

/// Bytes that take the screen over.
pub(crate) fn write_setup(w: &mut impl Write, mouse: bool) -> io::Result<()> {
    ansi::enter_alt_screen(w)?;
    ansi::cursor_hide(w)?;
    ansi::clear_screen(w)?;
    if mouse {
        ansi::enable_mouse(w)?;
    }
    Ok(())
}

/// Bytes that hand the screen back. The alternate screen goes last so the
/// other resets apply to it rather than to the user's scrollback.
pub(crate) fn write_teardown(w: &mut impl Write, mouse: bool) -> io::Result<()> {
    ansi::end_sync(w)?;
    if mouse {
        ansi::disable_mouse(w)?;
    }
    ansi::reset(w)?;
    ansi::cursor_show(w)?;
    ansi::exit_alt_screen(w)
}

/// Teardown for the panic hook, mouse included since the hook does not know
/// whether it was enabled.
#[rustfmt::skip]
const PANIC_TEARDOWN: &[u8] = b"\
    \x1b[?2026l\
    \x1b[?1006l\x1b[?1003l\x1b[?1000l\
    \x1b[0m\
    \x1b[?25h\
    \x1b[?1049l";

// ─── Raw mode ───────────────────────────────────────────────────────────────

#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn set_termios(termios: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, termios) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Raw input on stdin for as long as the guard lives.
pub struct RawMode {
    #[cfg(unix)]
    saved: libc::termios,
}

impl RawMode {
    /// Switch stdin to raw mode. `Ok(None)` when stdin is not a terminal.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the termios cannot be read or written.
    #[cfg(unix)]
    pub fn enable() -> io::Result<Option<Self>> {
        if !is_tty() {
            log::debug!("stdin is not a tty, raw mode skipped");
            return Ok(None);
        }

        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let saved = termios;

        unsafe { libc::cfmakeraw(&raw mut termios) };
        // Reads return as soon as one byte is there; the reader polls first.
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;
        set_termios(&termios)?;

        if let Ok(mut slot) = SAVED_TERMIOS.lock() {
            *slot = Some(saved);
        }
        Ok(Some(Self { saved }))
    }

    #[cfg(not(unix))]
    pub fn enable() -> io::Result<Option<Self>> {
        Ok(None)
    }

    /// Put the saved termios back.
    ///
    /// # Errors
    ///
    /// Returns the OS error from `tcsetattr`.
    pub fn disable(self) -> io::Result<()> {
        let result = self.restore();
        std::mem::forget(self);
        result
    }

    #[cfg(unix)]
    fn restore(&self) -> io::Result<()> {
        if let Ok(mut slot) = SAVED_TERMIOS.lock() {
            *slot = None;
        }
        set_termios(&self.saved)
    }

    #[cfg(not(unix))]
    fn restore(&self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for RawMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawMode").finish_non_exhaustive()
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

// ─── Panic hook ─────────────────────────────────────────────────────────────

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_after_panic();
            previous(info);
        }));
    });
}

fn restore_after_panic() {
    #[cfg(unix)]
    {
        unsafe {
            let _ = libc::write(
                libc::STDOUT_FILENO,
                PANIC_TEARDOWN.as_ptr().cast::<libc::c_void>(),
                PANIC_TEARDOWN.len(),
            );
        }
        // try_lock: the panicking thread may already hold the mutex.
        if let Ok(slot) = SAVED_TERMIOS.try_lock() {
            if let Some(saved) = slot.as_ref() {
                let _ = set_termios(saved);
            }
        }
    }

    #[cfg(not(unix))]
    {
        let mut out = io::stdout();
        let _ = out.write_all(PANIC_TEARDOWN);
        let _ = out.flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Owns the terminal modes of a running animation.
///
/// [`enter`](Self::enter) takes the screen over; [`leave`](Self::leave) or
/// drop gives it back. A panic restores it through the panic hook.
///
/// ```no_run
/// use hb_term::terminal::Terminal;
///
/// let mut term = Terminal::new().with_mouse(true);
/// term.enter()?;
/// // render frames, read input...
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct Terminal {
    raw: Option<RawMode>,
    size: Size,
    mouse: bool,
    active: bool,
}

impl Terminal {
    /// Query the size (80×24 if unknown). The terminal itself is untouched
    /// until [`enter`](Self::enter).
    #[must_use]
    pub fn new() -> Self {
        let size = get_size().unwrap_or(Size::FALLBACK);
        log::debug!("terminal size {}x{}", size.cols, size.rows);
        Self {
            raw: None,
            size,
            mouse: true,
            active: false,
        }
    }

    /// Whether `enter` turns on SGR mouse reporting. On by default.
    #[must_use]
    pub const fn with_mouse(mut self, mouse: bool) -> Self {
        self.mouse = mouse;
        self
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query after SIGWINCH. The cached size survives a failed query.
    pub fn refresh_size(&mut self) -> Size {
        self.size = get_size().unwrap_or(self.size);
        self.size
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn mouse_enabled(&self) -> bool {
        self.mouse
    }

    /// Raw mode, alternate screen, hidden cursor, mouse if enabled. Calling
    /// it again while active does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or terminal output fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        self.raw = RawMode::enable()?;

        let mut out = io::stdout().lock();
        write_setup(&mut out, self.mouse)?;
        out.flush()?;

        self.active = true;
        log::debug!("entered alternate screen (mouse: {})", self.mouse);
        Ok(())
    }

    /// Undo [`enter`](Self::enter). Calling it while inactive does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal output or the termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        {
            let mut out = io::stdout().lock();
            write_teardown(&mut out, self.mouse)?;
            out.flush()?;
        }
        if let Some(raw) = self.raw.take() {
            raw.disable()?;
        }
        log::debug!("terminal restored");
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
