// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; that's the `CellWriter`'s job. This module
// just knows the byte-level encoding of every terminal command we need.
//
// Colors are palette-only: the 16 base colors use the compact SGR forms
// (30-37, 90-97 and their background twins), everything else goes through
// the 256-color form `38;5;N` / `48;5;N`.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal.

use std::io::{self, Write};

use crate::color::{Attr, ColorValue};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using CUP. 0-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
///
/// The stateful renderer must invalidate its tracked state after calling this.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Colors ──────────────────────────────────────────────────────────────────

/// Set the foreground color. Attributes on `color` are not emitted here.
pub fn fg(w: &mut impl Write, color: ColorValue) -> io::Result<()> {
    match color.palette_index() {
        None => w.write_all(b"\x1b[39m"),
        Some(idx) if idx < 8 => write!(w, "\x1b[{}m", 30 + u16::from(idx)),
        Some(idx) if idx < 16 => write!(w, "\x1b[{}m", 82 + u16::from(idx)),
        Some(idx) => write!(w, "\x1b[38;5;{idx}m"),
    }
}

/// Set the background color (40-47, 100-107, 48;5;N, 49).
pub fn bg(w: &mut impl Write, color: ColorValue) -> io::Result<()> {
    match color.palette_index() {
        None => w.write_all(b"\x1b[49m"),
        Some(idx) if idx < 8 => write!(w, "\x1b[{}m", 40 + u16::from(idx)),
        Some(idx) if idx < 16 => write!(w, "\x1b[{}m", 92 + u16::from(idx)),
        Some(idx) => write!(w, "\x1b[48;5;{idx}m"),
    }
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

/// Emit SGR codes for text attributes as a single CSI sequence.
///
/// `\x1b[1;4;7m` for bold + underline + reverse. Does nothing if empty.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    if attr.is_empty() {
        return Ok(());
    }

    let codes: Vec<&str> = [(Attr::BOLD, "1"), (Attr::UNDERLINE, "4"), (Attr::REVERSE, "7")]
        .into_iter()
        .filter(|(flag, _)| attr.contains(*flag))
        .map(|(_, code)| code)
        .collect();

    write!(w, "\x1b[{}m", codes.join(";"))
}

// ─── Synchronized Output ─────────────────────────────────────────────────────

/// Begin synchronized output (DEC Private Mode 2026).
///
/// The terminal buffers everything until [`end_sync`], so a frame never
/// appears half drawn.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Alternate Screen ───────────────────────────────────────────────────────

/// Enter the alternate screen buffer (DEC Private Mode 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Exit the alternate screen buffer and restore original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Mouse Protocol ─────────────────────────────────────────────────────────

/// Enable SGR mouse tracking with any-motion reporting (1000 + 1003 + 1006).
///
/// Motion is always reported so the pointer can be followed without a
/// button held.
pub fn enable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1000h\x1b[?1003h\x1b[?1006h")
}

/// Disable all mouse tracking.
pub fn disable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1006l\x1b[?1003l\x1b[?1000l")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
