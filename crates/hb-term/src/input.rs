// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key and mouse events:
//
// - printable ASCII and UTF-8 multi-byte characters
// - control bytes (Enter, Tab, Backspace, Ctrl+letter)
// - Alt+key (ESC followed by a key byte)
// - CSI and SS3 sequences for arrows, navigation keys and F1-F12, with the
//   xterm `1;mod` modifier parameter
// - SGR mouse (press, release, drag, move, scroll)
//
// Sequences can be split across reads, so the parser keeps unconsumed bytes
// in a small buffer. A lone ESC is ambiguous until more bytes arrive or the
// caller times out and calls `flush`.
//
// Numbers are parsed straight from `&[u8]`.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Whether this is `ch` with exactly the Ctrl modifier.
    #[must_use]
    pub fn is_ctrl(&self, ch: char) -> bool {
        self.modifiers == Modifiers::CTRL && self.code == KeyCode::Char(ch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F12.
    F(u8),
}

bitflags! {
    /// Modifier keys. xterm encodes these as `1 + bitmask` in CSI
    /// parameters.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
    }
}

/// A mouse event. Coordinates are 0-indexed cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Press(MouseButton),
    Release(MouseButton),
    Drag(MouseButton),
    /// Motion with no button held.
    Move,
    ScrollUp,
    ScrollDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental input parser.
///
/// ```
/// use hb_term::input::{Event, KeyCode, Parser};
///
/// let mut parser = Parser::new();
/// let events = parser.advance(b"q\x1b[A");
/// assert!(matches!(events[0], Event::Key(k) if k.code == KeyCode::Char('q')));
/// assert!(matches!(events[1], Event::Key(k) if k.code == KeyCode::Up));
/// ```
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed bytes and return every event that is complete.
    ///
    /// Incomplete trailing bytes are kept for the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match parse_one(&self.buf[pos..]) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Skip(n) => pos += n,
                Parsed::Incomplete => break,
            }
        }

        self.buf.drain(..pos);
        events
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve pending bytes as literal keys after an input timeout.
    ///
    /// A lone ESC becomes Escape; a stalled `ESC x` becomes Escape then `x`.
    pub fn flush(&mut self) -> Vec<Event> {
        let events = self
            .buf
            .iter()
            .filter_map(|&byte| match byte {
                0x1B => Some(press(KeyCode::Escape)),
                _ => match control_or_ascii(byte) {
                    Parsed::Event(event, _) => Some(event),
                    _ => None,
                },
            })
            .collect();
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing ──────────────────────────────────────────────────────

enum Parsed {
    Event(Event, usize),
    Incomplete,
    Skip(usize),
}

fn parse_one(buf: &[u8]) -> Parsed {
    match buf {
        [] => Parsed::Incomplete,
        [0x1B, ..] => parse_escape(buf),
        [lead @ 0xC0..=0xFF, ..] => parse_utf8(buf, *lead),
        [byte, ..] => control_or_ascii(*byte),
    }
}

fn control_or_ascii(byte: u8) -> Parsed {
    let event = match byte {
        0x00 => ctrl(KeyCode::Char(' ')),
        0x09 => press(KeyCode::Tab),
        0x0A | 0x0D => press(KeyCode::Enter),
        0x08 | 0x7F => press(KeyCode::Backspace),
        b @ 0x01..=0x1A => ctrl(KeyCode::Char(char::from(b - 1 + b'a'))),
        b @ 0x20..=0x7E => press(KeyCode::Char(char::from(b))),
        _ => return Parsed::Skip(1),
    };
    Parsed::Event(event, 1)
}

fn parse_escape(buf: &[u8]) -> Parsed {
    match buf {
        [_] => Parsed::Incomplete,
        [_, b'[', ..] => parse_csi(buf),
        [_, b'O', ..] => parse_ss3(buf),
        [_, 0x1B, ..] => Parsed::Event(key(KeyCode::Escape, Modifiers::ALT), 2),
        [_, b, ..] => match control_or_ascii(*b) {
            Parsed::Event(Event::Key(k), _) => {
                Parsed::Event(key(k.code, k.modifiers | Modifiers::ALT), 2)
            }
            _ => Parsed::Event(press(KeyCode::Escape), 1),
        },
        [] => Parsed::Incomplete,
    }
}

fn parse_csi(buf: &[u8]) -> Parsed {
    if buf.len() < 3 {
        return Parsed::Incomplete;
    }
    if buf[2] == b'<' {
        return parse_sgr_mouse(buf);
    }

    // Parameter bytes 0x30..=0x3F, intermediates 0x20..=0x2F, final 0x40..=0x7E.
    let Some(offset) = buf[2..].iter().position(|b| !(0x20..=0x3F).contains(b)) else {
        return Parsed::Incomplete;
    };
    let end = offset + 2;
    if !(0x40..=0x7E).contains(&buf[end]) {
        return Parsed::Skip(end + 1);
    }
    let consumed = end + 1;
    let params = parse_params(&buf[2..end]);
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = match buf[end] {
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            n @ 11..=15 => KeyCode::F(fkey(n - 10)),
            n @ 17..=21 => KeyCode::F(fkey(n - 11)),
            n @ 23..=24 => KeyCode::F(fkey(n - 12)),
            _ => return Parsed::Skip(consumed),
        },
        b'Z' => return Parsed::Event(key(KeyCode::Tab, Modifiers::SHIFT), consumed),
        final_byte => match letter_key(final_byte) {
            Some(code) => code,
            None => return Parsed::Skip(consumed),
        },
    };

    Parsed::Event(key(code, modifiers), consumed)
}

fn parse_ss3(buf: &[u8]) -> Parsed {
    match buf.get(2) {
        None => Parsed::Incomplete,
        Some(&b) => letter_key(b).map_or(Parsed::Skip(3), |code| Parsed::Event(press(code), 3)),
    }
}

/// Final bytes shared by CSI and SS3 forms.
const fn letter_key(byte: u8) -> Option<KeyCode> {
    Some(match byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return None,
    })
}

// ── SGR mouse: ESC [ < Cb ; Cx ; Cy (M|m) ──────────────────────────────────

fn parse_sgr_mouse(buf: &[u8]) -> Parsed {
    let body = &buf[3..];
    let Some(end) = body.iter().position(|&b| !b.is_ascii_digit() && b != b';') else {
        return Parsed::Incomplete;
    };
    let consumed = 3 + end + 1;
    if !matches!(body[end], b'M' | b'm') {
        return Parsed::Skip(consumed);
    }
    let is_release = body[end] == b'm';

    let params = parse_params(&body[..end]);
    let &[cb, raw_x, raw_y] = params.as_slice() else {
        return Parsed::Skip(consumed);
    };

    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, cb & 4 != 0);
    modifiers.set(Modifiers::ALT, cb & 8 != 0);
    modifiers.set(Modifiers::CTRL, cb & 16 != 0);

    let button = match cb & 3 {
        0 => Some(MouseButton::Left),
        1 => Some(MouseButton::Middle),
        2 => Some(MouseButton::Right),
        _ => None,
    };

    let kind = if cb & 64 != 0 {
        if cb & 1 == 0 {
            MouseEventKind::ScrollUp
        } else {
            MouseEventKind::ScrollDown
        }
    } else if cb & 32 != 0 {
        button.map_or(MouseEventKind::Move, MouseEventKind::Drag)
    } else {
        let button = button.unwrap_or(MouseButton::Left);
        if is_release {
            MouseEventKind::Release(button)
        } else {
            MouseEventKind::Press(button)
        }
    };

    Parsed::Event(
        Event::Mouse(MouseEvent {
            kind,
            x: raw_x.saturating_sub(1),
            y: raw_y.saturating_sub(1),
            modifiers,
        }),
        consumed,
    )
}

// ── UTF-8 ──────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8], lead: u8) -> Parsed {
    let len = match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Parsed::Skip(1),
    };
    if buf.len() < len {
        return if buf[1..].iter().all(|b| b & 0xC0 == 0x80) {
            Parsed::Incomplete
        } else {
            Parsed::Skip(1)
        };
    }
    std::str::from_utf8(&buf[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| Parsed::Event(press(KeyCode::Char(ch)), len))
}

// ─── Helpers ────────────────────────────────────────────────────────────────

const fn key(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent { code, modifiers })
}

const fn press(code: KeyCode) -> Event {
    key(code, Modifiers::empty())
}

const fn ctrl(code: KeyCode) -> Event {
    key(code, Modifiers::CTRL)
}

#[allow(clippy::cast_possible_truncation)]
const fn fkey(n: u16) -> u8 {
    n as u8
}

/// Semicolon-separated decimal parameters. Empty fields are 0, values
/// saturate at `u16::MAX`.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, b| acc.saturating_mul(10).saturating_add(u16::from(b - b'0')))
        })
        .collect()
}

/// `1 + bitmask`; 0 and 1 both mean none.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    Modifiers::from_bits_truncate(param.saturating_sub(1) as u8)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
