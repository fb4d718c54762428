// SPDX-License-Identifier: MIT
//
// hb-term: terminal backend for halfblock.
//
// A 256-color palette model (`ColorValue`) with saturating region-local
// arithmetic, a cell grid that implements the `Backend` drawing contract,
// and the machinery that puts it on screen: differential rendering that
// only touches changed cells, stateful ANSI output that skips redundant
// escape codes, raw-mode terminal control, input parsing, and a fixed-rate
// event loop.
//
// No TUI framework underneath. Escape sequences and termios are written
// directly.

pub mod ansi;
pub mod backend;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod diff;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
