// SPDX-License-Identifier: MIT
//
// hb-term color system: palette-native colors for a 256-color terminal.
//
// Single-character variable names (r, g, b) are the standard convention
// for color channels.
#![allow(clippy::many_single_char_names)]
//
// A terminal palette is small, discrete, and non-linear. Instead of modeling
// colors as floating-point triples and quantizing at output time, every
// `ColorValue` *is* a palette code, partitioned into three regions that share
// their layout with the xterm-256 palette:
//
//   [0, 16)      base colors     opaque, no arithmetic
//   [16, 232)    6×6×6 RGB cube  16 + 36r + 6g + b, each channel 0–5
//   [232, 256)   gray ramp       24 levels, 0–23
//   256          Default         "no color", the terminal's own fg/bg
//
// Arithmetic (+, -, *, /) stays inside the region of its operands and
// saturates at the region's bounds. Higher layers can brighten, dim, and
// blend with ordinary operators without ever producing an invalid code.
//
// Rendering attributes (reverse, bold, underline) ride along with the code
// but never change it. The compositor uses REVERSE to paint the top half of
// a cell whose bottom half must keep the terminal default background.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};
use std::str::FromStr;

use bitflags::bitflags;

// ─── Palette Layout ──────────────────────────────────────────────────────────

/// First code of the 6×6×6 RGB cube.
pub const RGB_BASE: u16 = 16;

/// First code of the grayscale ramp.
pub const GRAY_BASE: u16 = 232;

/// Number of grayscale levels.
pub const GRAY_LEVELS: u16 = 24;

/// Highest cube level per channel.
pub const CUBE_MAX: u8 = 5;

/// Highest grayscale level.
pub const GRAY_MAX: u8 = 23;

/// Highest base color index.
pub const BASE_MAX: u8 = 15;

/// The sentinel code for [`ColorValue::DEFAULT`]. Just past the palette.
const DEFAULT_CODE: u16 = GRAY_BASE + GRAY_LEVELS;

// ─── Attributes ──────────────────────────────────────────────────────────────

bitflags! {
    /// Rendering attributes carried alongside a palette code.
    ///
    /// These map to SGR parameters (1, 4, 7). They modify how a cell is
    /// drawn, not which palette entry it names:
    ///
    /// ```
    /// use hb_term::color::{Attr, ColorValue};
    ///
    /// let red = ColorValue::rgb(5, 0, 0);
    /// let flipped = red.reversed();
    /// assert_eq!(flipped.code(), red.code());
    /// assert!(flipped.attrs().contains(Attr::REVERSE));
    /// assert_ne!(flipped, red);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1, increased intensity.
        const BOLD      = 1 << 0;
        /// SGR 4, straight underline.
        const UNDERLINE = 1 << 1;
        /// SGR 7, swap foreground and background.
        const REVERSE   = 1 << 2;
    }
}

// ─── Region ──────────────────────────────────────────────────────────────────

/// The palette region a [`ColorValue`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// One of the 16 conventional terminal colors.
    Base,
    /// The 6×6×6 RGB cube.
    Rgb,
    /// The 24-step grayscale ramp.
    Gray,
    /// The terminal's default color.
    Default,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Base => "base",
            Self::Rgb => "rgb",
            Self::Gray => "gray",
            Self::Default => "default",
        };
        f.write_str(name)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Usage errors reported by the checked color operations.
///
/// Range problems are never errors: constructors saturate instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    /// Arithmetic between operands that do not share an arithmetic region.
    #[error("cannot combine a {lhs} color with a {rhs} color")]
    RegionMismatch { lhs: Region, rhs: Region },

    /// Division of a color by zero.
    #[error("color divided by zero")]
    ZeroDivisor,

    /// A color string that names no palette entry.
    #[error("invalid color: {0:?}")]
    Parse(String),
}

// ─── Saturating Clamps ───────────────────────────────────────────────────────
//
// Every construction site funnels through one of these, so no ColorValue can
// hold an out-of-range channel or level.

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_to(v: i32, max: u8) -> u8 {
    // Safe: clamp bounds the value to 0..=max before truncation.
    v.clamp(0, i32::from(max)) as u8
}

#[inline]
fn clamp_cube(v: i32) -> u8 {
    clamp_to(v, CUBE_MAX)
}

#[inline]
fn clamp_gray(v: i32) -> u8 {
    clamp_to(v, GRAY_MAX)
}

#[inline]
fn clamp_base(v: i32) -> u8 {
    clamp_to(v, BASE_MAX)
}

/// Apply `f` to a level and saturate the floored result into `0..=max`.
/// NaN saturates to zero.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn map_level(level: u8, max: u8, f: impl Fn(f32) -> f32) -> u8 {
    let v = f(f32::from(level)).floor();
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, f32::from(max)) as u8
}

// ─── ColorValue ──────────────────────────────────────────────────────────────

/// A palette color: one code from a 256-color terminal palette, or Default.
///
/// Built with saturating constructors, so every value is valid:
///
/// ```
/// use hb_term::color::ColorValue;
///
/// let orange = ColorValue::from_rgb8(255, 128, 0);
/// assert_eq!(orange.rgb_levels(), Some((5, 3, 0)));
///
/// // Out-of-range input clamps, it never wraps.
/// assert_eq!(ColorValue::gray(99), ColorValue::gray(23));
/// assert_eq!(ColorValue::from_rgb8(-40, 300, 0).rgb_levels(), Some((0, 5, 0)));
///
/// // Arithmetic saturates inside the region.
/// let sum = ColorValue::gray(20) + ColorValue::gray(20);
/// assert_eq!(sum, ColorValue::gray(23));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorValue {
    code: u16,
    attrs: Attr,
}

impl ColorValue {
    // ─── Constants ───────────────────────────────────────────────────────

    /// Terminal default color. Lets the terminal background show through.
    pub const DEFAULT: Self = Self::from_code(DEFAULT_CODE);

    pub const BLACK: Self = Self::from_code(0);
    pub const RED: Self = Self::from_code(1);
    pub const GREEN: Self = Self::from_code(2);
    pub const YELLOW: Self = Self::from_code(3);
    pub const BLUE: Self = Self::from_code(4);
    pub const MAGENTA: Self = Self::from_code(5);
    pub const CYAN: Self = Self::from_code(6);
    pub const WHITE: Self = Self::from_code(7);
    pub const BRIGHT_BLACK: Self = Self::from_code(8);
    pub const BRIGHT_RED: Self = Self::from_code(9);
    pub const BRIGHT_GREEN: Self = Self::from_code(10);
    pub const BRIGHT_YELLOW: Self = Self::from_code(11);
    pub const BRIGHT_BLUE: Self = Self::from_code(12);
    pub const BRIGHT_MAGENTA: Self = Self::from_code(13);
    pub const BRIGHT_CYAN: Self = Self::from_code(14);
    pub const BRIGHT_WHITE: Self = Self::from_code(15);

    // ─── Constructors ────────────────────────────────────────────────────

    /// Internal: wrap a code already known to be valid.
    #[inline]
    const fn from_code(code: u16) -> Self {
        Self {
            code,
            attrs: Attr::empty(),
        }
    }

    /// One of the 16 base colors. `index` is clamped to `0..=15`.
    #[must_use]
    pub fn base(index: i32) -> Self {
        Self::from_code(u16::from(clamp_base(index)))
    }

    /// A color from the RGB cube, each level clamped to `0..=5`.
    #[must_use]
    pub fn rgb(r: i32, g: i32, b: i32) -> Self {
        Self::cube(clamp_cube(r), clamp_cube(g), clamp_cube(b))
    }

    /// Internal: linearize levels already known to be in range.
    #[inline]
    fn cube(r: u8, g: u8, b: u8) -> Self {
        Self::from_code(RGB_BASE + 36 * u16::from(r) + 6 * u16::from(g) + u16::from(b))
    }

    /// Quantize an 8-bit RGB triple into the cube.
    ///
    /// Each channel is clamped to `0..=255`, then mapped to a level with
    /// `floor(channel * 6 / 256)`.
    #[must_use]
    pub fn from_rgb8(r: i32, g: i32, b: i32) -> Self {
        let quantize = |c: i32| clamp_cube(c.clamp(0, 255) * 6 / 256);
        Self::cube(quantize(r), quantize(g), quantize(b))
    }

    /// A grayscale level, clamped to `0..=23` (black to white).
    #[must_use]
    pub fn gray(level: i32) -> Self {
        Self::from_code(GRAY_BASE + u16::from(clamp_gray(level)))
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// The raw palette code (256 for Default). Attributes are not included.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u16 {
        self.code
    }

    /// The rendering attributes.
    #[inline]
    #[must_use]
    pub const fn attrs(self) -> Attr {
        self.attrs
    }

    /// The palette region of this color.
    #[must_use]
    pub const fn region(self) -> Region {
        if self.code < RGB_BASE {
            Region::Base
        } else if self.code < GRAY_BASE {
            Region::Rgb
        } else if self.code < DEFAULT_CODE {
            Region::Gray
        } else {
            Region::Default
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self.region(), Region::Default)
    }

    #[inline]
    #[must_use]
    pub const fn is_rgb(self) -> bool {
        matches!(self.region(), Region::Rgb)
    }

    #[inline]
    #[must_use]
    pub const fn is_gray(self) -> bool {
        matches!(self.region(), Region::Gray)
    }

    #[inline]
    #[must_use]
    pub const fn is_base(self) -> bool {
        matches!(self.region(), Region::Base)
    }

    /// Whether the `REVERSE` attribute is set.
    #[inline]
    #[must_use]
    pub const fn is_reversed(self) -> bool {
        self.attrs.contains(Attr::REVERSE)
    }

    /// Cube levels `(r, g, b)` for RGB colors.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn rgb_levels(self) -> Option<(u8, u8, u8)> {
        if !self.is_rgb() {
            return None;
        }
        // Safe truncation: offset < 216, every quotient fits in 0..=5.
        let offset = self.code - RGB_BASE;
        Some(((offset / 36) as u8, (offset % 36 / 6) as u8, (offset % 6) as u8))
    }

    /// Gray level `0..=23` for grayscale colors.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn gray_level(self) -> Option<u8> {
        if self.is_gray() {
            Some((self.code - GRAY_BASE) as u8)
        } else {
            None
        }
    }

    /// Index `0..=15` for base colors.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn base_index(self) -> Option<u8> {
        if self.is_base() {
            Some(self.code as u8)
        } else {
            None
        }
    }

    /// The xterm-256 palette index, or `None` for Default.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn palette_index(self) -> Option<u8> {
        if self.is_default() {
            None
        } else {
            Some(self.code as u8)
        }
    }

    /// Whether this is the zero of its arithmetic region: RGB(0,0,0) or gray 0.
    ///
    /// Base black is not an arithmetic zero and returns `false`.
    #[must_use]
    pub const fn is_black(self) -> bool {
        self.code == RGB_BASE || self.code == GRAY_BASE
    }

    /// Map an arithmetic black to [`DEFAULT`](Self::DEFAULT).
    ///
    /// Drawing primitives that scale intensity use this so fully faded
    /// samples stay transparent instead of painting a dark halo.
    #[must_use]
    pub const fn transparent_if_black(self) -> Self {
        if self.is_black() { Self::DEFAULT } else { self }
    }

    // ─── Attributes ──────────────────────────────────────────────────────

    /// The same palette code with `REVERSE` set.
    #[inline]
    #[must_use]
    pub const fn reversed(self) -> Self {
        self.with_attrs(self.attrs.union(Attr::REVERSE))
    }

    #[inline]
    #[must_use]
    pub const fn bold(self) -> Self {
        self.with_attrs(self.attrs.union(Attr::BOLD))
    }

    #[inline]
    #[must_use]
    pub const fn underlined(self) -> Self {
        self.with_attrs(self.attrs.union(Attr::UNDERLINE))
    }

    /// Replace the attribute set.
    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }

    /// The same palette code with no attributes.
    #[inline]
    #[must_use]
    pub const fn plain(self) -> Self {
        self.with_attrs(Attr::empty())
    }

    // ─── Arithmetic ──────────────────────────────────────────────────────

    /// Region-local addition. Mismatched or non-arithmetic operands are
    /// reported instead of passed through.
    ///
    /// # Errors
    ///
    /// [`ColorError::RegionMismatch`] unless both operands are RGB or both
    /// are gray.
    pub fn checked_add(self, rhs: Self) -> Result<Self, ColorError> {
        self.combine(rhs, |a, b| a + b)
    }

    /// Region-local subtraction, saturating at zero.
    ///
    /// # Errors
    ///
    /// [`ColorError::RegionMismatch`] unless both operands are RGB or both
    /// are gray.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, ColorError> {
        self.combine(rhs, |a, b| a - b)
    }

    fn combine(self, rhs: Self, op: impl Fn(i32, i32) -> i32) -> Result<Self, ColorError> {
        let mixed = match (self.rgb_levels(), rhs.rgb_levels()) {
            (Some((r1, g1, b1)), Some((r2, g2, b2))) => {
                let channel = |a: u8, b: u8| clamp_cube(op(i32::from(a), i32::from(b)));
                Some(Self::cube(channel(r1, r2), channel(g1, g2), channel(b1, b2)))
            }
            _ => match (self.gray_level(), rhs.gray_level()) {
                (Some(a), Some(b)) => Some(Self::gray(op(i32::from(a), i32::from(b)))),
                _ => None,
            },
        };
        mixed
            .map(|c| c.with_attrs(self.attrs))
            .ok_or(ColorError::RegionMismatch {
                lhs: self.region(),
                rhs: rhs.region(),
            })
    }

    /// Multiply every channel (or the gray level) by `factor`.
    ///
    /// Results are floored and clamped to the region. Base colors and
    /// Default are returned unchanged. Negative and NaN factors saturate
    /// to the region's black.
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        self.map_levels(|v| v * factor)
    }

    /// Divide every channel (or the gray level) by `divisor`.
    ///
    /// # Errors
    ///
    /// [`ColorError::ZeroDivisor`] when `divisor` is zero, for every region.
    pub fn checked_div(self, divisor: f32) -> Result<Self, ColorError> {
        if divisor == 0.0 {
            return Err(ColorError::ZeroDivisor);
        }
        Ok(self.map_levels(|v| v / divisor))
    }

    fn map_levels(self, f: impl Fn(f32) -> f32) -> Self {
        let mapped = if let Some((r, g, b)) = self.rgb_levels() {
            let level = |c: u8| map_level(c, CUBE_MAX, &f);
            Self::cube(level(r), level(g), level(b))
        } else if let Some(level) = self.gray_level() {
            Self::from_code(GRAY_BASE + u16::from(map_level(level, GRAY_MAX, &f)))
        } else {
            return self;
        };
        mapped.with_attrs(self.attrs)
    }

    // ─── Conversion ──────────────────────────────────────────────────────

    /// The nearest 8-bit RGB approximation, or `None` for Default.
    ///
    /// Cube levels map linearly (`level × 51`) so re-encoding with
    /// [`from_rgb8`](Self::from_rgb8) lands on the same code. Gray levels
    /// use the xterm ramp (`8 + 10 × level`), base colors the xterm table.
    #[must_use]
    pub fn to_rgb8(self) -> Option<(u8, u8, u8)> {
        match self.region() {
            Region::Base => self.base_index().map(|i| ANSI16_RGB[usize::from(i)]),
            Region::Rgb => self.rgb_levels().map(|(r, g, b)| (r * 51, g * 51, b * 51)),
            Region::Gray => self.gray_level().map(|l| {
                let v = 8 + 10 * l;
                (v, v, v)
            }),
            Region::Default => None,
        }
    }
}

impl Default for ColorValue {
    /// The terminal default color.
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─── Operators ───────────────────────────────────────────────────────────────
//
// The operators keep the pass-through policy: when the operands do not share
// an arithmetic region, the right-hand operand is returned unchanged. Callers
// that want the mismatch reported use checked_add / checked_sub.

impl Add for ColorValue {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.checked_add(rhs).unwrap_or(rhs)
    }
}

impl Sub for ColorValue {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.checked_sub(rhs).unwrap_or(rhs)
    }
}

impl AddAssign for ColorValue {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for ColorValue {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for ColorValue {
    type Output = Self;

    fn mul(self, factor: f32) -> Self {
        self.scale(factor)
    }
}

impl MulAssign<f32> for ColorValue {
    fn mul_assign(&mut self, factor: f32) {
        *self = self.scale(factor);
    }
}

impl Div<f32> for ColorValue {
    type Output = Self;

    /// # Panics
    ///
    /// Panics when `divisor` is zero, like integer division.
    fn div(self, divisor: f32) -> Self {
        match self.checked_div(divisor) {
            Ok(color) => color,
            Err(err) => panic!("{err}"),
        }
    }
}

impl DivAssign<f32> for ColorValue {
    fn div_assign(&mut self, divisor: f32) {
        *self = *self / divisor;
    }
}

// ─── Formatting & Parsing ────────────────────────────────────────────────────

/// Names of the base colors, indexed by palette code.
const BASE_NAMES: [&str; 16] = [
    "black",
    "red",
    "green",
    "yellow",
    "blue",
    "magenta",
    "cyan",
    "white",
    "bright-black",
    "bright-red",
    "bright-green",
    "bright-yellow",
    "bright-blue",
    "bright-magenta",
    "bright-cyan",
    "bright-white",
];

const ATTR_NAMES: [(Attr, &str); 3] = [
    (Attr::BOLD, "bold"),
    (Attr::UNDERLINE, "underline"),
    (Attr::REVERSE, "reverse"),
];

impl fmt::Debug for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((r, g, b)) = self.rgb_levels() {
            write!(f, "rgb({r},{g},{b})")?;
        } else if let Some(level) = self.gray_level() {
            write!(f, "gray({level})")?;
        } else if let Some(index) = self.base_index() {
            write!(f, "base({index})")?;
        } else {
            f.write_str("default")?;
        }
        for (flag, name) in ATTR_NAMES {
            if self.attrs.contains(flag) {
                write!(f, "+{name}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for ColorValue {
    type Err = ColorError;

    /// Parse a color string.
    ///
    /// Accepted forms: `default`, a base color name (`red`, `bright-blue`),
    /// `base:N`, `rgb:R,G,B` (cube levels), `gray:N`, `#RRGGBB`, each
    /// optionally followed by `+bold`, `+underline`, or `+reverse`.
    /// Numeric values clamp like the constructors.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorError::Parse(s.to_string());
        let lower = s.trim().to_ascii_lowercase();
        let mut parts = lower.split('+');
        let head = parts.next().unwrap_or_default().trim();

        let number = |text: &str| text.trim().parse::<i32>().map_err(|_| err());

        let mut color = if head == "default" || head == "none" {
            Self::DEFAULT
        } else if let Some(index) = BASE_NAMES.iter().position(|name| *name == head) {
            // index < 16, from the fixed-size table.
            Self::from_code(u16::try_from(index).map_err(|_| err())?)
        } else if let Some(rest) = head.strip_prefix("base:") {
            Self::base(number(rest)?)
        } else if let Some(rest) = head
            .strip_prefix("gray:")
            .or_else(|| head.strip_prefix("grey:"))
        {
            Self::gray(number(rest)?)
        } else if let Some(rest) = head.strip_prefix("rgb:") {
            let levels = rest.split(',').map(number).collect::<Result<Vec<_>, _>>()?;
            let &[r, g, b] = levels.as_slice() else {
                return Err(err());
            };
            Self::rgb(r, g, b)
        } else if let Some(hex) = head.strip_prefix('#') {
            let (r, g, b) = parse_hex_rgb(hex).ok_or_else(err)?;
            Self::from_rgb8(i32::from(r), i32::from(g), i32::from(b))
        } else {
            return Err(err());
        };

        for part in parts {
            let part = part.trim();
            let (flag, _) = ATTR_NAMES
                .iter()
                .find(|(_, name)| *name == part)
                .ok_or_else(err)?;
            color = color.with_attrs(color.attrs | *flag);
        }

        Ok(color)
    }
}

/// Parse `RRGGBB` (no leading `#`).
fn parse_hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    if hex.len() != 6 {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((byte(0)?, byte(2)?, byte(4)?))
}

// ─── Base Palette ────────────────────────────────────────────────────────────

/// The base colors as RGB values (xterm defaults).
///
/// Individual terminals may override these; they serve as the nearest-RGB
/// reference for [`ColorValue::to_rgb8`].
pub const ANSI16_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0),       // 0: Black
    (128, 0, 0),     // 1: Red
    (0, 128, 0),     // 2: Green
    (128, 128, 0),   // 3: Yellow
    (0, 0, 128),     // 4: Blue
    (128, 0, 128),   // 5: Magenta
    (0, 128, 128),   // 6: Cyan
    (192, 192, 192), // 7: White
    (128, 128, 128), // 8: Bright Black
    (255, 0, 0),     // 9: Bright Red
    (0, 255, 0),     // 10: Bright Green
    (255, 255, 0),   // 11: Bright Yellow
    (0, 0, 255),     // 12: Bright Blue
    (255, 0, 255),   // 13: Bright Magenta
    (0, 255, 255),   // 14: Bright Cyan
    (255, 255, 255), // 15: Bright White
];

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn rgb_linearizes_into_cube() {
        assert_eq!(ColorValue::rgb(0, 0, 0).code(), 16);
        assert_eq!(ColorValue::rgb(5, 0, 0).code(), 16 + 180);
        assert_eq!(ColorValue::rgb(1, 2, 3).code(), 16 + 36 + 12 + 3);
        assert_eq!(ColorValue::rgb(5, 5, 5).code(), 231);
    }

    #[test]
    fn rgb_clamps_levels() {
        assert_eq!(ColorValue::rgb(9, -3, 6), ColorValue::rgb(5, 0, 5));
    }

    #[test]
    fn from_rgb8_quantizes_with_floor() {
        assert_eq!(ColorValue::from_rgb8(0, 42, 43).rgb_levels(), Some((0, 0, 1)));
        assert_eq!(ColorValue::from_rgb8(127, 128, 255).rgb_levels(), Some((2, 3, 5)));
    }

    #[test]
    fn from_rgb8_clamps_before_mapping() {
        assert_eq!(ColorValue::from_rgb8(-1, 256, 1000).rgb_levels(), Some((0, 5, 5)));
    }

    #[test]
    fn gray_offsets_into_ramp() {
        assert_eq!(ColorValue::gray(0).code(), GRAY_BASE);
        assert_eq!(ColorValue::gray(23).code(), GRAY_BASE + 23);
    }

    #[test]
    fn gray_saturates_at_both_ends() {
        assert_eq!(ColorValue::gray(24), ColorValue::gray(23));
        assert_eq!(ColorValue::gray(-5), ColorValue::gray(0));
    }

    #[test]
    fn base_clamps_index() {
        assert_eq!(ColorValue::base(3), ColorValue::YELLOW);
        assert_eq!(ColorValue::base(40), ColorValue::BRIGHT_WHITE);
        assert_eq!(ColorValue::base(-1), ColorValue::BLACK);
    }

    #[test]
    fn default_is_default() {
        assert_eq!(ColorValue::default(), ColorValue::DEFAULT);
        assert!(ColorValue::DEFAULT.is_default());
        assert_eq!(ColorValue::DEFAULT.palette_index(), None);
    }

    // ── Regions ─────────────────────────────────────────────────────────

    #[test]
    fn region_predicates_are_disjoint() {
        let samples = [
            (ColorValue::RED, Region::Base),
            (ColorValue::rgb(2, 2, 2), Region::Rgb),
            (ColorValue::gray(7), Region::Gray),
            (ColorValue::DEFAULT, Region::Default),
        ];
        for (color, region) in samples {
            assert_eq!(color.region(), region);
            let hits = [color.is_base(), color.is_rgb(), color.is_gray(), color.is_default()];
            assert_eq!(hits.iter().filter(|h| **h).count(), 1, "{color:?}");
        }
    }

    #[test]
    fn accessors_match_region() {
        let c = ColorValue::rgb(4, 1, 3);
        assert_eq!(c.rgb_levels(), Some((4, 1, 3)));
        assert_eq!(c.gray_level(), None);
        assert_eq!(ColorValue::gray(9).gray_level(), Some(9));
        assert_eq!(ColorValue::CYAN.base_index(), Some(6));
        assert_eq!(ColorValue::gray(9).base_index(), None);
    }

    // ── Addition & Subtraction ──────────────────────────────────────────

    #[test]
    fn gray_add_saturates_instead_of_wrapping() {
        assert_eq!(ColorValue::gray(20) + ColorValue::gray(20), ColorValue::gray(23));
    }

    #[test]
    fn rgb_add_clamps_per_channel() {
        let red = ColorValue::rgb(5, 0, 0);
        let green = ColorValue::rgb(0, 5, 0);
        assert_eq!(red + green, ColorValue::rgb(5, 5, 0));
        assert_eq!(red + red, red);
    }

    #[test]
    fn sub_saturates_at_zero() {
        assert_eq!(ColorValue::rgb(1, 4, 2) - ColorValue::rgb(3, 1, 2), ColorValue::rgb(0, 3, 0));
        assert_eq!(ColorValue::gray(3) - ColorValue::gray(10), ColorValue::gray(0));
    }

    #[test]
    fn mismatched_regions_pass_through_rhs() {
        let rgb = ColorValue::rgb(1, 1, 1);
        let gray = ColorValue::gray(4);
        assert_eq!(rgb + gray, gray);
        assert_eq!(gray - rgb, rgb);
        assert_eq!(ColorValue::RED + rgb, rgb);
        assert_eq!(rgb + ColorValue::DEFAULT, ColorValue::DEFAULT);
        assert_eq!(ColorValue::BLUE + ColorValue::RED, ColorValue::RED);
    }

    #[test]
    fn checked_add_reports_mismatch() {
        let err = ColorValue::rgb(1, 1, 1).checked_add(ColorValue::gray(4)).unwrap_err();
        assert_eq!(
            err,
            ColorError::RegionMismatch {
                lhs: Region::Rgb,
                rhs: Region::Gray
            }
        );
        assert_eq!(err.to_string(), "cannot combine a rgb color with a gray color");
    }

    #[test]
    fn checked_sub_rejects_base_colors() {
        assert!(ColorValue::RED.checked_sub(ColorValue::RED).is_err());
    }

    #[test]
    fn assign_operators_mutate_in_place() {
        let mut c = ColorValue::gray(10);
        c += ColorValue::gray(5);
        assert_eq!(c, ColorValue::gray(15));
        c -= ColorValue::gray(1);
        assert_eq!(c, ColorValue::gray(14));
        c *= 0.5;
        assert_eq!(c, ColorValue::gray(7));
        c /= 2.0;
        assert_eq!(c, ColorValue::gray(3));
    }

    #[test]
    fn arithmetic_keeps_lhs_attributes() {
        let c = ColorValue::gray(2).bold() + ColorValue::gray(3);
        assert_eq!(c, ColorValue::gray(5).bold());
    }

    // ── Scaling ─────────────────────────────────────────────────────────

    #[test]
    fn scale_floors_and_clamps() {
        assert_eq!(ColorValue::rgb(5, 3, 1) * 0.5, ColorValue::rgb(2, 1, 0));
        assert_eq!(ColorValue::rgb(2, 3, 1) * 10.0, ColorValue::rgb(5, 5, 5));
        assert_eq!(ColorValue::gray(10) * 3.0, ColorValue::gray(23));
    }

    #[test]
    fn scale_by_zero_yields_region_black() {
        let rgb = ColorValue::rgb(5, 4, 3) * 0.0;
        let gray = ColorValue::gray(17) * 0.0;
        assert!(rgb.is_black());
        assert!(gray.is_black());
        assert_eq!(rgb.transparent_if_black(), ColorValue::DEFAULT);
        assert_eq!(gray.transparent_if_black(), ColorValue::DEFAULT);
    }

    #[test]
    fn scale_negative_and_nan_saturate_to_black() {
        assert!(ColorValue::rgb(5, 5, 5).scale(-2.0).is_black());
        assert!(ColorValue::gray(12).scale(f32::NAN).is_black());
    }

    #[test]
    fn scale_is_identity_for_base_and_default() {
        assert_eq!(ColorValue::MAGENTA * 0.1, ColorValue::MAGENTA);
        assert_eq!(ColorValue::DEFAULT * 3.0, ColorValue::DEFAULT);
    }

    #[test]
    fn division_divides_levels() {
        assert_eq!(ColorValue::rgb(5, 4, 3) / 2.0, ColorValue::rgb(2, 2, 1));
        assert_eq!(ColorValue::gray(23) / 23.0, ColorValue::gray(1));
    }

    #[test]
    fn checked_div_rejects_zero_for_every_region() {
        for color in [ColorValue::rgb(1, 2, 3), ColorValue::gray(4), ColorValue::RED, ColorValue::DEFAULT] {
            assert_eq!(color.checked_div(0.0), Err(ColorError::ZeroDivisor));
        }
    }

    #[test]
    #[should_panic(expected = "color divided by zero")]
    fn division_by_zero_panics() {
        let _ = ColorValue::gray(4) / 0.0;
    }

    #[test]
    fn black_is_only_arithmetic_zero() {
        assert!(ColorValue::rgb(0, 0, 0).is_black());
        assert!(ColorValue::gray(0).is_black());
        assert!(!ColorValue::BLACK.is_black());
        assert!(!ColorValue::rgb(0, 0, 1).is_black());
        assert_eq!(ColorValue::gray(1).transparent_if_black(), ColorValue::gray(1));
    }

    // ── Attributes ──────────────────────────────────────────────────────

    #[test]
    fn reversed_keeps_code_and_changes_equality() {
        let c = ColorValue::rgb(5, 0, 0);
        let r = c.reversed();
        assert_eq!(r.code(), c.code());
        assert!(r.is_reversed());
        assert!(!c.is_reversed());
        assert_ne!(r, c);
        assert_eq!(r.plain(), c);
    }

    #[test]
    fn reversed_is_idempotent() {
        let c = ColorValue::gray(3).reversed();
        assert_eq!(c.reversed(), c);
    }

    #[test]
    fn attributes_combine() {
        let c = ColorValue::WHITE.bold().underlined();
        assert_eq!(c.attrs(), Attr::BOLD | Attr::UNDERLINE);
    }

    // ── Conversion ──────────────────────────────────────────────────────

    #[test]
    fn to_rgb8_per_region() {
        assert_eq!(ColorValue::rgb(5, 1, 0).to_rgb8(), Some((255, 51, 0)));
        assert_eq!(ColorValue::gray(0).to_rgb8(), Some((8, 8, 8)));
        assert_eq!(ColorValue::gray(23).to_rgb8(), Some((238, 238, 238)));
        assert_eq!(ColorValue::BRIGHT_RED.to_rgb8(), Some((255, 0, 0)));
        assert_eq!(ColorValue::DEFAULT.to_rgb8(), None);
    }

    // ── Formatting & Parsing ────────────────────────────────────────────

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", ColorValue::rgb(5, 0, 0)), "rgb(5,0,0)");
        assert_eq!(format!("{:?}", ColorValue::gray(12)), "gray(12)");
        assert_eq!(format!("{:?}", ColorValue::RED), "base(1)");
        assert_eq!(format!("{}", ColorValue::DEFAULT.reversed()), "default+reverse");
    }

    #[test]
    fn parse_named_and_numeric_forms() {
        let parse = |s: &str| s.parse::<ColorValue>().unwrap();
        assert_eq!(parse("default"), ColorValue::DEFAULT);
        assert_eq!(parse("Bright-Blue"), ColorValue::BRIGHT_BLUE);
        assert_eq!(parse("base:3"), ColorValue::YELLOW);
        assert_eq!(parse("rgb:1, 2, 3"), ColorValue::rgb(1, 2, 3));
        assert_eq!(parse("grey:30"), ColorValue::gray(23));
        assert_eq!(parse("#ff8000"), ColorValue::rgb(5, 3, 0));
        assert_eq!(parse("red+bold+reverse"), ColorValue::RED.bold().reversed());
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "purple", "rgb:1,2", "gray:x", "#12345", "#gg0000", "red+blink"] {
            assert_eq!(
                bad.parse::<ColorValue>(),
                Err(ColorError::Parse(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn display_parses_back() {
        for color in [ColorValue::rgb(3, 0, 4), ColorValue::gray(0).underlined(), ColorValue::DEFAULT] {
            let text = color.to_string();
            let text = text
                .replace("rgb(", "rgb:")
                .replace("gray(", "gray:")
                .replace(')', "");
            assert_eq!(text.parse::<ColorValue>().unwrap(), color);
        }
    }

    // ── Properties ──────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn from_rgb8_is_stable_under_reencoding(r in -64i32..320, g in -64i32..320, b in -64i32..320) {
            let color = ColorValue::from_rgb8(r, g, b);
            let (r8, g8, b8) = color.to_rgb8().unwrap();
            let again = ColorValue::from_rgb8(i32::from(r8), i32::from(g8), i32::from(b8));
            prop_assert_eq!(again, color);
        }

        #[test]
        fn gray_sum_stays_in_ramp(a in 0i32..24, b in 0i32..24) {
            let sum = ColorValue::gray(a) + ColorValue::gray(b);
            prop_assert!(sum.is_gray());
            prop_assert_eq!(i32::from(sum.gray_level().unwrap()), (a + b).min(23));
        }

        #[test]
        fn rgb_sum_clamps_each_channel(
            r1 in 0i32..6, g1 in 0i32..6, b1 in 0i32..6,
            r2 in 0i32..6, g2 in 0i32..6, b2 in 0i32..6,
        ) {
            let sum = ColorValue::rgb(r1, g1, b1) + ColorValue::rgb(r2, g2, b2);
            let (r, g, b) = sum.rgb_levels().unwrap();
            prop_assert_eq!(i32::from(r), (r1 + r2).min(5));
            prop_assert_eq!(i32::from(g), (g1 + g2).min(5));
            prop_assert_eq!(i32::from(b), (b1 + b2).min(5));
        }

        #[test]
        fn scale_never_leaves_region(level in 0i32..24, factor in -10.0f32..10.0) {
            let scaled = ColorValue::gray(level).scale(factor);
            prop_assert!(scaled.is_gray());
        }
    }
}
