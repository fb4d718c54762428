// SPDX-License-Identifier: MIT
//
// Drawables for the demo scene.
//
// Every entity does two things per frame: `update` reads the frame's
// `InputState` and advances its own state, then `draw` paints it onto the
// canvas. The set of entity kinds is closed, so `Entity` is an enum
// dispatching to one struct per kind.

use hb_canvas::Canvas;
use hb_term::color::{self, ColorValue};
use hb_term::input::{KeyCode, Modifiers};

use crate::input_state::InputState;

/// Something the scene updates and paints once per frame.
pub trait Drawable {
    fn update(&mut self, _input: &InputState) {}

    fn draw(&self, canvas: &mut Canvas);
}

#[allow(clippy::cast_precision_loss)]
fn to_f32(v: i32) -> f32 {
    v as f32
}

// ─── Backdrop ───────────────────────────────────────────────────────────────

/// A black-to-white gray ramp across the bottom `rows` pixel rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backdrop {
    pub rows: i32,
}

impl Backdrop {
    /// Gray level for column `x` of a `width`-pixel ramp.
    #[must_use]
    pub fn level_at(x: i32, width: i32) -> i32 {
        if width <= 1 {
            return i32::from(color::GRAY_MAX);
        }
        x * i32::from(color::GRAY_MAX) / (width - 1)
    }
}

impl Drawable for Backdrop {
    fn draw(&self, canvas: &mut Canvas) {
        let width = i32::from(canvas.width());
        let height = i32::try_from(canvas.pixel_height()).unwrap_or(i32::MAX);
        let top = height - self.rows;
        for x in 0..width {
            let shade = ColorValue::gray(Self::level_at(x, width));
            canvas.fill_rect(x, top, 1, self.rows, shade);
        }
    }
}

// ─── Ball ───────────────────────────────────────────────────────────────────

/// Pixels moved per arrow key press, times four with Shift held.
pub const BALL_STEP: f32 = 1.0;

/// An anti-aliased disc steered with the arrow keys or by dragging the
/// mouse. `*` toggles a brightness pulse.
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: ColorValue,
    pub pulsing: bool,
    brightness: f32,
}

impl Ball {
    #[must_use]
    pub const fn new(x: f32, y: f32, radius: f32, color: ColorValue) -> Self {
        Self {
            x,
            y,
            radius,
            color,
            pulsing: false,
            brightness: 1.0,
        }
    }

    /// The color as drawn this frame.
    #[must_use]
    pub fn shade(&self) -> ColorValue {
        self.color.scale(self.brightness)
    }
}

impl Drawable for Ball {
    fn update(&mut self, input: &InputState) {
        let step = if input.modifiers.contains(Modifiers::SHIFT) {
            BALL_STEP * 4.0
        } else {
            BALL_STEP
        };
        let steps = |code| to_f32(i32::try_from(input.presses(code)).unwrap_or(i32::MAX));
        self.x += (steps(KeyCode::Right) - steps(KeyCode::Left)) * step;
        self.y += (steps(KeyCode::Down) - steps(KeyCode::Up)) * step;
        if input.presses(KeyCode::Char('*')) % 2 == 1 {
            self.pulsing = !self.pulsing;
        }
        if input.mouse_down {
            if let Some((mx, my)) = input.mouse {
                self.x = to_f32(mx);
                self.y = to_f32(my);
            }
        }

        let (w, h) = input.bounds;
        self.x = self.x.clamp(0.0, to_f32((w - 1).max(0)));
        self.y = self.y.clamp(0.0, to_f32((h - 1).max(0)));

        self.brightness = if self.pulsing {
            0.4f32.mul_add((input.elapsed * 4.0).cos(), 0.6)
        } else {
            1.0
        };
    }

    fn draw(&self, canvas: &mut Canvas) {
        canvas.draw_ellipse(self.x, self.y, self.radius, self.radius, self.shade());
    }
}

// ─── Orbit ──────────────────────────────────────────────────────────────────

/// A single sub-pixel point circling a center.
#[derive(Debug, Clone, PartialEq)]
pub struct Orbit {
    pub center: (f32, f32),
    pub radius: f32,
    /// Radians per second.
    pub speed: f32,
    pub color: ColorValue,
    position: (f32, f32),
}

impl Orbit {
    #[must_use]
    pub const fn new(center: (f32, f32), radius: f32, speed: f32, color: ColorValue) -> Self {
        Self {
            center,
            radius,
            speed,
            color,
            position: (center.0 + radius, center.1),
        }
    }

    #[must_use]
    pub const fn position(&self) -> (f32, f32) {
        self.position
    }
}

impl Drawable for Orbit {
    fn update(&mut self, input: &InputState) {
        let angle = input.elapsed * self.speed;
        self.position = (
            self.radius.mul_add(angle.cos(), self.center.0),
            self.radius.mul_add(angle.sin(), self.center.1),
        );
    }

    fn draw(&self, canvas: &mut Canvas) {
        let (x, y) = self.position();
        canvas.splat(x, y, self.color);
    }
}

// ─── Pulse ──────────────────────────────────────────────────────────────────

pub const PULSE_MAX_SPEED: f32 = 12.0;

/// A rectangle cycling through the hues of the RGB cube. `+` and `-` change
/// the cycling speed.
///
/// The shown color trails the hue wheel by at most one cube level per
/// channel per frame, and the top row is drawn one level lighter.
#[derive(Debug, Clone, PartialEq)]
pub struct Pulse {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    /// Hue steps per second, `0..=PULSE_MAX_SPEED`.
    pub speed: f32,
    hue: f32,
    color: ColorValue,
}

impl Pulse {
    #[must_use]
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            speed: 2.0,
            hue: 0.0,
            color: hue_color(0.0),
        }
    }

    /// The color drawn this frame.
    #[must_use]
    pub const fn color(&self) -> ColorValue {
        self.color
    }

    /// The hue wheel color the pulse is heading for.
    #[must_use]
    pub fn target(&self) -> ColorValue {
        hue_color(self.hue)
    }

    #[must_use]
    pub fn rim(&self) -> ColorValue {
        self.color + ColorValue::rgb(1, 1, 1)
    }
}

/// Move `current` one cube level closer to `target` on every channel that
/// differs. Anything outside the cube jumps straight to `target`.
#[must_use]
pub fn step_toward(current: ColorValue, target: ColorValue) -> ColorValue {
    let (Some(from), Some(to)) = (current.rgb_levels(), target.rgb_levels()) else {
        return target;
    };
    let up = ColorValue::rgb(
        i32::from(to.0 > from.0),
        i32::from(to.1 > from.1),
        i32::from(to.2 > from.2),
    );
    let down = ColorValue::rgb(
        i32::from(to.0 < from.0),
        i32::from(to.1 < from.1),
        i32::from(to.2 < from.2),
    );
    let mut next = current;
    next += up;
    next -= down;
    next
}

/// A fully saturated cube color for `hue` in `[0, 6)`: red, yellow, green,
/// cyan, blue, magenta at the integers, ramping linearly in between.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn hue_color(hue: f32) -> ColorValue {
    let hue = hue.rem_euclid(6.0);
    let sector = hue.floor();
    let rise = ((hue - sector) * f32::from(color::CUBE_MAX)) as i32;
    let max = i32::from(color::CUBE_MAX);
    let fall = max - rise;
    match sector as i32 {
        0 => ColorValue::rgb(max, rise, 0),
        1 => ColorValue::rgb(fall, max, 0),
        2 => ColorValue::rgb(0, max, rise),
        3 => ColorValue::rgb(0, fall, max),
        4 => ColorValue::rgb(rise, 0, max),
        _ => ColorValue::rgb(max, 0, fall),
    }
}

impl Drawable for Pulse {
    fn update(&mut self, input: &InputState) {
        for key in &input.keys {
            let delta = match key.code {
                KeyCode::Char('+' | '=') => 1.0,
                KeyCode::Char('-') => -1.0,
                _ => continue,
            };
            self.speed = (self.speed + delta).clamp(0.0, PULSE_MAX_SPEED);
        }
        self.hue = self.speed.mul_add(input.dt, self.hue).rem_euclid(6.0);
        self.color = step_toward(self.color, self.target());
    }

    fn draw(&self, canvas: &mut Canvas) {
        canvas.fill_rect(self.x, self.y, self.w, self.h, self.color);
        canvas.hline(self.x, self.y, self.w, self.rim());
    }
}

// ─── Label ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelText {
    Fixed(String),
    /// Periodically rewritten from the frame time.
    FrameRate(String),
}

/// A text overlay at a cell position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub col: i32,
    pub row: i32,
    pub fg: ColorValue,
    pub bg: ColorValue,
    pub text: LabelText,
}

impl Label {
    #[must_use]
    pub fn fixed(col: i32, row: i32, text: impl Into<String>, fg: ColorValue) -> Self {
        Self {
            col,
            row,
            fg,
            bg: ColorValue::DEFAULT,
            text: LabelText::Fixed(text.into()),
        }
    }

    #[must_use]
    pub const fn frame_rate(col: i32, row: i32, fg: ColorValue) -> Self {
        Self {
            col,
            row,
            fg,
            bg: ColorValue::DEFAULT,
            text: LabelText::FrameRate(String::new()),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        match &self.text {
            LabelText::Fixed(s) | LabelText::FrameRate(s) => s,
        }
    }
}

impl Drawable for Label {
    fn update(&mut self, input: &InputState) {
        if let LabelText::FrameRate(text) = &mut self.text {
            // Refreshed every few frames so the digits stay readable.
            let due = text.is_empty() || input.frame % 10 == 0;
            if due && input.dt > 0.0 {
                *text = format!("{:>3.0} fps", input.dt.recip());
            }
        }
    }

    fn draw(&self, canvas: &mut Canvas) {
        let text = self.text();
        if !text.is_empty() {
            canvas.draw_text(self.col, self.row, text, self.fg, self.bg);
        }
    }
}

// ─── Entity ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Backdrop(Backdrop),
    Ball(Ball),
    Orbit(Orbit),
    Pulse(Pulse),
    Label(Label),
}

impl Drawable for Entity {
    fn update(&mut self, input: &InputState) {
        match self {
            Self::Backdrop(e) => e.update(input),
            Self::Ball(e) => e.update(input),
            Self::Orbit(e) => e.update(input),
            Self::Pulse(e) => e.update(input),
            Self::Label(e) => e.update(input),
        }
    }

    fn draw(&self, canvas: &mut Canvas) {
        match self {
            Self::Backdrop(e) => e.draw(canvas),
            Self::Ball(e) => e.draw(canvas),
            Self::Orbit(e) => e.draw(canvas),
            Self::Pulse(e) => e.draw(canvas),
            Self::Label(e) => e.draw(canvas),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use hb_term::input::KeyEvent;
    use pretty_assertions::assert_eq;

    fn input_with(keys: &[KeyCode]) -> InputState {
        InputState {
            keys: keys
                .iter()
                .map(|&code| KeyEvent::new(code, Modifiers::empty()))
                .collect(),
            bounds: (40, 40),
            ..InputState::default()
        }
    }

    // ── Ball ────────────────────────────────────────────────────────────

    #[test]
    fn arrows_move_the_ball() {
        let mut ball = Ball::new(10.0, 10.0, 3.0, ColorValue::RED);
        ball.update(&input_with(&[KeyCode::Right, KeyCode::Right, KeyCode::Up]));
        assert_eq!((ball.x, ball.y), (12.0, 9.0));
        ball.update(&input_with(&[KeyCode::Left, KeyCode::Down, KeyCode::Down]));
        assert_eq!((ball.x, ball.y), (11.0, 11.0));
    }

    #[test]
    fn shift_moves_faster() {
        let mut ball = Ball::new(10.0, 10.0, 3.0, ColorValue::RED);
        let mut input = input_with(&[KeyCode::Right]);
        input.modifiers = Modifiers::SHIFT;
        ball.update(&input);
        assert_eq!(ball.x, 14.0);
    }

    #[test]
    fn ball_stays_inside_bounds() {
        let mut ball = Ball::new(0.0, 39.0, 3.0, ColorValue::RED);
        ball.update(&input_with(&[KeyCode::Left, KeyCode::Down]));
        assert_eq!((ball.x, ball.y), (0.0, 39.0));
    }

    #[test]
    fn mouse_drag_moves_ball() {
        let mut ball = Ball::new(5.0, 5.0, 2.0, ColorValue::RED);
        let mut input = input_with(&[]);
        input.mouse = Some((20, 30));
        ball.update(&input);
        assert_eq!((ball.x, ball.y), (5.0, 5.0));

        input.mouse_down = true;
        ball.update(&input);
        assert_eq!((ball.x, ball.y), (20.0, 30.0));
    }

    #[test]
    fn star_toggles_brightness_pulse() {
        let mut ball = Ball::new(5.0, 5.0, 2.0, ColorValue::rgb(5, 5, 5));
        let mut input = input_with(&[KeyCode::Char('*')]);
        // cos(4 × 0.4558) ≈ -0.25, so brightness ≈ 0.5.
        input.elapsed = 0.4558;
        ball.update(&input);
        assert!(ball.pulsing);
        assert_eq!(ball.shade(), ColorValue::rgb(2, 2, 2));

        ball.update(&input_with(&[KeyCode::Char('*')]));
        assert!(!ball.pulsing);
        assert_eq!(ball.shade(), ColorValue::rgb(5, 5, 5));
    }

    #[test]
    fn ball_draws_centered_disc() {
        let mut canvas = Canvas::new(20, 10);
        Ball::new(10.0, 10.0, 4.0, ColorValue::GREEN).draw(&mut canvas);
        assert_eq!(canvas.get_pixel(10, 10), ColorValue::GREEN);
        assert_eq!(canvas.get_pixel(0, 0), ColorValue::DEFAULT);
    }

    // ── Orbit ───────────────────────────────────────────────────────────

    #[test]
    fn orbit_follows_the_clock() {
        let mut orbit = Orbit::new((10.0, 10.0), 5.0, 1.0, ColorValue::gray(23));
        orbit.update(&input_with(&[]));
        assert_eq!(orbit.position(), (15.0, 10.0));

        let mut input = input_with(&[]);
        input.elapsed = std::f32::consts::FRAC_PI_2;
        orbit.update(&input);
        let (x, y) = orbit.position();
        assert!((x - 10.0).abs() < 1e-4 && (y - 15.0).abs() < 1e-4);
    }

    #[test]
    fn orbit_draws_a_splat() {
        let mut canvas = Canvas::new(20, 10);
        let orbit = Orbit::new((4.0, 4.0), 0.0, 0.0, ColorValue::gray(23));
        orbit.draw(&mut canvas);
        assert_eq!(canvas.get_pixel(4, 4), ColorValue::gray(23));
    }

    // ── Pulse ───────────────────────────────────────────────────────────

    #[test]
    fn hue_wheel_primaries() {
        assert_eq!(hue_color(0.0), ColorValue::rgb(5, 0, 0));
        assert_eq!(hue_color(1.0), ColorValue::rgb(5, 5, 0));
        assert_eq!(hue_color(2.0), ColorValue::rgb(0, 5, 0));
        assert_eq!(hue_color(4.0), ColorValue::rgb(0, 0, 5));
        assert_eq!(hue_color(6.0), ColorValue::rgb(5, 0, 0));
        assert_eq!(hue_color(0.5), ColorValue::rgb(5, 2, 0));
        assert_eq!(hue_color(-1.0), ColorValue::rgb(5, 0, 5));
    }

    #[test]
    fn plus_minus_change_speed_within_limits() {
        let mut pulse = Pulse::new(0, 0, 2, 2);
        pulse.update(&input_with(&[KeyCode::Char('+'), KeyCode::Char('+')]));
        assert_eq!(pulse.speed, 4.0);
        pulse.update(&input_with(&[KeyCode::Char('-'); 10]));
        assert_eq!(pulse.speed, 0.0);
        pulse.update(&input_with(&[KeyCode::Char('+'); 20]));
        assert_eq!(pulse.speed, PULSE_MAX_SPEED);
    }

    #[test]
    fn pulse_color_trails_the_hue() {
        let mut pulse = Pulse::new(0, 0, 2, 2);
        let mut input = input_with(&[]);
        input.dt = 1.0;
        pulse.update(&input);
        assert_eq!(pulse.target(), ColorValue::rgb(0, 5, 0));
        assert_eq!(pulse.color(), ColorValue::rgb(4, 1, 0));

        input.dt = 0.0;
        for _ in 0..4 {
            pulse.update(&input);
        }
        assert_eq!(pulse.color(), ColorValue::rgb(0, 5, 0));
        pulse.update(&input);
        assert_eq!(pulse.color(), ColorValue::rgb(0, 5, 0));
    }

    #[test]
    fn step_toward_moves_one_level_per_channel() {
        let from = ColorValue::rgb(2, 5, 0);
        assert_eq!(
            step_toward(from, ColorValue::rgb(5, 0, 0)),
            ColorValue::rgb(3, 4, 0)
        );
        assert_eq!(step_toward(from, from), from);
        assert_eq!(step_toward(ColorValue::RED, from), from);
    }

    #[test]
    fn pulse_fills_its_rect_under_a_lighter_rim() {
        let mut canvas = Canvas::new(6, 3);
        Pulse::new(1, 1, 2, 2).draw(&mut canvas);
        assert_eq!(canvas.get_pixel(2, 2), ColorValue::rgb(5, 0, 0));
        assert_eq!(canvas.get_pixel(1, 1), ColorValue::rgb(5, 1, 1));
        assert_eq!(canvas.get_pixel(2, 1), ColorValue::rgb(5, 1, 1));
        assert_eq!(canvas.get_pixel(3, 2), ColorValue::DEFAULT);
        assert_eq!(canvas.get_pixel(1, 0), ColorValue::DEFAULT);
    }

    // ── Label and backdrop ──────────────────────────────────────────────

    #[test]
    fn frame_rate_label_tracks_dt() {
        let mut label = Label::frame_rate(0, 0, ColorValue::WHITE);
        label.update(&input_with(&[]));
        assert_eq!(label.text(), "");

        let mut input = input_with(&[]);
        input.dt = 0.02;
        label.update(&input);
        assert_eq!(label.text(), " 50 fps");

        // Held until the next refresh frame.
        input.dt = 0.04;
        input.frame = 3;
        label.update(&input);
        assert_eq!(label.text(), " 50 fps");
        input.frame = 10;
        label.update(&input);
        assert_eq!(label.text(), " 25 fps");
    }

    #[test]
    fn label_queues_overlay() {
        let mut canvas = Canvas::new(10, 2);
        Label::fixed(1, 1, "hi", ColorValue::WHITE).draw(&mut canvas);
        assert_eq!(canvas.overlays().len(), 1);
        assert_eq!(canvas.overlays()[0].text, "hi");

        Label::frame_rate(0, 0, ColorValue::WHITE).draw(&mut canvas);
        assert_eq!(canvas.overlays().len(), 1);
    }

    #[test]
    fn backdrop_ramps_black_to_white() {
        let mut canvas = Canvas::new(24, 4);
        Backdrop { rows: 2 }.draw(&mut canvas);
        assert_eq!(canvas.get_pixel(0, 7), ColorValue::gray(0));
        assert_eq!(canvas.get_pixel(23, 6), ColorValue::gray(23));
        assert_eq!(canvas.get_pixel(12, 5), ColorValue::DEFAULT);
        assert_eq!(Backdrop::level_at(0, 1), 23);
    }

    #[test]
    fn entity_dispatches_to_variant() {
        let mut entity = Entity::Ball(Ball::new(3.0, 3.0, 1.0, ColorValue::RED));
        entity.update(&input_with(&[KeyCode::Right]));
        let Entity::Ball(ball) = &entity else {
            panic!("variant changed");
        };
        assert_eq!(ball.x, 4.0);
    }
}
