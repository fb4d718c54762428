// SPDX-License-Identifier: MIT
//
// Scene: the ordered list of entities drawn each frame.
//
// Entities are painted in insertion order, so later ones cover earlier ones.
// Labels only queue overlays and end up on top regardless.

use hb_canvas::Canvas;
use hb_term::color::ColorValue;

use crate::entity::{Backdrop, Ball, Drawable, Entity, Label, Orbit, Pulse};
use crate::input_state::InputState;

pub const HELP: &str = "arrows/drag move  * pulse  +/- speed  q quit";

#[derive(Debug, Clone, Default)]
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    pub fn push(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn update_all(&mut self, input: &InputState) {
        for entity in &mut self.entities {
            entity.update(input);
        }
    }

    pub fn draw_all(&self, canvas: &mut Canvas) {
        for entity in &self.entities {
            entity.draw(canvas);
        }
    }

    /// The demo layout for a canvas of `width × height` pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn demo(width: i32, height: i32) -> Self {
        let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
        let short = width.min(height) as f32;

        let mut scene = Self::new();
        scene.push(Entity::Backdrop(Backdrop { rows: 4 }));
        scene.push(Entity::Pulse(Pulse::new(width - 12, 4, 10, 6)));
        scene.push(Entity::Ball(Ball::new(
            cx,
            cy,
            (short / 6.0).max(2.0),
            ColorValue::rgb(5, 2, 0),
        )));
        scene.push(Entity::Orbit(Orbit::new(
            (cx, cy),
            (short / 3.0).max(3.0),
            1.5,
            ColorValue::gray(23),
        )));
        scene.push(Entity::Label(Label::frame_rate(0, 0, ColorValue::BRIGHT_WHITE)));
        scene.push(Entity::Label(Label::fixed(0, 1, HELP, ColorValue::BRIGHT_BLACK)));
        scene
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use hb_term::input::{KeyCode, KeyEvent, Modifiers};
    use pretty_assertions::assert_eq;

    fn ball(scene: &Scene) -> &Ball {
        scene
            .entities()
            .iter()
            .find_map(|e| match e {
                Entity::Ball(b) => Some(b),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn demo_has_every_kind() {
        let scene = Scene::demo(80, 48);
        let kinds: Vec<&str> = scene
            .entities()
            .iter()
            .map(|e| match e {
                Entity::Backdrop(_) => "backdrop",
                Entity::Ball(_) => "ball",
                Entity::Orbit(_) => "orbit",
                Entity::Pulse(_) => "pulse",
                Entity::Label(_) => "label",
            })
            .collect();
        assert_eq!(kinds, ["backdrop", "pulse", "ball", "orbit", "label", "label"]);
    }

    #[test]
    fn update_all_passes_input_through() {
        let mut scene = Scene::demo(80, 48);
        let start = (ball(&scene).x, ball(&scene).y);
        let input = InputState {
            keys: vec![KeyEvent::new(KeyCode::Right, Modifiers::empty())],
            bounds: (80, 48),
            ..InputState::default()
        };
        scene.update_all(&input);
        assert_eq!((ball(&scene).x, ball(&scene).y), (start.0 + 1.0, start.1));
    }

    #[test]
    fn draw_all_paints_and_queues_labels() {
        let scene = Scene::demo(40, 24);
        let mut canvas = Canvas::new(40, 12);
        scene.draw_all(&mut canvas);
        assert_eq!(canvas.get_pixel(20, 12), ColorValue::rgb(5, 2, 0));
        assert_eq!(canvas.get_pixel(0, 23), ColorValue::gray(0));
        // The frame-rate label is empty before its first update.
        assert_eq!(canvas.overlays().len(), 1);
        assert_eq!(canvas.overlays()[0].text, HELP);
    }

    #[test]
    fn empty_scene_draws_nothing() {
        let scene = Scene::new();
        assert!(scene.is_empty());
        let mut canvas = Canvas::new(4, 2);
        scene.draw_all(&mut canvas);
        assert!(canvas.pixels().iter().all(|p| p.is_default()));
    }
}
