// SPDX-License-Identifier: MIT
//
// Drawing primitives on top of `put_pixel`.
//
// Anti-aliasing here quantizes intensity rather than blending: a partially
// covered pixel gets the color scaled by its coverage. A scaled color that
// reaches its region's black is skipped instead of painted, so faint edges
// let whatever is underneath show through rather than leaving a dark rim.

use hb_term::color::ColorValue;

use crate::canvas::Canvas;

/// Saturating `f32 -> i32` for pixel coordinates.
#[allow(clippy::cast_possible_truncation)]
fn pixel(v: f32) -> i32 {
    v as i32
}

impl Canvas {
    /// Paint `color` scaled by `weight`, skipping empty and black results.
    fn put_weighted(&mut self, x: i32, y: i32, color: ColorValue, weight: f32) {
        if weight <= 0.0 {
            return;
        }
        let shaded = color.scale(weight).transparent_if_black();
        if !shaded.is_default() {
            self.put_pixel(x, y, shaded);
        }
    }

    /// Splat `color` at a fractional position over the four surrounding
    /// pixels, each weighted by its bilinear share.
    ///
    /// Non-finite coordinates draw nothing.
    pub fn splat(&mut self, x: f32, y: f32, color: ColorValue) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = (x - x0, y - y0);
        let (px, py) = (pixel(x0), pixel(y0));

        self.put_weighted(px, py, color, (1.0 - fx) * (1.0 - fy));
        self.put_weighted(px.saturating_add(1), py, color, fx * (1.0 - fy));
        self.put_weighted(px, py.saturating_add(1), color, (1.0 - fx) * fy);
        self.put_weighted(
            px.saturating_add(1),
            py.saturating_add(1),
            color,
            fx * fy,
        );
    }

    /// Anti-aliased filled ellipse centred on `(cx, cy)` in pixel units.
    ///
    /// Each unit square `[x, x+1] × [y, y+1]` in the bounding box is painted
    /// with `color × (corners inside / 4)`, where a corner is inside when
    /// `((x - cx) / rx)² + ((y - cy) / ry)² <= 1`. Squares with no corner
    /// inside are left alone. A non-positive radius paints only the pixel
    /// containing the centre, at full color.
    pub fn draw_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: ColorValue) {
        if ![cx, cy, rx, ry].iter().all(|v| v.is_finite()) {
            return;
        }
        if rx <= 0.0 || ry <= 0.0 {
            self.put_pixel(pixel(cx.floor()), pixel(cy.floor()), color);
            return;
        }

        let inside = |x: f32, y: f32| {
            let (dx, dy) = ((x - cx) / rx, (y - cy) / ry);
            dx * dx + dy * dy <= 1.0
        };

        // Only squares that overlap both the bounding box and the canvas.
        let x_lo = pixel((cx - rx).floor()).max(0);
        let x_hi = pixel((cx + rx).ceil()).min(i32::from(self.width()));
        let y_lo = pixel((cy - ry).floor()).max(0);
        let y_hi = pixel((cy + ry).ceil())
            .min(i32::try_from(self.pixel_height()).unwrap_or(i32::MAX));

        for y in y_lo..y_hi {
            for x in x_lo..x_hi {
                #[allow(clippy::cast_precision_loss)]
                let (fx, fy) = (x as f32, y as f32);
                let corners = [(fx, fy), (fx + 1.0, fy), (fx, fy + 1.0), (fx + 1.0, fy + 1.0)]
                    .into_iter()
                    .filter(|&(px, py)| inside(px, py))
                    .count();
                if corners > 0 {
                    #[allow(clippy::cast_precision_loss)]
                    let coverage = corners as f32 / 4.0;
                    self.put_weighted(x, y, color, coverage);
                }
            }
        }
    }

    /// Fill a `w × h` pixel rectangle with its top-left corner at `(x, y)`,
    /// clipped to the canvas.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: ColorValue) {
        let x_lo = x.max(0);
        let y_lo = y.max(0);
        let x_hi = x.saturating_add(w).min(i32::from(self.width()));
        let y_hi = y
            .saturating_add(h)
            .min(i32::try_from(self.pixel_height()).unwrap_or(i32::MAX));

        for py in y_lo..y_hi {
            for px in x_lo..x_hi {
                self.put_pixel(px, py, color);
            }
        }
    }

    /// A one-pixel-tall horizontal run of `len` pixels.
    pub fn hline(&mut self, x: i32, y: i32, len: i32, color: ColorValue) {
        self.fill_rect(x, y, len, 1, color);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
