//! View-space ↔ screen-space conversions.
//!
//! Angles are view-relative: `π/2` looks straight ahead, larger angles
//! are further left. Every forward mapping has an inverse built from the
//! same constants, so texture coordinates recovered per pixel land on the
//! geometry that produced the edges.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::renderer::View;

/// Heights beyond this are "infinitely" far up / down.
const HEIGHT_LIMIT: i32 = 32770;

/// Angle of the view-space point `(x, y)`, in `0 .. 2π`.
#[inline]
pub fn point_to_angle(x: f32, y: f32) -> f32 {
    if -0.01 < x && x < 0.01 {
        return if y > 0.0 { FRAC_PI_2 } else { 3.0 * FRAC_PI_2 };
    }

    let angle = y.atan2(x);
    if angle < 0.0 { angle + TAU } else { angle }
}

impl View {
    /// Rotate a camera-relative world offset into view space:
    /// `.0` = lateral (+ right), `.1` = depth.
    #[inline]
    pub fn rotate(&self, dx: f32, dy: f32) -> (f32, f32) {
        (dx * self.sin - dy * self.cos, dx * self.cos + dy * self.sin)
    }

    /// Screen column of the view angle `ang`, clamped to `0 ..= screen_w`.
    #[inline]
    pub fn angle_to_x(&self, ang: f32) -> i32 {
        let t = (FRAC_PI_2 - ang).tan();
        let x = (self.aspect_sw * t) as i32;
        (self.screen_w.saturating_add(x) / 2).clamp(0, self.screen_w)
    }

    /// View angle through the left edge of column `x`, clamped to `0 ..= π`.
    #[inline]
    pub fn x_to_angle(&self, x: i32) -> f32 {
        let x = x * 2 - self.screen_w;
        (FRAC_PI_2 - (x as f32 / self.aspect_sw).atan()).clamp(0.0, PI)
    }

    /// Screen column of a lateral offset `tx` at inverse depth `iz`.
    #[inline]
    pub fn delta_to_x(&self, iz: f64, tx: f32) -> i32 {
        let x = (self.aspect_sw as f64 * tx as f64 * iz) as i32;
        (x.saturating_add(self.screen_w)) / 2
    }

    /// Lateral offset seen through column `x` at inverse depth `iz`.
    #[inline]
    pub fn x_to_delta(&self, x: i32, iz: f64) -> f32 {
        let x = x * 2 - self.screen_w;
        (x as f64 / iz / self.aspect_sw as f64) as f32
    }

    /// Screen row of world height `sec_h` at inverse depth `iz`.
    #[inline]
    pub fn dist_to_y(&self, iz: f64, sec_h: i32) -> i32 {
        if sec_h > HEIGHT_LIMIT {
            return -9999;
        }
        if sec_h < -HEIGHT_LIMIT {
            return 9999;
        }

        let y = (self.aspect_sh as f64 * (sec_h as f64 - self.z as f64) * iz) as i32;
        self.screen_h.saturating_sub(y) / 2
    }

    /// Depth at which row `y` meets the horizontal plane at `sec_h`.
    #[inline]
    pub fn y_to_dist(&self, y: i32, sec_h: i32) -> f32 {
        let y = self.screen_h - y * 2;
        if y == 0 {
            return 999_999.0;
        }
        self.aspect_sh * (sec_h as f32 - self.z) / y as f32
    }

    /// World height seen through row `y` at inverse depth `iz`.
    #[inline]
    pub fn y_to_sec_h(&self, y: i32, iz: f64) -> f32 {
        let y = y * 2 - self.screen_h;
        self.z - (y as f64 / self.aspect_sh as f64 / iz) as f32
    }
}
