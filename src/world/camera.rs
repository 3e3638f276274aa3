use glam::{Vec2, Vec3};

/// Editor view-point in world space.
///
/// * Only **yaw** (heading) is modelled – the preview never tilts up/down.
/// * `z` is the absolute eye height in map units.
/// * Horizontal field of view is fixed at 90°.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub pos: Vec3, // x,y in map-units; z = eye height
    pub yaw: f32,  // radians (0 = east, counter-clockwise)
}

impl Camera {
    /// Create a new camera at `pos`, facing `yaw`.
    pub fn new(pos: Vec3, yaw: f32) -> Self {
        Self { pos, yaw }
    }

    /// World-space eye position.
    #[inline]
    pub fn pos(&self) -> Vec3 {
        self.pos
    }


    /*──────────────────────── derived vectors ───────────────────────*/

    /// Unit vector pointing where the camera looks on the X-Y plane.
    #[inline(always)]
    pub fn forward(self) -> Vec2 {
        let (s, c) = self.yaw.sin_cos();
        Vec2::new(c, s) // 0 rad = +X (east), CCW positive
    }

    /// Unit vector pointing to the camera's right on the X-Y plane.
    #[inline(always)]
    pub fn right(self) -> Vec2 {
        let f = self.forward();
        Vec2::new(f.y, -f.x)
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Move by `forward` units and `side` (strafe), preserving eye-height.
    pub fn step(&mut self, forward: f32, side: f32) {
        let f = self.forward();
        let r = self.right();
        self.pos.x += f.x * forward + r.x * side;
        self.pos.y += f.y * forward + r.y * side;
    }

    /// Rotate around Z-axis (positive = turn left).
    pub fn turn(&mut self, delta_yaw: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
    }

    /// Raise (or lower, when negative) the eye.
    pub fn rise(&mut self, dz: f32) {
        self.pos.z += dz;
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    #[test]
    fn forward_and_right_are_orthonormal() {
        let cam = Camera::new(Vec3::ZERO, 0.3);
        let f = cam.forward();
        let r = cam.right();
        assert!((f.length() - 1.0).abs() < 1e-5);
        assert!((r.length() - 1.0).abs() < 1e-5);
        assert!((f.dot(r)).abs() < 1e-5);
    }

    #[test]
    fn strafe_right_moves_along_right_vector() {
        let mut cam = Camera::new(Vec3::ZERO, 0.0);
        cam.step(0.0, 8.0);
        assert!((cam.pos.truncate() - vec2(0.0, -8.0)).length() < 1e-5);
    }
}
