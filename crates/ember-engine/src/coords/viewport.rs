/// Column-major 4x4 matrix, laid out the way WGSL `mat4x4<f32>` expects.
pub type Mat4 = [[f32; 4]; 4];

/// Viewport size in logical pixels.
///
/// The host projection maps `(0, 0)..(width, height)` onto clip space with +Y down.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Orthographic projection from logical pixels to clip space.
    ///
    /// Degenerate sizes are clamped to one pixel so the matrix stays finite.
    pub fn ortho_projection(self) -> Mat4 {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        [
            [2.0 / w, 0.0, 0.0, 0.0],
            [0.0, -2.0 / h, 0.0, 0.0],
            [0.0, 0.0, -1.0, 0.0],
            [-1.0, 1.0, 0.0, 1.0],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(m: &Mat4, x: f32, y: f32) -> (f32, f32) {
        let cx = m[0][0] * x + m[1][0] * y + m[3][0];
        let cy = m[0][1] * x + m[1][1] * y + m[3][1];
        (cx, cy)
    }

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-5 && (a.1 - b.1).abs() < 1e-5
    }

    #[test]
    fn ortho_maps_corners_to_clip_space() {
        let m = Viewport::new(200.0, 100.0).ortho_projection();
        assert!(close(apply(&m, 0.0, 0.0), (-1.0, 1.0)));
        assert!(close(apply(&m, 200.0, 100.0), (1.0, -1.0)));
        assert!(close(apply(&m, 100.0, 50.0), (0.0, 0.0)));
    }

    #[test]
    fn zero_viewport_is_clamped() {
        let m = Viewport::new(0.0, 0.0).ortho_projection();
        assert!(m.iter().flatten().all(|v| v.is_finite()));
        assert!(!Viewport::new(0.0, 10.0).is_valid());
    }
}
