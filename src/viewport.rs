/// World extent used when auto-centering; iterates beyond it are treated
/// as divergent outliers and clamped away.
const WORLD_CLAMP: f32 = 4.0;

const DEFAULT_SCALE: f32 = 0.25;

/// Affine mapping from simulation coordinates to canvas pixels.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub scale: f32,
    pub center_x: f32,
    pub center_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            center_x: 0.0,
            center_y: 0.0,
        }
    }
}

impl Viewport {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Projects a world point onto a canvas of the given pixel size.
    /// Divergent inputs simply land far outside the canvas; callers cull
    /// by bounds, so no finiteness check is needed here.
    pub fn project(&self, x: f64, y: f64, canvas_w: usize, canvas_h: usize) -> (f32, f32) {
        let s = self.scale * (canvas_h as f32 * 0.5);
        let px = canvas_w as f32 * 0.5 + (x as f32 - self.center_x) * s;
        let py = canvas_h as f32 * 0.5 + (y as f32 - self.center_y) * s;
        (px, py)
    }

    pub fn contains(px: f32, py: f32, canvas_w: usize, canvas_h: usize) -> bool {
        px > 0.0 && py > 0.0 && px < canvas_w as f32 && py < canvas_h as f32
    }

    /// Recenters and rescales so the given world points fill the view,
    /// ignoring anything outside the clamp range.
    pub fn auto_center(&mut self, points: &[(f64, f64)]) {
        let mut min_x = f32::MAX;
        let mut max_x = f32::MIN;
        let mut min_y = f32::MAX;
        let mut max_y = f32::MIN;
        for &(x, y) in points {
            min_x = min_x.min(x as f32);
            max_x = max_x.max(x as f32);
            min_y = min_y.min(y as f32);
            max_y = max_y.max(y as f32);
        }
        max_x = max_x.min(WORLD_CLAMP);
        max_y = max_y.min(WORLD_CLAMP);
        min_x = min_x.max(-WORLD_CLAMP);
        min_y = min_y.max(-WORLD_CLAMP);
        self.center_x = (max_x + min_x) * 0.5;
        self.center_y = (max_y + min_y) * 0.5;
        let span = (max_x - min_x).max(max_y - min_y);
        self.scale = 1.0 / (span * 0.6).max(0.1);
    }
}
