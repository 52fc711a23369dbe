/// Alpha applied when stamping a point, out of 255. Low enough that
/// dense orbits build up brightness gradually.
const STAMP_ALPHA: u32 = 16;

/// Persistent RGBA canvas the simulation draws into. Points accumulate
/// across frames and are faded out according to the trail mode, which is
/// what produces the trailing comet look.
pub struct PixelCanvas {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        let mut canvas = Self {
            width,
            height,
            rgba: vec![0; width * height * 4],
        };
        canvas.clear();
        canvas
    }

    pub fn dimensions(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    pub fn as_rgba8(&self) -> &[u8] {
        &self.rgba
    }

    pub fn clear(&mut self) {
        for px in self.rgba.chunks_exact_mut(4) {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            px[3] = 255;
        }
    }

    /// Darkens every pixel by the given amount, leaving alpha opaque.
    pub fn fade(&mut self, amount: u8) {
        if amount == 0 {
            return;
        }
        for px in self.rgba.chunks_exact_mut(4) {
            px[0] = px[0].saturating_sub(amount);
            px[1] = px[1].saturating_sub(amount);
            px[2] = px[2].saturating_sub(amount);
        }
    }

    /// Blends a disc of the given radius over the canvas. Radii at or
    /// below half a pixel stamp a single pixel.
    pub fn stamp(&mut self, px: f32, py: f32, radius: f32, color: [u8; 3]) {
        if !px.is_finite() || !py.is_finite() {
            return;
        }
        if radius <= 0.5 {
            self.blend(px.round() as i64, py.round() as i64, color);
            return;
        }
        let r2 = radius * radius;
        let min_x = (px - radius).floor() as i64;
        let max_x = (px + radius).ceil() as i64;
        let min_y = (py - radius).floor() as i64;
        let max_y = (py + radius).ceil() as i64;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 - px;
                let dy = y as f32 - py;
                if dx * dx + dy * dy <= r2 {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn blend(&mut self, x: i64, y: i64, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        for c in 0..3 {
            let old = self.rgba[idx + c] as u32;
            let new = color[c] as u32;
            self.rgba[idx + c] = ((old * (255 - STAMP_ALPHA) + new * STAMP_ALPHA) / 255) as u8;
        }
    }
}

/// Fixed color for an iteration index, independent of the equation and
/// trajectory, so the same depth into the orbit always draws in the same
/// hue.
pub fn color_for_iteration(iter: usize) -> [u8; 3] {
    let i = iter + 1;
    let r = 255.min(50 + (i * 11909) % 256) as u8;
    let g = 255.min(50 + (i * 52973) % 256) as u8;
    let b = 255.min(50 + (i * 44111) % 256) as u8;
    [r, g, b]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(canvas: &PixelCanvas, x: usize, y: usize) -> [u8; 4] {
        let [w, _] = canvas.dimensions();
        let idx = (y * w + x) * 4;
        let px = &canvas.as_rgba8()[idx..idx + 4];
        [px[0], px[1], px[2], px[3]]
    }

    #[test]
    fn new_canvas_is_opaque_black() {
        let canvas = PixelCanvas::new(8, 4);
        assert_eq!(canvas.as_rgba8().len(), 8 * 4 * 4);
        assert_eq!(pixel(&canvas, 3, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn stamp_blends_toward_the_color() {
        let mut canvas = PixelCanvas::new(8, 8);
        canvas.stamp(4.0, 4.0, 0.5, [255, 0, 128]);
        let px = pixel(&canvas, 4, 4);
        assert!(px[0] > 0 && px[0] < 255);
        assert_eq!(px[1], 0);
        assert!(px[2] > 0);
        // repeated stamping keeps brightening
        let before = px[0];
        canvas.stamp(4.0, 4.0, 0.5, [255, 0, 128]);
        assert!(pixel(&canvas, 4, 4)[0] > before);
    }

    #[test]
    fn stamp_outside_bounds_is_a_no_op() {
        let mut canvas = PixelCanvas::new(4, 4);
        canvas.stamp(-10.0, 2.0, 0.5, [255, 255, 255]);
        canvas.stamp(2.0, 400.0, 5.0, [255, 255, 255]);
        canvas.stamp(f32::NAN, f32::INFINITY, 5.0, [255, 255, 255]);
        assert!(canvas.as_rgba8().chunks_exact(4).all(|p| p[0] == 0));
    }

    #[test]
    fn large_radius_covers_a_disc() {
        let mut canvas = PixelCanvas::new(16, 16);
        canvas.stamp(8.0, 8.0, 3.0, [255, 255, 255]);
        assert_ne!(pixel(&canvas, 8, 8)[0], 0);
        assert_ne!(pixel(&canvas, 10, 8)[0], 0);
        assert_eq!(pixel(&canvas, 14, 8)[0], 0);
    }

    #[test]
    fn fade_darkens_and_saturates_at_black() {
        let mut canvas = PixelCanvas::new(4, 4);
        for _ in 0..40 {
            canvas.stamp(2.0, 2.0, 0.5, [255, 255, 255]);
        }
        let before = pixel(&canvas, 2, 2);
        canvas.fade(10);
        let after = pixel(&canvas, 2, 2);
        assert_eq!(after[0], before[0].saturating_sub(10));
        assert_eq!(after[3], 255);
        canvas.fade(255);
        assert_eq!(pixel(&canvas, 2, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn iteration_colors_are_deterministic_and_floored() {
        assert_eq!(color_for_iteration(12), color_for_iteration(12));
        for i in 0..800 {
            let [r, g, b] = color_for_iteration(i);
            assert!(r >= 50 && g >= 50 && b >= 50);
        }
    }
}
