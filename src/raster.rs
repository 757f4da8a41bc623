//! Scanline triangle rasterizer, parameterized over what happens at each pixel.

use std::ops::{Add, Mul, Sub};
use crate::math::FVector2D;

/// Per-pixel behaviour of a `FTriangleRasterizer`.
pub trait FRasterPolicy {
    /// Value interpolated linearly across the triangle in screen space.
    type Interpolant: Copy + Add<Output = Self::Interpolant> + Sub<Output = Self::Interpolant> + Mul<f32, Output = Self::Interpolant>;

    /// Inclusive pixel rectangle the rasterizer is allowed to touch.
    fn min_x(&self) -> i32;
    fn max_x(&self) -> i32;
    fn min_y(&self) -> i32;
    fn max_y(&self) -> i32;

    fn process_pixel(&mut self, x: i32, y: i32, interpolant: &Self::Interpolant, back_facing: bool);
}

/// Rasterizes triangles by sampling at integer pixel coordinates: pixel (x, y) is the
/// point (x, y) in screen space, its top-left corner, which is also where
/// `FSceneView::project` puts a world point that lands on that pixel's origin. Spans are
/// half-open (`ceil(min) ..= ceil(max) - 1`) in both X and Y, so a pixel on an edge
/// shared by two triangles is visited by exactly one of them.
pub struct FTriangleRasterizer<P: FRasterPolicy> {
    pub policy: P,
}

impl<P: FRasterPolicy> FTriangleRasterizer<P> {
    pub fn new(policy: P) -> Self {
        FTriangleRasterizer { policy }
    }

    pub fn draw_triangle(
        &mut self,
        i0: P::Interpolant,
        i1: P::Interpolant,
        i2: P::Interpolant,
        p0: FVector2D,
        p1: FVector2D,
        p2: FVector2D,
        back_facing: bool,
    ) {
        let mut points = [p0, p1, p2];
        let mut interpolants = [i0, i1, i2];

        // Find the top point.
        if points[1].y < points[0].y && points[1].y <= points[2].y {
            points.swap(0, 1);
            interpolants.swap(0, 1);
        } else if points[2].y < points[0].y && points[2].y <= points[1].y {
            points.swap(0, 2);
            interpolants.swap(0, 2);
        }

        // Find the bottom point.
        if points[1].y > points[2].y {
            points.swap(1, 2);
            interpolants.swap(1, 2);
        }

        if !points.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
            return;
        }

        // Top half: between the short edge 0-1 and the long edge 0-2.
        let (min_y, max_y) = pixel_range(points[0].y, points[1].y, self.policy.min_y(), self.policy.max_y());
        for int_y in min_y..=max_y {
            let y = int_y as f32;
            let (x_a, i_a) = edge_at(points[0], interpolants[0], points[1], interpolants[1], y);
            let (x_b, i_b) = edge_at(points[0], interpolants[0], points[2], interpolants[2], y);
            self.draw_span(int_y, x_a, x_b, i_a, i_b, back_facing);
        }

        // Bottom half: between the short edge 1-2 and the long edge 0-2.
        let (min_y, max_y) = pixel_range(points[1].y, points[2].y, self.policy.min_y(), self.policy.max_y());
        for int_y in min_y..=max_y {
            let y = int_y as f32;
            let (x_a, i_a) = edge_at(points[1], interpolants[1], points[2], interpolants[2], y);
            let (x_b, i_b) = edge_at(points[0], interpolants[0], points[2], interpolants[2], y);
            self.draw_span(int_y, x_a, x_b, i_a, i_b, back_facing);
        }
    }

    fn draw_span(&mut self, y: i32, mut min_x: f32, mut max_x: f32, mut min_interpolant: P::Interpolant, mut max_interpolant: P::Interpolant, back_facing: bool) {
        if min_x > max_x {
            std::mem::swap(&mut min_x, &mut max_x);
            std::mem::swap(&mut min_interpolant, &mut max_interpolant);
        }
        if max_x <= min_x {
            return;
        }

        let (min_int_x, max_int_x) = pixel_range(min_x, max_x, self.policy.min_x(), self.policy.max_x());
        let delta_interpolant = (max_interpolant - min_interpolant) * (1.0 / (max_x - min_x));

        for x in min_int_x..=max_int_x {
            let interpolant = min_interpolant + delta_interpolant * (x as f32 - min_x);
            self.policy.process_pixel(x, y, &interpolant, back_facing);
        }
    }
}

/// Pixels sampled by the half-open span `[min, max)`, clipped to `[clip_min, clip_max]`.
/// The range is empty (`start > end`) when nothing is left. Clipping happens before the
/// float to int conversion, so spans far outside the `i32` range are safe.
fn pixel_range(min: f32, max: f32, clip_min: i32, clip_max: i32) -> (i32, i32) {
    let start = min.ceil().max(clip_min as f32);
    let end = (max.ceil() - 1.0).min(clip_max as f32);
    if start > end {
        return (1, 0);
    }
    (start as i32, end as i32)
}

// Only called for a `y` inside a half that has rows, so `b.y > a.y`.
fn edge_at<I>(a: FVector2D, a_interpolant: I, b: FVector2D, b_interpolant: I, y: f32) -> (f32, I)
where
    I: Copy + Add<Output = I> + Sub<Output = I> + Mul<f32, Output = I>,
{
    let t = (y - a.y) / (b.y - a.y);
    (a.x + (b.x - a.x) * t, a_interpolant + (b_interpolant - a_interpolant) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every pixel it is handed, with the interpolated value.
    struct RecordingPolicy {
        rect: (i32, i32, i32, i32),
        pixels: Vec<(i32, i32, f32, bool)>,
    }

    impl FRasterPolicy for RecordingPolicy {
        type Interpolant = f32;

        fn min_x(&self) -> i32 { self.rect.0 }
        fn max_x(&self) -> i32 { self.rect.1 }
        fn min_y(&self) -> i32 { self.rect.2 }
        fn max_y(&self) -> i32 { self.rect.3 }

        fn process_pixel(&mut self, x: i32, y: i32, interpolant: &f32, back_facing: bool) {
            self.pixels.push((x, y, *interpolant, back_facing));
        }
    }

    fn rasterizer(rect: (i32, i32, i32, i32)) -> FTriangleRasterizer<RecordingPolicy> {
        FTriangleRasterizer::new(RecordingPolicy { rect, pixels: Vec::new() })
    }

    #[test]
    fn single_pixel_inside_triangle_test() {
        let mut rasterizer = rasterizer((2, 2, 2, 2));
        rasterizer.draw_triangle(
            1.0, 1.0, 1.0,
            FVector2D::new(0.0, 0.0), FVector2D::new(10.0, 0.0), FVector2D::new(0.0, 10.0),
            false);
        assert_eq!(rasterizer.policy.pixels, vec![(2, 2, 1.0, false)]);
    }

    #[test]
    fn single_pixel_outside_triangle_test() {
        let mut rasterizer = rasterizer((8, 8, 8, 8));
        rasterizer.draw_triangle(
            1.0, 1.0, 1.0,
            FVector2D::new(0.0, 0.0), FVector2D::new(10.0, 0.0), FVector2D::new(0.0, 10.0),
            false);
        assert!(rasterizer.policy.pixels.is_empty());
    }

    #[test]
    fn interpolates_along_x_test() {
        // Value equals screen X at every vertex, so it must equal X at every pixel.
        let mut rasterizer = rasterizer((0, 16, 0, 16));
        rasterizer.draw_triangle(
            0.0, 8.0, 0.0,
            FVector2D::new(0.0, 0.0), FVector2D::new(8.0, 0.0), FVector2D::new(0.0, 8.0),
            false);
        assert!(!rasterizer.policy.pixels.is_empty());
        for (x, _, value, _) in &rasterizer.policy.pixels {
            assert!((value - *x as f32).abs() < 1.0e-4);
        }
    }

    #[test]
    fn shared_edge_is_visited_once_test() {
        // Two triangles of a square split along its diagonal cover each pixel exactly once.
        let mut rasterizer = rasterizer((0, 16, 0, 16));
        let a = FVector2D::new(0.0, 0.0);
        let b = FVector2D::new(4.0, 0.0);
        let c = FVector2D::new(4.0, 4.0);
        let d = FVector2D::new(0.0, 4.0);
        rasterizer.draw_triangle(0.0, 0.0, 0.0, a, b, c, false);
        rasterizer.draw_triangle(0.0, 0.0, 0.0, a, c, d, false);

        let mut pixels: Vec<(i32, i32)> = rasterizer.policy.pixels.iter().map(|(x, y, _, _)| (*x, *y)).collect();
        pixels.sort();
        let before = pixels.len();
        pixels.dedup();
        assert_eq!(before, pixels.len());
        assert_eq!(pixels.len(), 16);
    }

    #[test]
    fn zero_height_triangle_draws_nothing_test() {
        let mut rasterizer = rasterizer((-100, 100, -100, 100));
        rasterizer.draw_triangle(
            0.0, 0.0, 0.0,
            FVector2D::new(0.0, 1.0), FVector2D::new(5.0, 1.0), FVector2D::new(9.0, 1.0),
            false);
        assert!(rasterizer.policy.pixels.is_empty());
    }

    #[test]
    fn samples_at_pixel_corner_test() {
        // Covers the center of pixel (0, 0) but not its corner.
        let mut center_only = rasterizer((0, 0, 0, 0));
        center_only.draw_triangle(
            1.0, 1.0, 1.0,
            FVector2D::new(0.2, 0.2), FVector2D::new(0.9, 0.2), FVector2D::new(0.2, 0.9),
            false);
        assert!(center_only.policy.pixels.is_empty());

        let mut corner_only = rasterizer((0, 0, 0, 0));
        corner_only.draw_triangle(
            1.0, 1.0, 1.0,
            FVector2D::new(-0.1, -0.1), FVector2D::new(0.4, -0.1), FVector2D::new(-0.1, 0.4),
            false);
        assert_eq!(corner_only.policy.pixels, vec![(0, 0, 1.0, false)]);
    }

    #[test]
    fn huge_coordinates_are_clipped_to_rect_test() {
        let mut covering = rasterizer((0, 0, 0, 0));
        covering.draw_triangle(
            1.0, 1.0, 1.0,
            FVector2D::new(-5.0e9, -5.0e9), FVector2D::new(5.0e9, -5.0e9), FVector2D::new(0.0, 5.0e9),
            false);
        assert_eq!(covering.policy.pixels, vec![(0, 0, 1.0, false)]);

        // Entirely off screen, above and to the left.
        let mut outside = rasterizer((0, 0, 0, 0));
        outside.draw_triangle(
            1.0, 1.0, 1.0,
            FVector2D::new(-3.0e10, -3.0e10), FVector2D::new(-2.0e10, -3.0e10), FVector2D::new(-3.0e10, -2.0e10),
            false);
        assert!(outside.policy.pixels.is_empty());
    }

    #[test]
    fn back_facing_flag_is_forwarded_test() {
        let mut rasterizer = rasterizer((1, 1, 1, 1));
        rasterizer.draw_triangle(
            0.0, 0.0, 0.0,
            FVector2D::new(0.0, 0.0), FVector2D::new(0.0, 10.0), FVector2D::new(10.0, 0.0),
            true);
        assert_eq!(rasterizer.policy.pixels.len(), 1);
        assert!(rasterizer.policy.pixels[0].3);
    }
}
