//! Raster drawing onto a region of an image.

use crate::aabb::AABB;
use glam::f64::DVec2;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const GRID: Rgba<u8> = Rgba([70, 70, 70, 255]);
pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const SKYBLUE: Rgba<u8> = Rgba([135, 206, 235, 255]);
pub const DODGERBLUE: Rgba<u8> = Rgba([30, 144, 255, 255]);
pub const GREEN: Rgba<u8> = Rgba([0, 128, 0, 255]);
pub const ORANGE: Rgba<u8> = Rgba([255, 165, 0, 255]);

/// colour of the n-th tracked series in the trail view
pub fn trail_color(n: usize) -> Rgba<u8> {
    [DODGERBLUE, GREEN, WHITE][n % 3]
}

/// colour of the n-th series in the elements view
pub fn elements_color(n: usize) -> Rgba<u8> {
    [RED, SKYBLUE, ORANGE][n % 3]
}

/// colour of body `i` in the overview
pub fn body_color(i: usize) -> Rgba<u8> {
    [ORANGE, DODGERBLUE, RED][i % 3]
}

/// Scales a colour towards black, the way a partly transparent line looks on
/// a black background.
pub fn faded(c: Rgba<u8>, alpha: f64) -> Rgba<u8> {
    let a = alpha.clamp(0.0, 1.0);
    let f = |v: u8| (v as f64 * a).round() as u8;
    Rgba([f(c.0[0]), f(c.0[1]), f(c.0[2]), 255])
}

/// A rectangle of pixels showing a rectangle of the world, +y up.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub pixels: AABB,
    pub world: AABB,
}

impl Viewport {
    pub fn new(pixels: AABB, world: AABB) -> Self {
        Viewport { pixels, world }
    }

    pub fn to_pixel(&self, p: DVec2) -> (f32, f32) {
        let u = self.world.to_normalized(p);
        let q = self.pixels.from_normalized(DVec2::new(u.x, 1.0 - u.y));
        (q.x as f32, q.y as f32)
    }

    pub fn aspect(&self) -> f64 {
        let s = self.pixels.span();
        s.x / s.y
    }
}

/// `width` by `height` pixels split into `n` equal columns
pub fn columns(width: u32, height: u32, n: u32) -> Vec<AABB> {
    let w = width as f64 / n as f64;
    (0..n)
        .map(|i| {
            AABB(
                DVec2::new(i as f64 * w, 0.0),
                DVec2::new((i + 1) as f64 * w, height as f64),
            )
        })
        .collect()
}

pub fn blank(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, BLACK)
}

pub fn draw_polyline(img: &mut RgbaImage, view: &Viewport, points: &[DVec2], color: Rgba<u8>) {
    for w in points.windows(2) {
        if !(w[0].is_finite() && w[1].is_finite()) {
            continue;
        }
        draw_line_segment_mut(img, view.to_pixel(w[0]), view.to_pixel(w[1]), color);
    }
}

pub fn draw_closed(img: &mut RgbaImage, view: &Viewport, points: &[DVec2], color: Rgba<u8>) {
    draw_polyline(img, view, points, color);
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        draw_polyline(img, view, &[*last, *first], color);
    }
}

pub fn draw_dot(img: &mut RgbaImage, view: &Viewport, p: DVec2, radius: i32, color: Rgba<u8>) {
    if !p.is_finite() {
        return;
    }
    let (x, y) = view.to_pixel(p);
    draw_filled_circle_mut(img, (x.round() as i32, y.round() as i32), radius, color);
}

pub fn draw_border(img: &mut RgbaImage, region: AABB, inset: u32, color: Rgba<u8>) {
    let lo = region.0.as_uvec2() + inset;
    let span = region.span().as_uvec2().saturating_sub(glam::UVec2::splat(2 * inset + 1));
    if span.x == 0 || span.y == 0 {
        return;
    }
    let rect = Rect::at(lo.x as i32, lo.y as i32).of_size(span.x, span.y);
    draw_hollow_rect_mut(img, rect, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> Viewport {
        Viewport::new(
            AABB(DVec2::ZERO, DVec2::new(100.0, 50.0)),
            AABB(DVec2::new(-1.0, -1.0), DVec2::new(1.0, 1.0)),
        )
    }

    #[test]
    fn world_y_is_flipped() {
        let v = view();
        assert_eq!(v.to_pixel(DVec2::new(-1.0, 1.0)), (0.0, 0.0));
        assert_eq!(v.to_pixel(DVec2::new(1.0, -1.0)), (100.0, 50.0));
        assert_eq!(v.aspect(), 2.0);
    }

    #[test]
    fn dots_and_lines_land_in_the_image() {
        let mut img = blank(100, 50);
        let v = view();
        draw_dot(&mut img, &v, DVec2::ZERO, 2, RED);
        assert_eq!(*img.get_pixel(50, 25), RED);

        draw_polyline(
            &mut img,
            &v,
            &[DVec2::new(-0.8, 0.0), DVec2::new(-0.2, 0.0)],
            GREEN,
        );
        assert_eq!(*img.get_pixel(25, 25), GREEN);
        assert_eq!(*img.get_pixel(50, 25), RED);

        // off-canvas and non-finite geometry is ignored
        draw_polyline(&mut img, &v, &[DVec2::new(5.0, 5.0), DVec2::NAN], WHITE);
        draw_dot(&mut img, &v, DVec2::new(f64::NAN, 0.0), 2, WHITE);
    }

    #[test]
    fn column_split() {
        let c = columns(300, 100, 3);
        assert_eq!(c.len(), 3);
        assert_eq!(c[1].0, DVec2::new(100.0, 0.0));
        assert_eq!(c[2].1, DVec2::new(300.0, 100.0));
    }

    #[test]
    fn fading() {
        assert_eq!(faded(WHITE, 0.5), Rgba([128, 128, 128, 255]));
        assert_eq!(faded(RED, 2.0), RED);
    }
}
