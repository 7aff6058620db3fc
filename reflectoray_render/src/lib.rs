pub use image;

use image::{Rgb, RgbImage};
use num_traits::AsPrimitive;
use reflectoray::*;

mod drawable;
mod export;

pub use drawable::*;
pub use export::*;

/// Maps scene coordinates onto the pixels of an image.
///
/// The y axis points up in the scene, and down in the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    /// Scene point drawn at the bottom left corner of the image
    origin: Point,
    /// Pixels per scene unit
    scale: Float,
}

impl Viewport {
    /// A viewport drawing `origin` at the bottom left corner of the image, with `scale` pixels per scene unit.
    #[inline]
    pub fn new(width: u32, height: u32, origin: Point, scale: Float) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            origin,
            scale,
        }
    }

    /// Fits `bounds` inside a `width` x `height` image, leaving at least `margin`
    /// pixels on every side, and centering it along the axis where it's smaller.
    ///
    /// The aspect ratio is preserved. Pixel centers span `[0, width - 1] x [0, height - 1]`.
    pub fn fit(bounds: &Bounds, width: u32, height: u32, margin: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let (w, h) = ((width - 1) as Float, (height - 1) as Float);

        let avail_w = (w - 2.0 * margin as Float).max(1.0);
        let avail_h = (h - 2.0 * margin as Float).max(1.0);

        let size = bounds.size();

        let scale_x = if size.x > 0.0 { avail_w / size.x } else { Float::INFINITY };
        let scale_y = if size.y > 0.0 { avail_h / size.y } else { Float::INFINITY };

        let scale = scale_x.min(scale_y);
        let scale = if scale.is_finite() { scale } else { 1.0 };

        // scene units of padding around `bounds`, so that it's centered
        let pad = Vector::new(w - size.x * scale, h - size.y * scale) / (2.0 * scale);

        Self::new(width, height, bounds.min() - pad, scale)
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub const fn scale(&self) -> Float {
        self.scale
    }

    /// Continuous pixel coordinates of `p`, may lie outside of the image.
    #[inline]
    pub fn to_pixel(&self, p: &Point) -> [Float; 2] {
        let v = (p - self.origin) * self.scale;
        [v.x, (self.height - 1) as Float - v.y]
    }
}

/// An image, along with the viewport used to draw scene objects on it.
#[derive(Clone, Debug)]
pub struct Canvas {
    image: RgbImage,
    viewport: Viewport,
    stroke_width: u32,
}

impl Canvas {
    pub fn new(viewport: Viewport, background: Rgb<u8>) -> Self {
        Self {
            image: RgbImage::from_pixel(viewport.width(), viewport.height(), background),
            viewport,
            stroke_width: 1,
        }
    }

    #[inline]
    pub fn with_stroke_width(mut self, stroke_width: u32) -> Self {
        self.stroke_width = stroke_width.max(1);
        self
    }

    #[inline]
    pub const fn image(&self) -> &RgbImage {
        &self.image
    }

    #[inline]
    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Paints a `stroke_width`-wide square centered on pixel `(x, y)`, ignoring
    /// the parts that fall outside of the image.
    fn plot(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        let w = i64::from(self.stroke_width);
        let lo = -(w - 1) / 2;

        for dy in lo..lo + w {
            for dx in lo..lo + w {
                let (px, py) = (x + dx, y + dy);
                if (0..i64::from(self.image.width())).contains(&px)
                    && (0..i64::from(self.image.height())).contains(&py)
                {
                    self.image.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }

    /// Draws the segment between two scene points.
    pub fn line(&mut self, a: &Point, b: &Point, color: Rgb<u8>) {
        let (w, h) = (self.image.width(), self.image.height());

        let Some((p0, p1)) = clip(
            self.viewport.to_pixel(a),
            self.viewport.to_pixel(b),
            [w as Float - 1.0, h as Float - 1.0],
        ) else {
            return;
        };

        let [x0, y0]: [i64; 2] = p0.map(|c| c.round().as_());
        let [x1, y1]: [i64; 2] = p1.map(|c| c.round().as_());

        // Bresenham
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = ((x1 - x0).signum(), (y1 - y0).signum());
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);

        loop {
            self.plot(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draws a small "x" centered on a scene point, `size` pixels wide.
    pub fn cross(&mut self, p: &Point, size: u32, color: Rgb<u8>) {
        let [x, y]: [i64; 2] = self.viewport.to_pixel(p).map(|c| c.round().as_());
        let r = i64::from(size / 2);

        for i in -r..=r {
            self.plot(x + i, y + i, color);
            self.plot(x + i, y - i, color);
        }
    }
}

/// Liang–Barsky clipping of the segment `p0 p1` against the rectangle `[0, max[0]] x [0, max[1]]`.
fn clip(p0: [Float; 2], p1: [Float; 2], max: [Float; 2]) -> Option<([Float; 2], [Float; 2])> {
    let d = [p1[0] - p0[0], p1[1] - p0[1]];

    let (mut t0, mut t1): (Float, Float) = (0.0, 1.0);

    for axis in 0..2 {
        for (p, q) in [(-d[axis], p0[axis]), (d[axis], max[axis] - p0[axis])] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    t0 = t0.max(r);
                } else {
                    t1 = t1.min(r);
                }
            }
        }
    }

    (t0 <= t1).then(|| {
        let at = |t: Float| [p0[0] + t * d[0], p0[1] + t * d[1]];
        (at(t0), at(t1))
    })
}
