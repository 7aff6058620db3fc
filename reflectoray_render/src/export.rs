use super::*;

use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, DynamicImage, Frame, ImageFormat, ImageResult,
};
use std::{fs::File, io, io::BufWriter, path::Path as FsPath};

/// How scenes are rasterized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// Minimum distance, in pixels, between the drawn scene and the image border
    pub margin: u32,
    pub background: Rgb<u8>,
    pub mirror_color: Rgb<u8>,
    pub stroke_width: u32,
    /// Region of the scene to draw, if `None`, it's fitted around the mirrors and ray origins
    pub bounds: Option<Bounds>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            margin: 20,
            background: Rgb([255, 255, 255]),
            mirror_color: Rgb([0, 0, 0]),
            stroke_width: 1,
            bounds: None,
        }
    }
}

/// The smallest rectangle containing every mirror and the origin of every path.
///
/// Escape points are left out, they're usually far away from everything else.
pub fn fit_scene<'a>(
    mirrors: &[Mirror],
    paths: impl IntoIterator<Item = &'a Path>,
) -> Option<Bounds> {
    Bounds::enclosing(
        mirrors
            .iter()
            .flat_map(Mirror::endpoints)
            .chain(paths.into_iter().map(|path| *path.origin())),
    )
}

fn blank_canvas(mirrors: &[Mirror], paths: &[(Rgb<u8>, &Path)], options: &RenderOptions) -> Canvas {
    let bounds = options
        .bounds
        .or_else(|| fit_scene(mirrors, paths.iter().map(|(_, path)| *path)));

    let viewport = match bounds {
        Some(bounds) => Viewport::fit(&bounds, options.width, options.height, options.margin),
        None => Viewport::new(options.width, options.height, Point::origin(), 1.0),
    };

    let mut canvas = Canvas::new(viewport, options.background).with_stroke_width(options.stroke_width);
    mirrors.draw(&mut canvas, options.mirror_color);
    canvas
}

/// Draws the mirrors, then every path with its own color.
pub fn render_still(mirrors: &[Mirror], paths: &[(Rgb<u8>, &Path)], options: &RenderOptions) -> RgbImage {
    let mut canvas = blank_canvas(mirrors, paths, options);

    for (color, path) in paths {
        path.draw(&mut canvas, *color);
    }

    canvas.into_image()
}

pub fn save_png(image: &RgbImage, path: impl AsRef<FsPath>) -> ImageResult<()> {
    let path = path.as_ref();
    image.save_with_format(path, ImageFormat::Png)?;
    log::info!("image saved to {}", path.display());
    Ok(())
}

/// Animation of a set of paths, drawn one segment at a time.
///
/// Frame `k` (starting at `1`) shows the first `k` segments of every path,
/// there are as many frames as there are segments in the longest path (at least one).
pub struct Frames<'a> {
    canvas: Canvas,
    paths: Vec<(Rgb<u8>, &'a Path)>,
    step: usize,
    len: usize,
}

impl Iterator for Frames<'_> {
    type Item = RgbImage;

    fn next(&mut self) -> Option<Self::Item> {
        if self.step >= self.len {
            return None;
        }

        for (color, path) in &self.paths {
            if let Some([a, b]) = path.segments().nth(self.step) {
                self.canvas.line(&a, &b, *color);
            }
        }
        self.step += 1;

        Some(self.canvas.image().clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.step;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}

pub fn render_frames<'a>(
    mirrors: &[Mirror],
    paths: &[(Rgb<u8>, &'a Path)],
    options: &RenderOptions,
) -> Frames<'a> {
    let mut canvas = blank_canvas(mirrors, paths, options);

    for (color, path) in paths {
        canvas.cross(path.origin(), ORIGIN_MARK_SIZE, *color);
    }

    let len = paths.iter().map(|(_, path)| path.num_segments()).max().unwrap_or(0).max(1);

    Frames {
        canvas,
        paths: paths.to_vec(),
        step: 0,
        len,
    }
}

/// Encodes `frames` as a looping GIF, shown at `fps` frames per second.
pub fn encode_gif<W: io::Write>(
    writer: W,
    frames: impl IntoIterator<Item = RgbImage>,
    fps: u32,
) -> ImageResult<()> {
    let delay = Delay::from_numer_denom_ms(1000, fps.max(1));

    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(
        frames
            .into_iter()
            .map(|image| Frame::from_parts(DynamicImage::ImageRgb8(image).into_rgba8(), 0, 0, delay)),
    )
}

pub fn save_gif(
    frames: impl IntoIterator<Item = RgbImage>,
    fps: u32,
    path: impl AsRef<FsPath>,
) -> ImageResult<()> {
    let path = path.as_ref();
    encode_gif(BufWriter::new(File::create(path)?), frames, fps)?;
    log::info!("animation saved to {}", path.display());
    Ok(())
}
