use reflectoray::{nalgebra::Unit, *};
use reflectoray_json::{AngleRange, Color, ColoredRay, Scene, Source};

use core::iter;
use rand::seq::{IteratorRandom, SliceRandom};
pub use rand;

/// Mirror endpoints are drawn inside `[-MAX_COORD, MAX_COORD]` on both axes.
pub const MAX_COORD: Float = 100.0;

/// Ray origins and sources stay closer to the center, so they usually start surrounded by mirrors.
pub const MAX_ORIGIN_COORD: Float = MAX_COORD / 2.0;

pub trait Random: Sized {
    /// Generate a randomized value using the provided `rng`
    ///
    /// This method must not fail. If creating a value is faillible, keep trying until success
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self;
}

impl Random for Ray {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        let origin = rand_vect(rng, MAX_ORIGIN_COORD).into();

        let direction = loop {
            if let Some(v) = Unit::try_new(rand_vect(rng, 1.0), Float::EPSILON * 8.0) {
                break v;
            }
        };
        Self { origin, direction }
    }
}

impl Random for Mirror {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        loop {
            let start = Point::from(rand_vect(rng, MAX_COORD));
            let end = Point::from(rand_vect(rng, MAX_COORD));

            if let Ok(mirror) = Mirror::try_new(start, end) {
                break mirror;
            }
        }
    }
}

impl Random for Color {
    /// Any named color but white, which is the background of rendered images.
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Color::names()
            .filter(|name| *name != "white")
            .choose(rng)
            .and_then(Color::from_name)
            .unwrap_or(Color::BLACK)
    }
}

impl Random for Source {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self {
            start: rand_vect(rng, MAX_ORIGIN_COORD).into(),
            color: Color::random(rng),
        }
    }
}

impl Random for ColoredRay {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self {
            ray: Ray::random(rng),
            color: Color::random(rng),
        }
    }
}

impl Random for AngleRange {
    /// A full turn, with a step dividing it evenly.
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        const STEPS: [Float; 6] = [5.0, 10.0, 15.0, 20.0, 30.0, 45.0];

        loop {
            let step = STEPS.choose(rng).copied().unwrap_or(15.0);
            if let Some(range) = AngleRange::try_new(0.0, 360.0, step) {
                break range;
            }
        }
    }
}

/// A scene with `num_mirrors` random mirrors, and `num_sources` random sources sharing a fan of headings.
///
/// `num_mirrors` is raised to one if it's zero, since a scene must have mirrors.
/// With no sources, a single random ray is added instead, so the scene is never empty.
pub fn random_scene(
    rng: &mut (impl rand::Rng + ?Sized),
    num_mirrors: usize,
    num_sources: usize,
) -> Scene {
    const MIN_ITERATIONS: i64 = 10;
    const MAX_ITERATIONS: i64 = 100;

    let mirrors = iter::repeat_with(|| Mirror::random(rng))
        .take(num_mirrors.max(1))
        .collect();

    let sources: Vec<_> = iter::repeat_with(|| Source::random(rng))
        .take(num_sources)
        .collect();

    let (angles, rays) = if sources.is_empty() {
        (None, Vec::from([ColoredRay::random(rng)]))
    } else {
        (Some(AngleRange::random(rng)), Vec::new())
    };

    Scene {
        mirrors,
        sources,
        angles,
        rays,
        iterations: rng.gen_range(MIN_ITERATIONS..=MAX_ITERATIONS),
        bounds: None,
        escape_distance: None,
    }
}

pub fn rand_vect(rng: &mut (impl rand::Rng + ?Sized), max_coord_mag: Float) -> Vector {
    // the rng generates floats in 0.0..1.0, scale and translate the range accordingly

    Vector::from_fn(|_, _| (rng.gen::<Float>() - 0.5) * (max_coord_mag.abs() * 2.0))
}
