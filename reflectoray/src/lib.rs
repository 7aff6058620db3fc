#![no_std]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub use nalgebra;

use nalgebra::{Point2, Rotation2, Unit, Vector2};

mod error;
mod kernel;
mod path;
mod tracer;

pub use error::*;
pub use kernel::*;
pub use path::*;
pub use tracer::*;

pub type Float = f64;

pub type Point = Point2<Float>;

pub type Vector = Vector2<Float>;

/// A normalized [`Vector`].
pub type Direction = Unit<Vector>;

/// Minimum distance a ray must travel before it can hit a mirror, also used
/// to push a reflected ray off the mirror it just bounced on.
///
/// Relative to the magnitude of the coordinates, see [`Tracer::eps_at`].
pub const DEFAULT_EPS: Float = 1e-9;

/// Relative tolerance under which two hit distances are considered equal.
pub const TIE_TOLERANCE: Float = 1e-9;

/// Relative tolerance on the determinant of the ray/segment system.
pub const PARALLEL_TOLERANCE: Float = Float::EPSILON * 64.0;

/// How far an escaping ray is extended when the scene has no bounds.
pub const DEFAULT_ESCAPE_DISTANCE: Float = 1000.0;

#[inline]
fn is_finite(v: &Vector) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// A light ray, represented as a half-line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// The starting point of the half-line
    pub origin: Point,
    /// The direction of the half-line
    pub direction: Direction,
}

impl Ray {
    #[inline]
    #[must_use]
    pub fn new_unit_dir(origin: impl Into<Point>, direction: Direction) -> Self {
        Self {
            origin: origin.into(),
            direction,
        }
    }

    /// Returns `None` if `direction` is zero, or if any coordinate isn't finite.
    #[inline]
    #[must_use]
    pub fn try_new(origin: impl Into<Point>, direction: impl Into<Vector>) -> Option<Self> {
        let origin = origin.into();
        let direction = direction.into();

        (is_finite(&origin.coords) && is_finite(&direction))
            .then(|| Unit::try_new(direction, 0.0))
            .flatten()
            .map(|direction| Self::new_unit_dir(origin, direction))
    }

    /// # Panics
    ///
    /// if `direction` is zero or not finite
    #[inline]
    #[must_use]
    pub fn new(origin: impl Into<Point>, direction: impl Into<Vector>) -> Self {
        Self::try_new(origin, direction).expect("direction must be finite and non-zero")
    }

    /// A ray leaving `origin` with a heading of `degrees`, measured
    /// counter-clockwise from the positive x axis.
    #[inline]
    #[must_use]
    pub fn from_angle(origin: impl Into<Point>, degrees: Float) -> Self {
        let direction = Rotation2::new(degrees.to_radians()) * Vector::x();
        Self::new_unit_dir(origin, Unit::new_normalize(direction))
    }

    /// Get the point at distance `t` (can be negative) from the ray's origin
    #[inline]
    #[must_use]
    pub fn at(&self, t: Float) -> Point {
        self.origin + self.direction.as_ref() * t
    }

    /// Move the ray's origin forward (or backward if `t < 0.0`) by `t`
    #[inline]
    pub fn advance(&mut self, t: Float) {
        self.origin = self.at(t);
    }

    /// Reflect the ray's direction off a mirror whose normal is `normal`
    #[inline]
    pub fn reflect_dir(&mut self, normal: &Direction) {
        self.direction = reflect(&self.direction, normal);
    }
}

/// An axis-aligned rectangle enclosing a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    /// Returns `None` if a coordinate isn't finite, or if `min` is greater than `max` on some axis.
    #[inline]
    #[must_use]
    pub fn try_new(min: impl Into<Point>, max: impl Into<Point>) -> Option<Self> {
        let (min, max) = (min.into(), max.into());

        (is_finite(&min.coords)
            && is_finite(&max.coords)
            && min.iter().zip(max.iter()).all(|(lo, hi)| lo <= hi))
        .then_some(Self { min, max })
    }

    /// The smallest rectangle containing every point of `points`, `None` if it's empty.
    #[must_use]
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;

        Some(points.fold(Self { min: first, max: first }, |bounds, p| Self {
            min: bounds.min.inf(&p),
            max: bounds.max.sup(&p),
        }))
    }

    #[inline]
    #[must_use]
    pub const fn min(&self) -> &Point {
        &self.min
    }

    #[inline]
    #[must_use]
    pub const fn max(&self) -> &Point {
        &self.max
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Vector {
        self.max - self.min
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, p: &Point) -> bool {
        self.min.iter().zip(self.max.iter()).zip(p.iter()).all(|((lo, hi), c)| lo <= c && c <= hi)
    }

    /// Returns the distance `t` such that `ray.at(t)` is the point where `ray`
    /// leaves this rectangle, if it does so ahead of its origin.
    ///
    /// A ray on the boundary and heading out leaves right away, at `t == 0`.
    #[must_use]
    pub fn exit_distance(&self, ray: &Ray) -> Option<Float> {
        let mut near = Float::NEG_INFINITY;
        let mut far = Float::INFINITY;

        for axis in 0..2 {
            let (o, d) = (ray.origin[axis], ray.direction[axis]);
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d == 0.0 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let (t1, t2) = ((lo - o) / d, (hi - o) / d);
            near = near.max(t1.min(t2));
            far = far.min(t1.max(t2));
        }

        (far >= near && far >= 0.0).then_some(far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const E: Float = 1e-12;

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Ray::try_new([0., 0.], [0., 0.]).is_none());
        assert!(Ray::try_new([0., 0.], [Float::NAN, 1.]).is_none());
        assert!(Ray::try_new([Float::INFINITY, 0.], [1., 1.]).is_none());
    }

    #[test]
    fn direction_is_normalized() {
        let ray = Ray::new([1., 1.], [3., 4.]);
        assert!((ray.direction.norm() - 1.0).abs() < E);
        assert!((ray.at(5.) - Point::new(4., 5.)).norm() < E);
    }

    #[test]
    fn angles_are_counter_clockwise_from_x() {
        let up = Ray::from_angle([0., 0.], 90.);
        assert!((up.direction.into_inner() - Vector::new(0., 1.)).norm() < E);

        let left = Ray::from_angle([0., 0.], 180.);
        assert!((left.direction.into_inner() - Vector::new(-1., 0.)).norm() < E);
    }

    #[test]
    fn exit_distance_from_inside() {
        let bounds = Bounds::try_new([0., 0.], [10., 20.]).unwrap();
        let ray = Ray::new([5., 5.], [0., 1.]);
        let t = bounds.exit_distance(&ray).unwrap();
        assert!((t - 15.).abs() < E);
    }

    #[test]
    fn exit_distance_when_moving_away() {
        let bounds = Bounds::try_new([0., 0.], [10., 10.]).unwrap();
        assert!(bounds.exit_distance(&Ray::new([20., 5.], [1., 0.])).is_none());
        assert!(bounds.exit_distance(&Ray::new([20., 5.], [0., 1.])).is_none());
    }

    #[test]
    fn exit_distance_on_the_boundary() {
        let bounds = Bounds::try_new([0., 0.], [10., 10.]).unwrap();

        assert_eq!(bounds.exit_distance(&Ray::new([10., 5.], [1., 0.])), Some(0.));
        assert_eq!(bounds.exit_distance(&Ray::new([0., 0.], [-1., -1.])), Some(0.));
        assert_eq!(bounds.exit_distance(&Ray::new([10., 5.], [-1., 0.])), Some(10.));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        assert!(Bounds::try_new([1., 0.], [0., 1.]).is_none());
    }

    #[test]
    fn enclosing_rectangle() {
        let b = Bounds::enclosing([Point::new(1., 5.), Point::new(-2., 3.), Point::new(0., 7.)])
            .unwrap();
        assert_eq!(*b.min(), Point::new(-2., 3.));
        assert_eq!(*b.max(), Point::new(1., 7.));
        assert!(b.contains(&Point::new(0., 4.)));
        assert!(!b.contains(&Point::new(2., 4.)));
    }
}
