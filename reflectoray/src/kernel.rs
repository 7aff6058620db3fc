use super::*;

/// A reflective line segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mirror {
    start: Point,
    end: Point,
}

impl Mirror {
    /// Attempts to create a mirror spanning from `start` to `end`.
    ///
    /// Fails if the endpoints coincide or if any coordinate isn't finite.
    #[inline]
    pub fn try_new(
        start: impl Into<Point>,
        end: impl Into<Point>,
    ) -> Result<Self, ConfigurationError> {
        let (start, end) = (start.into(), end.into());

        if is_finite(&start.coords) && is_finite(&end.coords) && start != end {
            Ok(Self { start, end })
        } else {
            Err(ConfigurationError::DegenerateMirror)
        }
    }

    /// A panicking version of [`Self::try_new`]
    ///
    /// # Panics
    ///
    /// if the endpoints coincide or aren't finite
    #[inline]
    #[must_use]
    pub fn new(start: impl Into<Point>, end: impl Into<Point>) -> Self {
        Self::try_new(start, end).unwrap()
    }

    #[inline]
    #[must_use]
    pub const fn start(&self) -> &Point {
        &self.start
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> &Point {
        &self.end
    }

    #[inline]
    #[must_use]
    pub const fn endpoints(&self) -> [Point; 2] {
        [self.start, self.end]
    }

    /// The vector going from `self.start()` to `self.end()`
    #[inline]
    #[must_use]
    pub fn span(&self) -> Vector {
        self.end - self.start
    }

    /// The unit normal of this mirror, oriented so that it opposes `incoming`.
    ///
    /// Computed from the endpoints on every call, mirrors carry no orientation.
    #[inline]
    #[must_use]
    pub fn normal_against(&self, incoming: &Direction) -> Direction {
        let span = self.span();
        let normal = Unit::new_normalize(Vector::new(-span.y, span.x));

        if normal.dot(incoming.as_ref()) > 0.0 {
            -normal
        } else {
            normal
        }
    }

    /// Returns the intersection of `ray` with this mirror, if it lies on the
    /// segment (endpoints included) at a distance strictly greater than `eps`.
    ///
    /// Rays parallel to the mirror never hit it.
    #[must_use]
    pub fn intersect(&self, ray: &Ray, eps: Float) -> Option<Intersection> {
        // O + t * D = A + s * E
        let d = ray.direction.as_ref();
        let e = self.span();
        let w = self.start - ray.origin;

        let det = d.perp(&e);
        let tol = PARALLEL_TOLERANCE * e.norm();

        if det * det <= tol * tol {
            return None;
        }

        let t = w.perp(&e) / det;
        let s = w.perp(d) / det;

        (t.is_finite() && t > eps && (0.0..=1.0).contains(&s)).then(|| Intersection {
            distance: t,
            point: ray.at(t),
            normal: self.normal_against(&ray.direction),
        })
    }
}

/// The point where a ray meets a mirror.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    /// `t` such that `ray.at(t) == point`, always positive and finite
    pub distance: Float,
    pub point: Point,
    /// The mirror's unit normal, facing the incoming ray
    pub normal: Direction,
}

impl Intersection {
    /// Tags this intersection with the index of the mirror it belongs to.
    #[inline]
    #[must_use]
    pub const fn with_mirror(self, mirror: usize) -> Hit {
        let Self {
            distance,
            point,
            normal,
        } = self;

        Hit {
            mirror,
            distance,
            point,
            normal,
        }
    }
}

/// An [`Intersection`] with one mirror of a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Index of the mirror in the scene's mirror list
    pub mirror: usize,
    pub distance: Float,
    pub point: Point,
    pub normal: Direction,
}

impl Hit {
    /// Whether `self` is closer than `other` by more than [`TIE_TOLERANCE`] (relative).
    #[inline]
    #[must_use]
    pub fn is_closer_than(&self, other: &Self) -> bool {
        self.distance < other.distance - TIE_TOLERANCE * other.distance.max(1.0)
    }
}

/// See [`Mirror::intersect`]. The returned hit refers to mirror `0`.
#[inline]
#[must_use]
pub fn intersect(ray: &Ray, mirror: &Mirror, eps: Float) -> Option<Hit> {
    mirror.intersect(ray, eps).map(|i| i.with_mirror(0))
}

/// Reflects `direction` with respect to the line orthogonal to `normal`.
///
/// The result is normalized again so that rounding errors don't pile up over many bounces.
#[inline]
#[must_use]
pub fn reflect(direction: &Direction, normal: &Direction) -> Direction {
    let n = normal.as_ref();
    let mut v = direction.into_inner();

    let p = v.dot(n);
    v -= n * (p + p);

    Unit::new_normalize(v)
}

/// Returns the hit closest to `ray`'s origin among all `mirrors`, if any.
///
/// When several hits are equally close (see [`Hit::is_closer_than`]), the one
/// with the lowest mirror index wins.
#[inline]
#[must_use]
pub fn nearest_hit(ray: &Ray, mirrors: &[Mirror], eps: Float) -> Option<Hit> {
    nearest_hit_excluding(ray, mirrors, eps, None)
}

/// [`nearest_hit`], ignoring the mirror at index `skip`.
///
/// A ray that just bounced off a mirror can't hit it again before hitting another one,
/// but rounding errors in the hit point can make it look like it does.
#[must_use]
pub fn nearest_hit_excluding(
    ray: &Ray,
    mirrors: &[Mirror],
    eps: Float,
    skip: Option<usize>,
) -> Option<Hit> {
    mirrors
        .iter()
        .enumerate()
        .filter(|&(i, _)| Some(i) != skip)
        .filter_map(|(i, mirror)| mirror.intersect(ray, eps).map(|x| x.with_mirror(i)))
        .fold(None, |closest, hit| match closest {
            Some(c) if !hit.is_closer_than(&c) => Some(c),
            _ => Some(hit),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    const E: Float = 1e-9;

    fn rand_vect(rng: &mut impl Rng, max_coord_mag: Float) -> Vector {
        Vector::from_fn(|_, _| (rng.gen::<Float>() - 0.5) * (max_coord_mag * 2.0))
    }

    fn rand_dir(rng: &mut impl Rng) -> Direction {
        loop {
            if let Some(v) = Unit::try_new(rand_vect(rng, 1.0), Float::EPSILON * 8.0) {
                break v;
            }
        }
    }

    #[test]
    fn perpendicular_hit() {
        let mirror = Mirror::new([0., 10.], [10., 10.]);
        let ray = Ray::new([5., 0.], [0., 1.]);

        let hit = intersect(&ray, &mirror, DEFAULT_EPS).unwrap();
        assert!((hit.distance - 10.).abs() < E);
        assert!((hit.point - Point::new(5., 10.)).norm() < E);
        assert!((hit.normal.into_inner() - Vector::new(0., -1.)).norm() < E);
    }

    #[test]
    fn crossing_points_satisfy_both_equations() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);

        let mut checked = 0;
        while checked < 200 {
            let a = Point::from(rand_vect(&mut rng, 10.));
            let b = Point::from(rand_vect(&mut rng, 10.));
            let Ok(mirror) = Mirror::try_new(a, b) else {
                continue;
            };

            // aim at a point strictly inside the segment
            let s = rng.gen_range(0.05..0.95);
            let target = a + mirror.span() * s;
            let origin = target - rand_dir(&mut rng).into_inner() * rng.gen_range(1.0..10.0);
            let ray = Ray::new(origin, target - origin);

            let Some(hit) = mirror.intersect(&ray, DEFAULT_EPS) else {
                // only near-parallel configurations may be skipped
                assert!(ray.direction.perp(&mirror.span()).abs() < 1e-6 * mirror.span().norm());
                continue;
            };

            assert!(hit.distance > 0.0);
            assert!((ray.at(hit.distance) - hit.point).norm() < 1e-9);
            assert!((hit.point - target).norm() < 1e-7);
            checked += 1;
        }
    }

    #[test]
    fn parallel_rays_never_hit() {
        let mirror = Mirror::new([0., 0.], [10., 0.]);

        // alongside, on the mirror's line, and behind it
        for origin in [[0., 1.], [-5., 0.], [20., 0.]] {
            for dir in [[1., 0.], [-1., 0.]] {
                assert!(mirror.intersect(&Ray::new(origin, dir), DEFAULT_EPS).is_none());
            }
        }
    }

    #[test]
    fn misses_outside_the_segment() {
        let mirror = Mirror::new([0., 10.], [10., 10.]);
        assert!(mirror.intersect(&Ray::new([11., 0.], [0., 1.]), DEFAULT_EPS).is_none());
        assert!(mirror.intersect(&Ray::new([-0.001, 0.], [0., 1.]), DEFAULT_EPS).is_none());
    }

    #[test]
    fn endpoints_are_part_of_the_segment() {
        let mirror = Mirror::new([0., 10.], [10., 10.]);
        assert!(mirror.intersect(&Ray::new([0., 0.], [0., 1.]), DEFAULT_EPS).is_some());
        assert!(mirror.intersect(&Ray::new([10., 0.], [0., 1.]), DEFAULT_EPS).is_some());
    }

    #[test]
    fn hits_behind_or_too_close_are_discarded() {
        let mirror = Mirror::new([0., 10.], [10., 10.]);
        assert!(mirror.intersect(&Ray::new([5., 0.], [0., -1.]), DEFAULT_EPS).is_none());

        let on_mirror = Ray::new([5., 10.], [1., -1.]);
        assert!(mirror.intersect(&on_mirror, DEFAULT_EPS).is_none());
    }

    #[test]
    fn back_face_normal_flips() {
        let mirror = Mirror::new([0., 10.], [10., 10.]);
        let hit = mirror.intersect(&Ray::new([5., 20.], [0., -1.]), DEFAULT_EPS).unwrap();
        assert!((hit.normal.into_inner() - Vector::new(0., 1.)).norm() < E);
    }

    #[test]
    fn reflection_law() {
        let d = Unit::new_normalize(Vector::new(1., -1.));
        let n = Unit::new_normalize(Vector::new(0., 1.));
        let r = reflect(&d, &n);
        assert!((r.into_inner() - Vector::new(1., 1.).normalize()).norm() < E);
    }

    #[test]
    fn reflection_is_an_involution() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            let d = rand_dir(&mut rng);
            let n = rand_dir(&mut rng);
            let back = reflect(&reflect(&d, &n), &n);
            assert!((back.into_inner() - d.into_inner()).norm() < E);
        }
    }

    #[test]
    fn reflection_preserves_norm() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);

        for _ in 0..1000 {
            let r = reflect(&rand_dir(&mut rng), &rand_dir(&mut rng));
            assert!((r.norm() - 1.0).abs() < E);
        }
    }

    #[test]
    fn nearest_hit_picks_the_closest_mirror() {
        let mirrors = [
            Mirror::new([0., 20.], [10., 20.]),
            Mirror::new([0., 10.], [10., 10.]),
            Mirror::new([0., -10.], [10., -10.]),
        ];

        let hit = nearest_hit(&Ray::new([5., 0.], [0., 1.]), &mirrors, DEFAULT_EPS).unwrap();
        assert_eq!(hit.mirror, 1);
        assert!((hit.distance - 10.).abs() < E);
    }

    #[test]
    fn ties_go_to_the_first_mirror() {
        // two mirrors sharing the vertex (5, 10)
        let mirrors = [
            Mirror::new([5., 10.], [10., 15.]),
            Mirror::new([0., 15.], [5., 10.]),
        ];
        let ray = Ray::new([5., 0.], [0., 1.]);

        assert_eq!(nearest_hit(&ray, &mirrors, DEFAULT_EPS).unwrap().mirror, 0);

        let swapped = [mirrors[1], mirrors[0]];
        assert_eq!(nearest_hit(&ray, &swapped, DEFAULT_EPS).unwrap().mirror, 0);
    }

    #[test]
    fn nothing_to_hit() {
        let mirrors = [Mirror::new([0., 10.], [10., 10.])];
        assert!(nearest_hit(&Ray::new([5., 0.], [1., 0.]), &mirrors, DEFAULT_EPS).is_none());
        assert!(nearest_hit(&Ray::new([5., 0.], [1., 0.]), &[], DEFAULT_EPS).is_none());
    }

    #[test]
    fn skipped_mirror_is_ignored() {
        let mirrors = corridor_with_far_wall();
        let ray = Ray::new([5., 5.], [0., 1.]);

        assert_eq!(nearest_hit_excluding(&ray, &mirrors, DEFAULT_EPS, None).unwrap().mirror, 0);

        let hit = nearest_hit_excluding(&ray, &mirrors, DEFAULT_EPS, Some(0)).unwrap();
        assert_eq!(hit.mirror, 1);
        assert!((hit.distance - 15.).abs() < E);

        assert!(nearest_hit_excluding(&ray, &mirrors[..1], DEFAULT_EPS, Some(0)).is_none());
    }

    fn corridor_with_far_wall() -> [Mirror; 2] {
        [
            Mirror::new([0., 10.], [10., 10.]),
            Mirror::new([0., 20.], [10., 20.]),
        ]
    }

    #[test]
    fn degenerate_mirrors_are_rejected() {
        assert_eq!(
            Mirror::try_new([1., 1.], [1., 1.]),
            Err(ConfigurationError::DegenerateMirror)
        );
        assert_eq!(
            Mirror::try_new([Float::NAN, 1.], [1., 1.]),
            Err(ConfigurationError::DegenerateMirror)
        );
    }
}
