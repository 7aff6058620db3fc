use super::*;

/// Numeric policy of a trace.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tracer {
    /// Hits closer than this are ignored, and reflected rays start this far from the mirror.
    ///
    /// Relative to the magnitude of the coordinates involved, see [`Self::eps_at`].
    pub eps: Float,
    /// How far an escaping ray is extended, when `bounds` doesn't say otherwise.
    pub escape_distance: Float,
    /// If set, escaping rays are cut where they leave this rectangle.
    pub bounds: Option<Bounds>,
}

impl Default for Tracer {
    #[inline]
    fn default() -> Self {
        Self {
            eps: DEFAULT_EPS,
            escape_distance: DEFAULT_ESCAPE_DISTANCE,
            bounds: None,
        }
    }
}

/// An event of a [`RayPath`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    Bounce(Bounce),
    /// The ray hit nothing, `point` is where it's stopped.
    Escape { point: Point, direction: Direction },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Tracing,
    Done,
}

/// A lazy, possibly infinite, sequence of [`Step`]s of a ray bouncing between mirrors.
///
/// Ends right after the ray escapes.
#[derive(Clone, Debug)]
pub struct RayPath<'a> {
    tracer: Tracer,
    ray: Ray,
    mirrors: &'a [Mirror],
    /// The mirror the ray is leaving, if any
    last_mirror: Option<usize>,
    state: State,
}

impl<'a> RayPath<'a> {
    #[inline]
    #[must_use]
    pub fn new(tracer: Tracer, ray: Ray, mirrors: &'a [Mirror]) -> Self {
        Self {
            tracer,
            ray,
            mirrors,
            last_mirror: None,
            state: State::Tracing,
        }
    }

    /// The ray that will be cast on the next call to `next`.
    #[inline]
    #[must_use]
    pub const fn ray(&self) -> &Ray {
        &self.ray
    }

    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }
}

impl Iterator for RayPath<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_done() {
            return None;
        }

        let eps = self.tracer.eps_at(&self.ray.origin);

        let Some(hit) = nearest_hit_excluding(&self.ray, self.mirrors, eps, self.last_mirror) else {
            self.state = State::Done;
            return Some(Step::Escape {
                point: self.tracer.escape_point(&self.ray),
                direction: self.ray.direction,
            });
        };

        let incoming = self.ray.direction;

        self.ray.origin = hit.point;
        self.ray.reflect_dir(&hit.normal);
        self.ray.advance(self.tracer.eps_at(&hit.point));
        self.last_mirror = Some(hit.mirror);

        Some(Step::Bounce(Bounce {
            hit,
            incoming,
            reflected: self.ray.direction,
        }))
    }
}

impl Tracer {
    #[inline]
    #[must_use]
    pub fn path<'a>(&self, ray: Ray, mirrors: &'a [Mirror]) -> RayPath<'a> {
        RayPath::new(*self, ray, mirrors)
    }

    /// `eps` scaled to the magnitude of `point`'s coordinates (never less than `eps`).
    ///
    /// Far from the origin, hit points are only known up to a few ulps of their coordinates.
    #[inline]
    #[must_use]
    pub fn eps_at(&self, point: &Point) -> Float {
        self.eps * point.coords.norm().max(1.0)
    }

    /// Where a ray that hits nothing is stopped.
    #[must_use]
    pub fn escape_point(&self, ray: &Ray) -> Point {
        let t = self
            .bounds
            .and_then(|bounds| bounds.exit_distance(ray))
            .unwrap_or(self.escape_distance);

        ray.at(t)
    }

    /// Bounces `ray` around `mirrors` at most `max_bounces` times.
    ///
    /// The returned path starts at `ray.origin` and gets one point per bounce. If the
    /// ray stops hitting mirrors before the limit, it is extended (see [`Self::escape_point`])
    /// and the path ends there.
    ///
    /// # Errors
    ///
    /// if `mirrors` is empty, or `max_bounces` isn't positive
    pub fn trace(
        &self,
        ray: Ray,
        mirrors: &[Mirror],
        max_bounces: i64,
    ) -> Result<Path, ConfigurationError> {
        if mirrors.is_empty() {
            return Err(ConfigurationError::NoMirrors);
        }

        let budget = usize::try_from(max_bounces)
            .ok()
            .filter(|&n| n > 0)
            .ok_or(ConfigurationError::InvalidBounceLimit(max_bounces))?;

        let mut path = Path::new(ray.origin);

        for step in self.path(ray, mirrors).take(budget) {
            match step {
                Step::Bounce(bounce) => {
                    log::trace!(
                        "bounce {} off mirror {} at ({}, {})",
                        path.bounces().len() + 1,
                        bounce.hit.mirror,
                        bounce.hit.point.x,
                        bounce.hit.point.y,
                    );
                    path.push_bounce(bounce);
                }
                Step::Escape { point, direction } => path.push_escape(point, direction),
            }
        }

        log::debug!(
            "traced {} bounce(s) from ({}, {}), {}",
            path.bounces().len(),
            ray.origin.x,
            ray.origin.y,
            if path.escaped() { "escaped" } else { "bounce limit reached" },
        );

        Ok(path)
    }
}

/// [`Tracer::trace`] with the default numeric policy.
///
/// # Errors
///
/// if `mirrors` is empty, or `max_bounces` isn't positive
#[inline]
pub fn trace(ray: Ray, mirrors: &[Mirror], max_bounces: i64) -> Result<Path, ConfigurationError> {
    Tracer::default().trace(ray, mirrors, max_bounces)
}
