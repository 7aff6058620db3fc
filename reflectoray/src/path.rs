use super::*;

use alloc::vec::Vec;

/// One reflection event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounce {
    pub hit: Hit,
    /// Direction of the ray before reaching the mirror
    pub incoming: Direction,
    /// Direction of the ray after reflecting off the mirror
    pub reflected: Direction,
}

/// Why a trace stopped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Termination {
    /// The ray didn't hit any more mirrors. The last point of the path is
    /// where it was stopped, and `direction` is where it was heading.
    Escaped { direction: Direction },
    /// The bounce limit was reached while the ray was still hitting mirrors.
    BudgetExhausted,
}

/// The route followed by a ray.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    points: Vec<Point>,
    bounces: Vec<Bounce>,
    termination: Termination,
}

impl Path {
    #[inline]
    pub(crate) fn new(origin: Point) -> Self {
        Self {
            points: Vec::from([origin]),
            bounces: Vec::new(),
            termination: Termination::BudgetExhausted,
        }
    }

    #[inline]
    pub(crate) fn push_bounce(&mut self, bounce: Bounce) {
        self.points.push(bounce.hit.point);
        self.bounces.push(bounce);
    }

    #[inline]
    pub(crate) fn push_escape(&mut self, point: Point, direction: Direction) {
        self.points.push(point);
        self.termination = Termination::Escaped { direction };
    }

    /// The vertices of the path: the ray's origin, every impact point, and
    /// the escape point if the ray escaped.
    ///
    /// Never empty.
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    #[must_use]
    pub fn origin(&self) -> &Point {
        &self.points[0]
    }

    #[inline]
    #[must_use]
    pub fn bounces(&self) -> &[Bounce] {
        &self.bounces
    }

    #[inline]
    #[must_use]
    pub const fn termination(&self) -> &Termination {
        &self.termination
    }

    #[inline]
    #[must_use]
    pub const fn escaped(&self) -> bool {
        matches!(self.termination, Termination::Escaped { .. })
    }

    /// Number of straight segments in the path.
    #[inline]
    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.points.len() - 1
    }

    /// Consecutive pairs of points, in order.
    #[inline]
    pub fn segments(&self) -> impl Iterator<Item = [Point; 2]> + '_ {
        self.points.windows(2).map(|w| [w[0], w[1]])
    }

    /// Checks whether the last segment of the path retraces an earlier one,
    /// i.e. it ends at the same impact point with the same direction (up to `eps`),
    /// meaning the ray is trapped in a periodic orbit from then on.
    ///
    /// Returns the index of the earlier segment.
    #[must_use]
    pub fn loop_index(&self, eps: Float) -> Option<usize> {
        let (new_pt, history) = self.points.split_last()?;
        let (last_pt, _) = history.split_last()?;

        let current_dir = Unit::try_new(new_pt - last_pt, 0.0)?;

        history.windows(2).position(|window| {
            let [this_pt, next_pt] = window else {
                unreachable!()
            };

            let Some(impact_dir) = Unit::try_new(next_pt - this_pt, 0.0) else {
                return false;
            };

            (new_pt - next_pt).norm() <= eps
                && (impact_dir.into_inner() - current_dir.into_inner()).norm() <= eps
        })
    }
}
