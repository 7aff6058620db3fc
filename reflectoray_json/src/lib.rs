use reflectoray::*;
use std::error::Error;

use core::ops::Deref;
use std::{rc::Rc, sync::Arc};

pub use serde_json;

mod color;
mod scene;

pub use color::*;
pub use scene::*;

/// This is essentially `try_into` then `try_map` but the latter is nightly-only
///
/// Returns `None` if the array doesn't have `D` elements, or if one of them isn't a finite number.
pub fn json_array_to_float_array<const D: usize>(
    json_array: &[serde_json::Value],
) -> Option<[Float; D]> {
    let array: &[serde_json::Value; D] = json_array.try_into().ok()?;

    let mut coords = [0.; D];
    for (coord, value) in coords.iter_mut().zip(array) {
        *coord = value.as_f64().filter(|c| c.is_finite())? as Float;
    }
    Some(coords)
}

pub fn json_to_vector(json: &serde_json::Value) -> Option<Vector> {
    json.as_array()
        .and_then(|array| json_array_to_float_array::<2>(array))
        .map(Vector::from)
}

pub fn json_to_point(json: &serde_json::Value) -> Option<Point> {
    json_to_vector(json).map(Point::from)
}

pub fn map_json_array<C: FromIterator<T>, T>(
    json: &serde_json::Value,
    map: impl FnMut(&serde_json::Value) -> Result<T, Box<dyn Error>>,
) -> Result<C, Box<dyn Error>> {
    json.as_array()
        .ok_or("json value must be an array")?
        .iter()
        .map(map)
        .collect()
}

/// Reads a finite number at `key`, `Ok(None)` if it's missing.
pub fn get_float(json: &serde_json::Value, key: &str) -> Result<Option<Float>, Box<dyn Error>> {
    json.get(key)
        .map(|value| {
            value
                .as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("{key} must be a finite number").into())
        })
        .transpose()
}

pub trait JsonSer {
    /// Serialize `self` into a JSON object.
    fn to_json(&self) -> serde_json::Value;
}

impl<T: JsonSer> JsonSer for [T] {
    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(Vec::from_iter(self.iter().map(T::to_json)))
    }
}

impl<const N: usize, T: JsonSer> JsonSer for [T; N] {
    fn to_json(&self) -> serde_json::Value {
        self.as_slice().to_json()
    }
}

// It's clear that all these impls use the `Deref` trait, but writing a blanket impl over all
// types implementing `Deref` makes the trait unusable downstream

impl<T: JsonSer + ?Sized> JsonSer for Box<T> {
    fn to_json(&self) -> serde_json::Value {
        self.deref().to_json()
    }
}

impl<T: JsonSer + ?Sized> JsonSer for Arc<T> {
    fn to_json(&self) -> serde_json::Value {
        self.deref().to_json()
    }
}

impl<T: JsonSer + ?Sized> JsonSer for Rc<T> {
    fn to_json(&self) -> serde_json::Value {
        self.deref().to_json()
    }
}

impl<T: JsonSer> JsonSer for Vec<T> {
    fn to_json(&self) -> serde_json::Value {
        self.deref().to_json()
    }
}

impl<T: JsonSer + ?Sized> JsonSer for &T {
    fn to_json(&self) -> serde_json::Value {
        (*self).to_json()
    }
}

impl JsonSer for Point {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!([self.x, self.y])
    }
}

impl JsonSer for Direction {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!([self.x, self.y])
    }
}

impl JsonSer for Mirror {
    /// Serialize a mirror into a JSON array.
    ///
    /// The format of the returned array is explained in [`Self::from_json`]
    fn to_json(&self) -> serde_json::Value {
        self.endpoints().to_json()
    }
}

impl JsonSer for Ray {
    /// Serialize a ray into a JSON object.
    ///
    /// The format of the returned object is explained in [`Self::from_json`]
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "origin": self.origin.to_json(),
            "direction": self.direction.to_json(),
        })
    }
}

impl JsonSer for Bounds {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "min": self.min().to_json(),
            "max": self.max().to_json(),
        })
    }
}

impl JsonSer for Bounce {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "mirror": self.hit.mirror,
            "point": self.hit.point.to_json(),
            "distance": self.hit.distance,
            "incoming": self.incoming.to_json(),
            "reflected": self.reflected.to_json(),
        })
    }
}

impl JsonSer for Path {
    /// ```json
    /// {
    ///     "points": [[x, y], ...],
    ///     "bounces": [{"mirror": 0, "point": [x, y], "distance": t, "incoming": [dx, dy], "reflected": [dx, dy]}, ...],
    ///     "termination": "escaped" // or "bounce_limit"
    /// }
    /// ```
    fn to_json(&self) -> serde_json::Value {
        let termination = match self.termination() {
            Termination::Escaped { .. } => "escaped",
            Termination::BudgetExhausted => "bounce_limit",
        };

        serde_json::json!({
            "points": self.points().to_json(),
            "bounces": self.bounces().to_json(),
            "termination": termination,
        })
    }
}

pub trait JsonDes {
    /// Deserialize from a JSON object.
    ///
    /// Returns an error if `json`'s format or values are invalid.
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>>
    where
        Self: Sized;
}

impl JsonDes for Mirror {
    /// Deserialize a new mirror from a JSON array.
    ///
    /// The JSON array must follow the following format:
    ///
    /// ```json
    /// [[x0, y0], [x1, y1]] // two distinct points
    /// ```
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let endpoints: Vec<Point> = map_json_array(json, |value| {
            json_to_point(value).ok_or_else(|| "invalid mirror endpoint".into())
        })?;

        let [start, end] = endpoints[..] else {
            return Err("a mirror must have exactly two endpoints".into());
        };

        Ok(Mirror::try_new(start, end)?)
    }
}

impl JsonDes for Ray {
    /// Deserialize a new ray from a JSON object.
    ///
    /// The JSON object must follow the following format:
    ///
    /// ```json
    /// {
    ///     "origin": [x, y],
    ///     "direction": [dx, dy], // must not be zero
    /// }
    /// ```
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let origin = json.get("origin").ok_or("Missing ray origin")?;
        let direction = json.get("direction").ok_or("Missing ray direction")?;

        let origin = json_to_point(origin).ok_or("Invalid ray origin")?;
        let direction = json_to_vector(direction).ok_or("Invalid ray direction")?;

        Ok(Ray::try_new(origin, direction).ok_or("ray direction must not be zero")?)
    }
}

impl JsonDes for Bounds {
    /// ```json
    /// {
    ///     "min": [x, y],
    ///     "max": [x, y],
    /// }
    /// ```
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let min = json
            .get("min")
            .and_then(json_to_point)
            .ok_or("Invalid or missing bounds minimum")?;

        let max = json
            .get("max")
            .and_then(json_to_point)
            .ok_or("Invalid or missing bounds maximum")?;

        Ok(Bounds::try_new(min, max).ok_or("bounds minimum must not exceed maximum")?)
    }
}

impl<T: JsonDes> JsonDes for Vec<T> {
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        map_json_array(json, T::from_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_mirror() {
        let mirror = Mirror::from_json(&json!([[0, 10], [10.5, 10]])).unwrap();
        assert_eq!(mirror, Mirror::new([0., 10.], [10.5, 10.]));
        assert_eq!(Mirror::from_json(&mirror.to_json()).unwrap(), mirror);
    }

    #[test]
    fn reject_bad_mirrors() {
        for bad in [
            json!([[1, 1], [1, 1]]),
            json!([[1, 1]]),
            json!([[1, 1], [2, 2], [3, 3]]),
            json!([[1, 1], [2, "a"]]),
            json!([[1, 1, 1], [2, 2]]),
            json!({"start": [0, 0]}),
        ] {
            assert!(Mirror::from_json(&bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn parse_ray() {
        let ray = Ray::from_json(&json!({"origin": [1, 2], "direction": [0, 3]})).unwrap();
        assert_eq!(ray.origin, Point::new(1., 2.));
        assert_eq!(ray.direction.into_inner(), Vector::new(0., 1.));

        assert!(Ray::from_json(&json!({"origin": [1, 2], "direction": [0, 0]})).is_err());
        assert!(Ray::from_json(&json!({"origin": [1, 2]})).is_err());
    }

    #[test]
    fn path_json() {
        let mirrors = [Mirror::new([0., 10.], [10., 10.])];
        let path = trace(Ray::new([5., 0.], [0., 1.]), &mirrors, 3).unwrap();
        let json = path.to_json();

        assert_eq!(json["termination"], "escaped");
        assert_eq!(json["points"].as_array().unwrap().len(), 3);
        assert_eq!(json["bounces"][0]["mirror"], 0);
        assert_eq!(json["bounces"][0]["point"], json!([5.0, 10.0]));
    }
}
