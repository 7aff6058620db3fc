use super::*;

use std::io;

/// Upper bound on the number of headings an [`AngleRange`] may produce.
pub const MAX_ANGLES: usize = 1 << 16;

/// A point emitting rays in every heading of the scene's [`AngleRange`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Source {
    pub start: Point,
    pub color: Color,
}

impl JsonDes for Source {
    /// ```json
    /// {
    ///     "start": [x, y],
    ///     "color": "red" // optional, defaults to black
    /// }
    /// ```
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let start = json
            .get("start")
            .and_then(json_to_point)
            .ok_or("Invalid or missing source start")?;

        let color = json
            .get("color")
            .map(Color::from_json)
            .transpose()?
            .unwrap_or(Color::BLACK);

        Ok(Self { start, color })
    }
}

impl JsonSer for Source {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "start": self.start.to_json(),
            "color": self.color.to_json(),
        })
    }
}

/// Headings, in degrees, from `start` (inclusive) to `end` (exclusive), `step` apart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleRange {
    start: Float,
    end: Float,
    step: Float,
}

impl AngleRange {
    /// Returns `None` if a value isn't finite, if `step` is zero, or if the range would
    /// produce more than [`MAX_ANGLES`] headings.
    pub fn try_new(start: Float, end: Float, step: Float) -> Option<Self> {
        let range = Self { start, end, step };

        ([start, end, step].iter().all(|v| v.is_finite())
            && step != 0.0
            && range.len() <= MAX_ANGLES)
            .then_some(range)
    }

    #[inline]
    pub const fn start(&self) -> Float {
        self.start
    }

    #[inline]
    pub const fn end(&self) -> Float {
        self.end
    }

    #[inline]
    pub const fn step(&self) -> Float {
        self.step
    }

    /// Number of headings in this range.
    pub fn len(&self) -> usize {
        let n = ((self.end - self.start) / self.step).ceil();
        if n > 0.0 {
            n as usize
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Float> + '_ {
        (0..self.len()).map(|i| self.start + i as Float * self.step)
    }
}

impl JsonDes for AngleRange {
    /// ```json
    /// {"start": 0, "end": 360, "step": 15}
    /// ```
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let start = get_float(json, "start")?.ok_or("Missing angle range start")?;
        let end = get_float(json, "end")?.ok_or("Missing angle range end")?;
        let step = get_float(json, "step")?.unwrap_or(1.0);

        AngleRange::try_new(start, end, step).ok_or_else(|| {
            format!("angle step must be non-zero, and yield at most {MAX_ANGLES} angles").into()
        })
    }
}

impl JsonSer for AngleRange {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "start": self.start,
            "end": self.end,
            "step": self.step,
        })
    }
}

/// A ray, and the color it's drawn with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColoredRay {
    pub ray: Ray,
    pub color: Color,
}

impl JsonDes for ColoredRay {
    /// Same format as [`Ray::from_json`], with an optional `"color"` field.
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let ray = Ray::from_json(json)?;

        let color = json
            .get("color")
            .map(Color::from_json)
            .transpose()?
            .unwrap_or(Color::BLACK);

        Ok(Self { ray, color })
    }
}

impl JsonSer for ColoredRay {
    fn to_json(&self) -> serde_json::Value {
        let mut json = self.ray.to_json();
        json["color"] = self.color.to_json();
        json
    }
}

/// A validated simulation setup.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub mirrors: Vec<Mirror>,
    pub sources: Vec<Source>,
    pub angles: Option<AngleRange>,
    pub rays: Vec<ColoredRay>,
    /// Maximum number of reflections per ray, always positive
    pub iterations: i64,
    pub bounds: Option<Bounds>,
    pub escape_distance: Option<Float>,
}

impl Scene {
    /// Every ray of the scene: first a fan of rays per heading (one per source),
    /// then the explicitly listed rays.
    pub fn rays(&self) -> Vec<ColoredRay> {
        let fan = self.angles.iter().flat_map(|angles| {
            angles.iter().flat_map(|angle| {
                self.sources.iter().map(move |source| ColoredRay {
                    ray: Ray::from_angle(source.start, angle),
                    color: source.color,
                })
            })
        });

        fan.chain(self.rays.iter().copied()).collect()
    }

    pub fn tracer(&self) -> Tracer {
        let default = Tracer::default();

        Tracer {
            bounds: self.bounds,
            escape_distance: self.escape_distance.unwrap_or(default.escape_distance),
            ..default
        }
    }

    /// Traces `ray` through this scene's mirrors.
    ///
    /// # Errors
    ///
    /// Only if the scene was built by hand, with no mirrors or a non-positive iteration count.
    pub fn trace(&self, ray: Ray) -> Result<Path, ConfigurationError> {
        self.tracer().trace(ray, &self.mirrors, self.iterations)
    }

    pub fn from_reader(reader: impl io::Read) -> Result<Self, Box<dyn Error>> {
        let json: serde_json::Value = serde_json::from_reader(reader)?;
        Self::from_json(&json)
    }
}

impl JsonDes for Scene {
    /// Deserialize a new scene from a JSON object.
    ///
    /// The JSON object must follow the following format:
    ///
    /// ```json
    /// {
    ///     "mirrors": [[[x0, y0], [x1, y1]], ...], // at least one
    ///     "iterations": 50, // positive
    ///     "sources": [{"start": [x, y], "color": "red"}, ...], // optional, requires "angles"
    ///     "angles": {"start": 0, "end": 360, "step": 15}, // optional
    ///     "rays": [{"origin": [x, y], "direction": [dx, dy], "color": "#00ff00"}, ...], // optional
    ///     "bounds": {"min": [x, y], "max": [x, y]}, // optional
    ///     "escape_distance": 1000.0 // optional, positive
    /// }
    /// ```
    ///
    /// The scene must have at least one ray.
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let mirrors: Vec<Mirror> = map_json_array(
            json.get("mirrors").ok_or("mirrors field expected")?,
            |value| {
                Mirror::from_json(value)
                    .map_err(|e| format!("invalid mirror {value}: {e}").into())
            },
        )?;

        if mirrors.is_empty() {
            return Err(ConfigurationError::NoMirrors.into());
        }

        let iterations = json
            .get("iterations")
            .ok_or("iterations field expected")?
            .as_i64()
            .ok_or("iterations must be an integer")?;

        if iterations <= 0 {
            return Err(ConfigurationError::InvalidBounceLimit(iterations).into());
        }

        let sources = json
            .get("sources")
            .map(Vec::<Source>::from_json)
            .transpose()?
            .unwrap_or_default();

        let angles = json.get("angles").map(AngleRange::from_json).transpose()?;

        if !sources.is_empty() && angles.is_none() {
            return Err("sources require an angles field".into());
        }

        let rays = json
            .get("rays")
            .map(Vec::<ColoredRay>::from_json)
            .transpose()?
            .unwrap_or_default();

        let bounds = json.get("bounds").map(Bounds::from_json).transpose()?;

        let escape_distance = get_float(json, "escape_distance")?;

        if escape_distance.is_some_and(|d| d <= 0.0) {
            return Err("escape_distance must be positive".into());
        }

        let scene = Self {
            mirrors,
            sources,
            angles,
            rays,
            iterations,
            bounds,
            escape_distance,
        };

        if scene.rays().is_empty() {
            return Err("the scene doesn't emit any ray".into());
        }

        log::debug!(
            "loaded scene: {} mirror(s), {} source(s), {} ray(s) in total, {} iteration(s)",
            scene.mirrors.len(),
            scene.sources.len(),
            scene.rays().len(),
            scene.iterations,
        );

        Ok(scene)
    }
}

impl JsonSer for Scene {
    fn to_json(&self) -> serde_json::Value {
        let mut json = serde_json::json!({
            "mirrors": self.mirrors.to_json(),
            "iterations": self.iterations,
        });

        if !self.sources.is_empty() {
            json["sources"] = self.sources.to_json();
        }
        if let Some(angles) = &self.angles {
            json["angles"] = angles.to_json();
        }
        if !self.rays.is_empty() {
            json["rays"] = self.rays.to_json();
        }
        if let Some(bounds) = &self.bounds {
            json["bounds"] = bounds.to_json();
        }
        if let Some(d) = self.escape_distance {
            json["escape_distance"] = d.into();
        }

        json
    }
}

/// The traced paths of a scene, along with the color of each ray.
///
/// ```json
/// {
///     "paths": [{"color": "#ff0000", "points": [...], "bounces": [...], "termination": "escaped"}, ...]
/// }
/// ```
pub fn serialize_paths<'a>(
    paths: impl IntoIterator<Item = (Color, &'a Path)>,
) -> serde_json::Value {
    let paths = Vec::from_iter(paths.into_iter().map(|(color, path)| {
        let mut json = path.to_json();
        json["color"] = color.to_json();
        json
    }));

    serde_json::json!({ "paths": paths })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_scene() -> serde_json::Value {
        json!({
            "mirrors": [
                [[-100, 100], [100, 100]],
                [[-100, -100], [100, -100]]
            ],
            "sources": [
                {"start": [0, 0], "color": "red"},
                {"start": [10, 0], "color": "blue"}
            ],
            "angles": {"start": 30, "end": 90, "step": 30},
            "iterations": 20
        })
    }

    #[test]
    fn load_sample_scene() {
        let scene = Scene::from_json(&sample_scene()).unwrap();

        assert_eq!(scene.mirrors.len(), 2);
        assert_eq!(scene.iterations, 20);

        let rays = scene.rays();
        assert_eq!(rays.len(), 4);

        // angles outer, sources inner
        assert_eq!(rays[0].color, Color([255, 0, 0]));
        assert_eq!(rays[1].color, Color([0, 0, 255]));
        assert_eq!(rays[1].ray.origin, Point::new(10., 0.));

        let expected = Ray::from_angle([0., 0.], 60.);
        assert!((rays[2].ray.direction.into_inner() - expected.direction.into_inner()).norm() < 1e-12);
    }

    #[test]
    fn round_trip() {
        let mut json = sample_scene();
        json["rays"] = json!([{"origin": [0, 1], "direction": [1, 0], "color": "#00ff00"}]);
        json["bounds"] = json!({"min": [-200, -200], "max": [200, 200]});
        json["escape_distance"] = json!(50.0);

        let scene = Scene::from_json(&json).unwrap();
        assert_eq!(Scene::from_json(&scene.to_json()).unwrap(), scene);
    }

    #[test]
    fn from_reader() {
        let text = sample_scene().to_string();
        let scene = Scene::from_reader(text.as_bytes()).unwrap();
        assert_eq!(scene.rays().len(), 4);
    }

    #[test]
    fn angle_ranges_are_half_open() {
        let range = AngleRange::try_new(0., 360., 90.).unwrap();
        assert_eq!(range.iter().collect::<Vec<_>>(), [0., 90., 180., 270.]);

        let down = AngleRange::try_new(90., 0., -45.).unwrap();
        assert_eq!(down.iter().collect::<Vec<_>>(), [90., 45.]);

        assert!(AngleRange::try_new(0., 10., 20.).unwrap().iter().eq([0.]));
        assert!(AngleRange::try_new(10., 0., 1.).unwrap().is_empty());
        assert!(AngleRange::try_new(0., 10., 0.).is_none());
        assert!(AngleRange::try_new(0., 1e9, 1e-3).is_none());
    }

    #[test]
    fn validation_errors() {
        let cases: [(&str, serde_json::Value); 8] = [
            ("mirrors", json!([])),
            ("mirrors", json!([[[1, 1], [1, 1]]])),
            ("iterations", json!(0)),
            ("iterations", json!(-3)),
            ("iterations", json!(2.5)),
            ("angles", json!({"start": 0, "end": 10, "step": 0})),
            ("escape_distance", json!(-1)),
            ("bounds", json!({"min": [1, 1], "max": [0, 0]})),
        ];

        for (key, value) in cases {
            let mut json = sample_scene();
            json[key] = value;
            assert!(Scene::from_json(&json).is_err(), "{key} = {} should be rejected", json[key]);
        }
    }

    #[test]
    fn sources_need_angles() {
        let mut json = sample_scene();
        json.as_object_mut().unwrap().remove("angles");
        assert!(Scene::from_json(&json).is_err());
    }

    #[test]
    fn scene_without_rays() {
        let json = json!({
            "mirrors": [[[0, 0], [1, 0]]],
            "iterations": 3
        });
        assert!(Scene::from_json(&json).is_err());
    }

    #[test]
    fn trace_a_loaded_scene() {
        let scene = Scene::from_json(&json!({
            "mirrors": [[[0, 10], [10, 10]]],
            "rays": [{"origin": [5, 0], "direction": [0, 1]}],
            "iterations": 1
        }))
        .unwrap();

        let [colored] = scene.rays()[..] else {
            panic!("expected a single ray")
        };
        assert_eq!(colored.color, Color::BLACK);

        let path = scene.trace(colored.ray).unwrap();
        assert_eq!(path.points(), [Point::new(5., 0.), Point::new(5., 10.)]);
    }

    #[test]
    fn serialized_paths_carry_colors() {
        let scene = Scene::from_json(&sample_scene()).unwrap();
        let traced: Vec<_> = scene
            .rays()
            .into_iter()
            .map(|r| (r.color, scene.trace(r.ray).unwrap()))
            .collect();

        let json = serialize_paths(traced.iter().map(|(c, p)| (*c, p)));
        let paths = json["paths"].as_array().unwrap();

        assert_eq!(paths.len(), 4);
        assert_eq!(paths[0]["color"], "#ff0000");
        // at 30°, the ray passes beside the top mirror
        assert_eq!(paths[0]["termination"], "escaped");
        assert_eq!(paths[0]["points"].as_array().unwrap().len(), 2);
    }
}
