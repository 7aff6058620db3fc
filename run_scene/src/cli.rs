use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser)]
#[command(name = "run_scene")]
#[command(about = "Trace light rays bouncing between mirrors")]
pub struct Args {
    /// Scene file to simulate
    #[arg(default_value = "initial_conditions.json")]
    pub scene: PathBuf,

    /// Save an image of the traced paths (PNG), named after the current time if no path is given
    #[arg(short, long, value_name = "IMAGE")]
    pub image: Option<Option<PathBuf>>,

    /// Save an animation of the rays moving (GIF), named after the current time if no path is given
    #[arg(short = 'v', long = "video", value_name = "ANIMATION")]
    pub animation: Option<Option<PathBuf>>,

    /// Write the traced paths as JSON, to stdout if no path is given
    #[arg(long, value_name = "FILE")]
    pub json: Option<Option<PathBuf>>,

    /// Image width in pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "800")]
    pub height: u32,

    /// Line width in pixels
    #[arg(long, default_value = "1")]
    pub stroke_width: u32,

    /// Animation frames per second
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: u32,

    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Whether nothing but the paths JSON on stdout is requested, either explicitly or by default.
    pub fn json_to_stdout(&self) -> bool {
        matches!(self.json, Some(None))
            || (self.image.is_none() && self.animation.is_none() && self.json.is_none())
    }
}

/// `secs` since the Unix epoch as a `%Y%m%d-%H%M%S` UTC timestamp.
pub fn timestamp(secs: u64) -> String {
    let (days, secs) = (secs / 86_400, secs % 86_400);
    let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);

    // civil calendar from a day count, in 400 year eras starting on march 1st
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z % 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);

    format!("{year:04}{month:02}{day:02}-{hours:02}{minutes:02}{seconds:02}")
}

/// The path given with a flag, or `<current time>.<extension>` if the flag has no value.
pub fn output_path(flag: &Option<PathBuf>, extension: &str) -> PathBuf {
    flag.clone().unwrap_or_else(|| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        PathBuf::from(format!("{}.{extension}", timestamp(secs)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(["run_scene"].iter().chain(args)).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);

        assert_eq!(args.scene, PathBuf::from("initial_conditions.json"));
        assert!(args.image.is_none() && args.animation.is_none() && args.json.is_none());
        assert!(args.json_to_stdout());
        assert_eq!((args.width, args.height, args.fps), (800, 800, 10));
    }

    #[test]
    fn optional_output_paths() {
        let args = parse(&["scene.json", "-i", "-v", "out.gif"]);

        assert_eq!(args.scene, PathBuf::from("scene.json"));
        assert_eq!(args.image, Some(None));
        assert_eq!(args.animation, Some(Some(PathBuf::from("out.gif"))));
        assert!(!args.json_to_stdout());

        let named = output_path(&None, "png");
        let named = named.to_string_lossy();
        assert!(named.ends_with(".png"));
        assert_eq!(named.len(), "YYYYmmdd-HHMMSS.png".len());
        assert_eq!(output_path(&Some("a.png".into()), "png"), PathBuf::from("a.png"));
    }

    #[test]
    fn timestamps() {
        assert_eq!(timestamp(0), "19700101-000000");
        assert_eq!(timestamp(951_782_400), "20000229-000000");
        assert_eq!(timestamp(1_700_000_000), "20231114-221320");
        assert_eq!(timestamp(1_709_251_199), "20240229-235959");
    }

    #[test]
    fn json_flag() {
        assert!(parse(&["-i", "a.png", "--json"]).json_to_stdout());
        assert!(!parse(&["--json", "paths.json"]).json_to_stdout());
    }

    #[test]
    fn zero_fps_is_rejected() {
        assert!(Args::try_parse_from(["run_scene", "--fps", "0"]).is_err());
    }
}
