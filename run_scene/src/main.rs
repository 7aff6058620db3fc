use anyhow::{anyhow, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use reflectoray::{Float, Path, Termination};
use reflectoray_json::{serde_json, serialize_paths, ColoredRay, Scene};
use reflectoray_render::{image::Rgb, render_frames, render_still, save_gif, save_png, RenderOptions};
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path as FsPath,
};

mod cli;

use cli::{output_path, Args};

/// Two path segments closer than this are considered the same when looking for loops.
const LOOP_EPS: Float = 1e-6;

fn init_logger(level: log::LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn load_scene(path: &FsPath) -> anyhow::Result<Scene> {
    let file = File::open(path).with_context(|| format!("couldn't open {}", path.display()))?;

    Scene::from_reader(BufReader::new(file))
        .map_err(|e| anyhow!("invalid scene {}: {e}", path.display()))
}

/// Traces every ray of the scene, in order.
fn trace_all(scene: &Scene, rays: &[ColoredRay]) -> anyhow::Result<Vec<Path>> {
    let progress = ProgressBar::new(rays.len() as u64);
    progress.set_style(ProgressStyle::default_bar().template("{bar:40} {pos}/{len} ETA: {eta}")?);

    let mut paths = Vec::with_capacity(rays.len());

    for (i, colored) in rays.iter().enumerate() {
        let path = scene.trace(colored.ray)?;

        let termination = match path.termination() {
            Termination::Escaped { .. } => "escaped",
            Termination::BudgetExhausted => "reached the bounce limit",
        };
        debug!("ray {i} ({}): {} bounces, {termination}", colored.color, path.bounces().len());

        if let Some(index) = path.loop_index(LOOP_EPS) {
            info!("ray {i} is trapped in a loop, repeating from segment {index}");
        }

        paths.push(path);
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(paths)
}

fn write_json(json: &serde_json::Value, writer: impl Write) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, json)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logger(args.log_level.into());

    let scene = load_scene(&args.scene)?;
    let rays = scene.rays();

    info!(
        "{} mirrors, {} rays, up to {} bounces each",
        scene.mirrors.len(),
        rays.len(),
        scene.iterations,
    );

    let paths = trace_all(&scene, &rays)?;

    let escaped = paths.iter().filter(|path| path.escaped()).count();
    info!("{escaped} of {} rays escaped", paths.len());

    let colored_paths = Vec::from_iter(
        rays.iter()
            .zip(&paths)
            .map(|(colored, path)| (Rgb(colored.color.0), path)),
    );

    let options = RenderOptions {
        width: args.width,
        height: args.height,
        stroke_width: args.stroke_width,
        bounds: scene.bounds,
        ..RenderOptions::default()
    };

    if let Some(image) = &args.image {
        let image_path = output_path(image, "png");
        save_png(&render_still(&scene.mirrors, &colored_paths, &options), &image_path)
            .with_context(|| format!("couldn't save {}", image_path.display()))?;
    }

    if let Some(animation) = &args.animation {
        let animation_path = output_path(animation, "gif");
        let frames = render_frames(&scene.mirrors, &colored_paths, &options);

        if frames.len() > 1000 {
            warn!("encoding {} frames, this may take a while", frames.len());
        }

        save_gif(frames, args.fps, &animation_path)
            .with_context(|| format!("couldn't save {}", animation_path.display()))?;
    }

    let json = || serialize_paths(rays.iter().map(|colored| colored.color).zip(&paths));

    if let Some(Some(json_path)) = &args.json {
        let file = File::create(json_path)
            .with_context(|| format!("couldn't create {}", json_path.display()))?;
        write_json(&json(), file)?;
        info!("paths saved to {}", json_path.display());
    }

    if args.json_to_stdout() {
        write_json(&json(), io::stdout().lock())?;
    }

    Ok(())
}
