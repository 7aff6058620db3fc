use anyhow::Context;
use clap::Parser;
use log::info;
use reflectoray_json::{serde_json, JsonSer};
use reflectoray_random::{rand, random_scene};
use std::{
    fs::File,
    io::{BufWriter, Write},
};

mod cli;

use cli::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    let scene = random_scene(&mut rand::thread_rng(), args.num_mirrors, args.num_sources);

    let file = File::create(&args.file)
        .with_context(|| format!("couldn't create {}", args.file.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &scene.to_json())?;
    writer.flush()?;

    info!(
        "{} mirrors and {} rays written to {}",
        scene.mirrors.len(),
        scene.rays().len(),
        args.file.display(),
    );

    Ok(())
}
