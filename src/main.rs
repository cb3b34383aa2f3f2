use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

mod cli;
mod logger;

use cli::Args;
use logger::init_logger;
use prismpath::camera::Camera;
use prismpath::image::RenderImage;
use prismpath::model::Model;
use prismpath::output;
use prismpath::random::Lfsr113;
use prismpath::scene::Scene;

/// Exit code reported after an interrupted render.
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    let args = Args::parse();

    init_logger(args.debug_level.into());

    // Log application startup with version information
    info!("prismpath - Git Version {} ({})", env!("GIT_HASH"), env!("GIT_DATE"));

    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let model = Model::load(args.model.as_ref())?;
    let iterations = args.iterations.unwrap_or(model.iterations).max(1);
    let output_path: PathBuf = args
        .output
        .clone()
        .unwrap_or_else(|| format!("{}.ppm", args.model))
        .into();

    let camera = Camera::new(model.view_position, model.view_direction, model.view_angle);
    let scene = Scene::new(
        model.sky_emission,
        model.ground_reflection,
        model.triangles,
        camera.position,
    );
    let mut image = RenderImage::new(model.width, model.height);

    info!(
        "Scene: {} triangles ({} emitters), image {}x{}, {} iterations",
        scene.triangle_count(),
        scene.emitter_count(),
        image.width(),
        image.height(),
        iterations
    );

    // A clean stop between iterations keeps the newest flush on disk
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst))?;
    }

    let render_start = std::time::Instant::now();
    let pb = ProgressBar::new(u64::from(iterations));
    pb.set_style(ProgressStyle::default_bar().template("{bar:40} {pos}/{len} ETA: {eta}")?);

    let mut random = Lfsr113::new();
    for frame in 1..=iterations {
        camera.frame(&scene, &mut random, &mut image);
        pb.inc(1);

        let stopping = interrupted.load(Ordering::SeqCst);
        if stopping || output::should_flush(frame, iterations) {
            output::save(&image, frame, &output_path)?;
        }
        if stopping {
            pb.abandon();
            warn!(
                "Interrupted after frame {}; image saved to {}",
                frame,
                output_path.display()
            );
            std::process::exit(EXIT_INTERRUPTED);
        }
    }
    pb.finish();

    info!(
        "Rendered {} iterations in {:.2?}, image saved to {}",
        iterations,
        render_start.elapsed(),
        output_path.display()
    );
    Ok(())
}
