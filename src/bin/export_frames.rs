use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tui_galaxy::config::LogLevel;
use tui_galaxy::galaxy::{GalaxyParameters, JitterMode};
use tui_galaxy::keyframes::KeyframeDoc;
use tui_galaxy::params_file;
use tui_galaxy::raster::Raster;
use tui_galaxy::scene::{Scene, SceneOptions};

const DEFAULT_OUTPUT: &str = "frames";
const DEFAULT_SEED: u64 = 0x6A1A_2026;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "export_frames",
    version,
    about = "Headless scroll sweep through the galaxy, written as PPM frames"
)]
pub(crate) struct Cli {
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT)]
    pub(crate) out: PathBuf,

    #[arg(long, default_value_t = 480)]
    pub(crate) width: usize,

    #[arg(long, default_value_t = 270)]
    pub(crate) height: usize,

    #[arg(long, default_value_t = 120)]
    pub(crate) frames: usize,

    #[arg(long, default_value_t = 30)]
    pub(crate) fps: u32,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub(crate) seed: u64,

    #[arg(long)]
    pub(crate) count: Option<usize>,

    #[arg(long, value_name = "FILE")]
    pub(crate) params: Option<PathBuf>,

    #[arg(long, value_name = "JSON")]
    pub(crate) keyframes: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = JitterMode::Reference)]
    pub(crate) jitter: JitterMode,

    #[arg(long, default_value_t = 0.35)]
    pub(crate) exposure: f32,
}

pub(crate) fn validate_args(args: &Cli) -> Result<()> {
    if args.width == 0 {
        bail!("--width must be >= 1");
    }
    if args.height == 0 {
        bail!("--height must be >= 1");
    }
    if args.frames == 0 {
        bail!("--frames must be >= 1");
    }
    if args.fps == 0 {
        bail!("--fps must be >= 1");
    }
    if args.count == Some(0) {
        bail!("--count must be >= 1");
    }
    if !args.exposure.is_finite() || args.exposure <= 0.0 {
        bail!("--exposure must be > 0");
    }
    Ok(())
}

/// Scroll offset for frame `i`, evenly spread from the top to `max_offset`.
pub(crate) fn frame_offset(i: usize, frames: usize, max_offset: f32) -> f32 {
    if frames <= 1 {
        return 0.0;
    }
    max_offset * i as f32 / (frames - 1) as f32
}

pub(crate) fn write_ppm(out: &mut dyn Write, width: usize, height: usize, rgba: &[u8]) -> Result<()> {
    write!(out, "P6\n{width} {height}\n255\n")?;
    for px in rgba.chunks_exact(4).take(width * height) {
        out.write_all(&px[..3])?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    tui_galaxy::logging::init_stderr(LogLevel::Info)?;
    run(args)
}

pub(crate) fn run(args: Cli) -> Result<()> {
    validate_args(&args)?;

    let mut params = GalaxyParameters::default();
    if let Some(path) = &args.params {
        params = params_file::load_params(path, &params)
            .with_context(|| format!("load galaxy parameters from {}", path.display()))?;
    }
    if let Some(count) = args.count {
        params.count = count;
    }
    let keyframes = match &args.keyframes {
        Some(path) => KeyframeDoc::load(path)
            .with_context(|| format!("load keyframes from {}", path.display()))?,
        None => KeyframeDoc::empty(),
    };

    let mut scene = Scene::new(SceneOptions {
        params,
        jitter: args.jitter,
        seed: Some(args.seed),
        keyframes,
        aspect: args.width as f32 / args.height as f32,
        ..SceneOptions::default()
    })
    .context("generate initial galaxy")?;

    fs::create_dir_all(&args.out)
        .with_context(|| format!("create output directory {}", args.out.display()))?;

    let mut raster = Raster::new(args.width, args.height);
    let dt = 1.0 / args.fps as f32;
    let max_offset = scene.scroll().max_offset();
    let mut regenerations = 0u32;

    for i in 0..args.frames {
        scene
            .scroll_mut()
            .scroll_to(frame_offset(i, args.frames, max_offset));
        let report = scene.tick(dt);
        regenerations += report.regenerations;
        if let Some(err) = report.error {
            bail!("frame {i}: {err}");
        }
        scene.render(&mut raster, args.exposure);
        let path = frame_path(&args.out, i);
        let file = fs::File::create(&path)
            .with_context(|| format!("create frame {}", path.display()))?;
        let mut w = BufWriter::new(file);
        write_ppm(&mut w, args.width, args.height, raster.resolve())?;
        w.flush()?;
    }

    info!(
        frames = args.frames,
        regenerations,
        out = %args.out.display(),
        "export finished"
    );
    Ok(())
}

fn frame_path(dir: &Path, i: usize) -> PathBuf {
    dir.join(format!("frame_{i:05}.ppm"))
}
