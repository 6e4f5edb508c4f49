use crate::color::Rgb;
use crate::galaxy::{self, GalaxyParameters, JitterMode};
use crate::keyframes::DEFAULT_KEYFRAMES_PATH;
use crate::params_file;
use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "tui-galaxy", version, about = "Scroll-driven procedural galaxy for the terminal")]
pub struct Config {
    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Seed for the star generator; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = galaxy::DEFAULT_COUNT)]
    pub count: usize,

    #[arg(long, default_value_t = galaxy::DEFAULT_SIZE)]
    pub size: f32,

    #[arg(long, default_value_t = galaxy::DEFAULT_RADIUS)]
    pub radius: f32,

    #[arg(long, default_value_t = galaxy::DEFAULT_BRANCHES)]
    pub branches: u32,

    #[arg(long, default_value_t = galaxy::DEFAULT_SPIN, allow_hyphen_values = true)]
    pub spin: f32,

    #[arg(long, default_value_t = galaxy::DEFAULT_RANDOMNESS)]
    pub randomness: f32,

    #[arg(long, default_value_t = galaxy::DEFAULT_RANDOMNESS_POWER)]
    pub randomness_power: f32,

    #[arg(long, default_value = "#ff6030")]
    pub inside_color: Rgb,

    #[arg(long, default_value = "#1b3984")]
    pub outside_color: Rgb,

    /// Galaxy preset file (key=value); keys it names override the flags.
    #[arg(long)]
    pub params: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_KEYFRAMES_PATH)]
    pub keyframes: PathBuf,

    #[arg(long, value_enum, default_value_t = JitterMode::Reference)]
    pub jitter: JitterMode,

    /// Light added per star; stars overlap additively.
    #[arg(long, default_value_t = 0.35, allow_hyphen_values = true)]
    pub exposure: f32,

    /// Seconds the camera takes to catch up with the scroll position.
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    pub scrub: f32,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    #[value(alias = "hires", alias = "dots")]
    Braille,
}

impl RendererMode {
    /// Raster pixels per terminal cell (columns, rows).
    pub fn pixels_per_cell(self) -> (usize, usize) {
        match self {
            Self::Ascii => (1, 1),
            Self::HalfBlock => (1, 2),
            Self::Braille => (2, 4),
        }
    }

    /// Width / height of one raster pixel on screen, for a cell twice as tall
    /// as it is wide.
    pub fn pixel_aspect(self) -> f32 {
        let (cw, ch) = self.pixels_per_cell();
        (1.0 / cw as f32) / (2.0 / ch as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Config {
    /// Reject render settings that would leave a blank or frozen screen.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.fps == 0 {
            bail!("--fps must be >= 1");
        }
        if !self.exposure.is_finite() || self.exposure <= 0.0 {
            bail!("--exposure must be > 0 (got {})", self.exposure);
        }
        if !self.scrub.is_finite() || self.scrub < 0.0 {
            bail!("--scrub must be >= 0 (got {})", self.scrub);
        }
        Ok(())
    }

    /// Parameters from the flags, overlaid with the preset file when given.
    pub fn galaxy_parameters(&self) -> anyhow::Result<GalaxyParameters> {
        let from_flags = GalaxyParameters {
            count: self.count,
            size: self.size,
            radius: self.radius,
            branches: self.branches,
            spin: self.spin,
            randomness: self.randomness,
            randomness_power: self.randomness_power,
            inside_color: self.inside_color,
            outside_color: self.outside_color,
        };
        let params = match &self.params {
            Some(path) => params_file::load_params(path, &from_flags)
                .with_context(|| format!("load galaxy parameters from {}", path.display()))?,
            None => from_flags,
        };
        params.validate().context("galaxy parameters")?;
        Ok(params)
    }
}
