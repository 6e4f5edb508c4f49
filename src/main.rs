use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = tui_galaxy::config::Config::parse();
    tui_galaxy::logging::init_file(cfg.log_file.as_deref(), cfg.log_level)?;
    tui_galaxy::app::run(cfg)
}
