//! `key=value` galaxy preset files.
//!
//! ```text
//! # tui_galaxy parameters v1
//! count=50000
//! branches=5
//! inside_color=#ff6030
//! ```
//!
//! Keys that are absent keep the value of the base parameters passed to
//! [`parse_params`].

use crate::color::Rgb;
use crate::galaxy::GalaxyParameters;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsFileError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub fn parse_params(text: &str, base: &GalaxyParameters) -> Result<GalaxyParameters, ParamsFileError> {
    let mut params = *base;
    let mut seen: HashSet<String> = HashSet::new();

    for (line_idx, raw) in text.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| ParamsFileError::Parse {
            line: line_no,
            message: "expected <key>=<value>".to_string(),
        })?;
        let key = key.trim();
        let value = value.trim();
        if !seen.insert(key.to_string()) {
            return Err(ParamsFileError::Parse {
                line: line_no,
                message: format!("duplicate '{key}' field"),
            });
        }

        match key {
            "count" => params.count = parse_num(value, line_no, key)?,
            "size" => params.size = parse_num(value, line_no, key)?,
            "radius" => params.radius = parse_num(value, line_no, key)?,
            "branches" => params.branches = parse_num(value, line_no, key)?,
            "spin" => params.spin = parse_num(value, line_no, key)?,
            "randomness" => params.randomness = parse_num(value, line_no, key)?,
            "randomness_power" => params.randomness_power = parse_num(value, line_no, key)?,
            "inside_color" => params.inside_color = parse_color(value, line_no)?,
            "outside_color" => params.outside_color = parse_color(value, line_no)?,
            _ => {
                return Err(ParamsFileError::Parse {
                    line: line_no,
                    message: format!("unknown key '{key}'"),
                });
            }
        }
    }
    Ok(params)
}

/// Read a preset file on top of `base`.
pub fn load_params(path: &Path, base: &GalaxyParameters) -> Result<GalaxyParameters, ParamsFileError> {
    let text = std::fs::read_to_string(path).map_err(|e| ParamsFileError::Io(e.to_string()))?;
    parse_params(&text, base)
}

pub fn format_params(p: &GalaxyParameters) -> String {
    format!(
        "# tui_galaxy parameters v1\n\
         count={}\n\
         size={}\n\
         radius={}\n\
         branches={}\n\
         spin={}\n\
         randomness={}\n\
         randomness_power={}\n\
         inside_color={}\n\
         outside_color={}\n",
        p.count,
        p.size,
        p.radius,
        p.branches,
        p.spin,
        p.randomness,
        p.randomness_power,
        p.inside_color.to_hex(),
        p.outside_color.to_hex(),
    )
}

pub fn save_params(p: &GalaxyParameters, path: &Path) -> Result<(), ParamsFileError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ParamsFileError::Io(e.to_string()))?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, format_params(p)).map_err(|e| ParamsFileError::Io(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| ParamsFileError::Io(e.to_string()))
}

pub fn params_storage_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Some(PathBuf::from(xdg).join("tui_galaxy").join("galaxy.txt"));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("tui_galaxy")
            .join("galaxy.txt"),
    )
}

fn parse_num<T: std::str::FromStr>(raw: &str, line: usize, field: &str) -> Result<T, ParamsFileError> {
    raw.parse::<T>().map_err(|_| ParamsFileError::Parse {
        line,
        message: format!("invalid number for '{field}': {raw}"),
    })
}

fn parse_color(raw: &str, line: usize) -> Result<Rgb, ParamsFileError> {
    Rgb::from_hex(raw).map_err(|e| ParamsFileError::Parse {
        line,
        message: e.to_string(),
    })
}
