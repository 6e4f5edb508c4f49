//! Camera keyframe state file.
//!
//! The file belongs to an external animation-authoring tool. It is held as an
//! opaque JSON document: only the camera object's static overrides and its
//! keyframed tracks are read, and saving writes back the document with just
//! the edited override values changed.

use crate::camera::CameraPose;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::f32::consts::TAU;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_KEYFRAMES_PATH: &str = "static/theatre-animations/first-section-camera.json";
pub const DEFAULT_SHEET: &str = "Sheet";
pub const DEFAULT_OBJECT: &str = "Galaxy";
pub const POSITION_RANGE: (f32, f32) = (-20.0, 20.0);
pub const ROTATION_RANGE: (f32, f32) = (-TAU, TAU);

#[derive(Debug, Error)]
pub enum KeyframeError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("keyframe file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("keyframe document root must be a JSON object")]
    NotAnObject,
}

/// One scalar channel of a [`CameraPose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseProp {
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
}

impl PoseProp {
    pub const fn all() -> [Self; 6] {
        [
            Self::PositionX,
            Self::PositionY,
            Self::PositionZ,
            Self::RotationX,
            Self::RotationY,
            Self::RotationZ,
        ]
    }

    pub fn group(self) -> &'static str {
        match self {
            Self::PositionX | Self::PositionY | Self::PositionZ => "position",
            _ => "rotation",
        }
    }

    pub fn axis(self) -> &'static str {
        match self {
            Self::PositionX | Self::RotationX => "x",
            Self::PositionY | Self::RotationY => "y",
            Self::PositionZ | Self::RotationZ => "z",
        }
    }

    pub fn label(self) -> String {
        format!("{}.{}", self.group(), self.axis())
    }

    pub fn range(self) -> (f32, f32) {
        match self.group() {
            "position" => POSITION_RANGE,
            _ => ROTATION_RANGE,
        }
    }

    pub fn clamp(self, v: f32) -> f32 {
        let (lo, hi) = self.range();
        v.clamp(lo, hi)
    }

    pub fn get(self, pose: &CameraPose) -> f32 {
        match self {
            Self::PositionX => pose.position.x,
            Self::PositionY => pose.position.y,
            Self::PositionZ => pose.position.z,
            Self::RotationX => pose.rotation.x,
            Self::RotationY => pose.rotation.y,
            Self::RotationZ => pose.rotation.z,
        }
    }

    pub fn set(self, pose: &mut CameraPose, v: f32) {
        let v = self.clamp(v);
        match self {
            Self::PositionX => pose.position.x = v,
            Self::PositionY => pose.position.y = v,
            Self::PositionZ => pose.position.z = v,
            Self::RotationX => pose.rotation.x = v,
            Self::RotationY => pose.rotation.y = v,
            Self::RotationZ => pose.rotation.z = v,
        }
    }

    fn from_path(path: &[String]) -> Option<Self> {
        match path {
            [group, axis] => Self::all()
                .into_iter()
                .find(|p| p.group() == group && p.axis() == axis),
            _ => None,
        }
    }

    fn next(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|p| *p == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    pub position: f32,
    pub value: f32,
    #[serde(default = "default_connected")]
    pub connected_right: bool,
}

fn default_connected() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawTrack {
    #[serde(default)]
    keyframes: Vec<Keyframe>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropTrack {
    pub prop: PoseProp,
    pub keyframes: Vec<Keyframe>,
}

impl PropTrack {
    /// Value at sequence time `t`: linear between connected keyframes, held
    /// otherwise, clamped to the first/last keyframe outside the track.
    pub fn sample(&self, t: f32) -> Option<f32> {
        let first = self.keyframes.first()?;
        if t <= first.position {
            return Some(first.value);
        }
        for pair in self.keyframes.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t < b.position {
                if !a.connected_right || b.position <= a.position {
                    return Some(a.value);
                }
                let u = (t - a.position) / (b.position - a.position);
                return Some(a.value + (b.value - a.value) * u);
            }
        }
        self.keyframes.last().map(|k| k.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub length: f32,
    pub tracks: Vec<PropTrack>,
}

impl Sequence {
    /// `base` with every tracked channel replaced by its sampled value.
    pub fn sample(&self, t: f32, base: CameraPose) -> CameraPose {
        let mut pose = base;
        for track in &self.tracks {
            if let Some(v) = track.sample(t) {
                track.prop.set(&mut pose, v);
            }
        }
        pose
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeDoc {
    root: Value,
    sheet: String,
    object: String,
}

impl KeyframeDoc {
    pub fn empty() -> Self {
        Self {
            root: Value::Object(Map::new()),
            sheet: DEFAULT_SHEET.to_string(),
            object: DEFAULT_OBJECT.to_string(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, KeyframeError> {
        let root: Value = serde_json::from_str(text)?;
        if !root.is_object() {
            return Err(KeyframeError::NotAnObject);
        }
        Ok(Self {
            root,
            ..Self::empty()
        })
    }

    /// Load `path`; a missing file yields an empty document.
    pub fn load(path: &Path) -> Result<Self, KeyframeError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "keyframe file not found; using defaults");
                Ok(Self::empty())
            }
            Err(source) => Err(KeyframeError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), KeyframeError> {
        let io = |source| KeyframeError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io)?;
        }
        let body = self.to_json_string()?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, body).map_err(io)?;
        std::fs::rename(&tmp, path).map_err(io)
    }

    pub fn to_json_string(&self) -> Result<String, KeyframeError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    fn sheet_value(&self) -> Option<&Value> {
        self.root.get("sheetsById")?.get(&self.sheet)
    }

    /// `fallback` with every channel present in the static overrides replaced
    /// (and clamped to its range).
    pub fn static_pose(&self, fallback: CameraPose) -> CameraPose {
        let mut pose = fallback;
        let Some(obj) = self
            .sheet_value()
            .and_then(|s| s.get("staticOverrides"))
            .and_then(|s| s.get("byObject"))
            .and_then(|s| s.get(&self.object))
        else {
            return pose;
        };
        for prop in PoseProp::all() {
            if let Some(v) = obj
                .get(prop.group())
                .and_then(|g| g.get(prop.axis()))
                .and_then(Value::as_f64)
            {
                prop.set(&mut pose, v as f32);
            }
        }
        pose
    }

    /// Write `pose` into the static overrides, clamped to each channel's
    /// range, creating the path as needed.
    pub fn set_static_pose(&mut self, pose: &CameraPose) {
        let obj = object_at(
            &mut self.root,
            &[
                "sheetsById",
                self.sheet.as_str(),
                "staticOverrides",
                "byObject",
                self.object.as_str(),
            ],
        );
        for prop in PoseProp::all() {
            let group = ensure_object(obj.entry(prop.group()).or_insert(Value::Null));
            let v = prop.clamp(prop.get(pose));
            group.insert(prop.axis().to_string(), Value::from(v as f64));
        }
    }

    pub fn sequence(&self) -> Option<Sequence> {
        let seq = self.sheet_value()?.get("sequence")?;
        let length = seq.get("length").and_then(Value::as_f64).unwrap_or(10.0) as f32;
        let tracks_obj = seq.get("tracksByObject")?.get(&self.object)?;
        let ids = tracks_obj.get("trackIdByPropPath")?.as_object()?;
        let data = tracks_obj.get("trackData")?;

        let mut tracks = Vec::new();
        for (path_key, id) in ids {
            let Ok(path) = serde_json::from_str::<Vec<String>>(path_key) else {
                continue;
            };
            let Some(prop) = PoseProp::from_path(&path) else {
                continue;
            };
            let Some(raw) = id.as_str().and_then(|id| data.get(id)) else {
                continue;
            };
            match RawTrack::deserialize(raw) {
                Ok(track) if !track.keyframes.is_empty() => {
                    let mut keyframes = track.keyframes;
                    keyframes.sort_by(|a, b| a.position.total_cmp(&b.position));
                    tracks.push(PropTrack { prop, keyframes });
                }
                Ok(_) => {}
                Err(err) => warn!(track = %path_key, %err, "skipping malformed keyframe track"),
            }
        }
        if tracks.is_empty() {
            return None;
        }
        Some(Sequence {
            length: length.max(f32::EPSILON),
            tracks,
        })
    }
}

fn ensure_object(v: &mut Value) -> &mut Map<String, Value> {
    if !v.is_object() {
        *v = Value::Object(Map::new());
    }
    match v {
        Value::Object(map) => map,
        _ => unreachable!("replaced with an object above"),
    }
}

fn object_at<'a>(root: &'a mut Value, path: &[&str]) -> &'a mut Map<String, Value> {
    let mut map = ensure_object(root);
    for key in path {
        map = ensure_object(map.entry(key.to_string()).or_insert(Value::Null));
    }
    map
}

/// Live editor over the camera pose; every change yields the new pose.
#[derive(Debug, Clone)]
pub struct PoseEditor {
    pub open: bool,
    selected: PoseProp,
    dirty: bool,
}

impl Default for PoseEditor {
    fn default() -> Self {
        Self {
            open: false,
            selected: PoseProp::PositionX,
            dirty: false,
        }
    }
}

impl PoseEditor {
    pub fn selected(&self) -> PoseProp {
        self.selected
    }

    pub fn select_next(&mut self) {
        self.selected = self.selected.next();
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn nudge(&mut self, pose: &CameraPose, dir: f32) -> CameraPose {
        let step = match self.selected.group() {
            "position" => 0.1,
            _ => TAU / 120.0,
        };
        let mut next = *pose;
        let v = self.selected.get(pose) + step * dir;
        self.selected.set(&mut next, v);
        if next != *pose {
            self.dirty = true;
        }
        next
    }

    pub fn text(&self, pose: &CameraPose) -> String {
        let mut s = String::from("Keyframes (tab select, ←/→ edit, s save)\n");
        for prop in PoseProp::all() {
            let marker = if prop == self.selected { '>' } else { ' ' };
            s.push_str(&format!("{marker} {:<10} {:>8.3}\n", prop.label(), prop.get(pose)));
        }
        if self.dirty {
            s.push_str("  (unsaved)\n");
        }
        s
    }
}
