//! Live parameter panel.
//!
//! Edits a draft copy of the galaxy parameters. Slider fields report a commit
//! only once the user stops nudging (finish change); discrete and color fields
//! commit on every change.

use crate::galaxy::{GalaxyError, GalaxyParameters};
use std::time::{Duration, Instant};

pub const FINISH_CHANGE_DELAY: Duration = Duration::from_millis(250);
const HUE_STEP_DEGREES: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    Count,
    Size,
    Radius,
    Branches,
    Spin,
    Randomness,
    RandomnessPower,
    InsideColor,
    OutsideColor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// `nudge` is the change per key press; values snap to `step`.
    Slider { min: f32, max: f32, step: f32, nudge: f32 },
    Discrete { min: u32, max: u32 },
    Color,
}

impl ParamField {
    pub const fn all() -> [Self; 9] {
        [
            Self::Count,
            Self::Size,
            Self::Radius,
            Self::Branches,
            Self::Spin,
            Self::Randomness,
            Self::RandomnessPower,
            Self::InsideColor,
            Self::OutsideColor,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Count => "Stars count",
            Self::Size => "Stars size",
            Self::Radius => "Galaxy radius",
            Self::Branches => "Galaxy branches",
            Self::Spin => "Galaxy spin angle",
            Self::Randomness => "Stars randomness",
            Self::RandomnessPower => "Stars randomness power",
            Self::InsideColor => "insideColor",
            Self::OutsideColor => "outsideColor",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::Count => FieldKind::Slider {
                min: 1000.0,
                max: 50000.0,
                step: 100.0,
                nudge: 1000.0,
            },
            Self::Size => FieldKind::Slider {
                min: 0.001,
                max: 0.1,
                step: 0.001,
                nudge: 0.001,
            },
            Self::Radius => FieldKind::Slider {
                min: 0.01,
                max: 20.0,
                step: 0.1,
                nudge: 0.1,
            },
            Self::Branches => FieldKind::Discrete { min: 3, max: 30 },
            Self::Spin => FieldKind::Slider {
                min: -1.0,
                max: 1.0,
                step: 0.0001,
                nudge: 0.01,
            },
            Self::Randomness => FieldKind::Slider {
                min: 0.0,
                max: 2.0,
                step: 0.001,
                nudge: 0.01,
            },
            Self::RandomnessPower => FieldKind::Slider {
                min: 1.0,
                max: 10.0,
                step: 0.001,
                nudge: 0.1,
            },
            Self::InsideColor | Self::OutsideColor => FieldKind::Color,
        }
    }

    pub fn commits_immediately(self) -> bool {
        !matches!(self.kind(), FieldKind::Slider { .. })
    }

    pub fn display(self, p: &GalaxyParameters) -> String {
        match self {
            Self::Count => p.count.to_string(),
            Self::Size => format!("{:.3}", p.size),
            Self::Radius => format!("{:.2}", p.radius),
            Self::Branches => p.branches.to_string(),
            Self::Spin => format!("{:.4}", p.spin),
            Self::Randomness => format!("{:.3}", p.randomness),
            Self::RandomnessPower => format!("{:.3}", p.randomness_power),
            Self::InsideColor => p.inside_color.to_hex(),
            Self::OutsideColor => p.outside_color.to_hex(),
        }
    }

    fn slider_value(self, p: &GalaxyParameters) -> f32 {
        match self {
            Self::Count => p.count as f32,
            Self::Size => p.size,
            Self::Radius => p.radius,
            Self::Spin => p.spin,
            Self::Randomness => p.randomness,
            Self::RandomnessPower => p.randomness_power,
            _ => 0.0,
        }
    }

    fn set_slider_value(self, p: &mut GalaxyParameters, v: f32) {
        match self {
            Self::Count => p.count = v.round() as usize,
            Self::Size => p.size = v,
            Self::Radius => p.radius = v,
            Self::Spin => p.spin = v,
            Self::Randomness => p.randomness = v,
            Self::RandomnessPower => p.randomness_power = v,
            _ => {}
        }
    }

    /// Apply one nudge in direction `dir` (+1/-1). Returns true when the
    /// value changed.
    pub fn nudge(self, p: &mut GalaxyParameters, dir: i32) -> bool {
        let before = *p;
        match self.kind() {
            FieldKind::Slider { min, max, step, nudge } => {
                let v = self.slider_value(p) + nudge * dir as f32;
                let snapped = min + ((v - min) / step).round() * step;
                self.set_slider_value(p, snapped.clamp(min, max));
            }
            FieldKind::Discrete { min, max } => {
                let v = p.branches as i64 + dir as i64;
                p.branches = v.clamp(min as i64, max as i64) as u32;
            }
            FieldKind::Color => {
                let degrees = HUE_STEP_DEGREES * dir as f32;
                match self {
                    Self::InsideColor => p.inside_color = p.inside_color.shift_hue(degrees),
                    _ => p.outside_color = p.outside_color.shift_hue(degrees),
                }
            }
        }
        *p != before
    }
}

#[derive(Debug, Clone)]
pub struct ParamPanel {
    pub open: bool,
    selected: usize,
    draft: GalaxyParameters,
    committed: GalaxyParameters,
    pending_since: Option<Instant>,
    last_error: Option<String>,
}

impl ParamPanel {
    pub fn new(params: GalaxyParameters) -> Self {
        Self {
            open: false,
            selected: 0,
            draft: params,
            committed: params,
            pending_since: None,
            last_error: None,
        }
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn selected(&self) -> ParamField {
        ParamField::all()[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % ParamField::all().len();
    }

    pub fn select_prev(&mut self) {
        let n = ParamField::all().len();
        self.selected = (self.selected + n - 1) % n;
    }

    pub fn draft(&self) -> &GalaxyParameters {
        &self.draft
    }

    pub fn has_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Nudge the selected field. Returns parameters to regenerate with when
    /// the field commits immediately.
    pub fn nudge(&mut self, dir: i32, now: Instant) -> Option<GalaxyParameters> {
        let field = self.selected();
        if !field.nudge(&mut self.draft, dir) {
            return None;
        }
        if field.commits_immediately() {
            return self.commit();
        }
        self.pending_since = Some(now);
        None
    }

    /// Finish-change for sliders: commit once no nudge arrived for
    /// [`FINISH_CHANGE_DELAY`].
    pub fn poll(&mut self, now: Instant) -> Option<GalaxyParameters> {
        let since = self.pending_since?;
        if now.saturating_duration_since(since) < FINISH_CHANGE_DELAY {
            return None;
        }
        self.commit()
    }

    pub fn commit(&mut self) -> Option<GalaxyParameters> {
        self.pending_since = None;
        if self.draft == self.committed {
            return None;
        }
        self.committed = self.draft;
        Some(self.draft)
    }

    /// The caller refused committed parameters; fall back to `current`.
    pub fn reject(&mut self, err: &GalaxyError, current: GalaxyParameters) {
        self.last_error = Some(err.to_string());
        self.draft = current;
        self.committed = current;
        self.pending_since = None;
    }

    pub fn accept(&mut self) {
        self.last_error = None;
    }

    /// Follow parameters changed elsewhere (scroll pipeline, file load)
    /// unless an edit is in flight.
    pub fn sync(&mut self, params: GalaxyParameters) {
        if self.pending_since.is_none() {
            self.draft = params;
            self.committed = params;
        }
    }

    pub fn text(&self) -> String {
        let mut s = String::from("Galaxy (↑/↓ select, ←/→ edit, enter apply, w save)\n");
        for (i, field) in ParamField::all().into_iter().enumerate() {
            let marker = if i == self.selected { '>' } else { ' ' };
            s.push_str(&format!(
                "{marker} {:<23} {:>9}\n",
                field.label(),
                field.display(&self.draft)
            ));
        }
        if self.pending_since.is_some() {
            s.push_str("  (pending)\n");
        }
        if let Some(err) = &self.last_error {
            s.push_str(&format!("  ! {err}\n"));
        }
        s
    }
}
