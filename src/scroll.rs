//! Scroll-driven camera timelines.
//!
//! The page is modelled as a stack of viewport-height sections. Scroll offset
//! is measured in viewports from the top of the page. Each animated section
//! maps the offset to a raw progress in `0..=1`; its timeline follows that
//! progress through a scrub lag, and every change of raw progress is reported
//! so callers can derive galaxy parameters from it.

use crate::camera::{CameraPose, CameraRig};
use crate::galaxy::GalaxyParameters;
use glam::Vec3;
use std::f32::consts::TAU;

pub const PAGE_SECTIONS: usize = 3;
pub const DEFAULT_SCRUB_SECONDS: f32 = 1.0;
const SCRUB_SETTLE: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionId {
    First,
    Second,
}

impl SectionId {
    pub fn label(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenTarget {
    CameraPosition,
    RigRotation,
}

/// A linear fromTo tween spanning the whole timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub target: TweenTarget,
    pub from: Vec3,
    pub to: Vec3,
}

impl Tween {
    pub fn value_at(&self, progress: f32) -> Vec3 {
        self.from.lerp(self.to, progress.clamp(0.0, 1.0))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    tweens: Vec<Tween>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_to(mut self, target: TweenTarget, from: Vec3, to: Vec3) -> Self {
        self.tweens.push(Tween { target, from, to });
        self
    }

    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    pub fn apply(&self, progress: f32, pose: &mut CameraPose) {
        for tween in &self.tweens {
            let v = tween.value_at(progress);
            match tween.target {
                TweenTarget::CameraPosition => pose.position = v,
                TweenTarget::RigRotation => pose.rotation = v,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrollSection {
    pub id: SectionId,
    /// Offset where progress starts (section top at viewport top).
    pub start: f32,
    /// Offset where progress ends (section bottom at viewport top).
    pub end: f32,
    pub timeline: Timeline,
    pub scrub_seconds: f32,
    raw: f32,
    applied: f32,
}

impl ScrollSection {
    pub fn new(id: SectionId, start: f32, end: f32, timeline: Timeline) -> Self {
        Self {
            id,
            start,
            end,
            timeline,
            scrub_seconds: DEFAULT_SCRUB_SECONDS,
            raw: 0.0,
            applied: 0.0,
        }
    }

    pub fn progress(&self) -> f32 {
        self.raw
    }

    pub fn applied_progress(&self) -> f32 {
        self.applied
    }

    /// Move the applied progress toward the raw progress. Returns true when it
    /// moved.
    fn advance_scrub(&mut self, dt: f32) -> bool {
        let gap = self.raw - self.applied;
        if gap == 0.0 {
            return false;
        }
        if self.scrub_seconds <= 0.0 || gap.abs() < SCRUB_SETTLE {
            self.applied = self.raw;
            return true;
        }
        // ~99% of the gap closes within `scrub_seconds`.
        let k = 1.0 - (-dt.max(0.0) * 4.6 / self.scrub_seconds).exp();
        self.applied += gap * k;
        if (self.raw - self.applied).abs() < SCRUB_SETTLE {
            self.applied = self.raw;
        }
        true
    }
}

/// Progress of a section spanning `start..end` at scroll `offset`.
pub fn section_progress(offset: f32, start: f32, end: f32) -> f32 {
    let span = end - start;
    if span <= 0.0 {
        return if offset >= end { 1.0 } else { 0.0 };
    }
    ((offset - start) / span).clamp(0.0, 1.0)
}

/// Raw progress change of one section during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionUpdate {
    pub section: SectionId,
    pub progress: f32,
}

#[derive(Debug, Clone)]
pub struct ScrollDriver {
    sections: Vec<ScrollSection>,
    offset: f32,
    max_offset: f32,
}

impl ScrollDriver {
    pub fn new(sections: Vec<ScrollSection>, page_sections: usize) -> Self {
        Self {
            sections,
            offset: 0.0,
            max_offset: page_sections.saturating_sub(1) as f32,
        }
    }

    /// Intro camera sweep over the first section, then the dive through the
    /// galaxy plane over the second; a trailing section lets the second one
    /// scroll fully past.
    pub fn galaxy_page() -> Self {
        let first = Timeline::new()
            .from_to(
                TweenTarget::CameraPosition,
                Vec3::new(0.1, 0.1, 0.1),
                Vec3::new(0.1, 5.0, 0.01),
            )
            .from_to(
                TweenTarget::RigRotation,
                Vec3::ZERO,
                Vec3::new(0.0, TAU, 0.0),
            );
        let second = Timeline::new()
            .from_to(
                TweenTarget::CameraPosition,
                Vec3::new(0.1, 5.0, 0.01),
                Vec3::new(2.0, -9.0, 2.0),
            )
            .from_to(
                TweenTarget::RigRotation,
                Vec3::new(0.0, TAU, 0.0),
                Vec3::new(0.0, 2.0 * TAU, 0.0),
            );
        Self::new(
            vec![
                ScrollSection::new(SectionId::First, 0.0, 1.0, first),
                ScrollSection::new(SectionId::Second, 1.0, 2.0, second),
            ],
            PAGE_SECTIONS,
        )
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn max_offset(&self) -> f32 {
        self.max_offset
    }

    pub fn sections(&self) -> &[ScrollSection] {
        &self.sections
    }

    pub fn section(&self, id: SectionId) -> Option<&ScrollSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn set_scrub_seconds(&mut self, seconds: f32) {
        for s in &mut self.sections {
            s.scrub_seconds = seconds.max(0.0);
        }
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll_to(self.offset + delta);
    }

    pub fn scroll_to(&mut self, offset: f32) {
        if offset.is_finite() {
            self.offset = offset.clamp(0.0, self.max_offset);
        }
    }

    /// Refresh raw progress from the current offset, advance scrub lag by
    /// `dt` seconds and write moved timelines into `rig`. Sections are applied
    /// in page order so a later section overrides an earlier one.
    pub fn tick(&mut self, dt: f32, rig: &mut CameraRig) -> Vec<SectionUpdate> {
        let mut updates = Vec::new();
        for s in &mut self.sections {
            let raw = section_progress(self.offset, s.start, s.end);
            if raw != s.raw {
                s.raw = raw;
                updates.push(SectionUpdate {
                    section: s.id,
                    progress: raw,
                });
            }
        }

        let mut pose = rig.pose;
        let mut touched = false;
        for s in &mut self.sections {
            if s.advance_scrub(dt) {
                s.timeline.apply(s.applied, &mut pose);
                touched = true;
            }
        }
        // A later section that has started keeps ownership of the pose while an
        // earlier one is still settling; back at the top the first one owns it.
        if touched {
            let owner = self
                .sections
                .iter()
                .rev()
                .find(|s| s.applied > 0.0)
                .or_else(|| self.sections.first());
            if let Some(owner) = owner {
                owner.timeline.apply(owner.applied, &mut pose);
            }
            rig.set_pose(pose);
        }
        updates
    }

    pub fn is_settled(&self) -> bool {
        self.sections.iter().all(|s| s.raw == s.applied)
    }
}

/// Galaxy parameters driven by the second section's progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedParameters {
    pub branches: u32,
    pub randomness_power: f32,
}

impl DerivedParameters {
    pub fn apply_to(self, base: &GalaxyParameters) -> GalaxyParameters {
        GalaxyParameters {
            branches: self.branches,
            randomness_power: self.randomness_power,
            ..*base
        }
    }
}

/// `branches = ceil(p*10 + 2)` (3 at p = 0), `randomness_power = ceil(p*10 + 3)`.
pub fn derive_from_progress(progress: f32) -> DerivedParameters {
    // f32 throughout: exact tenths scale to whole numbers before `ceil`.
    let p = progress.clamp(0.0, 1.0);
    let raw_branches = p * 10.0 + 2.0;
    let branches = if raw_branches == 2.0 { 3.0 } else { raw_branches.ceil() };
    DerivedParameters {
        branches: branches as u32,
        randomness_power: (p * 10.0 + 3.0).ceil(),
    }
}

pub fn derive_parameters(progress: f32, base: &GalaxyParameters) -> GalaxyParameters {
    derive_from_progress(progress).apply_to(base)
}
