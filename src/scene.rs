//! The galaxy scene: one visual, one camera rig, the scroll timelines and the
//! keyframe state, advanced by a scheduler-neutral [`Scene::tick`].

use crate::camera::{CameraPose, CameraRig};
use crate::galaxy::{GalaxyError, GalaxyParameters, JitterMode};
use crate::keyframes::{KeyframeDoc, Sequence};
use crate::raster::Raster;
use crate::scroll::{derive_parameters, ScrollDriver, SectionId, DEFAULT_SCRUB_SECONDS};
use crate::visual::GalaxyVisual;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct SceneOptions {
    pub params: GalaxyParameters,
    pub jitter: JitterMode,
    pub seed: Option<u64>,
    pub keyframes: KeyframeDoc,
    pub scrub_seconds: f32,
    pub aspect: f32,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            params: GalaxyParameters::default(),
            jitter: JitterMode::Reference,
            seed: None,
            keyframes: KeyframeDoc::empty(),
            scrub_seconds: DEFAULT_SCRUB_SECONDS,
            aspect: 1.0,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    pub regenerations: u32,
    pub error: Option<GalaxyError>,
}

pub struct Scene {
    rng: fastrand::Rng,
    visual: GalaxyVisual,
    rig: CameraRig,
    scroll: ScrollDriver,
    keyframes: KeyframeDoc,
    sequence: Option<Sequence>,
    playhead: Option<f32>,
}

impl Scene {
    pub fn new(opts: SceneOptions) -> Result<Self, GalaxyError> {
        let mut rng = match opts.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let visual = GalaxyVisual::new(opts.params, opts.jitter, &mut rng)?;

        let mut rig = CameraRig::new(opts.aspect);
        rig.set_pose(opts.keyframes.static_pose(CameraPose::default()));
        rig.look_at(visual.cloud().origin());

        let mut scroll = ScrollDriver::galaxy_page();
        scroll.set_scrub_seconds(opts.scrub_seconds);

        Ok(Self {
            rng,
            visual,
            rig,
            scroll,
            sequence: opts.keyframes.sequence(),
            keyframes: opts.keyframes,
            playhead: None,
        })
    }

    /// Advance by `dt` seconds: scroll timelines (regenerating the galaxy on
    /// every second-section update), keyframe playback, then re-aim the camera
    /// at the cloud.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let mut report = TickReport::default();

        for update in self.scroll.tick(dt, &mut self.rig) {
            if update.section != SectionId::Second {
                continue;
            }
            let params = derive_parameters(update.progress, self.visual.params());
            match self.visual.regenerate(params, &mut self.rng) {
                Ok(()) => report.regenerations += 1,
                Err(err) => {
                    warn!(%err, progress = update.progress, "scroll-derived parameters rejected");
                    report.error = Some(err);
                }
            }
        }

        if let (Some(t), Some(seq)) = (self.playhead.as_mut(), self.sequence.as_ref()) {
            *t = (*t + dt).rem_euclid(seq.length);
            let pose = seq.sample(*t, self.rig.pose);
            self.rig.set_pose(pose);
        }

        self.rig.look_at(self.visual.cloud().origin());
        report
    }

    pub fn render(&self, raster: &mut Raster, exposure: f32) {
        raster.clear();
        self.visual
            .cloud()
            .draw(&self.rig.view_projection(), raster, exposure);
    }

    pub fn regenerate(&mut self, params: GalaxyParameters) -> Result<(), GalaxyError> {
        self.visual.regenerate(params, &mut self.rng)
    }

    /// Same parameters, fresh random draws.
    pub fn reroll(&mut self) -> Result<(), GalaxyError> {
        let params = *self.visual.params();
        self.regenerate(params)
    }

    pub fn toggle_jitter(&mut self) -> Result<JitterMode, GalaxyError> {
        let next = self.visual.jitter().toggled();
        self.visual.set_jitter(next, &mut self.rng)?;
        Ok(next)
    }

    /// Push an edited pose to the camera and into the keyframe overrides.
    pub fn set_pose(&mut self, pose: CameraPose) {
        self.rig.set_pose(pose);
        self.keyframes.set_static_pose(&pose);
    }

    /// Start or stop sequence playback; false when the file has no sequence.
    pub fn toggle_playback(&mut self) -> bool {
        if self.sequence.is_none() {
            return false;
        }
        self.playhead = match self.playhead {
            Some(_) => None,
            None => Some(0.0),
        };
        true
    }

    pub fn is_playing(&self) -> bool {
        self.playhead.is_some()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.rig.set_aspect(aspect);
    }

    pub fn visual(&self) -> &GalaxyVisual {
        &self.visual
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn scroll(&self) -> &ScrollDriver {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut ScrollDriver {
        &mut self.scroll
    }

    pub fn keyframes(&self) -> &KeyframeDoc {
        &self.keyframes
    }

    pub fn has_sequence(&self) -> bool {
        self.sequence.is_some()
    }
}
