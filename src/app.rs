use crate::config::{Config, RendererMode};
use crate::keyframes::{KeyframeDoc, PoseEditor};
use crate::panel::ParamPanel;
use crate::params_file::{params_storage_path, save_params};
use crate::raster::Raster;
use crate::render::{AsciiRenderer, BrailleRenderer, Frame, HalfBlockRenderer, Renderer};
use crate::scene::{Scene, SceneOptions};
use crate::terminal::TerminalGuard;
use anyhow::Context;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const WHEEL_STEP: f32 = 0.04;
const PAGE_STEP: f32 = 0.25;
const STATUS_TTL: Duration = Duration::from_secs(3);

pub fn run(cfg: Config) -> anyhow::Result<()> {
    cfg.validate()?;
    let params = cfg.galaxy_parameters()?;
    let keyframes = KeyframeDoc::load(&cfg.keyframes)
        .with_context(|| format!("load keyframes from {}", cfg.keyframes.display()))?;

    let mut renderer: Box<dyn Renderer> = match cfg.renderer {
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Braille => Box::new(BrailleRenderer::new()),
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
    };
    let (px_w_mul, px_h_mul) = cfg.renderer.pixels_per_cell();

    let mut scene = Scene::new(SceneOptions {
        params,
        jitter: cfg.jitter,
        seed: cfg.seed,
        keyframes,
        scrub_seconds: cfg.scrub,
        aspect: 1.0,
    })
    .context("generate initial galaxy")?;
    info!(
        count = params.count,
        branches = params.branches,
        renderer = renderer.name(),
        "galaxy ready"
    );

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    if last_size.1 < 2 || last_size.0 < 4 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            last_size.0,
            last_size.1
        ));
    }

    let mut ui = Ui::new(*scene.visual().params(), &cfg);
    let mut raster = Raster::default();
    let mut fps = FpsCounter::new();
    let mut last_frame = Instant::now();

    loop {
        let now = Instant::now();

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    if ui.handle_key(k.code, k.modifiers, &mut scene, now) {
                        return Ok(());
                    }
                }
                Event::Mouse(MouseEvent { kind, .. }) => match kind {
                    MouseEventKind::ScrollDown => scene.scroll_mut().scroll_by(WHEEL_STEP),
                    MouseEventKind::ScrollUp => scene.scroll_mut().scroll_by(-WHEEL_STEP),
                    _ => {}
                },
                Event::Resize(c, r) => last_size = (c, r),
                _ => {}
            }
        }
        // Resize events can be missed in some terminals.
        last_size = crossterm::terminal::size()?;

        if let Some(next) = ui.panel.poll(now) {
            ui.apply_panel_commit(&mut scene, next);
        }

        let dt = now.duration_since(last_frame).as_secs_f32().max(1e-6);
        last_frame = now;
        let report = scene.tick(dt);
        if report.regenerations > 0 {
            ui.panel.sync(*scene.visual().params());
        }
        if let Some(err) = report.error {
            ui.set_status(format!("rejected: {err}"), now);
        }

        let (term_cols, term_rows) = last_size;
        let hud = if ui.show_hud {
            build_wrapped_hud(term_cols as usize, &scene, &ui, renderer.name(), fps.fps(), now)
        } else {
            String::new()
        };
        let hud_rows = hud_rows_for_text(term_rows, ui.show_hud, &hud);
        let visual_rows = term_rows.saturating_sub(hud_rows).max(1);
        let w = (term_cols as usize).saturating_mul(px_w_mul);
        let h = (visual_rows as usize).saturating_mul(px_h_mul);
        if raster.width() != w || raster.height() != h {
            raster.resize(w, h);
            scene.set_aspect(w as f32 * cfg.renderer.pixel_aspect() / h.max(1) as f32);
        }

        scene.render(&mut raster, cfg.exposure);
        let pixels = raster.resolve();

        let panel_text = if ui.panel.open {
            Some(ui.panel.text())
        } else if ui.editor.open {
            Some(ui.editor.text(&scene.rig().pose))
        } else {
            None
        };

        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: pixels,
            hud: &hud,
            hud_rows,
            panel: panel_text.as_deref(),
            overlay: ui.show_help.then(help_popup_text),
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;
        fps.tick();

        // Frame pacing.
        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

struct Ui {
    show_hud: bool,
    show_help: bool,
    panel: ParamPanel,
    editor: PoseEditor,
    params_path: Option<PathBuf>,
    keyframes_path: PathBuf,
    status: Option<(String, Instant)>,
}

impl Ui {
    fn new(params: crate::galaxy::GalaxyParameters, cfg: &Config) -> Self {
        Self {
            show_hud: true,
            show_help: false,
            panel: ParamPanel::new(params),
            editor: PoseEditor::default(),
            params_path: cfg.params.clone().or_else(params_storage_path),
            keyframes_path: cfg.keyframes.clone(),
            status: None,
        }
    }

    fn set_status(&mut self, msg: String, now: Instant) {
        self.status = Some((msg, now));
    }

    fn status(&self, now: Instant) -> &str {
        match &self.status {
            Some((msg, at)) if now.duration_since(*at) < STATUS_TTL => msg,
            _ => "",
        }
    }

    fn apply_panel_commit(&mut self, scene: &mut Scene, params: crate::galaxy::GalaxyParameters) {
        match scene.regenerate(params) {
            Ok(()) => self.panel.accept(),
            Err(err) => {
                warn!(%err, "panel parameters rejected");
                self.panel.reject(&err, *scene.visual().params());
            }
        }
    }

    /// Returns true when the app should quit.
    fn handle_key(
        &mut self,
        code: KeyCode,
        mods: KeyModifiers,
        scene: &mut Scene,
        now: Instant,
    ) -> bool {
        if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
            return true;
        }

        if self.panel.open && self.handle_panel_key(code, scene, now) {
            return false;
        }
        if self.editor.open && self.handle_editor_key(code, scene, now) {
            return false;
        }

        match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            KeyCode::PageDown | KeyCode::Char(' ') | KeyCode::Down => {
                scene.scroll_mut().scroll_by(PAGE_STEP)
            }
            KeyCode::PageUp | KeyCode::Up => scene.scroll_mut().scroll_by(-PAGE_STEP),
            KeyCode::Home => scene.scroll_mut().scroll_to(0.0),
            KeyCode::End => {
                let max = scene.scroll().max_offset();
                scene.scroll_mut().scroll_to(max);
            }
            KeyCode::Char('r') => {
                if let Err(err) = scene.reroll() {
                    self.set_status(format!("rejected: {err}"), now);
                }
            }
            KeyCode::Char('j') => match scene.toggle_jitter() {
                Ok(mode) => self.set_status(format!("jitter: {}", mode.label()), now),
                Err(err) => self.set_status(format!("rejected: {err}"), now),
            },
            KeyCode::Char('p') => {
                if !scene.toggle_playback() {
                    self.set_status("no keyframe sequence loaded".to_string(), now);
                }
            }
            KeyCode::Char('g') => {
                self.panel.toggle();
                self.panel.sync(*scene.visual().params());
                self.editor.open = false;
            }
            KeyCode::Char('k') => {
                self.editor.open = !self.editor.open;
                self.panel.open = false;
            }
            KeyCode::Char('h') => self.show_hud = !self.show_hud,
            KeyCode::Char('?') | KeyCode::F(1) => self.show_help = !self.show_help,
            _ => {}
        }
        false
    }

    fn handle_panel_key(&mut self, code: KeyCode, scene: &mut Scene, now: Instant) -> bool {
        match code {
            KeyCode::Up => self.panel.select_prev(),
            KeyCode::Down => self.panel.select_next(),
            KeyCode::Left | KeyCode::Right => {
                let dir = if code == KeyCode::Left { -1 } else { 1 };
                if let Some(next) = self.panel.nudge(dir, now) {
                    self.apply_panel_commit(scene, next);
                }
            }
            KeyCode::Enter => {
                if let Some(next) = self.panel.commit() {
                    self.apply_panel_commit(scene, next);
                }
            }
            KeyCode::Char('w') => {
                let Some(path) = self.params_path.clone() else {
                    self.set_status("no parameter file location".to_string(), now);
                    return true;
                };
                match save_params(scene.visual().params(), &path) {
                    Ok(()) => self.set_status(format!("saved {}", path.display()), now),
                    Err(err) => {
                        warn!(%err, "saving galaxy parameters failed");
                        self.set_status(err.to_string(), now);
                    }
                }
            }
            _ => return false,
        }
        true
    }

    fn handle_editor_key(&mut self, code: KeyCode, scene: &mut Scene, now: Instant) -> bool {
        match code {
            KeyCode::Tab => self.editor.select_next(),
            KeyCode::Left | KeyCode::Right => {
                let dir = if code == KeyCode::Left { -1.0 } else { 1.0 };
                let pose = self.editor.nudge(&scene.rig().pose, dir);
                scene.set_pose(pose);
            }
            KeyCode::Char('s') => match scene.keyframes().save(&self.keyframes_path) {
                Ok(()) => {
                    self.editor.mark_saved();
                    self.set_status(format!("saved {}", self.keyframes_path.display()), now);
                }
                Err(err) => {
                    warn!(%err, "saving keyframes failed");
                    self.set_status(err.to_string(), now);
                }
            },
            _ => return false,
        }
        true
    }
}

fn hud_rows_for_text(term_rows: u16, show_hud: bool, hud: &str) -> u16 {
    if !show_hud {
        return 0;
    }
    let max_rows = term_rows.saturating_sub(1);
    (hud.lines().count() as u16).min(max_rows)
}

fn build_wrapped_hud(
    cols: usize,
    scene: &Scene,
    ui: &Ui,
    renderer_name: &str,
    fps: f32,
    now: Instant,
) -> String {
    let p = scene.visual().params();
    let scroll = scene.scroll();
    let progress = |i: usize| scroll.sections().get(i).map(|s| s.progress()).unwrap_or(0.0);
    let cam = scene.rig().world_position();

    let logical_lines = vec![
        format!(
            "Stars: {} | Branches: {} | Power: {:.1} | Spin: {:.3} | Radius: {:.2} | Jitter: {} | Gen #{} ({:.1} ms)",
            p.count,
            p.branches,
            p.randomness_power,
            p.spin,
            p.radius,
            scene.visual().jitter().label(),
            scene.visual().generation(),
            scene.visual().last_generate_ms(),
        ),
        format!(
            "Scroll: {:.2}/{:.0} | Sections: {:.2} {:.2} | Camera: ({:.2}, {:.2}, {:.2}){} | Renderer: {} | FPS: {:>4.1} {}",
            scroll.offset(),
            scroll.max_offset(),
            progress(0),
            progress(1),
            cam.x,
            cam.y,
            cam.z,
            if scene.is_playing() { " (playing)" } else { "" },
            renderer_name,
            fps,
            ui.status(now),
        ),
        "Keys: wheel/PgUp/PgDn scroll | g params | k keyframes | p play | r reroll | j jitter | h HUD | ? help | q quit"
            .to_string(),
    ];

    wrap_hud_lines(cols, &logical_lines).join("\n")
}

fn wrap_hud_lines(cols: usize, lines: &[String]) -> Vec<String> {
    let width = cols.max(1);
    let mut out = Vec::new();
    for line in lines {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            out.push(String::new());
        }
        out.extend(chars.chunks(width).map(|c| c.iter().collect::<String>()));
    }
    out
}

fn help_popup_text() -> &'static str {
    "TUI Galaxy Hotkeys\n\
wheel, PgUp/PgDn, up/down, space  scroll the page\n\
Home / End  jump to top / bottom\n\
r  reroll stars with the same parameters\n\
j  toggle jitter mode (reference / scaled)\n\
g  parameter panel\n\
  up/down select, left/right edit, enter apply, w save preset\n\
k  keyframe editor\n\
  tab select, left/right edit, s save keyframe file\n\
p  play / stop the keyframe sequence\n\
h  show/hide HUD\n\
? or F1  toggle this help\n\
q or esc  quit"
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = self.frames as f32 / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
