mod ascii;
mod braille;
mod halfblock;

pub use ascii::AsciiRenderer;
pub use braille::BrailleRenderer;
pub use halfblock::HalfBlockRenderer;

use std::io::Write;

/// One terminal frame: the rasterized galaxy plus the text layers drawn over
/// it.
pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    pub visual_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub pixels_rgba: &'a [u8],
    pub hud: &'a str,
    pub hud_rows: u16,
    /// Docked to the top-right corner (parameter panel, keyframe editor).
    pub panel: Option<&'a str>,
    /// Centered over everything (help).
    pub overlay: Option<&'a str>,
    pub sync_updates: bool,
}

pub trait Renderer {
    fn name(&self) -> &'static str;
    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}

/// Last emitted SGR colors, so runs of equal cells skip the escape.
#[derive(Debug, Default)]
pub(crate) struct SgrCache {
    fg: Option<(u8, u8, u8)>,
    bg: Option<(u8, u8, u8)>,
}

impl SgrCache {
    pub(crate) fn reset(&mut self) {
        self.fg = None;
        self.bg = None;
    }

    pub(crate) fn fg(&mut self, out: &mut dyn Write, c: (u8, u8, u8)) -> std::io::Result<()> {
        if self.fg != Some(c) {
            write!(out, "\x1b[38;2;{};{};{}m", c.0, c.1, c.2)?;
            self.fg = Some(c);
        }
        Ok(())
    }

    pub(crate) fn bg(&mut self, out: &mut dyn Write, c: (u8, u8, u8)) -> std::io::Result<()> {
        if self.bg != Some(c) {
            write!(out, "\x1b[48;2;{};{};{}m", c.0, c.1, c.2)?;
            self.bg = Some(c);
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn pixel(frame: &Frame<'_>, x: usize, y: usize) -> (u8, u8, u8) {
    let i = (y * frame.pixel_width + x) * 4;
    (
        frame.pixels_rgba[i],
        frame.pixels_rgba[i + 1],
        frame.pixels_rgba[i + 2],
    )
}

#[inline]
pub(crate) fn luma(c: (u8, u8, u8)) -> u8 {
    // Rec.709 weights in 8.8 fixed point.
    ((c.0 as u32 * 54 + c.1 as u32 * 183 + c.2 as u32 * 19) >> 8) as u8
}

/// Validate the frame for a `cell_w` x `cell_h` pixels-per-cell encoding and
/// start painting. `None` means nothing more should be drawn.
pub(crate) fn begin_frame(
    frame: &Frame<'_>,
    cell_w: usize,
    cell_h: usize,
    out: &mut dyn Write,
) -> anyhow::Result<Option<(usize, usize)>> {
    let cols = frame.term_cols as usize;
    let rows = frame.visual_rows as usize;
    let (w, h) = (frame.pixel_width, frame.pixel_height);
    if cols == 0 || rows == 0 || w == 0 || h == 0 {
        return Ok(None);
    }
    if w != cols * cell_w || h != rows * cell_h {
        return Ok(None);
    }

    if frame.sync_updates {
        out.write_all(b"\x1b[?2026h")?;
    }
    let need = w * h * 4;
    if frame.pixels_rgba.len() < need {
        out.write_all(b"\x1b[H\x1b[0m\x1b[2J")?;
        write!(
            out,
            "pixel buffer too small (need {}, got {})",
            need,
            frame.pixels_rgba.len()
        )?;
        if frame.sync_updates {
            out.write_all(b"\x1b[?2026l")?;
        }
        out.flush()?;
        return Ok(None);
    }

    // Home, reset, and no autowrap while full-width rows are painted.
    out.write_all(b"\x1b[H\x1b[0m\x1b[?7l")?;
    Ok(Some((cols, rows)))
}

/// HUD, panel and overlay layers, then restore terminal modes.
pub(crate) fn end_frame(
    frame: &Frame<'_>,
    cols: usize,
    visual_rows: usize,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut hud_lines = frame.hud.lines();
    for i in 0..frame.hud_rows as usize {
        write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", visual_rows + i + 1)?;
        if let Some(line) = hud_lines.next() {
            let clipped: String = line.chars().take(cols).collect();
            out.write_all(clipped.as_bytes())?;
        }
    }

    if let Some(text) = frame.panel {
        draw_docked_panel(out, frame.term_cols, frame.visual_rows, text)?;
    }
    if let Some(text) = frame.overlay {
        draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
    }

    out.write_all(b"\x1b[0m\x1b[?7h")?;
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026l")?;
    }
    out.flush()?;
    Ok(())
}

/// Boxed text in the top-right corner, clipped to the visual area.
pub fn draw_docked_panel(
    out: &mut dyn Write,
    term_cols: u16,
    visual_rows: u16,
    text: &str,
) -> anyhow::Result<()> {
    let cols = term_cols as usize;
    let rows = visual_rows as usize;
    if text.trim().is_empty() || cols < 12 || rows < 3 {
        return Ok(());
    }

    let inner_w = text
        .lines()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .min(cols.saturating_sub(4))
        .max(1);
    let box_w = inner_w + 4;
    let body: Vec<String> = text
        .lines()
        .take(rows.saturating_sub(2))
        .map(|l| {
            let clipped: String = l.chars().take(inner_w).collect();
            format!("{clipped:<inner_w$}")
        })
        .collect();
    let col = cols - box_w + 1;
    let edge = "-".repeat(box_w - 2);

    out.write_all(b"\x1b[0m\x1b[38;2;214;222;236m\x1b[48;2;16;18;28m")?;
    write!(out, "\x1b[1;{col}H+{edge}+")?;
    for (i, line) in body.iter().enumerate() {
        write!(out, "\x1b[{};{col}H| {line} |", i + 2)?;
    }
    write!(out, "\x1b[{};{col}H+{edge}+", body.len() + 2)?;
    out.write_all(b"\x1b[0m")?;
    Ok(())
}

/// Full-screen backdrop with a centered box; the first line is the title.
pub fn draw_overlay_popup(
    out: &mut dyn Write,
    term_cols: u16,
    term_rows: u16,
    text: &str,
) -> anyhow::Result<()> {
    let cols = term_cols as usize;
    let rows = term_rows as usize;
    if text.trim().is_empty() || cols < 8 || rows < 4 {
        return Ok(());
    }

    let max_inner = cols.saturating_sub(6).max(1);
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let chars: Vec<char> = raw.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
        }
        for chunk in chars.chunks(max_inner) {
            lines.push(chunk.iter().collect());
        }
    }
    let inner_w = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(1, max_inner);
    let box_w = inner_w + 4;
    let body_h = lines.len().min(rows.saturating_sub(3).max(1));
    let box_h = body_h + 2;
    let col = (cols - box_w) / 2 + 1;
    let row = (rows.saturating_sub(box_h)) / 2 + 1;
    let edge = "-".repeat(box_w - 2);

    out.write_all(b"\x1b[0m\x1b[38;2;220;228;242m\x1b[48;2;2;4;10m")?;
    for r in 1..=rows {
        write!(out, "\x1b[{r};1H\x1b[2K")?;
    }
    out.write_all(b"\x1b[38;2;236;242;255m\x1b[48;2;10;14;24m")?;
    write!(out, "\x1b[{row};{col}H+{edge}+")?;
    for (i, line) in lines.iter().take(body_h).enumerate() {
        let r = row + 1 + i;
        if i == 0 {
            write!(
                out,
                "\x1b[{r};{col}H| \x1b[1m\x1b[38;2;255;214;150m{line:<inner_w$}\x1b[22m\x1b[38;2;236;242;255m |"
            )?;
        } else {
            write!(out, "\x1b[{r};{col}H| {line:<inner_w$} |")?;
        }
    }
    write!(out, "\x1b[{};{col}H+{edge}+", row + box_h - 1)?;
    out.write_all(b"\x1b[0m")?;
    Ok(())
}
