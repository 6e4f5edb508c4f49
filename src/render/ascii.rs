use crate::render::{begin_frame, end_frame, luma, pixel, Frame, Renderer, SgrCache};
use std::io::Write;

// Dim -> bright, ASCII only.
const RAMP: &[u8] = b" .'`:-+*oO#@";

/// One pixel per cell, brightness picks the glyph and the pixel color tints
/// it.
#[derive(Default)]
pub struct AsciiRenderer {
    sgr: SgrCache,
}

impl AsciiRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for AsciiRenderer {
    fn name(&self) -> &'static str {
        "ascii"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some((cols, rows)) = begin_frame(frame, 1, 1, out)? else {
            return Ok(());
        };
        self.sgr.reset();

        for y in 0..rows {
            for x in 0..cols {
                let c = pixel(frame, x, y);
                let idx = luma(c) as usize * (RAMP.len() - 1) / 255;
                if idx == 0 {
                    out.write_all(b" ")?;
                    continue;
                }
                self.sgr.fg(out, c)?;
                out.write_all(&[RAMP[idx]])?;
            }
            out.write_all(b"\r\n")?;
        }

        end_frame(frame, cols, rows, out)
    }
}
