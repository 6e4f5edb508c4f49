use crate::render::{begin_frame, end_frame, pixel, Frame, Renderer, SgrCache};
use std::io::Write;

const UPPER_HALF: char = '\u{2580}';

/// Two stacked pixels per cell: foreground paints the upper half block,
/// background the lower one.
#[derive(Default)]
pub struct HalfBlockRenderer {
    sgr: SgrCache,
}

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "halfblock"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some((cols, rows)) = begin_frame(frame, 1, 2, out)? else {
            return Ok(());
        };
        self.sgr.reset();

        for row in 0..rows {
            for x in 0..cols {
                let top = pixel(frame, x, row * 2);
                let bottom = pixel(frame, x, row * 2 + 1);
                if top == bottom {
                    // Solid cell: a space on the background color is cheaper.
                    self.sgr.bg(out, top)?;
                    out.write_all(b" ")?;
                } else {
                    self.sgr.fg(out, top)?;
                    self.sgr.bg(out, bottom)?;
                    write!(out, "{UPPER_HALF}")?;
                }
            }
            out.write_all(b"\r\n")?;
        }

        end_frame(frame, cols, rows, out)
    }
}
