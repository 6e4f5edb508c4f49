use crate::render::{begin_frame, end_frame, luma, pixel, Frame, Renderer, SgrCache};
use std::io::Write;

/// Dot bit for (dx, dy) within a 2x4 braille cell, row-major.
const DOT_BITS: [u8; 8] = [0x01, 0x08, 0x02, 0x10, 0x04, 0x20, 0x40, 0x80];

/// Luma a pixel needs before its dot is raised.
const STAR_THRESHOLD: u8 = 24;

/// 2x4 dots per cell. Each lit pixel raises one dot, so sparse stars stay
/// sharp; the cell takes the mean color of its lit pixels on a black
/// background.
#[derive(Default)]
pub struct BrailleRenderer {
    sgr: SgrCache,
}

impl BrailleRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for BrailleRenderer {
    fn name(&self) -> &'static str {
        "braille"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some((cols, rows)) = begin_frame(frame, 2, 4, out)? else {
            return Ok(());
        };
        self.sgr.reset();
        self.sgr.bg(out, (0, 0, 0))?;

        for row in 0..rows {
            for col in 0..cols {
                let mut bits = 0u8;
                let mut sum = [0u32; 3];
                let mut lit = 0u32;
                for (i, bit) in DOT_BITS.iter().enumerate() {
                    let c = pixel(frame, col * 2 + i % 2, row * 4 + i / 2);
                    if luma(c) >= STAR_THRESHOLD {
                        bits |= bit;
                        sum[0] += c.0 as u32;
                        sum[1] += c.1 as u32;
                        sum[2] += c.2 as u32;
                        lit += 1;
                    }
                }

                if lit == 0 {
                    out.write_all(b" ")?;
                    continue;
                }
                let fg = (
                    (sum[0] / lit) as u8,
                    (sum[1] / lit) as u8,
                    (sum[2] / lit) as u8,
                );
                self.sgr.fg(out, fg)?;
                let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
                write!(out, "{ch}")?;
            }
            out.write_all(b"\r\n")?;
        }

        end_frame(frame, cols, rows, out)
    }
}
