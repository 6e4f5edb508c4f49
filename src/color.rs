use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Linear RGB color with channels in `0.0..=1.0`.
///
/// Hex strings map straight to channel values (`#ff6030` -> `1.0, 0.376, 0.188`);
/// no sRGB transfer is applied, matching an output pipeline with color
/// management disabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("color '{0}' must be #rrggbb or #rgb")]
    BadLength(String),
    #[error("color '{0}' contains a non-hex digit")]
    BadDigit(String),
}

impl Rgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(raw: &str) -> Result<Self, ColorError> {
        let s = raw.trim();
        let digits = s.strip_prefix('#').unwrap_or(s);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::BadDigit(raw.to_string()));
        }
        let expanded: String = match digits.len() {
            6 => digits.to_string(),
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            _ => return Err(ColorError::BadLength(raw.to_string())),
        };
        let value = u32::from_str_radix(&expanded, 16)
            .map_err(|_| ColorError::BadDigit(raw.to_string()))?;
        Ok(Self::from_u8(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        ))
    }

    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn to_u8(self) -> (u8, u8, u8) {
        (channel_u8(self.r), channel_u8(self.g), channel_u8(self.b))
    }

    pub fn to_hex(self) -> String {
        let (r, g, b) = self.to_u8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// `self * (1 - t) + other * t`, unclamped in `t`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let s = 1.0 - t;
        Self::new(
            self.r * s + other.r * t,
            self.g * s + other.g * t,
            self.b * s + other.b * t,
        )
    }

    /// Rotate the hue by `degrees`, keeping saturation and lightness.
    pub fn shift_hue(self, degrees: f32) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl((h + degrees / 360.0).rem_euclid(1.0), s, l)
    }

    fn to_hsl(self) -> (f32, f32, f32) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let l = (max + min) * 0.5;
        if max == min {
            return (0.0, 0.0, l);
        }
        let d = max - min;
        let s = if l <= 0.5 { d / (max + min) } else { d / (2.0 - max - min) };
        let h = if max == self.r {
            (self.g - self.b) / d + if self.g < self.b { 6.0 } else { 0.0 }
        } else if max == self.g {
            (self.b - self.r) / d + 2.0
        } else {
            (self.r - self.g) / d + 4.0
        };
        (h / 6.0, s, l)
    }

    fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        if s == 0.0 {
            return Self::new(l, l, l);
        }
        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;
        Self::new(
            hue_to_channel(q, p, h + 1.0 / 3.0),
            hue_to_channel(q, p, h),
            hue_to_channel(q, p, h - 1.0 / 3.0),
        )
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn channel_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        let c = Rgb::from_hex("#ff6030").unwrap();
        assert_eq!(c.to_u8(), (255, 96, 48));
        assert_eq!(Rgb::from_hex("1b3984").unwrap().to_hex(), "#1b3984");
        assert_eq!(Rgb::from_hex("#f00").unwrap().to_u8(), (255, 0, 0));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(matches!(Rgb::from_hex("#ff60"), Err(ColorError::BadLength(_))));
        assert!(matches!(Rgb::from_hex("#gg6030"), Err(ColorError::BadDigit(_))));
    }

    #[test]
    fn lerp_hits_both_ends() {
        let a = Rgb::new(1.0, 0.0, 0.5);
        let b = Rgb::new(0.0, 1.0, 0.5);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        let mid = a.lerp(b, 0.5);
        assert!((mid.r - 0.5).abs() < 1e-6 && (mid.g - 0.5).abs() < 1e-6);
    }

    #[test]
    fn hue_shift_round_trips_through_full_turn() {
        let c = Rgb::from_hex("#ff6030").unwrap();
        let back = c.shift_hue(120.0).shift_hue(240.0);
        assert_eq!(back.to_u8(), c.to_u8());
        assert_ne!(c.shift_hue(120.0).to_u8(), c.to_u8());
    }
}
