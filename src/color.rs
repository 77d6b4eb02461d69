// ============================================================================
// COLOUR VALUES - parsing and HSV conversion for tint and custom frames
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;

/// An opaque 8-bit colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Build from hue, saturation and value, each in 0.0..=1.0.
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let h6 = (h.rem_euclid(1.0)) * 6.0;
        let s = s.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let c = v * s;
        let x = c * (1.0 - ((h6 % 2.0) - 1.0).abs());
        let m = v - c;
        let (r, g, b) = match h6 as i32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Self::new(
            ((r + m) * 255.0).round() as u8,
            ((g + m) * 255.0).round() as u8,
            ((b + m) * 255.0).round() as u8,
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn named(name: &str) -> Option<Rgb> {
    let c = match name {
        "black" => Rgb::new(0, 0, 0),
        "white" => Rgb::new(255, 255, 255),
        "red" => Rgb::new(255, 0, 0),
        "green" => Rgb::new(0, 255, 0),
        "blue" => Rgb::new(0, 0, 255),
        "yellow" => Rgb::new(255, 255, 0),
        "cyan" => Rgb::new(0, 255, 255),
        "magenta" => Rgb::new(255, 0, 255),
        "purple" => Rgb::new(128, 0, 128),
        "orange" => Rgb::new(255, 165, 0),
        "gray" | "grey" => Rgb::new(128, 128, 128),
        "sepia" => Rgb::new(112, 66, 20),
        _ => return None,
    };
    Some(c)
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let val = u32::from_str_radix(hex, 16).ok()?;
    Some(Rgb::new(
        ((val >> 16) & 0xFF) as u8,
        ((val >> 8) & 0xFF) as u8,
        (val & 0xFF) as u8,
    ))
}

fn parse_triple(body: &str) -> Option<[&str; 3]> {
    let mut parts = body.split(',').map(str::trim);
    let triple = [parts.next()?, parts.next()?, parts.next()?];
    if parts.next().is_some() {
        return None;
    }
    Some(triple)
}

/// Accepts `#rrggbb`, `rrggbb`, `r,g,b`, `hsv(h,s,v)` (hue in degrees,
/// saturation and value in percent) and a handful of colour names.
impl FromStr for Rgb {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_lowercase();
        let err = || FilterError::invalid("color", s.trim());

        if let Some(c) = named(&text) {
            return Ok(c);
        }
        if let Some(c) = parse_hex(text.strip_prefix('#').unwrap_or(&text)) {
            return Ok(c);
        }
        if let Some(body) = text.strip_prefix("hsv(").and_then(|t| t.strip_suffix(')')) {
            let [h, sat, val] = parse_triple(body).ok_or_else(err)?;
            let h: f32 = h.parse().map_err(|_| err())?;
            let sat: f32 = sat.parse().map_err(|_| err())?;
            let val: f32 = val.parse().map_err(|_| err())?;
            if !(0.0..=100.0).contains(&sat) || !(0.0..=100.0).contains(&val) {
                return Err(err());
            }
            return Ok(Rgb::from_hsv(h / 360.0, sat / 100.0, val / 100.0));
        }
        if let Some([r, g, b]) = parse_triple(&text) {
            let r: u8 = r.parse().map_err(|_| err())?;
            let g: u8 = g.parse().map_err(|_| err())?;
            let b: u8 = b.parse().map_err(|_| err())?;
            return Ok(Rgb::new(r, g, b));
        }
        Err(err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_notation() {
        assert_eq!("#FF8800".parse::<Rgb>(), Ok(Rgb::new(255, 136, 0)));
        assert_eq!("ff8800".parse::<Rgb>(), Ok(Rgb::new(255, 136, 0)));
        assert_eq!("10, 20,30".parse::<Rgb>(), Ok(Rgb::new(10, 20, 30)));
        assert_eq!("Blue".parse::<Rgb>(), Ok(Rgb::new(0, 0, 255)));
        assert_eq!("hsv(120,100,100)".parse::<Rgb>(), Ok(Rgb::new(0, 255, 0)));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "#12345", "300,0,0", "1,2", "hsv(0,200,50)", "chartreuse-ish"] {
            assert!(
                matches!(bad.parse::<Rgb>(), Err(FilterError::InvalidParameter { .. })),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn display_is_lower_hex() {
        assert_eq!(Rgb::new(128, 64, 192).to_string(), "#8040c0");
    }

    #[test]
    fn hsv_primaries_and_grey() {
        assert_eq!(Rgb::from_hsv(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hsv(1.0 / 3.0, 1.0, 1.0), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hsv(2.0 / 3.0, 1.0, 1.0), Rgb::new(0, 0, 255));
        assert_eq!(Rgb::from_hsv(0.5, 0.0, 0.5), Rgb::new(128, 128, 128));
    }
}
