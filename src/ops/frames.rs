// ============================================================================
// FRAMES - decorative borders that grow the canvas
// ============================================================================
//
// Every style builds a larger buffer, paints the border, and pastes the
// source at a fixed offset. Geometry is fixed per style; only the custom
// frame takes a width and colour.
// ============================================================================

use std::str::FromStr;

use crate::canvas::{Image, MAX_DIMENSION};
use crate::color::Rgb;
use crate::error::FilterError;

const WHITE: [u8; 3] = [255, 255, 255];

/// Built-in frame styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStyle {
    /// Blue 10px border plus a white band drawn inside the picture.
    Simple,
    DoubleBorderWhite,
    SolidBlue,
    SolidRed,
    SolidGreen,
    SolidBlack,
    SolidWhite,
    /// Dark pad with a soft drop shadow to the bottom-right.
    Shadow,
    Gold,
    /// Brown and beige with accent rings and studs.
    Decorated,
}

impl FrameStyle {
    pub fn label(&self) -> &'static str {
        match self {
            FrameStyle::Simple => "Simple Frame",
            FrameStyle::DoubleBorderWhite => "Double Border - White",
            FrameStyle::SolidBlue => "Solid Frame - Blue",
            FrameStyle::SolidRed => "Solid Frame - Red",
            FrameStyle::SolidGreen => "Solid Frame - Green",
            FrameStyle::SolidBlack => "Solid Frame - Black",
            FrameStyle::SolidWhite => "Solid Frame - White",
            FrameStyle::Shadow => "Shadow Frame",
            FrameStyle::Gold => "Gold Decorated Frame",
            FrameStyle::Decorated => "Decorated Frame",
        }
    }

    /// Short name used in filter strings.
    pub fn slug(&self) -> &'static str {
        match self {
            FrameStyle::Simple => "simple",
            FrameStyle::DoubleBorderWhite => "double-border",
            FrameStyle::SolidBlue => "solid-blue",
            FrameStyle::SolidRed => "solid-red",
            FrameStyle::SolidGreen => "solid-green",
            FrameStyle::SolidBlack => "solid-black",
            FrameStyle::SolidWhite => "solid-white",
            FrameStyle::Shadow => "shadow",
            FrameStyle::Gold => "gold",
            FrameStyle::Decorated => "decorated",
        }
    }

    pub fn all() -> &'static [FrameStyle] {
        &[
            FrameStyle::Simple,
            FrameStyle::DoubleBorderWhite,
            FrameStyle::SolidBlue,
            FrameStyle::SolidRed,
            FrameStyle::SolidGreen,
            FrameStyle::SolidBlack,
            FrameStyle::SolidWhite,
            FrameStyle::Shadow,
            FrameStyle::Gold,
            FrameStyle::Decorated,
        ]
    }

    /// Extra pixels added to each side, as (left/top, right/bottom).
    pub fn margins(&self) -> (u32, u32) {
        match self {
            FrameStyle::Simple => (10, 10),
            FrameStyle::DoubleBorderWhite => (24, 24),
            FrameStyle::SolidBlue
            | FrameStyle::SolidRed
            | FrameStyle::SolidGreen
            | FrameStyle::SolidBlack
            | FrameStyle::SolidWhite => (20, 20),
            FrameStyle::Shadow => (15, 18),
            FrameStyle::Gold => (45, 45),
            FrameStyle::Decorated => (25, 25),
        }
    }
}

/// Lowercase ASCII alphanumerics only, so "Solid Frame - Blue",
/// "solid-blue" and "SOLID_BLUE" compare equal.
fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for FrameStyle {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = squash(s);
        let key = key.strip_suffix("frame").unwrap_or(&key);
        let style = match key {
            "simple" => FrameStyle::Simple,
            "double" | "doubleborder" | "doubleborderwhite" | "doublewhite" => {
                FrameStyle::DoubleBorderWhite
            }
            "solidblue" | "solidframeblue" | "blue" => FrameStyle::SolidBlue,
            "solidred" | "solidframered" | "red" => FrameStyle::SolidRed,
            "solidgreen" | "solidframegreen" | "green" => FrameStyle::SolidGreen,
            "solidblack" | "solidframeblack" | "black" => FrameStyle::SolidBlack,
            "solidwhite" | "solidframewhite" | "white" => FrameStyle::SolidWhite,
            "shadow" => FrameStyle::Shadow,
            "gold" | "golddecorated" => FrameStyle::Gold,
            "decorated" | "brown" => FrameStyle::Decorated,
            _ => return Err(FilterError::invalid("frame style", s.trim())),
        };
        Ok(style)
    }
}

/// Add the border described by `style`.
pub fn apply_frame(image: &mut Image, style: FrameStyle) {
    let out = match style {
        FrameStyle::Simple => simple(image),
        FrameStyle::DoubleBorderWhite => double_border(image),
        FrameStyle::SolidBlue => solid(image, 20, [0, 0, 255]),
        FrameStyle::SolidRed => solid(image, 20, [255, 0, 0]),
        FrameStyle::SolidGreen => solid(image, 20, [0, 255, 0]),
        FrameStyle::SolidBlack => solid(image, 20, [0, 0, 0]),
        FrameStyle::SolidWhite => solid(image, 20, WHITE),
        FrameStyle::Shadow => shadow(image),
        FrameStyle::Gold => gold(image),
        FrameStyle::Decorated => decorated(image),
    };
    *image = out;
}

/// Solid border of `width` pixels in `color` on every side.
pub fn custom_frame(image: &mut Image, width: i64, color: Rgb) -> Result<(), FilterError> {
    if width <= 0 {
        return Err(FilterError::dimensions(width, width));
    }
    let grown = |side: u32| width.checked_mul(2).and_then(|w| w.checked_add(side as i64));
    let (Some(nw), Some(nh)) = (grown(image.width()), grown(image.height())) else {
        return Err(FilterError::dimensions(width, width));
    };
    if nw > MAX_DIMENSION as i64 || nh > MAX_DIMENSION as i64 {
        return Err(FilterError::dimensions(nw, nh));
    }
    *image = solid(image, width as u32, color.to_array());
    Ok(())
}

// ---------------------------------------------------------------------------
//  Styles
// ---------------------------------------------------------------------------

fn solid(src: &Image, frame: u32, color: [u8; 3]) -> Image {
    let mut out = Image::filled(src.width() + 2 * frame, src.height() + 2 * frame, color);
    out.paste(src, frame, frame);
    out
}

fn simple(src: &Image) -> Image {
    const FRAME: i64 = 10;
    const GAP: i64 = 5;
    const BAND: i64 = 5;

    let mut out = solid(src, FRAME as u32, [0, 0, 255]);
    let (w, h) = (src.width() as i64, src.height() as i64);

    // The white band sits inside the pasted picture, not on the blue border.
    for y in FRAME + GAP..FRAME + h - GAP {
        for x in FRAME + GAP..FRAME + w - GAP {
            let band = x < FRAME + GAP + BAND
                || x >= FRAME + w - GAP - BAND
                || y < FRAME + GAP + BAND
                || y >= FRAME + h - GAP - BAND;
            if band {
                out.put_pixel(x as u32, y as u32, WHITE);
            }
        }
    }
    out
}

fn double_border(src: &Image) -> Image {
    const OUTER: i64 = 14;
    const GAP: i64 = 4;
    const INNER: i64 = 6;
    let total = OUTER + GAP + INNER;

    let nw = src.width() as i64 + 2 * total;
    let nh = src.height() as i64 + 2 * total;
    let mut out = Image::filled(nw as u32, nh as u32, [20, 20, 20]);

    for y in 0..nh {
        for x in 0..nw {
            let outer = x < OUTER || x >= nw - OUTER || y < OUTER || y >= nh - OUTER;
            let in_inner_box = x >= OUTER + GAP
                && x < nw - (OUTER + GAP)
                && y >= OUTER + GAP
                && y < nh - (OUTER + GAP);
            let inner = in_inner_box
                && (x < total || x >= nw - total || y < total || y >= nh - total);
            if outer || inner {
                out.put_pixel(x as u32, y as u32, WHITE);
            }
        }
    }
    out.paste(src, total as u32, total as u32);
    out
}

fn shadow(src: &Image) -> Image {
    const PAD: i64 = 15;
    const SHADOW: i64 = 18;

    let (w, h) = (src.width() as i64, src.height() as i64);
    let nw = w + PAD + SHADOW;
    let nh = h + PAD + SHADOW;

    let mut out = Image::from_fn(nw as u32, nh as u32, |x, y| {
        let dx = (x as i64 - (PAD + w)).max(0);
        let dy = (y as i64 - (PAD + h)).max(0);
        let shade = (dx.max(dy) * 6).min(60);
        let v = (20 + shade) as u8;
        [v, v, v]
    });
    out.paste(src, PAD as u32, PAD as u32);
    out
}

fn gold(src: &Image) -> Image {
    const FW: i64 = 45;
    const OUTER: [u8; 3] = [180, 140, 40];
    const INNER: [u8; 3] = [240, 210, 120];
    const ACCENT: [u8; 3] = [200, 160, 60];

    let nw = src.width() as i64 + 2 * FW;
    let nh = src.height() as i64 + 2 * FW;
    let mut out = Image::filled(nw as u32, nh as u32, OUTER);

    for y in 3..nh - 3 {
        for x in 3..nw - 3 {
            if (x + y) % 11 == 0 || (x - y + 1000) % 13 == 0 {
                out.put_pixel(x as u32, y as u32, ACCENT);
            }
        }
    }

    let plate = FW - 6;
    for y in plate..nh - plate {
        for x in plate..nw - plate {
            out.put_pixel(x as u32, y as u32, INNER);
        }
    }

    out.paste(src, FW as u32, FW as u32);
    out
}

fn decorated(src: &Image) -> Image {
    const FW: i64 = 25;
    const OUTER: [u8; 3] = [100, 70, 50];
    const INNER: [u8; 3] = [235, 225, 210];
    const ACCENT: [u8; 3] = [180, 140, 80];

    let nw = src.width() as i64 + 2 * FW;
    let nh = src.height() as i64 + 2 * FW;
    let mut out = Image::new(nw as u32, nh as u32);
    out.paste(src, FW as u32, FW as u32);

    for y in 0..nh {
        for x in 0..nw {
            let in_border = x < FW || x >= nw - FW || y < FW || y >= nh - FW;
            if !in_border {
                continue;
            }
            let d = x.min(y).min(nw - 1 - x).min(nh - 1 - y);
            let color = if d < 3 {
                OUTER
            } else if d == 9 || d == 12 || d == 15 {
                ACCENT
            } else if d < FW - 4 {
                if (x + y) % 12 == 0 { ACCENT } else { INNER }
            } else if d < FW - 1 {
                ACCENT
            } else {
                OUTER
            };
            out.put_pixel(x as u32, y as u32, color);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(w: u32, h: u32) -> Image {
        Image::filled(w, h, [7, 77, 177])
    }

    #[test]
    fn every_style_grows_canvas_by_its_margins() {
        for &style in FrameStyle::all() {
            let mut img = photo(30, 20);
            apply_frame(&mut img, style);
            let (lead, trail) = style.margins();
            assert_eq!(img.width(), 30 + lead + trail, "{}", style.label());
            assert_eq!(img.height(), 20 + lead + trail, "{}", style.label());
        }
    }

    #[test]
    fn labels_parse_back() {
        for &style in FrameStyle::all() {
            assert_eq!(style.label().parse::<FrameStyle>(), Ok(style));
            assert_eq!(style.slug().parse::<FrameStyle>(), Ok(style));
        }
        assert_eq!("solid-red".parse::<FrameStyle>(), Ok(FrameStyle::SolidRed));
        assert_eq!("GOLD".parse::<FrameStyle>(), Ok(FrameStyle::Gold));
    }

    #[test]
    fn unknown_style_is_rejected() {
        assert!(matches!(
            "Plaid Frame".parse::<FrameStyle>(),
            Err(FilterError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn simple_frame_layout() {
        let mut img = photo(30, 30);
        apply_frame(&mut img, FrameStyle::Simple);
        assert_eq!(img.pixel(0, 0), [0, 0, 255]);
        assert_eq!(img.pixel(9, 20), [0, 0, 255]);
        // First picture pixel is untouched; the band starts 5px in.
        assert_eq!(img.pixel(10, 10), [7, 77, 177]);
        assert_eq!(img.pixel(15, 25), WHITE);
        assert_eq!(img.pixel(19, 25), WHITE);
        assert_eq!(img.pixel(20, 25), [7, 77, 177]);
        assert_eq!(img.pixel(30, 25), WHITE);
        assert_eq!(img.pixel(35, 25), [7, 77, 177]);
    }

    #[test]
    fn double_border_rings() {
        let mut img = photo(10, 10);
        apply_frame(&mut img, FrameStyle::DoubleBorderWhite);
        assert_eq!(img.pixel(13, 30), WHITE);
        assert_eq!(img.pixel(14, 30), [20, 20, 20]);
        assert_eq!(img.pixel(17, 30), [20, 20, 20]);
        assert_eq!(img.pixel(18, 30), WHITE);
        assert_eq!(img.pixel(23, 30), WHITE);
        assert_eq!(img.pixel(24, 30), [7, 77, 177]);
    }

    #[test]
    fn shadow_gradient_to_bottom_right() {
        let mut img = photo(10, 10);
        apply_frame(&mut img, FrameStyle::Shadow);
        assert_eq!(img.pixel(0, 0), [20, 20, 20]);
        assert_eq!(img.pixel(15, 15), [7, 77, 177]);
        // dx = 27 - 25 = 2
        assert_eq!(img.pixel(27, 0), [32, 32, 32]);
        assert_eq!(img.pixel(42, 42), [80, 80, 80]);
    }

    #[test]
    fn gold_plate_and_stripes() {
        let mut img = photo(10, 10);
        apply_frame(&mut img, FrameStyle::Gold);
        assert_eq!(img.pixel(0, 0), [180, 140, 40]);
        assert_eq!(img.pixel(39, 39), [240, 210, 120]);
        assert_eq!(img.pixel(45, 45), [7, 77, 177]);
        // (x + y) % 11 == 0 inside the stripe area.
        assert_eq!(img.pixel(5, 6), [200, 160, 60]);
    }

    #[test]
    fn decorated_rings() {
        let mut img = photo(10, 10);
        apply_frame(&mut img, FrameStyle::Decorated);
        assert_eq!(img.pixel(0, 30), [100, 70, 50]);
        assert_eq!(img.pixel(9, 30), [180, 140, 80]);
        assert_eq!(img.pixel(4, 31), [235, 225, 210]);
        // (x + y) % 12 == 0 gets a stud.
        assert_eq!(img.pixel(5, 31), [180, 140, 80]);
        assert_eq!(img.pixel(22, 30), [180, 140, 80]);
        assert_eq!(img.pixel(24, 30), [100, 70, 50]);
        assert_eq!(img.pixel(25, 30), [7, 77, 177]);
    }

    #[test]
    fn custom_frame_uses_width_and_color() {
        let mut img = photo(4, 3);
        custom_frame(&mut img, 6, Rgb::new(1, 2, 3)).unwrap();
        assert_eq!((img.width(), img.height()), (16, 15));
        assert_eq!(img.pixel(5, 5), [1, 2, 3]);
        assert_eq!(img.pixel(6, 6), [7, 77, 177]);
        assert!(custom_frame(&mut img, 0, Rgb::new(0, 0, 0)).is_err());
    }

    #[test]
    fn oversized_custom_frame_is_rejected() {
        let mut img = Image::filled(3, 3, [9, 9, 9]);
        assert_eq!(
            custom_frame(&mut img, 2_147_483_648, Rgb::new(255, 0, 0)),
            Err(FilterError::InvalidDimensions { width: 4_294_967_299, height: 4_294_967_299 })
        );
        assert_eq!(
            custom_frame(&mut img, i64::MAX, Rgb::new(255, 0, 0)),
            Err(FilterError::InvalidDimensions { width: i64::MAX, height: i64::MAX })
        );
        assert_eq!(img, Image::filled(3, 3, [9, 9, 9]));
    }
}
