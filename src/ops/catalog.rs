// ============================================================================
// FILTER CATALOG - every operation as a value, parsed from `name[:args]`
// ============================================================================
//
// The catalog is the single dispatch point used by the document and the CLI.
// `Display` writes the canonical text form, which parses back to the same
// filter.
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::canvas::Image;
use crate::color::Rgb;
use crate::error::FilterError;
use crate::ops::adjustments::{self, BrightnessMode};
use crate::ops::filters::{self, DEFAULT_BLUR_STRENGTH, DEFAULT_DOUBLE_VISION_OFFSET};
use crate::ops::filters::{DEFAULT_OIL_INTENSITY, DEFAULT_OIL_RADIUS};
use crate::ops::frames::{self, FrameStyle};
use crate::ops::progress::{Job, Outcome};
use crate::ops::transform::{self, DEFAULT_SKEW_DEGREES, FlipDirection, Rotation};

pub const DEFAULT_BRIGHTNESS_PERCENT: i32 = 50;
pub const DEFAULT_TINT_INTENSITY: f64 = 0.5;

/// One engine operation with its arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    Grayscale,
    /// `None` draws a fresh seed at run time.
    Tv { seed: Option<u64> },
    BlackWhite,
    Invert,
    Blur { strength: i32 },
    Infrared,
    Purple,
    Tint { color: Rgb, intensity: f64 },
    Emboss,
    DoubleVision { offset: i32 },
    OilPainting { radius: i32, intensity: i32 },
    Sunlight,
    FishEye,
    Flip(FlipDirection),
    Rotate(Rotation),
    Brightness { mode: BrightnessMode, percent: i32 },
    /// Fixed dark (÷3) or light (×2) preset.
    Preset(BrightnessMode),
    Frame(FrameStyle),
    Border { width: i64, color: Rgb },
    Edges,
    Resize { width: i64, height: i64 },
    Skew { degrees: f64 },
    Crop { x: i64, y: i64, width: i64, height: i64 },
}

impl Filter {
    /// Human-readable name, used in status lines and undo labels.
    pub fn label(&self) -> &'static str {
        match self {
            Filter::Grayscale => "Grayscale",
            Filter::Tv { .. } => "TV/CRT",
            Filter::BlackWhite => "Black & White",
            Filter::Invert => "Invert",
            Filter::Blur { .. } => "Blur",
            Filter::Infrared => "Infrared",
            Filter::Purple => "Purple",
            Filter::Tint { .. } => "Color Tint",
            Filter::Emboss => "Emboss",
            Filter::DoubleVision { .. } => "Double Vision",
            Filter::OilPainting { .. } => "Oil Painting",
            Filter::Sunlight => "Enhance Sunlight",
            Filter::FishEye => "Fish-Eye",
            Filter::Flip(_) => "Flip",
            Filter::Rotate(_) => "Rotate",
            Filter::Brightness { .. } => "Brightness",
            Filter::Preset(BrightnessMode::Dark) => "Dark",
            Filter::Preset(BrightnessMode::Light) => "Light",
            Filter::Frame(_) => "Frame",
            Filter::Border { .. } => "Custom Frame",
            Filter::Edges => "Edge Detection",
            Filter::Resize { .. } => "Resize",
            Filter::Skew { .. } => "Skew",
            Filter::Crop { .. } => "Crop",
        }
    }

    /// Whether the filter runs under the cancellation protocol.
    pub fn is_cancelable(&self) -> bool {
        matches!(
            self,
            Filter::Grayscale
                | Filter::Tv { .. }
                | Filter::BlackWhite
                | Filter::Invert
                | Filter::Blur { .. }
                | Filter::Infrared
                | Filter::Purple
                | Filter::Tint { .. }
                | Filter::Emboss
                | Filter::DoubleVision { .. }
                | Filter::OilPainting { .. }
                | Filter::Sunlight
                | Filter::FishEye
        )
    }

    /// Fill in an unset TV seed. Other filters are returned unchanged.
    pub fn with_seed(self, seed: u64) -> Filter {
        match self {
            Filter::Tv { seed: None } => Filter::Tv { seed: Some(seed) },
            other => other,
        }
    }

    /// Run the filter on `image`.
    ///
    /// Immediate filters either complete or fail; on failure `image` is left
    /// as it was. Cancelable filters may return `Outcome::Cancelled`, in which
    /// case `image` has been restored.
    pub fn apply(&self, image: &mut Image, job: &mut Job<'_>) -> Result<Outcome, FilterError> {
        let outcome = match *self {
            Filter::Grayscale => adjustments::grayscale(image, job),
            Filter::Tv { seed } => {
                adjustments::tv_crt(image, seed.unwrap_or_else(time_seed), job)
            }
            Filter::BlackWhite => adjustments::black_and_white(image, job),
            Filter::Invert => adjustments::invert(image, job),
            Filter::Blur { strength } => filters::blur(image, strength, job),
            Filter::Infrared => adjustments::infrared(image, job),
            Filter::Purple => adjustments::purple(image, job),
            Filter::Tint { color, intensity } => {
                adjustments::color_tint(image, color, intensity, job)
            }
            Filter::Emboss => filters::emboss(image, job),
            Filter::DoubleVision { offset } => filters::double_vision(image, offset, job),
            Filter::OilPainting { radius, intensity } => {
                filters::oil_painting(image, radius, intensity, job)
            }
            Filter::Sunlight => adjustments::enhance_sunlight(image, job),
            Filter::FishEye => transform::fish_eye(image, job),
            _ => {
                job.status(&format!("Applying {} filter...", self.label()));
                self.apply_immediate(image)?;
                job.status(&format!("{} filter applied", self.label()));
                Outcome::Completed
            }
        };
        Ok(outcome)
    }

    fn apply_immediate(&self, image: &mut Image) -> Result<(), FilterError> {
        match *self {
            Filter::Flip(direction) => transform::flip(image, direction),
            Filter::Rotate(rotation) => transform::rotate(image, rotation),
            Filter::Brightness { mode, percent } => adjustments::brightness(image, mode, percent),
            Filter::Preset(mode) => adjustments::dark_and_light(image, mode),
            Filter::Frame(style) => frames::apply_frame(image, style),
            Filter::Border { width, color } => frames::custom_frame(image, width, color)?,
            Filter::Edges => filters::edges(image),
            Filter::Resize { width, height } => transform::resize(image, width, height)?,
            Filter::Skew { degrees } => transform::skew(image, degrees)?,
            Filter::Crop { x, y, width, height } => transform::crop(image, x, y, width, height)?,
            _ => return Err(FilterError::invalid("immediate filter", self.to_string())),
        }
        Ok(())
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
//  Text form
// ---------------------------------------------------------------------------

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Grayscale => write!(f, "grayscale"),
            Filter::Tv { seed: None } => write!(f, "tv"),
            Filter::Tv { seed: Some(seed) } => write!(f, "tv:{}", seed),
            Filter::BlackWhite => write!(f, "black-white"),
            Filter::Invert => write!(f, "invert"),
            Filter::Blur { strength } => write!(f, "blur:{}", strength),
            Filter::Infrared => write!(f, "infrared"),
            Filter::Purple => write!(f, "purple"),
            Filter::Tint { color, intensity } => write!(f, "tint:{},{}", color, intensity),
            Filter::Emboss => write!(f, "emboss"),
            Filter::DoubleVision { offset } => write!(f, "double-vision:{}", offset),
            Filter::OilPainting { radius, intensity } => {
                write!(f, "oil-painting:{},{}", radius, intensity)
            }
            Filter::Sunlight => write!(f, "sunlight"),
            Filter::FishEye => write!(f, "fish-eye"),
            Filter::Flip(direction) => write!(f, "flip:{}", direction.label()),
            Filter::Rotate(rotation) => write!(f, "rotate:{}", rotation.degrees()),
            Filter::Brightness { mode, percent } => {
                write!(f, "brightness:{},{}", mode.label(), percent)
            }
            Filter::Preset(mode) => write!(f, "{}", mode.label()),
            Filter::Frame(style) => write!(f, "frame:{}", style.slug()),
            Filter::Border { width, color } => write!(f, "border:{},{}", width, color),
            Filter::Edges => write!(f, "edges"),
            Filter::Resize { width, height } => write!(f, "resize:{}x{}", width, height),
            Filter::Skew { degrees } => write!(f, "skew:{}", degrees),
            Filter::Crop { x, y, width, height } => {
                write!(f, "crop:{},{},{},{}", x, y, width, height)
            }
        }
    }
}

fn number<T: FromStr>(name: &'static str, text: &str) -> Result<T, FilterError> {
    text.trim()
        .parse()
        .map_err(|_| FilterError::invalid(name, text.trim()))
}

/// Take a colour from the front of `args`. Tries `r,g,b` and `hsv(h,s,v)`
/// spans before a single token.
fn take_color<'a>(args: &'a [&'a str]) -> Result<(Rgb, &'a [&'a str]), FilterError> {
    for n in (1..=args.len().min(3)).rev() {
        if let Ok(color) = args[..n].join(",").parse::<Rgb>() {
            return Ok((color, &args[n..]));
        }
    }
    Err(FilterError::invalid(
        "color",
        args.first().copied().unwrap_or_default(),
    ))
}

fn no_more(name: &'static str, rest: &[&str]) -> Result<(), FilterError> {
    match rest.first() {
        None => Ok(()),
        Some(extra) => Err(FilterError::invalid(name, *extra)),
    }
}

/// Parses `name[:arg,arg...]`. Names are case-insensitive and `_` or spaces
/// may stand in for `-`.
impl FromStr for Filter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (raw_name, raw_args) = match s.split_once(':') {
            Some((n, a)) => (n, Some(a)),
            None => (s, None),
        };
        let name: String = raw_name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect();
        let args: Vec<&str> = match raw_args {
            Some(a) if !a.trim().is_empty() => a.split(',').map(str::trim).collect(),
            _ => Vec::new(),
        };

        let filter = match name.as_str() {
            "grayscale" | "greyscale" | "gray" => {
                no_more("grayscale argument", &args)?;
                Filter::Grayscale
            }
            "tv" | "tv-crt" | "crt" => match args.as_slice() {
                [] => Filter::Tv { seed: None },
                [seed] => Filter::Tv { seed: Some(number("tv seed", seed)?) },
                [_, extra, ..] => return Err(FilterError::invalid("tv argument", *extra)),
            },
            "black-white" | "black-and-white" | "bw" => {
                no_more("black-white argument", &args)?;
                Filter::BlackWhite
            }
            "invert" | "negative" => {
                no_more("invert argument", &args)?;
                Filter::Invert
            }
            "blur" => match args.as_slice() {
                [] => Filter::Blur { strength: DEFAULT_BLUR_STRENGTH },
                [s] => Filter::Blur { strength: number("blur strength", s)? },
                [_, extra, ..] => return Err(FilterError::invalid("blur argument", *extra)),
            },
            "infrared" => {
                no_more("infrared argument", &args)?;
                Filter::Infrared
            }
            "purple" => {
                no_more("purple argument", &args)?;
                Filter::Purple
            }
            "tint" | "color-tint" => {
                let (color, rest) = take_color(&args)?;
                let intensity = match rest {
                    [] => DEFAULT_TINT_INTENSITY,
                    [i] => number("tint intensity", i)?,
                    [_, extra, ..] => return Err(FilterError::invalid("tint argument", *extra)),
                };
                Filter::Tint { color, intensity }
            }
            "emboss" => {
                no_more("emboss argument", &args)?;
                Filter::Emboss
            }
            "double-vision" => match args.as_slice() {
                [] => Filter::DoubleVision { offset: DEFAULT_DOUBLE_VISION_OFFSET },
                [o] => Filter::DoubleVision { offset: number("double vision offset", o)? },
                [_, extra, ..] => {
                    return Err(FilterError::invalid("double vision argument", *extra));
                }
            },
            "oil-painting" | "oil" => match args.as_slice() {
                [] => Filter::OilPainting {
                    radius: DEFAULT_OIL_RADIUS,
                    intensity: DEFAULT_OIL_INTENSITY,
                },
                [r] => Filter::OilPainting {
                    radius: number("oil painting radius", r)?,
                    intensity: DEFAULT_OIL_INTENSITY,
                },
                [r, i] => Filter::OilPainting {
                    radius: number("oil painting radius", r)?,
                    intensity: number("oil painting intensity", i)?,
                },
                [_, _, extra, ..] => {
                    return Err(FilterError::invalid("oil painting argument", *extra));
                }
            },
            "sunlight" | "enhance-sunlight" => {
                no_more("sunlight argument", &args)?;
                Filter::Sunlight
            }
            "fish-eye" | "fisheye" => {
                no_more("fish-eye argument", &args)?;
                Filter::FishEye
            }
            "flip" => match args.as_slice() {
                [d] => Filter::Flip(d.parse()?),
                [] => return Err(FilterError::invalid("flip direction", "")),
                [_, extra, ..] => return Err(FilterError::invalid("flip argument", *extra)),
            },
            "rotate" => match args.as_slice() {
                [a] => Filter::Rotate(a.parse()?),
                [] => return Err(FilterError::invalid("rotation angle", "")),
                [_, extra, ..] => return Err(FilterError::invalid("rotate argument", *extra)),
            },
            "brightness" => match args.as_slice() {
                [m] => Filter::Brightness {
                    mode: m.parse()?,
                    percent: DEFAULT_BRIGHTNESS_PERCENT,
                },
                [m, p] => Filter::Brightness {
                    mode: m.parse()?,
                    percent: number("brightness percent", p)?,
                },
                [] => return Err(FilterError::invalid("brightness mode", "")),
                [_, _, extra, ..] => {
                    return Err(FilterError::invalid("brightness argument", *extra));
                }
            },
            "dark" | "light" => {
                no_more("preset argument", &args)?;
                Filter::Preset(name.parse()?)
            }
            "frame" => match args.as_slice() {
                [style] => Filter::Frame(style.parse()?),
                [] => return Err(FilterError::invalid("frame style", "")),
                // Labels such as "Double Border, White" may carry commas.
                _ => Filter::Frame(args.join(" ").parse()?),
            },
            "border" | "custom-frame" => match args.split_first() {
                Some((w, rest)) => {
                    let width = number("border width", w)?;
                    let (color, rest) = take_color(rest)?;
                    no_more("border argument", rest)?;
                    Filter::Border { width, color }
                }
                None => return Err(FilterError::invalid("border width", "")),
            },
            "edges" | "edge-detection" => {
                no_more("edges argument", &args)?;
                Filter::Edges
            }
            "resize" => {
                let (w, h) = match args.as_slice() {
                    [wh] => wh
                        .to_lowercase()
                        .split_once('x')
                        .map(|(w, h)| (w.to_string(), h.to_string()))
                        .ok_or_else(|| FilterError::invalid("resize size", *wh))?,
                    [w, h] => (w.to_string(), h.to_string()),
                    [] => return Err(FilterError::invalid("resize size", "")),
                    [_, _, extra, ..] => {
                        return Err(FilterError::invalid("resize argument", *extra));
                    }
                };
                Filter::Resize {
                    width: number("resize width", &w)?,
                    height: number("resize height", &h)?,
                }
            }
            "skew" => match args.as_slice() {
                [] => Filter::Skew { degrees: DEFAULT_SKEW_DEGREES },
                [d] => {
                    let degrees: f64 = number("skew angle", d)?;
                    if !degrees.is_finite() {
                        return Err(FilterError::invalid("skew angle", *d));
                    }
                    Filter::Skew { degrees }
                }
                [_, extra, ..] => return Err(FilterError::invalid("skew argument", *extra)),
            },
            "crop" => match args.as_slice() {
                [x, y, w, h] => Filter::Crop {
                    x: number("crop x", x)?,
                    y: number("crop y", y)?,
                    width: number("crop width", w)?,
                    height: number("crop height", h)?,
                },
                _ => return Err(FilterError::invalid("crop rectangle", args.join(","))),
            },
            _ => return Err(FilterError::invalid("filter name", raw_name.trim())),
        };
        Ok(filter)
    }
}
