// ============================================================================
// ADJUSTMENT OPERATIONS - per-pixel colour remaps
// ============================================================================
//
// Cancelable remaps go through `run_per_pixel`, which polls the cancel token
// once per row. Brightness is immediate: it is a single cheap pass.
// All arithmetic truncates toward zero and clamps to [0, 255].
// ============================================================================

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::canvas::Image;
use crate::color::Rgb;
use crate::error::FilterError;
use crate::ops::progress::{Axis, Job, Outcome, run_cancelable, run_per_pixel};

#[inline]
fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

// ============================================================================
// CANCELABLE REMAPS
// ============================================================================

/// `gray = (R + G + B) / 3` on all three channels.
pub fn grayscale(image: &mut Image, job: &mut Job<'_>) -> Outcome {
    run_per_pixel(image, "Grayscale", 50, job, |_, _, [r, g, b]| {
        let gray = ((r as u32 + g as u32 + b as u32) / 3) as u8;
        [gray, gray, gray]
    })
}

/// Binary threshold of the grayscale value at 127.
pub fn black_and_white(image: &mut Image, job: &mut Job<'_>) -> Outcome {
    run_per_pixel(image, "Black & White", 50, job, |_, _, [r, g, b]| {
        let gray = (r as u32 + g as u32 + b as u32) / 3;
        let bw = if gray > 127 { 255 } else { 0 };
        [bw, bw, bw]
    })
}

pub fn invert(image: &mut Image, job: &mut Job<'_>) -> Outcome {
    run_per_pixel(image, "Invert", 50, job, |_, _, [r, g, b]| {
        [255 - r, 255 - g, 255 - b]
    })
}

/// Boost red and blue by 1.3, halve green.
pub fn purple(image: &mut Image, job: &mut Job<'_>) -> Outcome {
    run_per_pixel(image, "Purple", 50, job, |_, _, [r, g, b]| {
        [
            clamp_u8((r as f64 * 1.3) as i32),
            clamp_u8((g as f64 * 0.5) as i32),
            clamp_u8((b as f64 * 1.3) as i32),
        ]
    })
}

/// Red saturated, green and blue set to the inverted brightness.
/// Walks the image column by column.
pub fn infrared(image: &mut Image, job: &mut Job<'_>) -> Outcome {
    run_cancelable(image, "Infrared", Axis::Columns, 50, job, |src, dst, x| {
        for y in 0..src.height() {
            let [r, g, b] = src.pixel(x, y);
            let brightness = (r as i32 + g as i32 + b as i32) as f32 / 3.0;
            let inverted = clamp_u8((255.0 - brightness) as i32);
            dst.put_pixel(x, y, [255, inverted, inverted]);
        }
    })
}

/// Blend every pixel toward `color`. `intensity` is clamped to [0, 1];
/// 0 leaves the image unchanged, 1 replaces it with `color`.
pub fn color_tint(image: &mut Image, color: Rgb, intensity: f64, job: &mut Job<'_>) -> Outcome {
    let i = intensity.clamp(0.0, 1.0);
    let tint = color.to_array();
    run_per_pixel(image, "Color Tint", 50, job, move |_, _, px| {
        let mut out = [0u8; 3];
        for c in 0..3 {
            let v = px[c] as f64 * (1.0 - i) + tint[c] as f64 * i;
            out[c] = clamp_u8(v as i32);
        }
        out
    })
}

/// Warm the image by boosting red and green by 1.4.
pub fn enhance_sunlight(image: &mut Image, job: &mut Job<'_>) -> Outcome {
    run_per_pixel(image, "Enhance Sunlight", 20, job, |_, _, [r, g, b]| {
        [
            clamp_u8((r as f64 * 1.4) as i32),
            clamp_u8((g as f64 * 1.4) as i32),
            b,
        ]
    })
}

/// Vintage CRT look: darker scanline every third row, a blue cast in the
/// shadows, an orange glow in the highlights, and per-pixel grain.
///
/// The grain comes from a `StdRng` seeded with `seed`, drawn in row-major
/// order, so the same seed always yields the same image.
pub fn tv_crt(image: &mut Image, seed: u64, job: &mut Job<'_>) -> Outcome {
    let mut rng = StdRng::seed_from_u64(seed);
    run_per_pixel(image, "TV/CRT", 20, job, move |_, y, [r, g, b]| {
        let (mut r, mut g, mut b) = (r as i32, g as i32, b as i32);
        let scanline: f32 = if y % 3 == 0 { 0.7 } else { 1.0 };
        let brightness = (r + g + b) as f32 / 3.0 / 255.0;

        if brightness < 0.5 {
            r = ((r as f32 * 0.8) as i32).min(255);
            g = ((g as f32 * 0.7) as i32).min(255);
            b = ((b as f32 * 1.2) as i32).min(255);
        }
        if brightness > 0.7 {
            r = ((r as f32 * 1.3) as i32).min(255);
            g = ((g as f32 * 1.1) as i32).min(255);
            b = ((b as f32 * 0.9) as i32).max(0);
        }

        r = (r as f32 * scanline) as i32;
        g = (g as f32 * scanline) as i32;
        b = (b as f32 * scanline) as i32;

        let noise: i32 = rng.gen_range(-10..=10);
        [clamp_u8(r + noise), clamp_u8(g + noise), clamp_u8(b + noise)]
    })
}

// ============================================================================
// BRIGHTNESS (immediate)
// ============================================================================

/// Darken or lighten.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrightnessMode {
    Dark,
    Light,
}

impl BrightnessMode {
    pub fn label(&self) -> &'static str {
        match self {
            BrightnessMode::Dark => "dark",
            BrightnessMode::Light => "light",
        }
    }
}

impl FromStr for BrightnessMode {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" | "darken" => Ok(BrightnessMode::Dark),
            "light" | "lighten" => Ok(BrightnessMode::Light),
            other => Err(FilterError::invalid("brightness mode", other)),
        }
    }
}

/// Scale every channel by `1 - p/100` (dark) or `1 + p/100` (light), with
/// `percent` clamped to [0, 100].
pub fn brightness(image: &mut Image, mode: BrightnessMode, percent: i32) {
    let p = percent.clamp(0, 100) as f64;
    let factor = match mode {
        BrightnessMode::Dark => (1.0 - p / 100.0).max(0.0),
        BrightnessMode::Light => 1.0 + p / 100.0,
    };
    for y in 0..image.height() {
        for v in image.row_mut(y) {
            *v = (*v as f64 * factor).clamp(0.0, 255.0) as u8;
        }
    }
}

/// Fixed-strength preset: dark divides by three, light doubles.
pub fn dark_and_light(image: &mut Image, mode: BrightnessMode) {
    for y in 0..image.height() {
        for v in image.row_mut(y) {
            *v = match mode {
                BrightnessMode::Dark => *v / 3,
                BrightnessMode::Light => (*v as u32 * 2).min(255) as u8,
            };
        }
    }
}
