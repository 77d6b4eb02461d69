// ============================================================================
// TRANSFORM OPERATIONS - flip, rotate, resize, skew, crop, fish-eye, merge
// ============================================================================

use std::str::FromStr;

use crate::canvas::{Image, MAX_DIMENSION};
use crate::error::FilterError;
use crate::ops::progress::{Axis, Job, Outcome, run_cancelable};

pub const DEFAULT_SKEW_DEGREES: f64 = 40.0;

// ---------------------------------------------------------------------------
//  Parameter enums
// ---------------------------------------------------------------------------

/// Mirror axis for [`flip`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipDirection {
    /// Mirror left↔right.
    Horizontal,
    /// Mirror top↔bottom.
    Vertical,
}

impl FlipDirection {
    pub fn label(&self) -> &'static str {
        match self {
            FlipDirection::Horizontal => "horizontal",
            FlipDirection::Vertical => "vertical",
        }
    }
}

impl FromStr for FlipDirection {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "horizontal" | "h" => Ok(FlipDirection::Horizontal),
            "vertical" | "v" => Ok(FlipDirection::Vertical),
            other => Err(FilterError::invalid("flip direction", other)),
        }
    }
}

/// Quarter-turn rotations. Angles are clockwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    Cw90,
    Half,
    Ccw90,
}

impl Rotation {
    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::Cw90 => 90,
            Rotation::Half => 180,
            Rotation::Ccw90 => 270,
        }
    }
}

impl FromStr for Rotation {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "90" | "-270" => Ok(Rotation::Cw90),
            "180" | "-180" => Ok(Rotation::Half),
            "270" | "-90" => Ok(Rotation::Ccw90),
            other => Err(FilterError::invalid("rotation angle", other)),
        }
    }
}

/// How [`merge`] reconciles two images of different sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Average the shared top-left region; the current image keeps its size.
    #[default]
    Overlap,
    /// Resize both to the larger width and height first, then average.
    Resize,
}

impl MergeMode {
    pub fn label(&self) -> &'static str {
        match self {
            MergeMode::Overlap => "overlap",
            MergeMode::Resize => "resize",
        }
    }
}

impl FromStr for MergeMode {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overlap" | "crop" => Ok(MergeMode::Overlap),
            "resize" => Ok(MergeMode::Resize),
            other => Err(FilterError::invalid("merge mode", other)),
        }
    }
}

// ---------------------------------------------------------------------------
//  Immediate transforms
// ---------------------------------------------------------------------------

pub fn flip(image: &mut Image, direction: FlipDirection) {
    let (w, h) = (image.width(), image.height());
    match direction {
        FlipDirection::Horizontal => {
            for y in 0..h {
                for x in 0..w / 2 {
                    let a = image.pixel(x, y);
                    let b = image.pixel(w - 1 - x, y);
                    image.put_pixel(x, y, b);
                    image.put_pixel(w - 1 - x, y, a);
                }
            }
        }
        FlipDirection::Vertical => {
            for y in 0..h / 2 {
                let top = image.row(y).to_vec();
                let bottom = image.row(h - 1 - y).to_vec();
                image.row_mut(y).copy_from_slice(&bottom);
                image.row_mut(h - 1 - y).copy_from_slice(&top);
            }
        }
    }
}

/// Exact quarter-turn remap. 90 and 270 swap width and height.
pub fn rotate(image: &mut Image, rotation: Rotation) {
    let (w, h) = (image.width(), image.height());
    let src = &*image;
    let out = match rotation {
        Rotation::Cw90 => {
            let mut out = Image::new(h, w);
            for y in 0..h {
                for x in 0..w {
                    out.put_pixel(h - 1 - y, x, src.pixel(x, y));
                }
            }
            out
        }
        Rotation::Half => {
            let mut out = Image::new(w, h);
            for y in 0..h {
                for x in 0..w {
                    out.put_pixel(w - 1 - x, h - 1 - y, src.pixel(x, y));
                }
            }
            out
        }
        Rotation::Ccw90 => {
            let mut out = Image::new(h, w);
            for y in 0..h {
                for x in 0..w {
                    out.put_pixel(y, w - 1 - x, src.pixel(x, y));
                }
            }
            out
        }
    };
    *image = out;
}

fn target_dimension(v: i64) -> Option<u32> {
    if v <= 0 || v > MAX_DIMENSION as i64 { None } else { Some(v as u32) }
}

/// Nearest-neighbour resize to `width`×`height`, each in `1..=MAX_DIMENSION`.
pub fn resize(image: &mut Image, width: i64, height: i64) -> Result<(), FilterError> {
    let (Some(dw), Some(dh)) = (target_dimension(width), target_dimension(height)) else {
        return Err(FilterError::dimensions(width, height));
    };
    if image.is_empty() {
        return Err(FilterError::dimensions(image.width() as i64, image.height() as i64));
    }
    *image = resized(image, dw, dh);
    Ok(())
}

fn resized(src: &Image, dw: u32, dh: u32) -> Image {
    let (sw, sh) = (src.width(), src.height());
    let x_ratio = sw as f64 / dw as f64;
    let y_ratio = sh as f64 / dh as f64;
    Image::from_fn(dw, dh, |x, y| {
        let sx = ((x as f64 * x_ratio) as u32).min(sw - 1);
        let sy = ((y as f64 * y_ratio) as u32).min(sh - 1);
        src.pixel(sx, sy)
    })
}

/// Horizontal shear. Each row `y` moves right by `floor(tan(θ)·y)`; the canvas
/// widens to fit and the uncovered area is white. Angles that would widen the
/// canvas past [`MAX_DIMENSION`] fail with `InvalidDimensions`.
pub fn skew(image: &mut Image, degrees: f64) -> Result<(), FilterError> {
    let (w, h) = (image.width(), image.height());
    let tan_a = (degrees * std::f64::consts::PI / 180.0).tan();
    let shift = |y: u32| (tan_a * y as f64).floor() as i64;

    let (min_shift, max_shift) = if h > 0 {
        let bottom = shift(h - 1);
        (bottom.min(0), bottom.max(0))
    } else {
        (0, 0)
    };

    let new_w = (w as i64)
        .saturating_add(max_shift.saturating_sub(min_shift))
        .max(1);
    if new_w > MAX_DIMENSION as i64 {
        return Err(FilterError::dimensions(new_w, h as i64));
    }
    let new_w = new_w as u32;
    let mut out = Image::filled(new_w, h, [255, 255, 255]);

    for y in 0..h {
        let base = shift(y) - min_shift;
        for x in 0..w {
            let nx = x as i64 + base;
            if nx >= 0 && nx < new_w as i64 {
                out.put_pixel(nx as u32, y, image.pixel(x, y));
            }
        }
    }
    *image = out;
    Ok(())
}

/// Keep the `width`×`height` rectangle at (`x`, `y`), clipped to the image.
pub fn crop(image: &mut Image, x: i64, y: i64, width: i64, height: i64) -> Result<(), FilterError> {
    if width <= 0 || height <= 0 {
        return Err(FilterError::dimensions(width, height));
    }
    let (iw, ih) = (image.width() as i64, image.height() as i64);
    if x < 0 || y < 0 || x >= iw || y >= ih {
        return Err(FilterError::OutOfRange {
            x,
            y,
            channel: 0,
            width: image.width(),
            height: image.height(),
        });
    }
    let cw = width.min(iw - x) as u32;
    let ch = height.min(ih - y) as u32;
    let (ox, oy) = (x as u32, y as u32);
    let src = &*image;
    let out = Image::from_fn(cw, ch, |cx, cy| src.pixel(ox + cx, oy + cy));
    *image = out;
    Ok(())
}

// ---------------------------------------------------------------------------
//  Merge
// ---------------------------------------------------------------------------

/// Average `other` into `image`, channel by channel.
pub fn merge(image: &mut Image, other: &Image, mode: MergeMode) -> Result<(), FilterError> {
    match mode {
        MergeMode::Overlap => {
            blend_overlap(image, other);
            Ok(())
        }
        MergeMode::Resize => {
            let w = image.width().max(other.width());
            let h = image.height().max(other.height());
            let mut other = other.clone();
            resize(&mut other, w as i64, h as i64)?;
            resize(image, w as i64, h as i64)?;
            blend_overlap(image, &other);
            Ok(())
        }
    }
}

fn blend_overlap(image: &mut Image, other: &Image) {
    let w = image.width().min(other.width());
    let h = image.height().min(other.height());
    for y in 0..h {
        for x in 0..w {
            let a = image.pixel(x, y);
            let b = other.pixel(x, y);
            image.put_pixel(
                x,
                y,
                [
                    ((a[0] as u16 + b[0] as u16) / 2) as u8,
                    ((a[1] as u16 + b[1] as u16) / 2) as u8,
                    ((a[2] as u16 + b[2] as u16) / 2) as u8,
                ],
            );
        }
    }
}

// ---------------------------------------------------------------------------
//  Fish-eye (cancelable)
// ---------------------------------------------------------------------------

/// Radial lens warp around the image centre. Pixels outside the inscribed
/// circle, and the centre itself, pass through.
pub fn fish_eye(image: &mut Image, job: &mut Job<'_>) -> Outcome {
    let cx = image.width() as f32 / 2.0;
    let cy = image.height() as f32 / 2.0;
    let radius = cx.min(cy);

    run_cancelable(image, "Fish-Eye", Axis::Rows, 10, job, |src, dst, y| {
        let (w, h) = (src.width(), src.height());
        for x in 0..w {
            let dx = (x as f32 - cx) / radius;
            let dy = (y as f32 - cy) / radius;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > 0.0 && dist < 1.0 {
                let new_dist = dist.powf(0.75);
                let nx = cx + (dx / dist) * new_dist * radius;
                let ny = cy + (dy / dist) * new_dist * radius;
                let ix = (nx as i32).clamp(0, w as i32 - 1) as u32;
                let iy = (ny as i32).clamp(0, h as i32 - 1) as u32;
                dst.put_pixel(x, y, src.pixel(ix, iy));
            } else {
                dst.put_pixel(x, y, src.pixel(x, y));
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(w: u32, h: u32) -> Image {
        Image::from_fn(w, h, |x, y| [x as u8, y as u8, (x + y * w) as u8])
    }

    #[test]
    fn flip_horizontal_mirrors_columns() {
        let src = numbered(5, 3);
        let mut img = src.clone();
        flip(&mut img, FlipDirection::Horizontal);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(img.pixel(x, y), src.pixel(4 - x, y));
            }
        }
        flip(&mut img, FlipDirection::Horizontal);
        assert_eq!(img, src);
    }

    #[test]
    fn flip_vertical_twice_is_identity() {
        let src = numbered(4, 5);
        let mut img = src.clone();
        flip(&mut img, FlipDirection::Vertical);
        assert_eq!(img.pixel(1, 0), src.pixel(1, 4));
        flip(&mut img, FlipDirection::Vertical);
        assert_eq!(img, src);
    }

    #[test]
    fn flip_rejects_unknown_direction() {
        assert!(matches!(
            "diagonal".parse::<FlipDirection>(),
            Err(FilterError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn rotate_90_is_clockwise() {
        let src = numbered(3, 2);
        let mut img = src.clone();
        rotate(&mut img, Rotation::Cw90);
        assert_eq!((img.width(), img.height()), (2, 3));
        // Top-left of the source ends up top-right.
        assert_eq!(img.pixel(1, 0), src.pixel(0, 0));
        assert_eq!(img.pixel(0, 0), src.pixel(0, 1));
    }

    #[test]
    fn four_quarter_turns_are_identity() {
        let src = numbered(4, 3);
        let mut img = src.clone();
        for _ in 0..4 {
            rotate(&mut img, Rotation::Cw90);
        }
        assert_eq!(img, src);

        rotate(&mut img, Rotation::Cw90);
        rotate(&mut img, Rotation::Ccw90);
        assert_eq!(img, src);

        rotate(&mut img, Rotation::Half);
        rotate(&mut img, Rotation::Half);
        assert_eq!(img, src);
    }

    #[test]
    fn rotation_parse() {
        assert_eq!("270".parse::<Rotation>(), Ok(Rotation::Ccw90));
        assert!("45".parse::<Rotation>().is_err());
    }

    #[test]
    fn resize_nearest_neighbour() {
        let src = numbered(4, 4);
        let mut img = src.clone();
        resize(&mut img, 2, 2).unwrap();
        assert_eq!(img.pixel(0, 0), src.pixel(0, 0));
        assert_eq!(img.pixel(1, 1), src.pixel(2, 2));

        let mut up = Image::filled(1, 1, [9, 8, 7]);
        resize(&mut up, 3, 2).unwrap();
        assert_eq!(up, Image::filled(3, 2, [9, 8, 7]));
    }

    #[test]
    fn resize_to_own_size_is_identity() {
        let src = numbered(5, 3);
        let mut img = src.clone();
        resize(&mut img, 5, 3).unwrap();
        assert_eq!(img, src);
    }

    #[test]
    fn resize_up_then_down_restores() {
        let src = numbered(2, 2);
        let mut img = src.clone();
        resize(&mut img, 4, 4).unwrap();
        assert_eq!(img.pixel(1, 1), src.pixel(0, 0));
        assert_eq!(img.pixel(2, 3), src.pixel(1, 1));
        resize(&mut img, 2, 2).unwrap();
        assert_eq!(img, src);
    }

    #[test]
    fn resize_beyond_limit_fails() {
        let mut img = numbered(2, 2);
        assert_eq!(
            resize(&mut img, MAX_DIMENSION as i64 + 1, 2),
            Err(FilterError::InvalidDimensions { width: MAX_DIMENSION as i64 + 1, height: 2 })
        );
        assert_eq!(img, numbered(2, 2));
    }

    #[test]
    fn resize_rejects_non_positive_and_empty() {
        let mut img = numbered(2, 2);
        assert_eq!(
            resize(&mut img, 0, 5),
            Err(FilterError::InvalidDimensions { width: 0, height: 5 })
        );
        assert_eq!(img, numbered(2, 2));

        let mut empty = Image::new(0, 0);
        assert!(matches!(
            resize(&mut empty, 4, 4),
            Err(FilterError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn skew_widens_canvas_with_white_fill() {
        let mut img = Image::filled(10, 11, [0, 0, 0]);
        skew(&mut img, 45.0).unwrap();
        // tan(45°) rounds just below 1, so the bottom row shifts by 9.
        let shift = ((45.0f64 * std::f64::consts::PI / 180.0).tan() * 10.0).floor() as u32;
        assert_eq!(img.width(), 10 + shift);
        assert_eq!(img.height(), 11);
        assert_eq!(img.pixel(img.width() - 1, 0), [255, 255, 255]);
        assert_eq!(img.pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn skew_near_vertical_fails_without_allocating() {
        let mut img = numbered(4, 4);
        assert!(matches!(skew(&mut img, 90.0), Err(FilterError::InvalidDimensions { .. })));
        assert!(matches!(skew(&mut img, -89.999), Err(FilterError::InvalidDimensions { .. })));
        assert_eq!(img, numbered(4, 4));
    }

    #[test]
    fn skew_zero_is_identity() {
        let src = numbered(5, 4);
        let mut img = src.clone();
        skew(&mut img, 0.0).unwrap();
        assert_eq!(img, src);
    }

    #[test]
    fn skew_negative_angle_shifts_top_rows_right() {
        let mut img = Image::filled(4, 3, [0, 0, 0]);
        skew(&mut img, -45.0).unwrap();
        // Row 0 sits at the far right; the bottom row starts at column 0.
        assert_eq!(img.pixel(0, 2), [0, 0, 0]);
        assert_eq!(img.pixel(0, 0), [255, 255, 255]);
        assert_eq!(img.pixel(img.width() - 1, 0), [0, 0, 0]);
    }

    #[test]
    fn crop_clips_to_image() {
        let src = numbered(6, 5);
        let mut img = src.clone();
        crop(&mut img, 4, 3, 10, 10).unwrap();
        assert_eq!((img.width(), img.height()), (2, 2));
        assert_eq!(img.pixel(0, 0), src.pixel(4, 3));

        let mut bad = src.clone();
        assert!(matches!(crop(&mut bad, 6, 0, 1, 1), Err(FilterError::OutOfRange { .. })));
        assert!(matches!(
            crop(&mut bad, 0, 0, 0, 1),
            Err(FilterError::InvalidDimensions { .. })
        ));
        assert_eq!(bad, src);
    }

    #[test]
    fn merge_averages_overlap_only() {
        let mut img = Image::filled(4, 4, [100, 100, 100]);
        let other = Image::filled(2, 6, [201, 0, 50]);
        merge(&mut img, &other, MergeMode::Overlap).unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));
        assert_eq!(img.pixel(1, 3), [150, 50, 75]);
        assert_eq!(img.pixel(2, 0), [100, 100, 100]);
    }

    #[test]
    fn merge_resize_mode_grows_to_largest() {
        let mut img = Image::filled(2, 2, [0, 0, 0]);
        let other = Image::filled(4, 3, [200, 200, 200]);
        merge(&mut img, &other, MergeMode::Resize).unwrap();
        assert_eq!(img, Image::filled(4, 3, [100, 100, 100]));
    }

    #[test]
    fn fish_eye_keeps_centre_and_corners() {
        let src = numbered(9, 9);
        let mut img = src.clone();
        assert_eq!(fish_eye(&mut img, &mut Job::detached()), Outcome::Completed);
        // Corners lie outside the unit circle.
        assert_eq!(img.pixel(0, 0), src.pixel(0, 0));
        assert_eq!(img.pixel(8, 8), src.pixel(8, 8));
        assert_eq!((img.width(), img.height()), (9, 9));
    }

    #[test]
    fn fish_eye_pulls_interior_pixels_from_further_out() {
        // Centre (40, 40), radius 40. At distance 13 the source sits at
        // 40 * (13/40)^0.75 = 17.2 from the centre.
        let src = numbered(80, 80);
        let mut img = src.clone();
        fish_eye(&mut img, &mut Job::detached());
        assert_eq!(img.pixel(53, 40), src.pixel(57, 40));
        assert_eq!(img.pixel(40, 27), src.pixel(40, 22));
        assert_eq!(img.pixel(40, 40), src.pixel(40, 40));
    }

    #[test]
    fn fish_eye_on_uniform_image_is_identity() {
        let mut img = Image::filled(7, 5, [12, 34, 56]);
        fish_eye(&mut img, &mut Job::detached());
        assert_eq!(img, Image::filled(7, 5, [12, 34, 56]));
    }
}
