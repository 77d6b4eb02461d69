// ============================================================================
// NEIGHBOURHOOD FILTERS - blur, edges, emboss, oil painting, double vision
// ============================================================================

use crate::canvas::Image;
use crate::ops::progress::{Axis, Job, Outcome, run_cancelable};

pub const DEFAULT_BLUR_STRENGTH: i32 = 60;
pub const DEFAULT_DOUBLE_VISION_OFFSET: i32 = 15;
pub const DEFAULT_OIL_RADIUS: i32 = 3;
pub const DEFAULT_OIL_INTENSITY: i32 = 30;

/// Map a 0..=100 strength to a box radius in 1..=25.
pub fn blur_radius(strength: i32) -> i32 {
    let s = strength.clamp(0, 100);
    (s * 24 / 100 + 1).max(1)
}

// ============================================================================
// BLUR
// ============================================================================

/// Box blur: mean of the in-bounds samples inside a `(2r+1)²` window.
pub fn blur(image: &mut Image, strength: i32, job: &mut Job<'_>) -> Outcome {
    let r = blur_radius(strength);
    run_cancelable(image, "Blur", Axis::Rows, 10, job, |src, dst, y| {
        let (w, h) = (src.width() as i32, src.height() as i32);
        let y = y as i32;
        for x in 0..w {
            let mut sum = [0u32; 3];
            let mut count = 0u32;
            for ny in (y - r).max(0)..=(y + r).min(h - 1) {
                for nx in (x - r).max(0)..=(x + r).min(w - 1) {
                    let px = src.pixel(nx as u32, ny as u32);
                    sum[0] += px[0] as u32;
                    sum[1] += px[1] as u32;
                    sum[2] += px[2] as u32;
                    count += 1;
                }
            }
            let count = count.max(1);
            dst.put_pixel(
                x as u32,
                y as u32,
                [
                    (sum[0] / count) as u8,
                    (sum[1] / count) as u8,
                    (sum[2] / count) as u8,
                ],
            );
        }
    })
}

// ============================================================================
// EDGE DETECTION (immediate)
// ============================================================================

const BINOMIAL_5X5: [[i32; 5]; 5] = [
    [1, 4, 6, 4, 1],
    [4, 16, 24, 16, 4],
    [6, 24, 36, 24, 6],
    [4, 16, 24, 16, 4],
    [1, 4, 6, 4, 1],
];
const BINOMIAL_SUM: i32 = 256;

const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Gradient magnitude above this counts as an edge.
const EDGE_THRESHOLD: i32 = 50;

/// Luma, 5×5 binomial smoothing, Sobel magnitude, then threshold.
/// Edges come out black on white; the one-pixel border is always black.
pub fn edges(image: &mut Image) {
    let (w, h) = (image.width() as usize, image.height() as usize);

    let mut gray = vec![0i32; w * h];
    for y in 0..h {
        for x in 0..w {
            let [r, g, b] = image.pixel(x as u32, y as u32);
            gray[y * w + x] = (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) as i32;
        }
    }

    let mut blurred = vec![0i32; w * h];
    for y in 2..h.saturating_sub(2) {
        for x in 2..w.saturating_sub(2) {
            let mut sum = 0;
            for (ky, krow) in BINOMIAL_5X5.iter().enumerate() {
                for (kx, k) in krow.iter().enumerate() {
                    sum += gray[(y + ky - 2) * w + (x + kx - 2)] * k;
                }
            }
            blurred[y * w + x] = sum / BINOMIAL_SUM;
        }
    }

    let mut out = Image::new(w as u32, h as u32);
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let (mut gx, mut gy) = (0, 0);
            for ky in 0..3 {
                for kx in 0..3 {
                    let v = blurred[(y + ky - 1) * w + (x + kx - 1)];
                    gx += v * SOBEL_X[ky][kx];
                    gy += v * SOBEL_Y[ky][kx];
                }
            }
            let magnitude = (((gx * gx + gy * gy) as f64).sqrt() as i32).clamp(0, 255);
            let v = if magnitude > EDGE_THRESHOLD { 0 } else { 255 };
            out.put_pixel(x as u32, y as u32, [v, v, v]);
        }
    }
    *image = out;
}

// ============================================================================
// EMBOSS
// ============================================================================

#[inline]
fn emboss_at(src: &Image, x: u32, y: u32) -> u8 {
    let a = src.pixel(x, y);
    let b = src.pixel(x + 1, y + 1);
    let mut total = 0i32;
    for c in 0..3 {
        total += (a[c] as i32 - b[c] as i32 + 128).clamp(0, 255);
    }
    (total / 3) as u8
}

/// Diagonal difference relief. The last row and column have no lower-right
/// neighbour and come out black.
pub fn emboss(image: &mut Image, job: &mut Job<'_>) -> Outcome {
    run_cancelable(image, "Emboss", Axis::Rows, 20, job, |src, dst, y| {
        let w = src.width();
        let last_row = y + 1 >= src.height();
        for x in 0..w {
            let v = if last_row || x + 1 >= w {
                0
            } else {
                emboss_at(src, x, y)
            };
            dst.put_pixel(x, y, [v, v, v]);
        }
    })
}

/// Same relief as [`emboss`], without progress or cancellation.
pub fn emboss_simple(image: &mut Image) {
    let (w, h) = (image.width(), image.height());
    let mut out = Image::new(w, h);
    for y in 0..h.saturating_sub(1) {
        for x in 0..w.saturating_sub(1) {
            let v = emboss_at(image, x, y);
            out.put_pixel(x, y, [v, v, v]);
        }
    }
    *image = out;
}

// ============================================================================
// OIL PAINTING
// ============================================================================

/// For every pixel, bucket the neighbourhood by quantised brightness and
/// output the mean colour of the most populated bucket.
pub fn oil_painting(image: &mut Image, radius: i32, intensity: i32, job: &mut Job<'_>) -> Outcome {
    // A window wider than the image covers the same pixels.
    let span = image.width().max(image.height()).min(i32::MAX as u32) as i32;
    let radius = radius.clamp(1, span.max(1));
    let intensity = intensity.clamp(1, 255);

    let mut count = [0u32; 256];
    let mut sums = [[0u32; 3]; 256];

    run_cancelable(image, "Oil Painting", Axis::Rows, 5, job, |src, dst, y| {
        let (w, h) = (src.width() as i32, src.height() as i32);
        let y = y as i32;
        for x in 0..w {
            count.fill(0);
            sums.fill([0; 3]);

            for ny in (y - radius).max(0)..=(y + radius).min(h - 1) {
                for nx in (x - radius).max(0)..=(x + radius).min(w - 1) {
                    let px = src.pixel(nx as u32, ny as u32);
                    let avg = (px[0] as i32 + px[1] as i32 + px[2] as i32) / 3;
                    let level = (avg / intensity).min(255) as usize;
                    count[level] += 1;
                    sums[level][0] += px[0] as u32;
                    sums[level][1] += px[1] as u32;
                    sums[level][2] += px[2] as u32;
                }
            }

            let mut best = 0usize;
            for (level, &n) in count.iter().enumerate() {
                if n > count[best] {
                    best = level;
                }
            }
            let denom = count[best].max(1);
            let s = sums[best];
            dst.put_pixel(
                x as u32,
                y as u32,
                [(s[0] / denom) as u8, (s[1] / denom) as u8, (s[2] / denom) as u8],
            );
        }
    })
}

// ============================================================================
// DOUBLE VISION
// ============================================================================

/// Blend each pixel with the one `offset` columns to its right (clamped to
/// the last column) and warm the red channel.
pub fn double_vision(image: &mut Image, offset: i32, job: &mut Job<'_>) -> Outcome {
    let offset = offset.max(0) as u32;
    run_cancelable(image, "Double Vision", Axis::Rows, 20, job, |src, dst, y| {
        let w = src.width();
        for x in 0..w {
            let nx = x.saturating_add(offset).min(w - 1);
            let a = src.pixel(x, y);
            let b = src.pixel(nx, y);
            let mix = |c: usize| (a[c] as f64 * 0.6 + b[c] as f64 * 0.4) as i32;
            dst.put_pixel(
                x,
                y,
                [(mix(0) + 25).min(255) as u8, mix(1) as u8, mix(2) as u8],
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> Image {
        Image::from_fn(w, h, |x, y| [(x * 17 % 256) as u8, (y * 29 % 256) as u8, ((x ^ y) * 11 % 256) as u8])
    }

    #[test]
    fn blur_radius_mapping() {
        assert_eq!(blur_radius(-5), 1);
        assert_eq!(blur_radius(0), 1);
        assert_eq!(blur_radius(60), 15);
        assert_eq!(blur_radius(100), 25);
        assert_eq!(blur_radius(400), 25);
    }

    #[test]
    fn blur_keeps_uniform_image() {
        let mut img = Image::filled(9, 7, [80, 120, 160]);
        blur(&mut img, 30, &mut Job::detached());
        assert_eq!(img, Image::filled(9, 7, [80, 120, 160]));
    }

    #[test]
    fn blur_averages_in_bounds_window() {
        // 3x1 image, radius 1 at strength 0.
        let mut img = Image::from_raw(3, 1, vec![0, 0, 0, 90, 90, 90, 30, 30, 30]).unwrap();
        blur(&mut img, 0, &mut Job::detached());
        assert_eq!(img.pixel(0, 0), [45, 45, 45]);
        assert_eq!(img.pixel(1, 0), [40, 40, 40]);
        assert_eq!(img.pixel(2, 0), [60, 60, 60]);
    }

    #[test]
    fn edges_on_flat_image_is_white_inside_black_border() {
        let mut img = Image::filled(8, 8, [200, 10, 90]);
        edges(&mut img);
        for y in 0..8 {
            for x in 0..8 {
                let border = x == 0 || y == 0 || x == 7 || y == 7;
                let px = img.pixel(x, y);
                if border {
                    assert_eq!(px, [0, 0, 0], "border at ({x},{y})");
                }
            }
        }
        // Deep interior sees a flat blurred field.
        assert_eq!(img.pixel(4, 4), [255, 255, 255]);
    }

    #[test]
    fn edges_on_tiny_image_is_black() {
        let mut img = Image::filled(2, 2, [255, 255, 255]);
        edges(&mut img);
        assert_eq!(img, Image::new(2, 2));
    }

    #[test]
    fn emboss_flat_is_mid_gray_with_black_edge() {
        let mut img = Image::filled(4, 3, [70, 70, 70]);
        emboss(&mut img, &mut Job::detached());
        assert_eq!(img.pixel(0, 0), [128, 128, 128]);
        assert_eq!(img.pixel(3, 0), [0, 0, 0]);
        assert_eq!(img.pixel(1, 2), [0, 0, 0]);
    }

    #[test]
    fn tracked_and_simple_emboss_agree() {
        let src = gradient(11, 6);
        let mut a = src.clone();
        let mut b = src;
        emboss(&mut a, &mut Job::detached());
        emboss_simple(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn oil_painting_keeps_uniform_image() {
        let mut img = Image::filled(5, 5, [33, 66, 99]);
        oil_painting(&mut img, 2, 30, &mut Job::detached());
        assert_eq!(img, Image::filled(5, 5, [33, 66, 99]));
    }

    #[test]
    fn oil_painting_huge_radius_covers_whole_image() {
        let mut huge = gradient(5, 4);
        let mut whole = gradient(5, 4);
        assert_eq!(oil_painting(&mut huge, i32::MAX, 30, &mut Job::detached()), Outcome::Completed);
        oil_painting(&mut whole, 5, 30, &mut Job::detached());
        assert_eq!(huge, whole);
    }

    #[test]
    fn oil_painting_tie_goes_to_lowest_level() {
        // Two pixels, radius 1: both see both; levels 0 and 8 tie.
        let mut img = Image::from_raw(2, 1, vec![0, 0, 0, 255, 255, 255]).unwrap();
        oil_painting(&mut img, 1, 30, &mut Job::detached());
        assert_eq!(img.pixel(0, 0), [0, 0, 0]);
        assert_eq!(img.pixel(1, 0), [0, 0, 0]);
    }

    #[test]
    fn double_vision_blends_and_warms() {
        let mut img = Image::from_raw(2, 1, vec![100, 100, 100, 200, 200, 200]).unwrap();
        double_vision(&mut img, 1, &mut Job::detached());
        assert_eq!(img.pixel(0, 0), [165, 140, 140]);
        assert_eq!(img.pixel(1, 0), [225, 200, 200]);
    }

    #[test]
    fn double_vision_negative_offset_is_zero() {
        let mut img = Image::filled(3, 1, [10, 20, 30]);
        double_vision(&mut img, -4, &mut Job::detached());
        assert_eq!(img.pixel(1, 0), [35, 20, 30]);
    }
}
