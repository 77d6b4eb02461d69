// ============================================================================
// PIXEL BUFFER - flat 8-bit RGB raster shared by every filter
// ============================================================================

use image::RgbImage;

use crate::error::FilterError;

/// Samples per pixel. Always R, G, B.
pub const CHANNELS: usize = 3;

/// Largest width or height a filter may produce.
pub const MAX_DIMENSION: u32 = 32_768;

/// Row-major 8-bit RGB image.
///
/// `Image` is a plain value: `clone()` copies the whole sample array, so two
/// variables never alias the same pixels. [`Image::new`] zero-fills, which
/// makes freshly constructed buffers black.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Image {
    // ---- construction -------------------------------------------------------

    /// Create a black image of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * CHANNELS],
        }
    }

    /// Create an image where every pixel is `color`.
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for _ in 0..width as usize * height as usize {
            data.extend_from_slice(&color);
        }
        Self { width, height, data }
    }

    /// Wrap an existing sample vector. Fails when its length does not match
    /// `width * height * 3`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FilterError> {
        if data.len() != width as usize * height as usize * CHANNELS {
            return Err(FilterError::dimensions(width as i64, height as i64));
        }
        Ok(Self { width, height, data })
    }

    /// Build an image by evaluating `f` at every coordinate, row by row.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> [u8; 3],
    {
        let mut img = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                img.put_pixel(x, y, f(x, y));
            }
        }
        img
    }

    // ---- dimensions ---------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Bytes held by the sample array.
    pub fn memory_size(&self) -> usize {
        self.data.len()
    }

    // ---- checked access -----------------------------------------------------

    /// Read one sample. Out-of-bounds coordinates return `OutOfRange`.
    pub fn get(&self, x: u32, y: u32, channel: usize) -> Result<u8, FilterError> {
        let idx = self.checked_index(x, y, channel)?;
        Ok(self.data[idx])
    }

    /// Write one sample. Out-of-bounds coordinates return `OutOfRange`.
    pub fn set(&mut self, x: u32, y: u32, channel: usize, value: u8) -> Result<(), FilterError> {
        let idx = self.checked_index(x, y, channel)?;
        self.data[idx] = value;
        Ok(())
    }

    fn checked_index(&self, x: u32, y: u32, channel: usize) -> Result<usize, FilterError> {
        if x >= self.width || y >= self.height || channel >= CHANNELS {
            return Err(FilterError::OutOfRange {
                x: x as i64,
                y: y as i64,
                channel,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.index(x, y) + channel)
    }

    // ---- algorithm access ---------------------------------------------------
    //
    // Filters only call these with coordinates they have already bounded, so
    // a violation is a bug and panics via slice indexing.

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.index(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, px: [u8; 3]) {
        let i = self.index(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&px);
    }

    /// One row of samples (`width * 3` bytes).
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * CHANNELS;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.width as usize * CHANNELS;
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Copy `src` into this image with its top-left corner at (`ox`, `oy`).
    /// Pixels that would land outside are dropped.
    pub fn paste(&mut self, src: &Image, ox: u32, oy: u32) {
        for y in 0..src.height {
            let dy = oy + y;
            if dy >= self.height {
                break;
            }
            let cols = src.width.min(self.width.saturating_sub(ox)) as usize;
            if cols == 0 {
                break;
            }
            let src_row = &src.row(y)[..cols * CHANNELS];
            let start = self.index(ox, dy);
            self.data[start..start + cols * CHANNELS].copy_from_slice(src_row);
        }
    }

    // ---- `image` crate interop ---------------------------------------------

    pub fn from_rgb_image(img: &RgbImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            data: img.as_raw().clone(),
        }
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        // Length is maintained as width * height * 3 by every constructor.
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }
}
