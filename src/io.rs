// ============================================================================
// IMAGE I/O - decode any supported file into an RGB buffer and encode back
// ============================================================================

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tga::TgaEncoder;
use image::codecs::tiff::TiffEncoder;
use image::{ColorType, DynamicImage, ImageEncoder, ImageError, ImageFormat};

use crate::canvas::Image;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("image codec error: {0}")]
    Decode(#[from] ImageError),
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported format '{0}'")]
    UnsupportedFormat(String),
}

/// Output encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SaveFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
    Bmp,
    Tga,
    Tiff,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Webp => "webp",
            SaveFormat::Bmp => "bmp",
            SaveFormat::Tga => "tga",
            SaveFormat::Tiff => "tiff",
        }
    }

    /// Infer from a file extension. `None` for anything unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl FromStr for SaveFormat {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(SaveFormat::Png),
            "jpeg" | "jpg" => Ok(SaveFormat::Jpeg),
            "webp" => Ok(SaveFormat::Webp),
            "bmp" => Ok(SaveFormat::Bmp),
            "tga" => Ok(SaveFormat::Tga),
            "tiff" | "tif" => Ok(SaveFormat::Tiff),
            other => Err(IoError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Decode `path` and flatten it to 8-bit RGB. Alpha is dropped.
pub fn load_image(path: &Path) -> Result<Image, IoError> {
    let decoded = image::open(path)?;
    Ok(Image::from_rgb_image(&decoded.to_rgb8()))
}

/// Encode `image` to `path`. `quality` only affects JPEG and is clamped to
/// 1..=100.
pub fn save_image(image: &Image, path: &Path, format: SaveFormat, quality: u8) -> Result<(), IoError> {
    let (w, h) = (image.width(), image.height());
    let data = image.as_raw();

    if format == SaveFormat::Webp {
        DynamicImage::ImageRgb8(image.to_rgb_image()).save_with_format(path, ImageFormat::WebP)?;
        return Ok(());
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        SaveFormat::Png => {
            PngEncoder::new(&mut writer).write_image(data, w, h, ColorType::Rgb8)?;
        }
        SaveFormat::Jpeg => {
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
            encoder.encode(data, w, h, ColorType::Rgb8)?;
        }
        SaveFormat::Bmp => {
            let mut encoder = BmpEncoder::new(&mut writer);
            encoder.encode(data, w, h, ColorType::Rgb8)?;
        }
        SaveFormat::Tga => {
            TgaEncoder::new(&mut writer).encode(data, w, h, ColorType::Rgb8)?;
        }
        SaveFormat::Tiff => {
            TiffEncoder::new(&mut writer).encode(data, w, h, ColorType::Rgb8)?;
        }
        SaveFormat::Webp => {}
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Image {
        Image::from_fn(5, 4, |x, y| [(x * 50) as u8, (y * 60) as u8, 99])
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        save_image(&sample(), &path, SaveFormat::Png, 90).unwrap();
        assert_eq!(load_image(&path).unwrap(), sample());
    }

    #[test]
    fn bmp_round_trip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bmp");
        save_image(&sample(), &path, SaveFormat::Bmp, 90).unwrap();
        assert_eq!(load_image(&path).unwrap(), sample());
    }

    #[test]
    fn jpeg_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        save_image(&sample(), &path, SaveFormat::Jpeg, 80).unwrap();
        let back = load_image(&path).unwrap();
        assert_eq!((back.width(), back.height()), (5, 4));
    }

    #[test]
    fn format_from_name_and_path() {
        assert_eq!("JPG".parse::<SaveFormat>().unwrap(), SaveFormat::Jpeg);
        assert_eq!(SaveFormat::from_path(Path::new("a/b.tif")), Some(SaveFormat::Tiff));
        assert_eq!(SaveFormat::from_path(Path::new("a/b.psd")), None);
        assert!(matches!("gif".parse::<SaveFormat>(), Err(IoError::UnsupportedFormat(_))));
    }

    #[test]
    fn missing_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_image(&dir.path().join("nope.png")).is_err());
    }
}
