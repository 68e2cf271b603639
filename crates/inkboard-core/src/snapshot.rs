//! Immutable pixel captures of the drawing surface.

use base64::{Engine, engine::general_purpose::STANDARD};
use std::fmt;
use thiserror::Error;

/// Bytes per pixel (RGBA, 8 bits per channel).
pub const BYTES_PER_PIXEL: usize = 4;

/// Prefix of a PNG data URL as produced by `canvas.toDataURL()`.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Snapshot construction and codec errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Pixel buffer has {actual} bytes, expected {expected} for {width}x{height}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("PNG encode error: {0}")]
    Encode(String),
    #[error("PNG decode error: {0}")]
    Decode(String),
    #[error("Invalid data URL: {0}")]
    DataUrl(String),
}

/// The full pixel contents of a surface at one instant.
///
/// Pixels are row-major, non-premultiplied RGBA8. A snapshot is never
/// mutated after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Snapshot {
    /// Wrap a raw RGBA buffer, checking that its length matches the dimensions.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SnapshotError> {
        let expected = buffer_len(width, height);
        if pixels.len() != expected {
            return Err(SnapshotError::BufferSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A fully transparent snapshot of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; buffer_len(width, height)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Captured dimensions as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value at `(x, y)`, or `None` outside the captured area.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = &self.pixels[i..i + BYTES_PER_PIXEL];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Memory held by the pixel buffer, in bytes.
    pub fn memory_size(&self) -> usize {
        self.pixels.len()
    }

    /// Consume the snapshot, returning its pixel buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Encode as an RGBA8 PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, SnapshotError> {
        if self.width == 0 || self.height == 0 {
            return Err(SnapshotError::Encode(format!(
                "cannot encode a {}x{} image",
                self.width, self.height
            )));
        }
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| SnapshotError::Encode(e.to_string()))?;
            writer
                .write_image_data(&self.pixels)
                .map_err(|e| SnapshotError::Encode(e.to_string()))?;
            writer
                .finish()
                .map_err(|e| SnapshotError::Encode(e.to_string()))?;
        }
        Ok(png_data)
    }

    /// Decode a PNG of any 8/16-bit color type into an RGBA8 snapshot.
    pub fn from_png(data: &[u8]) -> Result<Self, SnapshotError> {
        let mut decoder = png::Decoder::new(data);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder
            .read_info()
            .map_err(|e| SnapshotError::Decode(e.to_string()))?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader
            .next_frame(&mut buf)
            .map_err(|e| SnapshotError::Decode(e.to_string()))?;
        buf.truncate(info.buffer_size());

        let pixels = match info.color_type {
            png::ColorType::Rgba => buf,
            png::ColorType::Rgb => buf
                .chunks_exact(3)
                .flat_map(|c| [c[0], c[1], c[2], 255])
                .collect(),
            png::ColorType::GrayscaleAlpha => buf
                .chunks_exact(2)
                .flat_map(|c| [c[0], c[0], c[0], c[1]])
                .collect(),
            png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 255]).collect(),
            png::ColorType::Indexed => {
                return Err(SnapshotError::Decode(
                    "indexed PNG was not expanded".to_string(),
                ));
            }
        };

        Self::from_rgba(info.width, info.height, pixels)
    }

    /// Encode as a `data:image/png;base64,...` URL.
    pub fn to_data_url(&self) -> Result<String, SnapshotError> {
        let png = self.to_png()?;
        Ok(format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(png)))
    }

    /// Decode a base64 image data URL. Only PNG payloads are accepted.
    pub fn from_data_url(url: &str) -> Result<Self, SnapshotError> {
        let (header, payload) = url
            .split_once(";base64,")
            .ok_or_else(|| SnapshotError::DataUrl("missing ;base64, separator".to_string()))?;
        let mime = header
            .strip_prefix("data:")
            .ok_or_else(|| SnapshotError::DataUrl("missing data: scheme".to_string()))?;
        if mime != "image/png" {
            return Err(SnapshotError::DataUrl(format!("unsupported media type {}", mime)));
        }
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| SnapshotError::DataUrl(e.to_string()))?;
        Self::from_png(&bytes)
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Length of an RGBA8 buffer for the given dimensions.
pub fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> Snapshot {
        let mut pixels = Vec::with_capacity(buffer_len(width, height));
        for y in 0..height {
            for x in 0..width {
                if (x + y) % 2 == 0 {
                    pixels.extend_from_slice(&[255, 0, 0, 255]);
                } else {
                    pixels.extend_from_slice(&[0, 0, 255, 128]);
                }
            }
        }
        Snapshot::from_rgba(width, height, pixels).unwrap()
    }

    #[test]
    fn test_rejects_wrong_buffer_size() {
        let result = Snapshot::from_rgba(2, 2, vec![0; 15]);
        assert!(matches!(
            result,
            Err(SnapshotError::BufferSize { expected: 16, actual: 15, .. })
        ));
    }

    #[test]
    fn test_blank_is_transparent() {
        let snap = Snapshot::blank(3, 2);
        assert_eq!(snap.size(), (3, 2));
        assert_eq!(snap.memory_size(), 24);
        assert!(snap.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pixel_lookup() {
        let snap = checkerboard(4, 3);
        assert_eq!(snap.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(snap.pixel(1, 0), Some([0, 0, 255, 128]));
        assert_eq!(snap.pixel(4, 0), None);
        assert_eq!(snap.pixel(0, 3), None);
    }

    #[test]
    fn test_png_preserves_pixels() {
        let snap = checkerboard(5, 4);
        let png = snap.to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let decoded = Snapshot::from_png(&png).unwrap();
        assert_eq!(decoded, snap);
    }

    #[test]
    fn test_rgb_png_gets_opaque_alpha() {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, 2, 1);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[10, 20, 30, 40, 50, 60]).unwrap();
        }

        let snap = Snapshot::from_png(&png_data).unwrap();
        assert_eq!(snap.pixel(0, 0), Some([10, 20, 30, 255]));
        assert_eq!(snap.pixel(1, 0), Some([40, 50, 60, 255]));
    }

    #[test]
    fn test_data_url() {
        let snap = checkerboard(3, 3);
        let url = snap.to_data_url().unwrap();
        assert!(url.starts_with(PNG_DATA_URL_PREFIX));
        assert_eq!(Snapshot::from_data_url(&url).unwrap(), snap);
    }

    #[test]
    fn test_data_url_rejects_other_media() {
        let result = Snapshot::from_data_url("data:image/jpeg;base64,AAAA");
        assert!(matches!(result, Err(SnapshotError::DataUrl(_))));

        let result = Snapshot::from_data_url("not a data url");
        assert!(matches!(result, Err(SnapshotError::DataUrl(_))));
    }

    #[test]
    fn test_debug_omits_pixels() {
        let snap = Snapshot::blank(2, 2);
        assert_eq!(
            format!("{:?}", snap),
            "Snapshot { width: 2, height: 2, bytes: 16 }"
        );
    }
}
