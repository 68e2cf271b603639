//! Drawing surface adapter.
//!
//! The presentation layer owns the real pixel surface and exposes it to the
//! core through [`Surface`] (snapshot/restore) and [`Paint`] (stroke
//! commands). [`MemorySurface`] is a headless implementation backed by an
//! RGBA buffer.

use crate::snapshot::{BYTES_PER_PIXEL, Snapshot, buffer_len};
use crate::tools::{CompositeMode, StrokeStyle};
use kurbo::{Line, ParamCurveNearest, Point, Rect};
use thiserror::Error;

/// Surface access errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("Drawing surface is unavailable (zero extent or not initialized)")]
    Unavailable,
    #[error("Snapshot is {expected:?} but the surface is {actual:?}")]
    DimensionMismatch {
        /// Dimensions the snapshot was captured at.
        expected: (u32, u32),
        /// Current dimensions of the live surface.
        actual: (u32, u32),
    },
}

/// Pixel snapshot/restore primitives of a drawing surface.
pub trait Surface {
    /// Current `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    /// Capture the full pixel contents.
    ///
    /// Fails with [`SurfaceError::Unavailable`] when the surface has zero
    /// extent or is not initialized.
    fn snapshot(&self) -> Result<Snapshot, SurfaceError>;

    /// Overwrite the full pixel contents.
    ///
    /// Fails with [`SurfaceError::DimensionMismatch`] when the snapshot was
    /// captured at a different size than the surface has now.
    fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SurfaceError>;

    /// Whether the surface currently has a non-zero extent.
    fn is_available(&self) -> bool {
        let (width, height) = self.size();
        width > 0 && height > 0
    }
}

/// Incremental drawing commands applied while a stroke is in progress.
///
/// Painting on an unavailable surface does nothing.
pub trait Paint: Surface {
    /// Stroke a straight segment with round caps.
    fn stroke_segment(&mut self, from: Point, to: Point, style: &StrokeStyle);

    /// Stroke the outline of a rectangle.
    fn stroke_rect(&mut self, rect: Rect, style: &StrokeStyle);

    /// Make every pixel inside `rect` transparent.
    fn clear_rect(&mut self, rect: Rect);

    /// Make the whole surface transparent.
    fn clear(&mut self) {
        let (width, height) = self.size();
        self.clear_rect(Rect::new(0.0, 0.0, width as f64, height as f64));
    }

    /// Composite `image` over the surface with its top-left corner at the
    /// origin. Parts of the image outside the surface are clipped.
    fn draw_image(&mut self, image: &Snapshot);
}

/// Headless RGBA8 surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::uninitialized()
    }
}

impl MemorySurface {
    /// Create a transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; buffer_len(width, height)],
        }
    }

    /// A zero-sized surface, as before the host element has been laid out.
    pub fn uninitialized() -> Self {
        Self::new(0, 0)
    }

    /// Change the surface size, keeping the overlapping region.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        let mut pixels = vec![0; buffer_len(width, height)];
        let copy_w = width.min(self.width) as usize * BYTES_PER_PIXEL;
        for y in 0..height.min(self.height) as usize {
            let src = y * self.width as usize * BYTES_PER_PIXEL;
            let dst = y * width as usize * BYTES_PER_PIXEL;
            pixels[dst..dst + copy_w].copy_from_slice(&self.pixels[src..src + copy_w]);
        }
        log::debug!(
            "Resized surface {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        self.width = width;
        self.height = height;
        self.pixels = pixels;
    }

    /// RGBA value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.index(x, y)?;
        let px = &self.pixels[i..i + BYTES_PER_PIXEL];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Raw RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether any pixel is non-transparent.
    pub fn has_content(&self) -> bool {
        self.pixels.chunks_exact(BYTES_PER_PIXEL).any(|px| px[3] != 0)
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL)
    }

    /// Pixel range covering `rect`, clamped to the surface. Pixels are
    /// included when their center lies inside the (expanded) rect.
    fn pixel_bounds(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let rect = rect.abs();
        let x0 = (rect.x0 - 0.5).ceil().max(0.0);
        let y0 = (rect.y0 - 0.5).ceil().max(0.0);
        let x1 = (rect.x1 - 0.5).floor().min(self.width as f64 - 1.0);
        let y1 = (rect.y1 - 0.5).floor().min(self.height as f64 - 1.0);
        if x1 < x0 || y1 < y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    fn blend(&mut self, x: u32, y: u32, color: [u8; 4], mode: CompositeMode) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let dst = &mut self.pixels[i..i + BYTES_PER_PIXEL];
        let sa = color[3] as f32 / 255.0;
        let da = dst[3] as f32 / 255.0;
        match mode {
            CompositeMode::SourceOver => {
                let out_a = sa + da * (1.0 - sa);
                if out_a <= 0.0 {
                    dst.fill(0);
                    return;
                }
                for c in 0..3 {
                    let sc = color[c] as f32;
                    let dc = dst[c] as f32;
                    dst[c] = ((sc * sa + dc * da * (1.0 - sa)) / out_a).round() as u8;
                }
                dst[3] = (out_a * 255.0).round() as u8;
            }
            CompositeMode::DestinationOut => {
                let out_a = da * (1.0 - sa);
                if out_a <= 0.0 {
                    dst.fill(0);
                } else {
                    dst[3] = (out_a * 255.0).round() as u8;
                }
            }
        }
    }
}

impl Surface for MemorySurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn snapshot(&self) -> Result<Snapshot, SurfaceError> {
        if !self.is_available() {
            return Err(SurfaceError::Unavailable);
        }
        Snapshot::from_rgba(self.width, self.height, self.pixels.clone())
            .map_err(|_| SurfaceError::Unavailable)
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SurfaceError> {
        if !self.is_available() {
            return Err(SurfaceError::Unavailable);
        }
        if snapshot.size() != self.size() {
            return Err(SurfaceError::DimensionMismatch {
                expected: snapshot.size(),
                actual: self.size(),
            });
        }
        self.pixels.copy_from_slice(snapshot.pixels());
        Ok(())
    }
}

impl Paint for MemorySurface {
    fn stroke_segment(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        if !self.is_available() || style.width.is_nan() || style.width <= 0.0 {
            return;
        }
        let radius = style.width / 2.0;
        let bounds = Rect::from_points(from, to).inflate(radius, radius);
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(bounds) else {
            return;
        };
        let line = Line::new(from, to);
        let color = style.color.to_array();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let distance_sq = if from == to {
                    (center - from).hypot2()
                } else {
                    line.nearest(center, 1e-9).distance_sq
                };
                if distance_sq <= radius * radius {
                    self.blend(x, y, color, style.composite);
                }
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, style: &StrokeStyle) {
        let rect = rect.abs();
        let corners = [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ];
        for i in 0..corners.len() {
            self.stroke_segment(corners[i], corners[(i + 1) % corners.len()], style);
        }
    }

    fn clear_rect(&mut self, rect: Rect) {
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(rect) else {
            return;
        };
        for y in y0..=y1 {
            let start = (y as usize * self.width as usize + x0 as usize) * BYTES_PER_PIXEL;
            let end = (y as usize * self.width as usize + x1 as usize + 1) * BYTES_PER_PIXEL;
            self.pixels[start..end].fill(0);
        }
    }

    fn draw_image(&mut self, image: &Snapshot) {
        let width = image.width().min(self.width);
        let height = image.height().min(self.height);
        for y in 0..height {
            for x in 0..width {
                match image.pixel(x, y) {
                    Some(px) if px[3] != 0 => self.blend(x, y, px, CompositeMode::SourceOver),
                    _ => {}
                }
            }
        }
    }
}
