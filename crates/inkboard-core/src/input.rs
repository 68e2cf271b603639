//! Pointer input and coordinate normalization.
//!
//! Mouse events arrive in element-local offsets while touch events arrive in
//! client (viewport) coordinates. Both are converted to surface pixel
//! coordinates before they reach the stroke state machine.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers. Touch contacts report as `Left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer lifecycle event in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    /// The pointer left the surface.
    Leave {
        position: Point,
    },
    /// The platform aborted the gesture (e.g. `touchcancel`).
    Cancel,
}

impl PointerEvent {
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Leave { position } => Some(*position),
            PointerEvent::Cancel => None,
        }
    }
}

/// Converts host coordinates to surface pixel coordinates.
///
/// `bounds` is the surface element's rectangle in client coordinates (what
/// `getBoundingClientRect()` reports) and `surface_size` its backing pixel
/// size. When the two differ the element is being scaled by layout and
/// positions are scaled to match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputNormalizer {
    bounds: Rect,
    surface_size: (u32, u32),
}

impl InputNormalizer {
    pub fn new(bounds: Rect, surface_size: (u32, u32)) -> Self {
        Self {
            bounds: bounds.abs(),
            surface_size,
        }
    }

    /// A normalizer for an element placed at the origin with no scaling.
    pub fn unscaled(surface_size: (u32, u32)) -> Self {
        let (w, h) = surface_size;
        Self::new(Rect::new(0.0, 0.0, w as f64, h as f64), surface_size)
    }

    /// Update after the element moved or was resized.
    pub fn set_layout(&mut self, bounds: Rect, surface_size: (u32, u32)) {
        self.bounds = bounds.abs();
        self.surface_size = surface_size;
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    fn scale(&self) -> (f64, f64) {
        let (w, h) = self.surface_size;
        let sx = if self.bounds.width() > 0.0 {
            w as f64 / self.bounds.width()
        } else {
            1.0
        };
        let sy = if self.bounds.height() > 0.0 {
            h as f64 / self.bounds.height()
        } else {
            1.0
        };
        (sx, sy)
    }

    /// Element-local offset (mouse `offsetX/offsetY`) to surface pixels.
    pub fn offset_to_surface(&self, offset: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(offset.x * sx, offset.y * sy)
    }

    /// Client coordinate (touch `clientX/clientY`) to surface pixels.
    pub fn client_to_surface(&self, client: Point) -> Point {
        self.offset_to_surface(Point::new(client.x - self.bounds.x0, client.y - self.bounds.y0))
    }

    /// Surface position of the first active touch, if any.
    pub fn touches_to_surface(&self, touches: &[Point]) -> Option<Point> {
        touches.first().map(|&client| self.client_to_surface(client))
    }

    /// Whether a surface position lies on the surface.
    pub fn contains(&self, position: Point) -> bool {
        let (w, h) = self.surface_size;
        position.x >= 0.0 && position.y >= 0.0 && position.x < w as f64 && position.y < h as f64
    }
}
