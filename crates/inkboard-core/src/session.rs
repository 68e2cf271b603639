//! Drawing session: the stroke state machine and the whiteboard facade.
//!
//! A [`Whiteboard`] owns the surface, the history and the tool settings.
//! Pointer events paint directly onto the surface while a stroke is in
//! progress; the history records exactly one snapshot when the stroke ends.

use crate::config::{BoardConfig, ConfigError, LeavePolicy};
use crate::history::History;
use crate::input::{Modifiers, MouseButton, PointerEvent};
use crate::shortcuts::{Command, ShortcutRegistry};
use crate::snapshot::{Snapshot, SnapshotError};
use crate::storage::{LAST_DRAWING_KEY, Storage, StorageError};
use crate::surface::{Paint, SurfaceError};
use crate::tools::{Color, StrokeStyle, ToolKind, ToolSettings};
use kurbo::{Point, Rect};
use thiserror::Error;

/// Errors from whiteboard operations that reach outside the history.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A stroke in progress.
#[derive(Debug, Clone)]
pub struct Stroke {
    pub tool: ToolKind,
    pub style: StrokeStyle,
    pub start: Point,
    pub last: Point,
    /// Whether anything has been painted yet.
    pub painted: bool,
    /// Surface contents when the stroke began.
    base: Option<Snapshot>,
}

/// Stroke lifecycle state.
#[derive(Debug, Clone, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Stroking(Stroke),
}

/// Result of feeding one pointer event to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Event had no effect in the current state.
    Ignored,
    /// A stroke began.
    Started,
    /// The stroke painted onto the surface.
    Drew,
    /// The stroke ended and was recorded in the history.
    Committed,
    /// The stroke ended without changing anything, so nothing was recorded.
    Unchanged,
    /// The stroke was abandoned and the surface reverted.
    Discarded,
    /// The stroke ended but the surface could not be captured.
    Skipped,
}

/// A drawing surface together with its undo history and tool state.
pub struct Whiteboard<S: Paint> {
    surface: S,
    history: History,
    tools: ToolSettings,
    state: StrokeState,
    leave_policy: LeavePolicy,
    pointer_position: Option<Point>,
}

impl<S: Paint> Whiteboard<S> {
    /// Create a board over `surface` and record its current contents as the
    /// initial state, so the first undo returns to it.
    pub fn new(surface: S, config: &BoardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut board = Self {
            surface,
            history: History::new(config.max_history),
            tools: ToolSettings::new(
                config.default_line_width,
                config.eraser_width,
                config.min_line_width,
                config.max_line_width,
            ),
            state: StrokeState::Idle,
            leave_policy: config.leave_policy,
            pointer_position: None,
        };
        board.reset_history();
        Ok(board)
    }

    /// Replace the history with the current surface contents.
    ///
    /// With an unavailable surface the history is left empty.
    pub fn reset_history(&mut self) {
        match self.surface.snapshot() {
            Ok(initial) => self.history.reset(initial),
            Err(e) => {
                log::warn!("Starting with empty history: {}", e);
                self.history.clear();
            }
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for host-side changes such as resizing. Changes made
    /// here are not recorded.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    pub fn state(&self) -> &StrokeState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Stroking(_))
    }

    /// Last pointer position seen on the surface.
    pub fn pointer_position(&self) -> Option<Point> {
        self.pointer_position
    }

    /// Feed one normalized pointer event through the stroke state machine.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        if let Some(position) = event.position() {
            self.pointer_position = Some(position);
        }

        match event {
            PointerEvent::Down { position, button } => self.begin_stroke(position, button),
            PointerEvent::Move { position } => self.continue_stroke(position),
            PointerEvent::Up { position, button } => {
                if button != MouseButton::Left {
                    return PointerOutcome::Ignored;
                }
                self.end_stroke(Some(position))
            }
            PointerEvent::Leave { position } => match self.leave_policy {
                LeavePolicy::Commit => self.end_stroke(Some(position)),
                LeavePolicy::Discard => self.cancel_stroke(),
            },
            PointerEvent::Cancel => self.cancel_stroke(),
        }
    }

    fn begin_stroke(&mut self, position: Point, button: MouseButton) -> PointerOutcome {
        if button != MouseButton::Left || self.is_drawing() {
            return PointerOutcome::Ignored;
        }
        let stroke = Stroke {
            tool: self.tools.tool(),
            style: self.tools.stroke_style(),
            start: position,
            last: position,
            painted: false,
            base: self.surface.snapshot().ok(),
        };
        log::trace!("Stroke started with {:?} at {:?}", stroke.tool, position);
        self.state = StrokeState::Stroking(stroke);
        PointerOutcome::Started
    }

    fn continue_stroke(&mut self, position: Point) -> PointerOutcome {
        let StrokeState::Stroking(stroke) = &mut self.state else {
            return PointerOutcome::Ignored;
        };
        paint_to(&mut self.surface, stroke, position);
        PointerOutcome::Drew
    }

    /// Finish the stroke, painting up to `position` first, and record it if
    /// it changed the surface.
    fn end_stroke(&mut self, position: Option<Point>) -> PointerOutcome {
        let StrokeState::Stroking(mut stroke) = std::mem::take(&mut self.state) else {
            return PointerOutcome::Ignored;
        };

        match stroke.tool {
            // The rectangle is always drawn on release, even for a click.
            ToolKind::Rectangle => {
                let end = position.unwrap_or(stroke.last);
                paint_to(&mut self.surface, &mut stroke, end);
            }
            ToolKind::Pen | ToolKind::Eraser => {
                if let Some(end) = position.filter(|&p| p != stroke.last) {
                    paint_to(&mut self.surface, &mut stroke, end);
                }
            }
        }

        if !stroke.painted {
            return PointerOutcome::Unchanged;
        }
        if self.commit() {
            PointerOutcome::Committed
        } else {
            PointerOutcome::Skipped
        }
    }

    /// Abandon the stroke in progress and put back what was on the surface
    /// before it started.
    fn cancel_stroke(&mut self) -> PointerOutcome {
        let StrokeState::Stroking(stroke) = std::mem::take(&mut self.state) else {
            return PointerOutcome::Ignored;
        };
        if stroke.painted {
            let reverted = match &stroke.base {
                Some(base) => self.surface.restore(base),
                None => self.history.restore_current(&mut self.surface),
            };
            if let Err(e) = reverted {
                log::warn!("Could not revert cancelled stroke: {}", e);
            }
        }
        log::trace!("Stroke cancelled");
        PointerOutcome::Discarded
    }

    /// Record the current surface. Returns false when the surface could not
    /// be captured, in which case the history is unchanged.
    fn commit(&mut self) -> bool {
        match self.history.capture(&self.surface) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Skipping history capture: {}", e);
                false
            }
        }
    }

    /// Switch tools. A stroke in progress is finished and recorded first.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.finish_stroke();
        self.tools.set_tool(tool);
    }

    fn finish_stroke(&mut self) {
        if self.is_drawing() {
            self.end_stroke(None);
        }
    }

    /// Set the color used by strokes started from now on.
    pub fn set_color(&mut self, color: Color) {
        self.tools.set_color(color);
    }

    /// Set the color from a hex string; unparseable input selects black.
    pub fn set_color_hex(&mut self, color: &str) {
        self.tools.set_color(Color::parse(color));
    }

    /// Set the active tool's line width, clamped to the configured range.
    pub fn set_line_width(&mut self, width: f64) {
        self.tools.set_line_width(width);
    }

    /// Clear the whole surface and record the result.
    pub fn clear(&mut self) -> bool {
        self.abandon_stroke();
        self.surface.clear();
        self.commit()
    }

    /// Draw an externally loaded image at the top-left corner and record the
    /// result. An image larger than the surface is clipped; a smaller one
    /// leaves the rest of the drawing in place.
    pub fn load_image(&mut self, image: &Snapshot) -> Result<bool, SurfaceError> {
        self.abandon_stroke();
        if !self.surface.is_available() {
            return Err(SurfaceError::Unavailable);
        }
        if image.size() != self.surface.size() {
            log::debug!(
                "Drawing {:?} image onto {:?} surface",
                image.size(),
                self.surface.size()
            );
        }
        self.surface.draw_image(image);
        Ok(self.commit())
    }

    /// Undo the last recorded change. A stroke in progress is abandoned.
    pub fn undo(&mut self) -> Result<bool, SurfaceError> {
        self.abandon_stroke();
        self.history.undo(&mut self.surface)
    }

    /// Redo the last undone change. A stroke in progress is abandoned.
    pub fn redo(&mut self) -> Result<bool, SurfaceError> {
        self.abandon_stroke();
        self.history.redo(&mut self.surface)
    }

    fn abandon_stroke(&mut self) {
        if self.is_drawing() {
            self.cancel_stroke();
        }
    }

    /// Run a board command. `Save` stores the drawing as the last drawing.
    pub async fn execute<T: Storage + ?Sized>(
        &mut self,
        command: Command,
        storage: &T,
    ) -> Result<bool, BoardError> {
        match command {
            Command::Undo => Ok(self.undo()?),
            Command::Redo => Ok(self.redo()?),
            Command::Clear => Ok(self.clear()),
            Command::SelectTool(tool) => {
                self.set_tool(tool);
                Ok(true)
            }
            Command::Save => {
                self.finish_stroke();
                self.save_to(storage, LAST_DRAWING_KEY).await?;
                Ok(true)
            }
        }
    }

    /// Handle a key press, running the bound command if there is one.
    pub async fn handle_key<T: Storage + ?Sized>(
        &mut self,
        key: &str,
        modifiers: Modifiers,
        storage: &T,
    ) -> Result<Option<Command>, BoardError> {
        let Some(command) = ShortcutRegistry::command_for(key, modifiers) else {
            return Ok(None);
        };
        self.execute(command, storage).await?;
        Ok(Some(command))
    }

    /// Current surface contents as PNG.
    pub fn export_png(&self) -> Result<Vec<u8>, BoardError> {
        Ok(self.surface.snapshot()?.to_png()?)
    }

    /// Current surface contents as a `data:image/png;base64,` URL.
    pub fn export_data_url(&self) -> Result<String, BoardError> {
        Ok(self.surface.snapshot()?.to_data_url()?)
    }

    /// Save the current drawing under `id` and as the last drawing.
    pub async fn save_to<T: Storage + ?Sized>(
        &self,
        storage: &T,
        id: &str,
    ) -> Result<(), BoardError> {
        let drawing = self.surface.snapshot()?;
        storage.save(id, &drawing).await?;
        if id != LAST_DRAWING_KEY {
            storage.save(LAST_DRAWING_KEY, &drawing).await?;
        }
        log::info!("Saved drawing {}", id);
        Ok(())
    }

    /// Load drawing `id` onto the surface and record it.
    pub async fn restore_from<T: Storage + ?Sized>(
        &mut self,
        storage: &T,
        id: &str,
    ) -> Result<(), BoardError> {
        let drawing = storage.load(id).await?;
        self.load_image(&drawing)?;
        log::info!("Restored drawing {}", id);
        Ok(())
    }

    /// Restore the last saved drawing if there is one. Returns whether a
    /// drawing was loaded.
    pub async fn restore_last<T: Storage + ?Sized>(&mut self, storage: &T) -> Result<bool, BoardError> {
        match self.restore_from(storage, LAST_DRAWING_KEY).await {
            Ok(()) => Ok(true),
            Err(BoardError::Storage(StorageError::NotFound(_))) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Paint the stroke from its last position to `position`.
fn paint_to<S: Paint>(surface: &mut S, stroke: &mut Stroke, position: Point) {
    match stroke.tool {
        ToolKind::Pen | ToolKind::Eraser => {
            surface.stroke_segment(stroke.last, position, &stroke.style);
        }
        ToolKind::Rectangle => {
            // Preview: redraw from the pre-stroke image each time.
            if let Some(base) = &stroke.base {
                if let Err(e) = surface.restore(base) {
                    log::warn!("Could not restore rectangle preview base: {}", e);
                }
            }
            surface.stroke_rect(Rect::from_points(stroke.start, position), &stroke.style);
        }
    }
    stroke.last = position;
    stroke.painted = true;
}
