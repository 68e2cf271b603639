//! Inkboard Core Library
//!
//! Snapshot-based undo/redo history and canvas state management for the
//! Inkboard whiteboard. The presentation layer owns the pixel surface and
//! drives the core through the [`Surface`]/[`Paint`] adapter traits.

pub mod config;
pub mod history;
pub mod input;
pub mod session;
pub mod shortcuts;
pub mod snapshot;
pub mod storage;
pub mod surface;
pub mod tools;

pub use config::{BoardConfig, ConfigError, LeavePolicy};
pub use history::{DEFAULT_MAX_HISTORY, History};
pub use input::{InputNormalizer, Modifiers, MouseButton, PointerEvent};
pub use session::{BoardError, PointerOutcome, StrokeState, Whiteboard};
pub use shortcuts::{Command, ShortcutRegistry};
pub use snapshot::{Snapshot, SnapshotError};
pub use storage::{MemoryStorage, Storage, StorageError, StorageResult, list_drawings};
pub use surface::{MemorySurface, Paint, Surface, SurfaceError};
pub use tools::{Color, CompositeMode, StrokeStyle, ToolKind, ToolSettings};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
