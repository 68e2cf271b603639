//! Saved-drawing persistence.
//!
//! Drawings are stored as PNG images keyed by an id, the same payload the
//! browser keeps in local storage or posts when sharing.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::snapshot::Snapshot;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Key of the drawing restored when a board starts.
pub const LAST_DRAWING_KEY: &str = "__last_drawing__";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Drawing not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for drawing storage backends.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Save a drawing.
    fn save(&self, id: &str, drawing: &Snapshot) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a drawing.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Snapshot>>;

    /// Delete a drawing.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all drawing IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a drawing exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Trait for drawing storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Save a drawing.
    fn save(&self, id: &str, drawing: &Snapshot) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a drawing.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Snapshot>>;

    /// Delete a drawing.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all drawing IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a drawing exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Ids of the user's saved drawings in name order. The startup drawing
/// kept under [`LAST_DRAWING_KEY`] is not listed.
pub async fn list_drawings<T: Storage + ?Sized>(storage: &T) -> StorageResult<Vec<String>> {
    let mut ids = storage.list().await?;
    ids.retain(|id| id != LAST_DRAWING_KEY);
    ids.sort();
    Ok(ids)
}

/// Encode a drawing for storage.
fn encode(drawing: &Snapshot) -> StorageResult<Vec<u8>> {
    drawing
        .to_png()
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decode a stored drawing.
fn decode(id: &str, data: &[u8]) -> StorageResult<Snapshot> {
    Snapshot::from_png(data)
        .map_err(|e| StorageError::Serialization(format!("Failed to decode {}: {}", id, e)))
}

/// Minimal executor for driving storage futures in tests.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
