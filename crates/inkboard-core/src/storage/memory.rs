//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult, decode, encode};
use crate::snapshot::Snapshot;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
///
/// Drawings are kept PNG-encoded, as a browser keeps them in local storage.
#[derive(Default)]
pub struct MemoryStorage {
    drawings: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, drawing: &Snapshot) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let data = encode(drawing);
        Box::pin(async move {
            let data = data?;
            let mut drawings = self.drawings.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            drawings.insert(id, data);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Snapshot>> {
        let id = id.to_string();
        Box::pin(async move {
            let drawings = self.drawings.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            let data = drawings
                .get(&id)
                .ok_or_else(|| StorageError::NotFound(id.clone()))?;
            decode(&id, data)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut drawings = self.drawings.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            drawings.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let drawings = self.drawings.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            Ok(drawings.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let drawings = self.drawings.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            Ok(drawings.contains_key(&id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LAST_DRAWING_KEY, block_on, list_drawings};

    fn drawing() -> Snapshot {
        Snapshot::from_rgba(2, 1, vec![255, 0, 0, 255, 0, 0, 0, 0]).unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let snap = drawing();

        block_on(storage.save("test", &snap)).unwrap();
        let loaded = block_on(storage.load("test")).unwrap();

        assert_eq!(loaded, snap);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_unencodable_drawing() {
        let storage = MemoryStorage::new();
        let empty = Snapshot::blank(0, 0);

        let result = block_on(storage.save("empty", &empty));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
        assert!(!block_on(storage.exists("empty")).unwrap());
    }

    #[test]
    fn test_exists() {
        let storage = MemoryStorage::new();

        assert!(!block_on(storage.exists("test")).unwrap());
        block_on(storage.save("test", &drawing())).unwrap();
        assert!(block_on(storage.exists("test")).unwrap());
    }

    #[test]
    fn test_delete() {
        let storage = MemoryStorage::new();

        block_on(storage.save("test", &drawing())).unwrap();
        block_on(storage.delete("test")).unwrap();
        assert!(!block_on(storage.exists("test")).unwrap());
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();

        block_on(storage.save("drawing1", &drawing())).unwrap();
        block_on(storage.save("drawing2", &drawing())).unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"drawing1".to_string()));
        assert!(list.contains(&"drawing2".to_string()));
    }

    #[test]
    fn test_list_drawings() {
        let storage = MemoryStorage::new();

        block_on(storage.save("b", &drawing())).unwrap();
        block_on(storage.save(LAST_DRAWING_KEY, &drawing())).unwrap();
        block_on(storage.save("a", &drawing())).unwrap();

        let ids = block_on(list_drawings(&storage)).unwrap();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}
