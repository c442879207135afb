//! Collection storage backends
//!
//! A collection is a single JSON document addressed by a fixed name.
//! Writers replace the whole document; there is no partial update.

use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Persistence seam for named JSON collections.
///
/// Implementations must be safe to share behind an `Arc`; all methods take
/// `&self` so stores can be injected into several typed layers at once.
pub trait StateStore: Send + Sync {
    /// Read the full payload of a collection, if it exists.
    fn read(&self, collection: &str) -> Result<Option<String>>;

    /// Replace the full payload of a collection.
    fn write(&self, collection: &str, payload: &str) -> Result<()>;

    /// Remove a collection. Removing a missing collection is not an error.
    fn remove(&self, collection: &str) -> Result<()>;
}

fn validate_collection(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidCollection(name.to_string()))
    }
}

/// File-backed store: one `<collection>.json` file per collection.
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    /// Open or create the data directory
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        tracing::info!("Opened JSON state store at {:?}", data_dir);

        Ok(Self { data_dir })
    }

    fn path_for(&self, collection: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection))
    }
}

impl StateStore for JsonFileStore {
    fn read(&self, collection: &str) -> Result<Option<String>> {
        validate_collection(collection)?;

        match std::fs::read_to_string(self.path_for(collection)) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, collection: &str, payload: &str) -> Result<()> {
        validate_collection(collection)?;

        // Write-then-rename so readers never observe a torn document
        let target = self.path_for(collection);
        let tmp = self.data_dir.join(format!(".{}.json.tmp", collection));
        std::fs::write(&tmp, payload)?;
        std::fs::rename(&tmp, &target)?;

        tracing::debug!(
            collection = collection,
            bytes = payload.len(),
            "Persisted collection"
        );

        Ok(())
    }

    fn remove(&self, collection: &str) -> Result<()> {
        validate_collection(collection)?;

        match std::fs::remove_file(self.path_for(collection)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn read(&self, collection: &str) -> Result<Option<String>> {
        validate_collection(collection)?;
        Ok(self.collections.read().get(collection).cloned())
    }

    fn write(&self, collection: &str, payload: &str) -> Result<()> {
        validate_collection(collection)?;
        self.collections
            .write()
            .insert(collection.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&self, collection: &str) -> Result<()> {
        validate_collection(collection)?;
        self.collections.write().remove(collection);
        Ok(())
    }
}
