use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use zone_core::{Zone, ZoneCreate, ZoneId};

pub const STORAGE_KEY: &str = "polygon_zone";
pub const STORAGE_VERSION: u32 = 1;
pub const STORAGE_MINOR_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unsupported storage version {found}, newest supported is {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("storage key mismatch: expected {expected}, found {found}")]
    KeyMismatch { expected: String, found: String },
}

/// Persisted form of a stored polygon zone: the creation document plus its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredZone {
    pub id: ZoneId,
    pub name: String,
    pub points: Vec<[f64; 2]>,
    #[serde(default)]
    pub passive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl StoredZone {
    /// `None` for zones that are not backed by a creation document.
    pub fn from_zone(zone: &Zone) -> Option<Self> {
        let document = zone.to_document()?;
        Some(Self {
            id: zone.id.clone(),
            name: document.name,
            points: document.points,
            passive: document.passive,
            icon: document.icon,
        })
    }

    pub fn into_parts(self) -> (ZoneId, ZoneCreate) {
        (
            self.id,
            ZoneCreate {
                name: self.name,
                points: self.points,
                passive: self.passive,
                icon: self.icon,
            },
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredItems {
    pub items: Vec<StoredZone>,
}

/// Versioned document holding every stored zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCollection {
    pub version: u32,
    #[serde(default = "default_minor_version")]
    pub minor_version: u32,
    pub key: String,
    pub data: StoredItems,
}

fn default_minor_version() -> u32 {
    1
}

impl StoredCollection {
    pub fn new(items: Vec<StoredZone>) -> Self {
        Self {
            version: STORAGE_VERSION,
            minor_version: STORAGE_MINOR_VERSION,
            key: STORAGE_KEY.to_string(),
            data: StoredItems { items },
        }
    }

    /// Rejects documents written by a newer major version or under another key.
    pub fn check_compatible(&self) -> Result<(), StorageError> {
        if self.version > STORAGE_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: self.version,
                supported: STORAGE_VERSION,
            });
        }
        if self.key != STORAGE_KEY {
            return Err(StorageError::KeyMismatch {
                expected: STORAGE_KEY.to_string(),
                found: self.key.clone(),
            });
        }
        Ok(())
    }
}

#[async_trait]
pub trait ZoneStore: Send + Sync {
    async fn load(&self) -> Result<Option<StoredCollection>, StorageError>;
    async fn save(&self, collection: &StoredCollection) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: ZoneStore + ?Sized> ZoneStore for Box<T> {
    async fn load(&self) -> Result<Option<StoredCollection>, StorageError> {
        (**self).load().await
    }

    async fn save(&self, collection: &StoredCollection) -> Result<(), StorageError> {
        (**self).save(collection).await
    }
}

/// Keeps the document in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<StoredCollection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: StoredCollection) -> Self {
        Self {
            document: Mutex::new(Some(document)),
        }
    }

    pub async fn snapshot(&self) -> Option<StoredCollection> {
        self.document.lock().await.clone()
    }
}

#[async_trait]
impl ZoneStore for MemoryStore {
    async fn load(&self) -> Result<Option<StoredCollection>, StorageError> {
        let document = self.document.lock().await.clone();
        if let Some(document) = &document {
            document.check_compatible()?;
        }
        Ok(document)
    }

    async fn save(&self, collection: &StoredCollection) -> Result<(), StorageError> {
        *self.document.lock().await = Some(collection.clone());
        Ok(())
    }
}
