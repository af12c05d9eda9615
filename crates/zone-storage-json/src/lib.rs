use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zone_storage::{STORAGE_KEY, StorageError, StoredCollection, ZoneStore};

/// Stores the zone document as `<data_dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::with_key(data_dir, STORAGE_KEY)
    }

    pub fn with_key(data_dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

#[async_trait]
impl ZoneStore for JsonFileStore {
    async fn load(&self) -> Result<Option<StoredCollection>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no zone document on disk");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        let document: StoredCollection = serde_json::from_slice(&bytes)?;
        document.check_compatible()?;
        info!(
            path = %self.path.display(),
            items = document.data.items.len(),
            "loaded zone document"
        );
        Ok(Some(document))
    }

    async fn save(&self, collection: &StoredCollection) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(collection)?;
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, bytes).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        debug!(
            path = %self.path.display(),
            items = collection.data.items.len(),
            "saved zone document"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zone_core::ZoneId;
    use zone_storage::StoredZone;

    fn document() -> StoredCollection {
        StoredCollection::new(vec![StoredZone {
            id: ZoneId::new("orchard"),
            name: "Orchard".to_string(),
            points: vec![[0.0, 0.0], [0.0, 2.0], [2.0, 2.0], [2.0, 0.0]],
            passive: true,
            icon: Some("mdi:tree".to_string()),
        }])
    }

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path());
        assert!(store.load().await.expect("load").is_none());
    }

    #[tokio::test]
    async fn saved_document_loads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("nested"));
        store.save(&document()).await.expect("save");

        assert!(store.path().ends_with("polygon_zone.json"));
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().await.expect("load"), Some(document()));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path());
        tokio::fs::write(store.path(), b"{not json").await.expect("write");
        assert!(matches!(store.load().await, Err(StorageError::Serde(_))));
    }

    #[tokio::test]
    async fn newer_version_on_disk_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path());
        let mut newer = document();
        newer.version = 7;
        store.save(&newer).await.expect("save");
        assert!(matches!(
            store.load().await,
            Err(StorageError::UnsupportedVersion { found: 7, .. })
        ));
    }
}
