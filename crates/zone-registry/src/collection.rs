//! Editable polygon zones backed by a [`ZoneStore`].
//!
//! Every successful mutation rewrites the whole stored document before the
//! in-memory copy is changed, so a failed save leaves both untouched.
//! Records skipped on load are carried along unchanged in every later save.

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};
use zone_core::{
    ErrorCode, IdManager, Zone, ZoneChange, ZoneChangeKind, ZoneCreate, ZoneError, ZoneId,
    ZoneUpdate, create_zone, update_zone,
};
use zone_storage::{StorageError, StoredCollection, StoredZone, ZoneStore};

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error(transparent)]
    Zone(#[from] ZoneError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CollectionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CollectionError::Zone(err) => err.code(),
            CollectionError::Storage(_) => ErrorCode::Internal,
        }
    }
}

pub struct ZoneCollection<S> {
    store: S,
    ids: IdManager,
    items: BTreeMap<ZoneId, Zone>,
    skipped: Vec<StoredZone>,
}

impl<S: ZoneStore> ZoneCollection<S> {
    /// `ids` should already hold the ids of zones defined outside the
    /// collection so stored zones never shadow them.
    pub fn new(store: S, ids: IdManager) -> Self {
        Self {
            store,
            ids,
            items: BTreeMap::new(),
            skipped: Vec::new(),
        }
    }

    /// Reads the stored document. Records that fail validation or reuse a
    /// taken id are not loaded; they are kept aside and written back as-is.
    pub async fn load(&mut self) -> Result<Vec<ZoneChange>, CollectionError> {
        let Some(document) = self.store.load().await? else {
            info!("no stored zones");
            return Ok(Vec::new());
        };

        let mut changes = Vec::with_capacity(document.data.items.len());
        for stored in document.data.items {
            if self.ids.has_id(&stored.id) {
                warn!(zone_id = %stored.id, "keeping stored zone with duplicate id out of service");
                self.skipped.push(stored);
                continue;
            }
            let (id, create) = stored.clone().into_parts();
            match Zone::from_document(id.clone(), create) {
                Ok(zone) => {
                    self.ids.reserve(&id);
                    self.items.insert(id, zone.clone());
                    changes.push(ZoneChange {
                        kind: ZoneChangeKind::Added,
                        zone,
                    });
                }
                Err(err) => {
                    warn!(zone_id = %id, error = %err, "keeping invalid stored zone out of service");
                    self.ids.reserve(&id);
                    self.skipped.push(stored);
                }
            }
        }
        info!(count = changes.len(), skipped = self.skipped.len(), "loaded stored zones");
        Ok(changes)
    }

    pub async fn create(&mut self, input: ZoneCreate) -> Result<ZoneChange, CollectionError> {
        let mut ids = self.ids.clone();
        let zone = create_zone(input, &mut ids)?;
        let mut items = self.items.clone();
        items.insert(zone.id.clone(), zone.clone());
        self.persist(items).await?;
        self.ids = ids;
        info!(zone_id = %zone.id, name = %zone.name, "zone created");
        Ok(ZoneChange {
            kind: ZoneChangeKind::Added,
            zone,
        })
    }

    pub async fn update(&mut self, id: &ZoneId, patch: ZoneUpdate) -> Result<ZoneChange, CollectionError> {
        let existing = self.items.get(id).ok_or_else(|| ZoneError::NotFound(id.clone()))?;
        let zone = update_zone(existing, patch)?;
        let mut items = self.items.clone();
        items.insert(id.clone(), zone.clone());
        self.persist(items).await?;
        info!(zone_id = %id, "zone updated");
        Ok(ZoneChange {
            kind: ZoneChangeKind::Updated,
            zone,
        })
    }

    pub async fn delete(&mut self, id: &ZoneId) -> Result<ZoneChange, CollectionError> {
        let mut items = self.items.clone();
        let zone = items.remove(id).ok_or_else(|| ZoneError::NotFound(id.clone()))?;
        self.persist(items).await?;
        info!(zone_id = %id, "zone deleted");
        Ok(ZoneChange {
            kind: ZoneChangeKind::Removed,
            zone,
        })
    }

    pub fn get(&self, id: &ZoneId) -> Option<&Zone> {
        self.items.get(id)
    }

    pub fn list(&self) -> impl Iterator<Item = &Zone> {
        self.items.values()
    }

    /// Stored records that were not loaded, in document order.
    pub fn skipped(&self) -> &[StoredZone] {
        &self.skipped
    }

    pub fn has_id(&self, id: &ZoneId) -> bool {
        self.ids.has_id(id)
    }

    /// Claims `id` for a zone managed outside the collection.
    pub fn reserve_external(&mut self, id: &ZoneId) -> Result<(), ZoneError> {
        if self.ids.has_id(id) {
            return Err(ZoneError::DuplicateId(id.clone()));
        }
        self.ids.reserve(id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    async fn persist(&mut self, items: BTreeMap<ZoneId, Zone>) -> Result<(), CollectionError> {
        let records = items
            .values()
            .filter_map(StoredZone::from_zone)
            .chain(self.skipped.iter().cloned())
            .collect();
        let document = StoredCollection::new(records);
        self.store.save(&document).await?;
        self.items = items;
        Ok(())
    }
}
