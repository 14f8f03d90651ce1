//! In-process [`CmsStore`] used for dry runs.

use super::CmsStore;
use crate::types::{
    CatalogError, CatalogResult, CmsEntry, EntityKind, ImageField, ImageUpload, NewGame,
    NewRelation,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// An upload recorded by [`MemoryCms`]; the bytes are reduced to their size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub ref_id: u64,
    pub kind: EntityKind,
    pub field: ImageField,
    pub filename: String,
    pub size: usize,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    entries: HashMap<EntityKind, Vec<CmsEntry>>,
    games: Vec<(u64, NewGame)>,
    uploads: Vec<StoredUpload>,
}

impl Inner {
    fn insert(&mut self, kind: EntityKind, name: &str, slug: &str) -> CmsEntry {
        self.next_id += 1;
        let entry = CmsEntry {
            id: self.next_id,
            name: name.to_string(),
            slug: Some(slug.to_string()),
        };
        self.entries.entry(kind).or_default().push(entry.clone());
        entry
    }
}

/// Ids start at 1 and are shared across collections.
#[derive(Default)]
pub struct MemoryCms {
    inner: RwLock<Inner>,
}

impl MemoryCms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an entry, as if it had been created earlier.
    pub async fn seed(&self, kind: EntityKind, name: &str) -> CmsEntry {
        let slug = crate::slug::slugify(name);
        self.inner.write().await.insert(kind, name, &slug)
    }

    pub async fn entries(&self, kind: EntityKind) -> Vec<CmsEntry> {
        self.inner
            .read()
            .await
            .entries
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Games created through [`CmsStore::create_game`], with their ids.
    pub async fn games(&self) -> Vec<(u64, NewGame)> {
        self.inner.read().await.games.clone()
    }

    pub async fn uploads(&self) -> Vec<StoredUpload> {
        self.inner.read().await.uploads.clone()
    }
}

#[async_trait]
impl CmsStore for MemoryCms {
    async fn find_by_name(&self, kind: EntityKind, name: &str) -> CatalogResult<Option<CmsEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .get(&kind)
            .and_then(|list| list.iter().find(|e| e.name == name))
            .cloned())
    }

    async fn create_relation(
        &self,
        kind: EntityKind,
        relation: &NewRelation,
    ) -> CatalogResult<CmsEntry> {
        if kind == EntityKind::Game {
            return Err(CatalogError::InvalidInput(
                "games are created with create_game".to_string(),
            ));
        }
        let mut inner = self.inner.write().await;
        Ok(inner.insert(kind, &relation.name, &relation.slug))
    }

    async fn create_game(&self, game: &NewGame) -> CatalogResult<CmsEntry> {
        let mut inner = self.inner.write().await;
        let entry = inner.insert(EntityKind::Game, &game.name, &game.slug);
        inner.games.push((entry.id, game.clone()));
        Ok(entry)
    }

    async fn upload_image(&self, upload: ImageUpload) -> CatalogResult<()> {
        let mut inner = self.inner.write().await;
        let exists = inner
            .entries
            .get(&upload.kind)
            .is_some_and(|list| list.iter().any(|e| e.id == upload.ref_id));
        if !exists {
            return Err(CatalogError::Cms(format!(
                "no {} with id {}",
                upload.kind, upload.ref_id
            )));
        }
        inner.uploads.push(StoredUpload {
            ref_id: upload.ref_id,
            kind: upload.kind,
            field: upload.field,
            filename: upload.filename,
            size: upload.bytes.len(),
        });
        Ok(())
    }
}
