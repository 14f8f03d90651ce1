//! Access to the CMS that owns the catalog data model.
//!
//! The pipeline only needs four operations, expressed by [`CmsStore`].
//! [`RestCms`] talks to a running CMS over its REST API; [`MemoryCms`]
//! keeps everything in process for dry runs.

pub mod memory;
pub mod rest;

pub use memory::MemoryCms;
pub use rest::{RestCms, RestCmsConfig};

use crate::types::{CatalogResult, CmsEntry, EntityKind, ImageUpload, NewGame, NewRelation};
use async_trait::async_trait;

#[async_trait]
pub trait CmsStore: Send + Sync {
    /// Look up an entry by exact name. `None` when it does not exist.
    async fn find_by_name(&self, kind: EntityKind, name: &str) -> CatalogResult<Option<CmsEntry>>;

    /// Create a developer, publisher, category or platform.
    async fn create_relation(&self, kind: EntityKind, relation: &NewRelation)
        -> CatalogResult<CmsEntry>;

    /// Create a game with its relations.
    async fn create_game(&self, game: &NewGame) -> CatalogResult<CmsEntry>;

    /// Attach an image to an existing entry.
    async fn upload_image(&self, upload: ImageUpload) -> CatalogResult<()>;
}
