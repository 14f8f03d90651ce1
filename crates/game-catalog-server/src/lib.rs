//! Game catalog server: HTTP trigger and CLI around the ingestion pipeline.

pub mod config;
pub mod error;
pub mod populate;
pub mod transport;

pub use config::{Overrides, Settings};
pub use error::{ServerError, ServerResult};
pub use transport::{router, HttpTransport, ServerState};

use std::sync::Arc;

use game_catalog::{CatalogResult, CmsStore, Ingestor, MemoryCms, RestCms, StorefrontClient};

/// Wire an [`Ingestor`] from settings. `dry_run` keeps every write in memory.
pub fn build_ingestor(settings: &Settings, dry_run: bool) -> CatalogResult<Ingestor> {
    let storefront = StorefrontClient::new(&settings.storefront())?;
    let cms: Arc<dyn CmsStore> = if dry_run {
        Arc::new(MemoryCms::new())
    } else {
        Arc::new(RestCms::new(&settings.cms())?)
    };
    Ok(Ingestor::new(storefront, cms).with_options(settings.ingest()))
}
