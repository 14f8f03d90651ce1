//! Game catalog: scrape the storefront and populate the CMS with games,
//! developers, publishers, categories and platforms.

pub mod cms;
pub mod ingest;
pub mod scrape;
pub mod slug;
pub mod storefront;
pub mod types;

pub use cms::{CmsStore, MemoryCms, RestCms, RestCmsConfig};
pub use ingest::{IngestOptions, Ingestor, RelationNames};
pub use scrape::parse_game_page;
pub use slug::{game_slug, slugify};
pub use storefront::{ListingQuery, StorefrontClient, StorefrontConfig};
pub use types::*;
