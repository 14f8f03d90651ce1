//! Core data types shared by the storefront client, the CMS stores and the
//! ingestion pipeline.

use serde::{Deserialize, Serialize};

/// Page of the storefront's filtered listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingPage {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default, rename = "totalPages")]
    pub total_pages: Option<u32>,
}

/// A product as listed by the storefront.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub price: Option<ProductPrice>,
    #[serde(default)]
    pub global_release_date: Option<i64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub supported_operating_systems: Vec<String>,
    #[serde(default)]
    pub developer: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPrice {
    pub amount: String,
}

/// Details scraped from a product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameInfo {
    pub rating: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for GameInfo {
    fn default() -> Self {
        Self {
            rating: DEFAULT_RATING.to_string(),
            short_description: None,
            description: None,
        }
    }
}

/// Rating assigned when the product page has no age restriction badge.
pub const DEFAULT_RATING: &str = "BR0";

/// CMS collections the pipeline reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Game,
    Developer,
    Publisher,
    Category,
    Platform,
}

impl EntityKind {
    /// Relation kinds in the order the pipeline creates them.
    pub const RELATIONS: [EntityKind; 4] = [
        EntityKind::Developer,
        EntityKind::Publisher,
        EntityKind::Category,
        EntityKind::Platform,
    ];

    /// REST collection path segment.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Game => "games",
            EntityKind::Developer => "developers",
            EntityKind::Publisher => "publishers",
            EntityKind::Category => "categories",
            EntityKind::Platform => "platforms",
        }
    }

    /// Singular model name, as used by the upload `ref` field.
    pub fn model(self) -> &'static str {
        match self {
            EntityKind::Game => "game",
            EntityKind::Developer => "developer",
            EntityKind::Publisher => "publisher",
            EntityKind::Category => "category",
            EntityKind::Platform => "platform",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.model())
    }
}

/// An entry as stored by the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsEntry {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Body for creating a developer, publisher, category or platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelation {
    pub name: String,
    pub slug: String,
}

/// Body for creating a game. Relations are referenced by CMS id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGame {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    pub categories: Vec<u64>,
    pub platforms: Vec<u64>,
    pub developers: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<u64>,
    /// Absent when the product page could not be scraped.
    #[serde(flatten)]
    pub info: Option<GameInfo>,
}

/// Media field of a game an image is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageField {
    Cover,
    Gallery,
}

impl ImageField {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageField::Cover => "cover",
            ImageField::Gallery => "gallery",
        }
    }
}

/// A downloaded image ready to be attached to a CMS entry.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub ref_id: u64,
    pub kind: EntityKind,
    pub field: ImageField,
    /// File name including the `.jpg` extension.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopulateReport {
    pub products_seen: usize,
    pub relations_created: usize,
    pub games_created: usize,
    pub games_skipped: usize,
    pub images_uploaded: usize,
    pub errors: Vec<String>,
}

/// Errors that can occur while scraping the storefront or writing to the CMS.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("CMS error: {0}")]
    Cms(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience result type.
pub type CatalogResult<T> = Result<T, CatalogError>;
