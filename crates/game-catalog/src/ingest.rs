//! The ingestion pipeline: listing → relations → games → images.
//!
//! Everything runs sequentially. A failure on one entity is logged,
//! recorded in the [`PopulateReport`] and skipped; only the initial
//! listing fetch aborts a run.

use crate::cms::CmsStore;
use crate::scrape::parse_game_page;
use crate::slug::{game_slug, slugify};
use crate::storefront::{ListingQuery, StorefrontClient};
use crate::types::{
    CatalogResult, EntityKind, GameInfo, ImageField, ImageUpload, NewGame, NewRelation,
    PopulateReport, Product,
};
use chrono::{DateTime, SecondsFormat};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Gallery images uploaded per game.
pub const DEFAULT_GALLERY_LIMIT: usize = 2;

/// Pause after each gallery upload.
pub const DEFAULT_UPLOAD_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub gallery_limit: usize,
    pub upload_delay: Duration,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            gallery_limit: DEFAULT_GALLERY_LIMIT,
            upload_delay: DEFAULT_UPLOAD_DELAY,
        }
    }
}

/// Unique relation names of a batch, per kind, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationNames {
    pub developers: Vec<String>,
    pub publishers: Vec<String>,
    pub categories: Vec<String>,
    pub platforms: Vec<String>,
}

impl RelationNames {
    pub fn collect(products: &[Product]) -> Self {
        let mut names = Self::default();
        let mut seen: HashSet<(EntityKind, String)> = HashSet::new();

        let mut push = |kind: EntityKind, name: &str, list: &mut Vec<String>| {
            let name = name.trim();
            if !name.is_empty() && seen.insert((kind, name.to_string())) {
                list.push(name.to_string());
            }
        };

        for product in products {
            for genre in &product.genres {
                push(EntityKind::Category, genre, &mut names.categories);
            }
            for os in &product.supported_operating_systems {
                push(EntityKind::Platform, os, &mut names.platforms);
            }
            if let Some(dev) = &product.developer {
                push(EntityKind::Developer, dev, &mut names.developers);
            }
            if let Some(publisher) = &product.publisher {
                push(EntityKind::Publisher, publisher, &mut names.publishers);
            }
        }
        names
    }

    pub fn get(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Developer => &self.developers,
            EntityKind::Publisher => &self.publishers,
            EntityKind::Category => &self.categories,
            EntityKind::Platform => &self.platforms,
            EntityKind::Game => &[],
        }
    }

    pub fn len(&self) -> usize {
        EntityKind::RELATIONS.iter().map(|k| self.get(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render storefront release seconds as an ISO-8601 UTC timestamp.
///
/// Missing or non-positive values have no meaningful date and yield `None`.
pub fn release_date(seconds: Option<i64>) -> Option<String> {
    let secs = seconds.filter(|s| *s > 0)?;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// State carried through one run.
#[derive(Default)]
struct Run {
    report: PopulateReport,
    ids: HashMap<(EntityKind, String), u64>,
}

impl Run {
    fn fail(&mut self, op: &str, subject: &str, err: impl std::fmt::Display) {
        warn!("{op} {subject}: {err}");
        self.report.errors.push(format!("{op} {subject}: {err}"));
    }
}

/// Populates a CMS from the storefront.
pub struct Ingestor {
    storefront: StorefrontClient,
    cms: Arc<dyn CmsStore>,
    options: IngestOptions,
}

impl Ingestor {
    pub fn new(storefront: StorefrontClient, cms: Arc<dyn CmsStore>) -> Self {
        Self {
            storefront,
            cms,
            options: IngestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Fetch one listing page and ingest every product on it.
    pub async fn populate(&self, query: &ListingQuery) -> CatalogResult<PopulateReport> {
        let products = self.storefront.fetch_products(query).await?;
        info!("fetched {} products", products.len());
        Ok(self.ingest(&products).await)
    }

    /// Ingest an already fetched batch.
    pub async fn ingest(&self, products: &[Product]) -> PopulateReport {
        let mut run = Run::default();
        run.report.products_seen = products.len();

        self.ensure_relations(&RelationNames::collect(products), &mut run)
            .await;

        for product in products {
            match self.ingest_game(product, &mut run).await {
                Ok(true) => run.report.games_created += 1,
                Ok(false) => run.report.games_skipped += 1,
                Err(e) => run.fail("create_game", &product.title, e),
            }
        }

        info!(
            "populate finished: {} games created, {} skipped, {} errors",
            run.report.games_created,
            run.report.games_skipped,
            run.report.errors.len()
        );
        run.report
    }

    /// Create every relation name that does not exist yet.
    async fn ensure_relations(&self, names: &RelationNames, run: &mut Run) {
        for kind in EntityKind::RELATIONS {
            for name in names.get(kind) {
                match self.ensure_relation(kind, name).await {
                    Ok((id, created)) => {
                        if created {
                            run.report.relations_created += 1;
                        }
                        run.ids.insert((kind, name.clone()), id);
                    }
                    Err(e) => run.fail(&format!("create_{kind}"), name, e),
                }
            }
        }
    }

    async fn ensure_relation(&self, kind: EntityKind, name: &str) -> CatalogResult<(u64, bool)> {
        if let Some(existing) = self.cms.find_by_name(kind, name).await? {
            return Ok((existing.id, false));
        }
        let relation = NewRelation {
            name: name.to_string(),
            slug: slugify(name),
        };
        let created = self.cms.create_relation(kind, &relation).await?;
        Ok((created.id, true))
    }

    /// Resolve a relation id, preferring ids seen earlier in the run.
    /// Unresolvable names are dropped.
    async fn relation_id(&self, kind: EntityKind, name: &str, run: &mut Run) -> Option<u64> {
        let name = name.trim();
        if let Some(id) = run.ids.get(&(kind, name.to_string())) {
            return Some(*id);
        }
        match self.cms.find_by_name(kind, name).await {
            Ok(Some(entry)) => {
                run.ids.insert((kind, name.to_string()), entry.id);
                Some(entry.id)
            }
            Ok(None) => None,
            Err(e) => {
                run.fail(&format!("find_{kind}"), name, e);
                None
            }
        }
    }

    async fn relation_ids(&self, kind: EntityKind, names: &[String], run: &mut Run) -> Vec<u64> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            if let Some(id) = self.relation_id(kind, name, run).await {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    async fn game_info(&self, slug: &str, run: &mut Run) -> Option<GameInfo> {
        match self.storefront.fetch_game_page(slug).await {
            Ok(html) => Some(parse_game_page(&html)),
            Err(e) => {
                run.fail("game_info", slug, e);
                None
            }
        }
    }

    /// Returns `Ok(false)` when the game already exists.
    async fn ingest_game(&self, product: &Product, run: &mut Run) -> CatalogResult<bool> {
        if self
            .cms
            .find_by_name(EntityKind::Game, &product.title)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        info!("Creating {}", product.title);

        let categories = self
            .relation_ids(EntityKind::Category, &product.genres, run)
            .await;
        let platforms = self
            .relation_ids(EntityKind::Platform, &product.supported_operating_systems, run)
            .await;
        let mut developers = Vec::new();
        if let Some(dev) = &product.developer {
            developers.extend(self.relation_id(EntityKind::Developer, dev, run).await);
        }
        let publisher = match &product.publisher {
            Some(publisher) => self.relation_id(EntityKind::Publisher, publisher, run).await,
            None => None,
        };

        let game = NewGame {
            name: product.title.clone(),
            slug: game_slug(&product.slug),
            price: product
                .price
                .as_ref()
                .and_then(|p| p.amount.trim().parse::<f64>().ok()),
            release_date: release_date(product.global_release_date),
            categories,
            platforms,
            developers,
            publisher,
            info: self.game_info(&product.slug, run).await,
        };

        let entry = self.cms.create_game(&game).await?;
        let slug = entry.slug.clone().unwrap_or_else(|| game.slug.clone());

        if let Some(cover) = &product.image {
            self.attach_image(cover, entry.id, &slug, ImageField::Cover, run)
                .await;
        }

        for (index, stem) in product
            .gallery
            .iter()
            .take(self.options.gallery_limit)
            .enumerate()
        {
            let filename = format!("{slug}-{index}");
            self.attach_image(stem, entry.id, &filename, ImageField::Gallery, run)
                .await;
            tokio::time::sleep(self.options.upload_delay).await;
        }

        Ok(true)
    }

    async fn attach_image(
        &self,
        stem: &str,
        game_id: u64,
        filename: &str,
        field: ImageField,
        run: &mut Run,
    ) {
        let filename = format!("{filename}.jpg");
        match self.upload(stem, game_id, &filename, field).await {
            Ok(()) => run.report.images_uploaded += 1,
            Err(e) => run.fail("set_image", &filename, e),
        }
    }

    async fn upload(
        &self,
        stem: &str,
        game_id: u64,
        filename: &str,
        field: ImageField,
    ) -> CatalogResult<()> {
        let url = self.storefront.image_url(stem);
        let bytes = self.storefront.fetch_image(&url).await?;

        info!("Uploading {} image {filename}", field.as_str());

        self.cms
            .upload_image(ImageUpload {
                ref_id: game_id,
                kind: EntityKind::Game,
                field,
                filename: filename.to_string(),
                bytes,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductPrice;

    fn product(title: &str, genres: &[&str], dev: &str) -> Product {
        Product {
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "_"),
            price: Some(ProductPrice {
                amount: "9.99".to_string(),
            }),
            global_release_date: Some(1_432_000_000),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            supported_operating_systems: vec!["windows".to_string()],
            developer: Some(dev.to_string()),
            publisher: Some("GOG".to_string()),
            image: None,
            gallery: Vec::new(),
        }
    }

    #[test]
    fn test_relation_names_are_deduplicated_in_order() {
        let products = vec![
            product("A", &["Action", "RPG"], "Studio"),
            product("B", &["RPG", "Strategy"], "Studio"),
            product("C", &["  Action "], "Other"),
        ];
        let names = RelationNames::collect(&products);
        assert_eq!(names.categories, vec!["Action", "RPG", "Strategy"]);
        assert_eq!(names.developers, vec!["Studio", "Other"]);
        assert_eq!(names.publishers, vec!["GOG"]);
        assert_eq!(names.platforms, vec!["windows"]);
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn test_same_name_in_different_kinds_is_kept() {
        let mut p = product("A", &["GOG"], "GOG");
        p.supported_operating_systems.clear();
        let names = RelationNames::collect(&[p]);
        assert_eq!(names.categories, vec!["GOG"]);
        assert_eq!(names.developers, vec!["GOG"]);
        assert_eq!(names.publishers, vec!["GOG"]);
    }

    #[test]
    fn test_empty_names_are_ignored() {
        let mut p = product("A", &[""], " ");
        p.publisher = None;
        p.supported_operating_systems.clear();
        assert!(RelationNames::collect(&[p]).is_empty());
    }

    #[test]
    fn test_release_date_formatting() {
        assert_eq!(
            release_date(Some(1_432_000_000)).as_deref(),
            Some("2015-05-19T01:46:40.000Z")
        );
        assert_eq!(release_date(None), None);
        assert_eq!(release_date(Some(0)), None);
    }
}
