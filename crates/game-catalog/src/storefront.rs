//! Async client for the storefront's listing, product pages and image CDN.

use crate::types::{CatalogError, CatalogResult, ListingPage, Product};
use std::time::Duration;
use url::Url;

/// Public storefront base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.gog.com";

/// Scheme prepended to the protocol-relative image stems of the listing.
pub const DEFAULT_IMAGE_SCHEME: &str = "https:";

/// Size variant requested from the image CDN.
pub const IMAGE_SUFFIX: &str = "_bg_crop_1680x655.jpg";

const LISTING_PATH: &str = "games/ajax/filtered";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/131.0.0.0 Safari/537.36";

/// Query forwarded to the listing endpoint.
///
/// Keys keep their insertion order so the outgoing query string is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pairs: Vec<(String, String)>,
}

impl ListingQuery {
    /// Empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// `mediaType=game&page=1&sort=popularity`.
    pub fn with_defaults() -> Self {
        let mut q = Self::new();
        q.set("mediaType", "game");
        q.set("page", "1");
        q.set("sort", "popularity");
        q
    }

    /// Set a key, replacing its value in place if it is already present.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Overlay caller-supplied pairs; later values win.
    pub fn merge<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in overrides {
            self.set(k, v);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Where the storefront lives and how its images are addressed.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub base_url: String,
    pub image_scheme: String,
    pub timeout: Duration,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            image_scheme: DEFAULT_IMAGE_SCHEME.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the storefront.
#[derive(Clone)]
pub struct StorefrontClient {
    client: reqwest::Client,
    base_url: Url,
    image_scheme: String,
}

impl StorefrontClient {
    pub fn new(config: &StorefrontConfig) -> CatalogResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: parse_base(&config.base_url)?,
            image_scheme: config.image_scheme.clone(),
        })
    }

    /// URL of the filtered listing for `query`.
    pub fn listing_url(&self, query: &ListingQuery) -> CatalogResult<Url> {
        let mut url = self.base_url.join(LISTING_PATH)?;
        if !query.pairs().is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        Ok(url)
    }

    /// URL of a product page.
    pub fn game_page_url(&self, slug: &str) -> CatalogResult<Url> {
        if slug.is_empty() || slug.contains('/') {
            return Err(CatalogError::InvalidInput(format!("bad product slug: {slug:?}")));
        }
        Ok(self.base_url.join(&format!("game/{slug}"))?)
    }

    /// Full CDN URL for an image stem from the listing.
    ///
    /// Stems are protocol-relative (`//images.example.com/abc`); stems that
    /// already carry a scheme are used as they are.
    pub fn image_url(&self, stem: &str) -> String {
        if stem.starts_with("http://") || stem.starts_with("https://") {
            format!("{stem}{IMAGE_SUFFIX}")
        } else {
            format!("{}{stem}{IMAGE_SUFFIX}", self.image_scheme)
        }
    }

    /// Fetch one page of the listing.
    pub async fn fetch_products(&self, query: &ListingQuery) -> CatalogResult<Vec<Product>> {
        let url = self.listing_url(query)?;
        tracing::debug!("fetching listing {url}");
        let body = self.get_text(url).await?;
        let page: ListingPage = serde_json::from_str(&body)?;
        if let Some(total) = page.total_pages {
            tracing::debug!("listing has {total} pages");
        }
        Ok(page.products)
    }

    /// Fetch the HTML of a product page.
    pub async fn fetch_game_page(&self, slug: &str) -> CatalogResult<String> {
        let url = self.game_page_url(slug)?;
        self.get_text(url).await
    }

    /// Download raw image bytes.
    pub async fn fetch_image(&self, url: &str) -> CatalogResult<Vec<u8>> {
        let resp = self.client.get(url).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn get_text(&self, url: Url) -> CatalogResult<String> {
        let resp = self.client.get(url).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.text().await?)
    }
}

/// Base URLs are joined against, so they need a trailing slash.
pub(crate) fn parse_base(raw: &str) -> CatalogResult<Url> {
    let trimmed = raw.trim_end_matches('/');
    Ok(Url::parse(&format!("{trimmed}/"))?)
}

/// Turn a non-2xx response into [`CatalogError::Status`], keeping the body
/// as error detail.
pub(crate) async fn ensure_success(resp: reqwest::Response) -> CatalogResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    let body = resp.text().await.unwrap_or_default();
    Err(CatalogError::Status {
        url,
        status: status.as_u16(),
        body,
    })
}
