//! Configuration loading and resolution.
//!
//! Every setting resolves as: explicit CLI flag, then environment
//! variable, then built-in default.

use std::time::Duration;

use game_catalog::cms::rest::DEFAULT_CMS_URL;
use game_catalog::ingest::{DEFAULT_GALLERY_LIMIT, DEFAULT_UPLOAD_DELAY};
use game_catalog::storefront::{DEFAULT_BASE_URL, DEFAULT_IMAGE_SCHEME};
use game_catalog::{IngestOptions, RestCmsConfig, StorefrontConfig};

pub const ENV_ADDR: &str = "GAME_CATALOG_ADDR";
pub const ENV_TOKEN: &str = "GAME_CATALOG_TOKEN";
pub const ENV_CMS_URL: &str = "GAME_CATALOG_CMS_URL";
pub const ENV_CMS_TOKEN: &str = "GAME_CATALOG_CMS_TOKEN";
pub const ENV_STOREFRONT_URL: &str = "GAME_CATALOG_STOREFRONT_URL";
pub const ENV_IMAGE_SCHEME: &str = "GAME_CATALOG_IMAGE_SCHEME";
pub const ENV_UPLOAD_DELAY_MS: &str = "GAME_CATALOG_UPLOAD_DELAY_MS";

pub const DEFAULT_ADDR: &str = "127.0.0.1:3200";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Listen address of the HTTP endpoint.
    pub addr: String,
    /// Bearer token required on `/games/populate` when set.
    pub token: Option<String>,
    pub cms_url: String,
    pub cms_token: Option<String>,
    pub storefront_url: String,
    pub image_scheme: String,
    pub gallery_limit: usize,
    pub upload_delay: Duration,
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub addr: Option<String>,
    pub token: Option<String>,
    pub cms_url: Option<String>,
    pub cms_token: Option<String>,
    pub storefront_url: Option<String>,
    pub upload_delay_ms: Option<u64>,
}

impl Settings {
    /// Resolve settings from CLI overrides and the process environment.
    pub fn resolve(overrides: Overrides) -> Self {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve settings with an explicit environment lookup.
    pub fn resolve_with(overrides: Overrides, env: impl Fn(&str) -> Option<String>) -> Self {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let upload_delay = overrides
            .upload_delay_ms
            .or_else(|| env(ENV_UPLOAD_DELAY_MS).and_then(|v| v.trim().parse().ok()))
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_UPLOAD_DELAY);

        Self {
            addr: overrides
                .addr
                .or_else(|| env(ENV_ADDR))
                .unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            token: overrides.token.or_else(|| env(ENV_TOKEN)),
            cms_url: overrides
                .cms_url
                .or_else(|| env(ENV_CMS_URL))
                .unwrap_or_else(|| DEFAULT_CMS_URL.to_string()),
            cms_token: overrides.cms_token.or_else(|| env(ENV_CMS_TOKEN)),
            storefront_url: overrides
                .storefront_url
                .or_else(|| env(ENV_STOREFRONT_URL))
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            image_scheme: env(ENV_IMAGE_SCHEME).unwrap_or_else(|| DEFAULT_IMAGE_SCHEME.to_string()),
            gallery_limit: DEFAULT_GALLERY_LIMIT,
            upload_delay,
        }
    }

    pub fn storefront(&self) -> StorefrontConfig {
        StorefrontConfig {
            base_url: self.storefront_url.clone(),
            image_scheme: self.image_scheme.clone(),
            timeout: HTTP_TIMEOUT,
        }
    }

    pub fn cms(&self) -> RestCmsConfig {
        RestCmsConfig {
            base_url: self.cms_url.clone(),
            token: self.cms_token.clone(),
            timeout: HTTP_TIMEOUT,
        }
    }

    pub fn ingest(&self) -> IngestOptions {
        IngestOptions {
            gallery_limit: self.gallery_limit,
            upload_delay: self.upload_delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let s = Settings::resolve_with(Overrides::default(), env_of(&[]));
        assert_eq!(s.addr, DEFAULT_ADDR);
        assert_eq!(s.cms_url, DEFAULT_CMS_URL);
        assert_eq!(s.storefront_url, DEFAULT_BASE_URL);
        assert_eq!(s.upload_delay, Duration::from_millis(200));
        assert_eq!(s.gallery_limit, 2);
        assert!(s.token.is_none());
    }

    #[test]
    fn test_flag_beats_env_beats_default() {
        let env = env_of(&[
            (ENV_CMS_URL, "http://cms.internal:1337"),
            (ENV_ADDR, "0.0.0.0:8080"),
            (ENV_UPLOAD_DELAY_MS, "50"),
        ]);
        let s = Settings::resolve_with(
            Overrides {
                addr: Some("127.0.0.1:9999".to_string()),
                ..Default::default()
            },
            env,
        );
        assert_eq!(s.addr, "127.0.0.1:9999");
        assert_eq!(s.cms_url, "http://cms.internal:1337");
        assert_eq!(s.upload_delay, Duration::from_millis(50));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let s = Settings::resolve_with(
            Overrides::default(),
            env_of(&[(ENV_TOKEN, "  "), (ENV_UPLOAD_DELAY_MS, "soon")]),
        );
        assert!(s.token.is_none());
        assert_eq!(s.upload_delay, DEFAULT_UPLOAD_DELAY);
    }
}
