//! [`CmsStore`] backed by the CMS REST API.

use super::CmsStore;
use crate::storefront::{ensure_success, parse_base};
use crate::types::{
    CatalogError, CatalogResult, CmsEntry, EntityKind, ImageUpload, NewGame, NewRelation,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use url::Url;

/// Local CMS default, as started by its development server.
pub const DEFAULT_CMS_URL: &str = "http://localhost:1337";

#[derive(Debug, Clone)]
pub struct RestCmsConfig {
    pub base_url: String,
    /// Bearer token sent with every request when set.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for RestCmsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CMS_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// REST client for the CMS collections and its upload endpoint.
#[derive(Clone)]
pub struct RestCms {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl RestCms {
    pub fn new(config: &RestCmsConfig) -> CatalogResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: parse_base(&config.base_url)?,
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn collection_url(&self, kind: EntityKind) -> CatalogResult<Url> {
        Ok(self.base_url.join(kind.collection())?)
    }

    pub fn upload_url(&self) -> CatalogResult<Url> {
        Ok(self.base_url.join("upload")?)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        kind: EntityKind,
        body: &T,
    ) -> CatalogResult<CmsEntry> {
        let url = self.collection_url(kind)?;
        let resp = self.authorize(self.client.post(url).json(body)).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json::<CmsEntry>().await?)
    }
}

#[async_trait]
impl CmsStore for RestCms {
    async fn find_by_name(&self, kind: EntityKind, name: &str) -> CatalogResult<Option<CmsEntry>> {
        let mut url = self.collection_url(kind)?;
        url.query_pairs_mut().append_pair("name", name);

        let resp = self.authorize(self.client.get(url)).send().await?;
        let resp = ensure_success(resp).await?;
        let entries: Vec<CmsEntry> = resp.json().await?;
        Ok(entries.into_iter().next())
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
        self.post_json(kind, relation).await
    }

    async fn create_game(&self, game: &NewGame) -> CatalogResult<CmsEntry> {
        self.post_json(EntityKind::Game, game).await
    }

    async fn upload_image(&self, upload: ImageUpload) -> CatalogResult<()> {
        let file = Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str("image/jpeg")?;
        let form = Form::new()
            .text("refId", upload.ref_id.to_string())
            .text("ref", upload.kind.model())
            .text("field", upload.field.as_str())
            .part("files", file);

        let url = self.upload_url()?;
        let resp = self.authorize(self.client.post(url).multipart(form)).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_urls() {
        let cms = RestCms::new(&RestCmsConfig {
            base_url: "http://cms.local:1337/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            cms.collection_url(EntityKind::Category).unwrap().as_str(),
            "http://cms.local:1337/categories"
        );
        assert_eq!(cms.upload_url().unwrap().as_str(), "http://cms.local:1337/upload");
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let cms = RestCms::new(&RestCmsConfig {
            token: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert!(cms.token.is_none());
    }
}
