//! One ingestion run, traced under its own run id.

use game_catalog::{CatalogResult, Ingestor, ListingQuery, PopulateReport};
use tracing::Instrument;

/// Merge caller pairs over the listing defaults.
pub fn listing_query<I>(pairs: I) -> ListingQuery
where
    I: IntoIterator<Item = (String, String)>,
{
    ListingQuery::with_defaults().merge(pairs)
}

/// Run the pipeline for `query` inside a `populate` span.
pub async fn run(ingestor: &Ingestor, query: &ListingQuery) -> CatalogResult<PopulateReport> {
    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(
        "populate",
        %run_id,
        page = query.get("page").unwrap_or("1")
    );

    async move {
        tracing::info!("populate started");
        let result = ingestor.populate(query).await;
        if let Err(e) = &result {
            tracing::error!("populate aborted: {e}");
        }
        result
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_query_overrides_defaults() {
        let q = listing_query(vec![
            ("sort".to_string(), "date".to_string()),
            ("search".to_string(), "witcher".to_string()),
        ]);
        assert_eq!(q.get("mediaType"), Some("game"));
        assert_eq!(q.get("page"), Some("1"));
        assert_eq!(q.get("sort"), Some("date"));
        assert_eq!(q.get("search"), Some("witcher"));
    }
}
