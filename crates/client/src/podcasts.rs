//! Podcast episode operations.

use serde_json::json;
use tracing::warn;

use gambit_core::ContentRecord;

use crate::query::{FilterOp, Query};
use crate::{Error, GambitClient};

/// Query options for listing episodes.
#[derive(Debug, Clone)]
pub struct EpisodeQuery {
    /// Page number (1-based).
    pub page: u32,
    /// Records per page.
    pub page_size: u32,
    /// Sort key.
    pub sort: String,
    /// Equality filters, field to value.
    pub filters: Vec<(String, String)>,
}

impl Default for EpisodeQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            sort: "publishDate:desc".to_owned(),
            filters: Vec::new(),
        }
    }
}

impl GambitClient {
    /// List podcast episodes.
    pub async fn fetch_episodes(
        &self,
        query: &EpisodeQuery,
    ) -> Result<Vec<ContentRecord>, Error> {
        let q = Query::new()
            .page(query.page)
            .page_size(query.page_size)
            .sort(&query.sort)
            .populate_all()
            .eq_filters(
                query
                    .filters
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );
        self.fetch_records("/podcasts", &q).await
    }

    /// Fetch a single episode by id.
    pub async fn fetch_episode(&self, id: i64) -> Result<Option<ContentRecord>, Error> {
        let q = Query::new().populate_all();
        self.fetch_record(&format!("/podcasts/{id}"), &q).await
    }

    /// The featured episode, if one is flagged.
    pub async fn fetch_featured_episode(&self) -> Result<Option<ContentRecord>, Error> {
        let q = Query::new()
            .limit(1)
            .populate_all()
            .filter_eq("featured", "true");
        self.fetch_first("/podcasts", &q).await
    }

    /// Bump an episode's listen count.
    ///
    /// Listen counting is best-effort: a failure is logged and reported
    /// as `None` so playback never surfaces an error for it.
    pub async fn increment_listens(
        &self,
        id: i64,
        current_listens: i64,
    ) -> Result<Option<ContentRecord>, Error> {
        let body = json!({
            "data": { "listens": current_listens + 1 }
        });
        match self.put_json(&format!("/podcasts/{id}"), &body).await {
            Ok(value) => Ok(gambit_core::normalize_response(&value, self.media()).into_record()),
            Err(e) => {
                warn!(id, error = %e, "failed to increment listen count");
                Ok(None)
            }
        }
    }

    /// Search episodes by title or description.
    pub async fn search_episodes(&self, term: &str) -> Result<Vec<ContentRecord>, Error> {
        let q = Query::new()
            .populate_all()
            .or_filter(0, "title", FilterOp::ContainsI, term)
            .or_filter(1, "description", FilterOp::ContainsI, term);
        self.fetch_records("/podcasts", &q).await
    }

    /// List episodes carrying a tag.
    pub async fn fetch_episodes_by_tag(&self, slug: &str) -> Result<Vec<ContentRecord>, Error> {
        let q = Query::new()
            .populate_all()
            .filter(&["tags", "slug"], FilterOp::Eq, slug);
        self.fetch_records("/podcasts", &q).await
    }
}
