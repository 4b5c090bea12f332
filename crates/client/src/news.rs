//! News article operations.

use gambit_core::ContentRecord;

use crate::query::Query;
use crate::{Error, GambitClient};

/// Query options for listing news articles.
#[derive(Debug, Clone)]
pub struct NewsQuery {
    /// Page number (1-based).
    pub page: u32,
    /// Records per page.
    pub page_size: u32,
    /// Sort key.
    pub sort: String,
    /// Equality filters, field to value.
    pub filters: Vec<(String, String)>,
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 9,
            sort: "publishDate:desc".to_owned(),
            filters: Vec::new(),
        }
    }
}

impl GambitClient {
    /// List news articles.
    pub async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<ContentRecord>, Error> {
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
        self.fetch_records("/news-articles", &q).await
    }

    /// List featured articles.
    pub async fn fetch_featured_news(&self, limit: u32) -> Result<Vec<ContentRecord>, Error> {
        let q = Query::new()
            .limit(limit)
            .populate_all()
            .filter_eq("featured", "true");
        self.fetch_records("/news-articles", &q).await
    }

    /// Fetch a single article by id.
    pub async fn fetch_article(&self, id: i64) -> Result<Option<ContentRecord>, Error> {
        let q = Query::new().populate_all();
        self.fetch_record(&format!("/news-articles/{id}"), &q).await
    }

    /// List articles in one category (announcement, feature, interview).
    pub async fn fetch_news_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<ContentRecord>, Error> {
        let q = Query::new().populate_all().filter_eq("category", category);
        self.fetch_records("/news-articles", &q).await
    }

    /// The most recently published articles.
    pub async fn fetch_recent_news(&self, limit: u32) -> Result<Vec<ContentRecord>, Error> {
        let q = Query::new()
            .limit(limit)
            .sort("publishDate:desc")
            .populate_all();
        self.fetch_records("/news-articles", &q).await
    }
}
