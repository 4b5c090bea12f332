//! Community member and achievement operations.

use serde::Serialize;
use tracing::warn;

use gambit_core::ContentRecord;

use crate::query::{FilterOp, Query};
use crate::{Error, GambitClient};

/// Query options for listing members.
#[derive(Debug, Clone)]
pub struct MemberQuery {
    /// Page number (1-based).
    pub page: u32,
    /// Records per page.
    pub page_size: u32,
    /// Sort key.
    pub sort: String,
    /// Equality filters, field to value.
    pub filters: Vec<(String, String)>,
}

impl Default for MemberQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 12,
            sort: "rating:desc".to_owned(),
            filters: Vec::new(),
        }
    }
}

/// Aggregate member statistics for the community page.
///
/// `active_today` and `online_now` are derived estimates (15% and 5% of
/// the member count); the CMS doesn't track presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityStats {
    pub total_members: i64,
    pub total_games: i64,
    pub avg_rating: i64,
    pub active_today: i64,
    pub online_now: i64,
}

impl CommunityStats {
    /// Aggregate over member records. `None` for an empty list.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap
    )]
    pub fn from_members(members: &[ContentRecord]) -> Option<Self> {
        if members.is_empty() {
            return None;
        }
        let total_members = members.len() as i64;
        let total_games: i64 = members
            .iter()
            .map(|m| m.i64_field("totalGames").unwrap_or(0))
            .sum();
        let rating_sum: f64 = members
            .iter()
            .map(|m| m.f64_field("rating").unwrap_or(0.0))
            .sum();
        Some(Self {
            total_members,
            total_games,
            avg_rating: (rating_sum / total_members as f64).round() as i64,
            active_today: (total_members as f64 * 0.15).floor() as i64,
            online_now: (total_members as f64 * 0.05).floor() as i64,
        })
    }
}

impl GambitClient {
    /// List community members.
    pub async fn fetch_members(&self, query: &MemberQuery) -> Result<Vec<ContentRecord>, Error> {
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
        self.fetch_records("/community-members", &q).await
    }

    /// Fetch a single member profile by id.
    pub async fn fetch_member(&self, id: i64) -> Result<Option<ContentRecord>, Error> {
        let q = Query::new().populate_all();
        self.fetch_record(&format!("/community-members/{id}"), &q)
            .await
    }

    /// Search members by name or username.
    pub async fn search_members(&self, term: &str) -> Result<Vec<ContentRecord>, Error> {
        let q = Query::new()
            .populate_all()
            .or_filter(0, "name", FilterOp::ContainsI, term)
            .or_filter(1, "username", FilterOp::ContainsI, term);
        self.fetch_records("/community-members", &q).await
    }

    /// The highest-rated members.
    pub async fn fetch_top_members(&self, limit: u32) -> Result<Vec<ContentRecord>, Error> {
        let q = Query::new()
            .limit(limit)
            .sort("rating:desc")
            .populate_all();
        self.fetch_records("/community-members", &q).await
    }

    /// List all achievements.
    pub async fn fetch_achievements(&self) -> Result<Vec<ContentRecord>, Error> {
        let q = Query::new().populate_all();
        self.fetch_records("/achievements", &q).await
    }

    /// List achievements of one type (tournament, milestone, special).
    pub async fn fetch_achievements_by_type(
        &self,
        achievement_type: &str,
    ) -> Result<Vec<ContentRecord>, Error> {
        let q = Query::new()
            .populate_all()
            .filter_eq("type", achievement_type);
        self.fetch_records("/achievements", &q).await
    }

    /// Aggregate member statistics.
    ///
    /// Best-effort: a fetch failure is logged and reported as `None` so
    /// the stats strip can simply not render.
    pub async fn fetch_community_stats(&self) -> Result<Option<CommunityStats>, Error> {
        let q = Query::new().limit(1000);
        match self.fetch_records("/community-members", &q).await {
            Ok(members) => Ok(CommunityStats::from_members(&members)),
            Err(e) => {
                warn!(error = %e, "failed to fetch community stats");
                Ok(None)
            }
        }
    }
}
