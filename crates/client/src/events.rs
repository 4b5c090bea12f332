//! Event operations.

use chrono::{SecondsFormat, Utc};
use serde_json::json;

use gambit_core::Event;

use crate::query::{FilterOp, Query};
use crate::{Error, GambitClient};

/// Query options for listing events.
#[derive(Debug, Clone)]
pub struct EventQuery {
    /// Page number (1-based).
    pub page: u32,
    /// Records per page.
    pub page_size: u32,
    /// Sort key.
    pub sort: String,
    /// Equality filters, field to value.
    pub filters: Vec<(String, String)>,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 12,
            sort: "startDate:desc".to_owned(),
            filters: Vec::new(),
        }
    }
}

impl GambitClient {
    /// List events.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), gambit_client::Error> {
    /// use gambit_client::{EventQuery, GambitClient, GambitConfig};
    ///
    /// let client = GambitClient::new(GambitConfig::from_env());
    /// let query = EventQuery {
    ///     filters: vec![("eventType".to_owned(), "tournament".to_owned())],
    ///     ..EventQuery::default()
    /// };
    /// for event in client.fetch_events(&query).await? {
    ///     println!("{} ({}/{})", event.title, event.participants, event.max_participants);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_events(&self, query: &EventQuery) -> Result<Vec<Event>, Error> {
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
        let records = self.fetch_records("/events", &q).await?;
        Ok(Event::from_records(records))
    }

    /// List events starting from now, soonest first.
    pub async fn fetch_upcoming_events(&self, limit: u32) -> Result<Vec<Event>, Error> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let q = Query::new()
            .limit(limit)
            .sort("startDate:asc")
            .populate_all()
            .filter(&["startDate"], FilterOp::Gte, now);
        let records = self.fetch_records("/events", &q).await?;
        Ok(Event::from_records(records))
    }

    /// List events that already ended, most recent first.
    pub async fn fetch_past_events(&self, limit: u32) -> Result<Vec<Event>, Error> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let q = Query::new()
            .limit(limit)
            .sort("endDate:desc")
            .populate_all()
            .filter(&["endDate"], FilterOp::Lte, now);
        let records = self.fetch_records("/events", &q).await?;
        Ok(Event::from_records(records))
    }

    /// List featured events.
    pub async fn fetch_featured_events(&self) -> Result<Vec<Event>, Error> {
        let q = Query::new().populate_all().filter_eq("featured", "true");
        let records = self.fetch_records("/events", &q).await?;
        Ok(Event::from_records(records))
    }

    /// Fetch a single event by id.
    pub async fn fetch_event(&self, id: i64) -> Result<Option<Event>, Error> {
        let q = Query::new().populate_all();
        let record = self.fetch_record(&format!("/events/{id}"), &q).await?;
        Ok(record.map(Event::from_record))
    }

    /// List events of one type (tournament, workshop, meetup, online).
    pub async fn fetch_events_by_type(&self, event_type: &str) -> Result<Vec<Event>, Error> {
        let q = Query::new()
            .populate_all()
            .filter_eq("eventType", event_type);
        let records = self.fetch_records("/events", &q).await?;
        Ok(Event::from_records(records))
    }

    /// Register for an event by bumping its participant count.
    pub async fn register_for_event(
        &self,
        id: i64,
        current_participants: i64,
    ) -> Result<Option<Event>, Error> {
        let body = json!({
            "data": { "currentParticipants": current_participants + 1 }
        });
        let value = self.put_json(&format!("/events/{id}"), &body).await?;
        Ok(gambit_core::normalize_response(&value, self.media())
            .into_record()
            .map(Event::from_record))
    }
}
