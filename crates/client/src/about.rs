//! About-page operations: team, partners, press, timeline.

use serde::Serialize;
use serde_json::{Value, json};

use gambit_core::ContentRecord;

use crate::query::Query;
use crate::{Error, GambitClient};

/// Everything the about page renders, fetched in one call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AboutPage {
    pub team: Vec<ContentRecord>,
    pub partners: Vec<ContentRecord>,
    pub press: Vec<ContentRecord>,
    pub timeline: Vec<ContentRecord>,
}

impl GambitClient {
    /// List team members in display order.
    ///
    /// Each record's `photo` is collapsed to a bare `{ url }` object
    /// (or null), regardless of which upload shape the CMS returned.
    pub async fn fetch_team_members(&self) -> Result<Vec<ContentRecord>, Error> {
        let q = Query::new().sort("order:asc").populate_all();
        let records = self.fetch_records("/team-members", &q).await?;
        Ok(records.into_iter().map(collapse_photo).collect())
    }

    /// List partner organizations.
    pub async fn fetch_partners(&self) -> Result<Vec<ContentRecord>, Error> {
        let q = Query::new().populate_all();
        self.fetch_records("/partners", &q).await
    }

    /// List press articles, newest first.
    pub async fn fetch_press(&self) -> Result<Vec<ContentRecord>, Error> {
        let q = Query::new().sort("publishDate:desc").populate_all();
        self.fetch_records("/press-articles", &q).await
    }

    /// List timeline milestones in display order.
    pub async fn fetch_timeline(&self) -> Result<Vec<ContentRecord>, Error> {
        let q = Query::new().sort("order:asc").populate_all();
        self.fetch_records("/timeline-events", &q).await
    }

    /// Fetch all about-page content concurrently.
    pub async fn fetch_about_page(&self) -> Result<AboutPage, Error> {
        let (team, partners, press, timeline) = tokio::try_join!(
            self.fetch_team_members(),
            self.fetch_partners(),
            self.fetch_press(),
            self.fetch_timeline(),
        )?;
        Ok(AboutPage {
            team,
            partners,
            press,
            timeline,
        })
    }
}

/// Reduce a member's `photo` to `{ url }` or null.
fn collapse_photo(mut record: ContentRecord) -> ContentRecord {
    let url = photo_url(&record);
    record.insert(
        "photo",
        url.map_or(Value::Null, |u| json!({ "url": u })),
    );
    record
}

fn photo_url(record: &ContentRecord) -> Option<String> {
    match record.get("photo")? {
        Value::String(url) if !url.is_empty() => Some(url.clone()),
        Value::Object(_) => {
            let photo = record.record_field("photo")?;
            if let Some(url) = photo.str_field("url").filter(|u| !u.is_empty()) {
                return Some(url.to_owned());
            }
            let formats = photo.record_field("formats")?;
            ["medium", "small", "thumbnail"].iter().find_map(|name| {
                formats
                    .record_field(name)
                    .and_then(|f| f.str_field("url").map(str::to_owned))
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: Value) -> ContentRecord {
        match value {
            Value::Object(map) => ContentRecord::from_map(map),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn photo_object_collapses_to_bare_url() {
        let collapsed = collapse_photo(record(json!({
            "id": 1,
            "name": "Nadia",
            "photo": { "id": 4, "url": "http://media/x.png", "alternativeText": "Nadia" },
        })));
        assert_eq!(
            collapsed.get("photo"),
            Some(&json!({ "url": "http://media/x.png" }))
        );
        assert_eq!(collapsed.str_field("name"), Some("Nadia"));
    }

    #[test]
    fn photo_string_is_kept() {
        let collapsed = collapse_photo(record(json!({
            "id": 1,
            "photo": "http://cdn/y.png",
        })));
        assert_eq!(
            collapsed.get("photo"),
            Some(&json!({ "url": "http://cdn/y.png" }))
        );
    }

    #[test]
    fn format_fallback_order() {
        let collapsed = collapse_photo(record(json!({
            "id": 1,
            "photo": { "formats": {
                "small": { "url": "/uploads/s.png" },
                "thumbnail": { "url": "/uploads/t.png" },
            }},
        })));
        assert_eq!(
            collapsed.get("photo"),
            Some(&json!({ "url": "/uploads/s.png" }))
        );
    }

    #[test]
    fn missing_photo_becomes_null() {
        let collapsed = collapse_photo(record(json!({ "id": 1, "name": "Sam" })));
        assert_eq!(collapsed.get("photo"), Some(&Value::Null));
    }
}
