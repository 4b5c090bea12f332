//! Event domain model.
//!
//! Event records come back from the CMS under provider-specific field
//! names (`eventType`, `currentParticipants`, `coverImage`, `prizePool`).
//! The site's event cards expect a different, stable shape with defaults
//! for everything optional; [`Event::from_record`] is that mapping.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::record::{ContentRecord, RecordId};

/// An event in the shape the site renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Option<RecordId>,
    pub title: String,
    pub description: String,
    /// Start timestamp, kept verbatim from the record (RFC 3339).
    pub date: String,
    /// Wall-clock `HH:MM` derived from `date`, `"00:00"` when the
    /// timestamp doesn't parse.
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub participants: i64,
    pub max_participants: i64,
    pub image: Option<String>,
    pub image_alt: String,
    pub prizes: Option<Value>,
    pub skill_level: String,
    pub entry_fee: f64,
    pub location: String,
    pub address: String,
    pub featured: bool,
    pub registration_link: String,
    pub organizer: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(skip)]
    raw: ContentRecord,
}

impl Event {
    /// Map a normalized event record onto the card shape.
    #[must_use]
    pub fn from_record(record: ContentRecord) -> Self {
        let start_date = owned_str(&record, "startDate");
        let end_date = owned_str(&record, "endDate");
        let date = start_date
            .clone()
            .or_else(|| owned_str(&record, "date"))
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        let time = derive_time(&date);

        let cover = record.record_field("coverImage");
        let image = owned_str(&record, "coverImage")
            .or_else(|| cover.as_ref().and_then(cover_image_url))
            .or_else(|| owned_str(&record, "image"));
        let raw_title = truthy_str(&record, "title").map(str::to_owned);
        let image_alt = cover
            .as_ref()
            .and_then(|c| truthy_str(c, "alternativeText").or_else(|| truthy_str(c, "caption")))
            .map(str::to_owned)
            .or_else(|| raw_title.clone())
            .unwrap_or_else(|| "Event image".to_owned());

        let prizes = [record.get("prizePool"), record.get("prizes")]
            .into_iter()
            .flatten()
            .find(|v| is_truthy(v))
            .cloned();

        Self {
            id: record.id(),
            title: raw_title.unwrap_or_else(|| "Untitled Event".to_owned()),
            description: owned_str(&record, "description").unwrap_or_default(),
            date,
            time,
            kind: truthy_str(&record, "eventType")
                .or_else(|| truthy_str(&record, "type"))
                .unwrap_or("tournament")
                .to_owned(),
            participants: record.i64_field("currentParticipants").unwrap_or(0),
            // A zero or absent capacity falls back to the site default.
            max_participants: record
                .i64_field("maxParticipants")
                .filter(|n| *n != 0)
                .unwrap_or(100),
            image,
            image_alt,
            prizes,
            skill_level: truthy_str(&record, "skillLevel")
                .unwrap_or("all levels")
                .to_owned(),
            entry_fee: record.f64_field("entryFee").unwrap_or(0.0),
            location: truthy_str(&record, "location").unwrap_or("TBD").to_owned(),
            address: owned_str(&record, "address").unwrap_or_default(),
            featured: record.get("featured").is_some_and(is_truthy),
            registration_link: owned_str(&record, "registrationLink").unwrap_or_default(),
            organizer: owned_str(&record, "organizer").unwrap_or_default(),
            start_date,
            end_date,
            raw: record,
        }
    }

    /// Map a list of normalized records.
    #[must_use]
    pub fn from_records(records: Vec<ContentRecord>) -> Vec<Self> {
        records.into_iter().map(Self::from_record).collect()
    }

    /// The normalized record this event was built from, with every
    /// original field intact.
    #[must_use]
    pub fn raw(&self) -> &ContentRecord {
        &self.raw
    }
}

/// `HH:MM` in the timestamp's own offset, `"00:00"` when unparseable.
fn derive_time(date: &str) -> String {
    DateTime::parse_from_rfc3339(date)
        .map_or_else(|_| "00:00".to_owned(), |dt| dt.format("%H:%M").to_string())
}

/// Cover image URL: the upload's own `url`, else the largest available
/// pre-rendered format.
fn cover_image_url(cover: &ContentRecord) -> Option<String> {
    if let Some(url) = truthy_str(cover, "url") {
        return Some(url.to_owned());
    }
    let formats = cover.record_field("formats")?;
    ["large", "medium", "small"].iter().find_map(|name| {
        formats
            .record_field(name)
            .and_then(|f| truthy_str(&f, "url").map(str::to_owned))
    })
}

fn owned_str(record: &ContentRecord, key: &str) -> Option<String> {
    record.str_field(key).map(str::to_owned)
}

/// Non-empty string field.
fn truthy_str<'a>(record: &'a ContentRecord, key: &str) -> Option<&'a str> {
    record.str_field(key).filter(|s| !s.is_empty())
}

/// JavaScript-style truthiness, which the site's field coalescing has
/// always been written against.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
