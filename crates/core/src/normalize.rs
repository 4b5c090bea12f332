//! Response normalization.
//!
//! The content API wraps payloads in a `{ data: ... }` envelope and has
//! shipped record nodes in two shapes over its lifetime: a legacy shape
//! with fields nested under `attributes`, and the current flat shape
//! where fields sit next to `id`. [`normalize_response`] is the single
//! point that absorbs both, flattening every node, unwrapping relation
//! envelopes, and rewriting media paths to absolute URLs.
//!
//! Normalization is lenient by policy: values that don't match a known
//! shape pass through unchanged, and nothing here returns an error.

use serde_json::{Map, Value};

use crate::media::MediaResolver;
use crate::record::ContentRecord;

/// Result of normalizing a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// No usable `data` payload.
    None,
    /// A single-record payload.
    One(ContentRecord),
    /// A list payload, input order preserved.
    Many(Vec<ContentRecord>),
}

impl Normalized {
    /// The single record, for endpoints that return one.
    #[must_use]
    pub fn into_record(self) -> Option<ContentRecord> {
        match self {
            Self::One(record) => Some(record),
            _ => None,
        }
    }

    /// The record list, for collection endpoints. Single-record and
    /// empty payloads yield an empty list.
    #[must_use]
    pub fn into_records(self) -> Vec<ContentRecord> {
        match self {
            Self::Many(records) => records,
            _ => Vec::new(),
        }
    }

    /// The first record regardless of payload shape.
    #[must_use]
    pub fn into_first(self) -> Option<ContentRecord> {
        match self {
            Self::One(record) => Some(record),
            Self::Many(records) => records.into_iter().next(),
            Self::None => None,
        }
    }
}

/// The two envelope shapes a record node can arrive in.
#[derive(Debug)]
enum RecordNode {
    /// Legacy shape: `{ id, attributes: { ... } }`.
    Wrapped {
        id: Option<Value>,
        attributes: Map<String, Value>,
    },
    /// Current shape: fields are siblings of `id`.
    Flat(Map<String, Value>),
}

impl RecordNode {
    /// Classify a node, or `None` for non-object values.
    fn classify(value: Value) -> Option<Self> {
        let Value::Object(mut map) = value else {
            return None;
        };
        match map.remove("attributes") {
            Some(Value::Object(attributes)) => Some(Self::Wrapped {
                id: map.remove("id"),
                attributes,
            }),
            Some(other) => {
                // Non-object `attributes` is just a field.
                map.insert("attributes".to_owned(), other);
                Some(Self::Flat(map))
            }
            None => Some(Self::Flat(map)),
        }
    }

    fn is_wrapped(&self) -> bool {
        matches!(self, Self::Wrapped { .. })
    }

    /// Merge into one flat field map: `{ id, ...attributes }` for the
    /// legacy shape, identity for the flat shape.
    fn flatten(self) -> Map<String, Value> {
        match self {
            Self::Wrapped { id, attributes } => {
                let mut map = Map::with_capacity(attributes.len() + 1);
                if let Some(id) = id {
                    map.insert("id".to_owned(), id);
                }
                map.extend(attributes);
                map
            }
            Self::Flat(map) => map,
        }
    }
}

/// Normalize a raw response body into flat records.
///
/// A missing, null, or non-record `data` payload yields
/// [`Normalized::None`] rather than an error.
#[must_use]
pub fn normalize_response(body: &Value, media: &MediaResolver) -> Normalized {
    let Some(data) = body.get("data") else {
        return Normalized::None;
    };
    match data {
        Value::Array(items) => Normalized::Many(
            items
                .iter()
                .cloned()
                .filter_map(|item| normalize_node(item, media))
                .collect(),
        ),
        Value::Object(_) => match normalize_node(data.clone(), media) {
            Some(record) => Normalized::One(record),
            None => Normalized::None,
        },
        _ => Normalized::None,
    }
}

/// Flatten one record node and normalize each of its fields.
fn normalize_node(value: Value, media: &MediaResolver) -> Option<ContentRecord> {
    let mut map = RecordNode::classify(value)?.flatten();
    for field in map.values_mut() {
        normalize_field(field, media);
    }
    Some(ContentRecord::from_map(map))
}

/// Normalize a single field value in place.
fn normalize_field(value: &mut Value, media: &MediaResolver) {
    // Legacy relation/media envelope: `{ data: node }` or `{ data: [node] }`.
    // An empty to-one relation arrives as `{ data: null }` and is left as-is.
    let enveloped = value
        .as_object()
        .and_then(|obj| obj.get("data"))
        .is_some_and(|data| data.is_object() || data.is_array());
    if enveloped {
        let data = value
            .as_object_mut()
            .and_then(|obj| obj.remove("data"))
            .unwrap_or(Value::Null);
        *value = match data {
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .filter_map(|node| unwrap_relation_node(node, media))
                    .collect(),
            ),
            node => unwrap_relation_node(node, media).unwrap_or(Value::Null),
        };
        return;
    }

    // Already-flat media: resolve any carried `url`s in place.
    if let Value::Array(items) = value {
        for item in items {
            resolve_url_in_place(item, media);
        }
        return;
    }
    resolve_url_in_place(value, media);
}

/// Unwrap one node from inside a relation envelope.
///
/// Nodes are flattened and normalized recursively the same way as
/// top-level records. Legacy nodes always end up with a `url` key
/// afterwards (null when the upload had none), matching what the site
/// has historically relied on for media relations.
fn unwrap_relation_node(node: Value, media: &MediaResolver) -> Option<Value> {
    let wrapped = RecordNode::classify(node.clone())?.is_wrapped();
    let mut map = normalize_node(node, media)?.into_map();
    let resolved = media.resolve(map.get("url").and_then(Value::as_str));
    if wrapped {
        map.insert(
            "url".to_owned(),
            resolved.map_or(Value::Null, Value::String),
        );
    } else if let Some(resolved) = resolved {
        map.insert("url".to_owned(), Value::String(resolved));
    }
    Some(Value::Object(map))
}

/// Resolve the `url` of a media-like object in place. Anything without a
/// non-empty string `url` is left untouched.
fn resolve_url_in_place(value: &mut Value, media: &MediaResolver) {
    let Value::Object(map) = value else { return };
    let Some(Value::String(url)) = map.get("url") else {
        return;
    };
    if url.is_empty() {
        return;
    }
    if let Some(resolved) = media.resolve(Some(url)) {
        map.insert("url".to_owned(), Value::String(resolved));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn media() -> MediaResolver {
        MediaResolver::new("http://media.example")
    }

    #[test]
    fn wrapped_record_is_flattened() {
        let body = json!({
            "data": { "id": 3, "attributes": { "title": "Blitz night", "rating": 1800 } }
        });
        let record = normalize_response(&body, &media()).into_record().unwrap();
        assert_eq!(record.i64_field("id"), Some(3));
        assert_eq!(record.str_field("title"), Some("Blitz night"));
        assert!(
            !record.contains("attributes"),
            "no attributes key may remain"
        );
    }

    #[test]
    fn flat_record_is_unchanged() {
        let body = json!({
            "data": { "id": 3, "title": "Blitz night", "rating": 1800 }
        });
        let record = normalize_response(&body, &media()).into_record().unwrap();
        assert_eq!(record.i64_field("id"), Some(3));
        assert_eq!(record.str_field("title"), Some("Blitz night"));
        assert_eq!(record.i64_field("rating"), Some(1800));
    }

    #[test]
    fn list_preserves_length_and_order() {
        let body = json!({
            "data": [
                { "id": 1, "attributes": { "title": "first" } },
                { "id": 2, "title": "second" },
                { "id": 3, "attributes": { "title": "third" } },
            ]
        });
        let records = normalize_response(&body, &media()).into_records();
        assert_eq!(records.len(), 3);
        let titles: Vec<_> = records.iter().map(|r| r.str_field("title").unwrap()).collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[test]
    fn missing_or_null_data_yields_none() {
        assert_eq!(
            normalize_response(&json!({"meta": {}}), &media()),
            Normalized::None
        );
        assert_eq!(
            normalize_response(&json!({"data": null}), &media()),
            Normalized::None
        );
        assert_eq!(
            normalize_response(&json!({"data": 5}), &media()),
            Normalized::None
        );
    }

    #[test]
    fn legacy_media_relation_is_unwrapped_and_resolved() {
        let body = json!({
            "data": { "id": 1, "attributes": {
                "title": "Spring Open",
                "coverImage": { "data": { "id": 9, "attributes": { "url": "/uploads/e.png" } } },
            }}
        });
        let record = normalize_response(&body, &media()).into_record().unwrap();
        let cover = record.record_field("coverImage").unwrap();
        assert_eq!(cover.i64_field("id"), Some(9));
        assert_eq!(
            cover.str_field("url"),
            Some("http://media.example/uploads/e.png")
        );
        assert!(!cover.contains("data"));
    }

    #[test]
    fn absolute_media_url_is_untouched() {
        let body = json!({
            "data": { "id": 1, "attributes": {
                "coverImage": { "data": { "id": 9, "attributes": { "url": "http://cdn/e.png" } } },
            }}
        });
        let record = normalize_response(&body, &media()).into_record().unwrap();
        let cover = record.record_field("coverImage").unwrap();
        assert_eq!(cover.str_field("url"), Some("http://cdn/e.png"));
    }

    #[test]
    fn legacy_to_many_relation_becomes_record_list() {
        let body = json!({
            "data": { "id": 1, "attributes": {
                "gallery": { "data": [
                    { "id": 5, "attributes": { "url": "/uploads/a.png" } },
                    { "id": 6, "attributes": { "caption": "no upload here" } },
                ]},
            }}
        });
        let record = normalize_response(&body, &media()).into_record().unwrap();
        let gallery = record.records_field("gallery").unwrap();
        assert_eq!(gallery.len(), 2);
        assert_eq!(
            gallery[0].str_field("url"),
            Some("http://media.example/uploads/a.png")
        );
        // Legacy media nodes always gain a url key, null when absent.
        assert_eq!(gallery[1].get("url"), Some(&Value::Null));
        assert_eq!(gallery[1].str_field("caption"), Some("no upload here"));
    }

    #[test]
    fn empty_to_one_relation_passes_through() {
        let body = json!({
            "data": { "id": 1, "attributes": { "coverImage": { "data": null } } }
        });
        let record = normalize_response(&body, &media()).into_record().unwrap();
        assert_eq!(
            record.get("coverImage"),
            Some(&json!({ "data": null })),
            "empty relations keep their envelope"
        );
    }

    #[test]
    fn flat_media_object_and_array_are_resolved_in_place() {
        let body = json!({
            "data": { "id": 1,
                "photo": { "id": 2, "url": "/uploads/p.png", "alternativeText": "me" },
                "gallery": [
                    { "id": 3, "url": "/uploads/g1.png" },
                    { "id": 4, "name": "urlless" },
                    "stray",
                ],
            }
        });
        let record = normalize_response(&body, &media()).into_record().unwrap();
        assert_eq!(
            record.record_field("photo").unwrap().str_field("url"),
            Some("http://media.example/uploads/p.png")
        );
        let gallery = record.get("gallery").unwrap().as_array().unwrap();
        assert_eq!(
            gallery[0]["url"],
            json!("http://media.example/uploads/g1.png")
        );
        assert_eq!(gallery[1], json!({ "id": 4, "name": "urlless" }));
        assert_eq!(gallery[2], json!("stray"));
    }

    #[test]
    fn unknown_shapes_pass_through_unchanged() {
        let body = json!({
            "data": { "id": 1,
                "count": 42,
                "tags": ["a", "b"],
                "meta": { "nested": { "deep": true } },
            }
        });
        let record = normalize_response(&body, &media()).into_record().unwrap();
        assert_eq!(record.i64_field("count"), Some(42));
        assert_eq!(record.get("tags"), Some(&json!(["a", "b"])));
        assert_eq!(record.get("meta"), Some(&json!({ "nested": { "deep": true } })));
    }

    #[test]
    fn nested_wrapped_relation_is_flattened_recursively() {
        let body = json!({
            "data": { "id": 1, "attributes": {
                "author": { "data": { "id": 8, "attributes": { "name": "Nadia" } } },
            }}
        });
        let record = normalize_response(&body, &media()).into_record().unwrap();
        let author = record.record_field("author").unwrap();
        assert_eq!(author.i64_field("id"), Some(8));
        assert_eq!(author.str_field("name"), Some("Nadia"));
        assert!(!author.contains("attributes"));
    }
}
