//! Query string construction for content API list endpoints.
//!
//! The CMS expects pagination, sorting, relation population, and filters
//! as bracketed query parameters (`pagination[page]`,
//! `filters[field][$eq]`, `filters[$or][0][title][$containsi]`, ...).
//! [`Query`] builds those pairs; percent-encoding is left to the HTTP
//! layer.

/// A filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// Case-insensitive substring match.
    ContainsI,
    /// Greater than or equal.
    Gte,
    /// Less than or equal.
    Lte,
}

impl FilterOp {
    fn as_param(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::ContainsI => "$containsi",
            Self::Gte => "$gte",
            Self::Lte => "$lte",
        }
    }
}

#[derive(Debug, Clone)]
struct FilterClause {
    or_group: Option<usize>,
    path: Vec<String>,
    op: FilterOp,
    value: String,
}

/// Builder for content API query strings.
///
/// Pairs are emitted in a stable order: pagination, sort, populate, then
/// filters in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Query {
    page: Option<u32>,
    page_size: Option<u32>,
    limit: Option<u32>,
    sort: Option<String>,
    populate: Option<String>,
    filters: Vec<FilterClause>,
}

impl Query {
    /// Create an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Page number (1-based).
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Records per page.
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Flat result cap (`pagination[limit]`), used instead of paging.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sort key, e.g. `startDate:desc`.
    #[must_use]
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Relation population selector.
    #[must_use]
    pub fn populate(mut self, populate: impl Into<String>) -> Self {
        self.populate = Some(populate.into());
        self
    }

    /// Populate all first-level relations (`populate=*`).
    #[must_use]
    pub fn populate_all(self) -> Self {
        self.populate("*")
    }

    /// Add a filter on a (possibly nested) field path.
    #[must_use]
    pub fn filter(mut self, path: &[&str], op: FilterOp, value: impl Into<String>) -> Self {
        self.filters.push(FilterClause {
            or_group: None,
            path: path.iter().map(|s| (*s).to_owned()).collect(),
            op,
            value: value.into(),
        });
        self
    }

    /// Add an equality filter on a single field.
    #[must_use]
    pub fn filter_eq(self, field: &str, value: impl Into<String>) -> Self {
        self.filter(&[field], FilterOp::Eq, value)
    }

    /// Add a clause to an OR group. Clauses sharing a group index are
    /// OR-ed together by the server.
    #[must_use]
    pub fn or_filter(
        mut self,
        group: usize,
        field: &str,
        op: FilterOp,
        value: impl Into<String>,
    ) -> Self {
        self.filters.push(FilterClause {
            or_group: Some(group),
            path: vec![field.to_owned()],
            op,
            value: value.into(),
        });
        self
    }

    /// Add equality filters from a caller-supplied field/value list.
    #[must_use]
    pub fn eq_filters<'a, I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (field, value) in pairs {
            self = self.filter_eq(field, value);
        }
        self
    }

    /// Render the query as ordered key/value pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("pagination[page]".to_owned(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(("pagination[pageSize]".to_owned(), page_size.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("pagination[limit]".to_owned(), limit.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_owned(), sort.clone()));
        }
        if let Some(populate) = &self.populate {
            pairs.push(("populate".to_owned(), populate.clone()));
        }
        for clause in &self.filters {
            let mut key = String::from("filters");
            if let Some(group) = clause.or_group {
                key.push_str(&format!("[$or][{group}]"));
            }
            for segment in &clause.path {
                key.push_str(&format!("[{segment}]"));
            }
            key.push_str(&format!("[{}]", clause.op.as_param()));
            pairs.push((key, clause.value.clone()));
        }
        pairs
    }

    /// Whether the query renders no pairs at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_pairs().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_sort_populate_order() {
        let pairs = Query::new()
            .page(2)
            .page_size(12)
            .sort("startDate:desc")
            .populate_all()
            .to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("pagination[page]".to_owned(), "2".to_owned()),
                ("pagination[pageSize]".to_owned(), "12".to_owned()),
                ("sort".to_owned(), "startDate:desc".to_owned()),
                ("populate".to_owned(), "*".to_owned()),
            ]
        );
    }

    #[test]
    fn equality_filter() {
        let pairs = Query::new().filter_eq("featured", "true").to_pairs();
        assert_eq!(
            pairs,
            vec![("filters[featured][$eq]".to_owned(), "true".to_owned())]
        );
    }

    #[test]
    fn nested_filter_path() {
        let pairs = Query::new()
            .filter(&["tags", "slug"], FilterOp::Eq, "openings")
            .to_pairs();
        assert_eq!(
            pairs,
            vec![("filters[tags][slug][$eq]".to_owned(), "openings".to_owned())]
        );
    }

    #[test]
    fn range_filters() {
        let pairs = Query::new()
            .filter(&["startDate"], FilterOp::Gte, "2025-01-01T00:00:00Z")
            .filter(&["endDate"], FilterOp::Lte, "2025-12-31T00:00:00Z")
            .to_pairs();
        assert_eq!(pairs[0].0, "filters[startDate][$gte]");
        assert_eq!(pairs[1].0, "filters[endDate][$lte]");
    }

    #[test]
    fn or_group_encoding() {
        let pairs = Query::new()
            .or_filter(0, "title", FilterOp::ContainsI, "sicilian")
            .or_filter(1, "description", FilterOp::ContainsI, "sicilian")
            .to_pairs();
        assert_eq!(
            pairs,
            vec![
                (
                    "filters[$or][0][title][$containsi]".to_owned(),
                    "sicilian".to_owned()
                ),
                (
                    "filters[$or][1][description][$containsi]".to_owned(),
                    "sicilian".to_owned()
                ),
            ]
        );
    }

    #[test]
    fn caller_filters_keep_insertion_order() {
        let pairs = Query::new()
            .eq_filters([("eventType", "workshop"), ("featured", "true")])
            .to_pairs();
        assert_eq!(pairs[0].0, "filters[eventType][$eq]");
        assert_eq!(pairs[1].0, "filters[featured][$eq]");
    }

    #[test]
    fn empty_query_renders_nothing() {
        assert!(Query::new().is_empty());
        assert!(!Query::new().page(1).is_empty());
    }
}
