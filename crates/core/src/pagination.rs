//! List request parameters and the two list response shapes.
//!
//! Some collection endpoints return a bare JSON array, others a page
//! object `{count, next, previous, results}`. [`ListResponse`] accepts
//! both.

use serde::{Deserialize, Serialize};

/// Filters for a collection request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub published: Option<bool>,
}

impl ListParams {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    /// Query-string pairs for the parameters that are set.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(published) = self.published {
            pairs.push(("published", published.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Page(Page<T>),
    Flat(Vec<T>),
}

impl<T> ListResponse<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::Page(page) => page.results,
            ListResponse::Flat(items) => items,
        }
    }

    /// Total count when the backend reports one, else the item count.
    pub fn total(&self) -> u64 {
        match self {
            ListResponse::Page(page) => page.count.unwrap_or(page.results.len() as u64),
            ListResponse::Flat(items) => items.len() as u64,
        }
    }

    pub fn has_next(&self) -> bool {
        matches!(self, ListResponse::Page(Page { next: Some(_), .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_flat_list() {
        let resp: ListResponse<u32> = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert_eq!(resp.total(), 3);
        assert!(!resp.has_next());
        assert_eq!(resp.into_items(), vec![1, 2, 3]);
    }

    #[test]
    fn accepts_page_object() {
        let resp: ListResponse<u32> = serde_json::from_value(json!({
            "count": 40,
            "next": "http://api/blogs/?page=2",
            "previous": null,
            "results": [1, 2]
        }))
        .unwrap();
        assert_eq!(resp.total(), 40);
        assert!(resp.has_next());
        assert_eq!(resp.into_items(), vec![1, 2]);
    }

    #[test]
    fn query_pairs_skip_unset_values() {
        assert!(ListParams::default().to_query_pairs().is_empty());
        let params = ListParams {
            page: Some(2),
            search: Some(String::new()),
            published: Some(true),
        };
        assert_eq!(
            params.to_query_pairs(),
            vec![("page", "2".to_string()), ("published", "true".to_string())]
        );
    }
}
