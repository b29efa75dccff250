use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::types::{AnimeKind, AnimeRating, AnimeStatus, SortBy, SortOrder};

/// Criteria for `anime/get-anime-list-filtered`. Every field is optional;
/// `None` leaves that dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimeFilters {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genre_id: Vec<String>,
    pub kind: Option<AnimeKind>,
    pub rating: Option<AnimeRating>,
    pub status: Option<AnimeStatus>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
    pub filter_by_score: Option<bool>,
    pub filter_by_date: Option<bool>,
    pub filter_by_name: Option<bool>,
}

impl AnimeFilters {
    /// Query parameters in wire order. `genre_id` yields one pair per element.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .genre_id
            .iter()
            .map(|id| ("genre_id", id.clone()))
            .collect();

        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((key, value));
            }
        };

        push("kind", self.kind.map(|k| k.as_str().to_owned()));
        push("rating", self.rating.map(|r| r.as_str().to_owned()));
        push("status", self.status.map(|s| s.as_str().to_owned()));
        push("start_year", self.start_year.map(|y| y.to_string()));
        push("end_year", self.end_year.map(|y| y.to_string()));
        push("page", self.page.map(|p| p.to_string()));
        push("limit", self.limit.map(|l| l.to_string()));
        push("sort_by", self.sort_by.map(|s| s.as_str().to_owned()));
        push("sort_order", self.sort_order.map(|o| o.as_str().to_owned()));
        push("filter_by_score", self.filter_by_score.map(|b| b.to_string()));
        push("filter_by_date", self.filter_by_date.map(|b| b.to_string()));
        push("filter_by_name", self.filter_by_name.map(|b| b.to_string()));

        pairs
    }

    /// Form-encoded query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_query_pairs())
            .finish()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_serialize_to_nothing() {
        let filters = AnimeFilters::default();
        assert!(filters.is_empty());
        assert_eq!(filters.to_query_string(), "");
    }

    #[test]
    fn absent_fields_are_omitted() {
        let filters = AnimeFilters {
            kind: Some(AnimeKind::Movie),
            page: Some(2),
            ..Default::default()
        };
        assert_eq!(filters.to_query_string(), "kind=movie&page=2");
    }

    #[test]
    fn genre_ids_repeat_in_input_order() {
        let filters = AnimeFilters {
            genre_id: vec!["27".into(), "1".into(), "8".into()],
            limit: Some(20),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query_string(),
            "genre_id=27&genre_id=1&genre_id=8&limit=20"
        );
    }

    #[test]
    fn booleans_serialize_as_literals() {
        let filters = AnimeFilters {
            filter_by_score: Some(true),
            filter_by_date: Some(false),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query_string(),
            "filter_by_score=true&filter_by_date=false"
        );
    }

    #[test]
    fn full_filters_keep_field_order() {
        let filters = AnimeFilters {
            genre_id: vec!["2".into()],
            kind: Some(AnimeKind::Tv),
            rating: Some(AnimeRating::Pg13),
            status: Some(AnimeStatus::Ongoing),
            start_year: Some(2010),
            end_year: Some(2024),
            page: Some(1),
            limit: Some(30),
            sort_by: Some(SortBy::AiredOn),
            sort_order: Some(SortOrder::Desc),
            filter_by_score: None,
            filter_by_date: Some(true),
            filter_by_name: None,
        };
        assert_eq!(
            filters.to_query_string(),
            "genre_id=2&kind=tv&rating=pg_13&status=ongoing&start_year=2010&end_year=2024\
             &page=1&limit=30&sort_by=aired_on&sort_order=desc&filter_by_date=true"
        );
    }

    #[test]
    fn genre_values_are_form_encoded() {
        let filters = AnimeFilters {
            genre_id: vec!["a b&c".into()],
            ..Default::default()
        };
        assert_eq!(filters.to_query_string(), "genre_id=a+b%26c");
    }
}
