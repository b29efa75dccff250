use std::fmt;

use shiori_api::{AnimeFilters, AnimeListRequest};

/// Cache key: the operation plus every parameter that shapes its result.
/// Two keys are equal only when all parameters match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogKey {
    Anime(String),
    AnimeList(AnimeListRequest),
    AnimeFiltered(AnimeFilters),
    /// Holds the trimmed query.
    AnimeSearch(String),
    GenreList,
    Genre(String),
    AnimeKinds,
    AnimeStatuses,
    AnimeRatings,
}

impl CatalogKey {
    pub fn search(query: &str) -> Self {
        Self::AnimeSearch(query.trim().to_owned())
    }

    /// Operation tag, e.g. `anime-list`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Anime(_) => "anime",
            Self::AnimeList(_) => "anime-list",
            Self::AnimeFiltered(_) => "anime-filtered",
            Self::AnimeSearch(_) => "anime-search",
            Self::GenreList => "genre-list",
            Self::Genre(_) => "genre",
            Self::AnimeKinds => "anime-kinds",
            Self::AnimeStatuses => "anime-statuses",
            Self::AnimeRatings => "anime-ratings",
        }
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.tag();
        match self {
            Self::Anime(id) | Self::Genre(id) => write!(f, "[{tag}, {id:?}]"),
            Self::AnimeSearch(query) => write!(f, "[{tag}, {query:?}]"),
            Self::AnimeList(req) => write!(f, "[{tag}, {}, {}]", req.page, req.limit),
            Self::AnimeFiltered(filters) => write!(f, "[{tag}, {:?}]", filters.to_query_string()),
            Self::GenreList | Self::AnimeKinds | Self::AnimeStatuses | Self::AnimeRatings => {
                write!(f, "[{tag}]")
            }
        }
    }
}
