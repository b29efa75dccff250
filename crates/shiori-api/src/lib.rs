//! Typed access to the anime catalog through the same-origin gateway.
//!
//! [`CatalogClient`] issues one HTTP request per call and never caches;
//! caching and request deduplication live in `shiori-runtime`.

pub mod client;
pub mod error;
pub mod filters;
pub mod traits;
pub mod types;

pub use client::CatalogClient;
pub use error::ApiError;
pub use filters::AnimeFilters;
pub use traits::CatalogApi;
pub use types::{
    Anime, AnimeKind, AnimeListRequest, AnimeListResponse, AnimeRating, AnimeStatus, Genre,
    GenreCode, SortBy, SortOrder,
};
