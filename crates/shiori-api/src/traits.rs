//! Transport-agnostic catalog interface.
//!
//! [`crate::CatalogClient`] implements this over HTTP; the caching layer in
//! `shiori-runtime` is generic over it so it can be driven by any source.

use std::future::Future;

use crate::error::ApiError;
use crate::filters::AnimeFilters;
use crate::types::{Anime, AnimeKind, AnimeListResponse, AnimeRating, AnimeStatus, Genre};

/// Catalog read operations, one per upstream endpoint.
pub trait CatalogApi: Send + Sync {
    /// Fetch a single anime by its identifier.
    fn fetch_anime_by_id(&self, id: &str)
        -> impl Future<Output = Result<Anime, ApiError>> + Send;

    /// Fetch one page of the unfiltered list.
    fn fetch_anime_list(
        &self,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = Result<AnimeListResponse, ApiError>> + Send;

    fn fetch_anime_list_filtered(
        &self,
        filters: &AnimeFilters,
    ) -> impl Future<Output = Result<AnimeListResponse, ApiError>> + Send;

    /// Search by name substring. The query is trimmed before sending.
    fn search_anime(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<AnimeListResponse, ApiError>> + Send;

    fn fetch_genre_list(&self) -> impl Future<Output = Result<Vec<Genre>, ApiError>> + Send;

    /// Fetch a genre by its category code (e.g. `27`).
    fn fetch_genre(&self, genre_id: &str)
        -> impl Future<Output = Result<Genre, ApiError>> + Send;

    fn fetch_anime_kinds(&self) -> impl Future<Output = Result<Vec<AnimeKind>, ApiError>> + Send;

    fn fetch_anime_statuses(
        &self,
    ) -> impl Future<Output = Result<Vec<AnimeStatus>, ApiError>> + Send;

    fn fetch_anime_ratings(
        &self,
    ) -> impl Future<Output = Result<Vec<AnimeRating>, ApiError>> + Send;
}
