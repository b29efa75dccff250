//! Cached catalog access for UI code.
//!
//! [`Catalog`] wraps a [`CatalogApi`] with one query cache per result type.
//! Each operation keys its cache by [`CatalogKey`], serves fresh values
//! without a request, and collapses concurrent calls for the same key into
//! a single request. The `*_with` variants take a [`FetchPolicy`];
//! `FetchPolicy::Force` skips a fresh cached value but still joins a
//! request already in flight.

mod guards;
mod keys;

use std::sync::Arc;
use std::time::Duration;

use shiori_api::{
    Anime, AnimeFilters, AnimeKind, AnimeListRequest, AnimeListResponse, AnimeRating,
    AnimeStatus, ApiError, CatalogApi, CatalogClient, Genre,
};
use shiori_core::cache::{CacheStats, QueryCache};
use shiori_core::config::{AppConfig, CacheConfig};

pub use guards::{anime_enabled, search_enabled, MIN_SEARCH_LENGTH};
pub use keys::CatalogKey;
pub use shiori_core::cache::{FetchPolicy, QueryState};

/// State of a guarded catalog query.
pub type CatalogState<T> = QueryState<T, ApiError>;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    /// Shared by every caller that awaited the failed request.
    #[error(transparent)]
    Api(Arc<ApiError>),
    #[error("config error: {0}")]
    Config(String),
}

impl CatalogError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(err) => err.status(),
            Self::Config(_) => None,
        }
    }
}

/// How long each kind of result stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    pub anime: Duration,
    pub list: Duration,
    pub search: Duration,
    pub genre_list: Duration,
    pub genre: Duration,
    /// Kinds, statuses and ratings.
    pub enumeration: Duration,
}

impl From<&CacheConfig> for StalenessPolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            anime: Duration::from_secs(config.anime_secs),
            list: Duration::from_secs(config.list_secs),
            search: Duration::from_secs(config.search_secs),
            genre_list: Duration::from_secs(config.genre_list_secs),
            genre: Duration::from_secs(config.genre_secs),
            enumeration: Duration::from_secs(config.enumeration_secs),
        }
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

type Table<V> = QueryCache<CatalogKey, V, ApiError>;

/// Cached catalog operations over an owned set of cache tables.
#[derive(Debug)]
pub struct Catalog<A = CatalogClient> {
    api: A,
    policy: StalenessPolicy,
    anime: Table<Anime>,
    lists: Table<AnimeListResponse>,
    genre_list: Table<Vec<Genre>>,
    genres: Table<Genre>,
    kinds: Table<Vec<AnimeKind>>,
    statuses: Table<Vec<AnimeStatus>>,
    ratings: Table<Vec<AnimeRating>>,
}

impl Catalog<CatalogClient> {
    /// Build an HTTP-backed catalog from `[client]` and `[cache]` settings.
    pub fn from_config(config: &AppConfig) -> CatalogResult<Self> {
        let client =
            CatalogClient::with_timeout(&config.client.gateway_url, config.client.timeout())
                .map_err(|e| CatalogError::Config(e.to_string()))?;
        Ok(Self::new(client, StalenessPolicy::from(&config.cache)))
    }
}

impl<A> Catalog<A>
where
    A: CatalogApi + Clone + 'static,
{
    pub fn new(api: A, policy: StalenessPolicy) -> Self {
        Self {
            api,
            policy,
            anime: Table::new(),
            lists: Table::new(),
            genre_list: Table::new(),
            genres: Table::new(),
            kinds: Table::new(),
            statuses: Table::new(),
            ratings: Table::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn policy(&self) -> &StalenessPolicy {
        &self.policy
    }

    /// Detail page data. `Idle` without a request when `id` is blank.
    pub async fn anime(&self, id: &str) -> CatalogState<Anime> {
        self.anime_with(id, FetchPolicy::Cached).await
    }

    pub async fn anime_with(&self, id: &str, policy: FetchPolicy) -> CatalogState<Anime> {
        if !anime_enabled(id) {
            return QueryState::Idle;
        }
        let api = self.api.clone();
        let id = id.to_owned();
        self.anime
            .fetch(
                CatalogKey::Anime(id.clone()),
                self.policy.anime,
                policy,
                move || async move { api.fetch_anime_by_id(&id).await },
            )
            .await
            .into()
    }

    pub async fn anime_list(&self, request: AnimeListRequest) -> CatalogResult<AnimeListResponse> {
        self.anime_list_with(request, FetchPolicy::Cached).await
    }

    pub async fn anime_list_with(
        &self,
        request: AnimeListRequest,
        policy: FetchPolicy,
    ) -> CatalogResult<AnimeListResponse> {
        let api = self.api.clone();
        self.lists
            .fetch(
                CatalogKey::AnimeList(request),
                self.policy.list,
                policy,
                move || async move { api.fetch_anime_list(request.page, request.limit).await },
            )
            .await
            .map_err(CatalogError::Api)
    }

    pub async fn anime_filtered(&self, filters: &AnimeFilters) -> CatalogResult<AnimeListResponse> {
        self.anime_filtered_with(filters, FetchPolicy::Cached).await
    }

    pub async fn anime_filtered_with(
        &self,
        filters: &AnimeFilters,
        policy: FetchPolicy,
    ) -> CatalogResult<AnimeListResponse> {
        let api = self.api.clone();
        let owned = filters.clone();
        self.lists
            .fetch(
                CatalogKey::AnimeFiltered(filters.clone()),
                self.policy.list,
                policy,
                move || async move { api.fetch_anime_list_filtered(&owned).await },
            )
            .await
            .map_err(CatalogError::Api)
    }

    /// Name search. Queries shorter than [`MIN_SEARCH_LENGTH`] after
    /// trimming never reach the catalog and report `Idle`.
    pub async fn search(&self, query: &str) -> CatalogState<AnimeListResponse> {
        self.search_with(query, FetchPolicy::Cached).await
    }

    pub async fn search_with(
        &self,
        query: &str,
        policy: FetchPolicy,
    ) -> CatalogState<AnimeListResponse> {
        if !search_enabled(query) {
            tracing::trace!(query, "search below minimum length, skipped");
            return QueryState::Idle;
        }
        let api = self.api.clone();
        let trimmed = query.trim().to_owned();
        self.lists
            .fetch(
                CatalogKey::AnimeSearch(trimmed.clone()),
                self.policy.search,
                policy,
                move || async move { api.search_anime(&trimmed).await },
            )
            .await
            .into()
    }

    /// State of the search for `query` without starting one.
    pub async fn search_state(&self, query: &str) -> CatalogState<AnimeListResponse> {
        if !search_enabled(query) {
            return QueryState::Idle;
        }
        self.lists.state(&CatalogKey::search(query)).await
    }

    pub async fn genre_list(&self) -> CatalogResult<Vec<Genre>> {
        self.genre_list_with(FetchPolicy::Cached).await
    }

    pub async fn genre_list_with(&self, policy: FetchPolicy) -> CatalogResult<Vec<Genre>> {
        let api = self.api.clone();
        self.genre_list
            .fetch(
                CatalogKey::GenreList,
                self.policy.genre_list,
                policy,
                move || async move { api.fetch_genre_list().await },
            )
            .await
            .map_err(CatalogError::Api)
    }

    /// Genre by category code, e.g. `27`.
    pub async fn genre(&self, genre_id: &str) -> CatalogResult<Genre> {
        self.genre_with(genre_id, FetchPolicy::Cached).await
    }

    pub async fn genre_with(&self, genre_id: &str, policy: FetchPolicy) -> CatalogResult<Genre> {
        let api = self.api.clone();
        let genre_id = genre_id.to_owned();
        self.genres
            .fetch(
                CatalogKey::Genre(genre_id.clone()),
                self.policy.genre,
                policy,
                move || async move { api.fetch_genre(&genre_id).await },
            )
            .await
            .map_err(CatalogError::Api)
    }

    pub async fn kinds(&self) -> CatalogResult<Vec<AnimeKind>> {
        self.kinds_with(FetchPolicy::Cached).await
    }

    pub async fn kinds_with(&self, policy: FetchPolicy) -> CatalogResult<Vec<AnimeKind>> {
        let api = self.api.clone();
        self.kinds
            .fetch(
                CatalogKey::AnimeKinds,
                self.policy.enumeration,
                policy,
                move || async move { api.fetch_anime_kinds().await },
            )
            .await
            .map_err(CatalogError::Api)
    }

    pub async fn statuses(&self) -> CatalogResult<Vec<AnimeStatus>> {
        self.statuses_with(FetchPolicy::Cached).await
    }

    pub async fn statuses_with(&self, policy: FetchPolicy) -> CatalogResult<Vec<AnimeStatus>> {
        let api = self.api.clone();
        self.statuses
            .fetch(
                CatalogKey::AnimeStatuses,
                self.policy.enumeration,
                policy,
                move || async move { api.fetch_anime_statuses().await },
            )
            .await
            .map_err(CatalogError::Api)
    }

    pub async fn ratings(&self) -> CatalogResult<Vec<AnimeRating>> {
        self.ratings_with(FetchPolicy::Cached).await
    }

    pub async fn ratings_with(&self, policy: FetchPolicy) -> CatalogResult<Vec<AnimeRating>> {
        let api = self.api.clone();
        self.ratings
            .fetch(
                CatalogKey::AnimeRatings,
                self.policy.enumeration,
                policy,
                move || async move { api.fetch_anime_ratings().await },
            )
            .await
            .map_err(CatalogError::Api)
    }

    /// Drop the cached value for `key`; the next call refetches.
    pub async fn invalidate(&self, key: &CatalogKey) {
        match key {
            CatalogKey::Anime(_) => self.anime.invalidate(key).await,
            CatalogKey::AnimeList(_) | CatalogKey::AnimeFiltered(_) | CatalogKey::AnimeSearch(_) => {
                self.lists.invalidate(key).await
            }
            CatalogKey::GenreList => self.genre_list.invalidate(key).await,
            CatalogKey::Genre(_) => self.genres.invalidate(key).await,
            CatalogKey::AnimeKinds => self.kinds.invalidate(key).await,
            CatalogKey::AnimeStatuses => self.statuses.invalidate(key).await,
            CatalogKey::AnimeRatings => self.ratings.invalidate(key).await,
        }
    }

    pub async fn invalidate_all(&self) {
        self.anime.clear().await;
        self.lists.clear().await;
        self.genre_list.clear().await;
        self.genres.clear().await;
        self.kinds.clear().await;
        self.statuses.clear().await;
        self.ratings.clear().await;
    }

    /// Drop expired entries from every table. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut removed = 0;
        removed += self.anime.purge_expired().await;
        removed += self.lists.purge_expired().await;
        removed += self.genre_list.purge_expired().await;
        removed += self.genres.purge_expired().await;
        removed += self.kinds.purge_expired().await;
        removed += self.statuses.purge_expired().await;
        removed += self.ratings.purge_expired().await;
        if removed > 0 {
            tracing::debug!(removed, "purged expired catalog entries");
        }
        removed
    }

    /// Combined counters across all tables.
    pub async fn stats(&self) -> CacheStats {
        let tables = [
            self.anime.stats().await,
            self.lists.stats().await,
            self.genre_list.stats().await,
            self.genres.stats().await,
            self.kinds.stats().await,
            self.statuses.stats().await,
            self.ratings.stats().await,
        ];
        tables.iter().fold(CacheStats::default(), |acc, s| CacheStats {
            hits: acc.hits + s.hits,
            misses: acc.misses + s.misses,
            joined: acc.joined + s.joined,
            entries: acc.entries + s.entries,
        })
    }
}
