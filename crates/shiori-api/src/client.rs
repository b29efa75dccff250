use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ApiError;
use crate::filters::AnimeFilters;
use crate::traits::CatalogApi;
use crate::types::{Anime, AnimeKind, AnimeListResponse, AnimeRating, AnimeStatus, Genre};

/// Gateway mount point used when nothing is configured.
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:3000/api";

/// HTTP client for the catalog, addressed through the gateway prefix.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: Url,
    http: Client,
}

impl CatalogClient {
    /// Create a client for the gateway mounted at `base_url`
    /// (e.g. `http://localhost:3000/api`).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_http(base_url, Client::new())
    }

    /// Like [`CatalogClient::new`] with a per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_http(base_url, http)
    }

    pub fn with_http(base_url: &str, http: Client) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::Url(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Url(format!("{base_url} cannot be a base URL")));
        }
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `segments` to the base path. Each segment is percent-encoded,
    /// so ids and search text can never introduce extra path components.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Check the HTTP response for errors, naming the failed operation.
    async fn check_response(
        resp: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let status_text = status
            .canonical_reason()
            .map(str::to_owned)
            .unwrap_or_else(|| status.as_str().to_owned());
        tracing::warn!(status = status.as_u16(), operation, "catalog request failed");
        Err(ApiError::Status {
            operation,
            status: status.as_u16(),
            status_text,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        operation: &'static str,
    ) -> Result<T, ApiError> {
        tracing::debug!(%url, operation, "catalog request");
        let resp = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let resp = Self::check_response(resp, operation).await?;
        resp.json()
            .await
            .map_err(|e| ApiError::Parse(format!("{operation}: {e}")))
    }
}

impl CatalogApi for CatalogClient {
    async fn fetch_anime_by_id(&self, id: &str) -> Result<Anime, ApiError> {
        let url = self.endpoint(&["anime", "id", id])?;
        self.get_json(url, "fetch anime").await
    }

    async fn fetch_anime_list(&self, page: u32, limit: u32) -> Result<AnimeListResponse, ApiError> {
        let mut url = self.endpoint(&["anime", "get-anime-list"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        self.get_json(url, "fetch anime list").await
    }

    async fn fetch_anime_list_filtered(
        &self,
        filters: &AnimeFilters,
    ) -> Result<AnimeListResponse, ApiError> {
        let mut url = self.endpoint(&["anime", "get-anime-list-filtered"])?;
        if !filters.is_empty() {
            url.set_query(Some(&filters.to_query_string()));
        }
        self.get_json(url, "fetch filtered anime list").await
    }

    async fn search_anime(&self, query: &str) -> Result<AnimeListResponse, ApiError> {
        let url = self.endpoint(&["anime", "name", query.trim()])?;
        self.get_json(url, "search anime").await
    }

    async fn fetch_genre_list(&self) -> Result<Vec<Genre>, ApiError> {
        let url = self.endpoint(&["genre", "get-list-genres"])?;
        self.get_json(url, "fetch genres").await
    }

    async fn fetch_genre(&self, genre_id: &str) -> Result<Genre, ApiError> {
        let url = self.endpoint(&["genre", "get-genre", genre_id])?;
        self.get_json(url, "fetch genre").await
    }

    async fn fetch_anime_kinds(&self) -> Result<Vec<AnimeKind>, ApiError> {
        let url = self.endpoint(&["anime", "kinds"])?;
        self.get_json(url, "fetch anime kinds").await
    }

    async fn fetch_anime_statuses(&self) -> Result<Vec<AnimeStatus>, ApiError> {
        let url = self.endpoint(&["anime", "statuses"])?;
        self.get_json(url, "fetch anime statuses").await
    }

    async fn fetch_anime_ratings(&self) -> Result<Vec<AnimeRating>, ApiError> {
        let url = self.endpoint(&["anime", "ratings"])?;
        self.get_json(url, "fetch anime ratings").await
    }
}
