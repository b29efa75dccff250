use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use shiori_api::{
    AnimeFilters, AnimeKind, AnimeRating, ApiError, CatalogApi, CatalogClient, GenreCode, SortBy,
};
use tokio::net::TcpListener;

type Seen = Arc<Mutex<Vec<String>>>;

fn anime_json(id: &str) -> serde_json::Value {
    json!({
        "anime_id": id,
        "id": format!("doc-{id}"),
        "status": "ongoing",
        "episodes": 12,
        "episodesAired": 5,
        "nextEpisodeAt": "2024-05-08T15:30:00+03:00",
        "english": null,
        "russian": "Тест",
        "duration": 24,
        "isCensored": false,
        "aired_on": "2024-04-03",
        "released_on": null,
        "screenshots": [],
        "kind": "tv",
        "description": null,
        "rating": "pg_13",
        "season": "spring_2024",
        "genre_ids": ["1"],
        "score": 7.5,
        "poster_url": null,
        "related_anime_ids": [],
        "character_ids": [],
        "createdAt": null,
        "updatedAt": null
    })
}

/// Stand-in for the gateway: records every request target and answers
/// by path.
async fn fake_gateway(State(seen): State<Seen>, headers: HeaderMap, uri: Uri) -> Response {
    seen.lock().unwrap().push(uri.to_string());

    if headers.get("accept").and_then(|v| v.to_str().ok()) != Some("application/json") {
        return StatusCode::NOT_ACCEPTABLE.into_response();
    }

    let empty_list = json!({ "total_count": 0, "anime_list": [] });
    match uri.path() {
        "/api/anime/id/52991" => Json(anime_json("52991")).into_response(),
        p if p.starts_with("/api/anime/id/") => StatusCode::NOT_FOUND.into_response(),
        "/api/anime/get-anime-list" | "/api/anime/get-anime-list-filtered" => {
            Json(empty_list).into_response()
        }
        p if p.starts_with("/api/anime/name/") => Json(json!({
            "total_count": 1,
            "anime_list": [anime_json("1")]
        }))
        .into_response(),
        "/api/genre/get-list-genres" => Json(json!([
            { "id": "a", "russian": "Сёнен", "genre_id": 27, "name": "Shounen" }
        ]))
        .into_response(),
        "/api/genre/get-genre/27" => Json(json!(
            { "id": "a", "russian": "Сёнен", "genre_id": 27, "name": "Shounen" }
        ))
        .into_response(),
        "/api/anime/kinds" => Json(json!(["tv", "movie", "tv_special"])).into_response(),
        "/api/anime/ratings" => Json(json!(["g", "pg_13", "rx", "r_plus_plus"])).into_response(),
        "/api/anime/statuses" => "definitely not json".into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn spawn_gateway() -> (CatalogClient, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .fallback(fake_gateway)
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = CatalogClient::new(&format!("http://{addr}/api")).unwrap();
    (client, seen)
}

#[tokio::test]
async fn fetches_anime_by_id() {
    let (client, seen) = spawn_gateway().await;

    let anime = client.fetch_anime_by_id("52991").await.unwrap();
    assert_eq!(anime.anime_id, "52991");
    assert_eq!(anime.episodes_aired, 5);
    assert_eq!(seen.lock().unwrap().as_slice(), ["/api/anime/id/52991"]);
}

#[tokio::test]
async fn not_found_names_operation_and_status_text() {
    let (client, _) = spawn_gateway().await;

    let err = client.fetch_anime_by_id("0").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "failed to fetch anime: Not Found");
}

#[tokio::test]
async fn list_sends_page_and_limit() {
    let (client, seen) = spawn_gateway().await;

    let list = client.fetch_anime_list(2, 10).await.unwrap();
    assert_eq!(list.total_count, 0);
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        ["/api/anime/get-anime-list?page=2&limit=10"]
    );
}

#[tokio::test]
async fn filtered_list_serializes_filters() {
    let (client, seen) = spawn_gateway().await;

    let filters = AnimeFilters {
        genre_id: vec!["1".into(), "2".into()],
        kind: Some(AnimeKind::Tv),
        sort_by: Some(SortBy::Score),
        filter_by_name: Some(false),
        ..Default::default()
    };
    client.fetch_anime_list_filtered(&filters).await.unwrap();
    client
        .fetch_anime_list_filtered(&AnimeFilters::default())
        .await
        .unwrap();

    assert_eq!(
        seen.lock().unwrap().as_slice(),
        [
            "/api/anime/get-anime-list-filtered?genre_id=1&genre_id=2&kind=tv&sort_by=score&filter_by_name=false",
            "/api/anime/get-anime-list-filtered",
        ]
    );
}

#[tokio::test]
async fn search_trims_and_encodes_query() {
    let (client, seen) = spawn_gateway().await;

    let found = client.search_anime("  ван пис ").await.unwrap();
    assert_eq!(found.total_count, 1);
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        ["/api/anime/name/%D0%B2%D0%B0%D0%BD%20%D0%BF%D0%B8%D1%81"]
    );
}

#[tokio::test]
async fn reference_data_endpoints() {
    let (client, _) = spawn_gateway().await;

    let genres = client.fetch_genre_list().await.unwrap();
    assert_eq!(genres.len(), 1);
    assert_eq!(genres[0].genre_id, GenreCode::Number(27));

    let genre = client.fetch_genre("27").await.unwrap();
    assert_eq!(genre.name, "Shounen");

    let kinds = client.fetch_anime_kinds().await.unwrap();
    assert_eq!(kinds, vec![AnimeKind::Tv, AnimeKind::Movie, AnimeKind::TvSpecial]);
}

#[tokio::test]
async fn unlisted_codes_do_not_fail_reference_lists() {
    let (client, _) = spawn_gateway().await;

    let ratings = client.fetch_anime_ratings().await.unwrap();
    assert_eq!(
        ratings,
        vec![AnimeRating::G, AnimeRating::Pg13, AnimeRating::Rx, AnimeRating::Unknown]
    );
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let (client, _) = spawn_gateway().await;

    let err = client.fetch_anime_statuses().await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_gateway_is_an_http_error() {
    let client = CatalogClient::new("http://127.0.0.1:1/api").unwrap();

    let err = client.fetch_anime_statuses().await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)), "got {err:?}");
}
