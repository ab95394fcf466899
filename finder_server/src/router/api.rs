use axum::{
    extract::{Path, Query, RawQuery, State},
    response::Json,
    routing::{get, post},
    Router,
};

use std::collections::HashMap;

use finder_client::{CacheStats, GeocodeResult, PlaceDetails};
use finder_core::listing::filter_and_sort;
use finder_core::FilterState;
use finder_url::{decode_url, target_url};

use crate::{
    error::{AppError, Result},
    payload::{CategoryView, LocationsResponse, ShareResponse},
    state::AppState,
    util,
};

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/categories", get(get_categories))
        .route("/api/locations", get(get_all_locations))
        .route("/api/locations/:categories", get(get_locations))
        .route("/api/geocode", get(geocode))
        .route("/api/places/details", get(place_details))
        .route("/api/share", post(share))
        .route("/api/cache/stats", get(get_cache_stats))
        .route("/api/cache/flush", post(flush_cache))
}

async fn health() -> &'static str {
    "ok"
}

async fn get_categories(State(app_state): State<AppState>) -> Json<Vec<CategoryView>> {
    Json(app_state.config.enabled.iter().map(CategoryView::from).collect())
}

// MARK: Locations

async fn get_all_locations(
    State(app_state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<LocationsResponse>> {
    let state = decode_url("/", query.as_deref().unwrap_or_default());
    locations(&app_state, state).await
}

async fn get_locations(
    State(app_state): State<AppState>,
    Path(categories): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<LocationsResponse>> {
    let state = decode_url(&categories, query.as_deref().unwrap_or_default());
    locations(&app_state, state).await
}

async fn locations(app_state: &AppState, mut state: FilterState) -> Result<Json<LocationsResponse>> {
    state.set_categories(app_state.config.enabled.restrict(state.categories()));

    let all = util::timeout(app_state.config.request_timeout, app_state.client.locations()).await?;
    let listings = filter_and_sort(all, &state);
    tracing::debug!("{} listings for {}", listings.len(), target_url(&state));

    Ok(Json(LocationsResponse {
        url: target_url(&state),
        count: listings.len(),
        listings,
    }))
}

// MARK: Places

fn required_param<'a>(params: &'a HashMap<String, String>, name: &'static str) -> Result<&'a str> {
    params
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::MissingParameter(name).into())
}

async fn geocode(
    State(app_state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<GeocodeResult>> {
    let address = required_param(&params, "address")?;
    let result = util::timeout(app_state.config.request_timeout, app_state.client.geocode(address)).await?;
    Ok(Json(result))
}

async fn place_details(
    State(app_state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PlaceDetails>> {
    let place_id = required_param(&params, "placeId")?;
    let fields = params.get("fields").map(|f| f.trim()).filter(|f| !f.is_empty());
    let details = util::timeout(
        app_state.config.request_timeout,
        app_state.client.place_details(place_id, fields),
    )
    .await?;
    Ok(Json(details))
}

// MARK: Share

async fn share(Json(payload): Json<FilterState>) -> Json<ShareResponse> {
    let mut state = FilterState::from_parts(
        payload.categories().clone(),
        payload.attributes().clone(),
        payload.search_location().cloned(),
        payload.search_radius(),
    );
    state.retain_valid_attributes();
    Json(ShareResponse {
        url: target_url(&state),
    })
}

// MARK: Cache

async fn get_cache_stats(State(app_state): State<AppState>) -> Json<CacheStats> {
    Json(app_state.client.cache().stats())
}

async fn flush_cache(State(app_state): State<AppState>) -> Json<CacheStats> {
    app_state.client.cache().clear_all();
    tracing::info!("Request cache flushed");
    Json(app_state.client.cache().stats())
}

#[cfg(test)]
mod test {
    use axum::{
        body::{Body, HttpBody},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use std::sync::Arc;

    use finder_client::LocationClient;

    use super::*;
    use crate::config::Config;

    /// Stand-in for the location-data backend, listening on an ephemeral port.
    fn spawn_upstream() -> String {
        let upstream = Router::new()
            .route(
                "/api/geocode",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    Json(json!({
                        "lat": 43.66,
                        "lng": -70.26,
                        "formatted_address": params.get("address"),
                    }))
                }),
            )
            .route(
                "/api/places/details",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    Json(json!({
                        "place_id": params.get("placeId"),
                        "fields": params.get("fields"),
                    }))
                }),
            );
        let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap()).serve(upstream.into_make_service());
        let address = server.local_addr();
        tokio::spawn(server);
        format!("http://{}", address)
    }

    fn app(upstream: &str) -> Router {
        let config = Config::from_lookup(|key: &str| match key {
            "SERVER_ADDRESS" => Some("127.0.0.1:0".to_string()),
            "UPSTREAM_API_URL" => Some(upstream.to_string()),
            "STATIC_DIR" => Some("dist".to_string()),
            _ => None,
        })
        .unwrap();
        let client = LocationClient::new(upstream, config.locations_cache_ttl).unwrap();
        api_router().with_state(AppState {
            client: Arc::new(client),
            config: Arc::new(config),
        })
    }

    async fn get_body(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let mut body = response.into_body();
        let mut bytes = Vec::new();
        while let Some(chunk) = body.data().await {
            bytes.extend_from_slice(&chunk.unwrap());
        }
        (status, bytes)
    }

    #[tokio::test]
    async fn test_geocode_proxied() {
        let app = app(&spawn_upstream());
        let (status, body) = get_body(&app, "/api/geocode?address=%20Portland%2C%20ME%20").await;
        assert_eq!(status, StatusCode::OK);
        let result: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(result["lat"], json!(43.66));
        assert_eq!(result["formatted_address"], json!("Portland, ME"));
    }

    #[tokio::test]
    async fn test_place_details_proxied() {
        let app = app(&spawn_upstream());
        let (status, body) = get_body(&app, "/api/places/details?placeId=abc123&fields=name,website").await;
        assert_eq!(status, StatusCode::OK);
        let details: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(details, json!({"place_id": "abc123", "fields": "name,website"}));
    }

    #[tokio::test]
    async fn test_missing_parameters_rejected() {
        let app = app(&spawn_upstream());
        for uri in ["/api/geocode", "/api/geocode?address=%20", "/api/places/details?fields=name"] {
            let (status, _) = get_body(&app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        }
    }
}
