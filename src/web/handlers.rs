use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::mta::feeds;
use crate::AppState;

/// GET /api/board: latest section-grouped board.
pub async fn get_board(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let board = state.board.load();
    Json(json!({
        "success": true,
        "board": &**board,
    }))
}

/// GET /api/status: route, directory size, and fetch heartbeat.
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let board = state.board.load();
    let route = &state.config.route;
    let last_fetch = state.last_fetch_success.load(Ordering::Relaxed);

    Json(json!({
        "success": true,
        "status": {
            "route": route,
            "long_name": feeds::route_long_name(route),
            "board_status": board.status,
            "sections": state.directory.sections(),
            "stations": state.directory.station_names().len(),
            "train_count": board.train_count(),
            "feed_timestamp": board.feed_timestamp,
            "last_fetch_success": last_fetch_rfc3339(last_fetch),
        }
    }))
}

/// GET /api/routes: route catalog, with station document coverage.
pub async fn get_routes(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let routes: Vec<serde_json::Value> = feeds::ROUTE_IDS
        .iter()
        .map(|route| {
            json!({
                "id": route,
                "name": feeds::route_long_name(route),
                "feed_url": feeds::feed_url_for_route(route),
                "has_stations": state.stations.has_route(route),
            })
        })
        .collect();

    Json(json!({
        "success": true,
        "routes": routes,
        "total": routes.len(),
    }))
}

/// GET /api/healthz: liveness check against the fetch heartbeat.
pub async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let fetch_age = now.saturating_sub(state.last_fetch_success.load(Ordering::Relaxed));
    let stale_threshold = state.config.refresh.interval_secs * 3;
    let ok = fetch_age <= stale_threshold;

    Json(json!({
        "ok": ok,
        "age_seconds": fetch_age,
        "reason": if ok { None } else { Some(format!("fetch stale {}s", fetch_age)) },
    }))
}

// -- Helper functions --

/// Epoch seconds as RFC 3339, or None before the first successful fetch.
fn last_fetch_rfc3339(secs: u64) -> Option<String> {
    if secs == 0 {
        return None;
    }
    chrono::DateTime::from_timestamp(secs as i64, 0).map(|t| t.to_rfc3339())
}
