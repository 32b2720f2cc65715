//! Dashboard — Axum web server for the match board.
//!
//! Serves a JSON API that drives the prediction cards and a small
//! self-contained HTML page. CORS enabled for local development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    response::Html,
    routing::{get, post},
    Router,
};
use std::future::Future;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use routes::{AppState, DashboardState};

/// The embedded dashboard HTML (compiled into the binary).
const DASHBOARD_HTML: &str = include_str!("templates/index.html");

/// Serve the dashboard until `shutdown` resolves.
pub async fn serve(state: AppState, port: u16, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {port}"))?;
    info!(port, "Dashboard server listening on http://localhost:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Dashboard server error")
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // API routes
        .route("/api/teams", get(routes::get_teams))
        .route("/api/matches", get(routes::get_matches))
        .route("/api/matches/:id", get(routes::get_match))
        .route("/api/matches/:id/picker", post(routes::post_picker))
        .route("/api/matches/:id/picker/:slot", get(routes::get_picker_options))
        .route("/api/matches/:id/team", post(routes::post_team))
        .route("/api/matches/:id/prediction", post(routes::post_prediction))
        .route("/api/matches/:id/submit", post(routes::post_submit))
        .route("/api/notifications", get(routes::get_notifications))
        .route("/health", get(routes::health))
        // Dashboard HTML
        .route("/", get(serve_dashboard))
        .layer(cors)
        .with_state(state)
}

/// Serve the embedded HTML dashboard.
async fn serve_dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::MatchBoard;
    use crate::card::kickoff::FixedClock;
    use crate::card::submission::SimulatedSubmitter;
    use crate::catalog::TeamCatalog;
    use crate::config::MatchConfig;
    use crate::notify::NotificationLog;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let notifications = Arc::new(NotificationLog::default());
        let board = MatchBoard::from_config(
            &[
                MatchConfig {
                    id: 1,
                    kickoff: "20:00".into(),
                    home: None,
                    away: None,
                    selectable: true,
                },
                MatchConfig {
                    id: 2,
                    kickoff: "12:30".into(),
                    home: Some(3),
                    away: Some(5),
                    selectable: false,
                },
            ],
            Arc::new(TeamCatalog::builtin()),
            Arc::new(SimulatedSubmitter::new(Duration::ZERO)),
            notifications.clone(),
        )
        .unwrap();
        let clock = FixedClock(
            NaiveDate::from_ymd_opt(2026, 5, 16)
                .unwrap()
                .and_hms_opt(19, 50, 0)
                .unwrap(),
        );
        Arc::new(DashboardState::new(board, notifications).with_clock(Arc::new(clock)))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state());
        let resp = app.oneshot(get_req("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_matches_endpoint() {
        let (status, json) = send(build_router(test_state()), get_req("/api/matches")).await;
        assert_eq!(status, StatusCode::OK);
        let cards = json.as_array().unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0]["status"]["label"], "Starts in 10m");
        assert_eq!(cards[0]["status"]["tier"], "imminent");
        assert_eq!(cards[1]["status"]["label"], "Finished");
        assert_eq!(cards[1]["selectable"], false);
    }

    #[tokio::test]
    async fn test_unknown_match_404() {
        let (status, json) = send(build_router(test_state()), get_req("/api/matches/99")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().unwrap().contains("99"));
    }

    #[tokio::test]
    async fn test_picker_flow() {
        let state = test_state();

        let (status, json) = send(
            build_router(state.clone()),
            post_json("/api/matches/1/picker", serde_json::json!({"slot": "home", "open": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["open_picker"], "home");

        let (_, json) = send(
            build_router(state.clone()),
            post_json("/api/matches/1/picker", serde_json::json!({"slot": "away", "open": true})),
        )
        .await;
        assert_eq!(json["open_picker"], "away");

        let (status, json) = send(
            build_router(state.clone()),
            post_json("/api/matches/1/team", serde_json::json!({"slot": "away", "team_id": 6})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["away_team"]["name"], "Chelsea");
        assert!(json["open_picker"].is_null());

        let (_, json) = send(build_router(state), get_req("/api/matches/1/picker/away")).await;
        let options = json.as_array().unwrap();
        let selected: Vec<_> = options.iter().filter(|o| o["selected"] == true).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0]["team"]["id"], 6);
    }

    #[tokio::test]
    async fn test_unknown_team_400() {
        let (status, _) = send(
            build_router(test_state()),
            post_json("/api/matches/1/team", serde_json::json!({"slot": "home", "team_id": 404})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_team_on_display_only_card_409() {
        let state = test_state();
        let (status, json) = send(
            build_router(state.clone()),
            post_json("/api/matches/2/team", serde_json::json!({"slot": "home", "team_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "Match 2 does not accept selections");

        let (_, json) = send(build_router(state), get_req("/api/matches/2")).await;
        assert_eq!(json["home_team"]["id"], 3);
    }

    #[tokio::test]
    async fn test_full_submit_flow() {
        let state = test_state();
        for (slot, id) in [("home", 1), ("away", 6)] {
            send(
                build_router(state.clone()),
                post_json("/api/matches/1/team", serde_json::json!({"slot": slot, "team_id": id})),
            )
            .await;
        }

        let (_, json) = send(
            build_router(state.clone()),
            post_json("/api/matches/1/prediction", serde_json::json!({"prediction": "draw"})),
        )
        .await;
        assert_eq!(json["applied"], true);

        let (status, json) =
            send(build_router(state.clone()), post_json("/api/matches/1/submit", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["outcome"], "succeeded");
        assert_eq!(json["message"], "Prediction submitted: Draw between Arsenal and Chelsea");
        assert_eq!(json["card"]["is_submitting"], false);

        let (_, json) = send(build_router(state), get_req("/api/notifications")).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["kind"], "success");
    }

    #[tokio::test]
    async fn test_blocked_submit() {
        let (status, json) =
            send(build_router(test_state()), post_json("/api/matches/2/submit", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["outcome"], "blocked");
        assert_eq!(json["reason"], "not_selectable");
    }

    #[tokio::test]
    async fn test_dashboard_html() {
        let app = build_router(test_state());
        let resp = app.oneshot(get_req("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("MATCHDAY"));
    }
}
