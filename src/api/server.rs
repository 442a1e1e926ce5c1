//! Router assembly and middleware

use crate::api::handlers;
use crate::config::Config;
use crate::state::AppState;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Build the application router.
pub fn router(state: Arc<AppState>, config: &Config) -> Router {
    let stocks = Router::new()
        .route("/", get(handlers::list_stocks))
        .route("/:name/prices", get(handlers::list_prices))
        .route("/:name/prices/:date", get(handlers::price_at_date))
        .route("/:name/returns", post(handlers::calculate_returns));

    Router::new()
        .route("/health", get(handlers::health_check))
        // `nest` mounts the inner "/" route at `/api/stocks` without a
        // trailing slash; the spec's `GET /api/stocks/` needs its own entry.
        .route("/api/stocks/", get(handlers::list_stocks))
        .nest("/api/stocks", stocks)
        .with_state(state)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{CumulativeReturnResponse, HealthResponse};
    use crate::data::StockPriceRecord;
    use crate::services::StockPriceList;
    use axum::body::Body;
    use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde::de::DeserializeOwned;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app(rows: &[&str]) -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stocks.csv");
        let mut contents =
            String::from("#,name,asof,volume,close_usd,sector_level1,sector_level2\n");
        for row in rows {
            contents.push_str(row);
            contents.push('\n');
        }
        fs::write(&path, contents).unwrap();

        let config = Config {
            csv_path: path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            cors_origins: vec!["http://localhost:5173".to_string()],
        };
        let state = Arc::new(AppState::new(&config));
        (dir, router(state, &config))
    }

    fn sample_rows() -> Vec<&'static str> {
        vec![
            "1,ACME,2024-01-01,1000,10.0,Tech,Software",
            "2,ACME,2024-01-10,1000,12.0,Tech,Software",
            "3,GLOBEX,2024-01-01,500,50.0,Energy,Oil",
        ]
    }

    async fn body_json<T: DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_dir, app) = test_app(&sample_rows());

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthResponse = body_json(response).await;
        assert_eq!(health.status, "healthy");
    }

    #[tokio::test]
    async fn test_list_stocks() {
        let (_dir, app) = test_app(&sample_rows());

        let response = app.oneshot(get("/api/stocks/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CACHE_CONTROL).unwrap(),
            "public, max-age=3600"
        );
        let names: Vec<String> = body_json(response).await;
        assert_eq!(names, vec!["ACME", "GLOBEX"]);
    }

    #[tokio::test]
    async fn test_list_prices_defaults_and_total() {
        let (_dir, app) = test_app(&sample_rows());

        let response = app.oneshot(get("/api/stocks/ACME/prices")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CACHE_CONTROL).unwrap(),
            "public, max-age=300"
        );
        let list: StockPriceList = body_json(response).await;
        assert_eq!(list.total, 2);
        assert_eq!(list.data.len(), 2);
    }

    #[tokio::test]
    async fn test_list_prices_pagination() {
        let (_dir, app) = test_app(&sample_rows());

        let response = app
            .oneshot(get("/api/stocks/ACME/prices?skip=1&limit=1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let list: StockPriceList = body_json(response).await;
        assert_eq!(list.total, 2);
        assert_eq!(list.data.len(), 1);
        assert_eq!(list.data[0].sequence_id, 2);
    }

    #[tokio::test]
    async fn test_list_prices_rejects_bad_limit() {
        let (_dir, app) = test_app(&sample_rows());

        for uri in [
            "/api/stocks/ACME/prices?limit=0",
            "/api/stocks/ACME/prices?limit=1001",
        ] {
            let response = app.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_list_prices_unknown_stock_is_empty() {
        let (_dir, app) = test_app(&sample_rows());

        let response = app.oneshot(get("/api/stocks/NOPE/prices")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let list: StockPriceList = body_json(response).await;
        assert_eq!(list.total, 0);
        assert!(list.data.is_empty());
    }

    #[tokio::test]
    async fn test_price_at_date_found() {
        let (_dir, app) = test_app(&sample_rows());

        let response = app
            .oneshot(get("/api/stocks/ACME/prices/2024-01-10"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        // 2024 is in the past, so the historical cache header applies.
        assert_eq!(
            response.headers().get(CACHE_CONTROL).unwrap(),
            "public, max-age=86400"
        );
        let record: StockPriceRecord = body_json(response).await;
        assert_eq!(record.sequence_id, 2);
        assert_eq!(record.close_usd, 12.0);
    }

    #[tokio::test]
    async fn test_price_at_date_not_found() {
        let (_dir, app) = test_app(&sample_rows());

        let response = app
            .oneshot(get("/api/stocks/ACME/prices/2024-03-03"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_calculate_returns() {
        let (_dir, app) = test_app(&sample_rows());

        let response = app
            .oneshot(post_json(
                "/api/stocks/ACME/returns",
                serde_json::json!({"start_date": "2024-01-01", "end_date": "2024-01-10"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let result: CumulativeReturnResponse = body_json(response).await;
        assert_eq!(result.name, "ACME");
        assert_eq!(result.cumulative_return, 20.0);
        assert_eq!(result.start_price, 10.0);
        assert_eq!(result.end_price, 12.0);
    }

    #[tokio::test]
    async fn test_calculate_returns_rejects_reversed_dates() {
        let (_dir, app) = test_app(&sample_rows());

        let response = app
            .oneshot(post_json(
                "/api/stocks/ACME/returns",
                serde_json::json!({"start_date": "2024-01-10", "end_date": "2024-01-01"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_calculate_returns_insufficient_data() {
        let (_dir, app) = test_app(&sample_rows());

        let response = app
            .oneshot(post_json(
                "/api/stocks/GLOBEX/returns",
                serde_json::json!({"start_date": "2024-01-01", "end_date": "2024-12-31"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
