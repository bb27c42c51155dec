use std::collections::BTreeMap;

use actix_web::{get, web, HttpResponse, Responder, ResponseError};
use log::info;

use crate::models::{
    data_label, ApiError, ApiResponse, DataResponse, DataType, HealthResponse, DATA_LABELS,
};
use crate::providers::InsufficientData;
use crate::services::DataFetcher;

pub const SERVICE_NAME: &str = "bullbear-backend";

/// Health check
#[get("/api/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: SERVICE_NAME.to_string(),
    })
}

/// Fetch a single metric by identifier
#[get("/api/data/{data_type}")]
pub async fn get_data(
    path: web::Path<String>,
    fetcher: web::Data<DataFetcher>,
) -> impl Responder {
    let data_type = path.into_inner();
    info!("GET /api/data/{}", data_type);

    let dtype = match data_type.parse::<DataType>() {
        Ok(dtype) => dtype,
        Err(e) => return ApiError::from(e).error_response(),
    };

    match fetcher.get(dtype).await {
        Ok(result) => HttpResponse::Ok().json(DataResponse { ok: true, result }),
        Err(e) => single_fetch_error(&e).error_response(),
    }
}

/// Too little history is reported as-is; anything else is an upstream failure
fn single_fetch_error(err: &anyhow::Error) -> ApiError {
    match err.downcast_ref::<InsufficientData>() {
        Some(short) => ApiError::InternalServerError(short.to_string()),
        None => ApiError::InternalServerError(format!("Failed to fetch data: {}", err)),
    }
}

/// Fetch every metric in one envelope
#[get("/api/data")]
pub async fn get_all_data(fetcher: web::Data<DataFetcher>) -> impl Responder {
    info!("GET /api/data");

    match fetcher.get_all().await {
        Ok(data) => HttpResponse::Ok().json(ApiResponse { ok: true, data }),
        Err(e) => {
            ApiError::InternalServerError(format!("Failed to fetch data: {}", e)).error_response()
        }
    }
}

/// Display labels for every metric identifier
#[get("/api/labels")]
pub async fn get_labels() -> impl Responder {
    let labels: BTreeMap<&str, &str> = DATA_LABELS.iter().copied().collect();
    HttpResponse::Ok().json(labels)
}

/// Fallback for unknown routes
pub async fn not_found(req: actix_web::HttpRequest) -> impl Responder {
    ApiError::NotFound(req.path().to_string()).error_response()
}

/// Label for display, or the raw identifier when none is registered
pub fn display_label(data_type: &str) -> &str {
    data_label(data_type).unwrap_or(data_type)
}

/// Register all handlers with the app
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(get_all_data)
        .service(get_data)
        .service(get_labels);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use crate::sources::testing::{all_ok_sources, StubSource};
    use crate::sources::DataSource;

    fn fetcher_with(sources: Vec<Box<dyn DataSource>>) -> web::Data<DataFetcher> {
        web::Data::new(DataFetcher::new(sources, Duration::ZERO))
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(App::new().configure(configure_routes)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body, json!({"ok": true, "service": "bullbear-backend"}));
    }

    #[actix_web::test]
    async fn test_get_single_metric() {
        let app = test::init_service(
            App::new()
                .app_data(fetcher_with(all_ok_sources()))
                .configure(configure_routes),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/data/btc_price").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body,
            json!({"ok": true, "data_type": "btc_price", "value": 1.0, "provider": "stub"})
        );
    }

    #[actix_web::test]
    async fn test_get_invalid_metric() {
        let app = test::init_service(
            App::new()
                .app_data(fetcher_with(all_ok_sources()))
                .configure(configure_routes),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/data/eth_price").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("Invalid data_type: eth_price. Valid types:"));
        assert!(message.contains("stablecoin_market_cap"));
    }

    #[actix_web::test]
    async fn test_get_metric_upstream_failure() {
        let sources: Vec<Box<dyn DataSource>> = vec![Box::new(StubSource::failing(DataType::Ma50))];
        let app = test::init_service(
            App::new()
                .app_data(fetcher_with(sources))
                .configure(configure_routes),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/data/ma50").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], json!("Failed to fetch data: upstream unavailable"));
    }

    #[actix_web::test]
    async fn test_get_metric_short_history_message_is_bare() {
        let sources: Vec<Box<dyn DataSource>> =
            vec![Box::new(StubSource::short_history(DataType::Ma50))];
        let app = test::init_service(
            App::new()
                .app_data(fetcher_with(sources))
                .configure(configure_routes),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/data/ma50").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], json!("Not enough data for MA50. Got 49 candles."));
    }

    #[actix_web::test]
    async fn test_get_all_metrics() {
        let app = test::init_service(
            App::new()
                .app_data(fetcher_with(all_ok_sources()))
                .configure(configure_routes),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/data").to_request();
        let body: ApiResponse = test::call_and_read_body_json(&app, req).await;

        assert!(body.ok);
        assert_eq!(body.data.len(), 5);
        assert_eq!(body.data["ma200"].value, 5.0);
        assert_eq!(body.data["total_market_cap"].provider, "stub");
    }

    #[actix_web::test]
    async fn test_get_all_metrics_failure() {
        let sources: Vec<Box<dyn DataSource>> = vec![Box::new(StubSource::failing(DataType::BtcPrice))];
        let app = test::init_service(
            App::new()
                .app_data(fetcher_with(sources))
                .configure(configure_routes),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/data").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_labels() {
        let app = test::init_service(App::new().configure(configure_routes)).await;
        let req = test::TestRequest::get().uri("/api/labels").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["btc_price"], json!("BTC Price"));
        assert_eq!(body["ma200"], json!("200-Day Moving Average"));
        assert_eq!(body.as_object().unwrap().len(), 5);
    }

    #[actix_web::test]
    async fn test_unknown_route() {
        let app = test::init_service(
            App::new()
                .configure(configure_routes)
                .default_service(web::to(not_found)),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/nope").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_display_label_falls_back_to_identifier() {
        assert_eq!(display_label("ma50"), "50-Day Moving Average");
        assert_eq!(display_label("eth_price"), "eth_price");
    }
}
