use actix_web::{http::header::ContentType, web, HttpResponse};
use chrono::Utc;
use serde_json::{Map, Value};

use crate::backend::PredictionBackend;
use crate::errors::AppResult;
use crate::models::{ApiResponse, RawFields};
use crate::render;
use crate::services::SubmissionController;

/// Registers the console routes for a controller of backend `B`.
pub fn configure<B: PredictionBackend + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/", web::get().to(index::<B>))
        .route("/submit", web::post().to(submit_form::<B>))
        .route("/reset", web::post().to(reset_form::<B>))
        .service(
            web::scope("/api")
                .route("/state", web::get().to(api_state::<B>))
                .route("/submit", web::post().to(api_submit::<B>))
                .route("/reset", web::post().to(api_reset::<B>)),
        );
}

// ==============================================================================
// HEALTH CHECK
// ==============================================================================

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "service": "SmartCrop Console",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ==============================================================================
// HTML PAGES
// ==============================================================================

fn page(html: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType(mime::TEXT_HTML_UTF_8))
        .body(html)
}

pub async fn index<B: PredictionBackend>(
    controller: web::Data<SubmissionController<B>>,
) -> HttpResponse {
    page(render::render_page(&controller.snapshot()))
}

pub async fn submit_form<B: PredictionBackend>(
    controller: web::Data<SubmissionController<B>>,
    form: web::Form<RawFields>,
) -> HttpResponse {
    // The outcome is already recorded in the controller state.
    let _ = controller.submit(form.into_inner()).await;
    page(render::render_page(&controller.snapshot()))
}

pub async fn reset_form<B: PredictionBackend>(
    controller: web::Data<SubmissionController<B>>,
) -> HttpResponse {
    controller.reset();
    page(render::render_page(&controller.snapshot()))
}

// ==============================================================================
// JSON API
// ==============================================================================

pub async fn api_state<B: PredictionBackend>(
    controller: web::Data<SubmissionController<B>>,
) -> HttpResponse {
    let snapshot = controller.snapshot();
    HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "snapshot": snapshot,
        "view": render::view(&snapshot),
    })))
}

pub async fn api_submit<B: PredictionBackend>(
    controller: web::Data<SubmissionController<B>>,
    body: web::Json<Map<String, Value>>,
) -> AppResult<HttpResponse> {
    let raw = raw_fields_from_json(body.into_inner());
    let result = controller.submit(raw).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(render::CropCard::from(&result))))
}

pub async fn api_reset<B: PredictionBackend>(
    controller: web::Data<SubmissionController<B>>,
) -> HttpResponse {
    controller.reset();
    HttpResponse::Ok().json(ApiResponse::success_with_message(
        render::view(&controller.snapshot()),
        "Submission state reset",
    ))
}

/// JSON clients may send numbers or strings; both become raw text. `null`
/// counts as a missing field.
pub fn raw_fields_from_json(body: Map<String, Value>) -> RawFields {
    body.into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}
