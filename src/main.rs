use actix_cors::Cors;
use actix_files::Files;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smartcrop_console::config::Settings;
use smartcrop_console::handlers;
use smartcrop_console::{HttpPredictionClient, SubmissionController};

// ==============================================================================
// MAIN APPLICATION
// ==============================================================================

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    // Initialize logging (LOG_FORMAT=json for structured output)
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,actix_web=info".to_string()),
        ))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    info!("Starting SmartCrop Console");

    // Load configuration
    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "Layered configuration unavailable, using environment overrides");
            Settings::from_env().context("Failed to load configuration")?
        }
    };
    info!(
        backend = %settings.backend.predict_url(),
        timeout_secs = settings.backend.timeout_secs,
        "Configuration loaded successfully"
    );

    let backend = HttpPredictionClient::new(&settings.backend)
        .context("Failed to build prediction service client")?;
    let controller = web::Data::new(SubmissionController::new(
        backend,
        settings.backend.deadline(),
    ));

    info!(
        "Starting HTTP server on {}:{}",
        settings.server.host, settings.server.port
    );

    let server_settings = settings.server.clone();
    let mut server = HttpServer::new(move || {
        // Configure CORS
        let cors = server_settings
            .cors_allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| {
                if origin == "*" {
                    cors.allow_any_origin()
                } else {
                    cors.allowed_origin(origin)
                }
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            // Global middleware
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(cors)
            // Application data
            .app_data(controller.clone())
            .configure(handlers::configure::<HttpPredictionClient>)
            .service(Files::new("/static", &server_settings.static_dir))
    });

    if let Some(workers) = settings.server.workers {
        server = server.workers(workers);
    }

    server
        .bind((settings.server.host.as_str(), settings.server.port))
        .with_context(|| {
            format!(
                "Failed to bind {}:{}",
                settings.server.host, settings.server.port
            )
        })?
        .run()
        .await
        .context("HTTP server terminated with an error")
}
