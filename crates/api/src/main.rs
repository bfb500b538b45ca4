mod config;
mod middleware;
mod response;
mod routes;

use axum::{
    routing::{get, patch, post},
    Router,
};
use config::Config;
use middleware::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tutorhub_core::{BookingEngine, SystemClock};
use tutorhub_integrations::{StripeConfig, StripeGateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tutorhub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TutorHub API server...");

    let config = Config::from_env()?;

    // Initialize database pool
    let pool = tutorhub_db::create_pool(&config.database_url).await?;
    tutorhub_db::run_migrations(&pool).await?;

    tracing::info!("✓ Database connection established");

    // Payment gateway
    let gateway = StripeGateway::new(StripeConfig::new(
        config.payment_gateway_secret.clone(),
        config.payment_gateway_webhook_secret.clone(),
        config.frontend_url.clone(),
    ));

    let engine = BookingEngine::new(pool, Arc::new(gateway), Arc::new(SystemClock));

    tracing::info!("✓ Booking engine initialized");

    let state = AppState {
        engine,
        auth_token_secret: config.auth_token_secret.clone(),
    };

    // Build application router
    let app = Router::new()
        .route("/health", get(health_check))
        // Booking routes
        .route("/api/bookings", get(routes::bookings::list_bookings))
        .route("/api/bookings", post(routes::bookings::create_booking))
        .route("/api/bookings/:id", get(routes::bookings::get_booking))
        .route(
            "/api/bookings/:id/reschedule",
            patch(routes::bookings::reschedule_booking),
        )
        .route(
            "/api/bookings/:id/cancel",
            patch(routes::bookings::cancel_booking),
        )
        .route(
            "/api/bookings/:id/cancel/refund",
            patch(routes::bookings::refund_booking),
        )
        .route(
            "/api/bookings/:id/confirm",
            patch(routes::bookings::confirm_booking),
        )
        .route(
            "/api/bookings/recurring",
            post(routes::bookings::create_recurring),
        )
        // Payment routes
        .route("/api/payments/webhook", post(routes::payments::gateway_webhook))
        .layer(
            CorsLayer::new()
                .allow_origin(config.frontend_url.parse::<axum::http::HeaderValue>()?)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("✓ Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
