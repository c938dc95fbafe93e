//! Itinerary Server - interactive route planning backend

use anyhow::Result;
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use itinerary_providers::{
    CachedGeocoder, Geocoder, GraphHopperClient, NominatimClient, RouteProvider,
    StraightLineRouter,
};
use itinerary_server::api;
use itinerary_server::config::{Config, RouteProviderKind};
use itinerary_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("itinerary_server=debug".parse()?)
            .add_directive("itinerary_providers=info".parse()?))
        .init();

    tracing::info!("Starting Itinerary Server...");

    let config = Config::from_env();
    let port = config.server_port;

    let provider: Arc<dyn RouteProvider> = match config.route_provider {
        RouteProviderKind::GraphHopper => Arc::new(GraphHopperClient::new(
            &config.routing_url,
            config.routing_api_key.clone(),
            &config.routing_profile,
            config.route_timeout(),
        )?),
        RouteProviderKind::StraightLine => Arc::new(StraightLineRouter::default()),
    };
    let nominatim = NominatimClient::new(
        &config.geocoder_url,
        &config.geocoder_user_agent,
        Some(config.locale.clone()),
        config.geocode_timeout(),
    )?;
    let geocoder: Arc<dyn Geocoder> = Arc::new(CachedGeocoder::new(
        Arc::new(nominatim),
        config.geocode_cache_max_entries,
        config.geocode_cache_ttl(),
    ));
    tracing::info!(
        "Routing via {} (locale {})",
        provider.name(),
        config.locale
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let (state, session_task) = AppState::start(config, provider, geocoder, shutdown_rx);

    // Build the app
    let app = api::routes()
        .route("/health", get(|| async { "OK" }))
        .route("/v1/stream", get(api::ws::ws_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await?;

    let _ = shutdown_tx.send(());
    let _ = session_task.await;

    Ok(())
}
