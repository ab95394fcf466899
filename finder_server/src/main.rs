mod config;
mod error;
mod payload;
mod router;
mod state;
mod util;

use axum::{middleware, Router};
use dotenvy::dotenv;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use std::sync::Arc;

use finder_client::LocationClient;

use crate::{config::Config, state::AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 1. Initialize logger
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env()
        .unwrap()
        .add_directive("hyper::proto=info".parse().unwrap())
        .add_directive("hyper::client=info".parse().unwrap())
        .add_directive("reqwest=info".parse().unwrap());
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    // 2. Load configuration
    let config = Config::from_env().expect("invalid configuration");
    let static_dir = config
        .static_dir
        .canonicalize()
        .expect("STATIC_DIR must be a valid path");
    let enabled = config.enabled.iter().map(|c| c.id()).collect::<Vec<_>>();
    tracing::info!("Enabled categories: {}", enabled.join(", "));

    // 3. Initialize upstream client
    let client = LocationClient::new(&config.upstream_api_url, config.locations_cache_ttl)
        .expect("cannot create upstream client");

    // 4. Setup state and router
    let address = config.server_address.clone();
    let app_state = AppState {
        client: Arc::new(client),
        config: Arc::new(Config { static_dir, ..config }),
    };

    let app = Router::new()
        .merge(router::api::api_router())
        .fallback_service(ServeDir::new(&app_state.config.static_dir))
        .layer(middleware::from_fn_with_state(app_state.clone(), router::page::category_pages))
        .layer(TraceLayer::new_for_http().on_request(()))
        .with_state(app_state);

    // 5. Start server
    tracing::info!("Server starting at {}", address);
    axum::Server::bind(&address.parse().expect("SERVER_ADDRESS must be a socket address"))
        .serve(app.into_make_service())
        .await
        .unwrap();
}
