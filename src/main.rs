use std::net::SocketAddr;
use std::sync::Arc;

use clothai_api_relay::{api, config, EachlabsClient, ImgbbClient};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    config::Config::dotenv_load();
    let config = config::Config::new().expect("Failed to load configuration");
    config::Config::print_env_vars();

    if config.imgbb_api_key.is_empty() {
        tracing::warn!("IMGBB_API_KEY is not set; image uploads will be rejected upstream");
    }
    if config.eachlabs_api_key.is_empty() {
        tracing::warn!("EACHLABS_API_KEY is not set; flow triggers will be rejected upstream");
    }

    // Create upstream clients
    let imgbb = ImgbbClient::new(config.imgbb_upload_url.clone(), config.imgbb_api_key.clone());
    let eachlabs = EachlabsClient::new(
        config.eachlabs_base_url.clone(),
        config.eachlabs_flow_id.clone(),
        config.eachlabs_api_key.clone(),
    );

    let state = Arc::new(api::routes::AppState {
        imgbb,
        eachlabs,
        poll_interval: config.poll_interval(),
        poll_max_attempts: config.poll_max_attempts(),
    });

    // Build our application with a route
    let app = api::routes::router(state);

    // Run our application with safe parsing
    let host_str = config.api_host.clone();
    let port_str = config.api_port.clone();
    let ip: std::net::IpAddr = host_str.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid API_HOST '{}', falling back to 0.0.0.0", host_str);
        std::net::IpAddr::from([0, 0, 0, 0])
    });
    let port: u16 = port_str.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid API_PORT '{}', falling back to 8000", port_str);
        8000
    });
    let socket_address = SocketAddr::new(ip, port);
    tracing::info!("listening on {}", socket_address);
    axum::Server::bind(&socket_address)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
