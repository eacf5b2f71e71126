/**
 * bbbgate Server Entry Point
 *
 * Loads the configuration, opens the backend store, starts reconciliation
 * and serves the gateway API.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = bbbgate::backend::server::config::load_config()?;
    let addr = config.listen_addr()?;
    tracing::info!(
        listen = %addr,
        liveness_secs = config.liveness_threshold.as_secs(),
        persistent = config.database_url.is_some(),
        "Configuration loaded"
    );

    let app = bbbgate::backend::server::create_app(config).await?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin bbbgate-server --features ssr");
    std::process::exit(1);
}
