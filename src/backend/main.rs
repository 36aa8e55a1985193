/**
 * Draft.IO Relay Server Entry Point
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

    let config = draftio::backend::ServerConfig::from_env();
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = draftio::backend::create_app(config).await;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("[STARTUP] Relay listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("The relay server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin draftio-relay --features ssr");
    std::process::exit(1);
}
