// ==========================================
// Tecnova POS - service entry point
// ==========================================
// Stack: Rust + SQLite + axum
// Env:
//   TECNOVA_DB_PATH    database file (optional)
//   TECNOVA_BIND_ADDR  listen address (default 127.0.0.1:3000)
//   TECNOVA_LOCALE     message locale (es | en)
// ==========================================

/// Environment variable holding the listen address.
const BIND_ADDR_ENV: &str = "TECNOVA_BIND_ADDR";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[cfg(feature = "http")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use std::net::SocketAddr;
    use tecnova_pos::app::{get_default_db_path, AppState};

    tecnova_pos::logging::init();

    tracing::info!("==================================================");
    tracing::info!("Tecnova POS - inventario");
    tracing::info!("version: {}", tecnova_pos::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("using database: {}", db_path);

    let state = AppState::new(db_path)
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialise AppState")?;

    let products = state.import_api.product_count().await?;
    let snapshot = state.import_api.config().get_config_snapshot()?;
    tracing::debug!(products, config = ?snapshot, "startup state");

    let bind = std::env::var(BIND_ADDR_ENV).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid {}: {}", BIND_ADDR_ENV, bind))?;

    tecnova_pos::app::serve(addr, state).await?;

    tracing::info!("server stopped");
    Ok(())
}

#[cfg(not(feature = "http"))]
fn main() {
    println!("==================================================");
    println!("Tecnova POS - inventario");
    println!("version: {}", tecnova_pos::VERSION);
    println!("==================================================");
    println!();
    println!("this binary needs the `http` feature");
    println!("usage: cargo run --features http");
    println!("listen address: {} (default {})", BIND_ADDR_ENV, DEFAULT_BIND_ADDR);
    println!();
    println!("or use the library directly:");
    println!("use tecnova_pos::ImportApi;");
}
