use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use collab_core::membership::MembershipPolicy;
use collab_db::{MemoryStore, PgStore, ProjectRegistry, ProjectStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use collab_api::config::ServerConfig;
use collab_api::router::build_app_router;
use collab_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        auto_enroll_editors = config.auto_enroll_editors,
        "Loaded server configuration"
    );

    // --- Store ---
    let store: Arc<dyn ProjectStore> = match &config.database_url {
        Some(database_url) => {
            let pool = collab_db::create_pool(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection pool created");

            collab_db::health_check(&pool)
                .await
                .context("Database health check failed")?;
            collab_db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; projects are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    // --- App state ---
    let registry = ProjectRegistry::new(
        store,
        MembershipPolicy {
            auto_enroll: config.auto_enroll_editors,
        },
    );
    let state = AppState {
        registry: Arc::new(registry),
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` filters; `LOG_FORMAT=json`
/// switches to structured JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "collab_api=debug,collab_db=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
