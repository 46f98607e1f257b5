use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use movie_catalog::{
    build_router, cleanup, config::Config, loader, models::AppState, system_info,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| EnvFilter::new(movie_catalog::config::DEFAULT_LOG_FILTER));
    if config.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    system_info::print_startup_info(&config);

    // Load fully before binding; the catalog is read-only from here on
    let loaded = match cleanup::prepare_images_dir(&config.images_dir, config.reset_images_dir).await
    {
        Ok(()) => {
            loader::load_catalog(
                &config.backup_file_path,
                &config.images_dir,
                config.load_concurrency,
            )
            .await
        }
        Err(e) => Err(e),
    };

    let (catalog, report) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("[startup] ❌ Initialization failed: {}", e);
            return Err(e.into());
        }
    };

    let app_state = Arc::new(AppState {
        catalog: Arc::new(catalog),
        config: config.clone(),
    });
    let app = build_router(app_state);

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    system_info::print_ready_info(&config, &report);
    info!("✅ Server is running on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
