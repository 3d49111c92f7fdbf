use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, info_span, warn, Instrument};

use crate::api::{self, AppState};
use crate::cache::RedisDriver;
use crate::config::Config;
use crate::db::{init_db, Driver, PgBackend, Repository};

/// Connect, migrate and probe every dependency, then serve until Ctrl-C.
pub async fn serve(config: Config) -> Result<()> {
    let http = config.http()?.clone();

    let state = async {
        let pool = init_db(config.postgres()?)
            .await
            .context("failed to initialize database")?;
        let repo = Arc::new(Repository::new(Arc::new(Driver::new(Arc::new(
            PgBackend::new(pool),
        )))));
        repo.ping().await.context("database ping failed")?;

        let redis = match &config.redis {
            Some(settings) => {
                let driver = RedisDriver::connect(settings)
                    .await
                    .context("failed to connect to redis")?;
                driver.get("first").await.context("redis probe failed")?;
                info!("Redis connected at {}:{}", settings.host, settings.port);
                Some(driver)
            }
            None => None,
        };

        if http.reload {
            warn!("HTTP__RELOAD is set; hot reload is not supported and will be ignored");
        }
        Ok::<_, anyhow::Error>(AppState::new(repo, redis))
    }
    .instrument(info_span!("startup", request_id = "init"))
    .await?;

    let app = api::create_router(state);
    let listener = TcpListener::bind((http.host.as_str(), http.port))
        .await
        .with_context(|| format!("failed to bind to {}:{}", http.host, http.port))?;

    info!(
        "Server running: {}:{}, workers: {}, reload: {}",
        http.host, http.port, http.worker, http.reload
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
