//! QR Rewards JSON API Server

use std::{process, time::Duration};

use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    serve_static::StaticDir,
    trailing_slash::remove_slash,
};
use tokio::sync::watch;
use tracing::{error, info};

use qrewards_app::{
    context::AppContext,
    database::{self, Db},
};

use crate::{
    config::ServerConfig,
    media::UploadLimit,
    observability::{Observability, RequestLogging, metrics_handler},
    state::State,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod auth;
mod categories;
mod config;
mod dashboard;
mod extensions;
mod healthcheck;
mod kyc;
mod media;
mod observability;
mod products;
mod promotions;
mod router;
mod scans;
mod shutdown;
mod state;
mod sweeper;
#[cfg(test)]
mod test_helpers;
mod users;
mod withdrawals;

/// QR Rewards JSON API Server entry point
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    let telemetry = Observability::init(&config.logging, &config.observability).unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Observability error: {e}");
        }

        process::exit(1);
    });

    let pool = match database::connect(&config.database.database_url).await {
        Ok(pool) => pool,
        Err(connect_error) => {
            error!("failed to connect to database: {connect_error}");

            process::exit(1);
        }
    };

    if config.database.migrate_on_start {
        if let Err(migrate_error) = database::migrate(&pool).await {
            error!("failed to apply migrations: {migrate_error}");

            process::exit(1);
        }

        info!("database migrations applied");
    }

    let app = AppContext::from_db(Db::new(pool), &config.app.to_app_config());

    let (stop_tx, stop_rx) = watch::channel(false);

    let sweeper = sweeper::spawn(
        app.users.clone(),
        Duration::from_secs(config.app.deletion_sweep_interval_secs.max(1)),
        stop_rx,
    );

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    // Bind server
    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(RequestLogging::new(&config.observability))
        .hoop(UploadLimit::new(config.app.max_upload_bytes))
        .hoop(inject(State::from_app_context(app)))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(router::app_router());

    let doc = OpenApi::new("QR Rewards API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .merge_router(&router);

    let router = router
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(
            Router::with_path("media/{**path}")
                .get(StaticDir::new(config.app.media_root.clone()).auto_list(false)),
        )
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();
    let grace = config.server.shutdown_grace();

    // Listen for shutdown signal
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, stop_tx, grace).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    // Start serving requests
    server.serve(router).await;

    if let Err(join_error) = sweeper.await {
        error!("deletion sweeper task failed: {join_error}");
    }

    info!("server stopped");

    telemetry.shutdown();
}
