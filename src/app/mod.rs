mod wiring;

use crate::auth::AuthState;
use crate::catalog::Catalog;
use crate::storage::SqliteStorage;
use crate::{cli, context, rest};
use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;
use tokio_util::sync::CancellationToken;

pub struct App {
    pub ctx: context::Context,
    pub catalog: Catalog<SqliteStorage>,
}

impl App {
    pub fn from_cli() -> Result<(Self, cli::Cli)> {
        let cli = crate::cli::parse();
        let ctx = context::Context::from_cli(&cli);

        crate::tracing::init();
        crate::tracing::set_log_file(ctx.config.log_file.as_deref().map(Path::new));
        log::info!("🚀 Starting cookbook");
        log::info!("📂 Data dir: {}", ctx.config.data_dir);

        wiring::init_data_dir(&ctx).context("initializing data dir")?;
        let storage = wiring::init_storage(&ctx)?;
        let catalog = Catalog::new(storage);

        Ok((Self { ctx, catalog }, cli))
    }
}

pub async fn run_daemon(app: App) -> Result<()> {
    let config = &app.ctx.config;
    log::info!("🌐 REST API: http://{}", config.listen);
    log::info!("⏱️ Access token TTL: {} min", config.access_ttl_minutes);
    log::info!("⏱️ Refresh token TTL: {} min", config.refresh_ttl_minutes);
    if let Some(path) = config.log_file.as_deref() {
        log::info!("📝 Log file: {}", path);
    }

    let auth = AuthState::new(
        &config.jwt_secret,
        config.access_ttl_minutes,
        config.refresh_ttl_minutes,
    );

    let shutdown = CancellationToken::new();

    let addr = config.listen;
    let rest_catalog = app.catalog.clone();
    let rest_shutdown = shutdown.clone();

    let mut rest_handle = tokio::spawn(async move {
        if let Err(e) = rest::serve(addr, rest_catalog, auth, rest_shutdown).await {
            log::error!("REST server error: {}", e);
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("🧨 Ctrl-C received, shutting down");
        }
        _ = &mut rest_handle => {},
    }

    shutdown.cancel();
    if let Err(e) = rest_handle.await {
        log::error!("REST server error: {}", e);
        return Err(e.into());
    }

    log::info!("✅ Shutdown complete");
    Ok(())
}

pub async fn run() -> Result<()> {
    let (app, cli) = App::from_cli()?;

    if let Some(cmd) = &cli.cmd {
        // one-shot command mode
        cmd.run(&app.catalog)?;
        return Ok(());
    }

    run_daemon(app).await
}
