//! Application bootstrap shared by the server binary and the CLI.

use anyhow::Context;
use axum::Router;
use bookshelf_db::DbPool;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;
use crate::modules::books::{seed as books_seed, store::SqliteBookStore};

/// Connect, migrate and initialize every module.
pub async fn prepare(settings: &Settings) -> anyhow::Result<(DbPool, ModuleRegistry)> {
    let pool = bookshelf_db::connect(&settings.database).await?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &pool);

    let applied = bookshelf_db::migrate(&pool, &registry.collect_migrations())
        .await
        .context("failed to run migrations")?;
    tracing::info!(applied, "migrations complete");

    let ctx = InitCtx { settings };
    registry.init_all(&ctx).await?;

    Ok((pool, registry))
}

/// The fully layered application router, ready to serve or to drive in tests.
pub async fn build_app(settings: &Settings) -> anyhow::Result<(Router, DbPool)> {
    let (pool, registry) = prepare(settings).await?;
    Ok((bookshelf_http::build_router(&registry, settings), pool))
}

/// Run the HTTP server until Ctrl-C.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let (pool, registry) = prepare(&settings).await?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.start_all(&ctx).await?;

    bookshelf_http::start_server(&registry, &settings, shutdown_signal()).await?;

    registry.stop_all().await?;
    pool.close().await;

    tracing::info!("bookshelf stopped");
    Ok(())
}

/// Apply pending migrations and report how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let pool = bookshelf_db::connect(&settings.database).await?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &pool);

    let applied = bookshelf_db::migrate(&pool, &registry.collect_migrations()).await?;
    pool.close().await;
    Ok(applied)
}

/// Insert `count` generated books.
pub async fn seed(settings: &Settings, count: usize) -> anyhow::Result<usize> {
    let (pool, _registry) = prepare(settings).await?;

    let store = SqliteBookStore::new(pool.clone());
    let created = books_seed::seed(&store, count)
        .await
        .context("failed to seed books")?;

    pool.close().await;
    Ok(created.len())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
