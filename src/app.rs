/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用順をここで明示する
 * - axum::serve() で起動
 */
use std::{panic, process};

use anyhow::{Context, Result};
use axum::Router;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::services::auth::factory;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,ngelmak_auth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost".
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        // Production: default behavior, the server keeps running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();

    // No secret, no server: every token would be unverifiable.
    let config = Config::from_env().inspect_err(|e| {
        error!(error = %e, "configuration error; refusing to start");
    })?;

    init_panic_hook(!config.app_env.is_production());

    info!(
        "starting API in {:?} mode on {}",
        config.app_env, config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState> {
    // Process-level services, built once and injected into the shared state.
    let tokens = factory::build_token_codec(config);
    let auth = factory::build_authenticator(config, tokens.clone())?;

    Ok(AppState::new(auth, tokens))
}

/// Assemble the router. Stages, outermost first:
///
/// 1. CORS (answers preflight)
/// 2. security response headers
/// 3. request-id / sensitive headers / body limit / timeout / trace
/// 4. bearer interceptor (SecurityContext or 401)
/// 5. per-route authorization gate (`route_layer`, see `api::routes`)
/// 6. handler
pub fn build_router(state: AppState, config: &Config) -> Router {
    let api = Router::new().nest("/api", api::routes());
    let api = middleware::auth::bearer::apply(api, state.clone());

    let router = api.with_state(state);
    let router = middleware::http::apply(router, config.request_timeout);
    let router = middleware::security_headers::apply(router);
    middleware::cors::apply(router, config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
