//! API Server Entry Point
//!
//! Wires every service crate into one axum server. Uses `anyhow` for
//! startup errors; request errors go through `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use audit::{
    AnchorUseCase, AuditAppState, EthJsonRpcAnchor, PgAuditRepository, audit_routes,
    spawn_forwarder,
};
use auth::{
    AuthAppState, PgAuthRepository, actor_middleware_state, attach_actor_headers, auth_routes,
    cleanup_now,
};
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{Router, middleware::from_fn_with_state};
use chrono::Utc;
use platform::audit_events::AuditEmitter;
use platform::mailer::Mailer;
use platform::service_auth::{API_KEY_HEADER, ServiceAuthConfig};
use provider::{PgProviderRepository, ProviderConfig, provider_router};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verification::{PgVerificationRepository, VerificationConfig, expire_stale, verification_router};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "api=info,auth=info,audit=info,verification=info,provider=info,tower_http=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(environment = config.environment.as_str(), "Starting API server");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;
    tracing::info!("Migrations completed");

    let service_auth = ServiceAuthConfig::new(config.service_api_key.clone(), config.environment);
    let mailer = Mailer::from_env()?;
    tracing::info!(transport = mailer.transport_name(), "Mailer ready");

    // Audit: in-process events are drained into the audit store
    let anchor = match &config.audit.anchor {
        Some(anchor) => {
            tracing::info!(rpc_url = %anchor.rpc_url, "Audit anchoring enabled");
            Some(EthJsonRpcAnchor::new(anchor).map_err(|e| anyhow::anyhow!(e.to_string()))?)
        }
        None => {
            tracing::info!("Audit anchoring disabled; no ledger configured");
            None
        }
    };
    let audit_state = AuditAppState::new(PgAuditRepository::new(pool.clone()), anchor, config.audit);
    let (audit_events, audit_rx) = AuditEmitter::channel();
    spawn_forwarder(audit_rx, audit_state.repo.clone(), audit_state.anchoring());

    // Auth: its state is shared with the actor header middleware
    let auth_repo = PgAuthRepository::new(pool.clone());
    let auth_state = AuthAppState {
        repo: Arc::new(auth_repo.clone()),
        config: Arc::new(config.auth),
        mailer,
        audit: audit_events.clone(),
    };
    let actor_state = actor_middleware_state(&auth_state, service_auth.clone());

    let verification_config = VerificationConfig::default();
    let verification_repo = PgVerificationRepository::new(pool.clone());

    tokio::spawn(run_sweeper(
        config.sweep_interval,
        auth_repo,
        verification_repo.clone(),
        verification_config.clone(),
        audit_state.anchoring(),
    ));

    let business = Router::new()
        .nest(
            "/verifications",
            verification_router(verification_repo, verification_config, audit_events.clone()),
        )
        .merge(provider_router(
            PgProviderRepository::new(pool.clone()),
            ProviderConfig::default(),
            audit_events,
        ))
        .layer(from_fn_with_state(
            actor_state,
            attach_actor_headers::<PgAuthRepository>,
        ));

    let allowed_origins: Vec<HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static(API_KEY_HEADER),
        ]))
        .allow_credentials(true);

    let app = Router::new()
        .nest("/api/auth", auth_routes(auth_state))
        .nest("/api/audit", audit_routes(audit_state, service_auth))
        .nest("/api", business)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Expiry and retry work. The first tick fires immediately, so this also
/// covers the startup pass.
async fn run_sweeper(
    every: std::time::Duration,
    auth_repo: PgAuthRepository,
    verification_repo: PgVerificationRepository,
    verification_config: VerificationConfig,
    anchoring: Option<AnchorUseCase<PgAuditRepository, EthJsonRpcAnchor>>,
) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        // Errors here should not stop the server
        if let Err(e) = cleanup_now(&auth_repo).await {
            tracing::warn!(error = %e, "Auth cleanup failed");
        }
        if let Err(e) = expire_stale(&verification_repo, &verification_config, Utc::now()).await {
            tracing::warn!(error = %e, "Verification expiry failed");
        }
        if let Some(anchoring) = &anchoring {
            match anchoring.retry_backlog(Utc::now()).await {
                Ok(report) if report.attempted > 0 => {
                    tracing::info!(
                        attempted = report.attempted,
                        anchored = report.anchored,
                        failed = report.failed,
                        "Anchor backlog pass"
                    );
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Anchor backlog pass failed"),
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Could not listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
