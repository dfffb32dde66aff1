//! Server initialization and routing

use crate::api;
use crate::config::Config;
use crate::jwt::JwtManager;
use crate::middleware::ObservabilityLayer;
use crate::provider::ProviderClient;
use crate::repository::{IdentityStore, PgIdentityStore};
use crate::service::{
    PrivilegedEndpointRemoval, RemovalChain, StoreMutationRemoval, UnlinkService,
};
use crate::state::HasIdentityServices;
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub unlink_service: Arc<UnlinkService<ProviderClient>>,
    pub identity_store: Arc<PgIdentityStore>,
    pub jwt_manager: JwtManager,
}

impl HasIdentityServices for AppState {
    type Directory = ProviderClient;

    fn unlink_service(&self) -> &Arc<UnlinkService<Self::Directory>> {
        &self.unlink_service
    }

    fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }

    async fn check_ready(&self) -> bool {
        self.identity_store.ping().await.is_ok()
    }
}

/// Assemble the removal chain in its fixed order: privileged endpoint, then store
pub fn build_removal_chain(
    config: &Config,
    provider: Arc<ProviderClient>,
    identity_store: Arc<PgIdentityStore>,
) -> RemovalChain {
    let mut chain = RemovalChain::new(config.unlink.step_timeout());

    if config.unlink.privileged_endpoint_enabled {
        chain = chain.with_strategy(PrivilegedEndpointRemoval::new(provider));
    } else {
        warn!("Privileged endpoint removal disabled, using identity store only");
    }

    chain.with_strategy(StoreMutationRemoval::new(identity_store))
}

/// Run the server
pub async fn run(config: Config, prometheus: Option<PrometheusHandle>) -> Result<()> {
    let db_pool = PgPoolOptions::new()
        .max_connections(config.identity_store.max_connections)
        .min_connections(config.identity_store.min_connections)
        .acquire_timeout(config.unlink.store_acquire_timeout())
        .connect(&config.identity_store.url)
        .await
        .context("Failed to connect to identity store")?;

    info!("Connected to identity store");

    let provider = Arc::new(ProviderClient::new(
        config.provider.clone(),
        config.unlink.step_timeout(),
    )?);
    let identity_store = Arc::new(PgIdentityStore::new(db_pool));

    let chain = build_removal_chain(&config, provider.clone(), identity_store.clone());
    info!(strategies = ?chain.strategy_kinds(), "Removal chain ready");

    let state = AppState {
        unlink_service: Arc::new(UnlinkService::new(
            provider,
            chain,
            config.unlink.step_timeout(),
        )),
        identity_store,
        jwt_manager: JwtManager::new(config.jwt.clone()),
    };

    let app = build_router(state, prometheus);

    let http_addr = config.http_addr();
    let listener = TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("Failed to bind {}", http_addr))?;
    info!("HTTP server started on {}", http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Build the HTTP router with generic state type
///
/// Generic over the state so tests can drive the same routes with an
/// in-memory implementation of `HasIdentityServices`.
pub fn build_router<S: HasIdentityServices>(state: S, prometheus: Option<PrometheusHandle>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let metrics_router = Router::new()
        .route("/metrics", get(api::metrics::metrics_handler))
        .with_state(Arc::new(prometheus));

    Router::new()
        // Health endpoints
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready::<S>))
        // Linked identities of the session's account
        .route(
            "/api/v1/users/me/identities",
            get(api::identity::list_identities::<S>),
        )
        .route(
            "/api/v1/users/me/identities/unlink",
            post(api::identity::unlink_identity::<S>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
        .merge(metrics_router)
        .layer(ObservabilityLayer)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
