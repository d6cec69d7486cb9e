use merchant_connect::account::{AccountService, AccountStore, ConnectionStateMachine};
use merchant_connect::admin::{HmacNonce, NonceVerifier, UrlBuilder};
use merchant_connect::api::{self, AppState};
use merchant_connect::cache::{Cache, InMemoryCache};
use merchant_connect::config::AppConfig;
use merchant_connect::health::HealthChecker;
use merchant_connect::logging::{init_tracing, mask_email};
use merchant_connect::payments::{AccountGateway, MerchantInfo, PaymentsApiClient};
use merchant_connect::settings::{GatewaySettings, InMemorySettings};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[cfg(feature = "cache")]
use merchant_connect::cache::{get_cache_stats, init_cache_pool, CacheConfig, RedisCache};

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

async fn build_cache(config: &AppConfig) -> anyhow::Result<Arc<dyn Cache>> {
    if config.server.skip_externals {
        info!("Skipping Redis initialization (SKIP_EXTERNALS=true), using in-memory cache");
        return Ok(Arc::new(InMemoryCache::new()));
    }
    connect_redis(config).await
}

#[cfg(feature = "cache")]
async fn connect_redis(config: &AppConfig) -> anyhow::Result<Arc<dyn Cache>> {
    let pool = init_cache_pool(CacheConfig {
        redis_url: config.cache.redis_url.clone(),
        max_connections: config.cache.max_connections,
        ..CacheConfig::default()
    })
    .await?;

    let stats = get_cache_stats(&pool);
    info!(
        connections = stats.connections,
        idle_connections = stats.idle_connections,
        "Redis cache pool ready"
    );
    Ok(Arc::new(RedisCache::new(pool)))
}

#[cfg(not(feature = "cache"))]
async fn connect_redis(_config: &AppConfig) -> anyhow::Result<Arc<dyn Cache>> {
    warn!("Built without the cache feature, using in-memory cache");
    Ok(Arc::new(InMemoryCache::new()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_tracing(&config.logging);
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting merchant-connect service"
    );

    let cache = build_cache(&config).await?;

    let settings_store = Arc::new(InMemorySettings::new());
    let settings = GatewaySettings::new(settings_store);
    if let Err(e) = settings.set_dev_mode(config.connect.dev_mode).await {
        warn!(error = %e, "failed to seed dev mode setting");
    }

    let gateway: Arc<dyn AccountGateway> =
        Arc::new(PaymentsApiClient::new(config.payments_api.clone())?);
    let nonces: Arc<dyn NonceVerifier> = Arc::new(HmacNonce::new(&config.connect.nonce_secret));
    let urls = Arc::new(UrlBuilder::new(
        &config.connect.settings_url,
        config.connect.allowed_redirect_hosts.clone(),
        nonces.clone(),
    )?);
    let store = AccountStore::new(cache.clone());

    let accounts = Arc::new(AccountService::new(
        gateway.clone(),
        store.clone(),
        settings.clone(),
        urls.clone(),
    ));
    let onboarding = Arc::new(ConnectionStateMachine::new(
        gateway,
        store,
        settings,
        urls,
        nonces,
    ));

    let merchant = MerchantInfo {
        email: config.connect.admin_email.clone(),
        business_name: config.connect.business_name.clone(),
    };
    info!(
        email = %mask_email(&merchant.email),
        business_name = %merchant.business_name,
        dev_mode = config.connect.dev_mode,
        cache_backend = cache.backend(),
        "Account connection configured"
    );

    let app = api::router(AppState {
        accounts,
        onboarding,
        merchant: Arc::new(merchant),
        health_checker: HealthChecker::new(cache),
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to address {}: {}", addr, e);
        e
    })?;

    info!(address = %addr, "Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
