use std::sync::Arc;

use anyhow::Result;
use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use directory::{
    AppState, bootstrap,
    config::{AppConfig, SessionBackend, StorageBackend},
    create_router,
    geocode::NominatimClient,
    rate_limiter::RateLimiter,
    repositories::{
        AccountRepository, AccountStore, EmployeeRepository, EmployeeStore, MemoryAccountStore,
        MemoryEmployeeStore,
    },
    session::{MemorySessionStore, RedisSessionStore, SessionManager, SessionStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting employee directory service");

    let config = AppConfig::load()?;

    let (employees, accounts): (Arc<dyn EmployeeStore>, Arc<dyn AccountStore>) =
        match config.storage {
            StorageBackend::Postgres => {
                let db_config = DatabaseConfig::from_env()?;
                let pool = init_pool(&db_config).await?;

                if health_check(&pool).await? {
                    info!("Database connection successful");
                } else {
                    anyhow::bail!("Failed to connect to database");
                }
                run_migrations(&pool).await?;

                let employees: Arc<dyn EmployeeStore> =
                    Arc::new(EmployeeRepository::new(pool.clone()));
                let accounts: Arc<dyn AccountStore> = Arc::new(AccountRepository::new(pool));
                (employees, accounts)
            }
            StorageBackend::Memory => {
                warn!("Using in-memory storage; records are lost on restart");
                let employees: Arc<dyn EmployeeStore> = Arc::new(MemoryEmployeeStore::new());
                let accounts: Arc<dyn AccountStore> = Arc::new(MemoryAccountStore::new());
                (employees, accounts)
            }
        };

    bootstrap::ensure_admin(accounts.as_ref(), config.admin.as_ref()).await?;

    let session_store: Arc<dyn SessionStore> = match config.session_backend {
        SessionBackend::Memory => Arc::new(MemorySessionStore::new()),
        SessionBackend::Redis => {
            let redis_config = RedisConfig::from_env()?;
            let redis_pool = RedisPool::new(&redis_config).await?;
            if !redis_pool.health_check().await? {
                anyhow::bail!("Failed to connect to Redis");
            }
            Arc::new(RedisSessionStore::new(redis_pool))
        }
    };

    let app_state = AppState {
        employees,
        accounts,
        sessions: SessionManager::new(session_store),
        geocoder: Arc::new(NominatimClient::new(config.geocoder.clone())?),
        login_limiter: RateLimiter::new(config.login_limits.clone()),
        cookie: config.cookie.clone(),
    };

    info!("Directory service initialized successfully");

    // Start the web server
    let app = create_router(app_state, Some(config.public_dir.clone()));

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Directory service listening on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Directory service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
