use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use nfse_service::config::Config;
use nfse_service::config::StorageBackend;
use nfse_service::inbound::http::router::create_router;
use nfse_service::inbound::http::router::AppState;
use nfse_service::outbound::repositories::InMemoryRepository;
use nfse_service::outbound::repositories::PostgresInvoiceRepository;
use nfse_service::outbound::repositories::PostgresIssuerRepository;
use nfse_service::outbound::repositories::PostgresRecipientRepository;
use nfse_service::outbound::repositories::PostgresRoleRepository;
use nfse_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nfse_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "nfse-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        backend = ?config.database.backend,
        database_url = %config.database.redacted_url(),
        http_port = config.server.http_port,
        jwt_algorithm = %config.jwt.algorithm,
        token_lifetime_minutes = config.jwt.expiration_minutes,
        "Configuration loaded"
    );

    let password_hasher = PasswordHasher::new();
    let authenticator = Authenticator::with_hasher(
        password_hasher.clone(),
        config.jwt.secret.as_bytes(),
        &config.jwt.algorithm,
        chrono::Duration::minutes(config.jwt.expiration_minutes),
    )?;

    let state = match config.database.backend {
        StorageBackend::Postgres => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&config.database.url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            AppState::build(
                Arc::new(PostgresUserRepository::new(pg_pool.clone())),
                Arc::new(PostgresIssuerRepository::new(pg_pool.clone())),
                Arc::new(PostgresRecipientRepository::new(pg_pool.clone())),
                Arc::new(PostgresRoleRepository::new(pg_pool.clone())),
                Arc::new(PostgresInvoiceRepository::new(pg_pool)),
                password_hasher,
                authenticator,
                config.jwt.reject_inactive_subjects,
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, records are lost on shutdown");

            AppState::build(
                Arc::new(InMemoryRepository::new()),
                Arc::new(InMemoryRepository::new()),
                Arc::new(InMemoryRepository::new()),
                Arc::new(InMemoryRepository::new()),
                Arc::new(InMemoryRepository::new()),
                password_hasher,
                authenticator,
                config.jwt.reject_inactive_subjects,
            )
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(state)).await?;

    tracing::info!("Server exited successfully");

    Ok(())
}
