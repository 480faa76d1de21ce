use std::net::SocketAddr;
use std::sync::Arc;

use safar_api::{
    app,
    state::{AppState, AuthSettings},
};
use safar_core::repository::UserRepository;
use safar_shared::models::auth::UserRole;
use safar_store::cattle_repo::{PgCattleRepository, PgHealthRepository};
use safar_store::feed_repo::PgFeedRepository;
use safar_store::hajj_repo::{PgHajiRepository, PgUmrahRepository};
use safar_store::milk_repo::PgMilkRepository;
use safar_store::office_repo::{PgEmployeeRepository, PgExpenseRepository, PgServiceRepository};
use safar_store::reports_repo::PgReportsRepository;
use safar_store::ticketing_repo::{PgAirlineRepository, PgTicketRepository};
use safar_store::users_repo::PgUserRepository;
use safar_store::{Cache, DbClient, MemoryCache, RedisCache};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "safar_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = safar_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Safar API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");
    let pool = db.pool.clone();

    let cache: Arc<dyn Cache> = match config.cache.driver.as_str() {
        "redis" => Arc::new(
            RedisCache::new(&config.redis.url).expect("Failed to connect to Redis"),
        ),
        _ => Arc::new(MemoryCache::new()),
    };

    let user_repo: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));

    // First boot: seed the admin login from config.
    let users = user_repo.count().await.expect("Failed to query users");
    if users == 0 {
        let hash = bcrypt::hash(&config.auth.admin_password, bcrypt::DEFAULT_COST)
            .expect("Failed to hash bootstrap password");
        user_repo
            .create(
                &config.auth.admin_name,
                &config.auth.admin_email,
                &hash,
                UserRole::Admin,
            )
            .await
            .expect("Failed to create bootstrap admin");
        tracing::info!("Bootstrap admin {} created", config.auth.admin_email);
    }

    let app_state = AppState {
        haji_repo: Arc::new(PgHajiRepository::new(pool.clone())),
        umrah_repo: Arc::new(PgUmrahRepository::new(pool.clone())),
        airline_repo: Arc::new(PgAirlineRepository::new(pool.clone())),
        ticket_repo: Arc::new(PgTicketRepository::new(pool.clone())),
        cattle_repo: Arc::new(PgCattleRepository::new(pool.clone())),
        feed_repo: Arc::new(PgFeedRepository::new(pool.clone())),
        health_repo: Arc::new(PgHealthRepository::new(pool.clone())),
        milk_repo: Arc::new(PgMilkRepository::new(pool.clone())),
        employee_repo: Arc::new(PgEmployeeRepository::new(pool.clone())),
        expense_repo: Arc::new(PgExpenseRepository::new(pool.clone())),
        service_repo: Arc::new(PgServiceRepository::new(pool.clone())),
        user_repo,
        reports_repo: Arc::new(PgReportsRepository::new(pool)),
        cache,
        auth: AuthSettings {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        cache_ttl: config.cache.clone(),
        rate_limit: config.rate_limit.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
