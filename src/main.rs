use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use spark_vote::config::{Settings, StoreBackend};
use spark_vote::core::{VoteLedger, VotingEngine};
use spark_vote::routes::{self, AppState};
use spark_vote::services::{
    CacheManager, MemoryStore, ParticipantStore, PostgresStore, RestStore, SessionRegistry,
    SessionVerifier,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

async fn build_store(settings: &Settings) -> std::io::Result<Arc<dyn ParticipantStore>> {
    let timeout = Duration::from_millis(settings.store.timeout_ms);

    match settings.store.backend {
        StoreBackend::Rest => {
            let rest = settings
                .rest
                .as_ref()
                .ok_or_else(|| startup_error("Configuration error", "missing [rest] section"))?;
            let store = RestStore::new(rest.url.clone(), rest.api_key.clone(), rest.table.clone(), timeout)
                .map_err(|e| startup_error("Failed to build REST client", e))?;
            info!("REST participant store initialized (table: {})", rest.table);
            let store: Arc<dyn ParticipantStore> = Arc::new(store);
            Ok(store)
        }
        StoreBackend::Postgres => {
            let db = settings
                .database
                .as_ref()
                .ok_or_else(|| startup_error("Configuration error", "missing [database] section"))?;
            let store = PostgresStore::from_settings(
                &db.url,
                db.max_connections,
                db.min_connections,
                db.acquire_timeout_secs,
                db.idle_timeout_secs,
            )
            .await
            .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;
            info!("PostgreSQL participant store initialized (max: {} connections)", db.max_connections.unwrap_or(10));
            let store: Arc<dyn ParticipantStore> = Arc::new(store);
            Ok(store)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory participant store, data is lost on restart");
            let memory = MemoryStore::default();
            match &settings.store.seed_file {
                Some(path) => {
                    let count = memory
                        .seed_from_file(path)
                        .await
                        .map_err(|e| startup_error("Failed to seed memory store", e))?;
                    info!("Memory store seeded with {} participants from {}", count, path);
                }
                None => warn!("No store.seed_file set, memory store starts empty"),
            }
            let store: Arc<dyn ParticipantStore> = Arc::new(memory);
            Ok(store)
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration before logging so [logging] applies; LOG_LEVEL and LOG_FORMAT win
    let loaded = Settings::load();
    let logging = loaded
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(logging.level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(logging.format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting Spark Vote service...");

    let settings = loaded.map_err(|e| startup_error("Configuration error", e))?;

    info!("Configuration loaded successfully");

    let store = build_store(&settings).await?;

    // Redis holds the session revocation cutoff, shared by every instance
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(60);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(100);

    let cache = match CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl).await {
        Ok(c) => {
            info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            Arc::new(c)
        }
        Err(e) => return Err(startup_error("Redis connection required", e)),
    };

    let verifier = SessionVerifier::new(&settings.session.jwt_secret, settings.session.ttl_secs);
    let sessions = Arc::new(SessionRegistry::new(verifier, cache));

    let matching = &settings.matching;
    let ledger = VoteLedger::new(matching.vote_quota)
        .with_opposite_gender_rule(matching.require_opposite_gender);
    let engine = Arc::new(
        VotingEngine::new(store, ledger, Duration::from_millis(settings.store.timeout_ms))
            .with_reconcile_on_fetch(matching.reconcile_on_fetch),
    );

    info!(
        "Voting engine initialized (quota: {}, opposite gender rule: {}, reconcile on fetch: {})",
        matching.vote_quota, matching.require_opposite_gender, matching.reconcile_on_fetch
    );

    // Build application state
    let app_state = AppState { engine, sessions };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
