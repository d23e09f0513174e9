mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, DatabaseConfig};
pub use repos::*;
pub use services::*;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};
use tracing::{info, warn};

const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";
const CACHE_CONNECTION_STRING: &str = "CACHE_DATABASE_URL";

/// Everything an operation needs to talk to the outside world
#[derive(Clone)]
pub struct BookingContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub cache: AvailabilityCache,
    pub locks: SlotLock,
    pub publisher: Arc<dyn IBookingEventPublisher>,
}

struct ContextParams {
    pub postgres_connection_string: String,
    pub cache_connection_string: String,
}

impl BookingContext {
    fn from_parts(repos: Repos, config: Config, sys: Arc<dyn ISys>) -> Self {
        let cache = AvailabilityCache::new(
            repos.kv.clone(),
            config.availability_cache_ttl,
            config.operation_timeout,
        );
        let locks = SlotLock::new(
            repos.kv.clone(),
            config.admission_lock_ttl,
            config.operation_timeout,
        );
        Self {
            repos,
            config,
            sys,
            cache,
            locks,
            publisher: Arc::new(TracingBookingEventPublisher {}),
        }
    }

    pub fn create_inmemory() -> Self {
        Self::create_inmemory_with_sys(Arc::new(RealSys {}))
    }

    /// Inmemory infra driven by the given clock
    pub fn create_inmemory_with_sys(sys: Arc<dyn ISys>) -> Self {
        Self::from_parts(Repos::create_inmemory(sys.clone()), Config::new(), sys)
    }

    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let config = Config::new();
        let repos = Repos::create_postgres(
            &params.postgres_connection_string,
            &params.cache_connection_string,
            &config.database,
            config.operation_timeout,
        )
        .await?;
        Ok(Self::from_parts(repos, config, Arc::new(RealSys {})))
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<BookingContext> {
    let args: Vec<_> = std::env::args().collect();

    // cargo run inmemory
    let inmemory_arg_set = args.len() > 1 && args[1].eq("inmemory");
    if inmemory_arg_set {
        info!("Inmemory argument provided. Going to use inmemory infra.");
        return Ok(BookingContext::create_inmemory());
    }

    match std::env::var(PSQL_CONNECTION_STRING) {
        Ok(postgres_connection_string) => {
            let cache_connection_string = std::env::var(CACHE_CONNECTION_STRING)
                .unwrap_or_else(|_| postgres_connection_string.clone());
            BookingContext::create(ContextParams {
                postgres_connection_string,
                cache_connection_string,
            })
            .await
        }
        Err(_) => {
            warn!(
                "{} env var was not provided. Going to use inmemory infra.",
                PSQL_CONNECTION_STRING
            );
            Ok(BookingContext::create_inmemory())
        }
    }
}

/// Applies the pending migrations when a database is configured
pub async fn run_migration() -> anyhow::Result<()> {
    let connection_string = match std::env::var(PSQL_CONNECTION_STRING) {
        Ok(connection_string) => connection_string,
        Err(_) => return Ok(()),
    };
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&connection_string)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    Ok(())
}
