mod booking;
mod expert;
mod kv;
mod off_time;
mod schedule;
mod shared;
mod status_history;

use crate::{config::DatabaseConfig, system::ISys};
use booking::{InMemoryBookingRepo, PostgresBookingRepo};
use expert::{InMemoryExpertRepo, PostgresExpertRepo};
use kv::{InMemoryKVRepo, PostgresKVRepo};
use off_time::{InMemoryOffTimeRepo, PostgresOffTimeRepo};
use schedule::{InMemoryScheduleRepo, PostgresScheduleRepo};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use status_history::{InMemoryStatusHistoryRepo, PostgresStatusHistoryRepo};
use std::{str::FromStr, sync::Arc, time::Duration};
use tracing::info;

pub use booking::IBookingRepo;
pub use expert::IExpertRepo;
pub use kv::IKVRepo;
#[cfg(test)]
pub(crate) use kv::FailingKVRepo;
pub use off_time::IOffTimeRepo;
pub use schedule::IScheduleRepo;
pub use status_history::IStatusHistoryRepo;
pub use shared::query_structs::*;

#[derive(Clone)]
pub struct Repos {
    pub experts: Arc<dyn IExpertRepo>,
    pub schedules: Arc<dyn IScheduleRepo>,
    pub off_times: Arc<dyn IOffTimeRepo>,
    pub bookings: Arc<dyn IBookingRepo>,
    pub status_histories: Arc<dyn IStatusHistoryRepo>,
    pub kv: Arc<dyn IKVRepo>,
}

impl Repos {
    /// The key-value store may live in its own database
    pub async fn create_postgres(
        connection_string: &str,
        kv_connection_string: &str,
        db_config: &DatabaseConfig,
        statement_timeout: Duration,
    ) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = connect(connection_string, db_config, statement_timeout).await?;
        let kv_pool = if kv_connection_string == connection_string {
            pool.clone()
        } else {
            connect(kv_connection_string, db_config, statement_timeout).await?
        };
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            experts: Arc::new(PostgresExpertRepo::new(pool.clone())),
            schedules: Arc::new(PostgresScheduleRepo::new(pool.clone())),
            off_times: Arc::new(PostgresOffTimeRepo::new(pool.clone())),
            bookings: Arc::new(PostgresBookingRepo::new(pool.clone())),
            status_histories: Arc::new(PostgresStatusHistoryRepo::new(pool)),
            kv: Arc::new(PostgresKVRepo::new(kv_pool)),
        })
    }

    pub fn create_inmemory(sys: Arc<dyn ISys>) -> Self {
        let histories = Arc::new(InMemoryStatusHistoryRepo::new());
        Self {
            experts: Arc::new(InMemoryExpertRepo::new()),
            schedules: Arc::new(InMemoryScheduleRepo::new()),
            off_times: Arc::new(InMemoryOffTimeRepo::new()),
            bookings: Arc::new(InMemoryBookingRepo::new(histories.clone())),
            status_histories: histories,
            kv: Arc::new(InMemoryKVRepo::new(sys)),
        }
    }
}

async fn connect(
    connection_string: &str,
    db_config: &DatabaseConfig,
    statement_timeout: Duration,
) -> anyhow::Result<PgPool> {
    let options = PgConnectOptions::from_str(connection_string)?.options([(
        "statement_timeout",
        statement_timeout.as_millis().to_string(),
    )]);

    let pool = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .min_connections(db_config.min_connections)
        .max_lifetime(db_config.max_lifetime)
        .acquire_timeout(statement_timeout)
        .connect_with(options)
        .await?;

    Ok(pool)
}
