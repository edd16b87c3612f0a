use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, create_orm_conn, create_pool},
    events::EventHub,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub events: EventHub,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, config: AppConfig) -> Self {
        let events = EventHub::new(config.event_buffer);
        Self {
            pool,
            orm,
            config: Arc::new(config),
            events,
        }
    }

    /// Open both database handles described by `config`.
    pub async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        let pool = create_pool(&config.database_url, config.db_max_connections).await?;
        let orm = create_orm_conn(&config.database_url, config.db_max_connections).await?;
        Ok(Self::new(pool, orm, config))
    }
}
