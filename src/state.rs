// state.rs - Shared handles injected into every handler

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::auth::TokenIssuer;
use crate::config::{AppConfig, StoreBackend};
use crate::database::{DatabaseManager, LogStore, MemoryStore, PgStore, TicketStore, UserStore};
use crate::services::{RecommendationClient, TicketService, UserService};
use crate::storage::{BlobStore, LocalBlobStore};

/// The three collections behind one backend
#[derive(Clone)]
pub struct Stores {
    pub tickets: Arc<dyn TicketStore>,
    pub users: Arc<dyn UserStore>,
    pub logs: Arc<dyn LogStore>,
}

impl Stores {
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            tickets: store.clone(),
            users: store.clone(),
            logs: store,
        }
    }

    pub fn postgres(database: &DatabaseManager) -> Self {
        let store = Arc::new(PgStore::new(database.pool().clone()));
        Self {
            tickets: store.clone(),
            users: store.clone(),
            logs: store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenIssuer,
    pub tickets: TicketService,
    pub users: UserService,
    pub logs: Arc<dyn LogStore>,
    pub recommendations: RecommendationClient,
    pub database: Option<DatabaseManager>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        stores: Stores,
        blobs: Arc<dyn BlobStore>,
        database: Option<DatabaseManager>,
    ) -> anyhow::Result<Self> {
        let tokens = TokenIssuer::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)?;
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.recommendation.timeout_secs))
            .build()?;

        Ok(Self {
            tickets: TicketService::new(stores.tickets, stores.logs.clone(), blobs)
                .with_max_image_bytes(config.storage.max_image_bytes),
            users: UserService::new(stores.users, tokens.clone()),
            logs: stores.logs,
            recommendations: RecommendationClient::new(http, &config.recommendation),
            tokens,
            database,
            config: Arc::new(config),
        })
    }

    /// Connect the configured backend and local image storage.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let (stores, database) = match config.storage.backend {
            StoreBackend::Memory => {
                info!("Using in-memory store");
                (Stores::memory(), None)
            }
            StoreBackend::Postgres => {
                let database = DatabaseManager::connect(&config.database).await?;
                info!("Using PostgreSQL store");
                (Stores::postgres(&database), Some(database))
            }
        };

        tokio::fs::create_dir_all(&config.storage.upload_dir).await?;
        let blobs = Arc::new(LocalBlobStore::new(
            &config.storage.upload_dir,
            &config.storage.public_base_url,
        ));

        Self::new(config, stores, blobs, database)
    }
}
