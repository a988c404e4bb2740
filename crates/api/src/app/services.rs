//! Service wiring: pick a storage backend and build the services over it.

use std::sync::Arc;

use stockroom_auth::Hs256JwtValidator;
use stockroom_infra::{
    AccountService, AppConfig, InMemoryRepository, InfraResult, InventoryRepository, InventoryService,
    PostgresRepository,
};

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub accounts: AccountService,
    pub inventory: InventoryService,
}

impl AppServices {
    pub fn new(repo: Arc<dyn InventoryRepository>, jwt: Arc<Hs256JwtValidator>, config: &AppConfig) -> Self {
        Self {
            accounts: AccountService::new(repo.clone(), jwt, config.token_ttl),
            inventory: InventoryService::new(repo),
        }
    }
}

/// Postgres when `DATABASE_URL` is set, in-memory otherwise.
pub async fn build_repository(config: &AppConfig) -> InfraResult<Arc<dyn InventoryRepository>> {
    match &config.database_url {
        Some(url) => {
            tracing::info!("using postgres storage");
            Ok(Arc::new(PostgresRepository::connect(url).await?))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory storage");
            Ok(Arc::new(InMemoryRepository::new()))
        }
    }
}
