//! Infrastructure layer: configuration, storage backends, service orchestration.

pub mod config;
pub mod error;
pub mod repository;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use error::{InfraError, InfraResult};
pub use repository::{InMemoryRepository, InventoryRepository, PostgresRepository, StockBatch};
pub use service::{AccountService, InventoryLevel, InventoryService, IssuedToken, RestockSummary};
