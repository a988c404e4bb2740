//! Store-scoped persistence for accounts, catalog and stock.

pub mod batch;
pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use batch::StockBatch;
pub use in_memory::InMemoryRepository;
pub use postgres::PostgresRepository;
pub use r#trait::InventoryRepository;
