mod from_row;
mod schema;
pub mod queries;

pub use schema::init_db;

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::payments::PaymentGateway;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state holding the database pool and gateway capabilities
#[derive(Clone)]
pub struct AppState {
    /// Main database pool (stores, entitlement grants)
    pub db: DbPool,
    /// Payment gateway client (trait object so tests can stub it)
    pub gateway: Arc<dyn PaymentGateway>,
    /// Shared checksum secret for signing requests and verifying webhooks
    pub checksum_key: String,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
