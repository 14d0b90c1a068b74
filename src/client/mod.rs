//! Warehouse client: the `SqlEngine` contract plus the HTTP implementation
//! and its authentication options.

mod auth;
mod warehouse;

pub use auth::{Auth, AuthType};
pub use warehouse::{EngineError, SqlEngine, WarehouseClient};
