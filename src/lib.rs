//! Starhouse
//!
//! A star-schema ETL pipeline: rebuilds a SQL warehouse's staging,
//! dimension, and fact tables from JSON event logs and song metadata in
//! object storage, in four strictly ordered stages
//! (drop → create → bulk load → transform).

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod load;
pub mod pipeline;
pub mod schema;
pub mod transform;

// Re-exports for convenience
pub use client::{Auth, AuthType, EngineError, SqlEngine, WarehouseClient};
pub use config::EtlConfig;
pub use error::{EtlError, SchemaOp};
pub use load::{BulkLoader, CopyConfig, CopyLoader, JsonFormat, StagingSource};
pub use pipeline::{Pipeline, Stage};
pub use transform::{TimeParts, TransformRule};
