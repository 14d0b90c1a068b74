//! Pipeline error kinds
//!
//! Every stage failure carries the failing table (and source URI for loads)
//! so the caller can report exactly where the run stopped. Errors are never
//! recovered locally; the sequencer halts on the first one.

use crate::client::EngineError;
use crate::pipeline::Stage;
use thiserror::Error;

/// Schema operations that can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaOp {
    Drop,
    Create,
}

impl std::fmt::Display for SchemaOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drop => write!(f, "drop"),
            Self::Create => write!(f, "create"),
        }
    }
}

/// Errors surfaced by the ETL pipeline.
#[derive(Debug, Error)]
pub enum EtlError {
    /// A create or drop statement failed against the warehouse.
    #[error("schema {op} failed for table {table}: {source}")]
    Schema {
        op: SchemaOp,
        table: String,
        #[source]
        source: EngineError,
    },

    /// A bulk load into a staging table failed. A partial load is reported
    /// the same way; the pipeline treats it as all-or-nothing.
    #[error("bulk load into {table} from {uri} failed: {source}")]
    Load {
        table: String,
        uri: String,
        #[source]
        source: EngineError,
    },

    /// A transform's insert-select failed against the warehouse.
    #[error("transform into {table} failed: {source}")]
    Transform {
        table: String,
        #[source]
        source: EngineError,
    },
}

impl EtlError {
    /// The pipeline stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Schema {
                op: SchemaOp::Drop, ..
            } => Stage::Dropping,
            Self::Schema {
                op: SchemaOp::Create,
                ..
            } => Stage::CreatingSchema,
            Self::Load { .. } => Stage::Loading,
            Self::Transform { .. } => Stage::Transforming,
        }
    }

    /// The table the failing statement targeted.
    pub fn table(&self) -> &str {
        match self {
            Self::Schema { table, .. } | Self::Load { table, .. } | Self::Transform { table, .. } => {
                table
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EngineError;

    #[test]
    fn test_errors_map_to_their_stage() {
        let schema = EtlError::Schema {
            op: SchemaOp::Create,
            table: "users".into(),
            source: EngineError::rejected(403, "permission denied"),
        };
        assert_eq!(schema.stage(), Stage::CreatingSchema);
        assert_eq!(schema.table(), "users");

        let load = EtlError::Load {
            table: "staging_events".into(),
            uri: "s3://bucket/log_data".into(),
            source: EngineError::rejected(400, "malformed JSON"),
        };
        assert_eq!(load.stage(), Stage::Loading);
        assert_eq!(load.table(), "staging_events");

        let transform = EtlError::Transform {
            table: "songplays".into(),
            source: EngineError::rejected(500, "relation missing"),
        };
        assert_eq!(transform.stage(), Stage::Transforming);
    }

    #[test]
    fn test_messages_identify_stage_and_table() {
        let err = EtlError::Load {
            table: "staging_songs".into(),
            uri: "s3://bucket/song_data".into(),
            source: EngineError::rejected(403, "expired credential"),
        };
        let message = err.to_string();
        assert!(message.contains("staging_songs"));
        assert!(message.contains("s3://bucket/song_data"));
    }
}
