//! Bulk loader interface
//!
//! The contract for moving raw records from object storage into staging
//! tables, plus `CopyLoader`, which does it with a warehouse `COPY`
//! statement. No transformation happens here: fields pass through unchanged
//! apart from the type coercion the staging schema implies.

use crate::client::SqlEngine;
use crate::error::EtlError;

/// Format hint for a JSON bulk load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JsonFormat {
    /// Infer the field mapping from column names.
    Auto,
    /// Explicit field mapping from a jsonpaths document at this URI.
    Paths(String),
}

impl JsonFormat {
    /// The argument rendered into `FORMAT AS JSON '...'`.
    pub fn copy_argument(&self) -> &str {
        match self {
            Self::Auto => "auto",
            Self::Paths(uri) => uri,
        }
    }
}

/// One staging table and the object-storage location feeding it.
#[derive(Clone, Debug)]
pub struct StagingSource {
    pub table: &'static str,
    pub uri: String,
    pub format: JsonFormat,
}

/// Region and credential for the bulk copy. The credential is an opaque
/// role identifier; it is passed through to the warehouse verbatim, never
/// parsed.
#[derive(Clone, Debug)]
pub struct CopyConfig {
    pub region: String,
    pub iam_role: String,
}

/// A bulk loader populates one staging table from an external source.
///
/// The operation is all-or-nothing from the pipeline's perspective: a
/// partial load surfaces as an error, never as silent partial success.
pub trait BulkLoader: Send + Sync {
    /// Load the source into its staging table, returning rows loaded.
    ///
    /// # Errors
    /// Returns `EtlError::Load` with the table and source URI if ingestion
    /// fails. Zero rows is a valid, successful load.
    fn load(
        &self,
        source: &StagingSource,
    ) -> impl std::future::Future<Output = Result<u64, EtlError>> + Send;
}

/// Render the copy statement for a source.
///
/// Split out from `CopyLoader` so drivers can preview the statement
/// without constructing an engine.
pub fn copy_statement(config: &CopyConfig, source: &StagingSource) -> String {
    format!(
        "COPY {}\nFROM '{}'\nCREDENTIALS 'aws_iam_role={}'\nREGION '{}'\nFORMAT AS JSON '{}';",
        source.table,
        source.uri,
        config.iam_role,
        config.region,
        source.format.copy_argument()
    )
}

/// Bulk loader that issues `COPY ... FROM '<uri>'` through the SQL engine.
///
/// # Example
/// ```no_run
/// use starhouse::client::{Auth, WarehouseClient};
/// use starhouse::load::{BulkLoader, CopyConfig, CopyLoader, JsonFormat, StagingSource};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = WarehouseClient::try_new(Url::parse("http://localhost:8123/")?, Auth::None)?;
/// let loader = CopyLoader::new(engine, CopyConfig {
///     region: "us-west-2".into(),
///     iam_role: "arn:aws:iam::123456789012:role/etl".into(),
/// });
///
/// let rows = loader.load(&StagingSource {
///     table: "staging_songs",
///     uri: "s3://bucket/song_data".into(),
///     format: JsonFormat::Auto,
/// }).await?;
/// # Ok(())
/// # }
/// ```
pub struct CopyLoader<E> {
    engine: E,
    config: CopyConfig,
}

impl<E: SqlEngine> CopyLoader<E> {
    pub fn new(engine: E, config: CopyConfig) -> Self {
        Self { engine, config }
    }

    /// Render the copy statement for a source.
    pub fn copy_sql(&self, source: &StagingSource) -> String {
        copy_statement(&self.config, source)
    }
}

impl<E: SqlEngine> BulkLoader for CopyLoader<E> {
    async fn load(&self, source: &StagingSource) -> Result<u64, EtlError> {
        log::debug!("Copying {} into {}", source.uri, source.table);

        let sql = self.copy_sql(source);
        let rows = self
            .engine
            .execute(&sql)
            .await
            .map_err(|e| EtlError::Load {
                table: source.table.to_string(),
                uri: source.uri.clone(),
                source: e,
            })?;

        log::info!("Loaded {} row(s) into {}", rows, source.table);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EngineError;
    use std::sync::Mutex;

    struct ScriptedEngine {
        statements: Mutex<Vec<String>>,
        fail: bool,
    }

    impl ScriptedEngine {
        fn new(fail: bool) -> Self {
            Self {
                statements: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    impl SqlEngine for ScriptedEngine {
        async fn execute(&self, sql: &str) -> Result<u64, EngineError> {
            self.statements.lock().unwrap().push(sql.to_string());
            if self.fail {
                Err(EngineError::rejected(400, "malformed JSON"))
            } else {
                Ok(42)
            }
        }
    }

    fn config() -> CopyConfig {
        CopyConfig {
            region: "us-west-2".into(),
            iam_role: "arn:aws:iam::123456789012:role/etl".into(),
        }
    }

    fn events_source() -> StagingSource {
        StagingSource {
            table: "staging_events",
            uri: "s3://bucket/log_data".into(),
            format: JsonFormat::Paths("s3://bucket/log_json_path.json".into()),
        }
    }

    #[test]
    fn test_copy_sql_with_explicit_mapping() {
        let loader = CopyLoader::new(ScriptedEngine::new(false), config());
        let sql = loader.copy_sql(&events_source());
        assert!(sql.starts_with("COPY staging_events\nFROM 's3://bucket/log_data'"));
        assert!(sql.contains("CREDENTIALS 'aws_iam_role=arn:aws:iam::123456789012:role/etl'"));
        assert!(sql.contains("REGION 'us-west-2'"));
        assert!(sql.contains("FORMAT AS JSON 's3://bucket/log_json_path.json';"));
    }

    #[test]
    fn test_copy_sql_with_auto_inference() {
        let loader = CopyLoader::new(ScriptedEngine::new(false), config());
        let sql = loader.copy_sql(&StagingSource {
            table: "staging_songs",
            uri: "s3://bucket/song_data".into(),
            format: JsonFormat::Auto,
        });
        assert!(sql.contains("COPY staging_songs"));
        assert!(sql.contains("FORMAT AS JSON 'auto';"));
    }

    #[tokio::test]
    async fn test_load_reports_rows() {
        let loader = CopyLoader::new(ScriptedEngine::new(false), config());
        let rows = loader.load(&events_source()).await.unwrap();
        assert_eq!(rows, 42);
    }

    #[tokio::test]
    async fn test_failed_load_carries_table_and_uri() {
        let loader = CopyLoader::new(ScriptedEngine::new(true), config());
        let err = loader.load(&events_source()).await.unwrap_err();
        match err {
            EtlError::Load { table, uri, .. } => {
                assert_eq!(table, "staging_events");
                assert_eq!(uri, "s3://bucket/log_data");
            }
            other => panic!("expected load error, got {other}"),
        }
    }
}
