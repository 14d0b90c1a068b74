//! Pipeline sequencer
//!
//! Orders the four warehouse-rebuild stages — drop, create, load, transform
//! — with a strict barrier between them, and tracks progress as a small
//! state machine. Any failure flips the machine to `Failed` and halts the
//! remaining stages; there is no retry or partial recovery.

use crate::client::SqlEngine;
use crate::error::{EtlError, SchemaOp};
use crate::load::{BulkLoader, StagingSource};
use crate::schema;
use crate::transform::TransformRule;

/// Pipeline stages. `Failed` is terminal and reachable from any
/// non-terminal state; `Done` only via a full successful run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Dropping,
    CreatingSchema,
    Loading,
    Transforming,
    Done,
    Failed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Dropping => "dropping",
            Self::CreatingSchema => "creating schema",
            Self::Loading => "loading",
            Self::Transforming => "transforming",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// ETL pipeline over a SQL engine and a bulk loader.
///
/// `run` drives the full rebuild. The individual stage operations are also
/// public so a driver can invoke them piecemeal (reset the schema, reload
/// staging, re-run transforms); those calls don't touch the state machine.
///
/// # Example
/// ```no_run
/// use starhouse::client::{Auth, WarehouseClient};
/// use starhouse::load::{CopyConfig, CopyLoader, JsonFormat, StagingSource};
/// use starhouse::pipeline::Pipeline;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = WarehouseClient::try_new(Url::parse("http://localhost:8123/")?, Auth::None)?;
/// let config = CopyConfig { region: "us-west-2".into(), iam_role: "arn:...".into() };
/// let loader = CopyLoader::new(engine.clone(), config);
///
/// let sources = vec![StagingSource {
///     table: "staging_songs",
///     uri: "s3://bucket/song_data".into(),
///     format: JsonFormat::Auto,
/// }];
///
/// let mut pipeline = Pipeline::new(engine, loader);
/// pipeline.run(&sources).await?;
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, L> {
    engine: E,
    loader: L,
    stage: Stage,
}

impl<E, L> Pipeline<E, L>
where
    E: SqlEngine,
    L: BulkLoader,
{
    /// Create a new pipeline in the `Idle` state.
    pub fn new(engine: E, loader: L) -> Self {
        Self {
            engine,
            loader,
            stage: Stage::Idle,
        }
    }

    /// The current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run the full rebuild: drop → create → load → transform.
    ///
    /// Each stage waits for full completion of the previous one. The first
    /// error halts everything, leaves the warehouse in whatever state the
    /// last completed statement produced, and parks the machine in `Failed`.
    ///
    /// # Errors
    /// Returns the first stage error; `EtlError::stage()` identifies where
    /// the run stopped.
    pub async fn run(&mut self, sources: &[StagingSource]) -> Result<(), EtlError> {
        log::info!("Starting warehouse rebuild");

        match self.advance(sources).await {
            Ok(()) => {
                self.stage = Stage::Done;
                log::info!("Warehouse rebuild complete");
                Ok(())
            }
            Err(e) => {
                self.stage = Stage::Failed;
                log::error!("Pipeline failed while {}: {}", e.stage(), e);
                Err(e)
            }
        }
    }

    async fn advance(&mut self, sources: &[StagingSource]) -> Result<(), EtlError> {
        self.stage = Stage::Dropping;
        self.drop_all().await?;

        self.stage = Stage::CreatingSchema;
        self.create_all().await?;

        self.stage = Stage::Loading;
        self.load_staging(sources).await?;

        self.stage = Stage::Transforming;
        self.run_transforms().await?;

        Ok(())
    }

    /// Drop all seven tables. Each statement is idempotent, so this
    /// succeeds against a warehouse in any prior state.
    pub async fn drop_all(&self) -> Result<usize, EtlError> {
        let tables = schema::all_tables();
        for table in &tables {
            self.engine
                .execute(&table.drop_sql())
                .await
                .map_err(|e| EtlError::Schema {
                    op: SchemaOp::Drop,
                    table: table.name().to_string(),
                    source: e,
                })?;
            log::debug!("Dropped {}", table.name());
        }
        log::info!("Dropped {} table(s)", tables.len());
        Ok(tables.len())
    }

    /// Create all seven tables. Safe to call repeatedly without an
    /// intervening drop.
    pub async fn create_all(&self) -> Result<usize, EtlError> {
        let tables = schema::all_tables();
        for table in &tables {
            self.engine
                .execute(&table.create_sql())
                .await
                .map_err(|e| EtlError::Schema {
                    op: SchemaOp::Create,
                    table: table.name().to_string(),
                    source: e,
                })?;
            log::debug!("Created {}", table.name());
        }
        log::info!("Created {} table(s)", tables.len());
        Ok(tables.len())
    }

    /// Bulk-load every staging source, returning total rows loaded.
    pub async fn load_staging(&self, sources: &[StagingSource]) -> Result<u64, EtlError> {
        let mut total = 0;
        for source in sources {
            total += self.loader.load(source).await?;
        }
        log::info!(
            "Staging load complete: {} row(s) across {} source(s)",
            total,
            sources.len()
        );
        Ok(total)
    }

    /// Run all five transform rules, returning total rows produced.
    ///
    /// The rules read only from staging and write to disjoint targets, so
    /// they are issued concurrently; the warehouse owns actual parallelism.
    /// The first failure cancels the remaining requests.
    pub async fn run_transforms(&self) -> Result<u64, EtlError> {
        let (users, songs, artists, time, songplays) = tokio::try_join!(
            self.apply(TransformRule::Users),
            self.apply(TransformRule::Songs),
            self.apply(TransformRule::Artists),
            self.apply(TransformRule::Time),
            self.apply(TransformRule::Songplays),
        )?;

        let total = users + songs + artists + time + songplays;
        log::info!("Transforms complete: {} row(s) across 5 table(s)", total);
        Ok(total)
    }

    async fn apply(&self, rule: TransformRule) -> Result<u64, EtlError> {
        let rows = self
            .engine
            .execute(rule.sql())
            .await
            .map_err(|e| EtlError::Transform {
                table: rule.target_table().to_string(),
                source: e,
            })?;
        // Zero rows is a valid outcome: empty staging input is not an error.
        log::info!("Transform into {} produced {} row(s)", rule, rows);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EngineError;
    use crate::load::{CopyConfig, CopyLoader, JsonFormat};
    use std::sync::{Arc, Mutex};

    /// Engine double that records statements and optionally rejects the
    /// first statement containing a marker.
    #[derive(Clone, Default)]
    struct RecordingEngine {
        statements: Arc<Mutex<Vec<String>>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingEngine {
        fn failing_on(marker: &'static str) -> Self {
            Self {
                fail_on: Some(marker),
                ..Self::default()
            }
        }

        fn statements(&self) -> Vec<String> {
            self.statements.lock().unwrap().clone()
        }
    }

    impl SqlEngine for RecordingEngine {
        async fn execute(&self, sql: &str) -> Result<u64, EngineError> {
            if let Some(marker) = self.fail_on {
                if sql.contains(marker) {
                    return Err(EngineError::rejected(500, "injected failure"));
                }
            }
            self.statements.lock().unwrap().push(sql.to_string());
            Ok(1)
        }
    }

    fn sources() -> Vec<StagingSource> {
        vec![
            StagingSource {
                table: schema::STAGING_EVENTS,
                uri: "s3://bucket/log_data".into(),
                format: JsonFormat::Paths("s3://bucket/log_json_path.json".into()),
            },
            StagingSource {
                table: schema::STAGING_SONGS,
                uri: "s3://bucket/song_data".into(),
                format: JsonFormat::Auto,
            },
        ]
    }

    fn pipeline(engine: RecordingEngine) -> Pipeline<RecordingEngine, CopyLoader<RecordingEngine>> {
        let config = CopyConfig {
            region: "us-west-2".into(),
            iam_role: "arn:aws:iam::123456789012:role/etl".into(),
        };
        let loader = CopyLoader::new(engine.clone(), config);
        Pipeline::new(engine, loader)
    }

    #[tokio::test]
    async fn test_run_orders_stages_with_barriers() {
        let engine = RecordingEngine::default();
        let mut pipeline = pipeline(engine.clone());

        assert_eq!(pipeline.stage(), Stage::Idle);
        pipeline.run(&sources()).await.unwrap();
        assert_eq!(pipeline.stage(), Stage::Done);

        let statements = engine.statements();
        assert_eq!(statements.len(), 7 + 7 + 2 + 5);
        assert!(statements[..7].iter().all(|s| s.starts_with("DROP TABLE")));
        assert!(statements[7..14].iter().all(|s| s.starts_with("CREATE TABLE")));
        assert!(statements[14..16].iter().all(|s| s.starts_with("COPY ")));
        assert!(statements[16..].iter().all(|s| s.starts_with("INSERT INTO")));
    }

    #[tokio::test]
    async fn test_failure_while_loading_halts_transforms() {
        let engine = RecordingEngine::failing_on("COPY staging_songs");
        let mut pipeline = pipeline(engine.clone());

        let err = pipeline.run(&sources()).await.unwrap_err();
        assert_eq!(pipeline.stage(), Stage::Failed);
        assert_eq!(err.stage(), Stage::Loading);
        assert_eq!(err.table(), "staging_songs");

        // No transform ran after the failed load.
        assert!(
            engine
                .statements()
                .iter()
                .all(|s| !s.starts_with("INSERT INTO"))
        );
    }

    #[tokio::test]
    async fn test_failure_while_dropping_is_terminal() {
        let engine = RecordingEngine::failing_on("DROP TABLE IF EXISTS users");
        let mut pipeline = pipeline(engine.clone());

        let err = pipeline.run(&sources()).await.unwrap_err();
        assert_eq!(pipeline.stage(), Stage::Failed);
        assert_eq!(err.stage(), Stage::Dropping);
        assert!(engine.statements().iter().all(|s| !s.contains("CREATE")));
    }

    #[tokio::test]
    async fn test_transform_failure_names_target_table() {
        let engine = RecordingEngine::failing_on("INSERT INTO songplays");
        let mut pipeline = pipeline(engine.clone());

        let err = pipeline.run(&sources()).await.unwrap_err();
        assert_eq!(err.stage(), Stage::Transforming);
        assert_eq!(err.table(), "songplays");
        assert_eq!(pipeline.stage(), Stage::Failed);
    }

    #[tokio::test]
    async fn test_create_twice_without_drop() {
        let engine = RecordingEngine::default();
        let pipeline = pipeline(engine.clone());

        pipeline.create_all().await.unwrap();
        pipeline.create_all().await.unwrap();

        let statements = engine.statements();
        assert_eq!(statements.len(), 14);
        // Re-creation relies on IF NOT EXISTS, so the repeated statements
        // are byte-identical and safe.
        assert_eq!(statements[..7], statements[7..]);
        assert!(statements.iter().all(|s| s.contains("IF NOT EXISTS")));
    }

    #[tokio::test]
    async fn test_empty_sources_is_valid() {
        let engine = RecordingEngine::default();
        let mut pipeline = pipeline(engine.clone());

        pipeline.run(&[]).await.unwrap();
        assert_eq!(pipeline.stage(), Stage::Done);
        // Still 7 drops, 7 creates, 5 transforms.
        assert_eq!(engine.statements().len(), 19);
    }
}
