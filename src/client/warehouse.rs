//! Warehouse client module
//!
//! Provides the `SqlEngine` trait — the crate's entire contract with the
//! warehouse — and `WarehouseClient`, an implementation for SQL-over-HTTP
//! gateways that accept one statement per request.

use super::Auth;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Errors from the warehouse engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("request to warehouse failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("warehouse rejected statement ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid credential header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl EngineError {
    /// Build a rejection from raw status and message, for engine
    /// implementations that don't go through HTTP.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}

/// A SQL-executing warehouse engine.
///
/// One statement in, rows affected out. Everything the pipeline does —
/// DDL, bulk copy, insert-select — goes through this single method, so a
/// test double only has to record strings.
pub trait SqlEngine: Send + Sync {
    /// Execute a single SQL statement against the warehouse.
    ///
    /// # Errors
    /// Returns an error if the statement cannot be delivered or the engine
    /// rejects it. Zero rows affected is success, not an error.
    fn execute(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = Result<u64, EngineError>> + Send;
}

#[derive(Deserialize, Default)]
struct ExecuteResponse {
    #[serde(default)]
    rows_affected: u64,
}

/// Client for a SQL-over-HTTP warehouse gateway.
///
/// POSTs `{"sql": "..."}` to the gateway URL and reads `rows_affected`
/// from the JSON response when the engine reports one. Authentication is
/// baked into default headers at construction.
///
/// # Example
/// ```no_run
/// use starhouse::client::{Auth, SqlEngine, WarehouseClient};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let url = Url::parse("http://localhost:8123/")?;
/// let warehouse = WarehouseClient::try_new(url, Auth::None)?;
/// let rows = warehouse.execute("SELECT 1;").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct WarehouseClient {
    client: reqwest::Client,
    url: Url,
}

impl WarehouseClient {
    /// Create a new client from a gateway URL and authentication method.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or the
    /// credentials don't form a valid header value.
    pub fn try_new(url: Url, auth: Auth) -> Result<Self, EngineError> {
        let mut headers = reqwest::header::HeaderMap::new();
        match auth {
            Auth::Basic(username, password) => {
                let credentials = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", username, password));
                headers.append(
                    reqwest::header::AUTHORIZATION,
                    format!("Basic {}", credentials).parse()?,
                );
            }
            Auth::Bearer(token) => {
                headers.append(
                    reqwest::header::AUTHORIZATION,
                    format!("Bearer {}", token).parse()?,
                );
            }
            Auth::None => {}
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client, url })
    }

    /// The gateway URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Verify connectivity and authorization with a trivial statement.
    pub async fn ping(&self) -> Result<(), EngineError> {
        self.execute("SELECT 1;").await?;
        Ok(())
    }
}

impl SqlEngine for WarehouseClient {
    async fn execute(&self, sql: &str) -> Result<u64, EngineError> {
        log::trace!("Executing statement:\n{}", sql);

        let response = self
            .client
            .post(self.url.clone())
            .json(&serde_json::json!({ "sql": sql }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EngineError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        // Engines that don't report row counts return an empty or foreign
        // body; treat that as zero rows.
        let body: ExecuteResponse = response.json().await.unwrap_or_default();
        Ok(body.rows_affected)
    }
}

impl std::fmt::Display for WarehouseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}
