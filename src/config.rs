//! Pipeline configuration
//!
//! All inputs the pipeline needs — gateway URL, credentials, region, and
//! the three object-storage locators — collected into one explicit struct
//! and passed to the client and loader at construction time. Nothing reads
//! ambient configuration after startup.

use crate::client::Auth;
use crate::load::{CopyConfig, JsonFormat, StagingSource};
use crate::schema;
use eyre::{Context, Result};
use url::Url;

/// Configuration for one pipeline run.
///
/// The object-storage URIs, region, and IAM role are opaque strings handed
/// through to the warehouse's bulk copy; they are never parsed here.
#[derive(Debug)]
pub struct EtlConfig {
    pub warehouse_url: Url,
    pub auth: Auth,
    pub region: String,
    pub iam_role: String,
    pub log_data: String,
    pub log_jsonpath: String,
    pub song_data: String,
}

impl EtlConfig {
    /// Load configuration from environment variables.
    ///
    /// Expected variables:
    /// - WAREHOUSE_URL: SQL gateway base URL (required)
    /// - WAREHOUSE_USERNAME / WAREHOUSE_PASSWORD: basic auth (optional)
    /// - WAREHOUSE_TOKEN: bearer token (optional, wins over basic)
    /// - WAREHOUSE_REGION: object-storage region for the bulk copy (required)
    /// - IAM_ROLE_ARN: role authorizing the copy to read object storage (required)
    /// - LOG_DATA: object-storage prefix of the event logs (required)
    /// - LOG_JSONPATH: URI of the event jsonpaths mapping document (required)
    /// - SONG_DATA: object-storage prefix of the song catalog (required)
    pub fn from_env() -> Result<Self> {
        let url_str =
            std::env::var("WAREHOUSE_URL").context("WAREHOUSE_URL environment variable not set")?;
        let warehouse_url =
            Url::parse(&url_str).with_context(|| format!("Invalid WAREHOUSE_URL: {}", url_str))?;

        let auth = if let Ok(token) = std::env::var("WAREHOUSE_TOKEN") {
            Auth::Bearer(token)
        } else if let (Ok(username), Ok(password)) = (
            std::env::var("WAREHOUSE_USERNAME"),
            std::env::var("WAREHOUSE_PASSWORD"),
        ) {
            Auth::Basic(username, password)
        } else {
            Auth::None
        };

        Ok(Self {
            warehouse_url,
            auth,
            region: std::env::var("WAREHOUSE_REGION")
                .context("WAREHOUSE_REGION environment variable not set")?,
            iam_role: std::env::var("IAM_ROLE_ARN")
                .context("IAM_ROLE_ARN environment variable not set")?,
            log_data: std::env::var("LOG_DATA")
                .context("LOG_DATA environment variable not set")?,
            log_jsonpath: std::env::var("LOG_JSONPATH")
                .context("LOG_JSONPATH environment variable not set")?,
            song_data: std::env::var("SONG_DATA")
                .context("SONG_DATA environment variable not set")?,
        })
    }

    /// Region and credential for the bulk copy.
    pub fn copy_config(&self) -> CopyConfig {
        CopyConfig {
            region: self.region.clone(),
            iam_role: self.iam_role.clone(),
        }
    }

    /// The two staging sources: events with their explicit field mapping,
    /// songs with automatic inference.
    pub fn sources(&self) -> Vec<StagingSource> {
        vec![
            StagingSource {
                table: schema::STAGING_EVENTS,
                uri: self.log_data.clone(),
                format: JsonFormat::Paths(self.log_jsonpath.clone()),
            },
            StagingSource {
                table: schema::STAGING_SONGS,
                uri: self.song_data.clone(),
                format: JsonFormat::Auto,
            },
        ]
    }
}
