//! Project discovery through the compute metadata server.

use crate::error::MetadataError;
use axum::async_trait;
use clap::ValueEnum;
use reqwest::Url;
use tracing::debug;

pub const METADATA_FLAVOR: &str = "metadata-flavor";
const GOOGLE: &str = "Google";

/// How to decide whether the metadata server exists.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Detection {
    /// Probe the server once per availability check.
    Ping,
    AssumePresent,
    /// Never use the metadata server.
    #[value(name = "none")]
    Disabled,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProjectKey {
    NumericProjectId,
    ProjectId,
}

impl ProjectKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKey::NumericProjectId => "numeric-project-id",
            ProjectKey::ProjectId => "project-id",
        }
    }
}

#[async_trait]
pub trait ProjectMetadata: Send + Sync {
    /// Unreachable servers are reported as unavailable, never as errors.
    async fn is_available(&self) -> bool;

    async fn project(&self, key: ProjectKey) -> Result<String, MetadataError>;
}

/// Build the `computeMetadata/v1/` base for a metadata host.
pub fn base_url(host: &str) -> Result<Url, anyhow::Error> {
    format!("http://{}/computeMetadata/v1/", host)
        .parse()
        .map_err(anyhow::Error::msg)
}

pub struct MetadataServer {
    client: reqwest::Client,
    base: Url,
    detection: Detection,
}

impl MetadataServer {
    pub fn new(client: reqwest::Client, base: Url, detection: Detection) -> Self {
        MetadataServer {
            client,
            base,
            detection,
        }
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, MetadataError> {
        let url = self
            .base
            .join(path)
            .map_err(|err| MetadataError::Request(err.to_string()))?;

        let response = self
            .client
            .get(url)
            .header(METADATA_FLAVOR, GOOGLE)
            .send()
            .await?;

        if response
            .headers()
            .get(METADATA_FLAVOR)
            .map_or(true, |flavor| flavor != GOOGLE)
        {
            return Err(MetadataError::NotMetadataServer);
        }
        if !response.status().is_success() {
            return Err(MetadataError::Status(response.status().as_u16()));
        }

        Ok(response)
    }
}

#[async_trait]
impl ProjectMetadata for MetadataServer {
    async fn is_available(&self) -> bool {
        match self.detection {
            Detection::AssumePresent => true,
            Detection::Disabled => false,
            Detection::Ping => match self.get("instance").await {
                Ok(_) => true,
                Err(err) => {
                    debug!("Metadata server unavailable: {}", err);
                    false
                }
            },
        }
    }

    async fn project(&self, key: ProjectKey) -> Result<String, MetadataError> {
        let body = self
            .get(&format!("project/{}", key.as_str()))
            .await?
            .text()
            .await?;

        Ok(body.trim().to_owned())
    }
}
