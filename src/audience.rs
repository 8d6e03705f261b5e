use crate::{
    error::MetadataError,
    metadata::{ProjectKey, ProjectMetadata},
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Expected `aud` of assertions addressed to this deployment.
///
/// Once resolved the value is kept for the lifetime of the process. An
/// environment without a metadata server leaves it unset, and the next
/// call asks again.
pub struct AudienceResolver {
    metadata: Arc<dyn ProjectMetadata>,
    audience: OnceCell<String>,
}

impl AudienceResolver {
    pub fn new(metadata: Arc<dyn ProjectMetadata>) -> Self {
        Self {
            metadata,
            audience: OnceCell::new(),
        }
    }

    pub async fn resolve(&self) -> Result<Option<&str>, MetadataError> {
        if let Some(audience) = self.audience.get() {
            return Ok(Some(audience.as_str()));
        }

        if !self.metadata.is_available().await {
            debug!("Metadata server unavailable, audience left unset");
            return Ok(None);
        }

        let audience = self
            .audience
            .get_or_try_init(|| async {
                let project_number = self.metadata.project(ProjectKey::NumericProjectId).await?;
                let project_id = self.metadata.project(ProjectKey::ProjectId).await?;
                let audience = format!("/projects/{}/apps/{}", project_number, project_id);

                info!(%audience, "Resolved expected audience");
                Ok::<_, MetadataError>(audience)
            })
            .await?;

        Ok(Some(audience.as_str()))
    }
}
