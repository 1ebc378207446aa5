//! The Mayan EDMS provider: host operations routed to resource handlers.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::client::{HttpClient, MayanClient};
use crate::config::{self, ProviderConfig};
use crate::error::ProviderError;
use crate::plan;
use crate::resources::{self, Registry};
use crate::schema::{has_errors, Diagnostic, ProviderSchema};
use crate::server::ProviderService;
use crate::state::ResourceData;
use crate::types::{ImportedResource, PlanResult};
use crate::validation;

/// Serves every Mayan EDMS resource and data source.
///
/// Resource operations need a client, which `configure` creates by logging
/// in. Until then they fail with [`ProviderError::NotConfigured`].
pub struct MayanEdmsProvider {
    registry: Registry,
    client: RwLock<Option<Arc<dyn MayanClient>>>,
}

impl MayanEdmsProvider {
    pub fn new() -> Self {
        Self {
            registry: resources::registry(),
            client: RwLock::new(None),
        }
    }

    /// A provider that is already configured with `client`.
    pub fn with_client(client: Arc<dyn MayanClient>) -> Self {
        Self {
            registry: resources::registry(),
            client: RwLock::new(Some(client)),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    async fn client(&self) -> Result<Arc<dyn MayanClient>, ProviderError> {
        self.client.read().await.clone().ok_or_else(|| {
            ProviderError::NotConfigured(
                "configure must succeed before resources are managed".into(),
            )
        })
    }
}

impl Default for MayanEdmsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderService for MayanEdmsProvider {
    fn schema(&self) -> ProviderSchema {
        self.registry.provider_schema(config::schema())
    }

    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validation::validate(&config::schema(), &config))
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let mut diagnostics = validation::validate(&config::schema(), &config);
        if has_errors(&diagnostics) {
            return Ok(diagnostics);
        }

        let settings = match ProviderConfig::from_value(config)?.with_env_fallbacks().resolve() {
            Ok(settings) => settings,
            Err(missing) => {
                diagnostics.extend(missing);
                return Ok(diagnostics);
            }
        };

        match HttpClient::connect(&settings).await {
            Ok(client) => {
                *self.client.write().await = Some(Arc::new(client));
                info!(url = %settings.url, insecure = settings.insecure, "Provider configured");
            }
            Err(e) => {
                warn!(url = %settings.url, error = %e, "Login failed");
                diagnostics.push(
                    Diagnostic::error("Unable to log in to Mayan EDMS").with_detail(e.to_string()),
                );
            }
        }
        Ok(diagnostics)
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        self.client.write().await.take();
        debug!("Dropped API client");
        Ok(())
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let resource = self.registry.resource(resource_type)?;
        Ok(validation::validate(&resource.schema(), &config))
    }

    async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        let current = self.registry.resource(resource_type)?.schema().version;
        if version < 0 || version as u64 > current {
            return Err(ProviderError::Validation(format!(
                "cannot upgrade {} state from schema version {} (current is {})",
                resource_type, version, current
            )));
        }
        Ok(state)
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let schema = self.registry.resource(resource_type)?.schema();
        plan::plan(&schema, prior_state.as_ref(), &proposed_state)
    }

    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.registry.resource(resource_type)?;
        let client = self.client().await?;
        let mut data = ResourceData::from_state(planned_state)?;
        data.clear_id();

        let result = resource.create(client.as_ref(), &mut data).await;
        match result {
            Ok(()) => Ok(data.into_state()),
            // Handlers record the id as soon as the POST succeeds.
            Err(e) if data.id().is_some() => {
                warn!(
                    resource_type,
                    id = data.id(),
                    error = %e,
                    "Create failed after the object was created"
                );
                Err(ProviderError::PartiallyCreated {
                    state: Box::new(data.into_state()),
                    source: Box::new(e),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.registry.resource(resource_type)?;
        let client = self.client().await?;
        let mut data = ResourceData::from_state(current_state)?;
        resource.read(client.as_ref(), &mut data).await?;
        Ok(data.into_state())
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.registry.resource(resource_type)?;
        let client = self.client().await?;
        let mut data = ResourceData::with_prior(planned_state, prior_state)?;
        resource.update(client.as_ref(), &mut data).await?;
        Ok(data.into_state())
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let resource = self.registry.resource(resource_type)?;
        let client = self.client().await?;
        let mut data = ResourceData::from_state(current_state)?;
        resource.delete(client.as_ref(), &mut data).await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.registry.resource(resource_type)?;
        let client = self.client().await?;
        let data = resource.import(client.as_ref(), id).await?;
        Ok(vec![ImportedResource::new(resource_type, data.into_state())])
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let data_source = self.registry.data_source(data_source_type)?;
        Ok(validation::validate(&data_source.schema(), &config))
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let data_source = self.registry.data_source(data_source_type)?;
        let client = self.client().await?;
        let mut data = ResourceData::from_state(config)?;
        data_source.read(client.as_ref(), &mut data).await?;
        Ok(data.into_state())
    }
}
