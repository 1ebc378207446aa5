//! Resource and data source handlers.
//!
//! Each handler maps one resource kind onto [`MayanClient`] calls. Handlers
//! hold no state; the client and the instance's [`ResourceData`] are passed
//! into every operation. The [`Registry`] built by [`registry`] is the only
//! place names are bound to handlers.

mod document_type;
mod group;
mod index_template;
mod index_template_node;
mod metadata_type;
mod role;
mod source;
mod tag;
mod workflow_template;
mod workflow_template_state;
mod workflow_template_transition;

pub use document_type::{DocumentTypeDataSource, DocumentTypeResource};
pub use group::GroupResource;
pub use index_template::IndexTemplateResource;
pub use index_template_node::IndexTemplateNodeResource;
pub use metadata_type::{MetadataTypeDataSource, MetadataTypeResource};
pub use role::RoleResource;
pub use source::{SourceBackend, SourceResource, Uncompress};
pub use tag::TagResource;
pub use workflow_template::WorkflowTemplateResource;
pub use workflow_template_state::WorkflowTemplateStateResource;
pub use workflow_template_transition::WorkflowTemplateTransitionResource;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::client::MayanClient;
use crate::error::ProviderError;
use crate::schema::{Attribute, ProviderSchema, Schema};
use crate::state::{ResourceData, ID_KEY};

/// A managed resource kind.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Name the host uses, e.g. `mayanedms_tag`.
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Create the object, store its identifier in `data`, then refresh
    /// `data` from the server.
    async fn create(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError>;

    /// Refresh `data` from the server. Fails if the object is gone.
    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError>;

    /// Send the whole object back to the server, then refresh `data`.
    async fn update(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError>;

    /// Remove the object and clear the identifier in `data`.
    async fn delete(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError>;

    /// Build state for an existing object from its identifier alone.
    async fn import(
        &self,
        client: &dyn MayanClient,
        id: &str,
    ) -> Result<ResourceData, ProviderError> {
        let mut data = ResourceData::new();
        data.set_id(id);
        self.read(client, &mut data).await?;
        Ok(data)
    }
}

/// A read-only lookup.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Resolve the lookup keys in `data` and fill in everything else.
    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError>;
}

/// Handlers by type name.
#[derive(Default)]
pub struct Registry {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Box<dyn DataSource>>,
}

impl Registry {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_resource(&mut self, resource: impl Resource + 'static) -> &mut Self {
        self.resources.insert(resource.type_name(), Box::new(resource));
        self
    }

    pub fn register_data_source(&mut self, data_source: impl DataSource + 'static) -> &mut Self {
        self.data_sources
            .insert(data_source.type_name(), Box::new(data_source));
        self
    }

    pub fn resource(&self, type_name: &str) -> Result<&dyn Resource, ProviderError> {
        self.resources
            .get(type_name)
            .map(|r| r.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    pub fn data_source(&self, type_name: &str) -> Result<&dyn DataSource, ProviderError> {
        self.data_sources
            .get(type_name)
            .map(|d| d.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    pub fn resource_names(&self) -> Vec<String> {
        self.resources.keys().map(|k| k.to_string()).collect()
    }

    pub fn data_source_names(&self) -> Vec<String> {
        self.data_sources.keys().map(|k| k.to_string()).collect()
    }

    /// Combine every registered schema with the provider block's.
    pub fn provider_schema(&self, provider: Schema) -> ProviderSchema {
        let mut schema = ProviderSchema::new().with_provider_config(provider);
        for (name, resource) in &self.resources {
            schema = schema.with_resource(*name, resource.schema());
        }
        for (name, data_source) in &self.data_sources {
            schema = schema.with_data_source(*name, data_source.schema());
        }
        schema
    }
}

/// The table of every resource and data source this provider serves.
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_resource(DocumentTypeResource)
        .register_resource(SourceResource::new(SourceBackend::WebForm))
        .register_resource(SourceResource::new(SourceBackend::WatchFolder))
        .register_resource(SourceResource::new(SourceBackend::StagingFolder))
        .register_resource(TagResource)
        .register_resource(IndexTemplateResource)
        .register_resource(IndexTemplateNodeResource)
        .register_resource(GroupResource)
        .register_resource(RoleResource)
        .register_resource(WorkflowTemplateResource)
        .register_resource(WorkflowTemplateStateResource)
        .register_resource(WorkflowTemplateTransitionResource)
        .register_resource(MetadataTypeResource)
        .register_data_source(DocumentTypeDataSource)
        .register_data_source(MetadataTypeDataSource);
    registry
}

/// Every resource schema starts from the computed identifier.
fn base_schema() -> Schema {
    Schema::v0().with_attribute(
        ID_KEY,
        Attribute::computed_string().with_description("Identifier assigned by Mayan EDMS"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names() {
        let registry = registry();
        assert_eq!(
            registry.resource_names(),
            vec![
                "mayanedms_document_type",
                "mayanedms_group",
                "mayanedms_index_template",
                "mayanedms_index_template_node",
                "mayanedms_metadata_type",
                "mayanedms_role",
                "mayanedms_stagingfolder_source",
                "mayanedms_tag",
                "mayanedms_watchfolder_source",
                "mayanedms_webform_source",
                "mayanedms_workflow_template",
                "mayanedms_workflow_template_state",
                "mayanedms_workflow_template_transition",
            ]
        );
        assert_eq!(
            registry.data_source_names(),
            vec!["mayanedms_document_type", "mayanedms_metadata_type"]
        );
    }

    #[test]
    fn test_unknown_type() {
        let registry = registry();
        assert!(matches!(
            registry.resource("mayanedms_cabinet"),
            Err(ProviderError::UnknownResource(_))
        ));
        assert!(matches!(
            registry.data_source("mayanedms_tag"),
            Err(ProviderError::UnknownResource(_))
        ));
    }

    #[test]
    fn test_every_resource_schema_has_computed_id() {
        let schema = registry().provider_schema(Schema::v0());
        for (name, resource) in &schema.resources {
            let id = resource
                .attribute(ID_KEY)
                .unwrap_or_else(|| panic!("{name} has no id"));
            assert!(id.flags.computed, "{name}");
        }
    }
}
