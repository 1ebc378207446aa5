use async_trait::async_trait;
use tracing::info;

use super::{base_schema, Resource};
use crate::client::{MayanClient, WorkflowTemplate};
use crate::error::ProviderError;
use crate::reconcile::{apply_set_diff, SetDiff};
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;

/// `mayanedms_workflow_template`, with the document types it applies to.
pub struct WorkflowTemplateResource;

impl WorkflowTemplateResource {
    fn to_record(data: &ResourceData, id: i64) -> Result<WorkflowTemplate, ProviderError> {
        Ok(WorkflowTemplate {
            id,
            label: data.get_str("label")?,
            internal_name: data.get_str("internal_name")?,
        })
    }

    async fn sync_document_types(
        client: &dyn MayanClient,
        workflow_id: i64,
        diff: &SetDiff<i64>,
    ) -> Result<(), ProviderError> {
        apply_set_diff(
            "workflow_template.document_types",
            diff,
            |document_type| {
                client.remove_workflow_template_document_type(workflow_id, *document_type)
            },
            |document_type| client.add_workflow_template_document_type(workflow_id, *document_type),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for WorkflowTemplateResource {
    fn type_name(&self) -> &'static str {
        "mayanedms_workflow_template"
    }

    fn schema(&self) -> Schema {
        base_schema()
            .with_attribute("label", Attribute::required_string())
            .with_attribute(
                "internal_name",
                Attribute::required_string()
                    .with_description("Name used to reference the workflow from templates"),
            )
            .with_attribute("document_types", Attribute::optional_int_set())
    }

    async fn create(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let created = client
            .create_workflow_template(&Self::to_record(data, 0)?)
            .await?;
        data.set_id(created.id);
        info!(resource = self.type_name(), id = created.id, "Created workflow template");

        let document_types = SetDiff::additions(data.get_int_set("document_types")?);
        Self::sync_document_types(client, created.id, &document_types).await?;
        self.read(client, data).await
    }

    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let workflow = client.get_workflow_template(data.numeric_id()?).await?;
        let document_types = client.workflow_template_document_types(workflow.id).await?;
        data.set_id(workflow.id);
        data.set("label", workflow.label);
        data.set("internal_name", workflow.internal_name);
        data.set_int_set("document_types", document_types);
        Ok(())
    }

    async fn update(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let record = Self::to_record(data, data.numeric_id()?)?;
        client.update_workflow_template(&record).await?;

        let document_types = data.int_set_change("document_types")?;
        Self::sync_document_types(client, record.id, &document_types).await?;
        info!(resource = self.type_name(), id = record.id, "Updated workflow template");
        self.read(client, data).await
    }

    async fn delete(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.numeric_id()?;
        client.delete_workflow_template(id).await?;
        info!(resource = self.type_name(), id, "Deleted workflow template");
        data.clear_id();
        Ok(())
    }
}
