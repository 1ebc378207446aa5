use async_trait::async_trait;
use tracing::info;

use super::{base_schema, Resource};
use crate::client::{MayanClient, WorkflowTemplateState};
use crate::composite_id::CompositeId;
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;

/// `mayanedms_workflow_template_state`, identified as `<workflow>-<state>`.
pub struct WorkflowTemplateStateResource;

fn to_record(data: &ResourceData, id: i64) -> Result<WorkflowTemplateState, ProviderError> {
    Ok(WorkflowTemplateState {
        id,
        label: data.get_str("label")?,
        completion: data.get_i64("completion")?,
        initial: data.get_bool_or("initial", false)?,
    })
}

#[async_trait]
impl Resource for WorkflowTemplateStateResource {
    fn type_name(&self) -> &'static str {
        "mayanedms_workflow_template_state"
    }

    fn schema(&self) -> Schema {
        base_schema()
            .with_attribute(
                "workflow_template",
                Attribute::required_int64()
                    .with_force_new()
                    .with_description("Id of the owning workflow template"),
            )
            .with_attribute("label", Attribute::required_string())
            .with_attribute(
                "completion",
                Attribute::required_int64()
                    .with_description("Percentage of the workflow completed in this state"),
            )
            .with_attribute("initial", Attribute::optional_bool().with_default(false))
    }

    async fn create(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let workflow_id = data.get_i64("workflow_template")?;
        let created = client
            .create_workflow_template_state(workflow_id, &to_record(data, 0)?)
            .await?;
        let id = CompositeId::new(workflow_id, created.id);
        data.set_id(id);
        info!(resource = self.type_name(), id = %id, "Created workflow template state");
        self.read(client, data).await
    }

    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.composite_id()?;
        let state = client
            .get_workflow_template_state(id.parent, id.child)
            .await?;
        data.set("workflow_template", id.parent);
        data.set("label", state.label);
        data.set("completion", state.completion);
        data.set("initial", state.initial);
        Ok(())
    }

    async fn update(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.composite_id()?;
        client
            .update_workflow_template_state(id.parent, &to_record(data, id.child)?)
            .await?;
        info!(resource = self.type_name(), id = %id, "Updated workflow template state");
        self.read(client, data).await
    }

    async fn delete(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.composite_id()?;
        client
            .delete_workflow_template_state(id.parent, id.child)
            .await?;
        info!(resource = self.type_name(), id = %id, "Deleted workflow template state");
        data.clear_id();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{WorkflowTemplate, WorkflowTemplateApi};
    use crate::testing::FakeMayan;
    use serde_json::json;

    async fn workflow(fake: &FakeMayan) -> i64 {
        fake.create_workflow_template(&WorkflowTemplate {
            label: "Review".into(),
            internal_name: "review".into(),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_create_uses_composite_id() {
        let fake = FakeMayan::new();
        let workflow_id = workflow(&fake).await;

        let mut data = ResourceData::from_state(json!({
            "workflow_template": workflow_id,
            "label": "Draft",
            "completion": 0
        }))
        .unwrap();
        WorkflowTemplateStateResource
            .create(&fake, &mut data)
            .await
            .unwrap();

        assert_eq!(data.id(), Some("1-2"));
        assert!(!data.get_bool("initial").unwrap());
    }

    #[tokio::test]
    async fn test_import_restores_parent() {
        let fake = FakeMayan::new();
        let workflow_id = workflow(&fake).await;
        fake.create_workflow_template_state(
            workflow_id,
            &WorkflowTemplateState {
                label: "Approved".into(),
                completion: 100,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let data = WorkflowTemplateStateResource
            .import(&fake, "1-2")
            .await
            .unwrap();
        assert_eq!(data.get_i64("workflow_template").unwrap(), 1);
        assert_eq!(data.get_i64("completion").unwrap(), 100);

        for bad in ["2", "abc-2", "1-2-3"] {
            assert!(matches!(
                WorkflowTemplateStateResource.import(&fake, bad).await,
                Err(ProviderError::InvalidId(_))
            ));
        }
    }
}
