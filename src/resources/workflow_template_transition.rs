use async_trait::async_trait;
use tracing::info;

use super::{base_schema, Resource};
use crate::client::{MayanClient, StateRef, WorkflowTemplateTransition};
use crate::composite_id::CompositeId;
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;

/// `mayanedms_workflow_template_transition`, identified as
/// `<workflow>-<transition>`.
///
/// `origin_state` and `destination_state` hold state resource ids
/// (`<workflow>-<state>`), and both must belong to `workflow_template`.
pub struct WorkflowTemplateTransitionResource;

fn state_ref(data: &ResourceData, key: &str, workflow_id: i64) -> Result<StateRef, ProviderError> {
    let state: CompositeId = data.get_str(key)?.parse()?;
    if state.parent != workflow_id {
        return Err(ProviderError::Validation(format!(
            "{} '{}' belongs to workflow template {}, not {}",
            key, state, state.parent, workflow_id
        )));
    }
    Ok(StateRef { id: state.child })
}

fn to_record(
    data: &ResourceData,
    workflow_id: i64,
    id: i64,
) -> Result<WorkflowTemplateTransition, ProviderError> {
    Ok(WorkflowTemplateTransition {
        id,
        label: data.get_str("label")?,
        condition: data.get_str_or("condition", "")?,
        origin_state: state_ref(data, "origin_state", workflow_id)?,
        destination_state: state_ref(data, "destination_state", workflow_id)?,
    })
}

#[async_trait]
impl Resource for WorkflowTemplateTransitionResource {
    fn type_name(&self) -> &'static str {
        "mayanedms_workflow_template_transition"
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
                "condition",
                Attribute::optional_string()
                    .with_default("")
                    .with_description("Template expression gating the transition"),
            )
            .with_attribute("origin_state", Attribute::required_string())
            .with_attribute("destination_state", Attribute::required_string())
    }

    async fn create(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let workflow_id = data.get_i64("workflow_template")?;
        let record = to_record(data, workflow_id, 0)?;
        let created = client
            .create_workflow_template_transition(workflow_id, &record)
            .await?;
        let id = CompositeId::new(workflow_id, created.id);
        data.set_id(id);
        info!(resource = self.type_name(), id = %id, "Created workflow template transition");
        self.read(client, data).await
    }

    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.composite_id()?;
        let transition = client
            .get_workflow_template_transition(id.parent, id.child)
            .await?;
        data.set("workflow_template", id.parent);
        data.set("label", transition.label);
        data.set("condition", transition.condition);
        data.set(
            "origin_state",
            CompositeId::new(id.parent, transition.origin_state.id).to_string(),
        );
        data.set(
            "destination_state",
            CompositeId::new(id.parent, transition.destination_state.id).to_string(),
        );
        Ok(())
    }

    async fn update(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.composite_id()?;
        let record = to_record(data, id.parent, id.child)?;
        client
            .update_workflow_template_transition(id.parent, &record)
            .await?;
        info!(resource = self.type_name(), id = %id, "Updated workflow template transition");
        self.read(client, data).await
    }

    async fn delete(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.composite_id()?;
        client
            .delete_workflow_template_transition(id.parent, id.child)
            .await?;
        info!(resource = self.type_name(), id = %id, "Deleted workflow template transition");
        data.clear_id();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{WorkflowTemplate, WorkflowTemplateApi, WorkflowTemplateState};
    use crate::testing::FakeMayan;
    use serde_json::json;

    /// A workflow (id 1) with states 2 and 3.
    async fn workflow_with_states(fake: &FakeMayan) {
        fake.create_workflow_template(&WorkflowTemplate {
            label: "Review".into(),
            internal_name: "review".into(),
            ..Default::default()
        })
        .await
        .unwrap();
        for label in ["Draft", "Approved"] {
            fake.create_workflow_template_state(
                1,
                &WorkflowTemplateState {
                    label: label.into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn test_create_and_read_back_state_ids() {
        let fake = FakeMayan::new();
        workflow_with_states(&fake).await;

        let mut data = ResourceData::from_state(json!({
            "workflow_template": 1,
            "label": "Approve",
            "origin_state": "1-2",
            "destination_state": "1-3"
        }))
        .unwrap();
        WorkflowTemplateTransitionResource
            .create(&fake, &mut data)
            .await
            .unwrap();

        let stored = fake.get_workflow_template_transition(1, 4).await.unwrap();
        assert_eq!(stored.origin_state.id, 2);
        assert_eq!(stored.destination_state.id, 3);

        let state = data.into_state();
        assert_eq!(state["id"], json!("1-4"));
        assert_eq!(state["origin_state"], json!("1-2"));
        assert_eq!(state["destination_state"], json!("1-3"));
        assert_eq!(state["condition"], json!(""));
    }

    #[tokio::test]
    async fn test_state_from_other_workflow_rejected() {
        let fake = FakeMayan::new();
        workflow_with_states(&fake).await;

        let mut data = ResourceData::from_state(json!({
            "workflow_template": 1,
            "label": "Approve",
            "origin_state": "9-2",
            "destination_state": "1-3"
        }))
        .unwrap();
        let err = WorkflowTemplateTransitionResource
            .create(&fake, &mut data)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
        assert!(!fake.calls().iter().any(|c| c.starts_with("create_workflow_template_transition")));
    }

    #[tokio::test]
    async fn test_malformed_state_reference() {
        let fake = FakeMayan::new();
        let mut data = ResourceData::from_state(json!({
            "workflow_template": 1,
            "label": "Approve",
            "origin_state": "2",
            "destination_state": "1-3"
        }))
        .unwrap();
        let err = WorkflowTemplateTransitionResource
            .create(&fake, &mut data)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidId(_)));
    }
}
