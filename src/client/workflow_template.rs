use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ClientError, HttpClient};

/// A Mayan workflow template.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    #[serde(default)]
    pub id: i64,
    pub label: String,
    pub internal_name: String,
}

/// A state within a workflow template.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkflowTemplateState {
    #[serde(default)]
    pub id: i64,
    pub label: String,
    pub completion: i64,
    #[serde(default)]
    pub initial: bool,
}

/// The part of a nested state object a transition cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct StateRef {
    pub id: i64,
}

/// A transition between two states of the same workflow template.
///
/// The server answers with nested state objects but expects plain
/// `*_state_id` fields on write.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct WorkflowTemplateTransition {
    #[serde(default)]
    pub id: i64,
    pub label: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub condition: String,
    pub origin_state: StateRef,
    pub destination_state: StateRef,
}

#[derive(Serialize)]
struct TransitionRequest<'a> {
    label: &'a str,
    condition: &'a str,
    origin_state_id: i64,
    destination_state_id: i64,
}

impl<'a> From<&'a WorkflowTemplateTransition> for TransitionRequest<'a> {
    fn from(transition: &'a WorkflowTemplateTransition) -> Self {
        Self {
            label: &transition.label,
            condition: &transition.condition,
            origin_state_id: transition.origin_state.id,
            destination_state_id: transition.destination_state.id,
        }
    }
}

/// Workflow template endpoints, the document type edge, states and
/// transitions.
#[async_trait]
pub trait WorkflowTemplateApi: Send + Sync {
    async fn create_workflow_template(
        &self,
        template: &WorkflowTemplate,
    ) -> Result<WorkflowTemplate, ClientError>;
    async fn get_workflow_template(&self, id: i64) -> Result<WorkflowTemplate, ClientError>;
    async fn update_workflow_template(
        &self,
        template: &WorkflowTemplate,
    ) -> Result<WorkflowTemplate, ClientError>;
    async fn delete_workflow_template(&self, id: i64) -> Result<(), ClientError>;

    async fn workflow_template_document_types(
        &self,
        workflow_id: i64,
    ) -> Result<Vec<i64>, ClientError>;
    async fn add_workflow_template_document_type(
        &self,
        workflow_id: i64,
        document_type_id: i64,
    ) -> Result<(), ClientError>;
    async fn remove_workflow_template_document_type(
        &self,
        workflow_id: i64,
        document_type_id: i64,
    ) -> Result<(), ClientError>;

    async fn create_workflow_template_state(
        &self,
        workflow_id: i64,
        state: &WorkflowTemplateState,
    ) -> Result<WorkflowTemplateState, ClientError>;
    async fn get_workflow_template_state(
        &self,
        workflow_id: i64,
        state_id: i64,
    ) -> Result<WorkflowTemplateState, ClientError>;
    async fn update_workflow_template_state(
        &self,
        workflow_id: i64,
        state: &WorkflowTemplateState,
    ) -> Result<WorkflowTemplateState, ClientError>;
    async fn delete_workflow_template_state(
        &self,
        workflow_id: i64,
        state_id: i64,
    ) -> Result<(), ClientError>;

    async fn create_workflow_template_transition(
        &self,
        workflow_id: i64,
        transition: &WorkflowTemplateTransition,
    ) -> Result<WorkflowTemplateTransition, ClientError>;
    async fn get_workflow_template_transition(
        &self,
        workflow_id: i64,
        transition_id: i64,
    ) -> Result<WorkflowTemplateTransition, ClientError>;
    async fn update_workflow_template_transition(
        &self,
        workflow_id: i64,
        transition: &WorkflowTemplateTransition,
    ) -> Result<WorkflowTemplateTransition, ClientError>;
    async fn delete_workflow_template_transition(
        &self,
        workflow_id: i64,
        transition_id: i64,
    ) -> Result<(), ClientError>;
}

#[async_trait]
impl WorkflowTemplateApi for HttpClient {
    async fn create_workflow_template(
        &self,
        template: &WorkflowTemplate,
    ) -> Result<WorkflowTemplate, ClientError> {
        self.post("workflow_templates/", template).await
    }

    async fn get_workflow_template(&self, id: i64) -> Result<WorkflowTemplate, ClientError> {
        self.get(&format!("workflow_templates/{}/", id)).await
    }

    async fn update_workflow_template(
        &self,
        template: &WorkflowTemplate,
    ) -> Result<WorkflowTemplate, ClientError> {
        self.put(&format!("workflow_templates/{}/", template.id), template)
            .await
    }

    async fn delete_workflow_template(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("workflow_templates/{}/", id)).await
    }

    async fn workflow_template_document_types(
        &self,
        workflow_id: i64,
    ) -> Result<Vec<i64>, ClientError> {
        self.edge_ids(&format!("workflow_templates/{}/document_types/", workflow_id))
            .await
    }

    async fn add_workflow_template_document_type(
        &self,
        workflow_id: i64,
        document_type_id: i64,
    ) -> Result<(), ClientError> {
        self.post_action(
            &format!("workflow_templates/{}/document_types/add/", workflow_id),
            &json!({ "document_type_id": document_type_id }),
        )
        .await
    }

    async fn remove_workflow_template_document_type(
        &self,
        workflow_id: i64,
        document_type_id: i64,
    ) -> Result<(), ClientError> {
        self.post_action(
            &format!("workflow_templates/{}/document_types/remove/", workflow_id),
            &json!({ "document_type_id": document_type_id }),
        )
        .await
    }

    async fn create_workflow_template_state(
        &self,
        workflow_id: i64,
        state: &WorkflowTemplateState,
    ) -> Result<WorkflowTemplateState, ClientError> {
        self.post(&format!("workflow_templates/{}/states/", workflow_id), state)
            .await
    }

    async fn get_workflow_template_state(
        &self,
        workflow_id: i64,
        state_id: i64,
    ) -> Result<WorkflowTemplateState, ClientError> {
        self.get(&format!(
            "workflow_templates/{}/states/{}/",
            workflow_id, state_id
        ))
        .await
    }

    async fn update_workflow_template_state(
        &self,
        workflow_id: i64,
        state: &WorkflowTemplateState,
    ) -> Result<WorkflowTemplateState, ClientError> {
        self.put(
            &format!("workflow_templates/{}/states/{}/", workflow_id, state.id),
            state,
        )
        .await
    }

    async fn delete_workflow_template_state(
        &self,
        workflow_id: i64,
        state_id: i64,
    ) -> Result<(), ClientError> {
        self.delete(&format!(
            "workflow_templates/{}/states/{}/",
            workflow_id, state_id
        ))
        .await
    }

    async fn create_workflow_template_transition(
        &self,
        workflow_id: i64,
        transition: &WorkflowTemplateTransition,
    ) -> Result<WorkflowTemplateTransition, ClientError> {
        self.post(
            &format!("workflow_templates/{}/transitions/", workflow_id),
            &TransitionRequest::from(transition),
        )
        .await
    }

    async fn get_workflow_template_transition(
        &self,
        workflow_id: i64,
        transition_id: i64,
    ) -> Result<WorkflowTemplateTransition, ClientError> {
        self.get(&format!(
            "workflow_templates/{}/transitions/{}/",
            workflow_id, transition_id
        ))
        .await
    }

    async fn update_workflow_template_transition(
        &self,
        workflow_id: i64,
        transition: &WorkflowTemplateTransition,
    ) -> Result<WorkflowTemplateTransition, ClientError> {
        self.put(
            &format!(
                "workflow_templates/{}/transitions/{}/",
                workflow_id, transition.id
            ),
            &TransitionRequest::from(transition),
        )
        .await
    }

    async fn delete_workflow_template_transition(
        &self,
        workflow_id: i64,
        transition_id: i64,
    ) -> Result<(), ClientError> {
        self.delete(&format!(
            "workflow_templates/{}/transitions/{}/",
            workflow_id, transition_id
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_request_flattens_state_refs() {
        let transition = WorkflowTemplateTransition {
            id: 4,
            label: "Approve".into(),
            condition: String::new(),
            origin_state: StateRef { id: 10 },
            destination_state: StateRef { id: 11 },
        };

        let body = serde_json::to_value(TransitionRequest::from(&transition)).unwrap();
        assert_eq!(
            body,
            json!({
                "label": "Approve",
                "condition": "",
                "origin_state_id": 10,
                "destination_state_id": 11
            })
        );
    }

    #[test]
    fn test_transition_decodes_nested_states() {
        let transition: WorkflowTemplateTransition = serde_json::from_value(json!({
            "id": 4,
            "label": "Approve",
            "condition": "",
            "origin_state": {"id": 10, "label": "Draft", "completion": 0, "initial": true},
            "destination_state": {
                "id": 11,
                "label": "Approved",
                "completion": 100,
                "initial": false
            }
        }))
        .unwrap();

        assert_eq!(transition.origin_state.id, 10);
        assert_eq!(transition.destination_state.id, 11);
    }
}
