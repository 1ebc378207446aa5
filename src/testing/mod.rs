//! Test support: a harness that drives a [`ProviderService`] directly and an
//! in-memory Mayan EDMS server to point it at.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mayanedms_provider::testing::{FakeMayan, ProviderTester};
//! use mayanedms_provider::MayanEdmsProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_tag() {
//!     let fake = Arc::new(FakeMayan::new());
//!     let tester = ProviderTester::new(MayanEdmsProvider::with_client(fake.clone()));
//!
//!     let state = tester
//!         .lifecycle_create("mayanedms_tag", json!({"label": "urgent", "color": "#ff0000"}))
//!         .await
//!         .unwrap();
//!     assert_eq!(state["id"], "1");
//! }
//! ```

mod fake;

pub use fake::FakeMayan;

use serde_json::Value;

use crate::error::ProviderError;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::server::ProviderService;
use crate::types::{ImportedResource, PlanResult};

/// Drives a provider the way the host would, minus gRPC.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    /// Fails with the error diagnostics, if any.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        check_diagnostics(self.provider.validate_provider_config(config).await?)
    }

    /// Fails with the error diagnostics, if any.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        check_diagnostics(self.provider.configure(config).await?)
    }

    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        check_diagnostics(
            self.provider
                .validate_resource_config(resource_type, config)
                .await?,
        )
    }

    pub async fn plan_create(
        &self,
        resource_type: &str,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, proposed_state.clone(), proposed_state)
            .await
    }

    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(
                resource_type,
                Some(prior_state),
                proposed_state.clone(),
                proposed_state,
            )
            .await
    }

    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null, Value::Null)
            .await
    }

    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    pub async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .upgrade_resource_state(resource_type, version, state)
            .await
    }

    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        check_diagnostics(
            self.provider
                .validate_data_source_config(data_source_type, config)
                .await?,
        )
    }

    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    /// Plan, create, then read back. Returns the state after the read.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self.plan_create(resource_type, config).await?;
        let created = self.create(resource_type, plan.planned_state).await?;
        self.read(resource_type, created).await
    }

    /// Plan, update, then read back. Returns the state after the read.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self
            .plan_update(resource_type, prior_state.clone(), proposed_state)
            .await?;
        let updated = self
            .update(resource_type, prior_state, plan.planned_state)
            .await?;
        self.read(resource_type, updated).await
    }

    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.plan_delete(resource_type, current_state.clone()).await?;
        self.delete(resource_type, current_state).await
    }

    /// Create, update, delete. Returns the state after the update.
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created = self.lifecycle_create(resource_type, initial_config).await?;
        let updated = self
            .lifecycle_update(resource_type, created, updated_config)
            .await?;
        self.lifecycle_delete(resource_type, updated.clone()).await?;
        Ok(updated)
    }
}

/// A harness call that failed.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    #[error("{}", format_diagnostics(.0))]
    Diagnostics(Vec<Diagnostic>),
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = format!("Operation failed with {} diagnostic(s):", diagnostics.len());
    for d in diagnostics {
        out.push_str(&format!("\n  [{:?}] {}", d.severity, d.summary));
        if let Some(detail) = &d.detail {
            out.push_str(&format!(": {}", detail));
        }
        if let Some(attribute) = &d.attribute {
            out.push_str(&format!(" (at {})", attribute));
        }
    }
    out
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

/// # Panics
///
/// Panics unless the plan has changes and is not a replacement.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(plan.has_changes(), "Expected plan to have changes for create");
    assert!(!plan.requires_replace, "Expected plan to create, not replace");
}

/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {:?}",
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// # Panics
///
/// Panics if the plan does not require replacement.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(plan.requires_replace, "Expected plan to require replacement");
}

/// # Panics
///
/// Panics if the plan has no change for `path`.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    assert!(
        plan.changes.iter().any(|c| c.path == path),
        "Expected plan to change '{}'. Changed attributes: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// # Panics
///
/// Panics if the plan changes `path`.
pub fn assert_plan_does_not_change_attribute(plan: &PlanResult, path: &str) {
    assert!(
        !plan.changes.iter().any(|c| c.path == path),
        "Expected plan to leave '{}' alone",
        path
    );
}

/// # Panics
///
/// Panics if any diagnostic is an error.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();
    assert!(errors.is_empty(), "Expected no errors, got {:?}", errors);
}

/// # Panics
///
/// Panics unless some error diagnostic names `attribute`.
pub fn assert_error_on_attribute(diagnostics: &[Diagnostic], attribute: &str) {
    assert!(
        diagnostics
            .iter()
            .any(|d| d.is_error() && d.attribute.as_deref() == Some(attribute)),
        "Expected an error on '{}', got {:?}",
        attribute,
        diagnostics
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MayanEdmsProvider;
    use serde_json::json;
    use std::sync::Arc;

    fn tester() -> (Arc<FakeMayan>, ProviderTester<MayanEdmsProvider>) {
        let fake = Arc::new(FakeMayan::new());
        let provider = MayanEdmsProvider::with_client(fake.clone());
        (fake, ProviderTester::new(provider))
    }

    #[tokio::test]
    async fn test_tag_crud() {
        let (fake, tester) = tester();
        let updated = tester
            .lifecycle_crud(
                "mayanedms_tag",
                json!({"label": "urgent", "color": "#ff0000"}),
                json!({"label": "urgent", "color": "#00ff00"}),
            )
            .await
            .unwrap();

        assert_eq!(updated["color"], "#00ff00");
        assert!(fake.calls().contains(&"delete_tag(1)".to_string()));
    }

    #[tokio::test]
    async fn test_plan_assertions() {
        let (_, tester) = tester();
        let plan = tester
            .plan_create("mayanedms_tag", json!({"label": "a", "color": "#000"}))
            .await
            .unwrap();
        assert_plan_creates(&plan);
        assert_plan_changes_attribute(&plan, "label");
        assert_plan_does_not_change_attribute(&plan, "id");

        let prior = json!({"id": "1", "label": "a", "color": "#000"});
        let plan = tester
            .plan_update("mayanedms_tag", prior.clone(), prior)
            .await
            .unwrap();
        assert_plan_no_changes(&plan);
    }

    #[tokio::test]
    async fn test_moving_a_node_to_another_index_replaces_it() {
        let (_, tester) = tester();
        let prior = json!({
            "id": "1-3", "index_id": 1, "parent_id": 2, "node_id": 3,
            "expression": "x", "enabled": true, "link_documents": false
        });
        let plan = tester
            .plan_update(
                "mayanedms_index_template_node",
                prior,
                json!({"index_id": 5, "parent_id": 6, "expression": "x"}),
            )
            .await
            .unwrap();
        assert_plan_replaces(&plan);
        assert_eq!(plan.planned_state["node_id"], Value::Null);
    }

    #[tokio::test]
    async fn test_validation_errors_surface_as_diagnostics() {
        let (_, tester) = tester();
        let err = tester
            .validate_resource_config("mayanedms_tag", json!({"color": "#000"}))
            .await
            .unwrap_err();
        match err {
            TestError::Diagnostics(diagnostics) => {
                assert_error_on_attribute(&diagnostics, "label");
            }
            other => panic!("expected diagnostics, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_configure_reports_missing_credentials() {
        let tester = ProviderTester::new(MayanEdmsProvider::new());
        let err = tester
            .configure(json!({"url": "http://localhost:8000"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Missing required attribute"));
    }

    #[test]
    fn test_error_display_lists_diagnostics() {
        let err = TestError::Diagnostics(vec![
            Diagnostic::error("Missing required attribute 'label'").with_attribute("label"),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("Operation failed with 1 diagnostic(s):"));
        assert!(text.contains("(at label)"));
    }
}
