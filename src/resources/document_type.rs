use async_trait::async_trait;
use tracing::info;

use super::{base_schema, DataSource, Resource};
use crate::client::{DocumentType, MayanClient};
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;

const TIME_UNITS: &[&str] = &["minutes", "hours", "days"];
const FILENAME_BACKENDS: &[&str] = &["original", "uuid", "uuid_plus_original"];

/// `mayanedms_document_type`
pub struct DocumentTypeResource;

impl DocumentTypeResource {
    fn to_record(data: &ResourceData) -> Result<DocumentType, ProviderError> {
        Ok(DocumentType {
            id: data.id().map(|_| data.numeric_id()).transpose()?.unwrap_or_default(),
            label: data.get_str("label")?,
            delete_time_period: data.get_i64_or("delete_time_period", 30)?,
            delete_time_unit: data.get_str_or("delete_time_unit", "days")?,
            trash_time_period: data.get_opt_i64("trash_time_period")?,
            trash_time_unit: data.get_opt_str("trash_time_unit")?,
            filename_generator_backend: data.get_str_or("filename_generator_backend", "uuid")?,
            filename_generator_backend_arguments: data
                .get_str_or("filename_generator_backend_arguments", "")?,
        })
    }
}

fn apply(data: &mut ResourceData, document_type: &DocumentType) {
    data.set_id(document_type.id);
    data.set("label", document_type.label.clone());
    data.set("delete_time_period", document_type.delete_time_period);
    data.set("delete_time_unit", document_type.delete_time_unit.clone());
    data.set("trash_time_period", document_type.trash_time_period);
    data.set("trash_time_unit", document_type.trash_time_unit.clone());
    data.set(
        "filename_generator_backend",
        document_type.filename_generator_backend.clone(),
    );
    data.set(
        "filename_generator_backend_arguments",
        document_type.filename_generator_backend_arguments.clone(),
    );
}

#[async_trait]
impl Resource for DocumentTypeResource {
    fn type_name(&self) -> &'static str {
        "mayanedms_document_type"
    }

    fn schema(&self) -> Schema {
        base_schema()
            .with_description("A document type groups documents sharing retention and naming rules")
            .with_attribute("label", Attribute::required_string())
            .with_attribute(
                "delete_time_period",
                Attribute::optional_int64()
                    .with_default(30)
                    .with_description("Time after which trashed documents are deleted"),
            )
            .with_attribute(
                "delete_time_unit",
                Attribute::optional_string()
                    .with_default("days")
                    .with_allowed_values(TIME_UNITS),
            )
            .with_attribute(
                "trash_time_period",
                Attribute::optional_int64()
                    .with_description("Time after which documents are moved to the trash"),
            )
            .with_attribute(
                "trash_time_unit",
                Attribute::optional_string().with_allowed_values(TIME_UNITS),
            )
            .with_attribute(
                "filename_generator_backend",
                Attribute::optional_string()
                    .with_default("uuid")
                    .with_allowed_values(FILENAME_BACKENDS),
            )
            .with_attribute(
                "filename_generator_backend_arguments",
                Attribute::optional_string().with_default(""),
            )
    }

    async fn create(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let created = client.create_document_type(&Self::to_record(data)?).await?;
        data.set_id(created.id);
        info!(resource = self.type_name(), id = created.id, "Created document type");
        self.read(client, data).await
    }

    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let document_type = client.get_document_type(data.numeric_id()?).await?;
        apply(data, &document_type);
        Ok(())
    }

    async fn update(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let record = Self::to_record(data)?;
        client.update_document_type(&record).await?;
        info!(resource = self.type_name(), id = record.id, "Updated document type");
        self.read(client, data).await
    }

    async fn delete(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.numeric_id()?;
        client.delete_document_type(id).await?;
        info!(resource = self.type_name(), id, "Deleted document type");
        data.clear_id();
        Ok(())
    }
}

/// `mayanedms_document_type` data source: look a document type up by label.
pub struct DocumentTypeDataSource;

#[async_trait]
impl DataSource for DocumentTypeDataSource {
    fn type_name(&self) -> &'static str {
        "mayanedms_document_type"
    }

    fn schema(&self) -> Schema {
        base_schema()
            .with_attribute("label", Attribute::required_string())
            .with_attribute("delete_time_period", Attribute::computed_int64())
            .with_attribute("delete_time_unit", Attribute::computed_string())
            .with_attribute("trash_time_period", Attribute::computed_int64())
            .with_attribute("trash_time_unit", Attribute::computed_string())
            .with_attribute("filename_generator_backend", Attribute::computed_string())
            .with_attribute(
                "filename_generator_backend_arguments",
                Attribute::computed_string(),
            )
    }

    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let label = data.get_str("label")?;
        let document_type = client
            .find_document_type_by_label(&label)
            .await?
            .ok_or_else(|| {
                ProviderError::NotFound(format!(
                    "Unable to find document type with label '{}'",
                    label
                ))
            })?;
        apply(data, &document_type);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeMayan;
    use serde_json::json;

    async fn create(fake: &FakeMayan, label: &str) -> ResourceData {
        let mut data = ResourceData::from_state(json!({"label": label})).unwrap();
        DocumentTypeResource.create(fake, &mut data).await.unwrap();
        data
    }

    #[tokio::test]
    async fn test_create_fills_defaults() {
        let fake = FakeMayan::new();
        let data = create(&fake, "Invoice").await;
        assert_eq!(data.id(), Some("1"));
        assert_eq!(data.get_i64("delete_time_period").unwrap(), 30);
        assert_eq!(data.get_str("delete_time_unit").unwrap(), "days");
        assert_eq!(data.get_str("filename_generator_backend").unwrap(), "uuid");
        assert_eq!(data.get("trash_time_period"), Some(&json!(null)));
    }

    #[tokio::test]
    async fn test_data_source_lookup() {
        let fake = FakeMayan::new();
        create(&fake, "Receipt").await;
        create(&fake, "Invoice").await;

        let mut lookup = ResourceData::from_state(json!({"label": "Invoice"})).unwrap();
        DocumentTypeDataSource.read(&fake, &mut lookup).await.unwrap();
        assert_eq!(lookup.id(), Some("2"));
        assert_eq!(lookup.get_str("delete_time_unit").unwrap(), "days");

        let mut missing = ResourceData::from_state(json!({"label": "Contract"})).unwrap();
        let err = DocumentTypeDataSource
            .read(&fake, &mut missing)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
        assert_eq!(
            err.to_string(),
            "Resource not found: Unable to find document type with label 'Contract'"
        );
        assert_eq!(missing.id(), None);
    }

    #[tokio::test]
    async fn test_data_source_keeps_server_errors() {
        let fake = FakeMayan::new();
        fake.fail_on("find_document_type_by_label(Invoice)", 503, "maintenance");

        let mut lookup = ResourceData::from_state(json!({"label": "Invoice"})).unwrap();
        let err = DocumentTypeDataSource
            .read(&fake, &mut lookup)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Client(_)));
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "API error (503): maintenance");
    }
}
