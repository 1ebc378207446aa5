use async_trait::async_trait;
use tracing::info;

use super::{base_schema, DataSource, Resource};
use crate::client::{MayanClient, MetadataType};
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;

const OPTIONAL_FIELDS: [&str; 4] = ["default", "lookup", "validator", "parser"];

/// `mayanedms_metadata_type`
pub struct MetadataTypeResource;

fn to_record(data: &ResourceData) -> Result<MetadataType, ProviderError> {
    Ok(MetadataType {
        id: data.id().map(|_| data.numeric_id()).transpose()?.unwrap_or_default(),
        label: data.get_str("label")?,
        name: data.get_str("name")?,
        default: data.get_str_or("default", "")?,
        lookup: data.get_str_or("lookup", "")?,
        validator: data.get_str_or("validator", "")?,
        parser: data.get_str_or("parser", "")?,
    })
}

fn apply(data: &mut ResourceData, metadata_type: MetadataType) {
    data.set_id(metadata_type.id);
    data.set("label", metadata_type.label);
    data.set("name", metadata_type.name);
    data.set("default", metadata_type.default);
    data.set("lookup", metadata_type.lookup);
    data.set("validator", metadata_type.validator);
    data.set("parser", metadata_type.parser);
}

#[async_trait]
impl Resource for MetadataTypeResource {
    fn type_name(&self) -> &'static str {
        "mayanedms_metadata_type"
    }

    fn schema(&self) -> Schema {
        let mut schema = base_schema()
            .with_attribute("label", Attribute::required_string())
            .with_attribute(
                "name",
                Attribute::required_string()
                    .with_description("Internal name, used to reference the type in templates"),
            );
        for field in OPTIONAL_FIELDS {
            schema = schema.with_attribute(field, Attribute::optional_string().with_default(""));
        }
        schema
    }

    async fn create(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let created = client.create_metadata_type(&to_record(data)?).await?;
        data.set_id(created.id);
        info!(resource = self.type_name(), id = created.id, "Created metadata type");
        self.read(client, data).await
    }

    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let metadata_type = client.get_metadata_type(data.numeric_id()?).await?;
        apply(data, metadata_type);
        Ok(())
    }

    async fn update(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let record = to_record(data)?;
        client.update_metadata_type(&record).await?;
        info!(resource = self.type_name(), id = record.id, "Updated metadata type");
        self.read(client, data).await
    }

    async fn delete(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.numeric_id()?;
        client.delete_metadata_type(id).await?;
        info!(resource = self.type_name(), id, "Deleted metadata type");
        data.clear_id();
        Ok(())
    }
}

/// `mayanedms_metadata_type` data source: look a metadata type up by name.
pub struct MetadataTypeDataSource;

#[async_trait]
impl DataSource for MetadataTypeDataSource {
    fn type_name(&self) -> &'static str {
        "mayanedms_metadata_type"
    }

    fn schema(&self) -> Schema {
        let mut schema = base_schema()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("label", Attribute::computed_string());
        for field in OPTIONAL_FIELDS {
            schema = schema.with_attribute(field, Attribute::computed_string());
        }
        schema
    }

    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let name = data.get_str("name")?;
        let metadata_type = client
            .find_metadata_type_by_name(&name)
            .await?
            .ok_or_else(|| {
                ProviderError::NotFound(format!(
                    "Unable to find metadata type with name '{}'",
                    name
                ))
            })?;
        apply(data, metadata_type);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeMayan;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_fills_empty_defaults() {
        let fake = FakeMayan::new();
        let mut data =
            ResourceData::from_state(json!({"label": "Invoice number", "name": "invoice"}))
                .unwrap();
        MetadataTypeResource.create(&fake, &mut data).await.unwrap();

        let state = data.into_state();
        assert_eq!(state["id"], json!("1"));
        assert_eq!(state["lookup"], json!(""));
        assert_eq!(state["parser"], json!(""));
    }

    #[tokio::test]
    async fn test_data_source_lookup() {
        let fake = FakeMayan::new();
        let mut data = ResourceData::from_state(
            json!({"label": "Invoice number", "name": "invoice", "validator": "x.Integer"}),
        )
        .unwrap();
        MetadataTypeResource.create(&fake, &mut data).await.unwrap();

        let mut lookup = ResourceData::from_state(json!({"name": "invoice"})).unwrap();
        MetadataTypeDataSource.read(&fake, &mut lookup).await.unwrap();
        assert_eq!(lookup.id(), Some("1"));
        assert_eq!(lookup.get_str("validator").unwrap(), "x.Integer");

        let mut missing = ResourceData::from_state(json!({"name": "po"})).unwrap();
        let err = MetadataTypeDataSource
            .read(&fake, &mut missing)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
        assert_eq!(
            err.to_string(),
            "Resource not found: Unable to find metadata type with name 'po'"
        );
    }
}
