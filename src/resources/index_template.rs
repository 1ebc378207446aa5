use async_trait::async_trait;
use tracing::info;

use super::{base_schema, Resource};
use crate::client::{IndexTemplate, MayanClient};
use crate::error::ProviderError;
use crate::reconcile::{apply_set_diff, SetDiff};
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;

/// `mayanedms_index_template`, with the document types it indexes.
///
/// The server creates the root node of the tree along with the template;
/// its id is exposed as `root_node_id` so nodes can hang off it.
pub struct IndexTemplateResource;

impl IndexTemplateResource {
    fn to_record(data: &ResourceData, id: i64) -> Result<IndexTemplate, ProviderError> {
        Ok(IndexTemplate {
            id,
            label: data.get_str("label")?,
            slug: data.get_str("slug")?,
            enabled: data.get_bool_or("enabled", true)?,
            root_node_id: 0,
        })
    }

    async fn sync_document_types(
        client: &dyn MayanClient,
        index_id: i64,
        diff: &SetDiff<i64>,
    ) -> Result<(), ProviderError> {
        apply_set_diff(
            "index_template.document_types",
            diff,
            |document_type| client.remove_index_template_document_type(index_id, *document_type),
            |document_type| client.add_index_template_document_type(index_id, *document_type),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for IndexTemplateResource {
    fn type_name(&self) -> &'static str {
        "mayanedms_index_template"
    }

    fn schema(&self) -> Schema {
        base_schema()
            .with_attribute("label", Attribute::required_string())
            .with_attribute(
                "slug",
                Attribute::required_string().with_description("URL-safe name of the index"),
            )
            .with_attribute("enabled", Attribute::optional_bool().with_default(true))
            .with_attribute("document_types", Attribute::optional_int_set())
            .with_attribute(
                "root_node_id",
                Attribute::computed_int64().with_description("Id of the tree's root node"),
            )
    }

    async fn create(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let created = client
            .create_index_template(&Self::to_record(data, 0)?)
            .await?;
        data.set_id(created.id);
        info!(resource = self.type_name(), id = created.id, "Created index template");

        let document_types = SetDiff::additions(data.get_int_set("document_types")?);
        Self::sync_document_types(client, created.id, &document_types).await?;
        self.read(client, data).await
    }

    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let template = client.get_index_template(data.numeric_id()?).await?;
        let document_types = client.index_template_document_types(template.id).await?;
        data.set_id(template.id);
        data.set("label", template.label);
        data.set("slug", template.slug);
        data.set("enabled", template.enabled);
        data.set("root_node_id", template.root_node_id);
        data.set_int_set("document_types", document_types);
        Ok(())
    }

    async fn update(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let record = Self::to_record(data, data.numeric_id()?)?;
        client.update_index_template(&record).await?;

        let document_types = data.int_set_change("document_types")?;
        Self::sync_document_types(client, record.id, &document_types).await?;
        info!(resource = self.type_name(), id = record.id, "Updated index template");
        self.read(client, data).await
    }

    async fn delete(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.numeric_id()?;
        client.delete_index_template(id).await?;
        info!(resource = self.type_name(), id, "Deleted index template");
        data.clear_id();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeMayan;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_exposes_root_node() {
        let fake = FakeMayan::new();
        let mut data = ResourceData::from_state(json!({
            "label": "By type",
            "slug": "by-type",
            "document_types": [7]
        }))
        .unwrap();
        IndexTemplateResource.create(&fake, &mut data).await.unwrap();

        let state = data.into_state();
        assert_eq!(state["id"], json!("1"));
        assert_eq!(state["root_node_id"], json!(2));
        assert_eq!(state["enabled"], json!(true));
        assert_eq!(state["document_types"], json!([7]));
    }

    #[tokio::test]
    async fn test_update_swaps_document_types() {
        let fake = FakeMayan::new();
        let mut data = ResourceData::from_state(json!({
            "label": "By type",
            "slug": "by-type",
            "document_types": [7, 8]
        }))
        .unwrap();
        IndexTemplateResource.create(&fake, &mut data).await.unwrap();
        fake.clear_calls();

        let mut data = ResourceData::with_prior(
            json!({
                "label": "By type",
                "slug": "by-type",
                "enabled": false,
                "document_types": [8, 9]
            }),
            data.into_state(),
        )
        .unwrap();
        IndexTemplateResource.update(&fake, &mut data).await.unwrap();

        let calls = fake.calls();
        assert_eq!(
            &calls[..3],
            &[
                "update_index_template(1)",
                "remove_index_template_document_type(1, 7)",
                "add_index_template_document_type(1, 9)",
            ]
        );
        assert!(!data.get_bool("enabled").unwrap());
    }
}
