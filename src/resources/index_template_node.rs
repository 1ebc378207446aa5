use async_trait::async_trait;
use tracing::info;

use super::{base_schema, Resource};
use crate::client::{IndexTemplateNode, MayanClient};
use crate::composite_id::CompositeId;
use crate::error::ProviderError;
use crate::schema::{Attribute, DiffSuppress, Schema};
use crate::state::ResourceData;

/// `mayanedms_index_template_node`, identified as `<index>-<node>`.
pub struct IndexTemplateNodeResource;

fn to_record(
    data: &ResourceData,
    index_id: i64,
    id: i64,
) -> Result<IndexTemplateNode, ProviderError> {
    let parent_id = data.get_i64("parent_id")?;
    Ok(IndexTemplateNode {
        id,
        expression: data.get_str("expression")?,
        enabled: data.get_bool_or("enabled", true)?,
        link_documents: data.get_bool_or("link_documents", false)?,
        index_id,
        parent_id,
        parent: parent_id,
    })
}

#[async_trait]
impl Resource for IndexTemplateNodeResource {
    fn type_name(&self) -> &'static str {
        "mayanedms_index_template_node"
    }

    fn schema(&self) -> Schema {
        base_schema()
            .with_attribute(
                "index_id",
                Attribute::required_int64()
                    .with_force_new()
                    .with_description("Id of the owning index template"),
            )
            .with_attribute(
                "parent_id",
                Attribute::required_int64().with_description(
                    "Node to hang this one under; the template's root_node_id for top level nodes",
                ),
            )
            .with_attribute(
                "expression",
                Attribute::required_string().with_diff_suppress(DiffSuppress::TrimSpace),
            )
            .with_attribute("enabled", Attribute::optional_bool().with_default(true))
            .with_attribute(
                "link_documents",
                Attribute::optional_bool()
                    .with_default(false)
                    .with_description("Whether documents are linked at this level"),
            )
            .with_attribute("node_id", Attribute::computed_int64())
    }

    async fn create(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let index_id = data.get_i64("index_id")?;
        let created = client
            .create_index_template_node(&to_record(data, index_id, 0)?)
            .await?;
        let id = CompositeId::new(index_id, created.id);
        data.set_id(id);
        info!(resource = self.type_name(), id = %id, "Created index template node");
        self.read(client, data).await
    }

    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.composite_id()?;
        let node = client.get_index_template_node(id.parent, id.child).await?;
        data.set("index_id", id.parent);
        data.set("node_id", node.id);
        data.set("parent_id", node.parent_id);
        data.set("expression", node.expression);
        data.set("enabled", node.enabled);
        data.set("link_documents", node.link_documents);
        Ok(())
    }

    async fn update(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.composite_id()?;
        client
            .update_index_template_node(&to_record(data, id.parent, id.child)?)
            .await?;
        info!(resource = self.type_name(), id = %id, "Updated index template node");
        self.read(client, data).await
    }

    async fn delete(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.composite_id()?;
        client.delete_index_template_node(id.parent, id.child).await?;
        info!(resource = self.type_name(), id = %id, "Deleted index template node");
        data.clear_id();
        Ok(())
    }
}
