use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ClientError, HttpClient};

/// A Mayan index template.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexTemplate {
    #[serde(default)]
    pub id: i64,
    pub label: String,
    pub slug: String,
    pub enabled: bool,
    /// Assigned by the server; ignored on write.
    #[serde(default, rename = "index_template_root_node_id", skip_serializing)]
    pub root_node_id: i64,
}

/// One node of an index template's tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexTemplateNode {
    #[serde(default)]
    pub id: i64,
    pub expression: String,
    pub enabled: bool,
    pub link_documents: bool,
    #[serde(default)]
    pub index_id: i64,
    #[serde(default)]
    pub parent_id: i64,
    /// The server still requires the legacy `parent` field on write; it
    /// always mirrors `parent_id`.
    #[serde(default)]
    pub parent: i64,
}

/// Index template endpoints, the document type edge, and the node tree.
#[async_trait]
pub trait IndexTemplateApi: Send + Sync {
    async fn create_index_template(&self, template: &IndexTemplate)
        -> Result<IndexTemplate, ClientError>;
    async fn get_index_template(&self, id: i64) -> Result<IndexTemplate, ClientError>;
    async fn update_index_template(&self, template: &IndexTemplate)
        -> Result<IndexTemplate, ClientError>;
    async fn delete_index_template(&self, id: i64) -> Result<(), ClientError>;

    async fn index_template_document_types(&self, index_id: i64)
        -> Result<Vec<i64>, ClientError>;
    async fn add_index_template_document_type(
        &self,
        index_id: i64,
        document_type_id: i64,
    ) -> Result<(), ClientError>;
    async fn remove_index_template_document_type(
        &self,
        index_id: i64,
        document_type_id: i64,
    ) -> Result<(), ClientError>;

    async fn create_index_template_node(
        &self,
        node: &IndexTemplateNode,
    ) -> Result<IndexTemplateNode, ClientError>;
    async fn get_index_template_node(
        &self,
        index_id: i64,
        node_id: i64,
    ) -> Result<IndexTemplateNode, ClientError>;
    async fn update_index_template_node(
        &self,
        node: &IndexTemplateNode,
    ) -> Result<IndexTemplateNode, ClientError>;
    async fn delete_index_template_node(&self, index_id: i64, node_id: i64)
        -> Result<(), ClientError>;
}

#[async_trait]
impl IndexTemplateApi for HttpClient {
    async fn create_index_template(
        &self,
        template: &IndexTemplate,
    ) -> Result<IndexTemplate, ClientError> {
        self.post("index_templates/", template).await
    }

    async fn get_index_template(&self, id: i64) -> Result<IndexTemplate, ClientError> {
        self.get(&format!("index_templates/{}/", id)).await
    }

    async fn update_index_template(
        &self,
        template: &IndexTemplate,
    ) -> Result<IndexTemplate, ClientError> {
        self.put(&format!("index_templates/{}/", template.id), template)
            .await
    }

    async fn delete_index_template(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("index_templates/{}/", id)).await
    }

    async fn index_template_document_types(
        &self,
        index_id: i64,
    ) -> Result<Vec<i64>, ClientError> {
        self.edge_ids(&format!("index_templates/{}/document_types/", index_id))
            .await
    }

    async fn add_index_template_document_type(
        &self,
        index_id: i64,
        document_type_id: i64,
    ) -> Result<(), ClientError> {
        self.post_action(
            &format!("index_templates/{}/document_types/add/", index_id),
            &json!({ "document_type": document_type_id }),
        )
        .await
    }

    async fn remove_index_template_document_type(
        &self,
        index_id: i64,
        document_type_id: i64,
    ) -> Result<(), ClientError> {
        self.post_action(
            &format!("index_templates/{}/document_types/remove/", index_id),
            &json!({ "document_type": document_type_id }),
        )
        .await
    }

    async fn create_index_template_node(
        &self,
        node: &IndexTemplateNode,
    ) -> Result<IndexTemplateNode, ClientError> {
        self.post(&format!("index_templates/{}/nodes/", node.index_id), node)
            .await
    }

    async fn get_index_template_node(
        &self,
        index_id: i64,
        node_id: i64,
    ) -> Result<IndexTemplateNode, ClientError> {
        self.get(&format!("index_templates/{}/nodes/{}/", index_id, node_id))
            .await
    }

    async fn update_index_template_node(
        &self,
        node: &IndexTemplateNode,
    ) -> Result<IndexTemplateNode, ClientError> {
        self.put(
            &format!("index_templates/{}/nodes/{}/", node.index_id, node.id),
            node,
        )
        .await
    }

    async fn delete_index_template_node(
        &self,
        index_id: i64,
        node_id: i64,
    ) -> Result<(), ClientError> {
        self.delete(&format!("index_templates/{}/nodes/{}/", index_id, node_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_node_id_is_read_not_written() {
        let template: IndexTemplate = serde_json::from_value(json!({
            "id": 3,
            "label": "By type",
            "slug": "by-type",
            "enabled": true,
            "index_template_root_node_id": 11
        }))
        .unwrap();
        assert_eq!(template.root_node_id, 11);

        let body = serde_json::to_value(&template).unwrap();
        assert!(body.get("index_template_root_node_id").is_none());
        assert_eq!(body["label"], "By type");
    }
}
