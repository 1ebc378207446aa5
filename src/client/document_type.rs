use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::pagination::{self, PageLink};
use super::{ClientError, HttpClient};

/// A Mayan document type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentType {
    #[serde(default)]
    pub id: i64,
    pub label: String,
    pub delete_time_period: i64,
    pub delete_time_unit: String,
    /// Sent as `null` when unset so the server clears it.
    pub trash_time_period: Option<i64>,
    pub trash_time_unit: Option<String>,
    pub filename_generator_backend: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub filename_generator_backend_arguments: String,
}

/// Document type endpoints.
#[async_trait]
pub trait DocumentTypeApi: Send + Sync {
    async fn create_document_type(&self, document_type: &DocumentType)
        -> Result<DocumentType, ClientError>;
    async fn get_document_type(&self, id: i64) -> Result<DocumentType, ClientError>;
    async fn update_document_type(&self, document_type: &DocumentType)
        -> Result<DocumentType, ClientError>;
    async fn delete_document_type(&self, id: i64) -> Result<(), ClientError>;
    /// First document type whose label matches exactly, scanning every page.
    async fn find_document_type_by_label(
        &self,
        label: &str,
    ) -> Result<Option<DocumentType>, ClientError>;
}

#[async_trait]
impl DocumentTypeApi for HttpClient {
    async fn create_document_type(
        &self,
        document_type: &DocumentType,
    ) -> Result<DocumentType, ClientError> {
        self.post("document_types/", document_type).await
    }

    async fn get_document_type(&self, id: i64) -> Result<DocumentType, ClientError> {
        self.get(&format!("document_types/{}/", id)).await
    }

    async fn update_document_type(
        &self,
        document_type: &DocumentType,
    ) -> Result<DocumentType, ClientError> {
        self.put(&format!("document_types/{}/", document_type.id), document_type)
            .await
    }

    async fn delete_document_type(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("document_types/{}/", id)).await
    }

    async fn find_document_type_by_label(
        &self,
        label: &str,
    ) -> Result<Option<DocumentType>, ClientError> {
        pagination::find_in_pages(
            PageLink::Path("document_types/".to_string()),
            |link| self.fetch_page(link),
            |candidate: &DocumentType| candidate.label == label,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unset_trash_fields_serialize_as_null() {
        let document_type = DocumentType {
            label: "Invoice".into(),
            delete_time_period: 30,
            delete_time_unit: "days".into(),
            filename_generator_backend: "uuid".into(),
            ..Default::default()
        };

        let body = serde_json::to_value(&document_type).unwrap();
        assert_eq!(body["trash_time_period"], json!(null));
        assert_eq!(body["trash_time_unit"], json!(null));
        assert_eq!(body["filename_generator_backend_arguments"], json!(""));
    }

    #[test]
    fn test_decode_server_record() {
        let document_type: DocumentType = serde_json::from_value(json!({
            "id": 7,
            "label": "Contract",
            "delete_time_period": 15,
            "delete_time_unit": "hours",
            "trash_time_period": 2,
            "trash_time_unit": "days",
            "filename_generator_backend": "original",
            "filename_generator_backend_arguments": "",
            "url": "http://edms/api/v4/document_types/7/"
        }))
        .unwrap();

        assert_eq!(document_type.id, 7);
        assert_eq!(document_type.trash_time_period, Some(2));
        assert_eq!(document_type.trash_time_unit.as_deref(), Some("days"));
    }
}
