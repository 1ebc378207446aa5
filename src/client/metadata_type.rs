use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::pagination::{self, PageLink};
use super::{ClientError, HttpClient};

/// A Mayan metadata type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetadataType {
    #[serde(default)]
    pub id: i64,
    pub label: String,
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub default: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub lookup: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub validator: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub parser: String,
}

/// Metadata type endpoints.
#[async_trait]
pub trait MetadataTypeApi: Send + Sync {
    async fn create_metadata_type(&self, metadata_type: &MetadataType)
        -> Result<MetadataType, ClientError>;
    async fn get_metadata_type(&self, id: i64) -> Result<MetadataType, ClientError>;
    async fn update_metadata_type(&self, metadata_type: &MetadataType)
        -> Result<MetadataType, ClientError>;
    async fn delete_metadata_type(&self, id: i64) -> Result<(), ClientError>;
    /// Walk `metadata_types/` until a record named `name` turns up.
    ///
    /// `Ok(None)` means no page held it.
    async fn find_metadata_type_by_name(
        &self,
        name: &str,
    ) -> Result<Option<MetadataType>, ClientError>;
}

#[async_trait]
impl MetadataTypeApi for HttpClient {
    async fn create_metadata_type(
        &self,
        metadata_type: &MetadataType,
    ) -> Result<MetadataType, ClientError> {
        self.post("metadata_types/", metadata_type).await
    }

    async fn get_metadata_type(&self, id: i64) -> Result<MetadataType, ClientError> {
        self.get(&format!("metadata_types/{}/", id)).await
    }

    async fn update_metadata_type(
        &self,
        metadata_type: &MetadataType,
    ) -> Result<MetadataType, ClientError> {
        self.put(&format!("metadata_types/{}/", metadata_type.id), metadata_type)
            .await
    }

    async fn delete_metadata_type(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("metadata_types/{}/", id)).await
    }

    async fn find_metadata_type_by_name(
        &self,
        name: &str,
    ) -> Result<Option<MetadataType>, ClientError> {
        pagination::find_in_pages(
            PageLink::Path("metadata_types/".to_string()),
            |link| self.fetch_page(link),
            |candidate: &MetadataType| candidate.name == name,
        )
        .await
    }
}
