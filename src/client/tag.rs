use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ClientError, HttpClient};

/// A Mayan tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: i64,
    pub label: String,
    pub color: String,
}

/// Tag endpoints.
#[async_trait]
pub trait TagApi: Send + Sync {
    async fn create_tag(&self, tag: &Tag) -> Result<Tag, ClientError>;
    async fn get_tag(&self, id: i64) -> Result<Tag, ClientError>;
    async fn update_tag(&self, tag: &Tag) -> Result<Tag, ClientError>;
    async fn delete_tag(&self, id: i64) -> Result<(), ClientError>;
}

#[async_trait]
impl TagApi for HttpClient {
    async fn create_tag(&self, tag: &Tag) -> Result<Tag, ClientError> {
        self.post("tags/", tag).await
    }

    async fn get_tag(&self, id: i64) -> Result<Tag, ClientError> {
        self.get(&format!("tags/{}/", id)).await
    }

    async fn update_tag(&self, tag: &Tag) -> Result<Tag, ClientError> {
        self.put(&format!("tags/{}/", tag.id), tag).await
    }

    async fn delete_tag(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("tags/{}/", id)).await
    }
}
