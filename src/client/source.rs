use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ClientError, HttpClient};

/// A Mayan document source.
///
/// `backend_path` names the source implementation and decides how
/// `backend_data`, a JSON document encoded as a string, is shaped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub id: i64,
    pub label: String,
    pub enabled: bool,
    pub backend_path: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub backend_data: String,
}

/// Source endpoints.
#[async_trait]
pub trait SourceApi: Send + Sync {
    async fn create_source(&self, source: &Source) -> Result<Source, ClientError>;
    async fn get_source(&self, id: i64) -> Result<Source, ClientError>;
    async fn update_source(&self, source: &Source) -> Result<Source, ClientError>;
    async fn delete_source(&self, id: i64) -> Result<(), ClientError>;
}

#[async_trait]
impl SourceApi for HttpClient {
    async fn create_source(&self, source: &Source) -> Result<Source, ClientError> {
        self.post("sources/", source).await
    }

    async fn get_source(&self, id: i64) -> Result<Source, ClientError> {
        self.get(&format!("sources/{}/", id)).await
    }

    async fn update_source(&self, source: &Source) -> Result<Source, ClientError> {
        self.put(&format!("sources/{}/", source.id), source).await
    }

    async fn delete_source(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("sources/{}/", id)).await
    }
}
