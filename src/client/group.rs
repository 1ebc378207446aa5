use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ClientError, HttpClient};

/// A Mayan user group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub id: i64,
    pub name: String,
}

/// Group endpoints, including the group/user membership edge.
#[async_trait]
pub trait GroupApi: Send + Sync {
    async fn create_group(&self, group: &Group) -> Result<Group, ClientError>;
    async fn get_group(&self, id: i64) -> Result<Group, ClientError>;
    async fn update_group(&self, group: &Group) -> Result<Group, ClientError>;
    async fn delete_group(&self, id: i64) -> Result<(), ClientError>;

    async fn group_users(&self, group_id: i64) -> Result<Vec<i64>, ClientError>;
    async fn add_group_user(&self, group_id: i64, user_id: i64) -> Result<(), ClientError>;
    async fn remove_group_user(&self, group_id: i64, user_id: i64) -> Result<(), ClientError>;
}

#[async_trait]
impl GroupApi for HttpClient {
    async fn create_group(&self, group: &Group) -> Result<Group, ClientError> {
        self.post("groups/", group).await
    }

    async fn get_group(&self, id: i64) -> Result<Group, ClientError> {
        self.get(&format!("groups/{}/", id)).await
    }

    async fn update_group(&self, group: &Group) -> Result<Group, ClientError> {
        self.put(&format!("groups/{}/", group.id), group).await
    }

    async fn delete_group(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("groups/{}/", id)).await
    }

    async fn group_users(&self, group_id: i64) -> Result<Vec<i64>, ClientError> {
        self.edge_ids(&format!("groups/{}/users/", group_id)).await
    }

    async fn add_group_user(&self, group_id: i64, user_id: i64) -> Result<(), ClientError> {
        self.post_action(
            &format!("groups/{}/users/add/", group_id),
            &json!({ "user": user_id }),
        )
        .await
    }

    async fn remove_group_user(&self, group_id: i64, user_id: i64) -> Result<(), ClientError> {
        self.post_action(
            &format!("groups/{}/users/remove/", group_id),
            &json!({ "user": user_id }),
        )
        .await
    }
}
