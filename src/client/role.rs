use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::pagination::{self, PageLink};
use super::{ClientError, HttpClient};

/// A Mayan role.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub id: i64,
    pub label: String,
}

/// Permissions are keyed by their string `pk`, not by a numeric id.
#[derive(Debug, Deserialize)]
struct PermissionRecord {
    pk: String,
}

/// Role endpoints with the role/group and role/permission edges.
#[async_trait]
pub trait RoleApi: Send + Sync {
    async fn create_role(&self, role: &Role) -> Result<Role, ClientError>;
    async fn get_role(&self, id: i64) -> Result<Role, ClientError>;
    async fn update_role(&self, role: &Role) -> Result<Role, ClientError>;
    async fn delete_role(&self, id: i64) -> Result<(), ClientError>;

    async fn role_groups(&self, role_id: i64) -> Result<Vec<i64>, ClientError>;
    async fn add_role_group(&self, role_id: i64, group_id: i64) -> Result<(), ClientError>;
    async fn remove_role_group(&self, role_id: i64, group_id: i64) -> Result<(), ClientError>;

    async fn role_permissions(&self, role_id: i64) -> Result<Vec<String>, ClientError>;
    async fn add_role_permission(&self, role_id: i64, permission: &str)
        -> Result<(), ClientError>;
    async fn remove_role_permission(
        &self,
        role_id: i64,
        permission: &str,
    ) -> Result<(), ClientError>;
}

#[async_trait]
impl RoleApi for HttpClient {
    async fn create_role(&self, role: &Role) -> Result<Role, ClientError> {
        self.post("roles/", role).await
    }

    async fn get_role(&self, id: i64) -> Result<Role, ClientError> {
        self.get(&format!("roles/{}/", id)).await
    }

    async fn update_role(&self, role: &Role) -> Result<Role, ClientError> {
        self.put(&format!("roles/{}/", role.id), role).await
    }

    async fn delete_role(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("roles/{}/", id)).await
    }

    async fn role_groups(&self, role_id: i64) -> Result<Vec<i64>, ClientError> {
        self.edge_ids(&format!("roles/{}/groups/", role_id)).await
    }

    async fn add_role_group(&self, role_id: i64, group_id: i64) -> Result<(), ClientError> {
        self.post_action(
            &format!("roles/{}/groups/add/", role_id),
            &json!({ "group_id": group_id }),
        )
        .await
    }

    async fn remove_role_group(&self, role_id: i64, group_id: i64) -> Result<(), ClientError> {
        self.post_action(
            &format!("roles/{}/groups/remove/", role_id),
            &json!({ "group_id": group_id }),
        )
        .await
    }

    async fn role_permissions(&self, role_id: i64) -> Result<Vec<String>, ClientError> {
        let rows: Vec<PermissionRecord> = pagination::collect_pages(
            PageLink::Path(format!("roles/{}/permissions/", role_id)),
            |link| self.fetch_page(link),
        )
        .await?;
        Ok(rows.into_iter().map(|row| row.pk).collect())
    }

    async fn add_role_permission(
        &self,
        role_id: i64,
        permission: &str,
    ) -> Result<(), ClientError> {
        self.post_action(
            &format!("roles/{}/permissions/add/", role_id),
            &json!({ "permission": permission }),
        )
        .await
    }

    async fn remove_role_permission(
        &self,
        role_id: i64,
        permission: &str,
    ) -> Result<(), ClientError> {
        self.post_action(
            &format!("roles/{}/permissions/remove/", role_id),
            &json!({ "permission": permission }),
        )
        .await
    }
}
