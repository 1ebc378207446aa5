use async_trait::async_trait;
use tracing::info;

use super::{base_schema, Resource};
use crate::client::{MayanClient, Role};
use crate::error::ProviderError;
use crate::reconcile::{apply_set_diff, SetDiff};
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;

/// `mayanedms_role`, with the groups holding it and the permissions it grants.
pub struct RoleResource;

impl RoleResource {
    async fn sync_edges(
        client: &dyn MayanClient,
        role_id: i64,
        groups: &SetDiff<i64>,
        permissions: &SetDiff<String>,
    ) -> Result<(), ProviderError> {
        apply_set_diff(
            "role.groups",
            groups,
            |group| client.remove_role_group(role_id, *group),
            |group| client.add_role_group(role_id, *group),
        )
        .await?;
        apply_set_diff(
            "role.permissions",
            permissions,
            |permission| client.remove_role_permission(role_id, permission),
            |permission| client.add_role_permission(role_id, permission),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for RoleResource {
    fn type_name(&self) -> &'static str {
        "mayanedms_role"
    }

    fn schema(&self) -> Schema {
        base_schema()
            .with_attribute("label", Attribute::required_string())
            .with_attribute(
                "groups",
                Attribute::optional_int_set()
                    .with_description("Ids of the groups granted this role"),
            )
            .with_attribute(
                "permissions",
                Attribute::optional_string_set()
                    .with_description("Permission keys, e.g. documents.document_view"),
            )
    }

    async fn create(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let role = Role {
            id: 0,
            label: data.get_str("label")?,
        };
        let created = client.create_role(&role).await?;
        data.set_id(created.id);
        info!(resource = self.type_name(), id = created.id, "Created role");

        let groups = SetDiff::additions(data.get_int_set("groups")?);
        let permissions = SetDiff::additions(data.get_string_set("permissions")?);
        Self::sync_edges(client, created.id, &groups, &permissions).await?;
        self.read(client, data).await
    }

    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let role = client.get_role(data.numeric_id()?).await?;
        let groups = client.role_groups(role.id).await?;
        let permissions = client.role_permissions(role.id).await?;
        data.set_id(role.id);
        data.set("label", role.label);
        data.set_int_set("groups", groups);
        data.set_string_set("permissions", permissions);
        Ok(())
    }

    async fn update(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let role = Role {
            id: data.numeric_id()?,
            label: data.get_str("label")?,
        };
        client.update_role(&role).await?;

        let groups = data.int_set_change("groups")?;
        let permissions = data.string_set_change("permissions")?;
        Self::sync_edges(client, role.id, &groups, &permissions).await?;
        info!(resource = self.type_name(), id = role.id, "Updated role");
        self.read(client, data).await
    }

    async fn delete(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.numeric_id()?;
        client.delete_role(id).await?;
        info!(resource = self.type_name(), id, "Deleted role");
        data.clear_id();
        Ok(())
    }
}
