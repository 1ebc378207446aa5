use async_trait::async_trait;
use tracing::info;

use super::{base_schema, Resource};
use crate::client::{Group, MayanClient};
use crate::error::ProviderError;
use crate::reconcile::{apply_set_diff, SetDiff};
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;

/// `mayanedms_group`, with its user membership.
pub struct GroupResource;

impl GroupResource {
    async fn sync_users(
        client: &dyn MayanClient,
        group_id: i64,
        diff: &SetDiff<i64>,
    ) -> Result<(), ProviderError> {
        apply_set_diff(
            "group.users",
            diff,
            |user| client.remove_group_user(group_id, *user),
            |user| client.add_group_user(group_id, *user),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for GroupResource {
    fn type_name(&self) -> &'static str {
        "mayanedms_group"
    }

    fn schema(&self) -> Schema {
        base_schema()
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "users",
                Attribute::optional_int_set().with_description("Ids of the member users"),
            )
    }

    async fn create(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let group = Group {
            id: 0,
            name: data.get_str("name")?,
        };
        let created = client.create_group(&group).await?;
        data.set_id(created.id);
        info!(resource = self.type_name(), id = created.id, "Created group");

        let users = SetDiff::additions(data.get_int_set("users")?);
        Self::sync_users(client, created.id, &users).await?;
        self.read(client, data).await
    }

    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let group = client.get_group(data.numeric_id()?).await?;
        let users = client.group_users(group.id).await?;
        data.set_id(group.id);
        data.set("name", group.name);
        data.set_int_set("users", users);
        Ok(())
    }

    async fn update(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let group = Group {
            id: data.numeric_id()?,
            name: data.get_str("name")?,
        };
        client.update_group(&group).await?;

        let users = data.int_set_change("users")?;
        Self::sync_users(client, group.id, &users).await?;
        info!(resource = self.type_name(), id = group.id, "Updated group");
        self.read(client, data).await
    }

    async fn delete(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.numeric_id()?;
        client.delete_group(id).await?;
        info!(resource = self.type_name(), id, "Deleted group");
        data.clear_id();
        Ok(())
    }
}
