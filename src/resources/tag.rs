use async_trait::async_trait;
use tracing::info;

use super::{base_schema, Resource};
use crate::client::{MayanClient, Tag};
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;

/// `mayanedms_tag`
pub struct TagResource;

fn to_record(data: &ResourceData) -> Result<Tag, ProviderError> {
    Ok(Tag {
        id: data.id().map(|_| data.numeric_id()).transpose()?.unwrap_or_default(),
        label: data.get_str("label")?,
        color: data.get_str("color")?,
    })
}

#[async_trait]
impl Resource for TagResource {
    fn type_name(&self) -> &'static str {
        "mayanedms_tag"
    }

    fn schema(&self) -> Schema {
        base_schema()
            .with_attribute("label", Attribute::required_string())
            .with_attribute(
                "color",
                Attribute::required_string().with_description("HTML color code, e.g. #ff0000"),
            )
    }

    async fn create(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let created = client.create_tag(&to_record(data)?).await?;
        data.set_id(created.id);
        info!(resource = self.type_name(), id = created.id, "Created tag");
        self.read(client, data).await
    }

    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let tag = client.get_tag(data.numeric_id()?).await?;
        data.set_id(tag.id);
        data.set("label", tag.label);
        data.set("color", tag.color);
        Ok(())
    }

    async fn update(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let record = to_record(data)?;
        client.update_tag(&record).await?;
        info!(resource = self.type_name(), id = record.id, "Updated tag");
        self.read(client, data).await
    }

    async fn delete(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.numeric_id()?;
        client.delete_tag(id).await?;
        info!(resource = self.type_name(), id, "Deleted tag");
        data.clear_id();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TagApi;
    use crate::testing::FakeMayan;
    use serde_json::json;

    #[tokio::test]
    async fn test_update_replaces_every_field() {
        let fake = FakeMayan::new();
        let mut data =
            ResourceData::from_state(json!({"label": "urgent", "color": "#ff0000"})).unwrap();
        TagResource.create(&fake, &mut data).await.unwrap();
        assert_eq!(data.id(), Some("1"));

        let mut data = ResourceData::with_prior(
            json!({"label": "later", "color": "#00ff00"}),
            data.into_state(),
        )
        .unwrap();
        TagResource.update(&fake, &mut data).await.unwrap();

        let stored = fake.get_tag(1).await.unwrap();
        assert_eq!(stored.label, "later");
        assert_eq!(stored.color, "#00ff00");
    }

    #[tokio::test]
    async fn test_read_after_delete_is_not_found() {
        let fake = FakeMayan::new();
        let mut data =
            ResourceData::from_state(json!({"label": "urgent", "color": "#ff0000"})).unwrap();
        TagResource.create(&fake, &mut data).await.unwrap();

        let mut gone = data.clone();
        TagResource.delete(&fake, &mut data).await.unwrap();
        assert_eq!(data.id(), None);

        let err = TagResource.read(&fake, &mut gone).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
