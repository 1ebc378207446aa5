//! Document sources.
//!
//! Mayan keeps every source kind in one `sources/` collection. The kind is
//! named by `backend_path` and its settings travel as a JSON document encoded
//! into the `backend_data` string. Each [`SourceBackend`] is exposed as its
//! own resource type with the settings flattened into attributes.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{base_schema, Resource};
use crate::client::{MayanClient, Source};
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;

/// How compressed uploads are handled.
///
/// Attributes spell it out (`yes`); the backend data stores one letter
/// (`y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uncompress {
    Ask,
    Yes,
    No,
}

impl Uncompress {
    pub const VALUES: [&'static str; 3] = ["ask", "yes", "no"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Uncompress::Ask => "ask",
            Uncompress::Yes => "yes",
            Uncompress::No => "no",
        }
    }

    /// The single-letter form stored by the server.
    pub fn code(&self) -> &'static str {
        match self {
            Uncompress::Ask => "a",
            Uncompress::Yes => "y",
            Uncompress::No => "n",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(Uncompress::Ask),
            "y" => Some(Uncompress::Yes),
            "n" => Some(Uncompress::No),
            _ => None,
        }
    }
}

impl fmt::Display for Uncompress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Uncompress {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ask" => Ok(Uncompress::Ask),
            "yes" => Ok(Uncompress::Yes),
            "no" => Ok(Uncompress::No),
            other => Err(ProviderError::Validation(format!(
                "uncompress must be one of ask, yes, no; got '{}'",
                other
            ))),
        }
    }
}

/// An attribute value for a stored code. Codes the server may add later
/// read back as an empty string.
fn uncompress_attr(code: &str) -> &'static str {
    Uncompress::from_code(code).map_or("", |u| u.as_str())
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WebFormData {
    uncompress: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WatchFolderData {
    folder_path: String,
    include_subdirectories: bool,
    document_type_id: i64,
    interval: i64,
    uncompress: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StagingFolderData {
    folder_path: String,
    preview_width: i64,
    preview_height: i64,
    delete_after_upload: bool,
    uncompress: String,
}

/// The source kinds this provider manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceBackend {
    WebForm,
    WatchFolder,
    StagingFolder,
}

impl SourceBackend {
    pub fn type_name(&self) -> &'static str {
        match self {
            SourceBackend::WebForm => "mayanedms_webform_source",
            SourceBackend::WatchFolder => "mayanedms_watchfolder_source",
            SourceBackend::StagingFolder => "mayanedms_stagingfolder_source",
        }
    }

    /// The discriminator the server stores in `backend_path`.
    pub fn backend_path(&self) -> &'static str {
        match self {
            SourceBackend::WebForm => {
                "mayan.apps.sources.source_backends.web_form_backends.SourceBackendWebForm"
            }
            SourceBackend::WatchFolder => {
                "mayan.apps.sources.source_backends.watch_folder_backends.SourceBackendWatchFolder"
            }
            SourceBackend::StagingFolder => {
                "mayan.apps.sources.source_backends.staging_folder_backends.SourceBackendStagingFolder"
            }
        }
    }

    fn schema(&self) -> Schema {
        let schema = base_schema()
            .with_attribute("label", Attribute::required_string())
            .with_attribute("enabled", Attribute::optional_bool().with_default(true))
            .with_attribute(
                "uncompress",
                Attribute::optional_string()
                    .with_default(Uncompress::Ask.as_str())
                    .with_allowed_values(&Uncompress::VALUES)
                    .with_description("What to do with compressed uploads"),
            );

        match self {
            SourceBackend::WebForm => {
                schema.with_description("Upload documents through a web form")
            }
            SourceBackend::WatchFolder => schema
                .with_description("Periodically import documents dropped into a server folder")
                .with_attribute("folder_path", Attribute::required_string())
                .with_attribute(
                    "include_subdirectories",
                    Attribute::optional_bool().with_default(false),
                )
                .with_attribute(
                    "document_type_id",
                    Attribute::required_int64()
                        .with_description("Document type assigned to imported files"),
                )
                .with_attribute(
                    "interval",
                    Attribute::required_int64().with_description("Seconds between checks"),
                ),
            SourceBackend::StagingFolder => schema
                .with_description("Pick documents from a server folder with previews")
                .with_attribute("folder_path", Attribute::required_string())
                .with_attribute(
                    "preview_width",
                    Attribute::required_int64()
                        .with_description("Width value to be passed to the converter backend"),
                )
                .with_attribute(
                    "preview_height",
                    Attribute::required_int64()
                        .with_description("Height value to be passed to the converter backend"),
                )
                .with_attribute("delete_after_upload", Attribute::required_bool()),
        }
    }

    /// Pack this kind's settings from `data` into a backend data string.
    fn encode(&self, data: &ResourceData) -> Result<String, ProviderError> {
        let uncompress: Uncompress = data
            .get_str_or("uncompress", Uncompress::Ask.as_str())?
            .parse()?;
        let uncompress = uncompress.code().to_string();

        let encoded = match self {
            SourceBackend::WebForm => serde_json::to_string(&WebFormData { uncompress })?,
            SourceBackend::WatchFolder => serde_json::to_string(&WatchFolderData {
                folder_path: data.get_str("folder_path")?,
                include_subdirectories: data.get_bool_or("include_subdirectories", false)?,
                document_type_id: data.get_i64("document_type_id")?,
                interval: data.get_i64("interval")?,
                uncompress,
            })?,
            SourceBackend::StagingFolder => serde_json::to_string(&StagingFolderData {
                folder_path: data.get_str("folder_path")?,
                preview_width: data.get_i64("preview_width")?,
                preview_height: data.get_i64("preview_height")?,
                delete_after_upload: data.get_bool("delete_after_upload")?,
                uncompress,
            })?,
        };
        Ok(encoded)
    }

    /// Unpack `blob` into attributes on `data`.
    fn decode(&self, blob: &str, data: &mut ResourceData) -> Result<(), ProviderError> {
        let blob = if blob.trim().is_empty() { "{}" } else { blob };
        match self {
            SourceBackend::WebForm => {
                let settings: WebFormData = serde_json::from_str(blob)?;
                data.set("uncompress", uncompress_attr(&settings.uncompress));
            }
            SourceBackend::WatchFolder => {
                let settings: WatchFolderData = serde_json::from_str(blob)?;
                data.set("uncompress", uncompress_attr(&settings.uncompress));
                data.set("folder_path", settings.folder_path);
                data.set("include_subdirectories", settings.include_subdirectories);
                data.set("document_type_id", settings.document_type_id);
                data.set("interval", settings.interval);
            }
            SourceBackend::StagingFolder => {
                let settings: StagingFolderData = serde_json::from_str(blob)?;
                data.set("uncompress", uncompress_attr(&settings.uncompress));
                data.set("folder_path", settings.folder_path);
                data.set("preview_width", settings.preview_width);
                data.set("preview_height", settings.preview_height);
                data.set("delete_after_upload", settings.delete_after_upload);
            }
        }
        Ok(())
    }
}

/// One resource type per [`SourceBackend`].
pub struct SourceResource {
    backend: SourceBackend,
}

impl SourceResource {
    pub fn new(backend: SourceBackend) -> Self {
        Self { backend }
    }

    fn to_record(&self, data: &ResourceData, id: i64) -> Result<Source, ProviderError> {
        Ok(Source {
            id,
            label: data.get_str("label")?,
            enabled: data.get_bool_or("enabled", true)?,
            backend_path: self.backend.backend_path().to_string(),
            backend_data: self.backend.encode(data)?,
        })
    }
}

#[async_trait]
impl Resource for SourceResource {
    fn type_name(&self) -> &'static str {
        self.backend.type_name()
    }

    fn schema(&self) -> Schema {
        self.backend.schema()
    }

    async fn create(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let created = client.create_source(&self.to_record(data, 0)?).await?;
        data.set_id(created.id);
        info!(resource = self.type_name(), id = created.id, "Created source");
        self.read(client, data).await
    }

    /// Fails with a type mismatch, leaving `data` untouched, when the stored
    /// source is of another kind.
    async fn read(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let source = client.get_source(data.numeric_id()?).await?;
        if source.backend_path != self.backend.backend_path() {
            return Err(ProviderError::TypeMismatch(format!(
                "source {} has backend '{}', expected '{}'",
                source.id,
                source.backend_path,
                self.backend.backend_path()
            )));
        }

        let mut fresh = data.clone();
        self.backend.decode(&source.backend_data, &mut fresh)?;
        fresh.set_id(source.id);
        fresh.set("label", source.label);
        fresh.set("enabled", source.enabled);
        *data = fresh;
        Ok(())
    }

    async fn update(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let record = self.to_record(data, data.numeric_id()?)?;
        client.update_source(&record).await?;
        info!(resource = self.type_name(), id = record.id, "Updated source");
        self.read(client, data).await
    }

    async fn delete(
        &self,
        client: &dyn MayanClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let id = data.numeric_id()?;
        client.delete_source(id).await?;
        info!(resource = self.type_name(), id, "Deleted source");
        data.clear_id();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SourceApi;
    use crate::testing::FakeMayan;
    use serde_json::json;

    #[test]
    fn test_uncompress_codes() {
        for value in Uncompress::VALUES {
            let parsed: Uncompress = value.parse().unwrap();
            assert_eq!(Uncompress::from_code(parsed.code()), Some(parsed));
        }
        assert_eq!(uncompress_attr("z"), "");
        assert!("maybe".parse::<Uncompress>().is_err());
    }

    #[tokio::test]
    async fn test_webform_uncompress_yes() {
        let fake = FakeMayan::new();
        let resource = SourceResource::new(SourceBackend::WebForm);
        let mut data =
            ResourceData::from_state(json!({"label": "Upload", "uncompress": "yes"})).unwrap();
        resource.create(&fake, &mut data).await.unwrap();

        let stored = fake.get_source(1).await.unwrap();
        assert_eq!(stored.backend_data, r#"{"uncompress":"y"}"#);
        assert_eq!(stored.backend_path, SourceBackend::WebForm.backend_path());
        assert_eq!(data.get_str("uncompress").unwrap(), "yes");
        assert!(data.get_bool("enabled").unwrap());
    }

    #[tokio::test]
    async fn test_watch_folder_round_trip() {
        let fake = FakeMayan::new();
        let resource = SourceResource::new(SourceBackend::WatchFolder);
        let mut data = ResourceData::from_state(json!({
            "label": "Scanner",
            "folder_path": "/srv/scans",
            "document_type_id": 3,
            "interval": 600,
            "uncompress": "no"
        }))
        .unwrap();
        resource.create(&fake, &mut data).await.unwrap();

        let stored = fake.get_source(1).await.unwrap();
        let blob: serde_json::Value = serde_json::from_str(&stored.backend_data).unwrap();
        assert_eq!(
            blob,
            json!({
                "folder_path": "/srv/scans",
                "include_subdirectories": false,
                "document_type_id": 3,
                "interval": 600,
                "uncompress": "n"
            })
        );
        assert_eq!(data.get_i64("interval").unwrap(), 600);
    }

    #[tokio::test]
    async fn test_import_of_other_kind_is_a_type_mismatch() {
        let fake = FakeMayan::new();
        fake.put_source(Source {
            id: 4,
            label: "Upload".into(),
            enabled: true,
            backend_path: SourceBackend::WebForm.backend_path().into(),
            backend_data: r#"{"uncompress":"a"}"#.into(),
        });

        let err = SourceResource::new(SourceBackend::WatchFolder)
            .import(&fake, "4")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::TypeMismatch(_)));

        let mut data = ResourceData::from_state(json!({"id": "4"})).unwrap();
        let before = data.clone();
        assert!(SourceResource::new(SourceBackend::StagingFolder)
            .read(&fake, &mut data)
            .await
            .is_err());
        assert_eq!(data, before);
    }

    #[tokio::test]
    async fn test_malformed_backend_data() {
        let fake = FakeMayan::new();
        fake.put_source(Source {
            id: 1,
            label: "Upload".into(),
            enabled: true,
            backend_path: SourceBackend::WebForm.backend_path().into(),
            backend_data: "not json".into(),
        });

        let err = SourceResource::new(SourceBackend::WebForm)
            .import(&fake, "1")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Serialization(_)));
    }
}
