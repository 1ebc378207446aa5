//! REST client for the Mayan EDMS v4 API.
//!
//! [`HttpClient`] authenticates once through `auth/token/obtain/` and then
//! sends every request with `Authorization: Token <token>`. Non-2xx answers
//! become [`ClientError::Api`] carrying the raw response body; nothing is
//! retried.
//!
//! Resource handlers never see [`HttpClient`] directly. They depend on the
//! [`MayanClient`] capability, which is the union of one API trait per
//! entity, so tests can substitute
//! [`FakeMayan`](crate::testing::FakeMayan).

mod document_type;
mod error;
mod group;
mod index_template;
mod metadata_type;
pub mod pagination;
mod role;
mod source;
mod tag;
mod workflow_template;

pub use document_type::{DocumentType, DocumentTypeApi};
pub use error::ClientError;
pub use group::{Group, GroupApi};
pub use index_template::{IndexTemplate, IndexTemplateApi, IndexTemplateNode};
pub use metadata_type::{MetadataType, MetadataTypeApi};
pub use role::{Role, RoleApi};
pub use source::{Source, SourceApi};
pub use tag::{Tag, TagApi};
pub use workflow_template::{
    StateRef, WorkflowTemplate, WorkflowTemplateApi, WorkflowTemplateState,
    WorkflowTemplateTransition,
};

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use pagination::{Page, PageLink};

/// Path of the API root below the configured server URL.
pub const API_PREFIX: &str = "api/v4/";

/// Everything needed to reach and authenticate against a Mayan server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server URL, e.g. `https://edms.example.com`.
    pub url: String,
    /// API user.
    pub username: String,
    /// API password.
    pub password: String,
    /// Skip TLS certificate verification.
    pub insecure: bool,
}

/// The full set of operations the provider performs against Mayan.
pub trait MayanClient:
    DocumentTypeApi
    + SourceApi
    + TagApi
    + IndexTemplateApi
    + GroupApi
    + RoleApi
    + WorkflowTemplateApi
    + MetadataTypeApi
{
}

impl<T> MayanClient for T where
    T: DocumentTypeApi
        + SourceApi
        + TagApi
        + IndexTemplateApi
        + GroupApi
        + RoleApi
        + WorkflowTemplateApi
        + MetadataTypeApi
{
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
}

/// Mayan answers `null` for blank optional text fields; read those as the
/// type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{"id": ..}` rows returned by edge collections.
#[derive(Debug, Deserialize)]
pub(crate) struct IdRecord {
    pub id: i64,
}

/// HTTP implementation of [`MayanClient`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpClient {
    /// Build the client and exchange credentials for a token.
    ///
    /// Any failure here is an [`ClientError::Authentication`]; the caller is
    /// expected to treat it as fatal.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut client = Self::unauthenticated(&config.url, config.insecure)?;

        let request = TokenRequest {
            username: &config.username,
            password: &config.password,
        };
        let response: TokenResponse = client
            .post("auth/token/obtain/", &request)
            .await
            .map_err(|e| ClientError::Authentication(format!("failed to obtain token: {}", e)))?;

        match response.token {
            Some(token) if !token.is_empty() => {
                info!(
                    url = %client.base_url,
                    user = %config.username,
                    "Authenticated against Mayan EDMS"
                );
                client.token = Some(token);
                Ok(client)
            }
            _ => Err(ClientError::Authentication(
                "token missing from authentication response".to_string(),
            )),
        }
    }

    /// Build a client that sends no `Authorization` header.
    pub fn unauthenticated(url: &str, insecure: bool) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .build()?;

        Ok(Self {
            http,
            base_url: api_base(url)?,
            token: None,
        })
    }

    /// The versioned API root every path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Execute one JSON request/response cycle.
    ///
    /// Returns the response for any 2xx status; the body is left unread so
    /// callers that expect no content (DELETE, edge actions) never decode it.
    pub async fn perform_request<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        debug!(method = %method, path = url.path(), "Sending request");

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Token {}", token));
        }
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await?;
            warn!(
                method = %method,
                path = url.path(),
                status = status.as_u16(),
                "Request rejected"
            );
            return Err(ClientError::api(status.as_u16(), message));
        }

        Ok(response)
    }

    fn url_for(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ClientError> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub(crate) async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ClientError> {
        let url = self.url_for(path)?;
        let response = self.perform_request::<()>(Method::GET, url, None).await?;
        Self::decode(response).await
    }

    pub(crate) async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url_for(path)?;
        let response = self.perform_request(Method::POST, url, Some(body)).await?;
        Self::decode(response).await
    }

    pub(crate) async fn put<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url_for(path)?;
        let response = self.perform_request(Method::PUT, url, Some(body)).await?;
        Self::decode(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let url = self.url_for(path)?;
        self.perform_request::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// POST to an action endpoint (`.../add/`, `.../remove/`) whose answer
    /// carries no body worth decoding.
    pub(crate) async fn post_action<B>(&self, path: &str, body: &B) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url_for(path)?;
        self.perform_request(Method::POST, url, Some(body)).await?;
        Ok(())
    }

    pub(crate) async fn fetch_page<T: DeserializeOwned>(
        &self,
        link: PageLink,
    ) -> Result<Page<T>, ClientError> {
        let url = match link {
            PageLink::Path(path) => self.url_for(&path)?,
            PageLink::Url(url) => {
                Url::parse(&url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", url, e)))?
            }
        };
        let response = self.perform_request::<()>(Method::GET, url, None).await?;
        Self::decode(response).await
    }

    /// Collect the ids of every record in an edge collection.
    pub(crate) async fn edge_ids(&self, path: &str) -> Result<Vec<i64>, ClientError> {
        let rows: Vec<IdRecord> =
            pagination::collect_pages(PageLink::Path(path.to_string()), |link| {
                self.fetch_page(link)
            })
            .await?;
        Ok(rows.into_iter().map(|row| row.id).collect())
    }
}

/// Resolve the versioned API root from a configured server URL.
fn api_base(url: &str) -> Result<Url, ClientError> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ClientError::InvalidUrl("server URL is empty".to_string()));
    }
    let base = Url::parse(&format!("{}/", trimmed))
        .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", url, e)))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(ClientError::InvalidUrl(format!(
            "{}: scheme must be http or https",
            url
        )));
    }
    base.join(API_PREFIX)
        .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", url, e)))
}
