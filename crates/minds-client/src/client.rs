//! Main client implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use url::Url;

use crate::api::{CompletionApi, DatasourcesApi, KnowledgeBasesApi, MindsApi};
use crate::error::{Error, Result};
use crate::resolver::Resolver;

/// Public control-plane host used when no base URL is given.
pub const DEFAULT_BASE_URL: &str = "https://mdb.ai";

/// Project that minds live under.
pub const DEFAULT_PROJECT: &str = "mindsdb";

/// Prompt template injected into new minds that supply none.
pub const DEFAULT_PROMPT_TEMPLATE: &str =
    "Use your database tools to answer the user's question: {{question}}";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "MINDS_API_KEY";

/// Environment variable overriding the control-plane base URL.
pub const BASE_URL_ENV: &str = "MINDS_BASE_URL";

/// Minds API client.
///
/// Cheap to clone; every clone shares one connection pool and configuration.
///
/// # Example
///
/// ```no_run
/// use minds_client::MindsClient;
///
/// # async fn example() -> minds_client::Result<()> {
/// let client = MindsClient::builder()
///     .api_key("secret")
///     .build()?;
///
/// let minds = client.minds().list().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MindsClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client carrying the bearer token as a default header.
    pub(crate) http: reqwest::Client,
    /// Control-plane base URL, always ending in `/api/`.
    pub(crate) base_url: Url,
    /// Project that minds are addressed under.
    pub(crate) project: String,
    /// Prompt template for minds created without one.
    pub(crate) default_prompt_template: String,
    /// Explicit model-serving URL; derived from `base_url` when absent.
    pub(crate) completion_base_url: Option<Url>,
    /// Per-request timeout, if any.
    pub(crate) timeout: Option<Duration>,
}

impl fmt::Debug for MindsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MindsClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("project", &self.inner.project)
            .finish_non_exhaustive()
    }
}

impl MindsClient {
    /// Get access to the inner client state (for API implementations).
    pub(crate) fn inner(&self) -> &ClientInner {
        &self.inner
    }
}

impl MindsClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client against the default host with the given key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a client from `MINDS_API_KEY` and, optionally, `MINDS_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| Error::Config(format!("{} is not set", API_KEY_ENV)))?;
        let mut builder = Self::builder().api_key(api_key);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            builder = builder.base_url(base_url);
        }
        builder.build()
    }

    /// Get the normalized control-plane base URL (ends in `/api/`).
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the project minds are addressed under.
    pub fn project(&self) -> &str {
        &self.inner.project
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the datasources API.
    pub fn datasources(&self) -> DatasourcesApi {
        DatasourcesApi::new(self.clone())
    }

    /// Access the knowledge bases API.
    pub fn knowledge_bases(&self) -> KnowledgeBasesApi {
        KnowledgeBasesApi::new(self.clone())
    }

    /// Access the minds API.
    pub fn minds(&self) -> MindsApi {
        MindsApi::new(self.clone())
    }

    /// Access the chat completion API.
    pub fn completions(&self) -> CompletionApi {
        CompletionApi::new(self.clone())
    }

    /// Access the datasource/knowledge base reference resolver.
    pub fn resolver(&self) -> Resolver {
        Resolver::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path given as segments.
    ///
    /// Each segment is percent-encoded on its own, so a resource name can
    /// never add, drop or climb path segments. `.`, `..` and empty segments
    /// are rejected because they cannot be addressed as a single segment.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(Error::InvalidReference(format!(
                "'{}' cannot be used as a resource name",
                bad
            )));
        }

        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::Config(format!(
                    "base URL cannot carry a path: {}",
                    self.inner.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request against an absolute URL.
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, %url, "sending request");
        let builder = self.inner.http.request(method, url);
        match self.inner.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    /// Make a GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, path: &[&str]) -> Result<T> {
        let url = self.url(path)?;
        let response = self.send(self.request(Method::GET, url)).await?;
        Ok(response.json().await?)
    }

    /// Make a POST request, discarding the response body.
    pub(crate) async fn post<B>(&self, path: &[&str], body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        self.send(self.request(Method::POST, url).json(body)).await?;
        Ok(())
    }

    /// Make a PUT request, discarding the response body.
    pub(crate) async fn put<B>(&self, path: &[&str], body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        self.send(self.request(Method::PUT, url).json(body)).await?;
        Ok(())
    }

    /// Make a PATCH request, discarding the response body.
    pub(crate) async fn patch<B>(&self, path: &[&str], body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        self.send(self.request(Method::PATCH, url).json(body)).await?;
        Ok(())
    }

    /// Make a DELETE request with no body.
    pub(crate) async fn delete(&self, path: &[&str]) -> Result<()> {
        let url = self.url(path)?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    /// Make a DELETE request carrying a JSON body.
    pub(crate) async fn delete_with_body<B>(&self, path: &[&str], body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        self.send(self.request(Method::DELETE, url).json(body))
            .await?;
        Ok(())
    }

    /// Send a request, turning failing status codes into typed errors.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: Response) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            404 => Error::NotFound(body),
            403 => Error::Forbidden(body),
            401 => Error::Unauthorized(body),
            code => Error::Unknown {
                status: code,
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            },
        }
    }
}

/// Builder for creating a [`MindsClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    project: String,
    default_prompt_template: String,
    completion_base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            project: DEFAULT_PROJECT.to_string(),
            default_prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            completion_base_url: None,
            timeout: None,
            user_agent: None,
        }
    }

    /// Set the API key sent as a bearer token.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the control-plane base URL (defaults to [`DEFAULT_BASE_URL`]).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the project minds are addressed under.
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    /// Set the prompt template used for minds created without one.
    pub fn default_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.default_prompt_template = template.into();
        self
    }

    /// Send completions to this URL instead of the host derived from the base URL.
    pub fn completion_base_url(mut self, url: impl Into<String>) -> Self {
        self.completion_base_url = Some(url.into());
        self
    }

    /// Set a per-request timeout. By default none is applied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<MindsClient> {
        let api_key = self
            .api_key
            .ok_or_else(|| Error::Config("api_key is required".to_string()))?;

        let base_url = normalize_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        let completion_base_url = self
            .completion_base_url
            .as_deref()
            .map(Url::parse)
            .transpose()?;

        // Build default headers
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let value = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| Error::Config("Invalid api key".to_string()))?;
        headers.insert(AUTHORIZATION, value);

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("minds-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(MindsClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                project: self.project,
                default_prompt_template: self.default_prompt_template,
                completion_base_url,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip trailing slashes, append `/api` when missing, and end with `/` so
/// relative resource paths join underneath it.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim_end_matches('/');
    let with_api = if trimmed.ends_with("/api") {
        format!("{}/", trimmed)
    } else {
        format!("{}/api/", trimmed)
    };
    Ok(Url::parse(&with_api)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_api_key() {
        let result = ClientBuilder::new().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_defaults() {
        let client = MindsClient::new("key").unwrap();
        assert_eq!(client.base_url().as_str(), "https://mdb.ai/api/");
        assert_eq!(client.project(), "mindsdb");
        assert_eq!(
            client.inner().default_prompt_template,
            DEFAULT_PROMPT_TEMPLATE
        );
    }

    #[test]
    fn test_builder_normalizes_trailing_slash_and_api_suffix() {
        for raw in [
            "https://custom.example.com",
            "https://custom.example.com/",
            "https://custom.example.com/api",
            "https://custom.example.com/api/",
        ] {
            let client = ClientBuilder::new()
                .api_key("key")
                .base_url(raw)
                .build()
                .unwrap();
            assert_eq!(
                client.base_url().as_str(),
                "https://custom.example.com/api/",
                "normalizing {raw}"
            );
        }
    }

    #[test]
    fn test_url_building() {
        let client = MindsClient::new("key").unwrap();

        let url = client.url(&["datasources"]).unwrap();
        assert_eq!(url.as_str(), "https://mdb.ai/api/datasources");

        let url = client.url(&["projects", "mindsdb", "minds", "m1"]).unwrap();
        assert_eq!(url.as_str(), "https://mdb.ai/api/projects/mindsdb/minds/m1");
    }

    #[test]
    fn test_url_encodes_each_segment() {
        let client = MindsClient::new("key").unwrap();

        let url = client.url(&["datasources", "ds#v2"]).unwrap();
        assert_eq!(url.path(), "/api/datasources/ds%23v2");

        let url = client.url(&["datasources", "../../other?x=1"]).unwrap();
        assert_eq!(url.path(), "/api/datasources/..%2F..%2Fother%3Fx=1");
        assert_eq!(url.query(), None);

        for bad in ["..", ".", ""] {
            assert!(matches!(
                client.url(&["datasources", bad]),
                Err(Error::InvalidReference(_))
            ));
        }
    }

    #[test]
    fn test_overrides() {
        let client = ClientBuilder::new()
            .api_key("key")
            .project("other")
            .default_prompt_template("be brief")
            .completion_base_url("http://127.0.0.1:9000")
            .build()
            .unwrap();
        assert_eq!(client.project(), "other");
        assert_eq!(client.inner().default_prompt_template, "be brief");
        assert_eq!(
            client.inner().completion_base_url.as_ref().map(Url::as_str),
            Some("http://127.0.0.1:9000/")
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ClientBuilder::new()
            .api_key("key")
            .base_url("not a url")
            .build();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
