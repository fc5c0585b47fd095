//! Chat completion API.
//!
//! Completions are served by a model host derived from the control-plane
//! URL, speaking the OpenAI chat completion protocol with the mind name as
//! the model.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::Method;
use tokio_stream::Stream;
use url::Url;

use crate::client::MindsClient;
use crate::error::{Error, Result};
use crate::types::{ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Control-plane host whose model host is not simply `ai.`-prefixed.
const DEFAULT_CONTROL_HOST: &str = "mdb.ai";

/// Model host paired with [`DEFAULT_CONTROL_HOST`].
pub const DEFAULT_MODEL_HOST: &str = "llm.mdb.ai";

/// Incremental content fragments of a streamed completion.
///
/// Single pass: the stream ends when the upstream response ends, and
/// dropping it closes the connection.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Derive the model-serving base URL from the control-plane URL.
///
/// `mdb.ai` on the scheme's default port maps to `llm.mdb.ai`; any other
/// host, or `mdb.ai` on an explicit port, gets an `ai.` prefix. Scheme and
/// port are kept, the path is dropped.
pub fn model_base_url(control_plane: &Url) -> Result<Url> {
    let host = control_plane
        .host_str()
        .ok_or_else(|| Error::Config(format!("base URL has no host: {}", control_plane)))?;

    // `port()` is None when the port is the scheme default
    let model_host = if host == DEFAULT_CONTROL_HOST && control_plane.port().is_none() {
        DEFAULT_MODEL_HOST.to_string()
    } else {
        format!("ai.{}", host)
    };

    let mut url = control_plane.clone();
    url.set_host(Some(&model_host))?;
    url.set_path("");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Chat completion API client.
pub struct CompletionApi {
    client: MindsClient,
}

impl CompletionApi {
    pub(crate) fn new(client: MindsClient) -> Self {
        Self { client }
    }

    /// Base URL completions are sent to.
    pub fn base_url(&self) -> Result<Url> {
        let inner = self.client.inner();
        match &inner.completion_base_url {
            Some(url) => Ok(url.clone()),
            None => model_base_url(&inner.base_url),
        }
    }

    fn completions_url(&self) -> Result<Url> {
        let mut base = self.base_url()?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(base.join("chat/completions")?)
    }

    async fn send(&self, mind: &str, message: &str, stream: bool) -> Result<reqwest::Response> {
        let request = ChatCompletionRequest {
            model: mind.to_string(),
            messages: vec![ChatMessage::user(message)],
            stream,
        };
        let url = self.completions_url()?;
        self.client
            .send(self.client.request(Method::POST, url).json(&request))
            .await
    }

    /// Ask a mind a question and wait for the whole answer.
    pub async fn complete(&self, mind: &str, message: &str) -> Result<String> {
        let response: ChatCompletionResponse = self.send(mind, message, false).await?.json().await?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| Error::InvalidResponse("completion returned no choices".to_string()))
    }

    /// Ask a mind a question and receive the answer as it is generated.
    ///
    /// Yields the first choice's delta content of every chunk; chunks with
    /// no choices are skipped.
    pub async fn stream(&self, mind: &str, message: &str) -> Result<CompletionStream> {
        let response = self.send(mind, message, true).await?;
        let events = response.bytes_stream().eventsource();

        Ok(Box::pin(events.filter_map(|result| async move {
            match result {
                Ok(event) => {
                    if event.data.is_empty() || event.data == "[DONE]" {
                        return None;
                    }
                    match serde_json::from_str::<ChatCompletionChunk>(&event.data) {
                        Ok(chunk) => chunk
                            .choices
                            .into_iter()
                            .next()
                            .map(|choice| Ok(choice.delta.content.unwrap_or_default())),
                        Err(e) => {
                            tracing::warn!(data = %event.data, error = %e, "Failed to parse completion chunk");
                            Some(Err(Error::Json(e)))
                        }
                    }
                }
                Err(e) => Some(Err(Error::Stream(e.to_string()))),
            }
        })))
    }
}
