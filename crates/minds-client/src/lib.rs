//! HTTP client SDK for the Minds platform.
//!
//! This crate maps datasources, knowledge bases, and minds onto the Minds
//! REST API, and proxies chat completions to the model host serving a mind.
//!
//! # Example
//!
//! ```no_run
//! use minds_client::{CreateMode, DatasourceConfig, MindConfig, MindsClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = MindsClient::builder()
//!     .api_key("secret")
//!     .build()?;
//!
//! // A config is created on the server if no datasource of that name exists
//! let postgres = DatasourceConfig::new("my_datasource", "postgres", "Sales data")
//!     .with_connection("host", "samples.mindsdb.com")
//!     .with_tables(["orders"]);
//!
//! let mind = client
//!     .minds()
//!     .create_with_mode(
//!         MindConfig::new("sales_mind").with_datasource(postgres),
//!         CreateMode::Replace,
//!     )
//!     .await?;
//!
//! let answer = mind.completion("How many orders shipped last week?").await?;
//! println!("{}", answer);
//!
//! // Stream the answer instead
//! use futures::StreamExt;
//! let mut stream = mind.completion_stream("And the week before?").await?;
//! while let Some(fragment) = stream.next().await {
//!     print!("{}", fragment?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Datasources**: create (insert, replace, update), list, get, drop
//! - **Knowledge bases**: create, list, get, drop, and ingestion of queries,
//!   documents, URLs and files
//! - **Minds**: create (insert, replace, update), list, get, update, drop,
//!   attach and detach datasources and knowledge bases
//! - **Completions**: blocking and streaming chat completion against a mind

pub mod api;
pub mod client;
pub mod error;
pub mod resolver;
pub mod types;
pub mod validation;

pub use api::{
    model_base_url, CompletionApi, CompletionStream, DatasourcesApi, KnowledgeBase,
    KnowledgeBasesApi, Mind, MindConfig, MindUpdate, MindsApi, DEFAULT_MODEL_HOST,
};
pub use client::{
    ClientBuilder, MindsClient, API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_PROJECT,
    DEFAULT_PROMPT_TEMPLATE,
};
pub use error::{Error, NameKind, Result};
pub use resolver::{DatasourceRef, KnowledgeBaseRef, Resolver};
pub use types::*;
pub use validation::{validate_datasource_name, validate_mind_name};
