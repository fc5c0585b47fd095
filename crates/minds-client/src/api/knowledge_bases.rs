//! Knowledge bases API.

use std::fmt;

use crate::client::MindsClient;
use crate::error::Result;
use crate::types::{
    CascadeRequest, CreateKnowledgeBaseRequest, IngestRequest, IngestSource, KnowledgeBaseConfig,
    KnowledgeBaseDocument, KnowledgeBaseRecord, PreprocessingConfig,
};

/// Knowledge bases API client.
pub struct KnowledgeBasesApi {
    client: MindsClient,
}

impl KnowledgeBasesApi {
    pub(crate) fn new(client: MindsClient) -> Self {
        Self { client }
    }

    /// Create a knowledge base and return a handle to it.
    pub async fn create(&self, config: &KnowledgeBaseConfig) -> Result<KnowledgeBase> {
        let request = CreateKnowledgeBaseRequest::from(config);
        self.client.post(&["knowledge_bases"], &request).await?;
        tracing::info!(knowledge_base = %config.name, "knowledge base created");
        self.get(&config.name).await
    }

    /// List all knowledge bases.
    pub async fn list(&self) -> Result<Vec<KnowledgeBase>> {
        let records: Vec<KnowledgeBaseRecord> = self.client.get(&["knowledge_bases"]).await?;
        Ok(records
            .into_iter()
            .map(|record| KnowledgeBase::new(record.name, self.client.clone()))
            .collect())
    }

    /// Get a knowledge base by name.
    pub async fn get(&self, name: &str) -> Result<KnowledgeBase> {
        let record: KnowledgeBaseRecord = self
            .client
            .get(&["knowledge_bases", name])
            .await?;
        Ok(KnowledgeBase::new(record.name, self.client.clone()))
    }

    /// Delete a knowledge base. With `force`, detach it from all minds first.
    pub async fn drop(&self, name: &str, force: bool) -> Result<()> {
        let path = ["knowledge_bases", name];
        if force {
            self.client
                .delete_with_body(&path, &CascadeRequest { cascade: true })
                .await?;
        } else {
            self.client.delete(&path).await?;
        }
        tracing::info!(knowledge_base = %name, force, "knowledge base dropped");
        Ok(())
    }
}

/// Handle to a knowledge base that exists on the server.
///
/// Ingestion calls return once the server accepts the request; the
/// ingestion itself runs asynchronously on the server.
#[derive(Clone)]
pub struct KnowledgeBase {
    name: String,
    client: MindsClient,
}

impl fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("name", &self.name)
            .finish()
    }
}

impl KnowledgeBase {
    pub(crate) fn new(name: String, client: MindsClient) -> Self {
        Self { name, client }
    }

    /// Knowledge base name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Submit content for ingestion.
    pub async fn insert(
        &self,
        source: &IngestSource,
        preprocessing: Option<&PreprocessingConfig>,
    ) -> Result<()> {
        let request = IngestRequest::new(source, preprocessing);
        self.client
            .put(&["knowledge_bases", self.name.as_str()], &request)
            .await?;
        tracing::debug!(knowledge_base = %self.name, "ingestion submitted");
        Ok(())
    }

    /// Ingest the rows returned by a SQL query over a connected datasource.
    pub async fn insert_from_select(
        &self,
        query: impl Into<String>,
        preprocessing: Option<&PreprocessingConfig>,
    ) -> Result<()> {
        self.insert(&IngestSource::Query(query.into()), preprocessing)
            .await
    }

    /// Ingest documents directly.
    pub async fn insert_documents(
        &self,
        documents: Vec<KnowledgeBaseDocument>,
        preprocessing: Option<&PreprocessingConfig>,
    ) -> Result<()> {
        self.insert(&IngestSource::Documents(documents), preprocessing)
            .await
    }

    /// Crawl and ingest web pages.
    pub async fn insert_urls(
        &self,
        urls: Vec<String>,
        preprocessing: Option<&PreprocessingConfig>,
    ) -> Result<()> {
        self.insert(&IngestSource::Urls(urls), preprocessing).await
    }

    /// Ingest files previously uploaded to the platform, by name.
    pub async fn insert_files(
        &self,
        files: Vec<String>,
        preprocessing: Option<&PreprocessingConfig>,
    ) -> Result<()> {
        self.insert(&IngestSource::Files(files), preprocessing).await
    }
}
