//! Request and response types for the Minds API.
//!
//! Configuration types (`*Config`) are client-side templates with no server
//! identity until they pass through a `create` call. Wire types mirror the
//! server's JSON contract.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Table that knowledge base embeddings are stored in unless configured.
pub const DEFAULT_VECTOR_TABLE: &str = "embeddings";

/// LLM used for contextual preprocessing unless configured.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";

/// Provider of [`DEFAULT_LLM_MODEL`].
pub const DEFAULT_LLM_PROVIDER: &str = "openai";

/// Free-form JSON object.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// How `create` behaves when a resource with the same name may already exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CreateMode {
    /// Create-if-absent; the server rejects an existing name.
    #[default]
    Insert,
    /// Delete any existing resource of that name, then create.
    Replace,
    /// Idempotent upsert addressed by name (PUT).
    Update,
}

// ─────────────────────────────────────────────────────────────────────────────
// Datasources
// ─────────────────────────────────────────────────────────────────────────────

/// Template for creating a server-side datasource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasourceConfig {
    /// Datasource name.
    pub name: String,
    /// Database handler, e.g. `postgres` or `mysql`.
    pub engine: String,
    /// What the data is; minds read this to decide when to query it.
    pub description: String,
    /// Credentials and connection parameters.
    #[serde(default, deserialize_with = "null_as_default")]
    pub connection_data: HashMap<String, serde_json::Value>,
    /// Optional allow-list of tables.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tables: Vec<String>,
}

impl DatasourceConfig {
    /// Create a config with no connection data and no table restriction.
    pub fn new(
        name: impl Into<String>,
        engine: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            engine: engine.into(),
            description: description.into(),
            connection_data: HashMap::new(),
            tables: Vec::new(),
        }
    }

    /// Add one connection parameter.
    pub fn with_connection(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.connection_data.insert(key.into(), value.into());
        self
    }

    /// Replace the connection data.
    pub fn with_connection_data(mut self, data: HashMap<String, serde_json::Value>) -> Self {
        self.connection_data = data;
        self
    }

    /// Restrict the datasource to these tables.
    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = tables.into_iter().map(Into::into).collect();
        self
    }

    /// The public demo Postgres database.
    pub fn example() -> Self {
        Self::new("example_ds", "postgres", "Minds example database")
            .with_connection("user", "demo_user")
            .with_connection("password", "demo_password")
            .with_connection("host", "samples.mindsdb.com")
            .with_connection("port", "5432")
            .with_connection("database", "demo")
            .with_connection("schema", "demo_data")
    }
}

/// A datasource known to exist on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datasource {
    /// Datasource name.
    pub name: String,
    /// Database handler.
    pub engine: String,
    /// Description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Connection parameters as stored by the server.
    #[serde(default, deserialize_with = "null_as_default")]
    pub connection_data: HashMap<String, serde_json::Value>,
    /// Table allow-list.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tables: Vec<String>,
}

impl From<Datasource> for DatasourceConfig {
    fn from(ds: Datasource) -> Self {
        Self {
            name: ds.name,
            engine: ds.engine,
            description: ds.description,
            connection_data: ds.connection_data,
            tables: ds.tables,
        }
    }
}

/// Restricts which tables of an existing datasource a mind may query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasourceTableOverride {
    /// Name of the existing datasource.
    pub name: String,
    /// Tables the mind may use.
    pub tables: Vec<String>,
}

impl DatasourceTableOverride {
    /// Create an override for `name` limited to `tables`.
    pub fn new<I, S>(name: impl Into<String>, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            tables: tables.into_iter().map(Into::into).collect(),
        }
    }
}

/// One entry of a mind's datasource list on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatasourceEntry {
    /// Whole datasource, by name.
    Name(String),
    /// Datasource restricted to some tables.
    Restricted {
        /// Datasource name.
        name: String,
        /// Allowed tables.
        tables: Vec<String>,
    },
}

impl DatasourceEntry {
    /// Name of the referenced datasource.
    pub fn name(&self) -> &str {
        match self {
            DatasourceEntry::Name(name) => name,
            DatasourceEntry::Restricted { name, .. } => name,
        }
    }
}

/// Body of a datasource drop with `force`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CascadeRequest {
    pub cascade: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Knowledge bases
// ─────────────────────────────────────────────────────────────────────────────

/// Underlying vector store for knowledge base embeddings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Vector store engine, e.g. `pgvector`.
    pub engine: String,
    /// Connection parameters.
    #[serde(default)]
    pub connection_data: HashMap<String, serde_json::Value>,
    /// Table holding the embeddings.
    #[serde(default = "default_vector_table")]
    pub table: String,
}

fn default_vector_table() -> String {
    DEFAULT_VECTOR_TABLE.to_string()
}

impl VectorStoreConfig {
    /// Create a vector store config using the default table.
    pub fn new(engine: impl Into<String>, connection_data: HashMap<String, serde_json::Value>) -> Self {
        Self {
            engine: engine.into(),
            connection_data,
            table: default_vector_table(),
        }
    }

    /// Store embeddings in `table`.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }
}

/// Embedding model for a knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding provider, e.g. `openai`.
    pub provider: String,
    /// Model name.
    pub model: String,
    /// Extra provider parameters, sent alongside provider and model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<JsonMap>,
}

impl EmbeddingConfig {
    /// Create an embedding config with no extra parameters.
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            params: None,
        }
    }

    /// Attach extra provider parameters.
    pub fn with_params(mut self, params: JsonMap) -> Self {
        self.params = Some(params);
        self
    }
}

/// Template for creating a knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// Knowledge base name.
    pub name: String,
    /// What the knowledge base holds.
    pub description: String,
    /// Vector store; the server picks one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_store_config: Option<VectorStoreConfig>,
    /// Embedding model; the server picks one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_config: Option<EmbeddingConfig>,
    /// Retrieval pipeline parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<JsonMap>,
}

impl KnowledgeBaseConfig {
    /// Create a config with server-chosen storage and embeddings.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            vector_store_config: None,
            embedding_config: None,
            params: None,
        }
    }

    /// Use a specific vector store.
    pub fn with_vector_store(mut self, config: VectorStoreConfig) -> Self {
        self.vector_store_config = Some(config);
        self
    }

    /// Use a specific embedding model.
    pub fn with_embedding(mut self, config: EmbeddingConfig) -> Self {
        self.embedding_config = Some(config);
        self
    }

    /// Set retrieval parameters.
    pub fn with_params(mut self, params: JsonMap) -> Self {
        self.params = Some(params);
        self
    }
}

/// Vector store block of a knowledge base create request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct VectorStoreBody {
    pub engine: String,
    pub connection_data: HashMap<String, serde_json::Value>,
    pub table: String,
}

/// Knowledge base create request, flattened into the server's shape.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateKnowledgeBaseRequest {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_store: Option<VectorStoreBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<JsonMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<JsonMap>,
}

impl From<&KnowledgeBaseConfig> for CreateKnowledgeBaseRequest {
    fn from(config: &KnowledgeBaseConfig) -> Self {
        let vector_store = config.vector_store_config.as_ref().map(|vs| VectorStoreBody {
            engine: vs.engine.clone(),
            connection_data: vs.connection_data.clone(),
            table: vs.table.clone(),
        });

        let embedding_model = config.embedding_config.as_ref().map(|emb| {
            let mut model = JsonMap::new();
            model.insert("provider".into(), emb.provider.clone().into());
            model.insert("name".into(), emb.model.clone().into());
            if let Some(params) = &emb.params {
                model.extend(params.clone());
            }
            model
        });

        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            vector_store,
            embedding_model,
            params: config.params.clone(),
        }
    }
}

/// Knowledge base as listed by the server. Only the name is used.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct KnowledgeBaseRecord {
    pub name: String,
}

/// Document identifier: the server accepts integers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    /// Numeric id.
    Int(i64),
    /// String id.
    Text(String),
}

impl From<i64> for DocumentId {
    fn from(id: i64) -> Self {
        DocumentId::Int(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        DocumentId::Text(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        DocumentId::Text(id)
    }
}

/// A document inserted directly into a knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseDocument {
    /// Document id.
    pub id: DocumentId,
    /// Text content.
    pub content: String,
    /// Arbitrary metadata.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl KnowledgeBaseDocument {
    /// Create a document with no metadata.
    pub fn new(id: impl Into<DocumentId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// What to ingest into a knowledge base.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestSource {
    /// Results of a SQL query against a connected datasource.
    Query(String),
    /// Documents supplied inline.
    Documents(Vec<KnowledgeBaseDocument>),
    /// Web pages to crawl.
    Urls(Vec<String>),
    /// Names of files already uploaded to the platform.
    Files(Vec<String>),
}

/// Ingestion request body. Exactly one source field is set.
#[derive(Debug, Default, Serialize)]
pub(crate) struct IngestRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<&'a [KnowledgeBaseDocument]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocessing: Option<&'a PreprocessingConfig>,
}

impl<'a> IngestRequest<'a> {
    pub(crate) fn new(source: &'a IngestSource, preprocessing: Option<&'a PreprocessingConfig>) -> Self {
        let mut request = Self {
            preprocessing,
            ..Default::default()
        };
        match source {
            IngestSource::Query(query) => request.query = Some(query.as_str()),
            IngestSource::Documents(rows) => request.rows = Some(rows.as_slice()),
            IngestSource::Urls(urls) => request.urls = Some(urls.as_slice()),
            IngestSource::Files(files) => request.files = Some(files.as_slice()),
        }
        request
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Preprocessing
// ─────────────────────────────────────────────────────────────────────────────

/// Chunking applied to text before it is embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextChunkingConfig {
    /// Separators to split on, in priority order.
    pub separators: Vec<String>,
    /// Target chunk size in characters.
    pub chunk_size: u32,
    /// Characters shared between neighbouring chunks.
    pub chunk_overlap: u32,
}

impl Default for TextChunkingConfig {
    fn default() -> Self {
        Self {
            separators: ["\n\n", "\n", " ", ""].map(String::from).to_vec(),
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// LLM used to generate chunk context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model name.
    pub model_name: String,
    /// Model provider.
    pub provider: String,
    /// Extra parameters passed when initialising the LLM.
    pub params: JsonMap,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_LLM_MODEL.to_string(),
            provider: DEFAULT_LLM_PROVIDER.to_string(),
            params: JsonMap::new(),
        }
    }
}

/// Contextual preprocessing: chunks are enriched with LLM-generated context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextualConfig {
    /// LLM that writes the context.
    pub llm_config: LlmConfig,
    /// Custom context generation template.
    pub context_template: Option<String>,
    /// Target chunk size in characters.
    pub chunk_size: u32,
    /// Characters shared between neighbouring chunks.
    pub chunk_overlap: u32,
}

impl Default for ContextualConfig {
    fn default() -> Self {
        Self {
            llm_config: LlmConfig::default(),
            context_template: None,
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Preprocessing applied during knowledge base ingestion.
///
/// On the wire this is `{"type": ..., "<type>_config": {...}}`. A payload
/// that names a type but omits its config gets the default config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PreprocessingWire", into = "PreprocessingWire")]
pub enum PreprocessingConfig {
    /// LLM-contextualised chunks.
    Contextual(ContextualConfig),
    /// Plain text chunking.
    TextChunking(TextChunkingConfig),
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        PreprocessingConfig::TextChunking(TextChunkingConfig::default())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PreprocessingType {
    Contextual,
    TextChunking,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PreprocessingWire {
    #[serde(rename = "type")]
    kind: PreprocessingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contextual_config: Option<ContextualConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text_chunking_config: Option<TextChunkingConfig>,
}

impl From<PreprocessingWire> for PreprocessingConfig {
    fn from(wire: PreprocessingWire) -> Self {
        match wire.kind {
            PreprocessingType::Contextual => {
                PreprocessingConfig::Contextual(wire.contextual_config.unwrap_or_default())
            }
            PreprocessingType::TextChunking => {
                PreprocessingConfig::TextChunking(wire.text_chunking_config.unwrap_or_default())
            }
        }
    }
}

impl From<PreprocessingConfig> for PreprocessingWire {
    fn from(config: PreprocessingConfig) -> Self {
        match config {
            PreprocessingConfig::Contextual(c) => Self {
                kind: PreprocessingType::Contextual,
                contextual_config: Some(c),
                text_chunking_config: None,
            },
            PreprocessingConfig::TextChunking(c) => Self {
                kind: PreprocessingType::TextChunking,
                contextual_config: None,
                text_chunking_config: Some(c),
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Minds
// ─────────────────────────────────────────────────────────────────────────────

/// Mind as returned by the server.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MindRecord {
    pub name: String,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: JsonMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub datasources: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub knowledge_bases: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Full mind body for POST (create) and PUT (upsert).
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateMindRequest {
    pub name: String,
    pub model_name: Option<String>,
    pub provider: Option<String>,
    pub parameters: JsonMap,
    pub datasources: Vec<DatasourceEntry>,
    pub knowledge_bases: Vec<String>,
}

/// Partial mind body for PATCH. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct UpdateMindRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<JsonMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasources: Option<Vec<DatasourceEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_bases: Option<Vec<String>>,
}

/// Body attaching a datasource to a mind.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AttachDatasourceRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<String>>,
}

impl From<DatasourceEntry> for AttachDatasourceRequest {
    fn from(entry: DatasourceEntry) -> Self {
        match entry {
            DatasourceEntry::Name(name) => Self { name, tables: None },
            DatasourceEntry::Restricted { name, tables } => Self {
                name,
                tables: Some(tables),
            },
        }
    }
}

/// Body attaching a knowledge base to a mind.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AttachKnowledgeBaseRequest {
    pub name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat completion (OpenAI-compatible)
// ─────────────────────────────────────────────────────────────────────────────

/// A chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender role (`user`, `assistant`, `system`).
    pub role: String,
    /// Message text.
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

/// Chat completion request; `model` is the mind name.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// Non-streaming chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatMessage,
}

/// One streamed chat completion chunk.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}
