//! Minds API.
//!
//! A [`Mind`] is a local mirror of server state. Every mutating call writes
//! to the server and then re-reads the whole mind, so the mirror never holds
//! optimistic local edits.

use std::fmt;

use futures::TryStreamExt;

use crate::api::completion::CompletionStream;
use crate::client::MindsClient;
use crate::error::{ignore_not_found, Result};
use crate::resolver::{DatasourceRef, KnowledgeBaseRef};
use crate::types::{
    AttachDatasourceRequest, AttachKnowledgeBaseRequest, CreateMindRequest, CreateMode, JsonMap,
    MindRecord, UpdateMindRequest,
};
use crate::validation::validate_mind_name;

const PROMPT_TEMPLATE_KEY: &str = "prompt_template";

fn minds_path(project: &str) -> [&str; 3] {
    ["projects", project, "minds"]
}

fn mind_path<'a>(project: &'a str, name: &'a str) -> [&'a str; 4] {
    ["projects", project, "minds", name]
}

/// Everything needed to create a mind.
#[derive(Debug, Clone, Default)]
pub struct MindConfig {
    /// Mind name.
    pub name: String,
    /// LLM model name.
    pub model_name: Option<String>,
    /// LLM provider.
    pub provider: Option<String>,
    /// Instructions to the LLM; overrides any `prompt_template` in `parameters`.
    pub prompt_template: Option<String>,
    /// Datasources, resolved (and created if needed) before the request.
    pub datasources: Vec<DatasourceRef>,
    /// Knowledge bases, resolved (and created if needed) before the request.
    pub knowledge_bases: Vec<KnowledgeBaseRef>,
    /// Other mind parameters.
    pub parameters: Option<JsonMap>,
}

impl MindConfig {
    /// Start a config for a mind called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the LLM model.
    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    /// Set the LLM provider.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set the prompt template.
    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }

    /// Attach a datasource.
    pub fn with_datasource(mut self, datasource: impl Into<DatasourceRef>) -> Self {
        self.datasources.push(datasource.into());
        self
    }

    /// Attach a knowledge base.
    pub fn with_knowledge_base(mut self, knowledge_base: impl Into<KnowledgeBaseRef>) -> Self {
        self.knowledge_bases.push(knowledge_base.into());
        self
    }

    /// Set extra parameters.
    pub fn with_parameters(mut self, parameters: JsonMap) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// Changes to apply to a mind. Fields left as `None` are not sent.
///
/// `datasources` and `knowledge_bases`, when set, replace the mind's whole
/// association list.
#[derive(Debug, Clone, Default)]
pub struct MindUpdate {
    /// New name.
    pub name: Option<String>,
    /// New LLM model.
    pub model_name: Option<String>,
    /// New LLM provider.
    pub provider: Option<String>,
    /// New prompt template, merged into `parameters`.
    pub prompt_template: Option<String>,
    /// New datasource list.
    pub datasources: Option<Vec<DatasourceRef>>,
    /// New knowledge base list.
    pub knowledge_bases: Option<Vec<KnowledgeBaseRef>>,
    /// New parameters.
    pub parameters: Option<JsonMap>,
}

/// Minds API client.
pub struct MindsApi {
    client: MindsClient,
}

impl MindsApi {
    pub(crate) fn new(client: MindsClient) -> Self {
        Self { client }
    }

    /// List all minds in the project.
    pub async fn list(&self) -> Result<Vec<Mind>> {
        let records: Vec<MindRecord> = self
            .client
            .get(&minds_path(self.client.project()))
            .await?;
        Ok(records
            .into_iter()
            .map(|record| Mind::from_record(record, self.client.clone()))
            .collect())
    }

    /// Get a mind by name.
    pub async fn get(&self, name: &str) -> Result<Mind> {
        validate_mind_name(name)?;
        let record: MindRecord = self
            .client
            .get(&mind_path(self.client.project(), name))
            .await?;
        Ok(Mind::from_record(record, self.client.clone()))
    }

    /// Create a mind; fails if the name is taken.
    pub async fn create(&self, config: MindConfig) -> Result<Mind> {
        self.create_with_mode(config, CreateMode::Insert).await
    }

    /// Create a mind with explicit conflict handling.
    ///
    /// References in `config` are resolved first, creating any datasource or
    /// knowledge base given as a config that does not exist yet. The result
    /// is re-read from the server.
    pub async fn create_with_mode(&self, config: MindConfig, mode: CreateMode) -> Result<Mind> {
        let project = self.client.project();
        validate_mind_name(&config.name)?;

        if mode == CreateMode::Replace && ignore_not_found(self.get(&config.name).await)?.is_some() {
            ignore_not_found(self.drop(&config.name).await)?;
        }

        let resolver = self.client.resolver();
        let datasources = resolver.datasources(&config.datasources).await?;
        let knowledge_bases = resolver.knowledge_bases(&config.knowledge_bases).await?;

        let mut parameters = config.parameters.unwrap_or_default();
        match config.prompt_template {
            Some(template) => {
                parameters.insert(PROMPT_TEMPLATE_KEY.to_string(), template.into());
            }
            None => {
                if !parameters.contains_key(PROMPT_TEMPLATE_KEY) {
                    parameters.insert(
                        PROMPT_TEMPLATE_KEY.to_string(),
                        self.client.inner().default_prompt_template.clone().into(),
                    );
                }
            }
        }

        let request = CreateMindRequest {
            name: config.name,
            model_name: config.model_name,
            provider: config.provider,
            parameters,
            datasources,
            knowledge_bases,
        };

        match mode {
            CreateMode::Update => {
                self.client
                    .put(&mind_path(project, &request.name), &request)
                    .await?
            }
            CreateMode::Insert | CreateMode::Replace => {
                self.client.post(&minds_path(project), &request).await?
            }
        }

        tracing::info!(mind = %request.name, ?mode, "mind created");
        self.get(&request.name).await
    }

    /// Delete a mind by name.
    pub async fn drop(&self, name: &str) -> Result<()> {
        validate_mind_name(name)?;
        self.client
            .delete(&mind_path(self.client.project(), name))
            .await?;
        tracing::info!(mind = %name, "mind dropped");
        Ok(())
    }
}

/// Local mirror of a mind stored on the server.
#[derive(Clone)]
pub struct Mind {
    name: String,
    model_name: Option<String>,
    provider: Option<String>,
    prompt_template: Option<String>,
    parameters: JsonMap,
    datasources: Vec<String>,
    knowledge_bases: Vec<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
    client: MindsClient,
}

impl fmt::Debug for Mind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mind")
            .field("name", &self.name)
            .field("model_name", &self.model_name)
            .field("provider", &self.provider)
            .field("prompt_template", &self.prompt_template)
            .field("parameters", &self.parameters)
            .field("datasources", &self.datasources)
            .field("knowledge_bases", &self.knowledge_bases)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl Mind {
    fn from_record(mut record: MindRecord, client: MindsClient) -> Self {
        let prompt_template = record
            .parameters
            .remove(PROMPT_TEMPLATE_KEY)
            .and_then(|value| value.as_str().map(String::from));
        Self {
            name: record.name,
            model_name: record.model_name,
            provider: record.provider,
            prompt_template,
            parameters: record.parameters,
            datasources: record.datasources,
            knowledge_bases: record.knowledge_bases,
            created_at: record.created_at,
            updated_at: record.updated_at,
            client,
        }
    }

    /// Mind name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// LLM model name.
    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    /// LLM provider.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Prompt template, taken out of the server's parameters.
    pub fn prompt_template(&self) -> Option<&str> {
        self.prompt_template.as_deref()
    }

    /// Parameters other than the prompt template.
    pub fn parameters(&self) -> &JsonMap {
        &self.parameters
    }

    /// Names of attached datasources.
    pub fn datasources(&self) -> &[String] {
        &self.datasources
    }

    /// Names of attached knowledge bases.
    pub fn knowledge_bases(&self) -> &[String] {
        &self.knowledge_bases
    }

    /// Creation timestamp as reported by the server.
    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    /// Last update timestamp as reported by the server.
    pub fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }

    /// Path segments of this mind, followed by `tail`.
    fn path<'a>(&'a self, tail: &[&'a str]) -> Vec<&'a str> {
        let mut path = mind_path(self.client.project(), &self.name).to_vec();
        path.extend_from_slice(tail);
        path
    }

    /// Re-read this mind from the server.
    pub async fn refresh(&mut self) -> Result<()> {
        let fresh = self.client.minds().get(&self.name).await?;
        *self = fresh;
        Ok(())
    }

    /// Apply `update` on the server, then refresh.
    ///
    /// A rename takes effect locally only after the server accepts it.
    pub async fn update(&mut self, update: MindUpdate) -> Result<()> {
        if let Some(name) = &update.name {
            validate_mind_name(name)?;
        }

        let resolver = self.client.resolver();
        let datasources = match &update.datasources {
            Some(refs) => Some(resolver.datasources(refs).await?),
            None => None,
        };
        let knowledge_bases = match &update.knowledge_bases {
            Some(refs) => Some(resolver.knowledge_bases(refs).await?),
            None => None,
        };

        let mut parameters = update.parameters;
        if let Some(template) = update.prompt_template {
            parameters
                .get_or_insert_with(JsonMap::new)
                .insert(PROMPT_TEMPLATE_KEY.to_string(), template.into());
        }

        let request = UpdateMindRequest {
            name: update.name,
            model_name: update.model_name,
            provider: update.provider,
            parameters,
            datasources,
            knowledge_bases,
        };
        self.client.patch(&self.path(&[]), &request).await?;

        if let Some(name) = request.name {
            self.name = name;
        }
        self.refresh().await
    }

    /// Attach a datasource, creating it first if given as a missing config.
    pub async fn add_datasource(&mut self, datasource: impl Into<DatasourceRef>) -> Result<()> {
        let entry = self
            .client
            .resolver()
            .datasource(&datasource.into())
            .await?;
        self.client
            .post(
                &self.path(&["datasources"]),
                &AttachDatasourceRequest::from(entry),
            )
            .await?;
        self.refresh().await
    }

    /// Detach a datasource given by name or handle.
    pub async fn del_datasource(&mut self, datasource: impl Into<DatasourceRef>) -> Result<()> {
        let datasource = datasource.into();
        let name = datasource.committed_name()?;
        self.client
            .delete(&self.path(&["datasources", name]))
            .await?;
        self.refresh().await
    }

    /// Attach a knowledge base, creating it first if given as a missing config.
    pub async fn add_knowledge_base(
        &mut self,
        knowledge_base: impl Into<KnowledgeBaseRef>,
    ) -> Result<()> {
        let name = self
            .client
            .resolver()
            .knowledge_base(&knowledge_base.into())
            .await?;
        self.client
            .post(
                &self.path(&["knowledge_bases"]),
                &AttachKnowledgeBaseRequest { name },
            )
            .await?;
        self.refresh().await
    }

    /// Detach a knowledge base given by name or handle.
    pub async fn del_knowledge_base(
        &mut self,
        knowledge_base: impl Into<KnowledgeBaseRef>,
    ) -> Result<()> {
        let knowledge_base = knowledge_base.into();
        let name = knowledge_base.committed_name()?;
        self.client
            .delete(&self.path(&["knowledge_bases", name]))
            .await?;
        self.refresh().await
    }

    /// Delete this mind on the server.
    pub async fn drop(self) -> Result<()> {
        self.client.minds().drop(&self.name).await
    }

    /// Ask this mind a question and wait for the whole answer.
    pub async fn completion(&self, message: &str) -> Result<String> {
        self.client.completions().complete(&self.name, message).await
    }

    /// Ask this mind a question and stream the answer as it is generated.
    pub async fn completion_stream(&self, message: &str) -> Result<CompletionStream> {
        self.client.completions().stream(&self.name, message).await
    }

    /// Stream an answer and collect it into one string.
    pub async fn completion_collected(&self, message: &str) -> Result<String> {
        self.completion_stream(message)
            .await?
            .try_collect::<Vec<String>>()
            .await
            .map(|parts| parts.concat())
    }
}
