//! Reference resolution for datasources and knowledge bases.
//!
//! Anywhere a mind accepts a datasource or knowledge base, the caller may
//! pass a bare name, a live handle, or an unsaved config. The resolver turns
//! each of these into the name sent to the server:
//!
//! - a name is passed through without checking that it exists;
//! - a handle already exists, so its name is taken with no request;
//! - a config has its name checked locally, then is looked up by name and
//!   created only when the lookup returns `NotFound`. An existing resource is left as it is, even if the config
//!   differs from it.
//!
//! Lookup and creation are two separate requests, so two callers resolving
//! the same new name at once may race; the losing create fails and the error
//! reaches the caller.

use crate::api::KnowledgeBase;
use crate::client::MindsClient;
use crate::error::{ignore_not_found, Error, Result};
use crate::types::{
    Datasource, DatasourceConfig, DatasourceEntry, DatasourceTableOverride, KnowledgeBaseConfig,
};
use crate::validation::validate_datasource_name;

/// A datasource as a caller may refer to it.
#[derive(Debug, Clone)]
pub enum DatasourceRef {
    /// Name of a datasource assumed to exist.
    Name(String),
    /// Datasource returned by a previous `get` or `create`.
    Datasource(Datasource),
    /// Datasource to create if it does not exist yet.
    Config(DatasourceConfig),
    /// Existing datasource, restricted to some of its tables.
    Tables(DatasourceTableOverride),
}

impl From<&str> for DatasourceRef {
    fn from(name: &str) -> Self {
        DatasourceRef::Name(name.to_string())
    }
}

impl From<String> for DatasourceRef {
    fn from(name: String) -> Self {
        DatasourceRef::Name(name)
    }
}

impl From<Datasource> for DatasourceRef {
    fn from(ds: Datasource) -> Self {
        DatasourceRef::Datasource(ds)
    }
}

impl From<&Datasource> for DatasourceRef {
    fn from(ds: &Datasource) -> Self {
        DatasourceRef::Datasource(ds.clone())
    }
}

impl From<DatasourceConfig> for DatasourceRef {
    fn from(config: DatasourceConfig) -> Self {
        DatasourceRef::Config(config)
    }
}

impl From<&DatasourceConfig> for DatasourceRef {
    fn from(config: &DatasourceConfig) -> Self {
        DatasourceRef::Config(config.clone())
    }
}

impl From<DatasourceTableOverride> for DatasourceRef {
    fn from(tables: DatasourceTableOverride) -> Self {
        DatasourceRef::Tables(tables)
    }
}

impl DatasourceRef {
    /// Name this reference points at.
    pub fn name(&self) -> &str {
        match self {
            DatasourceRef::Name(name) => name,
            DatasourceRef::Datasource(ds) => &ds.name,
            DatasourceRef::Config(config) => &config.name,
            DatasourceRef::Tables(tables) => &tables.name,
        }
    }

    /// Name of a datasource known to be committed, for detaching.
    ///
    /// Unsaved configs are rejected: detaching something that may never
    /// have been created is a caller error.
    pub(crate) fn committed_name(&self) -> Result<&str> {
        match self {
            DatasourceRef::Name(name) => Ok(name),
            DatasourceRef::Datasource(ds) => Ok(&ds.name),
            DatasourceRef::Config(_) | DatasourceRef::Tables(_) => Err(Error::InvalidReference(
                format!(
                    "datasource '{}' must be given by name or as a Datasource",
                    self.name()
                ),
            )),
        }
    }
}

/// A knowledge base as a caller may refer to it.
#[derive(Debug, Clone)]
pub enum KnowledgeBaseRef {
    /// Name of a knowledge base assumed to exist.
    Name(String),
    /// Knowledge base returned by a previous `get` or `create`.
    KnowledgeBase(KnowledgeBase),
    /// Knowledge base to create if it does not exist yet.
    Config(KnowledgeBaseConfig),
}

impl From<&str> for KnowledgeBaseRef {
    fn from(name: &str) -> Self {
        KnowledgeBaseRef::Name(name.to_string())
    }
}

impl From<String> for KnowledgeBaseRef {
    fn from(name: String) -> Self {
        KnowledgeBaseRef::Name(name)
    }
}

impl From<KnowledgeBase> for KnowledgeBaseRef {
    fn from(kb: KnowledgeBase) -> Self {
        KnowledgeBaseRef::KnowledgeBase(kb)
    }
}

impl From<&KnowledgeBase> for KnowledgeBaseRef {
    fn from(kb: &KnowledgeBase) -> Self {
        KnowledgeBaseRef::KnowledgeBase(kb.clone())
    }
}

impl From<KnowledgeBaseConfig> for KnowledgeBaseRef {
    fn from(config: KnowledgeBaseConfig) -> Self {
        KnowledgeBaseRef::Config(config)
    }
}

impl From<&KnowledgeBaseConfig> for KnowledgeBaseRef {
    fn from(config: &KnowledgeBaseConfig) -> Self {
        KnowledgeBaseRef::Config(config.clone())
    }
}

impl KnowledgeBaseRef {
    /// Name this reference points at.
    pub fn name(&self) -> &str {
        match self {
            KnowledgeBaseRef::Name(name) => name,
            KnowledgeBaseRef::KnowledgeBase(kb) => kb.name(),
            KnowledgeBaseRef::Config(config) => &config.name,
        }
    }

    /// Name of a knowledge base known to be committed, for detaching.
    pub(crate) fn committed_name(&self) -> Result<&str> {
        match self {
            KnowledgeBaseRef::Name(name) => Ok(name),
            KnowledgeBaseRef::KnowledgeBase(kb) => Ok(kb.name()),
            KnowledgeBaseRef::Config(config) => Err(Error::InvalidReference(format!(
                "knowledge base '{}' must be given by name or as a KnowledgeBase",
                config.name
            ))),
        }
    }
}

/// Turns references into server-side names, creating missing resources.
pub struct Resolver {
    client: MindsClient,
}

impl Resolver {
    pub(crate) fn new(client: MindsClient) -> Self {
        Self { client }
    }

    /// Resolve one datasource reference.
    ///
    /// A table override cannot be created (it carries no connection data),
    /// so its datasource must already exist; `NotFound` is returned otherwise.
    pub async fn datasource(&self, reference: &DatasourceRef) -> Result<DatasourceEntry> {
        match reference {
            DatasourceRef::Name(name) => Ok(DatasourceEntry::Name(name.clone())),
            DatasourceRef::Datasource(ds) => Ok(DatasourceEntry::Name(ds.name.clone())),
            DatasourceRef::Config(config) => {
                validate_datasource_name(&config.name)?;
                let datasources = self.client.datasources();
                if ignore_not_found(datasources.get(&config.name).await)?.is_none() {
                    tracing::debug!(datasource = %config.name, "creating missing datasource");
                    datasources.create(config).await?;
                }
                Ok(DatasourceEntry::Name(config.name.clone()))
            }
            DatasourceRef::Tables(tables) => {
                self.client.datasources().get(&tables.name).await?;
                Ok(DatasourceEntry::Restricted {
                    name: tables.name.clone(),
                    tables: tables.tables.clone(),
                })
            }
        }
    }

    /// Resolve datasource references in order.
    pub async fn datasources(&self, references: &[DatasourceRef]) -> Result<Vec<DatasourceEntry>> {
        let mut entries = Vec::with_capacity(references.len());
        for reference in references {
            entries.push(self.datasource(reference).await?);
        }
        Ok(entries)
    }

    /// Resolve one knowledge base reference.
    pub async fn knowledge_base(&self, reference: &KnowledgeBaseRef) -> Result<String> {
        match reference {
            KnowledgeBaseRef::Name(name) => Ok(name.clone()),
            KnowledgeBaseRef::KnowledgeBase(kb) => Ok(kb.name().to_string()),
            KnowledgeBaseRef::Config(config) => {
                let knowledge_bases = self.client.knowledge_bases();
                if ignore_not_found(knowledge_bases.get(&config.name).await)?.is_none() {
                    tracing::debug!(knowledge_base = %config.name, "creating missing knowledge base");
                    knowledge_bases.create(config).await?;
                }
                Ok(config.name.clone())
            }
        }
    }

    /// Resolve knowledge base references in order.
    pub async fn knowledge_bases(&self, references: &[KnowledgeBaseRef]) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(references.len());
        for reference in references {
            names.push(self.knowledge_base(reference).await?);
        }
        Ok(names)
    }
}
