//! Datasources API.

use crate::client::MindsClient;
use crate::error::{ignore_not_found, Error, Result};
use crate::types::{CascadeRequest, CreateMode, Datasource, DatasourceConfig};
use crate::validation::validate_datasource_name;

/// Datasources API client.
pub struct DatasourcesApi {
    client: MindsClient,
}

impl DatasourcesApi {
    pub(crate) fn new(client: MindsClient) -> Self {
        Self { client }
    }

    /// Create a datasource; fails if the name is taken.
    pub async fn create(&self, config: &DatasourceConfig) -> Result<Datasource> {
        self.create_with_mode(config, CreateMode::Insert).await
    }

    /// Create a datasource with explicit conflict handling.
    ///
    /// Whatever the mode, the result is re-read from the server, so it
    /// reflects what the server stored rather than `config`.
    pub async fn create_with_mode(
        &self,
        config: &DatasourceConfig,
        mode: CreateMode,
    ) -> Result<Datasource> {
        let name = &config.name;
        validate_datasource_name(name)?;

        match mode {
            CreateMode::Insert => self.client.post(&["datasources"], config).await?,
            CreateMode::Replace => {
                ignore_not_found(self.drop(name, false).await)?;
                self.client.post(&["datasources"], config).await?;
            }
            CreateMode::Update => {
                self.client.put(&["datasources", name], config).await?
            }
        }

        tracing::info!(datasource = %name, ?mode, "datasource created");
        self.get(name).await
    }

    /// List SQL datasources. Entries without an engine are skipped.
    pub async fn list(&self) -> Result<Vec<Datasource>> {
        let items: Vec<serde_json::Value> = self.client.get(&["datasources"]).await?;
        items
            .into_iter()
            .filter(has_engine)
            .map(|item| serde_json::from_value(item).map_err(Error::from))
            .collect()
    }

    /// Get a datasource by name.
    ///
    /// Fails with [`Error::NotSupported`] when the name belongs to a
    /// resource that is not a SQL datasource.
    pub async fn get(&self, name: &str) -> Result<Datasource> {
        let item: serde_json::Value = self.client.get(&["datasources", name]).await?;
        if !has_engine(&item) {
            return Err(Error::NotSupported(format!(
                "Wrong type of datasource: {}",
                name
            )));
        }
        Ok(serde_json::from_value(item)?)
    }

    /// Delete a datasource.
    ///
    /// With `force`, the server detaches it from every mind that uses it;
    /// otherwise the server refuses to delete a datasource in use.
    pub async fn drop(&self, name: &str, force: bool) -> Result<()> {
        let path = ["datasources", name];
        if force {
            self.client
                .delete_with_body(&path, &CascadeRequest { cascade: true })
                .await?;
        } else {
            self.client.delete(&path).await?;
        }
        tracing::info!(datasource = %name, force, "datasource dropped");
        Ok(())
    }
}

fn has_engine(item: &serde_json::Value) -> bool {
    item.get("engine").is_some_and(|engine| !engine.is_null())
}
