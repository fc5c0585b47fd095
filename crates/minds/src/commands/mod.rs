//! CLI command handlers.

pub mod ask;
pub mod datasources;
pub mod knowledge_bases;
pub mod minds;

use anyhow::{Context as _, Result};
use clap::ValueEnum;
use console::Style;
use minds_client::{CreateMode, MindsClient};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// API key, from `--api-key` or the environment.
    pub api_key: Option<String>,
    /// Control-plane URL override.
    pub base_url: Option<String>,
    /// Project override.
    pub project: Option<String>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Build an API client from the global flags.
    pub fn client(&self) -> Result<MindsClient> {
        let api_key = self
            .api_key
            .as_deref()
            .context("no API key: pass --api-key or set MINDS_API_KEY")?;

        let mut builder = MindsClient::builder().api_key(api_key);
        if let Some(ref url) = self.base_url {
            builder = builder.base_url(url);
        }
        if let Some(ref project) = self.project {
            builder = builder.project(project);
        }
        let client = builder.build()?;
        tracing::debug!(base_url = %client.base_url(), project = client.project(), "client ready");

        if self.verbose {
            let dim = Style::new().dim();
            eprintln!(
                "{}",
                dim.apply_to(format!(
                    "Using {} (project {})",
                    client.base_url(),
                    client.project()
                ))
            );
        }
        Ok(client)
    }

    /// Print a value as pretty JSON.
    pub fn print_json<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Conflict handling for create commands.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Fail if the name is taken
    Insert,
    /// Delete any existing resource first
    Replace,
    /// Create or overwrite in place
    Update,
}

impl From<ModeArg> for CreateMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Insert => CreateMode::Insert,
            ModeArg::Replace => CreateMode::Replace,
            ModeArg::Update => CreateMode::Update,
        }
    }
}

/// Print a success line, unless JSON output was requested.
pub fn done(ctx: &Context, message: impl std::fmt::Display) {
    if !ctx.json_output {
        let green = Style::new().green();
        println!("{} {}", green.apply_to("✓"), message);
    }
}

/// Parse repeated `KEY=VALUE` arguments into a JSON object.
///
/// Values that parse as JSON keep their type; anything else is a string.
pub fn parse_pairs(pairs: &[String]) -> Result<serde_json::Map<String, serde_json::Value>> {
    let mut map = serde_json::Map::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("expected KEY=VALUE, got '{}'", pair))?;
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        map.insert(key.to_string(), value);
    }
    Ok(map)
}
