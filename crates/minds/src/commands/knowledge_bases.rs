//! Kb command - knowledge base management and ingestion.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use console::{Style, style};
use minds_client::{
    ContextualConfig, EmbeddingConfig, KnowledgeBaseConfig, PreprocessingConfig,
    TextChunkingConfig,
};
use serde_json::json;

use super::{Context, done};

/// Arguments for the kb command.
#[derive(Args, Debug)]
pub struct KbArgs {
    #[command(subcommand)]
    pub command: KbCommand,
}

#[derive(Subcommand, Debug)]
pub enum KbCommand {
    /// List knowledge bases
    List,

    /// Show one knowledge base
    Get {
        /// Knowledge base name
        name: String,
    },

    /// Create a knowledge base
    Create {
        /// Knowledge base name
        name: String,

        /// What the knowledge base holds
        #[arg(short, long)]
        description: String,

        /// Embedding provider, e.g. openai
        #[arg(long, requires = "embedding_model")]
        embedding_provider: Option<String>,

        /// Embedding model name
        #[arg(long, requires = "embedding_provider")]
        embedding_model: Option<String>,
    },

    /// Delete a knowledge base
    Drop {
        /// Knowledge base name
        name: String,

        /// Also detach it from every mind using it
        #[arg(short, long)]
        force: bool,
    },

    /// Crawl web pages into a knowledge base
    InsertUrls {
        /// Knowledge base name
        name: String,

        /// URLs to crawl
        #[arg(required = true)]
        urls: Vec<String>,

        #[command(flatten)]
        preprocessing: PreprocessingArgs,
    },

    /// Ingest files already uploaded to the platform
    InsertFiles {
        /// Knowledge base name
        name: String,

        /// Uploaded file names
        #[arg(required = true)]
        files: Vec<String>,

        #[command(flatten)]
        preprocessing: PreprocessingArgs,
    },

    /// Ingest the results of a SQL query
    InsertQuery {
        /// Knowledge base name
        name: String,

        /// SELECT statement over a connected datasource
        query: String,

        #[command(flatten)]
        preprocessing: PreprocessingArgs,
    },
}

/// Preprocessing flags shared by the insert commands.
#[derive(Args, Debug)]
pub struct PreprocessingArgs {
    /// Preprocessing strategy; the server default applies when omitted
    #[arg(long, value_enum)]
    pub preprocessing: Option<PreprocessingKind>,

    /// Target chunk size in characters
    #[arg(long, requires = "preprocessing")]
    pub chunk_size: Option<u32>,

    /// Characters shared between neighbouring chunks
    #[arg(long, requires = "preprocessing")]
    pub chunk_overlap: Option<u32>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreprocessingKind {
    /// Plain text chunking
    TextChunking,
    /// Chunks enriched with LLM-generated context
    Contextual,
}

impl PreprocessingArgs {
    fn to_config(&self) -> Option<PreprocessingConfig> {
        let config = match self.preprocessing? {
            PreprocessingKind::TextChunking => {
                let mut c = TextChunkingConfig::default();
                if let Some(size) = self.chunk_size {
                    c.chunk_size = size;
                }
                if let Some(overlap) = self.chunk_overlap {
                    c.chunk_overlap = overlap;
                }
                PreprocessingConfig::TextChunking(c)
            }
            PreprocessingKind::Contextual => {
                let mut c = ContextualConfig::default();
                if let Some(size) = self.chunk_size {
                    c.chunk_size = size;
                }
                if let Some(overlap) = self.chunk_overlap {
                    c.chunk_overlap = overlap;
                }
                PreprocessingConfig::Contextual(c)
            }
        };
        Some(config)
    }
}

/// Run the kb command.
pub async fn run(args: KbArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let api = client.knowledge_bases();
    let dim = Style::new().dim();

    match args.command {
        KbCommand::List => {
            let kbs = api.list().await?;
            let names: Vec<&str> = kbs.iter().map(|kb| kb.name()).collect();
            if ctx.json_output {
                return ctx.print_json(&names);
            }
            println!("{}", style("Knowledge Bases").bold());
            println!("{}", dim.apply_to("─".repeat(50)));
            if names.is_empty() {
                println!("{}", dim.apply_to("No knowledge bases found"));
            }
            for name in names {
                println!("{}", style(name).cyan());
            }
        }
        KbCommand::Get { name } => {
            let kb = api.get(&name).await?;
            if ctx.json_output {
                return ctx.print_json(&json!({ "name": kb.name() }));
            }
            println!("{}", style(kb.name()).bold());
        }
        KbCommand::Create {
            name,
            description,
            embedding_provider,
            embedding_model,
        } => {
            let mut config = KnowledgeBaseConfig::new(name, description);
            if let (Some(provider), Some(model)) = (embedding_provider, embedding_model) {
                config = config.with_embedding(EmbeddingConfig::new(provider, model));
            }
            let kb = api.create(&config).await?;
            if ctx.json_output {
                return ctx.print_json(&json!({ "name": kb.name() }));
            }
            done(ctx, format!("Knowledge base created: {}", kb.name()));
        }
        KbCommand::Drop { name, force } => {
            api.drop(&name, force).await?;
            done(ctx, format!("Knowledge base dropped: {}", name));
        }
        KbCommand::InsertUrls {
            name,
            urls,
            preprocessing,
        } => {
            let count = urls.len();
            tracing::debug!(knowledge_base = %name, count, "inserting urls");
            let kb = api.get(&name).await?;
            kb.insert_urls(urls, preprocessing.to_config().as_ref())
                .await?;
            done(ctx, format!("Submitted {} URL(s) to {}", count, name));
        }
        KbCommand::InsertFiles {
            name,
            files,
            preprocessing,
        } => {
            let count = files.len();
            tracing::debug!(knowledge_base = %name, count, "inserting files");
            let kb = api.get(&name).await?;
            kb.insert_files(files, preprocessing.to_config().as_ref())
                .await?;
            done(ctx, format!("Submitted {} file(s) to {}", count, name));
        }
        KbCommand::InsertQuery {
            name,
            query,
            preprocessing,
        } => {
            tracing::debug!(knowledge_base = %name, "inserting query results");
            let kb = api.get(&name).await?;
            kb.insert_from_select(query, preprocessing.to_config().as_ref())
                .await?;
            done(ctx, format!("Submitted query to {}", name));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_preprocessing_by_default() {
        let args = PreprocessingArgs {
            preprocessing: None,
            chunk_size: None,
            chunk_overlap: None,
        };
        assert!(args.to_config().is_none());
    }

    #[test]
    fn test_chunk_overrides_apply() {
        let args = PreprocessingArgs {
            preprocessing: Some(PreprocessingKind::TextChunking),
            chunk_size: Some(400),
            chunk_overlap: None,
        };
        match args.to_config() {
            Some(PreprocessingConfig::TextChunking(c)) => {
                assert_eq!(c.chunk_size, 400);
                assert_eq!(c.chunk_overlap, 200);
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }
}
