//! Minds command - mind management and attachments.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};
use minds_client::{DatasourceRef, DatasourceTableOverride, Mind, MindConfig, MindUpdate};
use serde_json::{Value, json};

use super::{Context, ModeArg, done, parse_pairs};

/// Arguments for the minds command.
#[derive(Args, Debug)]
pub struct MindsArgs {
    #[command(subcommand)]
    pub command: MindsCommand,
}

#[derive(Subcommand, Debug)]
pub enum MindsCommand {
    /// List minds in the project
    List,

    /// Show one mind
    Get {
        /// Mind name
        name: String,
    },

    /// Create a mind
    Create {
        /// Mind name
        name: String,

        #[command(flatten)]
        fields: MindFields,

        /// What to do if the name is taken
        #[arg(long, value_enum, default_value_t = ModeArg::Insert)]
        mode: ModeArg,
    },

    /// Change a mind; only the given fields are sent
    Update {
        /// Mind name
        name: String,

        /// Rename the mind
        #[arg(long)]
        rename: Option<String>,

        #[command(flatten)]
        fields: MindFields,
    },

    /// Delete a mind
    Drop {
        /// Mind name
        name: String,
    },

    /// Attach an existing datasource
    AddDatasource {
        /// Mind name
        mind: String,

        /// Datasource name
        datasource: String,

        /// Only expose these tables (repeatable)
        #[arg(short, long = "table")]
        tables: Vec<String>,
    },

    /// Detach a datasource
    RemoveDatasource {
        /// Mind name
        mind: String,

        /// Datasource name
        datasource: String,
    },

    /// Attach an existing knowledge base
    AddKb {
        /// Mind name
        mind: String,

        /// Knowledge base name
        knowledge_base: String,
    },

    /// Detach a knowledge base
    RemoveKb {
        /// Mind name
        mind: String,

        /// Knowledge base name
        knowledge_base: String,
    },
}

/// Mind fields shared by create and update.
#[derive(Args, Debug)]
pub struct MindFields {
    /// LLM model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// LLM provider
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Instructions given to the LLM
    #[arg(long)]
    pub prompt_template: Option<String>,

    /// Datasource name (repeatable)
    #[arg(short, long = "datasource")]
    pub datasources: Vec<String>,

    /// Knowledge base name (repeatable)
    #[arg(short, long = "kb")]
    pub knowledge_bases: Vec<String>,

    /// Extra parameter as KEY=VALUE (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

/// Run the minds command.
pub async fn run(args: MindsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let api = client.minds();

    match args.command {
        MindsCommand::List => {
            let minds = api.list().await?;
            if ctx.json_output {
                let views: Vec<Value> = minds.iter().map(mind_view).collect();
                return ctx.print_json(&views);
            }
            let dim = Style::new().dim();
            println!("{}", style("Minds").bold());
            println!("{}", dim.apply_to("─".repeat(50)));
            if minds.is_empty() {
                println!("{}", dim.apply_to("No minds found"));
            }
            for mind in &minds {
                println!(
                    "{} {}",
                    style(mind.name()).cyan(),
                    dim.apply_to(mind.model_name().unwrap_or("-"))
                );
            }
            return Ok(());
        }
        MindsCommand::Get { name } => {
            let mind = api.get(&name).await?;
            return show(ctx, &mind);
        }
        MindsCommand::Create { name, fields, mode } => {
            let mut config = MindConfig::new(name);
            config.model_name = fields.model;
            config.provider = fields.provider;
            config.prompt_template = fields.prompt_template;
            config.datasources = fields.datasources.into_iter().map(Into::into).collect();
            config.knowledge_bases = fields.knowledge_bases.into_iter().map(Into::into).collect();
            if !fields.params.is_empty() {
                config.parameters = Some(parse_pairs(&fields.params)?);
            }
            let mind = api.create_with_mode(config, mode.into()).await?;
            done(ctx, format!("Mind created: {}", mind.name()));
            return show(ctx, &mind);
        }
        MindsCommand::Update {
            name,
            rename,
            fields,
        } => {
            let mut mind = api.get(&name).await?;
            tracing::debug!(mind = %name, rename = ?rename, "updating mind");
            let update = MindUpdate {
                name: rename,
                model_name: fields.model,
                provider: fields.provider,
                prompt_template: fields.prompt_template,
                datasources: non_empty(fields.datasources)
                    .map(|names| names.into_iter().map(Into::into).collect()),
                knowledge_bases: non_empty(fields.knowledge_bases)
                    .map(|names| names.into_iter().map(Into::into).collect()),
                parameters: if fields.params.is_empty() {
                    None
                } else {
                    Some(parse_pairs(&fields.params)?)
                },
            };
            mind.update(update).await?;
            done(ctx, format!("Mind updated: {}", mind.name()));
            return show(ctx, &mind);
        }
        MindsCommand::Drop { name } => {
            api.drop(&name).await?;
            done(ctx, format!("Mind dropped: {}", name));
        }
        MindsCommand::AddDatasource {
            mind,
            datasource,
            tables,
        } => {
            let mut mind = api.get(&mind).await?;
            let reference: DatasourceRef = if tables.is_empty() {
                datasource.clone().into()
            } else {
                DatasourceTableOverride::new(datasource.clone(), tables).into()
            };
            mind.add_datasource(reference).await?;
            done(ctx, format!("Attached {} to {}", datasource, mind.name()));
        }
        MindsCommand::RemoveDatasource { mind, datasource } => {
            let mut mind = api.get(&mind).await?;
            mind.del_datasource(datasource.as_str()).await?;
            done(ctx, format!("Detached {} from {}", datasource, mind.name()));
        }
        MindsCommand::AddKb {
            mind,
            knowledge_base,
        } => {
            let mut mind = api.get(&mind).await?;
            mind.add_knowledge_base(knowledge_base.as_str()).await?;
            done(ctx, format!("Attached {} to {}", knowledge_base, mind.name()));
        }
        MindsCommand::RemoveKb {
            mind,
            knowledge_base,
        } => {
            let mut mind = api.get(&mind).await?;
            mind.del_knowledge_base(knowledge_base.as_str()).await?;
            done(
                ctx,
                format!("Detached {} from {}", knowledge_base, mind.name()),
            );
        }
    }

    if ctx.json_output {
        ctx.print_json(&json!({ "ok": true }))?;
    }
    Ok(())
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() { None } else { Some(values) }
}

/// JSON view of a mind's server state.
fn mind_view(mind: &Mind) -> Value {
    json!({
        "name": mind.name(),
        "model_name": mind.model_name(),
        "provider": mind.provider(),
        "prompt_template": mind.prompt_template(),
        "parameters": mind.parameters(),
        "datasources": mind.datasources(),
        "knowledge_bases": mind.knowledge_bases(),
        "created_at": mind.created_at(),
        "updated_at": mind.updated_at(),
    })
}

fn show(ctx: &Context, mind: &Mind) -> Result<()> {
    if ctx.json_output {
        return ctx.print_json(&mind_view(mind));
    }

    let dim = Style::new().dim();
    println!("{}", style(mind.name()).bold());
    println!("{}", dim.apply_to("─".repeat(50)));
    println!("Model:           {}", mind.model_name().unwrap_or("-"));
    println!("Provider:        {}", mind.provider().unwrap_or("-"));
    println!("Datasources:     {}", list_or_dash(mind.datasources()));
    println!("Knowledge bases: {}", list_or_dash(mind.knowledge_bases()));
    if let Some(template) = mind.prompt_template() {
        println!("Prompt template: {}", dim.apply_to(template));
    }
    if ctx.verbose {
        for (key, value) in mind.parameters() {
            println!("  {} {}", dim.apply_to(format!("{}:", key)), value);
        }
        if let Some(created) = mind.created_at() {
            println!("{}", dim.apply_to(format!("Created {}", created)));
        }
    }
    Ok(())
}

fn list_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}
