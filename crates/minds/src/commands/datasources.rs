//! Datasources command - datasource registry management.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};
use minds_client::{Datasource, DatasourceConfig};

use super::{Context, ModeArg, done, parse_pairs};

/// Arguments for the datasources command.
#[derive(Args, Debug)]
pub struct DatasourcesArgs {
    #[command(subcommand)]
    pub command: DatasourcesCommand,
}

#[derive(Subcommand, Debug)]
pub enum DatasourcesCommand {
    /// List SQL datasources
    List,

    /// Show one datasource
    Get {
        /// Datasource name
        name: String,
    },

    /// Create a datasource
    Create {
        /// Datasource name
        name: String,

        /// Database engine, e.g. postgres
        #[arg(short, long)]
        engine: String,

        /// What the data is about
        #[arg(short, long)]
        description: String,

        /// Connection parameter as KEY=VALUE (repeatable)
        #[arg(short, long = "connection", value_name = "KEY=VALUE")]
        connection: Vec<String>,

        /// Restrict to these tables (repeatable)
        #[arg(short, long = "table")]
        tables: Vec<String>,

        /// What to do if the name is taken
        #[arg(long, value_enum, default_value_t = ModeArg::Insert)]
        mode: ModeArg,
    },

    /// Delete a datasource
    Drop {
        /// Datasource name
        name: String,

        /// Also detach it from every mind using it
        #[arg(short, long)]
        force: bool,
    },
}

/// Run the datasources command.
pub async fn run(args: DatasourcesArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let api = client.datasources();

    match args.command {
        DatasourcesCommand::List => {
            let datasources = api.list().await?;
            if ctx.json_output {
                return ctx.print_json(&datasources);
            }
            let dim = Style::new().dim();
            println!("{}", style("Datasources").bold());
            println!("{}", dim.apply_to("─".repeat(50)));
            if datasources.is_empty() {
                println!("{}", dim.apply_to("No datasources found"));
            }
            for ds in &datasources {
                println!(
                    "{} {} {}",
                    style(&ds.name).cyan(),
                    dim.apply_to(format!("[{}]", ds.engine)),
                    ds.description
                );
            }
        }
        DatasourcesCommand::Get { name } => {
            let ds = api.get(&name).await?;
            if ctx.json_output {
                return ctx.print_json(&ds);
            }
            print_datasource(&ds);
        }
        DatasourcesCommand::Create {
            name,
            engine,
            description,
            connection,
            tables,
            mode,
        } => {
            tracing::debug!(datasource = %name, engine = %engine, ?mode, "creating datasource");
            let config = DatasourceConfig::new(name, engine, description)
                .with_connection_data(parse_pairs(&connection)?.into_iter().collect())
                .with_tables(tables);
            let ds = api.create_with_mode(&config, mode.into()).await?;
            if ctx.json_output {
                return ctx.print_json(&ds);
            }
            done(ctx, format!("Datasource created: {}", ds.name));
        }
        DatasourcesCommand::Drop { name, force } => {
            api.drop(&name, force).await?;
            done(ctx, format!("Datasource dropped: {}", name));
        }
    }

    Ok(())
}

fn print_datasource(ds: &Datasource) {
    let dim = Style::new().dim();
    println!("{}", style(&ds.name).bold());
    println!("{}", dim.apply_to("─".repeat(50)));
    println!("Engine:      {}", ds.engine);
    println!("Description: {}", ds.description);
    if !ds.tables.is_empty() {
        println!("Tables:      {}", ds.tables.join(", "));
    }
    let mut keys: Vec<&String> = ds.connection_data.keys().collect();
    keys.sort();
    for key in keys {
        // Credentials are not echoed back
        let value = if key.contains("password") || key.contains("key") {
            "****".to_string()
        } else {
            ds.connection_data[key].to_string()
        };
        println!("  {} {}", dim.apply_to(format!("{}:", key)), value);
    }
}
