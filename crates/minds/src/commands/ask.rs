//! Ask command - one-shot question to a mind.

use anyhow::Result;
use clap::Args;
use console::Style;
use futures::StreamExt;
use serde_json::json;
use std::io::Write;

use super::Context;

/// Arguments for the ask command.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Mind to ask
    #[arg(required = true)]
    pub mind: String,

    /// The question to send
    #[arg(required = true)]
    pub message: String,

    /// Print the answer as it is generated
    #[arg(short, long)]
    pub stream: bool,
}

/// Run the ask command.
pub async fn run(args: AskArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let mind = client.minds().get(&args.mind).await?;
    tracing::debug!(mind = %args.mind, stream = args.stream, "asking mind");

    if ctx.verbose {
        let dim = Style::new().dim();
        eprintln!(
            "{}",
            dim.apply_to(format!("Sending to: {}", client.completions().base_url()?))
        );
    }

    // JSON output needs the whole answer
    if !args.stream || ctx.json_output {
        let answer = mind.completion(&args.message).await?;
        if ctx.json_output {
            return ctx.print_json(&json!({ "mind": mind.name(), "answer": answer }));
        }
        println!("{}", answer);
        return Ok(());
    }

    let mut stream = mind.completion_stream(&args.message).await?;
    let mut has_output = false;
    while let Some(fragment) = stream.next().await {
        match fragment {
            Ok(text) => {
                print!("{}", text);
                std::io::stdout().flush()?;
                has_output |= !text.is_empty();
            }
            Err(e) => {
                tracing::warn!(mind = %args.mind, error = %e, "answer stream failed");
                if has_output {
                    println!();
                }
                let red = Style::new().red();
                eprintln!("{} {}", red.apply_to("Error:"), e);
                return Err(e.into());
            }
        }
    }
    if has_output {
        println!();
    }

    Ok(())
}
