mod agent;
mod config;
mod instrumentation;
mod llm;
mod search;
mod web;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use agent::{BlogAgent, Post};
use config::Config;
use llm::OllamaClient;

#[derive(Parser)]
#[command(
    name = "blog-writer",
    about = "Generate a blog post from a topic using web research and a local LLM",
    args_conflicts_with_subcommands = true,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    write: WriteArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct WriteArgs {
    /// The topic to write about
    query: Option<String>,

    /// Output file path (prints to stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// LLM model to use instead of LLM_MODEL
    #[arg(short, long)]
    model: Option<String>,

    /// Timeout in seconds for LLM generation (default: 90, or LLM_TIMEOUT_SECS)
    #[arg(short, long)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the interactive blog form
    Serve {
        /// Address to bind, overrides BLOG_SERVER_ADDR
        #[arg(long)]
        addr: Option<String>,

        /// LLM model to use instead of LLM_MODEL
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Print only the research summary for a topic
    Research {
        /// The topic to research
        query: String,
    },
    /// List the models installed on the generation host
    Models,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;

    match cli.command {
        Some(Commands::Serve { addr, model }) => {
            let config = config.with_model(model);
            let agent = start_agent(&config).await?;
            let addr = addr.unwrap_or_else(|| config.server_addr.clone());
            println!("Blog form running at http://{}", addr);
            web::serve(agent, &addr).await?;
        }
        Some(Commands::Research { query }) => {
            let agent = BlogAgent::new(&config).await?;
            let research = agent.research(&query).await;
            println!("{}", research.summary);
        }
        Some(Commands::Models) => {
            let llm = OllamaClient::new(&config.llm_base_url)?;
            let models = llm
                .probe()
                .await
                .context("Generation host is not running. Start it before listing models")?;
            for model in models {
                println!("{}", model);
            }
        }
        None => {
            let WriteArgs {
                query,
                output,
                model,
                timeout,
            } = cli.write;
            let query = query.context("A topic is required")?;
            let config = config.with_model(model).with_timeout(timeout);
            write_post(&config, &query, output).await?;
        }
    }

    Ok(())
}

/// Probes the generation host strictly; an unreachable host aborts startup.
async fn start_agent(config: &Config) -> Result<BlogAgent> {
    let llm = OllamaClient::new(&config.llm_base_url)?;
    let available = llm.probe().await.context(format!(
        "Generation host is not running at {}. Please start it before running this tool",
        config.llm_base_url
    ))?;

    let agent = BlogAgent::with_models(config, llm, &available)?;
    if agent.model() == config.llm_model {
        eprintln!("Using model: {}", agent.model());
    } else {
        eprintln!(
            "Warning: model {} is not available. Available models: {:?}",
            config.llm_model, available
        );
        eprintln!("Using fallback model: {}", agent.model());
    }

    Ok(agent)
}

async fn write_post(config: &Config, query: &str, output: Option<PathBuf>) -> Result<()> {
    let agent = start_agent(config).await?;

    eprintln!("Generating blog post for: {}", query);
    eprintln!("This may take a minute or two depending on your hardware...");

    let start = Instant::now();
    let post = agent.compose(query).await;
    let elapsed = start.elapsed();
    if post.source.is_fallback() {
        tracing::warn!(topic = query, "delivered fallback content");
    }

    match output {
        Some(path) => {
            std::fs::write(&path, &post.text)
                .context(format!("Failed to write {}", path.display()))?;
            println!("Blog post written to {}", path.display());
        }
        None => print!("{}", framed_post(&post)),
    }

    eprintln!("Generation completed in {:.2} seconds", elapsed.as_secs_f64());

    Ok(())
}

/// The post as shown on the terminal. Only the text: how it was produced stays in the logs.
fn framed_post(post: &Post) -> String {
    format!(
        "\n--- BLOG POST ---\n\n{}\n\n--- END OF BLOG POST ---\n\n",
        post.text
    )
}
