use anyhow::Result;
use clap::{Parser, Subcommand};
use gitguide_mcp::config::{Config, ConfigOverrides};
use gitguide_mcp::tools::{McpHandler, McpRequest, ToolName};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Command-line access to the GitGuide tools", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// GitHub API token (overrides GITHUB_TOKEN environment variable)
    #[arg(short = 't', long, global = true)]
    github_token: Option<String>,

    /// LLM API key (overrides LLM_API_KEY environment variable)
    #[arg(short = 'k', long, global = true)]
    llm_api_key: Option<String>,

    /// Directory generated guides are written to (overrides OUTPUT_DIR)
    #[arg(short = 'o', long, global = true)]
    output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search GitHub repositories by library name
    Search {
        /// Library name or search query
        query: String,

        /// Maximum number of results to return
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Show repository details including README
    Details {
        /// Repository owner
        owner: String,

        /// Repository name
        repo: String,
    },
    /// Generate a usage guide and save it as markdown
    Guide {
        /// Repository owner
        owner: String,

        /// Repository name
        repo: String,

        /// Path of the generated document, relative to the output directory
        #[arg(long)]
        output_path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let overrides = ConfigOverrides {
        github_token: cli.github_token,
        llm_api_key: cli.llm_api_key,
        output_dir: cli.output_dir,
        port: None,
    };
    let config = Config::load(&overrides)?;
    let handler = McpHandler::from_config(&config)?;

    let request = match cli.command {
        Commands::Search { query, limit } => McpRequest::call(
            ToolName::SearchGithubLibrary.as_ref(),
            json!({ "query": query, "limit": limit }),
        ),
        Commands::Details { owner, repo } => McpRequest::call(
            ToolName::GetRepositoryDetails.as_ref(),
            json!({ "owner": owner, "repo": repo }),
        ),
        Commands::Guide {
            owner,
            repo,
            output_path,
        } => McpRequest::call(
            ToolName::GenerateUsageGuide.as_ref(),
            json!({ "owner": owner, "repo": repo, "output_path": output_path }),
        ),
    };

    let response = handler.handle_request(request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}
