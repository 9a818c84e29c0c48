use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use gitguide_mcp::config::{Config, ConfigOverrides};
use gitguide_mcp::tools::McpHandler;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server in stdin/stdout mode
    Stdio {
        /// Enable debug logging
        #[arg(short, long)]
        debug: bool,

        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Run the server with an HTTP interface
    Http {
        /// Address to bind the HTTP server to (defaults to 0.0.0.0:<PORT>)
        #[arg(short, long)]
        address: Option<String>,

        /// Enable debug logging
        #[arg(short, long)]
        debug: bool,

        #[command(flatten)]
        overrides: OverrideArgs,
    },
}

#[derive(Args)]
struct OverrideArgs {
    /// GitHub API token (overrides GITHUB_TOKEN environment variable)
    #[arg(short = 't', long)]
    github_token: Option<String>,

    /// LLM API key (overrides LLM_API_KEY environment variable)
    #[arg(short = 'k', long)]
    llm_api_key: Option<String>,

    /// Directory generated guides are written to (overrides OUTPUT_DIR)
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Port for the HTTP server (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

impl From<OverrideArgs> for ConfigOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            github_token: args.github_token,
            llm_api_key: args.llm_api_key,
            output_dir: args.output_dir,
            port: args.port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Stdio { debug, overrides } => run_stdio_server(debug, overrides.into()).await,
        Commands::Http {
            address,
            debug,
            overrides,
        } => run_http_server(address, debug, overrides.into()).await,
    }
}

fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr) // stdout carries the protocol in stdio mode
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .init();
}

fn build_handler(overrides: &ConfigOverrides) -> Result<(Config, McpHandler)> {
    let config = Config::load(overrides)?;
    tracing::info!(
        "Using model {} and output directory {}",
        config.llm_model,
        config.output_dir.display()
    );
    let handler = McpHandler::from_config(&config)?;
    Ok((config, handler))
}

async fn run_stdio_server(debug: bool, overrides: ConfigOverrides) -> Result<()> {
    init_tracing(debug);
    tracing::info!("Starting GitGuide MCP server in STDIN/STDOUT mode");

    let (_, handler) = build_handler(&overrides)?;

    gitguide_mcp::transport::stdio::run_stdio_server(handler)
        .await
        .map_err(|e| anyhow::anyhow!("Error running STDIO server: {}", e))
}

async fn run_http_server(
    address: Option<String>,
    debug: bool,
    overrides: ConfigOverrides,
) -> Result<()> {
    init_tracing(debug);

    let (config, handler) = build_handler(&overrides)?;
    let addr: SocketAddr = match address {
        Some(address) => address.parse()?,
        None => SocketAddr::from(([0, 0, 0, 0], config.port)),
    };

    tracing::info!("Access the GitGuide MCP server at http://{}/mcp", addr);

    let app = gitguide_mcp::transport::http::HttpServerApp::new(addr, handler);
    app.serve().await?;

    Ok(())
}
