//! linear-context - Linear issues over MCP.

use anyhow::Context;
use clap::{Parser, Subcommand};
use linear_context::config::Config;
use linear_context::linear::{LinearApi, LinearClient};
use linear_context::mcp::{get_tools, McpClient, McpServer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "linear-context")]
#[command(about = "MCP server exposing Linear issues to AI assistants")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run MCP server over stdio (default)
    Serve,

    /// List the tools the server exposes
    Tools,

    /// Show the user the API key belongs to
    Whoami,

    /// Spawn the server and exercise it as an MCP client
    Inspect,
}

fn get_config_path(cli_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_path {
        return path;
    }

    Config::default_path().unwrap_or_else(|_| PathBuf::from("config.toml"))
}

/// Build the API client. A missing credential is fatal.
fn connect(config: &Config) -> anyhow::Result<LinearClient> {
    let api_key = config.credential()?;
    Ok(LinearClient::with_base_url(api_key, config.api_url.clone()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = get_config_path(cli.config.clone());
    let config = Config::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cmd_serve(config).await?,
        Commands::Tools => cmd_tools(),
        Commands::Whoami => cmd_whoami(config).await?,
        Commands::Inspect => cmd_inspect(cli.config).await?,
    }

    Ok(())
}

async fn cmd_serve(config: Config) -> anyhow::Result<()> {
    let client = connect(&config)?;
    let server = McpServer::new(Arc::new(client));
    server.run().await?;
    Ok(())
}

fn cmd_tools() {
    println!("linear-context tools");
    println!("====================\n");

    for tool in get_tools() {
        println!("  {}", tool.name);
        println!("    {}", tool.description);
        let params = tool.parameters();
        if !params.is_empty() {
            println!("    params: {}", params.join(", "));
        }
        println!();
    }
}

async fn cmd_whoami(config: Config) -> anyhow::Result<()> {
    let client = connect(&config)?;
    let viewer = client.viewer().await?;
    let teams = client.viewer_teams().await?;

    println!("{} ({})", viewer.name, viewer.id);
    if let Some(email) = viewer.email {
        println!("  email: {}", email);
    }
    for team in teams {
        println!("  team: {} [{}]", team.name, team.key);
    }

    Ok(())
}

async fn cmd_inspect(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let exe = std::env::current_exe().context("locating own executable")?;
    let mut args = Vec::new();
    if let Some(path) = config_path {
        args.push("--config".to_string());
        args.push(path.display().to_string());
    }
    args.push("serve".to_string());

    let (mut client, mut child) = McpClient::spawn(&exe, &args)?;

    let init = client.initialize().await?;
    println!("Connected to {}", init["serverInfo"]);

    let tools = client.list_tools().await?;
    println!("\nTools:");
    for tool in tools["tools"].as_array().into_iter().flatten() {
        println!("  {}", tool["name"].as_str().unwrap_or("?"));
    }

    println!("\nListing assigned Linear issues:");
    let resources = client.list_resources().await?;
    let resources = resources["resources"].as_array().cloned().unwrap_or_default();
    for resource in &resources {
        println!(
            "  {}  {}",
            resource["uri"].as_str().unwrap_or("?"),
            resource["name"].as_str().unwrap_or("")
        );
    }

    if let Some(uri) = resources.first().and_then(|r| r["uri"].as_str()) {
        println!("\nFetching details for first issue:");
        let contents = client.read_resource(uri).await?;
        if let Some(text) = contents["contents"][0]["text"].as_str() {
            println!("{}", text);
        }
    }

    drop(client);
    child.kill().await.ok();
    Ok(())
}
