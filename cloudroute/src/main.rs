//! cloudroute: drive the route resource lifecycle for a single route.
//!
//! Desired configuration is read from a JSON file, the last known record is
//! kept in a JSON state file, and the management API is reached with OAuth
//! client credentials.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cloudroute::{
    Resource, RouteConfig, RouteResource, RouteState, StateFile, apply, destroy, plan, refresh,
};
use cloudroute_client::{ClientConfig, HttpRouteClient};
use tabled::{Table, Tabled};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cloudroute", version, about = "Manage a cloud VPN network route")]
struct Args {
    #[command(flatten)]
    api: ApiArgs,

    /// State file holding the managed route
    #[arg(long, default_value = "route.state.json", global = true)]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Management API connection settings.
#[derive(clap::Args, Debug)]
struct ApiArgs {
    /// Management API base URL
    #[arg(long, env = "CLOUDROUTE_BASE_URL", global = true)]
    base_url: Option<String>,

    /// OAuth client id
    #[arg(long, env = "CLOUDROUTE_CLIENT_ID", global = true)]
    client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "CLOUDROUTE_CLIENT_SECRET", hide_env_values = true, global = true)]
    client_secret: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", global = true)]
    timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the resource schema as JSON
    Schema,

    /// Show what apply would do
    Plan {
        /// Desired route configuration (JSON)
        #[arg(long)]
        config: PathBuf,
    },

    /// Create, update or replace the route to match the configuration
    Apply {
        /// Desired route configuration (JSON)
        #[arg(long)]
        config: PathBuf,
    },

    /// Refresh the state file from the API
    Refresh,

    /// Adopt an existing route by ID
    Import {
        /// Route ID
        id: String,
    },

    /// Delete the managed route
    Destroy,
}

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "TYPE")]
    route_type: String,
    #[tabled(rename = "VALUE")]
    value: String,
    #[tabled(rename = "NETWORK")]
    network_item_id: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

impl From<&RouteState> for RouteRow {
    fn from(state: &RouteState) -> Self {
        Self {
            id: state.id.clone(),
            route_type: state.config.route_type.to_string(),
            value: state.config.value.clone(),
            network_item_id: state.config.network_item_id.clone(),
            description: state.config.description.clone(),
        }
    }
}

fn print_state(state: Option<&RouteState>) {
    match state {
        Some(state) => println!("{}", Table::new([RouteRow::from(state)])),
        None => println!("No route managed."),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cloudroute=info,cloudroute_client=info,reqwest=warn,hyper=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let state_file = StateFile::new(&args.state);

    match args.command {
        Commands::Schema => {
            let schema = cloudroute::route_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::Plan { config } => {
            let routes = connect(&args.api)?;
            let desired = load_config(&config).await?;
            let prior = refresh(&routes, &state_file).await?;
            let action = plan(&routes.schema(), prior.as_ref(), &desired);
            println!("Plan: {}", action);
        }
        Commands::Apply { config } => {
            let routes = connect(&args.api)?;
            let desired = load_config(&config).await?;
            let prior = refresh(&routes, &state_file).await?;
            let next = apply(&routes, &state_file, prior, &desired).await?;
            print_state(Some(&next));
        }
        Commands::Refresh => {
            let routes = connect(&args.api)?;
            let current = refresh(&routes, &state_file).await?;
            state_file.save(current.as_ref()).await?;
            print_state(current.as_ref());
        }
        Commands::Import { id } => {
            let routes = connect(&args.api)?;
            let imported = routes
                .import(&id)
                .await?
                .with_context(|| format!("Route {} not found", id))?;
            state_file.save(Some(&imported)).await?;
            info!("Imported route {}", imported.id);
            print_state(Some(&imported));
        }
        Commands::Destroy => {
            let routes = connect(&args.api)?;
            match destroy(&routes, &state_file).await? {
                Some(id) => println!("Route {} destroyed.", id),
                None => println!("Nothing to destroy."),
            }
        }
    }

    Ok(())
}

fn connect(api: &ApiArgs) -> Result<RouteResource<HttpRouteClient>> {
    let base_url = api
        .base_url
        .clone()
        .context("--base-url or CLOUDROUTE_BASE_URL is required")?;
    let client_id = api
        .client_id
        .clone()
        .context("--client-id or CLOUDROUTE_CLIENT_ID is required")?;
    let client_secret = api
        .client_secret
        .clone()
        .context("--client-secret or CLOUDROUTE_CLIENT_SECRET is required")?;

    let client = HttpRouteClient::new(ClientConfig {
        base_url,
        client_id,
        client_secret,
        timeout: Duration::from_secs(api.timeout_secs),
    })
    .context("Invalid API client configuration")?;

    Ok(RouteResource::new(client))
}

async fn load_config(path: &Path) -> Result<RouteConfig> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Config {} is not valid JSON", path.display()))?;
    let config = RouteConfig::from_json(&value)
        .with_context(|| format!("Invalid route configuration in {}", path.display()))?;
    Ok(config)
}
