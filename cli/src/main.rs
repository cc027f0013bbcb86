use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use condense_core::{ClientConfig, CloudStorage, CondenseApi, GlobalConfigUpdate};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Manage cloud storage entries on a condense backend.
#[derive(Debug, Parser)]
#[command(name = "condense", version)]
struct Cli {
    /// Backend base URL. Defaults to $CONDENSE_BASE_URL, then http://localhost:8080.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List configured cloud storages.
    List,
    /// Register a new cloud storage.
    Add(AddArgs),
    /// List the storage types the backend supports.
    Types,
    /// Remove a cloud storage.
    Delete { id: u64 },
    /// Trigger a condense run for a cloud storage.
    Condense { id: u64 },
    /// Read or change the global configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Show the disk space saved so far.
    Metric,
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long = "type")]
    storage_type: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    password: Option<String>,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    Get,
    Set {
        #[arg(long)]
        schedule_rate: Option<u64>,
        #[arg(long)]
        condense_age: Option<u64>,
    },
}

impl From<AddArgs> for CloudStorage {
    fn from(args: AddArgs) -> Self {
        CloudStorage {
            id: None,
            name: args.name,
            storage_type: args.storage_type,
            url: args.url,
            username: args.username,
            password: args.password,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = match cli.base_url {
        Some(url) => ClientConfig::new(&url),
        None => ClientConfig::from_env(),
    };
    tracing::debug!(base_url = %config.base_url, "using backend");
    let api = CondenseApi::new(&config);

    match cli.command {
        Command::List => print_json(&api.get_all_cloud_storages().await.context("listing cloud storages")?),
        Command::Add(args) => {
            let created = api
                .add_cloud_storage(&args.into())
                .await
                .context("adding cloud storage")?;
            print_json(&created)
        }
        Command::Types => print_json(&api.get_cloud_storage_types().await.context("listing storage types")?),
        Command::Delete { id } => api
            .delete_cloud_storage(id)
            .await
            .with_context(|| format!("deleting cloud storage {id}")),
        Command::Condense { id } => api
            .condense_cloud_storage(id)
            .await
            .with_context(|| format!("condensing cloud storage {id}")),
        Command::Config(ConfigCommand::Get) => {
            print_json(&api.get_global_config().await.context("reading global config")?)
        }
        Command::Config(ConfigCommand::Set {
            schedule_rate,
            condense_age,
        }) => {
            let update = GlobalConfigUpdate {
                schedule_rate,
                condense_age,
            };
            api.update_global_config(&update)
                .await
                .context("updating global config")
        }
        Command::Metric => print_json(&api.get_metric().await.context("reading metric")?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_optional_fields() {
        let cli = Cli::try_parse_from([
            "condense", "add", "--name", "bucket", "--type", "S3", "--username", "u", "--url", "https://s3.local",
        ])
        .unwrap();
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        let storage: CloudStorage = args.into();
        assert_eq!(storage.storage_type, "S3");
        assert_eq!(storage.url.as_deref(), Some("https://s3.local"));
        assert!(storage.id.is_none());
        assert!(storage.password.is_none());
    }

    #[test]
    fn add_requires_username() {
        assert!(Cli::try_parse_from(["condense", "add", "--name", "b", "--type", "S3"]).is_err());
    }

    #[test]
    fn base_url_is_global() {
        let cli = Cli::try_parse_from(["condense", "delete", "7", "--base-url", "http://backend:9000"]).unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://backend:9000"));
        assert!(matches!(cli.command, Command::Delete { id: 7 }));
    }

    #[test]
    fn config_set_accepts_partial_update() {
        let cli = Cli::try_parse_from(["condense", "config", "set", "--condense-age", "14"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Set {
                schedule_rate: None,
                condense_age: Some(14)
            })
        ));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
