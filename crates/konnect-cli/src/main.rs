//! konnect - CLI for the Kafka Connect REST API
//!
//! Checks cluster health, rolls up connector/task states, and drives the
//! connector lifecycle (create, update, pause, resume, restart, delete) with
//! optional bounded retry for transient connection failures.
//!
//! ```bash
//! # Exit 0 only if every connector and task is RUNNING
//! konnect health-check --url http://localhost:8083
//!
//! # Aggregate state of all connectors
//! konnect connector list
//!
//! # Create from a file, retrying connection failures up to 5 times
//! konnect connector create --name orders-sink \
//!     --configuration-file orders.json --backoff-limit 5 --delay 2
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use konnect_client::{ConnectClient, Health, RetryPolicy};
use regex::Regex;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "konnect")]
#[command(about = "CLI for the Kafka Connect REST API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check all connectors and their tasks; exit 0 only if everything is RUNNING
    HealthCheck {
        #[command(flatten)]
        common: CommonOpts,

        /// Print the reason when the check fails
        #[arg(long)]
        verbose: bool,
    },

    /// Connector management
    Connector {
        #[command(subcommand)]
        action: ConnectorCommands,
    },

    /// Connector task management
    Task {
        #[command(subcommand)]
        action: TaskCommands,
    },
}

#[derive(Args)]
struct CommonOpts {
    /// Kafka Connect server URL
    #[arg(long, default_value = "http://localhost:8083")]
    url: String,
}

#[derive(Args)]
struct BackoffOpts {
    /// Number of attempts before fail (1 = no retry)
    #[arg(long, default_value_t = 1)]
    backoff_limit: u32,

    /// Seconds to wait between retry attempts
    #[arg(long, default_value_t = 0)]
    delay: u64,
}

impl BackoffOpts {
    fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.backoff_limit, Duration::from_secs(self.delay))
    }
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ConfigOpts {
    /// Connector configuration as JSON string
    #[arg(long)]
    configuration: Option<String>,

    /// Path to file with connector configuration in JSON format ('-' for stdin)
    #[arg(long)]
    configuration_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ConnectorCommands {
    /// List connectors with their aggregated state and failed tasks
    List {
        #[command(flatten)]
        common: CommonOpts,
    },

    /// Create a new connector
    Create {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        backoff: BackoffOpts,

        /// Connector name
        #[arg(long)]
        name: String,

        #[command(flatten)]
        config: ConfigOpts,

        /// Only attempt creation if the connector does not already exist
        #[arg(long)]
        if_not_exists: bool,
    },

    /// Get connector
    Get {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        backoff: BackoffOpts,

        /// Connector name
        #[arg(long)]
        name: String,
    },

    /// Get connector's configuration
    Configuration {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        backoff: BackoffOpts,

        /// Connector name
        #[arg(long)]
        name: String,
    },

    /// Update connector configuration (full replacement)
    Update {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        backoff: BackoffOpts,

        /// Connector name
        #[arg(long)]
        name: String,

        #[command(flatten)]
        config: ConfigOpts,
    },

    /// Pause connector
    Pause {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        backoff: BackoffOpts,

        /// Connector name
        #[arg(long)]
        name: String,
    },

    /// Pause all connectors, optionally filtered by a name pattern
    PauseAll {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        backoff: BackoffOpts,

        /// Connector name pattern (regex)
        #[arg(long)]
        name: Option<String>,

        /// Print each affected connector
        #[arg(long)]
        verbose: bool,
    },

    /// Resume connector
    Resume {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        backoff: BackoffOpts,

        /// Connector name
        #[arg(long)]
        name: String,
    },

    /// Resume all connectors, optionally filtered by a name pattern
    ResumeAll {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        backoff: BackoffOpts,

        /// Connector name pattern (regex)
        #[arg(long)]
        name: Option<String>,

        /// Print each affected connector
        #[arg(long)]
        verbose: bool,
    },

    /// Restart connector
    Restart {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        backoff: BackoffOpts,

        /// Connector name
        #[arg(long)]
        name: String,
    },

    /// Delete connector
    Delete {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        backoff: BackoffOpts,

        /// Connector name
        #[arg(long)]
        name: String,
    },

    /// Delete all connectors, optionally filtered by a name pattern
    DeleteAll {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        backoff: BackoffOpts,

        /// Connector name pattern (regex)
        #[arg(long)]
        name: Option<String>,

        /// Print each affected connector
        #[arg(long)]
        verbose: bool,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List connector tasks
    List {
        #[command(flatten)]
        common: CommonOpts,

        /// Connector name
        #[arg(long)]
        connector: String,
    },

    /// Restart connector task
    Restart {
        #[command(flatten)]
        common: CommonOpts,

        #[command(flatten)]
        backoff: BackoffOpts,

        /// Connector name
        #[arg(long)]
        connector: String,

        /// Task ID
        #[arg(long)]
        task: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(is_verbose(&cli.command));

    match cli.command {
        Commands::HealthCheck { common, verbose } => {
            let client = ConnectClient::new(&common.url)?;
            match client.health_check().await {
                Ok(Health::Healthy) => {}
                Ok(Health::Unhealthy(reason)) => {
                    if verbose {
                        println!("{reason}");
                    }
                    std::process::exit(1);
                }
                Err(err) => {
                    if verbose {
                        println!("{err}");
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Connector { action } => run_connector_command(action).await?,
        Commands::Task { action } => run_task_command(action).await?,
    }

    Ok(())
}

async fn run_connector_command(action: ConnectorCommands) -> Result<()> {
    match action {
        ConnectorCommands::List { common } => {
            let client = ConnectClient::new(&common.url)?;
            let rows = client.rollup_all().await?;
            print_json(&serde_json::to_value(&rows)?)?;
        }

        ConnectorCommands::Create {
            common,
            backoff,
            name,
            config,
            if_not_exists,
        } => {
            let configuration = read_configuration(&config)?;
            let client = ConnectClient::with_retry(&common.url, backoff.policy())?;
            let result = client.create(&name, &configuration, if_not_exists).await?;
            print_json(&result.unwrap_or(Value::Null))?;
        }

        ConnectorCommands::Get {
            common,
            backoff,
            name,
        } => {
            let client = ConnectClient::with_retry(&common.url, backoff.policy())?;
            print_json(&client.get(&name).await?)?;
        }

        ConnectorCommands::Configuration {
            common,
            backoff,
            name,
        } => {
            let client = ConnectClient::with_retry(&common.url, backoff.policy())?;
            print_json(&client.configuration(&name).await?)?;
        }

        ConnectorCommands::Update {
            common,
            backoff,
            name,
            config,
        } => {
            let configuration = read_configuration(&config)?;
            let client = ConnectClient::with_retry(&common.url, backoff.policy())?;
            let result = client.update(&name, &configuration).await?;
            print_json(&result.unwrap_or(Value::Null))?;
        }

        ConnectorCommands::Pause {
            common,
            backoff,
            name,
        } => {
            let client = ConnectClient::with_retry(&common.url, backoff.policy())?;
            client.pause(&name).await?;
        }

        ConnectorCommands::PauseAll {
            common,
            backoff,
            name,
            verbose,
        } => {
            let pattern = parse_pattern(name.as_deref())?;
            let client = ConnectClient::with_retry(&common.url, backoff.policy())?;
            let names = client.pause_all(pattern.as_ref()).await?;
            if verbose {
                for name in names {
                    println!("Paused connector {name}");
                }
            }
        }

        ConnectorCommands::Resume {
            common,
            backoff,
            name,
        } => {
            let client = ConnectClient::with_retry(&common.url, backoff.policy())?;
            client.resume(&name).await?;
        }

        ConnectorCommands::ResumeAll {
            common,
            backoff,
            name,
            verbose,
        } => {
            let pattern = parse_pattern(name.as_deref())?;
            let client = ConnectClient::with_retry(&common.url, backoff.policy())?;
            let names = client.resume_all(pattern.as_ref()).await?;
            if verbose {
                for name in names {
                    println!("Resumed connector {name}");
                }
            }
        }

        ConnectorCommands::Restart {
            common,
            backoff,
            name,
        } => {
            let client = ConnectClient::with_retry(&common.url, backoff.policy())?;
            client.restart(&name).await?;
        }

        ConnectorCommands::Delete {
            common,
            backoff,
            name,
        } => {
            let client = ConnectClient::with_retry(&common.url, backoff.policy())?;
            client.delete(&name).await?;
        }

        ConnectorCommands::DeleteAll {
            common,
            backoff,
            name,
            verbose,
        } => {
            let pattern = parse_pattern(name.as_deref())?;
            let client = ConnectClient::with_retry(&common.url, backoff.policy())?;
            let names = client.delete_all(pattern.as_ref()).await?;
            if verbose {
                for name in names {
                    println!("Deleted connector {name}");
                }
            }
        }
    }

    Ok(())
}

async fn run_task_command(action: TaskCommands) -> Result<()> {
    match action {
        TaskCommands::List { common, connector } => {
            let client = ConnectClient::new(&common.url)?;
            let rows = client.list_tasks(&connector).await?;
            print_json(&serde_json::to_value(&rows)?)?;
        }

        TaskCommands::Restart {
            common,
            backoff,
            connector,
            task,
        } => {
            let client = ConnectClient::with_retry(&common.url, backoff.policy())?;
            client.restart_task(&connector, task).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn is_verbose(command: &Commands) -> bool {
    match command {
        Commands::HealthCheck { verbose, .. } => *verbose,
        Commands::Connector { action } => matches!(
            action,
            ConnectorCommands::PauseAll { verbose: true, .. }
                | ConnectorCommands::ResumeAll { verbose: true, .. }
                | ConnectorCommands::DeleteAll { verbose: true, .. }
        ),
        Commands::Task { .. } => false,
    }
}

fn read_configuration(opts: &ConfigOpts) -> Result<Map<String, Value>> {
    let raw = match (&opts.configuration, &opts.configuration_file) {
        (Some(inline), None) => inline.clone(),
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read configuration from stdin")?;
            buf
        }
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        // clap enforces exactly one configuration source
        _ => unreachable!(),
    };

    serde_json::from_str(&raw).context("Connector configuration must be a JSON object")
}

fn parse_pattern(pattern: Option<&str>) -> Result<Option<Regex>> {
    pattern
        .map(|p| Regex::new(p).with_context(|| format!("Invalid connector name pattern: {p}")))
        .transpose()
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
