//! Plugin entrypoint: exposes the ArubaCloud driver's lifecycle
//! operations as a CLI, with machine state kept in the on-disk store.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use arubacloud_driver::config::{
    CreateAction, DEFAULT_ENDPOINT, DEFAULT_SIZE, DEFAULT_TEMPLATE, DriverConfig,
};
use arubacloud_driver::driver::ArubaCloudDriver;
use machine_driver::{BaseConfig, Driver, MachineStore};

#[derive(Debug, Parser)]
#[command(name = "docker-machine-driver-arubacloud", version, about)]
struct Cli {
    /// Root directory for machine config and keys.
    #[arg(long, env = "MACHINE_STORAGE_PATH", default_value = ".machine", global = true)]
    storage_path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Provision a new machine.
    Create {
        name: String,
        #[command(flatten)]
        opts: CreateOpts,
    },
    /// Start a stopped machine.
    Start { name: String },
    /// Gracefully stop a machine.
    Stop { name: String },
    /// Stop then start a machine.
    Restart { name: String },
    /// Forcefully power a machine off.
    Kill { name: String },
    /// Delete the machine and its local state.
    Rm { name: String },
    /// Print the machine state.
    Status { name: String },
    /// Print the container-engine endpoint URL.
    Url { name: String },
    /// Print the machine IP address.
    Ip { name: String },
}

/// The "machine create" flags this driver registers.
#[derive(Debug, Args)]
struct CreateOpts {
    /// ArubaCloud username.
    #[arg(long, env = "AC_USERNAME")]
    ac_username: String,

    /// ArubaCloud password.
    #[arg(long, env = "AC_PASSWORD")]
    ac_password: String,

    /// Machine root password.
    #[arg(long, env = "AC_ADMIN_PASSWORD")]
    ac_admin_password: String,

    /// Endpoint name (dc1, dc2, dc3 ...).
    #[arg(long, env = "AC_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    ac_endpoint: String,

    /// VM template name.
    #[arg(long, env = "AC_TEMPLATE", default_value = DEFAULT_TEMPLATE)]
    ac_template: String,

    /// Machine size (Small, Medium, Large, Extra Large).
    #[arg(long, env = "AC_SIZE", default_value = DEFAULT_SIZE)]
    ac_size: String,

    /// Creation action (NewSmart, NewPro, Attach).
    #[arg(long, env = "AC_ACTION", default_value_t = CreateAction::NewSmart)]
    ac_action: CreateAction,

    /// Use an already purchased IP address.
    #[arg(long, env = "AC_IP")]
    ac_ip: Option<String>,

    /// Path of an existing SSH private key to use.
    #[arg(long, env = "AC_SSH_KEY")]
    ac_ssh_key: Option<PathBuf>,

    /// Configure an IPv6 address on the VM.
    #[arg(long, env = "AC_IPV6")]
    ac_ipv6: bool,
}

impl CreateOpts {
    /// Pure flag-to-field copy into the driver's configuration snapshot.
    fn into_config(self, name: &str, storage_path: &Path) -> DriverConfig {
        let mut base = BaseConfig::new(name, storage_path);
        base.ip_address = self.ac_ip.unwrap_or_default();

        DriverConfig {
            base,
            username: self.ac_username,
            password: self.ac_password,
            admin_password: self.ac_admin_password,
            endpoint: self.ac_endpoint,
            template: self.ac_template,
            size: self.ac_size,
            action: self.ac_action,
            ssh_key: self.ac_ssh_key,
            enable_ipv6: self.ac_ipv6,
            server_id: 0,
        }
    }
}

async fn load_driver(store: &MachineStore, name: &str) -> machine_driver::Result<ArubaCloudDriver> {
    let config: DriverConfig = store.load(name).await?;
    Ok(ArubaCloudDriver::new(config))
}

async fn run(cli: Cli) -> machine_driver::Result<()> {
    let store = MachineStore::new(&cli.storage_path);

    match cli.command {
        Command::Create { name, opts } => {
            let config = opts.into_config(&name, &cli.storage_path);
            let mut driver = ArubaCloudDriver::new(config);
            driver.pre_create_check().await?;
            driver.create().await?;
            store.save(&name, driver.config()).await?;
        }
        Command::Start { name } => {
            load_driver(&store, &name).await?.start().await?;
        }
        Command::Stop { name } => {
            load_driver(&store, &name).await?.stop().await?;
        }
        Command::Restart { name } => {
            load_driver(&store, &name).await?.restart().await?;
        }
        Command::Kill { name } => {
            load_driver(&store, &name).await?.kill().await?;
        }
        Command::Rm { name } => {
            load_driver(&store, &name).await?.remove().await?;
            store.remove(&name).await?;
        }
        Command::Status { name } => {
            let state = load_driver(&store, &name).await?.state().await?;
            println!("{state}");
        }
        Command::Url { name } => {
            if let Some(url) = load_driver(&store, &name).await?.url()? {
                println!("{url}");
            }
        }
        Command::Ip { name } => {
            println!("{}", load_driver(&store, &name).await?.ssh_hostname()?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}
