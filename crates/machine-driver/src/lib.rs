//! Host-tool integration surface for machine provisioning drivers.
//!
//! The `Driver` trait is the fixed lifecycle contract a provisioning
//! driver implements; the rest of the crate is the plumbing every driver
//! needs: machine state, status polling, SSH keypair handling, and the
//! on-disk machine store.

mod base;
pub mod ssh;
mod state;
mod store;
mod wait;

pub use base::{BaseConfig, DEFAULT_SSH_PORT, DEFAULT_SSH_USER};
pub use state::MachineState;
pub use store::MachineStore;
pub use wait::{Probe, WaitOpts, wait_for};

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("provider api error: {0}")]
    Api(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("timed out after {attempts} attempts waiting for {waiting_for}")]
    Timeout { attempts: u32, waiting_for: String },

    #[error("ssh keypair error: {0}")]
    Ssh(String),

    #[error("machine {0} has no saved configuration")]
    MachineNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Lifecycle contract between the host tool and a provisioning driver.
///
/// Each method is one or two remote calls plus optional status polling;
/// provider errors propagate verbatim to the caller.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Provider identifier (e.g. "arubacloud").
    fn driver_name(&self) -> &'static str;

    /// Validate configuration before `create` runs.
    async fn pre_create_check(&mut self) -> Result<()>;

    /// Provision the machine and record its address.
    async fn create(&mut self) -> Result<()>;

    /// Start a stopped machine.
    async fn start(&self) -> Result<()>;

    /// Gracefully stop a running machine.
    async fn stop(&self) -> Result<()>;

    /// Stop then start the machine, waiting for each transition.
    async fn restart(&self) -> Result<()>;

    /// Forcefully power the machine off.
    async fn kill(&self) -> Result<()>;

    /// Tear the machine down, stopping it first if needed.
    async fn remove(&self) -> Result<()>;

    /// Current provider-reported machine state.
    async fn state(&self) -> Result<MachineState>;

    /// Container-engine endpoint URL, `None` until an address is known.
    fn url(&self) -> Result<Option<String>>;

    /// Address to reach the machine over SSH.
    fn ssh_hostname(&self) -> Result<String>;
}
