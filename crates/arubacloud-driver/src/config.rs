use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use machine_driver::BaseConfig;

pub const DEFAULT_ENDPOINT: &str = "dc1";
pub const DEFAULT_TEMPLATE: &str = "ubuntu1604_x64_1_0";
pub const DEFAULT_SIZE: &str = "Large";

/// Port the container engine listens on; the machine URL points here.
pub const DOCKER_PORT: u16 = 2376;

/// How `create` obtains the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateAction {
    /// Create a Smart (preconfigured package) server.
    #[default]
    NewSmart,
    /// Create a Pro server with explicit resources and a purchased IP.
    NewPro,
    /// Adopt an already-existing server by name.
    Attach,
}

impl FromStr for CreateAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NewSmart" => Ok(Self::NewSmart),
            "NewPro" => Ok(Self::NewPro),
            "Attach" => Ok(Self::Attach),
            other => Err(format!(
                "unknown action {other} (expected NewSmart, NewPro, or Attach)"
            )),
        }
    }
}

impl fmt::Display for CreateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NewSmart => "NewSmart",
            Self::NewPro => "NewPro",
            Self::Attach => "Attach",
        })
    }
}

/// The driver's configuration snapshot: credentials, selectors, and the
/// internal ids filled in during `create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    pub base: BaseConfig,

    pub username: String,
    pub password: String,
    /// Root password set on the new machine.
    pub admin_password: String,
    /// Data-center endpoint name (dc1, dc2, ...).
    pub endpoint: String,
    /// OS template name.
    pub template: String,
    /// Size name (Small, Medium, Large, Extra Large).
    pub size: String,
    pub action: CreateAction,
    /// Existing private key to import instead of generating one.
    pub ssh_key: Option<PathBuf>,
    pub enable_ipv6: bool,

    /// Provider server id; 0 until the server has been located.
    pub server_id: i32,
}

/// Pro-server resource shape derived from the size name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProSize {
    pub cpu: i32,
    pub ram_gb: i32,
    pub disk_gb: i32,
}

/// Size-name to resource mapping for Pro servers. Unrecognized names get
/// the smallest shape.
pub fn pro_size(size: &str) -> ProSize {
    match size {
        "Medium" => ProSize {
            cpu: 1,
            ram_gb: 2,
            disk_gb: 40,
        },
        "Large" => ProSize {
            cpu: 2,
            ram_gb: 4,
            disk_gb: 80,
        },
        "Extra Large" => ProSize {
            cpu: 4,
            ram_gb: 8,
            disk_gb: 160,
        },
        _ => ProSize {
            cpu: 1,
            ram_gb: 1,
            disk_gb: 20,
        },
    }
}
