use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SSH_USER: &str = "root";
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Machine data common to every driver: identity, storage location, and
/// how to reach the machine once it exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseConfig {
    pub machine_name: String,
    pub storage_path: PathBuf,
    pub ssh_user: String,
    pub ssh_port: u16,
    /// Empty until the provider has assigned an address.
    pub ip_address: String,
}

impl BaseConfig {
    pub fn new(machine_name: impl Into<String>, storage_path: impl Into<PathBuf>) -> Self {
        Self {
            machine_name: machine_name.into(),
            storage_path: storage_path.into(),
            ssh_user: DEFAULT_SSH_USER.into(),
            ssh_port: DEFAULT_SSH_PORT,
            ip_address: String::new(),
        }
    }

    /// Per-machine directory under the storage root.
    pub fn machine_dir(&self) -> PathBuf {
        self.storage_path.join("machines").join(&self.machine_name)
    }

    /// Private key path for this machine; the public half is `.pub`.
    pub fn ssh_key_path(&self) -> PathBuf {
        self.machine_dir().join("id_rsa")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_derive_from_name_and_storage() {
        let base = BaseConfig::new("agent-01", "/var/lib/machine");
        assert_eq!(
            base.machine_dir(),
            PathBuf::from("/var/lib/machine/machines/agent-01")
        );
        assert_eq!(
            base.ssh_key_path(),
            PathBuf::from("/var/lib/machine/machines/agent-01/id_rsa")
        );
        assert_eq!(base.ssh_user, "root");
        assert_eq!(base.ssh_port, 22);
        assert!(base.ip_address.is_empty());
    }
}
