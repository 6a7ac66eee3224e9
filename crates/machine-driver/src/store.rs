//! On-disk machine store.
//!
//! Persists the driver's configuration snapshot as JSON under
//! `{storage}/machines/{name}/config.json` so later invocations can
//! rehydrate the driver.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tokio::fs;

use crate::{Error, Result};

const CONFIG_FILE: &str = "config.json";

pub struct MachineStore {
    storage_path: PathBuf,
}

impl MachineStore {
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
        }
    }

    fn machine_dir(&self, name: &str) -> PathBuf {
        self.storage_path.join("machines").join(name)
    }

    fn config_path(&self, name: &str) -> PathBuf {
        self.machine_dir(name).join(CONFIG_FILE)
    }

    pub async fn save<T: Serialize>(&self, name: &str, config: &T) -> Result<()> {
        let dir = self.machine_dir(name);
        fs::create_dir_all(&dir).await?;

        let content = serde_json::to_string_pretty(config)?;
        fs::write(self.config_path(name), content).await?;

        tracing::debug!(machine = name, "saved machine config");
        Ok(())
    }

    pub async fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.config_path(name);
        if !path.exists() {
            return Err(Error::MachineNotFound(name.to_string()));
        }

        let content = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Delete the machine directory, including keys and config.
    pub async fn remove(&self, name: &str) -> Result<()> {
        let dir = self.machine_dir(name);
        if dir.exists() {
            fs::remove_dir_all(&dir).await?;
            tracing::debug!(machine = name, "removed machine directory");
        }
        Ok(())
    }
}
