//! ArubaCloud provisioning driver.
//!
//! Orchestration glue between the lifecycle contract and the remote API:
//! each operation is one or two API calls plus optional status polling.

use async_trait::async_trait;
use tracing::{debug, info};

use arubacloud_api::{self as api, ApiClient};
use machine_driver::{Driver, Error, MachineState, Probe, Result, WaitOpts, ssh, wait_for};

use crate::config::{CreateAction, DOCKER_PORT, DriverConfig, pro_size};

fn api_err(e: api::Error) -> Error {
    Error::Api(e.to_string())
}

pub struct ArubaCloudDriver {
    config: DriverConfig,
    client: ApiClient,
    wait: WaitOpts,
}

impl ArubaCloudDriver {
    pub fn new(config: DriverConfig) -> Self {
        let client = ApiClient::new(&config.endpoint, &config.username, &config.password);
        Self {
            config,
            client,
            wait: WaitOpts::default(),
        }
    }

    /// Override the polling schedule (tests).
    pub fn with_wait_opts(mut self, wait: WaitOpts) -> Self {
        self.wait = wait;
        self
    }

    /// The configuration snapshot, for persisting after `create`.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    fn machine_name(&self) -> &str {
        &self.config.base.machine_name
    }

    /// Lifecycle operations need a located server.
    fn server_id(&self) -> Result<i32> {
        if self.config.server_id == 0 {
            return Err(Error::Config(format!(
                "machine {} has no server id yet",
                self.machine_name()
            )));
        }
        Ok(self.config.server_id)
    }

    fn parse_state(status: i32) -> MachineState {
        match status {
            api::STATUS_CREATING => MachineState::Starting,
            api::STATUS_OFF => MachineState::Stopped,
            api::STATUS_RUNNING => MachineState::Running,
            api::STATUS_FROZEN => MachineState::Saved,
            _ => MachineState::Unknown,
        }
    }

    /// Poll the server until it reports `status`. A frozen server aborts
    /// the wait with an error.
    async fn wait_for_status(&self, server_id: i32, status: i32) -> Result<api::ServerDetails> {
        let client = &self.client;
        wait_for(&format!("server status {status}"), &self.wait, move || async move {
            let server = client.get_server(server_id).await.map_err(api_err)?;
            debug!(server_id, status = server.server_status, "polled server status");

            if server.server_status == api::STATUS_FROZEN && status != api::STATUS_FROZEN {
                return Err(Error::Server(
                    "instance is in error state (frozen)".to_string(),
                ));
            }
            if server.server_status == status {
                return Ok(Probe::Done(server));
            }
            Ok(Probe::Pending)
        })
        .await
    }

    /// Locate the server id in a freshly fetched server list, matched by
    /// machine name. The provider does not guarantee name uniqueness; the
    /// first match wins.
    async fn find_server_id(&self) -> Result<i32> {
        let servers = self.client.get_servers().await.map_err(api_err)?;
        match servers.iter().find(|s| s.name == self.machine_name()) {
            Some(server) => {
                debug!(server_id = server.server_id, "resolved server id");
                Ok(server.server_id)
            }
            None => Err(Error::Server(format!(
                "no server found with name {}",
                self.machine_name()
            ))),
        }
    }

    /// Generate or import the machine keypair; returns the public key text.
    async fn setup_keypair(&self) -> Result<String> {
        let key_path = self.config.base.ssh_key_path();
        match &self.config.ssh_key {
            Some(src) => ssh::import_keypair(src, &key_path).await?,
            None => ssh::generate_keypair(&key_path).await?,
        }
        ssh::read_public_key(&key_path).await
    }

    /// Locate the newly created server and poll until it is running.
    async fn finish_create(&mut self) -> Result<api::ServerDetails> {
        self.config.server_id = self.find_server_id().await?;

        // The detail fetch doubles as an existence check before polling.
        self.client
            .get_server(self.config.server_id)
            .await
            .map_err(api_err)?;

        debug!(server_id = self.config.server_id, "waiting for server to run");
        self.wait_for_status(self.config.server_id, api::STATUS_RUNNING)
            .await
    }

    async fn create_smart(&mut self, public_key: String) -> Result<()> {
        let template = self
            .client
            .find_template(&self.config.template, api::HYPERVISOR_SMART)
            .await
            .map_err(api_err)?;
        debug!(template_id = template.id, "resolved template");

        let package = self
            .client
            .find_package(&self.config.size)
            .await
            .map_err(api_err)?;
        debug!(package_id = package.package_id, "resolved package");

        info!(name = self.machine_name(), "arubacloud: creating smart server");
        self.client
            .create_server_smart(&api::CreateServerSmartRequest {
                name: self.machine_name().to_string(),
                administrator_password: self.config.admin_password.clone(),
                package_id: package.package_id,
                template_id: template.id,
                ssh_key: Some(public_key),
                enable_ipv6: self.config.enable_ipv6,
            })
            .await
            .map_err(api_err)?;

        let server = self.finish_create().await?;

        let ip = server.ip_address().unwrap_or_default().to_string();
        if ip.is_empty() {
            return Err(Error::Server(format!(
                "no ip found for server {}",
                self.config.server_id
            )));
        }
        self.config.base.ip_address = ip;

        info!(
            server_id = self.config.server_id,
            ip = %self.config.base.ip_address,
            "arubacloud: server ready"
        );
        Ok(())
    }

    async fn create_pro(&mut self, public_key: String) -> Result<()> {
        let template = self
            .client
            .find_template(&self.config.template, api::HYPERVISOR_PRO)
            .await
            .map_err(api_err)?;
        debug!(template_id = template.id, "resolved template");

        // Reuse the configured address if one was given, else buy a new one.
        let ip = if self.config.base.ip_address.is_empty() {
            let ip = self.client.purchase_ip().await.map_err(api_err)?;
            info!(resource_id = ip.resource_id, ip = %ip.value, "arubacloud: purchased ip");
            ip
        } else {
            let ip = self
                .client
                .find_purchased_ip(&self.config.base.ip_address)
                .await
                .map_err(api_err)?;
            debug!(resource_id = ip.resource_id, "using purchased ip");
            ip
        };

        let size = pro_size(&self.config.size);

        info!(name = self.machine_name(), "arubacloud: creating pro server");
        self.client
            .create_server_pro(&api::CreateServerProRequest {
                name: self.machine_name().to_string(),
                administrator_password: self.config.admin_password.clone(),
                template_id: template.id,
                ssh_key: Some(public_key),
                ip_resource_id: ip.resource_id,
                cpu_quantity: size.cpu,
                ram_quantity: size.ram_gb,
                disk_size_gb: size.disk_gb,
                enable_ipv6: self.config.enable_ipv6,
            })
            .await
            .map_err(api_err)?;

        self.finish_create().await?;
        self.config.base.ip_address = ip.value;

        info!(
            server_id = self.config.server_id,
            ip = %self.config.base.ip_address,
            "arubacloud: server ready"
        );
        Ok(())
    }

    /// Adopt an existing server by name; keeps the configured address.
    async fn attach(&mut self) -> Result<()> {
        info!(
            name = self.machine_name(),
            ip = %self.config.base.ip_address,
            "arubacloud: attaching to existing server"
        );
        self.finish_create().await?;
        Ok(())
    }
}

#[async_trait]
impl Driver for ArubaCloudDriver {
    fn driver_name(&self) -> &'static str {
        "arubacloud"
    }

    async fn pre_create_check(&mut self) -> Result<()> {
        Ok(())
    }

    async fn create(&mut self) -> Result<()> {
        let public_key = self.setup_keypair().await?;
        match self.config.action {
            CreateAction::NewSmart => self.create_smart(public_key).await,
            CreateAction::NewPro => self.create_pro(public_key).await,
            CreateAction::Attach => self.attach().await,
        }
    }

    async fn start(&self) -> Result<()> {
        let id = self.server_id()?;
        info!(server_id = id, "arubacloud: starting server");
        self.client.start_server(id).await.map_err(api_err)
    }

    async fn stop(&self) -> Result<()> {
        let id = self.server_id()?;
        if self.state().await? != MachineState::Running {
            debug!(server_id = id, "server not running, nothing to stop");
            return Ok(());
        }

        info!(server_id = id, "arubacloud: stopping server");
        self.client.stop_server(id).await.map_err(api_err)?;
        self.wait_for_status(id, api::STATUS_OFF).await?;
        Ok(())
    }

    async fn restart(&self) -> Result<()> {
        let id = self.server_id()?;
        info!(server_id = id, "arubacloud: restarting server");

        self.client.stop_server(id).await.map_err(api_err)?;
        self.wait_for_status(id, api::STATUS_OFF).await?;

        self.client.start_server(id).await.map_err(api_err)?;
        self.wait_for_status(id, api::STATUS_RUNNING).await?;
        Ok(())
    }

    async fn kill(&self) -> Result<()> {
        let id = self.server_id()?;
        if self.state().await? != MachineState::Running {
            debug!(server_id = id, "server not running, nothing to kill");
            return Ok(());
        }

        info!(server_id = id, "arubacloud: powering server off");
        self.client.power_off_server(id).await.map_err(api_err)?;
        self.wait_for_status(id, api::STATUS_OFF).await?;
        Ok(())
    }

    async fn remove(&self) -> Result<()> {
        let id = self.server_id()?;
        if self.state().await? == MachineState::Running {
            info!(server_id = id, "arubacloud: stopping server before delete");
            self.client.stop_server(id).await.map_err(api_err)?;
            self.wait_for_status(id, api::STATUS_OFF).await?;
        }

        info!(server_id = id, "arubacloud: deleting server");
        self.client.delete_server(id).await.map_err(api_err)
    }

    async fn state(&self) -> Result<MachineState> {
        let id = self.server_id()?;
        let server = self.client.get_server(id).await.map_err(api_err)?;
        debug!(server_id = id, status = server.server_status, "fetched server state");
        Ok(Self::parse_state(server.server_status))
    }

    fn url(&self) -> Result<Option<String>> {
        if self.config.base.ip_address.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!(
            "tcp://{}:{}",
            self.config.base.ip_address, DOCKER_PORT
        )))
    }

    fn ssh_hostname(&self) -> Result<String> {
        Ok(self.config.base.ip_address.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use machine_driver::BaseConfig;

    fn test_config() -> DriverConfig {
        DriverConfig {
            base: BaseConfig::new("agent-01", "/tmp/machine-test"),
            username: "ARU-0000".into(),
            password: "secret".into(),
            admin_password: "rootpw".into(),
            endpoint: "dc1".into(),
            template: "ubuntu1604_x64_1_0".into(),
            size: "Large".into(),
            action: CreateAction::NewSmart,
            ssh_key: None,
            enable_ipv6: false,
            server_id: 0,
        }
    }

    #[test]
    fn status_codes_map_to_machine_states() {
        assert_eq!(
            ArubaCloudDriver::parse_state(api::STATUS_CREATING),
            MachineState::Starting
        );
        assert_eq!(
            ArubaCloudDriver::parse_state(api::STATUS_OFF),
            MachineState::Stopped
        );
        assert_eq!(
            ArubaCloudDriver::parse_state(api::STATUS_RUNNING),
            MachineState::Running
        );
        assert_eq!(
            ArubaCloudDriver::parse_state(api::STATUS_FROZEN),
            MachineState::Saved
        );
        assert_eq!(ArubaCloudDriver::parse_state(0), MachineState::Unknown);
        assert_eq!(ArubaCloudDriver::parse_state(99), MachineState::Unknown);
    }

    #[test]
    fn url_is_none_until_an_address_exists() {
        let driver = ArubaCloudDriver::new(test_config());
        assert_eq!(driver.url().unwrap(), None);

        let mut config = test_config();
        config.base.ip_address = "185.28.0.10".into();
        let driver = ArubaCloudDriver::new(config);
        assert_eq!(
            driver.url().unwrap().as_deref(),
            Some("tcp://185.28.0.10:2376")
        );
    }

    #[test]
    fn lifecycle_needs_a_located_server() {
        let driver = ArubaCloudDriver::new(test_config());
        assert!(matches!(driver.server_id(), Err(Error::Config(_))));

        let mut config = test_config();
        config.server_id = 4242;
        let driver = ArubaCloudDriver::new(config);
        assert_eq!(driver.server_id().unwrap(), 4242);
    }

    #[test]
    fn ssh_hostname_is_the_address() {
        let mut config = test_config();
        config.base.ip_address = "185.28.0.10".into();
        let driver = ArubaCloudDriver::new(config);
        assert_eq!(driver.ssh_hostname().unwrap(), "185.28.0.10");
    }
}
