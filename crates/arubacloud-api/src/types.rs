use serde::{Deserialize, Serialize};

// ── Server status codes ──────────────────────────────────────────────

/// Server is being created.
pub const STATUS_CREATING: i32 = 1;
/// Server is powered off.
pub const STATUS_OFF: i32 = 2;
/// Server is running.
pub const STATUS_RUNNING: i32 = 3;
/// Server is frozen; the provider reports this for errored creates.
pub const STATUS_FROZEN: i32 = 4;
/// Server has been deleted.
pub const STATUS_DELETED: i32 = 5;

// ── Hypervisor selectors ─────────────────────────────────────────────

/// Template catalog for Smart (low-cost, package-based) servers.
pub const HYPERVISOR_SMART: i32 = 4;
/// Template catalog for Pro (custom-sized VMware) servers.
pub const HYPERVISOR_PRO: i32 = 2;

// ── Server types ─────────────────────────────────────────────────────

/// One entry of the `GetServers` listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerSummary {
    pub server_id: i32,
    pub name: String,
    pub server_status: i32,
}

/// Full server record returned by `GetServerDetails`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerDetails {
    pub server_id: i32,
    pub name: String,
    pub server_status: i32,
    #[serde(rename = "EasyCloudIPAddress", default)]
    pub easy_cloud_ip_address: Option<IpValue>,
}

impl ServerDetails {
    /// EasyCloud address, once the provider has assigned one.
    pub fn ip_address(&self) -> Option<&str> {
        self.easy_cloud_ip_address
            .as_ref()
            .map(|ip| ip.value.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// Wrapper object the API uses for address fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpValue {
    pub value: String,
}

// ── Create requests ──────────────────────────────────────────────────

/// `SetEnqueueServerCreation` payload for a Smart server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateServerSmartRequest {
    pub name: String,
    pub administrator_password: String,
    #[serde(rename = "SmartVMWarePackageID")]
    pub package_id: i32,
    #[serde(rename = "OSTemplateId")]
    pub template_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<String>,
    #[serde(rename = "EnableIPv6")]
    pub enable_ipv6: bool,
}

/// `SetEnqueueServerCreation` payload for a Pro server with explicit
/// resources and an attached purchased IP.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateServerProRequest {
    pub name: String,
    pub administrator_password: String,
    #[serde(rename = "OSTemplateId")]
    pub template_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<String>,
    #[serde(rename = "PublicIpAddressResourceId")]
    pub ip_resource_id: i64,
    #[serde(rename = "CPUQuantity")]
    pub cpu_quantity: i32,
    #[serde(rename = "RAMQuantity")]
    pub ram_quantity: i32,
    #[serde(rename = "VirtualDiskSizeGB")]
    pub disk_size_gb: i32,
    #[serde(rename = "EnableIPv6")]
    pub enable_ipv6: bool,
}

// ── Catalog types ────────────────────────────────────────────────────

/// OS template as listed by `GetTemplates`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    pub id: i64,
    pub name: String,
    pub hypervisor_type: i32,
}

/// Preconfigured Smart package as listed by `GetPreConfiguredPackages`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Package {
    #[serde(rename = "PackageID")]
    pub package_id: i32,
    pub description: String,
}

/// Purchased public IP address.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpAddress {
    pub resource_id: i64,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_details_with_address() {
        let raw = r#"{
            "ServerId": 4242,
            "Name": "agent-01",
            "ServerStatus": 3,
            "EasyCloudIPAddress": { "Value": "185.28.0.10" }
        }"#;

        let server: ServerDetails = serde_json::from_str(raw).unwrap();
        assert_eq!(server.server_id, 4242);
        assert_eq!(server.server_status, STATUS_RUNNING);
        assert_eq!(server.ip_address(), Some("185.28.0.10"));
    }

    #[test]
    fn server_details_without_address() {
        let raw = r#"{ "ServerId": 1, "Name": "agent-01", "ServerStatus": 1 }"#;
        let server: ServerDetails = serde_json::from_str(raw).unwrap();
        assert_eq!(server.ip_address(), None);

        let raw = r#"{
            "ServerId": 1,
            "Name": "agent-01",
            "ServerStatus": 1,
            "EasyCloudIPAddress": { "Value": "" }
        }"#;
        let server: ServerDetails = serde_json::from_str(raw).unwrap();
        assert_eq!(server.ip_address(), None);
    }

    #[test]
    fn smart_request_wire_format() {
        let req = CreateServerSmartRequest {
            name: "agent-01".into(),
            administrator_password: "secret".into(),
            package_id: 2,
            template_id: 440,
            ssh_key: None,
            enable_ipv6: false,
        };

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["Name"], "agent-01");
        assert_eq!(value["SmartVMWarePackageID"], 2);
        assert_eq!(value["OSTemplateId"], 440);
        assert!(value.get("SshKey").is_none());
        assert_eq!(value["EnableIPv6"], false);
    }

    #[test]
    fn pro_request_wire_format() {
        let req = CreateServerProRequest {
            name: "agent-01".into(),
            administrator_password: "secret".into(),
            template_id: 440,
            ssh_key: Some("ssh-rsa AAAA".into()),
            ip_resource_id: 99,
            cpu_quantity: 2,
            ram_quantity: 4,
            disk_size_gb: 80,
            enable_ipv6: true,
        };

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["PublicIpAddressResourceId"], 99);
        assert_eq!(value["CPUQuantity"], 2);
        assert_eq!(value["RAMQuantity"], 4);
        assert_eq!(value["VirtualDiskSizeGB"], 80);
        assert_eq!(value["SshKey"], "ssh-rsa AAAA");
    }
}
