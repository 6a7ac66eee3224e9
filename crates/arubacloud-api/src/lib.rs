//! Typed Rust client for the ArubaCloud compute (WsEndUser) API.
//!
//! Covers the subset needed for driving server lifecycles:
//! create (Smart/Pro), inspect, start/stop/poweroff/delete, plus the
//! template, package, and purchased-IP catalogs.
//!
//! Every operation is a `POST {base}/{MethodName}` with a JSON body that
//! carries the account credentials alongside the method parameters; every
//! response is a `{Success, ResultCode, ResultMessage, Value}` envelope.

mod types;

pub use types::*;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("arubacloud api request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("arubacloud api {method} returned http {status}: {body}")]
    Http {
        method: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("arubacloud api {method} failed (code {code}): {message}")]
    Api {
        method: &'static str,
        code: i64,
        message: String,
    },

    #[error("arubacloud api {method} returned an empty value")]
    EmptyValue { method: &'static str },

    #[error("no template named {0}")]
    TemplateNotFound(String),

    #[error("no preconfigured package named {0}")]
    PackageNotFound(String),

    #[error("ip address {0} is not among the purchased addresses")]
    IpNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Response envelope every WsEndUser method replies with.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope<T> {
    success: bool,
    result_code: i64,
    result_message: Option<String>,
    value: Option<T>,
}

fn endpoint_url(endpoint: &str) -> String {
    format!("https://api.{endpoint}.computing.cloud.it/WsEndUser/v2.0/WsEndUser.svc/json")
}

/// Client for one ArubaCloud data-center endpoint.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    username: String,
    password: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Client for a data-center endpoint name (`dc1`, `dc2`, ...).
    pub fn new(
        endpoint: impl AsRef<str>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::with_base_url(endpoint_url(endpoint.as_ref()), username, password)
    }

    /// Client against an explicit base URL (tests).
    pub fn with_base_url(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Credentials envelope merged with the method parameters.
    fn request_body(&self, method: &str, params: Value) -> Value {
        let mut body = serde_json::Map::new();
        body.insert("ApplicationId".into(), json!(method));
        body.insert("RequestId".into(), json!(method));
        body.insert("SessionId".into(), json!(method));
        body.insert("Username".into(), json!(self.username));
        body.insert("Password".into(), json!(self.password));
        if let Value::Object(extra) = params {
            body.extend(extra);
        }
        Value::Object(body)
    }

    async fn envelope<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<Envelope<T>> {
        tracing::debug!(method, "arubacloud api call");

        let resp = self
            .http
            .post(self.url(method))
            .json(&self.request_body(method, params))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http { method, status, body });
        }

        let envelope: Envelope<T> = resp.json().await?;
        if !envelope.success {
            return Err(Error::Api {
                method,
                code: envelope.result_code,
                message: envelope.result_message.unwrap_or_default(),
            });
        }
        Ok(envelope)
    }

    /// Call a method and deserialize its `Value`.
    async fn call<T: DeserializeOwned>(&self, method: &'static str, params: Value) -> Result<T> {
        self.envelope(method, params)
            .await?
            .value
            .ok_or(Error::EmptyValue { method })
    }

    /// Call a method whose `Value` we don't care about (enqueue operations).
    async fn exec(&self, method: &'static str, params: Value) -> Result<()> {
        let _: Envelope<Value> = self.envelope(method, params).await?;
        Ok(())
    }

    // ── Servers ──────────────────────────────────────────────────────

    pub async fn get_servers(&self) -> Result<Vec<ServerSummary>> {
        self.call("GetServers", json!({})).await
    }

    pub async fn get_server(&self, server_id: i32) -> Result<ServerDetails> {
        self.call("GetServerDetails", json!({ "ServerId": server_id }))
            .await
    }

    pub async fn create_server_smart(&self, req: &CreateServerSmartRequest) -> Result<()> {
        self.exec("SetEnqueueServerCreation", json!({ "Server": req }))
            .await
    }

    pub async fn create_server_pro(&self, req: &CreateServerProRequest) -> Result<()> {
        self.exec("SetEnqueueServerCreation", json!({ "Server": req }))
            .await
    }

    pub async fn start_server(&self, server_id: i32) -> Result<()> {
        self.exec("SetEnqueueServerStart", json!({ "ServerId": server_id }))
            .await
    }

    /// Graceful shutdown.
    pub async fn stop_server(&self, server_id: i32) -> Result<()> {
        self.exec("SetEnqueueServerStop", json!({ "ServerId": server_id }))
            .await
    }

    /// Hard poweroff.
    pub async fn power_off_server(&self, server_id: i32) -> Result<()> {
        self.exec("SetEnqueueServerPowerOff", json!({ "ServerId": server_id }))
            .await
    }

    pub async fn delete_server(&self, server_id: i32) -> Result<()> {
        self.exec("SetEnqueueServerDeletion", json!({ "ServerId": server_id }))
            .await
    }

    // ── Catalogs ─────────────────────────────────────────────────────

    pub async fn get_templates(&self, hypervisor: i32) -> Result<Vec<Template>> {
        self.call("GetTemplates", json!({ "HypervisorType": hypervisor }))
            .await
    }

    /// Linear search of the template catalog by name.
    pub async fn find_template(&self, name: &str, hypervisor: i32) -> Result<Template> {
        let templates = self.get_templates(hypervisor).await?;
        templates
            .into_iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))
    }

    pub async fn get_packages(&self) -> Result<Vec<Package>> {
        self.call(
            "GetPreConfiguredPackages",
            json!({ "HypervisorType": HYPERVISOR_SMART }),
        )
        .await
    }

    /// Preconfigured Smart package matched by size name (`Small`, `Large`, ...).
    pub async fn find_package(&self, size: &str) -> Result<Package> {
        let packages = self.get_packages().await?;
        packages
            .into_iter()
            .find(|p| p.description == size)
            .ok_or_else(|| Error::PackageNotFound(size.to_string()))
    }

    // ── Purchased IPs ────────────────────────────────────────────────

    pub async fn get_purchased_ips(&self) -> Result<Vec<IpAddress>> {
        self.call("GetPurchasedIpAddresses", json!({})).await
    }

    /// Already-purchased address matched by its literal value.
    pub async fn find_purchased_ip(&self, value: &str) -> Result<IpAddress> {
        let addresses = self.get_purchased_ips().await?;
        addresses
            .into_iter()
            .find(|ip| ip.value == value)
            .ok_or_else(|| Error::IpNotFound(value.to_string()))
    }

    /// Buy a new public address.
    pub async fn purchase_ip(&self) -> Result<IpAddress> {
        self.call("SetEnqueuePurchaseIpAddress", json!({})).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::with_base_url("http://localhost:1", "ARU-0000", "hunter2")
    }

    #[test]
    fn endpoint_url_points_at_the_datacenter() {
        assert_eq!(
            endpoint_url("dc3"),
            "https://api.dc3.computing.cloud.it/WsEndUser/v2.0/WsEndUser.svc/json"
        );
    }

    #[test]
    fn request_body_carries_credentials_and_params() {
        let body = client().request_body("GetServerDetails", json!({ "ServerId": 7 }));

        assert_eq!(body["ApplicationId"], "GetServerDetails");
        assert_eq!(body["RequestId"], "GetServerDetails");
        assert_eq!(body["SessionId"], "GetServerDetails");
        assert_eq!(body["Username"], "ARU-0000");
        assert_eq!(body["Password"], "hunter2");
        assert_eq!(body["ServerId"], 7);
    }

    #[test]
    fn envelope_success_deserializes_value() {
        let raw = r#"{
            "Success": true,
            "ResultCode": 0,
            "ResultMessage": null,
            "Value": [ { "ServerId": 1, "Name": "a", "ServerStatus": 3 } ]
        }"#;

        let envelope: Envelope<Vec<ServerSummary>> = serde_json::from_str(raw).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.value.unwrap()[0].server_id, 1);
    }

    #[test]
    fn envelope_failure_keeps_code_and_message() {
        let raw = r#"{
            "Success": false,
            "ResultCode": 17,
            "ResultMessage": "operation not allowed",
            "Value": null
        }"#;

        let envelope: Envelope<Value> = serde_json::from_str(raw).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.result_code, 17);
        assert_eq!(envelope.result_message.as_deref(), Some("operation not allowed"));
    }
}
