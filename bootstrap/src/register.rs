use std::net::Ipv4Addr;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::ValueEnum;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::config::{ApiConfig, Scheme};
use crate::error::Error;

/// Gateway type the adapter registers as.
pub const GATEWAY_NAME: &str = "exproto";

/// Body of `PUT /gateways/exproto`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayConfig {
    pub name: String,
    pub server: Server,
    pub handler: Handler,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Server {
    pub bind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Handler {
    pub address: String,
}

impl GatewayConfig {
    pub fn new(host_ip: Ipv4Addr, bind_port: &str, public_port: &str) -> Self {
        GatewayConfig {
            name: GATEWAY_NAME.to_string(),
            server: Server {
                bind: bind_port.to_string(),
            },
            handler: Handler {
                address: format!("http://{host_ip}:{public_port}"),
            },
        }
    }
}

/// How a non-success answer from the management API is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResponsePolicy {
    /// Log it and carry on as if the gateway was registered.
    Ignore,
    /// Fail the run.
    Validate,
}

/// Value of the `Authorization` header for HTTP basic auth.
pub fn basic_auth(username: &str, password: &str) -> String {
    let credentials = format!("{username}:{password}");
    format!("Basic {}", STANDARD.encode(credentials.as_bytes()))
}

/// Client for the EMQX gateway management resource.
pub struct ManagementApi {
    client: Client,
    url: Url,
    authorization: String,
    policy: ResponsePolicy,
    retries: u32,
    retry_delay: Duration,
}

impl ManagementApi {
    pub fn new(config: &ApiConfig) -> Result<Self, Error> {
        let raw = config.gateway_url();
        let url = Url::parse(&raw).map_err(|e| Error::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout())
            .build()
            .map_err(Error::Client)?;

        if config.scheme == Scheme::Http {
            warn!("Credentials for {} are sent without TLS", config.host);
        }

        Ok(ManagementApi {
            client,
            url,
            authorization: basic_auth(&config.username, &config.password),
            policy: config.response_policy,
            retries: config.retries,
            retry_delay: config.retry_delay(),
        })
    }

    /// Creates or replaces the ExProto gateway.
    ///
    /// Transport failures are retried up to the configured number of times. The
    /// answer is checked according to the [`ResponsePolicy`].
    pub async fn register(&self, gateway: &GatewayConfig) -> Result<StatusCode, Error> {
        let body = serde_json::to_vec(gateway).map_err(Error::Encode)?;
        debug!("PUT {} {}", self.url, String::from_utf8_lossy(&body));

        let mut attempt = 0;

        let response = loop {
            attempt += 1;

            let sent = self
                .client
                .put(self.url.clone())
                .header(CONTENT_TYPE, "application/json")
                .header(AUTHORIZATION, &self.authorization)
                .body(body.clone())
                .send()
                .await;

            match sent {
                Ok(v) => break v,
                Err(error) if attempt <= self.retries => {
                    warn!(
                        "Registration attempt {}/{} failed: {}",
                        attempt,
                        self.retries + 1,
                        error
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(error) => return Err(Error::Transport(error)),
            }
        };

        let status = response.status();

        if status.is_success() {
            info!("Registered {} handler at {}", gateway.name, gateway.handler.address);
            return Ok(status);
        }

        // The body usually carries EMQX's error code and message.
        let body = response.text().await.unwrap_or_default();

        match self.policy {
            ResponsePolicy::Ignore => {
                warn!("Management API answered {}: {}", status, body);
                Ok(status)
            }
            ResponsePolicy::Validate => Err(Error::Rejected { status, body }),
        }
    }
}
