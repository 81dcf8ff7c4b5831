use std::net::Ipv6Addr;
use std::time::Duration;

use clap::{Args, Parser, ValueEnum};
use hostnet::Subnet;

use crate::register::ResponsePolicy;

/// Registers this host's ExProto adapter with the EMQX management API.
///
/// Every option can also be given through the environment variable shown in brackets.
#[derive(Parser, Debug)]
#[command(name = "exproto-bootstrap", version, after_long_help = EXIT_CODES)]
pub struct Config {
    /// Port the ExProto adapter binds on the broker, sent verbatim.
    #[arg(long, env = "EMQX_ADAPTER_PORT")]
    pub adapter_port: String,

    /// Public port of the local gRPC handler, used verbatim in the handler address.
    #[arg(long, env = "PORT")]
    pub port: String,

    /// Subnet the host address is selected from, in CIDR notation.
    #[arg(long, env = "NETWORK")]
    pub network: Subnet,

    #[command(flatten)]
    pub api: ApiConfig,

    /// Command to run once the gateway is registered, e.g. `-- haproxy -f haproxy.cfg`.
    ///
    /// Its exit code becomes ours, so codes 1 to 5 from it read the same as our own failures.
    #[arg(last = true)]
    pub command: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ApiConfig {
    /// Management API host.
    #[arg(long = "emqx-host", env = "EMQX_HOST")]
    pub host: String,

    /// Management API port.
    #[arg(id = "emqx_port", long = "emqx-port", env = "EMQX_PORT")]
    pub port: u16,

    /// Management API username.
    #[arg(long = "emqx-user", env = "EMQX_USER")]
    pub username: String,

    /// Management API password.
    #[arg(long = "emqx-pass", env = "EMQX_PASS", hide_env_values = true)]
    pub password: String,

    #[arg(long = "emqx-scheme", env = "EMQX_SCHEME", value_enum, default_value_t = Scheme::Http)]
    pub scheme: Scheme,

    /// Path prefix of the API resources, e.g. `/api/v5`.
    #[arg(long = "emqx-api-path", env = "EMQX_API_PATH", default_value = "")]
    pub api_path: String,

    /// Request timeout in seconds.
    #[arg(
        long = "emqx-timeout",
        env = "EMQX_TIMEOUT",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Extra attempts after a transport failure.
    #[arg(long = "emqx-retries", env = "EMQX_RETRIES", default_value_t = 0)]
    pub retries: u32,

    /// Delay between attempts in milliseconds.
    #[arg(long = "emqx-retry-delay", env = "EMQX_RETRY_DELAY", default_value_t = 1000)]
    pub retry_delay_ms: u64,

    /// What to do when the API answers with a non-success status.
    #[arg(
        long = "emqx-response-policy",
        env = "EMQX_RESPONSE_POLICY",
        value_enum,
        default_value_t = ResponsePolicy::Validate
    )]
    pub response_policy: ResponsePolicy,
}

const EXIT_CODES: &str = "\
Exit codes:
  0  registered (and the handoff command, if any, exited 0)
  1  no interface address in NETWORK, or interfaces unreadable
  2  missing or malformed configuration
  3  management API unreachable or timed out
  4  management API rejected the gateway
  5  handoff command could not start or was killed by a signal
  n  handoff command exited with n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Full URL of the ExProto gateway resource.
    ///
    /// Not validated here, `ManagementApi::new` parses it.
    pub fn gateway_url(&self) -> String {
        let host = match self.host.parse::<Ipv6Addr>() {
            Ok(v6) => format!("[{v6}]"),
            Err(_) => self.host.clone(),
        };
        let prefix = self.api_path.trim_end_matches('/');
        let slash = if prefix.is_empty() || prefix.starts_with('/') { "" } else { "/" };

        format!(
            "{}://{}:{}{slash}{prefix}/gateways/exproto",
            self.scheme.as_str(),
            host,
            self.port
        )
    }
}
