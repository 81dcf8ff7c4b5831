#[macro_use]
extern crate tracing;

use std::process::{ExitCode, ExitStatus};

use clap::Parser;
use config::Config;
use error::{Error, EXIT_HANDOFF};
use handoff::handoff;
use hostnet::{host_interfaces, resolve_host_ip, InterfaceAddr};
use register::{GatewayConfig, ManagementApi};

mod config;
mod error;
mod handoff;
mod register;

fn init_log() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("exproto_bootstrap=info,hostnet=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_log();

    // Exits with code 2 on missing or malformed input.
    let config = Config::parse();

    match run(&config).await {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            error!("{}", error);
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(config: &Config) -> Result<u8, Error> {
    let interfaces = host_interfaces()?;

    bootstrap(config, &interfaces).await?;

    if config.command.is_empty() {
        return Ok(0);
    }

    let status = handoff(&config.command).await.map_err(Error::Handoff)?;

    Ok(exit_code_of(status))
}

/// Selects the host address from `interfaces` and registers the gateway with it.
async fn bootstrap(config: &Config, interfaces: &[InterfaceAddr]) -> Result<InterfaceAddr, Error> {
    // Bad API settings fail before anything else is looked at.
    let api = ManagementApi::new(&config.api)?;

    let host = resolve_host_ip(&config.network, interfaces)?;

    info!("Selected {} on {} in {}", host.addr, host.name, config.network);

    let gateway = GatewayConfig::new(host.addr, &config.adapter_port, &config.port);

    api.register(&gateway).await?;

    Ok(host)
}

fn exit_code_of(status: ExitStatus) -> u8 {
    match status.code() {
        Some(code) => {
            if code != 0 {
                warn!("Handoff command exited with {}", code);
            }
            code as u8
        }
        None => {
            error!("Handoff command was terminated by a signal");
            EXIT_HANDOFF
        }
    }
}
