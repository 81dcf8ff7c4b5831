use std::process::ExitStatus;

use anyhow::{Context, Result};
use tokio::process::Command;

/// Runs the post-registration command to completion.
pub async fn handoff(command: &[String]) -> Result<ExitStatus> {
    let (program, args) = command.split_first().context("empty handoff command")?;

    info!("Handing off to {} {}", program, args.join(" "));

    let status = Command::new(program)
        .args(args)
        .status()
        .await
        .with_context(|| format!("failed to run {program}"))?;

    Ok(status)
}
