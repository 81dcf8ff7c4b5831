use hostnet::ResolveError;
use reqwest::StatusCode;
use thiserror::Error;

/// No usable address in the configured subnet, or the interface table could not be read.
pub const EXIT_RESOLUTION: u8 = 1;
/// Bad or missing input. Also what clap exits with on argument errors.
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_TRANSPORT: u8 = 3;
pub const EXIT_REJECTED: u8 = 4;
pub const EXIT_HANDOFF: u8 = 5;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("invalid management API URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to set up the HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to encode the gateway config: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("registration request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("management API rejected the gateway with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("handoff failed: {0:#}")]
    Handoff(anyhow::Error),
}

impl Error {
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Resolve(_) => EXIT_RESOLUTION,
            Error::InvalidUrl { .. } | Error::Client(_) | Error::Encode(_) => EXIT_CONFIG,
            Error::Transport(_) => EXIT_TRANSPORT,
            Error::Rejected { .. } => EXIT_REJECTED,
            Error::Handoff(_) => EXIT_HANDOFF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;

    #[test]
    fn resolution_failures_share_a_code() {
        let no_match = Error::from(ResolveError::NoMatch("10.0.0.0/24".parse().unwrap()));
        assert_eq!(no_match.exit_code(), EXIT_RESOLUTION);
        assert_eq!(no_match.to_string(), "host has no interface address in 10.0.0.0/24");

        let unreadable = Error::from(ResolveError::Enumerate(io::Error::other("no /proc")));
        assert_eq!(unreadable.exit_code(), EXIT_RESOLUTION);
    }

    #[test]
    fn codes_are_distinct() {
        let mut codes = vec![EXIT_RESOLUTION, EXIT_CONFIG, EXIT_TRANSPORT, EXIT_REJECTED, EXIT_HANDOFF];
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 5);
        assert!(!codes.contains(&0));
    }

    #[test]
    fn handoff_keeps_context() {
        let err = Error::Handoff(anyhow::anyhow!("no such file").context("failed to run haproxy"));
        assert_eq!(err.exit_code(), EXIT_HANDOFF);
        assert_eq!(err.to_string(), "handoff failed: failed to run haproxy: no such file");
    }
}
