use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnet::Ipv4Net;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubnetError {
    #[error("{0:?} is not an IPv4 CIDR block")]
    Malformed(String),
    #[error("{input:?} has host bits set, did you mean {network}?")]
    HostBits { input: String, network: Ipv4Net },
}

/// The IPv4 network the gateway host is expected to be attached to.
///
/// Always holds a truncated network, i.e. `10.0.0.0/24` and never `10.0.0.7/24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subnet(Ipv4Net);

impl Subnet {
    pub fn network(&self) -> Ipv4Addr {
        self.0.network()
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        self.0.broadcast()
    }

    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Whether `addr` is a usable host address of this subnet.
    ///
    /// The network and broadcast addresses are excluded, except for /31 and /32
    /// where every address is a host.
    pub fn contains_host(&self, addr: Ipv4Addr) -> bool {
        if !self.0.contains(&addr) {
            return false;
        }

        if self.0.prefix_len() >= 31 {
            return true;
        }

        addr != self.0.network() && addr != self.0.broadcast()
    }
}

impl From<Ipv4Net> for Subnet {
    fn from(net: Ipv4Net) -> Self {
        Subnet(net.trunc())
    }
}

impl FromStr for Subnet {
    type Err = SubnetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let net: Ipv4Net = s
            .trim()
            .parse()
            .map_err(|_| SubnetError::Malformed(s.to_string()))?;

        if net != net.trunc() {
            return Err(SubnetError::HostBits {
                input: s.to_string(),
                network: net.trunc(),
            });
        }

        Ok(Subnet(net))
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
