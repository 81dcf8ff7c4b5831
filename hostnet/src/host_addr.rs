use std::io;
use std::net::Ipv4Addr;

use systemstat::{Platform, System};
use thiserror::Error;
use tracing::debug;

use crate::Subnet;

/// An IPv4 address assigned to a host network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddr {
    pub name: String,
    pub addr: Ipv4Addr,
}

impl InterfaceAddr {
    pub fn new(name: impl Into<String>, addr: Ipv4Addr) -> Self {
        InterfaceAddr {
            name: name.into(),
            addr,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to read network interfaces: {0}")]
    Enumerate(#[from] io::Error),
    #[error("host has no interface address in {0}")]
    NoMatch(Subnet),
}

/// Reads the IPv4 addresses of all host interfaces.
///
/// Interfaces come in name order, addresses within an interface in the order
/// the host reports them.
pub fn host_interfaces() -> Result<Vec<InterfaceAddr>, ResolveError> {
    let system = System::new();

    // BTreeMap keyed on the interface name.
    let networks = system.networks()?;

    let mut table = Vec::new();

    for (name, net) in &networks {
        for n in &net.addrs {
            if let systemstat::IpAddr::V4(v) = n.addr {
                table.push(InterfaceAddr::new(name.as_str(), v));
            }
        }
    }

    Ok(table)
}

/// First entry of `table` that is a usable host address of `subnet`.
pub fn select_host_ip<'a>(subnet: &Subnet, table: &'a [InterfaceAddr]) -> Option<&'a InterfaceAddr> {
    table.iter().find(|entry| {
        let usable = subnet.contains_host(entry.addr);
        debug!(iface = %entry.name, addr = %entry.addr, usable, "Candidate address");
        usable
    })
}

/// Picks the host's address in `subnet`, failing when `table` has none.
///
/// `table` normally comes from [`host_interfaces`].
pub fn resolve_host_ip(subnet: &Subnet, table: &[InterfaceAddr]) -> Result<InterfaceAddr, ResolveError> {
    select_host_ip(subnet, table)
        .cloned()
        .ok_or(ResolveError::NoMatch(*subnet))
}
