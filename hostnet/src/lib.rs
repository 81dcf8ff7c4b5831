mod host_addr;
mod subnet;

pub use host_addr::{host_interfaces, resolve_host_ip, select_host_ip, InterfaceAddr, ResolveError};
pub use subnet::{Subnet, SubnetError};
