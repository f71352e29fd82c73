//! The host's network interfaces, as seen from a transport.
//!
//! Interfaces belong to the surrounding network layer. A transport only needs
//! to find the interface its bound address belongs to and tell it that the
//! transport has packets waiting. The interface drains them later with
//! [`Transport::pull_outbound`](crate::Transport::pull_outbound).

use crate::{address::Ipv4Address, descriptor::Handle};
use rustc_hash::FxHashMap;
use std::{fmt, sync::Arc};

/// A shared handle to a host's interfaces, given to each transport when it is
/// created.
pub type HostContext = Arc<Interfaces>;

/// A simulated network interface that sends packets on behalf of transports.
pub trait NetworkInterface: Send + Sync {
    /// The address this interface is reachable at.
    fn address(&self) -> Ipv4Address;

    /// Records that the transport behind `handle` has packets in its output
    /// buffer and should be included in the next send cycle. This must not
    /// send anything immediately.
    fn wants_send(&self, handle: Handle);
}

/// The interfaces of one simulated host, keyed by address.
#[derive(Default)]
pub struct Interfaces {
    by_address: FxHashMap<Ipv4Address, Arc<dyn NetworkInterface>>,
    default: Option<Ipv4Address>,
}

impl Interfaces {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds an interface. The first non-loopback interface added becomes the
    /// default one, which addresses bound to `0.0.0.0` resolve to.
    pub fn insert(&mut self, interface: Arc<dyn NetworkInterface>) {
        let address = interface.address();
        let replaces_default = match self.default {
            None => true,
            Some(current) => current.is_loopback() && !address.is_loopback(),
        };
        if replaces_default {
            self.default = Some(address);
        }
        if self.by_address.insert(address, interface).is_some() {
            tracing::warn!(%address, "replaced an existing interface");
        }
    }

    /// Finds the interface for a local address.
    pub fn lookup(&self, address: Ipv4Address) -> Option<Arc<dyn NetworkInterface>> {
        let address = if address.is_unspecified() {
            self.default?
        } else {
            address
        };
        self.by_address.get(&address).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Interfaces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interfaces")
            .field("addresses", &self.by_address.keys().collect::<Vec<_>>())
            .field("default", &self.default)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nic(Ipv4Address);

    impl NetworkInterface for Nic {
        fn address(&self) -> Ipv4Address {
            self.0
        }

        fn wants_send(&self, _handle: Handle) {}
    }

    const ETH0: Ipv4Address = Ipv4Address::new([10, 0, 0, 2]);

    #[test]
    fn exact_lookup() {
        let mut interfaces = Interfaces::new();
        interfaces.insert(Arc::new(Nic(Ipv4Address::LOCALHOST)));
        interfaces.insert(Arc::new(Nic(ETH0)));
        assert_eq!(interfaces.len(), 2);
        assert_eq!(interfaces.lookup(ETH0).unwrap().address(), ETH0);
        assert_eq!(
            interfaces.lookup(Ipv4Address::LOCALHOST).unwrap().address(),
            Ipv4Address::LOCALHOST
        );
        assert!(interfaces
            .lookup(Ipv4Address::new([10, 0, 0, 3]))
            .is_none());
    }

    #[test]
    fn any_resolves_to_first_non_loopback() {
        let mut interfaces = Interfaces::new();
        interfaces.insert(Arc::new(Nic(Ipv4Address::LOCALHOST)));
        assert_eq!(
            interfaces
                .lookup(Ipv4Address::CURRENT_NETWORK)
                .unwrap()
                .address(),
            Ipv4Address::LOCALHOST
        );
        interfaces.insert(Arc::new(Nic(ETH0)));
        interfaces.insert(Arc::new(Nic(Ipv4Address::new([10, 0, 1, 2]))));
        assert_eq!(
            interfaces
                .lookup(Ipv4Address::CURRENT_NETWORK)
                .unwrap()
                .address(),
            ETH0
        );
    }

    #[test]
    fn empty_table() {
        let interfaces = Interfaces::new();
        assert!(interfaces.is_empty());
        assert!(interfaces.lookup(Ipv4Address::CURRENT_NETWORK).is_none());
    }
}
