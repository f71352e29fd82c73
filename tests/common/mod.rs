#![allow(dead_code)]

use elvis_transport::{Handle, HostContext, Interfaces, Ipv4Address, NetworkInterface};
use std::sync::{Arc, Mutex};

pub const HOST_ADDRESS: Ipv4Address = Ipv4Address::new([10, 0, 0, 2]);
pub const PEER_ADDRESS: Ipv4Address = Ipv4Address::new([10, 0, 0, 3]);

/// An interface that remembers which transports asked to send.
pub struct RecordingNic {
    address: Ipv4Address,
    wants: Mutex<Vec<Handle>>,
}

impl RecordingNic {
    pub fn new(address: Ipv4Address) -> Arc<Self> {
        Arc::new(Self {
            address,
            wants: Default::default(),
        })
    }

    pub fn notifications(&self) -> Vec<Handle> {
        self.wants.lock().unwrap().clone()
    }
}

impl NetworkInterface for RecordingNic {
    fn address(&self) -> Ipv4Address {
        self.address
    }

    fn wants_send(&self, handle: Handle) {
        self.wants.lock().unwrap().push(handle);
    }
}

/// A host with a loopback interface and one external interface.
pub fn host() -> (HostContext, Arc<RecordingNic>, Arc<RecordingNic>) {
    let eth0 = RecordingNic::new(HOST_ADDRESS);
    let lo = RecordingNic::new(Ipv4Address::LOCALHOST);
    let mut interfaces = Interfaces::new();
    interfaces.insert(lo.clone());
    interfaces.insert(eth0.clone());
    (Arc::new(interfaces), eth0, lo)
}
