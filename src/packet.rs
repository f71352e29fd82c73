//! The unit of data moved between simulated hosts.
//!
//! A [`Packet`] is immutable and reference counted. Cloning a packet acquires
//! a reference and dropping one releases it; the packet's contents are freed
//! when the last owner lets go. Transport buffers rely on this to co-own the
//! packets they hold while the network layer keeps its own references.

use crate::{address::Endpoint, transport::ProtocolKind};
use std::sync::Arc;

mod payload;
pub use payload::Payload;

/// A shared handle to an immutable simulated packet.
#[derive(Debug, Clone)]
pub struct Packet(Arc<PacketInner>);

#[derive(Debug)]
struct PacketInner {
    protocol: ProtocolKind,
    source: Endpoint,
    destination: Endpoint,
    sequence: u32,
    payload: Payload,
}

impl Packet {
    /// Creates a packet carrying `payload` from `source` to `destination`.
    pub fn new(
        protocol: ProtocolKind,
        source: Endpoint,
        destination: Endpoint,
        payload: impl Into<Payload>,
    ) -> Self {
        Self::with_sequence(protocol, source, destination, 0, payload)
    }

    /// Creates a stream segment whose first payload byte has sequence number
    /// `sequence`.
    pub fn with_sequence(
        protocol: ProtocolKind,
        source: Endpoint,
        destination: Endpoint,
        sequence: u32,
        payload: impl Into<Payload>,
    ) -> Self {
        Self(Arc::new(PacketInner {
            protocol,
            source,
            destination,
            sequence,
            payload: payload.into(),
        }))
    }

    pub fn protocol(&self) -> ProtocolKind {
        self.0.protocol
    }

    pub fn source(&self) -> Endpoint {
        self.0.source
    }

    pub fn destination(&self) -> Endpoint {
        self.0.destination
    }

    pub fn sequence(&self) -> u32 {
        self.0.sequence
    }

    pub fn payload(&self) -> &Payload {
        &self.0.payload
    }

    /// The number of payload bytes. This is what buffer capacities are
    /// measured in.
    pub fn payload_len(&self) -> usize {
        self.0.payload.len()
    }

    /// A new packet holding everything after the first `offset` payload
    /// bytes, with the sequence number advanced to match.
    pub fn remainder(&self, offset: usize) -> Self {
        Self::with_sequence(
            self.0.protocol,
            self.0.source,
            self.0.destination,
            self.0.sequence.wrapping_add(offset as u32),
            self.0.payload.skip(offset),
        )
    }

    /// The number of live references to this packet.
    pub fn reference_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Whether both handles refer to the same packet.
    pub fn ptr_eq(&self, other: &Packet) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Ipv4Address;

    fn endpoint(port: u16) -> Endpoint {
        Endpoint::new(Ipv4Address::new([10, 0, 0, 1]), port)
    }

    #[test]
    fn clone_acquires_reference() {
        let packet = Packet::new(ProtocolKind::Udp, endpoint(1), endpoint(2), "hello");
        assert_eq!(packet.reference_count(), 1);
        let copy = packet.clone();
        assert_eq!(packet.reference_count(), 2);
        assert!(copy.ptr_eq(&packet));
        drop(copy);
        assert_eq!(packet.reference_count(), 1);
    }

    #[test]
    fn remainder_advances_sequence() {
        let packet = Packet::with_sequence(
            ProtocolKind::Tcp,
            endpoint(1),
            endpoint(2),
            u32::MAX - 1,
            "abcdef",
        );
        let rest = packet.remainder(4);
        assert_eq!(rest.payload().as_slice(), b"ef");
        assert_eq!(rest.sequence(), 2);
        assert_eq!(rest.source(), packet.source());
        assert!(!rest.ptr_eq(&packet));
    }
}
