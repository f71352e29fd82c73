//! Byte streams between descriptors on the same host.

use super::{queue_segments, read_stream};
use crate::{
    address::{Endpoint, Ipv4Address},
    config::MTU,
    packet::Packet,
    transport::{TransportCore, TransportError, TransportProtocol},
};

/// Loopback stream behavior for pipes and socket pairs. Packets never leave
/// the host, so there is no sequencing: they arrive in the order they were
/// sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct Local;

impl Local {
    pub fn new() -> Self {
        Self
    }
}

impl TransportProtocol for Local {
    fn free(&mut self, transport: &mut TransportCore) {
        tracing::debug!(descriptor = %transport.handle(), "freeing local transport");
    }

    fn process_inbound(&mut self, transport: &mut TransportCore, packet: &Packet) -> bool {
        transport.add_to_input_buffer(packet).is_ok()
    }

    /// Queues as much of `buffer` as fits. An unspecified destination means
    /// the loopback address on the transport's own port.
    fn send(
        &mut self,
        transport: &mut TransportCore,
        buffer: &[u8],
        destination: Endpoint,
    ) -> Result<usize, TransportError> {
        let source = transport.bound_endpoint().ok_or(TransportError::NotBound)?;
        let destination = if destination.is_unspecified() {
            Endpoint::new(Ipv4Address::LOCALHOST, source.port)
        } else {
            destination
        };
        let protocol = transport.protocol();
        queue_segments(transport, buffer, MTU, |_, chunk| {
            Packet::new(protocol, source, destination, chunk)
        })
    }

    fn receive(
        &mut self,
        transport: &mut TransportCore,
        buffer: &mut [u8],
    ) -> Result<(usize, Endpoint), TransportError> {
        read_stream(transport, buffer)
    }
}
