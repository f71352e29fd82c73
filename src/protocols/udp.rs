//! Datagram transports.

use crate::{
    address::Endpoint,
    config::DATAGRAM_MAX_SIZE,
    packet::Packet,
    transport::{TransportCore, TransportError, TransportProtocol},
};

/// Datagram behavior: one packet per send, one packet per receive, no
/// ordering or delivery guarantees.
#[derive(Debug, Default, Clone, Copy)]
pub struct Udp;

impl Udp {
    pub fn new() -> Self {
        Self
    }
}

impl TransportProtocol for Udp {
    fn free(&mut self, transport: &mut TransportCore) {
        tracing::debug!(descriptor = %transport.handle(), "freeing datagram transport");
    }

    fn process_inbound(&mut self, transport: &mut TransportCore, packet: &Packet) -> bool {
        transport.add_to_input_buffer(packet).is_ok()
    }

    fn send(
        &mut self,
        transport: &mut TransportCore,
        buffer: &[u8],
        destination: Endpoint,
    ) -> Result<usize, TransportError> {
        let source = transport.bound_endpoint().ok_or(TransportError::NotBound)?;
        if destination.is_unspecified() {
            return Err(TransportError::NoDestination);
        }
        if buffer.len() > DATAGRAM_MAX_SIZE {
            return Err(TransportError::MessageTooLarge {
                len: buffer.len(),
                max: DATAGRAM_MAX_SIZE,
            });
        }
        if buffer.is_empty() {
            return Ok(0);
        }
        let packet = Packet::new(transport.protocol(), source, destination, buffer);
        transport
            .add_to_output_buffer(&packet)
            .map_err(|_| TransportError::WouldBlock)?;
        Ok(buffer.len())
    }

    /// Receives one datagram. Bytes that do not fit in `buffer` are
    /// discarded.
    fn receive(
        &mut self,
        transport: &mut TransportCore,
        buffer: &mut [u8],
    ) -> Result<(usize, Endpoint), TransportError> {
        let packet = transport
            .remove_from_input_buffer()
            .ok_or(TransportError::WouldBlock)?;
        let bytes = packet.payload().as_slice();
        let len = bytes.len().min(buffer.len());
        buffer[..len].copy_from_slice(&bytes[..len]);
        if len < bytes.len() {
            tracing::trace!(
                descriptor = %transport.handle(),
                truncated = bytes.len() - len,
                "datagram truncated"
            );
        }
        Ok((len, packet.source()))
    }
}
