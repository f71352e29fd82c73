//! The bundled [`TransportProtocol`](crate::TransportProtocol) variants.
//!
//! These cover the behavior every kind of transport needs at the buffer
//! level: framing application bytes into packets, deciding which arriving
//! packets reach the input buffer, and handing bytes back to the
//! application. They do not implement connection setup, retransmission or
//! congestion control.

use crate::{
    address::Endpoint,
    packet::Packet,
    transport::{TransportCore, TransportError},
};

pub mod udp;
pub use udp::Udp;

pub mod tcp;
pub use tcp::Tcp;

pub mod local;
pub use local::Local;

/// Splits `buffer` into packets of at most `segment_size` bytes and queues
/// them until the output buffer is full. The last packet shrinks to fit the
/// remaining space. `segment` builds the packet for the bytes starting at the
/// given offset. Returns the number of bytes queued.
pub(crate) fn queue_segments(
    transport: &mut TransportCore,
    buffer: &[u8],
    segment_size: usize,
    mut segment: impl FnMut(usize, &[u8]) -> Packet,
) -> Result<usize, TransportError> {
    let mut queued = 0;
    while queued < buffer.len() {
        let size = segment_size
            .min(buffer.len() - queued)
            .min(transport.output().space());
        if size == 0 {
            break;
        }
        let packet = segment(queued, &buffer[queued..queued + size]);
        if transport.add_to_output_buffer(&packet).is_err() {
            break;
        }
        queued += size;
    }
    if queued == 0 && !buffer.is_empty() {
        return Err(TransportError::WouldBlock);
    }
    Ok(queued)
}

/// Reads bytes from the input buffer as one continuous stream, across packet
/// boundaries. A packet that is only partly consumed has its tail returned
/// to the head of the buffer.
pub(crate) fn read_stream(
    transport: &mut TransportCore,
    buffer: &mut [u8],
) -> Result<(usize, Endpoint), TransportError> {
    let mut written = 0;
    let mut source = None;
    while written < buffer.len() {
        let Some(packet) = transport.remove_from_input_buffer() else {
            break;
        };
        let bytes = packet.payload().as_slice();
        let len = bytes.len().min(buffer.len() - written);
        buffer[written..written + len].copy_from_slice(&bytes[..len]);
        written += len;
        source.get_or_insert(packet.source());
        if len < bytes.len() {
            // The tail is smaller than the packet that just left, so it fits
            if let Err(e) = transport.unread_input(packet.remainder(len)) {
                tracing::error!(descriptor = %transport.handle(), "lost unread bytes: {}", e);
            }
            break;
        }
    }
    match source {
        Some(source) => Ok((written, source)),
        None if buffer.is_empty() => Ok((0, Endpoint::UNSPECIFIED)),
        None => Err(TransportError::WouldBlock),
    }
}
