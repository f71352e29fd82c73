//! Ordered byte streams between hosts.
//!
//! Outgoing bytes are cut into segments of at most [`MSS`] bytes, each
//! labelled with the sequence number of its first byte. Arriving segments
//! reach the input buffer strictly in sequence order; segments from the
//! future wait in a reorder queue until the gap before them is filled.
//! Connection setup and retransmission belong to the layer above.

use super::{queue_segments, read_stream};
use crate::{
    address::Endpoint,
    config::MSS,
    packet::Packet,
    transport::{ProtocolKind, TransportCore, TransportError, TransportProtocol},
};
use std::collections::BTreeMap;

/// Whether sequence number `a` comes before `b`, allowing for wraparound.
fn seq_before(a: u32, b: u32) -> bool {
    (b.wrapping_sub(a) as i32) > 0
}

/// Stream behavior for TCP sockets.
#[derive(Debug)]
pub struct Tcp {
    peer: Option<Endpoint>,
    /// Sequence number of the next byte to send.
    snd_nxt: u32,
    /// Sequence number of the next byte expected. Unknown until the first
    /// segment arrives unless the transport was created connected.
    rcv_nxt: Option<u32>,
    reorder: BTreeMap<u32, Packet>,
    reorder_bytes: usize,
}

impl Tcp {
    /// Creates a stream whose first sent byte has sequence number `iss`. The
    /// peer and the receive sequence are learned from the first segment that
    /// arrives, or from the first send with a destination.
    pub fn new(iss: u32) -> Self {
        Self {
            peer: None,
            snd_nxt: iss,
            rcv_nxt: None,
            reorder: BTreeMap::new(),
            reorder_bytes: 0,
        }
    }

    /// Creates a stream already associated with `peer`, expecting the peer's
    /// first byte to have sequence number `irs`.
    pub fn connected(peer: Endpoint, iss: u32, irs: u32) -> Self {
        Self {
            peer: Some(peer),
            rcv_nxt: Some(irs),
            ..Self::new(iss)
        }
    }

    pub fn peer(&self) -> Option<Endpoint> {
        self.peer
    }

    /// Moves waiting segments into the input buffer for as long as they
    /// continue the stream, and records where the stream now stands.
    fn flush_reordered(&mut self, transport: &mut TransportCore, mut next: u32) {
        loop {
            self.discard_delivered(next);
            let Some(segment) = self.reorder.remove(&next) else {
                break;
            };
            if transport.add_to_input_buffer(&segment).is_err() {
                self.reorder.insert(next, segment);
                break;
            }
            self.reorder_bytes -= segment.payload_len();
            next = next.wrapping_add(segment.payload_len() as u32);
        }
        self.rcv_nxt = Some(next);
    }

    /// Drops held segments that start before `next`. A segment reaching past
    /// `next` keeps its undelivered tail.
    fn discard_delivered(&mut self, next: u32) {
        let stale: Vec<u32> = self
            .reorder
            .keys()
            .copied()
            .filter(|&seq| seq_before(seq, next))
            .collect();
        for seq in stale {
            let Some(segment) = self.reorder.remove(&seq) else {
                continue;
            };
            self.reorder_bytes -= segment.payload_len();
            let end = seq.wrapping_add(segment.payload_len() as u32);
            if seq_before(next, end) && !self.reorder.contains_key(&next) {
                let tail = segment.remainder(next.wrapping_sub(seq) as usize);
                self.reorder_bytes += tail.payload_len();
                self.reorder.insert(next, tail);
            }
        }
    }

    /// Retries held segments that became contiguous while the input buffer
    /// had no room for them.
    fn catch_up(&mut self, transport: &mut TransportCore) {
        if let Some(next) = self.rcv_nxt {
            if !self.reorder.is_empty() {
                self.flush_reordered(transport, next);
            }
        }
    }

    /// Delivers a segment starting exactly at `expected`.
    fn deliver(&mut self, transport: &mut TransportCore, segment: &Packet, expected: u32) -> bool {
        if transport.add_to_input_buffer(segment).is_err() {
            return false;
        }
        self.peer.get_or_insert(segment.source());
        self.flush_reordered(transport, expected.wrapping_add(segment.payload_len() as u32));
        true
    }
}

impl TransportProtocol for Tcp {
    fn free(&mut self, transport: &mut TransportCore) {
        tracing::debug!(
            descriptor = %transport.handle(),
            reordered = self.reorder.len(),
            "freeing stream transport"
        );
        self.reorder.clear();
        self.reorder_bytes = 0;
    }

    fn process_inbound(&mut self, transport: &mut TransportCore, packet: &Packet) -> bool {
        if packet.protocol() != ProtocolKind::Tcp {
            tracing::debug!(
                descriptor = %transport.handle(),
                protocol = ?packet.protocol(),
                "dropping a non-stream packet"
            );
            return false;
        }
        let len = packet.payload_len();
        let seq = packet.sequence();
        let expected = self.rcv_nxt.unwrap_or(seq);
        let end = seq.wrapping_add(len as u32);

        if seq == expected {
            self.deliver(transport, packet, expected)
        } else if seq_before(expected, seq) {
            let space = transport.input().capacity();
            if len == 0 || self.reorder.contains_key(&seq) || self.reorder_bytes + len > space {
                return false;
            }
            tracing::trace!(descriptor = %transport.handle(), seq, expected, "segment held for reordering");
            self.peer.get_or_insert(packet.source());
            self.reorder_bytes += len;
            self.reorder.insert(seq, packet.clone());
            true
        } else if seq_before(expected, end) {
            let tail = packet.remainder(expected.wrapping_sub(seq) as usize);
            tracing::trace!(descriptor = %transport.handle(), seq, expected, "segment trimmed to its new bytes");
            self.deliver(transport, &tail, expected)
        } else {
            tracing::trace!(descriptor = %transport.handle(), seq, expected, "old segment ignored");
            false
        }
    }

    /// Queues as many segments of `buffer` as fit. The first specified
    /// destination becomes the peer; later destinations are ignored.
    fn send(
        &mut self,
        transport: &mut TransportCore,
        buffer: &[u8],
        destination: Endpoint,
    ) -> Result<usize, TransportError> {
        let source = transport.bound_endpoint().ok_or(TransportError::NotBound)?;
        if !destination.is_unspecified() {
            self.peer.get_or_insert(destination);
        }
        let peer = self.peer.ok_or(TransportError::NotConnected)?;
        let start = self.snd_nxt;
        let sent = queue_segments(transport, buffer, MSS, |offset, chunk| {
            Packet::with_sequence(
                ProtocolKind::Tcp,
                source,
                peer,
                start.wrapping_add(offset as u32),
                chunk,
            )
        })?;
        self.snd_nxt = start.wrapping_add(sent as u32);
        Ok(sent)
    }

    fn receive(
        &mut self,
        transport: &mut TransportCore,
        buffer: &mut [u8],
    ) -> Result<(usize, Endpoint), TransportError> {
        self.catch_up(transport);
        let read = read_stream(transport, buffer);
        self.catch_up(transport);
        let (len, source) = read?;
        Ok((len, self.peer.unwrap_or(source)))
    }
}
