//! Byte-bounded packet queues.
//!
//! Capacity is counted in payload bytes rather than packets so that a full
//! buffer reflects the amount of simulated data waiting, not how it happened
//! to be split up.

use crate::packet::Packet;
use std::collections::VecDeque;
use thiserror::Error as ThisError;

/// Why a packet was not admitted to a [`PacketBuffer`]. Refusal is
/// backpressure, not a failure of the simulation.
#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
pub enum CapacityError {
    #[error("A {len} byte packet does not fit in the {space} bytes of free space")]
    Full { len: usize, space: usize },
    /// Zero-length packets are always refused, even when the buffer has
    /// room, so that an empty buffer and a zero byte count mean the same
    /// thing and readiness follows occupancy exactly.
    #[error("Packets without payload cannot be buffered")]
    EmptyPacket,
}

/// A FIFO of packets whose combined payload never exceeds a fixed number of
/// bytes.
///
/// The buffer co-owns every packet it holds: admission clones the caller's
/// handle and removal hands the buffer's handle back to the caller.
#[derive(Debug)]
pub struct PacketBuffer {
    queue: VecDeque<Packet>,
    capacity: usize,
    total: usize,
}

impl PacketBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            capacity,
            total: 0,
        }
    }

    fn admit(&self, packet: &Packet) -> Result<usize, CapacityError> {
        let len = packet.payload_len();
        if len == 0 {
            Err(CapacityError::EmptyPacket)
        } else if self.total + len > self.capacity {
            Err(CapacityError::Full {
                len,
                space: self.space(),
            })
        } else {
            Ok(len)
        }
    }

    /// Appends a reference to `packet` if its payload fits in the remaining
    /// space. A refused packet leaves the buffer untouched.
    pub fn try_push(&mut self, packet: &Packet) -> Result<(), CapacityError> {
        let len = self.admit(packet)?;
        self.queue.push_back(packet.clone());
        self.total += len;
        Ok(())
    }

    /// Puts a packet back at the head of the queue, subject to the same
    /// admission test as [`PacketBuffer::try_push`].
    pub(crate) fn push_front(&mut self, packet: Packet) -> Result<(), CapacityError> {
        let len = self.admit(&packet)?;
        self.queue.push_front(packet);
        self.total += len;
        Ok(())
    }

    /// Removes the oldest packet.
    pub fn pop(&mut self) -> Option<Packet> {
        let packet = self.queue.pop_front()?;
        self.total -= packet.payload_len();
        Some(packet)
    }

    /// Drops every queued packet, releasing the buffer's references.
    pub(crate) fn clear(&mut self) {
        self.queue.clear();
        self.total = 0;
    }

    /// Payload bytes currently queued.
    pub fn len_bytes(&self) -> usize {
        self.total
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes that can still be admitted.
    pub fn space(&self) -> usize {
        self.capacity - self.total
    }

    pub fn packet_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.space() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{address::Endpoint, transport::ProtocolKind};

    fn packet(len: usize) -> Packet {
        Packet::new(
            ProtocolKind::Udp,
            Endpoint::UNSPECIFIED,
            Endpoint::UNSPECIFIED,
            vec![0u8; len],
        )
    }

    #[test]
    fn admission_respects_capacity() {
        let mut buffer = PacketBuffer::new(100);
        let first = packet(60);
        buffer.try_push(&first).unwrap();
        assert_eq!(buffer.len_bytes(), 60);
        assert_eq!(first.reference_count(), 2);

        let second = packet(60);
        assert_eq!(
            buffer.try_push(&second),
            Err(CapacityError::Full { len: 60, space: 40 })
        );
        assert_eq!(buffer.len_bytes(), 60);
        assert_eq!(buffer.packet_count(), 1);
        assert_eq!(second.reference_count(), 1);

        buffer.try_push(&packet(40)).unwrap();
        assert!(buffer.is_full());
    }

    #[test]
    fn pop_transfers_reference() {
        let mut buffer = PacketBuffer::new(10);
        let original = packet(4);
        buffer.try_push(&original).unwrap();
        let popped = buffer.pop().unwrap();
        assert!(popped.ptr_eq(&original));
        assert_eq!(original.reference_count(), 2);
        assert_eq!(buffer.len_bytes(), 0);
        assert!(buffer.pop().is_none());
    }

    #[test]
    fn fifo_order() {
        let mut buffer = PacketBuffer::new(1000);
        let packets: Vec<_> = (1..=5).map(packet).collect();
        for packet in &packets {
            buffer.try_push(packet).unwrap();
        }
        for expected in &packets {
            assert!(buffer.pop().unwrap().ptr_eq(expected));
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn empty_packets_refused() {
        let mut buffer = PacketBuffer::new(10);
        assert_eq!(buffer.try_push(&packet(0)), Err(CapacityError::EmptyPacket));
        assert!(buffer.is_empty());
    }

    #[test]
    fn push_front_goes_to_head() {
        let mut buffer = PacketBuffer::new(10);
        let tail = packet(3);
        let head = packet(2);
        buffer.try_push(&tail).unwrap();
        buffer.push_front(head.clone()).unwrap();
        assert_eq!(buffer.len_bytes(), 5);
        assert!(buffer.pop().unwrap().ptr_eq(&head));
        assert!(buffer.pop().unwrap().ptr_eq(&tail));
    }

    #[test]
    fn clear_releases_packets() {
        let mut buffer = PacketBuffer::new(10);
        let held = packet(5);
        buffer.try_push(&held).unwrap();
        buffer.clear();
        assert_eq!(held.reference_count(), 1);
        assert_eq!(buffer.space(), 10);
    }
}
