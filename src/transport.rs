//! The [`Transport`] endpoint and the [`TransportProtocol`] seam.
//!
//! A transport owns everything its protocol variants have in common: the
//! descriptor and its status flags, the one-way binding to a local address,
//! and the byte-bounded input and output buffers. Protocol behavior lives
//! behind [`TransportProtocol`], which every variant implements and which the
//! transport forwards to. Adding a new kind of transport means writing a new
//! implementation, not touching this module.
//!
//! # Readiness
//!
//! Status flags are updated eagerly at exactly four points:
//!
//! - An input buffer going from empty to non-empty becomes
//!   [`READABLE`](Status::READABLE), and stops being readable when it empties
//!   again.
//! - An output buffer with no free space left stops being
//!   [`WRITABLE`](Status::WRITABLE), and becomes writable again as soon as a
//!   dequeue frees some.
//!
//! Nothing outside this module can change them.

use crate::{
    address::{Endpoint, Ipv4Address},
    config::TransportConfig,
    descriptor::{Descriptor, DescriptorKind, Handle, Status},
    interface::{HostContext, NetworkInterface},
    packet::Packet,
};
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;
use tokio::sync::watch;

mod buffer;
pub use buffer::{CapacityError, PacketBuffer};

mod protocol_kind;
pub use protocol_kind::{AssociationKey, ProtocolConvertError, ProtocolKind};


/// The protocol-specific half of a transport.
///
/// Every kind of transport supplies these four operations. Each receives the
/// shared [`TransportCore`] so it can use the buffers and binding, but the
/// core never calls back into protocol code on its own.
pub trait TransportProtocol: Send + fmt::Debug {
    /// Releases protocol-specific state. Called exactly once, right before
    /// the transport's own buffers are emptied and the transport is dropped.
    fn free(&mut self, transport: &mut TransportCore);

    /// Handles a packet that arrived for this transport, typically by adding
    /// it to the input buffer. Returns whether the packet was accepted.
    fn process_inbound(&mut self, transport: &mut TransportCore, packet: &Packet) -> bool;

    /// Frames application bytes into packets in the output buffer. Returns
    /// how many bytes were accepted, which may be fewer than offered.
    fn send(
        &mut self,
        transport: &mut TransportCore,
        buffer: &[u8],
        destination: Endpoint,
    ) -> Result<usize, TransportError>;

    /// Moves received bytes into `buffer`. Returns how many bytes were
    /// written and where they came from.
    fn receive(
        &mut self,
        transport: &mut TransportCore,
        buffer: &mut [u8],
    ) -> Result<(usize, Endpoint), TransportError>;
}

/// A recoverable failure reported to the emulated application.
#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    #[error("The operation would block")]
    WouldBlock,
    #[error("The transport is not bound to a local address")]
    NotBound,
    #[error("The transport has no peer to exchange data with")]
    NotConnected,
    #[error("No destination was given")]
    NoDestination,
    #[error("A {len} byte message exceeds the {max} byte limit")]
    MessageTooLarge { len: usize, max: usize },
}

struct Binding {
    endpoint: Endpoint,
    key: AssociationKey,
    interface: Option<Arc<dyn NetworkInterface>>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("endpoint", &self.endpoint)
            .field("key", &self.key)
            .field("has_interface", &self.interface.is_some())
            .finish()
    }
}

/// The state shared by every kind of transport: descriptor, binding, and
/// buffers.
#[derive(Debug)]
pub struct TransportCore {
    descriptor: Descriptor,
    protocol: ProtocolKind,
    binding: Option<Binding>,
    input: PacketBuffer,
    output: PacketBuffer,
    host: HostContext,
}

impl TransportCore {
    fn new(kind: DescriptorKind, handle: Handle, host: HostContext, config: TransportConfig) -> Self {
        let mut status = Status::ACTIVE;
        if config.send_buffer_size > 0 {
            status |= Status::WRITABLE;
        }
        Self {
            descriptor: Descriptor::new(kind, handle, status),
            protocol: kind.into(),
            binding: None,
            input: PacketBuffer::new(config.recv_buffer_size),
            output: PacketBuffer::new(config.send_buffer_size),
            host,
        }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn handle(&self) -> Handle {
        self.descriptor.handle()
    }

    pub fn protocol(&self) -> ProtocolKind {
        self.protocol
    }

    /// Binds the transport to a local address and port.
    ///
    /// # Panics
    ///
    /// Binding is one-way. Panics if the transport is already bound.
    pub fn bind(&mut self, address: Ipv4Address, port: u16) {
        assert!(
            !self.is_bound(),
            "descriptor {} is already bound to {:?}",
            self.handle(),
            self.bound_endpoint()
        );
        let endpoint = Endpoint::new(address, port);
        let key = AssociationKey::new(self.protocol, port);
        let interface = self.host.lookup(address);
        if interface.is_none() {
            tracing::warn!(
                descriptor = %self.handle(),
                %endpoint,
                "bound to an address with no interface"
            );
        }
        tracing::info!(descriptor = %self.handle(), %endpoint, %key, "transport bound");
        self.binding = Some(Binding {
            endpoint,
            key,
            interface,
        });
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn bound_endpoint(&self) -> Option<Endpoint> {
        self.binding.as_ref().map(|binding| binding.endpoint)
    }

    /// The key the network stack uses to route arriving packets here.
    ///
    /// # Panics
    ///
    /// Panics if the transport has not been bound.
    pub fn association_key(&self) -> AssociationKey {
        match &self.binding {
            Some(binding) => binding.key,
            None => panic!(
                "descriptor {} has no association key before it is bound",
                self.handle()
            ),
        }
    }

    pub fn input(&self) -> &PacketBuffer {
        &self.input
    }

    pub fn output(&self) -> &PacketBuffer {
        &self.output
    }

    /// Queues an arrived packet for the application.
    pub fn add_to_input_buffer(&mut self, packet: &Packet) -> Result<(), CapacityError> {
        if let Err(e) = self.input.try_push(packet) {
            tracing::debug!(descriptor = %self.handle(), "input refused: {}", e);
            return Err(e);
        }
        self.update_readable();
        Ok(())
    }

    /// Puts the unread tail of a packet back at the head of the input buffer.
    pub fn unread_input(&mut self, packet: Packet) -> Result<(), CapacityError> {
        self.input.push_front(packet)?;
        self.update_readable();
        Ok(())
    }

    pub fn remove_from_input_buffer(&mut self) -> Option<Packet> {
        let packet = self.input.pop()?;
        self.update_readable();
        Some(packet)
    }

    /// Queues a packet for sending and tells the bound interface that this
    /// transport has output waiting.
    pub fn add_to_output_buffer(&mut self, packet: &Packet) -> Result<(), CapacityError> {
        if let Err(e) = self.output.try_push(packet) {
            tracing::debug!(descriptor = %self.handle(), "output refused: {}", e);
            return Err(e);
        }
        self.update_writable();
        match self.binding.as_ref().and_then(|binding| binding.interface.as_ref()) {
            Some(interface) => interface.wants_send(self.descriptor.handle()),
            None => tracing::warn!(
                descriptor = %self.handle(),
                "no interface to notify about queued output"
            ),
        }
        Ok(())
    }

    pub fn remove_from_output_buffer(&mut self) -> Option<Packet> {
        let packet = self.output.pop()?;
        self.update_writable();
        Some(packet)
    }

    /// Takes the next packet waiting to be sent.
    pub fn pull_outbound(&mut self) -> Option<Packet> {
        self.remove_from_output_buffer()
    }

    fn update_readable(&mut self) {
        let readable = !self.input.is_empty();
        self.descriptor.adjust_status(Status::READABLE, readable);
    }

    fn update_writable(&mut self) {
        let writable = !self.output.is_full();
        self.descriptor.adjust_status(Status::WRITABLE, writable);
    }

    fn release(&mut self) {
        tracing::debug!(
            descriptor = %self.handle(),
            input_packets = self.input.packet_count(),
            output_packets = self.output.packet_count(),
            "releasing transport"
        );
        self.input.clear();
        self.output.clear();
        self.descriptor
            .adjust_status(Status::ACTIVE | Status::READABLE | Status::WRITABLE, false);
        self.descriptor.adjust_status(Status::CLOSED, true);
    }
}

/// A simulated socket-like endpoint.
///
/// Dropping a transport frees it: the protocol's
/// [`free`](TransportProtocol::free) runs once, every queued packet is
/// released, and observers see the status change to
/// [`CLOSED`](Status::CLOSED).
#[derive(Debug)]
pub struct Transport {
    core: TransportCore,
    functions: Box<dyn TransportProtocol>,
}

impl Transport {
    /// Creates a transport with the default buffer sizes.
    pub fn new(
        functions: Box<dyn TransportProtocol>,
        kind: DescriptorKind,
        handle: Handle,
        host: HostContext,
    ) -> Self {
        Self::with_config(functions, kind, handle, host, TransportConfig::default())
    }

    /// Creates a transport with the given buffer sizes.
    pub fn with_config(
        functions: Box<dyn TransportProtocol>,
        kind: DescriptorKind,
        handle: Handle,
        host: HostContext,
        config: TransportConfig,
    ) -> Self {
        let core = TransportCore::new(kind, handle, host, config);
        tracing::debug!(
            descriptor = %handle,
            protocol = ?core.protocol,
            recv_buffer_size = config.recv_buffer_size,
            send_buffer_size = config.send_buffer_size,
            "transport created"
        );
        Self { core, functions }
    }

    pub fn core(&self) -> &TransportCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut TransportCore {
        &mut self.core
    }

    pub fn handle(&self) -> Handle {
        self.core.handle()
    }

    pub fn kind(&self) -> DescriptorKind {
        self.core.descriptor.kind()
    }

    pub fn protocol(&self) -> ProtocolKind {
        self.core.protocol
    }

    pub fn status(&self) -> Status {
        self.core.descriptor.status()
    }

    /// See [`Descriptor::subscribe`].
    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.core.descriptor.subscribe()
    }

    /// See [`TransportCore::bind`].
    pub fn bind(&mut self, address: Ipv4Address, port: u16) {
        self.core.bind(address, port)
    }

    pub fn is_bound(&self) -> bool {
        self.core.is_bound()
    }

    pub fn bound_endpoint(&self) -> Option<Endpoint> {
        self.core.bound_endpoint()
    }

    /// See [`TransportCore::association_key`].
    pub fn association_key(&self) -> AssociationKey {
        self.core.association_key()
    }

    /// Hands an arrived packet to the protocol. Returns whether it was
    /// accepted.
    pub fn push_in_packet(&mut self, packet: &Packet) -> bool {
        self.functions.process_inbound(&mut self.core, packet)
    }

    /// Takes the next packet waiting to be sent. Only the network interface
    /// should call this.
    pub fn pull_outbound(&mut self) -> Option<Packet> {
        self.core.pull_outbound()
    }

    /// Sends application bytes to `destination`. Pass
    /// [`Endpoint::UNSPECIFIED`] to use the transport's peer.
    pub fn send_user_data(
        &mut self,
        buffer: &[u8],
        destination: Endpoint,
    ) -> Result<usize, TransportError> {
        self.functions.send(&mut self.core, buffer, destination)
    }

    /// Reads received bytes into `buffer`.
    pub fn receive_user_data(
        &mut self,
        buffer: &mut [u8],
    ) -> Result<(usize, Endpoint), TransportError> {
        self.functions.receive(&mut self.core, buffer)
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.functions.free(&mut self.core);
        self.core.release();
    }
}
