//! Virtual transport endpoints for the Extensible, Large-scale Virtual
//! Internet Simulator.
//!
//! A [`Transport`] stands in for an operating system socket inside a
//! simulated host. Every simulated packet entering or leaving a host passes
//! through one: it holds byte-bounded input and output buffers, tracks whether
//! the endpoint is readable or writable for the emulated application, and
//! forwards everything protocol-specific to a [`TransportProtocol`]
//! implementation.
//!
//! # Organization
//! - [`Descriptor`] holds the handle, kind and observable [`Status`] of an
//!   endpoint
//! - [`Transport`] adds protocol identity, binding, and the packet buffers
//! - [`TransportProtocol`] is the seam that stream, datagram and local
//!   transports plug into; see [`protocols`] for the bundled variants
//! - [`NetworkInterface`] and [`Interfaces`] model the host's interfaces that
//!   drain output buffers
//!
//! # Data flow
//!
//! Inbound packets arrive from an interface and are handed to
//! [`Transport::push_in_packet`], which lets the protocol decide what ends up
//! in the input buffer. Application writes go through
//! [`Transport::send_user_data`]; the protocol frames them into packets in the
//! output buffer and the bound interface is told the transport wants to send.
//! The interface later drains the buffer with [`Transport::pull_outbound`].
//!
//! # Concurrency
//!
//! A host is only ever driven by one worker at a time, so transports are not
//! internally synchronized. All mutation goes through `&mut self`.

mod logging;
pub use logging::{init_events, LoggingError};

pub mod config;
pub use config::TransportConfig;

pub mod address;
pub use address::{Endpoint, Ipv4Address};

pub mod packet;
pub use packet::{Packet, Payload};

pub mod descriptor;
pub use descriptor::{Descriptor, DescriptorKind, Handle, Status};

pub mod interface;
pub use interface::{HostContext, Interfaces, NetworkInterface};

pub mod transport;
pub use transport::{
    AssociationKey, CapacityError, PacketBuffer, ProtocolKind, Transport, TransportCore,
    TransportError, TransportProtocol,
};

pub mod protocols;
