use crate::descriptor::DescriptorKind;
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// The protocol a transport speaks, identified by its IPv4 protocol number.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtocolKind {
    /// Reliable, ordered byte streams.
    Tcp = 6,
    /// Unordered datagrams.
    Udp = 17,
    /// Byte streams between descriptors on the same host. Uses a protocol
    /// number reserved for experimentation.
    Local = 253,
}

impl From<DescriptorKind> for ProtocolKind {
    fn from(kind: DescriptorKind) -> Self {
        match kind {
            DescriptorKind::TcpSocket => Self::Tcp,
            DescriptorKind::UdpSocket => Self::Udp,
            DescriptorKind::SocketPair | DescriptorKind::Pipe => Self::Local,
        }
    }
}

impl TryFrom<u8> for ProtocolKind {
    type Error = ProtocolConvertError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            6 => Ok(Self::Tcp),
            17 => Ok(Self::Udp),
            253 => Ok(Self::Local),
            _ => Err(ProtocolConvertError(value)),
        }
    }
}

impl From<ProtocolKind> for u8 {
    fn from(value: ProtocolKind) -> Self {
        value as u8
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ProtocolConvertError(pub u8);

impl Display for ProtocolConvertError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "No transport protocol has number {}", self.0)
    }
}

impl Error for ProtocolConvertError {}

/// Routes an arriving packet to the transport bound to its protocol and
/// port.
///
/// The protocol number occupies the bits above the 16-bit port, so no two
/// distinct `(protocol, port)` pairs share a key. The local address plays no
/// part: two transports on the same port and protocol but different local
/// addresses get the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssociationKey(u32);

impl AssociationKey {
    pub const fn new(protocol: ProtocolKind, port: u16) -> Self {
        Self(((protocol as u32) << 16) | port as u32)
    }

    pub fn protocol(self) -> ProtocolKind {
        match (self.0 >> 16) as u8 {
            6 => ProtocolKind::Tcp,
            17 => ProtocolKind::Udp,
            _ => ProtocolKind::Local,
        }
    }

    pub fn port(self) -> u16 {
        self.0 as u16
    }

    pub fn into_inner(self) -> u32 {
        self.0
    }
}

impl Display for AssociationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{}", self.protocol(), self.port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_numbers() {
        assert_eq!(u8::from(ProtocolKind::Tcp), 6);
        assert_eq!(ProtocolKind::try_from(17), Ok(ProtocolKind::Udp));
        assert_eq!(ProtocolKind::try_from(1), Err(ProtocolConvertError(1)));
    }

    #[test]
    fn derived_from_descriptor_kind() {
        assert_eq!(
            ProtocolKind::from(DescriptorKind::TcpSocket),
            ProtocolKind::Tcp
        );
        assert_eq!(
            ProtocolKind::from(DescriptorKind::UdpSocket),
            ProtocolKind::Udp
        );
        assert_eq!(ProtocolKind::from(DescriptorKind::Pipe), ProtocolKind::Local);
        assert_eq!(
            ProtocolKind::from(DescriptorKind::SocketPair),
            ProtocolKind::Local
        );
    }

    #[test]
    fn key_components() {
        let key = AssociationKey::new(ProtocolKind::Udp, 9000);
        assert_eq!(key.protocol(), ProtocolKind::Udp);
        assert_eq!(key.port(), 9000);
        assert_eq!(key.to_string(), "Udp/9000");
    }

    #[test]
    fn keys_are_distinct() {
        let protocols = [ProtocolKind::Tcp, ProtocolKind::Udp, ProtocolKind::Local];
        let ports = [0u16, 1, 80, 9000, u16::MAX];
        let mut keys = std::collections::HashSet::new();
        for protocol in protocols {
            for port in ports {
                assert!(keys.insert(AssociationKey::new(protocol, port)));
            }
        }
    }
}
