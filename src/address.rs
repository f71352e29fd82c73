//! Addresses used to bind transports and label packets.

use std::fmt::{self, Display};

/// An IPv4 address as seen by a simulated host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ipv4Address([u8; 4]);

impl Ipv4Address {
    /// The address `0.0.0.0`. Binding to it means "any local interface".
    pub const CURRENT_NETWORK: Self = Self([0u8, 0, 0, 0]);

    /// The address `127.0.0.1`.
    pub const LOCALHOST: Self = Self([127u8, 0, 0, 1]);

    /// Creates a new address. The number can be provided as a `[u8; 4]` or a
    /// `u32`.
    pub const fn new(address: [u8; 4]) -> Self {
        Self(address)
    }

    /// Gets the address as a `u32`.
    pub fn to_u32(self) -> u32 {
        self.into()
    }

    /// Gets the address as a `[u8; 4]`.
    pub fn to_bytes(self) -> [u8; 4] {
        self.into()
    }

    pub fn is_unspecified(self) -> bool {
        self == Self::CURRENT_NETWORK
    }

    pub fn is_loopback(self) -> bool {
        self.0[0] == 127
    }
}

impl Display for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

impl From<u32> for Ipv4Address {
    fn from(n: u32) -> Self {
        Self::from(n.to_be_bytes())
    }
}

impl From<[u8; 4]> for Ipv4Address {
    fn from(n: [u8; 4]) -> Self {
        Self(n)
    }
}

impl From<Ipv4Address> for u32 {
    fn from(address: Ipv4Address) -> Self {
        u32::from_be_bytes(address.0)
    }
}

impl From<Ipv4Address> for [u8; 4] {
    fn from(address: Ipv4Address) -> Self {
        address.0
    }
}

/// An address and port pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Endpoint {
    pub address: Ipv4Address,
    pub port: u16,
}

impl Endpoint {
    /// `0.0.0.0:0`, used where no endpoint was given.
    pub const UNSPECIFIED: Self = Self::new(Ipv4Address::CURRENT_NETWORK, 0);

    pub const fn new(address: Ipv4Address, port: u16) -> Self {
        Self { address, port }
    }

    pub fn is_unspecified(self) -> bool {
        self.address.is_unspecified() && self.port == 0
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_conversion() {
        let address = Ipv4Address::new([10, 0, 0, 1]);
        assert_eq!(address.to_u32(), 0x0a00_0001);
        assert_eq!(Ipv4Address::from(0x0a00_0001), address);
    }

    #[test]
    fn display() {
        let endpoint = Endpoint::new(Ipv4Address::new([192, 168, 1, 7]), 9000);
        assert_eq!(endpoint.to_string(), "192.168.1.7:9000");
    }

    #[test]
    fn unspecified() {
        assert!(Endpoint::UNSPECIFIED.is_unspecified());
        assert!(!Endpoint::new(Ipv4Address::LOCALHOST, 0).is_unspecified());
        assert!(Ipv4Address::LOCALHOST.is_loopback());
    }
}
