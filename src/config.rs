//! Compile-time defaults for transport buffers and packet sizes.

/// Default receive buffer capacity, in payload bytes.
pub const RECV_BUFFER_SIZE: usize = 174_760;

/// Default send buffer capacity, in payload bytes.
pub const SEND_BUFFER_SIZE: usize = 131_072;

/// The largest frame a simulated link carries.
pub const MTU: usize = 1500;

/// Combined size of the TCP, IPv4 and Ethernet headers.
pub const HEADER_SIZE_TCPIPETH: usize = 54;

/// The largest payload carried by one stream segment.
pub const MSS: usize = MTU - HEADER_SIZE_TCPIPETH;

/// The largest payload carried by one datagram.
pub const DATAGRAM_MAX_SIZE: usize = 65_507;

/// Buffer capacities applied when a transport is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Capacity of the input buffer in bytes.
    pub recv_buffer_size: usize,
    /// Capacity of the output buffer in bytes.
    pub send_buffer_size: usize,
}

impl TransportConfig {
    pub const fn new(recv_buffer_size: usize, send_buffer_size: usize) -> Self {
        Self {
            recv_buffer_size,
            send_buffer_size,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new(RECV_BUFFER_SIZE, SEND_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_constants() {
        let config = TransportConfig::default();
        assert_eq!(config.recv_buffer_size, RECV_BUFFER_SIZE);
        assert_eq!(config.send_buffer_size, SEND_BUFFER_SIZE);
    }

    #[test]
    fn segment_fits_in_frame() {
        assert_eq!(MSS + HEADER_SIZE_TCPIPETH, MTU);
    }
}
