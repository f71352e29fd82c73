use std::sync::Arc;

// Payloads are a view over `Arc<Vec<u8>>` so that a packet's bytes can be
// shared between a transport's buffers and the network layer without copying.
// Slicing only moves the view bounds.

/// The application bytes carried by a [`Packet`](super::Packet).
#[derive(Debug, Clone, Default)]
pub struct Payload {
    start: usize,
    end: usize,
    bytes: Arc<Vec<u8>>,
}

impl Payload {
    /// Returns a new payload containing the given bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            start: 0,
            end: bytes.len(),
            bytes: Arc::new(bytes),
        }
    }

    /// Returns the underlying bytes as slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[self.start..self.end]
    }

    /// The number of bytes in the payload.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the payload contains no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A view of this payload without its first `offset` bytes. The bytes
    /// themselves are shared, not copied.
    pub fn skip(&self, offset: usize) -> Self {
        assert!(offset <= self.len(), "offset {offset} past end of payload");
        Self {
            start: self.start + offset,
            end: self.end,
            bytes: self.bytes.clone(),
        }
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice().eq(other.as_slice())
    }
}

impl Eq for Payload {}

impl From<Vec<u8>> for Payload {
    fn from(vector: Vec<u8>) -> Self {
        Self::new(vector)
    }
}

impl From<&[u8]> for Payload {
    fn from(slice: &[u8]) -> Self {
        slice.to_vec().into()
    }
}

impl<const N: usize> From<&[u8; N]> for Payload {
    fn from(array: &[u8; N]) -> Self {
        array.as_slice().into()
    }
}

impl From<&str> for Payload {
    fn from(string: &str) -> Self {
        string.as_bytes().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_shares_bytes() {
        let payload = Payload::from("Hello, world");
        let tail = payload.skip(7);
        assert_eq!(tail.as_slice(), b"world");
        assert_eq!(tail.len(), 5);
        assert!(Arc::ptr_eq(&payload.bytes, &tail.bytes));
    }

    #[test]
    fn skip_everything() {
        let payload = Payload::from("body");
        assert!(payload.skip(4).is_empty());
    }

    #[test]
    #[should_panic]
    fn skip_past_end() {
        Payload::from("body").skip(5);
    }
}
