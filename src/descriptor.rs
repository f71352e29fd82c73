//! The generic simulated I/O handle that transports specialize.
//!
//! A [`Descriptor`] carries the state every simulated file descriptor shares:
//! its handle number, its kind, and the [`Status`] flags an event
//! notification layer can wait on. Status can only be changed from inside
//! this crate, at the transition points defined by
//! [`Transport`](crate::Transport). Everything else gets a read-only view
//! through [`Descriptor::status`] or a change feed through
//! [`Descriptor::subscribe`].

use bitflags::bitflags;
use std::fmt::{self, Display};
use tokio::sync::watch;

/// The number an emulated application uses to refer to a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(i32);

impl Handle {
    pub const fn new(handle: i32) -> Self {
        Self(handle)
    }

    pub fn into_inner(self) -> i32 {
        self.0
    }
}

impl From<i32> for Handle {
    fn from(n: i32) -> Self {
        Self(n)
    }
}

impl Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What sort of object a descriptor refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    TcpSocket,
    UdpSocket,
    SocketPair,
    Pipe,
}

bitflags! {
    /// Observable I/O readiness of a descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// The descriptor is open and usable.
        const ACTIVE = 1 << 0;
        /// Data can be read without blocking.
        const READABLE = 1 << 1;
        /// Data can be written without blocking.
        const WRITABLE = 1 << 2;
        /// The descriptor has been freed.
        const CLOSED = 1 << 3;
    }
}

/// State shared by every kind of simulated descriptor.
#[derive(Debug)]
pub struct Descriptor {
    handle: Handle,
    kind: DescriptorKind,
    status: watch::Sender<Status>,
}

impl Descriptor {
    pub(crate) fn new(kind: DescriptorKind, handle: Handle, status: Status) -> Self {
        let (status, _) = watch::channel(status);
        Self {
            handle,
            kind,
            status,
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn kind(&self) -> DescriptorKind {
        self.kind
    }

    /// The current status flags.
    pub fn status(&self) -> Status {
        *self.status.borrow()
    }

    /// Returns a receiver that is notified every time the status flags
    /// actually change. Setting a flag that is already set does not wake
    /// observers.
    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }

    /// Turns `flags` on or off. Returns whether the status changed.
    pub(crate) fn adjust_status(&mut self, flags: Status, on: bool) -> bool {
        let handle = self.handle;
        self.status.send_if_modified(|status| {
            let old = *status;
            status.set(flags, on);
            if *status == old {
                return false;
            }
            tracing::trace!(
                descriptor = %handle,
                from = ?old,
                to = ?*status,
                "descriptor status changed"
            );
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> Descriptor {
        Descriptor::new(DescriptorKind::UdpSocket, Handle::new(3), Status::ACTIVE)
    }

    #[test]
    fn adjust_reports_changes_only() {
        let mut descriptor = descriptor();
        assert!(descriptor.adjust_status(Status::READABLE, true));
        assert!(!descriptor.adjust_status(Status::READABLE, true));
        assert_eq!(descriptor.status(), Status::ACTIVE | Status::READABLE);
        assert!(descriptor.adjust_status(Status::READABLE, false));
        assert_eq!(descriptor.status(), Status::ACTIVE);
    }

    #[test]
    fn subscribers_see_transitions() {
        let mut descriptor = descriptor();
        let mut receiver = descriptor.subscribe();
        assert!(!receiver.has_changed().unwrap());

        descriptor.adjust_status(Status::WRITABLE, false);
        assert!(!receiver.has_changed().unwrap());

        descriptor.adjust_status(Status::WRITABLE, true);
        assert!(receiver.has_changed().unwrap());
        assert!(receiver.borrow_and_update().contains(Status::WRITABLE));
    }

    #[tokio::test]
    async fn subscribers_are_woken() {
        let mut descriptor = descriptor();
        let mut receiver = descriptor.subscribe();
        let waiter = tokio::spawn(async move {
            receiver.changed().await.unwrap();
            *receiver.borrow()
        });
        descriptor.adjust_status(Status::READABLE, true);
        let seen = waiter.await.unwrap();
        assert!(seen.contains(Status::READABLE));
    }
}
