//! Static capability table for socket roles.
//!
//! Every [`SocketType`] maps to exactly one [`RoleCapability`]. The table is
//! consulted before any transport call: a role that cannot perform an
//! operation fails with [`SocketError::UnsupportedOperation`] and the
//! transport is never touched.
//!
//! | Role   | send | recv | bind | poll readable | poll writable |
//! |--------|------|------|------|---------------|---------------|
//! | PUB    | yes  | no   | yes  | no            | yes           |
//! | SUB    | no   | yes  | yes  | yes           | no            |
//! | PUSH   | yes  | no   | yes  | no            | yes           |
//! | PULL   | no   | yes  | yes  | yes           | no            |
//! | others | yes  | yes  | yes  | yes           | yes           |

use std::fmt;

use crate::error::SocketError;
use crate::socket_type::SocketType;

/// Operations guarded by the capability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Sending a frame or message
    Send,
    /// Receiving a frame or message
    Recv,
    /// Binding to a local endpoint
    Bind,
}

impl Operation {
    /// Name of the operation as it appears in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Recv => "recv",
            Self::Bind => "bind",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a socket role may do, and how it should be polled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleCapability {
    pub socket_type: SocketType,
    pub can_send: bool,
    pub can_recv: bool,
    pub can_bind: bool,
    pub poll_readable: bool,
    pub poll_writable: bool,
}

impl RoleCapability {
    const fn bidirectional(socket_type: SocketType) -> Self {
        Self {
            socket_type,
            can_send: true,
            can_recv: true,
            can_bind: true,
            poll_readable: true,
            poll_writable: true,
        }
    }

    // Upstream roles only write; never poll them for readability.
    const fn upstream(socket_type: SocketType) -> Self {
        Self {
            socket_type,
            can_send: true,
            can_recv: false,
            can_bind: true,
            poll_readable: false,
            poll_writable: true,
        }
    }

    // Downstream roles only read; never poll them for writability.
    const fn downstream(socket_type: SocketType) -> Self {
        Self {
            socket_type,
            can_send: false,
            can_recv: true,
            can_bind: true,
            poll_readable: true,
            poll_writable: false,
        }
    }

    /// Look up the capabilities of a socket type.
    pub fn of(socket_type: SocketType) -> &'static RoleCapability {
        match socket_type {
            SocketType::Pub => &PUB,
            SocketType::Sub => &SUB,
            SocketType::Push => &PUSH,
            SocketType::Pull => &PULL,
            SocketType::Pair => &PAIR,
            SocketType::Req => &REQ,
            SocketType::Rep => &REP,
            SocketType::Router => &ROUTER,
            SocketType::Dealer => &DEALER,
            SocketType::Stream => &STREAM,
        }
    }

    /// Label used by `type_str()` and in error messages.
    #[inline]
    pub fn type_label(&self) -> &'static str {
        self.socket_type.as_str()
    }

    /// Whether this role may perform `operation`.
    pub const fn permits(&self, operation: Operation) -> bool {
        match operation {
            Operation::Send => self.can_send,
            Operation::Recv => self.can_recv,
            Operation::Bind => self.can_bind,
        }
    }

    /// Fail with `UnsupportedOperation` if this role may not perform `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError::UnsupportedOperation`] naming the operation and
    /// the role label.
    pub fn check(&self, operation: Operation) -> Result<(), SocketError> {
        if self.permits(operation) {
            Ok(())
        } else {
            Err(SocketError::UnsupportedOperation {
                operation,
                socket_type: self.socket_type,
            })
        }
    }
}

static PUB: RoleCapability = RoleCapability::upstream(SocketType::Pub);
static SUB: RoleCapability = RoleCapability::downstream(SocketType::Sub);
static PUSH: RoleCapability = RoleCapability::upstream(SocketType::Push);
static PULL: RoleCapability = RoleCapability::downstream(SocketType::Pull);
static PAIR: RoleCapability = RoleCapability::bidirectional(SocketType::Pair);
static REQ: RoleCapability = RoleCapability::bidirectional(SocketType::Req);
static REP: RoleCapability = RoleCapability::bidirectional(SocketType::Rep);
static ROUTER: RoleCapability = RoleCapability::bidirectional(SocketType::Router);
static DEALER: RoleCapability = RoleCapability::bidirectional(SocketType::Dealer);
static STREAM: RoleCapability = RoleCapability::bidirectional(SocketType::Stream);
