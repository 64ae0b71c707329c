//! Recording transport shared by the facade tests.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};

use bytes::Bytes;
use zocket::{EventMask, SocketType, Transport, TransportError, TransportResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Bind(String),
    Connect(String),
    Send(Bytes, bool),
    Recv(bool),
}

/// Records every call; optionally enforces REQ/REP alternation like the engine.
#[derive(Debug, Default)]
pub struct StubTransport {
    pub calls: Vec<Call>,
    pub refuse: HashSet<String>,
    pub inbox: VecDeque<Bytes>,
    pub events: EventMask,
    // Some(true): next must be send; Some(false): next must be recv
    expect_send: Option<bool>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stub that enforces the send/recv alternation of `socket_type`.
    pub fn for_type(socket_type: SocketType) -> Self {
        Self {
            expect_send: match socket_type {
                SocketType::Req => Some(true),
                SocketType::Rep => Some(false),
                _ => None,
            },
            ..Self::default()
        }
    }

    /// Fail bind/connect to `endpoint` with ECONNREFUSED.
    pub fn refusing(mut self, endpoint: &str) -> Self {
        self.refuse.insert(endpoint.to_string());
        self
    }

    pub fn with_inbox<I: IntoIterator<Item = &'static str>>(mut self, frames: I) -> Self {
        self.inbox.extend(frames.into_iter().map(|s| Bytes::from_static(s.as_bytes())));
        self
    }

    pub fn with_events(mut self, events: EventMask) -> Self {
        self.events = events;
        self
    }

    pub fn connects(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Connect(ep) => Some(ep.as_str()),
                _ => None,
            })
            .collect()
    }

    fn check_refused(&self, endpoint: &str) -> TransportResult<()> {
        if self.refuse.contains(endpoint) {
            Err(TransportError::native(111, "Connection refused"))
        } else {
            Ok(())
        }
    }
}

impl Transport for StubTransport {
    fn bind(&mut self, endpoint: &str) -> TransportResult<()> {
        self.calls.push(Call::Bind(endpoint.to_string()));
        self.check_refused(endpoint)
    }

    fn connect(&mut self, endpoint: &str) -> TransportResult<()> {
        self.calls.push(Call::Connect(endpoint.to_string()));
        self.check_refused(endpoint)
    }

    fn send(&mut self, frame: Bytes, more: bool) -> TransportResult<()> {
        self.calls.push(Call::Send(frame, more));
        match self.expect_send {
            Some(false) => return Err(TransportError::InvalidState),
            Some(true) if !more => self.expect_send = Some(false),
            _ => {}
        }
        Ok(())
    }

    fn recv(&mut self, dontwait: bool) -> TransportResult<Option<Bytes>> {
        self.calls.push(Call::Recv(dontwait));
        if self.expect_send == Some(true) {
            return Err(TransportError::InvalidState);
        }
        let frame = self.inbox.pop_front();
        if frame.is_some() && self.expect_send.is_some() {
            self.expect_send = Some(true);
        }
        Ok(frame)
    }

    fn events(&self) -> TransportResult<EventMask> {
        Ok(self.events)
    }
}
