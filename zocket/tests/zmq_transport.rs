//! libzmq-backed facade tests.
//!
//! Run with `--features zmq`.

use std::time::Duration;

use zocket::prelude::*;
use zocket::zmq_transport::Context;

fn context() -> Context {
    zocket::dev_tracing::init_tracing();
    // Nothing answers on this port; lookups must fall back quickly
    let silent = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    let config = ResolverConfig::new()
        .with_nameserver(silent.local_addr().unwrap())
        .with_timeout(Duration::from_millis(50))
        .with_attempts(1);
    Context::with_resolver_config(config)
}

#[test]
fn test_publisher_bind_to_string() {
    let ctx = context();
    let port = portpicker::pick_unused_port().expect("No ports free");
    let endpoint = format!("tcp://127.0.0.1:{port}");

    let publisher = ctx.bind(SocketType::Pub, &endpoint).unwrap();
    assert_eq!(publisher.to_string(), format!("PUB socket bound to {endpoint}"));
    assert!(!publisher.poll_readable());
}

#[test]
fn test_push_pull_over_inproc() {
    let ctx = context();
    let mut pull = ctx.bind(SocketType::Pull, "inproc://jobs").unwrap();
    let mut push = ctx.connect(SocketType::Push, "inproc://jobs").unwrap();

    push.send_multipart(["job", "42"]).unwrap();
    assert_eq!(pull.recv().unwrap().as_deref(), Some(&b"job"[..]));
    assert_eq!(pull.recv().unwrap().as_deref(), Some(&b"42"[..]));
    assert!(pull.recv_nonblock().unwrap().is_none());
    assert!(push.is_writable().unwrap());
}

#[test]
fn test_req_recv_without_send_is_protocol_sequence() {
    let ctx = context();
    let _rep = ctx.bind(SocketType::Rep, "inproc://rpc").unwrap();
    let mut req = ctx.connect(SocketType::Req, "inproc://rpc").unwrap();

    let err = req.recv().unwrap_err();
    assert!(err.is_protocol_sequence(), "{err}");
}

#[test]
fn test_req_rep_round_trip_then_double_recv() {
    let ctx = context();
    let mut rep = ctx.bind(SocketType::Rep, "inproc://echo").unwrap();
    let mut req = ctx.connect(SocketType::Req, "inproc://echo").unwrap();

    req.send("ping").unwrap();
    let request = rep.recv().unwrap().unwrap();
    rep.send(request).unwrap();
    assert_eq!(req.recv().unwrap().as_deref(), Some(&b"ping"[..]));

    assert!(req.recv().unwrap_err().is_protocol_sequence());
}

#[test]
fn test_transport_errors_pass_through() {
    let ctx = context();
    let mut pair = ctx.socket(SocketType::Pair).unwrap();
    let err = pair.bind("tcp://not-an-address").unwrap_err();
    assert!(matches!(err, SocketError::Transport(TransportError::Native { .. })));
    assert_eq!(pair.state(), SocketState::Unbound);
}

#[test]
fn test_unresolvable_service_name_is_passed_literally() {
    let ctx = context();
    let mut push = ctx.socket(SocketType::Push).unwrap();
    let monitor = push.monitor();

    // libzmq rejects the literal name, proving no resolution happened
    assert!(push.connect("nosuch.invalid").is_err());
    assert!(matches!(
        monitor.try_recv(),
        Ok(SocketEvent::ResolutionFallback { .. })
    ));
}
