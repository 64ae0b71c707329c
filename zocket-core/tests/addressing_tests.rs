//! Integration tests for endpoint addressing and role lookup

use zocket_core::prelude::*;

#[test]
fn test_qualified_endpoints_are_detected() {
    for (uri, protocol) in [
        ("inproc://workers", Protocol::Inproc),
        ("ipc:///var/run/app.sock", Protocol::Ipc),
        ("tcp://10.0.0.1:5555", Protocol::Tcp),
        ("pgm://eth0;239.192.1.1:5555", Protocol::Pgm),
        ("epgm://eth0;239.192.1.1:5555", Protocol::Epgm),
        ("Epgm://eth0;239.192.1.1:5555", Protocol::Epgm),
    ] {
        assert_eq!(Protocol::detect(uri), Some(protocol), "{uri}");
        assert!(has_protocol(uri));
    }
}

#[test]
fn test_service_names_map_to_srv_queries() {
    let name = ServiceName::parse("collector.domain.com").unwrap();
    assert_eq!(name.srv_query(), "_collector._tcp.domain.com");

    let name = ServiceName::parse("metrics.eu.example.org.").unwrap();
    assert_eq!(name.srv_query(), "_metrics._tcp.eu.example.org");
}

#[test]
fn test_preferred_record_becomes_tcp_endpoint() {
    let records = [
        ServiceRecord::new("10.0.0.5", 1000, 10, 5),
        ServiceRecord::new("10.0.0.6", 2000, 10, 20),
        ServiceRecord::new("10.0.0.7", 3000, 20, 100),
    ];
    let best = select_preferred(&records).unwrap();
    assert_eq!(tcp_endpoint(&best.target, best.port), "tcp://10.0.0.6:2000");
}

#[test]
fn test_unsupported_operation_message() {
    let err = RoleCapability::of(SocketType::Sub)
        .check(Operation::Send)
        .unwrap_err();
    assert!(err.is_unsupported());
    assert_eq!(err.to_string(), "API send not supported for SUB sockets!");
}

#[test]
fn test_transport_errors_are_not_translated_outside_req_rep() {
    for socket_type in SocketType::ALL {
        let err =
            translate_transport_error(socket_type, Operation::Recv, TransportError::InvalidState);
        assert_eq!(err.is_protocol_sequence(), socket_type.is_request_reply(), "{socket_type}");
    }
}
