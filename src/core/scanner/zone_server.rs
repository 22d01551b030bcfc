// src/core/scanner/zone_server.rs

// A tiny authoritative DNS server for tests. It serves a single zone whose only
// data is one nameserver (`ns1.<zone>`, at 127.0.0.1). Other names inside the
// zone are NXDOMAIN, other types at existing names are NODATA, and queries for
// names outside the zone are REFUSED unless the server was started recursive.

use std::net::{Ipv4Addr, SocketAddr};

use hickory_resolver::proto::op::{Message, MessageType, ResponseCode};
use hickory_resolver::proto::rr::rdata::{A, NS};
use hickory_resolver::proto::rr::{Name, RData, Record, RecordType};
use tokio::net::UdpSocket;

/// Address handed out for any out-of-zone name by a recursive server.
const RECURSED_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 10);

pub(crate) struct ZoneServer {
    pub addr: SocketAddr,
}

impl ZoneServer {
    /// Binds to an ephemeral loopback port and serves until the runtime shuts down.
    pub(crate) async fn start(zone: &str, recursive: bool) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let origin = Name::from_ascii(zone).unwrap();
        let nameserver = Name::from_ascii(format!("ns1.{origin}")).unwrap();

        tokio::spawn(async move {
            let mut buffer = vec![0u8; 4096];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buffer).await else {
                    break;
                };
                let Ok(request) = Message::from_vec(&buffer[..len]) else {
                    continue;
                };
                let response = answer(&origin, &nameserver, recursive, &request);
                if let Ok(bytes) = response.to_vec() {
                    let _ = socket.send_to(&bytes, peer).await;
                }
            }
        });

        Self { addr }
    }
}

fn answer(origin: &Name, nameserver: &Name, recursive: bool, request: &Message) -> Message {
    let mut response = Message::new();
    response
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(request.op_code())
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(recursive);

    let Some(query) = request.queries().first() else {
        response.set_response_code(ResponseCode::FormErr);
        return response;
    };
    response.add_query(query.clone());
    let name = query.name();

    if !origin.zone_of(name) {
        if recursive && query.query_type() == RecordType::A {
            response.add_answer(Record::from_rdata(name.clone(), 60, RData::A(A(RECURSED_ADDRESS))));
        } else {
            response.set_response_code(ResponseCode::Refused);
        }
        return response;
    }

    response.set_authoritative(true);
    match query.query_type() {
        RecordType::NS if name == origin => {
            response.add_answer(Record::from_rdata(origin.clone(), 300, RData::NS(NS(nameserver.clone()))));
        }
        RecordType::A if name == nameserver => {
            response.add_answer(Record::from_rdata(nameserver.clone(), 300, RData::A(A(Ipv4Addr::LOCALHOST))));
        }
        // NODATA: the name exists, the type does not.
        _ if name == origin || name == nameserver => {}
        _ => {
            response.set_response_code(ResponseCode::NXDomain);
        }
    }
    response
}
