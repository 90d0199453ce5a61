use rand::Rng;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use crate::dns::{
    error::DnsError,
    protocol::{DnsPacket, DnsQuestion, QueryType},
};
use crate::io::packet_buffer::{MAX_PACKET_SIZE, PacketBuffer};

pub const DNS_PORT: u16 = 53;
pub const DEFAULT_RESOLVER: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::new(1, 1, 1, 1)), DNS_PORT);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

fn initialize_udp_socket(dns_resolver: SocketAddr, timeout: Duration) -> Result<UdpSocket, DnsError> {
    let bind_addr = if dns_resolver.is_ipv4() {
        "0.0.0.0:0"
    } else {
        "[::]:0"
    };
    let socket = UdpSocket::bind(bind_addr)
        .map_err(|e| DnsError::Network(format!("Failed to create socket: {e}")))?;

    socket
        .set_read_timeout(Some(timeout))
        .map_err(|e| DnsError::Network(format!("Failed to set read timeout: {e}")))?;
    socket
        .set_write_timeout(Some(timeout))
        .map_err(|e| DnsError::Network(format!("Failed to set write timeout: {e}")))?;

    Ok(socket)
}

/// Sends a single recursive query over UDP and returns the decoded reply.
///
/// The reply is returned whatever its response code; interpreting it is up
/// to the caller. There is exactly one attempt: datagrams from other senders
/// or carrying another id are dropped while waiting, and only the timeout
/// ends the wait.
pub fn query(
    dns_resolver: SocketAddr,
    name: &str,
    query_type: QueryType,
    timeout: Duration,
) -> Result<DnsPacket, DnsError> {
    let socket = initialize_udp_socket(dns_resolver, timeout)?;

    let mut query = build_dns_query(name, query_type)?;
    let query_id = query.header.id;

    let mut req_buffer = PacketBuffer::new();
    query.write(&mut req_buffer)?;

    send_query_udp(&socket, req_buffer.written(), dns_resolver)?;
    await_response(&socket, dns_resolver, query_id, Instant::now() + timeout)
}

fn send_query_udp(socket: &UdpSocket, query: &[u8], dns_server: SocketAddr) -> Result<(), DnsError> {
    socket
        .send_to(query, dns_server)
        .map_err(|error| match error.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => DnsError::Timeout(dns_server.to_string()),
            ErrorKind::ConnectionRefused => {
                DnsError::Network(format!("Connection refused by {dns_server} (UDP)"))
            }
            _ => DnsError::Network(format!("Failed to send query to {dns_server} (UDP): {error}")),
        })?;
    Ok(())
}

fn await_response(
    socket: &UdpSocket,
    dns_server: SocketAddr,
    query_id: u16,
    deadline: Instant,
) -> Result<DnsPacket, DnsError> {
    let mut response_buffer = [0u8; MAX_PACKET_SIZE];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(DnsError::Timeout(dns_server.to_string()));
        }
        socket
            .set_read_timeout(Some(remaining))
            .map_err(|e| DnsError::Network(format!("Failed to set read timeout: {e}")))?;

        let (bytes_received, remote_addr) =
            socket
                .recv_from(&mut response_buffer)
                .map_err(|error| match error.kind() {
                    // Unix reports an expired read timeout as WouldBlock
                    ErrorKind::TimedOut | ErrorKind::WouldBlock => {
                        DnsError::Timeout(dns_server.to_string())
                    }
                    _ => DnsError::Network(format!("Error receiving DNS response: {error}")),
                })?;

        // Stray datagram, keep waiting
        if remote_addr != dns_server || bytes_received == 0 {
            continue;
        }

        let response = parse_dns_response(&response_buffer[..bytes_received])?;
        if response.header.id == query_id {
            return Ok(response);
        }
    }
}

fn build_dns_query(name: &str, query_type: QueryType) -> Result<DnsPacket, DnsError> {
    if name.is_empty() {
        return Err(DnsError::InvalidData("Query name cannot be empty".to_owned()));
    }

    if name.len() > 253 {
        return Err(DnsError::InvalidData(format!(
            "Query name exceeds maximum length of 253 characters: {name}"
        )));
    }

    let mut packet = DnsPacket::new();
    packet.header.id = rand::rng().random();
    packet.header.recursion_desired = true;
    packet.questions.push(DnsQuestion::new(name, query_type));

    Ok(packet)
}

fn parse_dns_response(response: &[u8]) -> Result<DnsPacket, DnsError> {
    let mut packet_buffer = PacketBuffer::from_slice(response)
        .map_err(|e| DnsError::InvalidData(format!("Invalid response: {e}")))?;

    DnsPacket::from_buffer(&mut packet_buffer)
}
