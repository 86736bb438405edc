//! One-shot SNTP query over an embassy-net UDP socket

use agile_core::ntp::{NTP_PACKET_LEN, NTP_PORT, NtpError, parse_response, request_packet};
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpEndpoint, Stack};
use embassy_time::{Duration, with_timeout};
use log::{debug, info, warn};

/// Local port for the query
const LOCAL_PORT: u16 = 50123;

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Ask `server` for the time, returning Unix seconds.
pub async fn query(stack: Stack<'_>, server: &str) -> Result<u64, NtpError> {
    let addresses = stack
        .dns_query(server, DnsQueryType::A)
        .await
        .map_err(|e| {
            warn!("DNS lookup for {} failed: {:?}", server, e);
            NtpError::Network
        })?;
    let address = addresses.first().copied().ok_or(NtpError::Network)?;
    debug!("NTP server {} is {}", server, address);

    let mut rx_meta = [PacketMetadata::EMPTY; 2];
    let mut tx_meta = [PacketMetadata::EMPTY; 2];
    let mut rx_buffer = [0u8; 128];
    let mut tx_buffer = [0u8; 128];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(LOCAL_PORT).map_err(|_| NtpError::Network)?;

    let server_endpoint = IpEndpoint::new(address, NTP_PORT);
    socket
        .send_to(&request_packet(), server_endpoint)
        .await
        .map_err(|_| NtpError::Network)?;

    let mut response = [0u8; NTP_PACKET_LEN];
    let (len, from) = with_timeout(RESPONSE_TIMEOUT, socket.recv_from(&mut response))
        .await
        .map_err(|_| NtpError::Timeout)?
        .map_err(|_| NtpError::Network)?;
    debug!("{} byte NTP reply from {}", len, from.endpoint);

    let unix_secs = parse_response(&response[..len])?;
    info!("NTP time: {} s since epoch", unix_secs);
    Ok(unix_secs)
}
