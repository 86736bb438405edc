//! Minimal SNTPv4 client codec (RFC 4330)
//!
//! Only the unicast client exchange is supported: build a 48-byte request,
//! send it over UDP, and read the server's transmit timestamp back.

use thiserror_no_std::Error;

/// UDP port NTP servers listen on
pub const NTP_PORT: u16 = 123;

/// Size of an NTP packet without extension fields
pub const NTP_PACKET_LEN: usize = 48;

/// Seconds between 1900-01-01 (NTP era 0) and 1970-01-01
pub const NTP_UNIX_OFFSET_SECS: u64 = 2_208_988_800;

const LI_NO_WARNING: u8 = 0;
const VERSION: u8 = 4;
const MODE_CLIENT: u8 = 3;
const MODE_SERVER: u8 = 4;

/// Offset of the transmit timestamp within the packet
const TRANSMIT_TIMESTAMP_OFFSET: usize = 40;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NtpError {
    #[error("Response too short: {0} bytes")]
    ShortPacket(usize),
    #[error("Unexpected mode {0} in response")]
    UnexpectedMode(u8),
    #[error("Server is unsynchronised (kiss-o'-death or stratum 0)")]
    Unsynchronised,
    #[error("Server sent an empty transmit timestamp")]
    MissingTimestamp,
    #[error("No response from server")]
    Timeout,
    #[error("Network error")]
    Network,
}

/// Build a client request packet.
pub fn request_packet() -> [u8; NTP_PACKET_LEN] {
    let mut packet = [0u8; NTP_PACKET_LEN];
    packet[0] = (LI_NO_WARNING << 6) | (VERSION << 3) | MODE_CLIENT;
    packet
}

/// Extract Unix seconds from a server response.
pub fn parse_response(packet: &[u8]) -> Result<u64, NtpError> {
    if packet.len() < NTP_PACKET_LEN {
        return Err(NtpError::ShortPacket(packet.len()));
    }

    let mode = packet[0] & 0x07;
    if mode != MODE_SERVER {
        return Err(NtpError::UnexpectedMode(mode));
    }

    let stratum = packet[1];
    if stratum == 0 {
        return Err(NtpError::Unsynchronised);
    }

    let mut secs = [0u8; 4];
    secs.copy_from_slice(&packet[TRANSMIT_TIMESTAMP_OFFSET..TRANSMIT_TIMESTAMP_OFFSET + 4]);
    let ntp_secs = u32::from_be_bytes(secs) as u64;
    if ntp_secs == 0 {
        return Err(NtpError::MissingTimestamp);
    }

    // Era 1 starts in 2036; timestamps below the 1970 offset belong to it
    let ntp_secs = if ntp_secs < NTP_UNIX_OFFSET_SECS {
        ntp_secs + (1u64 << 32)
    } else {
        ntp_secs
    };

    Ok(ntp_secs - NTP_UNIX_OFFSET_SECS)
}
