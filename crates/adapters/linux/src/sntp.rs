//! Minimal SNTP v4 client (RFC 4330), one request per fetch.

use std::time::Duration;

use chrono::DateTime;
use tokio::net::UdpSocket;

use servoswitch_app::ports::TimeSource;
use servoswitch_domain::error::ServoSwitchError;
use servoswitch_domain::time::Timestamp;

use crate::config::SntpConfig;
use crate::error::LinuxAdapterError;

const PACKET_LEN: usize = 48;
/// LI = 0, VN = 4, Mode = 3 (client).
const CLIENT_HEADER: u8 = 0x23;
const MODE_SERVER: u8 = 4;
const TRANSMIT_OFFSET: usize = 40;
/// Seconds from 1900-01-01 (NTP era 0) to 1970-01-01.
const NTP_UNIX_OFFSET: i64 = 2_208_988_800;

/// Queries one SNTP server.
#[derive(Debug, Clone)]
pub struct SntpTimeSource {
    server: String,
    timeout: Duration,
}

impl SntpTimeSource {
    #[must_use]
    pub fn new(config: &SntpConfig) -> Self {
        Self {
            server: config.server.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    async fn exchange(&self) -> Result<Timestamp, LinuxAdapterError> {
        let io_error = |source| LinuxAdapterError::SntpIo {
            server: self.server.clone(),
            source,
        };

        let socket = UdpSocket::bind("0.0.0.0:0").await.map_err(io_error)?;
        socket.connect(&self.server).await.map_err(io_error)?;
        socket.send(&request_packet()).await.map_err(io_error)?;

        let mut buf = [0_u8; PACKET_LEN];
        let len = tokio::time::timeout(self.timeout, socket.recv(&mut buf))
            .await
            .map_err(|_| LinuxAdapterError::SntpTimeout(self.server.clone()))?
            .map_err(io_error)?;

        parse_transmit_timestamp(&buf[..len])
    }
}

impl TimeSource for SntpTimeSource {
    async fn fetch(&self) -> Result<Timestamp, ServoSwitchError> {
        let reading = self.exchange().await?;
        tracing::debug!(server = %self.server, %reading, "SNTP reading");
        Ok(reading)
    }
}

fn request_packet() -> [u8; PACKET_LEN] {
    let mut packet = [0_u8; PACKET_LEN];
    packet[0] = CLIENT_HEADER;
    packet
}

/// Extract the server transmit timestamp from an SNTP response.
fn parse_transmit_timestamp(packet: &[u8]) -> Result<Timestamp, LinuxAdapterError> {
    if packet.len() < PACKET_LEN {
        return Err(LinuxAdapterError::SntpResponse("packet too short"));
    }
    if packet[0] & 0x07 != MODE_SERVER {
        return Err(LinuxAdapterError::SntpResponse("not a server reply"));
    }
    if packet[1] == 0 {
        return Err(LinuxAdapterError::SntpResponse("kiss-of-death reply"));
    }

    let field = |offset: usize| {
        u32::from_be_bytes([
            packet[offset],
            packet[offset + 1],
            packet[offset + 2],
            packet[offset + 3],
        ])
    };
    let seconds = field(TRANSMIT_OFFSET);
    let fraction = field(TRANSMIT_OFFSET + 4);
    if seconds == 0 && fraction == 0 {
        return Err(LinuxAdapterError::SntpResponse("empty transmit timestamp"));
    }

    let unix_seconds = i64::from(seconds) - NTP_UNIX_OFFSET;
    let nanos = u32::try_from((u64::from(fraction) * 1_000_000_000) >> 32)
        .map_err(|_| LinuxAdapterError::SntpResponse("fraction out of range"))?;
    DateTime::from_timestamp(unix_seconds, nanos)
        .ok_or(LinuxAdapterError::SntpResponse("timestamp out of range"))
}
