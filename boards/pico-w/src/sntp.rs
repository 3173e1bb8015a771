//! SNTP client over the wifi stack.
//!
//! One fetch is one UDP exchange: a 48-byte mode-3 request, then the
//! server's transmit timestamp out of the reply. Whole seconds only; the
//! displays have no use for sub-second precision.

#![deny(unsafe_code)]

use defmt::{info, warn, Debug2Format};
use duoclock_hal::{TimeService, TimeServiceError};
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpAddress, IpEndpoint, Stack};
use embassy_time::{with_timeout, Duration};

const NTP_PORT: u16 = 123;
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Seconds between the NTP era (1900) and the unix epoch (1970).
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

const MODE_SERVER: u8 = 4;
const MAX_STRATUM: u8 = 15;

pub struct SntpClient {
    stack: Stack<'static>,
    server: Option<&'static str>,
}

impl SntpClient {
    /// A `server` of `None` asks the DHCP gateway for time, for LANs whose
    /// router runs an NTP responder.
    pub fn new(stack: Stack<'static>, server: Option<&'static str>) -> Self {
        Self { stack, server }
    }

    async fn resolve(&self) -> Result<IpAddress, TimeServiceError> {
        match self.server {
            Some(host) => {
                let addrs = self
                    .stack
                    .dns_query(host, DnsQueryType::A)
                    .await
                    .map_err(|e| {
                        warn!("dns lookup for {} failed: {:?}", host, Debug2Format(&e));
                        TimeServiceError::Unreachable
                    })?;
                let addr = addrs
                    .first()
                    .copied()
                    .ok_or(TimeServiceError::Unreachable)?;
                info!("time server {} resolved to {}", host, addr);
                Ok(addr)
            }
            None => {
                // Resolved per attempt so a DHCP renew moves us along
                let gateway = self
                    .stack
                    .config_v4()
                    .and_then(|c| c.gateway)
                    .ok_or(TimeServiceError::Unreachable)?;
                info!(
                    "no time server configured, asking gateway {}",
                    Debug2Format(&gateway)
                );
                Ok(IpAddress::Ipv4(gateway))
            }
        }
    }
}

impl TimeService for SntpClient {
    async fn fetch_unix_time(&mut self) -> Result<u64, TimeServiceError> {
        let server = self.resolve().await?;

        let mut rx_meta = [PacketMetadata::EMPTY; 2];
        let mut rx_buffer = [0u8; 64];
        let mut tx_meta = [PacketMetadata::EMPTY; 2];
        let mut tx_buffer = [0u8; 64];
        let mut socket = UdpSocket::new(
            self.stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );
        socket.bind(0).map_err(|_| TimeServiceError::Unreachable)?;

        // LI=0, VN=3, Mode=3 (client)
        let mut packet = [0u8; 48];
        packet[0] = 0x1B;
        socket
            .send_to(&packet, IpEndpoint::new(server, NTP_PORT))
            .await
            .map_err(|_| TimeServiceError::Unreachable)?;

        let mut response = [0u8; 48];
        let (len, from) = with_timeout(RESPONSE_TIMEOUT, socket.recv_from(&mut response))
            .await
            .map_err(|_| {
                warn!("time server silent for {}s", RESPONSE_TIMEOUT.as_secs());
                TimeServiceError::Timeout
            })?
            .map_err(|_| TimeServiceError::Unreachable)?;

        if len < 48 || from.endpoint.addr != server {
            return Err(TimeServiceError::BadResponse);
        }

        let mode = response[0] & 0x07;
        let stratum = response[1];
        if mode != MODE_SERVER || stratum == 0 || stratum > MAX_STRATUM {
            warn!("rejected NTP reply: mode={} stratum={}", mode, stratum);
            return Err(TimeServiceError::BadResponse);
        }

        // Transmit timestamp seconds, bytes 40..44 big-endian
        let secs = u64::from(u32::from_be_bytes([
            response[40],
            response[41],
            response[42],
            response[43],
        ]));
        let unix = secs
            .checked_sub(NTP_UNIX_OFFSET)
            .ok_or(TimeServiceError::BadResponse)?;

        info!("time server replied: unix={} stratum={}", unix, stratum);
        Ok(unix)
    }
}
