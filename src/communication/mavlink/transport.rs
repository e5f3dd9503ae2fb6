//! MAVLink message transports
//!
//! A transport moves whole MAVLink v2 messages. [`UdpTransport`] talks to a
//! vehicle (or a MAVLink router) over UDP; when no vehicle address is
//! configured, the sender of the first valid datagram becomes the peer.

use std::io::{self, Cursor};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use log::info;
use mavlink::common::MavMessage;
use mavlink::peek_reader::PeekReader;
use mavlink::MavHeader;
use tokio::net::UdpSocket;

use crate::error::{PlannerError, Result};

/// Largest MAVLink v2 frame.
const MAX_FRAME_LEN: usize = 280;

/// Whole-message MAVLink transport
#[async_trait]
pub trait MavTransport: Send + Sync {
    /// Send one message.
    async fn send(&self, msg: &MavMessage) -> Result<()>;

    /// Wait for the next valid message; undecodable input is skipped.
    async fn recv(&self) -> Result<(MavHeader, MavMessage)>;
}

/// MAVLink v2 over a tokio UDP socket.
pub struct UdpTransport {
    socket: UdpSocket,
    system_id: u8,
    component_id: u8,
    sequence: AtomicU8,
    peer: Mutex<Option<SocketAddr>>,
}

impl UdpTransport {
    /// Bind to `bind_addr`.
    ///
    /// # Arguments
    ///
    /// * `bind_addr` - Local address
    /// * `peer` - Vehicle address, or `None` to learn it from incoming traffic
    /// * `system_id` - Our MAVLink system ID
    /// * `component_id` - Our MAVLink component ID
    pub async fn bind(
        bind_addr: SocketAddr,
        peer: Option<SocketAddr>,
        system_id: u8,
        component_id: u8,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(bind_addr).await?;
        info!("MAVLink UDP bound to {}", socket.local_addr()?);
        Ok(Self {
            socket,
            system_id,
            component_id,
            sequence: AtomicU8::new(0),
            peer: Mutex::new(peer),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Current peer address, if known.
    pub fn peer(&self) -> Option<SocketAddr> {
        *self.peer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn learn_peer(&self, addr: SocketAddr) {
        let mut peer = self.peer.lock().unwrap_or_else(PoisonError::into_inner);
        if peer.is_none() {
            info!("Vehicle discovered at {}", addr);
            *peer = Some(addr);
        }
    }
}

/// Serialize one message as a MAVLink v2 frame.
pub fn encode_frame(header: MavHeader, msg: &MavMessage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::with_capacity(MAX_FRAME_LEN));
    mavlink::write_v2_msg(&mut buf, header, msg)
        .map_err(|e| PlannerError::Io(io::Error::other(format!("{e:?}"))))?;
    Ok(buf.into_inner())
}

/// Parse one MAVLink v2 frame.
pub fn decode_frame(data: &[u8]) -> Option<(MavHeader, MavMessage)> {
    let mut reader = PeekReader::new(Cursor::new(data));
    mavlink::read_v2_msg::<MavMessage, _>(&mut reader).ok()
}

#[async_trait]
impl MavTransport for UdpTransport {
    async fn send(&self, msg: &MavMessage) -> Result<()> {
        let Some(addr) = self.peer() else {
            return Err(PlannerError::Protocol("vehicle address unknown".to_string()));
        };

        let header = MavHeader {
            system_id: self.system_id,
            component_id: self.component_id,
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
        };
        let frame = encode_frame(header, msg)?;
        self.socket.send_to(&frame, addr).await?;
        Ok(())
    }

    async fn recv(&self) -> Result<(MavHeader, MavMessage)> {
        let mut buf = [0u8; MAX_FRAME_LEN];
        loop {
            let (len, addr) = self.socket.recv_from(&mut buf).await?;
            if let Some(msg) = decode_frame(&buf[..len]) {
                self.learn_peer(addr);
                return Ok(msg);
            }
        }
    }
}
