//! UDP fan-out to the configured OSC destinations
//!
//! One socket, bound to an ephemeral port, sends every forwarded datagram
//! to each destination in configuration order. UDP send errors are not
//! fatal: a dead consumer must not stall the serial link.

use crate::error::Result;
use std::net::{SocketAddr, UdpSocket};

/// Fixed set of UDP destinations sharing one send socket
pub struct UdpFanout {
    socket: UdpSocket,
    destinations: Vec<SocketAddr>,
}

impl UdpFanout {
    /// Bind a send socket and fix the destination set for the session
    pub fn new(destinations: Vec<SocketAddr>) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;

        if destinations.is_empty() {
            log::warn!("Fanout: no destinations configured, inbound datagrams will be dropped");
        } else {
            log::info!("Fanout: forwarding to {} destination(s)", destinations.len());
        }

        Ok(UdpFanout {
            socket,
            destinations,
        })
    }

    /// Send one datagram to every destination, in list order
    ///
    /// Fire-and-forget: failures are logged per destination and the rest of
    /// the list still gets the datagram.
    pub fn send(&self, payload: &[u8]) {
        for dest in &self.destinations {
            if let Err(e) = self.socket.send_to(payload, dest) {
                log::warn!("Fanout: send to {} failed: {}", dest, e);
            }
        }
    }

    /// The configured destinations
    pub fn destinations(&self) -> &[SocketAddr] {
        &self.destinations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_every_destination_receives_once() {
        let rx_a = UdpSocket::bind("127.0.0.1:0").unwrap();
        let rx_b = UdpSocket::bind("127.0.0.1:0").unwrap();
        rx_a.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        rx_b.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

        let fanout = UdpFanout::new(vec![
            rx_a.local_addr().unwrap(),
            rx_b.local_addr().unwrap(),
        ])
        .unwrap();

        let payload = b"/x\0\0,\0\0\0";
        fanout.send(payload);

        let mut buf = [0u8; 64];
        let (n, _) = rx_a.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], payload);
        let (n, _) = rx_b.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], payload);

        // Exactly once: nothing further is queued on either socket
        rx_a.set_read_timeout(Some(Duration::from_millis(50)))
            .unwrap();
        assert!(rx_a.recv_from(&mut buf).is_err());
    }

    #[test]
    fn test_unreachable_destination_does_not_block_others() {
        let rx = UdpSocket::bind("127.0.0.1:0").unwrap();
        rx.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

        // First destination resolves but nothing listens there; send_to
        // still succeeds or fails quietly, and the second gets the payload
        let dead: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let fanout = UdpFanout::new(vec![dead, rx.local_addr().unwrap()]).unwrap();

        fanout.send(b"ping");

        let mut buf = [0u8; 8];
        let (n, _) = rx.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ping");
    }
}
