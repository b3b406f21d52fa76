//! OSC datagram classification
//!
//! The bridge forwards OSC payloads opaquely; it only needs to tell a
//! bundle from a message from garbage. Deep parsing stays in the `rosc`
//! crate and is reached only on the debug-logging path.

use rosc::OscPacket;

/// Tag that begins every OSC bundle datagram
pub const BUNDLE_TAG: &[u8] = b"#bundle\0";

/// First byte of every OSC message address pattern
const ADDRESS_START: u8 = b'/';

/// A classified OSC datagram, borrowing the decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscDatagram<'a> {
    /// Bundle container (starts with the `#bundle` tag)
    Bundle(&'a [u8]),
    /// Single message (address pattern starts with `/`)
    Message(&'a [u8]),
    /// Neither; not forwardable
    Unrecognized(&'a [u8]),
}

/// Classify a datagram by its leading bytes, without parsing or allocating
pub fn classify(payload: &[u8]) -> OscDatagram<'_> {
    if payload.starts_with(BUNDLE_TAG) {
        OscDatagram::Bundle(payload)
    } else if payload.first() == Some(&ADDRESS_START) {
        OscDatagram::Message(payload)
    } else {
        OscDatagram::Unrecognized(payload)
    }
}

/// Log a recognized datagram's contents at debug level
///
/// Parse failures only affect the log line; the caller forwards the raw
/// payload either way.
pub fn log_datagram(payload: &[u8]) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }

    match rosc::decoder::decode_udp(payload) {
        Ok((_, packet)) => log::debug!("OSC: < {}", format_packet(&packet)),
        Err(e) => log::debug!(
            "OSC: recognized but undecodable datagram ({} bytes): {:?}",
            payload.len(),
            e
        ),
    }
}

fn format_packet(packet: &OscPacket) -> String {
    match packet {
        OscPacket::Message(msg) => format!("{} {:?}", msg.addr, msg.args),
        OscPacket::Bundle(bundle) => {
            let inner: Vec<String> = bundle.content.iter().map(format_packet).collect();
            format!("[ {} ]", inner.join(" | "))
        }
    }
}
