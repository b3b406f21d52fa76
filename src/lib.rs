//! SetuIO - SLIP/OSC bridge between a serial device and UDP consumers
//!
//! Translates between a SLIP-framed serial byte stream and OSC datagrams
//! on the network: inbound frames are decoded, classified, and fanned out
//! to a fixed set of UDP destinations; outbound datagrams are queued,
//! SLIP-encoded, and written to the device. One loop owns the serial
//! handle and a reconnect supervisor restarts the session after link
//! faults.

pub mod app;
pub mod bridge;
pub mod config;
pub mod error;
pub mod fanout;
pub mod protocol;
pub mod transport;

// Re-export commonly used types
pub use app::BridgeApp;
pub use bridge::OutboundSender;
pub use config::AppConfig;
pub use error::{Error, Result};
