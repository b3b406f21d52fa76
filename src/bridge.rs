//! Bridge orchestrator: one serial link, SLIP framing, OSC fan-out
//!
//! A single loop owns the serial handle and alternates two phases per
//! cycle: one bounded read feeding the SLIP decoder (completed frames are
//! classified and fanned out over UDP), then one drain of the outbound
//! queue (each item SLIP-encoded and written back to the device). The
//! bounded read keeps inbound latency predictable; snapshotting the queue
//! length bounds the drain, so neither direction can starve the other.
//!
//! Producers anywhere in the process enqueue outbound datagrams through a
//! cloned [`OutboundSender`]; the channel is the only cross-thread
//! boundary. The channel outlives any one serial session, so datagrams
//! queued while the link is down go out after reconnection.

use crate::config::AppConfig;
use crate::error::Result;
use crate::fanout::UdpFanout;
use crate::protocol::osc::{self, OscDatagram};
use crate::protocol::slip::{self, SlipDecoder};
use crate::transport::Transport;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Handshake sentinel payload, SLIP-framed and written once per connection
///
/// Tells the peer the bridge is listening and plants a known frame
/// boundary in its input stream.
const HANDSHAKE_SENTINEL: u8 = b'|';

/// Read timeout used while draining stale input during the handshake
const DRAIN_TIMEOUT: Duration = Duration::from_millis(1);

/// Producer handle for outbound datagrams (clone freely)
pub type OutboundSender = Sender<Vec<u8>>;

/// Create the outbound queue endpoints
///
/// The receiver is handed to each [`Bridge`] session in turn; senders live
/// wherever datagrams originate.
pub fn outbound_channel() -> (OutboundSender, Receiver<Vec<u8>>) {
    crossbeam_channel::unbounded()
}

/// Bridge between one serial connection and the UDP destination set
///
/// Lives for exactly one physical connection; the reconnect supervisor
/// builds a fresh instance (with a fresh decoder) after a transport fault,
/// since a reconnect invalidates any in-flight framing.
pub struct Bridge {
    transport: Box<dyn Transport>,
    decoder: SlipDecoder,
    outbound: Receiver<Vec<u8>>,
    fanout: Arc<UdpFanout>,
    read_buf: Vec<u8>,
    read_timeout: Duration,
    settle_delay: Duration,
}

impl Bridge {
    /// Create a bridge over an open transport
    pub fn new(
        transport: Box<dyn Transport>,
        fanout: Arc<UdpFanout>,
        outbound: Receiver<Vec<u8>>,
        config: &AppConfig,
    ) -> Self {
        Bridge {
            transport,
            decoder: SlipDecoder::new(),
            outbound,
            fanout,
            read_buf: vec![0u8; config.serial.read_chunk],
            read_timeout: config.serial.timeout(),
            settle_delay: config.bridge.settle_delay(),
        }
    }

    /// Run handshake then steady-state cycles until stop is set or the
    /// transport fails
    ///
    /// Returns `Ok(())` only for a stop request; a transport error
    /// propagates to the reconnect supervisor. The stop flag is checked at
    /// cycle boundaries, never mid-phase.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<()> {
        self.handshake()?;

        log::info!("Bridge: entering steady state");
        while !stop.load(Ordering::Relaxed) {
            self.run_cycle()?;
        }

        log::info!("Bridge: stop requested, exiting after current cycle");
        Ok(())
    }

    /// Per-connection handshake
    ///
    /// Waits out the peer's boot/reset window, discards whatever arrived
    /// before the peer was ready, then frames the sentinel so both sides
    /// agree on a packet boundary.
    fn handshake(&mut self) -> Result<()> {
        log::info!("Bridge: handshake, settling for {:?}", self.settle_delay);
        thread::sleep(self.settle_delay);

        self.transport.set_timeout(DRAIN_TIMEOUT)?;
        let mut scratch = [0u8; 64];
        let mut drained = 0usize;
        loop {
            let n = self.transport.read(&mut scratch)?;
            if n == 0 {
                break;
            }
            drained += n;
        }
        self.transport.set_timeout(self.read_timeout)?;

        if drained > 0 {
            log::debug!("Bridge: discarded {} stale byte(s) before handshake", drained);
        }

        self.transport.write(&slip::encode(&[HANDSHAKE_SENTINEL]))?;
        self.transport.flush()?;

        log::info!("Bridge: handshake complete");
        Ok(())
    }

    /// One steady-state cycle: bounded inbound read, then outbound drain
    fn run_cycle(&mut self) -> Result<()> {
        self.forward_inbound()?;
        self.forward_outbound()?;
        Ok(())
    }

    /// Read one bounded chunk and fan out any completed frames
    ///
    /// A framing error resets the decoder and drops the partial frame; the
    /// session continues.
    fn forward_inbound(&mut self) -> Result<()> {
        let n = self.transport.read(&mut self.read_buf)?;
        if n == 0 {
            return Ok(());
        }

        let frames = match self.decoder.feed(&self.read_buf[..n]) {
            Ok(frames) => frames,
            Err(e) => {
                log::warn!("Bridge: framing error: {}", e);
                self.decoder.reset();
                return Ok(());
            }
        };

        for frame in frames {
            self.dispatch(&frame);
        }
        Ok(())
    }

    /// Classify one decoded frame and forward it if recognized
    fn dispatch(&self, frame: &[u8]) {
        match osc::classify(frame) {
            OscDatagram::Bundle(payload) | OscDatagram::Message(payload) => {
                osc::log_datagram(payload);
                self.fanout.send(payload);
            }
            OscDatagram::Unrecognized(payload) => {
                log::warn!(
                    "Bridge: unrecognized datagram ({} bytes), dropping",
                    payload.len()
                );
            }
        }
    }

    /// Drain the outbound queue, encoding and writing each item
    ///
    /// Bounded by the queue length at cycle start: items enqueued during
    /// the drain wait for the next cycle, so a producer burst cannot
    /// monopolize the link.
    fn forward_outbound(&mut self) -> Result<()> {
        let queued = self.outbound.len();
        for _ in 0..queued {
            let Ok(item) = self.outbound.try_recv() else {
                break;
            };
            self.transport.write(&slip::encode(&item))?;
        }
        Ok(())
    }
}
