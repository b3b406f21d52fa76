//! Application orchestration for the SetuIO daemon
//!
//! Owns the pieces that outlive any single serial connection: the UDP
//! fan-out, the outbound queue endpoints, and the shutdown flag. Runs the
//! reconnect supervisor: handshake plus steady-state inside a retry loop
//! with fixed backoff.

use crate::bridge::{self, Bridge, OutboundSender};
use crate::config::AppConfig;
use crate::error::Result;
use crate::fanout::UdpFanout;
use crate::transport::SerialTransport;
use crossbeam_channel::Receiver;
use log::{info, warn};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Granularity of the backoff wait, so a stop request is honored promptly
const BACKOFF_SLICE: Duration = Duration::from_millis(100);

/// Main application structure that manages all components
pub struct BridgeApp {
    config: AppConfig,
    fanout: Arc<UdpFanout>,
    outbound_tx: OutboundSender,
    outbound_rx: Receiver<Vec<u8>>,
    shutdown: Arc<AtomicBool>,
}

impl BridgeApp {
    /// Create the application from a loaded configuration
    ///
    /// Resolves and binds the UDP destination set; an unresolvable
    /// destination fails construction.
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing SetuIO bridge");

        let destinations = config.resolve_destinations()?;
        let fanout = Arc::new(UdpFanout::new(destinations)?);
        let (outbound_tx, outbound_rx) = bridge::outbound_channel();

        Ok(BridgeApp {
            config,
            fanout,
            outbound_tx,
            outbound_rx,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Producer handle for datagrams heading toward the serial device
    pub fn outbound_sender(&self) -> OutboundSender {
        self.outbound_tx.clone()
    }

    /// Shared stop flag (also settable from embedding code)
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run sessions until a stop request
    ///
    /// The first open of the device must succeed; failing it is a
    /// configuration fault and the error propagates. After that, any
    /// transport fault (including a failed re-open) is retried forever
    /// with fixed backoff.
    pub fn run(&mut self) -> Result<()> {
        self.spawn_signal_handler();

        let backoff = self.config.bridge.reconnect_delay();
        let mut ever_connected = false;

        while !self.shutdown.load(Ordering::Relaxed) {
            let transport = match SerialTransport::open(&self.config.serial) {
                Ok(t) => t,
                Err(e) if !ever_connected => return Err(e),
                Err(e) => {
                    warn!("Serial: open failed: {}, retrying in {:?}", e, backoff);
                    self.wait_backoff(backoff);
                    continue;
                }
            };
            ever_connected = true;

            let mut session = Bridge::new(
                Box::new(transport),
                Arc::clone(&self.fanout),
                self.outbound_rx.clone(),
                &self.config,
            );

            match session.run(&self.shutdown) {
                Ok(()) => break,
                Err(e) => {
                    warn!("Serial: disconnected: {}, reconnecting in {:?}", e, backoff);
                    self.wait_backoff(backoff);
                }
            }
        }

        info!("SetuIO stopped");
        Ok(())
    }

    /// Sleep out the backoff in slices, bailing early on a stop request
    fn wait_backoff(&self, backoff: Duration) {
        let mut remaining = backoff;
        while !remaining.is_zero() && !self.shutdown.load(Ordering::Relaxed) {
            let slice = BACKOFF_SLICE.min(remaining);
            thread::sleep(slice);
            remaining -= slice;
        }
    }

    /// Setup signal handler for graceful shutdown
    fn spawn_signal_handler(&self) {
        let shutdown = Arc::clone(&self.shutdown);

        thread::Builder::new()
            .name("signal-handler".to_string())
            .spawn(move || {
                let mut signals =
                    Signals::new([SIGINT, SIGTERM]).expect("Failed to register signal handlers");

                if let Some(sig) = signals.forever().next() {
                    info!("Received signal {:?}, initiating shutdown...", sig);
                    shutdown.store(true, Ordering::Relaxed);
                }
            })
            .expect("Failed to spawn signal handler thread");
    }
}
