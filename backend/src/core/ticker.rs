//! Display ticker
//!
//! Recomputes the synthetic clock on a short fixed cadence and publishes
//! [`ClockReading`]s for the renderer. Readings are presentational only;
//! classification always samples the clock afresh.
//!
//! The ticker owns one background thread. [`DisplayTicker::stop`] (or drop)
//! cancels it and joins the thread, so no timer outlives its phase.

use crate::core::time::{ClockReader, ClockReading};
use crossbeam_channel::{bounded, select, tick, Receiver, Sender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub struct DisplayTicker {
    readings: Receiver<ClockReading>,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DisplayTicker {
    /// Start publishing readings every `interval`.
    pub fn spawn(reader: ClockReader, interval: Duration) -> Self {
        let (reading_tx, readings) = bounded(1);
        let (stop_tx, stop_rx) = bounded::<()>(0);

        let handle = thread::spawn(move || {
            let ticks = tick(interval);
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticks) -> _ => {
                        let reading = ClockReading::from_millis(reader.now());
                        // A full slot means the renderer has not caught up; skip the frame.
                        if let Err(TrySendError::Disconnected(_)) = reading_tx.try_send(reading) {
                            break;
                        }
                    }
                }
            }
        });

        tracing::debug!(interval_ms = interval.as_millis() as u64, "display ticker started");

        Self {
            readings,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Channel of readings, for renderers that block or `select!` on it.
    pub fn readings(&self) -> &Receiver<ClockReading> {
        &self.readings
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Cancel the periodic recomputation and wait for the thread to exit.
    pub fn stop(&mut self) {
        // Dropping the sender wakes the select with a disconnect.
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("display ticker thread panicked");
            } else {
                tracing::debug!("display ticker stopped");
            }
        }
    }
}

impl Drop for DisplayTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
