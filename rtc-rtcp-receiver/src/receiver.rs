//! RTCP Receiver - periodic Receiver Report generation for one incoming stream.

use crate::config::{ReportSink, RtcpReceiverConfig, TimeNow};
use crate::error::{Error, Result};
use crate::report::jitter::TimestampOrdering;
use crate::report::receiver_stream::{ReceiverStats, ReceiverStream};
use log::{debug, trace, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

enum Lifecycle {
    Created,
    Running(Scheduler),
    Closed,
}

/// Handle on the timer task that emits the reports.
struct Scheduler {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Collects reception statistics for one remote RTP source and periodically
/// emits an RTCP Receiver Report describing them.
///
/// Packets and Sender Reports are fed in by the caller's receive loop; a
/// Tokio task started by [`initialize`](Self::initialize) builds a report
/// every interval and hands it to the configured sink. The report is
/// skipped while no RTP packet has been seen.
///
/// All methods take `&self`, so the receiver can be shared between the
/// receive loop and its owner behind an `Arc`.
///
/// # Example
///
/// ```ignore
/// use rtc_rtcp_receiver::{RtcpReceiverBuilder, TimestampOrdering};
/// use std::time::Instant;
///
/// let receiver = RtcpReceiverBuilder::new()
///     .with_clock_rate(90000)
///     .with_report_sink(move |rr| send_rtcp(rr))
///     .build();
/// receiver.initialize()?;
///
/// receiver.process_packet(&pkt, Instant::now(), TimestampOrdering::Monotonic);
/// // ...
/// receiver.close().await;
/// ```
pub struct RtcpReceiver {
    config: RtcpReceiverConfig,
    time_now: TimeNow,
    sink: Option<ReportSink>,

    stream: Arc<Mutex<ReceiverStream>>,
    lifecycle: Mutex<Lifecycle>,
    /// Turns true once no sink call can happen anymore.
    stopped: Arc<watch::Sender<bool>>,
}

impl RtcpReceiver {
    pub(crate) fn new(
        config: RtcpReceiverConfig,
        time_now: TimeNow,
        sink: Option<ReportSink>,
    ) -> Self {
        Self {
            stream: Arc::new(Mutex::new(ReceiverStream::new(config.clock_rate))),
            config,
            time_now,
            sink,

            lifecycle: Mutex::new(Lifecycle::Created),
            stopped: Arc::new(watch::Sender::new(false)),
        }
    }

    pub fn config(&self) -> &RtcpReceiverConfig {
        &self.config
    }

    /// SSRC the Receiver Reports are sent from.
    pub fn local_ssrc(&self) -> u32 {
        self.config.local_ssrc
    }

    /// SSRC of the tracked source, once a packet or Sender Report arrived.
    pub fn remote_ssrc(&self) -> Option<u32> {
        self.stream.lock().ssrc()
    }

    /// Validates the configuration and starts the report timer.
    ///
    /// Must be called from within a Tokio runtime. Fails if the receiver is
    /// already running or has been closed.
    pub fn initialize(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        match *lifecycle {
            Lifecycle::Created => {}
            Lifecycle::Running(_) => return Err(Error::ErrAlreadyRunning),
            Lifecycle::Closed => return Err(Error::ErrClosed),
        }

        self.config.validate()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| Error::ErrNoRuntime)?;

        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = runtime.spawn(run_scheduler(
            Arc::clone(&self.stream),
            self.config.local_ssrc,
            self.config.interval,
            Arc::clone(&self.time_now),
            self.sink.clone(),
            shutdown_rx,
            StoppedGuard(Arc::clone(&self.stopped)),
        ));

        debug!(
            "rtcp receiver {:#010x} started: clock_rate={}, interval={:?}",
            self.config.local_ssrc, self.config.clock_rate, self.config.interval
        );

        *lifecycle = Lifecycle::Running(Scheduler { shutdown, handle });
        Ok(())
    }

    /// Stops the report timer.
    ///
    /// Once this returns the sink is never invoked again, for every caller:
    /// a `close` racing with another one waits until the timer task is gone.
    /// Calling it on a receiver that was never initialized only marks it closed.
    pub async fn close(&self) {
        let previous = std::mem::replace(&mut *self.lifecycle.lock(), Lifecycle::Closed);
        match previous {
            Lifecycle::Running(scheduler) => {
                // the task may already be gone if the runtime is shutting down
                let _ = scheduler.shutdown.send(());
                if let Err(err) = scheduler.handle.await {
                    warn!(
                        "rtcp receiver {:#010x} report task failed: {err}",
                        self.config.local_ssrc
                    );
                }
                debug!("rtcp receiver {:#010x} closed", self.config.local_ssrc);
            }
            Lifecycle::Created => {
                self.stopped.send_replace(true);
            }
            Lifecycle::Closed => {}
        }

        // the sender lives in self, so this only returns once stopped is set
        let mut stopped = self.stopped.subscribe();
        let _ = stopped.wait_for(|stopped| *stopped).await;
    }

    /// Feeds one received RTP packet.
    ///
    /// `arrival` is the local time the packet was received. `ordering` tells
    /// whether its RTP timestamp can be used for jitter estimation.
    pub fn process_packet(
        &self,
        pkt: &rtp::packet::Packet,
        arrival: Instant,
        ordering: TimestampOrdering,
    ) {
        self.stream.lock().process_rtp(arrival, pkt, ordering);
    }

    /// Feeds one received RTCP Sender Report from the tracked source.
    pub fn process_sender_report(&self, sr: &rtcp::sender_report::SenderReport, arrival: Instant) {
        self.stream.lock().process_sender_report(arrival, sr);
    }

    /// Current statistics, `None` until the first RTP packet.
    ///
    /// Unlike report generation this does not start a new fraction-lost
    /// interval.
    pub fn stats(&self) -> Option<ReceiverStats> {
        self.stream.lock().stats()
    }
}

impl Drop for RtcpReceiver {
    fn drop(&mut self) {
        if let Lifecycle::Running(scheduler) =
            std::mem::replace(self.lifecycle.get_mut(), Lifecycle::Closed)
        {
            let _ = scheduler.shutdown.send(());
            scheduler.handle.abort();
        }
    }
}

/// Marks the receiver stopped when the timer task ends, including when it is
/// aborted or a sink call panics.
struct StoppedGuard(Arc<watch::Sender<bool>>);

impl Drop for StoppedGuard {
    fn drop(&mut self) {
        self.0.send_replace(true);
    }
}

async fn run_scheduler(
    stream: Arc<Mutex<ReceiverStream>>,
    local_ssrc: u32,
    interval: Duration,
    time_now: TimeNow,
    sink: Option<ReportSink>,
    mut shutdown: oneshot::Receiver<()>,
    _stopped: StoppedGuard,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let rr = {
                    let mut stream = stream.lock();
                    if !stream.has_packets() {
                        continue;
                    }
                    stream.generate_report(time_now(), local_ssrc)
                };
                let Some(rr) = rr else {
                    continue;
                };

                trace!("rtcp receiver {local_ssrc:#010x} generated {rr:?}");
                if let Some(sink) = &sink {
                    sink(rr);
                }
            }
        }
    }
}
