use crate::error::{Error, Result};
use crate::receiver::RtcpReceiver;
use rtcp::receiver_report::ReceiverReport;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of the current time, read once per generated report.
pub type TimeNow = Arc<dyn Fn() -> Instant + Send + Sync>;

/// Destination of generated Receiver Reports.
pub type ReportSink = Arc<dyn Fn(ReceiverReport) + Send + Sync>;

/// Numeric settings of an [`RtcpReceiver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcpReceiverConfig {
    /// Rate of the RTP timestamp clock, in ticks per second.
    pub clock_rate: u32,
    /// SSRC the Receiver Reports are sent from.
    pub local_ssrc: u32,
    /// Period between two Receiver Reports.
    pub interval: Duration,
}

impl RtcpReceiverConfig {
    pub fn validate(&self) -> Result<()> {
        if self.clock_rate == 0 {
            return Err(Error::ErrInvalidClockRate);
        }
        if self.interval.is_zero() {
            return Err(Error::ErrInvalidInterval);
        }
        Ok(())
    }
}

/// Builder for the [`RtcpReceiver`].
///
/// # Example
///
/// ```ignore
/// use rtc_rtcp_receiver::RtcpReceiverBuilder;
/// use std::time::Duration;
///
/// let receiver = RtcpReceiverBuilder::new()
///     .with_clock_rate(90000)
///     .with_interval(Duration::from_millis(500))
///     .with_report_sink(|rr| println!("{rr:?}"))
///     .build();
/// receiver.initialize()?;
/// ```
pub struct RtcpReceiverBuilder {
    clock_rate: u32,
    local_ssrc: Option<u32>,
    interval: Duration,
    time_now: TimeNow,
    sink: Option<ReportSink>,
}

impl Default for RtcpReceiverBuilder {
    fn default() -> Self {
        Self {
            clock_rate: 0,
            local_ssrc: None,
            interval: Duration::from_secs(1),
            time_now: Arc::new(Instant::now),
            sink: None,
        }
    }
}

impl RtcpReceiverBuilder {
    /// Create a new builder with default settings.
    ///
    /// Default interval is 1 second. The clock rate has no default and must
    /// be set before the receiver is initialized.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock_rate(mut self, clock_rate: u32) -> Self {
        self.clock_rate = clock_rate;
        self
    }

    /// Set the SSRC the reports are sent from.
    ///
    /// When unset, a random SSRC is picked by [`build`](Self::build).
    /// Detecting collisions with other participants is left to the session.
    pub fn with_local_ssrc(mut self, local_ssrc: u32) -> Self {
        self.local_ssrc = Some(local_ssrc);
        self
    }

    /// Set a custom interval between receiver reports.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Replace the clock used to timestamp generated reports.
    pub fn with_time_now<F>(mut self, time_now: F) -> Self
    where
        F: Fn() -> Instant + Send + Sync + 'static,
    {
        self.time_now = Arc::new(time_now);
        self
    }

    /// Set the function every generated Receiver Report is handed to.
    pub fn with_report_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(ReceiverReport) + Send + Sync + 'static,
    {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn build(self) -> RtcpReceiver {
        let config = RtcpReceiverConfig {
            clock_rate: self.clock_rate,
            local_ssrc: self.local_ssrc.unwrap_or_else(rand::random::<u32>),
            interval: self.interval,
        };
        RtcpReceiver::new(config, self.time_now, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_default() {
        let receiver = RtcpReceiverBuilder::new().with_clock_rate(90000).build();
        assert_eq!(receiver.config().interval, Duration::from_secs(1));
        assert_eq!(receiver.config().clock_rate, 90000);
    }

    #[test]
    fn test_builder_with_custom_settings() {
        let receiver = RtcpReceiverBuilder::new()
            .with_clock_rate(48000)
            .with_local_ssrc(0x65f83afb)
            .with_interval(Duration::from_millis(500))
            .build();
        assert_eq!(
            receiver.config(),
            &RtcpReceiverConfig {
                clock_rate: 48000,
                local_ssrc: 0x65f83afb,
                interval: Duration::from_millis(500),
            }
        );
        assert_eq!(receiver.local_ssrc(), 0x65f83afb);
    }

    #[test]
    fn test_validate() {
        let config = RtcpReceiverConfig {
            clock_rate: 90000,
            local_ssrc: 1,
            interval: Duration::from_millis(250),
        };
        assert_eq!(config.validate(), Ok(()));

        let config = RtcpReceiverConfig {
            clock_rate: 0,
            ..config
        };
        assert_eq!(config.validate(), Err(Error::ErrInvalidClockRate));

        let config = RtcpReceiverConfig {
            clock_rate: 8000,
            interval: Duration::ZERO,
            ..config
        };
        assert_eq!(config.validate(), Err(Error::ErrInvalidInterval));
    }
}
