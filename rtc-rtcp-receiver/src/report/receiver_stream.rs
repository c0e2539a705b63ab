use crate::report::jitter::{JitterEstimator, TimestampOrdering};
use crate::report::sender_report::SenderReportCorrelator;
use crate::report::sequence::SequenceTracker;
use log::{debug, warn};
use rtcp::receiver_report::ReceiverReport;
use rtcp::reception_report::ReceptionReport;
use std::time::Instant;

/// The cumulative lost field of a reception report is 24 bits wide.
const MAX_TOTAL_LOST: u64 = 0xFFFFFF;

/// Point-in-time statistics of the tracked stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReceiverStats {
    /// SSRC of the remote source.
    pub ssrc: u32,
    pub packets_received: u64,
    /// Cumulative packets lost since the first packet.
    pub packets_lost: u64,
    /// Highest sequence number received, extended with the wraparound count.
    pub extended_highest_sequence_number: u64,
    /// Interarrival jitter in RTP timestamp units.
    pub jitter: u32,
    /// Compact NTP timestamp of the last Sender Report, 0 if none.
    pub last_sender_report: u32,
}

/// Reception statistics for the single remote source a receiver tracks.
pub(crate) struct ReceiverStream {
    ssrc: Option<u32>,

    sequence: SequenceTracker,
    jitter: JitterEstimator,
    sender_report: SenderReportCorrelator,

    expected_at_last_report: u64,
    lost_at_last_report: u64,
}

impl ReceiverStream {
    pub(crate) fn new(clock_rate: u32) -> Self {
        Self {
            ssrc: None,

            sequence: SequenceTracker::new(),
            jitter: JitterEstimator::new(clock_rate),
            sender_report: SenderReportCorrelator::new(),

            expected_at_last_report: 0,
            lost_at_last_report: 0,
        }
    }

    pub(crate) fn ssrc(&self) -> Option<u32> {
        self.ssrc
    }

    fn track_ssrc(&mut self, ssrc: u32) {
        match self.ssrc {
            None => {
                debug!("rtcp receiver tracking remote ssrc {ssrc:#010x}");
                self.ssrc = Some(ssrc);
            }
            Some(tracked) if tracked != ssrc => {
                warn!(
                    "rtcp receiver tracking ssrc {tracked:#010x} got data from ssrc {ssrc:#010x}"
                );
            }
            Some(_) => {}
        }
    }

    pub(crate) fn process_rtp(
        &mut self,
        now: Instant,
        pkt: &rtp::packet::Packet,
        ordering: TimestampOrdering,
    ) {
        self.track_ssrc(pkt.header.ssrc);
        self.sequence.observe(pkt.header.sequence_number);
        self.jitter.observe(pkt.header.timestamp, now, ordering);
    }

    pub(crate) fn process_sender_report(
        &mut self,
        now: Instant,
        sr: &rtcp::sender_report::SenderReport,
    ) {
        self.track_ssrc(sr.ssrc);
        self.sender_report.observe(sr.ntp_time, now);
    }

    /// Current statistics, without touching the per-report interval counters.
    pub(crate) fn stats(&self) -> Option<ReceiverStats> {
        if !self.sequence.started() {
            return None;
        }

        Some(ReceiverStats {
            ssrc: self.ssrc.unwrap_or_default(),
            packets_received: self.sequence.received(),
            packets_lost: self.sequence.lost(),
            extended_highest_sequence_number: self.sequence.highest_extended_seq(),
            jitter: self.jitter.jitter(),
            last_sender_report: self.sender_report.last_sender_report(),
        })
    }

    /// Whether an RTP packet was seen, i.e. whether there is anything to report.
    pub(crate) fn has_packets(&self) -> bool {
        self.sequence.started()
    }

    /// Builds the reception report for this stream and starts a new
    /// fraction-lost interval. `None` until the first RTP packet.
    pub(crate) fn generate_reception_report(&mut self, now: Instant) -> Option<ReceptionReport> {
        if !self.sequence.started() {
            return None;
        }

        let expected = self.sequence.expected();
        let lost = self.sequence.lost();

        let expected_since_report = expected - self.expected_at_last_report;
        let lost_since_report = lost - self.lost_at_last_report;
        let fraction_lost = if expected_since_report == 0 {
            0
        } else {
            (lost_since_report * 256 / expected_since_report).min(255) as u8
        };

        self.expected_at_last_report = expected;
        self.lost_at_last_report = lost;

        Some(ReceptionReport {
            ssrc: self.ssrc.unwrap_or_default(),
            fraction_lost,
            total_lost: lost.min(MAX_TOTAL_LOST) as u32,
            // cycle count in the upper 16 bits, sequence number in the lower
            last_sequence_number: self.sequence.highest_extended_seq() as u32,
            jitter: self.jitter.jitter(),
            last_sender_report: self.sender_report.last_sender_report(),
            delay: self.sender_report.delay_since_last_sender_report(now),
        })
    }

    /// Wraps the reception report into a Receiver Report sent from `receiver_ssrc`.
    pub(crate) fn generate_report(
        &mut self,
        now: Instant,
        receiver_ssrc: u32,
    ) -> Option<ReceiverReport> {
        let report = self.generate_reception_report(now)?;

        Some(ReceiverReport {
            ssrc: receiver_ssrc,
            reports: vec![report],
            ..Default::default()
        })
    }
}
