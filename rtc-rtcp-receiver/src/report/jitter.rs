use std::time::Instant;

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Whether a packet's RTP timestamp can be compared against its arrival time.
///
/// Interarrival jitter assumes RTP timestamps advance in step with arrival
/// order. That holds for audio and for video without B-frames, where the
/// presentation timestamp equals the decode timestamp. Video with frame
/// reordering carries presentation timestamps that jump backwards, so such
/// packets must be left out of the jitter estimate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimestampOrdering {
    /// PTS equals DTS: the packet takes part in jitter estimation.
    Monotonic,
    /// PTS differs from DTS: the packet only updates sequence and loss state.
    Reordered,
}

impl From<bool> for TimestampOrdering {
    fn from(pts_equals_dts: bool) -> Self {
        if pts_equals_dts {
            TimestampOrdering::Monotonic
        } else {
            TimestampOrdering::Reordered
        }
    }
}

/// Interarrival jitter estimator (RFC 3550 Section 6.4.1 and Appendix A.8).
///
/// The estimate is kept in fixed point, scaled by 16, so the update
/// `J += |D| - J/16` runs in integer arithmetic.
#[derive(Debug)]
pub(crate) struct JitterEstimator {
    clock_rate: u32,
    /// Arrival time of the first eligible packet; transit values are
    /// measured from here.
    anchor: Option<Instant>,
    last_transit: Option<u32>,
    jitter: u64,
}

impl JitterEstimator {
    pub(crate) fn new(clock_rate: u32) -> Self {
        Self {
            clock_rate,
            anchor: None,
            last_transit: None,
            jitter: 0,
        }
    }

    pub(crate) fn observe(&mut self, rtp_time: u32, arrival: Instant, ordering: TimestampOrdering) {
        if ordering != TimestampOrdering::Monotonic {
            return;
        }

        let anchor = *self.anchor.get_or_insert(arrival);
        let transit = self.arrival_ticks(anchor, arrival).wrapping_sub(rtp_time);

        if let Some(last_transit) = self.last_transit {
            let d = transit.wrapping_sub(last_transit) as i32;
            self.jitter = self.jitter - self.jitter / 16 + d.unsigned_abs() as u64;
        }

        self.last_transit = Some(transit);
    }

    /// Current estimate in RTP timestamp units, as carried in a reception report.
    pub(crate) fn jitter(&self) -> u32 {
        u32::try_from(self.jitter / 16).unwrap_or(u32::MAX)
    }

    /// Arrival time expressed in RTP ticks, modulo 2^32.
    ///
    /// Ticks are counted from `anchor` rather than from an absolute epoch, so
    /// truncation can move a single transit value by one tick. Jitter only
    /// uses transit differences, which the anchor cancels out of.
    fn arrival_ticks(&self, anchor: Instant, arrival: Instant) -> u32 {
        let nanos = if arrival >= anchor {
            arrival.duration_since(anchor).as_nanos() as i128
        } else {
            -(anchor.duration_since(arrival).as_nanos() as i128)
        };
        (nanos * self.clock_rate as i128 / NANOS_PER_SEC) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_timestamp_ordering_from_bool() {
        assert_eq!(TimestampOrdering::from(true), TimestampOrdering::Monotonic);
        assert_eq!(TimestampOrdering::from(false), TimestampOrdering::Reordered);
    }

    #[test]
    fn test_first_packet_sets_no_jitter() {
        let mut estimator = JitterEstimator::new(90000);
        estimator.observe(0xafb45733, Instant::now(), TimestampOrdering::Monotonic);
        assert_eq!(estimator.jitter(), 0);
        assert!(estimator.last_transit.is_some());
    }

    #[test]
    fn test_constant_transit_has_no_jitter() {
        let mut estimator = JitterEstimator::new(90000);
        let base = Instant::now();
        for i in 0..10u32 {
            estimator.observe(
                0xafb45733u32.wrapping_add(i * 3000),
                base + Duration::from_nanos(i as u64 * 33_333_334),
                TimestampOrdering::Monotonic,
            );
        }
        assert_eq!(estimator.jitter(), 0);
    }

    #[test]
    fn test_single_deviation() {
        let mut estimator = JitterEstimator::new(90000);
        let base = Instant::now();
        estimator.observe(0xafb45733, base, TimestampOrdering::Monotonic);
        estimator.observe(
            0xafb45733 + 45000,
            base + Duration::from_secs(1),
            TimestampOrdering::Monotonic,
        );
        assert_eq!(estimator.jitter(), 45000 / 16);
    }

    #[test]
    fn test_reordered_packets_are_skipped() {
        let mut estimator = JitterEstimator::new(90000);
        let base = Instant::now();
        estimator.observe(1000, base, TimestampOrdering::Monotonic);
        estimator.observe(
            1000 + 45000,
            base + Duration::from_secs(1),
            TimestampOrdering::Monotonic,
        );
        let last_transit = estimator.last_transit;

        estimator.observe(
            1000,
            base + Duration::from_secs(2),
            TimestampOrdering::Reordered,
        );
        assert_eq!(estimator.jitter(), 45000 / 16);
        assert_eq!(estimator.last_transit, last_transit);
    }

    #[test]
    fn test_reordered_first_packet_does_not_anchor() {
        let mut estimator = JitterEstimator::new(8000);
        let base = Instant::now();
        estimator.observe(0, base, TimestampOrdering::Reordered);
        assert!(estimator.anchor.is_none());
        assert!(estimator.last_transit.is_none());
    }

    #[test]
    fn test_converges_towards_constant_deviation() {
        let mut estimator = JitterEstimator::new(8000);
        let base = Instant::now();
        // alternate between on-time and 80 ticks (10ms) late
        for i in 0..200u32 {
            let late = if i % 2 == 1 { 10 } else { 0 };
            estimator.observe(
                i * 160,
                base + Duration::from_millis(i as u64 * 20 + late),
                TimestampOrdering::Monotonic,
            );
        }
        assert_eq!(estimator.jitter(), 80);
    }

    #[test]
    fn test_rtp_timestamp_wraparound() {
        let mut estimator = JitterEstimator::new(90000);
        let base = Instant::now();
        estimator.observe(u32::MAX - 1499, base, TimestampOrdering::Monotonic);
        estimator.observe(
            1500,
            base + Duration::from_millis(1000 / 30),
            TimestampOrdering::Monotonic,
        );
        // 33ms at 90kHz is 2970 ticks against a 3000 tick timestamp step
        assert_eq!(estimator.jitter(), 30 / 16);
    }

    #[test]
    fn test_arrival_before_anchor() {
        let mut estimator = JitterEstimator::new(90000);
        let base = Instant::now() + Duration::from_secs(10);
        estimator.observe(90000, base, TimestampOrdering::Monotonic);
        estimator.observe(
            0,
            base - Duration::from_secs(1),
            TimestampOrdering::Monotonic,
        );
        assert_eq!(estimator.jitter(), 0);
    }

    #[test]
    fn test_arrival_ticks_truncate_from_anchor() {
        // 8kHz: one tick is 125us
        let mut estimator = JitterEstimator::new(8000);
        let base = Instant::now() + Duration::from_secs(10);
        let half_tick = Duration::from_nanos(62_500);

        assert_eq!(estimator.arrival_ticks(base, base + 3 * half_tick), 1);
        assert_eq!(estimator.arrival_ticks(base, base - 3 * half_tick), u32::MAX);

        estimator.observe(0, base, TimestampOrdering::Monotonic);
        estimator.observe(0, base + 3 * half_tick, TimestampOrdering::Monotonic);
        // a 1.5 tick delay counts as one tick of deviation
        assert_eq!(estimator.jitter, 1);
        assert_eq!(estimator.jitter(), 0);
    }
}
