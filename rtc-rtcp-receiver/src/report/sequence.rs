/// Number of distinct 16-bit RTP sequence numbers.
const SEQ_NUM_MOD: u64 = 1 << 16;

/// Extends 16-bit RTP sequence numbers into a monotonic 64-bit space and
/// keeps the received/expected/lost counters derived from it.
///
/// This is the "extended highest sequence number received" algorithm of
/// RFC 3550 Appendix A.1 without source probation: a stream is trusted
/// from its first packet.
#[derive(Debug, Default)]
pub(crate) struct SequenceTracker {
    started: bool,
    cycles: u32,
    highest_seq: u16,
    first_extended_seq: u64,
    highest_extended_seq: u64,
    received: u64,
    cumulative_lost: u64,
}

impl SequenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records one received packet and returns its extended sequence number.
    ///
    /// Duplicates and late packets count as received but never move the
    /// high-water mark backwards.
    pub(crate) fn observe(&mut self, seq: u16) -> u64 {
        self.received += 1;

        if !self.started {
            // first packet
            self.started = true;
            self.cycles = 0;
            self.highest_seq = seq;
            self.first_extended_seq = seq as u64;
            self.highest_extended_seq = seq as u64;
            return seq as u64;
        }

        let delta = seq.wrapping_sub(self.highest_seq) as i16;
        let extended = if delta > 0 {
            if seq < self.highest_seq {
                self.cycles += 1;
            }
            self.highest_seq = seq;
            self.highest_extended_seq = self.cycles as u64 * SEQ_NUM_MOD + seq as u64;
            self.highest_extended_seq
        } else if seq > self.highest_seq {
            // late packet from before the last wraparound
            self.cycles.saturating_sub(1) as u64 * SEQ_NUM_MOD + seq as u64
        } else {
            self.cycles as u64 * SEQ_NUM_MOD + seq as u64
        };

        let lost = self.expected().saturating_sub(self.received);
        self.cumulative_lost = self.cumulative_lost.max(lost);

        extended
    }

    pub(crate) fn started(&self) -> bool {
        self.started
    }

    pub(crate) fn highest_extended_seq(&self) -> u64 {
        self.highest_extended_seq
    }

    pub(crate) fn received(&self) -> u64 {
        self.received
    }

    /// Packets expected since the first one, inclusive.
    pub(crate) fn expected(&self) -> u64 {
        if !self.started {
            return 0;
        }
        self.highest_extended_seq - self.first_extended_seq + 1
    }

    /// Cumulative packets lost. Never decreases, even when duplicates push
    /// the received count above the expected count.
    pub(crate) fn lost(&self) -> u64 {
        self.cumulative_lost
    }
}
