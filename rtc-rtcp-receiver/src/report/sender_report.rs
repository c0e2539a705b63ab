use std::time::Instant;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Remembers the most recent Sender Report so later reception reports can
/// carry the LSR and DLSR fields.
#[derive(Debug, Default)]
pub(crate) struct SenderReportCorrelator {
    last_sender_report: u32,
    last_sender_report_time: Option<Instant>,
}

impl SenderReportCorrelator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records a Sender Report, replacing any earlier one.
    pub(crate) fn observe(&mut self, ntp_time: u64, arrival: Instant) {
        // middle 32 bits of the NTP timestamp
        self.last_sender_report = (ntp_time >> 16) as u32;
        self.last_sender_report_time = Some(arrival);
    }

    /// Compact NTP timestamp of the last Sender Report, 0 if none arrived yet.
    pub(crate) fn last_sender_report(&self) -> u32 {
        self.last_sender_report
    }

    /// Time elapsed since the last Sender Report arrived, in units of
    /// 1/65536 seconds, rounded to nearest. 0 if none arrived yet.
    pub(crate) fn delay_since_last_sender_report(&self, now: Instant) -> u32 {
        let Some(sr_time) = self.last_sender_report_time else {
            return 0;
        };

        let elapsed = now.saturating_duration_since(sr_time).as_nanos();
        let delay = (elapsed * 65536 + NANOS_PER_SEC / 2) / NANOS_PER_SEC;
        u32::try_from(delay).unwrap_or(u32::MAX)
    }
}
