//! Reception statistics behind an RTCP Receiver Report.
//!
//! - [`sequence`]: extended sequence numbers and loss counting.
//! - [`jitter`]: interarrival jitter estimation.
//! - [`sender_report`]: last Sender Report correlation (LSR/DLSR).
//! - [`receiver_stream`]: per-stream state assembling the reception report.
//!
//! Nothing here reads a clock: every operation gets the current time from
//! its caller.

pub(crate) mod jitter;
pub(crate) mod receiver_stream;
pub(crate) mod sender_report;
pub(crate) mod sequence;
