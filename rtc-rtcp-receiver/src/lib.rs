//! RTC RTCP Receiver - RTCP Receiver Report generation for one RTP stream.
//!
//! This crate observes an incoming RTP stream and the RTCP Sender Reports of
//! its source, and periodically emits an RTCP Receiver Report (RFC 3550
//! Section 6.4.2) carrying:
//!
//! | Field | Source |
//! |-------|--------|
//! | fraction lost | packets lost over packets expected since the previous report |
//! | cumulative lost | expected minus received since the first packet, never decreasing |
//! | extended highest sequence number | wraparound count in the upper 16 bits |
//! | interarrival jitter | RFC 3550 fixed-point estimator, RTP timestamp units |
//! | LSR | middle 32 bits of the last Sender Report's NTP timestamp |
//! | DLSR | time since that Sender Report arrived, in 1/65536 seconds |
//!
//! Packet parsing, socket I/O and demultiplexing of several sources are left
//! to the caller: one [`RtcpReceiver`] tracks exactly one remote SSRC.
//!
//! # Quick Start
//!
//! ```ignore
//! use rtc_rtcp_receiver::{RtcpReceiverBuilder, TimestampOrdering};
//! use std::time::{Duration, Instant};
//!
//! let receiver = RtcpReceiverBuilder::new()
//!     .with_clock_rate(90000)
//!     .with_interval(Duration::from_millis(500))
//!     .with_report_sink(|rr| {
//!         // marshal and send the Receiver Report
//!     })
//!     .build();
//! receiver.initialize()?;
//!
//! // from the RTP/RTCP receive loop
//! receiver.process_sender_report(&sr, Instant::now());
//! receiver.process_packet(&rtp_packet, Instant::now(), TimestampOrdering::Monotonic);
//!
//! receiver.close().await;
//! ```
//!
//! # Timestamp ordering
//!
//! Jitter is only meaningful for packets whose RTP timestamp grows with the
//! send order. Packets of video streams with B-frames, whose presentation
//! timestamp differs from the decode timestamp, are passed with
//! [`TimestampOrdering::Reordered`]: they count for loss statistics but are
//! left out of the jitter estimate.

#![warn(rust_2018_idioms)]

mod config;
mod error;
mod receiver;
pub(crate) mod report;

pub use config::{ReportSink, RtcpReceiverBuilder, RtcpReceiverConfig, TimeNow};
pub use error::{Error, Result};
pub use receiver::RtcpReceiver;
pub use report::jitter::TimestampOrdering;
pub use report::receiver_stream::ReceiverStats;
