#![warn(missing_docs)]

//! `fountain_tx` is the sender half of a reliable, rate-paced datagram transport built on
//! erasure coding. Application records are treated as fixed-size symbols, grouped into blocks
//! (generations), and streamed over UDP as linear combinations of each block's symbols.
//! Instead of acknowledging individual packets, the receiver reports the decoding rank it has
//! reached for each block, and the sender keeps emitting fresh combinations of a block until the
//! reported rank catches up.
//!
//! # Creating a Transmitter
//!
//! A [`Transmitter`] is the single context object which owns the three pipeline queues, the
//! coding engine, and both sockets. [`Transmitter::bind()`] opens a data socket connected to the
//! configured destination and a non-blocking feedback socket bound to the configured local
//! address (see: [`Config`]).
//!
//! ```no_run
//! let config = fountain_tx::Config {
//!     generation_size: 16,
//!     .. Default::default()
//! };
//!
//! let mut tx = fountain_tx::Transmitter::bind(config)
//!     .expect("Failed to bind/configure sockets");
//! ```
//!
//! # Sending Records
//!
//! Records are passed to [`Transmitter::enqueue()`], and must be exactly
//! [`symbol_size`](Config#structfield.symbol_size) bytes long. Nothing is placed on the network
//! until the next call to [`Transmitter::step()`], which runs each pipeline stage in order:
//!
//!   1. Pending records are reshaped into symbols.
//!   2. Symbols are admitted into the tail block (a new block is opened whenever the tail is
//!      full), and one coded packet is sent for each admitted symbol.
//!   3. Pending rank reports are drained from the feedback socket and merged into their blocks.
//!   4. Fully acknowledged blocks are reclaimed, and each block with an outstanding deficit is
//!      given a chance to send one repair packet, subject to its own token bucket.
//!
//! ```no_run
//! # let mut tx = fountain_tx::Transmitter::bind(Default::default()).unwrap();
//! let record = vec![0u8; tx.config().symbol_size];
//!
//! loop {
//!     tx.enqueue(&record).expect("record size mismatch");
//!
//!     tx.step().expect("transmitter failure");
//!
//!     // Sleep for 500µs
//!     std::thread::sleep(std::time::Duration::from_micros(500));
//! #   break;
//! }
//! ```
//!
//! The [`driver`] module provides a complete loop that produces records at a fixed cadence and
//! terminates once every block has been acknowledged.
//!
//! # Coding Engines
//!
//! The linear coding itself is reached only through the [`coding::CoderFactory`] and
//! [`coding::Coder`] traits. [`coding::RlncFactory`] is a systematic random linear coder over
//! GF(2^8) that is used by default, and [`coding::RlncDecoder`] recovers its blocks on the
//! receiving end.

mod block;
mod feedback;
mod fountain;
mod queue;
mod token_bucket;
mod transmitter;
mod udp;

/// Coding engine interface and the bundled linear coder.
pub mod coding;

/// Static transmitter configuration.
pub mod config;

/// Driver loop and record producer.
pub mod driver;

/// Error types.
pub mod error;

/// Data packet and feedback record serialization.
pub mod wire;

pub use block::Block;
pub use config::Config;
pub use driver::Driver;
pub use error::{Error, ProtocolViolation, Result};
pub use queue::{SourceRecord, Symbol};
pub use token_bucket::TokenBucket;
pub use transmitter::{DataSink, FeedbackSource, Stats, Transmitter};
pub use udp::{UdpDataSink, UdpFeedbackSource};

/// The common maximum transfer unit (MTU) of the internet.
pub const INTERNET_MTU: usize = 1500;

/// The number of bytes in a UDP header (including the IP header).
pub const UDP_HEADER_SIZE: usize = 28;

/// The maximum size of a data packet in bytes, according to the internet MTU and UDP header size.
pub const MAX_DATAGRAM_SIZE: usize = INTERNET_MTU - UDP_HEADER_SIZE;
