
use thiserror::Error;

/// A feedback record which breaks the sender/receiver contract.
#[derive(Clone,Copy,Debug,PartialEq,Error)]
pub enum ProtocolViolation {
    /// A feedback datagram did not have the fixed record size.
    #[error("feedback record of {0} bytes")]
    RecordSize(usize),
    /// A rank report was zero, or exceeded the generation size.
    #[error("rank {rank} reported for block {block_id} is outside 1..={generation_size}")]
    RankOutOfRange {
        /// The block the report referred to.
        block_id: u32,
        /// The reported rank.
        rank: u32,
        /// The configured generation size.
        generation_size: usize,
    },
}

/// Errors returned by transmitter operations.
///
/// Every variant is fatal for the transmitter that produced it; none of them describe a state
/// that the pipeline can recover from.
#[derive(Debug,Error)]
pub enum Error {
    /// A record did not have the configured symbol size. The record was discarded.
    #[error("record of {actual} bytes does not match symbol size {expected}")]
    InvalidInput {
        /// The configured symbol size.
        expected: usize,
        /// The length of the rejected record.
        actual: usize,
    },
    /// The receiver sent a malformed or out-of-range rank report.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),
    /// The configuration is invalid for the selected coding engine.
    #[error("invalid config: {0}")]
    Config(&'static str),
    /// A socket could not be created, or the feedback socket failed.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    /// The transmitter still holds queued records, symbols, or blocks.
    #[error("transmitter released with {source_records} records, {symbols} symbols and {blocks} blocks queued")]
    NotIdle {
        /// Records still in the source queue.
        source_records: usize,
        /// Symbols still in the symbol queue.
        symbols: usize,
        /// Blocks still in the block queue.
        blocks: usize,
    },
}

/// Shorthand for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;
