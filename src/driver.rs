
use crate::coding::{CoderFactory, RlncFactory};
use crate::error::{Error, Result};
use crate::transmitter::{DataSink, FeedbackSource, Stats, Transmitter};
use crate::udp::{UdpDataSink, UdpFeedbackSource};

use std::convert::TryInto;
use std::thread;

/// The number of meaningful bytes at the start of each produced record: a `u32` sequence number
/// followed by a `u64` timestamp, both big-endian.
pub const RECORD_HEADER_SIZE: usize = 12;

/// Serializes a produced record, zero-padded to `symbol_size` bytes.
///
/// # Panics
///
/// Panics if `symbol_size` is smaller than [`RECORD_HEADER_SIZE`].
pub fn encode_record(seq: u32, timestamp_ms: u64, symbol_size: usize) -> Box<[u8]> {
    assert!(symbol_size >= RECORD_HEADER_SIZE, "symbol size too small for record header");

    let mut data = vec![0u8; symbol_size].into_boxed_slice();

    data[0..4].copy_from_slice(&seq.to_be_bytes());
    data[4..12].copy_from_slice(&timestamp_ms.to_be_bytes());

    return data;
}

/// Returns the sequence number and timestamp of a produced record, or `None` if it is too short.
pub fn decode_record(data: &[u8]) -> Option<(u32, u64)> {
    if data.len() < RECORD_HEADER_SIZE {
        return None;
    }

    let seq = u32::from_be_bytes(data[0..4].try_into().ok()?);
    let timestamp_ms = u64::from_be_bytes(data[4..12].try_into().ok()?);

    Some((seq, timestamp_ms))
}

/// Emits a bounded number of records at a fixed cadence.
#[derive(Debug)]
pub struct Producer {
    next_seq: u32,
    last_record_ms: Option<u64>,

    record_count: u32,
    interval_ms: u64,
    symbol_size: usize,
}

impl Producer {
    /// Creates a producer of `record_count` records spaced `interval_ms` apart. The first record
    /// is produced on the first poll.
    pub fn new(record_count: u32, interval_ms: u64, symbol_size: usize) -> Self {
        Self {
            next_seq: 0,
            last_record_ms: None,

            record_count,
            interval_ms,
            symbol_size,
        }
    }

    /// Returns the next record if the interval has elapsed since the previous one, and the
    /// record count has not been reached.
    pub fn poll(&mut self, now_ms: u64) -> Option<Box<[u8]>> {
        if self.is_done() {
            return None;
        }

        if let Some(last_record_ms) = self.last_record_ms {
            if now_ms.saturating_sub(last_record_ms) < self.interval_ms {
                return None;
            }
        }

        let record = encode_record(self.next_seq, now_ms, self.symbol_size);

        self.next_seq += 1;
        self.last_record_ms = Some(now_ms);

        Some(record)
    }

    /// Returns the number of records produced so far.
    pub fn produced(&self) -> u32 {
        self.next_seq
    }

    /// Returns `true` once every record has been produced.
    pub fn is_done(&self) -> bool {
        self.next_seq >= self.record_count
    }
}

/// Runs a transmitter until a bounded stream of produced records has been fully acknowledged.
///
/// Each tick enqueues at most one new record, then runs every pipeline stage once. Once the
/// producer is done, the trailing block is sealed so that it can be reclaimed even if it never
/// fills up.
pub struct Driver<F = RlncFactory, D = UdpDataSink, S = UdpFeedbackSource>
where
    F: CoderFactory,
{
    transmitter: Transmitter<F, D, S>,
    producer: Producer,
    sealed: bool,
}

impl<F, D, S> Driver<F, D, S>
where
    F: CoderFactory,
    D: DataSink,
    S: FeedbackSource,
{
    /// Creates a driver whose producer follows the transmitter's configuration.
    ///
    /// # Error Handling
    ///
    /// Returns [`Error::Config`] if the configured symbol size cannot hold a record header.
    pub fn new(transmitter: Transmitter<F, D, S>) -> Result<Self> {
        let config = transmitter.config();

        if config.symbol_size < RECORD_HEADER_SIZE {
            return Err(Error::Config("symbol size too small for record header"));
        }

        let producer = Producer::new(config.record_count, config.record_interval_ms, config.symbol_size);

        Ok(Self {
            transmitter,
            producer,
            sealed: false,
        })
    }

    /// Returns the driven transmitter.
    pub fn transmitter(&self) -> &Transmitter<F, D, S> {
        &self.transmitter
    }

    /// Returns the driven transmitter.
    pub fn transmitter_mut(&mut self) -> &mut Transmitter<F, D, S> {
        &mut self.transmitter
    }

    /// Returns the record producer.
    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    /// Runs one tick at the given time. Returns `true` once every record has been produced and
    /// the transmitter is idle.
    pub fn tick(&mut self, now_ms: u64) -> Result<bool> {
        if let Some(record) = self.producer.poll(now_ms) {
            self.transmitter.enqueue(&record)?;
        }

        self.transmitter.step_at(now_ms)?;

        if self.producer.is_done() && !self.sealed {
            self.transmitter.seal();
            self.sealed = true;
        }

        Ok(self.producer.is_done() && self.transmitter.is_idle())
    }

    /// Ticks until finished, sleeping for the configured poll interval after every tick, then
    /// releases the transmitter. Returns the transmitter's final statistics.
    ///
    /// # Error Handling
    ///
    /// Stops at the first error returned by a pipeline stage.
    pub fn run(mut self) -> Result<Stats> {
        let poll_interval = self.transmitter.config().poll_interval;

        log::info!("sending {} records of {} bytes every {}ms",
                   self.transmitter.config().record_count,
                   self.transmitter.config().symbol_size,
                   self.transmitter.config().record_interval_ms);

        loop {
            let now_ms = self.transmitter.now_ms();

            if self.tick(now_ms)? {
                break;
            }

            thread::sleep(poll_interval);
        }

        let stats = self.transmitter.stats().clone();

        log::info!("finished after {}ms: {} blocks, {} eager sends, {} repair sends, {} acks ({} stale)",
                   self.transmitter.now_ms(),
                   stats.blocks_created,
                   stats.eager_sends,
                   stats.repair_sends,
                   stats.acks_applied + stats.acks_stale,
                   stats.acks_stale);

        self.transmitter.release()?;

        Ok(stats)
    }
}
