
use crate::block::{Block, BlockQueue};
use crate::coding::{CoderFactory, RlncFactory};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::feedback;
use crate::fountain;
use crate::queue::{self, SourceQueue, SourceRecord, Symbol, SymbolQueue};
use crate::token_bucket::TokenBucket;
use crate::udp::{UdpDataSink, UdpFeedbackSource};
use crate::wire;
use crate::MAX_DATAGRAM_SIZE;

use std::io;
use std::time;

/// Destination for outbound data packets. Sending is best effort: failures are not reported.
pub trait DataSink {
    /// Sends one data packet.
    fn send(&mut self, packet: &[u8]);
}

/// Non-blocking source of inbound feedback records.
pub trait FeedbackSource {
    /// Receives one datagram into `buf`, returning its size. Must return an error of kind
    /// [`WouldBlock`](io::ErrorKind::WouldBlock) immediately if nothing is available.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Counters describing a transmitter's activity so far.
#[derive(Clone,Debug,Default,PartialEq)]
pub struct Stats {
    /// Records accepted by [`Transmitter::enqueue`].
    pub records_enqueued: u64,
    /// Blocks opened.
    pub blocks_created: u64,
    /// Blocks reclaimed after being fully acknowledged.
    pub blocks_reclaimed: u64,
    /// Packets sent as symbols were admitted.
    pub eager_sends: u64,
    /// Packets sent by the fountain scheduler.
    pub repair_sends: u64,
    /// Rank reports merged into a block.
    pub acks_applied: u64,
    /// Rank reports for blocks which had already been reclaimed.
    pub acks_stale: u64,
}

/// The sender context: pipeline queues, coding engine, sockets, and the outbound packet buffer.
///
/// All stages run on the calling thread, and none of them block.
pub struct Transmitter<F = RlncFactory, D = UdpDataSink, S = UdpFeedbackSource>
where
    F: CoderFactory,
{
    config: Config,

    factory: F,
    data_sink: D,
    feedback_source: S,

    source_queue: SourceQueue,
    symbol_queue: SymbolQueue,
    blocks: BlockQueue<F::Coder>,

    next_block_id: u32,

    packet_buf: Box<[u8]>,
    packet_cost: u32,

    time_base: time::Instant,

    stats: Stats,
}

impl Transmitter {
    /// Opens the data and feedback sockets described by `config`, and returns a transmitter which
    /// uses the bundled linear coder.
    ///
    /// # Error Handling
    ///
    /// Returns [`Error::Config`] if the configuration is invalid, and forwards any errors
    /// resulting from socket initialization.
    pub fn bind(config: Config) -> Result<Self> {
        if !config.is_valid() {
            return Err(Error::Config("invalid transmitter config"));
        }

        let factory = RlncFactory::new(config.generation_size, config.symbol_size);
        let data_sink = UdpDataSink::connect(config.destination)?;
        let feedback_source = UdpFeedbackSource::bind(config.feedback_bind)?;

        log::info!("sending to {}, feedback on {}",
                   config.destination,
                   feedback_source.local_addr()?);

        Self::new(config, factory, data_sink, feedback_source)
    }
}

impl<F, D, S> Transmitter<F, D, S>
where
    F: CoderFactory,
    D: DataSink,
    S: FeedbackSource,
{
    /// Creates a transmitter from its parts.
    ///
    /// # Error Handling
    ///
    /// Returns [`Error::Config`] if the configuration is invalid, if the coding engine disagrees
    /// with the configured generation or symbol size, if a data packet would not fit in a single
    /// datagram, or if a block's token bucket could never hold enough for one packet.
    pub fn new(config: Config, factory: F, data_sink: D, feedback_source: S) -> Result<Self> {
        if !config.is_valid() {
            return Err(Error::Config("invalid transmitter config"));
        }

        if factory.generation_size() != config.generation_size || factory.symbol_size() != config.symbol_size {
            return Err(Error::Config("coding engine does not match configured generation/symbol size"));
        }

        let packet_size = wire::DATA_HEADER_SIZE + factory.max_payload_size();

        if packet_size > MAX_DATAGRAM_SIZE {
            return Err(Error::Config("data packet exceeds maximum datagram size"));
        }

        let packet_cost = packet_size as u32;

        if packet_cost > config.bucket_capacity {
            return Err(Error::Config("token bucket capacity is smaller than one data packet"));
        }

        Ok(Self {
            config,

            factory,
            data_sink,
            feedback_source,

            source_queue: SourceQueue::new(),
            symbol_queue: SymbolQueue::new(),
            blocks: BlockQueue::new(),

            next_block_id: 0,

            packet_buf: vec![0u8; packet_size].into_boxed_slice(),
            packet_cost,

            time_base: time::Instant::now(),

            stats: Stats::default(),
        })
    }

    /// Returns the configuration this transmitter was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns activity counters.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Returns the data sink.
    pub fn data_sink(&self) -> &D {
        &self.data_sink
    }

    /// Returns the data sink.
    pub fn data_sink_mut(&mut self) -> &mut D {
        &mut self.data_sink
    }

    /// Returns the feedback source.
    pub fn feedback_source(&self) -> &S {
        &self.feedback_source
    }

    /// Returns the feedback source.
    pub fn feedback_source_mut(&mut self) -> &mut S {
        &mut self.feedback_source
    }

    /// Returns an iterator over the live blocks, in id order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block<F::Coder>> {
        self.blocks.iter()
    }

    /// Returns the number of records which have not yet been reshaped into symbols.
    pub fn source_queue_len(&self) -> usize {
        self.source_queue.len()
    }

    /// Returns the number of symbols which have not yet been admitted into a block.
    pub fn symbol_queue_len(&self) -> usize {
        self.symbol_queue.len()
    }

    /// Returns the number of live blocks.
    pub fn block_queue_len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the size of each data packet, in bytes. This is also the number of token bucket
    /// units consumed by a repair packet.
    pub fn packet_size(&self) -> usize {
        self.packet_buf.len()
    }

    /// Returns `true` if no records, symbols, or blocks remain queued.
    pub fn is_idle(&self) -> bool {
        self.source_queue.is_empty() && self.symbol_queue.is_empty() && self.blocks.is_empty()
    }

    /// Returns the number of milliseconds elapsed since this transmitter was created.
    pub fn now_ms(&self) -> u64 {
        (time::Instant::now() - self.time_base).as_millis() as u64
    }

    /// Appends a record to the source queue. Nothing is sent until the next step.
    ///
    /// # Error Handling
    ///
    /// Returns [`Error::InvalidInput`] if `data.len()` differs from the configured symbol size;
    /// the record is not queued.
    pub fn enqueue(&mut self, data: &[u8]) -> Result<()> {
        if data.len() != self.config.symbol_size {
            return Err(Error::InvalidInput {
                expected: self.config.symbol_size,
                actual: data.len(),
            });
        }

        self.source_queue.push_back(SourceRecord::new(data.into()));
        self.stats.records_enqueued += 1;

        Ok(())
    }

    /// Reshapes every pending record into a symbol. Returns the number of symbols produced.
    pub fn fragment(&mut self) -> usize {
        queue::fragment(&mut self.source_queue, &mut self.symbol_queue)
    }

    /// Admits every pending symbol into the tail block, opening new blocks as the tail fills up,
    /// and sends one coded packet per admitted symbol.
    pub fn assign_to_blocks(&mut self, now_ms: u64) {
        while let Some(symbol) = self.symbol_queue.pop_front() {
            let index = self.admit(&symbol, now_ms);

            let block = &mut self.blocks[index];
            let size = block.write_packet(&mut self.packet_buf);

            log::trace!("block {} eager send at rank {}", block.id(), block.local_rank());

            self.data_sink.send(&self.packet_buf[..size]);
            self.stats.eager_sends += 1;
        }
    }

    /// Drains every pending rank report from the feedback source and merges it into its block.
    ///
    /// # Error Handling
    ///
    /// Returns [`Error::Protocol`] for a malformed record or an out-of-range rank (no block is
    /// modified by the offending record), and [`Error::Io`] if the feedback source fails with
    /// anything other than `WouldBlock`.
    pub fn process_feedback(&mut self) -> Result<()> {
        let report = feedback::drain(&mut self.feedback_source, &mut self.blocks, self.config.generation_size)?;

        self.stats.acks_applied += report.applied;
        self.stats.acks_stale += report.stale;

        Ok(())
    }

    /// Validates a single rank report and merges it into its block. Returns `false` if the block
    /// has already been reclaimed.
    pub fn handle_feedback(&mut self, ack: wire::Feedback) -> Result<bool> {
        feedback::validate(&ack, self.config.generation_size)?;

        let applied = feedback::apply(&mut self.blocks, &ack);

        if applied {
            self.stats.acks_applied += 1;
        } else {
            self.stats.acks_stale += 1;
        }

        Ok(applied)
    }

    /// Runs one fountain pass: reclaims complete blocks, and sends one repair packet for each
    /// block with an outstanding deficit whose token bucket allows it.
    pub fn fountain(&mut self, now_ms: u64) {
        let packet_buf = &mut self.packet_buf[..];
        let data_sink = &mut self.data_sink;

        let report = fountain::pass(&mut self.blocks, self.packet_cost, now_ms, |block| {
            let size = block.write_packet(packet_buf);

            log::trace!("block {} repair send, rank {}/{}", block.id(), block.ack_rank(), block.local_rank());

            data_sink.send(&packet_buf[..size]);
        });

        self.stats.blocks_reclaimed += report.reclaimed;
        self.stats.repair_sends += report.repaired;
    }

    /// Closes the tail block to further symbols, so that it may be reclaimed once the receiver
    /// reports its current rank, even if it never fills up.
    pub fn seal(&mut self) {
        if let Some(block) = self.blocks.back_mut() {
            if !block.is_sealed() && !block.is_full() {
                log::debug!("block {} sealed at rank {}", block.id(), block.local_rank());
                block.seal();
            }
        }
    }

    /// Runs every stage once, using the transmitter's own clock.
    pub fn step(&mut self) -> Result<()> {
        let now_ms = self.now_ms();
        self.step_at(now_ms)
    }

    /// Runs every stage once at the given time: fragment, admit and send, process feedback, and
    /// finally one fountain pass.
    pub fn step_at(&mut self, now_ms: u64) -> Result<()> {
        self.fragment();
        self.assign_to_blocks(now_ms);
        self.process_feedback()?;
        self.fountain(now_ms);

        Ok(())
    }

    /// Releases the transmitter, its coding engine, and both sockets.
    ///
    /// # Error Handling
    ///
    /// Returns [`Error::NotIdle`] if any record, symbol, or block is still queued.
    pub fn release(self) -> Result<()> {
        if !self.is_idle() {
            return Err(Error::NotIdle {
                source_records: self.source_queue.len(),
                symbols: self.symbol_queue.len(),
                blocks: self.blocks.len(),
            });
        }

        Ok(())
    }

    // Admits a symbol into the tail block, opening a new block first if the queue is empty or
    // the tail no longer accepts symbols. Returns the index of the block in the queue.
    fn admit(&mut self, symbol: &Symbol, now_ms: u64) -> usize {
        let needs_block = match self.blocks.back() {
            Some(block) => !block.accepts_symbols(),
            None => true,
        };

        if needs_block {
            self.open_block(now_ms);
        }

        let index = self.blocks.len() - 1;
        self.blocks[index].admit(symbol);

        return index;
    }

    fn open_block(&mut self, now_ms: u64) {
        let id = self.next_block_id;
        self.next_block_id = self.next_block_id.wrapping_add(1);

        let pacer = TokenBucket::new(self.config.block_rate, self.config.bucket_capacity, now_ms);
        let coder = self.factory.build_coder();

        self.blocks.push_back(Block::new(id, self.config.generation_size, self.config.symbol_size, pacer, coder));
        self.stats.blocks_created += 1;

        log::debug!("block {} created", id);
    }
}
