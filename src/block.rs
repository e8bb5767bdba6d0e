
use crate::coding::Coder;
use crate::queue::Symbol;
use crate::token_bucket::TokenBucket;
use crate::wire;

use std::collections::VecDeque;

/// A generation: up to `generation_size` symbols coded together and acknowledged as one unit.
pub struct Block<C> {
    id: u32,

    generation_size: usize,
    symbol_size: usize,

    // Symbols admitted into the coding context
    local_rank: usize,
    // Highest rank reported by the receiver
    ack_rank: usize,
    // No further symbols will be admitted, even if the block is not full
    sealed: bool,

    raw_symbols: Box<[u8]>,
    pacer: TokenBucket,
    coder: C,
}

// Ordered by strictly increasing id
pub type BlockQueue<C> = VecDeque<Block<C>>;

impl<C: Coder> Block<C> {
    pub(crate) fn new(id: u32, generation_size: usize, symbol_size: usize, pacer: TokenBucket, coder: C) -> Self {
        Self {
            id,

            generation_size,
            symbol_size,

            local_rank: 0,
            ack_rank: 0,
            sealed: false,

            raw_symbols: vec![0u8; generation_size * symbol_size].into_boxed_slice(),
            pacer,
            coder,
        }
    }

    /// Returns this block's id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the number of symbols admitted into this block.
    pub fn local_rank(&self) -> usize {
        self.local_rank
    }

    /// Returns the highest rank the receiver has reported for this block.
    pub fn ack_rank(&self) -> usize {
        self.ack_rank
    }

    /// Returns `true` if this block was closed before reaching full rank.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Returns `true` if this block holds a full generation of symbols.
    pub fn is_full(&self) -> bool {
        self.local_rank == self.generation_size
    }

    /// Returns `true` if every symbol admitted into this block is known to be decodable by the
    /// receiver, and no more symbols will be admitted.
    ///
    /// An unsealed block is complete iff `local_rank == ack_rank == generation_size`. A sealed
    /// block is complete once the reported rank reaches its local rank.
    pub fn is_complete(&self) -> bool {
        if self.is_full() {
            self.ack_rank == self.generation_size
        } else {
            self.sealed && self.ack_rank >= self.local_rank
        }
    }

    /// Returns `true` if the receiver has reported less rank than this block holds.
    pub fn has_deficit(&self) -> bool {
        self.local_rank > self.ack_rank
    }

    pub(crate) fn accepts_symbols(&self) -> bool {
        !self.sealed && self.local_rank < self.generation_size
    }

    /// Returns the token bucket which paces this block's repair packets.
    pub fn pacer(&self) -> &TokenBucket {
        &self.pacer
    }

    #[cfg(test)]
    pub(crate) fn coder(&self) -> &C {
        &self.coder
    }

    #[cfg(test)]
    pub(crate) fn raw_symbols(&self) -> &[u8] {
        &self.raw_symbols
    }

    // Copies the symbol into the next free slot and registers it with the coding context
    pub(crate) fn admit(&mut self, symbol: &Symbol) {
        assert!(self.accepts_symbols(), "block {} does not accept symbols", self.id);
        assert_eq!(symbol.data().len(), self.symbol_size);

        let index = self.local_rank;
        let slot = index * self.symbol_size .. (index + 1) * self.symbol_size;

        self.raw_symbols[slot.clone()].copy_from_slice(symbol.data());
        self.coder.set_symbol(index, &self.raw_symbols[slot]);

        let rank = self.coder.rank();
        assert_eq!(rank, index + 1, "coder rank did not advance for block {}", self.id);

        self.local_rank = rank;
    }

    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }

    pub(crate) fn merge_ack(&mut self, rank: usize) {
        debug_assert!(rank <= self.generation_size);
        self.ack_rank = self.ack_rank.max(rank);
    }

    pub(crate) fn try_pace(&mut self, cost: u32, now_ms: u64) -> bool {
        self.pacer.consume(cost, now_ms)
    }

    // Writes one data packet (header and a freshly coded payload) into `buf`, and returns its
    // length.
    pub(crate) fn write_packet(&mut self, buf: &mut [u8]) -> usize {
        wire::DataPacket::write_header(self.id, buf);

        let payload_len = self.coder.write_payload(&self.raw_symbols, &mut buf[wire::DATA_HEADER_SIZE..]);

        return wire::DATA_HEADER_SIZE + payload_len;
    }
}
