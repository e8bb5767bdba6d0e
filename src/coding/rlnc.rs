
use super::gf256;
use super::{Coder, CoderFactory};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// rank: u8
const PAYLOAD_HEADER_SIZE: usize = 1;

/// Builds systematic, on-the-fly random linear coders over GF(2^8).
///
/// Every payload has the layout `rank | coefficients | symbol`, where `rank` is the coder's rank
/// when the payload was written (one byte), `coefficients` holds one byte per symbol of the
/// generation, and `symbol` is the coded symbol itself.
pub struct RlncFactory {
    generation_size: usize,
    symbol_size: usize,
    rng: StdRng,
}

impl RlncFactory {
    /// Creates a factory for blocks of `generation_size` symbols, each `symbol_size` bytes long.
    ///
    /// # Panics
    ///
    /// Panics if either size is zero, or if `generation_size` exceeds 255.
    pub fn new(generation_size: usize, symbol_size: usize) -> Self {
        Self::with_rng(generation_size, symbol_size, StdRng::from_entropy())
    }

    /// Creates a factory whose coders draw coefficients from a deterministic sequence.
    pub fn with_seed(generation_size: usize, symbol_size: usize, seed: u64) -> Self {
        Self::with_rng(generation_size, symbol_size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(generation_size: usize, symbol_size: usize, rng: StdRng) -> Self {
        assert!(generation_size > 0 && generation_size <= u8::MAX as usize,
                "invalid generation size {}",
                generation_size);
        assert!(symbol_size > 0, "invalid symbol size {}", symbol_size);

        Self {
            generation_size,
            symbol_size,
            rng,
        }
    }
}

impl CoderFactory for RlncFactory {
    type Coder = RlncCoder;

    fn generation_size(&self) -> usize {
        self.generation_size
    }

    fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    fn max_payload_size(&self) -> usize {
        PAYLOAD_HEADER_SIZE + self.generation_size + self.symbol_size
    }

    fn build_coder(&mut self) -> RlncCoder {
        RlncCoder::new(self.generation_size, self.symbol_size, StdRng::seed_from_u64(self.rng.gen()))
    }
}

/// A coding context built by [`RlncFactory`].
///
/// Each registered symbol is emitted once uncoded (with a unit coefficient vector) before any
/// random combinations are produced, so a loss-free channel delivers a block without decoding
/// work.
pub struct RlncCoder {
    generation_size: usize,
    symbol_size: usize,

    registered: Box<[bool]>,
    systematic_sent: Box<[bool]>,
    rank: usize,

    rng: StdRng,
}

impl RlncCoder {
    fn new(generation_size: usize, symbol_size: usize, rng: StdRng) -> Self {
        Self {
            generation_size,
            symbol_size,

            registered: vec![false; generation_size].into_boxed_slice(),
            systematic_sent: vec![false; generation_size].into_boxed_slice(),
            rank: 0,

            rng,
        }
    }

    fn next_systematic(&self) -> Option<usize> {
        (0..self.generation_size).find(|&i| self.registered[i] && !self.systematic_sent[i])
    }
}

impl Coder for RlncCoder {
    fn set_symbol(&mut self, index: usize, symbol: &[u8]) {
        assert!(index < self.generation_size,
                "symbol index {} exceeds generation size {}",
                index,
                self.generation_size);
        assert_eq!(symbol.len(), self.symbol_size);

        if !self.registered[index] {
            self.registered[index] = true;
            self.rank += 1;
        }
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn write_payload(&mut self, symbols: &[u8], payload: &mut [u8]) -> usize {
        let payload_size = PAYLOAD_HEADER_SIZE + self.generation_size + self.symbol_size;

        debug_assert!(symbols.len() >= self.generation_size * self.symbol_size);
        debug_assert!(payload.len() >= payload_size);

        let (header, body) = payload[..payload_size].split_at_mut(PAYLOAD_HEADER_SIZE);
        let (coefficients, coded) = body.split_at_mut(self.generation_size);

        header[0] = self.rank as u8;

        for c in coefficients.iter_mut() {
            *c = 0;
        }
        for b in coded.iter_mut() {
            *b = 0;
        }

        if let Some(index) = self.next_systematic() {
            let symbol = &symbols[index * self.symbol_size .. (index + 1) * self.symbol_size];

            coefficients[index] = 1;
            coded.copy_from_slice(symbol);

            self.systematic_sent[index] = true;

            return payload_size;
        }

        if self.rank == 0 {
            return payload_size;
        }

        for index in 0..self.generation_size {
            if self.registered[index] {
                coefficients[index] = self.rng.gen();
            }
        }

        if coefficients.iter().all(|&c| c == 0) {
            // Never send an all-zero combination
            let pick = self.rng.gen_range(0..self.rank);
            let index = (0..self.generation_size).filter(|&i| self.registered[i]).nth(pick).unwrap_or(0);
            coefficients[index] = 1;
        }

        for index in 0..self.generation_size {
            let symbol = &symbols[index * self.symbol_size .. (index + 1) * self.symbol_size];
            gf256::mul_add(coded, symbol, coefficients[index]);
        }

        return payload_size;
    }
}
