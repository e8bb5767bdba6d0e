
// Deterministic coding engine for pipeline tests. Rank is the number of registered symbols, and
// every payload is `write_count: u32 | rank: u8 | first byte of each registered symbol`, padded
// with zeros.

use super::{Coder, CoderFactory};

pub struct CountingFactory {
    generation_size: usize,
    symbol_size: usize,
    pub coders_built: usize,
}

impl CountingFactory {
    pub fn new(generation_size: usize, symbol_size: usize) -> Self {
        Self {
            generation_size,
            symbol_size,
            coders_built: 0,
        }
    }
}

impl CoderFactory for CountingFactory {
    type Coder = CountingCoder;

    fn generation_size(&self) -> usize {
        self.generation_size
    }

    fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    fn max_payload_size(&self) -> usize {
        5 + self.generation_size
    }

    fn build_coder(&mut self) -> CountingCoder {
        self.coders_built += 1;

        CountingCoder {
            generation_size: self.generation_size,
            symbol_size: self.symbol_size,
            registered: Vec::new(),
            write_count: 0,
        }
    }
}

pub struct CountingCoder {
    generation_size: usize,
    symbol_size: usize,
    pub registered: Vec<(usize, Box<[u8]>)>,
    pub write_count: u32,
}

impl Coder for CountingCoder {
    fn set_symbol(&mut self, index: usize, symbol: &[u8]) {
        assert!(index < self.generation_size);
        assert_eq!(symbol.len(), self.symbol_size);
        self.registered.push((index, symbol.into()));
    }

    fn rank(&self) -> usize {
        self.registered.len()
    }

    fn write_payload(&mut self, symbols: &[u8], payload: &mut [u8]) -> usize {
        let payload_size = 5 + self.generation_size;

        for b in payload[..payload_size].iter_mut() {
            *b = 0;
        }

        payload[0..4].copy_from_slice(&self.write_count.to_be_bytes());
        payload[4] = self.rank() as u8;

        for index in 0..self.rank() {
            payload[5 + index] = symbols[index * self.symbol_size];
        }

        self.write_count += 1;

        return payload_size;
    }
}
