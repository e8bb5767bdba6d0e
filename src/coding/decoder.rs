
use super::gf256;

// A received combination, reduced so that its pivot coefficient is 1 and every other row's pivot
// column is 0
struct Row {
    coefficients: Box<[u8]>,
    symbol: Box<[u8]>,
}

/// Recovers one block from payloads written by an [`RlncCoder`](super::RlncCoder).
///
/// Received combinations are kept in reduced row echelon form as they arrive, so the rank is
/// always current and decoding completes with the last innovative payload.
pub struct RlncDecoder {
    generation_size: usize,
    symbol_size: usize,

    // Indexed by pivot column
    rows: Box<[Option<Row>]>,
    rank: usize,
    // Highest coder rank announced by a payload header
    coder_rank: usize,
}

impl RlncDecoder {
    /// Creates an empty decoder for blocks of `generation_size` symbols, each `symbol_size` bytes
    /// long.
    pub fn new(generation_size: usize, symbol_size: usize) -> Self {
        assert!(generation_size > 0 && generation_size <= u8::MAX as usize,
                "invalid generation size {}",
                generation_size);

        Self {
            generation_size,
            symbol_size,

            rows: (0..generation_size).map(|_| None).collect(),
            rank: 0,
            coder_rank: 0,
        }
    }

    /// Returns the size of the payloads this decoder accepts.
    pub fn payload_size(&self) -> usize {
        1 + self.generation_size + self.symbol_size
    }

    /// Returns the number of linearly independent combinations received so far.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Returns `true` if every symbol the coder held when it last wrote a received payload has
    /// been recovered.
    pub fn is_decoded(&self) -> bool {
        self.rank > 0 && self.rank >= self.coder_rank
    }

    /// Adds a payload. Returns `true` if it increased the rank. Payloads of the wrong size are
    /// ignored.
    pub fn receive(&mut self, payload: &[u8]) -> bool {
        if payload.len() != self.payload_size() {
            return false;
        }

        self.coder_rank = self.coder_rank.max(payload[0] as usize);

        let (coefficients, symbol) = payload[1..].split_at(self.generation_size);

        let mut coefficients: Box<[u8]> = coefficients.into();
        let mut symbol: Box<[u8]> = symbol.into();

        for column in 0..self.generation_size {
            let c = coefficients[column];

            if c != 0 {
                if let Some(row) = &self.rows[column] {
                    gf256::mul_add(&mut coefficients, &row.coefficients, c);
                    gf256::mul_add(&mut symbol, &row.symbol, c);
                }
            }
        }

        let pivot = match coefficients.iter().position(|&c| c != 0) {
            Some(pivot) => pivot,
            None => return false,
        };

        let scale = gf256::inv(coefficients[pivot]);

        for b in coefficients.iter_mut().chain(symbol.iter_mut()) {
            *b = gf256::mul(*b, scale);
        }

        for row in self.rows.iter_mut().flatten() {
            let c = row.coefficients[pivot];

            if c != 0 {
                gf256::mul_add(&mut row.coefficients, &coefficients, c);
                gf256::mul_add(&mut row.symbol, &symbol, c);
            }
        }

        self.rows[pivot] = Some(Row { coefficients, symbol });
        self.rank += 1;

        return true;
    }

    /// Returns symbol `index` if it has been recovered.
    pub fn symbol(&self, index: usize) -> Option<&[u8]> {
        let row = self.rows.get(index)?.as_ref()?;

        let is_unit = row.coefficients.iter().enumerate().all(|(i, &c)| c == if i == index { 1 } else { 0 });

        if is_unit {
            Some(&row.symbol[..])
        } else {
            None
        }
    }

    /// Returns the recovered symbols in order, or `None` if the block is not yet decoded.
    pub fn symbols(&self) -> Option<Vec<&[u8]>> {
        if !self.is_decoded() {
            return None;
        }

        (0..self.rank).map(|index| self.symbol(index)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::coding::{Coder, CoderFactory, RlncFactory};

    const GENERATION_SIZE: usize = 6;
    const SYMBOL_SIZE: usize = 10;

    fn test_symbols() -> Vec<u8> {
        (0..GENERATION_SIZE * SYMBOL_SIZE).map(|i| (i * 91 + 5) as u8).collect()
    }

    fn symbol(symbols: &[u8], index: usize) -> &[u8] {
        &symbols[index * SYMBOL_SIZE .. (index + 1) * SYMBOL_SIZE]
    }

    #[test]
    fn systematic_payloads_decode_directly() {
        let mut factory = RlncFactory::with_seed(GENERATION_SIZE, SYMBOL_SIZE, 1);
        let mut coder = factory.build_coder();
        let mut decoder = RlncDecoder::new(GENERATION_SIZE, SYMBOL_SIZE);
        let mut payload = vec![0u8; factory.max_payload_size()];
        let symbols = test_symbols();

        for index in 0..GENERATION_SIZE {
            coder.set_symbol(index, symbol(&symbols, index));
            coder.write_payload(&symbols, &mut payload);

            assert!(decoder.receive(&payload));
            assert_eq!(decoder.rank(), index + 1);
            assert!(decoder.is_decoded());
            assert_eq!(decoder.symbol(index), Some(symbol(&symbols, index)));
        }

        let decoded: Vec<u8> = decoder.symbols().unwrap().concat();
        assert_eq!(decoded, symbols);
    }

    #[test]
    fn coded_payloads_repair_losses() {
        let mut factory = RlncFactory::with_seed(GENERATION_SIZE, SYMBOL_SIZE, 2);
        let mut coder = factory.build_coder();
        let mut decoder = RlncDecoder::new(GENERATION_SIZE, SYMBOL_SIZE);
        let mut payload = vec![0u8; factory.max_payload_size()];
        let symbols = test_symbols();

        // Every other systematic payload is lost
        for index in 0..GENERATION_SIZE {
            coder.set_symbol(index, symbol(&symbols, index));
            coder.write_payload(&symbols, &mut payload);

            if index % 2 == 0 {
                decoder.receive(&payload);
            }
        }

        assert_eq!(decoder.rank(), GENERATION_SIZE / 2);
        assert!(!decoder.is_decoded());
        assert_eq!(decoder.symbols(), None);

        let mut sent = 0;
        while !decoder.is_decoded() {
            assert!(sent < 100, "decoder never reached full rank");

            coder.write_payload(&symbols, &mut payload);
            decoder.receive(&payload);

            sent += 1;
        }

        assert_eq!(decoder.rank(), GENERATION_SIZE);

        let decoded: Vec<u8> = decoder.symbols().unwrap().concat();
        assert_eq!(decoded, symbols);
    }

    #[test]
    fn partial_block_decodes_at_coder_rank() {
        let mut factory = RlncFactory::with_seed(GENERATION_SIZE, SYMBOL_SIZE, 3);
        let mut coder = factory.build_coder();
        let mut decoder = RlncDecoder::new(GENERATION_SIZE, SYMBOL_SIZE);
        let mut payload = vec![0u8; factory.max_payload_size()];
        let symbols = test_symbols();

        coder.set_symbol(0, symbol(&symbols, 0));
        coder.set_symbol(1, symbol(&symbols, 1));

        // Both systematic payloads are lost
        coder.write_payload(&symbols, &mut payload);
        coder.write_payload(&symbols, &mut payload);

        let mut sent = 0;
        while !decoder.is_decoded() {
            assert!(sent < 100, "decoder never reached coder rank");

            coder.write_payload(&symbols, &mut payload);
            decoder.receive(&payload);

            sent += 1;
        }

        assert_eq!(decoder.rank(), 2);
        assert_eq!(decoder.symbols().unwrap(), vec![symbol(&symbols, 0), symbol(&symbols, 1)]);
        assert_eq!(decoder.symbol(2), None);
    }

    #[test]
    fn duplicates_are_not_innovative() {
        let mut factory = RlncFactory::with_seed(GENERATION_SIZE, SYMBOL_SIZE, 4);
        let mut coder = factory.build_coder();
        let mut decoder = RlncDecoder::new(GENERATION_SIZE, SYMBOL_SIZE);
        let mut payload = vec![0u8; factory.max_payload_size()];
        let symbols = test_symbols();

        coder.set_symbol(0, symbol(&symbols, 0));
        coder.write_payload(&symbols, &mut payload);

        assert!(decoder.receive(&payload));
        assert!(!decoder.receive(&payload));
        assert_eq!(decoder.rank(), 1);
    }

    #[test]
    fn malformed_payload_is_ignored() {
        let mut decoder = RlncDecoder::new(GENERATION_SIZE, SYMBOL_SIZE);

        let zeros = vec![0u8; decoder.payload_size()];

        assert!(!decoder.receive(&[1, 1]));
        assert!(!decoder.receive(&zeros));
        assert_eq!(decoder.rank(), 0);
        assert!(!decoder.is_decoded());
    }
}
