
mod decoder;
mod gf256;
mod rlnc;

#[cfg(test)]
pub(crate) mod testing;

pub use decoder::RlncDecoder;
pub use rlnc::{RlncCoder, RlncFactory};

/// Creates per-block coding contexts. A single factory lives as long as its transmitter, and
/// outlives every coder it builds.
pub trait CoderFactory {
    /// The coding context built for each block.
    type Coder: Coder;

    /// Returns the number of symbols per block that built coders accept.
    fn generation_size(&self) -> usize;

    /// Returns the size of each symbol, in bytes.
    fn symbol_size(&self) -> usize;

    /// Returns the maximum number of bytes written by [`Coder::write_payload`].
    fn max_payload_size(&self) -> usize;

    /// Builds a new, empty coding context.
    fn build_coder(&mut self) -> Self::Coder;
}

/// A coding context for one block.
///
/// A coder does not own the symbol data it combines. Symbols are stored contiguously by the
/// caller (symbol `i` occupies bytes `i*symbol_size .. (i+1)*symbol_size`), registered one at a
/// time with [`set_symbol`](Coder::set_symbol), and the same storage is lent back on every call to
/// [`write_payload`](Coder::write_payload).
pub trait Coder {
    /// Registers the symbol at `index`, which must be less than the generation size.
    fn set_symbol(&mut self, index: usize, symbol: &[u8]);

    /// Returns the number of symbols registered so far.
    fn rank(&self) -> usize;

    /// Writes one coded payload derived from the registered symbols into `payload`, and returns
    /// the number of bytes written. May be called at any rank, including after full rank.
    fn write_payload(&mut self, symbols: &[u8], payload: &mut [u8]) -> usize;
}
