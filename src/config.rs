
use std::net;
use std::time;

/// The largest generation size supported by the bundled coder, whose payload header carries one
/// coefficient byte per symbol and a one-byte rank.
pub const MAX_GENERATION_SIZE: usize = 255;

/// Parameters used to configure a [`Transmitter`](crate::Transmitter) and its driver loop.
///
/// All values are fixed at startup; nothing here is renegotiated with the receiver.
#[derive(Clone,Debug)]
pub struct Config {
    /// The number of symbols coded together in one block (generation).
    ///
    /// Must be greater than 0, and less than or equal to [`MAX_GENERATION_SIZE`].
    pub generation_size: usize,

    /// The size of each symbol, in bytes. Every record passed to
    /// [`Transmitter::enqueue`](crate::Transmitter::enqueue) must have exactly this length.
    ///
    /// Must be greater than 0.
    pub symbol_size: usize,

    /// The address to which data packets are sent.
    pub destination: net::SocketAddr,

    /// The local address on which rank reports are received.
    pub feedback_bind: net::SocketAddr,

    /// The rate at which each block's token bucket refills, in bytes per millisecond. A block
    /// with an outstanding deficit sends at most one repair packet per packet-sized refill.
    ///
    /// Must be greater than 0.
    pub block_rate: f64,

    /// The maximum capacity of each block's token bucket, in bytes.
    ///
    /// Must be greater than 0, and no smaller than a single data packet.
    pub bucket_capacity: u32,

    /// The total number of records produced by the [driver](crate::driver).
    pub record_count: u32,

    /// The interval between two produced records, in milliseconds.
    pub record_interval_ms: u64,

    /// The driver sleeps for this long at the end of each tick.
    pub poll_interval: time::Duration,
}

impl Default for Config {
    /// Creates a transmitter configuration with the following parameters:
    ///   * Generation size: 32 symbols
    ///   * Symbol size: 1024 bytes
    ///   * Destination: 127.0.0.1:9901
    ///   * Feedback address: 0.0.0.0:9902
    ///   * Block repair rate: 200 bytes/ms
    ///   * Token bucket capacity: 4096 bytes
    ///   * Record count: 2048
    ///   * Record interval: 2ms
    ///   * Poll interval: 500µs
    fn default() -> Self {
        Self {
            generation_size: 32,
            symbol_size: 1024,

            destination: net::SocketAddr::from(([127, 0, 0, 1], 9901)),
            feedback_bind: net::SocketAddr::from(([0, 0, 0, 0], 9902)),

            block_rate: 200.0,
            bucket_capacity: 4096,

            record_count: 2048,
            record_interval_ms: 2,
            poll_interval: time::Duration::from_micros(500),
        }
    }
}

impl Config {
    /// Returns `true` if each parameter has a valid value.
    ///
    /// Limits which depend on the coding engine (packet size versus MTU and bucket capacity) are
    /// checked when the transmitter is created.
    pub fn is_valid(&self) -> bool {
        self.generation_size > 0 &&
        self.generation_size <= MAX_GENERATION_SIZE &&
        self.symbol_size > 0 &&
        self.block_rate.is_finite() &&
        self.block_rate > 0.0 &&
        self.bucket_capacity > 0
    }

    /// The size of a full block, in bytes.
    pub fn block_size(&self) -> usize {
        self.generation_size * self.symbol_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = Config::default();
        assert!(config.is_valid());
        assert_eq!(config.block_size(), 32 * 1024);
        assert_eq!(config.record_count as usize % config.generation_size, 0);
    }

    #[test]
    fn invalid_values() {
        let config = Config { generation_size: 0, .. Default::default() };
        assert!(!config.is_valid());

        let config = Config { generation_size: MAX_GENERATION_SIZE + 1, .. Default::default() };
        assert!(!config.is_valid());

        let config = Config { symbol_size: 0, .. Default::default() };
        assert!(!config.is_valid());

        let config = Config { block_rate: 0.0, .. Default::default() };
        assert!(!config.is_valid());

        let config = Config { block_rate: f64::NAN, .. Default::default() };
        assert!(!config.is_valid());

        let config = Config { bucket_capacity: 0, .. Default::default() };
        assert!(!config.is_valid());
    }
}
