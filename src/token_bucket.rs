
/// The default maximum capacity of a token bucket, in bytes.
pub const DEFAULT_MAX_CAPACITY: u32 = 4096;

/// A token bucket which paces repair transmissions for a single block.
///
/// Capacity is refilled lazily, whenever a consumption is attempted, in proportion to the time
/// elapsed since the last effective refill. All timestamps are in milliseconds, relative to an
/// arbitrary (but fixed) time base.
#[derive(Clone,Debug)]
pub struct TokenBucket {
    last_refill_ms: u64,
    capacity: u32,
    max_capacity: u32,
    // Units per millisecond
    rate: f64,
}

impl TokenBucket {
    /// Creates an empty bucket which refills at `rate` units per millisecond, up to
    /// `max_capacity` units.
    pub fn new(rate: f64, max_capacity: u32, now_ms: u64) -> Self {
        debug_assert!(rate > 0.0);

        Self {
            last_refill_ms: now_ms,
            capacity: 0,
            max_capacity,
            rate,
        }
    }

    /// Returns the number of units currently available.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns the maximum number of units this bucket may hold.
    pub fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    /// Adds capacity for the time elapsed since the last effective refill.
    ///
    /// The refill timestamp only advances when at least one whole unit is added, so that elapsed
    /// time which amounts to less than one unit carries over into the next refill.
    ///
    /// # Panics
    ///
    /// Panics if `now_ms` precedes the last refill time.
    pub fn refill(&mut self, now_ms: u64) {
        assert!(now_ms >= self.last_refill_ms,
                "token bucket clock went backwards: {} < {}",
                now_ms,
                self.last_refill_ms);

        let elapsed_ms = now_ms - self.last_refill_ms;
        let reload = (elapsed_ms as f64 * self.rate).floor();

        if reload >= 1.0 {
            let reload = reload.min(self.max_capacity as f64) as u32;

            self.last_refill_ms = now_ms;
            self.capacity = self.capacity.saturating_add(reload).min(self.max_capacity);
        }
    }

    /// Refills the bucket, then deducts `need` units if that many are available. Returns `true`
    /// if the units were deducted, and `false` (leaving the capacity unchanged) otherwise.
    pub fn consume(&mut self, need: u32, now_ms: u64) -> bool {
        self.refill(now_ms);

        if self.capacity >= need {
            self.capacity -= need;
            return true;
        }

        return false;
    }
}
