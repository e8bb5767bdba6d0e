
use std::collections::VecDeque;

/// One application record, exactly one symbol in size.
#[derive(Clone,Debug,PartialEq)]
pub struct SourceRecord {
    data: Box<[u8]>,
}

impl SourceRecord {
    /// Wraps a record.
    pub fn new(data: Box<[u8]>) -> Self {
        Self { data }
    }

    /// Returns the record bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A symbol-sized buffer awaiting admission into a block.
#[derive(Clone,Debug,PartialEq)]
pub struct Symbol {
    data: Box<[u8]>,
}

impl Symbol {
    /// Returns the symbol bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl From<SourceRecord> for Symbol {
    fn from(record: SourceRecord) -> Self {
        Self { data: record.data }
    }
}

pub type SourceQueue = VecDeque<SourceRecord>;
pub type SymbolQueue = VecDeque<Symbol>;

// Moves every pending record onto the tail of the symbol queue, preserving order. Returns the
// number of symbols produced.
pub fn fragment(source_queue: &mut SourceQueue, symbol_queue: &mut SymbolQueue) -> usize {
    let count = source_queue.len();

    symbol_queue.extend(source_queue.drain(..).map(Symbol::from));

    return count;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: u8) -> SourceRecord {
        SourceRecord::new(vec![tag; 4].into_boxed_slice())
    }

    #[test]
    fn fragment_drains_in_order() {
        let mut source_queue = SourceQueue::new();
        let mut symbol_queue = SymbolQueue::new();

        source_queue.push_back(record(0));
        source_queue.push_back(record(1));
        source_queue.push_back(record(2));

        assert_eq!(fragment(&mut source_queue, &mut symbol_queue), 3);
        assert!(source_queue.is_empty());

        source_queue.push_back(record(3));

        assert_eq!(fragment(&mut source_queue, &mut symbol_queue), 1);
        assert!(source_queue.is_empty());

        let tags: Vec<u8> = symbol_queue.iter().map(|symbol| symbol.data()[0]).collect();
        assert_eq!(tags, vec![0, 1, 2, 3]);
    }

    #[test]
    fn fragment_empty() {
        let mut source_queue = SourceQueue::new();
        let mut symbol_queue = SymbolQueue::new();

        assert_eq!(fragment(&mut source_queue, &mut symbol_queue), 0);
        assert!(symbol_queue.is_empty());
    }
}
