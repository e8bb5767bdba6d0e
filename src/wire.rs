
//! Both message types are fixed-layout and big-endian:
//!
//! ```text
//! data packet:      block_id: u32 | payload: [u8; payload_size]
//! feedback record:  block_id: u32 | rank: u32
//! ```

/// The number of bytes preceding the coded payload in a data packet.
pub const DATA_HEADER_SIZE: usize = 4;

/// The size of a feedback record in bytes.
pub const FEEDBACK_SIZE: usize = 8;

fn read_u32(data: &[u8]) -> u32 {
    ((data[0] as u32) << 24) |
    ((data[1] as u32) << 16) |
    ((data[2] as u32) <<  8) |
    ((data[3] as u32)      )
}

fn write_u32(data: &mut [u8], value: u32) {
    data[0] = (value >> 24) as u8;
    data[1] = (value >> 16) as u8;
    data[2] = (value >>  8) as u8;
    data[3] = (value      ) as u8;
}

/// A coded payload tagged with the block it was derived from.
#[derive(Clone,Debug,PartialEq)]
pub struct DataPacket<'a> {
    /// The block (generation) the payload belongs to.
    pub block_id: u32,
    /// The coding engine's payload.
    pub payload: &'a [u8],
}

impl<'a> DataPacket<'a> {
    /// Parses a data packet. Returns `None` if `data` is too short to contain a header.
    pub fn read(data: &'a [u8]) -> Option<Self> {
        if data.len() < DATA_HEADER_SIZE {
            return None;
        }

        Some(Self {
            block_id: read_u32(&data[0..4]),
            payload: &data[DATA_HEADER_SIZE..],
        })
    }

    /// Writes the packet header for `block_id` into the first [`DATA_HEADER_SIZE`] bytes of
    /// `buf`. The payload is expected to follow in place.
    pub fn write_header(block_id: u32, buf: &mut [u8]) {
        write_u32(&mut buf[0..4], block_id);
    }

    /// Serializes this packet into a newly allocated buffer.
    pub fn write(&self) -> Box<[u8]> {
        let mut bytes = vec![0u8; DATA_HEADER_SIZE + self.payload.len()];
        Self::write_header(self.block_id, &mut bytes);
        bytes[DATA_HEADER_SIZE..].copy_from_slice(self.payload);
        bytes.into_boxed_slice()
    }
}

/// A receiver's report of the rank it has collected for a block.
#[derive(Clone,Copy,Debug,PartialEq)]
pub struct Feedback {
    /// The block the report refers to.
    pub block_id: u32,
    /// The number of linearly independent combinations received for the block.
    pub rank: u32,
}

impl Feedback {
    /// Parses a feedback record. Returns `None` unless `data` is exactly [`FEEDBACK_SIZE`] bytes.
    pub fn read(data: &[u8]) -> Option<Self> {
        if data.len() != FEEDBACK_SIZE {
            return None;
        }

        Some(Self {
            block_id: read_u32(&data[0..4]),
            rank: read_u32(&data[4..8]),
        })
    }

    /// Serializes this record.
    pub fn write(&self) -> [u8; FEEDBACK_SIZE] {
        let mut bytes = [0u8; FEEDBACK_SIZE];
        write_u32(&mut bytes[0..4], self.block_id);
        write_u32(&mut bytes[4..8], self.rank);
        bytes
    }
}
