
use crate::block::BlockQueue;
use crate::coding::Coder;
use crate::error::{ProtocolViolation, Result};
use crate::transmitter::FeedbackSource;
use crate::wire;

use std::io;

#[derive(Clone,Copy,Debug,Default,PartialEq)]
pub struct DrainReport {
    pub applied: u64,
    pub stale: u64,
}

pub fn validate(ack: &wire::Feedback, generation_size: usize) -> std::result::Result<(), ProtocolViolation> {
    if ack.rank == 0 || ack.rank as usize > generation_size {
        return Err(ProtocolViolation::RankOutOfRange {
            block_id: ack.block_id,
            rank: ack.rank,
            generation_size,
        });
    }

    Ok(())
}

// Merges a validated rank report into the block with a matching id. Returns false if no such
// block exists, i.e. it has already been reclaimed.
pub fn apply<C: Coder>(blocks: &mut BlockQueue<C>, ack: &wire::Feedback) -> bool {
    for block in blocks.iter_mut() {
        if block.id() < ack.block_id {
            continue;
        } else if block.id() > ack.block_id {
            // Ids only increase toward the tail
            break;
        } else {
            block.merge_ack(ack.rank as usize);
            return true;
        }
    }

    return false;
}

// Reads rank reports until the source has nothing more to deliver this tick.
pub fn drain<C: Coder>(
    source: &mut impl FeedbackSource,
    blocks: &mut BlockQueue<C>,
    generation_size: usize,
) -> Result<DrainReport> {
    // One spare byte so that oversized records are detected rather than truncated
    let mut buf = [0u8; wire::FEEDBACK_SIZE + 1];
    let mut report = DrainReport::default();

    loop {
        let size = match source.recv(&mut buf) {
            Ok(size) => size,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                log::warn!("feedback receive failed: {}", err);
                return Err(err.into());
            }
        };

        let ack = match wire::Feedback::read(&buf[..size]) {
            Some(ack) => ack,
            None => return Err(ProtocolViolation::RecordSize(size).into()),
        };

        validate(&ack, generation_size)?;

        if apply(blocks, &ack) {
            log::trace!("block {} acknowledged at rank {}", ack.block_id, ack.rank);
            report.applied += 1;
        } else {
            log::trace!("dropped ack for retired block {}", ack.block_id);
            report.stale += 1;
        }
    }

    Ok(report)
}
