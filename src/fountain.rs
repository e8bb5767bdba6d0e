
use crate::block::{Block, BlockQueue};
use crate::coding::Coder;

#[derive(Clone,Copy,Debug,Default,PartialEq)]
pub struct FountainReport {
    pub reclaimed: u64,
    pub repaired: u64,
}

// Visits each block once, in id order. Complete blocks are removed (releasing their coding
// context and symbol storage); blocks with an acknowledged deficit are handed to `repair` if
// their pacer can afford one packet of `packet_cost`.
pub fn pass<C: Coder, R>(blocks: &mut BlockQueue<C>, packet_cost: u32, now_ms: u64, mut repair: R) -> FountainReport
where
    R: FnMut(&mut Block<C>),
{
    let mut report = FountainReport::default();

    blocks.retain_mut(|block| {
        if block.is_complete() {
            log::debug!("block {} complete at rank {}, reclaiming", block.id(), block.local_rank());
            report.reclaimed += 1;
            return false;
        }

        if block.has_deficit() && block.try_pace(packet_cost, now_ms) {
            repair(block);
            report.repaired += 1;
        }

        true
    });

    return report;
}
