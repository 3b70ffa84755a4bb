mod cache;

use crate::mem::LocalMemory;

/// Fill a VRAM block with a deterministic per-block byte pattern.
pub fn fill_block(mem: &mut LocalMemory, block: u32, seed: u8) {
    for (i, byte) in mem.block_mut(block).iter_mut().enumerate() {
        *byte = seed.wrapping_add(i as u8).wrapping_mul(31);
    }
}

/// Fill a whole range of blocks.
pub fn fill_blocks(mem: &mut LocalMemory, blocks: std::ops::Range<u32>, seed: u8) {
    for block in blocks {
        fill_block(mem, block, seed.wrapping_add(block as u8));
    }
}
