//! GS local memory and the address translation used to walk it.
//!
//! The cache never touches VRAM bytes directly; it goes through [`Offset`],
//! which maps a base pointer/buffer width/format triple to block numbers and
//! page sets, and through the per-format block decoders in this module. Block
//! texels are stored linearly row-major inside a block; the hardware's column
//! swizzle within a block is not modeled.

use crate::psm::{Psm, BLOCK_BYTES, MAX_BLOCKS, MAX_PAGES};
use crate::rect::Rect;
use crate::reg::Texa;

/// 4 MiB of GS local memory.
pub const VRAM_SIZE: usize = 4 * 1024 * 1024;

/// Decodes one VRAM block into a linear destination buffer with the given
/// row pitch in bytes. The destination starts at the block's top-left texel.
pub type DecodeFn = fn(&LocalMemory, u32, Texa, &mut [u8], usize);

pub struct LocalMemory {
    data: Box<[u8]>,
    clut: [u32; 256],
}

impl LocalMemory {
    pub fn new() -> Self {
        Self {
            data: vec![0x0; VRAM_SIZE].into_boxed_slice(),
            clut: [0x0; 256],
        }
    }

    pub fn block(&self, block: u32) -> &[u8] {
        let offset = (block as usize & (MAX_BLOCKS - 1)) * BLOCK_BYTES;
        &self.data[offset..offset + BLOCK_BYTES]
    }

    pub fn block_mut(&mut self, block: u32) -> &mut [u8] {
        let offset = (block as usize & (MAX_BLOCKS - 1)) * BLOCK_BYTES;
        &mut self.data[offset..offset + BLOCK_BYTES]
    }

    /// The palette as most recently uploaded, already expanded to 32-bit.
    pub fn clut(&self) -> &[u32; 256] {
        &self.clut
    }

    pub fn clut_mut(&mut self) -> &mut [u32; 256] {
        &mut self.clut
    }

    pub fn offset(&self, tbp0: u32, tbw: u32, psm: Psm) -> Offset {
        Offset::new(tbp0, tbw, psm)
    }
}

impl Default for LocalMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// Address translator for one texture buffer. Pure function of the base
/// pointer, buffer width and format; the base pointer is treated as page
/// aligned.
#[derive(Clone, Copy, Debug)]
pub struct Offset {
    bp: u32,
    bw: u32,
    psm: Psm,
}

impl Offset {
    pub fn new(bp: u32, bw: u32, psm: Psm) -> Self {
        Self { bp, bw, psm }
    }

    pub fn psm(self) -> Psm {
        self.psm
    }

    /// log2 of the block width in pixels.
    pub fn block_shift_x(self) -> u32 {
        self.psm.desc().bs.0.trailing_zeros()
    }

    /// log2 of the block height in pixels.
    pub fn block_shift_y(self) -> u32 {
        self.psm.desc().bs.1.trailing_zeros()
    }

    /// How many pages one row of the buffer spans. Always at least one.
    fn pages_per_row(self) -> u32 {
        ((self.bw * 64) / self.psm.desc().pgs.0 as u32).max(1)
    }

    /// VRAM block number for a position in block coordinates. Columns beyond
    /// the buffer width wrap into following page rows, which is what makes
    /// repeating textures alias blocks.
    pub fn block_at(self, bx: i32, by: i32) -> u32 {
        let desc = self.psm.desc();

        let pw = (desc.pgs.0 / desc.bs.0) as u32;
        let ph = (desc.pgs.1 / desc.bs.1) as u32;

        let (bx, by) = (bx as u32, by as u32);
        let page = (self.bp >> 5) + (by / ph) * self.pages_per_row() + bx / pw;
        let intra = (by % ph) * pw + bx % pw;

        (page << 5 | intra) & (MAX_BLOCKS as u32 - 1)
    }

    /// Enumerate the distinct pages a pixel rectangle overlaps. Each page is
    /// visited once, in a stable order for a given input.
    pub fn page_looper_for_rect(self, rect: Rect) -> PageLooper {
        let desc = self.psm.desc();
        let (pw, ph) = (desc.pgs.0, desc.pgs.1);

        let base = self.bp >> 5;
        let ppr = self.pages_per_row();

        let mut pages = Vec::new();
        for py in rect.top / ph..=(rect.bottom - 1) / ph {
            for px in rect.left / pw..=(rect.right - 1) / pw {
                let page = (base + py as u32 * ppr + px as u32) & (MAX_PAGES as u32 - 1);
                if !pages.contains(&page) {
                    pages.push(page);
                }
            }
        }

        PageLooper { pages }
    }

    /// Build the page to tile map for a repeating texture with the given log2
    /// dimensions. Only needed for repeating textures, where one page can hold
    /// many tile positions.
    pub fn page2tile(self, tw: u32, th: u32) -> Page2Tile {
        let desc = self.psm.desc();

        let cols = i32::max(1 << tw, desc.bs.0) >> self.block_shift_x();
        let rows = i32::max(1 << th, desc.bs.1) >> self.block_shift_y();

        let mut p2t = Page2Tile::new();
        for ty in 0..rows {
            for tx in 0..cols {
                let block = self.block_at(tx, ty);
                let page = (block >> 5) as usize & (MAX_PAGES - 1);

                let i = ((ty << 7) + tx) as u32;
                p2t.add(page, (i >> 5) as u16, 1 << (i & 31));
            }
        }
        p2t
    }
}

/// The set of pages a texture rectangle overlaps.
#[derive(Clone, Debug, Default)]
pub struct PageLooper {
    pages: Vec<u32>,
}

impl PageLooper {
    /// A contiguous page range, for callers that track writes by page rather
    /// than by rectangle.
    pub fn from_range(start: u32, end: u32) -> Self {
        Self {
            pages: (start..end).map(|p| p & (MAX_PAGES as u32 - 1)).collect(),
        }
    }

    pub fn loop_pages(&self, mut f: impl FnMut(u32)) {
        for &page in &self.pages {
            f(page);
        }
    }

    pub fn pages(&self) -> &[u32] {
        &self.pages
    }
}

/// For every page, the validity words and clear masks of the tiles that map
/// onto it.
pub struct Page2Tile {
    map: Vec<Vec<(u16, u32)>>,
}

impl Page2Tile {
    fn new() -> Self {
        Self { map: vec![Vec::new(); MAX_PAGES] }
    }

    fn add(&mut self, page: usize, word: u16, bit: u32) {
        let list = &mut self.map[page];
        match list.iter_mut().find(|entry| entry.0 == word) {
            Some(entry) => entry.1 &= !bit,
            None => list.push((word, !bit)),
        }
    }

    pub fn page(&self, page: usize) -> &[(u16, u32)] {
        &self.map[page]
    }
}

fn rgb16_to_32(val: u16, texa: Texa) -> u32 {
    let r = ((val & 0x1f) << 3) as u32;
    let g = (((val >> 5) & 0x1f) << 3) as u32;
    let b = (((val >> 10) & 0x1f) << 3) as u32;

    let a = if val & 0x8000 != 0 {
        texa.ta1()
    } else if texa.aem() && val == 0 {
        0
    } else {
        texa.ta0()
    };

    r | g << 8 | b << 16 | (a as u32) << 24
}

pub fn read_block_ct32(mem: &LocalMemory, block: u32, _texa: Texa, dst: &mut [u8], pitch: usize) {
    let src = mem.block(block);
    for y in 0..8 {
        dst[y * pitch..y * pitch + 32].copy_from_slice(&src[y * 32..y * 32 + 32]);
    }
}

pub fn read_block_ct24(mem: &LocalMemory, block: u32, texa: Texa, dst: &mut [u8], pitch: usize) {
    let src = mem.block(block);
    for y in 0..8 {
        for x in 0..8 {
            let word: u32 = bytemuck::pod_read_unaligned(&src[(y * 8 + x) * 4..][..4]);
            let rgb = word & 0xff_ffff;

            let a = if texa.aem() && rgb == 0 { 0 } else { texa.ta0() };
            let px = rgb | (a as u32) << 24;

            dst[y * pitch + x * 4..][..4].copy_from_slice(&px.to_le_bytes());
        }
    }
}

pub fn read_block_ct16(mem: &LocalMemory, block: u32, texa: Texa, dst: &mut [u8], pitch: usize) {
    let src = mem.block(block);
    for y in 0..8 {
        for x in 0..16 {
            let val: u16 = bytemuck::pod_read_unaligned(&src[(y * 16 + x) * 2..][..2]);
            let px = rgb16_to_32(val, texa);

            dst[y * pitch + x * 4..][..4].copy_from_slice(&px.to_le_bytes());
        }
    }
}

pub fn read_block_t8(mem: &LocalMemory, block: u32, _texa: Texa, dst: &mut [u8], pitch: usize) {
    let src = mem.block(block);
    for y in 0..16 {
        dst[y * pitch..y * pitch + 16].copy_from_slice(&src[y * 16..y * 16 + 16]);
    }
}

pub fn read_block_t4(mem: &LocalMemory, block: u32, _texa: Texa, dst: &mut [u8], pitch: usize) {
    let src = mem.block(block);
    for y in 0..16 {
        for x in 0..32 {
            let byte = src[y * 16 + x / 2];
            dst[y * pitch + x] = if x & 1 == 1 { byte >> 4 } else { byte & 0xf };
        }
    }
}

pub fn read_block_t8h(mem: &LocalMemory, block: u32, _texa: Texa, dst: &mut [u8], pitch: usize) {
    let src = mem.block(block);
    for y in 0..8 {
        for x in 0..8 {
            dst[y * pitch + x] = src[(y * 8 + x) * 4 + 3];
        }
    }
}
