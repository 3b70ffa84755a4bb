//! A single cached texture: one decode buffer plus the bookkeeping to fill it
//! lazily, block by block, from local memory.

use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

use std::path::Path;

use crate::dump::{self, DumpError, Region};
use crate::list::Handle;
use crate::mem::{LocalMemory, Offset, Page2Tile, PageLooper};
use crate::perf::{PerfMon, Stat};
use crate::psm::{Psm, MAX_PAGES};
use crate::rect::Rect;
use crate::reg::{Tex0, Texa};

#[derive(Debug, Error)]
pub enum TexError {
    #[error("failed to allocate a {0} byte decode buffer")]
    OutOfMemory(usize),
}

/// How validity bits are indexed.
///
/// Direct textures index by VRAM block number. Repeating textures index by
/// tile position instead, since wrap addressing lets one VRAM block back
/// several tile positions and a block-indexed bit couldn't tell them apart.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AddrMode {
    Direct,
    Repeating,
}

/// Validity bit for a tile position.
fn tile_bit(bx: i32, by: i32) -> (usize, u32) {
    let i = ((by << 7) + bx) as u32;
    ((i >> 5) as usize & (MAX_PAGES - 1), 1 << (i & 31))
}

/// Validity bit for a VRAM block number. The word index is the block's page.
fn block_bit(block: u32) -> (usize, u32) {
    ((block >> 5) as usize & (MAX_PAGES - 1), 1 << (block & 31))
}

pub struct Texture {
    pub(crate) tex0: Tex0,
    pub(crate) texa: Texa,
    /// log2 of the row stride in texels. Floored so a row is at least 32
    /// bytes, matching the smallest decode a block can do.
    pub(crate) tw: u32,
    pub(crate) age: u32,
    pub(crate) complete: bool,
    pub(crate) addr_mode: AddrMode,
    pub(crate) plane_mask: u32,
    pub(crate) pages: PageLooper,
    pub(crate) valid: Box<[u32; MAX_PAGES]>,
    off: Offset,
    p2t: Option<Page2Tile>,
    buff: Option<Box<[u8]>>,
    erase_at: Box<[Handle; MAX_PAGES]>,
    dumped: Option<(Region, String)>,
}

impl Texture {
    pub fn new(tex0: Tex0, texa: Texa, tw0: u32, mem: &LocalMemory) -> Self {
        let mut tex = Self {
            tex0,
            texa,
            tw: tw0,
            age: 0,
            complete: false,
            addr_mode: AddrMode::Direct,
            plane_mask: 0,
            pages: PageLooper::default(),
            valid: Box::new([0x0; MAX_PAGES]),
            off: mem.offset(tex0.tbp0(), tex0.tbw(), tex0.psm()),
            p2t: None,
            buff: None,
            erase_at: Box::new([Handle::NONE; MAX_PAGES]),
            dumped: None,
        };
        tex.configure(mem);
        tex
    }

    /// Reinitialize for a new configuration, reusing the entry's allocations.
    /// The decode buffer survives only if the dimensions are unchanged; its
    /// content is stale either way since the validity bits get cleared.
    pub fn reset(&mut self, tex0: Tex0, texa: Texa, tw0: u32, mem: &LocalMemory) {
        if self.tex0.tw() != tex0.tw() || self.tex0.th() != tex0.th() {
            self.buff = None;
        }

        self.tex0 = tex0;
        self.texa = texa;
        self.tw = tw0;
        self.age = 0;
        self.complete = false;
        self.dumped = None;

        self.configure(mem);
    }

    fn configure(&mut self, mem: &LocalMemory) {
        let psm = self.tex0.psm();

        if self.tw == 0 {
            let floor = if psm.desc().pal == 0 { 3 } else { 5 };
            self.tw = u32::max(self.tex0.tw(), floor);
        }

        self.valid.fill(0);
        self.plane_mask = psm.plane_mask();

        self.off = mem.offset(self.tex0.tbp0(), self.tex0.tbw(), psm);
        self.pages = self.off.page_looper_for_rect(
            Rect::new(0, 0, 1 << self.tex0.tw(), 1 << self.tex0.th()),
        );

        // Repeating addressing always works, it is just slower, so direct
        // textures skip the tile map.
        if self.tex0.is_repeating() {
            self.addr_mode = AddrMode::Repeating;
            self.p2t = Some(self.off.page2tile(self.tex0.tw(), self.tex0.th()));
        } else {
            self.addr_mode = AddrMode::Direct;
            self.p2t = None;
        }
    }

    /// Make sure every block covering `rect` has been decoded into the
    /// buffer. Blocks already marked valid are skipped, so calling this again
    /// with the same rectangle does no work.
    pub fn update(
        &mut self,
        rect: Rect,
        mem: &LocalMemory,
        perf: &mut PerfMon,
    ) -> Result<(), TexError> {
        if self.complete {
            return Ok(());
        }

        let desc = self.tex0.psm().desc();
        let bs = desc.bs;
        let shift = if desc.pal == 0 { 2 } else { 0 };

        let tw = i32::max(1 << self.tex0.tw(), bs.0);
        let th = i32::max(1 << self.tex0.th(), bs.1);

        let r = rect.align_outside(bs);
        let full_extent = r == Rect::new(0, 0, tw, th);

        let pitch = (1usize << self.tw) << shift;

        if self.buff.is_none() {
            let size = pitch * th as usize * 4;

            let mut vec = Vec::new();
            if vec.try_reserve_exact(size).is_err() {
                warn!("failed to allocate {size} byte texture decode buffer");
                return Err(TexError::OutOfMemory(size));
            }
            // Zero filled so sampling texels that never get decoded is
            // harmless.
            vec.resize(size, 0x0);
            self.buff = Some(vec.into_boxed_slice());
        }

        if full_extent {
            // Only a full extent request counts, even if partial updates have
            // already decoded every block.
            self.complete = true;
        }

        // The content is about to change, so any recorded dump is stale.
        self.dumped = None;

        let buff = match self.buff.as_deref_mut() {
            Some(buff) => buff,
            None => unreachable!("decode buffer was just allocated"),
        };

        let decode = desc.decode;
        let bsx = self.off.block_shift_x();
        let bsy = self.off.block_shift_y();

        let right = r.right >> bsx;
        let bottom = r.bottom >> bsy;

        let block_pitch = pitch * bs.1 as usize;
        let mut dst = r.top as usize * pitch;

        let mut blocks = 0;

        for by in r.top >> bsy..bottom {
            for bx in r.left >> bsx..right {
                let block = self.off.block_at(bx, by);

                let (word, bit) = match self.addr_mode {
                    AddrMode::Repeating => tile_bit(bx, by),
                    AddrMode::Direct => block_bit(block),
                };

                if self.valid[word] & bit == 0 {
                    self.valid[word] |= bit;

                    let offset = dst + (((bx << bsx) as usize) << shift);
                    decode(mem, block, self.texa, &mut buff[offset..], pitch);

                    blocks += 1;
                }
            }
            dst += block_pitch;
        }

        if blocks > 0 {
            perf.put(Stat::Unswizzle, ((bs.0 * bs.1 * blocks) as u64) << shift);
        }

        Ok(())
    }

    /// Write the full declared extent as a PNG, resolving palette indices
    /// through the current palette.
    pub fn save(
        &self,
        path: &Path,
        mem: &LocalMemory,
        compression: u32,
    ) -> Result<(), DumpError> {
        let Some(buff) = self.buff.as_deref() else {
            return Err(DumpError::Empty);
        };

        let desc = self.tex0.psm().desc();
        let w = 1usize << self.tex0.tw();
        let h = 1usize << self.tex0.th();
        let src_pitch = (1usize << self.tw) << if desc.pal == 0 { 2 } else { 0 };

        if desc.pal == 0 {
            // No palette, the buffer already holds 32-bit pixels.
            return dump::save_png(path, buff, w as u32, h as u32, src_pitch, compression);
        }

        let clut = mem.clut();
        let mut pixels = Vec::with_capacity(w * h);
        for y in 0..h {
            let row = &buff[y * src_pitch..];
            pixels.extend(row[..w].iter().map(|&idx| clut[idx as usize]));
        }

        dump::save_png(
            path,
            bytemuck::cast_slice(&pixels),
            w as u32,
            h as u32,
            w * 4,
            compression,
        )
    }

    /// Dump a subregion for regression tooling. The file is named by the hash
    /// of its final pixel content, with an `-XA` suffix recording the range
    /// the alpha channel was expanded from, and nothing is written if a file
    /// of that name already exists or the same region was already dumped for
    /// the current content.
    pub fn dump_for_region(
        &mut self,
        dir: &Path,
        region: Region,
        mem: &LocalMemory,
        compression: u32,
    ) -> Result<(), DumpError> {
        if let Some((last, _)) = &self.dumped {
            if *last == region {
                return Ok(());
            }
        }

        let Some(buff) = self.buff.as_deref() else {
            // Nothing decoded yet. Record a marker instead of failing the run.
            self.dumped = Some((region, String::from("TextureNotInCache")));
            return Ok(());
        };

        let desc = self.tex0.psm().desc();
        let src_pitch = (1usize << self.tw) << if desc.pal == 0 { 2 } else { 0 };

        let (w, h) = (region.width() as usize, region.height() as usize);
        let mut pixels: Vec<u32> = Vec::with_capacity(w * h);

        let clut = mem.clut();
        for v in region.v_min..=region.v_max {
            let row = &buff[v as usize * src_pitch..];
            for u in region.u_min..=region.u_max {
                let px = if desc.pal == 0 {
                    bytemuck::pod_read_unaligned(&row[u as usize * 4..][..4])
                } else {
                    clut[row[u as usize] as usize]
                };
                pixels.push(px);
            }
        }

        let expanded = dump::expand_alpha_channel(bytemuck::cast_slice_mut(&mut pixels));

        let hash = xxh3_64(bytemuck::cast_slice(&pixels));
        let filename = if expanded == 255 {
            format!("{hash:x}.png")
        } else {
            format!("{hash:x}-XA{expanded}.png")
        };

        let path = dir.join(&filename);
        self.dumped = Some((region, filename));

        // Same name, same content: the dump already exists on disk.
        if path.exists() {
            return Ok(());
        }

        debug!("dumping texture to {}", path.display());
        dump::save_png(
            &path,
            bytemuck::cast_slice(&pixels),
            w as u32,
            h as u32,
            w * 4,
            compression,
        )
    }

    pub fn tex0(&self) -> Tex0 {
        self.tex0
    }

    pub fn psm(&self) -> Psm {
        self.tex0.psm()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    /// The linear decode buffer, if anything has been decoded yet. Rows are
    /// `(1 << stride_log2()) << 2` bytes apart for direct color formats and
    /// `1 << stride_log2()` for paletted ones.
    pub fn pixels(&self) -> Option<&[u8]> {
        self.buff.as_deref()
    }

    pub fn stride_log2(&self) -> u32 {
        self.tw
    }

    /// Drop the validity bits a write to `page` covers. Direct textures lose
    /// the whole page word; repeating ones lose only the tiles mapping onto
    /// the page.
    pub(crate) fn invalidate_page(&mut self, page: usize) {
        match self.addr_mode {
            AddrMode::Repeating => {
                let p2t = match &self.p2t {
                    Some(p2t) => p2t,
                    None => unreachable!("tile map only exists for repeating textures"),
                };
                for &(word, mask) in p2t.page(page) {
                    self.valid[word as usize] &= mask;
                }
            }
            AddrMode::Direct => self.valid[page] = 0,
        }

        self.complete = false;
    }

    pub(crate) fn set_page_handle(&mut self, page: u32, handle: Handle) {
        self.erase_at[page as usize] = handle;
    }

    pub(crate) fn page_handle(&self, page: u32) -> Handle {
        self.erase_at[page as usize]
    }

    /// Name the recorded dump for the last region, if any. Used by tests and
    /// tooling to key results.
    pub fn dump_filename(&self) -> Option<&str> {
        self.dumped.as_ref().map(|(_, name)| name.as_str())
    }
}
