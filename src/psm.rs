//! Pixel storage formats of GS local memory.
//!
//! Every format tiles VRAM into 8 KiB pages of 32 blocks (256 bytes each), but
//! the pixel dimensions of a page and a block depend on the format. The
//! descriptor table below captures the geometry along with the block decoder
//! used to unswizzle one block into a linear buffer.

use crate::mem;

/// Size of a VRAM page in bytes.
pub const PAGE_BYTES: usize = 8192;

/// Size of a VRAM block in bytes. A page always holds 32 blocks.
pub const BLOCK_BYTES: usize = 256;

/// Number of pages in 4 MiB of local memory.
pub const MAX_PAGES: usize = 512;

/// Number of blocks in local memory.
pub const MAX_BLOCKS: usize = MAX_PAGES * 32;

/// The pixel storage formats supported by the software renderer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Psm {
    /// 32-bit RGBA.
    Ct32,
    /// 24-bit RGB stored in 32-bit words, alpha from TEXA.
    Ct24,
    /// 16-bit RGB 5:5:5 with an alpha select bit.
    Ct16,
    /// 8-bit palette indices.
    T8,
    /// 4-bit palette indices.
    T4,
    /// 8-bit palette indices stored in the high byte of 32-bit words.
    T8h,
}

/// Per-format constants, resolved once when a cache entry is built and
/// reused for every block decode after that.
pub struct PsmDesc {
    /// Bits per texel as stored in VRAM.
    pub trbpp: u32,
    /// Palette entries, 0 for direct color formats.
    pub pal: u32,
    /// Block size in pixels.
    pub bs: (i32, i32),
    /// Page size in pixels.
    pub pgs: (i32, i32),
    /// Decodes one block into a linear destination buffer.
    pub decode: mem::DecodeFn,
}

static CT32: PsmDesc = PsmDesc {
    trbpp: 32,
    pal: 0,
    bs: (8, 8),
    pgs: (64, 32),
    decode: mem::read_block_ct32,
};

static CT24: PsmDesc = PsmDesc {
    trbpp: 24,
    pal: 0,
    bs: (8, 8),
    pgs: (64, 32),
    decode: mem::read_block_ct24,
};

static CT16: PsmDesc = PsmDesc {
    trbpp: 16,
    pal: 0,
    bs: (16, 8),
    pgs: (64, 64),
    decode: mem::read_block_ct16,
};

static T8: PsmDesc = PsmDesc {
    trbpp: 8,
    pal: 256,
    bs: (16, 16),
    pgs: (128, 64),
    decode: mem::read_block_t8,
};

static T4: PsmDesc = PsmDesc {
    trbpp: 4,
    pal: 16,
    bs: (32, 16),
    pgs: (128, 128),
    decode: mem::read_block_t4,
};

static T8H: PsmDesc = PsmDesc {
    trbpp: 8,
    pal: 256,
    bs: (8, 8),
    pgs: (64, 32),
    decode: mem::read_block_t8h,
};

impl Psm {
    pub fn from_bits(val: u32) -> Self {
        match val {
            0x00 => Psm::Ct32,
            0x01 => Psm::Ct24,
            0x02 => Psm::Ct16,
            0x13 => Psm::T8,
            0x14 => Psm::T4,
            0x1b => Psm::T8h,
            _ => unreachable!("Invalid pixel storage format: {val:#x}"),
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Psm::Ct32 => 0x00,
            Psm::Ct24 => 0x01,
            Psm::Ct16 => 0x02,
            Psm::T8 => 0x13,
            Psm::T4 => 0x14,
            Psm::T8h => 0x1b,
        }
    }

    pub fn desc(self) -> &'static PsmDesc {
        match self {
            Psm::Ct32 => &CT32,
            Psm::Ct24 => &CT24,
            Psm::Ct16 => &CT16,
            Psm::T8 => &T8,
            Psm::T4 => &T4,
            Psm::T8h => &T8H,
        }
    }

    /// Which bit planes of a 32-bit VRAM word the format occupies. Bit 0 is
    /// the low 24 bits, bit 1 the high byte.
    pub fn plane_mask(self) -> u32 {
        match self {
            Psm::Ct24 => 0b01,
            Psm::T8h => 0b10,
            _ => 0b11,
        }
    }

    /// True if two formats reinterpret the same underlying bits of VRAM.
    /// Writes in one such format must invalidate cached textures in the other.
    pub fn has_shared_bits(self, other: Psm) -> bool {
        self.plane_mask() & other.plane_mask() != 0
    }
}
