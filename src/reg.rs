//! The GS texture configuration registers. Both are packed 64-bit words, so they
//! are kept packed here and fields get unpacked on demand, which also makes the
//! fast cache key comparison a plain mask and xor.

use crate::bits::{Bit, BitSet};
use crate::psm::Psm;

/// TEX0: base pointer, buffer width, storage format and dimensions of the
/// texture currently bound to a context.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Tex0(pub u64);

/// TBP0/TBW/PSM/TW/TH, i.e. everything the cache key cares about besides TCC
/// and the alpha expansion parameters.
const KEY_MASK: u64 = 0x3_ffff_ffff;

impl Tex0 {
    /// Texture base pointer in units of blocks.
    pub fn tbp0(self) -> u32 {
        self.0.bit_range(0, 13) as u32
    }

    /// Buffer width in units of 64 pixels.
    pub fn tbw(self) -> u32 {
        self.0.bit_range(14, 19) as u32
    }

    pub fn psm(self) -> Psm {
        Psm::from_bits(self.0.bit_range(20, 25) as u32)
    }

    /// log2 of the texture width.
    pub fn tw(self) -> u32 {
        self.0.bit_range(26, 29) as u32
    }

    /// log2 of the texture height.
    pub fn th(self) -> u32 {
        self.0.bit_range(30, 33) as u32
    }

    /// Texture color component flag. When set, the alpha channel of the texture
    /// takes part in the texture function.
    pub fn tcc(self) -> bool {
        self.0.bit(34)
    }

    pub fn with_tbp0(self, val: u32) -> Self {
        Self(self.0.set_bit_range(0, 13, val as u64))
    }

    pub fn with_tbw(self, val: u32) -> Self {
        Self(self.0.set_bit_range(14, 19, val as u64))
    }

    pub fn with_psm(self, psm: Psm) -> Self {
        Self(self.0.set_bit_range(20, 25, psm.bits() as u64))
    }

    pub fn with_tw(self, val: u32) -> Self {
        Self(self.0.set_bit_range(26, 29, val as u64))
    }

    pub fn with_th(self, val: u32) -> Self {
        Self(self.0.set_bit_range(30, 33, val as u64))
    }

    pub fn with_tcc(self, val: bool) -> Self {
        Self(self.0.set_bit(34, val))
    }

    /// Fast composite comparison of {TBP0, TBW, PSM, TW, TH}. This is the first
    /// gate of the cache match predicate; TEXA and the stride hint are checked
    /// separately by the cache.
    pub fn key_eq(self, other: Tex0) -> bool {
        (self.0 ^ other.0) & KEY_MASK == 0
    }

    /// True if sampling the texture wraps through the same underlying VRAM
    /// blocks, meaning a block can alias multiple tile positions. Happens when
    /// the declared width exceeds what the buffer width can hold.
    pub fn is_repeating(self) -> bool {
        if self.tbw() < 2 {
            match self.psm() {
                Psm::T8 => return self.tw() > 7 || self.th() > 6,
                Psm::T4 => return self.tw() > 7 || self.th() > 7,
                _ => (),
            }
        }
        (self.tbw() << 6) < (1 << self.tw())
    }
}

/// TEXA: the alpha values used when expanding 16 and 24-bit texels to 32-bit.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Texa(pub u64);

impl Texa {
    pub fn new(ta0: u8, aem: bool, ta1: u8) -> Self {
        Self(0)
            .with_ta0(ta0)
            .with_aem(aem)
            .with_ta1(ta1)
    }

    /// Alpha for texels with the MSB clear.
    pub fn ta0(self) -> u8 {
        self.0.bit_range(0, 7) as u8
    }

    /// Alpha expansion mode. When set, an all-zero texel decodes as fully
    /// transparent black instead of using TA0.
    pub fn aem(self) -> bool {
        self.0.bit(15)
    }

    /// Alpha for 16-bit texels with the MSB set.
    pub fn ta1(self) -> u8 {
        self.0.bit_range(32, 39) as u8
    }

    pub fn with_ta0(self, val: u8) -> Self {
        Self(self.0.set_bit_range(0, 7, val as u64))
    }

    pub fn with_aem(self, val: bool) -> Self {
        Self(self.0.set_bit(15, val))
    }

    pub fn with_ta1(self, val: u8) -> Self {
        Self(self.0.set_bit_range(32, 39, val as u64))
    }
}
