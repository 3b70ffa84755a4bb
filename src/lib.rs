//! Texture cache for a software rasterizer emulating the PlayStation 2's
//! Graphics Synthesizer.
//!
//! Textures live swizzled in VRAM, so sampling one linearly means undoing the
//! block tiling first. The cache keeps the unswizzled result per texture
//! configuration, decodes only the blocks a draw actually needs, and drops
//! exactly the decoded blocks a VRAM write overlaps. Entries unused for a
//! while age out once per tick via [`TextureCache::inc_age`].
//!
//! Everything is single threaded: the cache, the VRAM it reads and the
//! renderer driving it are assumed to be owned by one emulation thread, and
//! writes to VRAM must be reported through
//! [`TextureCache::invalidate_pages`] before the next lookup.

#[macro_use]
extern crate log;

#[cfg(test)]
mod test;

mod bits;
mod list;

pub mod cache;
pub mod dump;
pub mod mem;
pub mod perf;
pub mod psm;
pub mod rect;
pub mod reg;
pub mod texture;

pub use cache::{TexKey, TextureCache};
pub use dump::{DumpConfig, DumpError, Region};
pub use mem::{LocalMemory, Offset, PageLooper};
pub use perf::{PerfMon, Stat};
pub use psm::Psm;
pub use rect::Rect;
pub use reg::{Tex0, Texa};
pub use texture::{TexError, Texture};
