use super::{fill_block, fill_blocks};
use crate::mem::{LocalMemory, PageLooper};
use crate::perf::{PerfMon, Stat};
use crate::psm::Psm;
use crate::rect::Rect;
use crate::reg::{Tex0, Texa};
use crate::TextureCache;

fn ct32(tbp0: u32, tbw: u32, tw: u32, th: u32) -> Tex0 {
    Tex0::default()
        .with_tbp0(tbp0)
        .with_tbw(tbw)
        .with_psm(Psm::Ct32)
        .with_tw(tw)
        .with_th(th)
}

#[test]
fn lookup_hit_returns_same_entry() {
    let mem = LocalMemory::new();
    let mut cache = TextureCache::new();

    let tex0 = ct32(0, 1, 6, 6);
    let texa = Texa::default();

    let first = cache.lookup(tex0, texa, 0, &mem);
    let again = cache.lookup(tex0, texa, 0, &mem);
    assert_eq!(first, again);
    assert_eq!(cache.len(), 1);

    // A different height is a different texture.
    let other = cache.lookup(tex0.with_th(5), texa, 0, &mem);
    assert_ne!(first, other);
    assert_eq!(cache.len(), 2);
}

#[test]
fn texa_only_matters_for_16_and_24_bit_with_tcc() {
    let mem = LocalMemory::new();
    let mut cache = TextureCache::new();

    let t16 = Tex0::default()
        .with_tbp0(0)
        .with_tbw(1)
        .with_psm(Psm::Ct16)
        .with_tw(6)
        .with_th(6)
        .with_tcc(true);

    let a = cache.lookup(t16, Texa::new(0x00, false, 0xff), 0, &mem);
    let b = cache.lookup(t16, Texa::new(0x80, false, 0xff), 0, &mem);
    assert_ne!(a, b);

    // A 32-bit texture never consults TEXA.
    let t32 = ct32(64, 1, 6, 6).with_tcc(true);
    let a = cache.lookup(t32, Texa::new(0x00, false, 0xff), 0, &mem);
    let b = cache.lookup(t32, Texa::new(0x80, false, 0xff), 0, &mem);
    assert_eq!(a, b);
}

#[test]
fn stride_hint_must_match() {
    let mem = LocalMemory::new();
    let mut cache = TextureCache::new();

    let tex0 = ct32(0, 1, 6, 6);
    let texa = Texa::default();

    let derived = cache.lookup(tex0, texa, 0, &mem);
    let hinted = cache.lookup(tex0, texa, 8, &mem);
    assert_ne!(derived, hinted);

    // The zero hint matches any stored stride, so it hits the MRU entry.
    let any = cache.lookup(tex0, texa, 0, &mem);
    assert_eq!(any, hinted);
}

#[test]
fn aging_evicts_after_threshold() {
    let mem = LocalMemory::new();
    let mut cache = TextureCache::new();

    cache.lookup(ct32(0, 1, 6, 6), Texa::default(), 0, &mem);

    for _ in 0..10 {
        cache.inc_age();
    }
    assert_eq!(cache.len(), 1);

    cache.inc_age();
    assert_eq!(cache.len(), 0);
}

#[test]
fn lookup_resets_age() {
    let mem = LocalMemory::new();
    let mut cache = TextureCache::new();

    let tex0 = ct32(0, 1, 6, 6);
    cache.lookup(tex0, Texa::default(), 0, &mem);

    for _ in 0..10 {
        cache.inc_age();
    }

    // The hit rewinds the clock, so ten more ticks don't evict.
    let key = cache.lookup(tex0, Texa::default(), 0, &mem);
    assert_eq!(cache.entry(key).age(), 0);

    for _ in 0..10 {
        cache.inc_age();
    }
    assert_eq!(cache.len(), 1);

    cache.inc_age();
    assert_eq!(cache.len(), 0);
}

#[test]
fn remove_all_clears_everything() {
    let mem = LocalMemory::new();
    let mut cache = TextureCache::new();

    cache.lookup(ct32(0, 1, 6, 6), Texa::default(), 0, &mem);
    cache.lookup(ct32(64, 1, 5, 5), Texa::default(), 0, &mem);
    assert_eq!(cache.len(), 2);

    cache.remove_all();
    assert!(cache.is_empty());
}

#[test]
fn update_decodes_lazily_and_once() {
    let mut mem = LocalMemory::new();
    fill_blocks(&mut mem, 0..2, 7);

    let mut cache = TextureCache::new();
    let mut perf = PerfMon::new();

    // 16x8 CT32: two blocks side by side.
    let key = cache.lookup(ct32(0, 1, 4, 3), Texa::default(), 0, &mem);
    let tex = cache.entry_mut(key);

    tex.update(Rect::new(0, 0, 8, 8), &mem, &mut perf).unwrap();
    assert_eq!(perf.get(Stat::Unswizzle), 8 * 8 * 4);

    // Same rectangle again: no work, no change.
    let pixels = tex.pixels().unwrap().to_vec();
    tex.update(Rect::new(0, 0, 8, 8), &mem, &mut perf).unwrap();
    assert_eq!(perf.get(Stat::Unswizzle), 8 * 8 * 4);
    assert_eq!(tex.pixels().unwrap(), &pixels[..]);
}

#[test]
fn complete_only_by_full_extent_request() {
    let mut mem = LocalMemory::new();
    fill_blocks(&mut mem, 0..2, 3);

    let mut cache = TextureCache::new();
    let mut perf = PerfMon::new();

    let key = cache.lookup(ct32(0, 1, 4, 3), Texa::default(), 0, &mem);
    let tex = cache.entry_mut(key);

    tex.update(Rect::new(0, 0, 8, 8), &mem, &mut perf).unwrap();
    assert!(!tex.is_complete());

    tex.update(Rect::new(8, 0, 16, 8), &mem, &mut perf).unwrap();
    // Every block is valid now, but nobody asked for the full extent.
    assert!(!tex.is_complete());

    let decoded = perf.get(Stat::Unswizzle);
    tex.update(Rect::new(0, 0, 16, 8), &mem, &mut perf).unwrap();
    assert!(tex.is_complete());

    // The full extent request found every block already decoded.
    assert_eq!(perf.get(Stat::Unswizzle), decoded);
}

#[test]
fn decoded_rows_match_vram() {
    let mut mem = LocalMemory::new();
    fill_block(&mut mem, 0, 42);

    let mut cache = TextureCache::new();
    let mut perf = PerfMon::new();

    // One 8x8 CT32 block.
    let key = cache.lookup(ct32(0, 1, 3, 3), Texa::default(), 0, &mem);
    let tex = cache.entry_mut(key);
    tex.update(Rect::new(0, 0, 8, 8), &mem, &mut perf).unwrap();
    assert!(tex.is_complete());

    let pixels = tex.pixels().unwrap();
    let block = mem.block(0);
    for y in 0..8 {
        assert_eq!(&pixels[y * 32..y * 32 + 32], &block[y * 32..y * 32 + 32]);
    }
}

#[test]
fn reset_keeps_buffer_only_for_same_dimensions() {
    let mut mem = LocalMemory::new();
    fill_block(&mut mem, 0, 6);

    let mut cache = TextureCache::new();
    let mut perf = PerfMon::new();

    let tex0 = ct32(0, 1, 3, 3);
    let full = Rect::new(0, 0, 8, 8);

    let key = cache.lookup(tex0, Texa::default(), 0, &mem);
    let tex = cache.entry_mut(key);
    tex.update(full, &mem, &mut perf).unwrap();
    assert!(tex.is_complete());
    let decoded = perf.get(Stat::Unswizzle);

    // Same dimensions: the buffer survives, but every block is stale and
    // gets decoded again.
    tex.reset(tex0, Texa::default(), 0, &mem);
    assert!(!tex.is_complete());
    assert!(tex.pixels().is_some());

    tex.update(full, &mem, &mut perf).unwrap();
    assert!(tex.is_complete());
    assert_eq!(perf.get(Stat::Unswizzle), decoded * 2);

    // New dimensions drop the buffer.
    tex.reset(tex0.with_th(4), Texa::default(), 0, &mem);
    assert!(tex.pixels().is_none());
}

#[test]
fn invalidate_clears_only_hit_pages() {
    let mut mem = LocalMemory::new();
    fill_blocks(&mut mem, 0..64, 1);

    let mut cache = TextureCache::new();
    let mut perf = PerfMon::new();

    // 64x64 CT32 spans pages 0 and 1, 32 blocks each.
    let full = Rect::new(0, 0, 64, 64);
    let key = cache.lookup(ct32(0, 1, 6, 6), Texa::default(), 0, &mem);

    cache.entry_mut(key).update(full, &mem, &mut perf).unwrap();
    assert!(cache.entry(key).is_complete());
    assert_eq!(perf.get(Stat::Unswizzle), 64 * 256);

    cache.invalidate_pages(&PageLooper::from_range(0, 1), Psm::Ct32);
    assert!(!cache.entry(key).is_complete());

    // Only page 0's blocks are gone.
    cache.entry_mut(key).update(full, &mem, &mut perf).unwrap();
    assert_eq!(perf.get(Stat::Unswizzle), (64 + 32) * 256);
}

#[test]
fn invalidate_ignores_formats_with_disjoint_bits() {
    let mut mem = LocalMemory::new();
    fill_blocks(&mut mem, 0..32, 9);

    let mut cache = TextureCache::new();
    let mut perf = PerfMon::new();

    let tex0 = ct32(0, 1, 6, 5).with_psm(Psm::Ct24);
    let full = Rect::new(0, 0, 64, 32);

    let key = cache.lookup(tex0, Texa::default(), 0, &mem);
    cache.entry_mut(key).update(full, &mem, &mut perf).unwrap();
    let decoded = perf.get(Stat::Unswizzle);

    // Writes to the high byte never overlap a 24-bit texture.
    cache.invalidate_pages(&PageLooper::from_range(0, 1), Psm::T8h);
    assert!(cache.entry(key).is_complete());

    cache.entry_mut(key).update(full, &mem, &mut perf).unwrap();
    assert_eq!(perf.get(Stat::Unswizzle), decoded);

    // A sharing format does invalidate.
    cache.invalidate_pages(&PageLooper::from_range(0, 1), Psm::Ct16);
    assert!(!cache.entry(key).is_complete());
}

#[test]
fn repeating_textures_invalidate_per_tile() {
    let mut mem = LocalMemory::new();
    fill_blocks(&mut mem, 0..64, 5);

    let mut cache = TextureCache::new();
    let mut perf = PerfMon::new();

    // 128x32 CT32 in a 64 pixel buffer wraps, so tiles right of column 7
    // live on page 1.
    let tex0 = ct32(0, 1, 7, 5);
    assert!(tex0.is_repeating());

    let full = Rect::new(0, 0, 128, 32);
    let key = cache.lookup(tex0, Texa::default(), 0, &mem);

    cache.entry_mut(key).update(full, &mem, &mut perf).unwrap();
    assert_eq!(perf.get(Stat::Unswizzle), 64 * 256);

    // Hitting page 1 drops only the tiles mapped there.
    cache.invalidate_pages(&PageLooper::from_range(1, 2), Psm::Ct32);
    assert!(!cache.entry(key).is_complete());

    cache.entry_mut(key).update(full, &mem, &mut perf).unwrap();
    assert_eq!(perf.get(Stat::Unswizzle), (64 + 32) * 256);
}
