//! The texture cache: a slot arena of live entries plus a reverse page index
//! used to find the entries a VRAM write touches.

use crate::list::MruList;
use crate::mem::{LocalMemory, PageLooper};
use crate::psm::{Psm, MAX_PAGES};
use crate::reg::{Tex0, Texa};
use crate::texture::Texture;

/// Stable reference to a live cache entry. Valid until the entry is evicted
/// by [`TextureCache::inc_age`] or the cache is cleared.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TexKey(u32);

impl TexKey {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Entries unused for more than this many aging ticks get evicted.
const MAX_AGE: u32 = 10;

pub struct TextureCache {
    textures: Vec<Option<Texture>>,
    free: Vec<u32>,
    map: Vec<MruList<TexKey>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self {
            textures: Vec::new(),
            free: Vec::new(),
            map: (0..MAX_PAGES).map(|_| MruList::new()).collect(),
        }
    }

    /// Find or create the entry for a texture configuration. `tw0` is an
    /// optional minimum row stride hint in log2 texels, 0 meaning derive it
    /// from the texture width.
    ///
    /// The returned entry is promoted to the front of its base page's list
    /// and has its age reset. A fresh entry holds no decoded content; call
    /// [`Texture::update`] before sampling.
    pub fn lookup(&mut self, tex0: Tex0, texa: Texa, tw0: u32, mem: &LocalMemory) -> TexKey {
        let page = (tex0.tbp0() >> 5) as usize & (MAX_PAGES - 1);
        let trbpp = tex0.psm().desc().trbpp;

        let mut hit = None;
        for (handle, key) in self.map[page].iter() {
            let tex = match &self.textures[key.index()] {
                Some(tex) => tex,
                None => unreachable!("page list refers to an empty slot"),
            };

            if !tex.tex0.key_eq(tex0) {
                continue;
            }
            if (trbpp == 16 || trbpp == 24) && tex0.tcc() && texa != tex.texa {
                continue;
            }
            if tw0 != 0 && tex.tw != tw0 {
                continue;
            }

            hit = Some((handle, key));
            break;
        }

        if let Some((handle, key)) = hit {
            self.map[page].move_front(handle);
            if let Some(tex) = &mut self.textures[key.index()] {
                tex.age = 0;
            }
            return key;
        }

        let tex = Texture::new(tex0, texa, tw0, mem);
        let pages = tex.pages.clone();

        let key = match self.free.pop() {
            Some(idx) => {
                self.textures[idx as usize] = Some(tex);
                TexKey(idx)
            }
            None => {
                self.textures.push(Some(tex));
                TexKey((self.textures.len() - 1) as u32)
            }
        };

        pages.loop_pages(|page| {
            let handle = self.map[page as usize].insert_front(key);
            if let Some(tex) = &mut self.textures[key.index()] {
                tex.set_page_handle(page, handle);
            }
        });

        key
    }

    pub fn entry(&self, key: TexKey) -> &Texture {
        match &self.textures[key.index()] {
            Some(tex) => tex,
            None => unreachable!("stale texture key"),
        }
    }

    pub fn entry_mut(&mut self, key: TexKey) -> &mut Texture {
        match &mut self.textures[key.index()] {
            Some(tex) => tex,
            None => unreachable!("stale texture key"),
        }
    }

    /// Drop the validity bits covered by a set of written pages for every
    /// entry whose format shares bits with the written format.
    ///
    /// Direct entries lose the whole page's worth of bits at once; that is
    /// coarser than the written byte range, but keeps invalidation O(1) per
    /// page. Repeating entries lose exactly the tiles mapping onto the page,
    /// since page granularity would wipe most of an aliased texture.
    pub fn invalidate_pages(&mut self, pages: &PageLooper, psm: Psm) {
        let plane_mask = psm.plane_mask();

        pages.loop_pages(|page| {
            let page = page as usize & (MAX_PAGES - 1);

            for (_, key) in self.map[page].iter() {
                let tex = match &mut self.textures[key.index()] {
                    Some(tex) => tex,
                    None => unreachable!("page list refers to an empty slot"),
                };

                if plane_mask & tex.plane_mask == 0 {
                    continue;
                }

                tex.invalidate_page(page);
            }
        });
    }

    /// Destroy every entry. Outstanding [`TexKey`]s become invalid.
    pub fn remove_all(&mut self) {
        trace!("texture cache cleared");

        self.textures.clear();
        self.free.clear();

        for list in &mut self.map {
            list.clear();
        }
    }

    /// Age every entry by one tick and evict the ones unused for more than
    /// [`MAX_AGE`] ticks. Call once per well-defined cycle; lookups reset an
    /// entry's age, so only unused entries ever expire.
    pub fn inc_age(&mut self) {
        for idx in 0..self.textures.len() {
            let expired = match &mut self.textures[idx] {
                Some(tex) => {
                    tex.age += 1;
                    tex.age > MAX_AGE
                }
                None => false,
            };

            if !expired {
                continue;
            }

            let tex = match self.textures[idx].take() {
                Some(tex) => tex,
                None => unreachable!(),
            };

            tex.pages.loop_pages(|page| {
                self.map[page as usize].erase(tex.page_handle(page));
            });
            self.free.push(idx as u32);

            trace!("texture at {:#x} aged out", tex.tex0.tbp0());
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.textures.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}
