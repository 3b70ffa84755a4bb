/// Counters for profiling the software renderer. Owned by the caller and
/// passed into the operations that report work done.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stat {
    /// Texels unswizzled from VRAM into linear cache buffers, in bytes.
    Unswizzle,
}

const STAT_COUNT: usize = 1;

#[derive(Default)]
pub struct PerfMon {
    counters: [u64; STAT_COUNT],
}

impl PerfMon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, stat: Stat, val: u64) {
        self.counters[stat as usize] += val;
    }

    pub fn get(&self, stat: Stat) -> u64 {
        self.counters[stat as usize]
    }

    pub fn reset(&mut self) {
        self.counters = [0x0; STAT_COUNT];
    }
}
