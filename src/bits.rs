macro_rules! impl_bit {
    ($t:ident) => {
        impl Bit for $t {
            fn bit(self, n: usize) -> bool {
                (self >> n) & 1 == 1
            }

            fn bit_range(self, ls: usize, ms: usize) -> Self {
                let mask = ((1 << (ms - ls + 1)) - 1) << ls;
                (self & mask) >> ls
            }
        }

        impl BitSet for $t {
            fn set_bit(self, bit: usize, val: bool) -> Self {
                (self & !(1 << bit)) | ((val as Self) << bit)
            }

            fn set_bit_range(self, ls: usize, ms: usize, val: Self) -> Self {
                let mask = (1 << (ms - ls + 1)) - 1;
                (self & !(mask << ls)) | ((val & mask) << ls)
            }
        }
    }
}

impl_bit!(u64);
impl_bit!(u32);
impl_bit!(u16);
impl_bit!(u8);
impl_bit!(i32);

/// Trait to extract a value between two given bit positions.
pub trait Bit {
    /// Extract a single bit.
    #[must_use]
    fn bit(self, n: usize) -> bool;

    /// Extract a range of bits. Both are inclusive.
    #[must_use]
    fn bit_range(self, ls: usize, ms: usize) -> Self;
}

pub trait BitSet {
    #[must_use]
    fn set_bit(self, bit: usize, val: bool) -> Self;

    #[must_use]
    fn set_bit_range(self, ls: usize, ms: usize, val: Self) -> Self;
}

#[test]
fn test_bit_range() {
    let a = 0xdead_beef_u32;
    assert_eq!(a.bit_range(0, 15), 0xbeef);
    assert_eq!(a.bit_range(16, 31), 0xdead);
    assert!(a.bit(0));
    assert!(!a.bit(4));

    let a = 0x3_0000_0000_u64;
    assert_eq!(a.bit_range(32, 33), 0b11);
}

#[test]
fn test_set_bit_range() {
    let a = 0_u64.set_bit_range(30, 33, 0b1010);
    assert_eq!(a.bit_range(30, 33), 0b1010);

    let a = 0_u32.set_bit_range(1, 2, 0b11);
    assert_eq!(0b110, a);

    let a = 0b111_u32.set_bit(2, false);
    assert_eq!(0b011, a);
}
