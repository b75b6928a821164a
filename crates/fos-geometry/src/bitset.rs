//! MSB-first bitsets
//!
//! Bit `n` counts from the most significant end of the word: bit 0 of a
//! `BitSet32` is `0x8000_0000`. The dense index of a marked bit
//! (`get_index_of_bit`) is the number of marked bits before it in that order,
//! which is what keeps every sparse table in this workspace sorted.

macro_rules! msb_bitset {
    ($(#[$meta:meta])* $name:ident, $word:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name {
            pub value: $word,
        }

        impl $name {
            /// Number of addressable bits
            pub const BITS: u32 = <$word>::BITS;

            const TOP: $word = 1 << (<$word>::BITS - 1);

            /// Wrap a raw word
            pub const fn new(value: $word) -> Self {
                Self { value }
            }

            /// Mask for bit `n` (`n` must be below `BITS`)
            #[inline]
            pub const fn value_for_bit(n: u32) -> $word {
                Self::TOP >> n
            }

            #[inline]
            pub fn clear(&mut self) {
                self.value = 0;
            }

            /// Number of marked bits
            #[inline]
            pub const fn count(&self) -> u32 {
                self.value.count_ones()
            }

            #[inline]
            pub const fn is_empty(&self) -> bool {
                self.value == 0
            }

            #[inline]
            pub const fn is_full(&self) -> bool {
                self.value == <$word>::MAX
            }

            #[inline]
            pub const fn has_bit(&self, n: u32) -> bool {
                self.value & Self::value_for_bit(n) != 0
            }

            #[inline]
            pub fn mark_bit(&mut self, n: u32) {
                self.value |= Self::value_for_bit(n);
            }

            #[inline]
            pub fn clear_bit(&mut self, n: u32) {
                self.value &= !Self::value_for_bit(n);
            }

            /// Index of the first marked bit (`BITS` when empty)
            #[inline]
            pub const fn first_marked_bit(&self) -> u32 {
                self.value.leading_zeros()
            }

            /// Index of the first unmarked bit (`BITS` when full)
            #[inline]
            pub const fn first_unmarked_bit(&self) -> u32 {
                (!self.value).leading_zeros()
            }

            /// Index of the last marked bit. The set must not be empty.
            #[inline]
            pub const fn last_marked_bit(&self) -> u32 {
                Self::BITS - 1 - self.value.trailing_zeros()
            }

            /// Clear the first marked bit and return its index
            pub fn clear_first_marked_bit(&mut self) -> u32 {
                let n = self.first_marked_bit();
                self.clear_bit(n);
                n
            }

            /// Mark the first unmarked bit and return its index
            pub fn mark_first_unmarked_bit(&mut self) -> u32 {
                let n = self.first_unmarked_bit();
                self.mark_bit(n);
                n
            }

            /// Clear the last marked bit and return its index
            pub fn clear_last_marked_bit(&mut self) -> u32 {
                let n = self.last_marked_bit();
                self.clear_bit(n);
                n
            }

            /// Dense index of bit `n`: the number of marked bits before it
            #[inline]
            pub const fn get_index_of_bit(&self, n: u32) -> u32 {
                (self.value & !(<$word>::MAX >> n)).count_ones()
            }

            /// Marked bits, first to last
            pub fn iter(&self) -> impl Iterator<Item = u32> {
                let mut rest = *self;
                std::iter::from_fn(move || {
                    if rest.is_empty() {
                        None
                    } else {
                        Some(rest.clear_first_marked_bit())
                    }
                })
            }
        }

        impl SparseBits for $name {
            const BITS: u32 = <$word>::BITS;

            fn has_bit(&self, n: u32) -> bool {
                $name::has_bit(self, n)
            }

            fn mark_bit(&mut self, n: u32) {
                $name::mark_bit(self, n)
            }

            fn clear_bit(&mut self, n: u32) {
                $name::clear_bit(self, n)
            }

            fn count(&self) -> u32 {
                $name::count(self)
            }

            fn get_index_of_bit(&self, n: u32) -> u32 {
                $name::get_index_of_bit(self, n)
            }

            fn clear(&mut self) {
                $name::clear(self)
            }
        }
    };
}

/// Operations shared by the bitsets that key a [`SparseTable`]
pub trait SparseBits: Copy + Default {
    const BITS: u32;

    fn has_bit(&self, n: u32) -> bool;
    fn mark_bit(&mut self, n: u32);
    fn clear_bit(&mut self, n: u32);
    fn count(&self) -> u32;
    fn get_index_of_bit(&self, n: u32) -> u32;
    fn clear(&mut self);
}

msb_bitset!(
    /// 32-bit set, used for pointer ids
    BitSet32,
    u32
);

msb_bitset!(
    /// 64-bit set, used for axis presence
    BitSet64,
    u64
);

/// Sparse values keyed by bit index, stored densely in bit order.
///
/// `bits.count() == values.len()` at all times, and the value for bit `n`
/// lives at `bits.get_index_of_bit(n)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseTable<B: SparseBits, T> {
    bits: B,
    values: Vec<T>,
}

impl<B: SparseBits, T> SparseTable<B, T> {
    pub fn new() -> Self {
        Self {
            bits: B::default(),
            values: Vec::new(),
        }
    }

    /// Build from a presence map and values already in dense order
    pub fn from_dense(bits: B, values: Vec<T>) -> Option<Self> {
        if bits.count() as usize != values.len() {
            return None;
        }
        Some(Self { bits, values })
    }

    #[inline]
    pub fn bits(&self) -> B {
        self.bits
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bits past the set width are never present
    #[inline]
    pub fn contains(&self, n: u32) -> bool {
        n < B::BITS && self.bits.has_bit(n)
    }

    /// Dense slot of bit `n`, if present
    #[inline]
    pub fn slot_of(&self, n: u32) -> Option<usize> {
        self.contains(n)
            .then(|| self.bits.get_index_of_bit(n) as usize)
    }

    pub fn get(&self, n: u32) -> Option<&T> {
        self.slot_of(n).map(|slot| &self.values[slot])
    }

    pub fn get_mut(&mut self, n: u32) -> Option<&mut T> {
        self.slot_of(n).map(|slot| &mut self.values[slot])
    }

    /// Overwrite bit `n` in place or insert it at its sorted slot
    pub fn insert(&mut self, n: u32, value: T) {
        let slot = self.bits.get_index_of_bit(n) as usize;
        if self.bits.has_bit(n) {
            self.values[slot] = value;
        } else {
            self.bits.mark_bit(n);
            self.values.insert(slot, value);
        }
    }

    pub fn remove(&mut self, n: u32) -> Option<T> {
        let slot = self.slot_of(n)?;
        self.bits.clear_bit(n);
        Some(self.values.remove(slot))
    }

    pub fn clear(&mut self) {
        self.bits.clear();
        self.values.clear();
    }

    /// Values in dense (bit) order
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// `(bit, value)` pairs in bit order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        (0..B::BITS)
            .filter(|&n| self.bits.has_bit(n))
            .zip(self.values.iter())
    }
}
